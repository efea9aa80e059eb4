mod commands;
mod config;
mod logging;
mod output;

use clap::{Parser, Subcommand};
use commands::analyze::{AnalyzeArgs, View};
use commands::Context;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "ecoconvert",
    version,
    about = "Identify waste in photos and recommend waste-to-energy conversion methods"
)]
struct Cli {
    /// Settings file (default: ecoconvert.toml in the working directory, if present)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Knowledge-base JSON replacing the built-in one
    #[arg(long, global = true, value_name = "FILE")]
    knowledge_base: Option<PathBuf>,

    /// Log debug details to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze an image (or a pre-computed predictions JSON file)
    Analyze {
        /// Path to an image, or to a .json file of {label, confidence} predictions
        input: PathBuf,

        /// Also list every prediction
        #[arg(long)]
        predictions: bool,

        /// Output format: table (default) or json
        #[arg(short, long, default_value = "table")]
        output: String,

        /// Detail view to include
        #[arg(long, value_enum)]
        view: Option<View>,

        /// Also write the PDF report
        #[arg(long)]
        report: bool,

        /// Directory for the PDF report (default: [report] output_dir)
        #[arg(long, value_name = "DIR")]
        out_dir: Option<PathBuf>,

        /// Save a preview thumbnail of the image
        #[arg(long, value_name = "FILE")]
        preview: Option<PathBuf>,
    },
    /// Analyze an input and write the PDF report
    Report {
        /// Path to an image or predictions JSON file
        input: PathBuf,

        /// Directory for the PDF report (default: [report] output_dir)
        #[arg(long, value_name = "DIR")]
        out_dir: Option<PathBuf>,
    },
    /// Inspect and validate the category knowledge base
    Knowledge {
        #[command(subcommand)]
        action: KnowledgeAction,
    },
}

#[derive(Subcommand)]
enum KnowledgeAction {
    /// List waste categories
    List,
    /// Explain a category: keywords, energy profile and methods
    Explain {
        /// Category name (e.g., "plastic")
        category: String,
    },
    /// Validate a custom knowledge-base file
    Validate {
        /// Path to knowledge-base JSON file
        file: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let settings = match config::load(cli.config.as_deref()) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };
    let ctx = Context {
        settings,
        knowledge_base: cli.knowledge_base,
    };

    let result = match cli.command {
        Commands::Analyze {
            input,
            predictions,
            output,
            view,
            report,
            out_dir,
            preview,
        } => commands::analyze::run(
            AnalyzeArgs {
                input,
                show_predictions: predictions,
                output,
                view,
                report,
                out_dir,
                preview,
                verbose: cli.verbose,
            },
            &ctx,
        ),
        Commands::Report { input, out_dir } => commands::report::run(input, out_dir, &ctx),
        Commands::Knowledge { action } => match action {
            KnowledgeAction::List => commands::knowledge::list(&ctx),
            KnowledgeAction::Explain { category } => commands::knowledge::explain(&category, &ctx),
            KnowledgeAction::Validate { file } => commands::knowledge::validate(&file),
        },
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
