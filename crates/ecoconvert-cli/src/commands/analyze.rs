use super::{analyze_input, Analyzed, Context};
use crate::output;
use crate::output::json::AnalysisOutput;
use clap::ValueEnum;
use ecoconvert_core::error::EcoConvertError;
use ecoconvert_core::presentation;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum View {
    Overview,
    Efficiency,
    Predictions,
    All,
}

impl View {
    fn includes(self, other: View) -> bool {
        self == View::All || self == other
    }
}

pub struct AnalyzeArgs {
    pub input: PathBuf,
    pub show_predictions: bool,
    pub output: String,
    pub view: Option<View>,
    pub report: bool,
    pub out_dir: Option<PathBuf>,
    pub preview: Option<PathBuf>,
    pub verbose: bool,
}

pub fn run(args: AnalyzeArgs, ctx: &Context) -> Result<(), EcoConvertError> {
    let analyzed = analyze_input(&args.input, ctx)?;
    let result = analyzed.result();

    if let Some(path) = &args.preview {
        save_preview(&analyzed, path)?;
    }

    let report_path = if args.report && result.has_report() {
        let dir = args
            .out_dir
            .as_deref()
            .unwrap_or(ctx.settings.report.output_dir.as_path());
        Some(super::report::save(&analyzed, dir)?)
    } else {
        if args.report {
            tracing::warn!("no report written: the image was not identified as waste");
        }
        None
    };

    let wants = |v: View| args.view.is_some_and(|view| view.includes(v));

    match args.output.as_str() {
        "json" => output::json::print(&AnalysisOutput {
            summary: presentation::quick_summary(result),
            result,
            overview: wants(View::Overview).then(|| presentation::overview(result)),
            efficiency: wants(View::Efficiency).then(|| presentation::efficiency(result)),
            predictions: (wants(View::Predictions) || args.show_predictions)
                .then(|| presentation::predictions(result)),
            report: report_path.as_ref().map(|p| p.display().to_string()),
        })?,
        _ => {
            output::table::print_summary(&presentation::quick_summary(result));
            if args.verbose {
                output::table::print_matches(result);
            }
            if wants(View::Overview) {
                output::table::print_overview(&presentation::overview(result));
            }
            if wants(View::Efficiency) {
                output::table::print_efficiency(&presentation::efficiency(result));
            }
            if wants(View::Predictions) || args.show_predictions || args.view.is_none() {
                output::table::print_predictions(
                    &presentation::predictions(result),
                    args.show_predictions,
                );
            }
            if args.view.is_none() {
                output::table::print_recommendations(result);
            }
            if let Some(path) = &report_path {
                println!("Report saved to {}", path.display());
            }
        }
    }

    Ok(())
}

fn save_preview(analyzed: &Analyzed, path: &Path) -> Result<(), EcoConvertError> {
    match analyzed {
        Analyzed::Image(session, _) => match session.selected() {
            Some(image) => image.save_preview(path),
            None => Ok(()),
        },
        Analyzed::Predictions(_) => {
            tracing::warn!("--preview ignored: input is a predictions file, not an image");
            Ok(())
        }
    }
}
