use super::{analyze_input, Analyzed, Context};
use ecoconvert_core::error::EcoConvertError;
use ecoconvert_core::report;
use std::path::{Path, PathBuf};

pub fn run(input: PathBuf, out_dir: Option<PathBuf>, ctx: &Context) -> Result<(), EcoConvertError> {
    let analyzed = analyze_input(&input, ctx)?;
    let dir = out_dir.unwrap_or_else(|| ctx.settings.report.output_dir.clone());
    let path = save(&analyzed, &dir)?;
    println!("Report saved to {}", path.display());
    Ok(())
}

/// Render and save the report for an analyzed input, stamped with the local
/// time.
pub fn save(analyzed: &Analyzed, dir: &Path) -> Result<PathBuf, EcoConvertError> {
    let now = chrono::Local::now().naive_local();
    match analyzed {
        Analyzed::Image(session, _) => session.save_report(dir, now),
        Analyzed::Predictions(result) => {
            let generated = report::generate_report(result, now)?;
            report::write_report(&generated, dir)
        }
    }
}
