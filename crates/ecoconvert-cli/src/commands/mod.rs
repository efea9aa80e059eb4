pub mod analyze;
pub mod knowledge;
pub mod report;

use crate::config::Settings;
use ecoconvert_core::classifier::precomputed::PrecomputedClassifier;
use ecoconvert_core::error::EcoConvertError;
use ecoconvert_core::knowledge::builtin;
use ecoconvert_core::knowledge::schema::KnowledgeBase;
use ecoconvert_core::model::AnalysisResult;
use ecoconvert_core::session::Session;
use std::path::{Path, PathBuf};

/// Options shared by every subcommand.
pub struct Context {
    pub settings: Settings,
    /// `--knowledge-base`, taking precedence over the config file.
    pub knowledge_base: Option<PathBuf>,
}

impl Context {
    pub fn knowledge_base(&self) -> Result<KnowledgeBase, EcoConvertError> {
        match self
            .knowledge_base
            .as_deref()
            .or(self.settings.knowledge_base.as_deref())
        {
            Some(path) => ecoconvert_core::knowledge::load_knowledge_base(path),
            None => Ok(builtin::knowledge_base().clone()),
        }
    }
}

/// What an input file turned into.
pub enum Analyzed {
    /// Classified from an image; the session still holds the selection.
    Image(Session, AnalysisResult),
    /// Mapped from a pre-computed predictions file.
    Predictions(AnalysisResult),
}

impl Analyzed {
    pub fn result(&self) -> &AnalysisResult {
        match self {
            Analyzed::Image(_, result) | Analyzed::Predictions(result) => result,
        }
    }
}

fn is_predictions_file(input: &Path) -> bool {
    input
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false)
}

/// Analyze an image, or map a `.json` predictions file without running the
/// classifier.
pub fn analyze_input(input: &Path, ctx: &Context) -> Result<Analyzed, EcoConvertError> {
    let kb = ctx.knowledge_base()?;

    if is_predictions_file(input) {
        let precomputed = PrecomputedClassifier::from_file(input)?;
        let result = ecoconvert_core::analyze_predictions(precomputed.predictions(), &kb);
        return Ok(Analyzed::Predictions(result));
    }

    let session = Session::new(ctx.settings.classifier.handle(), kb);
    // Load the model in the background while the image decodes.
    session.start_model_load();
    session.select_path(input)?;
    let result = session.analyze()?;
    Ok(Analyzed::Image(session, result))
}
