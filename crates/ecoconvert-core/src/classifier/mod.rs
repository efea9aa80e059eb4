pub mod command;
pub mod handle;
pub mod precomputed;

use crate::error::EcoConvertError;
use crate::model::Prediction;
use crate::upload::SelectedImage;
use serde::Deserialize;

pub use handle::{ClassifierHandle, ModelState};

/// Default number of predictions kept from a classifier run.
pub const DEFAULT_TOP_K: usize = 3;

/// A loaded image classifier.
pub trait ImageClassifier: Send + Sync {
    /// Label an image, most confident prediction first.
    fn classify(&self, image: &SelectedImage) -> Result<Vec<Prediction>, EcoConvertError>;

    /// Name of this classification backend (for diagnostics).
    fn backend_name(&self) -> &str;
}

/// Produces a ready classifier. Loading may be slow and is run at most once
/// per successful load.
pub trait ModelLoader: Send + Sync {
    fn load(&self) -> Result<Box<dyn ImageClassifier>, EcoConvertError>;

    fn backend_name(&self) -> &str;
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PredictionsDocument {
    List(Vec<Prediction>),
    Wrapped { predictions: Vec<Prediction> },
}

/// Parse classifier output: either a bare array of predictions or an object
/// with a `predictions` array.
pub fn parse_predictions(json: &[u8]) -> Result<Vec<Prediction>, EcoConvertError> {
    let doc: PredictionsDocument = serde_json::from_slice(json)
        .map_err(|e| EcoConvertError::Classification(format!("unreadable predictions: {e}")))?;
    let predictions = match doc {
        PredictionsDocument::List(p) => p,
        PredictionsDocument::Wrapped { predictions } => predictions,
    };

    if let Some(bad) = predictions
        .iter()
        .find(|p| !p.confidence.is_finite() || !(0.0..=1.0).contains(&p.confidence))
    {
        return Err(EcoConvertError::Classification(format!(
            "confidence {} for '{}' is outside [0, 1]",
            bad.confidence, bad.label
        )));
    }

    Ok(predictions)
}
