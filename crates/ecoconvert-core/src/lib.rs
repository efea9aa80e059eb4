pub mod classifier;
pub mod classify;
pub mod error;
pub mod knowledge;
pub mod model;
pub mod presentation;
pub mod report;
pub mod session;
pub mod upload;

use classifier::ClassifierHandle;
use error::EcoConvertError;
use knowledge::schema::KnowledgeBase;
use model::{AnalysisResult, Prediction};
use upload::SelectedImage;

/// Main API entry point: classify an image and map the predictions onto the
/// waste taxonomy.
///
/// Loads the model first if needed, waiting at most the handle's timeout.
pub fn analyze_image(
    image: &SelectedImage,
    classifier: &mut ClassifierHandle,
    kb: &KnowledgeBase,
) -> Result<AnalysisResult, EcoConvertError> {
    classifier.load()?;
    let predictions = classifier.classify(image)?;
    Ok(analyze_predictions(&predictions, kb))
}

/// Map already computed predictions onto the waste taxonomy.
pub fn analyze_predictions(predictions: &[Prediction], kb: &KnowledgeBase) -> AnalysisResult {
    let result = classify::classify(predictions, kb);
    tracing::debug!(
        predictions = predictions.len(),
        is_waste = result.is_waste,
        categories = %result.category_list(),
        "mapped predictions"
    );
    result
}
