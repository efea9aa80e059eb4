use super::{parse_predictions, ImageClassifier, ModelLoader};
use crate::error::EcoConvertError;
use crate::model::Prediction;
use crate::upload::SelectedImage;
use std::path::Path;

/// Returns the same predictions for every image. Used for pre-computed
/// classifier output.
#[derive(Debug, Clone)]
pub struct PrecomputedClassifier {
    predictions: Vec<Prediction>,
}

impl PrecomputedClassifier {
    pub fn new(predictions: Vec<Prediction>) -> Self {
        Self { predictions }
    }

    /// Read predictions from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, EcoConvertError> {
        let bytes = std::fs::read(path)?;
        Ok(Self::new(parse_predictions(&bytes)?))
    }

    pub fn predictions(&self) -> &[Prediction] {
        &self.predictions
    }
}

impl ModelLoader for PrecomputedClassifier {
    fn load(&self) -> Result<Box<dyn ImageClassifier>, EcoConvertError> {
        Ok(Box::new(self.clone()))
    }

    fn backend_name(&self) -> &str {
        "precomputed"
    }
}

impl ImageClassifier for PrecomputedClassifier {
    fn classify(&self, _image: &SelectedImage) -> Result<Vec<Prediction>, EcoConvertError> {
        Ok(self.predictions.clone())
    }

    fn backend_name(&self) -> &str {
        "precomputed"
    }
}
