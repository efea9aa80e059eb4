use std::path::PathBuf;
use std::time::Duration;

/// User-visible outcome a failure maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The classifier could not be loaded. Blocking until resolved.
    ModelUnavailable,
    /// Inference failed after the model was loaded. The selection is kept.
    ClassificationFailed,
    /// Report assembly or serialization failed. No file is produced.
    ReportFailed,
    /// The selected file is not an image.
    InvalidInput,
    Other,
}

#[derive(Debug, thiserror::Error)]
pub enum EcoConvertError {
    #[error("failed to load AI model: {0}")]
    ModelUnavailable(String),

    #[error("AI model did not finish loading within {}s", .timeout.as_secs())]
    ModelLoadTimeout { timeout: Duration },

    #[error("AI model is not ready; load it before classifying")]
    ModelNotReady,

    #[error("classifier program '{program}' not found. Set [classifier] program in the config file")]
    ClassifierNotFound { program: String },

    #[error("classifier failed with exit code {code}: {stderr}")]
    ClassifierFailed { code: i32, stderr: String },

    #[error("failed to analyze image: {0}")]
    Classification(String),

    #[error("'{name}' is not a supported image: {reason}")]
    InvalidInput { name: String, reason: String },

    #[error("failed to decode image: {0}")]
    ImageDecode(#[from] image::ImageError),

    #[error("failed to load knowledge base from {path}: {reason}")]
    KnowledgeBaseLoad { path: PathBuf, reason: String },

    #[error("invalid knowledge base: {0}")]
    KnowledgeBaseInvalid(String),

    #[error("no report available: {0}")]
    ReportUnavailable(String),

    #[error("failed to generate report: {0}")]
    ReportGeneration(String),

    #[error("{0} is already in progress")]
    Busy(&'static str),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl EcoConvertError {
    /// Classify the error into the outcome shown to the user.
    pub fn kind(&self) -> FailureKind {
        match self {
            EcoConvertError::ModelUnavailable(_)
            | EcoConvertError::ModelLoadTimeout { .. }
            | EcoConvertError::ModelNotReady
            | EcoConvertError::ClassifierNotFound { .. } => FailureKind::ModelUnavailable,
            EcoConvertError::ClassifierFailed { .. } | EcoConvertError::Classification(_) => {
                FailureKind::ClassificationFailed
            }
            EcoConvertError::InvalidInput { .. } | EcoConvertError::ImageDecode(_) => {
                FailureKind::InvalidInput
            }
            EcoConvertError::ReportUnavailable(_) | EcoConvertError::ReportGeneration(_) => {
                FailureKind::ReportFailed
            }
            EcoConvertError::KnowledgeBaseLoad { .. }
            | EcoConvertError::KnowledgeBaseInvalid(_)
            | EcoConvertError::Busy(_)
            | EcoConvertError::Io(_)
            | EcoConvertError::Json(_) => FailureKind::Other,
        }
    }
}
