use ecoconvert_core::classifier::command::CommandClassifier;
use ecoconvert_core::classifier::{handle::DEFAULT_LOAD_TIMEOUT, ClassifierHandle, DEFAULT_TOP_K};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Settings file picked up from the working directory when `--config` is absent.
pub const CONFIG_FILE_NAME: &str = "ecoconvert.toml";
/// Program run for image classification unless configured otherwise.
pub const DEFAULT_CLASSIFIER_PROGRAM: &str = "ecoconvert-classifier";
pub const DEFAULT_OUTPUT_DIR: &str = ".";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    ParseToml {
        path: PathBuf,
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Knowledge-base JSON replacing the built-in one.
    pub knowledge_base: Option<PathBuf>,
    pub classifier: ClassifierSettings,
    pub report: ReportSettings,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ClassifierSettings {
    pub program: String,
    pub args: Vec<String>,
    pub load_timeout_secs: u64,
    /// Predictions kept per image. 0 keeps all of them.
    pub top_k: usize,
}

impl Default for ClassifierSettings {
    fn default() -> Self {
        Self {
            program: DEFAULT_CLASSIFIER_PROGRAM.into(),
            args: Vec::new(),
            load_timeout_secs: DEFAULT_LOAD_TIMEOUT.as_secs(),
            top_k: DEFAULT_TOP_K,
        }
    }
}

impl ClassifierSettings {
    /// Handle for the configured classifier program. Nothing is run yet.
    pub fn handle(&self) -> ClassifierHandle {
        let loader = CommandClassifier::new(self.program.clone(), self.args.clone());
        ClassifierHandle::new(Arc::new(loader))
            .with_timeout(Duration::from_secs(self.load_timeout_secs))
            .with_top_k((self.top_k > 0).then_some(self.top_k))
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ReportSettings {
    pub output_dir: PathBuf,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
        }
    }
}

/// Load settings from `explicit`, or from `ecoconvert.toml` in the working
/// directory if it exists. Defaults apply when no file is found.
pub fn load(explicit: Option<&Path>) -> Result<Settings, ConfigError> {
    match explicit {
        Some(path) => load_from(path),
        None => {
            let path = Path::new(CONFIG_FILE_NAME);
            if path.exists() {
                load_from(path)
            } else {
                Ok(Settings::default())
            }
        }
    }
}

pub fn load_from(path: &Path) -> Result<Settings, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let settings: Settings = toml::from_str(&text).map_err(|source| ConfigError::ParseToml {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(path = %path.display(), "loaded settings");
    Ok(settings)
}
