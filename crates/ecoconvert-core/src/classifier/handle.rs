use super::{ImageClassifier, ModelLoader};
use crate::error::EcoConvertError;
use crate::model::Prediction;
use crate::upload::SelectedImage;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, TryRecvError};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Default bound on how long a model load may take.
pub const DEFAULT_LOAD_TIMEOUT: Duration = Duration::from_secs(60);

/// Observable readiness of the classifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelState {
    Unloaded,
    Loading,
    Ready,
    /// Load failed or timed out. Loading again retries.
    Failed(String),
}

type LoadOutcome = Result<Box<dyn ImageClassifier>, EcoConvertError>;

enum LoadFailure {
    TimedOut,
    Error(String),
}

enum Slot {
    Unloaded,
    Loading {
        rx: Receiver<LoadOutcome>,
        started: Instant,
    },
    Ready(Arc<dyn ImageClassifier>),
    Failed(LoadFailure),
}

/// Owned, lazily loaded classifier.
///
/// The load runs on a background thread so the wait can be bounded by
/// `timeout`. Repeated loads after success reuse the loaded instance.
pub struct ClassifierHandle {
    loader: Arc<dyn ModelLoader>,
    timeout: Duration,
    top_k: Option<usize>,
    slot: Slot,
}

impl ClassifierHandle {
    pub fn new(loader: Arc<dyn ModelLoader>) -> Self {
        Self {
            loader,
            timeout: DEFAULT_LOAD_TIMEOUT,
            top_k: Some(super::DEFAULT_TOP_K),
            slot: Slot::Unloaded,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Keep at most `top_k` predictions per run. `None` keeps everything.
    pub fn with_top_k(mut self, top_k: Option<usize>) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn backend_name(&self) -> &str {
        self.loader.backend_name()
    }

    pub fn state(&self) -> ModelState {
        match &self.slot {
            Slot::Unloaded => ModelState::Unloaded,
            Slot::Loading { .. } => ModelState::Loading,
            Slot::Ready(_) => ModelState::Ready,
            Slot::Failed(failure) => ModelState::Failed(self.failure_error(failure).to_string()),
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.slot, Slot::Ready(_))
    }

    /// Begin loading in the background. No-op while loading or once ready.
    pub fn start_load(&mut self) {
        if matches!(self.slot, Slot::Loading { .. } | Slot::Ready(_)) {
            return;
        }

        tracing::info!(backend = self.loader.backend_name(), "loading classifier model");
        let (tx, rx) = mpsc::channel();
        let loader = Arc::clone(&self.loader);
        let spawned = thread::Builder::new()
            .name("model-loader".into())
            .spawn(move || {
                // The receiver is gone if the wait already timed out.
                let _ = tx.send(loader.load());
            });

        self.slot = match spawned {
            Ok(_) => Slot::Loading {
                rx,
                started: Instant::now(),
            },
            Err(e) => Slot::Failed(LoadFailure::Error(format!("could not start loader: {e}"))),
        };
    }

    /// Check on a background load without blocking.
    pub fn poll(&mut self) -> ModelState {
        let outcome = match &self.slot {
            Slot::Loading { rx, started } => match rx.try_recv() {
                Ok(result) => Some(result.map_err(LoadFailure::from)),
                Err(TryRecvError::Empty) if started.elapsed() >= self.timeout => {
                    Some(Err(LoadFailure::TimedOut))
                }
                Err(TryRecvError::Empty) => None,
                Err(TryRecvError::Disconnected) => Some(Err(loader_stopped())),
            },
            _ => None,
        };
        if let Some(outcome) = outcome {
            self.settle(outcome);
        }
        self.state()
    }

    /// Load the model, waiting at most the configured timeout.
    pub fn load(&mut self) -> Result<(), EcoConvertError> {
        self.start_load();

        let outcome = match &self.slot {
            Slot::Loading { rx, started } => {
                let remaining = self.timeout.saturating_sub(started.elapsed());
                match rx.recv_timeout(remaining) {
                    Ok(result) => Some(result.map_err(LoadFailure::from)),
                    Err(RecvTimeoutError::Timeout) => Some(Err(LoadFailure::TimedOut)),
                    Err(RecvTimeoutError::Disconnected) => Some(Err(loader_stopped())),
                }
            }
            _ => None,
        };
        if let Some(outcome) = outcome {
            self.settle(outcome);
        }

        match &self.slot {
            Slot::Ready(_) => Ok(()),
            Slot::Failed(failure) => Err(self.failure_error(failure)),
            Slot::Unloaded | Slot::Loading { .. } => Err(EcoConvertError::ModelNotReady),
        }
    }

    /// Run the classifier. Fails with `ModelNotReady` unless loaded.
    pub fn classify(&self, image: &SelectedImage) -> Result<Vec<Prediction>, EcoConvertError> {
        let Slot::Ready(classifier) = &self.slot else {
            return Err(EcoConvertError::ModelNotReady);
        };

        let mut predictions = classifier.classify(image)?;
        predictions.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
        if let Some(k) = self.top_k {
            predictions.truncate(k);
        }
        tracing::debug!(
            backend = classifier.backend_name(),
            count = predictions.len(),
            "classified image"
        );
        Ok(predictions)
    }

    fn settle(&mut self, outcome: Result<Box<dyn ImageClassifier>, LoadFailure>) {
        self.slot = match outcome {
            Ok(classifier) => {
                tracing::info!(backend = classifier.backend_name(), "classifier model ready");
                Slot::Ready(Arc::from(classifier))
            }
            Err(failure) => {
                tracing::warn!(
                    error = %self.failure_error(&failure),
                    "classifier model failed to load"
                );
                Slot::Failed(failure)
            }
        };
    }

    fn failure_error(&self, failure: &LoadFailure) -> EcoConvertError {
        match failure {
            LoadFailure::TimedOut => EcoConvertError::ModelLoadTimeout {
                timeout: self.timeout,
            },
            LoadFailure::Error(msg) => EcoConvertError::ModelUnavailable(msg.clone()),
        }
    }
}

impl From<EcoConvertError> for LoadFailure {
    fn from(e: EcoConvertError) -> Self {
        match e {
            EcoConvertError::ModelUnavailable(msg) => LoadFailure::Error(msg),
            other => LoadFailure::Error(other.to_string()),
        }
    }
}

fn loader_stopped() -> LoadFailure {
    LoadFailure::Error("model loader stopped unexpectedly".into())
}
