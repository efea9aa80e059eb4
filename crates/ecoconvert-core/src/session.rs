use crate::classifier::{ClassifierHandle, ModelState};
use crate::error::{EcoConvertError, FailureKind};
use crate::knowledge::schema::KnowledgeBase;
use crate::model::AnalysisResult;
use crate::report::{self, GeneratedReport};
use crate::upload::{SelectedImage, UploadController};
use chrono::NaiveDateTime;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError, TryLockError};

/// Failure recorded by the last session operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionError {
    pub kind: FailureKind,
    pub message: String,
}

impl From<&EcoConvertError> for SessionError {
    fn from(e: &EcoConvertError) -> Self {
        Self {
            kind: e.kind(),
            message: e.to_string(),
        }
    }
}

/// Clears its flag when dropped.
struct BusyGuard<'a>(&'a AtomicBool);

impl<'a> BusyGuard<'a> {
    fn acquire(flag: &'a AtomicBool, what: &'static str) -> Result<Self, EcoConvertError> {
        if flag
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(EcoConvertError::Busy(what));
        }
        Ok(Self(flag))
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// One user's analysis workflow: selected image, classifier, and the latest
/// result.
///
/// Analysis and report generation each run at most once at a time; a second
/// request while one is in flight fails with [`EcoConvertError::Busy`].
/// Selecting or removing an image discards the current analysis.
pub struct Session {
    kb: KnowledgeBase,
    classifier: Mutex<ClassifierHandle>,
    /// Last observed classifier state, answered while an analysis holds the
    /// classifier.
    model_state: Mutex<ModelState>,
    upload: Mutex<UploadController>,
    analysis: Mutex<Option<AnalysisResult>>,
    last_error: Mutex<Option<SessionError>>,
    /// Bumped on every selection change so a stale analysis is dropped.
    selection: AtomicU64,
    is_loading: AtomicBool,
    report_generating: AtomicBool,
}

impl Session {
    pub fn new(classifier: ClassifierHandle, kb: KnowledgeBase) -> Self {
        Self {
            kb,
            model_state: Mutex::new(classifier.state()),
            classifier: Mutex::new(classifier),
            upload: Mutex::new(UploadController::new()),
            analysis: Mutex::new(None),
            last_error: Mutex::new(None),
            selection: AtomicU64::new(0),
            is_loading: AtomicBool::new(false),
            report_generating: AtomicBool::new(false),
        }
    }

    pub fn knowledge_base(&self) -> &KnowledgeBase {
        &self.kb
    }

    /// Begin loading the model in the background.
    pub fn start_model_load(&self) {
        let mut classifier = lock(&self.classifier);
        classifier.start_load();
        self.remember_state(&classifier);
    }

    /// Readiness of the model. Never waits on a running analysis.
    pub fn model_state(&self) -> ModelState {
        let mut classifier = match self.classifier.try_lock() {
            Ok(guard) => guard,
            Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
            Err(TryLockError::WouldBlock) => return lock(&self.model_state).clone(),
        };
        classifier.poll();
        self.remember_state(&classifier)
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading.load(Ordering::Acquire)
    }

    pub fn is_generating_report(&self) -> bool {
        self.report_generating.load(Ordering::Acquire)
    }

    pub fn last_error(&self) -> Option<SessionError> {
        lock(&self.last_error).clone()
    }

    pub fn analysis(&self) -> Option<AnalysisResult> {
        lock(&self.analysis).clone()
    }

    pub fn selected(&self) -> Option<SelectedImage> {
        lock(&self.upload).current().cloned()
    }

    pub fn select_path(&self, path: &Path) -> Result<(), EcoConvertError> {
        let outcome = lock(&self.upload).select_path(path).map(|_| ());
        self.after_selection(outcome)
    }

    pub fn select_bytes(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
        mime: Option<&str>,
    ) -> Result<(), EcoConvertError> {
        let outcome = lock(&self.upload)
            .select_bytes(file_name, bytes, mime)
            .map(|_| ());
        self.after_selection(outcome)
    }

    pub fn remove_image(&self) -> Option<SelectedImage> {
        let removed = lock(&self.upload).remove();
        self.clear_analysis();
        removed
    }

    /// Classify the selected image and map the predictions onto waste
    /// categories. The selection is kept whatever the outcome.
    pub fn analyze(&self) -> Result<AnalysisResult, EcoConvertError> {
        let _busy = BusyGuard::acquire(&self.is_loading, "image analysis")?;
        let outcome = self.run_analysis();
        self.record(outcome)
    }

    /// Render the current analysis as a PDF.
    pub fn generate_report(
        &self,
        generated_at: NaiveDateTime,
    ) -> Result<GeneratedReport, EcoConvertError> {
        let _busy = BusyGuard::acquire(&self.report_generating, "report generation")?;
        let outcome = self
            .current_analysis()
            .and_then(|r| report::generate_report(&r, generated_at));
        self.record(outcome)
    }

    /// Render the current analysis and save it into `dir`.
    pub fn save_report(
        &self,
        dir: &Path,
        generated_at: NaiveDateTime,
    ) -> Result<PathBuf, EcoConvertError> {
        let _busy = BusyGuard::acquire(&self.report_generating, "report generation")?;
        let outcome = self
            .current_analysis()
            .and_then(|r| report::generate_report(&r, generated_at))
            .and_then(|generated| report::write_report(&generated, dir));
        self.record(outcome)
    }

    fn run_analysis(&self) -> Result<AnalysisResult, EcoConvertError> {
        let generation = self.selection.load(Ordering::Acquire);
        let image = self.selected().ok_or_else(|| EcoConvertError::InvalidInput {
            name: String::new(),
            reason: "no image selected".into(),
        })?;

        let result = {
            let mut classifier = lock(&self.classifier);
            classifier.start_load();
            self.remember_state(&classifier);
            let outcome = crate::analyze_image(&image, &mut classifier, &self.kb);
            self.remember_state(&classifier);
            outcome?
        };
        tracing::info!(
            file = image.file_name(),
            is_waste = result.is_waste,
            categories = %result.category_list(),
            "analysis complete"
        );

        if self.selection.load(Ordering::Acquire) == generation {
            *lock(&self.analysis) = Some(result.clone());
        } else {
            tracing::debug!("selection changed during analysis; result not kept");
        }
        Ok(result)
    }

    fn remember_state(&self, classifier: &ClassifierHandle) -> ModelState {
        let state = classifier.state();
        *lock(&self.model_state) = state.clone();
        state
    }

    fn current_analysis(&self) -> Result<AnalysisResult, EcoConvertError> {
        self.analysis()
            .ok_or_else(|| EcoConvertError::ReportUnavailable("no analysis has been run".into()))
    }

    fn after_selection(
        &self,
        outcome: Result<(), EcoConvertError>,
    ) -> Result<(), EcoConvertError> {
        if outcome.is_ok() {
            self.clear_analysis();
        }
        self.record(outcome)
    }

    fn clear_analysis(&self) {
        self.selection.fetch_add(1, Ordering::AcqRel);
        *lock(&self.analysis) = None;
        *lock(&self.last_error) = None;
    }

    fn record<T>(&self, outcome: Result<T, EcoConvertError>) -> Result<T, EcoConvertError> {
        *lock(&self.last_error) = outcome.as_ref().err().map(SessionError::from);
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::precomputed::PrecomputedClassifier;
    use crate::knowledge::builtin::knowledge_base;
    use crate::model::{Prediction, WasteCategory};
    use chrono::NaiveDate;
    use image::{DynamicImage, ImageFormat};
    use std::io::Cursor;
    use std::sync::Arc;

    fn png() -> Vec<u8> {
        let mut buf = Cursor::new(Vec::new());
        DynamicImage::new_rgb8(8, 8)
            .write_to(&mut buf, ImageFormat::Png)
            .unwrap();
        buf.into_inner()
    }

    fn session(labels: &[(&str, f64)]) -> Session {
        let predictions = labels.iter().map(|(l, c)| Prediction::new(*l, *c)).collect();
        let handle = ClassifierHandle::new(Arc::new(PrecomputedClassifier::new(predictions)));
        Session::new(handle, knowledge_base().clone())
    }

    fn at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, 1)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap()
    }

    #[test]
    fn test_analyze_without_image_is_invalid_input() {
        let s = session(&[("tin can", 0.9)]);
        let err = s.analyze().unwrap_err();
        assert_eq!(err.kind(), FailureKind::InvalidInput);
        assert_eq!(s.last_error().unwrap().kind, FailureKind::InvalidInput);
        assert!(!s.is_loading());
    }

    #[test]
    fn test_analyze_stores_result() {
        let s = session(&[("tin can", 0.9)]);
        s.select_bytes("can.png", png(), Some("image/png")).unwrap();
        let result = s.analyze().unwrap();
        assert_eq!(result.waste_categories, vec![WasteCategory::Metal]);
        assert_eq!(s.analysis(), Some(result));
        assert!(s.last_error().is_none());
        assert_eq!(s.model_state(), ModelState::Ready);
    }

    #[test]
    fn test_new_selection_clears_analysis() {
        let s = session(&[("tin can", 0.9)]);
        s.select_bytes("a.png", png(), None).unwrap();
        s.analyze().unwrap();
        s.select_bytes("b.png", png(), None).unwrap();
        assert!(s.analysis().is_none());

        s.analyze().unwrap();
        assert!(s.remove_image().is_some());
        assert!(s.analysis().is_none());
        assert!(s.selected().is_none());
    }

    #[test]
    fn test_rejected_selection_keeps_analysis() {
        let s = session(&[("tin can", 0.9)]);
        s.select_bytes("a.png", png(), None).unwrap();
        s.analyze().unwrap();
        let err = s.select_bytes("notes.txt", b"hello".to_vec(), Some("text/plain")).unwrap_err();
        assert_eq!(err.kind(), FailureKind::InvalidInput);
        assert!(s.analysis().is_some());
        assert_eq!(s.selected().unwrap().file_name(), "a.png");
    }

    #[test]
    fn test_report_requires_waste_analysis() {
        let s = session(&[("cat", 0.92), ("keyboard", 0.04)]);
        assert!(matches!(
            s.generate_report(at()),
            Err(EcoConvertError::ReportUnavailable(_))
        ));
        s.select_bytes("cat.png", png(), None).unwrap();
        let result = s.analyze().unwrap();
        assert!(!result.is_waste);
        let err = s.generate_report(at()).unwrap_err();
        assert_eq!(err.kind(), FailureKind::ReportFailed);
        assert!(!s.is_generating_report());
    }

    #[test]
    fn test_save_report() {
        let dir = tempfile::tempdir().unwrap();
        let s = session(&[("water bottle", 0.7)]);
        s.select_bytes("bottle.png", png(), None).unwrap();
        s.analyze().unwrap();
        let path = s.save_report(dir.path(), at()).unwrap();
        assert!(path.ends_with("EcoConvert_Analysis_20250601_093000.pdf"));
        assert!(std::fs::read(path).unwrap().starts_with(b"%PDF"));
    }

    #[test]
    fn test_busy_flag_rejects_reentry() {
        let flag = AtomicBool::new(false);
        let guard = BusyGuard::acquire(&flag, "image analysis").unwrap();
        assert!(matches!(
            BusyGuard::acquire(&flag, "image analysis"),
            Err(EcoConvertError::Busy("image analysis"))
        ));
        drop(guard);
        assert!(BusyGuard::acquire(&flag, "image analysis").is_ok());
    }
}
