//! Integration tests for the image -> analysis -> report pipeline.
//!
//! Uses a MockLoader that hands out canned predictions without running a
//! real classifier, so these tests need no model or external program.

use chrono::{NaiveDate, NaiveDateTime};
use ecoconvert_core::classifier::{ClassifierHandle, ImageClassifier, ModelLoader, ModelState};
use ecoconvert_core::error::{EcoConvertError, FailureKind};
use ecoconvert_core::knowledge::builtin::knowledge_base;
use ecoconvert_core::model::{Prediction, WasteCategory};
use ecoconvert_core::session::Session;
use ecoconvert_core::upload::SelectedImage;
use ecoconvert_core::{analyze_image, analyze_predictions, presentation, report};
use image::{DynamicImage, ImageFormat};
use std::io::Cursor;
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::time::Duration;

struct MockClassifier {
    predictions: Vec<Prediction>,
    fail: bool,
}

impl ImageClassifier for MockClassifier {
    fn classify(&self, _image: &SelectedImage) -> Result<Vec<Prediction>, EcoConvertError> {
        if self.fail {
            return Err(EcoConvertError::Classification("tensor shape mismatch".into()));
        }
        Ok(self.predictions.clone())
    }

    fn backend_name(&self) -> &str {
        "mock"
    }
}

struct MockLoader {
    predictions: Vec<Prediction>,
    fail_load: bool,
    fail_classify: bool,
}

impl MockLoader {
    fn returning(labels: &[(&str, f64)]) -> Arc<Self> {
        Arc::new(Self {
            predictions: predictions(labels),
            fail_load: false,
            fail_classify: false,
        })
    }
}

impl ModelLoader for MockLoader {
    fn load(&self) -> Result<Box<dyn ImageClassifier>, EcoConvertError> {
        if self.fail_load {
            return Err(EcoConvertError::ModelUnavailable("network unreachable".into()));
        }
        Ok(Box::new(MockClassifier {
            predictions: self.predictions.clone(),
            fail: self.fail_classify,
        }))
    }

    fn backend_name(&self) -> &str {
        "mock"
    }
}

fn predictions(labels: &[(&str, f64)]) -> Vec<Prediction> {
    labels.iter().map(|(l, c)| Prediction::new(*l, *c)).collect()
}

fn png() -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    DynamicImage::new_rgb8(16, 12)
        .write_to(&mut buf, ImageFormat::Png)
        .unwrap();
    buf.into_inner()
}

fn at() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 4, 22)
        .unwrap()
        .and_hms_opt(10, 15, 30)
        .unwrap()
}

fn session(loader: Arc<dyn ModelLoader>) -> Session {
    Session::new(ClassifierHandle::new(loader), knowledge_base().clone())
}

// ---------------------------------------------------------------------------
// Scenario: no waste keyword, no report offered
// ---------------------------------------------------------------------------
#[test]
fn cat_and_keyboard_is_not_waste() {
    let result = analyze_predictions(
        &predictions(&[("cat", 0.92), ("keyboard", 0.04)]),
        knowledge_base(),
    );

    assert!(!result.is_waste);
    assert!(result.waste_categories.is_empty());
    assert!(result.category_details.is_empty());
    assert!(result.recommendations.is_empty());
    assert!(!result.has_report());
    assert!(matches!(
        report::generate_report(&result, at()),
        Err(EcoConvertError::ReportUnavailable(_))
    ));
}

// ---------------------------------------------------------------------------
// Scenario: plastic only
// ---------------------------------------------------------------------------
#[test]
fn plastic_bag_recommends_plastic_methods_in_order() {
    let kb = knowledge_base();
    let result =
        analyze_predictions(&predictions(&[("plastic bag", 0.81), ("shopping bag", 0.1)]), kb);

    assert!(result.is_waste);
    assert_eq!(result.waste_categories, vec![WasteCategory::Plastic]);
    assert_eq!(result.recommendations.as_slice(), kb.methods(WasteCategory::Plastic));
    assert_eq!(result.recommendations.len(), 3);
}

// "bottle" is a keyword of both plastic and glass, so a plastic bottle also
// picks up the glass methods after the plastic ones.
#[test]
fn plastic_bottle_matches_plastic_then_glass() {
    let kb = knowledge_base();
    let result = analyze_predictions(
        &predictions(&[("plastic bottle", 0.81), ("water bottle", 0.10)]),
        kb,
    );

    assert!(result.is_waste);
    assert_eq!(result.waste_categories, vec![WasteCategory::Plastic, WasteCategory::Glass]);
    let plastic = kb.methods(WasteCategory::Plastic);
    assert_eq!(&result.recommendations[..plastic.len()], plastic);
    assert_eq!(
        result.recommendations.len(),
        plastic.len() + kb.methods(WasteCategory::Glass).len()
    );
}

// ---------------------------------------------------------------------------
// Scenario: paper and bottles
// ---------------------------------------------------------------------------
#[test]
fn paper_and_bottles_yield_each_category_once() {
    let result = analyze_predictions(
        &predictions(&[
            ("paper towel", 0.4),
            ("water bottle", 0.3),
            ("beer bottle", 0.2),
            ("envelope paper", 0.1),
        ]),
        knowledge_base(),
    );

    assert_eq!(
        result.waste_categories,
        vec![WasteCategory::Organic, WasteCategory::Plastic, WasteCategory::Glass]
    );
    assert_eq!(result.category_details.len(), 3);
    for category in &result.waste_categories {
        assert_eq!(result.waste_categories.iter().filter(|c| *c == category).count(), 1);
    }
}

// ---------------------------------------------------------------------------
// Full pipeline through a session
// ---------------------------------------------------------------------------
#[test]
fn session_analyze_view_and_report() {
    let dir = tempfile::tempdir().unwrap();
    let s = session(MockLoader::returning(&[
        ("tin can", 0.55),
        ("ashcan, trash can, garbage can", 0.25),
        ("cellular telephone", 0.2),
    ]));
    s.start_model_load();
    s.select_bytes("photo.png", png(), Some("image/png")).unwrap();

    let result = s.analyze().unwrap();
    assert!(result.is_waste);
    assert_eq!(result.waste_categories[0], WasteCategory::Metal);
    assert!(result.waste_categories.contains(&WasteCategory::Electronic));
    assert_eq!(s.model_state(), ModelState::Ready);

    let view = presentation::predictions(&result);
    assert_eq!(view.top[1].label, "ashcan");
    assert_eq!(view.top[1].percent, "25.0");

    let path = s.save_report(dir.path(), at()).unwrap();
    assert_eq!(
        path.file_name().unwrap().to_string_lossy(),
        "EcoConvert_Analysis_20250422_101530.pdf"
    );
    let bytes = std::fs::read(&path).unwrap();
    assert!(bytes.starts_with(b"%PDF-1.4"));
    assert_eq!(bytes, s.generate_report(at()).unwrap().bytes);
}

#[test]
fn analyze_image_without_session() {
    let image = SelectedImage::decode("bin.png", png()).unwrap();
    let mut handle = ClassifierHandle::new(MockLoader::returning(&[("waste container", 0.6)]));
    let result = analyze_image(&image, &mut handle, knowledge_base()).unwrap();
    assert!(result.is_waste);
    assert_eq!(result.waste_categories, vec![WasteCategory::Plastic]);
}

// ---------------------------------------------------------------------------
// Failure paths
// ---------------------------------------------------------------------------
#[test]
fn model_failure_is_reported_and_selection_kept() {
    let s = session(Arc::new(MockLoader {
        predictions: vec![],
        fail_load: true,
        fail_classify: false,
    }));
    s.select_bytes("photo.png", png(), None).unwrap();

    let err = s.analyze().unwrap_err();
    assert_eq!(err.kind(), FailureKind::ModelUnavailable);
    assert!(err.to_string().contains("network unreachable"));
    assert_eq!(s.last_error().unwrap().kind, FailureKind::ModelUnavailable);
    assert!(s.selected().is_some());
    assert!(s.analysis().is_none());
    assert!(matches!(s.model_state(), ModelState::Failed(_)));
}

#[test]
fn classification_failure_keeps_selection() {
    let s = session(Arc::new(MockLoader {
        predictions: vec![],
        fail_load: false,
        fail_classify: true,
    }));
    s.select_bytes("photo.png", png(), None).unwrap();

    let err = s.analyze().unwrap_err();
    assert_eq!(err.kind(), FailureKind::ClassificationFailed);
    assert!(s.selected().is_some());
    assert!(!s.is_loading());

    // Retrying repeats the failure rather than hanging or panicking.
    assert_eq!(s.analyze().unwrap_err().kind(), FailureKind::ClassificationFailed);
}

#[test]
fn non_image_selection_is_rejected() {
    let s = session(MockLoader::returning(&[("tin can", 0.9)]));
    let err = s
        .select_bytes("report.pdf", b"%PDF-1.7".to_vec(), Some("application/pdf"))
        .unwrap_err();
    assert_eq!(err.kind(), FailureKind::InvalidInput);

    let err = s.select_bytes("fake.png", b"not an image".to_vec(), None).unwrap_err();
    assert_eq!(err.kind(), FailureKind::InvalidInput);
    assert!(s.selected().is_none());
}

// ---------------------------------------------------------------------------
// Concurrency: a second analysis while one is in flight is rejected
// ---------------------------------------------------------------------------
struct BlockingLoader {
    entered: Mutex<mpsc::Sender<()>>,
    release: Mutex<mpsc::Receiver<()>>,
}

struct BlockingClassifier {
    loader: Arc<BlockingLoader>,
}

impl ImageClassifier for BlockingClassifier {
    fn classify(&self, _image: &SelectedImage) -> Result<Vec<Prediction>, EcoConvertError> {
        self.loader.entered.lock().unwrap().send(()).unwrap();
        self.loader
            .release
            .lock()
            .unwrap()
            .recv_timeout(Duration::from_secs(5))
            .unwrap();
        Ok(predictions(&[("tin can", 0.9)]))
    }

    fn backend_name(&self) -> &str {
        "blocking"
    }
}

struct SharedBlockingLoader(Arc<BlockingLoader>);

impl ModelLoader for SharedBlockingLoader {
    fn load(&self) -> Result<Box<dyn ImageClassifier>, EcoConvertError> {
        Ok(Box::new(BlockingClassifier {
            loader: Arc::clone(&self.0),
        }))
    }

    fn backend_name(&self) -> &str {
        "blocking"
    }
}

#[test]
fn concurrent_analysis_is_busy() {
    let (entered_tx, entered_rx) = mpsc::channel();
    let (release_tx, release_rx) = mpsc::channel();
    let loader = Arc::new(BlockingLoader {
        entered: Mutex::new(entered_tx),
        release: Mutex::new(release_rx),
    });
    let s = Arc::new(session(Arc::new(SharedBlockingLoader(loader))));
    s.select_bytes("photo.png", png(), None).unwrap();

    let background = {
        let s = Arc::clone(&s);
        std::thread::spawn(move || s.analyze())
    };
    entered_rx.recv_timeout(Duration::from_secs(5)).unwrap();

    assert!(s.is_loading());
    assert!(matches!(s.analyze(), Err(EcoConvertError::Busy(_))));

    release_tx.send(()).unwrap();
    let result = background.join().unwrap().unwrap();
    assert_eq!(result.waste_categories, vec![WasteCategory::Metal]);
    assert!(!s.is_loading());
}

#[test]
fn model_state_answers_while_analysis_runs() {
    let (entered_tx, entered_rx) = mpsc::channel();
    let (release_tx, release_rx) = mpsc::channel();
    let loader = Arc::new(BlockingLoader {
        entered: Mutex::new(entered_tx),
        release: Mutex::new(release_rx),
    });
    let s = Arc::new(session(Arc::new(SharedBlockingLoader(loader))));
    s.select_bytes("photo.png", png(), None).unwrap();

    let background = {
        let s = Arc::clone(&s);
        std::thread::spawn(move || s.analyze())
    };
    entered_rx.recv_timeout(Duration::from_secs(5)).unwrap();

    // The running analysis holds the classifier; the status read must not wait for it.
    let (state_tx, state_rx) = mpsc::channel();
    {
        let s = Arc::clone(&s);
        std::thread::spawn(move || state_tx.send(s.model_state()).unwrap());
    }
    let state = state_rx.recv_timeout(Duration::from_secs(2));

    release_tx.send(()).unwrap();
    background.join().unwrap().unwrap();
    assert_eq!(state, Ok(ModelState::Ready));
    assert_eq!(s.model_state(), ModelState::Ready);
}
