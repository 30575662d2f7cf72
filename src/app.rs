//! Application Coordinator
//!
//! Loads the dataset and wires the configured camera and recognizer into a
//! scan session.

use std::sync::Arc;
use tracing::{info, warn};

use crate::capture::CameraSource;
use crate::config::AppConfig;
use crate::matching;
use crate::region::FocusRegion;
use crate::report;
use crate::session::{Phase, ScanOutcome, Session, SessionSettings, SessionView, UiAction};
use crate::storage::{self, Dataset};
use crate::vision::{TesseractRecognizer, TextRecognizer};

/// Main application coordinator
pub struct QuizLensApp {
    config: AppConfig,
    dataset: Arc<Dataset>,
}

impl QuizLensApp {
    /// Load the configured dataset. A failed load leaves the dataset empty.
    pub async fn new(config: AppConfig) -> Self {
        let location = storage::resolve_dataset_location(&config.general.dataset);
        info!("Loading dataset from {}", location);
        let dataset = Dataset::load_or_empty(&location).await;
        if dataset.is_empty() {
            warn!("Dataset is empty, every scan will report no match");
        }

        Self::with_dataset(config, dataset)
    }

    /// Use an already-loaded dataset
    pub fn with_dataset(config: AppConfig, dataset: Dataset) -> Self {
        Self {
            config,
            dataset: Arc::new(dataset),
        }
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    /// Create a session using the configured Tesseract recognizer
    pub fn session(&self, camera: Arc<dyn CameraSource>) -> Session {
        let recognizer = Arc::new(TesseractRecognizer::new(self.config.ocr.tesseract_path.clone()));
        self.session_with(camera, recognizer)
    }

    pub fn session_with(&self, camera: Arc<dyn CameraSource>, recognizer: Arc<dyn TextRecognizer>) -> Session {
        Session::new(
            SessionSettings::from_config(&self.config),
            camera,
            recognizer,
            self.dataset.clone(),
        )
    }

    /// Match text directly, without camera or OCR
    pub fn match_text(&self, text: &str) -> String {
        let matched = matching::find_question(self.dataset.questions(), text).cloned();
        let outcome = if matched.is_some() {
            ScanOutcome::Matched
        } else {
            ScanOutcome::NoMatch
        };
        let view = SessionView {
            phase: Phase::ResultShown,
            region: FocusRegion::at_origin(self.config.region.width, self.config.region.height),
            photo_size: None,
            matched,
            ocr_text: text.to_string(),
            outcome: Some(outcome),
            busy: false,
            result_visible: true,
            notification: None,
        };
        report::render(&view)
    }

    /// Run one capture cycle and return the rendered result.
    ///
    /// `pointer` optionally drags the focus region so it is centered on that
    /// display position before processing.
    pub async fn scan_once(&self, session: &mut Session, pointer: Option<(f32, f32)>) -> anyhow::Result<String> {
        session.dispatch(UiAction::StartCapture).await?;
        if let Some(message) = session.notification() {
            anyhow::bail!("{}", message);
        }

        session.dispatch(UiAction::TakePhoto).await?;
        if let Some(message) = session.notification() {
            anyhow::bail!("{}", message);
        }

        if let Some((x, y)) = pointer {
            session.dispatch(UiAction::DragStart).await?;
            session.dispatch(UiAction::DragMove { x, y }).await?;
            session.dispatch(UiAction::DragEnd).await?;
        }
        let view = session.view();
        info!("Focus region {:?} over {:?} photo", view.region, view.photo_size);

        session.dispatch(UiAction::Process).await?;
        let rendered = report::render(&session.view());
        session.dispatch(UiAction::CloseResult).await?;

        Ok(rendered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::tests::{dataset, FakeCamera, FakeRecognizer};

    fn app() -> QuizLensApp {
        let dataset = Arc::try_unwrap(dataset()).unwrap();
        QuizLensApp::with_dataset(AppConfig::default(), dataset)
    }

    #[test]
    fn test_match_text() {
        let app = app();
        let found = app.match_text("Вопрос: столица России?");
        assert!(found.contains("✅ Вопрос найден!"));
        assert!(found.contains("Москва ✅"));

        let missing = app.match_text("какой город есть");
        assert!(missing.contains("не найден"));
    }

    #[tokio::test]
    async fn test_scan_once() {
        let app = app();
        let mut session = app.session_with(
            Arc::new(FakeCamera::default()),
            Arc::new(FakeRecognizer::text("столица россии")),
        );

        let rendered = app.scan_once(&mut session, Some((200.0, 150.0))).await.unwrap();
        assert!(rendered.contains("ID: 1"));
        assert_eq!(session.phase(), Phase::Captured);
    }

    #[tokio::test]
    async fn test_scan_once_recognition_failure_is_not_a_miss() {
        let app = app();
        let mut session = app.session_with(Arc::new(FakeCamera::default()), Arc::new(FakeRecognizer::failing()));

        let rendered = app.scan_once(&mut session, None).await.unwrap();
        assert!(rendered.contains(&app.config.ocr.failure_text));
        assert!(!rendered.contains("не найден"));
    }

    #[tokio::test]
    async fn test_scan_once_reports_camera_failure() {
        let app = app();
        let camera = FakeCamera {
            fail: true,
            ..Default::default()
        };
        let mut session = app.session_with(Arc::new(camera), Arc::new(FakeRecognizer::text("")));

        let err = app.scan_once(&mut session, None).await.unwrap_err();
        assert!(err.to_string().contains("камере"));
    }

    #[tokio::test]
    async fn test_missing_dataset_degrades_to_empty() {
        let mut config = AppConfig::default();
        config.general.dataset = "/nonexistent/questions.json".to_string();

        let app = QuizLensApp::new(config).await;
        assert!(app.dataset().is_empty());
        assert!(app.match_text("столица россии").contains("не найден"));
    }
}
