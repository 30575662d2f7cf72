//! Capture session controller
//!
//! Owns everything one scan cycle needs (camera stream, photo, focus region,
//! recognized text, match) and only changes it through the transition methods
//! below:
//!
//! `Idle -> Streaming -> Captured -> Processing -> ResultShown`
//!
//! `dismiss` returns from `ResultShown` to `Captured`; `stop_capture` and a
//! failed `retake` return to `Idle`.
//!
//! Recognition runs detached from the session: [`Session::begin_process`]
//! hands out a [`RecognitionJob`] and [`Session::finish_process`] applies its
//! result. While the job runs the session reports busy, and `retake` or
//! `cancel_process` may still be called; a result arriving after either is
//! discarded. [`Session::process`] does all three in one call and puts the
//! session back to `Captured` if its future is dropped before finishing.

pub mod actions;

use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::capture::{
    decode_photo, CameraSource, CameraStream, CaptureError, CapturedPhoto, StreamRequest,
};
use crate::config::AppConfig;
use crate::matching;
use crate::region::{self, DisplayGeometry, FocusRegion, RegionSelector};
use crate::storage::{Dataset, QuestionRecord};
use crate::vision::{self, TextRecognizer};

pub use actions::UiAction;

/// Notification shown when the camera cannot be opened
pub const CAMERA_UNAVAILABLE_TEXT: &str =
    "Ошибка: Не удалось получить доступ к камере. Проверьте разрешения приложения.";

/// Where the session is in the scan cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Streaming,
    Captured,
    Processing,
    ResultShown,
}

impl Phase {
    pub fn name(&self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::Streaming => "streaming",
            Phase::Captured => "captured",
            Phase::Processing => "processing",
            Phase::ResultShown => "result",
        }
    }
}

/// How the last recognition ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanOutcome {
    /// Text was read and a question matched it
    Matched,
    /// Text was read but no question matched
    NoMatch,
    /// Decoding or OCR failed; the result text is the failure message
    RecognitionFailed,
}

/// Session transition errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("cannot {action} while {}", .phase.name())]
    InvalidTransition { action: &'static str, phase: Phase },
}

/// Session parameters taken from the application config
#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub stream: StreamRequest,
    pub jpeg_quality: u8,
    pub reference_width: f32,
    pub region_width: f32,
    pub region_height: f32,
    pub language: String,
    pub failure_text: String,
}

impl SessionSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            stream: StreamRequest {
                facing: config.capture.facing,
                ideal_width: config.capture.ideal_width,
                ideal_height: config.capture.ideal_height,
            },
            jpeg_quality: config.capture.jpeg_quality,
            reference_width: config.region.reference_width,
            region_width: config.region.width,
            region_height: config.region.height,
            language: config.ocr.language.clone(),
            failure_text: config.ocr.failure_text.clone(),
        }
    }

    fn initial_region(&self) -> FocusRegion {
        FocusRegion::at_origin(self.region_width, self.region_height)
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self::from_config(&AppConfig::default())
    }
}

/// Snapshot of everything the display layer renders
#[derive(Debug, Clone)]
pub struct SessionView {
    pub phase: Phase,
    pub region: FocusRegion,
    pub photo_size: Option<(u32, u32)>,
    pub matched: Option<QuestionRecord>,
    pub ocr_text: String,
    pub outcome: Option<ScanOutcome>,
    pub busy: bool,
    pub result_visible: bool,
    pub notification: Option<String>,
}

/// The capture session state machine
pub struct Session {
    settings: SessionSettings,
    camera: Arc<dyn CameraSource>,
    recognizer: Arc<dyn TextRecognizer>,
    dataset: Arc<Dataset>,

    phase: Phase,
    stream: Option<Box<dyn CameraStream>>,
    photo: Option<CapturedPhoto>,
    selector: RegionSelector,
    ocr_text: String,
    matched: Option<QuestionRecord>,
    outcome: Option<ScanOutcome>,
    notification: Option<String>,
}

impl Session {
    pub fn new(
        settings: SessionSettings,
        camera: Arc<dyn CameraSource>,
        recognizer: Arc<dyn TextRecognizer>,
        dataset: Arc<Dataset>,
    ) -> Self {
        let selector = initial_selector(&settings);
        Self {
            settings,
            camera,
            recognizer,
            dataset,
            phase: Phase::Idle,
            stream: None,
            photo: None,
            selector,
            ocr_text: String::new(),
            matched: None,
            outcome: None,
            notification: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_busy(&self) -> bool {
        self.phase == Phase::Processing
    }

    pub fn notification(&self) -> Option<&str> {
        self.notification.as_deref()
    }

    /// Clear a pending notification once the user has seen it
    pub fn clear_notification(&mut self) {
        self.notification = None;
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            phase: self.phase,
            region: self.selector.region(),
            photo_size: self.photo.as_ref().map(|p| p.dimensions()),
            matched: self.matched.clone(),
            ocr_text: self.ocr_text.clone(),
            outcome: self.outcome,
            busy: self.is_busy(),
            result_visible: self.phase == Phase::ResultShown,
            notification: self.notification.clone(),
        }
    }

    /// Acquire the camera. On failure the session stays idle with a notification.
    pub async fn start_capture(&mut self) -> Result<(), SessionError> {
        self.expect_phase("start capture", &[Phase::Idle])?;
        self.release_stream();

        match self.camera.open(&self.settings.stream).await {
            Ok(stream) => {
                info!("Camera stream started");
                self.stream = Some(stream);
                self.notification = None;
                self.phase = Phase::Streaming;
            }
            Err(e) => {
                warn!("Camera access failed: {}", e);
                self.notification = Some(CAMERA_UNAVAILABLE_TEXT.to_string());
            }
        }
        Ok(())
    }

    /// Release the camera without taking a photo
    pub fn stop_capture(&mut self) -> Result<(), SessionError> {
        self.expect_phase("stop capture", &[Phase::Streaming])?;
        self.release_stream();
        self.phase = Phase::Idle;
        Ok(())
    }

    /// Take a still from the stream and release the camera
    pub fn capture_photo(&mut self) -> Result<(), SessionError> {
        self.expect_phase("take a photo", &[Phase::Streaming])?;

        let grabbed = match self.stream.as_mut() {
            Some(stream) => stream.grab_frame(),
            None => Err(CaptureError::Frame("no active stream".to_string())),
        };
        let photo = grabbed.and_then(|frame| CapturedPhoto::from_frame(&frame, self.settings.jpeg_quality));
        self.release_stream();

        match photo {
            Ok(photo) => {
                let (width, height) = photo.dimensions();
                info!("Captured {}x{} photo", width, height);
                self.selector = RegionSelector::new(
                    self.settings.initial_region(),
                    DisplayGeometry::for_source(width, height, self.settings.reference_width),
                );
                self.photo = Some(photo);
                self.phase = Phase::Captured;
            }
            Err(e) => {
                warn!("Taking photo failed: {}", e);
                self.notification = Some(CAMERA_UNAVAILABLE_TEXT.to_string());
                self.phase = Phase::Idle;
            }
        }
        Ok(())
    }

    pub fn drag_start(&mut self) -> Result<(), SessionError> {
        self.expect_phase("move the focus region", &[Phase::Captured])?;
        self.selector.drag_start();
        Ok(())
    }

    /// Pointer position relative to the displayed photo's top-left corner
    pub fn drag_move(&mut self, x: f32, y: f32) -> Result<(), SessionError> {
        self.expect_phase("move the focus region", &[Phase::Captured])?;
        self.selector.drag_move(x, y);
        Ok(())
    }

    pub fn drag_end(&mut self) -> Result<(), SessionError> {
        self.expect_phase("move the focus region", &[Phase::Captured])?;
        self.selector.drag_end();
        Ok(())
    }

    /// Crop the focus region, recognize it and look the text up.
    ///
    /// Recognition failures are reported through the result text; the result
    /// is shown either way. Dropping the returned future before it completes
    /// leaves the session in `Captured` with the photo kept.
    pub async fn process(&mut self) -> Result<(), SessionError> {
        let job = self.begin_process()?;

        let guard = ProcessingGuard::new(&mut self.phase);
        let result = job.run().await;
        guard.complete();

        self.finish_process(result)
    }

    /// Enter `Processing` and detach the work needed to produce a result
    pub fn begin_process(&mut self) -> Result<RecognitionJob, SessionError> {
        self.expect_phase("process", &[Phase::Captured])?;
        let Some(photo) = self.photo.clone() else {
            return Err(SessionError::InvalidTransition {
                action: "process",
                phase: self.phase,
            });
        };

        self.selector.drag_end();
        self.phase = Phase::Processing;
        self.ocr_text.clear();
        self.matched = None;
        self.outcome = None;

        Ok(RecognitionJob {
            recognizer: self.recognizer.clone(),
            dataset: self.dataset.clone(),
            photo,
            region: self.selector.region(),
            reference_width: self.settings.reference_width,
            language: self.settings.language.clone(),
            failure_text: self.settings.failure_text.clone(),
        })
    }

    /// Show the result of a job started by `begin_process`.
    ///
    /// Rejected once the run was cancelled or the photo retaken.
    pub fn finish_process(&mut self, result: ScanResult) -> Result<(), SessionError> {
        self.expect_phase("show the result", &[Phase::Processing])?;
        self.ocr_text = result.text;
        self.matched = result.matched;
        self.outcome = Some(result.outcome);
        self.phase = Phase::ResultShown;
        Ok(())
    }

    /// Give up on a running recognition and go back to the photo
    pub fn cancel_process(&mut self) -> Result<(), SessionError> {
        self.expect_phase("cancel processing", &[Phase::Processing])?;
        info!("Processing cancelled");
        self.phase = Phase::Captured;
        Ok(())
    }

    /// Hide the result and go back to the captured photo
    pub fn dismiss(&mut self) -> Result<(), SessionError> {
        self.expect_phase("close the result", &[Phase::ResultShown])?;
        self.phase = Phase::Captured;
        Ok(())
    }

    /// Drop the photo and results, reset the region and reopen the camera
    pub async fn retake(&mut self) -> Result<(), SessionError> {
        self.expect_phase("retake", &[Phase::Captured, Phase::Processing, Phase::ResultShown])?;

        self.photo = None;
        self.ocr_text.clear();
        self.matched = None;
        self.outcome = None;
        self.selector = initial_selector(&self.settings);
        self.phase = Phase::Idle;

        self.start_capture().await
    }

    fn expect_phase(&self, action: &'static str, allowed: &[Phase]) -> Result<(), SessionError> {
        if allowed.contains(&self.phase) {
            Ok(())
        } else {
            Err(SessionError::InvalidTransition {
                action,
                phase: self.phase,
            })
        }
    }

    fn release_stream(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            stream.stop();
            info!("Camera stream released");
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.release_stream();
    }
}

/// Text, match and outcome produced by a [`RecognitionJob`]
#[derive(Debug, Clone)]
pub struct ScanResult {
    text: String,
    matched: Option<QuestionRecord>,
    outcome: ScanOutcome,
}

/// One recognition run, independent of the session that started it
pub struct RecognitionJob {
    recognizer: Arc<dyn TextRecognizer>,
    dataset: Arc<Dataset>,
    photo: CapturedPhoto,
    region: FocusRegion,
    reference_width: f32,
    language: String,
    failure_text: String,
}

impl RecognitionJob {
    /// Decode, crop, recognize and look up. Never fails; a recognition error
    /// becomes the failure text.
    pub async fn run(self) -> ScanResult {
        match self.recognize().await {
            Ok(text) => {
                let matched = matching::find_question(self.dataset.questions(), &text).cloned();
                let outcome = match &matched {
                    Some(q) => {
                        info!("Found question {}", q.id);
                        ScanOutcome::Matched
                    }
                    None => {
                        info!("No matching question");
                        ScanOutcome::NoMatch
                    }
                };
                ScanResult { text, matched, outcome }
            }
            Err(e) => {
                warn!("Recognition failed: {}", e);
                ScanResult {
                    text: self.failure_text,
                    matched: None,
                    outcome: ScanOutcome::RecognitionFailed,
                }
            }
        }
    }

    async fn recognize(&self) -> anyhow::Result<String> {
        let decoded = decode_photo(&self.photo).await?;
        let rect = region::crop_rect(&self.region, decoded.width, decoded.height, self.reference_width);
        debug!("Focus region {:?} maps to {:?}", self.region, rect);

        let crop = vision::crop_image(&decoded.image, rect);
        let text = self.recognizer.recognize(&crop, &self.language).await?;
        Ok(text)
    }
}

/// Returns an abandoned `Processing` phase to `Captured`
struct ProcessingGuard<'a> {
    phase: Option<&'a mut Phase>,
}

impl<'a> ProcessingGuard<'a> {
    fn new(phase: &'a mut Phase) -> Self {
        Self { phase: Some(phase) }
    }

    fn complete(mut self) {
        self.phase = None;
    }
}

impl Drop for ProcessingGuard<'_> {
    fn drop(&mut self) {
        if let Some(phase) = self.phase.take() {
            if *phase == Phase::Processing {
                warn!("Processing abandoned before it finished");
                *phase = Phase::Captured;
            }
        }
    }
}

/// Selector before any photo is known: the region fills a reference-width strip
fn initial_selector(settings: &SessionSettings) -> RegionSelector {
    RegionSelector::new(
        settings.initial_region(),
        DisplayGeometry {
            width: settings.reference_width,
            height: settings.region_height,
        },
    )
}
