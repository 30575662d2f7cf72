//! Camera Capture Layer
//!
//! The session talks to the camera through [`CameraSource`] and
//! [`CameraStream`]. A stream holds the device until it is stopped.

pub mod frame;
pub mod still;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use frame::{decode_photo, CapturedFrame, CapturedPhoto};
pub use still::StillImageCamera;

/// Which physical camera to request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FacingMode {
    /// Rear camera
    #[default]
    Environment,
    /// Front camera
    User,
}

/// Camera stream request; resolution is a preference, not a requirement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamRequest {
    pub facing: FacingMode,
    pub ideal_width: u32,
    pub ideal_height: u32,
}

impl Default for StreamRequest {
    fn default() -> Self {
        Self {
            facing: FacingMode::Environment,
            ideal_width: 1920,
            ideal_height: 1080,
        }
    }
}

/// Camera and photo errors
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("camera unavailable: {0}")]
    Unavailable(String),
    #[error("failed to grab frame: {0}")]
    Frame(String),
    #[error("failed to encode photo: {0}")]
    Encode(#[source] image::ImageError),
    #[error("failed to decode photo: {0}")]
    Decode(#[source] image::ImageError),
}

/// Something that can hand out camera streams
#[async_trait]
pub trait CameraSource: Send + Sync {
    /// Acquire a stream. Fails when permission is denied or no device matches.
    async fn open(&self, request: &StreamRequest) -> Result<Box<dyn CameraStream>, CaptureError>;
}

/// An acquired camera stream
pub trait CameraStream: Send {
    /// Grab the current video frame as a still
    fn grab_frame(&mut self) -> Result<CapturedFrame, CaptureError>;

    /// Stop all tracks and release the device. Must be safe to call twice.
    fn stop(&mut self);
}
