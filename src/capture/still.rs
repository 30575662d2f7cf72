//! Camera backed by an image file
//!
//! Used by the command line front end, where the "camera" is a photo that was
//! already taken.

use async_trait::async_trait;
use std::path::PathBuf;
use tracing::{debug, info};

use super::{CameraSource, CameraStream, CaptureError, CapturedFrame, StreamRequest};

/// Serves a single image file as a camera stream
#[derive(Debug, Clone)]
pub struct StillImageCamera {
    path: PathBuf,
}

impl StillImageCamera {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl CameraSource for StillImageCamera {
    async fn open(&self, request: &StreamRequest) -> Result<Box<dyn CameraStream>, CaptureError> {
        let path = self.path.clone();
        let image = tokio::task::spawn_blocking(move || image::open(&path))
            .await
            .map_err(|e| CaptureError::Unavailable(e.to_string()))?
            .map_err(|e| CaptureError::Unavailable(format!("{}: {}", self.path.display(), e)))?
            .to_rgba8();

        info!(
            "Opened still image {} ({}x{}, requested {:?} {}x{})",
            self.path.display(),
            image.width(),
            image.height(),
            request.facing,
            request.ideal_width,
            request.ideal_height
        );

        Ok(Box::new(StillImageStream { image: Some(image) }))
    }
}

struct StillImageStream {
    image: Option<image::RgbaImage>,
}

impl CameraStream for StillImageStream {
    fn grab_frame(&mut self) -> Result<CapturedFrame, CaptureError> {
        let image = self
            .image
            .as_ref()
            .ok_or_else(|| CaptureError::Frame("stream already stopped".to_string()))?;
        Ok(CapturedFrame::from_image(image.clone()))
    }

    fn stop(&mut self) {
        if self.image.take().is_some() {
            debug!("Still image stream stopped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    #[tokio::test]
    async fn test_open_and_grab() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("photo.png");
        RgbaImage::from_pixel(20, 10, Rgba([1, 2, 3, 255])).save(&path).unwrap();

        let camera = StillImageCamera::new(&path);
        let mut stream = camera.open(&StreamRequest::default()).await.unwrap();

        let frame = stream.grab_frame().unwrap();
        assert_eq!(frame.dimensions(), (20, 10));

        stream.stop();
        stream.stop();
        assert!(matches!(stream.grab_frame(), Err(CaptureError::Frame(_))));
    }

    #[tokio::test]
    async fn test_missing_file_is_unavailable() {
        let camera = StillImageCamera::new("/nonexistent/photo.jpg");
        let result = camera.open(&StreamRequest::default()).await;
        assert!(matches!(result, Err(CaptureError::Unavailable(_))));
    }
}
