//! Still frames and captured photos

use image::{codecs::jpeg::JpegEncoder, ExtendedColorType, RgbaImage};

use super::CaptureError;

/// A raw frame grabbed from a camera stream
#[derive(Debug)]
pub struct CapturedFrame {
    /// Raw RGBA pixel data
    pub data: Vec<u8>,
    /// Frame width in pixels
    pub width: u32,
    /// Frame height in pixels
    pub height: u32,
}

impl CapturedFrame {
    /// Create a new captured frame
    pub fn new(data: Vec<u8>, width: u32, height: u32) -> Self {
        Self { data, width, height }
    }

    /// Build a frame from a decoded RGBA image
    pub fn from_image(image: RgbaImage) -> Self {
        let (width, height) = image.dimensions();
        Self::new(image.into_raw(), width, height)
    }

    /// Get frame dimensions as (width, height)
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

/// A still photo kept as an encoded JPEG until it is processed
#[derive(Debug, Clone)]
pub struct CapturedPhoto {
    jpeg: Vec<u8>,
    width: u32,
    height: u32,
}

impl CapturedPhoto {
    /// Encode a frame as JPEG
    pub fn from_frame(frame: &CapturedFrame, quality: u8) -> Result<Self, CaptureError> {
        let (width, height) = frame.dimensions();
        let expected = width as usize * height as usize * 4;
        if width == 0 || height == 0 || frame.data.len() != expected {
            return Err(CaptureError::Frame(format!(
                "frame buffer of {} bytes does not match {}x{} RGBA",
                frame.data.len(),
                width,
                height
            )));
        }

        // JPEG has no alpha channel
        let rgb: Vec<u8> = frame
            .data
            .chunks_exact(4)
            .flat_map(|px| [px[0], px[1], px[2]])
            .collect();

        let mut jpeg = Vec::new();
        JpegEncoder::new_with_quality(&mut jpeg, quality.clamp(1, 100))
            .encode(&rgb, width, height, ExtendedColorType::Rgb8)
            .map_err(CaptureError::Encode)?;

        Ok(Self { jpeg, width, height })
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

/// A photo decoded back into pixels, ready for cropping
#[derive(Debug, Clone)]
pub struct DecodedImage {
    pub image: RgbaImage,
    pub width: u32,
    pub height: u32,
}

/// Decode a captured photo on the blocking pool.
///
/// Cropping must only start once this has completed.
pub async fn decode_photo(photo: &CapturedPhoto) -> Result<DecodedImage, CaptureError> {
    let bytes = photo.jpeg.clone();
    let image = tokio::task::spawn_blocking(move || image::load_from_memory(&bytes))
        .await
        .map_err(|e| CaptureError::Frame(format!("decode task failed: {}", e)))?
        .map_err(CaptureError::Decode)?
        .to_rgba8();

    let (width, height) = image.dimensions();
    Ok(DecodedImage { image, width, height })
}
