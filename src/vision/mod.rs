//! Vision/OCR Layer
//!
//! Crops the focus region out of a decoded photo and hands it to a text
//! recognizer.

pub mod tesseract;

use async_trait::async_trait;
use image::{imageops, RgbaImage};
use thiserror::Error;
use tracing::debug;

use crate::region::CropRect;

pub use tesseract::TesseractRecognizer;

/// Text recognition errors
#[derive(Debug, Error)]
pub enum RecognitionError {
    #[error("failed to start recognizer: {0}")]
    Spawn(#[source] std::io::Error),
    #[error("recognizer I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode crop: {0}")]
    Encode(#[from] image::ImageError),
    #[error("recognizer exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },
    #[error("nothing to recognize: crop is empty")]
    EmptyImage,
}

/// An OCR engine
#[async_trait]
pub trait TextRecognizer: Send + Sync {
    /// Recognize text in `image`. `language` is an engine language hint such as `rus`.
    async fn recognize(&self, image: &RgbaImage, language: &str) -> Result<String, RecognitionError>;
}

/// Copy the pixels inside `rect` into a new image.
///
/// The rectangle is clipped to the image; rounding during the display-to-source
/// mapping can overshoot the last row or column by a pixel.
pub fn crop_image(image: &RgbaImage, rect: CropRect) -> RgbaImage {
    let (img_width, img_height) = image.dimensions();

    let x = rect.x.min(img_width);
    let y = rect.y.min(img_height);
    let width = rect.width.min(img_width - x);
    let height = rect.height.min(img_height - y);

    debug!("Cropping {}x{} at ({}, {}) from {}x{}", width, height, x, y, img_width, img_height);
    imageops::crop_imm(image, x, y, width, height).to_image()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn gradient(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, y| Rgba([x as u8, y as u8, 0, 255]))
    }

    #[test]
    fn test_crop_copies_region() {
        let image = gradient(100, 80);
        let crop = crop_image(&image, CropRect { x: 10, y: 20, width: 30, height: 15 });

        assert_eq!(crop.dimensions(), (30, 15));
        assert_eq!(crop.get_pixel(0, 0), &Rgba([10, 20, 0, 255]));
        assert_eq!(crop.get_pixel(29, 14), &Rgba([39, 34, 0, 255]));
    }

    #[test]
    fn test_crop_clips_overshoot() {
        let image = gradient(100, 80);
        let crop = crop_image(&image, CropRect { x: 90, y: 70, width: 11, height: 11 });
        assert_eq!(crop.dimensions(), (10, 10));

        let crop = crop_image(&image, CropRect { x: 200, y: 200, width: 5, height: 5 });
        assert_eq!(crop.dimensions(), (0, 0));
    }
}
