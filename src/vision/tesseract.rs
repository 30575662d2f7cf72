//! Tesseract OCR backend
//!
//! Runs the `tesseract` command line tool, piping the crop in as PNG on stdin
//! and reading the recognized text from stdout.

use async_trait::async_trait;
use image::{ImageFormat, RgbaImage};
use std::io::Cursor;
use std::process::Stdio;
use std::time::Instant;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, info};

use super::{RecognitionError, TextRecognizer};

/// Tesseract CLI wrapper
#[derive(Debug, Clone)]
pub struct TesseractRecognizer {
    program: String,
}

impl TesseractRecognizer {
    /// Create a recognizer that runs `program` (a path or a name on `PATH`)
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for TesseractRecognizer {
    fn default() -> Self {
        Self::new("tesseract")
    }
}

#[async_trait]
impl TextRecognizer for TesseractRecognizer {
    async fn recognize(&self, image: &RgbaImage, language: &str) -> Result<String, RecognitionError> {
        if image.width() == 0 || image.height() == 0 {
            return Err(RecognitionError::EmptyImage);
        }

        let mut png = Vec::new();
        image.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;

        info!(
            "Recognizing {}x{} crop with {} (lang {})",
            image.width(),
            image.height(),
            self.program,
            language
        );
        let start = Instant::now();

        let mut child = Command::new(&self.program)
            .args(["stdin", "stdout", "-l", language])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(RecognitionError::Spawn)?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(&png).await?;
            // Dropping stdin closes the pipe so tesseract sees EOF
        }

        let output = child.wait_with_output().await?;
        if !output.status.success() {
            return Err(RecognitionError::Failed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let text = String::from_utf8_lossy(&output.stdout).into_owned();
        debug!("Recognition finished in {:?}: {} chars", start.elapsed(), text.chars().count());
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[tokio::test]
    async fn test_empty_image_is_rejected() {
        let recognizer = TesseractRecognizer::default();
        let result = recognizer.recognize(&RgbaImage::new(0, 0), "rus").await;
        assert!(matches!(result, Err(RecognitionError::EmptyImage)));
    }

    #[tokio::test]
    async fn test_missing_binary_fails_to_spawn() {
        let recognizer = TesseractRecognizer::new("/nonexistent/bin/tesseract");
        let image = RgbaImage::from_pixel(8, 8, Rgba([255, 255, 255, 255]));

        let result = recognizer.recognize(&image, "rus").await;
        assert!(matches!(result, Err(RecognitionError::Spawn(_))));
    }
}
