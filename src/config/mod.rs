//! Application Configuration
//!
//! User settings and preferences stored in TOML format.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::capture::FacingMode;

/// Shown in place of recognized text when OCR fails
pub const DEFAULT_FAILURE_TEXT: &str = "Ошибка распознавания текста. Попробуйте ещё раз.";

/// Application settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// General settings
    pub general: GeneralConfig,
    /// Camera settings
    pub capture: CaptureSettings,
    /// Focus region settings
    pub region: RegionSettings,
    /// Text recognition settings
    pub ocr: OcrSettings,
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Question dataset location: a file path or an http(s) URL
    pub dataset: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            dataset: "questions.json".to_string(),
        }
    }
}

/// Camera-related settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureSettings {
    /// Which camera to ask for
    pub facing: FacingMode,
    /// Preferred stream width (best effort)
    pub ideal_width: u32,
    /// Preferred stream height (best effort)
    pub ideal_height: u32,
    /// JPEG quality used when storing the captured still (1-100)
    pub jpeg_quality: u8,
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self {
            facing: FacingMode::Environment,
            ideal_width: 1920,
            ideal_height: 1080,
            jpeg_quality: 92,
        }
    }
}

/// Focus region settings, in display pixels
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RegionSettings {
    /// Width the captured photo is displayed at
    pub reference_width: f32,
    /// Focus region width
    pub width: f32,
    /// Focus region height
    pub height: f32,
}

impl Default for RegionSettings {
    fn default() -> Self {
        Self {
            reference_width: 400.0,
            width: 400.0,
            height: 120.0,
        }
    }
}

/// Text recognition settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrSettings {
    /// Tesseract language code
    pub language: String,
    /// Path to (or name of) the tesseract executable
    pub tesseract_path: String,
    /// Text shown instead of a result when recognition fails
    pub failure_text: String,
}

impl Default for OcrSettings {
    fn default() -> Self {
        Self {
            language: "rus".to_string(),
            tesseract_path: "tesseract".to_string(),
            failure_text: DEFAULT_FAILURE_TEXT.to_string(),
        }
    }
}

/// Load configuration from file
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    let config: AppConfig = toml::from_str(&content)?;
    Ok(config)
}

/// Save configuration to file
pub fn save_config(config: &AppConfig, path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_app_config() {
        let config = AppConfig::default();

        assert_eq!(config.general.dataset, "questions.json");

        assert_eq!(config.capture.facing, FacingMode::Environment);
        assert_eq!(config.capture.ideal_width, 1920);
        assert_eq!(config.capture.ideal_height, 1080);

        assert!((config.region.reference_width - 400.0).abs() < f32::EPSILON);
        assert!((config.region.width - 400.0).abs() < f32::EPSILON);
        assert!((config.region.height - 120.0).abs() < f32::EPSILON);

        assert_eq!(config.ocr.language, "rus");
        assert_eq!(config.ocr.tesseract_path, "tesseract");
        assert_eq!(config.ocr.failure_text, DEFAULT_FAILURE_TEXT);
    }

    #[test]
    fn test_save_and_load_config() {
        let mut config = AppConfig::default();
        config.general.dataset = "https://example.org/questions.json".to_string();
        config.capture.facing = FacingMode::User;
        config.ocr.language = "rus+eng".to_string();

        let temp_file = NamedTempFile::new().unwrap();
        save_config(&config, temp_file.path()).unwrap();
        let loaded = load_config(temp_file.path()).unwrap();

        assert_eq!(loaded.general.dataset, "https://example.org/questions.json");
        assert_eq!(loaded.capture.facing, FacingMode::User);
        assert_eq!(loaded.ocr.language, "rus+eng");
        assert_eq!(loaded.capture.jpeg_quality, config.capture.jpeg_quality);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "[region]\nwidth = 300.0").unwrap();

        let config = load_config(temp_file.path()).unwrap();

        assert!((config.region.width - 300.0).abs() < f32::EPSILON);
        assert!((config.region.height - 120.0).abs() < f32::EPSILON);
        assert_eq!(config.general.dataset, "questions.json");
        assert_eq!(config.capture.facing, FacingMode::Environment);
    }

    #[test]
    fn test_facing_mode_is_lowercase_in_toml() {
        let toml_str = toml::to_string_pretty(&AppConfig::default()).unwrap();
        assert!(toml_str.contains("facing = \"environment\""));
    }

    #[test]
    fn test_load_config_file_not_found() {
        let result = load_config(Path::new("/nonexistent/path/config.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn test_load_config_invalid_toml() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "this is not valid toml {{{{").unwrap();

        let result = load_config(temp_file.path());
        assert!(result.is_err());
    }
}
