//! Storage Layer
//!
//! Per-user directories and the read-only question dataset.

pub mod dataset;

use anyhow::Result;
use std::path::PathBuf;

pub use dataset::{Dataset, QuestionRecord};

fn project_dirs() -> Result<directories::ProjectDirs> {
    directories::ProjectDirs::from("com", "quizlens", "QuizLens")
        .ok_or_else(|| anyhow::anyhow!("Could not determine home directory"))
}

/// Get the application data directory
pub fn get_data_dir() -> Result<PathBuf> {
    let data_dir = project_dirs()?.data_dir().to_path_buf();
    std::fs::create_dir_all(&data_dir)?;

    Ok(data_dir)
}

/// Get the configuration directory
pub fn get_config_dir() -> Result<PathBuf> {
    let config_dir = project_dirs()?.config_dir().to_path_buf();
    std::fs::create_dir_all(&config_dir)?;

    Ok(config_dir)
}

/// Resolve a relative dataset path.
///
/// URLs and absolute paths are returned unchanged. A relative path is used as-is
/// when it exists in the working directory, otherwise it is looked up in the data
/// directory.
pub fn resolve_dataset_location(location: &str) -> String {
    if dataset::is_url(location) {
        return location.to_string();
    }

    let path = PathBuf::from(location);
    if path.is_absolute() || path.exists() {
        return location.to_string();
    }

    match get_data_dir() {
        Ok(dir) => {
            let candidate = dir.join(&path);
            if candidate.exists() {
                return candidate.to_string_lossy().into_owned();
            }
            location.to_string()
        }
        Err(_) => location.to_string(),
    }
}
