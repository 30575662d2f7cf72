//! Question dataset loading and validation
//!
//! The dataset is a JSON document shaped as `{ "questions": [ ... ] }`. It is
//! loaded once per session and never modified afterwards.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use thiserror::Error;
use tracing::{error, info, warn};

/// Errors raised while loading a dataset
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("failed to read dataset file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to fetch dataset: {0}")]
    Http(#[from] reqwest::Error),
    #[error("invalid dataset JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("dataset has no \"questions\" array")]
    MissingQuestions,
}

/// Identifier of a question or answer; datasets use both strings and integers
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Number(i64),
    Text(String),
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Number(n) => write!(f, "{}", n),
            RecordId::Text(s) => f.write_str(s),
        }
    }
}

/// A single answer option
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerRecord {
    /// Unique within the parent question
    pub id: RecordId,
    /// Answer text
    pub text: String,
    /// Whether this is a correct answer
    pub is_correct: bool,
}

/// A question with its answer options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionRecord {
    /// Unique across the dataset
    pub id: RecordId,
    /// Canonical question text, used as the match key
    pub question_text: String,
    /// Answer options in display order
    pub answers: Vec<AnswerRecord>,
}

/// The loaded, immutable question list
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    questions: Vec<QuestionRecord>,
}

impl Dataset {
    /// An empty dataset; every lookup against it yields no match
    pub fn empty() -> Self {
        Self::default()
    }

    /// Wrap already-built records without validation
    #[cfg(test)]
    pub fn from_records(questions: Vec<QuestionRecord>) -> Self {
        Self { questions }
    }

    /// Parse and validate a dataset document.
    ///
    /// Malformed entries are skipped with a warning rather than failing the
    /// whole load.
    pub fn from_json_str(json: &str) -> Result<Self, DatasetError> {
        let document: serde_json::Value = serde_json::from_str(json)?;
        let entries = document
            .get("questions")
            .and_then(|q| q.as_array())
            .ok_or(DatasetError::MissingQuestions)?;

        let mut questions = Vec::with_capacity(entries.len());
        let mut seen_ids = HashSet::new();
        let mut skipped = 0usize;

        for (index, entry) in entries.iter().enumerate() {
            let record: QuestionRecord = match QuestionRecord::deserialize(entry) {
                Ok(record) => record,
                Err(e) => {
                    warn!("Skipping question #{}: {}", index, e);
                    skipped += 1;
                    continue;
                }
            };

            if let Err(reason) = validate(&record, &seen_ids) {
                warn!("Skipping question #{} (id {}): {}", index, record.id, reason);
                skipped += 1;
                continue;
            }

            seen_ids.insert(record.id.clone());
            questions.push(record);
        }

        info!("Loaded {} questions ({} skipped)", questions.len(), skipped);
        Ok(Self { questions })
    }

    /// Load a dataset from a file on disk
    pub async fn load_file(path: &Path) -> Result<Self, DatasetError> {
        let content = tokio::fs::read_to_string(path).await?;
        Self::from_json_str(&content)
    }

    /// Fetch a dataset over HTTP(S)
    pub async fn fetch(url: &str) -> Result<Self, DatasetError> {
        let body = reqwest::get(url).await?.error_for_status()?.text().await?;
        Self::from_json_str(&body)
    }

    /// Load from a file path or URL
    pub async fn load(location: &str) -> Result<Self, DatasetError> {
        if is_url(location) {
            Self::fetch(location).await
        } else {
            Self::load_file(Path::new(location)).await
        }
    }

    /// Load from a file path or URL, falling back to an empty dataset on failure
    pub async fn load_or_empty(location: &str) -> Self {
        match Self::load(location).await {
            Ok(dataset) => dataset,
            Err(e) => {
                error!("Failed to load dataset from {}: {}", location, e);
                Self::empty()
            }
        }
    }

    /// Questions in dataset order
    pub fn questions(&self) -> &[QuestionRecord] {
        &self.questions
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

/// Whether a dataset location should be fetched over the network
pub fn is_url(location: &str) -> bool {
    location.starts_with("http://") || location.starts_with("https://")
}

fn validate(record: &QuestionRecord, seen_ids: &HashSet<RecordId>) -> Result<(), &'static str> {
    if record.question_text.trim().is_empty() {
        return Err("empty question text");
    }
    if seen_ids.contains(&record.id) {
        return Err("duplicate question id");
    }

    let mut answer_ids = HashSet::new();
    if !record.answers.iter().all(|a| answer_ids.insert(&a.id)) {
        return Err("duplicate answer id");
    }

    Ok(())
}
