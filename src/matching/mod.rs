//! Text matching
//!
//! Cleans up raw OCR output and finds the first dataset question whose text
//! appears inside it.

use tracing::debug;

use crate::storage::QuestionRecord;

/// Normalize recognized text for matching.
///
/// Lowercases, trims, replaces every character that is neither an ASCII word
/// character, whitespace, nor a Cyrillic letter with a space, and collapses
/// whitespace runs into single spaces. The result has no leading or trailing
/// whitespace.
pub fn normalize(text: &str) -> String {
    let lowered = text.to_lowercase();

    let mut normalized = String::with_capacity(lowered.len());
    let mut pending_space = false;

    for c in lowered.trim().chars() {
        if c.is_whitespace() || !is_kept_char(c) {
            pending_space = true;
            continue;
        }
        if pending_space && !normalized.is_empty() {
            normalized.push(' ');
        }
        pending_space = false;
        normalized.push(c);
    }

    normalized
}

/// ASCII letters, digits, underscore and the Cyrillic alphabet including ё
fn is_kept_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || matches!(c, 'а'..='я' | 'А'..='Я' | 'ё' | 'Ё')
}

/// Find the first question whose text is contained in the normalized scan.
///
/// Questions are checked in dataset order and only lowercased and trimmed, so
/// the first containment wins. `None` is a normal outcome, not an error.
pub fn find_question<'a>(questions: &'a [QuestionRecord], scanned_text: &str) -> Option<&'a QuestionRecord> {
    let normalized = normalize(scanned_text);

    let matched = questions.iter().find(|q| {
        let key = q.question_text.to_lowercase();
        normalized.contains(key.trim())
    });

    match matched {
        Some(q) => debug!("Scanned text matched question {}", q.id),
        None => debug!("No question matched {:?}", normalized),
    }

    matched
}
