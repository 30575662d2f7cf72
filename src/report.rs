//! Plain-text rendering of the session state

use std::fmt;

use crate::session::{ScanOutcome, SessionView};

const TEXT_HEADING: &str = "Текст, найденный на изображении:";
const FOUND_HEADING: &str = "✅ Вопрос найден!";
const NOT_FOUND: &str = "❌ Соответствующий вопрос в базе данных не найден.";
const PROCESSING: &str = "Распознавание текста...";

/// Text form of a [`SessionView`].
///
/// A pending notification comes first, then a progress line while busy. Once
/// the result is visible the recognized text is shown when there is any, and a
/// matched question is listed with its answers, correct ones marked. The "not
/// found" line is only shown when text was read and nothing matched; a failed
/// recognition shows just the failure text.
pub struct ResultReport<'a>(pub &'a SessionView);

impl fmt::Display for ResultReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let view = self.0;

        if let Some(notification) = &view.notification {
            writeln!(f, "{}", notification)?;
        }
        if view.busy {
            writeln!(f, "{}", PROCESSING)?;
        }
        if !view.result_visible {
            return Ok(());
        }

        if !view.ocr_text.is_empty() {
            writeln!(f, "{}", TEXT_HEADING)?;
            writeln!(f, "{}", view.ocr_text.trim_end())?;
            writeln!(f)?;
        }

        match &view.matched {
            Some(question) => {
                writeln!(f, "{}", FOUND_HEADING)?;
                writeln!(f, "ID: {}", question.id)?;
                writeln!(f, "Вопрос: {}", question.question_text)?;
                writeln!(f, "Answers:")?;
                for answer in &question.answers {
                    if answer.is_correct {
                        writeln!(f, "  - {} ✅", answer.text)?;
                    } else {
                        writeln!(f, "  - {}", answer.text)?;
                    }
                }
            }
            None if view.outcome == Some(ScanOutcome::NoMatch) && !view.ocr_text.is_empty() => {
                writeln!(f, "{}", NOT_FOUND)?;
            }
            None => {}
        }

        Ok(())
    }
}

/// Render the session view as text
pub fn render(view: &SessionView) -> String {
    ResultReport(view).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::region::FocusRegion;
    use crate::session::tests::{dataset, FakeCamera, FakeRecognizer};
    use crate::session::{Phase, Session, SessionSettings};
    use crate::storage::dataset::{AnswerRecord, RecordId};
    use crate::storage::QuestionRecord;
    use std::sync::Arc;

    fn view(ocr_text: &str, matched: Option<QuestionRecord>) -> SessionView {
        let outcome = if matched.is_some() {
            ScanOutcome::Matched
        } else {
            ScanOutcome::NoMatch
        };
        SessionView {
            phase: Phase::ResultShown,
            region: FocusRegion::at_origin(400.0, 120.0),
            photo_size: Some((1600, 1200)),
            matched,
            ocr_text: ocr_text.to_string(),
            outcome: Some(outcome),
            busy: false,
            result_visible: true,
            notification: None,
        }
    }

    #[test]
    fn test_render_found_question() {
        let question = QuestionRecord {
            id: RecordId::Text("geo-1".to_string()),
            question_text: "столица россии".to_string(),
            answers: vec![
                AnswerRecord {
                    id: RecordId::Number(1),
                    text: "Москва".to_string(),
                    is_correct: true,
                },
                AnswerRecord {
                    id: RecordId::Number(2),
                    text: "Казань".to_string(),
                    is_correct: false,
                },
            ],
        };

        let text = render(&view("Столица России?\n", Some(question)));

        assert!(text.starts_with(TEXT_HEADING));
        assert!(text.contains("Столица России?\n\n"));
        assert!(text.contains(FOUND_HEADING));
        assert!(text.contains("ID: geo-1"));
        assert!(text.contains("  - Москва ✅\n"));
        assert!(text.contains("  - Казань\n"));
        assert!(!text.contains(NOT_FOUND));
    }

    #[test]
    fn test_render_not_found() {
        let text = render(&view("какой город есть", None));
        assert!(text.contains("какой город есть"));
        assert!(text.ends_with(&format!("{}\n", NOT_FOUND)));
    }

    #[test]
    fn test_render_empty_text() {
        assert!(render(&view("", None)).is_empty());
    }

    #[test]
    fn test_render_hidden_result_shows_progress_only() {
        let mut busy = view("", None);
        busy.phase = Phase::Processing;
        busy.result_visible = false;
        busy.outcome = None;
        busy.busy = true;

        assert_eq!(render(&busy), format!("{}\n", PROCESSING));
    }

    #[tokio::test]
    async fn test_render_recognition_failure_without_not_found() {
        let mut session = Session::new(
            SessionSettings::default(),
            Arc::new(FakeCamera::default()),
            Arc::new(FakeRecognizer::failing()),
            dataset(),
        );
        session.start_capture().await.unwrap();
        session.capture_photo().unwrap();
        session.process().await.unwrap();

        let text = render(&session.view());
        assert!(text.contains(crate::config::DEFAULT_FAILURE_TEXT));
        assert!(!text.contains(NOT_FOUND));
        assert!(!text.contains(FOUND_HEADING));
    }
}
