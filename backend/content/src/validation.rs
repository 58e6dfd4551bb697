//! Submission checks run before a question/answer pair is persisted.

use answerkit_core::{
    CodeLanguage, DEFAULT_MIN_ANSWER_CHARS, DEFAULT_MIN_QUESTION_CHARS, EDITOR_PLACEHOLDER,
};
use serde::Serialize;

use crate::projector::{Projection, project};
use crate::stored::AnswerContent;

/// Thresholds and editor defaults for content handling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentSettings {
    pub min_answer_chars: usize,
    pub min_question_chars: usize,
    pub default_language: CodeLanguage,
    /// Answers whose projected text equals one of these count as empty.
    pub placeholders: Vec<String>,
}

impl Default for ContentSettings {
    fn default() -> Self {
        Self {
            min_answer_chars: DEFAULT_MIN_ANSWER_CHARS,
            min_question_chars: DEFAULT_MIN_QUESTION_CHARS,
            default_language: CodeLanguage::default(),
            placeholders: vec![EDITOR_PLACEHOLDER.to_string()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationOutcome {
    pub passed: bool,
    /// User-facing message; `None` when the submission passed.
    pub reason: Option<String>,
}

impl ValidationOutcome {
    pub fn pass() -> Self {
        Self {
            passed: true,
            reason: None,
        }
    }

    pub fn fail(reason: impl Into<String>) -> Self {
        Self {
            passed: false,
            reason: Some(reason.into()),
        }
    }
}

pub fn validate_submission(
    question: &str,
    answer: &AnswerContent,
    settings: &ContentSettings,
) -> ValidationOutcome {
    let question = Projection::from_text(question);
    if question.is_empty() || question.char_count < settings.min_question_chars {
        return ValidationOutcome::fail("Question is required");
    }

    let answer = project(answer);
    let is_placeholder = settings
        .placeholders
        .iter()
        .any(|placeholder| Projection::from_text(placeholder).text == answer.text);
    if answer.is_empty() || is_placeholder {
        return ValidationOutcome::fail("Answer is required");
    }

    if answer.char_count < settings.min_answer_chars {
        return ValidationOutcome::fail(format!(
            "Answer must be at least {} characters",
            settings.min_answer_chars
        ));
    }

    ValidationOutcome::pass()
}
