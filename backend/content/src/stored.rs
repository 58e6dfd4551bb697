//! The persistence boundary.

use answerkit_blocks::{BlockDocument, LoadOutcome};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// The two opaque payloads the store keeps per answer. Either may be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredAnswer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub markup: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blocks: Option<String>,
}

impl StoredAnswer {
    pub fn markup(markup: impl Into<String>) -> Self {
        Self {
            markup: Some(markup.into()),
            blocks: None,
        }
    }

    pub fn blocks(blocks: impl Into<String>) -> Self {
        Self {
            markup: None,
            blocks: Some(blocks.into()),
        }
    }
}

/// Answer content in whichever representation is present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnswerContent {
    Markup(String),
    Blocks(BlockDocument),
    Empty,
}

impl AnswerContent {
    /// Picks the representation out of a stored answer.
    ///
    /// A non-blank block payload wins over markup; malformed block JSON is
    /// recovered by [`BlockDocument::from_json_with_outcome`].
    pub fn from_stored(stored: &StoredAnswer) -> (Self, Option<LoadOutcome>) {
        if let Some(raw) = stored.blocks.as_deref().filter(|raw| !raw.trim().is_empty()) {
            let (doc, outcome) = BlockDocument::from_json_with_outcome(raw);
            if let LoadOutcome::WrappedRaw { reason } = &outcome {
                warn!(%reason, "stored block payload is not a block array; wrapped as text");
            }
            return (AnswerContent::Blocks(doc), Some(outcome));
        }
        match stored.markup.as_deref() {
            Some(markup) if !markup.trim().is_empty() => {
                (AnswerContent::Markup(markup.to_string()), None)
            }
            _ => (AnswerContent::Empty, None),
        }
    }

    /// Classifies a single untyped payload: a JSON array is a block
    /// document, anything else is markup.
    pub fn sniff(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return AnswerContent::Empty;
        }
        if trimmed.starts_with('[')
            && matches!(
                serde_json::from_str::<serde_json::Value>(trimmed),
                Ok(serde_json::Value::Array(_))
            )
        {
            return AnswerContent::Blocks(BlockDocument::from_json(trimmed));
        }
        AnswerContent::Markup(raw.to_string())
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, AnswerContent::Empty)
    }
}
