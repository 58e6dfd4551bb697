//! Ingest and render paths for both answer representations.
//!
//! Ingest: repair → sanitize → store. Render: sanitize again → highlight.

use answerkit_blocks::{BlockDocument, LoadOutcome, RenderedBlock, render_blocks};
use answerkit_logging::{ContentEvent, ContentEventLogger};
use answerkit_markup::{
    ContentRepairer, HighlightDispatcher, HighlightedMarkup, sanitize_with_report,
};
use serde::Serialize;
use tracing::debug;

use crate::projector::{Projection, project};
use crate::stored::{AnswerContent, StoredAnswer};
use crate::validation::{ContentSettings, ValidationOutcome, validate_submission};

/// Display form of an answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RenderedAnswer {
    Markup(HighlightedMarkup),
    Blocks { blocks: Vec<RenderedBlock> },
    Empty,
}

/// What the store receives, plus the denormalized search text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreparedAnswer {
    pub stored: StoredAnswer,
    pub projection: Projection,
}

/// Pipeline bound to one editing or viewing session.
pub struct ContentPipeline {
    session_id: String,
    settings: ContentSettings,
    repairer: ContentRepairer,
    dispatcher: HighlightDispatcher,
}

impl ContentPipeline {
    pub fn new(settings: ContentSettings) -> Self {
        Self::with_session(uuid::Uuid::new_v4().to_string(), settings)
    }

    pub fn with_session(session_id: impl Into<String>, settings: ContentSettings) -> Self {
        Self {
            session_id: session_id.into(),
            repairer: ContentRepairer::new(settings.default_language),
            dispatcher: HighlightDispatcher::new(settings.default_language),
            settings,
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn settings(&self) -> &ContentSettings {
        &self.settings
    }

    /// Repairs degraded code paragraphs and sanitizes raw editor output.
    pub fn ingest_markup(&self, raw: &str) -> String {
        let (repaired, report) = self.repairer.repair_with_report(raw);
        if report.changed() {
            ContentEventLogger::log_event(
                &self.session_id,
                ContentEvent::Repaired {
                    runs_merged: report.runs_merged,
                    lines_merged: report.lines_merged,
                    containers_normalized: report.containers_normalized,
                },
            );
        }
        self.sanitize(&repaired)
    }

    /// Re-sanitizes stored markup and marks code nodes for highlighting.
    pub fn render_markup(&self, stored: &str) -> HighlightedMarkup {
        let clean = self.sanitize(stored);
        let highlighted = self.dispatcher.dispatch(&clean);
        debug!(code_nodes = highlighted.targets.len(), "markup ready for display");
        highlighted
    }

    /// Reads a stored answer, reporting recovered block payloads.
    pub fn load(&self, stored: &StoredAnswer) -> AnswerContent {
        let (content, outcome) = AnswerContent::from_stored(stored);
        match outcome {
            Some(LoadOutcome::WrappedRaw { reason }) => ContentEventLogger::log_event(
                &self.session_id,
                ContentEvent::BlocksRecovered { reason, skipped: 0 },
            ),
            Some(LoadOutcome::Parsed {
                skipped,
                reassigned_ids,
            }) if skipped > 0 || reassigned_ids > 0 => ContentEventLogger::log_event(
                &self.session_id,
                ContentEvent::BlocksRecovered {
                    reason: format!("{reassigned_ids} block id(s) reassigned"),
                    skipped,
                },
            ),
            _ => {}
        }
        content
    }

    pub fn render(&self, content: &AnswerContent) -> RenderedAnswer {
        match content {
            AnswerContent::Markup(markup) => RenderedAnswer::Markup(self.render_markup(markup)),
            AnswerContent::Blocks(doc) => RenderedAnswer::Blocks {
                blocks: render_blocks(doc),
            },
            AnswerContent::Empty => RenderedAnswer::Empty,
        }
    }

    pub fn validate(&self, question: &str, answer: &AnswerContent) -> ValidationOutcome {
        let outcome = validate_submission(question, answer, &self.settings);
        if let Some(reason) = &outcome.reason {
            ContentEventLogger::log_event(
                &self.session_id,
                ContentEvent::ValidationFailed {
                    reason: reason.clone(),
                },
            );
        }
        outcome
    }

    /// Canonicalizes content for the store.
    ///
    /// Markup is ingested; block documents are serialized as-is.
    pub fn prepare_for_storage(&self, content: &AnswerContent) -> PreparedAnswer {
        let (stored, canonical) = match content {
            AnswerContent::Markup(raw) => {
                let clean = self.ingest_markup(raw);
                (
                    StoredAnswer::markup(clean.clone()),
                    AnswerContent::Markup(clean),
                )
            }
            AnswerContent::Blocks(doc) => (StoredAnswer::blocks(doc.to_json()), content.clone()),
            AnswerContent::Empty => (StoredAnswer::default(), AnswerContent::Empty),
        };
        PreparedAnswer {
            stored,
            projection: project(&canonical),
        }
    }

    /// Convenience for callers holding a block document directly.
    pub fn prepare_blocks(&self, doc: &BlockDocument) -> PreparedAnswer {
        self.prepare_for_storage(&AnswerContent::Blocks(doc.clone()))
    }

    fn sanitize(&self, markup: &str) -> String {
        let (clean, report) = sanitize_with_report(markup);
        if !report.is_clean() {
            ContentEventLogger::log_event(
                &self.session_id,
                ContentEvent::Sanitized {
                    elements_removed: report.elements_removed,
                    attributes_removed: report.attributes_removed,
                },
            );
        }
        clean
    }
}

impl Default for ContentPipeline {
    fn default() -> Self {
        Self::new(ContentSettings::default())
    }
}
