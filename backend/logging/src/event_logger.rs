//! Content Event Logger
//!
//! Structured pipeline events (repairs, sanitizer removals, recovered block
//! documents, validation failures) emitted on the `content_events` target.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::redact::redact_data_uris;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum ContentEvent {
    Repaired {
        runs_merged: usize,
        lines_merged: usize,
        containers_normalized: usize,
    },
    Sanitized {
        elements_removed: usize,
        attributes_removed: usize,
    },
    BlocksRecovered {
        reason: String,
        skipped: usize,
    },
    ValidationFailed {
        reason: String,
    },
}

#[derive(Debug, Serialize)]
pub struct EventLogEntry {
    pub session_id: String,
    pub timestamp: DateTime<Utc>,
    pub event: ContentEvent,
}

pub struct ContentEventLogger;

impl ContentEventLogger {
    /// Builds the log entry for an event, scrubbing free-form strings.
    pub fn entry(session_id: &str, mut event: ContentEvent) -> EventLogEntry {
        match &mut event {
            ContentEvent::BlocksRecovered { reason, .. }
            | ContentEvent::ValidationFailed { reason } => {
                *reason = redact_data_uris(reason);
            }
            ContentEvent::Repaired { .. } | ContentEvent::Sanitized { .. } => {}
        }

        EventLogEntry {
            session_id: session_id.into(),
            timestamp: Utc::now(),
            event,
        }
    }

    pub fn log_event(session_id: &str, event: ContentEvent) {
        let entry = Self::entry(session_id, event);
        let json = serde_json::to_string(&entry).unwrap_or_default();
        info!(target: "content_events", event = %json, "content pipeline event");
    }
}
