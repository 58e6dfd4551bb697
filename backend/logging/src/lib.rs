//! Structured logging for the AnswerKit pipeline.
//!
//! Console and rolling NDJSON output, redaction of inline image payloads,
//! and content-pipeline events.

pub mod event_logger;
pub mod logger;
pub mod redact;

pub use event_logger::{ContentEvent, ContentEventLogger, EventLogEntry};
pub use logger::init_logger;
pub use redact::redact_data_uris;
