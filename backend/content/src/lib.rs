//! The answer-content pipeline as seen by the submission and display flows.
//!
//! An answer is stored either as sanitized markup or as a JSON block array;
//! [`AnswerContent`] is the tagged variant callers branch on.

pub mod pipeline;
pub mod projector;
pub mod stored;
pub mod validation;

pub use pipeline::{ContentPipeline, PreparedAnswer, RenderedAnswer};
pub use projector::{Projection, project, project_blocks, project_markup};
pub use stored::{AnswerContent, StoredAnswer};
pub use validation::{ContentSettings, ValidationOutcome, validate_submission};
