//! Shared vocabulary for the AnswerKit content pipeline.
//!
//! Both content representations (sanitized markup and block documents) lean
//! on the language set, the limits, and the error type defined here.

pub mod error;
pub mod types;

pub use error::ContentError;
pub use types::{
    CodeLanguage, DEFAULT_IMAGE_MAX_BYTES, DEFAULT_MIN_ANSWER_CHARS, DEFAULT_MIN_QUESTION_CHARS,
    EDITOR_PLACEHOLDER,
};
