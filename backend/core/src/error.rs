use thiserror::Error;

/// Top-level error type for the AnswerKit content pipeline.
///
/// Pipeline stages themselves are total; only operations that reject user
/// input outright return this.
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("unknown code language: {0}")]
    UnknownLanguage(String),

    #[error("image payload is not an image ({0})")]
    NotAnImage(String),

    #[error("image payload is neither a data URI nor an http(s) URL")]
    UnsupportedImageSource,

    #[error("image payload is {size} bytes, limit is {limit}")]
    ImageTooLarge { size: usize, limit: usize },

    #[error("image payload is not valid base64: {0}")]
    InvalidBase64(String),

    #[error("no block with id {0}")]
    BlockNotFound(String),

    #[error("block {0} is not an image block")]
    NotAnImageBlock(String),
}
