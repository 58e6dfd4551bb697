//! Config defaults: fills every unset field with its built-in value.

use answerkit_core::{
    CodeLanguage, DEFAULT_IMAGE_MAX_BYTES, DEFAULT_MIN_ANSWER_CHARS, DEFAULT_MIN_QUESTION_CHARS,
    EDITOR_PLACEHOLDER,
};

use crate::schema::{AnswerKitConfig, ContentConfig, ImagesConfig, LoggingConfig};

pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Apply all defaults to a freshly loaded config.
pub fn apply_all_defaults(config: AnswerKitConfig) -> AnswerKitConfig {
    let config = apply_content_defaults(config);
    let config = apply_image_defaults(config);
    apply_logging_defaults(config)
}

fn apply_content_defaults(mut config: AnswerKitConfig) -> AnswerKitConfig {
    let content = config.content.get_or_insert_with(ContentConfig::default);
    content.min_answer_chars.get_or_insert(DEFAULT_MIN_ANSWER_CHARS);
    content
        .min_question_chars
        .get_or_insert(DEFAULT_MIN_QUESTION_CHARS);
    content
        .default_language
        .get_or_insert_with(|| CodeLanguage::default().tag().to_string());
    content
        .placeholders
        .get_or_insert_with(|| vec![EDITOR_PLACEHOLDER.to_string()]);
    config
}

fn apply_image_defaults(mut config: AnswerKitConfig) -> AnswerKitConfig {
    let images = config.images.get_or_insert_with(ImagesConfig::default);
    images.max_bytes.get_or_insert(DEFAULT_IMAGE_MAX_BYTES);
    images.allow_remote.get_or_insert(true);
    config
}

/// `dir` stays unset: file logging is opt-in.
fn apply_logging_defaults(mut config: AnswerKitConfig) -> AnswerKitConfig {
    let logging = config.logging.get_or_insert_with(LoggingConfig::default);
    logging
        .level
        .get_or_insert_with(|| DEFAULT_LOG_LEVEL.to_string());
    logging.json.get_or_insert(false);
    config
}
