//! AnswerKit configuration schema.
//!
//! Every field is optional in the file; `defaults::apply_all_defaults`
//! fills the gaps and the `*_settings` accessors give typed views.

use std::path::PathBuf;

use answerkit_blocks::ImagePolicy;
use answerkit_content::ContentSettings;
use answerkit_core::{
    CodeLanguage, DEFAULT_IMAGE_MAX_BYTES, DEFAULT_MIN_ANSWER_CHARS, DEFAULT_MIN_QUESTION_CHARS,
    EDITOR_PLACEHOLDER,
};
use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerKitConfig {
    /// Validation thresholds and editor defaults
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<ContentConfig>,

    /// Inline image limits
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<ImagesConfig>,

    /// Logging configuration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_answer_chars: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_question_chars: Option<usize>,
    /// Language tag for code without an explicit one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholders: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImagesConfig {
    /// Decoded size cap for data-URI images.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_bytes: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_remote: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggingConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    /// Directory for rolling NDJSON logs; console only when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub json: Option<bool>,
}

impl AnswerKitConfig {
    /// Content settings, with built-in values for anything unset.
    ///
    /// An unparseable language tag falls back to the default language;
    /// `validate` reports it.
    pub fn content_settings(&self) -> ContentSettings {
        let content = self.content.clone().unwrap_or_default();
        ContentSettings {
            min_answer_chars: content.min_answer_chars.unwrap_or(DEFAULT_MIN_ANSWER_CHARS),
            min_question_chars: content
                .min_question_chars
                .unwrap_or(DEFAULT_MIN_QUESTION_CHARS),
            default_language: CodeLanguage::from_tag_or_default(
                content.default_language.as_deref(),
            ),
            placeholders: content
                .placeholders
                .unwrap_or_else(|| vec![EDITOR_PLACEHOLDER.to_string()]),
        }
    }

    pub fn image_policy(&self) -> ImagePolicy {
        let images = self.images.clone().unwrap_or_default();
        ImagePolicy {
            max_bytes: images.max_bytes.unwrap_or(DEFAULT_IMAGE_MAX_BYTES),
            allow_remote: images.allow_remote.unwrap_or(true),
        }
    }

    pub fn log_level(&self) -> &str {
        self.logging
            .as_ref()
            .and_then(|l| l.level.as_deref())
            .unwrap_or(crate::defaults::DEFAULT_LOG_LEVEL)
    }
}
