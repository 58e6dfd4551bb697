use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ContentError;

/// Projected answers shorter than this (in characters) fail validation.
pub const DEFAULT_MIN_ANSWER_CHARS: usize = 10;

/// Questions must project to at least this many characters.
pub const DEFAULT_MIN_QUESTION_CHARS: usize = 1;

/// Largest decoded image payload accepted into an image block (5 MiB).
pub const DEFAULT_IMAGE_MAX_BYTES: usize = 5 * 1024 * 1024;

/// Text the WYSIWYG surface seeds an empty answer with.
pub const EDITOR_PLACEHOLDER: &str = "Start writing your answer here...";

/// Languages a code block can be tagged with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CodeLanguage {
    #[default]
    Java,
    Javascript,
    Python,
    Sql,
    Bash,
    Json,
}

impl CodeLanguage {
    pub const ALL: [CodeLanguage; 6] = [
        CodeLanguage::Java,
        CodeLanguage::Javascript,
        CodeLanguage::Python,
        CodeLanguage::Sql,
        CodeLanguage::Bash,
        CodeLanguage::Json,
    ];

    /// Tag used in JSON and in `language-<tag>` classes.
    pub fn tag(self) -> &'static str {
        match self {
            CodeLanguage::Java => "java",
            CodeLanguage::Javascript => "javascript",
            CodeLanguage::Python => "python",
            CodeLanguage::Sql => "sql",
            CodeLanguage::Bash => "bash",
            CodeLanguage::Json => "json",
        }
    }

    /// Human-readable label shown above rendered code.
    pub fn label(self) -> &'static str {
        match self {
            CodeLanguage::Java => "Java",
            CodeLanguage::Javascript => "JavaScript",
            CodeLanguage::Python => "Python",
            CodeLanguage::Sql => "SQL",
            CodeLanguage::Bash => "Bash",
            CodeLanguage::Json => "JSON",
        }
    }

    /// Lenient lookup used on stored data: unknown or missing tags become the default.
    pub fn from_tag_or_default(tag: Option<&str>) -> Self {
        tag.and_then(|t| t.parse().ok()).unwrap_or_default()
    }
}

impl FromStr for CodeLanguage {
    type Err = ContentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        CodeLanguage::ALL
            .into_iter()
            .find(|lang| lang.tag() == needle)
            .ok_or_else(|| ContentError::UnknownLanguage(s.to_string()))
    }
}

impl fmt::Display for CodeLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}
