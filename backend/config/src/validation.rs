//! Config validation with path-qualified messages.

use answerkit_core::CodeLanguage;
use thiserror::Error;

use crate::schema::AnswerKitConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error", "off"];

#[derive(Debug, Error)]
#[error("Config validation error at '{path}': {message}")]
pub struct ConfigValidationError {
    pub path: String,
    pub message: String,
}

/// Everything found wrong in one pass.
#[derive(Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }

    fn warn(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }
}

pub fn validate(config: &AnswerKitConfig) -> ValidationReport {
    let mut report = ValidationReport::default();
    validate_content(config, &mut report);
    validate_images(config, &mut report);
    validate_logging(config, &mut report);
    report
}

fn validate_content(config: &AnswerKitConfig, report: &mut ValidationReport) {
    let Some(content) = &config.content else { return };

    if content.min_answer_chars == Some(0) {
        report.warn(
            "content.minAnswerChars",
            "minAnswerChars is 0; only empty answers will be rejected",
        );
    }
    if content.min_question_chars == Some(0) {
        report.warn(
            "content.minQuestionChars",
            "minQuestionChars is 0; blank questions are still rejected",
        );
    }
    if let Some(lang) = &content.default_language {
        if lang.parse::<CodeLanguage>().is_err() {
            let known: Vec<_> = CodeLanguage::ALL.iter().map(|l| l.tag()).collect();
            report.error(
                "content.defaultLanguage",
                format!("Unknown language '{lang}'. Use one of: {}", known.join(", ")),
            );
        }
    }
    if let Some(placeholders) = &content.placeholders {
        for (i, p) in placeholders.iter().enumerate() {
            if p.trim().is_empty() {
                report.error(
                    format!("content.placeholders[{i}]"),
                    "Placeholder text cannot be empty",
                );
            }
        }
    }
}

fn validate_images(config: &AnswerKitConfig, report: &mut ValidationReport) {
    let Some(images) = &config.images else { return };
    if images.max_bytes == Some(0) {
        report.error("images.maxBytes", "maxBytes must be > 0");
    }
}

fn validate_logging(config: &AnswerKitConfig, report: &mut ValidationReport) {
    let Some(logging) = &config.logging else { return };
    if let Some(level) = &logging.level {
        if !LOG_LEVELS.contains(&level.to_ascii_lowercase().as_str()) {
            report.warn(
                "logging.level",
                format!("Unknown log level '{level}'; RUST_LOG-style directives are passed through"),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{ContentConfig, ImagesConfig, LoggingConfig};

    #[test]
    fn empty_config_is_valid() {
        let report = validate(&AnswerKitConfig::default());
        assert!(report.is_valid(), "errors: {:?}", report.errors);
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn defaults_are_valid() {
        let cfg = crate::defaults::apply_all_defaults(AnswerKitConfig::default());
        assert!(validate(&cfg).is_valid());
    }

    #[test]
    fn unknown_language_is_error() {
        let cfg = AnswerKitConfig {
            content: Some(ContentConfig {
                default_language: Some("cobol".into()),
                ..Default::default()
            }),
            ..Default::default()
        };
        let report = validate(&cfg);
        assert!(!report.is_valid());
        assert_eq!(report.errors[0].path, "content.defaultLanguage");
        assert!(report.errors[0].message.contains("cobol"));
    }

    #[test]
    fn zero_thresholds_warn() {
        let cfg = AnswerKitConfig {
            content: Some(ContentConfig {
                min_answer_chars: Some(0),
                ..Default::default()
            }),
            images: Some(ImagesConfig {
                max_bytes: Some(0),
                ..Default::default()
            }),
            logging: Some(LoggingConfig {
                level: Some("verbose".into()),
                ..Default::default()
            }),
        };
        let report = validate(&cfg);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].path, "images.maxBytes");
        let warned: Vec<_> = report.warnings.iter().map(|w| w.path.as_str()).collect();
        assert_eq!(warned, vec!["content.minAnswerChars", "logging.level"]);
    }
}
