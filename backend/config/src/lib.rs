//! `answerkit-config`: runtime configuration.
//!
//! Provides:
//! - Typed config schema (content thresholds, image limits, logging)
//! - YAML read/write with atomic replace
//! - `${ENV_VAR}` substitution
//! - Default value application
//! - Validation with path-qualified errors and warnings

pub mod defaults;
pub mod env;
pub mod io;
pub mod schema;
pub mod validation;

pub use defaults::{apply_all_defaults, DEFAULT_LOG_LEVEL};
pub use env::{collect_referenced_vars, resolve_env_vars, resolve_env_vars_with, MissingEnvVarError};
pub use io::{config_dir, config_file_path, load_config, write_config, CONFIG_DIR_ENV};
pub use schema::{AnswerKitConfig, ContentConfig, ImagesConfig, LoggingConfig};
pub use validation::{validate, ConfigValidationError, ValidationReport};

use anyhow::{Context, Result};
use serde_json::Value;
use std::path::Path;

/// Load a config file, substitute env vars, apply defaults, and validate.
///
/// Validation problems are logged and returned alongside the config so the
/// caller decides whether errors are fatal.
pub async fn load_and_prepare(path: &Path) -> Result<(AnswerKitConfig, ValidationReport)> {
    let raw_config = load_config(path).await?;

    let value: Value =
        serde_json::to_value(&raw_config).context("Failed to serialize config for processing")?;
    let value = resolve_env_vars(&value).context("Failed to resolve env vars in config")?;
    let config: AnswerKitConfig =
        serde_json::from_value(value).context("Failed to deserialize config after processing")?;

    let config = apply_all_defaults(config);

    let report = validate(&config);
    for warning in &report.warnings {
        tracing::warn!(path = %warning.path, message = %warning.message, "Config warning");
    }
    for error in &report.errors {
        tracing::error!(path = %error.path, message = %error.message, "Config error");
    }

    Ok((config, report))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn prepares_missing_file_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let (cfg, report) = load_and_prepare(&dir.path().join("config.yaml")).await.unwrap();
        assert!(report.is_valid());
        assert_eq!(cfg.content_settings().min_answer_chars, 10);
        assert_eq!(cfg.log_level(), "info");
    }

    #[tokio::test]
    async fn reports_invalid_language() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "content:\n  defaultLanguage: cobol\n").unwrap();
        let (cfg, report) = load_and_prepare(&path).await.unwrap();
        assert!(!report.is_valid());
        assert_eq!(
            cfg.content_settings().default_language,
            answerkit_core::CodeLanguage::Java
        );
    }
}
