//! The `check-config` subcommand.

use std::path::Path;

use anyhow::Result;
use answerkit_config::{collect_referenced_vars, load_and_prepare, load_config};

use crate::terminal_output::{note_error, note_info, note_success, note_warn};

/// Loads and validates the config file. Returns whether it is usable.
pub async fn run(path: &Path) -> Result<bool> {
    note_info(&format!("Checking {}", path.display()));
    if !path.exists() {
        note_info("No config file found; built-in defaults apply");
    }

    let raw = load_config(path).await?;
    let vars = collect_referenced_vars(&serde_json::to_value(&raw)?);
    if !vars.is_empty() {
        note_info(&format!("Environment variables referenced: {}", vars.join(", ")));
    }

    let (config, report) = load_and_prepare(path).await?;
    for warning in &report.warnings {
        note_warn(&format!("{}: {}", warning.path, warning.message));
    }
    for error in &report.errors {
        note_error(&format!("{}: {}", error.path, error.message));
    }

    if report.is_valid() {
        let settings = config.content_settings();
        note_success(&format!(
            "Config OK (minAnswerChars={}, defaultLanguage={}, log level={})",
            settings.min_answer_chars,
            settings.default_language,
            config.log_level()
        ));
    }
    Ok(report.is_valid())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn invalid_config_fails_check() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "images:\n  maxBytes: 0\n").unwrap();
        assert!(!run(&path).await.unwrap());
    }

    #[tokio::test]
    async fn missing_config_passes() {
        let dir = tempfile::tempdir().unwrap();
        assert!(run(&dir.path().join("config.yaml")).await.unwrap());
    }
}
