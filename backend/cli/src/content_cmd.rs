//! Markup and answer-content subcommands.
//!
//! Handlers return the text to print so they can be tested without a
//! terminal.

use anyhow::Result;
use answerkit_blocks::blocks_to_markup;
use answerkit_content::{project, AnswerContent, ContentPipeline, ValidationOutcome};
use answerkit_markup::{sanitize_with_report, ContentRepairer};
use tracing::debug;

pub fn repair(raw: &str, pipeline: &ContentPipeline) -> String {
    let repairer = ContentRepairer::new(pipeline.settings().default_language);
    let (out, report) = repairer.repair_with_report(raw);
    debug!(
        runs = report.runs_merged,
        lines = report.lines_merged,
        containers = report.containers_normalized,
        "repair finished"
    );
    out
}

pub fn sanitize(raw: &str) -> String {
    let (out, report) = sanitize_with_report(raw);
    debug!(
        elements = report.elements_removed,
        attributes = report.attributes_removed,
        "sanitize finished"
    );
    out
}

/// Repair + sanitize. With `json`, prints the storage payload and its
/// projection instead of the bare markup.
pub fn ingest(raw: &str, pipeline: &ContentPipeline, json: bool) -> Result<String> {
    if !json {
        return Ok(pipeline.ingest_markup(raw));
    }
    let prepared = pipeline.prepare_for_storage(&AnswerContent::Markup(raw.to_string()));
    Ok(serde_json::to_string_pretty(&prepared)?)
}

/// Renders stored content of either representation.
///
/// Without `json` the result is display markup: block documents are first
/// converted to canonical markup.
pub fn render(raw: &str, pipeline: &ContentPipeline, json: bool) -> Result<String> {
    let content = AnswerContent::sniff(raw);
    if json {
        return Ok(serde_json::to_string_pretty(&pipeline.render(&content))?);
    }
    let html = match &content {
        AnswerContent::Markup(markup) => pipeline.render_markup(markup).html,
        AnswerContent::Blocks(doc) => pipeline.render_markup(&blocks_to_markup(doc)).html,
        AnswerContent::Empty => String::new(),
    };
    Ok(html)
}

pub fn project_content(raw: &str) -> Result<String> {
    let projection = project(&AnswerContent::sniff(raw));
    Ok(serde_json::to_string_pretty(&projection)?)
}

pub fn validate(question: &str, raw: &str, pipeline: &ContentPipeline) -> ValidationOutcome {
    pipeline.validate(question, &AnswerContent::sniff(raw))
}
