//! The `blocks` subcommand: normalize a stored block array and replay edits.

use anyhow::{Context, Result};
use answerkit_blocks::{blocks_to_markup, render_blocks, BlockOp, BlockSession, ImagePolicy, LoadOutcome};
use clap::ValueEnum;

use crate::terminal_output::note_warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BlocksFormat {
    /// Normalized storage JSON
    Json,
    /// Canonical sanitized markup
    Markup,
    /// Display tree as JSON
    Rendered,
}

/// Loads `stored`, applies the optional JSON op script, and formats the
/// resulting document.
pub fn run(
    stored: &str,
    ops: Option<&str>,
    format: BlocksFormat,
    images: ImagePolicy,
) -> Result<String> {
    let (mut session, outcome) = BlockSession::open(Some(stored), images);
    match &outcome {
        LoadOutcome::WrappedRaw { reason } => {
            note_warn(&format!("input is not a block array ({reason}); wrapped as text"));
        }
        LoadOutcome::Parsed {
            skipped,
            reassigned_ids,
        } if *skipped > 0 || *reassigned_ids > 0 => {
            note_warn(&format!(
                "{skipped} record(s) skipped, {reassigned_ids} id(s) reassigned"
            ));
        }
        _ => {}
    }

    if let Some(script) = ops {
        let ops: Vec<BlockOp> =
            serde_json::from_str(script).context("Failed to parse block op script")?;
        session.apply_all(ops)?;
    }

    let out = match format {
        BlocksFormat::Json => serde_json::to_string_pretty(session.document())?,
        BlocksFormat::Markup => blocks_to_markup(session.document()),
        BlocksFormat::Rendered => serde_json::to_string_pretty(&render_blocks(session.document()))?,
    };
    Ok(out)
}
