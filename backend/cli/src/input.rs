//! Reading command input from a file or stdin.

use std::path::Path;

use anyhow::{Context, Result};
use tokio::io::AsyncReadExt;

/// `-` reads stdin to the end; anything else is a file path.
pub async fn read_input(source: &str) -> Result<String> {
    if source == "-" {
        let mut buf = String::new();
        tokio::io::stdin()
            .read_to_string(&mut buf)
            .await
            .context("Failed to read stdin")?;
        return Ok(buf);
    }
    tokio::fs::read_to_string(Path::new(source))
        .await
        .with_context(|| format!("Failed to read input file: {source}"))
}
