//! Log Redaction
//!
//! Inline images travel as base64 data URIs; they are shortened before they
//! reach a log line.

use regex::Regex;
use std::sync::LazyLock;

/// Longest string (in characters) written to a log field.
pub const MAX_LOGGED_CHARS: usize = 2048;

static DATA_URI_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"data:([a-zA-Z0-9.+/-]+);base64,([A-Za-z0-9+/=]+)").unwrap());

/// Replaces base64 payloads with their length and truncates the result.
pub fn redact_data_uris(input: &str) -> String {
    let redacted = DATA_URI_RE.replace_all(input, |caps: &regex::Captures<'_>| {
        format!("data:{};base64,[{} bytes elided]", &caps[1], caps[2].len())
    });

    if redacted.chars().count() <= MAX_LOGGED_CHARS {
        return redacted.into_owned();
    }
    let mut truncated: String = redacted.chars().take(MAX_LOGGED_CHARS).collect();
    truncated.push_str("...[truncated]");
    truncated
}
