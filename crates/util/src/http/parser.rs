//! # Response Parsing
//!
//! Strict JSON decoding of success bodies. A failure keeps the status and a
//! short single-line excerpt of the body so decode errors can be logged
//! without dumping whole HTML pages.

use serde_json::Value;
use thiserror::Error;

use crate::text_processing::truncate_chars;

const BODY_EXCERPT_CHARS: usize = 200;

/// Decode a response body as JSON.
///
/// An empty or whitespace-only body decodes to `Value::Null` (e.g. `204 No
/// Content`).
///
/// # Errors
/// Returns a [`JsonParseError`] carrying `status` and up to 200 characters
/// of the body on a single line.
pub fn parse_response_json_strict(text: &str, status: Option<u16>) -> Result<Value, JsonParseError> {
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(text).map_err(|source| JsonParseError {
        status,
        source,
        excerpt: body_excerpt(text),
    })
}

fn body_excerpt(text: &str) -> String {
    let single_line = text.split_whitespace().collect::<Vec<_>>().join(" ");
    let excerpt = truncate_chars(&single_line, BODY_EXCERPT_CHARS);
    if excerpt.len() < single_line.len() {
        format!("{excerpt}...")
    } else {
        excerpt
    }
}

/// A success body that is not valid JSON.
#[derive(Debug, Error)]
#[error("response body is not JSON (status {}): {source}; body: {excerpt}", status_label(.status))]
pub struct JsonParseError {
    status: Option<u16>,
    #[source]
    source: serde_json::Error,
    excerpt: String,
}

fn status_label(status: &Option<u16>) -> String {
    status.map_or_else(|| "unknown".to_string(), |code| code.to_string())
}

impl JsonParseError {
    pub fn status(&self) -> Option<u16> {
        self.status
    }

    /// Single-line excerpt of the offending body.
    pub fn body_preview(&self) -> &str {
        &self.excerpt
    }
}
