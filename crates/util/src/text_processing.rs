//! # Text Processing Utilities
//!
//! Redaction of credentials before text reaches logs, and truncation that
//! never splits a multi-byte character.

use once_cell::sync::Lazy;
use regex::Regex;

/// Redacts values that look like credentials in a string.
///
/// Covers `Authorization` headers, inline bearer tokens, and the
/// `refresh_token`/`access_token` cookie or query assignments the dashboard
/// API uses. Key names are preserved so logs stay readable.
///
/// # Example
/// ```rust
/// use stitch_util::redact_sensitive;
///
/// let redacted = redact_sensitive("Cookie: theme=dark; refresh_token=abc.def.ghi");
/// assert_eq!(redacted, "Cookie: theme=dark; refresh_token=[REDACTED]");
///
/// let redacted = redact_sensitive("Authorization: Bearer secret123");
/// assert_eq!(redacted, "Authorization: [REDACTED]");
/// ```
pub fn redact_sensitive(input: &str) -> String {
    let mut redacted = input.to_string();
    for pattern in redact_patterns().iter() {
        redacted = pattern
            .replace_all(&redacted, |captures: &regex::Captures| {
                let prefix = captures.get(1).map(|m| m.as_str()).unwrap_or("");
                format!("{prefix}[REDACTED]")
            })
            .to_string();
    }
    redacted
}

fn redact_patterns() -> &'static Vec<Regex> {
    static REDACT_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
        [
            r"(?i)(authorization:\s+)([^\s]+(?:\s+[^\s;]+)?)",
            r"(?i)((?:^|\b)Bearer\s+)([A-Za-z0-9\-._~+/]+=*)",
            r"(?i)((?:refresh|access)_token=)([^\s;&]+)",
            r#"(?i)("(?:refresh|access)_?token"\s*:\s*)("[^"]*")"#,
        ]
        .iter()
        .filter_map(|pattern| Regex::new(pattern).ok())
        .collect()
    });
    &REDACT_PATTERNS
}

/// Truncate `text` to at most `max_chars` characters.
///
/// Counts characters rather than bytes, so multi-byte text is never split.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => text[..byte_index].to_string(),
        None => text.to_string(),
    }
}
