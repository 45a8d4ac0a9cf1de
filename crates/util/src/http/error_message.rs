//! # Error Message Extraction
//!
//! Turns the body of a failed API response into the single sentence shown
//! to the user. The upstream API answers errors in several shapes: JSON
//! envelopes with `message` or `error`, framework HTML error pages with the
//! detail inside `<pre>`, and plain text. Validation failures from the ORM
//! layer are rewritten into short "Field is required." sentences.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::text_processing::truncate_chars;

const RAW_BODY_LIMIT: usize = 200;
const LINE_BREAK_TAG: &str = "<br>";

static PRE_BLOCK: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"(?is)<pre[^>]*>(.*?)</pre>").ok());
static REQUIRED_PATH: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"Path `([^`]+)` is required").ok());

/// Build the user-facing message for a non-success response.
///
/// Priority: JSON `message`, JSON `error`, HTML `<pre>` content, then the raw
/// body truncated to 200 characters. The result is passed through
/// [`clean_validation_message`] and cut at the first literal `<br>`. An
/// empty outcome falls back to `Request failed with status <code>`.
///
/// # Example
/// ```rust
/// use stitch_util::http::extract_error_message;
///
/// let body = r#"{"message":"Order validation failed: customer: Path `customer` is required."}"#;
/// assert_eq!(extract_error_message(body, 400), "Customer is required.");
///
/// let page = "<html><body><pre>Not allowed<br> &nbsp;at handler</pre></body></html>";
/// assert_eq!(extract_error_message(page, 403), "Not allowed");
///
/// assert_eq!(extract_error_message("", 502), "Request failed with status 502");
/// ```
pub fn extract_error_message(body: &str, status: u16) -> String {
    let trimmed = body.trim();
    let raw = match serde_json::from_str::<Value>(trimmed) {
        Ok(value) => message_from_json(&value).unwrap_or_else(|| truncate_chars(trimmed, RAW_BODY_LIMIT)),
        Err(_) => message_from_pre_block(trimmed).unwrap_or_else(|| truncate_chars(trimmed, RAW_BODY_LIMIT)),
    };

    let cleaned = clean_validation_message(&raw);
    let message = match cleaned.find(LINE_BREAK_TAG) {
        Some(index) => cleaned[..index].trim().to_string(),
        None => cleaned.trim().to_string(),
    };

    if message.is_empty() {
        return format!("Request failed with status {status}");
    }
    message
}

fn message_from_json(value: &Value) -> Option<String> {
    let object = value.as_object()?;
    ["message", "error"].iter().find_map(|key| match object.get(*key)? {
        Value::String(text) if !text.trim().is_empty() => Some(text.clone()),
        Value::Object(nested) => nested
            .get("message")
            .and_then(Value::as_str)
            .filter(|text| !text.trim().is_empty())
            .map(str::to_string),
        _ => None,
    })
}

fn message_from_pre_block(body: &str) -> Option<String> {
    let pattern = PRE_BLOCK.as_ref()?;
    let captured = pattern.captures(body)?.get(1)?.as_str();
    let decoded = decode_basic_entities(captured);
    let decoded = decoded.trim();
    if decoded.is_empty() { None } else { Some(decoded.to_string()) }
}

fn decode_basic_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

/// Rewrite ORM validation failures into friendly sentences.
///
/// Every ``Path `field` is required`` fragment becomes `Field is required.`;
/// the surrounding `... validation failed: field:` noise is dropped. Messages
/// without such fragments are returned unchanged.
///
/// # Example
/// ```rust
/// use stitch_util::http::clean_validation_message;
///
/// let raw = "Validation failed: name: Path `name` is required., email: Path `email` is required.";
/// assert_eq!(clean_validation_message(raw), "Name is required. Email is required.");
/// assert_eq!(clean_validation_message("Not found"), "Not found");
/// ```
pub fn clean_validation_message(message: &str) -> String {
    let Some(pattern) = REQUIRED_PATH.as_ref() else {
        return message.to_string();
    };
    let (head, tail) = match message.find(LINE_BREAK_TAG) {
        Some(index) => message.split_at(index),
        None => (message, ""),
    };
    let sentences: Vec<String> = pattern
        .captures_iter(head)
        .filter_map(|captures| captures.get(1))
        .map(|field| format!("{} is required.", capitalize_first(field.as_str())))
        .collect();
    if sentences.is_empty() {
        return message.to_string();
    }
    format!("{}{}", sentences.join(" "), tail)
}

fn capitalize_first(text: &str) -> String {
    let mut characters = text.chars();
    match characters.next() {
        Some(first) => first.to_uppercase().chain(characters).collect(),
        None => String::new(),
    }
}
