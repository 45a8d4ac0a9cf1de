//! Stitch utility helpers.
//!
//! - `http`: response parsing, error-message extraction and URL assembly
//! - `text_processing`: redaction and character-safe truncation

pub mod http;
pub mod text_processing;

pub use http::*;
pub use text_processing::{redact_sensitive, truncate_chars};
