use thiserror::Error;

/// Message used for every transport-level failure.
pub const NETWORK_ERROR_MESSAGE: &str = "Network error. Please check your connection and try again.";
/// Message used when a successful response carries a body that is not JSON.
pub const DECODE_ERROR_MESSAGE: &str = "Received an invalid response from the server.";

/// Where in the request lifecycle an [`ApiError`] originated.
///
/// Diagnostic only: callers render [`ApiError::message`] and nothing else.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    /// The request never produced a response (DNS, refused connection, timeout).
    Transport,
    /// The server answered with a non-success status.
    Http { status: u16 },
    /// A success response whose body could not be decoded as JSON.
    Decode,
    /// The request could not be built (bad base URL, bad header value).
    InvalidRequest,
}

/// The single error surface of the API client.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct ApiError {
    kind: ApiErrorKind,
    message: String,
}

impl ApiError {
    pub fn new(kind: ApiErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn transport() -> Self {
        Self::new(ApiErrorKind::Transport, NETWORK_ERROR_MESSAGE)
    }

    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Http { status }, message)
    }

    pub fn decode() -> Self {
        Self::new(ApiErrorKind::Decode, DECODE_ERROR_MESSAGE)
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::InvalidRequest, message)
    }

    pub fn kind(&self) -> ApiErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}
