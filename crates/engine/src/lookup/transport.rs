use async_trait::async_trait;
use serde_json::Value;
use stitch_api::{ApiError, ApiRequest, StitchClient};

/// Source of raw lookup payloads.
///
/// Strategies only ever issue authenticated or anonymous GETs against an
/// endpoint; this seam lets tests substitute an in-memory transport.
#[async_trait]
pub trait LookupTransport: Send + Sync {
    async fn fetch(&self, endpoint: &str, with_auth: bool) -> Result<Value, ApiError>;
}

#[async_trait]
impl LookupTransport for StitchClient {
    async fn fetch(&self, endpoint: &str, with_auth: bool) -> Result<Value, ApiError> {
        self.request(ApiRequest::get(endpoint).with_auth(with_auth)).await
    }
}
