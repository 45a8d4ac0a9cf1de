//! Stitch dashboard API client.
//!
//! A thin wrapper over a configured `reqwest::Client` for the dashboard's
//! REST API. It focuses on:
//!
//! - Building `{base}/{endpoint}[/{slug-or-id}]` URLs against a validated base
//! - Attaching `Authorization: Bearer <refresh_token>` from a [`CredentialSource`]
//! - Decoding JSON bodies and turning failures into a single [`ApiError`]
//!   whose message is ready to show to the user
//!
//! The client never retries; fallbacks belong to the caller.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use stitch_api::{ApiRequest, CookieJar, StitchClient};
//!
//! let client = StitchClient::builder("http://localhost:5000/api")
//!     .credentials(Arc::new(CookieJar::from_env()))
//!     .build()?;
//! let customers = client.request(ApiRequest::get("customers")).await?;
//! ```

mod credentials;
mod error;
mod request;

use std::{
    env,
    sync::Arc,
    time::{Duration, Instant},
};

pub use credentials::{COOKIE_ENV_VAR, CookieJar, CredentialSource, NoCredentials, REFRESH_TOKEN_COOKIE};
pub use error::{ApiError, ApiErrorKind, DECODE_ERROR_MESSAGE, NETWORK_ERROR_MESSAGE};
pub use request::{ApiRequest, RequestBody};

use reqwest::{Client, Method, Url, header};
use serde_json::Value;
use stitch_util::http::{extract_error_message, join_endpoint_url, parse_response_json_strict};
use tracing::{debug, warn};

/// Default transport timeout for the underlying HTTP client.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
/// Hostnames allowed to use plain HTTP.
const LOCALHOST_DOMAINS: &[&str] = &["localhost", "127.0.0.1"];

/// Builder for [`StitchClient`].
#[derive(Debug)]
pub struct StitchClientBuilder {
    base_url: String,
    timeout: Duration,
    user_agent: Option<String>,
    credentials: Arc<dyn CredentialSource>,
}

impl StitchClientBuilder {
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    pub fn credentials(mut self, credentials: Arc<dyn CredentialSource>) -> Self {
        self.credentials = credentials;
        self
    }

    /// Validate the base URL and construct the client.
    pub fn build(self) -> Result<StitchClient, ApiError> {
        validate_base_url(&self.base_url)?;
        let http = Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|error| ApiError::invalid_request(format!("Could not build the HTTP client: {error}")))?;
        Ok(StitchClient {
            base_url: self.base_url.trim_end_matches('/').to_string(),
            http,
            user_agent: self
                .user_agent
                .unwrap_or_else(|| format!("stitch/{}; {}", env!("CARGO_PKG_VERSION"), env::consts::OS)),
            credentials: self.credentials,
        })
    }
}

/// Configured client for the dashboard REST API.
#[derive(Debug, Clone)]
pub struct StitchClient {
    base_url: String,
    http: Client,
    user_agent: String,
    credentials: Arc<dyn CredentialSource>,
}

impl StitchClient {
    /// Start building a client for `base_url` with no credentials.
    pub fn builder(base_url: impl Into<String>) -> StitchClientBuilder {
        StitchClientBuilder {
            base_url: base_url.into(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: None,
            credentials: Arc::new(NoCredentials),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL a request will be sent to.
    pub fn request_url(&self, request: &ApiRequest) -> String {
        join_endpoint_url(&self.base_url, &request.endpoint, request.path_segment())
    }

    /// Perform a request and decode the JSON response.
    ///
    /// Success bodies are returned untyped; an empty body decodes to
    /// `Value::Null`. Non-success statuses carry the message produced by
    /// [`extract_error_message`].
    pub async fn request(&self, request: ApiRequest) -> Result<Value, ApiError> {
        let start = Instant::now();
        let url = self.request_url(&request);
        let method = request.method.clone();
        debug!(method = %method, url = %url, with_auth = request.with_auth, "http request started");

        let mut builder = self
            .http
            .request(method.clone(), &url)
            .header(header::USER_AGENT, &self.user_agent);

        builder = match request.body {
            Some(RequestBody::Raw(bytes)) => builder.body(bytes),
            Some(RequestBody::Json(body)) => builder.header(header::CONTENT_TYPE, "application/json").json(&body),
            None => builder.header(header::CONTENT_TYPE, "application/json"),
        };

        if request.with_auth
            && let Some(token) = self.credentials.bearer_token()
        {
            builder = builder.bearer_auth(token);
        }

        let response = builder.send().await.map_err(|error| {
            warn!(
                method = %method,
                url = %url,
                error = %error,
                duration_ms = start.elapsed().as_millis(),
                "http request failed to send"
            );
            ApiError::transport()
        })?;

        let status = response.status();
        let body_text = response.text().await.map_err(|error| {
            warn!(method = %method, url = %url, status = %status, error = %error, "http response body unreadable");
            ApiError::transport()
        })?;

        if !status.is_success() {
            let message = extract_error_message(&body_text, status.as_u16());
            warn!(
                method = %method,
                url = %url,
                status = %status,
                message = %stitch_util::redact_sensitive(&message),
                duration_ms = start.elapsed().as_millis(),
                "http request returned error status"
            );
            return Err(ApiError::http(status.as_u16(), message));
        }

        let parsed = parse_response_json_strict(&body_text, Some(status.as_u16())).map_err(|error| {
            warn!(
                method = %method,
                url = %url,
                status = %status,
                body_len = body_text.len(),
                error = %stitch_util::redact_sensitive(&error.to_string()),
                "http response JSON parse failed"
            );
            ApiError::decode()
        })?;
        debug!(
            method = %method,
            url = %url,
            status = %status,
            duration_ms = start.elapsed().as_millis(),
            "http request completed"
        );
        Ok(parsed)
    }

    pub async fn get(&self, endpoint: &str, with_auth: bool) -> Result<Value, ApiError> {
        self.request(ApiRequest::get(endpoint).with_auth(with_auth)).await
    }

    pub async fn post(&self, endpoint: &str, body: Value) -> Result<Value, ApiError> {
        self.request(ApiRequest::new(Method::POST, endpoint).json(body)).await
    }

    pub async fn put(&self, endpoint: &str, id: &str, body: Value) -> Result<Value, ApiError> {
        self.request(ApiRequest::new(Method::PUT, endpoint).id(id).json(body)).await
    }

    pub async fn patch(&self, endpoint: &str, id: &str, body: Value) -> Result<Value, ApiError> {
        self.request(ApiRequest::new(Method::PATCH, endpoint).id(id).json(body)).await
    }

    pub async fn delete(&self, endpoint: &str, id: &str) -> Result<Value, ApiError> {
        self.request(ApiRequest::new(Method::DELETE, endpoint).id(id)).await
    }
}

/// Validate that a base URL is acceptable for use by the client.
///
/// Rules:
/// - `localhost` or `127.0.0.1`: any scheme is allowed
/// - otherwise: scheme must be HTTPS
fn validate_base_url(base: &str) -> Result<(), ApiError> {
    let parsed_base_url =
        Url::parse(base).map_err(|error| ApiError::invalid_request(format!("Invalid API base URL '{base}': {error}")))?;

    let host_name = parsed_base_url
        .host_str()
        .ok_or_else(|| ApiError::invalid_request("API base URL must include a host"))?;

    if LOCALHOST_DOMAINS
        .iter()
        .any(|&allowed| host_name.eq_ignore_ascii_case(allowed))
    {
        return Ok(());
    }

    if parsed_base_url.scheme() != "https" {
        return Err(ApiError::invalid_request(format!(
            "API base URL must use https for non-localhost hosts; got '{}://'",
            parsed_base_url.scheme()
        )));
    }
    Ok(())
}
