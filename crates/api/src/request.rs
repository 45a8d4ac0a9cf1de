use reqwest::Method;
use serde_json::Value;

/// Payload attached to a request.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// Serialized as JSON with `Content-Type: application/json`.
    Json(Value),
    /// Sent as-is with no `Content-Type`, so the transport can describe it
    /// (file uploads, pre-encoded multipart bodies).
    Raw(Vec<u8>),
}

/// Description of one API call relative to the client's base URL.
///
/// Requests are authenticated by default; use [`ApiRequest::without_auth`]
/// for the anonymous fallback path.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub endpoint: String,
    pub method: Method,
    pub body: Option<RequestBody>,
    pub slug: Option<String>,
    pub id: Option<String>,
    pub with_auth: bool,
}

impl ApiRequest {
    pub fn new(method: Method, endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            method,
            body: None,
            slug: None,
            id: None,
            with_auth: true,
        }
    }

    pub fn get(endpoint: impl Into<String>) -> Self {
        Self::new(Method::GET, endpoint)
    }

    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(RequestBody::Json(body));
        self
    }

    pub fn raw(mut self, bytes: Vec<u8>) -> Self {
        self.body = Some(RequestBody::Raw(bytes));
        self
    }

    pub fn slug(mut self, slug: impl Into<String>) -> Self {
        self.slug = Some(slug.into());
        self
    }

    /// Attach an identifier segment; numbers and strings are both accepted.
    pub fn id(mut self, id: impl ToString) -> Self {
        self.id = Some(id.to_string());
        self
    }

    pub fn with_auth(mut self, with_auth: bool) -> Self {
        self.with_auth = with_auth;
        self
    }

    pub fn without_auth(self) -> Self {
        self.with_auth(false)
    }

    /// Trailing path segment: the slug when present, otherwise the id.
    pub fn path_segment(&self) -> Option<&str> {
        self.slug
            .as_deref()
            .filter(|slug| !slug.is_empty())
            .or_else(|| self.id.as_deref().filter(|id| !id.is_empty()))
    }
}
