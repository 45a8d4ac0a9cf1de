use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

/// Bytes that must be escaped inside a single path segment: everything but
/// the RFC 3986 unreserved set.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'.').remove(b'_').remove(b'~');

/// Percent-encode a value for use as one path segment.
///
/// # Example
/// ```rust
/// use stitch_util::http::encode_path_segment;
///
/// assert_eq!(encode_path_segment("wool-suit_01"), "wool-suit_01");
/// assert_eq!(encode_path_segment("a/b c"), "a%2Fb%20c");
/// ```
pub fn encode_path_segment(value: &str) -> String {
    utf8_percent_encode(value, PATH_SEGMENT).to_string()
}

/// Join a base URL, an endpoint and an optional trailing segment.
///
/// Slashes at the joins are normalized so `"http://api/"` + `"/orders/"`
/// produces `"http://api/orders"`. The endpoint is used verbatim (it may
/// contain nested paths); the trailing segment is percent-encoded.
///
/// # Example
/// ```rust
/// use stitch_util::http::join_endpoint_url;
///
/// assert_eq!(join_endpoint_url("http://localhost:5000/api/", "/catalogs", None), "http://localhost:5000/api/catalogs");
/// assert_eq!(
///     join_endpoint_url("http://localhost:5000/api", "orders", Some("ord 42")),
///     "http://localhost:5000/api/orders/ord%2042"
/// );
/// ```
pub fn join_endpoint_url(base_url: &str, endpoint: &str, segment: Option<&str>) -> String {
    let mut url = base_url.trim_end_matches('/').to_string();
    let endpoint = endpoint.trim_matches('/');
    if !endpoint.is_empty() {
        url.push('/');
        url.push_str(endpoint);
    }
    if let Some(segment) = segment.filter(|segment| !segment.is_empty()) {
        url.push('/');
        url.push_str(&encode_path_segment(segment));
    }
    url
}
