use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::Path,
    http::{HeaderMap, StatusCode, header},
    response::{Html, IntoResponse},
    routing::{any, get, put},
};
use serde_json::{Value, json};
use stitch_api::{ApiErrorKind, ApiRequest, CookieJar, NETWORK_ERROR_MESSAGE, StitchClient};

fn header_text(headers: &HeaderMap, name: header::HeaderName) -> Value {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(|value| Value::String(value.to_string()))
        .unwrap_or(Value::Null)
}

async fn echo(headers: HeaderMap, body: Bytes) -> Json<Value> {
    Json(json!({
        "authorization": header_text(&headers, header::AUTHORIZATION),
        "content_type": header_text(&headers, header::CONTENT_TYPE),
        "body": String::from_utf8_lossy(&body),
    }))
}

async fn echo_segment(Path(segment): Path<String>) -> Json<Value> {
    Json(json!({ "segment": segment }))
}

async fn update_order(Path(id): Path<String>, headers: HeaderMap, Json(body): Json<Value>) -> Json<Value> {
    Json(json!({
        "id": id,
        "content_type": header_text(&headers, header::CONTENT_TYPE),
        "updated": body,
    }))
}

fn router() -> Router {
    Router::new()
        .route("/api/echo", any(echo))
        .route("/api/echo/{segment}", any(echo_segment))
        .route("/api/customers", get(|| async { Json(json!([{ "_id": "c1", "name": "Asha" }])) }))
        .route(
            "/api/orders",
            any(|| async {
                (
                    StatusCode::BAD_REQUEST,
                    Json(json!({ "message": "Order validation failed: customer: Path `customer` is required." })),
                )
            }),
        )
        .route("/api/orders/{id}", put(update_order))
        .route(
            "/api/reports",
            get(|| async {
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Html("<html><body><pre>TypeError: cannot read property<br> &nbsp;at report.js:10</pre></body></html>"),
                )
            }),
        )
        .route("/api/empty/{id}", any(|| async { StatusCode::NO_CONTENT }))
        .route("/api/plain", get(|| async { "definitely not json" }))
        .route("/api/deleted/{id}", any(|| async { (StatusCode::NOT_FOUND, "").into_response() }))
}

async fn spawn_api() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let address = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, router()).await.expect("serve");
    });
    format!("http://{address}/api")
}

fn client_with_cookie(base_url: &str, cookie: &str) -> StitchClient {
    StitchClient::builder(base_url)
        .credentials(Arc::new(CookieJar::from_header(cookie)))
        .build()
        .expect("client")
}

#[tokio::test]
async fn get_returns_untyped_json() {
    let base_url = spawn_api().await;
    let client = client_with_cookie(&base_url, "");

    let customers = client.get("customers", true).await.expect("customers");
    assert_eq!(customers, json!([{ "_id": "c1", "name": "Asha" }]));
}

#[tokio::test]
async fn authenticated_request_carries_refresh_token_as_bearer() {
    let base_url = spawn_api().await;
    let client = client_with_cookie(&base_url, "theme=dark; refresh_token=tok-123");

    let echoed = client.request(ApiRequest::get("echo")).await.expect("echo");
    assert_eq!(echoed["authorization"], json!("Bearer tok-123"));
    assert_eq!(echoed["content_type"], json!("application/json"));

    let anonymous = client.request(ApiRequest::get("echo").without_auth()).await.expect("echo");
    assert_eq!(anonymous["authorization"], Value::Null);
}

#[tokio::test]
async fn missing_cookie_sends_no_authorization_header() {
    let base_url = spawn_api().await;
    let client = client_with_cookie(&base_url, "theme=dark");

    let echoed = client.request(ApiRequest::get("echo")).await.expect("echo");
    assert_eq!(echoed["authorization"], Value::Null);
}

#[tokio::test]
async fn raw_body_is_sent_without_content_type() {
    let base_url = spawn_api().await;
    let client = client_with_cookie(&base_url, "");

    let request = ApiRequest::new(reqwest::Method::POST, "echo").raw(b"binary-payload".to_vec());
    let echoed = client.request(request).await.expect("echo");
    assert_eq!(echoed["content_type"], Value::Null);
    assert_eq!(echoed["body"], json!("binary-payload"));

    let echoed = client.post("echo", json!({ "name": "Wool Suit" })).await.expect("echo");
    assert_eq!(echoed["content_type"], json!("application/json"));
    assert_eq!(echoed["body"], json!(r#"{"name":"Wool Suit"}"#));
}

#[tokio::test]
async fn slug_or_id_becomes_trailing_segment() {
    let base_url = spawn_api().await;
    let client = client_with_cookie(&base_url, "");

    let by_slug = client
        .request(ApiRequest::get("echo").id(9).slug("wool-suit"))
        .await
        .expect("slug");
    assert_eq!(by_slug, json!({ "segment": "wool-suit" }));

    let by_id = client.request(ApiRequest::get("echo").id(9)).await.expect("id");
    assert_eq!(by_id, json!({ "segment": "9" }));
}

#[tokio::test]
async fn put_targets_id_segment_with_json_body() {
    let base_url = spawn_api().await;
    let client = client_with_cookie(&base_url, "");

    let updated = client
        .put("orders", "ord-7", json!({ "status": "stitched" }))
        .await
        .expect("update");
    assert_eq!(
        updated,
        json!({
            "id": "ord-7",
            "content_type": "application/json",
            "updated": { "status": "stitched" }
        })
    );
}

#[tokio::test]
async fn json_error_message_is_cleaned() {
    let base_url = spawn_api().await;
    let client = client_with_cookie(&base_url, "");

    let error = client.post("orders", json!({})).await.expect_err("bad request");
    assert_eq!(error.kind(), ApiErrorKind::Http { status: 400 });
    assert_eq!(error.to_string(), "Customer is required.");
}

#[tokio::test]
async fn html_error_page_uses_pre_block() {
    let base_url = spawn_api().await;
    let client = client_with_cookie(&base_url, "");

    let error = client.get("reports", true).await.expect_err("server error");
    assert_eq!(error.kind(), ApiErrorKind::Http { status: 500 });
    assert_eq!(error.message(), "TypeError: cannot read property");
}

#[tokio::test]
async fn empty_error_body_reports_status() {
    let base_url = spawn_api().await;
    let client = client_with_cookie(&base_url, "");

    let error = client.delete("deleted", "7").await.expect_err("not found");
    assert_eq!(error.message(), "Request failed with status 404");
}

#[tokio::test]
async fn empty_success_body_is_null() {
    let base_url = spawn_api().await;
    let client = client_with_cookie(&base_url, "");

    let value = client.patch("empty", "3", json!({ "status": "done" })).await.expect("no content");
    assert_eq!(value, Value::Null);
}

#[tokio::test]
async fn non_json_success_is_decode_error() {
    let base_url = spawn_api().await;
    let client = client_with_cookie(&base_url, "");

    let error = client.get("plain", false).await.expect_err("decode failure");
    assert_eq!(error.kind(), ApiErrorKind::Decode);
}

#[tokio::test]
async fn unreachable_host_is_transport_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let address = listener.local_addr().expect("local addr");
    drop(listener);

    let client = client_with_cookie(&format!("http://{address}/api"), "");
    let error = client.get("customers", true).await.expect_err("connection refused");
    assert_eq!(error.kind(), ApiErrorKind::Transport);
    assert_eq!(error.message(), NETWORK_ERROR_MESSAGE);
}
