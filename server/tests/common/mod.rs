// Each integration test file is a separate binary; helpers not used in every
// binary would otherwise trigger dead_code warnings from clippy.
#![allow(dead_code)]

use std::path::Path;
use std::time::Duration;

use axum::{
    body::Body,
    http::{header, HeaderMap, Method, Request, StatusCode},
    response::{Html, IntoResponse},
    routing::get,
    Router,
};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;
use tower_http::services::ServeDir;

use linkshelf_server::{handlers, metadata::MetadataExtractor, state::AppState};

/// Short enough that timeout tests finish quickly, long enough for loopback.
pub const TEST_FETCH_TIMEOUT: Duration = Duration::from_secs(2);

pub fn test_extractor() -> MetadataExtractor {
    MetadataExtractor::with_timeout(TEST_FETCH_TIMEOUT).expect("Failed to build HTTP client")
}

/// Build the application router the way `main` does, minus metrics.
pub fn create_test_app_with_static(static_dir: &Path) -> Router {
    let state = AppState {
        extractor: test_extractor(),
    };
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/api/metadata", get(handlers::metadata::get_metadata))
        .fallback_service(ServeDir::new(static_dir))
        .with_state(state)
}

pub fn create_test_app() -> Router {
    create_test_app_with_static(Path::new("does-not-exist"))
}

/// Percent-encode a value for use in a query string.
pub fn encode(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

pub fn metadata_uri(target: &str) -> String {
    format!("/api/metadata?url={}", encode(target))
}

// ── Fixture upstream ─────────────────────────────────────────────────────────

pub const FULL_PAGE: &str = r#"<!doctype html>
<html><head>
  <title>Plain Title</title>
  <meta property="og:title" content="Fixture Article">
  <meta property="og:image" content="/img/a.png">
  <meta property="og:description" content="An article served by the fixture.">
  <meta name="description" content="Plain description">
</head><body><p>hello</p></body></html>"#;

/// Start a local HTTP server that plays the role of the pages being previewed.
/// Returns its base URL, e.g. `http://127.0.0.1:41234`.
pub async fn spawn_fixture_server() -> String {
    let app = Router::new()
        .route("/page", get(|| async { Html(FULL_PAGE) }))
        .route(
            "/title-only",
            get(|| async { Html("<html><head><title>Bar</title></head></html>") }),
        )
        .route(
            "/bare",
            get(|| async { Html("<html><body><p>no metadata</p></body></html>") }),
        )
        .route(
            "/malformed",
            get(|| async {
                Html(r#"<html><head><title>Broken</title><meta name="description" content="d"><div><p><b>unclosed"#)
            }),
        )
        .route("/echo", get(echo_headers))
        .route("/instagram.com/echo", get(echo_headers))
        .route(
            "/missing",
            get(|| async {
                (
                    StatusCode::NOT_FOUND,
                    Html(r#"<meta property="og:title" content="Not Found Page">"#),
                )
            }),
        )
        .route(
            "/error",
            get(|| async { StatusCode::INTERNAL_SERVER_ERROR.into_response() }),
        )
        .route(
            "/slow",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(10)).await;
                Html(FULL_PAGE)
            }),
        );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind fixture server");
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

/// Reflects the request's User-Agent into og:title and its Accept-Language
/// into og:description.
async fn echo_headers(headers: HeaderMap) -> Html<String> {
    let value = |name: header::HeaderName| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string()
    };
    Html(format!(
        r#"<html><head><meta property="og:title" content="{}"><meta property="og:description" content="{}"></head></html>"#,
        value(header::USER_AGENT),
        value(header::ACCEPT_LANGUAGE),
    ))
}

/// A loopback URL nothing is listening on.
pub async fn closed_port_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}/")
}

// ── Request helpers ──────────────────────────────────────────────────────────

pub async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
    let (status, bytes) = get_raw(app, uri).await;
    let json: Value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

pub async fn get_text(app: Router, uri: &str) -> (StatusCode, String) {
    let (status, bytes) = get_raw(app, uri).await;
    (status, String::from_utf8_lossy(&bytes).into_owned())
}

async fn get_raw(app: Router, uri: &str) -> (StatusCode, Vec<u8>) {
    let req = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, bytes.to_vec())
}
