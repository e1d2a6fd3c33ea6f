//! FeedFit Backend
//!
//! Scores how well two candidate photos match the aesthetic of an Instagram
//! feed screenshot.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐  multipart   ┌──────────────────────────────────────────┐
//! │  Frontend /  │ ───────────▶ │  FEEDFIT SERVER (Axum)                   │
//! │  feedfit CLI │ ◀─────────── │  validate ─▶ spawn_blocking(analysis)    │
//! └──────────────┘    JSON      │     palette ─▶ histogram ─▶ cosine score │
//!                               └──────────────────────────────────────────┘
//! ```

pub mod analysis;
pub mod client;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod security;
pub mod verdict;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::{compression::CompressionLayer, trace::TraceLayer};

pub use error::{AppError, AppResult};

use crate::analysis::ImageAnalyzer;
use crate::config::Config;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub analyzer: ImageAnalyzer,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let analyzer = ImageAnalyzer::new(config.palette_size, config.histogram_bins);
        Self { config, analyzer }
    }
}

/// Create the main router with all routes
pub fn create_router(state: AppState) -> Router {
    let mut router = Router::new()
        .route("/", get(handlers::health::root))
        .route("/health", get(handlers::health::check))
        .route("/compare", post(handlers::compare::compare))
        .layer(DefaultBodyLimit::max(state.config.body_limit_bytes()))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http());

    for layer in security::security_header_layers() {
        router = router.layer(layer);
    }

    router
        .layer(security::cors_layer(&state.config.cors_origins))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{header, Method, Request, StatusCode},
    };
    use serde_json::Value;
    use tower::ServiceExt;

    fn app() -> Router {
        create_router(AppState::new(Config::default()))
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_root_reports_healthy() {
        let response = app()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["message"], "FeedFit Backend API is running!");
    }

    #[tokio::test]
    async fn test_health_lists_endpoints() {
        let response = app()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["service"], "FeedFit Backend");
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
        assert_eq!(body["endpoints"]["compare"], "/compare");
        assert!(body["timestamp"].as_i64().unwrap() > 0);
    }

    #[tokio::test]
    async fn test_security_headers_are_set() {
        let response = app()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        let headers = response.headers();
        for (name, value) in security::SECURITY_HEADERS {
            assert_eq!(headers[name], value, "header {}", name);
        }
        assert_eq!(headers["x-xss-protection"], "1; mode=block");
        assert_eq!(headers["referrer-policy"], "strict-origin-when-cross-origin");
    }

    fn header_list(response: &axum::response::Response, name: header::HeaderName) -> Vec<String> {
        response.headers()[name]
            .to_str()
            .unwrap()
            .split(',')
            .map(|v| v.trim().to_ascii_lowercase())
            .collect()
    }

    #[tokio::test]
    async fn test_cors_preflight_contract() {
        let response = app()
            .oneshot(
                Request::builder()
                    .method(Method::OPTIONS)
                    .uri("/compare")
                    .header(header::ORIGIN, "http://127.0.0.1:8080")
                    .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                    .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let headers = response.headers();
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "http://127.0.0.1:8080");
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");

        let mut methods = header_list(&response, header::ACCESS_CONTROL_ALLOW_METHODS);
        methods.sort();
        assert_eq!(methods, vec!["get", "post"]);
        assert_eq!(
            header_list(&response, header::ACCESS_CONTROL_ALLOW_HEADERS),
            vec!["content-type"]
        );
    }

    #[tokio::test]
    async fn test_oversize_request_body_is_rejected() {
        let config = Config {
            max_upload_mb: 1,
            ..Config::default()
        };
        let boundary = "feedfit-limit-boundary";
        let mut body = format!(
            "--{}\r\nContent-Disposition: form-data; name=\"feed_image\"; filename=\"feed.png\"\r\nContent-Type: image/png\r\n\r\n",
            boundary
        )
        .into_bytes();
        body.extend(vec![7u8; config.body_limit_bytes() + 1024]);
        body.extend_from_slice(format!("\r\n--{}--\r\n", boundary).as_bytes());

        let response = create_router(AppState::new(config))
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/compare")
                    .header(
                        header::CONTENT_TYPE,
                        format!("multipart/form-data; boundary={}", boundary),
                    )
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        let body = json_body(response).await;
        assert_eq!(body["detail"], "Upload exceeds the request size limit");
        assert_eq!(body["status"], 413);
    }

    #[tokio::test]
    async fn test_cors_allows_configured_origin_only() {
        let allowed = app()
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .header(header::ORIGIN, "http://localhost:8080")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(
            allowed.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "http://localhost:8080"
        );

        let denied = app()
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .header(header::ORIGIN, "https://evil.example")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert!(denied.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
    }

    #[tokio::test]
    async fn test_compare_rejects_get() {
        let response = app()
            .oneshot(
                Request::builder()
                    .method(Method::GET)
                    .uri("/compare")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }
}
