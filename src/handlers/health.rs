//! Health check handlers

use axum::Json;
use serde::Serialize;

pub const SERVICE_NAME: &str = "FeedFit Backend";

#[derive(Serialize)]
pub struct RootResponse {
    message: &'static str,
    status: &'static str,
}

#[derive(Serialize)]
pub struct Endpoints {
    compare: &'static str,
    health: &'static str,
}

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    service: &'static str,
    version: &'static str,
    timestamp: i64,
    endpoints: Endpoints,
}

pub async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        message: "FeedFit Backend API is running!",
        status: "healthy",
    })
}

pub async fn check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: SERVICE_NAME,
        version: env!("CARGO_PKG_VERSION"),
        timestamp: chrono::Utc::now().timestamp(),
        endpoints: Endpoints {
            compare: "/compare",
            health: "/health",
        },
    })
}
