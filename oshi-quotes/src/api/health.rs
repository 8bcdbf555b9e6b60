//! Liveness probe for process supervisors and load balancers

use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::AppState;

/// Body of `GET /health`
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Always `"ok"` while the server answers requests
    pub status: &'static str,
    /// Crate name, so a shared dashboard can tell services apart
    pub module: &'static str,
    pub version: &'static str,
}

impl HealthResponse {
    fn current() -> Self {
        Self {
            status: "ok",
            module: env!("CARGO_PKG_NAME"),
            version: env!("CARGO_PKG_VERSION"),
        }
    }
}

/// GET /health (public)
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse::current())
}

/// Routes mounted outside the login wall
pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
