// handlers/public/health.rs - GET /health

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use tracing::error;

use crate::app::AppState;
use crate::middleware::ApiResponse;
use crate::services::tenant_service::now_timestamp;
use crate::types::Representation;

#[derive(Debug, Serialize)]
pub struct Health {
    pub version: &'static str,
    pub store: &'static str,
    pub timestamp: String,
}

/// Liveness plus a ping of the registry store
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let version = env!("CARGO_PKG_VERSION");
    let timestamp = now_timestamp();

    match state.tenants.ping().await {
        Ok(()) => ApiResponse::success(Health { version, store: "ok", timestamp }, Representation::Json),
        Err(e) => {
            error!("Health check failed: {}", e);
            ApiResponse::with_status(
                StatusCode::SERVICE_UNAVAILABLE,
                "Service Unavailable",
                Some(Health { version, store: "unavailable", timestamp }),
                Representation::Json,
            )
        }
    }
}
