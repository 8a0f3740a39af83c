// handlers/public/options.rs - OPTIONS on collection routes

use axum::{
    http::{header, StatusCode},
    response::IntoResponse,
};

pub const ALLOWED_METHODS: &str = "GET,POST,PUT,DELETE,OPTIONS";

/// Preflight answer. Carries no credentials, so it never enters the pipeline.
pub async fn options() -> impl IntoResponse {
    (
        StatusCode::OK,
        [
            (header::ALLOW, ALLOWED_METHODS),
            (header::CONTENT_TYPE, "text/plain; charset=utf-8"),
        ],
        "",
    )
}
