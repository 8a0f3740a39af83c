use axum::{
    body::Bytes,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::api::format::{render_envelope, StatusMessage};
use crate::error::ApiError;
use crate::types::Representation;

/// `{status, data}` envelope rendered in the negotiated representation
#[derive(Debug)]
pub struct ApiResponse<T: Serialize> {
    pub status_code: StatusCode,
    pub message: &'static str,
    pub data: Option<T>,
    pub representation: Representation,
}

impl<T: Serialize> ApiResponse<T> {
    /// 200 "Success" with data
    pub fn success(data: T, representation: Representation) -> Self {
        Self::with_status(StatusCode::OK, "Success", Some(data), representation)
    }

    /// 201 with a resource-specific message
    pub fn created(message: &'static str, data: T, representation: Representation) -> Self {
        Self::with_status(StatusCode::CREATED, message, Some(data), representation)
    }

    pub fn with_status(
        status_code: StatusCode,
        message: &'static str,
        data: Option<T>,
        representation: Representation,
    ) -> Self {
        Self { status_code, message, data, representation }
    }
}

impl ApiResponse<()> {
    /// 200 carrying only a status message
    pub fn message(message: &'static str, representation: Representation) -> Self {
        Self::with_status(StatusCode::OK, message, None, representation)
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status = StatusMessage { message: self.message, code: self.status_code.as_str() };
        match render_envelope(&status, self.data.as_ref(), self.representation) {
            Ok(body) => (
                self.status_code,
                [(header::CONTENT_TYPE, self.representation.content_type())],
                body,
            )
                .into_response(),
            Err(e) => ApiError::from(e).into_response(),
        }
    }
}

/// Already rendered result body, e.g. served from the cache
#[derive(Debug, Clone)]
pub struct Rendered {
    pub representation: Representation,
    pub body: Bytes,
}

impl Rendered {
    pub fn new(representation: Representation, body: impl Into<Bytes>) -> Self {
        Self { representation, body: body.into() }
    }
}

impl IntoResponse for Rendered {
    fn into_response(self) -> Response {
        (
            StatusCode::OK,
            [(header::CONTENT_TYPE, self.representation.content_type())],
            self.body,
        )
            .into_response()
    }
}

pub type ApiResult<T> = Result<ApiResponse<T>, ApiError>;
