// HTTP API Error Types
use axum::{
    http::{header, StatusCode},
    response::IntoResponse,
};
use serde::Serialize;

/// One field-level validation failure, rendered inside the `errors` list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorDetail {
    pub message: String,
    pub code: String,
    pub details: String,
}

impl ErrorDetail {
    pub fn bad_request(message: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: "400".to_string(),
            details: details.into(),
        }
    }
}

/// HTTP API error with appropriate status codes and client-friendly messages
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    Validation(Vec<ErrorDetail>),
    InvalidJson,

    // 401 Unauthorized
    Unauthorized,

    // 404 Not Found
    NotFound,

    // 406 Not Acceptable
    NotAcceptable,

    // 500 Internal Server Error (detail is logged, never returned)
    Upstream(String),
}

#[derive(Serialize)]
struct StatusBody<'a> {
    message: &'a str,
    code: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<&'a str>,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    status: StatusBody<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<&'a [ErrorDetail]>,
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::InvalidJson => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::NotAcceptable => StatusCode::NOT_ACCEPTABLE,
            ApiError::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> &'static str {
        match self {
            ApiError::Validation(_) | ApiError::InvalidJson => "Bad Request",
            ApiError::Unauthorized => "Unauthorized",
            ApiError::NotFound => "Not Found",
            ApiError::NotAcceptable => "Not Acceptable Content Type",
            ApiError::Upstream(_) => "Internal Server Error",
        }
    }

    pub fn details(&self) -> Option<&'static str> {
        match self {
            ApiError::Validation(_) => None,
            ApiError::InvalidJson => {
                Some("Request Body contains malformed JSON, thus rendering the Request Bad")
            }
            ApiError::Unauthorized => Some(
                "You need to provide a correct authentication token using the header 'x-api-key'",
            ),
            ApiError::NotFound => Some("item with the specific ID was not found on the server"),
            ApiError::NotAcceptable => Some(
                "Accept header provided did not contain any valid content types. Acceptable content types are 'application/xml' and 'application/json'",
            ),
            ApiError::Upstream(_) => Some("An error occurred while processing your request"),
        }
    }

    /// Compact JSON body. Key order is fixed by the body structs.
    pub fn to_body(&self) -> Vec<u8> {
        let code = self.status_code();
        let body = ErrorBody {
            status: StatusBody {
                message: self.message(),
                code: code.as_str(),
                details: self.details(),
            },
            errors: match self {
                ApiError::Validation(errors) => Some(errors.as_slice()),
                _ => None,
            },
        };

        serde_json::to_vec(&body).unwrap_or_default()
    }
}

// Static constructor methods
impl ApiError {
    pub fn validation(errors: Vec<ErrorDetail>) -> Self {
        ApiError::Validation(errors)
    }

    pub fn invalid_parameter(message: impl Into<String>, details: impl Into<String>) -> Self {
        ApiError::Validation(vec![ErrorDetail::bad_request(message, details)])
    }

    pub fn upstream(message: impl Into<String>) -> Self {
        ApiError::Upstream(message.into())
    }
}

// Convert other error types to ApiError
impl From<crate::database::store::StoreError> for ApiError {
    fn from(err: crate::database::store::StoreError) -> Self {
        match err {
            crate::database::store::StoreError::NotFound(_) => ApiError::NotFound,
            crate::database::store::StoreError::Timeout(elapsed) => {
                tracing::error!("Store query timed out after {:?}", elapsed);
                ApiError::upstream(format!("store query timed out after {:?}", elapsed))
            }
            other => {
                // Log the real error but return generic message
                tracing::error!("Store error: {}", other);
                ApiError::upstream(other.to_string())
            }
        }
    }
}

impl From<crate::auth::AuthError> for ApiError {
    fn from(err: crate::auth::AuthError) -> Self {
        match err {
            crate::auth::AuthError::Store(store_err) => store_err.into(),
            other => {
                tracing::warn!("Authentication failed: {}", other);
                ApiError::Unauthorized
            }
        }
    }
}

impl From<crate::services::tenant_service::TenantError> for ApiError {
    fn from(err: crate::services::tenant_service::TenantError) -> Self {
        match err {
            crate::services::tenant_service::TenantError::Store(store_err) => store_err.into(),
            crate::services::tenant_service::TenantError::InvalidName(msg) => {
                ApiError::invalid_parameter("Invalid Tenant", msg)
            }
        }
    }
}

impl From<crate::filter::FilterError> for ApiError {
    fn from(err: crate::filter::FilterError) -> Self {
        match err {
            crate::filter::FilterError::Encoding(msg) => {
                tracing::error!("Query plan encoding error: {}", msg);
                ApiError::upstream(msg)
            }
            other => ApiError::invalid_parameter(other.title(), other.to_string()),
        }
    }
}

impl From<crate::api::format::RenderError> for ApiError {
    fn from(err: crate::api::format::RenderError) -> Self {
        tracing::error!("Render error: {}", err);
        ApiError::upstream(err.to_string())
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::Upstream(detail) => write!(f, "{}: {}", self.message(), detail),
            _ => write!(f, "{}", self.message()),
        }
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (
            self.status_code(),
            [(header::CONTENT_TYPE, "application/json; charset=utf-8")],
            self.to_body(),
        )
            .into_response()
    }
}
