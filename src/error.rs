//! Error types for the catalog proxy
//!
//! Every failure surfaced to a client maps onto one stable error kind.

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use crate::models::ErrorResponse;

/// Message returned for internal errors; details stay in the logs.
pub const INTERNAL_ERROR_MESSAGE: &str = "An unexpected error occurred";

// == Error Kind ==
/// Stable identifiers of the error taxonomy, as serialized in the error envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    ClientInputError,
    UpstreamTimeout,
    UpstreamRejection,
    TransportFailure,
    NotFound,
    RateLimited,
    InternalError,
}

// == Proxy Error Enum ==
/// Unified error type for the catalog proxy.
#[derive(Error, Debug)]
pub enum ProxyError {
    /// Missing or invalid request parameter
    #[error("Invalid request: {0}")]
    InvalidInput(String),

    /// Upstream call exceeded the fixed timeout
    #[error("Upstream request timed out: {0}")]
    UpstreamTimeout(String),

    /// Upstream answered with a non-success status
    #[error("Upstream rejected request with status {status}: {message}")]
    UpstreamRejection { status: u16, message: String },

    /// Upstream could not be reached or returned an unreadable payload
    #[error("Upstream unavailable: {0}")]
    TransportFailure(String),

    /// No matching route or resource
    #[error("Not found: {0}")]
    NotFound(String),

    /// Client exceeded its request quota
    #[error("Rate limit exceeded, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ProxyError {
    // == Kind ==
    /// Returns the taxonomy kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ProxyError::InvalidInput(_) => ErrorKind::ClientInputError,
            ProxyError::UpstreamTimeout(_) => ErrorKind::UpstreamTimeout,
            ProxyError::UpstreamRejection { .. } => ErrorKind::UpstreamRejection,
            ProxyError::TransportFailure(_) => ErrorKind::TransportFailure,
            ProxyError::NotFound(_) => ErrorKind::NotFound,
            ProxyError::RateLimited { .. } => ErrorKind::RateLimited,
            ProxyError::Internal(_) => ErrorKind::InternalError,
        }
    }

    // == Status Code ==
    /// Returns the HTTP status reported to the client.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ProxyError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ProxyError::UpstreamTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
            ProxyError::UpstreamRejection { status, .. } => StatusCode::from_u16(*status)
                .ok()
                .filter(|code| code.is_client_error() || code.is_server_error())
                .unwrap_or(StatusCode::BAD_GATEWAY),
            ProxyError::TransportFailure(_) => StatusCode::SERVICE_UNAVAILABLE,
            ProxyError::NotFound(_) => StatusCode::NOT_FOUND,
            ProxyError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            ProxyError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Client-facing message; internal details are withheld.
    fn public_message(&self) -> String {
        match self {
            ProxyError::InvalidInput(msg) | ProxyError::NotFound(msg) => msg.clone(),
            ProxyError::UpstreamTimeout(_) => {
                "The upstream catalog took too long to respond".to_string()
            }
            ProxyError::UpstreamRejection { message, .. } => message.clone(),
            ProxyError::TransportFailure(_) => {
                "Failed to fetch data from the upstream catalog".to_string()
            }
            ProxyError::RateLimited { .. } => {
                "Too many requests from this client, please try again later".to_string()
            }
            ProxyError::Internal(_) => INTERNAL_ERROR_MESSAGE.to_string(),
        }
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        if let ProxyError::Internal(detail) = &self {
            error!("Internal error: {}", detail);
        }

        let status = self.status_code();
        let mut body = ErrorResponse::new(self.kind(), self.public_message());

        let mut retry_after = None;
        match &self {
            ProxyError::UpstreamRejection { status, .. } => body = body.with_status(*status),
            ProxyError::RateLimited { retry_after_secs } => {
                body = body.with_retry_after(*retry_after_secs);
                retry_after = Some(*retry_after_secs);
            }
            _ => {}
        }

        let mut response = (status, Json(body)).into_response();
        if let Some(secs) = retry_after {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(secs));
        }
        response
    }
}

// == Result Type Alias ==
/// Convenience Result type for the catalog proxy.
pub type Result<T> = std::result::Result<T, ProxyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ProxyError::InvalidInput("q".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ProxyError::UpstreamTimeout("/products".into()).status_code(),
            StatusCode::GATEWAY_TIMEOUT
        );
        assert_eq!(
            ProxyError::TransportFailure("refused".into()).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            ProxyError::RateLimited { retry_after_secs: 5 }.status_code(),
            StatusCode::TOO_MANY_REQUESTS
        );
    }

    #[test]
    fn test_rejection_forwards_upstream_status() {
        let err = ProxyError::UpstreamRejection {
            status: 503,
            message: "down".into(),
        };
        assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(err.kind(), ErrorKind::UpstreamRejection);
    }

    #[test]
    fn test_rejection_with_non_error_status_becomes_bad_gateway() {
        let err = ProxyError::UpstreamRejection {
            status: 302,
            message: "moved".into(),
        };
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_internal_message_is_generic() {
        let err = ProxyError::Internal("join error: task panicked".into());
        assert_eq!(err.public_message(), INTERNAL_ERROR_MESSAGE);
    }

    #[test]
    fn test_rate_limited_sets_retry_after_header() {
        let response = ProxyError::RateLimited { retry_after_secs: 42 }.into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()[header::RETRY_AFTER], "42");
    }

    #[test]
    fn test_kind_serializes_snake_case() {
        let json = serde_json::to_string(&ErrorKind::UpstreamTimeout).unwrap();
        assert_eq!(json, "\"upstream_timeout\"");
    }
}
