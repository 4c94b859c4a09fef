//! Error types for the gateway
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::{header::HeaderName, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

pub static RATE_LIMIT_LIMIT: HeaderName = HeaderName::from_static("x-ratelimit-limit");
pub static RATE_LIMIT_REMAINING: HeaderName = HeaderName::from_static("x-ratelimit-remaining");
pub static RATE_LIMIT_RESET: HeaderName = HeaderName::from_static("x-ratelimit-reset");

// == Api Error Enum ==
/// Unified error type surfaced by the HTTP layer.
///
/// Provider failures with a local fallback are absorbed inside the owning
/// component and never reach this enum; what remains is what callers are
/// meant to see.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Bad input, rejected before any quota is consumed
    #[error("Invalid request: {0}")]
    Validation(String),

    /// Admission control rejected the request for this window
    #[error("Rate limit exceeded, retry after {retry_after_secs}s")]
    RateLimited {
        limit: u64,
        remaining: u64,
        reset_at_ms: u64,
        retry_after_secs: u64,
    },

    /// The translation provider failed and there is no local fallback
    #[error("Translation temporarily unavailable")]
    TranslationUnavailable,

    /// A remote call exceeded its time budget
    #[error("Upstream request timed out")]
    UpstreamTimeout,

    /// A provider has no usable configuration and no fallback exists
    #[error("{0} is not configured and no fallback is available")]
    ConfigurationMissing(&'static str),

    /// Admin secret missing or wrong
    #[error("Unauthorized")]
    Unauthorized,

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::RateLimited {
                limit,
                remaining,
                reset_at_ms,
                retry_after_secs,
            } => {
                let body = Json(json!({
                    "error": "Rate limit exceeded",
                    "retryAfter": retry_after_secs,
                }));
                (
                    StatusCode::TOO_MANY_REQUESTS,
                    [
                        (RATE_LIMIT_LIMIT.clone(), limit.to_string()),
                        (RATE_LIMIT_REMAINING.clone(), remaining.to_string()),
                        (RATE_LIMIT_RESET.clone(), (reset_at_ms / 1000).to_string()),
                    ],
                    body,
                )
                    .into_response()
            }
            other => {
                let status = match &other {
                    ApiError::Validation(_) => StatusCode::BAD_REQUEST,
                    ApiError::TranslationUnavailable => StatusCode::SERVICE_UNAVAILABLE,
                    ApiError::UpstreamTimeout => StatusCode::BAD_GATEWAY,
                    ApiError::ConfigurationMissing(_) => StatusCode::SERVICE_UNAVAILABLE,
                    ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
                    ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
                    // handled by the arm above
                    ApiError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
                };
                let body = Json(json!({ "error": other.to_string() }));
                (status, body).into_response()
            }
        }
    }
}

impl From<&crate::limiter::RateLimitDecision> for ApiError {
    fn from(decision: &crate::limiter::RateLimitDecision) -> Self {
        ApiError::RateLimited {
            limit: decision.limit,
            remaining: decision.remaining,
            reset_at_ms: decision.reset_at_ms,
            retry_after_secs: decision.retry_after_secs,
        }
    }
}

// == Result Type Alias ==
/// Convenience Result type for the gateway.
pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn rate_limited_response_carries_headers() {
        let err = ApiError::RateLimited {
            limit: 100,
            remaining: 0,
            reset_at_ms: 1_700_000_000_000,
            retry_after_secs: 42,
        };
        let response = err.into_response();

        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        let headers = response.headers();
        assert_eq!(headers.get(&RATE_LIMIT_LIMIT).unwrap(), "100");
        assert_eq!(headers.get(&RATE_LIMIT_REMAINING).unwrap(), "0");
        assert_eq!(headers.get(&RATE_LIMIT_RESET).unwrap(), "1700000000");

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["retryAfter"], 42);
    }

    #[test]
    fn validation_maps_to_bad_request() {
        let response = ApiError::Validation("empty text".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn timeout_maps_to_bad_gateway() {
        let response = ApiError::UpstreamTimeout.into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn missing_configuration_maps_to_service_unavailable() {
        let response = ApiError::ConfigurationMissing("search backend").into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
