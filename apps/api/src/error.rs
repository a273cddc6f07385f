mod types;

use axum::Json;
use axum::http::header::RETRY_AFTER;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use hookforge_core::AppError;
use tracing::error;

pub use types::ErrorResponse;

const GENERATION_FAILED_MESSAGE: &str = "Failed to generate hooks. Please try again.";
const INTERNAL_ERROR_MESSAGE: &str = "Internal server error. Please try again later.";
const RATE_LIMITED_MESSAGE: &str = "Rate limit exceeded. Try again later.";

/// HTTP API error wrapper around core application errors.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(value: AppError) -> Self {
        Self(value)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.0.is_infrastructure_fault() {
            error!(error = %self.0, "request failed");
        }

        match self.0 {
            AppError::Validation(message) => {
                (StatusCode::BAD_REQUEST, Json(ErrorResponse::new(message))).into_response()
            }
            AppError::RateLimited { reset_at_ms } => {
                rate_limited_response(reset_at_ms, Utc::now().timestamp_millis())
            }
            AppError::Upstream(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new(GENERATION_FAILED_MESSAGE.to_owned())),
            )
                .into_response(),
            AppError::StorageUnavailable(_) | AppError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new(INTERNAL_ERROR_MESSAGE.to_owned())),
            )
                .into_response(),
        }
    }
}

/// Builds the 429 payload with a whole-second `Retry-After` hint.
fn rate_limited_response(reset_at_ms: i64, now_ms: i64) -> Response {
    let retry_after_seconds = retry_after_seconds(reset_at_ms, now_ms);
    let mut response = (
        StatusCode::TOO_MANY_REQUESTS,
        Json(ErrorResponse::rate_limited(
            RATE_LIMITED_MESSAGE.to_owned(),
            reset_at_ms,
        )),
    )
        .into_response();
    response
        .headers_mut()
        .insert(RETRY_AFTER, HeaderValue::from(retry_after_seconds));
    response
}

fn retry_after_seconds(reset_at_ms: i64, now_ms: i64) -> i64 {
    let remaining_ms = reset_at_ms.saturating_sub(now_ms).max(0);
    (remaining_ms + 999) / 1000
}

/// Standard API result type.
pub type ApiResult<T> = Result<T, ApiError>;
