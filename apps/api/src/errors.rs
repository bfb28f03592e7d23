use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Map, Value};
use thiserror::Error;

use crate::abuse::Rejection;
use crate::delivery::DeliveryError;
use crate::layout::RenderError;
use crate::packaging::PackagingError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Missing required fields: {0:?}")]
    MissingFields(Vec<&'static str>),

    #[error("Consent to postal delivery is required")]
    ConsentRequired,

    #[error("Rejected by abuse control: {}", .0.code())]
    Rejected(Rejection),

    #[error("Render error: {0}")]
    Render(String),

    #[error("Delivery error: {0}")]
    Delivery(#[from] DeliveryError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<RenderError> for AppError {
    fn from(e: RenderError) -> Self {
        AppError::Render(e.to_string())
    }
}

impl From<PackagingError> for AppError {
    fn from(e: PackagingError) -> Self {
        AppError::Render(e.to_string())
    }
}

impl AppError {
    /// Stable machine-readable code used in the response body.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::MissingFields(_) => "missing_fields",
            AppError::ConsentRequired => "consent_required",
            AppError::Rejected(rejection) => rejection.code(),
            AppError::Render(_) => "render_failed",
            AppError::Delivery(_) => "delivery_failed",
            AppError::Internal(_) => "internal_error",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::MissingFields(_) | AppError::ConsentRequired => StatusCode::BAD_REQUEST,
            AppError::Rejected(_) => StatusCode::TOO_MANY_REQUESTS,
            AppError::Render(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Delivery(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let mut error = Map::new();
        let message = match &self {
            AppError::MissingFields(fields) => {
                error.insert("fields".to_string(), json!(fields));
                "Required fields are missing".to_string()
            }
            AppError::ConsentRequired => "Consent to postal delivery is required".to_string(),
            AppError::Rejected(rejection) => {
                error.insert(
                    "retry_after_seconds".to_string(),
                    json!(rejection.retry_after_seconds()),
                );
                match rejection {
                    Rejection::RateLimitedEmail { .. } => {
                        "Too many submissions from this email address".to_string()
                    }
                    Rejection::RateLimitedIp { .. } => {
                        "Too many submissions from this network address".to_string()
                    }
                    Rejection::DuplicateRecent { .. } => {
                        "This letter was submitted a moment ago".to_string()
                    }
                }
            }
            AppError::Render(msg) => {
                tracing::error!("Render error: {msg}");
                "The letter could not be generated".to_string()
            }
            AppError::Delivery(e) => {
                tracing::error!("Delivery error: {e}");
                error.insert("status".to_string(), json!(e.status()));
                error.insert("detail".to_string(), json!(e.detail()));
                "The letter could not be handed to the delivery service".to_string()
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                "An internal server error occurred".to_string()
            }
        };
        error.insert("code".to_string(), json!(self.code()));
        error.insert("message".to_string(), json!(message));

        let body = Json(json!({
            "ok": false,
            "error": Value::Object(error),
        }));

        (self.status(), body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(err: AppError) -> (StatusCode, Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_missing_fields_response() {
        let (status, body) = body_json(AppError::MissingFields(vec!["email", "subject"])).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["ok"], false);
        assert_eq!(body["error"]["code"], "missing_fields");
        assert_eq!(body["error"]["fields"], json!(["email", "subject"]));
    }

    #[tokio::test]
    async fn test_rejection_response_carries_retry_after() {
        let (status, body) = body_json(AppError::Rejected(Rejection::DuplicateRecent {
            retry_after_seconds: 600,
        }))
        .await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(body["error"]["code"], "duplicate_recent");
        assert_eq!(body["error"]["retry_after_seconds"], 600);
    }

    #[tokio::test]
    async fn test_delivery_failure_response() {
        let (status, body) = body_json(AppError::Delivery(DeliveryError::Rejected {
            status: 401,
            detail: "{\"code\":\"unauthorized\"}".to_string(),
        }))
        .await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"]["code"], "delivery_failed");
        assert_eq!(body["error"]["status"], 401);
        assert_eq!(body["error"]["detail"], "{\"code\":\"unauthorized\"}");
    }

    #[tokio::test]
    async fn test_internal_failure_response() {
        let err: AppError = anyhow::anyhow!("task panicked")
            .context("Document generation task failed")
            .into();
        let (status, body) = body_json(err).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"]["code"], "internal_error");
        assert_eq!(body["error"]["message"], "An internal server error occurred");
    }

    #[tokio::test]
    async fn test_render_failure_hides_detail() {
        let (status, body) = body_json(AppError::Render("zip entry failed".to_string())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"]["code"], "render_failed");
        assert_eq!(body["error"]["message"], "The letter could not be generated");
    }
}
