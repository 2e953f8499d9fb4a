//! API error types with structured JSON responses.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use patient_records_core::{RecordsError, ValidationError, Violation};
use serde::Serialize;

/// Structured error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub violations: Vec<Violation>,
}

/// API-level errors with HTTP status mapping.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Validation(ValidationError),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Already exists: {0}")]
    AlreadyExists(String),
    #[error("Invalid request: {0}")]
    BadRequest(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message, violations) = match self {
            ApiError::Validation(err) => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_FAILED",
                "Patient record failed validation".to_string(),
                err.violations,
            ),
            ApiError::NotFound(detail) => {
                (StatusCode::NOT_FOUND, "NOT_FOUND", detail, Vec::new())
            }
            ApiError::AlreadyExists(detail) => (
                StatusCode::BAD_REQUEST,
                "ALREADY_EXISTS",
                detail,
                Vec::new(),
            ),
            ApiError::BadRequest(detail) => {
                (StatusCode::BAD_REQUEST, "BAD_REQUEST", detail, Vec::new())
            }
            ApiError::Internal(detail) => {
                tracing::error!(detail, "API internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL",
                    "An internal error occurred".to_string(),
                    Vec::new(),
                )
            }
        };

        let body = ErrorBody {
            error: ErrorDetail {
                code,
                message,
                violations,
            },
        };
        (status, Json(body)).into_response()
    }
}

impl From<RecordsError> for ApiError {
    fn from(err: RecordsError) -> Self {
        match err {
            RecordsError::Validation(e) => ApiError::Validation(e),
            RecordsError::NotFound(_) => ApiError::NotFound("Patient not found".into()),
            RecordsError::Duplicate(_) => ApiError::AlreadyExists("Patient already exists".into()),
            RecordsError::InvalidArgument(detail) => ApiError::BadRequest(detail),
            e @ (RecordsError::Storage(_) | RecordsError::LockPoisoned(_)) => {
                ApiError::Internal(e.to_string())
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use patient_records_core::StoreError;

    async fn body_json(response: Response) -> serde_json::Value {
        let body = to_bytes(response.into_body(), 4096).await.unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn validation_returns_400_with_violations() {
        let err = ValidationError::new(vec![
            Violation::new("height", "must be greater than 0"),
            Violation::new("gender", "must be one of: male, female, others"),
        ]);
        let response = ApiError::Validation(err).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "VALIDATION_FAILED");
        assert_eq!(json["error"]["violations"][0]["field"], "height");
        assert_eq!(json["error"]["violations"][1]["field"], "gender");
    }

    #[tokio::test]
    async fn not_found_returns_404() {
        let api_err: ApiError = RecordsError::NotFound("P404".into()).into();
        let response = api_err.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let json = body_json(response).await;
        assert_eq!(json["error"]["message"], "Patient not found");
        assert!(json["error"].get("violations").is_none());
    }

    #[tokio::test]
    async fn duplicate_returns_400() {
        let api_err: ApiError = RecordsError::Duplicate("P001".into()).into();
        let response = api_err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "ALREADY_EXISTS");
    }

    #[tokio::test]
    async fn storage_error_returns_500_without_details() {
        let store_err = StoreError::Corrupt {
            path: "patients.json".into(),
            reason: "expected value at line 1".into(),
        };
        let api_err: ApiError = RecordsError::Storage(store_err).into();
        let response = api_err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let json = body_json(response).await;
        assert_eq!(json["error"]["message"], "An internal error occurred");
    }

    #[tokio::test]
    async fn invalid_argument_returns_400() {
        let api_err: ApiError = RecordsError::InvalidArgument("bad sort_by".into()).into();
        assert_eq!(api_err.into_response().status(), StatusCode::BAD_REQUEST);
    }
}
