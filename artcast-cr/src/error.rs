//! Error types for artcast-cr
//!
//! Maps the domain taxonomy and external-CMS failures onto HTTP responses.
//! CMS errors keep the upstream status/body verbatim in the response detail
//! so operators see the raw payload rather than a translated message.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

use crate::services::cms::CmsError;
use artcast_common::Error as DomainError;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Domain error from the review engine, stores or asset layer
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// External CMS failure surfaced by the publishing adapter
    #[error(transparent)]
    Cms(#[from] CmsError),

    /// Malformed request outside the domain taxonomy (bad multipart, etc.)
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl ApiError {
    fn status_code_and_body(&self) -> (StatusCode, &'static str, String, Option<Value>) {
        match self {
            ApiError::Domain(err) => match err {
                DomainError::Unauthorized(msg) => {
                    (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone(), None)
                }
                DomainError::Forbidden(msg) => {
                    (StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone(), None)
                }
                DomainError::NotFound(msg) => {
                    (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone(), None)
                }
                DomainError::InvalidInput(msg) => {
                    (StatusCode::BAD_REQUEST, "INVALID_INPUT", msg.clone(), None)
                }
                DomainError::Conflict(msg) => {
                    (StatusCode::CONFLICT, "CONFLICT", msg.clone(), None)
                }
                DomainError::InvalidState(msg) => {
                    (StatusCode::CONFLICT, "INVALID_STATE", msg.clone(), None)
                }
                // Server-local file absent: deliberately distinct from the
                // 502 used for CMS-side failures.
                DomainError::AssetMissing(msg) => {
                    (StatusCode::NOT_FOUND, "ASSET_MISSING", msg.clone(), None)
                }
                other => {
                    tracing::error!(error = %other, "internal error");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "INTERNAL_ERROR",
                        other.to_string(),
                        None,
                    )
                }
            },
            ApiError::Cms(err) => {
                let (code, detail) = match err {
                    CmsError::AuthFailed(msg) => {
                        ("CMS_AUTH_FAILED", Some(json!({ "message": msg })))
                    }
                    CmsError::UploadRejected { detail } => {
                        ("CMS_UPLOAD_REJECTED", Some(detail.clone()))
                    }
                    CmsError::MediaIdMissing { response } => {
                        ("CMS_MEDIA_ID_MISSING", Some(response.clone()))
                    }
                    CmsError::AssignmentFailed { status, body } => (
                        "CMS_ASSIGNMENT_FAILED",
                        Some(json!({ "status": status, "body": body })),
                    ),
                };
                (StatusCode::BAD_GATEWAY, code, err.to_string(), detail)
            }
            ApiError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone(), None)
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message, detail) = self.status_code_and_body();

        let mut error = json!({
            "code": code,
            "message": message,
        });
        if let Some(detail) = detail {
            error["detail"] = detail;
        }

        (status, Json(json!({ "error": error }))).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_errors_map_to_expected_statuses() {
        let cases = [
            (DomainError::Unauthorized("x".into()), StatusCode::UNAUTHORIZED),
            (DomainError::Forbidden("x".into()), StatusCode::FORBIDDEN),
            (DomainError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (DomainError::InvalidInput("x".into()), StatusCode::BAD_REQUEST),
            (DomainError::Conflict("x".into()), StatusCode::CONFLICT),
            (DomainError::InvalidState("x".into()), StatusCode::CONFLICT),
            (DomainError::AssetMissing("x".into()), StatusCode::NOT_FOUND),
            (DomainError::Internal("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, expected) in cases {
            let (status, _, _, _) = ApiError::Domain(err).status_code_and_body();
            assert_eq!(status, expected);
        }
    }

    #[test]
    fn cms_errors_are_bad_gateway_with_detail() {
        let err = ApiError::Cms(CmsError::AssignmentFailed {
            status: Some(500),
            body: "playlist locked".to_string(),
        });
        let (status, code, _, detail) = err.status_code_and_body();
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(code, "CMS_ASSIGNMENT_FAILED");
        let detail = detail.unwrap();
        assert_eq!(detail["status"], 500);
        assert_eq!(detail["body"], "playlist locked");
    }
}
