//! Review endpoint

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use artcast_common::types::{ReviewAction, Submission};
use artcast_common::Error;

use crate::api::auth::AuthPrincipal;
use crate::error::ApiResult;
use crate::{review, AppState};

/// PATCH /api/submissions/:id/review request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewRequest {
    /// "approve" or "reject"; parsed by hand so an unknown action maps to
    /// a 400 rather than a deserialization rejection
    pub action: String,
    pub reject_reason: Option<String>,
}

/// PATCH /api/submissions/:id/review
pub async fn review_submission(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    AuthPrincipal(principal): AuthPrincipal,
    Json(request): Json<ReviewRequest>,
) -> ApiResult<Json<Submission>> {
    let action = match request.action.as_str() {
        "approve" => ReviewAction::Approve,
        "reject" => ReviewAction::Reject,
        other => {
            return Err(Error::InvalidInput(format!(
                "invalid action {other:?}; use 'approve' or 'reject'"
            ))
            .into())
        }
    };

    let submission = review::review(
        &state.db,
        id,
        &principal,
        action,
        request.reject_reason.as_deref(),
    )
    .await?;

    Ok(Json(submission))
}
