//! Publish endpoint

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::api::auth::AuthPrincipal;
use crate::error::ApiResult;
use crate::publish::{self, PublishOutcome};
use crate::AppState;

/// POST /api/submissions/:id/publish
///
/// No request body; the playlist and display duration are fixed by
/// configuration.
pub async fn publish_submission(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    AuthPrincipal(principal): AuthPrincipal,
) -> ApiResult<Json<PublishOutcome>> {
    let outcome = publish::publish(
        &state.db,
        &state.assets,
        state.cms.as_ref(),
        &state.publish_target,
        id,
        &principal,
    )
    .await?;

    Ok(Json(outcome))
}
