//! Submission listing and creation endpoints

use axum::{
    extract::{Multipart, Query, State},
    http::StatusCode,
    routing::{get, patch, post},
    Json, Router,
};
use serde::Deserialize;

use artcast_common::types::{Role, Submission, SubmissionStatus};
use artcast_common::Error;

use crate::api::auth::AuthPrincipal;
use crate::api::{publish, review};
use crate::db::submissions;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// GET /api/submissions query parameters
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub status: Option<SubmissionStatus>,
    /// Admin-only: restrict to one tenant
    pub tenant_id: Option<uuid::Uuid>,
}

/// GET /api/submissions
///
/// Staff are restricted to their own tenant's submissions here, at the
/// query boundary; admins see everything, newest first.
pub async fn list_submissions(
    State(state): State<AppState>,
    AuthPrincipal(principal): AuthPrincipal,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<Vec<Submission>>> {
    let tenant_filter = match principal.role {
        Role::Admin => query.tenant_id,
        Role::Staff => {
            let tenant_id = principal.tenant_id.ok_or_else(|| {
                Error::Forbidden("staff session is missing its tenant".to_string())
            })?;
            Some(tenant_id)
        }
    };

    let submissions = submissions::list(&state.db, query.status, tenant_filter).await?;
    Ok(Json(submissions))
}

/// POST /api/submissions (multipart: title, nickname, file)
///
/// Staff only: new submissions always belong to the submitter's tenant
/// and start out pending.
pub async fn create_submission(
    State(state): State<AppState>,
    AuthPrincipal(principal): AuthPrincipal,
    mut multipart: Multipart,
) -> ApiResult<(StatusCode, Json<Submission>)> {
    let tenant_id = match (principal.role, principal.tenant_id) {
        (Role::Staff, Some(tenant_id)) => tenant_id,
        _ => {
            return Err(
                Error::Forbidden("only school staff can create submissions".to_string()).into(),
            )
        }
    };

    let mut title: Option<String> = None;
    let mut nickname: Option<String> = None;
    let mut file: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("malformed multipart body: {e}")))?
    {
        match field.name() {
            Some("title") => {
                title = Some(field.text().await.map_err(bad_field)?);
            }
            Some("nickname") => {
                nickname = Some(field.text().await.map_err(bad_field)?);
            }
            Some("file") => {
                let file_name = field.file_name().unwrap_or("upload").to_string();
                let bytes = field.bytes().await.map_err(bad_field)?;
                file = Some((file_name, bytes.to_vec()));
            }
            _ => {}
        }
    }

    let title = non_empty(title, "title")?;
    let nickname = non_empty(nickname, "nickname")?;
    let (file_name, bytes) =
        file.ok_or_else(|| Error::InvalidInput("a file field is required".to_string()))?;
    if bytes.is_empty() {
        return Err(Error::InvalidInput("uploaded file is empty".to_string()).into());
    }

    let asset_path = state.assets.save(&file_name, &bytes).await?;
    let submission =
        submissions::create(&state.db, tenant_id, &title, &nickname, &asset_path).await?;

    tracing::info!(
        submission_id = %submission.id,
        tenant_id = %tenant_id,
        asset_path = %asset_path,
        "submission created"
    );

    Ok((StatusCode::CREATED, Json(submission)))
}

fn bad_field(e: axum::extract::multipart::MultipartError) -> ApiError {
    ApiError::BadRequest(format!("unreadable multipart field: {e}"))
}

fn non_empty(value: Option<String>, field: &str) -> Result<String, ApiError> {
    match value.map(|v| v.trim().to_string()) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(Error::InvalidInput(format!("a {field} field is required")).into()),
    }
}

pub fn submission_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/submissions",
            get(list_submissions).post(create_submission),
        )
        .route(
            "/api/submissions/:id/review",
            patch(review::review_submission),
        )
        .route(
            "/api/submissions/:id/publish",
            post(publish::publish_submission),
        )
}
