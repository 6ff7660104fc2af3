//! Publish orchestrator
//!
//! Sequences approved submission → uploaded asset → playlist assignment →
//! recorded media id, aborting at the first failure. Steps before the
//! final persist leave the submission record untouched, so a failed
//! publish is always safe to retry by hand. An assignment failure does
//! leave the uploaded asset orphaned in the CMS library; no compensating
//! delete is attempted.

use chrono::Utc;
use serde::Serialize;
use sqlx::SqlitePool;
use uuid::Uuid;

use artcast_common::types::{Principal, SubmissionStatus};
use artcast_common::Error;

use crate::assets::AssetStore;
use crate::config::PublishTarget;
use crate::db::submissions;
use crate::error::ApiResult;
use crate::services::cms::MediaCms;

/// Result of a successful publish
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishOutcome {
    pub media_id: i64,
    pub playlist_id: i64,
}

/// Publish an approved submission to the external CMS.
///
/// Re-publishing an already-published submission is allowed: the run is
/// safe (a fresh asset name is generated per attempt) and the new media id
/// overwrites the old one, orphaning the previous library asset.
pub async fn publish(
    pool: &SqlitePool,
    assets: &AssetStore,
    cms: &dyn MediaCms,
    target: &PublishTarget,
    submission_id: Uuid,
    principal: &Principal,
) -> ApiResult<PublishOutcome> {
    let submission = submissions::find_by_id(pool, submission_id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("submission {submission_id}")))?;

    if submission.status != SubmissionStatus::Approved {
        return Err(Error::InvalidState(format!(
            "submission {submission_id} must be approved before publishing (currently {})",
            submission.status
        ))
        .into());
    }

    if let Some(previous) = submission.external_media_id {
        tracing::warn!(
            submission_id = %submission_id,
            previous_media_id = previous,
            "re-publishing an already published submission; the previous library asset is orphaned"
        );
    }

    // The local file must exist before any CMS traffic
    let file_path = assets.resolve(&submission.asset_path)?;

    // Unique per attempt, so repeated publishes never collide in the
    // external library
    let media_name = format!(
        "submission-{}-{}-{}",
        submission.id,
        Utc::now().timestamp_millis(),
        Uuid::new_v4()
    );

    tracing::info!(
        submission_id = %submission_id,
        publisher = %principal.principal_id,
        media_name = %media_name,
        "publishing submission"
    );

    let media_id = cms.upload_asset(&file_path, &media_name).await?;
    cms.assign_to_playlist(target.playlist_id, media_id, target.display_duration_secs)
        .await?;

    // The only durable mutation of the submission record
    submissions::set_external_media_id(pool, submission_id, media_id).await?;

    tracing::info!(
        submission_id = %submission_id,
        media_id,
        playlist_id = target.playlist_id,
        "submission published"
    );

    Ok(PublishOutcome {
        media_id,
        playlist_id: target.playlist_id,
    })
}
