//! Submission store
//!
//! Review mutations are single-row, single-statement UPDATEs so concurrent
//! readers never observe partially-written lifecycle fields.

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use artcast_common::types::{Submission, SubmissionStatus};
use artcast_common::{Error, Result};

const SELECT_COLUMNS: &str = "SELECT id, tenant_id, title, nickname, asset_path, status, \
     reject_reason, approved_at, external_media_id, created_at FROM submissions";

/// Review decision applied as one atomic row update
#[derive(Debug, Clone)]
pub enum ReviewUpdate {
    Approve { approved_at: DateTime<Utc> },
    Reject { reason: String },
}

/// Create a new pending submission
pub async fn create(
    pool: &SqlitePool,
    tenant_id: Uuid,
    title: &str,
    nickname: &str,
    asset_path: &str,
) -> Result<Submission> {
    let submission = Submission {
        id: Uuid::new_v4(),
        tenant_id,
        title: title.to_string(),
        nickname: nickname.to_string(),
        asset_path: asset_path.to_string(),
        status: SubmissionStatus::Pending,
        reject_reason: None,
        approved_at: None,
        external_media_id: None,
        created_at: Utc::now(),
    };

    sqlx::query(
        r#"
        INSERT INTO submissions (id, tenant_id, title, nickname, asset_path, status, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(submission.id.to_string())
    .bind(submission.tenant_id.to_string())
    .bind(&submission.title)
    .bind(&submission.nickname)
    .bind(&submission.asset_path)
    .bind(submission.status.as_str())
    .bind(submission.created_at.to_rfc3339())
    .execute(pool)
    .await?;

    Ok(submission)
}

/// Load a submission by id
pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Submission>> {
    let row = sqlx::query(&format!("{SELECT_COLUMNS} WHERE id = ?"))
        .bind(id.to_string())
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(row_to_submission).transpose()
}

/// List submissions, newest first, optionally filtered by status and tenant
///
/// The tenant filter is the query boundary that restricts staff to their
/// own school's submissions.
pub async fn list(
    pool: &SqlitePool,
    status: Option<SubmissionStatus>,
    tenant_id: Option<Uuid>,
) -> Result<Vec<Submission>> {
    let rows = match (status, tenant_id) {
        (Some(status), Some(tenant)) => {
            sqlx::query(&format!(
                "{SELECT_COLUMNS} WHERE status = ? AND tenant_id = ? ORDER BY created_at DESC"
            ))
            .bind(status.as_str())
            .bind(tenant.to_string())
            .fetch_all(pool)
            .await?
        }
        (Some(status), None) => {
            sqlx::query(&format!(
                "{SELECT_COLUMNS} WHERE status = ? ORDER BY created_at DESC"
            ))
            .bind(status.as_str())
            .fetch_all(pool)
            .await?
        }
        (None, Some(tenant)) => {
            sqlx::query(&format!(
                "{SELECT_COLUMNS} WHERE tenant_id = ? ORDER BY created_at DESC"
            ))
            .bind(tenant.to_string())
            .fetch_all(pool)
            .await?
        }
        (None, None) => {
            sqlx::query(&format!("{SELECT_COLUMNS} ORDER BY created_at DESC"))
                .fetch_all(pool)
                .await?
        }
    };

    rows.iter().map(row_to_submission).collect()
}

/// Apply a review decision as a single atomic UPDATE
///
/// Rejection clears approved_at and external_media_id in the same
/// statement; approval clears reject_reason and leaves external_media_id
/// untouched (approval and publishing are decoupled).
pub async fn apply_review(pool: &SqlitePool, id: Uuid, update: &ReviewUpdate) -> Result<()> {
    let result = match update {
        ReviewUpdate::Approve { approved_at } => {
            sqlx::query(
                r#"
                UPDATE submissions
                SET status = 'approved', approved_at = ?, reject_reason = NULL
                WHERE id = ?
                "#,
            )
            .bind(approved_at.to_rfc3339())
            .bind(id.to_string())
            .execute(pool)
            .await?
        }
        ReviewUpdate::Reject { reason } => {
            sqlx::query(
                r#"
                UPDATE submissions
                SET status = 'rejected', reject_reason = ?,
                    approved_at = NULL, external_media_id = NULL
                WHERE id = ?
                "#,
            )
            .bind(reason)
            .bind(id.to_string())
            .execute(pool)
            .await?
        }
    };

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("submission {id}")));
    }
    Ok(())
}

/// Record the media identifier assigned by the external CMS
pub async fn set_external_media_id(pool: &SqlitePool, id: Uuid, media_id: i64) -> Result<()> {
    let result = sqlx::query("UPDATE submissions SET external_media_id = ? WHERE id = ?")
        .bind(media_id)
        .bind(id.to_string())
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("submission {id}")));
    }
    Ok(())
}

fn row_to_submission(row: &SqliteRow) -> Result<Submission> {
    let id: String = row.get("id");
    let id = Uuid::parse_str(&id)
        .map_err(|e| Error::Internal(format!("invalid submission id in database: {e}")))?;

    let tenant_id: String = row.get("tenant_id");
    let tenant_id = Uuid::parse_str(&tenant_id)
        .map_err(|e| Error::Internal(format!("invalid tenant id in database: {e}")))?;

    let status: String = row.get("status");
    let status = status.parse::<SubmissionStatus>().map_err(Error::Internal)?;

    let approved_at: Option<String> = row.get("approved_at");
    let approved_at = approved_at
        .map(|s| DateTime::parse_from_rfc3339(&s))
        .transpose()
        .map_err(|e| Error::Internal(format!("invalid approved_at in database: {e}")))?
        .map(|dt| dt.with_timezone(&Utc));

    let created_at: String = row.get("created_at");
    let created_at = DateTime::parse_from_rfc3339(&created_at)
        .map_err(|e| Error::Internal(format!("invalid created_at in database: {e}")))?
        .with_timezone(&Utc);

    Ok(Submission {
        id,
        tenant_id,
        title: row.get("title"),
        nickname: row.get("nickname"),
        asset_path: row.get("asset_path"),
        status,
        reject_reason: row.get("reject_reason"),
        approved_at,
        external_media_id: row.get("external_media_id"),
        created_at,
    })
}
