//! Review engine
//!
//! Enforces the submission lifecycle: pending → approved/rejected,
//! approved ⇄ rejected. Re-approving an already approved submission is a
//! conflict rather than a silent no-op, so a redundant click can never
//! trigger a second publish.
//!
//! Role checks ({admin, staff} may review) are carried by the `Principal`
//! type: it is only constructible from a verified session with one of the
//! two roles, so an unauthorized caller is stopped at the HTTP boundary.
//! Tenant scoping of what staff can *see* happens at the list query
//! boundary, not here.

use sqlx::SqlitePool;
use uuid::Uuid;

use artcast_common::types::{Principal, ReviewAction, Submission, SubmissionStatus};
use artcast_common::{Error, Result};

use crate::db::submissions::{self, ReviewUpdate};

/// Apply a review decision to a submission.
///
/// On reject: stores the trimmed reason, clears approved_at and any
/// previously recorded external media id. On approve: stamps approved_at
/// and clears the reason; the external media id is untouched because
/// approval and publishing are decoupled operations.
pub async fn review(
    pool: &SqlitePool,
    submission_id: Uuid,
    principal: &Principal,
    action: ReviewAction,
    reason: Option<&str>,
) -> Result<Submission> {
    let submission = submissions::find_by_id(pool, submission_id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("submission {submission_id}")))?;

    let update = match action {
        ReviewAction::Reject => {
            let reason = reason.unwrap_or_default().trim();
            if reason.is_empty() {
                return Err(Error::InvalidInput(
                    "a reject reason is required".to_string(),
                ));
            }
            ReviewUpdate::Reject {
                reason: reason.to_string(),
            }
        }
        ReviewAction::Approve => {
            if submission.status == SubmissionStatus::Approved {
                return Err(Error::Conflict(format!(
                    "submission {submission_id} is already approved"
                )));
            }
            ReviewUpdate::Approve {
                approved_at: chrono::Utc::now(),
            }
        }
    };

    submissions::apply_review(pool, submission_id, &update).await?;

    tracing::info!(
        submission_id = %submission_id,
        action = ?action,
        reviewer = %principal.principal_id,
        "review applied"
    );

    submissions::find_by_id(pool, submission_id)
        .await?
        .ok_or_else(|| Error::Internal(format!("submission {submission_id} vanished mid-review")))
}
