//! Domain types shared by the Artcast services

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Submission lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionStatus {
    Pending,
    Approved,
    Rejected,
}

impl SubmissionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SubmissionStatus::Pending => "pending",
            SubmissionStatus::Approved => "approved",
            SubmissionStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SubmissionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(SubmissionStatus::Pending),
            "approved" => Ok(SubmissionStatus::Approved),
            "rejected" => Ok(SubmissionStatus::Rejected),
            other => Err(format!("unknown submission status: {other}")),
        }
    }
}

/// A school's uploaded image awaiting or having received review
///
/// Lifecycle fields stay mutually consistent: `reject_reason` is set iff
/// rejected, `approved_at` iff approved, and `external_media_id` only while
/// approved (a transition to rejected clears it).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub title: String,
    /// Author nickname shown alongside the image (never the real name)
    pub nickname: String,
    /// Relative location of the stored image under the data root
    pub asset_path: String,
    pub status: SubmissionStatus,
    pub reject_reason: Option<String>,
    pub approved_at: Option<DateTime<Utc>>,
    /// Media identifier assigned by the external CMS once published
    pub external_media_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl Submission {
    /// True when status, reject_reason and approved_at agree.
    pub fn lifecycle_consistent(&self) -> bool {
        match self.status {
            SubmissionStatus::Pending => {
                self.reject_reason.is_none() && self.approved_at.is_none()
            }
            SubmissionStatus::Approved => {
                self.reject_reason.is_none() && self.approved_at.is_some()
            }
            SubmissionStatus::Rejected => {
                self.reject_reason.is_some()
                    && self.approved_at.is_none()
                    && self.external_media_id.is_none()
            }
        }
    }
}

/// A school account scoping staff-visible submissions
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Tenant {
    pub id: Uuid,
    /// Unique human-readable code used at login
    pub code: String,
    pub name: String,
    #[serde(skip)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Actor role carried by a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Staff,
}

/// The authenticated actor performing an action
///
/// Created from a verified session token; lives only for the token's
/// validity window. Staff principals carry their owning tenant id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Principal {
    pub principal_id: Uuid,
    pub role: Role,
    pub tenant_id: Option<Uuid>,
    pub name: String,
}

/// Review decision requested against a submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewAction {
    Approve,
    Reject,
}
