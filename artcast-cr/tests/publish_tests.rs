//! Integration tests for the publish orchestrator
//!
//! A fake `MediaCms` with call counters verifies both the happy path and
//! the guarantee that precondition failures perform no external calls.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use axum::async_trait;
use serde_json::json;
use sqlx::SqlitePool;
use tempfile::TempDir;
use uuid::Uuid;

use artcast_common::types::{Principal, ReviewAction, Role, Submission};
use artcast_common::Error;
use artcast_cr::assets::AssetStore;
use artcast_cr::config::PublishTarget;
use artcast_cr::db::{self, submissions, tenants};
use artcast_cr::publish::publish;
use artcast_cr::review::review;
use artcast_cr::services::cms::{CmsError, MediaCms};
use artcast_cr::ApiError;

#[derive(Debug, Clone, Copy, PartialEq)]
enum FailureMode {
    None,
    Upload,
    Assignment,
}

struct FakeCms {
    media_id: i64,
    failure: FailureMode,
    upload_calls: AtomicUsize,
    assign_calls: AtomicUsize,
}

impl FakeCms {
    fn new(media_id: i64) -> Self {
        Self::with_failure(media_id, FailureMode::None)
    }

    fn with_failure(media_id: i64, failure: FailureMode) -> Self {
        Self {
            media_id,
            failure,
            upload_calls: AtomicUsize::new(0),
            assign_calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl MediaCms for FakeCms {
    async fn upload_asset(
        &self,
        _file_path: &Path,
        _desired_name: &str,
    ) -> Result<i64, CmsError> {
        self.upload_calls.fetch_add(1, Ordering::SeqCst);
        if self.failure == FailureMode::Upload {
            return Err(CmsError::UploadRejected {
                detail: json!({ "files": [{ "error": "invalid image" }] }),
            });
        }
        Ok(self.media_id)
    }

    async fn assign_to_playlist(
        &self,
        _playlist_id: i64,
        _media_id: i64,
        _duration_secs: u32,
    ) -> Result<(), CmsError> {
        self.assign_calls.fetch_add(1, Ordering::SeqCst);
        if self.failure == FailureMode::Assignment {
            return Err(CmsError::AssignmentFailed {
                status: Some(500),
                body: "playlist locked".to_string(),
            });
        }
        Ok(())
    }
}

struct Fixture {
    _dir: TempDir,
    pool: SqlitePool,
    assets: AssetStore,
    target: PublishTarget,
}

async fn setup() -> Fixture {
    let dir = TempDir::new().expect("should create temp dir");
    let pool = db::init_database_pool(&dir.path().join("artcast.db"))
        .await
        .expect("should initialize database");
    let assets = AssetStore::new(dir.path());
    let target = PublishTarget {
        playlist_id: 7,
        display_duration_secs: 10,
    };
    Fixture {
        _dir: dir,
        pool,
        assets,
        target,
    }
}

fn admin() -> Principal {
    Principal {
        principal_id: Uuid::new_v4(),
        role: Role::Admin,
        tenant_id: None,
        name: "Administrator".to_string(),
    }
}

/// Seed a submission whose asset file really exists on disk
async fn seed_submission(fixture: &Fixture, approved: bool) -> Submission {
    let tenant = tenants::create(&fixture.pool, "SCH001", "Naha Elementary School", "school123")
        .await
        .expect("should create tenant");

    let asset_path = fixture
        .assets
        .save("sunflower.png", b"png-bytes")
        .await
        .expect("should store asset");

    let submission = submissions::create(
        &fixture.pool,
        tenant.id,
        "Sunflower Field",
        "hanako",
        &asset_path,
    )
    .await
    .expect("should create submission");

    if approved {
        review(
            &fixture.pool,
            submission.id,
            &admin(),
            ReviewAction::Approve,
            None,
        )
        .await
        .expect("approve should succeed");
    }

    submissions::find_by_id(&fixture.pool, submission.id)
        .await
        .expect("lookup should succeed")
        .expect("submission should exist")
}

async fn reload(pool: &SqlitePool, id: Uuid) -> Submission {
    submissions::find_by_id(pool, id)
        .await
        .expect("lookup should succeed")
        .expect("submission should exist")
}

#[tokio::test]
async fn publish_success_records_media_id() {
    let fixture = setup().await;
    let submission = seed_submission(&fixture, true).await;
    let cms = FakeCms::new(42);

    let outcome = publish(
        &fixture.pool,
        &fixture.assets,
        &cms,
        &fixture.target,
        submission.id,
        &admin(),
    )
    .await
    .expect("publish should succeed");

    assert_eq!(outcome.media_id, 42);
    assert_eq!(outcome.playlist_id, 7);
    assert_eq!(cms.upload_calls.load(Ordering::SeqCst), 1);
    assert_eq!(cms.assign_calls.load(Ordering::SeqCst), 1);

    let stored = reload(&fixture.pool, submission.id).await;
    assert_eq!(stored.external_media_id, Some(42));
}

#[tokio::test]
async fn publish_unapproved_is_invalid_state_with_no_external_calls() {
    let fixture = setup().await;
    let submission = seed_submission(&fixture, false).await;
    let cms = FakeCms::new(42);

    let err = publish(
        &fixture.pool,
        &fixture.assets,
        &cms,
        &fixture.target,
        submission.id,
        &admin(),
    )
    .await
    .expect_err("pending submission must not publish");

    assert!(
        matches!(err, ApiError::Domain(Error::InvalidState(_))),
        "got {err:?}"
    );
    assert_eq!(cms.upload_calls.load(Ordering::SeqCst), 0);
    assert_eq!(cms.assign_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn publish_rejected_is_invalid_state() {
    let fixture = setup().await;
    let submission = seed_submission(&fixture, false).await;
    review(
        &fixture.pool,
        submission.id,
        &admin(),
        ReviewAction::Reject,
        Some("copyright concern"),
    )
    .await
    .expect("reject should succeed");
    let cms = FakeCms::new(42);

    let err = publish(
        &fixture.pool,
        &fixture.assets,
        &cms,
        &fixture.target,
        submission.id,
        &admin(),
    )
    .await
    .expect_err("rejected submission must not publish");

    assert!(matches!(err, ApiError::Domain(Error::InvalidState(_))));
    assert_eq!(cms.upload_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn publish_unknown_submission_is_not_found() {
    let fixture = setup().await;
    let cms = FakeCms::new(42);

    let err = publish(
        &fixture.pool,
        &fixture.assets,
        &cms,
        &fixture.target,
        Uuid::new_v4(),
        &admin(),
    )
    .await
    .expect_err("unknown id should fail");

    assert!(matches!(err, ApiError::Domain(Error::NotFound(_))));
    assert_eq!(cms.upload_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn publish_missing_asset_makes_no_network_calls() {
    let fixture = setup().await;
    let submission = seed_submission(&fixture, true).await;

    // Remove the file behind the submission's stored path
    let path = fixture
        .assets
        .resolve(&submission.asset_path)
        .expect("asset should resolve before deletion");
    std::fs::remove_file(path).expect("should delete asset file");

    let cms = FakeCms::new(42);
    let err = publish(
        &fixture.pool,
        &fixture.assets,
        &cms,
        &fixture.target,
        submission.id,
        &admin(),
    )
    .await
    .expect_err("missing asset should fail");

    assert!(
        matches!(err, ApiError::Domain(Error::AssetMissing(_))),
        "got {err:?}"
    );
    assert_eq!(cms.upload_calls.load(Ordering::SeqCst), 0);
    assert_eq!(cms.assign_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn upload_failure_leaves_submission_unpublished() {
    let fixture = setup().await;
    let submission = seed_submission(&fixture, true).await;
    let cms = FakeCms::with_failure(42, FailureMode::Upload);

    let err = publish(
        &fixture.pool,
        &fixture.assets,
        &cms,
        &fixture.target,
        submission.id,
        &admin(),
    )
    .await
    .expect_err("upload failure should abort the publish");

    match err {
        ApiError::Cms(CmsError::UploadRejected { detail }) => {
            assert_eq!(detail["files"][0]["error"], "invalid image");
        }
        other => panic!("expected UploadRejected, got {other:?}"),
    }

    let stored = reload(&fixture.pool, submission.id).await;
    assert!(stored.external_media_id.is_none());
    assert_eq!(cms.assign_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn assignment_failure_leaves_submission_unpublished() {
    let fixture = setup().await;
    let submission = seed_submission(&fixture, true).await;
    let cms = FakeCms::with_failure(42, FailureMode::Assignment);

    let err = publish(
        &fixture.pool,
        &fixture.assets,
        &cms,
        &fixture.target,
        submission.id,
        &admin(),
    )
    .await
    .expect_err("assignment failure should abort the publish");

    match err {
        ApiError::Cms(CmsError::AssignmentFailed { status, body }) => {
            assert_eq!(status, Some(500));
            assert_eq!(body, "playlist locked");
        }
        other => panic!("expected AssignmentFailed, got {other:?}"),
    }

    // Upload happened, so an orphaned asset exists in the CMS library, but
    // the submission record is untouched
    assert_eq!(cms.upload_calls.load(Ordering::SeqCst), 1);
    let stored = reload(&fixture.pool, submission.id).await;
    assert!(stored.external_media_id.is_none());
}

#[tokio::test]
async fn republish_overwrites_the_stored_media_id() {
    let fixture = setup().await;
    let submission = seed_submission(&fixture, true).await;

    let first = FakeCms::new(42);
    publish(
        &fixture.pool,
        &fixture.assets,
        &first,
        &fixture.target,
        submission.id,
        &admin(),
    )
    .await
    .expect("first publish should succeed");

    let second = FakeCms::new(43);
    publish(
        &fixture.pool,
        &fixture.assets,
        &second,
        &fixture.target,
        submission.id,
        &admin(),
    )
    .await
    .expect("re-publish should succeed");

    let stored = reload(&fixture.pool, submission.id).await;
    assert_eq!(stored.external_media_id, Some(43));
}
