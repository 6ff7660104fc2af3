//! artcast-cr library - Content Review module
//!
//! Submission review lifecycle and publishing of approved submissions to
//! the external signage CMS. Exposes the application state and router for
//! integration testing.

pub mod api;
pub mod assets;
pub mod config;
pub mod db;
pub mod error;
pub mod publish;
pub mod review;
pub mod services;

pub use crate::error::{ApiError, ApiResult};

use std::sync::Arc;

use axum::Router;
use sqlx::SqlitePool;
use tower_http::trace::TraceLayer;

use crate::assets::AssetStore;
use crate::config::PublishTarget;
use crate::services::cms::MediaCms;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Local storage for uploaded images
    pub assets: AssetStore,
    /// Publishing adapter for the external CMS (trait object so tests can
    /// substitute a fake)
    pub cms: Arc<dyn MediaCms>,
    /// Fixed playlist and display duration for published submissions
    pub publish_target: PublishTarget,
    /// Signing secret for session tokens
    pub session_secret: String,
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::auth_routes())
        .merge(api::submission_routes())
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
