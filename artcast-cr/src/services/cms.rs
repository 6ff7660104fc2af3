//! External signage CMS client
//!
//! Bridges approved submissions to the CMS's library + playlist model:
//! client-credential token exchange with an in-process cache, multipart
//! library upload, and form-encoded playlist assignment.
//!
//! The CMS's upload response shape is not stable across versions: the
//! media identifier has been observed at several different paths, and
//! per-file errors arrive inside an otherwise-successful response. Both
//! quirks are isolated here, in [`extract_media_id`] and `upload_asset`.

use std::path::Path;
use std::time::{Duration, Instant};

use axum::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;
use tokio::sync::Mutex;

use crate::config::CmsConfig;
use artcast_common::{Error, Result};

/// Safety margin subtracted from the advertised token lifetime
const TOKEN_EXPIRY_MARGIN: Duration = Duration::from_secs(10);

/// CMS client errors
///
/// Upstream payloads ride along verbatim as opaque JSON values; the CMS's
/// error shapes are not contractually stable, and operators want the raw
/// detail.
#[derive(Debug, Error)]
pub enum CmsError {
    /// Token exchange failed; no partial retry of later steps is valid
    /// until a fresh token is obtained
    #[error("CMS auth failed: {0}")]
    AuthFailed(String),

    /// The CMS reported a per-file error, or the upload never completed
    #[error("CMS upload rejected: {detail}")]
    UploadRejected { detail: Value },

    /// Upload reported success but no media identifier could be extracted
    #[error("CMS upload succeeded but no media id was found in the response")]
    MediaIdMissing { response: Value },

    /// Playlist assignment failed; status is None when no HTTP response
    /// was received (transport error or timeout)
    #[error("CMS playlist assignment failed (status {status:?}): {body}")]
    AssignmentFailed { status: Option<u16>, body: String },
}

/// Adapter seam between the publish orchestrator and the external CMS.
///
/// Each operation is independently retryable by the caller; all of them
/// surface `AuthFailed` when the token exchange fails.
#[async_trait]
pub trait MediaCms: Send + Sync {
    /// Upload a local file under a caller-supplied name; returns the media
    /// identifier assigned by the CMS library.
    async fn upload_asset(&self, file_path: &Path, desired_name: &str)
        -> std::result::Result<i64, CmsError>;

    /// Associate an uploaded asset with a display playlist for a fixed
    /// duration.
    async fn assign_to_playlist(
        &self,
        playlist_id: i64,
        media_id: i64,
        duration_secs: u32,
    ) -> std::result::Result<(), CmsError>;
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

#[derive(Debug)]
struct CachedToken {
    token: String,
    expires_at: Instant,
}

impl CachedToken {
    fn from_response(response: TokenResponse, now: Instant) -> Self {
        let lifetime =
            Duration::from_secs(response.expires_in).saturating_sub(TOKEN_EXPIRY_MARGIN);
        Self {
            token: response.access_token,
            expires_at: now + lifetime,
        }
    }

    fn is_valid(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

/// Owns the client-credential token exchange and its cache.
///
/// Constructed once and handed to the client by reference; no module-level
/// state. The cache mutex is held across a refresh, so concurrent callers
/// wait for one exchange instead of racing to issue their own.
pub struct CmsAuthenticator {
    http: reqwest::Client,
    base_url: String,
    client_id: String,
    client_secret: String,
    cached: Mutex<Option<CachedToken>>,
}

impl CmsAuthenticator {
    pub fn new(
        http: reqwest::Client,
        base_url: String,
        client_id: String,
        client_secret: String,
    ) -> Self {
        Self {
            http,
            base_url,
            client_id,
            client_secret,
            cached: Mutex::new(None),
        }
    }

    /// Return a valid bearer token, refreshing through the token endpoint
    /// when the cached one is absent or inside the expiry margin.
    pub async fn bearer_token(&self) -> std::result::Result<String, CmsError> {
        let mut cached = self.cached.lock().await;

        if let Some(token) = cached.as_ref() {
            if token.is_valid(Instant::now()) {
                return Ok(token.token.clone());
            }
        }

        let params = [
            ("grant_type", "client_credentials"),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
        ];

        let response = self
            .http
            .post(format!("{}/api/authorize/access_token", self.base_url))
            .form(&params)
            .send()
            .await
            .map_err(|e| CmsError::AuthFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CmsError::AuthFailed(format!(
                "token endpoint returned {status}: {body}"
            )));
        }

        let token_response: TokenResponse = response
            .json()
            .await
            .map_err(|e| CmsError::AuthFailed(format!("malformed token response: {e}")))?;

        let token = CachedToken::from_response(token_response, Instant::now());
        let bearer = token.token.clone();
        *cached = Some(token);

        tracing::debug!("refreshed CMS access token");
        Ok(bearer)
    }
}

/// HTTP client for the external CMS
pub struct CmsClient {
    http: reqwest::Client,
    base_url: String,
    auth: CmsAuthenticator,
}

impl CmsClient {
    pub fn new(config: &CmsConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| Error::Config(format!("failed to build CMS HTTP client: {e}")))?;

        let auth = CmsAuthenticator::new(
            http.clone(),
            config.base_url.clone(),
            config.client_id.clone(),
            config.client_secret.clone(),
        );

        Ok(Self {
            http,
            base_url: config.base_url.clone(),
            auth,
        })
    }
}

#[async_trait]
impl MediaCms for CmsClient {
    async fn upload_asset(
        &self,
        file_path: &Path,
        desired_name: &str,
    ) -> std::result::Result<i64, CmsError> {
        let bearer = self.auth.bearer_token().await?;

        let bytes = tokio::fs::read(file_path).await.map_err(|e| {
            CmsError::UploadRejected {
                detail: json!({ "io": e.to_string(), "path": file_path.display().to_string() }),
            }
        })?;

        let file_name = file_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| desired_name.to_string());

        let form = reqwest::multipart::Form::new()
            .text("name", desired_name.to_string())
            .part("files[]", reqwest::multipart::Part::bytes(bytes).file_name(file_name));

        let response = self
            .http
            .post(format!("{}/api/library", self.base_url))
            .bearer_auth(&bearer)
            .multipart(form)
            .send()
            .await
            .map_err(|e| CmsError::UploadRejected {
                detail: json!({ "transport": e.to_string() }),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CmsError::UploadRejected {
                detail: json!({ "status": status.as_u16(), "body": body }),
            });
        }

        let body: Value = response.json().await.map_err(|e| CmsError::UploadRejected {
            detail: json!({ "parse": e.to_string() }),
        })?;

        // Per-file error reported inside a 200 response
        if body
            .pointer("/files/0/error")
            .is_some_and(|v| !v.is_null())
        {
            return Err(CmsError::UploadRejected { detail: body });
        }

        match extract_media_id(&body) {
            Some(media_id) => {
                tracing::info!(media_id, name = desired_name, "uploaded asset to CMS library");
                Ok(media_id)
            }
            None => Err(CmsError::MediaIdMissing { response: body }),
        }
    }

    async fn assign_to_playlist(
        &self,
        playlist_id: i64,
        media_id: i64,
        duration_secs: u32,
    ) -> std::result::Result<(), CmsError> {
        let bearer = self.auth.bearer_token().await?;

        let params = [
            ("media[]", media_id.to_string()),
            ("duration", duration_secs.to_string()),
            ("useDuration", "1".to_string()),
        ];

        let response = self
            .http
            .post(format!(
                "{}/api/playlist/library/assign/{playlist_id}",
                self.base_url
            ))
            .bearer_auth(&bearer)
            .form(&params)
            .send()
            .await
            .map_err(|e| CmsError::AssignmentFailed {
                status: None,
                body: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CmsError::AssignmentFailed {
                status: Some(status.as_u16()),
                body,
            });
        }

        tracing::info!(media_id, playlist_id, "assigned media to playlist");
        Ok(())
    }
}

/// Candidate locations for the media id in a library upload response,
/// tried in order; the first well-formed positive integer wins.
///
/// The CMS has moved the id between these shapes across versions, so all
/// observed locations are probed.
const MEDIA_ID_PATHS: &[&str] = &[
    "/mediaId",
    "/id",
    "/data/mediaId",
    "/data/id",
    "/files/0/mediaId",
    "/files/0/id",
    "/data/files/0/mediaId",
    "/data/files/0/id",
];

/// Probe the upload response for a media identifier.
pub fn extract_media_id(response: &Value) -> Option<i64> {
    MEDIA_ID_PATHS
        .iter()
        .find_map(|path| as_positive_id(response.pointer(path)?))
}

/// Accept integers and numeric strings; ids must be positive.
fn as_positive_id(value: &Value) -> Option<i64> {
    let n = match value {
        Value::Number(n) => n.as_i64()?,
        Value::String(s) => s.trim().parse::<i64>().ok()?,
        _ => return None,
    };
    (n > 0).then_some(n)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_top_level_media_id() {
        assert_eq!(extract_media_id(&json!({ "mediaId": 42 })), Some(42));
        assert_eq!(extract_media_id(&json!({ "id": 7 })), Some(7));
    }

    #[test]
    fn extracts_nested_shapes() {
        assert_eq!(
            extract_media_id(&json!({ "data": { "mediaId": 42 } })),
            Some(42)
        );
        assert_eq!(
            extract_media_id(&json!({ "files": [{ "mediaId": 42 }] })),
            Some(42)
        );
        assert_eq!(
            extract_media_id(&json!({ "data": { "files": [{ "id": 42 }] } })),
            Some(42)
        );
    }

    #[test]
    fn accepts_numeric_strings() {
        assert_eq!(extract_media_id(&json!({ "mediaId": "42" })), Some(42));
        assert_eq!(extract_media_id(&json!({ "mediaId": " 42 " })), Some(42));
    }

    #[test]
    fn rejects_non_positive_and_non_numeric_ids() {
        assert_eq!(extract_media_id(&json!({ "mediaId": 0 })), None);
        assert_eq!(extract_media_id(&json!({ "mediaId": -5 })), None);
        assert_eq!(extract_media_id(&json!({ "mediaId": "soon" })), None);
        assert_eq!(extract_media_id(&json!({ "mediaId": null })), None);
        assert_eq!(extract_media_id(&json!({})), None);
    }

    #[test]
    fn first_matching_strategy_wins() {
        let response = json!({
            "mediaId": 1,
            "id": 2,
            "data": { "mediaId": 3 },
        });
        assert_eq!(extract_media_id(&response), Some(1));

        // A malformed earlier candidate falls through to the next one
        let response = json!({
            "mediaId": "not-a-number",
            "id": 2,
        });
        assert_eq!(extract_media_id(&response), Some(2));
    }

    #[test]
    fn cached_token_honors_expiry_margin() {
        let now = Instant::now();
        let token = CachedToken::from_response(
            TokenResponse {
                access_token: "abc".to_string(),
                expires_in: 3600,
            },
            now,
        );
        assert!(token.is_valid(now));
        assert!(token.is_valid(now + Duration::from_secs(3600 - 11)));
        assert!(!token.is_valid(now + Duration::from_secs(3600 - 10)));
    }

    #[test]
    fn short_lived_token_expires_immediately() {
        // Advertised lifetime shorter than the safety margin
        let now = Instant::now();
        let token = CachedToken::from_response(
            TokenResponse {
                access_token: "abc".to_string(),
                expires_in: 5,
            },
            now,
        );
        assert!(!token.is_valid(now));
    }
}
