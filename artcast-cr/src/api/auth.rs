//! Login endpoint and session extraction
//!
//! Staff authenticate with their school code + password, administrators
//! with username + password. Both receive a signed bearer token; handlers
//! receive the verified `Principal` through the extractor below.
//!
//! Uses the custom extractor pattern rather than middleware, so handlers
//! declare their authentication requirement in their signature.

use axum::{
    async_trait,
    extract::{FromRequestParts, State},
    http::{header, request::Parts},
    routing::post,
    Json, Router,
};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use artcast_common::auth::{self, SESSION_TTL_SECS};
use artcast_common::types::{Principal, Role};
use artcast_common::Error;

use crate::db::{admins, tenants};
use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// Verified principal extracted from the `Authorization: Bearer` header
///
/// Rejection is 401: an absent, malformed, tampered or expired token all
/// read as "no session".
pub struct AuthPrincipal(pub Principal);

#[async_trait]
impl FromRequestParts<AppState> for AuthPrincipal {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "))
            .ok_or_else(|| Error::Unauthorized("missing bearer token".to_string()))?;

        let principal = auth::verify_token(&state.session_secret, token)
            .ok_or_else(|| Error::Unauthorized("invalid or expired session token".to_string()))?;

        Ok(AuthPrincipal(principal))
    }
}

/// POST /api/auth/login request
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(rename = "type")]
    pub kind: LoginKind,
    pub credentials: Credentials,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoginKind {
    Admin,
    Staff,
}

#[derive(Debug, Deserialize)]
pub struct Credentials {
    /// School code, for staff logins
    pub code: Option<String>,
    /// Username, for admin logins
    pub username: Option<String>,
    pub password: String,
}

/// POST /api/auth/login response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub role: Role,
    pub name: String,
    pub expires_at: DateTime<Utc>,
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let principal = match request.kind {
        LoginKind::Staff => {
            let code = request.credentials.code.as_deref().ok_or_else(|| {
                Error::InvalidInput("staff login requires a school code".to_string())
            })?;

            let tenant = tenants::find_by_code(&state.db, code).await?;
            let tenant = match tenant {
                Some(t) if auth::verify_password(&request.credentials.password, &t.password_hash) => t,
                _ => {
                    tracing::warn!(code, "failed staff login");
                    return Err(
                        Error::Unauthorized("invalid school code or password".to_string()).into(),
                    );
                }
            };

            Principal {
                principal_id: tenant.id,
                role: Role::Staff,
                tenant_id: Some(tenant.id),
                name: tenant.name,
            }
        }
        LoginKind::Admin => {
            let username = request.credentials.username.as_deref().ok_or_else(|| {
                Error::InvalidInput("admin login requires a username".to_string())
            })?;

            let admin = admins::find_by_username(&state.db, username).await?;
            let admin = match admin {
                Some(a) if auth::verify_password(&request.credentials.password, &a.password_hash) => a,
                _ => {
                    tracing::warn!(username, "failed admin login");
                    return Err(
                        Error::Unauthorized("invalid admin credentials".to_string()).into(),
                    );
                }
            };

            Principal {
                principal_id: admin.id,
                role: Role::Admin,
                tenant_id: None,
                name: "Administrator".to_string(),
            }
        }
    };

    let token = auth::issue_token(&state.session_secret, &principal, SESSION_TTL_SECS)?;
    let expires_at = Utc::now() + Duration::seconds(SESSION_TTL_SECS);

    tracing::info!(
        principal_id = %principal.principal_id,
        role = ?principal.role,
        "login succeeded"
    );

    Ok(Json(LoginResponse {
        token,
        role: principal.role,
        name: principal.name,
        expires_at,
    }))
}

pub fn auth_routes() -> Router<AppState> {
    Router::new().route("/api/auth/login", post(login))
}
