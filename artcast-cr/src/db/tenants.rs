//! Tenant (school) store

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use artcast_common::auth;
use artcast_common::types::Tenant;
use artcast_common::{Error, Result};

/// Create a tenant with a freshly hashed password
pub async fn create(pool: &SqlitePool, code: &str, name: &str, password: &str) -> Result<Tenant> {
    let tenant = Tenant {
        id: Uuid::new_v4(),
        code: code.to_string(),
        name: name.to_string(),
        password_hash: auth::hash_password(password),
        created_at: Utc::now(),
    };

    sqlx::query(
        "INSERT INTO tenants (id, code, name, password_hash, created_at) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(tenant.id.to_string())
    .bind(&tenant.code)
    .bind(&tenant.name)
    .bind(&tenant.password_hash)
    .bind(tenant.created_at.to_rfc3339())
    .execute(pool)
    .await?;

    tracing::info!(code = %tenant.code, name = %tenant.name, "tenant created");
    Ok(tenant)
}

/// Look up a tenant by its login code
pub async fn find_by_code(pool: &SqlitePool, code: &str) -> Result<Option<Tenant>> {
    let row = sqlx::query(
        "SELECT id, code, name, password_hash, created_at FROM tenants WHERE code = ?",
    )
    .bind(code)
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(row_to_tenant).transpose()
}

pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Tenant>> {
    let row = sqlx::query(
        "SELECT id, code, name, password_hash, created_at FROM tenants WHERE id = ?",
    )
    .bind(id.to_string())
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(row_to_tenant).transpose()
}

fn row_to_tenant(row: &SqliteRow) -> Result<Tenant> {
    let id: String = row.get("id");
    let id = Uuid::parse_str(&id)
        .map_err(|e| Error::Internal(format!("invalid tenant id in database: {e}")))?;

    let created_at: String = row.get("created_at");
    let created_at = DateTime::parse_from_rfc3339(&created_at)
        .map_err(|e| Error::Internal(format!("invalid created_at in database: {e}")))?
        .with_timezone(&Utc);

    Ok(Tenant {
        id,
        code: row.get("code"),
        name: row.get("name"),
        password_hash: row.get("password_hash"),
        created_at,
    })
}
