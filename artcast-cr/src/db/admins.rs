//! Administrator account store

use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use artcast_common::auth;
use artcast_common::{Error, Result};

/// Administrator account (global scope, no tenant)
#[derive(Debug, Clone)]
pub struct Admin {
    pub id: Uuid,
    pub username: String,
    pub password_hash: String,
}

pub async fn find_by_username(pool: &SqlitePool, username: &str) -> Result<Option<Admin>> {
    let row = sqlx::query("SELECT id, username, password_hash FROM admins WHERE username = ?")
        .bind(username)
        .fetch_optional(pool)
        .await?;

    match row {
        Some(row) => {
            let id: String = row.get("id");
            let id = Uuid::parse_str(&id)
                .map_err(|e| Error::Internal(format!("invalid admin id in database: {e}")))?;
            Ok(Some(Admin {
                id,
                username: row.get("username"),
                password_hash: row.get("password_hash"),
            }))
        }
        None => Ok(None),
    }
}

/// Create the administrator account if it doesn't exist yet
///
/// Idempotent: an existing account is left untouched, including its
/// password.
pub async fn ensure_admin(pool: &SqlitePool, username: &str, password: &str) -> Result<()> {
    if find_by_username(pool, username).await?.is_some() {
        return Ok(());
    }

    sqlx::query("INSERT INTO admins (id, username, password_hash) VALUES (?, ?, ?)")
        .bind(Uuid::new_v4().to_string())
        .bind(username)
        .bind(auth::hash_password(password))
        .execute(pool)
        .await?;

    tracing::info!(username, "administrator account created");
    Ok(())
}
