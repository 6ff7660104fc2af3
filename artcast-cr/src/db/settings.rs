//! Settings database access (key-value store)

use sqlx::SqlitePool;

use artcast_common::{auth, Result};

pub async fn get_setting(pool: &SqlitePool, key: &str) -> Result<Option<String>> {
    let value: Option<(String,)> =
        sqlx::query_as("SELECT value FROM settings WHERE key = ?")
            .bind(key)
            .fetch_optional(pool)
            .await?;

    Ok(value.map(|(v,)| v))
}

pub async fn set_setting(pool: &SqlitePool, key: &str, value: &str) -> Result<()> {
    sqlx::query("INSERT OR REPLACE INTO settings (key, value) VALUES (?, ?)")
        .bind(key)
        .bind(value)
        .execute(pool)
        .await?;

    Ok(())
}

/// Load the session-token signing secret, generating and persisting one on
/// first run so sessions survive restarts.
pub async fn load_session_secret(pool: &SqlitePool) -> Result<String> {
    match get_setting(pool, "session_secret").await? {
        Some(secret) => Ok(secret),
        None => {
            let secret = auth::generate_secret();
            set_setting(pool, "session_secret", &secret).await?;
            tracing::info!("generated new session signing secret");
            Ok(secret)
        }
    }
}
