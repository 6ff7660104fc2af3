//! Local asset storage
//!
//! Uploaded images live under `<root>/uploads`. Stored paths are relative
//! to the data root so the root can move without rewriting rows.

use std::path::{Component, Path, PathBuf};

use chrono::Utc;

use artcast_common::{Error, Result};

#[derive(Debug, Clone)]
pub struct AssetStore {
    root: PathBuf,
}

impl AssetStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolve a stored relative path to a readable local file.
    ///
    /// Fails with `AssetMissing` when the file is not on disk, which
    /// callers keep distinct from CMS-side publish failures.
    pub fn resolve(&self, stored: &str) -> Result<PathBuf> {
        let relative = Path::new(stored.trim_start_matches('/'));
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
        {
            return Err(Error::InvalidInput(format!(
                "asset path escapes the data root: {stored}"
            )));
        }

        let path = self.root.join(relative);
        if !path.is_file() {
            return Err(Error::AssetMissing(format!(
                "no local file at {}",
                path.display()
            )));
        }
        Ok(path)
    }

    /// Store uploaded bytes under a timestamped, sanitized filename.
    ///
    /// Returns the relative path to persist on the submission.
    pub async fn save(&self, original_name: &str, bytes: &[u8]) -> Result<String> {
        let dir = self.root.join("uploads");
        tokio::fs::create_dir_all(&dir).await?;

        let filename = format!(
            "{}_{}",
            Utc::now().timestamp_millis(),
            sanitize_filename(original_name)
        );
        tokio::fs::write(dir.join(&filename), bytes).await?;

        Ok(format!("uploads/{filename}"))
    }
}

/// Keep the last path segment and replace anything outside
/// `[A-Za-z0-9._-]` with underscores.
fn sanitize_filename(name: &str) -> String {
    let name = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();

    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_strips_directories_and_odd_characters() {
        assert_eq!(sanitize_filename("sunflower.png"), "sunflower.png");
        assert_eq!(sanitize_filename("my picture.png"), "my_picture.png");
        assert_eq!(sanitize_filename("/tmp/evil.png"), "evil.png");
        assert_eq!(sanitize_filename("C:\\x\\evil.png"), "evil.png");
        assert_eq!(sanitize_filename(""), "upload");
    }

    #[test]
    fn resolve_rejects_parent_traversal() {
        let store = AssetStore::new("/tmp/artcast-test-root");
        let err = store.resolve("uploads/../../etc/passwd").unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn resolve_missing_file_is_asset_missing() {
        let store = AssetStore::new("/tmp/artcast-test-root");
        let err = store.resolve("uploads/nope.png").unwrap_err();
        assert!(matches!(err, Error::AssetMissing(_)));
    }

    #[tokio::test]
    async fn save_then_resolve_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = AssetStore::new(dir.path());

        let stored = store.save("kid art.png", b"png-bytes").await.unwrap();
        assert!(stored.starts_with("uploads/"));
        assert!(stored.ends_with("kid_art.png"));

        let path = store.resolve(&stored).unwrap();
        assert_eq!(std::fs::read(path).unwrap(), b"png-bytes");

        // A leading slash is tolerated, mirroring how paths were stored
        // by earlier versions of the uploader.
        assert!(store.resolve(&format!("/{stored}")).is_ok());
    }
}
