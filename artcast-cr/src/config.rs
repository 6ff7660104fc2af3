//! artcast-cr configuration
//!
//! Values resolve in priority order: command-line argument, environment
//! variable, TOML config file, compiled default.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use artcast_common::{Error, Result};

/// Service configuration loaded from the TOML config file
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Port the HTTP server listens on
    #[serde(default = "default_port")]
    pub port: u16,
    /// Data root holding the database and uploaded images
    #[serde(default = "default_root_folder")]
    pub root_folder: PathBuf,
    /// External CMS connection settings
    pub cms: CmsConfig,
    /// Optional administrator account created at startup if absent
    pub admin: Option<AdminBootstrap>,
}

/// External CMS connection settings
#[derive(Debug, Clone, Deserialize)]
pub struct CmsConfig {
    /// Base URL of the CMS, e.g. `http://cms.example.com`
    pub base_url: String,
    pub client_id: String,
    pub client_secret: String,
    /// Playlist that receives published submissions
    pub playlist_id: i64,
    /// Seconds each published image is displayed
    #[serde(default = "default_display_duration")]
    pub display_duration_secs: u32,
    /// Timeout applied to every CMS request
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

/// Initial administrator credentials
#[derive(Debug, Clone, Deserialize)]
pub struct AdminBootstrap {
    pub username: String,
    pub password: String,
}

/// Fixed publishing destination derived from [`CmsConfig`]
#[derive(Debug, Clone)]
pub struct PublishTarget {
    pub playlist_id: i64,
    pub display_duration_secs: u32,
}

fn default_port() -> u16 {
    5780
}

fn default_root_folder() -> PathBuf {
    PathBuf::from("./artcast_data")
}

fn default_display_duration() -> u32 {
    10
}

fn default_request_timeout() -> u64 {
    30
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("cannot read config file {}: {e}", path.display()))
        })?;
        toml::from_str(&raw)
            .map_err(|e| Error::Config(format!("invalid config file {}: {e}", path.display())))
    }

    /// Apply command-line overrides (highest priority).
    pub fn apply_overrides(&mut self, port: Option<u16>, root_folder: Option<PathBuf>) {
        if let Some(port) = port {
            self.port = port;
        }
        if let Some(root_folder) = root_folder {
            self.root_folder = root_folder;
        }
    }

    /// Apply environment overrides for the CMS section.
    ///
    /// Credentials are commonly injected through the environment rather
    /// than written into the config file.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("ARTCAST_CMS_BASE_URL") {
            self.cms.base_url = v;
        }
        if let Ok(v) = std::env::var("ARTCAST_CMS_CLIENT_ID") {
            self.cms.client_id = v;
        }
        if let Ok(v) = std::env::var("ARTCAST_CMS_CLIENT_SECRET") {
            self.cms.client_secret = v;
        }
        if let Ok(v) = std::env::var("ARTCAST_CMS_PLAYLIST_ID") {
            if let Ok(id) = v.parse() {
                self.cms.playlist_id = id;
            } else {
                tracing::warn!(value = %v, "ignoring non-numeric ARTCAST_CMS_PLAYLIST_ID");
            }
        }
    }
}

impl CmsConfig {
    pub fn publish_target(&self) -> PublishTarget {
        PublishTarget {
            playlist_id: self.playlist_id,
            display_duration_secs: self.display_duration_secs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
        [cms]
        base_url = "http://cms.example.com"
        client_id = "artcast"
        client_secret = "s3cret"
        playlist_id = 7
    "#;

    #[test]
    fn minimal_config_gets_defaults() {
        let config: Config = toml::from_str(MINIMAL).unwrap();
        assert_eq!(config.port, 5780);
        assert_eq!(config.root_folder, PathBuf::from("./artcast_data"));
        assert_eq!(config.cms.display_duration_secs, 10);
        assert_eq!(config.cms.request_timeout_secs, 30);
        assert!(config.admin.is_none());
    }

    #[test]
    fn missing_cms_section_is_an_error() {
        assert!(toml::from_str::<Config>("port = 8080").is_err());
    }

    #[test]
    fn cli_overrides_win() {
        let mut config: Config = toml::from_str(MINIMAL).unwrap();
        config.apply_overrides(Some(9999), Some(PathBuf::from("/srv/artcast")));
        assert_eq!(config.port, 9999);
        assert_eq!(config.root_folder, PathBuf::from("/srv/artcast"));
    }

    #[test]
    fn publish_target_mirrors_cms_settings() {
        let config: Config = toml::from_str(MINIMAL).unwrap();
        let target = config.cms.publish_target();
        assert_eq!(target.playlist_id, 7);
        assert_eq!(target.display_duration_secs, 10);
    }
}
