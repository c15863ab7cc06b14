//! Configuration file loading.
//!
//! One TOML file holds the server credentials and the mirror rules:
//!
//! ```toml
//! [server]
//! url = "https://caldav.fastmail.com/dav/"
//! username = "user@example.com"
//! password = "app-password"
//!
//! dest_calendar = "Mirror"
//!
//! [retention]
//! keep_past_days = 30
//! scan_future_days = 90
//!
//! [[filter_sets]]
//! filters = { calendar_name = "Work" }
//! transformations = { set_event_name = "Busy", strip_location = true }
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use calmirror_core::config::MirrorConfig;
use serde::Deserialize;

/// CalDAV server endpoint and credentials.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub url: String,
    pub username: String,
    pub password: String,
}

/// The whole configuration file: server access plus the mirror rules.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    #[serde(flatten)]
    pub mirror: MirrorConfig,
}

impl AppConfig {
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Could not determine config directory")?
            .join("calmirror");

        Ok(config_dir.join("config.toml"))
    }

    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::default_path()?,
        };

        if !path.exists() {
            anyhow::bail!(
                "No configuration found at {}.\n\n\
                Create one with a [server] section, a dest_calendar,\n\
                and [[filter_sets]] rules.",
                path.display()
            );
        }

        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read configuration from {}", path.display()))?;

        let config: AppConfig = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse configuration at {}", path.display()))?;

        if config.mirror.dest_calendar.is_empty() {
            anyhow::bail!("Configuration needs a non-empty dest_calendar");
        }

        Ok(config)
    }
}
