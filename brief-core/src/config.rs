use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::model::Coordinate;

/// Uptown Charlotte.
pub const CHARLOTTE: Coordinate = Coordinate { latitude: 35.2271, longitude: -80.8431 };

/// IANA timezone used for daily forecast boundaries.
pub const TIMEZONE: &str = "America/New_York";

/// Environment variable holding the NewsAPI key.
pub const NEWS_API_KEY_ENV: &str = "NEWS_API_KEY";

/// Country code for the headline feed.
pub const NEWS_COUNTRY: &str = "us";

/// Number of headlines shown on the dashboard.
pub const NEWS_LIMIT: usize = 10;

/// Default location of the list files, relative to the working directory.
pub const DEFAULT_DATA_DIR: &str = "data";

/// Settings stored on disk.
///
/// Example TOML:
/// ```toml
/// news_api_key = "..."
/// data_dir = "/home/me/brief-data"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    /// Fallback NewsAPI key, used when `NEWS_API_KEY` is not set.
    pub news_api_key: Option<String>,

    /// Directory for the grocery and todo files.
    pub data_dir: Option<PathBuf>,
}

impl Config {
    /// Load config from `path`, or return an empty default if it doesn't exist yet.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "charlotte-brief", "brief")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Store the news key, replacing any previous one. Blank input clears it.
    pub fn set_news_api_key(&mut self, api_key: &str) {
        let trimmed = api_key.trim();
        self.news_api_key = (!trimmed.is_empty()).then(|| trimmed.to_string());
    }

    /// Effective NewsAPI key: the environment wins over the config file.
    pub fn news_api_key(&self) -> Option<String> {
        resolve_credential(std::env::var(NEWS_API_KEY_ENV).ok(), self.news_api_key.as_deref())
    }

    pub fn data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR))
    }
}

/// Pick the first non-blank credential, preferring `from_env`.
pub fn resolve_credential(from_env: Option<String>, from_file: Option<&str>) -> Option<String> {
    from_env
        .as_deref()
        .into_iter()
        .chain(from_file)
        .map(str::trim)
        .find(|key| !key.is_empty())
        .map(str::to_string)
}
