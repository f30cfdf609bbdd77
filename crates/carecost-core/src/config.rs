//! Process configuration loaded from `carecost.toml`
//!
//! Every section has defaults, so an absent file yields a working setup
//! (local data directory, in-process cache only).

use crate::error::CoreError;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default config file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "carecost.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CareCostConfig {
    pub data: DataConfig,
    pub cache: CacheConfig,
    pub query: QueryConfig,
    pub server: ServerConfig,
}

/// Where data files are discovered
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Primary data directory
    pub dir: PathBuf,
    /// Tried in order when the primary directory is unavailable
    pub fallback_dirs: Vec<PathBuf>,
    /// Accepted file extensions (without dot)
    pub extensions: Vec<String>,
}

impl Default for DataConfig {
    fn default() -> Self {
        let mut fallback_dirs = vec![PathBuf::from("data"), PathBuf::from("./static/data")];
        if let Some(user_data) = dirs::data_dir() {
            fallback_dirs.push(user_data.join("carecost"));
        }

        Self {
            dir: PathBuf::from("static/data"),
            fallback_dirs,
            extensions: vec!["csv".to_string()],
        }
    }
}

impl DataConfig {
    /// Primary directory followed by fallbacks, duplicates removed
    pub fn search_dirs(&self) -> Vec<PathBuf> {
        let mut dirs = vec![self.dir.clone()];
        for dir in &self.fallback_dirs {
            if !dirs.contains(dir) {
                dirs.push(dir.clone());
            }
        }
        dirs
    }
}

/// Tiered cache settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Shared primary tier; `None` runs with the in-process tier only
    pub redis_url: Option<String>,
    /// Bound on every primary-tier network call
    pub primary_timeout_ms: u64,
    pub default_ttl_secs: u64,
    /// Entry bound for the in-process tier
    pub max_entries: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            redis_url: None,
            primary_timeout_ms: 250,
            default_ttl_secs: 3600,
            max_entries: 10_000,
        }
    }
}

impl CacheConfig {
    pub fn primary_timeout(&self) -> Duration {
        Duration::from_millis(self.primary_timeout_ms)
    }

    pub fn default_ttl(&self) -> Duration {
        Duration::from_secs(self.default_ttl_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    /// Approximate zip-code delta per mile of requested radius
    pub zip_delta_per_mile: f64,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            zip_delta_per_mile: 0.2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
        }
    }
}

impl CareCostConfig {
    /// Load from an explicit path, else `carecost.toml` if present, else defaults.
    ///
    /// An explicitly named file must exist and parse; the implicit default
    /// file is optional.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => {
                let path = Path::new(DEFAULT_CONFIG_FILE);
                if path.exists() {
                    Self::from_file(path)
                } else {
                    tracing::debug!("No {} found, using defaults", DEFAULT_CONFIG_FILE);
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        config.validate()?;
        tracing::info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let invalid = |message: &str| -> Result<()> {
            Err(CoreError::InvalidConfig {
                message: message.to_string(),
            }
            .into())
        };

        if self.cache.max_entries == 0 {
            return invalid("cache.max_entries must be greater than zero");
        }
        if self.cache.primary_timeout_ms == 0 {
            return invalid("cache.primary_timeout_ms must be greater than zero");
        }
        if !(self.query.zip_delta_per_mile.is_finite() && self.query.zip_delta_per_mile > 0.0) {
            return invalid("query.zip_delta_per_mile must be a positive number");
        }
        if self.data.extensions.is_empty() {
            return invalid("data.extensions must list at least one extension");
        }
        Ok(())
    }
}
