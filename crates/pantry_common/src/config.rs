//! Pantry configuration
//!
//! Lookup order: explicit path, `$PANTRY_CONFIG`, then
//! `<config dir>/pantry/config.toml`. Missing files yield defaults;
//! a file that exists but does not parse is an error.

use crate::error::{PantryError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const CONFIG_ENV: &str = "PANTRY_CONFIG";
const CONFIG_DIR: &str = "pantry";
const CONFIG_FILE: &str = "config.toml";

/// Server connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout (seconds, valid: 1-300)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_base_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_user_agent() -> String {
    format!("pantry/{}", env!("CARGO_PKG_VERSION"))
}

impl ServerSettings {
    pub fn effective_timeout(&self) -> u64 {
        self.timeout_secs.clamp(1, 300)
    }

    /// Base URL without a trailing slash
    pub fn normalized_base_url(&self) -> String {
        self.base_url.trim().trim_end_matches('/').to_string()
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

/// Inventory behaviour
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventorySettings {
    /// Location used when none is given or the given one is unknown
    #[serde(default = "default_location")]
    pub default_location: String,

    /// Days before expiry that count as "soon"
    #[serde(default = "default_soon_days")]
    pub soon_days: i64,
}

fn default_location() -> String {
    "Other".to_string()
}

fn default_soon_days() -> i64 {
    2
}

impl Default for InventorySettings {
    fn default() -> Self {
        Self {
            default_location: default_location(),
            soon_days: default_soon_days(),
        }
    }
}

/// Photo upload settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhotoSettings {
    /// Longest edge for location photos
    #[serde(default = "default_max_edge")]
    pub max_edge_px: u32,

    /// Longest edge for item previews
    #[serde(default = "default_preview_edge")]
    pub preview_edge_px: u32,

    /// JPEG quality (valid: 0.1-1.0)
    #[serde(default = "default_quality")]
    pub quality: f32,

    /// Files per upload batch
    #[serde(default = "default_max_batch")]
    pub max_batch: usize,
}

/// Smallest longest-edge a resize may target
pub const MIN_EDGE_PX: u32 = 100;

fn default_max_edge() -> u32 {
    800
}

fn default_preview_edge() -> u32 {
    600
}

fn default_quality() -> f32 {
    0.7
}

fn default_max_batch() -> usize {
    2
}

impl PhotoSettings {
    pub fn effective_quality(&self) -> f32 {
        self.quality.clamp(0.1, 1.0)
    }

    pub fn effective_max_edge(&self) -> u32 {
        self.max_edge_px.max(MIN_EDGE_PX)
    }

    pub fn effective_preview_edge(&self) -> u32 {
        self.preview_edge_px.max(MIN_EDGE_PX)
    }

    pub fn effective_max_batch(&self) -> usize {
        self.max_batch.max(1)
    }
}

impl Default for PhotoSettings {
    fn default() -> Self {
        Self {
            max_edge_px: default_max_edge(),
            preview_edge_px: default_preview_edge(),
            quality: default_quality(),
            max_batch: default_max_batch(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PantryConfig {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub inventory: InventorySettings,
    #[serde(default)]
    pub photos: PhotoSettings,
    #[serde(default)]
    pub log: LogSettings,
}

impl PantryConfig {
    /// Resolve the config file and load it
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match config_path(explicit) {
            Some(path) if path.exists() => Self::load_from(&path),
            Some(path) if explicit.is_some() => Err(PantryError::Config(format!(
                "config file not found: {}",
                path.display()
            ))),
            _ => {
                debug!("No config file, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| PantryError::Config(format!("{}: {}", path.display(), e)))?;
        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Apply a `--server` override
    pub fn with_server(mut self, base_url: Option<&str>) -> Self {
        if let Some(url) = base_url {
            self.server.base_url = url.to_string();
        }
        self
    }
}

/// First candidate path in lookup order; may not exist
pub fn config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    if let Ok(path) = std::env::var(CONFIG_ENV) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILE))
}
