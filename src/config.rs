use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::Result;
use crate::schedule::proportional::DEFAULT_FULL_COVER_RATIO;
use crate::schedule::ShiftBlockCatalog;

/// Environment variable pointing at a TOML configuration file
pub const CONFIG_PATH_ENV: &str = "SHIFT_PLANNER_CONFIG";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Directory where each schedule's submitted availability is appended as CSV
    pub archive_dir: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            archive_dir: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AllocationConfig {
    /// Share of a block that counts as full cover (0.0-1.0)
    pub full_cover_ratio: f64,
    /// Fixed tie-break seed; random per run when unset
    pub seed: Option<u64>,
    /// Width of the legacy allocator's time slots
    pub legacy_slot_minutes: u32,
}

impl Default for AllocationConfig {
    fn default() -> Self {
        Self {
            full_cover_ratio: DEFAULT_FULL_COVER_RATIO,
            seed: None,
            legacy_slot_minutes: 30,
        }
    }
}

/// Planner configuration, all sections optional
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    pub server: ServerConfig,
    pub allocation: AllocationConfig,
    /// Replaces the standard shift blocks when present
    pub catalog: Option<ShiftBlockCatalog>,
}

impl PlannerConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_toml_str(&text)?;
        info!(path = %path.as_ref().display(), "loaded configuration");
        Ok(config)
    }

    /// File named by `SHIFT_PLANNER_CONFIG` if set, then `PORT` override
    pub fn from_env() -> Result<Self> {
        let mut config = match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) => Self::load(path)?,
            Err(_) => Self::default(),
        };
        if let Some(port) = std::env::var("PORT").ok().and_then(|p| p.parse::<u16>().ok()) {
            config.server.port = port;
        }
        Ok(config)
    }

    pub fn catalog(&self) -> ShiftBlockCatalog {
        self.catalog.clone().unwrap_or_default()
    }
}
