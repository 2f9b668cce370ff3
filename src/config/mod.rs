//! # Configuration Management Module
//!
//! TOML configuration for the engine timers, logging, level presets and save
//! locations.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use parkchase::config::Config;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     // Load configuration from file
//!     let config = Config::load("config.toml").await?;
//!     println!("Guards move every {}ms", config.engine.guard_interval_ms);
//!
//!     // Create default configuration
//!     Config::create_default("config.toml").await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Configuration File Format
//!
//! ```toml
//! [engine]
//! guard_interval_ms = 600
//! clock_interval_ms = 1000
//!
//! [logging]
//! level = "info"
//! file = "parkchase.log"
//!
//! [storage]
//! save_dir = "./saves"
//! default_save = "quicksave.txt"
//!
//! [levels]
//! easy = "levels/easy.txt"
//! medium = "levels/medium.txt"
//! hard = "levels/hard.txt"
//! ```

use anyhow::{anyhow, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;
use tokio::fs;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    /// Difficulty name -> board file.
    #[serde(default = "default_levels")]
    pub levels: BTreeMap<String, String>,
}

/// Tick periods for the two simulation timers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Guard movement period. Expected to stay within 300-600ms.
    #[serde(default = "default_guard_interval_ms")]
    pub guard_interval_ms: u64,
    /// Game clock period (one elapsed second per tick).
    #[serde(default = "default_clock_interval_ms")]
    pub clock_interval_ms: u64,
}

fn default_guard_interval_ms() -> u64 {
    600
}

fn default_clock_interval_ms() -> u64 {
    1000
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            guard_interval_ms: default_guard_interval_ms(),
            clock_interval_ms: default_clock_interval_ms(),
        }
    }
}

impl EngineConfig {
    pub fn guard_interval(&self) -> Duration {
        Duration::from_millis(self.guard_interval_ms)
    }

    pub fn clock_interval(&self) -> Duration {
        Duration::from_millis(self.clock_interval_ms)
    }

    /// Reject zero intervals; warn on guard periods outside the usual range.
    pub fn validate(&self) -> Result<()> {
        if self.guard_interval_ms == 0 {
            return Err(anyhow!("engine.guard_interval_ms must be greater than 0"));
        }
        if self.clock_interval_ms == 0 {
            return Err(anyhow!("engine.clock_interval_ms must be greater than 0"));
        }
        if !(300..=600).contains(&self.guard_interval_ms) {
            warn!(
                "engine.guard_interval_ms = {} is outside the usual 300-600ms range",
                self.guard_interval_ms
            );
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    #[serde(default)]
    pub file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

impl LoggingConfig {
    /// Parsed level; unknown names fall back to `Info`.
    pub fn level_filter(&self) -> log::LevelFilter {
        self.level.parse().unwrap_or(log::LevelFilter::Info)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub save_dir: String,
    #[serde(default = "default_save_name")]
    pub default_save: String,
}

fn default_save_name() -> String {
    "quicksave.txt".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            save_dir: "./saves".to_string(),
            default_save: default_save_name(),
        }
    }
}

impl StorageConfig {
    /// Resolve a save name against `save_dir`; absolute paths pass through.
    pub fn save_path(&self, name: Option<&str>) -> PathBuf {
        let name = name.unwrap_or(&self.default_save);
        let candidate = PathBuf::from(name);
        if candidate.is_absolute() {
            candidate
        } else {
            PathBuf::from(&self.save_dir).join(candidate)
        }
    }
}

fn default_levels() -> BTreeMap<String, String> {
    ["easy", "medium", "hard"]
        .into_iter()
        .map(|name| (name.to_string(), format!("levels/{name}.txt")))
        .collect()
}

impl Config {
    /// Load configuration from a file
    pub async fn load(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| anyhow!("Failed to read config file {}: {}", path, e))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| anyhow!("Failed to parse config file {}: {}", path, e))?;

        config.engine.validate()?;
        Ok(config)
    }

    /// Create a default configuration file
    pub async fn create_default(path: &str) -> Result<()> {
        let config = Config::default();
        let content = toml::to_string_pretty(&config)
            .map_err(|e| anyhow!("Failed to serialize default config: {}", e))?;

        fs::write(path, content)
            .await
            .map_err(|e| anyhow!("Failed to write config file {}: {}", path, e))?;

        Ok(())
    }

    /// Board file for a difficulty name (case-insensitive).
    pub fn level_path(&self, name: &str) -> Option<PathBuf> {
        self.levels
            .get(&name.to_lowercase())
            .map(PathBuf::from)
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            engine: EngineConfig::default(),
            logging: LoggingConfig::default(),
            storage: StorageConfig::default(),
            levels: default_levels(),
        }
    }
}
