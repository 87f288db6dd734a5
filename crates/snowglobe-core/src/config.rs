//! Configuration loading and typed config structures for the Snow Globe
//! simulation.
//!
//! The canonical configuration lives in `snowglobe-config.yaml` at the
//! project root. This module defines strongly-typed structs that mirror the
//! YAML structure and a loader that reads the file. Every field has a
//! default, so an empty file is a valid configuration.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use snowglobe_agents::CharacterConfig;
use snowglobe_world::grid::DEFAULT_TILE_SIZE;
use snowglobe_world::plant::DEFAULT_FALLBACK_STAGE_SECONDS;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level simulation configuration.
///
/// Mirrors the structure of `snowglobe-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SimulationConfig {
    /// World size, seed and timing.
    #[serde(default)]
    pub world: WorldConfig,

    /// Plant growth settings.
    #[serde(default)]
    pub plants: PlantsConfig,

    /// Character tunables.
    #[serde(default)]
    pub character: CharacterConfig,

    /// Item catalog location.
    #[serde(default)]
    pub catalog: CatalogConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl SimulationConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yml::from_str(yaml)?)
    }
}

/// World-level configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WorldConfig {
    /// Human-readable simulation name.
    #[serde(default = "default_world_name")]
    pub name: String,

    /// Random seed for reproducibility.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Real-time milliseconds between ticks.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Simulated seconds per tick.
    #[serde(default = "default_tick_seconds")]
    pub tick_seconds: f32,

    /// Stop after this many ticks; 0 runs forever.
    #[serde(default = "default_max_ticks")]
    pub max_ticks: u64,

    /// Edge length of one grid cell in world units.
    #[serde(default = "default_tile_size")]
    pub tile_size: f32,

    /// Grid width in cells.
    #[serde(default = "default_width")]
    pub width: u32,

    /// Grid height in cells.
    #[serde(default = "default_height")]
    pub height: u32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            name: default_world_name(),
            seed: default_seed(),
            tick_interval_ms: default_tick_interval_ms(),
            tick_seconds: default_tick_seconds(),
            max_ticks: default_max_ticks(),
            tile_size: default_tile_size(),
            width: default_width(),
            height: default_height(),
        }
    }
}

/// Plant growth configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PlantsConfig {
    /// Stage duration in seconds for plants without a lifespan.
    #[serde(default = "default_fallback_stage_seconds")]
    pub fallback_stage_seconds: f32,
}

impl Default for PlantsConfig {
    fn default() -> Self {
        Self {
            fallback_stage_seconds: default_fallback_stage_seconds(),
        }
    }
}

/// Item catalog configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CatalogConfig {
    /// Directory holding one JSON file per item.
    #[serde(default = "default_catalog_directory")]
    pub directory: PathBuf,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            directory: default_catalog_directory(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (trace, debug, info, warn, error). `RUST_LOG` wins
    /// when set.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

fn default_world_name() -> String {
    String::from("Snow Globe")
}

const fn default_seed() -> u64 {
    42
}

const fn default_tick_interval_ms() -> u64 {
    100
}

const fn default_tick_seconds() -> f32 {
    1.0
}

const fn default_max_ticks() -> u64 {
    0
}

const fn default_tile_size() -> f32 {
    DEFAULT_TILE_SIZE
}

const fn default_width() -> u32 {
    32
}

const fn default_height() -> u32 {
    32
}

const fn default_fallback_stage_seconds() -> f32 {
    DEFAULT_FALLBACK_STAGE_SECONDS
}

fn default_catalog_directory() -> PathBuf {
    PathBuf::from("data/items")
}

fn default_log_level() -> String {
    String::from("info")
}
