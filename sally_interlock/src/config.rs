//! Interlock configuration loading and validation.
//!
//! `sally.toml` carries the `[shared]`, `[timing]` and `[io]` tables plus an
//! optional driver table (`[simulation]`) handed to the driver factory
//! untouched. `[io] config_path` names the `io.toml` to bind roles from; a
//! relative path is resolved against the directory of `sally.toml`.

use std::path::{Path, PathBuf};

use sally_common::config::{ConfigError, ConfigLoader, SharedConfig};
use sally_common::consts::{
    DEFAULT_CLOSE_TIMEOUT_TICKS, DEFAULT_OPEN_TIMEOUT_TICKS, DEFAULT_STATUS_PERIOD_MS,
    DEFAULT_TICK_PERIOD_MS,
};
use sally_common::io::config::IoConfig;
use sally_common::io::registry::IoRegistry;
use serde::Deserialize;
use tracing::info;

use crate::sequence::Timeouts;

/// Upper bound for the tick period [ms].
pub const MAX_TICK_PERIOD_MS: u32 = 10_000;

/// `[timing]` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TimingConfig {
    /// Controller tick period [ms].
    pub tick_period_ms: u32,
    /// Open confirmation budget [ticks].
    pub open_timeout_ticks: u32,
    /// Reclose budget [ticks].
    pub close_timeout_ticks: u32,
    /// Status task render period [ms].
    pub status_period_ms: u32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            tick_period_ms: DEFAULT_TICK_PERIOD_MS,
            open_timeout_ticks: DEFAULT_OPEN_TIMEOUT_TICKS,
            close_timeout_ticks: DEFAULT_CLOSE_TIMEOUT_TICKS,
            status_period_ms: DEFAULT_STATUS_PERIOD_MS,
        }
    }
}

impl TimingConfig {
    pub fn validate(&self) -> Result<(), String> {
        if !(1..=MAX_TICK_PERIOD_MS).contains(&self.tick_period_ms) {
            return Err(format!(
                "tick_period_ms must be in 1..={MAX_TICK_PERIOD_MS}, got {}",
                self.tick_period_ms
            ));
        }
        if self.open_timeout_ticks == 0 {
            return Err("open_timeout_ticks must be >= 1".to_string());
        }
        if self.close_timeout_ticks < self.open_timeout_ticks {
            return Err(format!(
                "close_timeout_ticks ({}) must be >= open_timeout_ticks ({})",
                self.close_timeout_ticks, self.open_timeout_ticks
            ));
        }
        if self.status_period_ms < self.tick_period_ms {
            return Err(format!(
                "status_period_ms ({}) must be >= tick_period_ms ({})",
                self.status_period_ms, self.tick_period_ms
            ));
        }
        Ok(())
    }

    pub const fn timeouts(&self) -> Timeouts {
        Timeouts {
            open_ticks: self.open_timeout_ticks,
            close_ticks: self.close_timeout_ticks,
        }
    }

    /// Tick period [ns].
    pub const fn tick_period_ns(&self) -> i64 {
        self.tick_period_ms as i64 * 1_000_000
    }
}

/// `[io]` table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IoSection {
    /// Path of `io.toml`.
    pub config_path: PathBuf,
    /// Driver name in the driver registry.
    #[serde(default = "default_driver")]
    pub driver: String,
}

fn default_driver() -> String {
    "simulation".to_string()
}

/// Complete `sally.toml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InterlockConfig {
    pub shared: SharedConfig,
    #[serde(default)]
    pub timing: TimingConfig,
    pub io: IoSection,
    /// Settings of the simulation driver, passed through as a raw table.
    #[serde(default)]
    pub simulation: toml::Table,
}

impl InterlockConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.shared.validate()?;
        self.timing
            .validate()
            .map_err(ConfigError::ValidationError)?;
        if self.io.driver.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "io.driver cannot be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Driver-specific table for the configured driver.
    pub fn driver_settings(&self) -> toml::Table {
        match self.io.driver.as_str() {
            "simulation" => self.simulation.clone(),
            _ => toml::Table::new(),
        }
    }
}

/// Validated configuration with the role registry built.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: InterlockConfig,
    pub registry: IoRegistry,
}

/// Load `sally.toml` and the `io.toml` it points to.
pub fn load_config(path: &Path) -> Result<LoadedConfig, ConfigError> {
    let config = InterlockConfig::load(path)?;
    config.validate()?;

    let io_path = resolve_io_path(path, &config.io.config_path);
    let io_toml = std::fs::read_to_string(&io_path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            ConfigError::FileNotFound(io_path.clone())
        } else {
            ConfigError::Unreadable {
                path: io_path.clone(),
                reason: e.to_string(),
            }
        }
    })?;
    info!("I/O map: {}", io_path.display());

    let registry = build_registry(&io_toml)?;
    Ok(LoadedConfig { config, registry })
}

/// Build a [`LoadedConfig`] from in-memory documents.
pub fn load_config_from_strings(sally_toml: &str, io_toml: &str) -> Result<LoadedConfig, ConfigError> {
    let config = InterlockConfig::from_toml_str(sally_toml)?;
    config.validate()?;
    let registry = build_registry(io_toml)?;
    Ok(LoadedConfig { config, registry })
}

fn build_registry(io_toml: &str) -> Result<IoRegistry, ConfigError> {
    let io_config = IoConfig::from_toml(io_toml)
        .map_err(|e| ConfigError::ParseError(format!("I/O config: {e}")))?;
    let registry = IoRegistry::from_config(&io_config)
        .map_err(|e| ConfigError::ValidationError(format!("I/O config: {e}")))?;
    registry.validate_required_roles().map_err(|errors| {
        let list: Vec<String> = errors.iter().map(ToString::to_string).collect();
        ConfigError::ValidationError(format!("I/O config: {}", list.join("; ")))
    })?;
    Ok(registry)
}

fn resolve_io_path(config_path: &Path, io_path: &Path) -> PathBuf {
    if io_path.is_absolute() {
        return io_path.to_path_buf();
    }
    match config_path.parent() {
        Some(dir) => dir.join(io_path),
        None => io_path.to_path_buf(),
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
