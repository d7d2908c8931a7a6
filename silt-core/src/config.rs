//! Physics configuration.
//!
//! Loaded from a json5 file. A commented default file is written the first
//! time the server starts.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

const DEFAULT_CONFIG: &str = include_str!("../../package-content/silt_config.json5");

/// Highest number of physics worker threads.
pub const MAX_THREADS: usize = 20;

/// Errors produced while loading the configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Reading or writing the config file failed.
    #[error("failed to access config file {path}: {source}")]
    Io {
        /// The file being accessed.
        path: PathBuf,
        /// The underlying error.
        source: io::Error,
    },
    /// The file is not valid json5 or has the wrong shape.
    #[error("failed to parse config file: {0}")]
    Parse(#[from] serde_json5::Error),
    /// A value is out of range.
    #[error("invalid config: {0}")]
    Invalid(&'static str),
}

/// Limits applied to a single worker tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickLimits {
    /// Dequeue attempts per tick.
    pub budget: u32,
    /// Consecutive contended pops before the worker sleeps briefly.
    pub retry_sleep_after: u32,
    /// Consecutive contended pops before the worker gives up on the tick.
    pub abandon_after: u32,
}

impl Default for TickLimits {
    fn default() -> Self {
        PhysicsConfig::default().tick_limits()
    }
}

/// Settings of the physics engine.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Number of worker threads, `0..=20`.
    pub threads: usize,
    /// Milliseconds between worker wake-ups.
    pub tick_interval_ms: u64,
    /// Dequeue attempts per worker tick.
    pub tick_budget: u32,
    /// Consecutive contended pops before a brief sleep.
    pub retry_sleep_after: u32,
    /// Consecutive contended pops before the rest of the tick is skipped.
    pub abandon_after: u32,
    /// Expiry given to actions parsed from text. `-1` never expires.
    pub default_expire: i32,
}

impl PhysicsConfig {
    /// Checks that every value is in range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.threads > MAX_THREADS {
            return Err(ConfigError::Invalid("threads must be in range 0..=20"));
        }
        if self.tick_interval_ms == 0 {
            return Err(ConfigError::Invalid("tick_interval_ms must be at least 1"));
        }
        if self.tick_budget == 0 {
            return Err(ConfigError::Invalid("tick_budget must be at least 1"));
        }
        if self.retry_sleep_after > self.abandon_after {
            return Err(ConfigError::Invalid(
                "retry_sleep_after must not be greater than abandon_after",
            ));
        }
        if self.default_expire < -1 {
            return Err(ConfigError::Invalid("default_expire must be -1 or more"));
        }
        Ok(())
    }

    /// Time between worker wake-ups.
    #[must_use]
    pub const fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// The per-tick limits.
    #[must_use]
    pub const fn tick_limits(&self) -> TickLimits {
        TickLimits {
            budget: self.tick_budget,
            retry_sleep_after: self.retry_sleep_after,
            abandon_after: self.abandon_after,
        }
    }
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            threads: 4,
            tick_interval_ms: 50,
            tick_budget: 8000,
            retry_sleep_after: 15,
            abandon_after: 60,
            default_expire: -1,
        }
    }
}

/// Console log output.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LogConfig {
    /// Prefix lines with the time.
    pub time: bool,
    /// Show the module a line was logged from.
    pub module_path: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            time: true,
            module_path: false,
        }
    }
}

/// The whole config file.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ServerConfig {
    /// Physics engine settings.
    pub physics: PhysicsConfig,
    /// Console log settings.
    pub log: LogConfig,
    /// Register a flat in-memory world with id 0 on startup.
    pub demo_world: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            physics: PhysicsConfig::default(),
            log: LogConfig::default(),
            demo_world: true,
        }
    }
}

impl ServerConfig {
    /// Parses and validates a config from json5 text.
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json5::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads the config at `path`, writing the default file first if it is
    /// missing.
    pub fn load_or_create(path: &Path) -> Result<Self, ConfigError> {
        let io_error = |source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };

        if path.exists() {
            let text = fs::read_to_string(path).map_err(io_error)?;
            return Self::parse(&text);
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_error)?;
        }
        fs::write(path, DEFAULT_CONFIG).map_err(io_error)?;
        log::info!("Wrote default config to {}", path.display());
        Self::parse(DEFAULT_CONFIG)
    }

    /// Checks every section.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.physics.validate()
    }
}
