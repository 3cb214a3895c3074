//! Configuration loading
//!
//! Configuration is a single TOML file. Every field has a built-in default so
//! a missing file (or a missing section) still yields a usable configuration.
//!
//! Config file resolution order:
//! 1. Explicit path passed by the caller (highest priority)
//! 2. `JUKEBOX_CONFIG` environment variable
//! 3. `<config_dir>/jukebox/config.toml`
//! 4. Compiled defaults (fallback)

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

/// Environment variable naming the config file
pub const CONFIG_ENV_VAR: &str = "JUKEBOX_CONFIG";

/// When presence changes make a session leave on its own
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisconnectPolicy {
    /// Leave once the last listener is gone
    #[default]
    WhenEmpty,
    /// Leave on any listener change
    OnAnyChange,
}

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JukeboxConfig {
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default)]
    pub events: EventsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Per-session behaviour
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Quiet period after the last state change before a render is issued
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Upper bound on loading tracks for one play request
    #[serde(default = "default_load_timeout_ms")]
    pub load_timeout_ms: u64,

    /// Capacity of a session's inbound command queue
    #[serde(default = "default_command_capacity")]
    pub command_capacity: usize,

    /// Exclude bot identities from the initial listener set
    #[serde(default = "default_true")]
    pub exclude_bots: bool,

    #[serde(default)]
    pub disconnect_policy: DisconnectPolicy,
}

/// Panel rendering limits
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Character budget for the queue section before lines are summarised
    #[serde(default = "default_queue_char_budget")]
    pub queue_char_budget: usize,
}

/// Event bus sizing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventsConfig {
    #[serde(default = "default_event_capacity")]
    pub capacity: usize,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level used when `RUST_LOG` is unset (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_debounce_ms() -> u64 {
    300
}

fn default_load_timeout_ms() -> u64 {
    10_000
}

fn default_command_capacity() -> usize {
    64
}

fn default_true() -> bool {
    true
}

fn default_queue_char_budget() -> usize {
    4000
}

fn default_event_capacity() -> usize {
    100
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            load_timeout_ms: default_load_timeout_ms(),
            command_capacity: default_command_capacity(),
            exclude_bots: true,
            disconnect_policy: DisconnectPolicy::default(),
        }
    }
}

impl SessionConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn load_timeout(&self) -> Duration {
        Duration::from_millis(self.load_timeout_ms)
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            queue_char_budget: default_queue_char_budget(),
        }
    }
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            capacity: default_event_capacity(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl JukeboxConfig {
    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Resolve and load configuration
    ///
    /// A file that does not exist falls back to defaults with a warning.
    /// A file that exists but fails to parse or validate is an error.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let Some(path) = resolve_config_path(explicit) else {
            info!("No config file found, using built-in defaults");
            return Ok(Self::default());
        };

        if !path.exists() {
            warn!("Config file not found: {}, using built-in defaults", path.display());
            return Ok(Self::default());
        }

        info!("Loading config from {}", path.display());
        Self::from_file(&path)
    }

    fn validate(&self) -> Result<()> {
        if self.session.command_capacity == 0 {
            return Err(Error::Config(
                "session.command_capacity must be at least 1".to_string(),
            ));
        }
        if self.session.load_timeout_ms == 0 {
            return Err(Error::Config(
                "session.load_timeout_ms must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Pick the config file path by priority; `None` if no candidate applies
pub fn resolve_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }

    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    dirs::config_dir()
        .map(|d| d.join("jukebox").join("config.toml"))
        .filter(|p| p.exists())
}
