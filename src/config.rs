//! Configuration loading using Figment
//!
//! Test sessions are configured from:
//! 1. a TOML file (base configuration)
//! 2. environment variables prefixed with `SEQUENCE_TESTER_`, using `__` to
//!    reach nested keys (e.g. `SEQUENCE_TESTER_LOG__BUSY_POLICY=manual`)
//!
//! # Example
//! ```no_run
//! use sequence_tester::config::SequenceTesterConfig;
//! use sequence_tester::setting_log::SettingLog;
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = SequenceTesterConfig::load_validated("config/sequence_tester.toml")?;
//! let log = SettingLog::from_config(&config.log);
//! # Ok(())
//! # }
//! ```

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::setting_log::{BusyPolicy, DEFAULT_FEED_CAPACITY};

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "SEQUENCE_TESTER_";

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SequenceTesterConfig {
    /// Application settings
    #[serde(default)]
    pub application: ApplicationConfig,
    /// Setting log behaviour
    #[serde(default)]
    pub log: LogConfig,
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApplicationConfig {
    /// Session name, used in diagnostics
    #[serde(default = "default_name")]
    pub name: String,
    /// Logging level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Diagnostic output format (pretty, compact, json)
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

/// How busy marks are cleared.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BusyPolicyKind {
    /// Busy is reported once, then cleared.
    #[default]
    ClearOnQuery,
    /// Busy for `busy_duration_ms` after each mark.
    Timed,
    /// Busy until cleared by the test.
    Manual,
}

/// Setting log configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LogConfig {
    /// Busy clearance policy
    #[serde(default)]
    pub busy_policy: BusyPolicyKind,
    /// Busy duration for the timed policy, in milliseconds
    #[serde(default)]
    pub busy_duration_ms: u64,
    /// Echo every appended entry as a TRACE event
    #[serde(default = "default_trace_entries")]
    pub trace_entries: bool,
    /// Capacity of the live entry feed
    #[serde(default = "default_broadcast_capacity")]
    pub broadcast_capacity: usize,
}

// Default value functions
fn default_name() -> String {
    "sequence-tester".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_trace_entries() -> bool {
    true
}

fn default_broadcast_capacity() -> usize {
    DEFAULT_FEED_CAPACITY
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            log_level: default_log_level(),
            log_format: default_log_format(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            busy_policy: BusyPolicyKind::default(),
            busy_duration_ms: 0,
            trace_entries: default_trace_entries(),
            broadcast_capacity: default_broadcast_capacity(),
        }
    }
}

impl LogConfig {
    /// Runtime busy policy described by this section.
    pub fn busy_policy(&self) -> BusyPolicy {
        match self.busy_policy {
            BusyPolicyKind::ClearOnQuery => BusyPolicy::ClearOnQuery,
            BusyPolicyKind::Timed => {
                BusyPolicy::Timed(Duration::from_millis(self.busy_duration_ms))
            }
            BusyPolicyKind::Manual => BusyPolicy::Manual,
        }
    }
}

impl SequenceTesterConfig {
    /// Load configuration from a TOML file and environment variables
    ///
    /// Missing keys fall back to defaults; a missing file yields the defaults
    /// plus any environment overrides.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, figment::Error> {
        Figment::from(Serialized::defaults(SequenceTesterConfig::default()))
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
    }

    /// Load and validate in one step.
    pub fn load_validated<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let config = Self::load_from(path)?;
        config.validate().map_err(anyhow::Error::msg)?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), String> {
        // Validate log level
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.application.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.application.log_level,
                valid_levels.join(", ")
            ));
        }

        // Validate output format
        let valid_formats = ["pretty", "compact", "json"];
        if !valid_formats.contains(&self.application.log_format.as_str()) {
            return Err(format!(
                "Invalid log_format '{}'. Must be one of: {}",
                self.application.log_format,
                valid_formats.join(", ")
            ));
        }

        if self.log.broadcast_capacity == 0 {
            return Err("Invalid broadcast_capacity 0. Must be at least 1".to_string());
        }

        if self.log.busy_policy == BusyPolicyKind::Timed && self.log.busy_duration_ms == 0 {
            return Err("busy_policy 'timed' requires busy_duration_ms > 0".to_string());
        }

        Ok(())
    }
}
