//! Engine configuration
//!
//! Transition timings and the alignment new overlays start with. Values can
//! be set with the builder methods or loaded from TOML:
//!
//! ```toml
//! open_settle_ms = 16
//! close_animation_ms = 300
//! alignment = "bottom,left"
//! ```

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::alignment::Alignment;

/// Errors that can occur when loading a configuration file
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse config TOML: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// Configuration options for overlay engines
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Delay before an opening overlay is declared open (one layout pass)
    pub open_settle: Duration,

    /// Delay before a closing overlay is declared closed (close animation)
    pub close_animation: Duration,

    /// Alignment new overlays start with
    pub default_alignment: Alignment,
}

/// TOML structure for deserializing configuration
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct TomlConfig {
    open_settle_ms: Option<u64>,
    close_animation_ms: Option<u64>,
    alignment: Option<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            open_settle: Duration::from_millis(16),
            close_animation: Duration::from_millis(300),
            default_alignment: Alignment::centered(),
        }
    }
}

impl EngineConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Load configuration from a TOML string; missing keys keep their defaults
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let parsed: TomlConfig = toml::from_str(content)?;
        let defaults = Self::default();

        Ok(Self {
            open_settle: parsed
                .open_settle_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.open_settle),
            close_animation: parsed
                .close_animation_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.close_animation),
            default_alignment: parsed
                .alignment
                .as_deref()
                .map(Alignment::parse)
                .unwrap_or(defaults.default_alignment),
        })
    }

    pub fn with_open_settle(mut self, delay: Duration) -> Self {
        self.open_settle = delay;
        self
    }

    pub fn with_close_animation(mut self, delay: Duration) -> Self {
        self.close_animation = delay;
        self
    }

    pub fn with_default_alignment(mut self, alignment: Alignment) -> Self {
        self.default_alignment = alignment;
        self
    }

    /// Time after which both transitions of a refresh have settled
    pub fn settle_time(&self) -> Duration {
        self.open_settle.max(self.close_animation)
    }
}
