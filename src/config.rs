//! # Configuration Management Module
//!
//! ## Purpose
//! Centralized configuration for the workspace engine: every simulated delay
//! and sampling knob is a typed setting with a sensible default, so tests
//! and demos can shrink or stretch the timeline without touching pipeline
//! code.
//!
//! ## Input/Output Specification
//! - **Input**: Configuration files (TOML), environment variables
//! - **Output**: Validated configuration structs with defaults and overrides
//! - **Validation**: Range checks on probabilities, increments, and bounds
//!
//! ## Configuration Sources (in order of precedence)
//! 1. Environment variables
//! 2. Configuration files
//! 3. Default values

use crate::errors::{NexusError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Main configuration structure containing all engine settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Upload validation and progress simulation
    pub upload: UploadConfig,
    /// File analysis pipeline
    pub analysis: AnalysisConfig,
    /// Web search pipeline
    pub search: SearchConfig,
    /// Chat simulator
    pub chat: ChatConfig,
    /// Logging settings
    pub logging: LoggingConfig,
}

/// Upload progress simulation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    /// Interval between progress ticks in milliseconds
    pub tick_interval_ms: u64,
    /// Percent added per tick (clamped at 100)
    pub tick_increment: u8,
}

/// Analysis pipeline settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Simulated processing delay in milliseconds
    pub processing_delay_ms: u64,
    /// Independent inclusion probability for each entity group
    pub entity_inclusion_probability: f64,
}

/// Search pipeline settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Simulated retrieval delay in milliseconds (stage 1)
    pub retrieval_delay_ms: u64,
    /// Simulated summarization delay in milliseconds (stage 2)
    pub summary_delay_ms: u64,
    /// Maximum query length in characters
    pub max_query_length: usize,
}

/// Chat simulator settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Simulated assistant reply delay in milliseconds
    pub reply_delay_ms: u64,
    /// How long a message keeps its copied flag, in milliseconds
    pub copied_reset_ms: u64,
    /// Model id selected at startup
    pub default_model: String,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Enable structured JSON logging
    pub json_format: bool,
}

impl UploadConfig {
    /// Tick interval as a `Duration`
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

impl AnalysisConfig {
    /// Processing delay as a `Duration`
    pub fn processing_delay(&self) -> Duration {
        Duration::from_millis(self.processing_delay_ms)
    }
}

impl SearchConfig {
    /// Stage 1 delay as a `Duration`
    pub fn retrieval_delay(&self) -> Duration {
        Duration::from_millis(self.retrieval_delay_ms)
    }

    /// Stage 2 delay as a `Duration`
    pub fn summary_delay(&self) -> Duration {
        Duration::from_millis(self.summary_delay_ms)
    }
}

impl ChatConfig {
    /// Reply delay as a `Duration`
    pub fn reply_delay(&self) -> Duration {
        Duration::from_millis(self.reply_delay_ms)
    }

    /// Copied-flag reset delay as a `Duration`
    pub fn copied_reset(&self) -> Duration {
        Duration::from_millis(self.copied_reset_ms)
    }
}

impl Config {
    /// Load configuration from the default location
    pub fn load() -> Result<Self> {
        Self::from_file("config.toml")
    }

    /// Load configuration from a specific file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            tracing::warn!("Configuration file not found: {:?}, using defaults", path);
            let mut config = Self::default();
            config.apply_env_overrides()?;
            config.validate()?;
            return Ok(config);
        }

        let content = std::fs::read_to_string(path).map_err(|e| NexusError::Config {
            message: format!("Failed to read config file {:?}: {}", path, e),
        })?;

        let mut config: Config = toml::from_str(&content).map_err(|e| NexusError::Config {
            message: format!("Failed to parse config file {:?}: {}", path, e),
        })?;

        config.apply_env_overrides()?;
        config.validate()?;

        Ok(config)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(level) = std::env::var("DLITE_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(model) = std::env::var("DLITE_CHAT_MODEL") {
            self.chat.default_model = model;
        }
        if let Ok(delay) = std::env::var("DLITE_REPLY_DELAY_MS") {
            self.chat.reply_delay_ms = delay.parse().map_err(|_| NexusError::Config {
                message: "Invalid value in DLITE_REPLY_DELAY_MS".to_string(),
            })?;
        }

        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.upload.tick_increment == 0 {
            return Err(NexusError::ValidationFailed {
                field: "upload.tick_increment".to_string(),
                reason: "Increment must be greater than zero".to_string(),
            });
        }

        if !(0.0..=1.0).contains(&self.analysis.entity_inclusion_probability) {
            return Err(NexusError::ValidationFailed {
                field: "analysis.entity_inclusion_probability".to_string(),
                reason: "Probability must be within [0, 1]".to_string(),
            });
        }

        if self.search.max_query_length == 0 {
            return Err(NexusError::ValidationFailed {
                field: "search.max_query_length".to_string(),
                reason: "Maximum query length must be greater than zero".to_string(),
            });
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            upload: UploadConfig {
                tick_interval_ms: 100,
                tick_increment: 5,
            },
            analysis: AnalysisConfig {
                processing_delay_ms: 2000,
                entity_inclusion_probability: 0.7,
            },
            search: SearchConfig {
                retrieval_delay_ms: 1500,
                summary_delay_ms: 1500,
                max_query_length: 500,
            },
            chat: ChatConfig {
                reply_delay_ms: 1500,
                copied_reset_ms: 2000,
                default_model: "gpt-4o".to_string(),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                json_format: false,
            },
        }
    }
}
