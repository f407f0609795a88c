//! Configuration management for the call audit pipeline
//!
//! Supports loading configuration from:
//! - TOML files (`config/default.toml`, then `config/{env}.toml`)
//! - Environment variables (CALL_AUDIT__ prefix)
//!
//! Analysis rules (PII patterns, phrase lists, categories, profanity
//! words) live in a separate YAML file so operators can edit them
//! without touching server settings.

pub mod rules;
pub mod settings;

pub use rules::AnalysisRules;
pub use settings::{
    load_settings, AnalysisConfig, JobConfig, ModelConfig, ObservabilityConfig, ServerConfig,
    Settings,
};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("Environment error: {0}")]
    Environment(String),
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}
