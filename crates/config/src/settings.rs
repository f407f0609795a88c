//! Main settings module

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Job tracking configuration
    #[serde(default)]
    pub jobs: JobConfig,

    /// External model endpoints
    #[serde(default)]
    pub models: ModelConfig,

    /// Analysis stage configuration
    #[serde(default)]
    pub analysis: AnalysisConfig,

    /// Observability configuration
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind host
    #[serde(default = "default_host")]
    pub host: String,

    /// Bind port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Enable CORS origin checks (false = permissive, dev only)
    #[serde(default)]
    pub cors_enabled: bool,

    /// Allowed CORS origins
    #[serde(default)]
    pub cors_origins: Vec<String>,

    /// Upload size cap in bytes
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_max_upload_bytes() -> usize {
    64 * 1024 * 1024
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_enabled: false,
            cors_origins: Vec::new(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

/// Job tracking configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobConfig {
    /// Maximum concurrent jobs held in memory
    #[serde(default = "default_max_jobs")]
    pub max_jobs: usize,

    /// Seconds after which an idle job is dropped
    #[serde(default = "default_job_timeout_secs")]
    pub timeout_secs: u64,

    /// Interval of the expired-job cleanup task
    #[serde(default = "default_cleanup_interval_secs")]
    pub cleanup_interval_secs: u64,
}

fn default_max_jobs() -> usize {
    64
}

fn default_job_timeout_secs() -> u64 {
    3600
}

fn default_cleanup_interval_secs() -> u64 {
    300
}

impl Default for JobConfig {
    fn default() -> Self {
        Self {
            max_jobs: default_max_jobs(),
            timeout_secs: default_job_timeout_secs(),
            cleanup_interval_secs: default_cleanup_interval_secs(),
        }
    }
}

/// External model endpoints and audio expectations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Speech-to-text service endpoint
    #[serde(default = "default_stt_endpoint")]
    pub stt_endpoint: String,

    /// Diarization service endpoint
    #[serde(default = "default_diarization_endpoint")]
    pub diarization_endpoint: String,

    /// Environment variable holding the gated diarization model token
    #[serde(default = "default_diarization_token_env")]
    pub diarization_token_env: String,

    /// Sample rate the model services expect
    #[serde(default = "default_target_sample_rate")]
    pub target_sample_rate: u32,

    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_stt_endpoint() -> String {
    "http://127.0.0.1:9100/v1/transcribe".to_string()
}

fn default_diarization_endpoint() -> String {
    "http://127.0.0.1:9200/v1/diarize".to_string()
}

fn default_diarization_token_env() -> String {
    "HUGGING_FACE_TOKEN".to_string()
}

fn default_target_sample_rate() -> u32 {
    16_000
}

fn default_request_timeout_secs() -> u64 {
    120
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            stt_endpoint: default_stt_endpoint(),
            diarization_endpoint: default_diarization_endpoint(),
            diarization_token_env: default_diarization_token_env(),
            target_sample_rate: default_target_sample_rate(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

/// Analysis stage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Path to the analysis rules YAML; built-in defaults when absent
    #[serde(default = "default_rules_path")]
    pub rules_path: String,

    /// How PII matches are masked: fixed, label, or equal
    #[serde(default = "default_mask_style")]
    pub mask_style: String,
}

fn default_rules_path() -> String {
    "config/rules.yaml".to_string()
}

fn default_mask_style() -> String {
    "fixed".to_string()
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            rules_path: default_rules_path(),
            mask_style: default_mask_style(),
        }
    }
}

/// Observability configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Log level used when RUST_LOG is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Emit logs as JSON
    #[serde(default)]
    pub log_json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_json: false,
        }
    }
}

impl Settings {
    /// Create default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.max_upload_bytes == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.max_upload_bytes".to_string(),
                message: "Upload cap must be non-zero".to_string(),
            });
        }

        if self.jobs.max_jobs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "jobs.max_jobs".to_string(),
                message: "At least one job slot is required".to_string(),
            });
        }

        if !(8_000..=48_000).contains(&self.models.target_sample_rate) {
            return Err(ConfigError::InvalidValue {
                field: "models.target_sample_rate".to_string(),
                message: format!(
                    "Must be between 8000 and 48000 Hz, got {}",
                    self.models.target_sample_rate
                ),
            });
        }

        if !["fixed", "label", "equal"].contains(&self.analysis.mask_style.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "analysis.mask_style".to_string(),
                message: format!("Unknown mask style '{}'", self.analysis.mask_style),
            });
        }

        Ok(())
    }
}

/// Load settings from files and environment
///
/// Priority: env vars > config/{env}.toml > config/default.toml > defaults
pub fn load_settings(env: Option<&str>) -> Result<Settings, ConfigError> {
    let mut builder = Config::builder().add_source(File::with_name("config/default").required(false));

    if let Some(env) = env {
        builder = builder.add_source(File::with_name(&format!("config/{}", env)).required(false));
    }

    let settings: Settings = builder
        .add_source(
            Environment::with_prefix("CALL_AUDIT")
                .separator("__")
                .try_parsing(true),
        )
        .build()?
        .try_deserialize()?;

    settings.validate()?;

    tracing::debug!(
        stt = %settings.models.stt_endpoint,
        diarization = %settings.models.diarization_endpoint,
        "Settings loaded"
    );

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_valid() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.server.port, 8000);
        assert_eq!(settings.models.target_sample_rate, 16_000);
    }

    #[test]
    fn test_bad_sample_rate_rejected() {
        let mut settings = Settings::default();
        settings.models.target_sample_rate = 100;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_bad_mask_style_rejected() {
        let mut settings = Settings::default();
        settings.analysis.mask_style = "blur".to_string();
        assert!(settings.validate().is_err());
    }
}
