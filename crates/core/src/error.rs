//! Error types shared across the pipeline

use thiserror::Error;

/// Errors produced by ingestion, model adapters, and analysis stages
#[derive(Error, Debug)]
pub enum Error {
    #[error("Audio decode error: {0}")]
    AudioDecode(String),

    #[error("Unsupported audio: {0}")]
    UnsupportedAudio(String),

    #[error("Transcription failed: {0}")]
    Transcription(String),

    #[error("Diarization failed: {0}")]
    Diarization(String),

    #[error("{service} request failed: {message}")]
    ExternalService { service: String, message: String },

    #[error("Invalid analysis rule '{key}': {message}")]
    InvalidRule { key: String, message: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Convenience constructor for adapter errors
    pub fn external(service: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ExternalService {
            service: service.into(),
            message: message.into(),
        }
    }
}

/// Result alias used across the workspace
pub type Result<T> = std::result::Result<T, Error>;
