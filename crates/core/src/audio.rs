//! Call recording types
//!
//! A recording is opaque to the analysis stages: decoded mono samples
//! plus enough metadata to reason about it by time.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier for a processed call
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CallId(String);

impl CallId {
    /// Generate a fresh call id
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for CallId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CallId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for CallId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for CallId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Decoded call recording
///
/// Samples are mono f32 in [-1.0, 1.0]. Multi-channel sources are
/// mixed down at ingestion.
#[derive(Debug, Clone)]
pub struct CallRecording {
    /// Call identifier
    pub id: CallId,
    /// Original file, when the recording came from disk
    pub source: Option<PathBuf>,
    /// Mono samples
    pub samples: Vec<f32>,
    /// Sample rate in Hz
    pub sample_rate: u32,
}

impl CallRecording {
    /// Create a recording from decoded samples
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            id: CallId::new(),
            source: None,
            samples,
            sample_rate,
        }
    }

    /// Attach the source path
    pub fn with_source(mut self, path: impl Into<PathBuf>) -> Self {
        self.source = Some(path.into());
        self
    }

    /// Total duration in seconds
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate as f64
    }

    /// True when the recording holds no audio
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duration() {
        let recording = CallRecording::new(vec![0.0; 16_000], 16_000);
        assert!((recording.duration_secs() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty_recording() {
        let recording = CallRecording::new(Vec::new(), 16_000);
        assert!(recording.is_empty());
        assert_eq!(recording.duration_secs(), 0.0);
    }

    #[test]
    fn test_call_ids_unique() {
        assert_ne!(CallId::new().as_str(), CallId::new().as_str());
    }
}
