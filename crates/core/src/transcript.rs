//! Transcript types
//!
//! `TranscriptSpan` is what the STT model returns; `TranscriptTurn`
//! is a span merged with diarization into speaker-attributed units.

use serde::{Deserialize, Serialize};

use crate::diarization::SpeakerLabel;

/// A time-aligned piece of transcribed speech
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptSpan {
    /// Transcribed text
    pub text: String,
    /// Span start in seconds
    pub start_secs: f64,
    /// Span end in seconds
    pub end_secs: f64,
    /// Model confidence (0.0 - 1.0)
    pub confidence: f32,
}

impl TranscriptSpan {
    /// Create a new span
    pub fn new(text: impl Into<String>, start_secs: f64, end_secs: f64) -> Self {
        Self {
            text: text.into(),
            start_secs,
            end_secs,
            confidence: 1.0,
        }
    }

    /// Set the confidence score
    pub fn with_confidence(mut self, confidence: f32) -> Self {
        self.confidence = confidence.clamp(0.0, 1.0);
        self
    }

    /// Span duration in seconds
    pub fn duration_secs(&self) -> f64 {
        (self.end_secs - self.start_secs).max(0.0)
    }

    /// Midpoint of the span in seconds
    pub fn midpoint_secs(&self) -> f64 {
        (self.start_secs + self.end_secs) / 2.0
    }
}

/// One speaker's contiguous stretch of speech after alignment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptTurn {
    /// Speaker this turn is attributed to
    pub speaker: SpeakerLabel,
    /// Turn text
    pub text: String,
    /// Turn start in seconds
    pub start_secs: f64,
    /// Turn end in seconds
    pub end_secs: f64,
    /// Word count of the turn text
    pub word_count: usize,
}

impl TranscriptTurn {
    /// Turn duration in seconds
    pub fn duration_secs(&self) -> f64 {
        (self.end_secs - self.start_secs).max(0.0)
    }
}

/// Join spans into the full call text, in time order
pub fn full_text(spans: &[TranscriptSpan]) -> String {
    let mut ordered: Vec<&TranscriptSpan> = spans.iter().collect();
    ordered.sort_by(|a, b| a.start_secs.total_cmp(&b.start_secs));
    ordered
        .iter()
        .map(|s| s.text.trim())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_text_ordering() {
        let spans = vec![
            TranscriptSpan::new("world", 1.0, 2.0),
            TranscriptSpan::new("hello", 0.0, 1.0),
        ];
        assert_eq!(full_text(&spans), "hello world");
    }

    #[test]
    fn test_full_text_skips_empty_spans() {
        let spans = vec![
            TranscriptSpan::new("hello", 0.0, 1.0),
            TranscriptSpan::new("  ", 1.0, 1.5),
            TranscriptSpan::new("there", 1.5, 2.0),
        ];
        assert_eq!(full_text(&spans), "hello there");
    }

    #[test]
    fn test_confidence_clamped() {
        let span = TranscriptSpan::new("hi", 0.0, 1.0).with_confidence(1.7);
        assert_eq!(span.confidence, 1.0);
    }
}
