//! Speaker diarization types
//!
//! Segments as returned by the diarization model, plus the metrics
//! derived from them (speaking ratio, interruptions, time to first
//! word).

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Speaker label as emitted by the diarization model
///
/// Labels follow the `SPEAKER_00` convention; anything else coming
/// back from an adapter is kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SpeakerLabel(String);

impl SpeakerLabel {
    /// Label for the nth speaker (zero-based)
    pub fn from_index(index: usize) -> Self {
        Self(format!("SPEAKER_{:02}", index))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SpeakerLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for SpeakerLabel {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for SpeakerLabel {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// A time span attributed to one speaker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeakerSegment {
    /// Speaker label
    pub speaker: SpeakerLabel,
    /// Segment start in seconds
    pub start_secs: f64,
    /// Segment end in seconds
    pub end_secs: f64,
}

impl SpeakerSegment {
    /// Create a new segment
    pub fn new(speaker: impl Into<SpeakerLabel>, start_secs: f64, end_secs: f64) -> Self {
        Self {
            speaker: speaker.into(),
            start_secs,
            end_secs,
        }
    }

    /// Segment duration in seconds
    pub fn duration_secs(&self) -> f64 {
        (self.end_secs - self.start_secs).max(0.0)
    }

    /// Overlap duration with the given time span, in seconds
    pub fn overlap_secs(&self, start_secs: f64, end_secs: f64) -> f64 {
        let start = self.start_secs.max(start_secs);
        let end = self.end_secs.min(end_secs);
        (end - start).max(0.0)
    }

    /// Midpoint of the segment in seconds
    pub fn midpoint_secs(&self) -> f64 {
        (self.start_secs + self.end_secs) / 2.0
    }
}

/// Diarization segments plus derived speaking metrics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiarizationOutcome {
    /// Speaker segments in time order
    pub segments: Vec<SpeakerSegment>,
    /// Ratio of the first speaker's total time to the second's.
    /// `None` when fewer than two speakers were detected.
    pub speaking_ratio: Option<f64>,
    /// Count of segments that start before the previous speaker finished
    pub interruptions: u32,
    /// Start of the first segment, in seconds
    pub time_to_first_word: f64,
}

impl DiarizationOutcome {
    /// Number of distinct speakers across all segments
    pub fn speaker_count(&self) -> usize {
        self.segments
            .iter()
            .map(|s| &s.speaker)
            .collect::<BTreeSet<_>>()
            .len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_formatting() {
        assert_eq!(SpeakerLabel::from_index(0).as_str(), "SPEAKER_00");
        assert_eq!(SpeakerLabel::from_index(12).as_str(), "SPEAKER_12");
    }

    #[test]
    fn test_overlap() {
        let segment = SpeakerSegment::new("SPEAKER_00", 1.0, 3.0);
        assert_eq!(segment.overlap_secs(2.0, 4.0), 1.0);
        assert_eq!(segment.overlap_secs(3.5, 4.0), 0.0);
        assert_eq!(segment.overlap_secs(0.0, 10.0), 2.0);
    }

    #[test]
    fn test_speaker_count() {
        let outcome = DiarizationOutcome {
            segments: vec![
                SpeakerSegment::new("SPEAKER_00", 0.0, 1.0),
                SpeakerSegment::new("SPEAKER_01", 1.0, 2.0),
                SpeakerSegment::new("SPEAKER_00", 2.0, 3.0),
            ],
            speaking_ratio: Some(2.0),
            interruptions: 0,
            time_to_first_word: 0.0,
        };
        assert_eq!(outcome.speaker_count(), 2);
    }
}
