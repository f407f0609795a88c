//! Speaking metrics
//!
//! Words, speech time, and words-per-minute per speaker, computed
//! from the aligned turns; interruptions come from diarization.

use std::collections::BTreeMap;

use call_audit_core::{DiarizationOutcome, SpeakerStats, SpeakingStats, TranscriptTurn};
use unicode_segmentation::UnicodeSegmentation;

/// Count words using unicode segmentation
pub fn word_count(text: &str) -> usize {
    text.unicode_words().count()
}

/// Aggregate per-speaker speech figures from aligned turns
pub fn speaking_stats(
    turns: &[TranscriptTurn],
    diarization: Option<&DiarizationOutcome>,
) -> SpeakingStats {
    let mut per_speaker: BTreeMap<String, SpeakerStats> = BTreeMap::new();

    for turn in turns {
        let entry = per_speaker
            .entry(turn.speaker.as_str().to_string())
            .or_insert(SpeakerStats {
                word_count: 0,
                speech_secs: 0.0,
                words_per_minute: 0.0,
            });
        entry.word_count += turn.word_count;
        entry.speech_secs += turn.duration_secs();
    }

    for stats in per_speaker.values_mut() {
        stats.words_per_minute = if stats.speech_secs > 0.0 {
            stats.word_count as f64 / stats.speech_secs * 60.0
        } else {
            0.0
        };
    }

    SpeakingStats {
        per_speaker,
        interruptions: diarization.map(|d| d.interruptions).unwrap_or(0),
    }
}
