//! Core traits and types for the call audit pipeline
//!
//! This crate provides foundational types used across all other crates:
//! - Core traits for pluggable model backends (STT, diarization, sentiment)
//! - Call recording and transcript types
//! - Analysis result types (phrases, PII, profanity, speaking metrics)
//! - Report aggregation types
//! - Error types

pub mod audio;
pub mod diarization;
pub mod error;
pub mod phrases;
pub mod pii;
pub mod report;
pub mod sentiment;
pub mod traits;
pub mod transcript;

pub use audio::{CallId, CallRecording};
pub use diarization::{DiarizationOutcome, SpeakerLabel, SpeakerSegment};
pub use error::{Error, Result};
pub use phrases::{ForbiddenPhraseViolation, PhraseCheckResult};
pub use pii::{MaskStyle, PiiCheckResult, PiiEntity};
pub use report::{
    CallReport, CategoryResult, ProfanityCheckResult, SentimentResult, SpeakerStats,
    SpeakingStats, SummaryTable,
};
pub use sentiment::{OverallSentiment, SentimentScore};
pub use transcript::{full_text, TranscriptSpan, TranscriptTurn};

pub use traits::{Diarizer, ProfanityLexicon, SentimentScorer, SpeechToText};
