//! Trait definitions for pluggable model backends
//!
//! Every pretrained model the pipeline calls (speech-to-text, speaker
//! diarization, sentiment scoring, profanity lexicon) sits behind one
//! of these narrow contracts so the orchestration never depends on a
//! concrete backend.

mod analysis;
mod speech;

pub use analysis::{ProfanityLexicon, SentimentScorer};
pub use speech::{Diarizer, SpeechToText};
