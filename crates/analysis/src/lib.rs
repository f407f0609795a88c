//! Text analysis stages for the call audit pipeline
//!
//! Each stage is independent and operates on the aligned transcript
//! (or the full call text):
//! - Phrase compliance (required and forbidden phrases)
//! - PII detection and masking
//! - Profanity detection and censoring
//! - Sentiment scoring (lexicon backend behind the `SentimentScorer` trait)
//! - Speaking metrics (word counts, speech time, words per minute)
//! - Call categorization

pub mod categorize;
pub mod phrases;
pub mod pii;
pub mod profanity;
pub mod sentiment;
pub mod speaking;

pub use categorize::Categorizer;
pub use phrases::PhraseChecker;
pub use pii::PiiDetector;
pub use profanity::{ProfanityFilter, WordListLexicon};
pub use sentiment::{sentiment_result, LexiconSentimentScorer};
pub use speaking::{speaking_stats, word_count};
