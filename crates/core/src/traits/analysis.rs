//! Analysis model traits

use async_trait::async_trait;

use crate::sentiment::SentimentScore;
use crate::Result;

/// Sentiment scoring interface
///
/// Implementations:
/// - `LexiconSentimentScorer` - word-list scorer (default)
///
/// # Example
///
/// ```ignore
/// let scorer: Box<dyn SentimentScorer> = Box::new(LexiconSentimentScorer::default());
/// let score = scorer.score("I am happy with the service").await?;
/// assert!(score.polarity > 0.0);
/// ```
#[async_trait]
pub trait SentimentScorer: Send + Sync + 'static {
    /// Score a piece of text
    ///
    /// # Arguments
    /// * `text` - Text to score
    ///
    /// # Returns
    /// Polarity in [-1, 1] and subjectivity in [0, 1]
    async fn score(&self, text: &str) -> Result<SentimentScore>;

    /// Get model name for logging
    fn model_name(&self) -> &str;
}

/// Profanity word lookup
///
/// Implementations:
/// - `WordListLexicon` - configured word list plus built-in defaults
pub trait ProfanityLexicon: Send + Sync + 'static {
    /// True when the (lowercased) word is profane
    fn contains(&self, word: &str) -> bool;

    /// Get lexicon name for logging
    fn name(&self) -> &str;
}
