//! Sentiment types

use std::fmt;

use serde::{Deserialize, Serialize};

/// Polarity and subjectivity as returned by the sentiment model
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SentimentScore {
    /// Polarity in [-1.0, 1.0]
    pub polarity: f64,
    /// Subjectivity in [0.0, 1.0]
    pub subjectivity: f64,
}

impl SentimentScore {
    /// Create a score, clamping both components into range
    pub fn new(polarity: f64, subjectivity: f64) -> Self {
        Self {
            polarity: polarity.clamp(-1.0, 1.0),
            subjectivity: subjectivity.clamp(0.0, 1.0),
        }
    }

    /// Neutral score
    pub fn neutral() -> Self {
        Self {
            polarity: 0.0,
            subjectivity: 0.0,
        }
    }

    /// Overall label for this score
    pub fn overall(&self) -> OverallSentiment {
        if self.polarity > 0.0 {
            OverallSentiment::Positive
        } else if self.polarity < 0.0 {
            OverallSentiment::Negative
        } else {
            OverallSentiment::Neutral
        }
    }
}

/// Overall sentiment label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OverallSentiment {
    Positive,
    Negative,
    Neutral,
}

impl OverallSentiment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Positive => "Positive",
            Self::Negative => "Negative",
            Self::Neutral => "Neutral",
        }
    }
}

impl fmt::Display for OverallSentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overall_thresholds() {
        assert_eq!(
            SentimentScore::new(0.3, 0.5).overall(),
            OverallSentiment::Positive
        );
        assert_eq!(
            SentimentScore::new(-0.01, 0.5).overall(),
            OverallSentiment::Negative
        );
        assert_eq!(
            SentimentScore::new(0.0, 0.5).overall(),
            OverallSentiment::Neutral
        );
    }

    #[test]
    fn test_clamping() {
        let score = SentimentScore::new(2.0, -0.5);
        assert_eq!(score.polarity, 1.0);
        assert_eq!(score.subjectivity, 0.0);
    }
}
