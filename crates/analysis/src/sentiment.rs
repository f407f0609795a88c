//! Sentiment scoring
//!
//! `LexiconSentimentScorer` is the default backend behind the
//! `SentimentScorer` trait: valence word lists with simple negation
//! flipping. Polarity is the mean valence of matched words;
//! subjectivity grows with the share of opinionated words.

use std::collections::{BTreeMap, HashSet};

use async_trait::async_trait;
use call_audit_core::{Result, SentimentResult, SentimentScore, SentimentScorer, TranscriptTurn};
use once_cell::sync::Lazy;
use unicode_segmentation::UnicodeSegmentation;

static POSITIVE: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "amazing", "appreciate", "awesome", "best", "better", "brilliant", "delighted",
        "excellent", "fantastic", "glad", "good", "grateful", "great", "happy", "helpful",
        "love", "lovely", "nice", "perfect", "pleasant", "pleased", "resolved", "satisfied",
        "smooth", "superb", "thanks", "thank", "wonderful",
    ]
    .into_iter()
    .collect()
});

static NEGATIVE: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "angry", "annoyed", "awful", "bad", "broken", "cancel", "complaint", "confused",
        "disappointed", "dissatisfied", "dreadful", "failed", "frustrated", "hate",
        "horrible", "issue", "late", "misleading", "poor", "problem", "refuse", "rude",
        "slow", "terrible", "unacceptable", "unhappy", "upset", "useless", "waiting",
        "worst", "wrong",
    ]
    .into_iter()
    .collect()
});

static NEGATIONS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    ["not", "no", "never", "don't", "won't", "can't", "isn't", "wasn't", "didn't"]
        .into_iter()
        .collect()
});

/// Word-list sentiment scorer
#[derive(Debug, Default, Clone, Copy)]
pub struct LexiconSentimentScorer;

impl LexiconSentimentScorer {
    fn score_text(text: &str) -> SentimentScore {
        let tokens: Vec<String> = text
            .unicode_words()
            .map(|w| w.to_lowercase())
            .collect();
        if tokens.is_empty() {
            return SentimentScore::neutral();
        }

        let mut valence_sum = 0.0_f64;
        let mut matched = 0u32;

        for (index, token) in tokens.iter().enumerate() {
            let valence = if POSITIVE.contains(token.as_str()) {
                1.0
            } else if NEGATIVE.contains(token.as_str()) {
                -1.0
            } else {
                continue;
            };

            // A negation directly before the word flips its valence.
            let negated = index > 0 && NEGATIONS.contains(tokens[index - 1].as_str());
            valence_sum += if negated { -valence } else { valence };
            matched += 1;
        }

        if matched == 0 {
            return SentimentScore::neutral();
        }

        let polarity = valence_sum / matched as f64;
        let subjectivity = (2.0 * matched as f64 / tokens.len() as f64).min(1.0);
        SentimentScore::new(polarity, subjectivity)
    }
}

#[async_trait]
impl SentimentScorer for LexiconSentimentScorer {
    async fn score(&self, text: &str) -> Result<SentimentScore> {
        Ok(Self::score_text(text))
    }

    fn model_name(&self) -> &str {
        "lexicon-sentiment"
    }
}

/// Score the full call and every aligned turn
///
/// The whole-call score drives the overall label; per-turn scores are
/// averaged into a per-speaker polarity mean.
pub async fn sentiment_result(
    scorer: &dyn SentimentScorer,
    text: &str,
    turns: &[TranscriptTurn],
) -> Result<SentimentResult> {
    let score = scorer.score(text).await?;

    let mut sums: BTreeMap<String, (f64, u32)> = BTreeMap::new();
    for turn in turns {
        let turn_score = scorer.score(&turn.text).await?;
        let entry = sums
            .entry(turn.speaker.as_str().to_string())
            .or_insert((0.0, 0));
        entry.0 += turn_score.polarity;
        entry.1 += 1;
    }

    let per_speaker = sums
        .into_iter()
        .map(|(speaker, (sum, count))| (speaker, sum / count as f64))
        .collect();

    Ok(SentimentResult::from_score(score).with_per_speaker(per_speaker))
}
