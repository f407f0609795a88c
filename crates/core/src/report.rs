//! Report aggregation types
//!
//! `CallReport` merges every stage output for one call; the summary
//! table is the per-speaker view the UIs render.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::audio::CallId;
use crate::diarization::DiarizationOutcome;
use crate::phrases::PhraseCheckResult;
use crate::pii::PiiCheckResult;
use crate::sentiment::{OverallSentiment, SentimentScore};
use crate::transcript::TranscriptTurn;

/// Result of the profanity check stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfanityCheckResult {
    /// Whether any profane word matched
    pub detected: bool,
    /// Input text with profane words replaced by asterisks
    pub censored_text: String,
    /// Number of censored words
    pub hits: u32,
}

/// Per-speaker speech figures
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeakerStats {
    /// Words attributed to the speaker
    pub word_count: usize,
    /// Total speaking time in seconds
    pub speech_secs: f64,
    /// Words per minute (0 when no speaking time)
    pub words_per_minute: f64,
}

/// Result of the speaking metrics stage
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SpeakingStats {
    /// Stats keyed by speaker label
    pub per_speaker: BTreeMap<String, SpeakerStats>,
    /// Interruption count from diarization
    pub interruptions: u32,
}

/// Result of the categorization stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryResult {
    /// Winning category, or "Unknown"
    pub category: String,
    /// Keyword hit counts per category
    pub hits: BTreeMap<String, u32>,
}

impl CategoryResult {
    /// The fallback result when nothing matched
    pub fn unknown() -> Self {
        Self {
            category: "Unknown".to_string(),
            hits: BTreeMap::new(),
        }
    }
}

/// Result of the sentiment stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentResult {
    /// Score over the full call text
    pub score: SentimentScore,
    /// Overall label derived from the score
    pub overall: OverallSentiment,
    /// Mean turn polarity per speaker
    pub per_speaker_polarity: BTreeMap<String, f64>,
}

impl SentimentResult {
    /// Build from a whole-call score
    pub fn from_score(score: SentimentScore) -> Self {
        Self {
            score,
            overall: score.overall(),
            per_speaker_polarity: BTreeMap::new(),
        }
    }

    /// Attach per-speaker polarity means
    pub fn with_per_speaker(mut self, per_speaker: BTreeMap<String, f64>) -> Self {
        self.per_speaker_polarity = per_speaker;
        self
    }
}

/// Per-speaker summary table rendered by the UIs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Aggregated report for one call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallReport {
    /// Call identifier
    pub call_id: CallId,
    /// When the report was assembled
    pub generated_at: DateTime<Utc>,
    /// Full call transcription
    pub transcription: Option<String>,
    /// Diarization segments and metrics
    pub diarization: Option<DiarizationOutcome>,
    /// Speaker-attributed turns after alignment
    pub turns: Vec<TranscriptTurn>,
    /// Phrase compliance result
    pub required_phrases: Option<PhraseCheckResult>,
    /// PII check result
    pub pii: Option<PiiCheckResult>,
    /// Profanity check result
    pub profanity: Option<ProfanityCheckResult>,
    /// Sentiment result
    pub sentiment: Option<SentimentResult>,
    /// Speaking metrics
    pub speaking: Option<SpeakingStats>,
    /// Category result
    pub category: Option<CategoryResult>,
}

impl CallReport {
    /// Create an empty report for a call
    pub fn new(call_id: CallId) -> Self {
        Self {
            call_id,
            generated_at: Utc::now(),
            transcription: None,
            diarization: None,
            turns: Vec::new(),
            required_phrases: None,
            pii: None,
            profanity: None,
            sentiment: None,
            speaking: None,
            category: None,
        }
    }

    /// Speakers appearing in the report, in label order
    pub fn speakers(&self) -> Vec<String> {
        if let Some(speaking) = &self.speaking {
            return speaking.per_speaker.keys().cloned().collect();
        }
        let mut labels: Vec<String> = self
            .turns
            .iter()
            .map(|t| t.speaker.as_str().to_string())
            .collect();
        labels.sort();
        labels.dedup();
        labels
    }

    /// Build the per-speaker summary table
    ///
    /// One column per detected speaker; rows cover speech data,
    /// speaking speed, PII, profanity, required phrases, and
    /// sentiment. Call-level results repeat across speaker columns.
    pub fn summary_table(&self) -> SummaryTable {
        let speakers = self.speakers();
        let mut columns = vec!["Analysis".to_string()];
        if speakers.is_empty() {
            columns.push("Call".to_string());
        } else {
            columns.extend(speakers.iter().cloned());
        }

        let mut rows = Vec::new();

        rows.push(self.row("Speech Data", &speakers, |speaker| {
            match self
                .speaking
                .as_ref()
                .and_then(|s| s.per_speaker.get(speaker))
            {
                Some(stats) => format!(
                    "Length: {}\nTime: {:.2}s",
                    stats.word_count, stats.speech_secs
                ),
                None => "N/A".to_string(),
            }
        }));

        rows.push(self.row("Speaking Speed (WPM)", &speakers, |speaker| {
            match self
                .speaking
                .as_ref()
                .and_then(|s| s.per_speaker.get(speaker))
            {
                Some(stats) => format!("{:.1}", stats.words_per_minute),
                None => "N/A".to_string(),
            }
        }));

        rows.push(self.row("PII Check", &speakers, |_| match &self.pii {
            Some(pii) => format!("Detected: {}", pii.detected),
            None => "N/A".to_string(),
        }));

        rows.push(self.row("Profanity Check", &speakers, |_| match &self.profanity {
            Some(profanity) => format!("Detected: {}", profanity.detected),
            None => "N/A".to_string(),
        }));

        rows.push(
            self.row("Required Phrases", &speakers, |_| {
                match &self.required_phrases {
                    Some(phrases) => format!(
                        "Present: {}\nPhrases: {}",
                        phrases.required_present,
                        phrases.present_phrases.join(", ")
                    ),
                    None => "N/A".to_string(),
                }
            }),
        );

        rows.push(self.row("Sentiment Analysis", &speakers, |speaker| {
            match &self.sentiment {
                Some(sentiment) => {
                    let mut cell = format!(
                        "Polarity: {:.2}\nSubjectivity: {:.2}\nOverall: {}",
                        sentiment.score.polarity,
                        sentiment.score.subjectivity,
                        sentiment.overall
                    );
                    if let Some(polarity) = sentiment.per_speaker_polarity.get(speaker) {
                        cell.push_str(&format!("\nSpeaker polarity: {:.2}", polarity));
                    }
                    cell
                }
                None => "N/A".to_string(),
            }
        }));

        SummaryTable { columns, rows }
    }

    fn row<F>(&self, name: &str, speakers: &[String], cell: F) -> Vec<String>
    where
        F: Fn(&str) -> String,
    {
        let mut row = vec![name.to_string()];
        if speakers.is_empty() {
            row.push(cell(""));
        } else {
            row.extend(speakers.iter().map(|s| cell(s)));
        }
        row
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_report() -> CallReport {
        let mut report = CallReport::new(CallId::from("call-1"));
        let mut per_speaker = BTreeMap::new();
        per_speaker.insert(
            "SPEAKER_00".to_string(),
            SpeakerStats {
                word_count: 120,
                speech_secs: 60.0,
                words_per_minute: 120.0,
            },
        );
        per_speaker.insert(
            "SPEAKER_01".to_string(),
            SpeakerStats {
                word_count: 30,
                speech_secs: 20.0,
                words_per_minute: 90.0,
            },
        );
        report.speaking = Some(SpeakingStats {
            per_speaker,
            interruptions: 2,
        });
        report.sentiment = Some(SentimentResult::from_score(SentimentScore::new(0.4, 0.6)));
        report
    }

    #[test]
    fn test_summary_table_shape() {
        let table = sample_report().summary_table();
        assert_eq!(
            table.columns,
            vec!["Analysis", "SPEAKER_00", "SPEAKER_01"]
        );
        assert_eq!(table.rows.len(), 6);
        for row in &table.rows {
            assert_eq!(row.len(), table.columns.len());
        }
    }

    #[test]
    fn test_summary_table_missing_stages() {
        let report = CallReport::new(CallId::from("call-2"));
        let table = report.summary_table();
        // No speakers detected: one call-level column, everything N/A.
        assert_eq!(table.columns, vec!["Analysis", "Call"]);
        assert!(table.rows.iter().all(|r| r[1] == "N/A"));
    }

    #[test]
    fn test_category_unknown() {
        let result = CategoryResult::unknown();
        assert_eq!(result.category, "Unknown");
        assert!(result.hits.is_empty());
    }

    #[test]
    fn test_report_serializes() {
        let json = serde_json::to_string(&sample_report()).unwrap();
        assert!(json.contains("SPEAKER_00"));
    }
}
