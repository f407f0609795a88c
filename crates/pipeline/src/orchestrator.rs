//! Pipeline orchestration
//!
//! `CallProcessor` owns the model adapters and the compiled analysis
//! stages, runs them in the order the original workflow defines, and
//! streams a `StageEvent` per completed step. A failed stage emits an
//! error event and the run continues with whatever can still be
//! computed.

use std::collections::BTreeSet;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Instant;

use async_stream::stream;
use call_audit_analysis::{
    sentiment_result, speaking_stats, Categorizer, LexiconSentimentScorer, PhraseChecker,
    PiiDetector, ProfanityFilter, WordListLexicon,
};
use call_audit_config::{AnalysisRules, Settings};
use call_audit_core::{
    full_text, CallRecording, CallReport, CategoryResult, DiarizationOutcome, Diarizer, Error,
    MaskStyle, PhraseCheckResult, PiiCheckResult, ProfanityCheckResult, Result, SentimentResult,
    SentimentScorer, SpeakingStats, SpeechToText, SummaryTable, TranscriptSpan,
};
use futures::{Stream, StreamExt};
use metrics::{counter, histogram};
use serde::{Deserialize, Serialize};

use crate::alignment::align;
use crate::diarizer::{summarize, HttpDiarizer};
use crate::stt::HttpSpeechToText;

const STAGE_SECONDS: &str = "call_audit_stage_duration_seconds";
const STAGE_ERRORS: &str = "call_audit_stage_errors_total";

/// A selectable processing task
///
/// Serialized names match what the UIs send.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Task {
    #[serde(rename = "Transcription")]
    Transcription,
    #[serde(rename = "Speaker Diarization")]
    SpeakerDiarization,
    #[serde(rename = "Speaking Speed")]
    SpeakingSpeed,
    #[serde(rename = "PII Check")]
    PiiCheck,
    #[serde(rename = "Profanity Check")]
    ProfanityCheck,
    #[serde(rename = "Required Phrases")]
    RequiredPhrases,
    #[serde(rename = "Sentiment Analysis")]
    SentimentAnalysis,
    #[serde(rename = "Call Category")]
    CallCategory,
}

impl Task {
    /// Every task, in pipeline order
    pub const ALL: [Task; 8] = [
        Task::Transcription,
        Task::SpeakerDiarization,
        Task::SpeakingSpeed,
        Task::PiiCheck,
        Task::ProfanityCheck,
        Task::RequiredPhrases,
        Task::SentimentAnalysis,
        Task::CallCategory,
    ];

    /// Human-readable label (the wire name)
    pub fn label(&self) -> &'static str {
        match self {
            Self::Transcription => "Transcription",
            Self::SpeakerDiarization => "Speaker Diarization",
            Self::SpeakingSpeed => "Speaking Speed",
            Self::PiiCheck => "PII Check",
            Self::ProfanityCheck => "Profanity Check",
            Self::RequiredPhrases => "Required Phrases",
            Self::SentimentAnalysis => "Sentiment Analysis",
            Self::CallCategory => "Call Category",
        }
    }
}

impl FromStr for Task {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .find(|task| task.label().eq_ignore_ascii_case(s.trim()))
            .copied()
            .ok_or_else(|| Error::InvalidInput(format!("Unknown task '{}'", s)))
    }
}

/// The set of tasks to run for one call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskSelection(BTreeSet<Task>);

impl TaskSelection {
    /// Select every task
    pub fn all() -> Self {
        Self(Task::ALL.into_iter().collect())
    }

    /// True when the task was requested
    pub fn contains(&self, task: Task) -> bool {
        self.0.contains(&task)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for TaskSelection {
    fn default() -> Self {
        Self::all()
    }
}

impl FromIterator<Task> for TaskSelection {
    fn from_iter<I: IntoIterator<Item = Task>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// One completed (or failed) pipeline step
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "step", content = "result", rename_all = "snake_case")]
pub enum StageEvent {
    Transcription(String),
    Diarization(DiarizationOutcome),
    SpeakingSpeed(SpeakingStats),
    Pii(PiiCheckResult),
    Profanity(ProfanityCheckResult),
    RequiredPhrases(PhraseCheckResult),
    Sentiment(SentimentResult),
    Category(CategoryResult),
    Summary(SummaryTable),
    Complete(Box<CallReport>),
    Error { stage: String, message: String },
}

impl StageEvent {
    /// Step name as it appears on the wire
    pub fn step(&self) -> &'static str {
        match self {
            Self::Transcription(_) => "transcription",
            Self::Diarization(_) => "diarization",
            Self::SpeakingSpeed(_) => "speaking_speed",
            Self::Pii(_) => "pii",
            Self::Profanity(_) => "profanity",
            Self::RequiredPhrases(_) => "required_phrases",
            Self::Sentiment(_) => "sentiment",
            Self::Category(_) => "category",
            Self::Summary(_) => "summary",
            Self::Complete(_) => "complete",
            Self::Error { .. } => "error",
        }
    }
}

/// Runs the full audit pipeline for one call
pub struct CallProcessor {
    stt: Arc<dyn SpeechToText>,
    diarizer: Arc<dyn Diarizer>,
    sentiment: Arc<dyn SentimentScorer>,
    phrases: PhraseChecker,
    pii: PiiDetector,
    profanity: ProfanityFilter,
    categorizer: Categorizer,
}

impl CallProcessor {
    /// Build a processor from explicit backends and rules
    pub fn new(
        stt: Arc<dyn SpeechToText>,
        diarizer: Arc<dyn Diarizer>,
        sentiment: Arc<dyn SentimentScorer>,
        rules: &AnalysisRules,
        mask: MaskStyle,
    ) -> Result<Self> {
        Ok(Self {
            stt,
            diarizer,
            sentiment,
            phrases: PhraseChecker::new(rules)?,
            pii: PiiDetector::new(rules, mask)?,
            profanity: ProfanityFilter::new(Arc::new(WordListLexicon::with_defaults(
                &rules.profanity_words,
            ))),
            categorizer: Categorizer::new(rules),
        })
    }

    /// Build a processor with the HTTP model backends from settings
    pub fn with_http_backends(settings: &Settings, rules: &AnalysisRules) -> Result<Self> {
        let mask = MaskStyle::from_str(&settings.analysis.mask_style)?;
        Self::new(
            Arc::new(HttpSpeechToText::new(&settings.models)?),
            Arc::new(HttpDiarizer::new(&settings.models)?),
            Arc::new(LexiconSentimentScorer),
            rules,
            mask,
        )
    }

    /// Run the pipeline, yielding an event per completed step
    ///
    /// Step order follows the original workflow: transcription,
    /// diarization, speaking speed, PII, profanity, required phrases,
    /// sentiment, category, then the summary table and the final
    /// report.
    pub fn stream<'a>(
        &'a self,
        recording: &'a CallRecording,
        tasks: &'a TaskSelection,
    ) -> impl Stream<Item = StageEvent> + Send + 'a {
        stream! {
            let mut report = CallReport::new(recording.id.clone());
            let mut spans: Vec<TranscriptSpan> = Vec::new();
            let mut text = String::new();
            let mut transcribed = false;

            // Transcription feeds every text stage, so it always runs.
            let started = Instant::now();
            match self.stt.transcribe(recording).await {
                Ok(result) => {
                    histogram!(STAGE_SECONDS, "stage" => "transcription")
                        .record(started.elapsed().as_secs_f64());
                    spans = result;
                    text = full_text(&spans);
                    transcribed = true;
                    report.transcription = Some(text.clone());
                    if tasks.contains(Task::Transcription) {
                        yield StageEvent::Transcription(text.clone());
                    }
                }
                Err(e) => {
                    counter!(STAGE_ERRORS, "stage" => "transcription").increment(1);
                    tracing::error!(call_id = %recording.id, error = %e, "Transcription failed");
                    yield StageEvent::Error {
                        stage: "transcription".to_string(),
                        message: e.to_string(),
                    };
                }
            }

            // Speaking speed needs segments too, so either task
            // triggers the diarization call.
            let mut diarization: Option<DiarizationOutcome> = None;
            if tasks.contains(Task::SpeakerDiarization) || tasks.contains(Task::SpeakingSpeed) {
                let started = Instant::now();
                match self.diarizer.diarize(recording).await {
                    Ok(segments) => {
                        histogram!(STAGE_SECONDS, "stage" => "diarization")
                            .record(started.elapsed().as_secs_f64());
                        let outcome = summarize(&segments);
                        report.diarization = Some(outcome.clone());
                        if tasks.contains(Task::SpeakerDiarization) {
                            yield StageEvent::Diarization(outcome.clone());
                        }
                        diarization = Some(outcome);
                    }
                    Err(e) => {
                        counter!(STAGE_ERRORS, "stage" => "diarization").increment(1);
                        tracing::error!(call_id = %recording.id, error = %e, "Diarization failed");
                        yield StageEvent::Error {
                            stage: "diarization".to_string(),
                            message: e.to_string(),
                        };
                    }
                }
            }

            let segments = diarization
                .as_ref()
                .map(|d| d.segments.as_slice())
                .unwrap_or(&[]);
            let turns = align(&spans, segments);
            report.turns = turns.clone();

            if tasks.contains(Task::SpeakingSpeed) && transcribed && diarization.is_some() {
                let stats = speaking_stats(&turns, diarization.as_ref());
                report.speaking = Some(stats.clone());
                yield StageEvent::SpeakingSpeed(stats);
            }

            if transcribed {
                if tasks.contains(Task::PiiCheck) {
                    let result = self.pii.check(&text);
                    report.pii = Some(result.clone());
                    yield StageEvent::Pii(result);
                }

                if tasks.contains(Task::ProfanityCheck) {
                    let result = self.profanity.check(&text);
                    report.profanity = Some(result.clone());
                    yield StageEvent::Profanity(result);
                }

                if tasks.contains(Task::RequiredPhrases) {
                    let result = self.phrases.check(&text);
                    report.required_phrases = Some(result.clone());
                    yield StageEvent::RequiredPhrases(result);
                }

                if tasks.contains(Task::SentimentAnalysis) {
                    let started = Instant::now();
                    match sentiment_result(self.sentiment.as_ref(), &text, &turns).await {
                        Ok(result) => {
                            histogram!(STAGE_SECONDS, "stage" => "sentiment")
                                .record(started.elapsed().as_secs_f64());
                            report.sentiment = Some(result.clone());
                            yield StageEvent::Sentiment(result);
                        }
                        Err(e) => {
                            counter!(STAGE_ERRORS, "stage" => "sentiment").increment(1);
                            tracing::error!(call_id = %recording.id, error = %e, "Sentiment failed");
                            yield StageEvent::Error {
                                stage: "sentiment".to_string(),
                                message: e.to_string(),
                            };
                        }
                    }
                }

                if tasks.contains(Task::CallCategory) {
                    let result = self.categorizer.categorize(&text);
                    report.category = Some(result.clone());
                    yield StageEvent::Category(result);
                }
            }

            yield StageEvent::Summary(report.summary_table());

            counter!("call_audit_calls_total").increment(1);
            tracing::info!(call_id = %report.call_id, "Call processing completed");
            yield StageEvent::Complete(Box::new(report));
        }
    }

    /// Run the pipeline to completion and return the report
    pub async fn process(
        &self,
        recording: &CallRecording,
        tasks: &TaskSelection,
    ) -> Result<CallReport> {
        let stream = self.stream(recording, tasks);
        tokio::pin!(stream);

        let mut report = None;
        while let Some(event) = stream.next().await {
            if let StageEvent::Complete(done) = event {
                report = Some(*done);
            }
        }

        report.ok_or_else(|| Error::InvalidInput("pipeline produced no report".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use call_audit_core::SpeakerSegment;

    struct MockStt {
        fail: bool,
    }

    #[async_trait]
    impl SpeechToText for MockStt {
        async fn transcribe(&self, _recording: &CallRecording) -> Result<Vec<TranscriptSpan>> {
            if self.fail {
                return Err(Error::Transcription("stt offline".to_string()));
            }
            Ok(vec![
                TranscriptSpan::new("thank you for calling how can I help", 0.0, 3.0),
                TranscriptSpan::new("my bill is wrong and I am upset", 3.0, 6.0),
            ])
        }

        fn model_name(&self) -> &str {
            "mock-stt"
        }
    }

    struct MockDiarizer {
        fail: bool,
    }

    #[async_trait]
    impl Diarizer for MockDiarizer {
        async fn diarize(&self, _recording: &CallRecording) -> Result<Vec<SpeakerSegment>> {
            if self.fail {
                return Err(Error::Diarization("diarizer offline".to_string()));
            }
            Ok(vec![
                SpeakerSegment::new("SPEAKER_00", 0.0, 3.0),
                SpeakerSegment::new("SPEAKER_01", 3.0, 6.0),
            ])
        }

        fn model_name(&self) -> &str {
            "mock-diarizer"
        }
    }

    fn processor(stt_fail: bool, diarizer_fail: bool) -> CallProcessor {
        CallProcessor::new(
            Arc::new(MockStt { fail: stt_fail }),
            Arc::new(MockDiarizer {
                fail: diarizer_fail,
            }),
            Arc::new(LexiconSentimentScorer),
            &AnalysisRules::default(),
            MaskStyle::Fixed,
        )
        .unwrap()
    }

    fn recording() -> CallRecording {
        CallRecording::new(vec![0.0; 16_000], 16_000)
    }

    async fn collect(processor: &CallProcessor, tasks: &TaskSelection) -> Vec<StageEvent> {
        let recording = recording();
        let stream = processor.stream(&recording, tasks);
        tokio::pin!(stream);
        let mut events = Vec::new();
        while let Some(event) = stream.next().await {
            events.push(event);
        }
        events
    }

    #[tokio::test]
    async fn test_all_tasks_emit_in_order() {
        let events = collect(&processor(false, false), &TaskSelection::all()).await;
        let steps: Vec<&str> = events.iter().map(|e| e.step()).collect();
        assert_eq!(
            steps,
            vec![
                "transcription",
                "diarization",
                "speaking_speed",
                "pii",
                "profanity",
                "required_phrases",
                "sentiment",
                "category",
                "summary",
                "complete",
            ]
        );
    }

    #[tokio::test]
    async fn test_report_carries_every_stage() {
        let processor = processor(false, false);
        let report = processor
            .process(&recording(), &TaskSelection::all())
            .await
            .unwrap();
        assert!(report.transcription.is_some());
        assert!(report.diarization.is_some());
        assert!(report.speaking.is_some());
        assert!(report.pii.is_some());
        assert!(report.profanity.is_some());
        assert!(report.required_phrases.is_some());
        assert!(report.sentiment.is_some());
        assert_eq!(report.category.as_ref().unwrap().category, "Billing");
        assert_eq!(report.turns.len(), 2);
    }

    #[tokio::test]
    async fn test_stt_failure_skips_text_stages() {
        let events = collect(&processor(true, false), &TaskSelection::all()).await;
        let steps: Vec<&str> = events.iter().map(|e| e.step()).collect();
        assert_eq!(steps[0], "error");
        assert!(steps.contains(&"diarization"));
        assert!(!steps.contains(&"pii"));
        assert!(steps.contains(&"complete"));
    }

    #[tokio::test]
    async fn test_diarizer_failure_still_analyzes_text() {
        let events = collect(&processor(false, true), &TaskSelection::all()).await;
        let steps: Vec<&str> = events.iter().map(|e| e.step()).collect();
        assert!(steps.contains(&"error"));
        assert!(steps.contains(&"pii"));
        assert!(!steps.contains(&"speaking_speed"));
        assert!(steps.contains(&"complete"));
    }

    #[tokio::test]
    async fn test_task_gating() {
        let tasks: TaskSelection = [Task::PiiCheck].into_iter().collect();
        let events = collect(&processor(false, false), &tasks).await;
        let steps: Vec<&str> = events.iter().map(|e| e.step()).collect();
        assert_eq!(steps, vec!["pii", "summary", "complete"]);
    }

    #[tokio::test]
    async fn test_speaking_speed_triggers_diarization() {
        let tasks: TaskSelection = [Task::SpeakingSpeed].into_iter().collect();
        let processor = processor(false, false);
        let report = processor.process(&recording(), &tasks).await.unwrap();
        // Diarization ran for the metrics but was not requested as output.
        assert!(report.speaking.is_some());
        assert_eq!(
            report.speaking.as_ref().unwrap().per_speaker.len(),
            2
        );
    }

    #[test]
    fn test_task_labels_round_trip() {
        for task in Task::ALL {
            assert_eq!(Task::from_str(task.label()).unwrap(), task);
        }
        assert!(Task::from_str("Nonsense").is_err());
    }

    #[test]
    fn test_event_serialization_shape() {
        let event = StageEvent::Transcription("hello".to_string());
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["step"], "transcription");
        assert_eq!(json["result"], "hello");
    }
}
