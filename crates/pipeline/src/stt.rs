//! Speech-to-text adapter
//!
//! The model stays remote: audio goes out as WAV bytes, time-aligned
//! spans come back as JSON.

use async_trait::async_trait;
use call_audit_config::ModelConfig;
use call_audit_core::{CallRecording, Error, Result, SpeechToText, TranscriptSpan};
use serde::Deserialize;

use crate::audio::encode_wav;

/// STT backend speaking the transcription service's HTTP contract
pub struct HttpSpeechToText {
    client: reqwest::Client,
    endpoint: String,
}

#[derive(Debug, Deserialize)]
struct TranscribeResponse {
    spans: Vec<SpanDto>,
}

#[derive(Debug, Deserialize)]
struct SpanDto {
    text: String,
    start: f64,
    end: f64,
    #[serde(default = "default_confidence")]
    confidence: f32,
}

fn default_confidence() -> f32 {
    1.0
}

impl HttpSpeechToText {
    /// Build the adapter from model configuration
    pub fn new(config: &ModelConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| Error::external("stt", e.to_string()))?;

        Ok(Self {
            client,
            endpoint: config.stt_endpoint.clone(),
        })
    }
}

#[async_trait]
impl SpeechToText for HttpSpeechToText {
    async fn transcribe(&self, recording: &CallRecording) -> Result<Vec<TranscriptSpan>> {
        let body = encode_wav(recording)?;
        tracing::info!(
            call_id = %recording.id,
            bytes = body.len(),
            endpoint = %self.endpoint,
            "Sending audio for transcription"
        );

        let response = self
            .client
            .post(&self.endpoint)
            .header(reqwest::header::CONTENT_TYPE, "audio/wav")
            .body(body)
            .send()
            .await
            .map_err(|e| Error::Transcription(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Transcription(format!(
                "{} returned {}",
                self.endpoint, status
            )));
        }

        let parsed: TranscribeResponse = response
            .json()
            .await
            .map_err(|e| Error::Transcription(format!("bad response body: {}", e)))?;

        let spans = parsed
            .spans
            .into_iter()
            .map(|dto| {
                TranscriptSpan::new(dto.text, dto.start, dto.end).with_confidence(dto.confidence)
            })
            .collect::<Vec<_>>();

        tracing::info!(call_id = %recording.id, spans = spans.len(), "Transcription complete");
        Ok(spans)
    }

    fn model_name(&self) -> &str {
        "http-stt"
    }
}
