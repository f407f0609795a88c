//! Speaker diarization adapter and derived metrics
//!
//! The diarization model is gated: each call reads the bearer token
//! from the environment variable named in configuration and fails
//! when it is absent. The metrics (speaking ratio, interruptions,
//! time to first word) are computed locally from the segments.

use async_trait::async_trait;
use call_audit_config::ModelConfig;
use call_audit_core::{
    CallRecording, DiarizationOutcome, Error, Result, Diarizer, SpeakerLabel, SpeakerSegment,
};
use serde::Deserialize;

use crate::audio::encode_wav;

/// Diarization backend speaking the segmentation service's HTTP contract
pub struct HttpDiarizer {
    client: reqwest::Client,
    endpoint: String,
    token_env: String,
}

#[derive(Debug, Deserialize)]
struct DiarizeResponse {
    segments: Vec<SegmentDto>,
}

#[derive(Debug, Deserialize)]
struct SegmentDto {
    speaker: String,
    start: f64,
    end: f64,
}

impl HttpDiarizer {
    /// Build the adapter
    pub fn new(config: &ModelConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| Error::external("diarization", e.to_string()))?;

        Ok(Self {
            client,
            endpoint: config.diarization_endpoint.clone(),
            token_env: config.diarization_token_env.clone(),
        })
    }

    /// The gated model is checked per call, so the service can start
    /// without the credential.
    fn token(&self) -> Result<String> {
        std::env::var(&self.token_env).map_err(|_| {
            Error::Diarization(format!(
                "diarization token not found in environment variable {}",
                self.token_env
            ))
        })
    }
}

#[async_trait]
impl Diarizer for HttpDiarizer {
    async fn diarize(&self, recording: &CallRecording) -> Result<Vec<SpeakerSegment>> {
        let token = self.token()?;
        let body = encode_wav(recording)?;
        tracing::info!(
            call_id = %recording.id,
            bytes = body.len(),
            endpoint = %self.endpoint,
            "Sending audio for diarization"
        );

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&token)
            .header(reqwest::header::CONTENT_TYPE, "audio/wav")
            .body(body)
            .send()
            .await
            .map_err(|e| Error::Diarization(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Diarization(format!(
                "{} returned {}",
                self.endpoint, status
            )));
        }

        let parsed: DiarizeResponse = response
            .json()
            .await
            .map_err(|e| Error::Diarization(format!("bad response body: {}", e)))?;

        let segments = parsed
            .segments
            .into_iter()
            .map(|dto| SpeakerSegment::new(dto.speaker, dto.start, dto.end))
            .collect::<Vec<_>>();

        tracing::info!(
            call_id = %recording.id,
            segments = segments.len(),
            "Diarization complete"
        );
        Ok(segments)
    }

    fn model_name(&self) -> &str {
        "http-diarizer"
    }
}

/// Derive speaking metrics from diarization segments
///
/// The speaking ratio pairs the first two speakers by order of
/// appearance and is `None` when there are fewer than two. An
/// interruption is a speaker change that starts before the previous
/// segment ended.
pub fn summarize(segments: &[SpeakerSegment]) -> DiarizationOutcome {
    let mut total_time: Vec<(SpeakerLabel, f64)> = Vec::new();
    let mut interruptions = 0u32;
    let mut first_word: Option<f64> = None;
    let mut prev_speaker: Option<&SpeakerLabel> = None;
    let mut prev_end = 0.0_f64;

    for segment in segments {
        match total_time.iter_mut().find(|(s, _)| s == &segment.speaker) {
            Some((_, time)) => *time += segment.duration_secs(),
            None => total_time.push((segment.speaker.clone(), segment.duration_secs())),
        }

        if let Some(prev) = prev_speaker {
            if prev != &segment.speaker && segment.start_secs < prev_end {
                interruptions += 1;
            }
        }

        if first_word.is_none() {
            first_word = Some(segment.start_secs);
        }

        prev_speaker = Some(&segment.speaker);
        prev_end = segment.end_secs;
    }

    let speaking_ratio = if total_time.len() >= 2 && total_time[1].1 > 0.0 {
        Some(total_time[0].1 / total_time[1].1)
    } else {
        if !segments.is_empty() && total_time.len() < 2 {
            tracing::warn!("Only one speaker detected");
        }
        None
    };

    DiarizationOutcome {
        segments: segments.to_vec(),
        speaking_ratio,
        interruptions,
        time_to_first_word: first_word.unwrap_or(0.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segment(speaker: &str, start: f64, end: f64) -> SpeakerSegment {
        SpeakerSegment::new(speaker, start, end)
    }

    #[test]
    fn test_summarize_two_speakers() {
        let segments = vec![
            segment("SPEAKER_00", 0.5, 4.5),
            segment("SPEAKER_01", 4.5, 6.5),
            segment("SPEAKER_00", 6.5, 8.5),
        ];
        let outcome = summarize(&segments);
        // SPEAKER_00 spoke 6s, SPEAKER_01 spoke 2s.
        assert_eq!(outcome.speaking_ratio, Some(3.0));
        assert_eq!(outcome.interruptions, 0);
        assert_eq!(outcome.time_to_first_word, 0.5);
    }

    #[test]
    fn test_interruption_counted() {
        let segments = vec![
            segment("SPEAKER_00", 0.0, 5.0),
            segment("SPEAKER_01", 4.0, 6.0),
            segment("SPEAKER_00", 6.0, 7.0),
        ];
        let outcome = summarize(&segments);
        assert_eq!(outcome.interruptions, 1);
    }

    #[test]
    fn test_same_speaker_overlap_not_interruption() {
        let segments = vec![
            segment("SPEAKER_00", 0.0, 5.0),
            segment("SPEAKER_00", 4.0, 6.0),
        ];
        let outcome = summarize(&segments);
        assert_eq!(outcome.interruptions, 0);
    }

    #[test]
    fn test_single_speaker_has_no_ratio() {
        let segments = vec![segment("SPEAKER_00", 0.0, 5.0)];
        let outcome = summarize(&segments);
        assert_eq!(outcome.speaking_ratio, None);
    }

    #[test]
    fn test_empty_segments() {
        let outcome = summarize(&[]);
        assert!(outcome.segments.is_empty());
        assert_eq!(outcome.speaking_ratio, None);
        assert_eq!(outcome.time_to_first_word, 0.0);
    }

    #[test]
    fn test_ratio_uses_appearance_order() {
        // SPEAKER_01 appears first, so the ratio is theirs over SPEAKER_00.
        let segments = vec![
            segment("SPEAKER_01", 0.0, 2.0),
            segment("SPEAKER_00", 2.0, 6.0),
        ];
        let outcome = summarize(&segments);
        assert_eq!(outcome.speaking_ratio, Some(0.5));
    }
}
