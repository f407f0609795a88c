//! Speech processing traits

use async_trait::async_trait;

use crate::audio::CallRecording;
use crate::diarization::SpeakerSegment;
use crate::transcript::TranscriptSpan;
use crate::Result;

/// Speech-to-Text interface
///
/// Implementations:
/// - `HttpSpeechToText` - posts audio to an external STT service
/// - Mock transcribers in tests
///
/// # Example
///
/// ```ignore
/// let stt: Box<dyn SpeechToText> = Box::new(HttpSpeechToText::new(config));
/// let spans = stt.transcribe(&recording).await?;
/// println!("First span: {}", spans[0].text);
/// ```
#[async_trait]
pub trait SpeechToText: Send + Sync + 'static {
    /// Transcribe a full recording
    ///
    /// # Arguments
    /// * `recording` - Decoded call recording
    ///
    /// # Returns
    /// Time-aligned transcript spans in call order
    async fn transcribe(&self, recording: &CallRecording) -> Result<Vec<TranscriptSpan>>;

    /// Get model name for logging
    fn model_name(&self) -> &str;
}

/// Speaker diarization interface
///
/// Implementations:
/// - `HttpDiarizer` - posts audio to an external diarization service
///   (gated model, credential from the environment)
///
/// # Example
///
/// ```ignore
/// let diarizer: Box<dyn Diarizer> = Box::new(HttpDiarizer::new(config)?);
/// let segments = diarizer.diarize(&recording).await?;
/// ```
#[async_trait]
pub trait Diarizer: Send + Sync + 'static {
    /// Partition a recording into speaker-labelled time segments
    ///
    /// # Arguments
    /// * `recording` - Decoded call recording
    ///
    /// # Returns
    /// Speaker segments in time order
    async fn diarize(&self, recording: &CallRecording) -> Result<Vec<SpeakerSegment>>;

    /// Get model name for logging
    fn model_name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct MockStt;

    #[async_trait]
    impl SpeechToText for MockStt {
        async fn transcribe(&self, _recording: &CallRecording) -> Result<Vec<TranscriptSpan>> {
            Ok(vec![TranscriptSpan::new("test transcription", 0.0, 1.0)])
        }

        fn model_name(&self) -> &str {
            "mock-stt"
        }
    }

    #[tokio::test]
    async fn test_mock_transcriber() {
        let stt = MockStt;
        let recording = CallRecording::new(vec![0.0; 16_000], 16_000);
        let spans = stt.transcribe(&recording).await.unwrap();
        assert_eq!(spans.len(), 1);
        assert_eq!(stt.model_name(), "mock-stt");
    }
}
