//! Call audit pipeline
//!
//! Ties the pieces together: audio ingestion, the external model
//! adapters (STT, diarization), time-overlap alignment, and the
//! orchestrator that runs the analysis stages and streams stage
//! events.

pub mod alignment;
pub mod audio;
pub mod diarizer;
pub mod orchestrator;
pub mod stt;

pub use alignment::align;
pub use audio::{encode_wav, ingest, load_wav, resample};
pub use diarizer::{summarize, HttpDiarizer};
pub use orchestrator::{CallProcessor, StageEvent, Task, TaskSelection};
pub use stt::HttpSpeechToText;
