//! Audio ingestion
//!
//! WAV decode via hound, mixdown to mono f32, and resampling to the
//! rate the model services expect.

use std::io::Cursor;
use std::path::Path;

use call_audit_core::{CallRecording, Error, Result};
use rubato::{FftFixedIn, Resampler};

/// Load a WAV file as a mono recording
pub fn load_wav(path: impl AsRef<Path>) -> Result<CallRecording> {
    let path = path.as_ref();
    let mut reader = hound::WavReader::open(path)
        .map_err(|e| Error::AudioDecode(format!("{}: {}", path.display(), e)))?;
    let spec = reader.spec();

    let samples: Vec<f32> = match (spec.sample_format, spec.bits_per_sample) {
        (hound::SampleFormat::Float, 32) => reader
            .samples::<f32>()
            .collect::<std::result::Result<_, _>>()
            .map_err(|e| Error::AudioDecode(e.to_string()))?,
        (hound::SampleFormat::Int, 16) => reader
            .samples::<i16>()
            .map(|s| s.map(|v| v as f32 / i16::MAX as f32))
            .collect::<std::result::Result<_, _>>()
            .map_err(|e| Error::AudioDecode(e.to_string()))?,
        (hound::SampleFormat::Int, bits @ (24 | 32)) => {
            let scale = (1i64 << (bits - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect::<std::result::Result<_, _>>()
                .map_err(|e| Error::AudioDecode(e.to_string()))?
        }
        (format, bits) => {
            return Err(Error::UnsupportedAudio(format!(
                "{:?} samples at {} bits",
                format, bits
            )))
        }
    };

    let mono = mixdown(&samples, spec.channels);
    if mono.is_empty() {
        return Err(Error::InvalidInput(format!(
            "{}: recording contains no audio",
            path.display()
        )));
    }

    tracing::debug!(
        path = %path.display(),
        sample_rate = spec.sample_rate,
        channels = spec.channels,
        samples = mono.len(),
        "Decoded WAV file"
    );

    Ok(CallRecording::new(mono, spec.sample_rate).with_source(path))
}

/// Average interleaved channels into mono
fn mixdown(samples: &[f32], channels: u16) -> Vec<f32> {
    if channels <= 1 {
        return samples.to_vec();
    }
    let channels = channels as usize;
    samples
        .chunks_exact(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect()
}

/// FFT resampler input chunk size
const RESAMPLE_CHUNK: usize = 1024;

/// Resample mono audio between rates
///
/// FFT-based via rubato; inputs shorter than one chunk fall back to
/// linear interpolation.
pub fn resample(input: &[f32], from_rate: u32, to_rate: u32) -> Result<Vec<f32>> {
    if input.is_empty() || from_rate == to_rate {
        return Ok(input.to_vec());
    }

    if input.len() < RESAMPLE_CHUNK {
        return Ok(resample_linear(input, from_rate, to_rate));
    }

    let samples: Vec<f64> = input.iter().map(|&s| s as f64).collect();
    let mut resampler = FftFixedIn::<f64>::new(
        from_rate as usize,
        to_rate as usize,
        RESAMPLE_CHUNK,
        2,
        1,
    )
    .map_err(|e| Error::AudioDecode(format!("resampler setup failed: {}", e)))?;

    let expected = (input.len() as f64 * to_rate as f64 / from_rate as f64) as usize;
    let mut output = Vec::with_capacity(expected + RESAMPLE_CHUNK);

    let mut chunks = samples.chunks_exact(RESAMPLE_CHUNK);
    for chunk in &mut chunks {
        let frames = resampler
            .process(&[chunk.to_vec()], None)
            .map_err(|e| Error::AudioDecode(format!("resampling failed: {}", e)))?;
        output.extend(frames[0].iter().map(|&s| s as f32));
    }

    let tail = chunks.remainder();
    if !tail.is_empty() {
        let frames = resampler
            .process_partial(Some(&[tail.to_vec()]), None)
            .map_err(|e| Error::AudioDecode(format!("resampling failed: {}", e)))?;
        output.extend(frames[0].iter().map(|&s| s as f32));
    }

    Ok(output)
}

/// Linear interpolation for inputs too short for the FFT resampler
fn resample_linear(input: &[f32], from_rate: u32, to_rate: u32) -> Vec<f32> {
    let ratio = to_rate as f64 / from_rate as f64;
    let new_len = (input.len() as f64 * ratio) as usize;

    let mut resampled = Vec::with_capacity(new_len);
    for i in 0..new_len {
        let src_idx = i as f64 / ratio;
        let idx_floor = src_idx.floor() as usize;
        let idx_ceil = (idx_floor + 1).min(input.len().saturating_sub(1));
        let frac = (src_idx - idx_floor as f64) as f32;

        resampled.push(input[idx_floor] * (1.0 - frac) + input[idx_ceil] * frac);
    }
    resampled
}

/// Load a recording and normalize it to the target sample rate
pub fn ingest(path: impl AsRef<Path>, target_rate: u32) -> Result<CallRecording> {
    let recording = load_wav(path)?;
    if recording.sample_rate == target_rate {
        return Ok(recording);
    }

    let resampled = resample(&recording.samples, recording.sample_rate, target_rate)?;
    tracing::debug!(
        from = recording.sample_rate,
        to = target_rate,
        "Resampled recording"
    );

    Ok(CallRecording {
        id: recording.id,
        source: recording.source,
        samples: resampled,
        sample_rate: target_rate,
    })
}

/// Encode a recording as 16-bit PCM WAV bytes for the model services
pub fn encode_wav(recording: &CallRecording) -> Result<Vec<u8>> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: recording.sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec)
            .map_err(|e| Error::AudioDecode(format!("WAV encode failed: {}", e)))?;
        for sample in &recording.samples {
            let value = (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
            writer
                .write_sample(value)
                .map_err(|e| Error::AudioDecode(format!("WAV encode failed: {}", e)))?;
        }
        writer
            .finalize()
            .map_err(|e| Error::AudioDecode(format!("WAV encode failed: {}", e)))?;
    }

    Ok(cursor.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_test_wav(path: &Path, channels: u16, sample_rate: u32, frames: usize) {
        let spec = hound::WavSpec {
            channels,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec).unwrap();
        for i in 0..frames {
            for _ in 0..channels {
                writer.write_sample(((i % 100) as i16) * 100).unwrap();
            }
        }
        writer.finalize().unwrap();
    }

    #[test]
    fn test_load_wav_mono() {
        let path = std::env::temp_dir().join("call_audit_test_mono.wav");
        write_test_wav(&path, 1, 16_000, 16_000);
        let recording = load_wav(&path).unwrap();
        assert_eq!(recording.sample_rate, 16_000);
        assert_eq!(recording.samples.len(), 16_000);
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_load_wav_stereo_mixdown() {
        let path = std::env::temp_dir().join("call_audit_test_stereo.wav");
        write_test_wav(&path, 2, 8_000, 4_000);
        let recording = load_wav(&path).unwrap();
        assert_eq!(recording.samples.len(), 4_000);
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_missing_file_is_decode_error() {
        let err = load_wav("/nonexistent/audio.wav").unwrap_err();
        assert!(matches!(err, Error::AudioDecode(_)));
    }

    #[test]
    fn test_resample_identity() {
        let input = vec![0.5_f32; 1000];
        let output = resample(&input, 16_000, 16_000).unwrap();
        assert_eq!(output, input);
    }

    #[test]
    fn test_resample_halves_length() {
        let input = vec![0.1_f32; 16_000];
        let output = resample(&input, 16_000, 8_000).unwrap();
        // Output length tracks the rate ratio, give or take filter edges.
        assert!((output.len() as i64 - 8_000).abs() < RESAMPLE_CHUNK as i64);
    }

    #[test]
    fn test_resample_short_input_linear() {
        let input = vec![0.5_f32; 100];
        let output = resample(&input, 16_000, 8_000).unwrap();
        assert_eq!(output.len(), 50);
        assert!((output[25] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_encode_round_trip() {
        let recording = CallRecording::new(vec![0.0, 0.25, -0.25, 1.0], 16_000);
        let bytes = encode_wav(&recording).unwrap();
        let reader = hound::WavReader::new(Cursor::new(bytes)).unwrap();
        assert_eq!(reader.spec().channels, 1);
        assert_eq!(reader.spec().sample_rate, 16_000);
        assert_eq!(reader.len(), 4);
    }
}
