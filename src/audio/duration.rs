//! Best-effort audio duration probes
//!
//! Durations are informational only; callers treat failures as warnings.

use std::io::Cursor;
use std::path::Path;

use crate::{Error, Result};

/// Duration in seconds of a WAV file
///
/// # Errors
///
/// Returns error if the file is not a readable WAV.
#[allow(clippy::cast_precision_loss)]
pub fn wav_seconds(path: &Path) -> Result<f32> {
    let reader = hound::WavReader::open(path).map_err(|e| Error::Audio(e.to_string()))?;
    let spec = reader.spec();

    if spec.sample_rate == 0 {
        return Err(Error::Audio("WAV reports zero sample rate".to_string()));
    }

    Ok(reader.duration() as f32 / spec.sample_rate as f32)
}

/// Duration in seconds of an MP3 buffer, by walking its frames
///
/// # Errors
///
/// Returns error if the buffer contains no decodable frames.
#[allow(clippy::cast_precision_loss, clippy::cast_sign_loss)]
pub fn mp3_seconds(data: &[u8]) -> Result<f32> {
    let mut decoder = minimp3::Decoder::new(Cursor::new(data));
    let mut samples_per_channel = 0usize;
    let mut sample_rate = 0i32;

    loop {
        match decoder.next_frame() {
            Ok(frame) => {
                sample_rate = frame.sample_rate;
                samples_per_channel += frame.data.len() / frame.channels.max(1);
            }
            Err(minimp3::Error::Eof) => break,
            Err(e) => return Err(Error::Audio(format!("MP3 decode error: {e}"))),
        }
    }

    if sample_rate <= 0 || samples_per_channel == 0 {
        return Err(Error::Audio("MP3 contains no audio frames".to_string()));
    }

    Ok(samples_per_channel as f32 / sample_rate as f32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::CANONICAL_SAMPLE_RATE;

    #[test]
    fn wav_duration_matches_sample_count() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tone.wav");

        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: CANONICAL_SAMPLE_RATE,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(&path, spec).unwrap();
        // Exactly two seconds of samples
        for _ in 0..CANONICAL_SAMPLE_RATE * 2 {
            writer.write_sample(0i16).unwrap();
        }
        writer.finalize().unwrap();

        let secs = wav_seconds(&path).unwrap();
        assert!((secs - 2.0).abs() < f32::EPSILON);
    }

    #[test]
    fn unreadable_wav_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("garbage.wav");
        std::fs::write(&path, b"definitely not audio").unwrap();
        assert!(wav_seconds(&path).is_err());
    }

    #[test]
    fn empty_mp3_is_an_error() {
        assert!(mp3_seconds(&[]).is_err());
        assert!(mp3_seconds(b"not an mp3").is_err());
    }
}
