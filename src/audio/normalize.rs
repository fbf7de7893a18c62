//! Format normalization via an external transcoder
//!
//! Two conditional passes: a metadata-only container repair for m4a uploads
//! (the resampler cannot seek a stream whose index trails the data), then a
//! resample to the canonical waveform the recognition service requires.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::{Error, Result};

use super::{AudioFormat, CANONICAL_CHANNELS, CANONICAL_SAMPLE_RATE, Scratch, StagedUpload};

/// External audio transcoder
#[async_trait]
pub trait Transcoder: Send + Sync {
    /// Re-wrap the container without re-encoding, relocating metadata so the
    /// stream is seekable
    ///
    /// # Errors
    ///
    /// Returns error if the transcoder fails
    async fn remux_faststart(&self, input: &Path, output: &Path) -> Result<()>;

    /// Resample to the canonical waveform (16kHz mono PCM)
    ///
    /// # Errors
    ///
    /// Returns error if the transcoder fails
    async fn resample(&self, input: &Path, output: &Path) -> Result<()>;
}

/// Transcoder backed by the ffmpeg command-line tool
pub struct FfmpegTranscoder {
    program: PathBuf,
}

impl FfmpegTranscoder {
    /// Create a transcoder, discovering ffmpeg on PATH unless an explicit
    /// path is configured
    ///
    /// # Errors
    ///
    /// Returns error if ffmpeg cannot be found
    pub fn discover(configured: Option<&Path>) -> Result<Self> {
        let program = match configured {
            Some(path) => path.to_path_buf(),
            None => which::which("ffmpeg")
                .map_err(|_| Error::Config("ffmpeg not found on PATH".to_string()))?,
        };

        tracing::debug!(program = %program.display(), "transcoder initialized");
        Ok(Self { program })
    }

    /// Run ffmpeg and surface its stderr verbatim on failure
    async fn run(&self, args: &[&str]) -> Result<()> {
        let output = tokio::process::Command::new(&self.program)
            .args(args)
            .output()
            .await
            .map_err(|e| Error::Transcode(format!("failed to run ffmpeg: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::Transcode(stderr.trim().to_string()));
        }

        Ok(())
    }
}

#[async_trait]
impl Transcoder for FfmpegTranscoder {
    async fn remux_faststart(&self, input: &Path, output: &Path) -> Result<()> {
        tracing::debug!(input = %input.display(), "repairing container metadata");
        let input = input.to_string_lossy();
        let output = output.to_string_lossy();
        self.run(&[
            "-nostdin",
            "-y",
            "-i",
            &input,
            "-c",
            "copy",
            "-movflags",
            "faststart",
            &output,
        ])
        .await
    }

    async fn resample(&self, input: &Path, output: &Path) -> Result<()> {
        tracing::debug!(
            input = %input.display(),
            sample_rate = CANONICAL_SAMPLE_RATE,
            channels = CANONICAL_CHANNELS,
            "resampling to canonical waveform"
        );
        let input = input.to_string_lossy();
        let output = output.to_string_lossy();
        let rate = CANONICAL_SAMPLE_RATE.to_string();
        let channels = CANONICAL_CHANNELS.to_string();
        self.run(&[
            "-nostdin", "-y", "-i", &input, "-ar", &rate, "-ac", &channels, &output,
        ])
        .await
    }
}

/// Check whether a file is already a canonical waveform
/// (16kHz, mono, 16-bit integer PCM WAV)
#[must_use]
pub fn is_canonical_wav(path: &Path) -> bool {
    hound::WavReader::open(path).is_ok_and(|reader| {
        let spec = reader.spec();
        spec.sample_rate == CANONICAL_SAMPLE_RATE
            && spec.channels == CANONICAL_CHANNELS
            && spec.bits_per_sample == 16
            && spec.sample_format == hound::SampleFormat::Int
    })
}

/// Normalize a staged upload into the canonical waveform.
///
/// Runs the container repair for m4a uploads, then resamples. A WAV upload
/// that already matches the canonical contract is used as-is, so repeating
/// normalization on canonical input is a byte-identical no-op.
///
/// # Errors
///
/// Returns `Transcode` with the tool's stderr if either pass fails.
pub async fn to_canonical(
    transcoder: &dyn Transcoder,
    scratch: &Scratch,
    staged: &StagedUpload,
) -> Result<PathBuf> {
    let mut current = staged.path().to_path_buf();

    if staged.format() == AudioFormat::M4a {
        let repaired = scratch.path().join("repaired.m4a");
        transcoder.remux_faststart(&current, &repaired).await?;
        current = repaired;
    }

    if staged.format() == AudioFormat::Wav && is_canonical_wav(&current) {
        tracing::debug!("upload already canonical, skipping resample");
        return Ok(current);
    }

    let canonical = scratch.path().join("canonical.wav");
    transcoder.resample(&current, &canonical).await?;
    Ok(canonical)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_wav(path: &Path, sample_rate: u32, channels: u16) {
        let spec = hound::WavSpec {
            channels,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec).unwrap();
        for i in 0..sample_rate / 10 {
            writer.write_sample(i16::try_from(i % 128).unwrap()).unwrap();
        }
        writer.finalize().unwrap();
    }

    #[test]
    fn canonical_wav_is_detected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.wav");
        write_wav(&path, CANONICAL_SAMPLE_RATE, 1);
        assert!(is_canonical_wav(&path));
    }

    #[test]
    fn wrong_rate_or_channels_is_not_canonical() {
        let dir = tempfile::tempdir().unwrap();

        let hi_rate = dir.path().join("hi.wav");
        write_wav(&hi_rate, 44100, 1);
        assert!(!is_canonical_wav(&hi_rate));

        let stereo = dir.path().join("stereo.wav");
        write_wav(&stereo, CANONICAL_SAMPLE_RATE, 2);
        assert!(!is_canonical_wav(&stereo));
    }

    #[test]
    fn non_wav_is_not_canonical() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("noise.wav");
        std::fs::write(&path, b"not a wav at all").unwrap();
        assert!(!is_canonical_wav(&path));
    }
}
