//! Upload validation and staging

use std::path::{Path, PathBuf};

use crate::{Error, Result};

use super::Scratch;

/// Accepted upload formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioFormat {
    Wav,
    Mp3,
    M4a,
}

impl AudioFormat {
    /// Parse a declared file extension, case-insensitively
    #[must_use]
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "wav" => Some(Self::Wav),
            "mp3" => Some(Self::Mp3),
            "m4a" => Some(Self::M4a),
            _ => None,
        }
    }

    /// Canonical lowercase extension
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Wav => "wav",
            Self::Mp3 => "mp3",
            Self::M4a => "m4a",
        }
    }
}

/// An upload staged into the invocation's scratch directory
#[derive(Debug)]
pub struct StagedUpload {
    path: PathBuf,
    format: AudioFormat,
}

impl StagedUpload {
    /// Location of the staged blob
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Declared format of the staged blob
    #[must_use]
    pub const fn format(&self) -> AudioFormat {
        self.format
    }
}

/// Validate an upload before any temporary file is created.
///
/// The size check runs first so oversized blobs never touch the filesystem.
///
/// # Errors
///
/// Returns `SizeExceeded` or `UnsupportedFormat`.
pub fn validate(file_name: &str, size: u64, max_bytes: u64) -> Result<AudioFormat> {
    if size > max_bytes {
        return Err(Error::SizeExceeded {
            size,
            limit: max_bytes,
        });
    }

    let ext = file_name.rsplit('.').next().unwrap_or_default();
    AudioFormat::from_extension(ext).ok_or_else(|| Error::UnsupportedFormat(ext.to_string()))
}

/// Write the upload bytes into the scratch directory.
///
/// Re-checks the declared format after the bytes have been read, so a
/// caller that skipped [`validate`] still cannot stage an unsupported file.
///
/// # Errors
///
/// Returns `UnsupportedFormat` or an IO error.
pub async fn stage(scratch: &Scratch, file_name: &str, bytes: &[u8]) -> Result<StagedUpload> {
    let ext = file_name.rsplit('.').next().unwrap_or_default();
    let format =
        AudioFormat::from_extension(ext).ok_or_else(|| Error::UnsupportedFormat(ext.to_string()))?;

    let path = scratch.path().join(format!("input.{}", format.extension()));
    tokio::fs::write(&path, bytes).await?;

    tracing::debug!(
        path = %path.display(),
        bytes = bytes.len(),
        format = format.extension(),
        "upload staged"
    );

    Ok(StagedUpload { path, format })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extensions_parse_case_insensitively() {
        assert_eq!(AudioFormat::from_extension("WAV"), Some(AudioFormat::Wav));
        assert_eq!(AudioFormat::from_extension("Mp3"), Some(AudioFormat::Mp3));
        assert_eq!(AudioFormat::from_extension("m4a"), Some(AudioFormat::M4a));
        assert_eq!(AudioFormat::from_extension("ogg"), None);
        assert_eq!(AudioFormat::from_extension(""), None);
    }

    #[test]
    fn oversized_upload_is_rejected_before_format() {
        // Size wins even when the extension is also bad
        let err = validate("question.ogg", 11, 10).unwrap_err();
        assert!(matches!(err, Error::SizeExceeded { size: 11, limit: 10 }));
    }

    #[test]
    fn unsupported_extension_is_rejected() {
        let err = validate("question.flac", 1, 10).unwrap_err();
        assert!(matches!(err, Error::UnsupportedFormat(ref ext) if ext == "flac"));
    }

    #[test]
    fn extension_is_taken_from_last_dot() {
        assert!(validate("my.recording.v2.wav", 1, 10).is_ok());
    }

    #[tokio::test]
    async fn stage_writes_into_scratch() {
        let scratch = Scratch::new().unwrap();
        let staged = stage(&scratch, "question.wav", b"RIFF").await.unwrap();

        assert!(staged.path().starts_with(scratch.path()));
        assert_eq!(staged.format(), AudioFormat::Wav);
        assert_eq!(std::fs::read(staged.path()).unwrap(), b"RIFF");
    }

    #[tokio::test]
    async fn stage_rejects_unsupported_extension() {
        let scratch = Scratch::new().unwrap();
        let err = stage(&scratch, "question.ogg", b"OggS").await.unwrap_err();
        assert!(matches!(err, Error::UnsupportedFormat(_)));
    }
}
