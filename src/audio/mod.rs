//! Audio intake and normalization
//!
//! Handles upload validation, the external transcoder, and duration probes.
//! The recognition service requires a fixed waveform contract, so the
//! canonical format constants live here.

mod duration;
mod intake;
mod normalize;

pub use duration::{mp3_seconds, wav_seconds};
pub use intake::{AudioFormat, StagedUpload, stage, validate};
pub use normalize::{FfmpegTranscoder, Transcoder, is_canonical_wav, to_canonical};

use crate::Result;

/// Sample rate of the canonical waveform (16kHz for speech recognition)
pub const CANONICAL_SAMPLE_RATE: u32 = 16000;

/// Channel count of the canonical waveform
pub const CANONICAL_CHANNELS: u16 = 1;

/// Per-invocation scratch directory for intermediate audio files
///
/// Every file the pipeline writes lives inside one scratch directory owned
/// by the invocation. Dropping the scratch removes the directory and its
/// contents on every exit path, success or failure.
pub struct Scratch {
    dir: tempfile::TempDir,
}

impl Scratch {
    /// Create a new scratch directory
    ///
    /// # Errors
    ///
    /// Returns error if the directory cannot be created.
    pub fn new() -> Result<Self> {
        let dir = tempfile::Builder::new().prefix("aitwin-").tempdir()?;
        tracing::trace!(path = %dir.path().display(), "scratch directory created");
        Ok(Self { dir })
    }

    /// Path of the scratch directory
    #[must_use]
    pub fn path(&self) -> &std::path::Path {
        self.dir.path()
    }
}
