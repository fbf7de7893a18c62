//! Speech service adapters
//!
//! Speech-to-text and text-to-speech are external HTTP services behind
//! narrow traits so the pipeline can be exercised without network access.

mod stt;
mod tts;

pub use stt::GoogleTranscriber;
pub use tts::GoogleSynthesizer;

use async_trait::async_trait;

use crate::Result;

/// Transcribes speech to text
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Transcribe a canonical waveform (16kHz mono PCM WAV bytes)
    ///
    /// Returns an empty string when the service finds no speech.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails
    async fn transcribe(&self, audio: &[u8]) -> Result<String>;
}

/// Synthesizes speech from text
#[async_trait]
pub trait Synthesizer: Send + Sync {
    /// Synthesize text into encoded audio (MP3 bytes)
    ///
    /// # Errors
    ///
    /// Returns error if the request fails
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>>;
}
