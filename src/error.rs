//! Error types for the AITwin gateway

use thiserror::Error;

/// Result type alias for gateway operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the AITwin gateway
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Upload larger than the configured limit
    #[error("upload of {size} bytes exceeds the {limit} byte limit")]
    SizeExceeded {
        /// Size of the rejected upload
        size: u64,
        /// Configured maximum
        limit: u64,
    },

    /// Upload extension outside the allowed set
    #[error("unsupported audio format \"{0}\" (expected wav, mp3, or m4a)")]
    UnsupportedFormat(String),

    /// External transcoder failure; carries the tool's stderr verbatim
    #[error("transcode error: {0}")]
    Transcode(String),

    /// Transcription produced no text
    #[error("no speech detected in the audio")]
    NoSpeech,

    /// Speech-to-text error
    #[error("STT error: {0}")]
    Stt(String),

    /// Response generation error
    #[error("generation error: {0}")]
    Generation(String),

    /// Text-to-speech error
    #[error("TTS error: {0}")]
    Synthesis(String),

    /// Audio inspection error (duration probing, WAV parsing)
    #[error("audio error: {0}")]
    Audio(String),

    /// Persona loading error
    #[error("persona error: {0}")]
    Persona(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP error
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl Error {
    /// Whether this error aborts a pipeline invocation.
    ///
    /// Synthesis and audio-probe failures are reported as warnings; every
    /// other variant stops the invocation.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        !matches!(self, Self::Synthesis(_) | Self::Audio(_))
    }
}
