//! Configuration management for the AITwin gateway

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// AITwin gateway configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server configuration
    pub server: ServerConfig,

    /// Upload limits
    pub limits: LimitsConfig,

    /// Audio normalization configuration
    pub audio: AudioConfig,

    /// Speech-to-text configuration
    pub stt: SttConfig,

    /// Generative-text configuration
    pub llm: LlmConfig,

    /// Text-to-speech configuration
    pub tts: TtsConfig,

    /// Path to a persona TOML file; the embedded persona is used when unset
    pub persona_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            limits: LimitsConfig::default(),
            audio: AudioConfig::default(),
            stt: SttConfig::default(),
            llm: LlmConfig::default(),
            tts: TtsConfig::default(),
            persona_path: None,
        }
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind
    pub host: String,

    /// Port to listen on
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 18990,
        }
    }
}

/// Upload limits
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum upload size in bytes (default 10MB)
    pub max_upload_bytes: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_upload_bytes: 10 * 1024 * 1024,
        }
    }
}

/// Audio normalization configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Path to the ffmpeg binary; discovered on PATH when unset
    pub ffmpeg_path: Option<PathBuf>,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self { ffmpeg_path: None }
    }
}

/// Speech-to-text configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SttConfig {
    /// Recognition endpoint
    pub endpoint: String,

    /// Recognition language (BCP 47 code)
    pub language: String,
}

impl Default for SttConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://speech.googleapis.com/v1/speech:recognize".to_string(),
            language: "en-US".to_string(),
        }
    }
}

/// Generative-text configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// API base URL
    pub endpoint: String,

    /// Model identifier
    pub model: String,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            model: "gemini-2.5-flash".to_string(),
        }
    }
}

/// Text-to-speech configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TtsConfig {
    /// Synthesis endpoint
    pub endpoint: String,

    /// Voice language (BCP 47 code)
    pub language: String,

    /// Voice gender ("FEMALE", "MALE", or "NEUTRAL")
    pub gender: String,
}

impl Default for TtsConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://texttospeech.googleapis.com/v1/text:synthesize".to_string(),
            language: "en-US".to_string(),
            gender: "FEMALE".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from an explicit file, or from the default
    /// location (`~/.config/aitwin/config.toml`), falling back to defaults
    /// when no file exists.
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read or parsed.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => Some(p.to_path_buf()),
            None => Self::default_path().filter(|p| p.exists()),
        };

        let config = match path {
            Some(p) => {
                tracing::debug!(path = %p.display(), "loading configuration file");
                let text = std::fs::read_to_string(&p)?;
                toml::from_str(&text)?
            }
            None => Self::default(),
        };

        config.validate()?;
        Ok(config)
    }

    /// Default configuration file location
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("dev", "aitwin", "aitwin")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns error if any value is out of range or empty.
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(Error::Config("server port cannot be 0".to_string()));
        }
        if self.limits.max_upload_bytes == 0 {
            return Err(Error::Config(
                "max upload size must be greater than 0".to_string(),
            ));
        }
        if self.stt.language.is_empty() {
            return Err(Error::Config("STT language cannot be empty".to_string()));
        }
        if self.llm.model.is_empty() {
            return Err(Error::Config("LLM model cannot be empty".to_string()));
        }
        match self.tts.gender.as_str() {
            "FEMALE" | "MALE" | "NEUTRAL" => {}
            other => {
                return Err(Error::Config(format!(
                    "unknown TTS voice gender: {other}"
                )));
            }
        }
        Ok(())
    }
}

/// API keys resolved from the environment
#[derive(Debug, Clone, Default)]
pub struct ApiKeys {
    /// Google Cloud key for the speech and synthesis services
    pub google: Option<String>,

    /// Gemini key for the generation service
    pub gemini: Option<String>,
}

impl ApiKeys {
    /// Resolve keys from `GOOGLE_API_KEY` and `GEMINI_API_KEY`
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            google: read_key("GOOGLE_API_KEY"),
            gemini: read_key("GEMINI_API_KEY"),
        }
    }
}

fn read_key(var: &str) -> Option<String> {
    std::env::var(var).ok().filter(|v| !v.is_empty())
}
