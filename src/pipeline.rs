//! The request-processing pipeline
//!
//! One uploaded question flows through intake, normalization, transcription,
//! persona response generation, and speech synthesis, strictly in order.
//! Every stage gates on the previous one; fatal failures abort the rest of
//! the invocation and the scratch directory guarantees temp-file cleanup on
//! every exit path.

use std::fmt;

use crate::audio::{self, FfmpegTranscoder, Scratch, Transcoder};
use crate::config::{ApiKeys, Config};
use crate::llm::{GeminiResponder, Responder};
use crate::persona::Persona;
use crate::prompt::build_prompt;
use crate::voice::{GoogleSynthesizer, GoogleTranscriber, Synthesizer, Transcriber};
use crate::{Error, Result};

/// Stages of one pipeline invocation, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Accept,
    Normalize,
    Transcribe,
    Respond,
    Synthesize,
    Record,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Accept => "accept",
            Self::Normalize => "normalize",
            Self::Transcribe => "transcribe",
            Self::Respond => "respond",
            Self::Synthesize => "synthesize",
            Self::Record => "record",
        };
        f.write_str(name)
    }
}

/// An uploaded audio question
#[derive(Debug, Clone)]
pub struct AudioUpload {
    /// Declared filename (its extension selects the format)
    pub file_name: String,

    /// Raw audio bytes
    pub bytes: Vec<u8>,
}

/// Synthesized spoken answer
#[derive(Debug, Clone)]
pub struct SynthesizedSpeech {
    /// Encoded MP3 bytes
    pub audio: Vec<u8>,

    /// Playback duration, when it could be measured
    pub secs: Option<f32>,
}

/// Result of one successful pipeline invocation
#[derive(Debug, Clone)]
pub struct Exchange {
    /// Transcribed question
    pub question: String,

    /// Generated answer
    pub answer: String,

    /// Duration of the normalized question audio, when measurable
    pub question_secs: Option<f32>,

    /// Spoken answer; absent when synthesis failed (non-fatal)
    pub speech: Option<SynthesizedSpeech>,

    /// Non-fatal problems encountered along the way
    pub warnings: Vec<String>,
}

/// The question-to-answer pipeline
///
/// Owns the service adapters; one instance serves all sessions. Invocations
/// are independent: no state is carried between calls.
pub struct Pipeline {
    transcoder: Box<dyn Transcoder>,
    transcriber: Box<dyn Transcriber>,
    responder: Box<dyn Responder>,
    synthesizer: Box<dyn Synthesizer>,
    system_prompt: String,
    max_upload_bytes: u64,
}

impl Pipeline {
    /// Build a pipeline against the real external services
    ///
    /// # Errors
    ///
    /// Returns error if ffmpeg cannot be found or an API key is missing
    pub fn from_config(config: &Config, persona: &Persona, keys: &ApiKeys) -> Result<Self> {
        let google = keys.google.clone().unwrap_or_default();
        let gemini = keys.gemini.clone().unwrap_or_default();

        Ok(Self {
            transcoder: Box::new(FfmpegTranscoder::discover(
                config.audio.ffmpeg_path.as_deref(),
            )?),
            transcriber: Box::new(GoogleTranscriber::new(google.clone(), &config.stt)?),
            responder: Box::new(GeminiResponder::new(gemini, &config.llm)?),
            synthesizer: Box::new(GoogleSynthesizer::new(google, &config.tts)?),
            system_prompt: persona.system_prompt().to_string(),
            max_upload_bytes: config.limits.max_upload_bytes,
        })
    }

    /// Build a pipeline from explicit service implementations
    #[must_use]
    pub fn with_services(
        transcoder: Box<dyn Transcoder>,
        transcriber: Box<dyn Transcriber>,
        responder: Box<dyn Responder>,
        synthesizer: Box<dyn Synthesizer>,
        system_prompt: String,
        max_upload_bytes: u64,
    ) -> Self {
        Self {
            transcoder,
            transcriber,
            responder,
            synthesizer,
            system_prompt,
            max_upload_bytes,
        }
    }

    /// Process one uploaded question into a persona answer.
    ///
    /// Strictly sequential; a fatal stage error aborts the invocation. All
    /// intermediate files live in a scratch directory removed when this
    /// function returns, on every path.
    ///
    /// # Errors
    ///
    /// Returns `SizeExceeded`, `UnsupportedFormat`, `Transcode`, `NoSpeech`,
    /// or `Generation`; synthesis and duration failures are warnings inside
    /// the returned [`Exchange`] instead.
    pub async fn ask(&self, upload: AudioUpload) -> Result<Exchange> {
        let mut warnings = Vec::new();

        // Accept: validate before any temporary file exists
        tracing::debug!(stage = %Stage::Accept, file = %upload.file_name, bytes = upload.bytes.len(), "accepting upload");
        audio::validate(
            &upload.file_name,
            upload.bytes.len() as u64,
            self.max_upload_bytes,
        )?;

        let scratch = Scratch::new()?;
        let staged = audio::stage(&scratch, &upload.file_name, &upload.bytes).await?;

        // Normalize to the canonical waveform
        tracing::debug!(stage = %Stage::Normalize, "normalizing");
        let canonical = audio::to_canonical(self.transcoder.as_ref(), &scratch, &staged).await?;

        let question_secs = match audio::wav_seconds(&canonical) {
            Ok(secs) => Some(secs),
            Err(e) => {
                tracing::warn!(error = %e, "could not measure question duration");
                warnings.push(format!("could not measure question duration: {e}"));
                None
            }
        };

        // Transcribe; service errors degrade to an empty transcript
        tracing::debug!(stage = %Stage::Transcribe, "transcribing");
        let waveform = tokio::fs::read(&canonical).await?;
        let question = match self.transcriber.transcribe(&waveform).await {
            Ok(text) => text.trim().to_string(),
            Err(e) => {
                tracing::warn!(error = %e, "transcription failed");
                String::new()
            }
        };
        if question.is_empty() {
            return Err(Error::NoSpeech);
        }

        // Respond as the persona
        tracing::debug!(stage = %Stage::Respond, "generating response");
        let prompt = build_prompt(&self.system_prompt, &question);
        let answer = self.responder.respond(&prompt).await.map_err(|e| match e {
            Error::Generation(msg) => Error::Generation(msg),
            other => Error::Generation(other.to_string()),
        })?;

        // Synthesize; failure is reported but does not lose the answer
        tracing::debug!(stage = %Stage::Synthesize, "synthesizing speech");
        let speech = match self.synthesizer.synthesize(&answer).await {
            Ok(audio) if !audio.is_empty() => {
                let secs = match audio::mp3_seconds(&audio) {
                    Ok(secs) => Some(secs),
                    Err(e) => {
                        tracing::warn!(error = %e, "could not measure answer duration");
                        warnings.push(format!("could not measure answer duration: {e}"));
                        None
                    }
                };
                Some(SynthesizedSpeech { audio, secs })
            }
            Ok(_) => {
                tracing::warn!("synthesis returned no audio");
                warnings.push("speech synthesis returned no audio".to_string());
                None
            }
            Err(e) => {
                tracing::warn!(error = %e, "synthesis failed");
                warnings.push(format!("speech synthesis failed: {e}"));
                None
            }
        };

        tracing::info!(
            question = %question,
            answer_chars = answer.len(),
            spoken = speech.is_some(),
            "pipeline invocation complete"
        );

        Ok(Exchange {
            question,
            answer,
            question_secs,
            speech,
            warnings,
        })
    }
}
