//! AITwin Gateway - voice interview gateway for a persona digital twin
//!
//! This library turns an uploaded audio question into a spoken answer from a
//! fixed first-person persona:
//! - Upload intake and format normalization (external ffmpeg transcoder)
//! - Speech-to-text and text-to-speech adapters
//! - Single-shot persona completions against a generative-text service
//! - Append-only per-session conversation history
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                  HTTP API (axum)                     │
//! │   /api/ask  │  /api/history  │  /api/status  │ ...  │
//! └────────────────────┬────────────────────────────────┘
//!                      │
//! ┌────────────────────▼────────────────────────────────┐
//! │                    Pipeline                          │
//! │  Intake → Normalize → Transcribe → Respond → Speak  │
//! └────────────────────┬────────────────────────────────┘
//!                      │
//! ┌────────────────────▼────────────────────────────────┐
//! │              External services                       │
//! │   ffmpeg  │  Speech API  │  Gemini  │  TTS API      │
//! └─────────────────────────────────────────────────────┘
//! ```

pub mod api;
pub mod audio;
pub mod config;
pub mod error;
pub mod history;
pub mod llm;
pub mod persona;
pub mod pipeline;
pub mod prompt;
pub mod voice;

pub use config::{ApiKeys, Config};
pub use error::{Error, Result};
pub use history::{HistoryEntry, HistoryLog, SessionRegistry};
pub use persona::Persona;
pub use pipeline::{AudioUpload, Exchange, Pipeline, Stage};
