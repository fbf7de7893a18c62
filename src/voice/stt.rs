//! Speech-to-text (STT) processing

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};

use crate::audio::CANONICAL_SAMPLE_RATE;
use crate::config::SttConfig;
use crate::{Error, Result};

use super::Transcriber;

/// Recognition request body
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RecognizeRequest {
    config: RecognitionConfig,
    audio: RecognitionAudio,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RecognitionConfig {
    encoding: &'static str,
    sample_rate_hertz: u32,
    language_code: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RecognitionAudio {
    content: String,
}

/// Recognition response body
#[derive(Deserialize)]
struct RecognizeResponse {
    #[serde(default)]
    results: Vec<RecognitionResult>,
}

#[derive(Deserialize)]
struct RecognitionResult {
    #[serde(default)]
    alternatives: Vec<RecognitionAlternative>,
}

#[derive(Deserialize)]
struct RecognitionAlternative {
    #[serde(default)]
    transcript: String,
}

/// Transcribes speech via the Google Cloud Speech REST API
#[derive(Debug)]
pub struct GoogleTranscriber {
    client: reqwest::Client,
    api_key: String,
    endpoint: String,
    language: String,
}

impl GoogleTranscriber {
    /// Create a new transcriber
    ///
    /// # Errors
    ///
    /// Returns error if the API key is missing
    pub fn new(api_key: String, config: &SttConfig) -> Result<Self> {
        if api_key.is_empty() {
            return Err(Error::Config(
                "Google API key required for speech recognition".to_string(),
            ));
        }

        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
            endpoint: config.endpoint.clone(),
            language: config.language.clone(),
        })
    }
}

#[async_trait]
impl Transcriber for GoogleTranscriber {
    async fn transcribe(&self, audio: &[u8]) -> Result<String> {
        tracing::debug!(audio_bytes = audio.len(), "starting transcription");

        let request = RecognizeRequest {
            config: RecognitionConfig {
                encoding: "LINEAR16",
                sample_rate_hertz: CANONICAL_SAMPLE_RATE,
                language_code: self.language.clone(),
            },
            audio: RecognitionAudio {
                content: BASE64.encode(audio),
            },
        };

        let response = self
            .client
            .post(&self.endpoint)
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "recognition request failed");
                e
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "recognition API error");
            return Err(Error::Stt(format!("recognition API error {status}: {body}")));
        }

        let result: RecognizeResponse = response.json().await.map_err(|e| {
            tracing::error!(error = %e, "failed to parse recognition response");
            e
        })?;

        // First result's top-ranked alternative; empty when nothing was heard
        let transcript = result
            .results
            .first()
            .and_then(|r| r.alternatives.first())
            .map(|a| a.transcript.clone())
            .unwrap_or_default();

        tracing::info!(transcript = %transcript, "transcription complete");
        Ok(transcript)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_key_is_rejected() {
        let err = GoogleTranscriber::new(String::new(), &SttConfig::default()).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn request_serializes_with_camel_case_fields() {
        let request = RecognizeRequest {
            config: RecognitionConfig {
                encoding: "LINEAR16",
                sample_rate_hertz: CANONICAL_SAMPLE_RATE,
                language_code: "en-US".to_string(),
            },
            audio: RecognitionAudio {
                content: BASE64.encode(b"pcm"),
            },
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["config"]["encoding"], "LINEAR16");
        assert_eq!(json["config"]["sampleRateHertz"], 16000);
        assert_eq!(json["config"]["languageCode"], "en-US");
        assert!(json["audio"]["content"].is_string());
    }

    #[test]
    fn response_without_results_yields_empty_transcript() {
        let response: RecognizeResponse = serde_json::from_str("{}").unwrap();
        let transcript = response
            .results
            .first()
            .and_then(|r| r.alternatives.first())
            .map(|a| a.transcript.clone())
            .unwrap_or_default();
        assert_eq!(transcript, "");
    }

    #[test]
    fn top_alternative_of_first_result_wins() {
        let body = r#"{
            "results": [
                {"alternatives": [
                    {"transcript": "what is your superpower"},
                    {"transcript": "watt is your superpower"}
                ]},
                {"alternatives": [{"transcript": "second result"}]}
            ]
        }"#;
        let response: RecognizeResponse = serde_json::from_str(body).unwrap();
        let transcript = response
            .results
            .first()
            .and_then(|r| r.alternatives.first())
            .map(|a| a.transcript.clone())
            .unwrap_or_default();
        assert_eq!(transcript, "what is your superpower");
    }
}
