//! Shared test utilities: fake service adapters and audio fixtures

#![allow(dead_code)]

use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use aitwin_gateway::audio::{CANONICAL_SAMPLE_RATE, Transcoder};
use aitwin_gateway::llm::Responder;
use aitwin_gateway::voice::{Synthesizer, Transcriber};
use aitwin_gateway::{Error, Pipeline, Result};

/// Default upload limit used by tests (10MB)
pub const TEST_MAX_UPLOAD: u64 = 10 * 1024 * 1024;

/// In-memory WAV in the canonical format (16kHz mono 16-bit PCM)
#[must_use]
pub fn canonical_wav_bytes(seconds: f32) -> Vec<u8> {
    wav_bytes(CANONICAL_SAMPLE_RATE, 1, seconds)
}

/// In-memory WAV with an arbitrary sample rate and channel count
#[must_use]
pub fn wav_bytes(sample_rate: u32, channels: u16, seconds: f32) -> Vec<u8> {
    let spec = hound::WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
        let total = (sample_rate as f32 * seconds) as u32 * u32::from(channels);
        for i in 0..total {
            writer.write_sample((i % 64) as i16).unwrap();
        }
        writer.finalize().unwrap();
    }
    cursor.into_inner()
}

/// Fake transcoder that records its operations and the scratch directory
/// it ran in
#[derive(Clone, Default)]
pub struct FakeTranscoder {
    pub fail_repair: Option<String>,
    pub fail_resample: Option<String>,
    pub ops: Arc<Mutex<Vec<&'static str>>>,
    pub scratch_dir: Arc<Mutex<Option<PathBuf>>>,
}

impl FakeTranscoder {
    fn record(&self, op: &'static str, input: &Path) {
        self.ops.lock().unwrap().push(op);
        let parent = input.parent().map(Path::to_path_buf);
        *self.scratch_dir.lock().unwrap() = parent;
    }

    pub fn operations(&self) -> Vec<&'static str> {
        self.ops.lock().unwrap().clone()
    }

    pub fn scratch_path(&self) -> Option<PathBuf> {
        self.scratch_dir.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transcoder for FakeTranscoder {
    async fn remux_faststart(&self, input: &Path, output: &Path) -> Result<()> {
        self.record("remux", input);
        if let Some(stderr) = &self.fail_repair {
            return Err(Error::Transcode(stderr.clone()));
        }
        std::fs::copy(input, output)?;
        Ok(())
    }

    async fn resample(&self, input: &Path, output: &Path) -> Result<()> {
        self.record("resample", input);
        if let Some(stderr) = &self.fail_resample {
            return Err(Error::Transcode(stderr.clone()));
        }
        std::fs::write(output, canonical_wav_bytes(1.0))?;
        Ok(())
    }
}

/// Fake transcriber returning a fixed transcript and recording its input
#[derive(Clone, Default)]
pub struct FakeTranscriber {
    pub transcript: String,
    pub fail: bool,
    pub calls: Arc<AtomicUsize>,
    pub last_input: Arc<Mutex<Vec<u8>>>,
}

impl FakeTranscriber {
    #[must_use]
    pub fn saying(transcript: &str) -> Self {
        Self {
            transcript: transcript.to_string(),
            ..Self::default()
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transcriber for FakeTranscriber {
    async fn transcribe(&self, audio: &[u8]) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_input.lock().unwrap() = audio.to_vec();
        if self.fail {
            return Err(Error::Stt("recognizer unreachable".to_string()));
        }
        Ok(self.transcript.clone())
    }
}

/// Fake responder returning a fixed answer and recording prompts
#[derive(Clone, Default)]
pub struct FakeResponder {
    pub answer: String,
    pub fail: bool,
    pub calls: Arc<AtomicUsize>,
    pub last_prompt: Arc<Mutex<String>>,
}

impl FakeResponder {
    #[must_use]
    pub fn answering(answer: &str) -> Self {
        Self {
            answer: answer.to_string(),
            ..Self::default()
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Responder for FakeResponder {
    async fn respond(&self, prompt: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_prompt.lock().unwrap() = prompt.to_string();
        if self.fail {
            return Err(Error::Generation("model overloaded".to_string()));
        }
        Ok(self.answer.clone())
    }
}

/// Fake synthesizer returning fixed bytes
#[derive(Clone, Default)]
pub struct FakeSynthesizer {
    pub audio: Vec<u8>,
    pub fail: bool,
    pub calls: Arc<AtomicUsize>,
}

impl FakeSynthesizer {
    #[must_use]
    pub fn returning(audio: &[u8]) -> Self {
        Self {
            audio: audio.to_vec(),
            ..Self::default()
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Synthesizer for FakeSynthesizer {
    async fn synthesize(&self, _text: &str) -> Result<Vec<u8>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(Error::Synthesis("voice service down".to_string()));
        }
        Ok(self.audio.clone())
    }
}

/// Assemble a pipeline from fakes
#[must_use]
pub fn fake_pipeline(
    transcoder: FakeTranscoder,
    transcriber: FakeTranscriber,
    responder: FakeResponder,
    synthesizer: FakeSynthesizer,
) -> Pipeline {
    Pipeline::with_services(
        Box::new(transcoder),
        Box::new(transcriber),
        Box::new(responder),
        Box::new(synthesizer),
        "You are Asha, answering interview questions in the first person."
            .to_string(),
        TEST_MAX_UPLOAD,
    )
}

/// Build a multipart request body with a single "file" part
#[must_use]
pub fn multipart_body(file_name: &str, bytes: &[u8]) -> (String, Vec<u8>) {
    let boundary = "aitwin-test-boundary";
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    (format!("multipart/form-data; boundary={boundary}"), body)
}
