//! Local whisper.cpp transcription via whisper-rs.
//!
//! The model is loaded once at construction and reused for every request.
//! Decoding runs on the CPU path only, so the same build behaves identically
//! on machines without compatible acceleration.

use super::{Transcriber, TranscriptionResult};
use crate::error::{NotatError, Result};
use crate::source::AudioArtifact;
use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use std::sync::Arc;
use tokio::process::Command;
use whisper_rs::{FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters};
use tracing::{debug, info, instrument};

/// Sample rate whisper.cpp expects.
const WHISPER_SAMPLE_RATE: u32 = 16_000;

/// Whisper-based local transcriber.
pub struct WhisperTranscriber {
    ctx: Arc<WhisperContext>,
    language: Option<String>,
}

impl std::fmt::Debug for WhisperTranscriber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WhisperTranscriber")
            .field("language", &self.language)
            .finish_non_exhaustive()
    }
}

impl WhisperTranscriber {
    /// Load a model with automatic language detection.
    pub fn new(model_path: &Path) -> Result<Self> {
        Self::with_config(model_path, "auto")
    }

    /// Load a GGML model file. Fails with a configuration error when the
    /// model is missing, before any request runs.
    pub fn with_config(model_path: &Path, language: &str) -> Result<Self> {
        if !model_path.exists() {
            return Err(NotatError::Config(format!(
                "Whisper model not found at {}. Download one from \
                 https://huggingface.co/ggerganov/whisper.cpp and set \
                 transcription.model_path in your config.",
                model_path.display()
            )));
        }

        info!("Loading whisper model from {}", model_path.display());

        // CPU decode only
        let mut ctx_params = WhisperContextParameters::default();
        ctx_params.use_gpu(false);

        let ctx = WhisperContext::new_with_params(
            model_path.to_str().unwrap_or_default(),
            ctx_params,
        )
        .map_err(|e| NotatError::Config(format!("Failed to load whisper model: {}", e)))?;

        let language = match language {
            "" => None,
            lang => Some(lang.to_string()),
        };

        Ok(Self {
            ctx: Arc::new(ctx),
            language,
        })
    }
}

#[async_trait]
impl Transcriber for WhisperTranscriber {
    #[instrument(skip(self), fields(artifact = %artifact.path.display()))]
    async fn transcribe(&self, artifact: &AudioArtifact) -> Result<TranscriptionResult> {
        let samples = decode_to_pcm(&artifact.path).await?;
        let duration_seconds = Some(samples.len() as f64 / WHISPER_SAMPLE_RATE as f64);

        debug!("Decoded {} samples", samples.len());

        let ctx = self.ctx.clone();
        let language = self.language.clone();

        // Model inference is CPU-bound; keep it off the async runtime.
        let (text, detected) =
            tokio::task::spawn_blocking(move || run_model(&ctx, language.as_deref(), &samples))
                .await
                .map_err(|e| NotatError::Transcription(format!("Worker task failed: {e}")))??;

        Ok(TranscriptionResult {
            text,
            language: detected,
            duration_seconds,
        })
    }
}

/// Single-pass whole-file decode. No streaming, no chunking.
fn run_model(
    ctx: &WhisperContext,
    language: Option<&str>,
    samples: &[f32],
) -> Result<(String, Option<String>)> {
    let mut state = ctx
        .create_state()
        .map_err(|e| NotatError::Transcription(format!("Failed to create whisper state: {e}")))?;

    let mut params = FullParams::new(SamplingStrategy::Greedy { best_of: 1 });
    params.set_language(language);
    params.set_print_special(false);
    params.set_print_progress(false);
    params.set_print_realtime(false);
    params.set_print_timestamps(false);

    state
        .full(params, samples)
        .map_err(|e| NotatError::Transcription(format!("Model invocation failed: {e}")))?;

    let num_segments = state
        .full_n_segments()
        .map_err(|e| NotatError::Transcription(format!("Failed to read segments: {e}")))?;

    let mut text = String::new();
    for i in 0..num_segments {
        let segment = state
            .full_get_segment_text(i)
            .map_err(|e| NotatError::Transcription(format!("Failed to read segment {i}: {e}")))?;
        if !text.is_empty() {
            text.push(' ');
        }
        text.push_str(segment.trim());
    }

    let detected = state
        .full_lang_id_from_state()
        .ok()
        .and_then(whisper_rs::get_lang_str)
        .map(|s| s.to_string());

    Ok((text, detected))
}

/// Decode an audio artifact to 16 kHz mono PCM using ffmpeg.
async fn decode_to_pcm(path: &Path) -> Result<Vec<f32>> {
    let temp_dir = tempfile::tempdir()?;
    let wav_path = temp_dir.path().join("decoded.wav");

    let result = Command::new("ffmpeg")
        .arg("-i")
        .arg(path)
        .arg("-f")
        .arg("wav")
        .arg("-acodec")
        .arg("pcm_s16le")
        .arg("-ac")
        .arg("1")
        .arg("-ar")
        .arg(WHISPER_SAMPLE_RATE.to_string())
        .arg("-y")
        .arg("-loglevel")
        .arg("error")
        .arg(&wav_path)
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .output()
        .await;

    let output = match result {
        Ok(o) => o,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(NotatError::ToolNotFound("ffmpeg".into()));
        }
        Err(e) => {
            return Err(NotatError::Transcription(format!("ffmpeg error: {e}")));
        }
    };

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(NotatError::Transcription(format!(
            "Audio decode failed: {stderr}"
        )));
    }

    read_wav_samples(&wav_path)
}

/// Read a 16-bit WAV file into normalized f32 samples.
fn read_wav_samples(path: &Path) -> Result<Vec<f32>> {
    let mut reader = hound::WavReader::open(path)
        .map_err(|e| NotatError::Transcription(format!("Failed to open decoded audio: {e}")))?;

    let samples: std::result::Result<Vec<f32>, hound::Error> = reader
        .samples::<i16>()
        .map(|s| s.map(|v| v as f32 / i16::MAX as f32))
        .collect();

    let samples =
        samples.map_err(|e| NotatError::Transcription(format!("Corrupt decoded audio: {e}")))?;

    if samples.is_empty() {
        return Err(NotatError::Transcription(
            "No audio samples decoded".to_string(),
        ));
    }

    Ok(samples)
}
