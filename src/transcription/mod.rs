//! Transcription module for Notat.
//!
//! Speech-to-text over resolved audio artifacts. The production
//! implementation runs a local whisper.cpp model; the trait boundary exists
//! so the pipeline can be tested with fakes.

mod whisper;

pub use whisper::WhisperTranscriber;

use crate::error::Result;
use crate::source::AudioArtifact;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// The transcript of one audio artifact. Produced once per request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptionResult {
    /// Full transcript text.
    pub text: String,
    /// Detected source language, when the model reports one.
    pub language: Option<String>,
    /// Audio duration in seconds, when known.
    pub duration_seconds: Option<f64>,
}

/// Trait for transcription services.
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Transcribe an audio artifact in a single whole-file pass.
    async fn transcribe(&self, artifact: &AudioArtifact) -> Result<TranscriptionResult>;
}
