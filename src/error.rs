//! Error types for Notat.

use thiserror::Error;

/// Library-level error type for Notat operations.
#[derive(Error, Debug)]
pub enum NotatError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Audio transcoding failed: {0}")]
    Transcode(String),

    #[error("Audio download failed: {0}")]
    Download(String),

    #[error("External tool produced no usable output: {0}")]
    EmptyOutput(String),

    #[error("Transcription failed: {0}")]
    Transcription(String),

    #[error("Stage '{stage}' timed out after {seconds} seconds")]
    StageTimeout { stage: &'static str, seconds: u64 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("OpenAI API error: {0}")]
    OpenAI(String),

    #[error("Source not found: {0}")]
    SourceNotFound(String),

    #[error("External tool not found: {0}. Please install it and ensure it's in your PATH.")]
    ToolNotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type alias for Notat operations.
pub type Result<T> = std::result::Result<T, NotatError>;
