//! Notat - Lecture Digestion
//!
//! A CLI tool that turns lectures into compressed audio, transcripts, and
//! AI-generated study guides.
//!
//! The name "Notat" comes from the Norwegian word for "note."
//!
//! # Overview
//!
//! Notat allows you to:
//! - Digest local lecture recordings (video or audio) or remote URLs
//! - Extract a small, speech-optimized audio artifact from heavy source media
//! - Transcribe speech to text with a local Whisper model
//! - Generate an AI study guide, with a graceful fallback when the AI service
//!   is unavailable
//! - See how much storage the digest saves compared to the original
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - `config` - Configuration management
//! - `source` - Source resolution (local files, remote URLs) into audio artifacts
//! - `transcription` - Speech-to-text transcription
//! - `summary` - Study-guide summarization with fallback
//! - `pipeline` - Pipeline coordination and the lecture record
//!
//! # Example
//!
//! ```rust,no_run
//! use notat::config::Settings;
//! use notat::pipeline::Pipeline;
//! use notat::source::LectureRequest;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let pipeline = Pipeline::new(settings)?;
//!
//!     let request = LectureRequest::local("lectures/intro.mp4");
//!     let record = pipeline.process(&request).await?;
//!     println!("{}: saved {:.1}%", record.title, record.data_saved_percent());
//!
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod openai;
pub mod pipeline;
pub mod source;
pub mod summary;
pub mod transcription;

pub use error::{NotatError, Result};
