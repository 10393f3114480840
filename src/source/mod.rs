//! Source resolution for Notat.
//!
//! Turns a lecture request (local file or remote URL) into a compressed
//! audio artifact plus whatever metadata the source reports.

mod download;
mod transcode;

pub use download::download_audio;
pub use transcode::extract_audio;

use crate::error::{NotatError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;
use uuid::Uuid;

/// Supported audio file extensions.
const AUDIO_EXTENSIONS: &[&str] = &[
    "mp3", "wav", "flac", "aac", "ogg", "opus", "m4a", "wma", "aiff", "alac",
];

/// Supported video file extensions (audio will be extracted).
const VIDEO_EXTENSIONS: &[&str] = &[
    "mp4", "mkv", "avi", "mov", "webm", "flv", "wmv", "m4v", "mpeg", "mpg", "3gp",
];

/// Where the lecture comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    /// A media file on the local filesystem.
    LocalFile(PathBuf),
    /// A remote URL handled by the downloader.
    RemoteUrl(String),
}

impl Source {
    pub fn is_remote(&self) -> bool {
        matches!(self, Source::RemoteUrl(_))
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Source::LocalFile(path) => write!(f, "{}", path.display()),
            Source::RemoteUrl(url) => write!(f, "{}", url),
        }
    }
}

/// A single lecture-digestion request. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LectureRequest {
    /// The input source.
    pub source: Source,
    /// User-supplied display title, if any.
    pub title: Option<String>,
}

impl LectureRequest {
    /// Create a request for a local media file.
    pub fn local(path: impl Into<PathBuf>) -> Self {
        Self {
            source: Source::LocalFile(path.into()),
            title: None,
        }
    }

    /// Create a request for a remote URL.
    pub fn remote(url: impl Into<String>) -> Self {
        Self {
            source: Source::RemoteUrl(url.into()),
            title: None,
        }
    }

    /// Attach a user-supplied title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

/// Parse free-form CLI input into a source.
///
/// Anything that parses as an http(s) URL goes to the downloader; everything
/// else must be an existing local media file.
pub fn parse_input(input: &str) -> Result<Source> {
    if let Ok(url) = Url::parse(input) {
        if url.scheme() == "http" || url.scheme() == "https" {
            return Ok(Source::RemoteUrl(input.to_string()));
        }
    }

    let path = Path::new(input);
    if !path.exists() {
        return Err(NotatError::SourceNotFound(format!(
            "File not found: {}",
            input
        )));
    }
    if !is_media_file(path) {
        return Err(NotatError::InvalidInput(format!(
            "Not a recognized audio or video file: {}",
            input
        )));
    }

    Ok(Source::LocalFile(path.to_path_buf()))
}

/// Check if path has a supported audio or video extension.
pub fn is_media_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let ext = ext.to_lowercase();
            AUDIO_EXTENSIONS.contains(&ext.as_str()) || VIDEO_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

/// A compressed audio artifact produced by resolution.
///
/// Never mutated after creation; the transcriber only reads it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioArtifact {
    /// Short random identifier, also embedded in the filename.
    pub id: String,
    /// Path to the mono low-bitrate audio file.
    pub path: PathBuf,
    /// Size of the audio file in bytes.
    pub byte_size: u64,
}

/// Metadata reported by the source during resolution.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceMetadata {
    /// Title reported by the source (container tags or remote metadata).
    pub title: Option<String>,
    /// Duration in seconds, if known.
    pub duration_seconds: Option<f64>,
    /// Byte size of the original input. Only measurable for local files.
    pub original_byte_size: Option<u64>,
    /// Publication date, if the source reports one.
    pub published_at: Option<DateTime<Utc>>,
}

/// The full output of source resolution.
#[derive(Debug, Clone)]
pub struct ResolvedSource {
    pub artifact: AudioArtifact,
    pub metadata: SourceMetadata,
}

/// Trait for source resolvers.
#[async_trait]
pub trait SourceResolver: Send + Sync {
    /// Resolve a request into a local audio artifact in `work_dir`.
    async fn resolve(&self, request: &LectureRequest, work_dir: &Path) -> Result<ResolvedSource>;
}

/// Production resolver backed by ffmpeg and yt-dlp.
pub struct ToolResolver;

impl ToolResolver {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ToolResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SourceResolver for ToolResolver {
    async fn resolve(&self, request: &LectureRequest, work_dir: &Path) -> Result<ResolvedSource> {
        match &request.source {
            Source::LocalFile(path) => extract_audio(path, work_dir).await,
            Source::RemoteUrl(url) => download_audio(url, work_dir).await,
        }
    }
}

/// Generate a short random artifact identifier.
///
/// Deliberately not derived from the input name, so odd characters and long
/// paths in uploads can never leak into generated filenames.
pub(crate) fn new_artifact_id() -> String {
    Uuid::new_v4().simple().to_string()[..8].to_string()
}

/// Artifact filename for a given identifier.
pub(crate) fn artifact_filename(id: &str) -> String {
    format!("lecture_{}_low.mp3", id)
}

/// Verify that a tool actually produced a usable artifact.
///
/// Returns the byte size on success. An empty or missing file is removed and
/// reported as `EmptyOutput` so callers never see a half-written artifact.
pub(crate) fn verify_artifact(path: &Path) -> Result<u64> {
    match std::fs::metadata(path) {
        Ok(meta) if meta.len() > 0 => Ok(meta.len()),
        Ok(_) => {
            let _ = std::fs::remove_file(path);
            Err(NotatError::EmptyOutput(path.display().to_string()))
        }
        Err(_) => Err(NotatError::EmptyOutput(path.display().to_string())),
    }
}
