//! Pipeline orchestrator for Notat.
//!
//! Coordinates the entire digest from source resolution to study guide:
//! resolve -> transcribe -> summarize, strictly in that order. Each stage
//! runs under its own timeout budget. Resolution and transcription failures
//! abort the request; summarization failures degrade to a fallback summary.

use crate::config::{Prompts, Settings};
use crate::error::{NotatError, Result};
use crate::source::{
    AudioArtifact, LectureRequest, SourceMetadata, SourceResolver, ToolResolver,
};
use crate::summary::{fallback_summary, OpenAiSummarizer, Summarizer, SummaryDocument};
use crate::transcription::{Transcriber, WhisperTranscriber};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{info, instrument, warn};

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Multiplier used to estimate an unknown original size from the produced
/// audio size. A rough approximation, not a measurement; the estimate is
/// tagged as such in the record.
const REMOTE_SIZE_MULTIPLIER: f64 = 15.0;

/// Original input size in MB, tagged by how it was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "mb", rename_all = "snake_case")]
pub enum OriginalSize {
    /// Measured from the input file on disk.
    Measured(f64),
    /// Estimated from the produced audio size.
    Estimated(f64),
}

impl OriginalSize {
    pub fn mb(&self) -> f64 {
        match self {
            OriginalSize::Measured(mb) | OriginalSize::Estimated(mb) => *mb,
        }
    }

    pub fn is_estimate(&self) -> bool {
        matches!(self, OriginalSize::Estimated(_))
    }
}

/// The finished digest of one lecture.
///
/// Only constructed once every required stage has succeeded; the caller owns
/// it and persists whichever fields it needs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LectureRecord {
    /// Display title.
    pub title: String,
    /// Path to the compressed audio artifact.
    pub audio_path: PathBuf,
    /// Full transcript text.
    pub transcript: String,
    /// Path to the transcript sidecar file, when it could be written.
    pub transcript_path: Option<PathBuf>,
    /// Detected transcript language, when the model reports one.
    pub language: Option<String>,
    /// Audio duration in seconds, when known.
    pub duration_seconds: Option<f64>,
    /// Publication date, when the source reports one.
    pub published_at: Option<chrono::DateTime<chrono::Utc>>,
    /// Study guide or fallback preview.
    pub summary: SummaryDocument,
    /// Size of the audio artifact in MB (two decimals).
    pub new_size_mb: f64,
    /// Original input size, when measurable or estimable.
    pub original_size: Option<OriginalSize>,
}

impl LectureRecord {
    /// Share of the original size saved by the digest, in percent
    /// (one decimal). Zero when either size is unknown or non-positive.
    pub fn data_saved_percent(&self) -> f64 {
        match &self.original_size {
            Some(original) if original.mb() > 0.0 && self.new_size_mb > 0.0 => {
                round1((original.mb() - self.new_size_mb) / original.mb() * 100.0)
            }
            _ => 0.0,
        }
    }
}

/// The main pipeline for lecture digestion.
pub struct Pipeline {
    settings: Settings,
    resolver: Arc<dyn SourceResolver>,
    transcriber: Arc<dyn Transcriber>,
    summarizer: Arc<dyn Summarizer>,
    work_dir: PathBuf,
}

impl Pipeline {
    /// Create a pipeline with production components.
    ///
    /// Loads the whisper model and checks the API credential here, so a
    /// missing model file or key fails at startup rather than mid-request.
    pub fn new(settings: Settings) -> Result<Self> {
        let prompts = Prompts::load(
            settings.prompts.custom_dir.as_deref(),
            Some(&settings.prompts.variables),
        )?;

        let transcriber: Arc<dyn Transcriber> = Arc::new(WhisperTranscriber::with_config(
            &settings.model_path(),
            &settings.transcription.language,
        )?);

        let summarizer: Arc<dyn Summarizer> = Arc::new(OpenAiSummarizer::new(
            &settings.summary.model,
            prompts,
            settings.summary.max_key_concepts,
        )?);

        Self::with_components(settings, Arc::new(ToolResolver::new()), transcriber, summarizer)
    }

    /// Create a pipeline with custom components.
    pub fn with_components(
        settings: Settings,
        resolver: Arc<dyn SourceResolver>,
        transcriber: Arc<dyn Transcriber>,
        summarizer: Arc<dyn Summarizer>,
    ) -> Result<Self> {
        let work_dir = settings.work_dir();
        std::fs::create_dir_all(&work_dir)?;

        Ok(Self {
            settings,
            resolver,
            transcriber,
            summarizer,
            work_dir,
        })
    }

    /// Get the settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Digest one lecture: resolve the source, transcribe, summarize, and
    /// assemble the record with size statistics.
    #[instrument(skip(self, request), fields(source = %request.source))]
    pub async fn process(&self, request: &LectureRequest) -> Result<LectureRecord> {
        let timeouts = &self.settings.timeouts;

        info!("Resolving source");
        let resolved = run_stage(
            "resolve",
            timeouts.resolve_secs,
            self.resolver.resolve(request, &self.work_dir),
        )
        .await?;

        info!(
            "Resolved to {} ({} bytes)",
            resolved.artifact.path.display(),
            resolved.artifact.byte_size
        );

        info!("Transcribing audio");
        let transcription = run_stage(
            "transcribe",
            timeouts.transcribe_secs,
            self.transcriber.transcribe(&resolved.artifact),
        )
        .await?;

        info!("Generating study guide");
        let summary = match timeout(
            Duration::from_secs(timeouts.summarize_secs),
            self.summarizer.summarize(&transcription.text),
        )
        .await
        {
            Ok(summary) => summary,
            Err(_) => {
                warn!(
                    "Summarization exceeded {}s budget, using fallback",
                    timeouts.summarize_secs
                );
                fallback_summary(&transcription.text)
            }
        };

        let transcript_path = self.write_transcript(&resolved.artifact, &transcription.text);

        let new_size_mb = round2(resolved.artifact.byte_size as f64 / BYTES_PER_MB);
        let original_size = resolve_original_size(&resolved.metadata, request, new_size_mb);
        let title = display_title(request, &resolved.metadata, &resolved.artifact);
        let duration_seconds = transcription
            .duration_seconds
            .or(resolved.metadata.duration_seconds);

        Ok(LectureRecord {
            title,
            audio_path: resolved.artifact.path.clone(),
            transcript: transcription.text,
            transcript_path,
            language: transcription.language,
            duration_seconds,
            published_at: resolved.metadata.published_at,
            summary,
            new_size_mb,
            original_size,
        })
    }

    /// Persist the transcript as a sidecar text file next to the artifact.
    /// Failure to write is logged and tolerated; the record carries the
    /// transcript text regardless.
    fn write_transcript(&self, artifact: &AudioArtifact, text: &str) -> Option<PathBuf> {
        let path = artifact
            .path
            .with_file_name(format!("lecture_{}_transcript.txt", artifact.id));

        match std::fs::write(&path, text) {
            Ok(()) => Some(path),
            Err(e) => {
                warn!("Failed to write transcript file: {}", e);
                None
            }
        }
    }
}

/// Run a required stage under its timeout budget.
async fn run_stage<T>(
    stage: &'static str,
    seconds: u64,
    fut: impl Future<Output = Result<T>>,
) -> Result<T> {
    match timeout(Duration::from_secs(seconds), fut).await {
        Ok(result) => result,
        Err(_) => Err(NotatError::StageTimeout { stage, seconds }),
    }
}

/// Work out the original-size statistic for the record.
fn resolve_original_size(
    metadata: &SourceMetadata,
    request: &LectureRequest,
    new_size_mb: f64,
) -> Option<OriginalSize> {
    match metadata.original_byte_size {
        Some(bytes) => Some(OriginalSize::Measured(round2(bytes as f64 / BYTES_PER_MB))),
        None if request.source.is_remote() => Some(OriginalSize::Estimated(round2(
            new_size_mb * REMOTE_SIZE_MULTIPLIER,
        ))),
        None => None,
    }
}

/// Display-title precedence: user-supplied, then source-reported, then a
/// generated placeholder.
fn display_title(
    request: &LectureRequest,
    metadata: &SourceMetadata,
    artifact: &AudioArtifact,
) -> String {
    request
        .title
        .clone()
        .filter(|t| !t.trim().is_empty())
        .or_else(|| metadata.title.clone().filter(|t| !t.trim().is_empty()))
        .unwrap_or_else(|| format!("Lecture {}", artifact.id))
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::ResolvedSource;
    use crate::summary::SUMMARY_UNAVAILABLE_MARKER;
    use crate::transcription::TranscriptionResult;
    use async_trait::async_trait;
    use std::path::Path;

    struct FakeResolver {
        artifact_bytes: u64,
        original_bytes: Option<u64>,
        source_title: Option<String>,
        fail: bool,
    }

    #[async_trait]
    impl SourceResolver for FakeResolver {
        async fn resolve(
            &self,
            _request: &LectureRequest,
            work_dir: &Path,
        ) -> Result<ResolvedSource> {
            if self.fail {
                return Err(NotatError::Transcode("ffmpeg failed: boom".into()));
            }
            Ok(ResolvedSource {
                artifact: AudioArtifact {
                    id: "abcd1234".to_string(),
                    path: work_dir.join("lecture_abcd1234_low.mp3"),
                    byte_size: self.artifact_bytes,
                },
                metadata: SourceMetadata {
                    title: self.source_title.clone(),
                    duration_seconds: Some(120.0),
                    original_byte_size: self.original_bytes,
                    published_at: None,
                },
            })
        }
    }

    struct FakeTranscriber {
        text: String,
        fail: bool,
    }

    #[async_trait]
    impl Transcriber for FakeTranscriber {
        async fn transcribe(&self, _artifact: &AudioArtifact) -> Result<TranscriptionResult> {
            if self.fail {
                return Err(NotatError::Transcription("corrupt audio".into()));
            }
            Ok(TranscriptionResult {
                text: self.text.clone(),
                language: Some("en".to_string()),
                duration_seconds: Some(118.5),
            })
        }
    }

    /// Mirrors the production summarizer's degrade-on-failure behavior.
    struct FakeSummarizer {
        fail: bool,
    }

    #[async_trait]
    impl Summarizer for FakeSummarizer {
        async fn summarize(&self, transcript: &str) -> SummaryDocument {
            if self.fail {
                fallback_summary(transcript)
            } else {
                SummaryDocument::AiGenerated {
                    html: "<h2>Subject</h2>".to_string(),
                }
            }
        }
    }

    struct HangingSummarizer;

    #[async_trait]
    impl Summarizer for HangingSummarizer {
        async fn summarize(&self, _transcript: &str) -> SummaryDocument {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            unreachable!("sleep never completes in tests")
        }
    }

    fn test_settings(work_dir: &Path) -> Settings {
        let mut settings = Settings::default();
        settings.general.work_dir = work_dir.to_string_lossy().to_string();
        settings
    }

    fn test_pipeline(
        work_dir: &Path,
        resolver: FakeResolver,
        transcriber: FakeTranscriber,
        summarizer: impl Summarizer + 'static,
    ) -> Pipeline {
        Pipeline::with_components(
            test_settings(work_dir),
            Arc::new(resolver),
            Arc::new(transcriber),
            Arc::new(summarizer),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_local_file_digest_with_measured_savings() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = test_pipeline(
            dir.path(),
            FakeResolver {
                artifact_bytes: 1024 * 1024,               // 1 MB
                original_bytes: Some(100 * 1024 * 1024),   // 100 MB
                source_title: Some("Probed Title".into()),
                fail: false,
            },
            FakeTranscriber {
                text: "hello lecture".into(),
                fail: false,
            },
            FakeSummarizer { fail: false },
        );

        let request = LectureRequest::local("lecture.mp4");
        let record = pipeline.process(&request).await.unwrap();

        assert_eq!(record.new_size_mb, 1.0);
        assert_eq!(record.original_size, Some(OriginalSize::Measured(100.0)));
        assert_eq!(record.data_saved_percent(), 99.0);
        assert_eq!(record.title, "Probed Title");
        assert_eq!(record.transcript, "hello lecture");
        assert!(!record.summary.is_fallback());

        // Transcript sidecar written next to the artifact
        let sidecar = record.transcript_path.unwrap();
        assert_eq!(std::fs::read_to_string(sidecar).unwrap(), "hello lecture");
    }

    #[tokio::test]
    async fn test_remote_digest_estimates_original_size() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = test_pipeline(
            dir.path(),
            FakeResolver {
                artifact_bytes: 2 * 1024 * 1024, // 2 MB
                original_bytes: None,
                source_title: Some("Remote Lecture".into()),
                fail: false,
            },
            FakeTranscriber {
                text: "remote".into(),
                fail: false,
            },
            FakeSummarizer { fail: false },
        );

        let request = LectureRequest::remote("https://example.com/watch?v=abc");
        let record = pipeline.process(&request).await.unwrap();

        // Estimated as new_size * 15, and labeled as an estimate
        let original = record.original_size.unwrap();
        assert!(original.is_estimate());
        assert_eq!(original.mb(), 30.0);
    }

    #[tokio::test]
    async fn test_resolver_failure_aborts_request() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = test_pipeline(
            dir.path(),
            FakeResolver {
                artifact_bytes: 0,
                original_bytes: None,
                source_title: None,
                fail: true,
            },
            FakeTranscriber {
                text: String::new(),
                fail: false,
            },
            FakeSummarizer { fail: false },
        );

        let request = LectureRequest::local("lecture.mp4");
        let err = pipeline.process(&request).await.unwrap_err();
        assert!(matches!(err, NotatError::Transcode(_)));
    }

    #[tokio::test]
    async fn test_transcription_failure_aborts_request() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = test_pipeline(
            dir.path(),
            FakeResolver {
                artifact_bytes: 1024,
                original_bytes: Some(4096),
                source_title: None,
                fail: false,
            },
            FakeTranscriber {
                text: String::new(),
                fail: true,
            },
            FakeSummarizer { fail: false },
        );

        let request = LectureRequest::local("lecture.mp4");
        let err = pipeline.process(&request).await.unwrap_err();
        assert!(matches!(err, NotatError::Transcription(_)));
    }

    #[tokio::test]
    async fn test_summarizer_failure_degrades_to_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let transcript = "t".repeat(800);
        let pipeline = test_pipeline(
            dir.path(),
            FakeResolver {
                artifact_bytes: 1024,
                original_bytes: Some(1024 * 1024),
                source_title: None,
                fail: false,
            },
            FakeTranscriber {
                text: transcript.clone(),
                fail: false,
            },
            FakeSummarizer { fail: true },
        );

        let request = LectureRequest::local("lecture.mp4");
        let record = pipeline.process(&request).await.unwrap();

        // Pipeline completes; summary is the deterministic preview
        assert!(record.summary.is_fallback());
        let expected = format!("{}{}", "t".repeat(500), SUMMARY_UNAVAILABLE_MARKER);
        assert_eq!(record.summary.body(), expected);
    }

    #[tokio::test]
    async fn test_short_transcript_fallback_is_whole() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = test_pipeline(
            dir.path(),
            FakeResolver {
                artifact_bytes: 1024,
                original_bytes: Some(1024 * 1024),
                source_title: None,
                fail: false,
            },
            FakeTranscriber {
                text: "short transcript".into(),
                fail: false,
            },
            FakeSummarizer { fail: true },
        );

        let request = LectureRequest::local("lecture.mp4");
        let record = pipeline.process(&request).await.unwrap();

        let expected = format!("short transcript{}", SUMMARY_UNAVAILABLE_MARKER);
        assert_eq!(record.summary.body(), expected);
    }

    #[tokio::test]
    async fn test_hung_summarizer_times_out_to_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = test_settings(dir.path());
        settings.timeouts.summarize_secs = 0;

        let pipeline = Pipeline::with_components(
            settings,
            Arc::new(FakeResolver {
                artifact_bytes: 1024,
                original_bytes: Some(1024 * 1024),
                source_title: None,
                fail: false,
            }),
            Arc::new(FakeTranscriber {
                text: "slow service".into(),
                fail: false,
            }),
            Arc::new(HangingSummarizer),
        )
        .unwrap();

        let request = LectureRequest::local("lecture.mp4");
        let record = pipeline.process(&request).await.unwrap();
        assert!(record.summary.is_fallback());
    }

    #[tokio::test]
    async fn test_title_precedence() {
        let dir = tempfile::tempdir().unwrap();

        // User title wins over source title
        let pipeline = test_pipeline(
            dir.path(),
            FakeResolver {
                artifact_bytes: 1024,
                original_bytes: Some(4096),
                source_title: Some("Source Title".into()),
                fail: false,
            },
            FakeTranscriber {
                text: "x".into(),
                fail: false,
            },
            FakeSummarizer { fail: false },
        );

        let request = LectureRequest::local("lecture.mp4").with_title("My Title");
        let record = pipeline.process(&request).await.unwrap();
        assert_eq!(record.title, "My Title");
    }

    #[tokio::test]
    async fn test_placeholder_title_when_nothing_reported() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = test_pipeline(
            dir.path(),
            FakeResolver {
                artifact_bytes: 1024,
                original_bytes: Some(4096),
                source_title: None,
                fail: false,
            },
            FakeTranscriber {
                text: "x".into(),
                fail: false,
            },
            FakeSummarizer { fail: false },
        );

        let request = LectureRequest::local("lecture.mp4");
        let record = pipeline.process(&request).await.unwrap();
        assert_eq!(record.title, "Lecture abcd1234");
    }

    #[test]
    fn test_data_saved_percent_handles_missing_sizes() {
        let record = LectureRecord {
            title: "t".into(),
            audio_path: PathBuf::from("a.mp3"),
            transcript: String::new(),
            transcript_path: None,
            language: None,
            duration_seconds: None,
            published_at: None,
            summary: SummaryDocument::Fallback { text: String::new() },
            new_size_mb: 1.0,
            original_size: None,
        };
        assert_eq!(record.data_saved_percent(), 0.0);
    }

    #[test]
    fn test_rounding() {
        assert_eq!(round2(1.0 / 3.0), 0.33);
        assert_eq!(round2(0.125), 0.13);
        assert_eq!(round1(98.96), 99.0);
    }
}
