//! Remote-URL audio download using yt-dlp.
//!
//! Metadata is fetched first so the reported title and duration survive even
//! if the extractor later renames or remuxes the output. The download itself
//! post-processes into the same fixed low-bitrate mono format the local
//! transcode path produces.

use super::{
    artifact_filename, new_artifact_id, verify_artifact, AudioArtifact, ResolvedSource,
    SourceMetadata,
};
use crate::error::{NotatError, Result};
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info, instrument};

/// Post-processing arguments handed to yt-dlp's ffmpeg step.
const POSTPROCESSOR_ARGS: &str = "ffmpeg:-ac 1 -b:a 32k -ar 22050";

/// Download and compress audio for a remote lecture URL.
#[instrument(skip(work_dir), fields(url = %url))]
pub async fn download_audio(url: &str, work_dir: &Path) -> Result<ResolvedSource> {
    let metadata = fetch_metadata(url).await?;

    std::fs::create_dir_all(work_dir)?;

    let id = new_artifact_id();
    let target = work_dir.join(artifact_filename(&id));
    let template = work_dir.join(format!("lecture_{}_low.%(ext)s", id));

    info!("Downloading audio from {}", url);

    let result = Command::new("yt-dlp")
        .arg("--extract-audio")
        .arg("--audio-format")
        .arg("mp3")
        .arg("--postprocessor-args")
        .arg(POSTPROCESSOR_ARGS)
        .arg("--output")
        .arg(template.to_str().unwrap_or_default())
        .arg("--no-playlist")
        .arg("--quiet")
        .arg("--no-warnings")
        .arg(url)
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .output()
        .await;

    let output = match result {
        Ok(o) => o,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(NotatError::ToolNotFound("yt-dlp".into()));
        }
        Err(e) => {
            return Err(NotatError::Download(format!(
                "yt-dlp execution failed: {e}"
            )));
        }
    };

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let _ = std::fs::remove_file(&target);
        return Err(NotatError::Download(format!("yt-dlp failed: {stderr}")));
    }

    let byte_size = verify_artifact(&target)?;

    debug!("Downloaded {} bytes", byte_size);

    Ok(ResolvedSource {
        artifact: AudioArtifact {
            id,
            path: target,
            byte_size,
        },
        metadata,
    })
}

/// Fetch title, duration, and upload date for a URL without downloading.
pub async fn fetch_metadata(url: &str) -> Result<SourceMetadata> {
    let output = Command::new("yt-dlp")
        .args([
            "--dump-json",
            "--no-download",
            "--no-warnings",
            "--no-playlist",
            url,
        ])
        .output()
        .await
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                NotatError::ToolNotFound("yt-dlp".to_string())
            } else {
                NotatError::Download(format!("Failed to run yt-dlp: {}", e))
            }
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(NotatError::SourceNotFound(format!(
            "Source unavailable at {}: {}",
            url, stderr
        )));
    }

    let json_str = String::from_utf8_lossy(&output.stdout);
    let json: serde_json::Value = serde_json::from_str(&json_str)
        .map_err(|e| NotatError::Download(format!("Failed to parse yt-dlp output: {}", e)))?;

    Ok(parse_metadata(&json))
}

/// Extract the fields we care about from a yt-dlp info JSON object.
fn parse_metadata(json: &serde_json::Value) -> SourceMetadata {
    let title = json["title"].as_str().map(|s| s.to_string());
    let duration = json["duration"].as_f64();

    let published_at = json["upload_date"].as_str().and_then(|date_str| {
        // yt-dlp returns date as YYYYMMDD
        if date_str.len() == 8 {
            chrono::NaiveDate::parse_from_str(date_str, "%Y%m%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(|dt| dt.and_utc())
        } else {
            None
        }
    });

    SourceMetadata {
        title,
        duration_seconds: duration,
        // The downloader never sees the original container, so the true
        // input size stays unknown for remote sources.
        original_byte_size: None,
        published_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_metadata_full() {
        let json = serde_json::json!({
            "title": "Intro to Compilers",
            "duration": 3120.5,
            "upload_date": "20250310",
        });

        let meta = parse_metadata(&json);
        assert_eq!(meta.title.as_deref(), Some("Intro to Compilers"));
        assert_eq!(meta.duration_seconds, Some(3120.5));
        assert!(meta.published_at.is_some());
        assert_eq!(meta.original_byte_size, None);
    }

    #[test]
    fn test_parse_metadata_missing_fields() {
        let json = serde_json::json!({});
        let meta = parse_metadata(&json);
        assert!(meta.title.is_none());
        assert!(meta.duration_seconds.is_none());
        assert!(meta.published_at.is_none());
    }

    #[test]
    fn test_parse_metadata_bad_upload_date() {
        let json = serde_json::json!({ "upload_date": "not-a-date" });
        let meta = parse_metadata(&json);
        assert!(meta.published_at.is_none());
    }

    #[test]
    fn test_postprocessor_args_match_transcode_format() {
        assert!(POSTPROCESSOR_ARGS.contains("-ac 1"));
        assert!(POSTPROCESSOR_ARGS.contains("-b:a 32k"));
        assert!(POSTPROCESSOR_ARGS.contains("-ar 22050"));
    }
}
