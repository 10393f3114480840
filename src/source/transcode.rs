//! Local-file audio extraction using ffmpeg.
//!
//! Strips the video stream, downmixes to mono, and re-encodes at a fixed low
//! bitrate. The uniform output format keeps transcription cost and storage
//! bounded no matter what the user uploads.

use super::{
    artifact_filename, new_artifact_id, verify_artifact, AudioArtifact, ResolvedSource,
    SourceMetadata,
};
use crate::error::{NotatError, Result};
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, instrument, warn};

/// Target bitrate for extracted speech audio.
const AUDIO_BITRATE: &str = "32k";

/// Target sample rate in Hz.
const AUDIO_SAMPLE_RATE: &str = "22050";

/// Extract a compressed mono audio artifact from a local media file.
#[instrument(skip(work_dir), fields(input = %input.display()))]
pub async fn extract_audio(input: &Path, work_dir: &Path) -> Result<ResolvedSource> {
    let original_byte_size = match std::fs::metadata(input) {
        Ok(meta) => meta.len(),
        Err(_) => {
            return Err(NotatError::SourceNotFound(format!(
                "File not found: {}",
                input.display()
            )))
        }
    };

    std::fs::create_dir_all(work_dir)?;

    let id = new_artifact_id();
    let output = work_dir.join(artifact_filename(&id));

    debug!("Transcoding to {}", output.display());

    let result = Command::new("ffmpeg")
        .args(transcode_args(input, &output))
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .output()
        .await;

    let cmd_output = match result {
        Ok(o) => o,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(NotatError::ToolNotFound("ffmpeg".into()));
        }
        Err(e) => {
            return Err(NotatError::Transcode(format!(
                "ffmpeg execution failed: {e}"
            )));
        }
    };

    if !cmd_output.status.success() {
        let stderr = String::from_utf8_lossy(&cmd_output.stderr);
        let _ = std::fs::remove_file(&output);
        return Err(NotatError::Transcode(format!("ffmpeg failed: {stderr}")));
    }

    let byte_size = verify_artifact(&output)?;

    let (duration, title) = probe_metadata(input).await.unwrap_or_else(|e| {
        warn!("ffprobe metadata unavailable: {}", e);
        (None, None)
    });

    Ok(ResolvedSource {
        artifact: AudioArtifact {
            id,
            path: output,
            byte_size,
        },
        metadata: SourceMetadata {
            title,
            duration_seconds: duration,
            original_byte_size: Some(original_byte_size),
            published_at: None,
        },
    })
}

/// ffmpeg argument list for the fixed speech-audio format.
fn transcode_args(input: &Path, output: &Path) -> Vec<std::ffi::OsString> {
    vec![
        "-i".into(),
        input.as_os_str().to_os_string(),
        "-vn".into(),
        "-ac".into(),
        "1".into(),
        "-codec:a".into(),
        "libmp3lame".into(),
        "-b:a".into(),
        AUDIO_BITRATE.into(),
        "-ar".into(),
        AUDIO_SAMPLE_RATE.into(),
        "-y".into(),
        "-loglevel".into(),
        "error".into(),
        output.as_os_str().to_os_string(),
    ]
}

/// Read duration and title tags from the input container using ffprobe.
///
/// Probe failure is non-fatal; resolution continues without metadata.
async fn probe_metadata(path: &Path) -> Result<(Option<f64>, Option<String>)> {
    let output = Command::new("ffprobe")
        .args([
            "-v",
            "quiet",
            "-print_format",
            "json",
            "-show_format",
            path.to_str().unwrap_or(""),
        ])
        .output()
        .await
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                NotatError::ToolNotFound("ffprobe".to_string())
            } else {
                NotatError::Transcode(format!("Failed to run ffprobe: {}", e))
            }
        })?;

    if !output.status.success() {
        return Ok((None, None));
    }

    let json_str = String::from_utf8_lossy(&output.stdout);
    let json: serde_json::Value = serde_json::from_str(&json_str).unwrap_or_default();

    let duration = json["format"]["duration"]
        .as_str()
        .and_then(|d| d.parse::<f64>().ok());

    let title = json["format"]["tags"]["title"]
        .as_str()
        .map(|s| s.to_string());

    Ok((duration, title))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transcode_args_fixed_format() {
        let args = transcode_args(Path::new("in.mp4"), Path::new("out.mp3"));
        let args: Vec<String> = args
            .iter()
            .map(|a| a.to_string_lossy().to_string())
            .collect();

        // Video stripped, mono, fixed bitrate and sample rate, overwrite
        assert!(args.contains(&"-vn".to_string()));
        let ac = args.iter().position(|a| a == "-ac").unwrap();
        assert_eq!(args[ac + 1], "1");
        let bitrate = args.iter().position(|a| a == "-b:a").unwrap();
        assert_eq!(args[bitrate + 1], "32k");
        let rate = args.iter().position(|a| a == "-ar").unwrap();
        assert_eq!(args[rate + 1], "22050");
        assert!(args.contains(&"-y".to_string()));
    }

    #[test]
    fn test_transcode_args_order() {
        let args = transcode_args(Path::new("in.mp4"), Path::new("out.mp3"));
        // Input right after -i, output last
        assert_eq!(args[0].to_string_lossy(), "-i");
        assert_eq!(args[1].to_string_lossy(), "in.mp4");
        assert_eq!(args.last().unwrap().to_string_lossy(), "out.mp3");
    }

    #[tokio::test]
    async fn test_extract_audio_missing_input() {
        let dir = tempfile::tempdir().unwrap();
        let err = extract_audio(Path::new("/no/such/input.mp4"), dir.path())
            .await
            .unwrap_err();
        assert!(matches!(err, NotatError::SourceNotFound(_)));
    }
}
