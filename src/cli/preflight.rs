//! Pre-flight checks before expensive operations.
//!
//! Validates that required tools and configuration are available
//! before starting a digest that would otherwise fail midway.

use crate::config::Settings;
use crate::error::{NotatError, Result};
use std::process::Command;

/// Run pre-flight checks for a digest of the given kind.
///
/// Returns Ok(()) if all checks pass, or an error describing what's missing.
pub fn check(settings: &Settings, remote: bool) -> Result<()> {
    check_tool("ffmpeg")?;
    check_tool("ffprobe")?;
    if remote {
        check_tool("yt-dlp")?;
    }
    check_api_key()?;
    check_model(settings)?;
    Ok(())
}

/// Check if the OpenAI API key is configured.
fn check_api_key() -> Result<()> {
    match std::env::var("OPENAI_API_KEY") {
        Ok(key) if !key.is_empty() => Ok(()),
        Ok(_) => Err(NotatError::Config(
            "OPENAI_API_KEY is empty. Set it with: export OPENAI_API_KEY='sk-...'".to_string(),
        )),
        Err(_) => Err(NotatError::Config(
            "OPENAI_API_KEY not set. Set it with: export OPENAI_API_KEY='sk-...'".to_string(),
        )),
    }
}

/// Check if the whisper model file exists.
fn check_model(settings: &Settings) -> Result<()> {
    let model_path = settings.model_path();
    if model_path.exists() {
        Ok(())
    } else {
        Err(NotatError::Config(format!(
            "Whisper model not found at {}. Download one from \
             https://huggingface.co/ggerganov/whisper.cpp and set \
             transcription.model_path in your config.",
            model_path.display()
        )))
    }
}

/// Check if an external tool is available.
fn check_tool(name: &str) -> Result<()> {
    // ffmpeg/ffprobe use -version (single dash), others use --version
    let version_arg = match name {
        "ffmpeg" | "ffprobe" => "-version",
        _ => "--version",
    };
    match Command::new(name).arg(version_arg).output() {
        Ok(output) if output.status.success() => Ok(()),
        Ok(_) => Err(NotatError::ToolNotFound(format!(
            "{} is installed but not working correctly",
            name
        ))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(NotatError::ToolNotFound(name.to_string()))
        }
        Err(e) => Err(NotatError::ToolNotFound(format!("{}: {}", name, e))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_model_missing() {
        let mut settings = Settings::default();
        settings.transcription.model_path = "/no/such/model.bin".to_string();

        let err = check_model(&settings).unwrap_err();
        assert!(matches!(err, NotatError::Config(_)));
    }

    #[test]
    fn test_check_model_present() {
        let dir = tempfile::tempdir().unwrap();
        let model = dir.path().join("ggml-base.bin");
        std::fs::write(&model, b"model bytes").unwrap();

        let mut settings = Settings::default();
        settings.transcription.model_path = model.to_string_lossy().to_string();

        assert!(check_model(&settings).is_ok());
    }
}
