//! Configuration settings for Notat.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub transcription: TranscriptionSettings,
    pub summary: SummarySettings,
    pub timeouts: TimeoutSettings,
    pub prompts: PromptSettings,
}


/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Directory for storing application data.
    pub data_dir: String,
    /// Working directory for produced artifacts (audio, transcripts).
    pub work_dir: String,
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            data_dir: "~/.notat".to_string(),
            work_dir: "~/.notat/processed".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// Transcription settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriptionSettings {
    /// Path to the whisper.cpp GGML model file.
    pub model_path: String,
    /// Language hint ("auto" lets the model detect it).
    pub language: String,
}

impl Default for TranscriptionSettings {
    fn default() -> Self {
        Self {
            model_path: "~/.notat/models/ggml-base.bin".to_string(),
            language: "auto".to_string(),
        }
    }
}

/// Study-guide summarization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SummarySettings {
    /// Chat model used for study-guide generation.
    pub model: String,
    /// Upper bound on key-concept bullets in the study guide.
    pub max_key_concepts: usize,
}

impl Default for SummarySettings {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            max_key_concepts: 8,
        }
    }
}

/// Per-stage timeout budgets in seconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutSettings {
    /// Budget for source resolution (transcode or download).
    pub resolve_secs: u64,
    /// Budget for model transcription.
    pub transcribe_secs: u64,
    /// Budget for the remote summarization call.
    pub summarize_secs: u64,
}

impl Default for TimeoutSettings {
    fn default() -> Self {
        Self {
            resolve_secs: 600,
            transcribe_secs: 1800,
            summarize_secs: 120,
        }
    }
}

/// Prompt customization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct PromptSettings {
    /// Directory for custom prompts (overrides defaults).
    pub custom_dir: Option<String>,
    /// Custom variables available in all prompts as {{variable_name}}.
    pub variables: std::collections::HashMap<String, String>,
}


impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Save settings to the default configuration file.
    pub fn save(&self) -> crate::error::Result<()> {
        self.save_to(&Self::default_config_path())
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::NotatError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("notat")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded data directory path.
    pub fn data_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.data_dir)
    }

    /// Get the expanded working directory path.
    pub fn work_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.work_dir)
    }

    /// Get the expanded whisper model path.
    pub fn model_path(&self) -> PathBuf {
        Self::expand_path(&self.transcription.model_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.summary.model, "gpt-4o-mini");
        assert_eq!(settings.summary.max_key_concepts, 8);
        assert_eq!(settings.transcription.language, "auto");
        assert!(settings.timeouts.transcribe_secs > settings.timeouts.summarize_secs);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let settings: Settings = toml::from_str(
            r#"
            [summary]
            model = "gpt-4.1"
            "#,
        )
        .unwrap();

        assert_eq!(settings.summary.model, "gpt-4.1");
        // Untouched tables keep their defaults
        assert_eq!(settings.summary.max_key_concepts, 8);
        assert_eq!(settings.general.log_level, "info");
    }

    #[test]
    fn test_toml_round_trip() {
        let settings = Settings::default();
        let toml_str = toml::to_string_pretty(&settings).unwrap();
        let parsed: Settings = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.general.data_dir, settings.general.data_dir);
        assert_eq!(parsed.timeouts.resolve_secs, settings.timeouts.resolve_secs);
    }

    #[test]
    fn test_expand_path() {
        let path = Settings::expand_path("/tmp/notat");
        assert_eq!(path, PathBuf::from("/tmp/notat"));

        let home = Settings::expand_path("~/.notat");
        assert!(!home.to_string_lossy().starts_with('~'));
    }
}
