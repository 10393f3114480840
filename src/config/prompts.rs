//! Prompt templates for Notat.
//!
//! Prompts can be customized by placing TOML files in the custom prompts directory.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Prompts {
    pub study_guide: StudyGuidePrompts,
    /// Custom variables from config, available in all prompts.
    #[serde(skip)]
    pub variables: std::collections::HashMap<String, String>,
}


/// Prompts for study-guide generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StudyGuidePrompts {
    pub system: String,
    pub user: String,
}

impl Default for StudyGuidePrompts {
    fn default() -> Self {
        Self {
            system: r###"You are a study assistant that turns lecture transcripts into concise, well-structured study guides.

Guidelines:
- Work only from the transcript; never invent material the lecturer did not cover
- Prefer the lecturer's own terminology for names and technical terms
- Keep the output compact enough to review in a few minutes
- Answer in plain markdown: "##" section headings, "-" bullets, "**bold**" for emphasis"###
                .to_string(),

            user: r#"Create a study guide for the following lecture transcript.

Structure your answer in markdown with exactly three sections:

## Subject
One sentence stating what the lecture is about.

## Key Concepts
A bullet list of the most important concepts and definitions (at most {{max_concepts}} bullets).

## Summary
A short narrative summary of the lecture.

Transcript:
{{transcript}}"#
                .to_string(),
        }
    }
}

impl Prompts {
    /// Load prompts from the default location, with optional custom directory and variables.
    pub fn load(
        custom_dir: Option<&str>,
        custom_variables: Option<&std::collections::HashMap<String, String>>,
    ) -> crate::error::Result<Self> {
        let mut prompts = Prompts::default();

        // Store custom variables
        if let Some(vars) = custom_variables {
            prompts.variables = vars.clone();
        }

        if let Some(dir) = custom_dir {
            let custom_path = PathBuf::from(shellexpand::tilde(dir).to_string());

            // Load study-guide prompts if file exists
            let study_guide_path = custom_path.join("study_guide.toml");
            if study_guide_path.exists() {
                let content = std::fs::read_to_string(&study_guide_path)?;
                prompts.study_guide = toml::from_str(&content)?;
            }
        }

        Ok(prompts)
    }

    /// Render a prompt template with the given variables.
    pub fn render(template: &str, vars: &std::collections::HashMap<String, String>) -> String {
        let mut result = template.to_string();
        for (key, value) in vars {
            result = result.replace(&format!("{{{{{}}}}}", key), value);
        }
        result
    }

    /// Render a prompt template with both provided variables and custom config variables.
    /// Provided variables take precedence over custom config variables.
    pub fn render_with_custom(
        &self,
        template: &str,
        vars: &std::collections::HashMap<String, String>,
    ) -> String {
        // Start with custom variables, then override with provided vars
        let mut merged = self.variables.clone();
        for (key, value) in vars {
            merged.insert(key.clone(), value.clone());
        }
        Self::render(template, &merged)
    }
}
