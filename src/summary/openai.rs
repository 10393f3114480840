//! OpenAI-backed study-guide summarizer.

use super::{fallback_summary, render_markdown, Summarizer, SummaryDocument};
use crate::config::Prompts;
use crate::error::{NotatError, Result};
use crate::openai::{create_client, is_api_key_configured};
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
};
use async_trait::async_trait;
use std::collections::HashMap;
use tracing::{debug, instrument, warn};

/// Summarizer backed by the OpenAI chat completions API.
pub struct OpenAiSummarizer {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
    prompts: Prompts,
    max_concepts: usize,
}

impl OpenAiSummarizer {
    /// Create a summarizer.
    ///
    /// Fails with a configuration error when no API credential is present;
    /// a missing credential is a startup condition, not a per-request one.
    pub fn new(model: &str, prompts: Prompts, max_concepts: usize) -> Result<Self> {
        if !is_api_key_configured() {
            return Err(NotatError::Config(
                "OPENAI_API_KEY not set. Set it with: export OPENAI_API_KEY='sk-...'".to_string(),
            ));
        }

        Ok(Self {
            client: create_client()?,
            model: model.to_string(),
            prompts,
            max_concepts,
        })
    }

    /// One request, no streaming, no retry. Callers decide how failure
    /// degrades.
    async fn request_study_guide(&self, transcript: &str) -> Result<String> {
        let mut vars = HashMap::new();
        vars.insert("transcript".to_string(), transcript.to_string());
        vars.insert("max_concepts".to_string(), self.max_concepts.to_string());

        let user_prompt = self
            .prompts
            .render_with_custom(&self.prompts.study_guide.user, &vars);

        let messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(self.prompts.study_guide.system.clone())
                .build()
                .map_err(|e| NotatError::OpenAI(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(user_prompt)
                .build()
                .map_err(|e| NotatError::OpenAI(e.to_string()))?
                .into(),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .temperature(0.4)
            .build()
            .map_err(|e| NotatError::OpenAI(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| NotatError::OpenAI(format!("Study guide request failed: {}", e)))?;

        let content = response
            .choices
            .first()
            .and_then(|c| c.message.content.as_ref())
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .ok_or_else(|| NotatError::OpenAI("Empty response from model".to_string()))?;

        debug!("Received study guide ({} chars)", content.len());
        Ok(content)
    }
}

#[async_trait]
impl Summarizer for OpenAiSummarizer {
    #[instrument(skip(self, transcript), fields(transcript_chars = transcript.chars().count()))]
    async fn summarize(&self, transcript: &str) -> SummaryDocument {
        match self.request_study_guide(transcript).await {
            Ok(markdown) => SummaryDocument::AiGenerated {
                html: render_markdown(&markdown),
            },
            Err(e) => {
                warn!("Study guide unavailable, falling back to preview: {}", e);
                fallback_summary(transcript)
            }
        }
    }
}
