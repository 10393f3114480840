//! Study-guide summarization for Notat.
//!
//! The production summarizer calls a remote generative-text service. The
//! remote dependency is treated as best-effort: any failure degrades to a
//! deterministic transcript preview, so a finished pipeline always carries
//! *some* summary.

mod markup;
mod openai;

pub use markup::render_markdown;
pub use openai::OpenAiSummarizer;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// How many characters of transcript the fallback summary previews.
pub const FALLBACK_PREVIEW_CHARS: usize = 500;

/// Marker appended to every fallback summary.
pub const SUMMARY_UNAVAILABLE_MARKER: &str = "... (AI summary unavailable)";

/// A summary document, tagged by which path produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SummaryDocument {
    /// AI-generated study guide, rendered to HTML for display.
    AiGenerated { html: String },
    /// Transcript preview used when the AI service is unavailable.
    Fallback { text: String },
}

impl SummaryDocument {
    /// The displayable body, whichever path produced it.
    pub fn body(&self) -> &str {
        match self {
            SummaryDocument::AiGenerated { html } => html,
            SummaryDocument::Fallback { text } => text,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, SummaryDocument::Fallback { .. })
    }
}

/// Trait for summarizers.
///
/// Deliberately infallible: implementations degrade internally rather than
/// surfacing remote-service errors to the pipeline.
#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Produce a summary document for a transcript.
    async fn summarize(&self, transcript: &str) -> SummaryDocument;
}

/// Build the deterministic fallback summary for a transcript.
///
/// First 500 characters (whole characters, never split) plus the fixed
/// unavailable marker. Transcripts shorter than the preview window come
/// through whole.
pub fn fallback_summary(transcript: &str) -> SummaryDocument {
    let preview: String = transcript.chars().take(FALLBACK_PREVIEW_CHARS).collect();
    SummaryDocument::Fallback {
        text: format!("{}{}", preview, SUMMARY_UNAVAILABLE_MARKER),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_truncates_long_transcript() {
        let transcript = "x".repeat(2000);
        let summary = fallback_summary(&transcript);

        assert!(summary.is_fallback());
        let expected = format!("{}{}", "x".repeat(500), SUMMARY_UNAVAILABLE_MARKER);
        assert_eq!(summary.body(), expected);
    }

    #[test]
    fn test_fallback_keeps_short_transcript_whole() {
        let transcript = "A short lecture about nothing much.";
        let summary = fallback_summary(transcript);

        let expected = format!("{}{}", transcript, SUMMARY_UNAVAILABLE_MARKER);
        assert_eq!(summary.body(), expected);
    }

    #[test]
    fn test_fallback_respects_char_boundaries() {
        // 499 ASCII chars followed by multi-byte characters
        let transcript = format!("{}æøå日本語", "x".repeat(499));
        let summary = fallback_summary(&transcript);

        // 500 whole characters, never a sliced code point
        let expected_preview: String = transcript.chars().take(500).collect();
        assert!(summary.body().starts_with(&expected_preview));
        assert!(summary.body().ends_with(SUMMARY_UNAVAILABLE_MARKER));
    }

    #[test]
    fn test_summary_document_tags() {
        let ai = SummaryDocument::AiGenerated {
            html: "<p>hi</p>".into(),
        };
        assert!(!ai.is_fallback());
        assert_eq!(ai.body(), "<p>hi</p>");

        let json = serde_json::to_value(&ai).unwrap();
        assert_eq!(json["kind"], "ai_generated");
    }
}
