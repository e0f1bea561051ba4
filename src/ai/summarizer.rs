use async_trait::async_trait;
use tracing::{debug, error, warn};

use super::client::LlmClient;
use crate::core::config::{OPENAI_API_KEY, OpenAiSettings, Setting};
use crate::utils::text::{MAX_SUMMARY_INPUT_CHARS, truncate_chars};

/// Reduces free-form text to a short paragraph. `None` means "no summary":
/// the caller skips the item rather than failing the batch.
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, text: &str) -> Option<String>;
}

/// Summarizer backed by the `OpenAI` Responses API.
pub struct OpenAiSummarizer {
    client: Option<LlmClient>,
}

impl OpenAiSummarizer {
    #[must_use]
    pub fn new(client: LlmClient) -> Self {
        Self {
            client: Some(client),
        }
    }

    /// A summarizer that always declines, logging the missing credential.
    #[must_use]
    pub fn unconfigured() -> Self {
        Self { client: None }
    }

    #[must_use]
    pub fn from_settings(settings: &Setting<OpenAiSettings>) -> Self {
        match settings.configured() {
            Some(s) => Self::new(LlmClient::new(
                s.api_key.clone(),
                s.org_id.clone(),
                s.model.clone(),
            )),
            None => Self::unconfigured(),
        }
    }

    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.client.is_some()
    }
}

#[async_trait]
impl Summarizer for OpenAiSummarizer {
    async fn summarize(&self, text: &str) -> Option<String> {
        let text = text.trim();
        if text.is_empty() {
            debug!("Nothing to summarize; skipping OpenAI call");
            return None;
        }

        let Some(client) = &self.client else {
            warn!(
                variable = OPENAI_API_KEY,
                "{} not set; cannot summarize", OPENAI_API_KEY
            );
            return None;
        };

        let input = truncate_chars(text, MAX_SUMMARY_INPUT_CHARS);
        match client.generate_summary(client.build_prompt(&input)).await {
            Ok(summary) => Some(summary),
            Err(e) => {
                error!(kind = e.kind(), "Failed to generate summary: {}", e);
                None
            }
        }
    }
}
