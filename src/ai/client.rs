//! LLM (`OpenAI`) API client module
//!
//! Encapsulates the Responses API call used to condense article text.

use openai_api_rs::v1::chat_completion::{ChatCompletionMessage, Content, MessageRole};
use reqwest::Client;
use serde_json::{Value, json};
use std::time::Duration;
use tracing::{debug, info};

use crate::errors::BriefingError;

const RESPONSES_URL: &str = "https://api.openai.com/v1/responses";
const MAX_OUTPUT_TOKENS: usize = 400;

pub const SUMMARY_INSTRUCTION: &str = "You summarize news for a Slack channel. \
    Summarize the text you are given concisely in plain prose: at most three sentences, \
    no preamble, no bullet points, no markdown headings. \
    Never invent facts that are not in the text.";

static HTTP_CLIENT: std::sync::LazyLock<Client> = std::sync::LazyLock::new(|| {
    Client::builder()
        .timeout(Duration::from_secs(30))
        .build()
        .unwrap_or_else(|_| Client::new())
});

#[must_use]
pub fn estimate_tokens(text: &str) -> usize {
    text.chars().count() / 4 + 1
}

/// LLM API client for generating summaries
pub struct LlmClient {
    api_key: String,
    org_id: Option<String>,
    model_name: String,
}

impl LlmClient {
    #[must_use]
    pub fn new(api_key: String, org_id: Option<String>, model_name: String) -> Self {
        Self {
            api_key,
            org_id,
            model_name,
        }
    }

    #[must_use]
    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    #[must_use]
    pub fn build_prompt(&self, text: &str) -> Vec<ChatCompletionMessage> {
        vec![
            ChatCompletionMessage {
                role: MessageRole::system,
                content: Content::Text(SUMMARY_INSTRUCTION.to_string()),
                name: None,
                tool_calls: None,
                tool_call_id: None,
            },
            ChatCompletionMessage {
                role: MessageRole::user,
                content: Content::Text(text.to_string()),
                name: None,
                tool_calls: None,
                tool_call_id: None,
            },
        ]
    }

    /// # Errors
    ///
    /// Returns `Transport` if the HTTP request fails or `OpenAI` answers with
    /// a non-2xx status, and `MalformedResponse` if the body carries no text.
    pub async fn generate_summary(
        &self,
        prompt: Vec<ChatCompletionMessage>,
    ) -> Result<String, BriefingError> {
        #[cfg(feature = "debug-logs")]
        debug!("Using summary prompt:\n{:?}", prompt);

        let estimated_input_tokens = prompt
            .iter()
            .map(|msg| estimate_tokens(&format!("{:?}", msg.content)))
            .sum::<usize>();
        info!(
            model = %self.model_name,
            estimated_input_tokens,
            "Requesting summary"
        );

        let request_body = json!({
            "model": self.model_name,
            "input": build_responses_input_from_prompt(&prompt),
            "max_output_tokens": MAX_OUTPUT_TOKENS,
        });

        let mut request = HTTP_CLIENT
            .post(RESPONSES_URL)
            .bearer_auth(&self.api_key)
            .json(&request_body);
        if let Some(org) = &self.org_id {
            request = request.header("OpenAI-Organization", org);
        }

        let response = request
            .send()
            .await
            .map_err(|e| BriefingError::Transport(format!("OpenAI API request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_else(|e| {
                format!("Failed to read error response body (status {status}): {e}")
            });
            return Err(BriefingError::Transport(format!(
                "OpenAI API error (status {status}): {error_text}"
            )));
        }

        let response_json: Value = response.json().await.map_err(|e| {
            BriefingError::MalformedResponse(format!("Failed to parse OpenAI response: {e}"))
        })?;

        let text = extract_output_text(&response_json)
            .ok_or_else(|| BriefingError::MalformedResponse("No text in response".to_string()))?;
        debug!(chars = text.len(), "Summary received");
        Ok(text)
    }
}

/// Pull the generated text out of a Responses API body: the `output_text`
/// convenience field when present, otherwise every `output_text` part of
/// the `output` items joined by newlines.
#[must_use]
pub fn extract_output_text(response_json: &Value) -> Option<String> {
    if let Some(text) = response_json.get("output_text").and_then(Value::as_str) {
        let trimmed = text.trim();
        return (!trimmed.is_empty()).then(|| trimmed.to_string());
    }

    let mut collected: Vec<String> = Vec::new();
    let items = response_json.get("output").and_then(Value::as_array)?;
    for item in items {
        let Some(parts) = item.get("content").and_then(Value::as_array) else {
            continue;
        };
        for p in parts {
            let is_output_text = p
                .get("type")
                .and_then(Value::as_str)
                .is_some_and(|t| t == "output_text");
            if !is_output_text {
                continue;
            }
            if let Some(s) = p.get("text").and_then(Value::as_str) {
                collected.push(s.to_string());
            } else if let Some(s) = p
                .get("text")
                .and_then(|t| t.get("value"))
                .and_then(Value::as_str)
            {
                collected.push(s.to_string());
            }
        }
    }

    let joined = collected.join("\n");
    let trimmed = joined.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Build Responses API input payload from a chat-style prompt.
/// Assistant turns are dropped; text becomes `input_text` parts.
pub(crate) fn build_responses_input_from_prompt(prompt: &[ChatCompletionMessage]) -> Vec<Value> {
    prompt
        .iter()
        .filter(|m| !matches!(m.role, MessageRole::assistant))
        .filter_map(|m| {
            let role_str = match m.role {
                MessageRole::system => "system",
                MessageRole::user | MessageRole::function | MessageRole::tool => "user",
                MessageRole::assistant => "assistant",
            };

            match &m.content {
                Content::Text(t) => Some(json!({
                    "role": role_str,
                    "content": [{ "type": "input_text", "text": t }]
                })),
                Content::ImageUrl(_) => None,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_has_instruction_then_text() {
        let client = LlmClient::new("k".into(), None, "gpt-4o-mini".into());
        let prompt = client.build_prompt("Markets rallied.");
        assert_eq!(prompt.len(), 2);
        assert!(matches!(prompt[0].role, MessageRole::system));
        assert!(matches!(&prompt[1].content, Content::Text(t) if t == "Markets rallied."));
    }

    #[test]
    fn responses_input_uses_typed_text_parts() {
        let client = LlmClient::new("k".into(), None, "gpt-4o-mini".into());
        let input = build_responses_input_from_prompt(&client.build_prompt("hello"));

        assert_eq!(input.len(), 2);
        assert_eq!(input[0]["role"], "system");
        assert_eq!(input[1]["role"], "user");
        assert_eq!(input[1]["content"][0]["type"], "input_text");
        assert_eq!(input[1]["content"][0]["text"], "hello");
    }

    #[test]
    fn extracts_output_text_shortcut() {
        let body = json!({ "output_text": "  A short summary. " });
        assert_eq!(
            extract_output_text(&body).as_deref(),
            Some("A short summary.")
        );
    }

    #[test]
    fn extracts_text_from_output_items() {
        let body = json!({
            "output": [
                { "type": "reasoning", "content": [] },
                { "type": "message", "content": [
                    { "type": "output_text", "text": "First." },
                    { "type": "refusal", "refusal": "nope" },
                    { "type": "output_text", "text": { "value": "Second." } }
                ]}
            ]
        });
        assert_eq!(
            extract_output_text(&body).as_deref(),
            Some("First.\nSecond.")
        );
    }

    #[test]
    fn empty_output_is_none() {
        assert_eq!(extract_output_text(&json!({ "output": [] })), None);
        assert_eq!(extract_output_text(&json!({ "output_text": "  " })), None);
        assert_eq!(extract_output_text(&json!({ "id": "resp_1" })), None);
    }
}
