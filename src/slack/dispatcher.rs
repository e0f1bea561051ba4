use std::io::Write;

use async_trait::async_trait;
use tracing::info;

use super::client::SlackClient;
use crate::core::config::{SLACK_BOT_TOKEN, Setting};
use crate::core::models::OutboundMessage;
use crate::errors::BriefingError;

/// Delivers one formatted message to its destination.
#[async_trait]
pub trait Dispatcher: Send + Sync {
    /// # Errors
    ///
    /// Returns `MissingConfiguration` when no credential is available (no
    /// network call is made), `DeliveryFailure` when the destination rejects
    /// the post, or `Transport` when it cannot be reached.
    async fn post(&self, message: &OutboundMessage) -> Result<(), BriefingError>;

    /// The variable that must be set before `post` can succeed, if any.
    /// Checked before a topic spends any fetch or summarizer calls.
    fn missing_credential(&self) -> Option<&'static str> {
        None
    }
}

/// Posts through Slack's `chat.postMessage`.
pub struct SlackDispatcher {
    client: Option<SlackClient>,
}

impl SlackDispatcher {
    #[must_use]
    pub fn new(client: SlackClient) -> Self {
        Self {
            client: Some(client),
        }
    }

    #[must_use]
    pub fn from_token(token: &Setting<String>) -> Self {
        Self {
            client: token.configured().cloned().map(SlackClient::new),
        }
    }
}

#[async_trait]
impl Dispatcher for SlackDispatcher {
    async fn post(&self, message: &OutboundMessage) -> Result<(), BriefingError> {
        let client = self
            .client
            .as_ref()
            .ok_or(BriefingError::MissingConfiguration {
                name: SLACK_BOT_TOKEN,
            })?;

        client
            .post_message(&message.destination, &message.body)
            .await?;
        info!(channel = %message.destination, "Message posted to Slack successfully");
        Ok(())
    }

    fn missing_credential(&self) -> Option<&'static str> {
        self.client.is_none().then_some(SLACK_BOT_TOKEN)
    }
}

/// Writes messages to stdout instead of posting them.
pub struct DryRunDispatcher;

#[async_trait]
impl Dispatcher for DryRunDispatcher {
    async fn post(&self, message: &OutboundMessage) -> Result<(), BriefingError> {
        let mut out = std::io::stdout().lock();
        writeln!(out, "── {} ──\n{}\n", message.destination, message.body)
            .map_err(|e| BriefingError::Transport(format!("stdout: {e}")))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_token_fails_before_any_network_call() {
        let dispatcher = SlackDispatcher::from_token(&Setting::Unconfigured {
            missing: vec![SLACK_BOT_TOKEN],
        });
        let err = dispatcher
            .post(&OutboundMessage::new("C123", "hello"))
            .await
            .unwrap_err();

        match err {
            BriefingError::MissingConfiguration { name } => assert_eq!(name, SLACK_BOT_TOKEN),
            other => panic!("expected missing configuration, got {other:?}"),
        }
    }

    #[test]
    fn only_tokenless_slack_reports_a_missing_credential() {
        let tokenless = SlackDispatcher::from_token(&Setting::Unconfigured {
            missing: vec![SLACK_BOT_TOKEN],
        });
        assert_eq!(tokenless.missing_credential(), Some(SLACK_BOT_TOKEN));

        let ready = SlackDispatcher::from_token(&Setting::Configured("xoxb-test".to_string()));
        assert_eq!(ready.missing_credential(), None);
        assert_eq!(DryRunDispatcher.missing_credential(), None);
    }

    #[tokio::test]
    async fn dry_run_always_succeeds() {
        let result = DryRunDispatcher
            .post(&OutboundMessage::new("#general", "No upcoming events for tomorrow."))
            .await;
        assert!(result.is_ok());
    }
}
