//! Slack API client module
//!
//! Encapsulates the `chat.postMessage` call used to deliver briefings.

use slack_morphism::hyper_tokio::{SlackClientHyperConnector, SlackHyperClient};
use slack_morphism::prelude::SlackApiChatPostMessageRequest;
use slack_morphism::{SlackApiToken, SlackApiTokenValue, SlackChannelId, SlackMessageContent};
use tracing::{debug, warn};

use crate::errors::BriefingError;

// Build the Slack client connector without panicking.
// If connector construction fails, store None and surface an error at call sites.
static SLACK_CLIENT: std::sync::LazyLock<Option<SlackHyperClient>> =
    std::sync::LazyLock::new(|| match SlackClientHyperConnector::new() {
        Ok(connector) => Some(SlackHyperClient::new(connector)),
        Err(e) => {
            warn!("Failed to create Slack HTTP connector: {}", e);
            None
        }
    });

/// Slack Web API client bound to one bot token
pub struct SlackClient {
    token: SlackApiToken,
}

impl SlackClient {
    #[must_use]
    pub fn new(token: String) -> Self {
        Self {
            token: SlackApiToken::new(SlackApiTokenValue::new(token)),
        }
    }

    /// Post `message` as a single message. No retry: a rejected post is
    /// reported once and dropped.
    ///
    /// # Errors
    ///
    /// Returns `DeliveryFailure` with Slack's error code when the API rejects
    /// the post, or `Transport` when Slack cannot be reached.
    pub async fn post_message(&self, channel_id: &str, message: &str) -> Result<(), BriefingError> {
        let session = SLACK_CLIENT
            .as_ref()
            .ok_or_else(|| {
                BriefingError::Transport("Slack HTTP connector not initialized".to_string())
            })?
            .open_session(&self.token);

        let post_req = SlackApiChatPostMessageRequest::new(
            SlackChannelId(channel_id.to_string()),
            SlackMessageContent::new().with_text(message.to_string()),
        );

        let response = session.chat_post_message(&post_req).await?;
        debug!(
            channel = %response.channel.0,
            ts = %response.ts.0,
            "chat.postMessage accepted"
        );

        Ok(())
    }
}
