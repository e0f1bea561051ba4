use tracing::error;

use super::TopicOutcome;
use crate::core::models::OutboundMessage;
use crate::errors::BriefingError;
use crate::slack::Dispatcher;

/// Post once and fold the result into an outcome. Failures are logged here
/// and never returned to the caller.
pub async fn deliver(dispatcher: &dyn Dispatcher, message: OutboundMessage) -> TopicOutcome {
    match dispatcher.post(&message).await {
        Ok(()) => TopicOutcome::Posted,
        Err(BriefingError::MissingConfiguration { name }) => {
            error!(
                variable = name,
                channel = %message.destination,
                "Cannot post message: {} is not set", name
            );
            TopicOutcome::Unconfigured { missing: name }
        }
        Err(e) => {
            match &e {
                BriefingError::DeliveryFailure { code } => error!(
                    code = %code,
                    channel = %message.destination,
                    "Error posting message to Slack: {}", code
                ),
                other => error!(
                    kind = other.kind(),
                    channel = %message.destination,
                    "Error posting message to Slack: {}", other
                ),
            }
            TopicOutcome::DeliveryFailed(e)
        }
    }
}
