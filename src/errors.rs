use slack_morphism::errors::SlackClientError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BriefingError {
    #[error("Missing configuration: {name} is not set")]
    MissingConfiguration { name: &'static str },

    #[error("Failed to reach collaborator: {0}")]
    Transport(String),

    #[error("Unexpected response from collaborator: {0}")]
    MalformedResponse(String),

    #[error("Slack rejected the message: {code}")]
    DeliveryFailure { code: String },

    #[error("Failed to load topic catalog: {0}")]
    TopicCatalog(String),
}

impl BriefingError {
    /// Short machine-friendly name used as a structured log field.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MissingConfiguration { .. } => "missing_configuration",
            Self::Transport(_) => "transport_failure",
            Self::MalformedResponse(_) => "malformed_response",
            Self::DeliveryFailure { .. } => "delivery_failure",
            Self::TopicCatalog(_) => "topic_catalog",
        }
    }
}

impl From<reqwest::Error> for BriefingError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            BriefingError::MalformedResponse(error.to_string())
        } else {
            BriefingError::Transport(error.to_string())
        }
    }
}

impl From<serde_json::Error> for BriefingError {
    fn from(error: serde_json::Error) -> Self {
        BriefingError::MalformedResponse(error.to_string())
    }
}

impl From<SlackClientError> for BriefingError {
    fn from(error: SlackClientError) -> Self {
        match error {
            SlackClientError::ApiError(api) => BriefingError::DeliveryFailure { code: api.code },
            SlackClientError::RateLimitError(_) => BriefingError::DeliveryFailure {
                code: "ratelimited".to_string(),
            },
            other => BriefingError::Transport(other.to_string()),
        }
    }
}
