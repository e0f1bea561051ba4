use std::env;
use std::path::PathBuf;

use chrono_tz::Tz;
use tracing::warn;

use crate::errors::BriefingError;

pub const NEWS_API_KEY: &str = "NEWS_API_KEY";
pub const SLACK_BOT_TOKEN: &str = "SLACK_BOT_TOKEN";
pub const SLACK_CHANNEL_ID: &str = "SLACK_CHANNEL_ID";
pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";
pub const OPENAI_MODEL: &str = "OPENAI_MODEL";
pub const OPENAI_ORG_ID: &str = "OPENAI_ORG_ID";
pub const GOOGLE_CALENDAR_ACCESS_TOKEN: &str = "GOOGLE_CALENDAR_ACCESS_TOKEN";
pub const GOOGLE_CALENDAR_TOKEN_FILE: &str = "GOOGLE_CALENDAR_TOKEN_FILE";
pub const GOOGLE_CALENDAR_ID: &str = "GOOGLE_CALENDAR_ID";
pub const CALENDAR_SLACK_CHANNEL: &str = "CALENDAR_SLACK_CHANNEL";
pub const CALENDAR_TIMEZONE: &str = "CALENDAR_TIMEZONE";
pub const BRIEFING_POST_EMPTY: &str = "BRIEFING_POST_EMPTY";
pub const BRIEFING_TOPICS_FILE: &str = "BRIEFING_TOPICS_FILE";

pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_CALENDAR_ID: &str = "primary";
pub const DEFAULT_CALENDAR_CHANNEL: &str = "#general";
pub const DEFAULT_TOKEN_FILE: &str = "token.json";

/// A configuration value for one capability, or the names of the
/// variables that kept it from being configured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Setting<T> {
    Configured(T),
    Unconfigured { missing: Vec<&'static str> },
}

impl<T> Setting<T> {
    #[must_use]
    pub fn configured(&self) -> Option<&T> {
        match self {
            Self::Configured(value) => Some(value),
            Self::Unconfigured { .. } => None,
        }
    }

    #[must_use]
    pub fn is_configured(&self) -> bool {
        matches!(self, Self::Configured(_))
    }

    /// # Errors
    ///
    /// Returns `MissingConfiguration` naming the first missing variable.
    pub fn require(&self) -> Result<&T, BriefingError> {
        match self {
            Self::Configured(value) => Ok(value),
            Self::Unconfigured { .. } => Err(BriefingError::MissingConfiguration {
                name: self.first_missing().unwrap_or("unknown"),
            }),
        }
    }

    #[must_use]
    pub fn first_missing(&self) -> Option<&'static str> {
        match self {
            Self::Configured(_) => None,
            Self::Unconfigured { missing } => missing.first().copied(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenAiSettings {
    pub api_key: String,
    pub model: String,
    pub org_id: Option<String>,
}

/// Where the calendar bearer token comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CalendarCredential {
    AccessToken(String),
    TokenFile(PathBuf),
}

#[derive(Debug, Clone, PartialEq)]
pub struct CalendarSettings {
    pub credential: CalendarCredential,
    pub calendar_id: String,
    pub channel: String,
    pub timezone: Tz,
}

/// What to do with a batch that has nothing to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmptyBatchPolicy {
    /// Post nothing.
    #[default]
    Skip,
    /// Post the fixed "no items" sentence.
    PostNotice,
}

/// Everything a run needs, resolved once at startup and passed explicitly.
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub news_api_key: Setting<String>,
    pub slack_bot_token: Setting<String>,
    pub destination_channel: Setting<String>,
    pub openai: Setting<OpenAiSettings>,
    pub calendar: CalendarSettings,
    pub empty_batch: EmptyBatchPolicy,
    pub topics_file: Option<PathBuf>,
}

impl RunConfig {
    #[must_use]
    pub fn from_env() -> Self {
        Self::resolve(|key| env::var(key).ok())
    }

    /// Resolve the configuration through `lookup`. Blank values count as
    /// missing. A warning is logged for every required value that is absent,
    /// except `SLACK_BOT_TOKEN`, which a dry run does not need.
    pub fn resolve<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let news_api_key = required(NEWS_API_KEY, get(NEWS_API_KEY), "news fetching");
        // Only the Slack dispatcher needs the token, so it reports the gap.
        let slack_bot_token = match get(SLACK_BOT_TOKEN) {
            Some(token) => Setting::Configured(token),
            None => Setting::Unconfigured {
                missing: vec![SLACK_BOT_TOKEN],
            },
        };
        let destination_channel =
            required(SLACK_CHANNEL_ID, get(SLACK_CHANNEL_ID), "news delivery");

        let openai = match get(OPENAI_API_KEY) {
            Some(api_key) => Setting::Configured(OpenAiSettings {
                api_key,
                model: get(OPENAI_MODEL).unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string()),
                org_id: get(OPENAI_ORG_ID),
            }),
            None => {
                warn!(
                    variable = OPENAI_API_KEY,
                    "{} not set; summarized topics will be skipped", OPENAI_API_KEY
                );
                Setting::Unconfigured {
                    missing: vec![OPENAI_API_KEY],
                }
            }
        };

        let credential = match get(GOOGLE_CALENDAR_ACCESS_TOKEN) {
            Some(token) => CalendarCredential::AccessToken(token),
            None => CalendarCredential::TokenFile(PathBuf::from(
                get(GOOGLE_CALENDAR_TOKEN_FILE).unwrap_or_else(|| DEFAULT_TOKEN_FILE.to_string()),
            )),
        };

        let timezone = match get(CALENDAR_TIMEZONE) {
            Some(name) => name.parse::<Tz>().unwrap_or_else(|_| {
                warn!(
                    variable = CALENDAR_TIMEZONE,
                    "Unknown time zone {:?}; falling back to UTC", name
                );
                Tz::UTC
            }),
            None => Tz::UTC,
        };

        let calendar = CalendarSettings {
            credential,
            calendar_id: get(GOOGLE_CALENDAR_ID).unwrap_or_else(|| DEFAULT_CALENDAR_ID.to_string()),
            channel: get(CALENDAR_SLACK_CHANNEL)
                .unwrap_or_else(|| DEFAULT_CALENDAR_CHANNEL.to_string()),
            timezone,
        };

        let empty_batch = if get(BRIEFING_POST_EMPTY).as_deref().is_some_and(parse_flag) {
            EmptyBatchPolicy::PostNotice
        } else {
            EmptyBatchPolicy::Skip
        };

        Self {
            news_api_key,
            slack_bot_token,
            destination_channel,
            openai,
            calendar,
            empty_batch,
            topics_file: get(BRIEFING_TOPICS_FILE).map(PathBuf::from),
        }
    }

    /// Names of every required variable that was missing.
    #[must_use]
    pub fn missing(&self) -> Vec<&'static str> {
        let mut out = Vec::new();
        for missing in [
            missing_of(&self.news_api_key),
            missing_of(&self.slack_bot_token),
            missing_of(&self.destination_channel),
            missing_of(&self.openai),
        ] {
            out.extend_from_slice(missing);
        }
        out
    }
}

fn required(name: &'static str, value: Option<String>, capability: &str) -> Setting<String> {
    match value {
        Some(v) => Setting::Configured(v),
        None => {
            warn!(
                variable = name,
                "{} environment variable not set; {} will be skipped", name, capability
            );
            Setting::Unconfigured {
                missing: vec![name],
            }
        }
    }
}

fn missing_of<T>(setting: &Setting<T>) -> &[&'static str] {
    match setting {
        Setting::Configured(_) => &[],
        Setting::Unconfigured { missing } => missing,
    }
}

fn parse_flag(raw: &str) -> bool {
    matches!(
        raw.to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
