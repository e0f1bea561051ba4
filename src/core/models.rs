use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};

/// A single news item as returned by the news collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Article {
    pub title: String,
    pub description: Option<String>,
    pub content: Option<String>,
    pub url: Option<String>,
    pub source: String,
}

/// Outcome of summarizing one article. `summary` is `None` when the
/// summarizer failed or had nothing to work with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryResult<'a> {
    pub article: &'a Article,
    pub summary: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub destination: String,
    pub body: String,
}

impl OutboundMessage {
    #[must_use]
    pub fn new(destination: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            destination: destination.into(),
            body: body.into(),
        }
    }
}

/// Which NewsAPI endpoint a topic queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum NewsEndpoint {
    #[default]
    TopHeadlines,
    Everything,
}

impl NewsEndpoint {
    #[must_use]
    pub fn path(self) -> &'static str {
        match self {
            Self::TopHeadlines => "top-headlines",
            Self::Everything => "everything",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortOrder {
    Popularity,
    PublishedAt,
    Relevancy,
}

impl SortOrder {
    #[must_use]
    pub fn as_param(self) -> &'static str {
        match self {
            Self::Popularity => "popularity",
            Self::PublishedAt => "publishedAt",
            Self::Relevancy => "relevancy",
        }
    }
}

/// Lower bound on article publication date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DateBound {
    Yesterday,
    On(NaiveDate),
}

impl DateBound {
    #[must_use]
    pub fn resolve(self, today: NaiveDate) -> NaiveDate {
        match self {
            Self::Yesterday => today.pred_opt().unwrap_or(today),
            Self::On(date) => date,
        }
    }
}

/// How a topic's articles end up in the outbound message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum FormatMode {
    /// Linked title plus description per article.
    #[default]
    Headlines,
    /// One summary paragraph per article.
    Summaries,
    /// A single paragraph covering the whole batch.
    Digest,
}

impl FormatMode {
    #[must_use]
    pub fn needs_summarizer(self) -> bool {
        matches!(self, Self::Summaries | Self::Digest)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct NewsFilters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sources: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

fn default_enabled() -> bool {
    true
}

/// A named news filter driving one fetch-format-post cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicSpec {
    pub key: String,
    pub label: String,
    #[serde(default)]
    pub endpoint: NewsEndpoint,
    #[serde(default)]
    pub filters: NewsFilters,
    pub page_size: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<DateBound>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<SortOrder>,
    #[serde(default)]
    pub mode: FormatMode,
    /// Whether the topic runs when no `--topic` is given.
    #[serde(default = "default_enabled")]
    pub default_enabled: bool,
}

/// Start of a calendar event: all-day events only carry a date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventStart {
    DateTime(DateTime<FixedOffset>),
    Date(NaiveDate),
}

impl std::fmt::Display for EventStart {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DateTime(dt) => write!(f, "{}", dt.to_rfc3339()),
            Self::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarEvent {
    pub start: EventStart,
    pub summary: String,
}
