//! NewsAPI client module
//!
//! One GET per topic, no retry and no pagination.

use async_trait::async_trait;
use chrono::{Local, NaiveDate};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use crate::core::models::{Article, TopicSpec};
use crate::errors::BriefingError;

pub const NEWS_API_BASE_URL: &str = "https://newsapi.org/v2/";

const USER_AGENT: &str = concat!("briefing/", env!("CARGO_PKG_VERSION"));

/// NewsAPI marks articles pulled by the publisher with this placeholder.
const REMOVED_PLACEHOLDER: &str = "[Removed]";

static HTTP_CLIENT: std::sync::LazyLock<Client> = std::sync::LazyLock::new(|| {
    Client::builder()
        .timeout(Duration::from_secs(30))
        .user_agent(USER_AGENT)
        .build()
        .unwrap_or_else(|_| Client::new())
});

static NEWS_API_BASE: std::sync::LazyLock<Option<Url>> =
    std::sync::LazyLock::new(|| match Url::parse(NEWS_API_BASE_URL) {
        Ok(url) => Some(url),
        Err(e) => {
            warn!("Invalid NewsAPI base URL {}: {}", NEWS_API_BASE_URL, e);
            None
        }
    });

/// Anything that can produce a bounded batch of articles for a topic.
#[async_trait]
pub trait NewsSource: Send + Sync {
    /// # Errors
    ///
    /// Returns an error on transport failure, non-2xx status or a body that
    /// does not look like a NewsAPI response.
    async fn fetch(&self, topic: &TopicSpec) -> Result<Vec<Article>, BriefingError>;
}

#[derive(Debug, Deserialize)]
struct NewsApiResponse {
    status: String,
    #[serde(default)]
    articles: Option<Vec<RawArticle>>,
    code: Option<String>,
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawArticle {
    source: Option<RawSource>,
    title: Option<String>,
    description: Option<String>,
    content: Option<String>,
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawSource {
    id: Option<String>,
    name: Option<String>,
}

impl RawArticle {
    fn into_article(self) -> Option<Article> {
        let title = self.title.unwrap_or_default();
        if title.trim() == REMOVED_PLACEHOLDER {
            return None;
        }

        let source = self
            .source
            .and_then(|s| s.name.or(s.id))
            .unwrap_or_default();

        Some(Article {
            title: title.trim().to_string(),
            description: non_blank(self.description),
            content: non_blank(self.content),
            url: non_blank(self.url),
            source,
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// NewsAPI client bound to one API key.
pub struct NewsApiClient {
    api_key: String,
    base_url: Option<Url>,
}

impl NewsApiClient {
    #[must_use]
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            base_url: NEWS_API_BASE.clone(),
        }
    }

    /// Point the client at a different host (a local stub, a proxy).
    ///
    /// # Errors
    ///
    /// Returns `MalformedResponse` if `base_url` is not a valid URL.
    pub fn with_base_url(mut self, base_url: &str) -> Result<Self, BriefingError> {
        let mut url = Url::parse(base_url)
            .map_err(|e| BriefingError::MalformedResponse(format!("invalid base URL: {e}")))?;
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        self.base_url = Some(url);
        Ok(self)
    }
}

/// Build the request URL for `topic`. The API key is sent as a header and
/// never appears in the URL.
///
/// # Errors
///
/// Returns `MalformedResponse` if the endpoint cannot be joined onto `base`.
pub fn build_request_url(
    base: &Url,
    topic: &TopicSpec,
    today: NaiveDate,
) -> Result<Url, BriefingError> {
    let mut url = base
        .join(topic.endpoint.path())
        .map_err(|e| BriefingError::MalformedResponse(format!("invalid endpoint URL: {e}")))?;

    {
        let mut query = url.query_pairs_mut();
        let filters = &topic.filters;
        // NewsAPI rejects `sources` combined with `country`/`category`.
        if let Some(sources) = &filters.sources {
            query.append_pair("sources", sources);
        } else {
            if let Some(country) = &filters.country {
                query.append_pair("country", country);
            }
            if let Some(category) = &filters.category {
                query.append_pair("category", category);
            }
        }
        if let Some(q) = &filters.query {
            query.append_pair("q", q);
        }
        if let Some(language) = &filters.language {
            query.append_pair("language", language);
        }
        if let Some(from) = topic.from {
            query.append_pair("from", &from.resolve(today).format("%Y-%m-%d").to_string());
        }
        if let Some(sort) = topic.sort_by {
            query.append_pair("sortBy", sort.as_param());
        }
        query.append_pair("pageSize", &topic.page_size.to_string());
    }

    Ok(url)
}

/// Parse a NewsAPI response body into at most `limit` articles.
///
/// # Errors
///
/// Returns `MalformedResponse` when the body is not JSON, reports
/// `status: "error"`, or lacks the `articles` array.
pub fn parse_articles(body: &str, limit: usize) -> Result<Vec<Article>, BriefingError> {
    let response: NewsApiResponse = serde_json::from_str(body)?;

    if response.status != "ok" {
        return Err(BriefingError::MalformedResponse(format!(
            "NewsAPI status {}: {} ({})",
            response.status,
            response.message.unwrap_or_else(|| "no message".to_string()),
            response.code.unwrap_or_else(|| "no code".to_string())
        )));
    }

    let articles = response.articles.ok_or_else(|| {
        BriefingError::MalformedResponse("NewsAPI response has no articles field".to_string())
    })?;

    Ok(articles
        .into_iter()
        .filter_map(RawArticle::into_article)
        .take(limit)
        .collect())
}

fn describe_error_body(body: &str) -> String {
    serde_json::from_str::<NewsApiResponse>(body)
        .ok()
        .and_then(|r| match (r.code, r.message) {
            (Some(code), Some(message)) => Some(format!("{code}: {message}")),
            (Some(code), None) => Some(code),
            (None, Some(message)) => Some(message),
            (None, None) => None,
        })
        .unwrap_or_else(|| body.chars().take(200).collect())
}

#[async_trait]
impl NewsSource for NewsApiClient {
    async fn fetch(&self, topic: &TopicSpec) -> Result<Vec<Article>, BriefingError> {
        let base = self.base_url.as_ref().ok_or_else(|| {
            BriefingError::MalformedResponse("NewsAPI base URL not initialized".to_string())
        })?;
        let url = build_request_url(base, topic, Local::now().date_naive())?;
        debug!(topic = %topic.key, url = %url, "Requesting articles");

        let response = HTTP_CLIENT
            .get(url)
            .header("X-Api-Key", &self.api_key)
            .send()
            .await
            .map_err(|e| BriefingError::Transport(format!("NewsAPI request failed: {e}")))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            BriefingError::Transport(format!("Failed to read NewsAPI response: {e}"))
        })?;

        if !status.is_success() {
            return Err(BriefingError::Transport(format!(
                "NewsAPI HTTP {status}: {}",
                describe_error_body(&body)
            )));
        }

        let articles = parse_articles(&body, usize::from(topic.page_size))?;
        debug!(
            topic = %topic.key,
            count = articles.len(),
            "Parsed NewsAPI response"
        );
        Ok(articles)
    }
}
