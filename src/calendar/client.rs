//! Google Calendar client module
//!
//! Reads tomorrow's events from one calendar. Obtaining and refreshing the
//! OAuth token is someone else's job: this module only asks a
//! [`TokenProvider`] for a bearer token.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, SecondsFormat, TimeDelta, TimeZone, Utc};
use chrono_tz::Tz;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info, warn};
use url::Url;

use crate::core::config::{CalendarCredential, GOOGLE_CALENDAR_ACCESS_TOKEN};
use crate::core::models::{CalendarEvent, EventStart};
use crate::errors::BriefingError;

const CALENDAR_API_BASE: &str = "https://www.googleapis.com/calendar/v3/calendars/";
const NO_TITLE: &str = "(no title)";

static HTTP_CLIENT: std::sync::LazyLock<Client> = std::sync::LazyLock::new(|| {
    Client::builder()
        .timeout(Duration::from_secs(30))
        .build()
        .unwrap_or_else(|_| Client::new())
});

/// Supplies a bearer token for the calendar API.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// # Errors
    ///
    /// Returns `MissingConfiguration` when no usable token is available.
    async fn access_token(&self) -> Result<String, BriefingError>;
}

/// A token handed over directly through the environment.
pub struct StaticToken(pub String);

#[async_trait]
impl TokenProvider for StaticToken {
    async fn access_token(&self) -> Result<String, BriefingError> {
        Ok(self.0.clone())
    }
}

/// A token cached on disk by an earlier interactive consent flow, in the
/// "authorized user" JSON layout (`token` or `access_token`, optional
/// RFC 3339 `expiry`).
pub struct TokenFile {
    path: PathBuf,
}

#[derive(Debug, Deserialize)]
struct CachedToken {
    token: Option<String>,
    access_token: Option<String>,
    expiry: Option<String>,
}

impl TokenFile {
    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// # Errors
    ///
    /// Returns `MissingConfiguration` if the cached token has no token field
    /// or has expired at `now`.
    pub fn parse(raw: &str, now: DateTime<Utc>) -> Result<String, BriefingError> {
        let missing = BriefingError::MissingConfiguration {
            name: GOOGLE_CALENDAR_ACCESS_TOKEN,
        };
        let cached: CachedToken = serde_json::from_str(raw)?;

        if let Some(expiry) = cached.expiry.as_deref()
            && let Ok(expiry) = DateTime::parse_from_rfc3339(expiry)
            && expiry.with_timezone(&Utc) <= now
        {
            warn!(%expiry, "Cached calendar token has expired; re-run the consent flow");
            return Err(missing);
        }

        cached
            .token
            .or(cached.access_token)
            .filter(|t| !t.trim().is_empty())
            .ok_or(missing)
    }
}

#[async_trait]
impl TokenProvider for TokenFile {
    async fn access_token(&self) -> Result<String, BriefingError> {
        let raw = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            warn!(
                path = %self.path.display(),
                "Cannot read cached calendar token ({}); set {} or provide the token file",
                e,
                GOOGLE_CALENDAR_ACCESS_TOKEN
            );
            BriefingError::MissingConfiguration {
                name: GOOGLE_CALENDAR_ACCESS_TOKEN,
            }
        })?;
        Self::parse(&raw, Utc::now())
    }
}

#[must_use]
pub fn token_provider_for(credential: &CalendarCredential) -> Box<dyn TokenProvider> {
    match credential {
        CalendarCredential::AccessToken(token) => Box::new(StaticToken(token.clone())),
        CalendarCredential::TokenFile(path) => Box::new(TokenFile::new(path.clone())),
    }
}

/// Anything that can list the events of a time range.
#[async_trait]
pub trait CalendarSource: Send + Sync {
    /// # Errors
    ///
    /// Returns an error when the token is unavailable, the request fails, or
    /// the body is not an events list.
    async fn events_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<CalendarEvent>, BriefingError>;
}

/// Start of `date` in `tz`. Where a DST jump skips midnight, the day starts
/// at the first local time that exists.
fn local_midnight(tz: Tz, date: NaiveDate) -> Option<DateTime<Utc>> {
    let midnight = date.and_hms_opt(0, 0, 0)?;
    (0..=MAX_DST_GAP_STEPS)
        .map(|step| midnight + TimeDelta::minutes(15 * step))
        .find_map(|naive| tz.from_local_datetime(&naive).earliest())
        .map(|dt| dt.with_timezone(&Utc))
}

// Quarter hours searched past a skipped midnight; real gaps are at most 2h.
const MAX_DST_GAP_STEPS: i64 = 12;

/// The `[start, end)` window covering the day after `now` in `tz`.
#[must_use]
pub fn tomorrow_window(now: DateTime<Utc>, tz: Tz) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let today = now.with_timezone(&tz).date_naive();
    let tomorrow = today.succ_opt()?;
    let after = tomorrow.succ_opt()?;
    Some((local_midnight(tz, tomorrow)?, local_midnight(tz, after)?))
}

#[derive(Debug, Deserialize)]
struct EventsResponse {
    items: Option<Vec<RawEvent>>,
}

#[derive(Debug, Deserialize)]
struct RawEvent {
    status: Option<String>,
    summary: Option<String>,
    start: Option<RawEventTime>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawEventTime {
    date_time: Option<String>,
    date: Option<String>,
}

impl RawEventTime {
    fn to_start(&self) -> Option<EventStart> {
        if let Some(dt) = self.date_time.as_deref() {
            return DateTime::parse_from_rfc3339(dt).ok().map(EventStart::DateTime);
        }
        self.date
            .as_deref()
            .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
            .map(EventStart::Date)
    }
}

/// Parse an `events.list` body. Cancelled events and events without a
/// readable start are dropped.
///
/// # Errors
///
/// Returns `MalformedResponse` when the body is not JSON or has no `items`.
pub fn parse_events(body: &str) -> Result<Vec<CalendarEvent>, BriefingError> {
    let response: EventsResponse = serde_json::from_str(body)?;
    let items = response.items.ok_or_else(|| {
        BriefingError::MalformedResponse("events response has no items field".to_string())
    })?;

    Ok(items
        .into_iter()
        .filter(|e| e.status.as_deref() != Some("cancelled"))
        .filter_map(|e| {
            let start = e.start.as_ref()?.to_start()?;
            let summary = e
                .summary
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| NO_TITLE.to_string());
            Some(CalendarEvent { start, summary })
        })
        .collect())
}

/// Google Calendar v3 client for a single calendar
pub struct GoogleCalendarClient {
    tokens: Box<dyn TokenProvider>,
    calendar_id: String,
}

impl GoogleCalendarClient {
    #[must_use]
    pub fn new(tokens: Box<dyn TokenProvider>, calendar_id: String) -> Self {
        Self {
            tokens,
            calendar_id,
        }
    }

    /// # Errors
    ///
    /// Returns `MalformedResponse` if the calendar id cannot form a URL.
    pub fn events_url(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Url, BriefingError> {
        let mut url = Url::parse(CALENDAR_API_BASE)
            .map_err(|e| BriefingError::MalformedResponse(format!("invalid calendar URL: {e}")))?;
        url.path_segments_mut()
            .map_err(|()| BriefingError::MalformedResponse("calendar URL has no path".to_string()))?
            .pop_if_empty()
            .push(&self.calendar_id)
            .push("events");
        url.query_pairs_mut()
            .append_pair("timeMin", &start.to_rfc3339_opts(SecondsFormat::Secs, true))
            .append_pair("timeMax", &end.to_rfc3339_opts(SecondsFormat::Secs, true))
            .append_pair("singleEvents", "true")
            .append_pair("orderBy", "startTime");
        Ok(url)
    }
}

#[async_trait]
impl CalendarSource for GoogleCalendarClient {
    async fn events_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<CalendarEvent>, BriefingError> {
        let token = self.tokens.access_token().await?;
        let url = self.events_url(start, end)?;
        debug!(url = %url, "Requesting calendar events");

        let response = HTTP_CLIENT
            .get(url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| BriefingError::Transport(format!("Calendar request failed: {e}")))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            BriefingError::Transport(format!("Failed to read calendar response: {e}"))
        })?;
        if !status.is_success() {
            return Err(BriefingError::Transport(format!(
                "Calendar API HTTP {status}: {}",
                body.chars().take(200).collect::<String>()
            )));
        }

        let events = parse_events(&body)?;
        info!(count = events.len(), calendar = %self.calendar_id, "Fetched calendar events");
        Ok(events)
    }
}
