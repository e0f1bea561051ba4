use chrono::{DateTime, Utc};
use tracing::{Instrument, error, info, info_span, warn};
use uuid::Uuid;

use super::compose::{Composed, compose};
use super::deliver::deliver;
use super::{TopicOutcome, TopicReport};
use crate::ai::Summarizer;
use crate::calendar::CalendarSource;
use crate::calendar::client::tomorrow_window;
use crate::core::config::{EmptyBatchPolicy, RunConfig};
use crate::core::models::{OutboundMessage, TopicSpec};
use crate::errors::BriefingError;
use crate::news::NewsSource;
use crate::slack::Dispatcher;
use crate::slack::message_formatter::{NO_ARTICLES_MESSAGE, format_calendar};

/// Report key used for the calendar digest.
pub const CALENDAR_REPORT_KEY: &str = "calendar";

/// The collaborators of one run, borrowed for its duration.
pub struct Pipeline<'a> {
    config: &'a RunConfig,
    news: &'a dyn NewsSource,
    summarizer: &'a dyn Summarizer,
    dispatcher: &'a dyn Dispatcher,
}

impl<'a> Pipeline<'a> {
    #[must_use]
    pub fn new(
        config: &'a RunConfig,
        news: &'a dyn NewsSource,
        summarizer: &'a dyn Summarizer,
        dispatcher: &'a dyn Dispatcher,
    ) -> Self {
        Self {
            config,
            news,
            summarizer,
            dispatcher,
        }
    }

    /// Run every topic in order, then the calendar digest when a source is
    /// given. One topic's failure never stops the next one.
    pub async fn run(
        &self,
        topics: &[TopicSpec],
        calendar: Option<&dyn CalendarSource>,
    ) -> Vec<TopicReport> {
        let run_id = Uuid::new_v4();
        let span = info_span!("run", run_id = %run_id);

        async move {
            info!(topics = topics.len(), calendar = calendar.is_some(), "Starting briefing run");
            let mut reports = Vec::with_capacity(topics.len() + 1);

            for topic in topics {
                let outcome = self.run_topic(topic).await;
                reports.push(TopicReport {
                    key: topic.key.clone(),
                    outcome,
                });
            }

            if let Some(source) = calendar {
                let outcome = self.run_calendar(source, Utc::now()).await;
                reports.push(TopicReport {
                    key: CALENDAR_REPORT_KEY.to_string(),
                    outcome,
                });
            }

            let posted = reports.iter().filter(|r| r.outcome.is_posted()).count();
            info!(posted, total = reports.len(), "Briefing run finished");
            reports
        }
        .instrument(span)
        .await
    }

    /// Everything a topic needs must be configured before the first request
    /// goes out. Returns the destination channel or the missing variable.
    fn preflight(&self, topic: &TopicSpec) -> Result<&'a str, &'static str> {
        let config = self.config;
        let missing = |name: Option<&'static str>| name.unwrap_or("unknown");

        if let Some(name) = self.dispatcher.missing_credential() {
            return Err(name);
        }
        config
            .news_api_key
            .configured()
            .ok_or_else(|| missing(config.news_api_key.first_missing()))?;
        let channel = config
            .destination_channel
            .configured()
            .ok_or_else(|| missing(config.destination_channel.first_missing()))?;
        if topic.mode.needs_summarizer() {
            config
                .openai
                .configured()
                .ok_or_else(|| missing(config.openai.first_missing()))?;
        }
        Ok(channel.as_str())
    }

    /// Fetch, format and post one topic.
    #[tracing::instrument(name = "topic", skip_all, fields(topic = %topic.key, mode = ?topic.mode))]
    pub async fn run_topic(&self, topic: &TopicSpec) -> TopicOutcome {
        let channel = match self.preflight(topic) {
            Ok(channel) => channel,
            Err(missing) => {
                warn!(variable = missing, "Skipping topic: {} is not set", missing);
                return TopicOutcome::Unconfigured { missing };
            }
        };

        let articles = match self.news.fetch(topic).await {
            Ok(articles) => articles,
            Err(e) => {
                error!(kind = e.kind(), "Error fetching news: {}", e);
                Vec::new()
            }
        };
        info!(count = articles.len(), "Fetched articles");

        let body = match compose(topic, &articles, self.summarizer).await {
            Composed::Message(body) => body,
            Composed::NoSummary => {
                warn!("No summaries were produced; not posting");
                return TopicOutcome::NoSummary;
            }
            Composed::NoItems => match self.config.empty_batch {
                EmptyBatchPolicy::Skip => {
                    info!("No articles to report; not posting");
                    return TopicOutcome::SkippedEmpty;
                }
                EmptyBatchPolicy::PostNotice => NO_ARTICLES_MESSAGE.to_string(),
            },
        };

        deliver(self.dispatcher, OutboundMessage::new(channel, body)).await
    }

    /// Post tomorrow's events from `source`. An empty day is still posted.
    #[tracing::instrument(name = "calendar", skip_all, fields(channel = %self.config.calendar.channel))]
    pub async fn run_calendar(
        &self,
        source: &dyn CalendarSource,
        now: DateTime<Utc>,
    ) -> TopicOutcome {
        let settings = &self.config.calendar;
        if let Some(missing) = self.dispatcher.missing_credential() {
            warn!(variable = missing, "Calendar digest skipped: {} is not set", missing);
            return TopicOutcome::Unconfigured { missing };
        }

        let Some((start, end)) = tomorrow_window(now, settings.timezone) else {
            let e = BriefingError::MalformedResponse(format!(
                "cannot compute tomorrow's window from {now}"
            ));
            error!("{}", e);
            return TopicOutcome::FetchFailed(e);
        };

        let events = match source.events_between(start, end).await {
            Ok(events) => events,
            Err(BriefingError::MissingConfiguration { name }) => {
                warn!(variable = name, "Calendar digest skipped: no usable token");
                return TopicOutcome::Unconfigured { missing: name };
            }
            Err(e) => {
                error!(kind = e.kind(), "Error fetching calendar events: {}", e);
                return TopicOutcome::FetchFailed(e);
            }
        };

        let body = format_calendar(&events);
        deliver(
            self.dispatcher,
            OutboundMessage::new(settings.channel.as_str(), body),
        )
        .await
    }
}
