//! briefing - posts news headlines, article summaries and calendar digests to Slack.
//!
//! Each run resolves its configuration once, then goes through the
//! configured topics in order: fetch a small batch from NewsAPI, optionally
//! summarize it with `OpenAI`, format it as Slack `mrkdwn` and post it. A
//! failure in one topic is logged and the run moves on to the next.
//!
//! # Example
//!
//! ```no_run
//! use briefing::ai::OpenAiSummarizer;
//! use briefing::core::config::RunConfig;
//! use briefing::core::topics::builtin_topics;
//! use briefing::news::NewsApiClient;
//! use briefing::pipeline::Pipeline;
//! use briefing::slack::SlackDispatcher;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     briefing::setup_logging();
//!
//!     let config = RunConfig::from_env();
//!     let news = NewsApiClient::new(config.news_api_key.configured().cloned().unwrap_or_default());
//!     let summarizer = OpenAiSummarizer::from_settings(&config.openai);
//!     let dispatcher = SlackDispatcher::from_token(&config.slack_bot_token);
//!
//!     let pipeline = Pipeline::new(&config, &news, &summarizer, &dispatcher);
//!     for report in pipeline.run(&builtin_topics(), None).await {
//!         println!("{}: {:?}", report.key, report.outcome);
//!     }
//! }
//! ```
pub mod ai;
pub mod calendar;
pub mod cli;
pub mod core;
pub mod errors;
pub mod news;
pub mod pipeline;
pub mod slack;
pub mod utils;

pub use errors::BriefingError;

/// Environment variable selecting the log format (`json` or anything else).
pub const LOG_FORMAT_VAR: &str = "BRIEFING_LOG_FORMAT";

const DEFAULT_LOG_FILTER: &str = "info";

/// Configure structured logging on stderr.
///
/// `RUST_LOG` controls the filter (default `info`). Setting
/// `BRIEFING_LOG_FORMAT=json` switches to one JSON object per line. Calling
/// this more than once keeps the first subscriber.
///
/// # Example
///
/// ```
/// briefing::setup_logging();
/// ```
pub fn setup_logging() {
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let json = std::env::var(LOG_FORMAT_VAR).is_ok_and(|v| v.eq_ignore_ascii_case("json"));
    let registry = tracing_subscriber::registry().with(filter);

    let result = if json {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_current_span(true)
                    .with_span_list(true)
                    .with_writer(std::io::stderr),
            )
            .try_init()
    } else {
        registry
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .try_init()
    };

    if result.is_err() {
        tracing::debug!("Logging already initialized");
    }
}
