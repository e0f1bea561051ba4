use std::path::PathBuf;

use clap::Parser;

use crate::core::config::{EmptyBatchPolicy, RunConfig};
use crate::core::models::TopicSpec;
use crate::core::topics::{builtin_topics, load_topics, select_topics};
use crate::errors::BriefingError;

/// Post news headlines, summaries and calendar digests to Slack.
#[derive(Debug, Parser)]
#[command(name = "briefing", version)]
pub struct Cli {
    /// Run only this topic (repeatable). Defaults to every enabled topic.
    #[arg(long = "topic", value_name = "KEY")]
    pub topics: Vec<String>,

    /// JSON file with the topic catalog, replacing the built-in one.
    #[arg(long, value_name = "PATH")]
    pub topics_file: Option<PathBuf>,

    /// Also post tomorrow's calendar events.
    #[arg(long)]
    pub calendar: bool,

    /// Skip the news topics.
    #[arg(long)]
    pub no_news: bool,

    /// Post the "no articles" sentence instead of staying quiet on empty batches.
    #[arg(long)]
    pub post_empty: bool,

    /// Print messages to stdout instead of posting them.
    #[arg(long)]
    pub dry_run: bool,

    /// Print the topic catalog and exit.
    #[arg(long)]
    pub list_topics: bool,

    /// Load environment variables from this file instead of `.env`.
    #[arg(long, value_name = "PATH")]
    pub env_file: Option<PathBuf>,
}

impl Cli {
    /// Fold command-line overrides into the environment configuration.
    pub fn apply(&self, config: &mut RunConfig) {
        if self.post_empty {
            config.empty_batch = EmptyBatchPolicy::PostNotice;
        }
        if let Some(path) = &self.topics_file {
            config.topics_file = Some(path.clone());
        }
    }

    /// # Errors
    ///
    /// Returns `TopicCatalog` if the topics file cannot be loaded.
    pub fn catalog(&self, config: &RunConfig) -> Result<Vec<TopicSpec>, BriefingError> {
        match &config.topics_file {
            Some(path) => load_topics(path),
            None => Ok(builtin_topics()),
        }
    }

    /// The topics this run goes through, in posting order.
    ///
    /// # Errors
    ///
    /// Returns `TopicCatalog` for an unknown `--topic` key.
    pub fn selected_topics(&self, catalog: &[TopicSpec]) -> Result<Vec<TopicSpec>, BriefingError> {
        if self.no_news {
            return Ok(Vec::new());
        }
        select_topics(catalog, &self.topics)
    }
}

/// One line per topic for `--list-topics`.
#[must_use]
pub fn describe_topic(topic: &TopicSpec) -> String {
    let filters = &topic.filters;
    let filter = [
        filters.country.as_deref().map(|c| format!("country={c}")),
        filters.category.as_deref().map(|c| format!("category={c}")),
        filters.sources.as_deref().map(|s| format!("sources={s}")),
        filters.query.as_deref().map(|q| format!("q={q}")),
    ]
    .into_iter()
    .flatten()
    .collect::<Vec<_>>()
    .join(" ");

    format!(
        "{:<14} {:<9} {:<13} limit={:<3} {}{}  \"{}\"",
        topic.key,
        format!("{:?}", topic.mode).to_lowercase(),
        topic.endpoint.path(),
        topic.page_size,
        filter,
        if topic.default_enabled { "" } else { " (opt-in)" },
        topic.label
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("briefing").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn repeated_topic_flags_keep_order() {
        let cli = parse(&["--topic", "japan", "--topic", "us-tech"]);
        let topics = cli.selected_topics(&builtin_topics()).unwrap();
        let keys: Vec<&str> = topics.iter().map(|t| t.key.as_str()).collect();
        assert_eq!(keys, ["japan", "us-tech"]);
    }

    #[test]
    fn no_news_selects_nothing() {
        let cli = parse(&["--no-news", "--calendar"]);
        assert!(cli.selected_topics(&builtin_topics()).unwrap().is_empty());
        assert!(cli.calendar);
    }

    #[test]
    fn post_empty_overrides_environment() {
        let cli = parse(&["--post-empty", "--topics-file", "/tmp/topics.json"]);
        let mut config = RunConfig::resolve(|_| None);
        cli.apply(&mut config);
        assert_eq!(config.empty_batch, EmptyBatchPolicy::PostNotice);
        assert_eq!(config.topics_file, Some(PathBuf::from("/tmp/topics.json")));
    }

    #[test]
    fn describe_marks_opt_in_topics() {
        let catalog = builtin_topics();
        let line = describe_topic(catalog.iter().find(|t| t.key == "world-digest").unwrap());
        assert!(line.starts_with("world-digest"));
        assert!(line.contains("(opt-in)"));
        assert!(line.contains("sources=bbc-news,reuters"));
    }
}
