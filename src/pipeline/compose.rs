use tracing::{debug, warn};

use crate::ai::Summarizer;
use crate::core::models::{Article, FormatMode, SummaryResult, TopicSpec};
use crate::slack::message_formatter::{
    article_input, digest_input, format_digest, format_headlines, format_summaries, is_no_items,
};

/// What a topic's batch turned into once formatted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Composed {
    /// A message ready to post.
    Message(String),
    /// Nothing renderable came back from the news source.
    NoItems,
    /// There were articles, but no summary survived.
    NoSummary,
}

/// Turn a fetched batch into a message body according to the topic's mode.
/// The summarizer is only consulted for summarized modes.
pub async fn compose(
    topic: &TopicSpec,
    articles: &[Article],
    summarizer: &dyn Summarizer,
) -> Composed {
    match topic.mode {
        FormatMode::Headlines => {
            let body = format_headlines(&topic.label, articles);
            if is_no_items(&body) {
                Composed::NoItems
            } else {
                Composed::Message(body)
            }
        }
        FormatMode::Summaries => compose_summaries(topic, articles, summarizer).await,
        FormatMode::Digest => compose_digest(topic, articles, summarizer).await,
    }
}

async fn compose_summaries(
    topic: &TopicSpec,
    articles: &[Article],
    summarizer: &dyn Summarizer,
) -> Composed {
    let candidates: Vec<&Article> = articles
        .iter()
        .filter(|a| !a.title.trim().is_empty())
        .collect();
    if candidates.is_empty() {
        return Composed::NoItems;
    }

    let mut results = Vec::with_capacity(candidates.len());
    for article in candidates {
        let summary = summarizer.summarize(&article_input(article)).await;
        if summary.is_none() {
            warn!(title = %article.title, "No summary for article; leaving it out");
        }
        results.push(SummaryResult { article, summary });
    }

    let body = format_summaries(&topic.label, &results);
    if is_no_items(&body) {
        Composed::NoSummary
    } else {
        Composed::Message(body)
    }
}

async fn compose_digest(
    topic: &TopicSpec,
    articles: &[Article],
    summarizer: &dyn Summarizer,
) -> Composed {
    let input = digest_input(articles);
    if input.is_empty() {
        return Composed::NoItems;
    }
    debug!(chars = input.len(), "Summarizing batch into a digest");

    match summarizer.summarize(&input).await {
        Some(digest) => Composed::Message(format_digest(&topic.label, Some(&digest), articles)),
        None => Composed::NoSummary,
    }
}
