//! Slack `mrkdwn` rendering for news batches and calendar digests.
//!
//! Every function here is pure. Items missing a field the entry needs are
//! dropped without leaving a partial entry behind.

use crate::core::models::{Article, CalendarEvent, SummaryResult};
use crate::utils::links::normalize_article_url;
use crate::utils::text::{clean_article_text, collapse_whitespace, escape_link_label, escape_mrkdwn};

pub const NEWS_ICON: &str = "📰";

/// Posted (or skipped, depending on policy) when a batch has nothing to show.
pub const NO_ARTICLES_MESSAGE: &str = "No news articles to report right now.";

pub const NO_EVENTS_MESSAGE: &str = "No upcoming events for tomorrow.";

const FALLBACK_SOURCE: &str = "News";

#[must_use]
pub fn is_no_items(body: &str) -> bool {
    body == NO_ARTICLES_MESSAGE
}

fn header(label: &str) -> String {
    format!("{NEWS_ICON} *{}*\n\n", escape_mrkdwn(label.trim()))
}

fn clean_title(article: &Article) -> Option<String> {
    let title = collapse_whitespace(&article.title);
    (!title.is_empty()).then_some(title)
}

fn headline_entry(article: &Article) -> Option<String> {
    let title = clean_title(article)?;
    let description = article.description.as_deref().and_then(clean_article_text)?;
    let url = article.url.as_deref().and_then(normalize_article_url)?;

    Some(format!(
        "• *<{url}|{}>*\n_{}_\n\n",
        escape_link_label(&title),
        escape_mrkdwn(&description)
    ))
}

/// Raw-article mode: a bulleted, linked title with the italic description.
#[must_use]
pub fn format_headlines(label: &str, articles: &[Article]) -> String {
    let body: String = articles.iter().filter_map(headline_entry).collect();
    if body.is_empty() {
        return NO_ARTICLES_MESSAGE.to_string();
    }
    format!("{}{body}", header(label))
}

fn summary_entry(result: &SummaryResult<'_>) -> Option<String> {
    let title = clean_title(result.article)?;
    let summary = result
        .summary
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())?;

    let source = result.article.source.trim();
    let source = if source.is_empty() {
        FALLBACK_SOURCE
    } else {
        source
    };

    let heading = match result.article.url.as_deref().and_then(normalize_article_url) {
        Some(url) => format!("<{url}|{}>", escape_link_label(&title)),
        None => escape_mrkdwn(&title),
    };

    Some(format!(
        "*{}: {heading}*\n{}\n\n",
        escape_mrkdwn(source),
        escape_mrkdwn(summary)
    ))
}

/// Summarized mode: source and title, then the summary paragraph.
#[must_use]
pub fn format_summaries(label: &str, results: &[SummaryResult<'_>]) -> String {
    let body: String = results.iter().filter_map(summary_entry).collect();
    if body.is_empty() {
        return NO_ARTICLES_MESSAGE.to_string();
    }
    format!("{}{body}", header(label))
}

/// Digest mode: one paragraph for the batch followed by the linked titles
/// it was built from.
#[must_use]
pub fn format_digest(label: &str, digest: Option<&str>, articles: &[Article]) -> String {
    let Some(digest) = digest.map(str::trim).filter(|d| !d.is_empty()) else {
        return NO_ARTICLES_MESSAGE.to_string();
    };

    let mut out = header(label);
    out.push_str(&escape_mrkdwn(digest));
    out.push_str("\n\n");

    let links: String = articles
        .iter()
        .filter_map(|a| {
            let title = clean_title(a)?;
            let url = a.url.as_deref().and_then(normalize_article_url)?;
            Some(format!("• <{url}|{}>\n", escape_link_label(&title)))
        })
        .collect();
    if !links.is_empty() {
        out.push_str("*Sources*\n");
        out.push_str(&links);
    }

    out
}

/// Text handed to the summarizer for a digest: one line per article,
/// title followed by its cleaned description.
#[must_use]
pub fn digest_input(articles: &[Article]) -> String {
    articles
        .iter()
        .filter_map(|a| {
            let title = clean_title(a)?;
            let description = a.description.as_deref().and_then(clean_article_text)?;
            Some(format!("{title}: {description}"))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Text handed to the summarizer for one article: the body when present,
/// otherwise the description.
#[must_use]
pub fn article_input(article: &Article) -> String {
    article
        .content
        .as_deref()
        .and_then(clean_article_text)
        .or_else(|| article.description.as_deref().and_then(clean_article_text))
        .unwrap_or_default()
}

#[must_use]
pub fn format_calendar(events: &[CalendarEvent]) -> String {
    if events.is_empty() {
        return NO_EVENTS_MESSAGE.to_string();
    }

    let mut message = String::from("Upcoming events for tomorrow:\n");
    for event in events {
        message.push_str(&format!(
            "- {} {}\n",
            event.start,
            escape_mrkdwn(&collapse_whitespace(&event.summary))
        ));
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article(title: &str, description: Option<&str>, url: Option<&str>) -> Article {
        Article {
            title: title.to_string(),
            description: description.map(str::to_string),
            content: None,
            url: url.map(str::to_string),
            source: "Example Times".to_string(),
        }
    }

    #[test]
    fn headline_entry_matches_slack_layout() {
        let a = article("Chips ship", Some("Fabs are busy."), Some("https://ex.com/chips"));
        assert_eq!(
            format_headlines("Top 5 Tech News", &[a]),
            "📰 *Top 5 Tech News*\n\n• *<https://ex.com/chips|Chips ship>*\n_Fabs are busy._\n\n"
        );
    }

    #[test]
    fn header_escapes_label() {
        let a = article("t", Some("d"), Some("https://ex.com"));
        assert!(format_headlines("R&D <weekly>", &[a]).starts_with("📰 *R&amp;D &lt;weekly&gt;*"));
    }

    #[test]
    fn summary_entry_uses_fallback_source() {
        let mut a = article("Quiet day", None, None);
        a.source = String::new();
        let results = [SummaryResult {
            article: &a,
            summary: Some("Nothing happened.".to_string()),
        }];
        assert_eq!(
            format_summaries("Brief", &results),
            "📰 *Brief*\n\n*News: Quiet day*\nNothing happened.\n\n"
        );
    }

    #[test]
    fn digest_without_text_is_no_items() {
        let a = article("t", Some("d"), Some("https://ex.com"));
        assert_eq!(format_digest("World", None, &[a.clone()]), NO_ARTICLES_MESSAGE);
        assert_eq!(format_digest("World", Some("  "), &[a]), NO_ARTICLES_MESSAGE);
    }

    #[test]
    fn digest_lists_sources_with_links_only() {
        let linked = article("Linked", Some("d"), Some("https://ex.com/1"));
        let unlinked = article("Unlinked", Some("d"), None);
        let out = format_digest("World", Some("Big week."), &[linked, unlinked]);
        assert!(out.contains("Big week.\n\n*Sources*\n"));
        assert!(out.contains("• <https://ex.com/1|Linked>\n"));
        assert!(!out.contains("Unlinked"));
    }

    #[test]
    fn article_input_prefers_content() {
        let mut a = article("t", Some("short"), None);
        a.content = Some("the long body… [+300 chars]".to_string());
        assert_eq!(article_input(&a), "the long body");
        a.content = None;
        assert_eq!(article_input(&a), "short");
    }

    #[test]
    fn digest_input_skips_articles_without_description() {
        let a = article("One", Some("first"), None);
        let b = article("Two", None, None);
        assert_eq!(digest_input(&[a, b]), "One: first");
    }
}
