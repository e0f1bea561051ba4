//! Topic catalog: the built-in news topics and loading a replacement
//! catalog from a JSON file.

use std::fs;
use std::path::Path;

use super::models::{DateBound, FormatMode, NewsEndpoint, NewsFilters, SortOrder, TopicSpec};
use crate::errors::BriefingError;

#[must_use]
pub fn builtin_topics() -> Vec<TopicSpec> {
    vec![
        TopicSpec {
            key: "us-tech".to_string(),
            label: "Top 5 Tech News".to_string(),
            endpoint: NewsEndpoint::TopHeadlines,
            filters: NewsFilters {
                country: Some("us".to_string()),
                category: Some("technology".to_string()),
                ..NewsFilters::default()
            },
            page_size: 5,
            from: Some(DateBound::Yesterday),
            sort_by: Some(SortOrder::Popularity),
            mode: FormatMode::Headlines,
            default_enabled: true,
        },
        TopicSpec {
            key: "japan".to_string(),
            label: "Top 7 News from Japan".to_string(),
            endpoint: NewsEndpoint::TopHeadlines,
            filters: NewsFilters {
                country: Some("jp".to_string()),
                ..NewsFilters::default()
            },
            page_size: 7,
            from: None,
            sort_by: None,
            mode: FormatMode::Headlines,
            default_enabled: true,
        },
        TopicSpec {
            key: "us-business".to_string(),
            label: "Top 7 Business News from the US".to_string(),
            endpoint: NewsEndpoint::TopHeadlines,
            filters: NewsFilters {
                country: Some("us".to_string()),
                category: Some("business".to_string()),
                ..NewsFilters::default()
            },
            page_size: 7,
            from: None,
            sort_by: None,
            mode: FormatMode::Headlines,
            default_enabled: true,
        },
        TopicSpec {
            key: "tech-briefing".to_string(),
            label: "Tech Briefing".to_string(),
            endpoint: NewsEndpoint::Everything,
            filters: NewsFilters {
                sources: Some("techcrunch,the-verge".to_string()),
                ..NewsFilters::default()
            },
            page_size: 10,
            from: Some(DateBound::Yesterday),
            sort_by: Some(SortOrder::PublishedAt),
            mode: FormatMode::Summaries,
            default_enabled: false,
        },
        TopicSpec {
            key: "world-digest".to_string(),
            label: "World News Digest".to_string(),
            endpoint: NewsEndpoint::TopHeadlines,
            filters: NewsFilters {
                sources: Some("bbc-news,reuters".to_string()),
                ..NewsFilters::default()
            },
            page_size: 10,
            from: None,
            sort_by: None,
            mode: FormatMode::Digest,
            default_enabled: false,
        },
    ]
}

/// Load a catalog from a JSON array of topics.
///
/// # Errors
///
/// Returns `TopicCatalog` when the file cannot be read, is not valid JSON,
/// or contains an invalid topic.
pub fn load_topics(path: &Path) -> Result<Vec<TopicSpec>, BriefingError> {
    let raw = fs::read_to_string(path)
        .map_err(|e| BriefingError::TopicCatalog(format!("{}: {e}", path.display())))?;
    parse_topics(&raw).map_err(|e| match e {
        BriefingError::TopicCatalog(msg) => {
            BriefingError::TopicCatalog(format!("{}: {msg}", path.display()))
        }
        other => other,
    })
}

/// # Errors
///
/// Returns `TopicCatalog` for invalid JSON, duplicate keys, or a page size
/// outside NewsAPI's 1..=100 range.
pub fn parse_topics(raw: &str) -> Result<Vec<TopicSpec>, BriefingError> {
    let topics: Vec<TopicSpec> =
        serde_json::from_str(raw).map_err(|e| BriefingError::TopicCatalog(e.to_string()))?;

    let mut seen = std::collections::HashSet::new();
    for topic in &topics {
        if !seen.insert(topic.key.as_str()) {
            return Err(BriefingError::TopicCatalog(format!(
                "duplicate topic key {:?}",
                topic.key
            )));
        }
        if !(1..=100).contains(&topic.page_size) {
            return Err(BriefingError::TopicCatalog(format!(
                "topic {:?} has page_size {} (expected 1-100)",
                topic.key, topic.page_size
            )));
        }
    }

    Ok(topics)
}

/// Pick the topics to run. With no keys, every default-enabled topic runs
/// in catalog order; otherwise the named topics run in the order given.
///
/// # Errors
///
/// Returns `TopicCatalog` naming the first key not present in the catalog.
pub fn select_topics(
    catalog: &[TopicSpec],
    keys: &[String],
) -> Result<Vec<TopicSpec>, BriefingError> {
    if keys.is_empty() {
        return Ok(catalog
            .iter()
            .filter(|t| t.default_enabled)
            .cloned()
            .collect());
    }

    keys.iter()
        .map(|key| {
            catalog
                .iter()
                .find(|t| &t.key == key)
                .cloned()
                .ok_or_else(|| BriefingError::TopicCatalog(format!("unknown topic {key:?}")))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_catalog_keeps_news_parameters() {
        let topics = builtin_topics();
        let tech = &topics[0];
        assert_eq!(tech.page_size, 5);
        assert_eq!(tech.filters.category.as_deref(), Some("technology"));
        assert_eq!(tech.sort_by, Some(SortOrder::Popularity));
        assert_eq!(tech.from, Some(DateBound::Yesterday));

        let japan = &topics[1];
        assert_eq!(japan.filters.country.as_deref(), Some("jp"));
        assert_eq!(japan.page_size, 7);

        let business = &topics[2];
        assert_eq!(business.filters.category.as_deref(), Some("business"));
        assert_eq!(business.page_size, 7);
    }

    #[test]
    fn default_selection_skips_opt_in_topics() {
        let selected = select_topics(&builtin_topics(), &[]).unwrap();
        let keys: Vec<&str> = selected.iter().map(|t| t.key.as_str()).collect();
        assert_eq!(keys, vec!["us-tech", "japan", "us-business"]);
    }

    #[test]
    fn explicit_selection_preserves_order() {
        let keys = vec!["world-digest".to_string(), "japan".to_string()];
        let selected = select_topics(&builtin_topics(), &keys).unwrap();
        assert_eq!(selected[0].key, "world-digest");
        assert_eq!(selected[1].key, "japan");
    }

    #[test]
    fn unknown_topic_is_rejected() {
        let err = select_topics(&builtin_topics(), &["mars".to_string()]).unwrap_err();
        assert!(err.to_string().contains("mars"));
    }

    #[test]
    fn parse_rejects_duplicates_and_bad_page_size() {
        let dup = r#"[{"key":"a","label":"A","page_size":5},{"key":"a","label":"B","page_size":5}]"#;
        assert!(parse_topics(dup).is_err());

        let zero = r#"[{"key":"a","label":"A","page_size":0}]"#;
        assert!(parse_topics(zero).is_err());
    }

    #[test]
    fn parse_accepts_full_topic() {
        let raw = r#"[{
            "key": "de-sci",
            "label": "German Science",
            "endpoint": "top-headlines",
            "filters": {"country": "de", "category": "science"},
            "page_size": 5,
            "from": "yesterday",
            "sort_by": "publishedAt",
            "mode": "digest"
        }]"#;
        let topics = parse_topics(raw).unwrap();
        assert_eq!(topics[0].mode, FormatMode::Digest);
        assert_eq!(topics[0].sort_by, Some(SortOrder::PublishedAt));
    }
}
