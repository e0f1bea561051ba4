use url::Url;

/// Normalize an article URL for use inside Slack link markup.
///
/// Only absolute `http`/`https` URLs with a host survive. The text is kept
/// as written so the link still matches the article; only the characters
/// that would break `<url|label>` markup (`|`, `<`, `>`) are percent-encoded.
#[must_use]
pub fn normalize_article_url(raw: &str) -> Option<String> {
    let raw = raw
        .trim()
        .trim_matches(|c: char| matches!(c, '<' | '>' | '"' | '\''));
    if raw.is_empty() || raw.contains(char::is_whitespace) {
        return None;
    }

    let url = Url::parse(raw).ok()?;
    if !matches!(url.scheme(), "http" | "https") {
        return None;
    }
    url.host_str()?;

    Some(
        raw.replace('|', "%7C")
            .replace('<', "%3C")
            .replace('>', "%3E"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_plain_https_links() {
        assert_eq!(
            normalize_article_url("https://example.com/story?id=4"),
            Some("https://example.com/story?id=4".to_string())
        );
    }

    #[test]
    fn keeps_fragment_and_trailing_slash() {
        assert_eq!(
            normalize_article_url(" https://example.com/a/#comments "),
            Some("https://example.com/a/#comments".to_string())
        );
        assert_eq!(
            normalize_article_url("https://example.com/search?q=a/"),
            Some("https://example.com/search?q=a/".to_string())
        );
    }

    #[test]
    fn scheme_check_ignores_case() {
        assert_eq!(
            normalize_article_url("HTTPS://Example.com/Story"),
            Some("HTTPS://Example.com/Story".to_string())
        );
    }

    #[test]
    fn rejects_non_http_and_relative_links() {
        assert_eq!(normalize_article_url("ftp://example.com/file"), None);
        assert_eq!(normalize_article_url("javascript:alert(1)"), None);
        assert_eq!(normalize_article_url("/news/story"), None);
        assert_eq!(normalize_article_url("https://example.com/a b"), None);
        assert_eq!(normalize_article_url(""), None);
    }

    #[test]
    fn escapes_markup_characters() {
        assert_eq!(
            normalize_article_url("https://example.com/a|b<c>").as_deref(),
            Some("https://example.com/a%7Cb%3Cc%3E")
        );
    }
}
