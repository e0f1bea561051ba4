//! Cleanup for text coming back from the news collaborator.
//!
//! NewsAPI descriptions and content are a mix of plain text and HTML
//! fragments, and `content` is cut off with a `"… [+1234 chars]"` marker.

use regex::Regex;

/// Maximum characters of article text handed to the summarizer.
pub const MAX_SUMMARY_INPUT_CHARS: usize = 8_000;

static TRUNCATION_MARKER_RE: std::sync::LazyLock<Regex> = std::sync::LazyLock::new(|| {
    Regex::new(r"\s*…?\s*\[\+\d+ chars\]\s*$")
        .unwrap_or_else(|_| Regex::new(r"$^").expect("fallback regex compiles"))
});

// html2text renders links as `[label][1]` with a `[1]: url` footer.
static LINK_REFERENCE_RE: std::sync::LazyLock<Regex> = std::sync::LazyLock::new(|| {
    Regex::new(r"\[([^\]]*)\]\[\d+\]")
        .unwrap_or_else(|_| Regex::new(r"$^").expect("fallback regex compiles"))
});

// ...and emphasis as `**strong**` / `*em*`.
static EMPHASIS_RE: std::sync::LazyLock<Regex> = std::sync::LazyLock::new(|| {
    Regex::new(r"\*{1,2}([^*\n]+)\*{1,2}")
        .unwrap_or_else(|_| Regex::new(r"$^").expect("fallback regex compiles"))
});

static LINK_FOOTER_RE: std::sync::LazyLock<Regex> = std::sync::LazyLock::new(|| {
    Regex::new(r"(?m)^\[\d+\]:\s*\S+\s*$")
        .unwrap_or_else(|_| Regex::new(r"$^").expect("fallback regex compiles"))
});

/// Turn a raw description/content field into a single line of plain text.
/// Returns `None` when nothing readable remains.
#[must_use]
pub fn clean_article_text(raw: &str) -> Option<String> {
    let plain = if looks_like_html(raw) {
        html_to_text(raw)
    } else {
        raw.to_string()
    };

    let without_marker = TRUNCATION_MARKER_RE.replace(&plain, "");
    let collapsed = collapse_whitespace(&without_marker);

    if collapsed.is_empty() {
        None
    } else {
        Some(collapsed)
    }
}

fn looks_like_html(raw: &str) -> bool {
    raw.contains('<') || raw.contains("&amp;") || raw.contains("&#")
}

fn html_to_text(raw: &str) -> String {
    match html2text::from_read(raw.as_bytes(), 10_000) {
        Ok(text) => {
            let text = LINK_FOOTER_RE.replace_all(&text, "");
            let text = LINK_REFERENCE_RE.replace_all(&text, "$1");
            EMPHASIS_RE.replace_all(&text, "$1").into_owned()
        }
        Err(_) => raw.to_string(),
    }
}

#[must_use]
pub fn collapse_whitespace(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Escape the three characters Slack treats as control characters in
/// `mrkdwn` text.
#[must_use]
pub fn escape_mrkdwn(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Escape text used as the label of a `<url|label>` link.
#[must_use]
pub fn escape_link_label(raw: &str) -> String {
    escape_mrkdwn(raw).replace('|', "¦")
}

/// Hard-truncate to `max_chars` characters on a char boundary.
#[must_use]
pub fn truncate_chars(raw: &str, max_chars: usize) -> String {
    raw.chars().take(max_chars).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_newsapi_truncation_marker() {
        let raw = "Apple unveiled new hardware on Tuesday, including… [+2345 chars]";
        assert_eq!(
            clean_article_text(raw).unwrap(),
            "Apple unveiled new hardware on Tuesday, including"
        );
    }

    #[test]
    fn converts_html_to_plain_text() {
        let raw = "<p>Markets <b>rallied</b> today.</p><p>Details &amp; more.</p>";
        let cleaned = clean_article_text(raw).unwrap();
        assert!(cleaned.contains("Markets"));
        assert!(cleaned.contains("rallied today."));
        assert!(cleaned.contains("Details & more."));
        assert!(!cleaned.contains('<'));
    }

    #[test]
    fn blank_text_is_none() {
        assert_eq!(clean_article_text("   \n\t "), None);
        assert_eq!(clean_article_text("[+120 chars]"), None);
    }

    #[test]
    fn collapses_whitespace() {
        assert_eq!(collapse_whitespace("a \n\n b\tc"), "a b c");
    }

    #[test]
    fn escapes_slack_control_characters() {
        assert_eq!(escape_mrkdwn("AT&T <rises>"), "AT&amp;T &lt;rises&gt;");
        assert_eq!(escape_link_label("A | B"), "A ¦ B");
    }

    #[test]
    fn truncates_on_char_boundary() {
        assert_eq!(truncate_chars("日本のニュース", 3), "日本の");
    }
}
