//! Maps fetcher-specific raw entries onto [`NewsItem`].

use crate::model::{NewsItem, RawEntry};

pub const PLACEHOLDER_TITLE: &str = "Untitled";
pub const PLACEHOLDER_IMAGE: &str = "/static/placeholder.svg";
pub const UNKNOWN_SOURCE: &str = "unknown";
pub const HEADLINE_SOURCE: &str = "NewsAPI";

/// Maximum characters of a social post used as its title.
pub const SOCIAL_TITLE_CHARS: usize = 100;

/// Normalize one raw entry. `source` is the feed name for RSS entries and is
/// ignored for the other shapes, which carry their own attribution.
pub fn normalize(entry: RawEntry, source: &str) -> NewsItem {
    match entry {
        RawEntry::Rss {
            title,
            summary,
            link,
        } => NewsItem {
            title: title_or_placeholder(title),
            summary: summary.unwrap_or_default(),
            url: link.unwrap_or_default(),
            source: non_blank(Some(source.to_string()))
                .unwrap_or_else(|| UNKNOWN_SOURCE.to_string()),
            image_url: PLACEHOLDER_IMAGE.to_string(),
        },
        RawEntry::Headline {
            title,
            description,
            url,
            source_name,
            image_url,
        } => NewsItem {
            title: title_or_placeholder(title),
            summary: description.unwrap_or_default(),
            url: url.unwrap_or_default(),
            source: non_blank(source_name).unwrap_or_else(|| HEADLINE_SOURCE.to_string()),
            image_url: non_blank(image_url).unwrap_or_else(|| PLACEHOLDER_IMAGE.to_string()),
        },
        RawEntry::Social {
            content,
            url,
            handle,
        } => NewsItem {
            title: title_or_placeholder(Some(truncate_chars(&content, SOCIAL_TITLE_CHARS))),
            summary: content,
            url: url.unwrap_or_default(),
            source: if handle.trim().is_empty() {
                UNKNOWN_SOURCE.to_string()
            } else {
                format!("@{}", handle.trim())
            },
            image_url: PLACEHOLDER_IMAGE.to_string(),
        },
    }
}

fn title_or_placeholder(title: Option<String>) -> String {
    non_blank(title).unwrap_or_else(|| PLACEHOLDER_TITLE.to_string())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub(crate) fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}
