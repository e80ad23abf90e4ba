use std::time::Duration;

use feed_rs::parser;
use reqwest::Client;
use tracing::{info, warn};

use crate::error::FetchError;
use crate::model::{FetchWarning, RawEntry};
use crate::registry::FeedSource;

/// Build the HTTP client shared by all fetchers.
pub fn build_client(timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder()
        .timeout(timeout)
        .user_agent("NewsDigest/1.0 (News Aggregator)")
        .build()
}

/// Run `fut`, mapping an elapsed deadline to [`FetchError::Timeout`].
pub(crate) async fn with_timeout<T, F>(timeout: Duration, fut: F) -> Result<T, FetchError>
where
    F: std::future::Future<Output = Result<T, FetchError>>,
{
    match tokio::time::timeout(timeout, fut).await {
        Ok(result) => result,
        Err(_) => Err(FetchError::Timeout(timeout)),
    }
}

pub struct RssFetcher {
    client: Client,
    item_cap: usize,
    timeout: Duration,
}

impl RssFetcher {
    pub fn new(client: Client, item_cap: usize, timeout: Duration) -> Self {
        Self {
            client,
            item_cap,
            timeout,
        }
    }

    /// Fetch one feed. Any failure yields an empty list and a warning; it never
    /// affects other feeds.
    pub async fn fetch(&self, feed: &FeedSource, warnings: &mut Vec<FetchWarning>) -> Vec<RawEntry> {
        match with_timeout(self.timeout, self.try_fetch(&feed.url)).await {
            Ok(entries) => {
                info!("Fetched {} entries from feed '{}'", entries.len(), feed.name);
                entries
            }
            Err(e) => {
                warn!("Failed to fetch feed '{}' ({}): {}", feed.name, feed.url, e);
                warnings.push(FetchWarning {
                    source: feed.name.clone(),
                    message: e.to_string(),
                });
                Vec::new()
            }
        }
    }

    pub async fn try_fetch(&self, url: &str) -> Result<Vec<RawEntry>, FetchError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }
        let bytes = response.bytes().await?;
        Self::parse_entries(&bytes, self.item_cap)
    }

    /// Parse RSS/Atom bytes, keeping at most `cap` entries in document order.
    pub fn parse_entries(bytes: &[u8], cap: usize) -> Result<Vec<RawEntry>, FetchError> {
        let parsed = parser::parse(bytes)?;
        Ok(parsed
            .entries
            .into_iter()
            .take(cap)
            .map(Self::entry_to_raw)
            .collect())
    }

    pub fn entry_to_raw(entry: feed_rs::model::Entry) -> RawEntry {
        let summary = entry
            .summary
            .map(|s| s.content)
            .or_else(|| entry.content.and_then(|c| c.body));

        RawEntry::Rss {
            title: entry.title.map(|t| t.content),
            summary,
            link: entry.links.into_iter().next().map(|l| l.href),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn rss_with_items(count: usize) -> String {
        let items: String = (1..=count)
            .map(|i| {
                format!(
                    "<item><title>Story {i}</title><link>https://news.example.com/{i}</link>\
                     <description>Summary {i}</description></item>"
                )
            })
            .collect();
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
            <rss version="2.0"><channel><title>Test</title><link>https://news.example.com</link>
            <description>Test feed</description>{items}</channel></rss>"#
        )
    }

    fn fetcher(cap: usize) -> RssFetcher {
        let timeout = Duration::from_secs(5);
        RssFetcher::new(build_client(timeout).unwrap(), cap, timeout)
    }

    mod parse_entries_tests {
        use super::*;

        #[test]
        fn test_parse_rss_entries() {
            let entries = RssFetcher::parse_entries(rss_with_items(2).as_bytes(), 15).unwrap();

            assert_eq!(entries.len(), 2);
            assert_eq!(
                entries[0],
                RawEntry::Rss {
                    title: Some("Story 1".to_string()),
                    summary: Some("Summary 1".to_string()),
                    link: Some("https://news.example.com/1".to_string()),
                }
            );
        }

        #[test]
        fn test_parse_caps_entries() {
            let entries = RssFetcher::parse_entries(rss_with_items(20).as_bytes(), 15).unwrap();
            assert_eq!(entries.len(), 15);
        }

        #[test]
        fn test_parse_item_without_description_or_link() {
            let xml = r#"<?xml version="1.0"?>
                <rss version="2.0"><channel><title>T</title>
                <item><title>Bare</title></item>
                </channel></rss>"#;

            let entries = RssFetcher::parse_entries(xml.as_bytes(), 15).unwrap();
            assert_eq!(entries.len(), 1);
            match &entries[0] {
                RawEntry::Rss { title, summary, link } => {
                    assert_eq!(title.as_deref(), Some("Bare"));
                    assert!(summary.is_none());
                    assert!(link.is_none());
                }
                other => panic!("unexpected entry: {:?}", other),
            }
        }

        #[test]
        fn test_parse_atom_feed() {
            let xml = r#"<?xml version="1.0" encoding="utf-8"?>
                <feed xmlns="http://www.w3.org/2005/Atom">
                  <title>Atom</title><id>urn:feed</id><updated>2024-12-09T12:00:00Z</updated>
                  <entry>
                    <title>Atom entry</title><id>urn:1</id><updated>2024-12-09T12:00:00Z</updated>
                    <link href="https://atom.example.com/1"/>
                    <summary>Atom summary</summary>
                  </entry>
                </feed>"#;

            let entries = RssFetcher::parse_entries(xml.as_bytes(), 15).unwrap();
            assert_eq!(
                entries,
                vec![RawEntry::Rss {
                    title: Some("Atom entry".to_string()),
                    summary: Some("Atom summary".to_string()),
                    link: Some("https://atom.example.com/1".to_string()),
                }]
            );
        }

        #[test]
        fn test_parse_invalid_xml() {
            let result = RssFetcher::parse_entries(b"this is not a feed", 15);
            assert!(matches!(result, Err(FetchError::Feed(_))));
        }
    }

    mod fetch_tests {
        use super::*;

        #[tokio::test]
        async fn test_fetch_success() {
            let server = MockServer::start().await;
            Mock::given(method("GET"))
                .and(path("/rss"))
                .respond_with(ResponseTemplate::new(200).set_body_string(rss_with_items(3)))
                .mount(&server)
                .await;

            let feed = FeedSource::new("Test", &format!("{}/rss", server.uri()));
            let mut warnings = Vec::new();
            let entries = fetcher(15).fetch(&feed, &mut warnings).await;

            assert_eq!(entries.len(), 3);
            assert!(warnings.is_empty());
        }

        #[tokio::test]
        async fn test_fetch_server_error_degrades_to_empty() {
            let server = MockServer::start().await;
            Mock::given(method("GET"))
                .respond_with(ResponseTemplate::new(503))
                .mount(&server)
                .await;

            let feed = FeedSource::new("Down", &format!("{}/rss", server.uri()));
            let mut warnings = Vec::new();
            let entries = fetcher(15).fetch(&feed, &mut warnings).await;

            assert!(entries.is_empty());
            assert_eq!(warnings.len(), 1);
            assert_eq!(warnings[0].source, "Down");
            assert!(warnings[0].message.contains("503"));
        }

        #[tokio::test]
        async fn test_fetch_malformed_feed_degrades_to_empty() {
            let server = MockServer::start().await;
            Mock::given(method("GET"))
                .respond_with(ResponseTemplate::new(200).set_body_string("<html>nope</html>"))
                .mount(&server)
                .await;

            let feed = FeedSource::new("Broken", &format!("{}/rss", server.uri()));
            let mut warnings = Vec::new();
            let entries = fetcher(15).fetch(&feed, &mut warnings).await;

            assert!(entries.is_empty());
            assert_eq!(warnings.len(), 1);
        }

        #[tokio::test]
        async fn test_fetch_timeout_degrades_to_empty() {
            let server = MockServer::start().await;
            Mock::given(method("GET"))
                .respond_with(
                    ResponseTemplate::new(200)
                        .set_body_string(rss_with_items(1))
                        .set_delay(Duration::from_secs(2)),
                )
                .mount(&server)
                .await;

            let timeout = Duration::from_millis(200);
            let fetcher = RssFetcher::new(build_client(timeout).unwrap(), 15, timeout);
            let feed = FeedSource::new("Slow", &format!("{}/rss", server.uri()));
            let mut warnings = Vec::new();
            let entries = fetcher.fetch(&feed, &mut warnings).await;

            assert!(entries.is_empty());
            assert_eq!(warnings.len(), 1);
        }

        #[tokio::test]
        async fn test_fetch_unreachable_host() {
            let feed = FeedSource::new("Nowhere", "http://127.0.0.1:9/rss");
            let mut warnings = Vec::new();
            let entries = fetcher(15).fetch(&feed, &mut warnings).await;

            assert!(entries.is_empty());
            assert_eq!(warnings.len(), 1);
        }
    }
}
