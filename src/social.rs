//! Social-post fetching.
//!
//! Posts are read from an HTTP service that returns newline-delimited JSON,
//! one `{"content": ..., "url": ...}` record per line.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{info, warn};

use crate::error::FetchError;
use crate::fetcher::with_timeout;
use crate::model::{FetchWarning, RawEntry};

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct SocialPost {
    pub content: String,
    #[serde(default)]
    pub url: Option<String>,
}

#[async_trait]
pub trait SocialClient: Send + Sync {
    /// Most recent posts of `handle`, newest first, at most `limit`.
    async fn recent_posts(&self, handle: &str, limit: usize) -> Result<Vec<SocialPost>, FetchError>;
}

/// Parse newline-delimited post records. Blank lines are skipped; any
/// malformed line fails the whole body.
pub fn parse_post_lines(body: &str) -> Result<Vec<SocialPost>, FetchError> {
    body.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| serde_json::from_str(line).map_err(FetchError::from))
        .collect()
}

pub struct HttpSocialClient {
    client: Client,
    base_url: String,
}

impl HttpSocialClient {
    pub fn new(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl SocialClient for HttpSocialClient {
    async fn recent_posts(&self, handle: &str, limit: usize) -> Result<Vec<SocialPost>, FetchError> {
        let response = self
            .client
            .get(format!("{}/users/{}/posts", self.base_url, handle))
            .query(&[("limit", limit.to_string())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        parse_post_lines(&body)
    }
}

pub struct SocialFetcher {
    client: Box<dyn SocialClient>,
    posts_per_account: usize,
    timeout: Duration,
}

impl SocialFetcher {
    pub fn new(client: Box<dyn SocialClient>, posts_per_account: usize, timeout: Duration) -> Self {
        Self {
            client,
            posts_per_account,
            timeout,
        }
    }

    /// Fetch posts for every handle in order. A failing account contributes
    /// nothing and is reported in `warnings`.
    pub async fn fetch(&self, handles: &[String], warnings: &mut Vec<FetchWarning>) -> Vec<RawEntry> {
        let mut entries = Vec::new();

        for handle in handles {
            let result = with_timeout(
                self.timeout,
                self.client.recent_posts(handle, self.posts_per_account),
            )
            .await;

            match result {
                Ok(posts) => {
                    info!("Fetched {} posts from @{}", posts.len().min(self.posts_per_account), handle);
                    entries.extend(posts.into_iter().take(self.posts_per_account).map(|post| {
                        RawEntry::Social {
                            content: post.content,
                            url: post.url,
                            handle: handle.clone(),
                        }
                    }));
                }
                Err(e) => {
                    warn!("Error fetching from @{}: {}", handle, e);
                    warnings.push(FetchWarning {
                        source: format!("@{}", handle),
                        message: e.to_string(),
                    });
                }
            }
        }

        entries
    }
}
