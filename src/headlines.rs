//! Top-headlines client for a NewsAPI-compatible endpoint.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use tracing::{info, warn};

use crate::error::FetchError;
use crate::fetcher::with_timeout;
use crate::model::{FetchWarning, RawEntry};

pub const PAGE_SIZE: usize = 30;

#[derive(Debug, Deserialize)]
struct HeadlineResponse {
    #[serde(default)]
    articles: Vec<Article>,
}

#[derive(Debug, Deserialize)]
struct Article {
    title: Option<String>,
    description: Option<String>,
    url: Option<String>,
    source: Option<ArticleSource>,
    #[serde(rename = "urlToImage")]
    url_to_image: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ArticleSource {
    name: Option<String>,
}

/// The request URL carries the API key, so it never reaches logs or warnings.
fn redact(err: reqwest::Error) -> FetchError {
    FetchError::Http(err.without_url())
}

pub struct HeadlineFetcher {
    client: Client,
    base_url: String,
    language: String,
    api_key: String,
    timeout: Duration,
}

impl HeadlineFetcher {
    pub fn new(
        client: Client,
        base_url: &str,
        language: &str,
        api_key: &str,
        timeout: Duration,
    ) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            language: language.to_string(),
            api_key: api_key.to_string(),
            timeout,
        }
    }

    /// Fetch the current headlines. Failures of any kind yield an empty list.
    pub async fn fetch(&self, warnings: &mut Vec<FetchWarning>) -> Vec<RawEntry> {
        match with_timeout(self.timeout, self.try_fetch()).await {
            Ok(entries) => {
                info!("Fetched {} headlines", entries.len());
                entries
            }
            Err(e) => {
                warn!("Headline fetch failed: {}", e);
                warnings.push(FetchWarning {
                    source: "Headlines".to_string(),
                    message: e.to_string(),
                });
                Vec::new()
            }
        }
    }

    pub async fn try_fetch(&self) -> Result<Vec<RawEntry>, FetchError> {
        let page_size = PAGE_SIZE.to_string();
        let response = self
            .client
            .get(format!("{}/v2/top-headlines", self.base_url))
            .query(&[
                ("language", self.language.as_str()),
                ("pageSize", page_size.as_str()),
                ("apiKey", self.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(redact)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = response.bytes().await.map_err(redact)?;
        Self::parse_articles(&body)
    }

    /// Decode a response body, dropping untitled articles and capping at [`PAGE_SIZE`].
    pub fn parse_articles(body: &[u8]) -> Result<Vec<RawEntry>, FetchError> {
        let response: HeadlineResponse = serde_json::from_slice(body)?;
        Ok(response
            .articles
            .into_iter()
            .filter(|a| a.title.as_deref().is_some_and(|t| !t.trim().is_empty()))
            .take(PAGE_SIZE)
            .map(|a| RawEntry::Headline {
                title: a.title,
                description: a.description,
                url: a.url,
                source_name: a.source.and_then(|s| s.name),
                image_url: a.url_to_image,
            })
            .collect())
    }
}
