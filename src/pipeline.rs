use std::time::Duration;

use chrono::Utc;
use tracing::info;

use crate::categorize::Categorizer;
use crate::config::{Config, Credentials};
use crate::fetcher::{build_client, RssFetcher};
use crate::headlines::HeadlineFetcher;
use crate::model::{Buckets, FetchWarning, RawEntry, Snapshot};
use crate::normalize::normalize;
use crate::registry::SourceRegistry;
use crate::social::{HttpSocialClient, SocialFetcher};

/// Raw output of one fetch cycle, before normalization.
#[derive(Debug, Clone, Default)]
pub struct FetchedBatch {
    /// `(feed name, entries)` in registry order, general feeds then Hindi feeds
    pub feeds: Vec<(String, Vec<RawEntry>)>,
    pub headlines: Vec<RawEntry>,
    pub social: Vec<RawEntry>,
}

pub struct Pipeline {
    registry: SourceRegistry,
    categorizer: Categorizer,
    rss: RssFetcher,
    headlines: Option<HeadlineFetcher>,
    social: Option<SocialFetcher>,
    display_cap: usize,
}

impl Pipeline {
    pub fn new(
        registry: SourceRegistry,
        categorizer: Categorizer,
        rss: RssFetcher,
        headlines: Option<HeadlineFetcher>,
        social: Option<SocialFetcher>,
        display_cap: usize,
    ) -> Self {
        Self {
            registry,
            categorizer,
            rss,
            headlines,
            social,
            display_cap,
        }
    }

    /// Wire up every fetcher from configuration. The headline fetcher is only
    /// enabled with an API key, the social fetcher only with a base URL.
    pub fn from_config(config: &Config, credentials: &Credentials) -> Result<Self, reqwest::Error> {
        let timeout = Duration::from_secs(config.fetch_timeout_secs);
        let client = build_client(timeout)?;

        let categorizer = Categorizer::new(
            &config.categories,
            &config.sources,
            config.social.routing.clone(),
        );
        let rss = RssFetcher::new(client.clone(), config.rss.item_cap, timeout);
        let headlines = credentials.newsapi_key.as_deref().map(|key| {
            HeadlineFetcher::new(
                client.clone(),
                &config.headlines.base_url,
                &config.headlines.language,
                key,
                timeout,
            )
        });
        let social = config.social.base_url.as_deref().map(|base_url| {
            SocialFetcher::new(
                Box::new(HttpSocialClient::new(client.clone(), base_url)),
                config.social.posts_per_account,
                timeout,
            )
        });

        Ok(Self::new(
            config.sources.clone(),
            categorizer,
            rss,
            headlines,
            social,
            config.display_cap,
        ))
    }

    pub fn registry(&self) -> &SourceRegistry {
        &self.registry
    }

    /// Fetch one full batch and categorize it.
    pub async fn run(&self) -> Snapshot {
        let (batch, warnings) = self.fetch_all().await;
        let buckets = self.assemble(batch);

        info!(
            local = buckets.local.len(),
            national = buckets.national.len(),
            global = buckets.global.len(),
            hindi = buckets.hindi.len(),
            warnings = warnings.len(),
            "Aggregation complete"
        );

        Snapshot {
            buckets,
            fetched_at: Utc::now(),
            warnings,
        }
    }

    /// Query every source, one at a time, in registry order.
    pub async fn fetch_all(&self) -> (FetchedBatch, Vec<FetchWarning>) {
        let mut warnings = Vec::new();
        let mut batch = FetchedBatch::default();

        for feed in self.registry.feeds() {
            let entries = self.rss.fetch(feed, &mut warnings).await;
            batch.feeds.push((feed.name.clone(), entries));
        }

        if let Some(headlines) = &self.headlines {
            batch.headlines = headlines.fetch(&mut warnings).await;
        }

        if let Some(social) = &self.social {
            batch.social = social
                .fetch(self.registry.social_accounts(), &mut warnings)
                .await;
        }

        (batch, warnings)
    }

    /// Normalize, categorize and cap a fetched batch. Deterministic for a given batch.
    pub fn assemble(&self, batch: FetchedBatch) -> Buckets {
        let mut buckets = Buckets::default();

        for (name, entries) in batch.feeds {
            let bucket = self.categorizer.bucket_for_feed(&name);
            for entry in entries {
                buckets.push(bucket, normalize(entry, &name));
            }
        }

        let headline_bucket = self.categorizer.bucket_for_headline();
        for entry in batch.headlines {
            buckets.push(headline_bucket, normalize(entry, ""));
        }

        let posts = batch
            .social
            .into_iter()
            .map(|entry| {
                let handle = match &entry {
                    RawEntry::Social { handle, .. } => handle.clone(),
                    _ => String::new(),
                };
                (handle, normalize(entry, ""))
            })
            .collect();
        for (bucket, item) in self.categorizer.route_social(posts) {
            buckets.push(bucket, item);
        }

        buckets.truncate(self.display_cap);
        buckets
    }
}
