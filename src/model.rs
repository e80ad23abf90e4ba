use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A normalized news item, independent of the fetcher that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewsItem {
    pub title: String,
    pub summary: String,
    pub url: String,
    pub source: String,
    pub image_url: String,
}

/// Item shapes as they come out of the individual fetchers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawEntry {
    Rss {
        title: Option<String>,
        summary: Option<String>,
        link: Option<String>,
    },
    Headline {
        title: Option<String>,
        description: Option<String>,
        url: Option<String>,
        source_name: Option<String>,
        image_url: Option<String>,
    },
    Social {
        content: String,
        url: Option<String>,
        handle: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Bucket {
    Local,
    National,
    Global,
    Hindi,
}

impl Bucket {
    pub const ALL: [Bucket; 4] = [Bucket::Local, Bucket::National, Bucket::Global, Bucket::Hindi];

    pub fn label(&self) -> &'static str {
        match self {
            Bucket::Local => "Local",
            Bucket::National => "National",
            Bucket::Global => "Global",
            Bucket::Hindi => "Hindi",
        }
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The four ordered partitions produced by one fetch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Buckets {
    pub local: Vec<NewsItem>,
    pub national: Vec<NewsItem>,
    pub global: Vec<NewsItem>,
    pub hindi: Vec<NewsItem>,
}

impl Buckets {
    pub fn get(&self, bucket: Bucket) -> &[NewsItem] {
        match bucket {
            Bucket::Local => &self.local,
            Bucket::National => &self.national,
            Bucket::Global => &self.global,
            Bucket::Hindi => &self.hindi,
        }
    }

    pub(crate) fn push(&mut self, bucket: Bucket, item: NewsItem) {
        match bucket {
            Bucket::Local => self.local.push(item),
            Bucket::National => self.national.push(item),
            Bucket::Global => self.global.push(item),
            Bucket::Hindi => self.hindi.push(item),
        }
    }

    /// Keep at most `cap` items in every bucket, preserving order.
    pub(crate) fn truncate(&mut self, cap: usize) {
        self.local.truncate(cap);
        self.national.truncate(cap);
        self.global.truncate(cap);
        self.hindi.truncate(cap);
    }

    pub fn len(&self) -> usize {
        Bucket::ALL.iter().map(|b| self.get(*b).len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Per-bucket item counts, in display order.
    pub fn counts(&self) -> Vec<(Bucket, usize)> {
        Bucket::ALL.iter().map(|b| (*b, self.get(*b).len())).collect()
    }
}

/// A source that failed during a fetch and contributed nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchWarning {
    pub source: String,
    pub message: String,
}

impl fmt::Display for FetchWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.source, self.message)
    }
}

/// Point-in-time result of one pipeline run.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub buckets: Buckets,
    pub fetched_at: DateTime<Utc>,
    pub warnings: Vec<FetchWarning>,
}
