use std::collections::{HashMap, HashSet};

use serde::Deserialize;

use crate::model::{Bucket, NewsItem};
use crate::registry::SourceRegistry;

/// How social posts are spread across buckets.
///
/// `Positional` is the legacy behaviour: posts are routed by their index in
/// the fetched sequence, regardless of who posted them. `ByAccount` maps each
/// handle to a bucket explicitly.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum SocialRouting {
    Positional {
        #[serde(default = "default_slice")]
        local: usize,
        #[serde(default = "default_slice")]
        national: usize,
    },
    ByAccount {
        #[serde(default)]
        accounts: HashMap<String, Bucket>,
    },
}

fn default_slice() -> usize {
    5
}

impl Default for SocialRouting {
    fn default() -> Self {
        SocialRouting::Positional {
            local: default_slice(),
            national: default_slice(),
        }
    }
}

/// Source-name lookup tables for feed items.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct CategoryTables {
    #[serde(default = "default_local")]
    pub local: Vec<String>,
    #[serde(default = "default_national")]
    pub national: Vec<String>,
}

impl Default for CategoryTables {
    fn default() -> Self {
        Self {
            local: default_local(),
            national: default_national(),
        }
    }
}

fn default_local() -> Vec<String> {
    vec!["NDTV".to_string(), "ANI".to_string()]
}

fn default_national() -> Vec<String> {
    vec![
        "PIB".to_string(),
        "Indian Express".to_string(),
        "The Hindu".to_string(),
    ]
}

pub struct Categorizer {
    local: HashSet<String>,
    national: HashSet<String>,
    hindi: HashSet<String>,
    social: SocialRouting,
}

impl Categorizer {
    pub fn new(tables: &CategoryTables, registry: &SourceRegistry, social: SocialRouting) -> Self {
        Self {
            local: tables.local.iter().cloned().collect(),
            national: tables.national.iter().cloned().collect(),
            hindi: registry.hindi().iter().map(|s| s.name.clone()).collect(),
            social,
        }
    }

    /// Bucket for an item that came from the named feed. Unknown names land in Global.
    pub fn bucket_for_feed(&self, source: &str) -> Bucket {
        if self.hindi.contains(source) {
            Bucket::Hindi
        } else if self.local.contains(source) {
            Bucket::Local
        } else if self.national.contains(source) {
            Bucket::National
        } else {
            Bucket::Global
        }
    }

    /// Headline-API results are never looked up; they always go to Global.
    pub fn bucket_for_headline(&self) -> Bucket {
        Bucket::Global
    }

    /// Route social posts, given in fetch order, to buckets.
    pub fn route_social(&self, posts: Vec<(String, NewsItem)>) -> Vec<(Bucket, NewsItem)> {
        match &self.social {
            SocialRouting::Positional { local, national } => posts
                .into_iter()
                .enumerate()
                .map(|(index, (_, item))| {
                    let bucket = if index < *local {
                        Bucket::Local
                    } else if index < local.saturating_add(*national) {
                        Bucket::National
                    } else {
                        Bucket::Global
                    };
                    (bucket, item)
                })
                .collect(),
            SocialRouting::ByAccount { accounts } => posts
                .into_iter()
                .map(|(handle, item)| {
                    let bucket = accounts.get(&handle).copied().unwrap_or(Bucket::Global);
                    (bucket, item)
                })
                .collect(),
        }
    }
}
