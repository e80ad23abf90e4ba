use serde::Deserialize;

/// A named feed and where to fetch it from.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct FeedSource {
    pub name: String,
    pub url: String,
}

impl FeedSource {
    pub fn new(name: &str, url: &str) -> Self {
        Self {
            name: name.to_string(),
            url: url.to_string(),
        }
    }
}

/// Static source tables, fixed for the lifetime of the process.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct SourceRegistry {
    #[serde(default = "default_general_sources")]
    general: Vec<FeedSource>,
    #[serde(default = "default_hindi_sources")]
    hindi: Vec<FeedSource>,
    #[serde(default = "default_social_accounts")]
    social_accounts: Vec<String>,
}

impl Default for SourceRegistry {
    fn default() -> Self {
        Self {
            general: default_general_sources(),
            hindi: default_hindi_sources(),
            social_accounts: default_social_accounts(),
        }
    }
}

impl SourceRegistry {
    pub fn new(
        general: Vec<FeedSource>,
        hindi: Vec<FeedSource>,
        social_accounts: Vec<String>,
    ) -> Self {
        Self {
            general,
            hindi,
            social_accounts,
        }
    }

    pub fn general(&self) -> &[FeedSource] {
        &self.general
    }

    pub fn hindi(&self) -> &[FeedSource] {
        &self.hindi
    }

    pub fn social_accounts(&self) -> &[String] {
        &self.social_accounts
    }

    pub fn is_hindi(&self, name: &str) -> bool {
        self.hindi.iter().any(|s| s.name == name)
    }

    /// General feeds followed by Hindi feeds, the order the pipeline fetches them in.
    pub fn feeds(&self) -> impl Iterator<Item = &FeedSource> {
        self.general.iter().chain(self.hindi.iter())
    }
}

fn default_general_sources() -> Vec<FeedSource> {
    vec![
        FeedSource::new("NDTV", "https://feeds.feedburner.com/ndtvnews-top-stories"),
        FeedSource::new("ANI", "https://www.aninews.in/rss/national-news.xml"),
        FeedSource::new("PIB", "https://pib.gov.in/rssfeed/rss.xml"),
        FeedSource::new("Indian Express", "https://indianexpress.com/section/india/feed/"),
        FeedSource::new(
            "The Hindu",
            "https://www.thehindu.com/news/national/feeder/default.rss",
        ),
        FeedSource::new("TOI", "https://timesofindia.indiatimes.com/rssfeedstopstories.cms"),
        FeedSource::new("BBC", "http://feeds.bbci.co.uk/news/world/rss.xml"),
        FeedSource::new("Al Jazeera", "https://www.aljazeera.com/xml/rss/all.xml"),
    ]
}

fn default_hindi_sources() -> Vec<FeedSource> {
    vec![
        FeedSource::new("BBC Hindi", "https://feeds.bbci.co.uk/hindi/rss.xml"),
        FeedSource::new("Amar Ujala", "https://www.amarujala.com/rss/breaking-news.xml"),
        FeedSource::new("NDTV India", "https://feeds.feedburner.com/ndtvkhabar-latest"),
    ]
}

fn default_social_accounts() -> Vec<String> {
    [
        "ndtv",
        "ANI",
        "PMOIndia",
        "BBCWorld",
        "ArvindKejriwal",
        "RahulGandhi",
        "narendramodi",
        "POTUS",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}
