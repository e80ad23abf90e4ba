use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::categorize::{CategoryTables, SocialRouting};
use crate::registry::SourceRegistry;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("missing required setting {0}")]
    Missing(&'static str),
}

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Maximum items kept per bucket after aggregation
    #[serde(default = "default_display_cap")]
    pub display_cap: usize,
    /// Per-source fetch timeout in seconds
    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_secs: u64,
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
    #[serde(default)]
    pub sources: SourceRegistry,
    #[serde(default)]
    pub categories: CategoryTables,
    #[serde(default)]
    pub rss: RssConfig,
    #[serde(default)]
    pub headlines: HeadlineConfig,
    #[serde(default)]
    pub social: SocialConfig,
    #[serde(default)]
    pub digest: DigestConfig,
    #[serde(default)]
    pub email: EmailConfig,
}

fn default_display_cap() -> usize {
    15
}

fn default_fetch_timeout() -> u64 {
    10
}

fn default_bind_addr() -> String {
    "0.0.0.0:3000".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct RssConfig {
    /// Entries kept from each feed
    #[serde(default = "default_rss_item_cap")]
    pub item_cap: usize,
}

fn default_rss_item_cap() -> usize {
    15
}

impl Default for RssConfig {
    fn default() -> Self {
        Self {
            item_cap: default_rss_item_cap(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct HeadlineConfig {
    #[serde(default = "default_headline_base_url")]
    pub base_url: String,
    #[serde(default = "default_language")]
    pub language: String,
}

fn default_headline_base_url() -> String {
    "https://newsapi.org".to_string()
}

fn default_language() -> String {
    "en".to_string()
}

impl Default for HeadlineConfig {
    fn default() -> Self {
        Self {
            base_url: default_headline_base_url(),
            language: default_language(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct SocialConfig {
    /// Base URL of the social post service; fetching is disabled when unset
    pub base_url: Option<String>,
    #[serde(default = "default_posts_per_account")]
    pub posts_per_account: usize,
    #[serde(default)]
    pub routing: SocialRouting,
}

fn default_posts_per_account() -> usize {
    2
}

impl Default for SocialConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            posts_per_account: default_posts_per_account(),
            routing: SocialRouting::default(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct DigestConfig {
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default = "default_items_per_section")]
    pub items_per_section: usize,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_items_per_section() -> usize {
    5
}

impl Default for DigestConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            items_per_section: default_items_per_section(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct EmailConfig {
    #[serde(default = "default_smtp_host")]
    pub smtp_host: String,
    #[serde(default = "default_subject")]
    pub subject: String,
}

fn default_smtp_host() -> String {
    "smtp.gmail.com".to_string()
}

fn default_subject() -> String {
    "Your Daily News Summary".to_string()
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            smtp_host: default_smtp_host(),
            subject: default_subject(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            display_cap: default_display_cap(),
            fetch_timeout_secs: default_fetch_timeout(),
            bind_addr: default_bind_addr(),
            sources: SourceRegistry::default(),
            categories: CategoryTables::default(),
            rss: RssConfig::default(),
            headlines: HeadlineConfig::default(),
            social: SocialConfig::default(),
            digest: DigestConfig::default(),
            email: EmailConfig::default(),
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_str(&content)
    }

    /// Parse config from a TOML string (useful for testing)
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }
}

/// Secrets and mode flags read from the environment.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    pub newsapi_key: Option<String>,
    pub sender_email: Option<String>,
    pub app_password: Option<String>,
    pub receiver_email: Option<String>,
}

/// The subset of credentials needed to send the digest.
#[derive(Debug, Clone)]
pub struct MailCredentials {
    pub sender: String,
    pub password: String,
    pub receiver: String,
}

impl Credentials {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        Self {
            newsapi_key: get("NEWSAPI_KEY"),
            sender_email: get("SENDER_EMAIL"),
            app_password: get("APP_PASSWORD"),
            receiver_email: get("RECEIVER_EMAIL"),
        }
    }

    pub fn mail(&self) -> Result<MailCredentials, ConfigError> {
        Ok(MailCredentials {
            sender: self
                .sender_email
                .clone()
                .ok_or(ConfigError::Missing("SENDER_EMAIL"))?,
            password: self
                .app_password
                .clone()
                .ok_or(ConfigError::Missing("APP_PASSWORD"))?,
            receiver: self
                .receiver_email
                .clone()
                .ok_or(ConfigError::Missing("RECEIVER_EMAIL"))?,
        })
    }
}

/// Whether the process serves the UI or runs one unattended batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    Interactive,
    Batch,
}

impl RunMode {
    pub fn from_flag(value: Option<&str>) -> Self {
        match value {
            Some(v) if v.trim().eq_ignore_ascii_case("true") => RunMode::Batch,
            _ => RunMode::Interactive,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Bucket;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        assert_eq!(default_display_cap(), 15);
        assert_eq!(default_rss_item_cap(), 15);
        assert_eq!(default_posts_per_account(), 2);
        assert_eq!(default_fetch_timeout(), 10);
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::from_str("").unwrap();

        assert_eq!(config.display_cap, 15);
        assert_eq!(config.rss.item_cap, 15);
        assert_eq!(config.headlines.base_url, "https://newsapi.org");
        assert_eq!(config.headlines.language, "en");
        assert!(config.social.base_url.is_none());
        assert_eq!(config.social.routing, SocialRouting::default());
        assert_eq!(config.digest.items_per_section, 5);
        assert_eq!(config.email.smtp_host, "smtp.gmail.com");
        assert_eq!(config.sources.general().len(), 8);
        assert_eq!(config.categories.local, vec!["NDTV", "ANI"]);
    }

    #[test]
    fn test_load_valid_config() {
        let content = r#"
            display_cap = 5

            [rss]
            item_cap = 3

            [categories]
            local = ["City Paper"]
            national = []

            [social]
            base_url = "http://social.local"
            posts_per_account = 1

            [social.routing]
            mode = "positional"
            local = 2
            national = 3

            [sources]
            social_accounts = ["cityhall"]

            [[sources.general]]
            name = "City Paper"
            url = "https://city.example.com/rss"

            [[sources.hindi]]
            name = "Hindi Daily"
            url = "https://hindi.example.com/rss"
        "#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(content.as_bytes()).unwrap();

        let config = Config::load(temp_file.path()).unwrap();

        assert_eq!(config.display_cap, 5);
        assert_eq!(config.rss.item_cap, 3);
        assert_eq!(config.categories.local, vec!["City Paper"]);
        assert!(config.categories.national.is_empty());
        assert_eq!(config.social.base_url.as_deref(), Some("http://social.local"));
        assert_eq!(
            config.social.routing,
            SocialRouting::Positional {
                local: 2,
                national: 3
            }
        );
        assert_eq!(config.sources.general().len(), 1);
        assert_eq!(config.sources.hindi()[0].name, "Hindi Daily");
        assert_eq!(config.sources.social_accounts(), &["cityhall".to_string()]);
    }

    #[test]
    fn test_by_account_routing_config() {
        let content = r#"
            [social.routing]
            mode = "by_account"
            accounts = { ndtv = "local", POTUS = "global" }
        "#;

        let config = Config::from_str(content).unwrap();
        assert_eq!(
            config.social.routing,
            SocialRouting::ByAccount {
                accounts: HashMap::from([
                    ("ndtv".to_string(), Bucket::Local),
                    ("POTUS".to_string(), Bucket::Global),
                ])
            }
        );
    }

    #[test]
    fn test_load_config_missing_file() {
        let result = Config::load("/nonexistent/path/feeds.toml");
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }

    #[test]
    fn test_load_config_invalid_toml() {
        let result = Config::from_str("this is not valid toml {{{");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_feed_missing_url_is_rejected() {
        let content = r#"
            [[sources.general]]
            name = "Test Feed"
        "#;
        assert!(Config::from_str(content).is_err());
    }

    mod credentials_tests {
        use super::*;

        fn lookup(pairs: &[(&str, &str)]) -> Credentials {
            let map: HashMap<String, String> = pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect();
            Credentials::from_lookup(|key| map.get(key).cloned())
        }

        #[test]
        fn test_all_mail_credentials_present() {
            let creds = lookup(&[
                ("SENDER_EMAIL", "me@example.com"),
                ("APP_PASSWORD", "secret"),
                ("RECEIVER_EMAIL", "you@example.com"),
            ]);

            let mail = creds.mail().unwrap();
            assert_eq!(mail.sender, "me@example.com");
            assert_eq!(mail.receiver, "you@example.com");
            assert!(creds.newsapi_key.is_none());
        }

        #[test]
        fn test_missing_mail_credential_is_fatal() {
            let creds = lookup(&[("SENDER_EMAIL", "me@example.com"), ("APP_PASSWORD", "secret")]);
            assert!(matches!(
                creds.mail(),
                Err(ConfigError::Missing("RECEIVER_EMAIL"))
            ));
        }

        #[test]
        fn test_blank_values_are_unset() {
            let creds = lookup(&[("NEWSAPI_KEY", "  ")]);
            assert!(creds.newsapi_key.is_none());
        }
    }

    #[test]
    fn test_run_mode_flag() {
        assert_eq!(RunMode::from_flag(Some("true")), RunMode::Batch);
        assert_eq!(RunMode::from_flag(Some("TRUE")), RunMode::Batch);
        assert_eq!(RunMode::from_flag(Some("false")), RunMode::Interactive);
        assert_eq!(RunMode::from_flag(Some("yes")), RunMode::Interactive);
        assert_eq!(RunMode::from_flag(None), RunMode::Interactive);
    }
}
