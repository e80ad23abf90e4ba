use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::NaiveDate;
use tracing::info;

use crate::model::{Bucket, Buckets};

pub const DIGEST_TITLE: &str = "Daily News Summary";

/// Buckets included in the digest, in order.
const SECTIONS: [(Bucket, &str); 3] = [
    (Bucket::Local, "Local News"),
    (Bucket::National, "National News"),
    (Bucket::Global, "Global News"),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigestEntry {
    /// 1-based position within its section
    pub index: usize,
    pub title: String,
    pub summary: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigestSection {
    pub heading: &'static str,
    pub entries: Vec<DigestEntry>,
}

/// A dated summary of the Local, National and Global buckets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Digest {
    pub date: NaiveDate,
    pub sections: Vec<DigestSection>,
}

impl Digest {
    pub fn build(buckets: &Buckets, date: NaiveDate, per_section: usize) -> Self {
        let sections = SECTIONS
            .iter()
            .map(|(bucket, heading)| DigestSection {
                heading: *heading,
                entries: buckets
                    .get(*bucket)
                    .iter()
                    .take(per_section)
                    .enumerate()
                    .map(|(i, item)| DigestEntry {
                        index: i + 1,
                        title: item.title.clone(),
                        summary: item.summary.clone(),
                        url: item.url.clone(),
                    })
                    .collect(),
            })
            .collect();

        Self { date, sections }
    }

    pub fn file_name(&self) -> String {
        format!("news_summary_{}.md", self.date.format("%Y%m%d"))
    }

    pub fn render(&self) -> String {
        self.to_string()
    }

    /// Render into `dir`, returning the written path.
    pub fn write_to(&self, dir: &Path) -> anyhow::Result<PathBuf> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("create digest directory {}", dir.display()))?;
        let path = dir.join(self.file_name());
        std::fs::write(&path, self.render())
            .with_context(|| format!("write digest {}", path.display()))?;
        info!("Digest written to {}", path.display());
        Ok(path)
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "# {}", DIGEST_TITLE)?;
        writeln!(f)?;
        writeln!(f, "Date: {}", self.date.format("%d-%m-%Y"))?;

        for section in &self.sections {
            writeln!(f)?;
            writeln!(f, "## {}", section.heading)?;
            if section.entries.is_empty() {
                writeln!(f)?;
                writeln!(f, "No items.")?;
                continue;
            }
            for entry in &section.entries {
                writeln!(f)?;
                writeln!(f, "{}. {}", entry.index, entry.title)?;
                if !entry.summary.is_empty() {
                    writeln!(f, "   {}", entry.summary)?;
                }
                if !entry.url.is_empty() {
                    writeln!(f, "   {}", entry.url)?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NewsItem;

    fn item(title: &str, summary: &str, url: &str) -> NewsItem {
        NewsItem {
            title: title.to_string(),
            summary: summary.to_string(),
            url: url.to_string(),
            source: "test".to_string(),
            image_url: String::new(),
        }
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 12, 9).unwrap()
    }

    #[test]
    fn test_build_limits_and_indexes_entries() {
        let buckets = Buckets {
            local: (0..8).map(|i| item(&format!("L{}", i), "", "")).collect(),
            national: vec![item("N0", "s", "https://n/0")],
            global: vec![],
            hindi: vec![item("H0", "", "")],
        };

        let digest = Digest::build(&buckets, date(), 5);

        assert_eq!(digest.sections.len(), 3);
        assert_eq!(digest.sections[0].heading, "Local News");
        assert_eq!(digest.sections[0].entries.len(), 5);
        assert_eq!(digest.sections[0].entries[0].index, 1);
        assert_eq!(digest.sections[0].entries[4].index, 5);
        assert_eq!(digest.sections[1].entries[0].url, "https://n/0");
        assert!(digest.sections[2].entries.is_empty());
    }

    #[test]
    fn test_render_contents() {
        let buckets = Buckets {
            local: vec![item("Metro opens", "New line", "https://city/metro")],
            ..Default::default()
        };

        let text = Digest::build(&buckets, date(), 5).render();

        assert!(text.starts_with("# Daily News Summary\n"));
        assert!(text.contains("Date: 09-12-2024"));
        assert!(text.contains("## Local News\n\n1. Metro opens\n   New line\n   https://city/metro\n"));
        assert!(text.contains("## Global News\n\nNo items."));
        assert!(!text.contains("Hindi"));
    }

    #[test]
    fn test_file_name_uses_date() {
        let digest = Digest::build(&Buckets::default(), date(), 5);
        assert_eq!(digest.file_name(), "news_summary_20241209.md");
    }

    #[test]
    fn test_write_to_directory() {
        let dir = tempfile::tempdir().unwrap();
        let digest = Digest::build(&Buckets::default(), date(), 5);

        let path = digest.write_to(&dir.path().join("out")).unwrap();

        assert!(path.ends_with("news_summary_20241209.md"));
        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, digest.render());
    }
}
