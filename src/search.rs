use crate::model::{Bucket, Buckets, NewsItem};

/// Case-insensitive keyword match over titles and summaries of all buckets.
/// A blank query matches nothing.
pub fn search<'a>(buckets: &'a Buckets, query: &str) -> Vec<(Bucket, &'a NewsItem)> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }

    Bucket::ALL
        .iter()
        .flat_map(|bucket| buckets.get(*bucket).iter().map(move |item| (*bucket, item)))
        .filter(|(_, item)| {
            item.title.to_lowercase().contains(&needle)
                || item.summary.to_lowercase().contains(&needle)
        })
        .collect()
}
