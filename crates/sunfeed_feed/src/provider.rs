//! Post sources
//!
//! A [`ContentProvider`] never fails: a missing or corrupt source is logged
//! and reported as an empty list, which the feed turns into its fallback post.

use crate::error::{FeedError, Result};
use crate::post::PostRecord;
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

/// Source of raw post records
pub trait ContentProvider {
    fn load_posts(&self) -> Vec<PostRecord>;
}

/// Serves a fixed list of records
#[derive(Clone, Debug, Default)]
pub struct StaticContentProvider {
    records: Vec<PostRecord>,
}

impl StaticContentProvider {
    pub fn new(records: Vec<PostRecord>) -> Self {
        Self { records }
    }

    pub fn empty() -> Self {
        Self::default()
    }
}

impl ContentProvider for StaticContentProvider {
    fn load_posts(&self) -> Vec<PostRecord> {
        self.records.clone()
    }
}

#[derive(Deserialize)]
struct PostFile {
    posts: Option<Vec<serde_json::Value>>,
}

/// Parse a posts document of the form `{"posts": [...]}`
///
/// Entries that fail to deserialize are dropped with a warning; only a
/// document that is not JSON or has no `posts` array is an error.
pub fn parse_posts(json: &str) -> Result<Vec<PostRecord>> {
    let file: PostFile = serde_json::from_str(json)?;
    let Some(entries) = file.posts else {
        return Err(FeedError::ContentUnavailable(
            "posts array is missing".into(),
        ));
    };

    let total = entries.len();
    let records: Vec<PostRecord> = entries
        .into_iter()
        .enumerate()
        .filter_map(|(index, value)| match serde_json::from_value(value) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!(
                    "{}",
                    FeedError::MalformedRecord(format!("entry {}: {}", index, e))
                );
                None
            }
        })
        .collect();

    if records.len() < total {
        tracing::warn!("Dropped {} of {} post entries", total - records.len(), total);
    }
    Ok(records)
}

/// Reads posts from a JSON data file
#[derive(Clone, Debug)]
pub struct JsonContentProvider {
    path: PathBuf,
}

impl JsonContentProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn try_load(&self) -> Result<Vec<PostRecord>> {
        let text = fs::read_to_string(&self.path)?;
        parse_posts(&text)
    }
}

impl ContentProvider for JsonContentProvider {
    fn load_posts(&self) -> Vec<PostRecord> {
        match self.try_load() {
            Ok(records) => {
                tracing::info!(
                    "Loaded {} posts from {}",
                    records.len(),
                    self.path.display()
                );
                records
            }
            Err(e) => {
                tracing::error!("Failed to load posts from {}: {}", self.path.display(), e);
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const POSTS: &str = r#"{
        "posts": [
            {
                "username": "ada",
                "profilePic": "ada.png",
                "content": "Analytical engines are neat",
                "likes": 12,
                "isLiked": false,
                "comments": ["agreed", "very neat"],
                "timestamp": "2h ago"
            },
            { "username": "grace", "content": "Found a moth", "likes": "many" },
            { "username": "linus", "content": "Just a hobby" }
        ]
    }"#;

    #[test]
    fn test_parse_drops_bad_entries() {
        let records = parse_posts(POSTS).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].username.as_deref(), Some("ada"));
        assert_eq!(records[1].username.as_deref(), Some("linus"));
        assert_eq!(records[1].comments, None);
    }

    #[test]
    fn test_parse_rejects_missing_array() {
        assert!(matches!(
            parse_posts(r#"{"items": []}"#),
            Err(FeedError::ContentUnavailable(_))
        ));
        assert!(matches!(parse_posts("not json"), Err(FeedError::Json(_))));
    }

    #[test]
    fn test_json_provider_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("posts.json");
        fs::write(&path, POSTS).unwrap();

        let provider = JsonContentProvider::new(&path);
        assert_eq!(provider.load_posts().len(), 2);
    }

    #[test]
    fn test_json_provider_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let provider = JsonContentProvider::new(dir.path().join("absent.json"));
        assert!(provider.load_posts().is_empty());
    }
}
