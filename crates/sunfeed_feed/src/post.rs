//! Post entity and identity derivation
//!
//! A post's id is the SHA-256 of its username, length-prefixed, followed by
//! its content. The id is computed once in the constructor and the fields it derives from are
//! immutable afterwards, so the id can never go stale.

use crate::error::FeedError;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Stable identifier of a post, 64 lowercase hex characters
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostId(String);

impl PostId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Derive the id for a `(username, content)` pair
///
/// The username's byte length is hashed first as a little-endian `u64` so
/// that moving bytes across the boundary changes the id.
pub fn derive_post_id(username: &str, content: &str) -> PostId {
    let mut hasher = Sha256::new();
    hasher.update((username.len() as u64).to_le_bytes());
    hasher.update(username.as_bytes());
    hasher.update(content.as_bytes());
    PostId(hex::encode(hasher.finalize()))
}

/// Raw post record as stored in the posts data file
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostRecord {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub profile_pic: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub likes: i64,
    #[serde(default)]
    pub is_liked: bool,
    #[serde(default)]
    pub comments: Option<Vec<String>>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

/// A post in the feed
#[derive(Clone, Debug, PartialEq)]
pub struct Post {
    id: PostId,
    username: String,
    content: String,
    profile_pic: Option<String>,
    timestamp: Option<String>,
    comments: Vec<String>,
    likes: u32,
    is_liked: bool,
}

impl Post {
    pub fn new(username: impl Into<String>, content: impl Into<String>) -> Self {
        let username = username.into();
        let content = content.into();
        Self {
            id: derive_post_id(&username, &content),
            username,
            content,
            profile_pic: None,
            timestamp: None,
            comments: Vec::new(),
            likes: 0,
            is_liked: false,
        }
    }

    /// The single post shown when no content could be loaded
    pub fn fallback() -> Self {
        Self::new(
            "System Message",
            "Failed to load posts. Please check your data file.",
        )
        .with_timestamp("Just now")
    }

    pub fn with_likes(mut self, likes: u32) -> Self {
        self.likes = likes;
        self
    }

    pub fn liked(mut self, is_liked: bool) -> Self {
        self.is_liked = is_liked;
        self
    }

    pub fn with_comments<I, S>(mut self, comments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.comments = comments.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_timestamp(mut self, timestamp: impl Into<String>) -> Self {
        self.timestamp = Some(timestamp.into());
        self
    }

    pub fn with_profile_pic(mut self, image: impl Into<String>) -> Self {
        self.profile_pic = Some(image.into());
        self
    }

    pub fn id(&self) -> &PostId {
        &self.id
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn profile_pic(&self) -> Option<&str> {
        self.profile_pic.as_deref()
    }

    pub fn timestamp(&self) -> Option<&str> {
        self.timestamp.as_deref()
    }

    pub fn comments(&self) -> &[String] {
        &self.comments
    }

    pub fn likes(&self) -> u32 {
        self.likes
    }

    pub fn is_liked(&self) -> bool {
        self.is_liked
    }

    /// Overwrite like state, e.g. from a persisted record
    pub fn set_like_state(&mut self, is_liked: bool, likes: u32) {
        self.is_liked = is_liked;
        self.likes = likes;
    }

    /// Flip the like flag and adjust the count by one
    ///
    /// Unliking at zero keeps the count at zero.
    pub fn toggle_like(&mut self) {
        self.is_liked = !self.is_liked;
        self.likes = if self.is_liked {
            self.likes.saturating_add(1)
        } else {
            self.likes.saturating_sub(1)
        };
    }
}

impl TryFrom<PostRecord> for Post {
    type Error = FeedError;

    fn try_from(record: PostRecord) -> Result<Self, Self::Error> {
        let username = match record.username {
            Some(name) if !name.trim().is_empty() => name,
            _ => return Err(FeedError::MalformedRecord("username is missing".into())),
        };
        let Some(content) = record.content else {
            return Err(FeedError::MalformedRecord(format!(
                "post by {} has no content",
                username
            )));
        };
        let likes = u32::try_from(record.likes).map_err(|_| {
            FeedError::MalformedRecord(format!(
                "post by {} has invalid like count {}",
                username, record.likes
            ))
        })?;

        let mut post = Post::new(username, content)
            .with_likes(likes)
            .liked(record.is_liked)
            .with_comments(record.comments.unwrap_or_default());
        post.timestamp = record.timestamp;
        post.profile_pic = record.profile_pic;
        Ok(post)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_deterministic() {
        let a = derive_post_id("ada", "hello world");
        let b = derive_post_id("ada", "hello world");
        assert_eq!(a, b);
        assert_eq!(a.as_str().len(), 64);
        assert!(a
            .as_str()
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
    }

    #[test]
    fn test_id_distinguishes_inputs() {
        let base = derive_post_id("ada", "hello");
        assert_ne!(base, derive_post_id("ada", "hello!"));
        assert_ne!(base, derive_post_id("grace", "hello"));
    }

    #[test]
    fn test_id_empty_inputs() {
        // SHA-256 of eight zero bytes (the length prefix alone)
        assert_eq!(
            derive_post_id("", "").as_str(),
            "af5570f5a1810b7af78caf4bc70a660f0df51e42baf91d4de5b2328de0e83dfc"
        );
    }

    #[test]
    fn test_id_boundary_shift_differs() {
        let left = derive_post_id("ab", "c");
        let right = derive_post_id("a", "bc");
        assert_ne!(left, right);
        assert_eq!(
            left.as_str(),
            "6d38234db36d6dcc6ff6702b434e13bcdad84fa7a0aed399b15b83a5fe49d721"
        );
        assert_eq!(
            right.as_str(),
            "22a5c7045bc36a32e64f063ff4e7946d8a663238bf27e4f5b32713d987ec51ac"
        );
    }

    #[test]
    fn test_post_id_matches_fields() {
        let post = Post::new("ada", "first post").with_likes(3);
        assert_eq!(post.id(), &derive_post_id("ada", "first post"));
    }

    #[test]
    fn test_toggle_twice_restores() {
        let mut post = Post::new("ada", "x").with_likes(7);
        post.toggle_like();
        assert!(post.is_liked());
        assert_eq!(post.likes(), 8);

        post.toggle_like();
        assert!(!post.is_liked());
        assert_eq!(post.likes(), 7);
    }

    #[test]
    fn test_unlike_at_zero_clamps() {
        let mut post = Post::new("ada", "x").liked(true).with_likes(0);
        post.toggle_like();
        assert!(!post.is_liked());
        assert_eq!(post.likes(), 0);
    }

    #[test]
    fn test_record_validation() {
        let record = PostRecord {
            username: Some("ada".into()),
            content: Some("hi".into()),
            likes: 4,
            comments: Some(vec!["nice".into()]),
            timestamp: Some("2h ago".into()),
            ..Default::default()
        };
        let post = Post::try_from(record).unwrap();
        assert_eq!(post.likes(), 4);
        assert_eq!(post.comments(), &["nice".to_string()]);
        assert_eq!(post.timestamp(), Some("2h ago"));

        let blank = PostRecord {
            username: Some("  ".into()),
            content: Some("hi".into()),
            ..Default::default()
        };
        assert!(matches!(
            Post::try_from(blank),
            Err(FeedError::MalformedRecord(_))
        ));

        let negative = PostRecord {
            username: Some("ada".into()),
            content: Some("hi".into()),
            likes: -1,
            ..Default::default()
        };
        assert!(Post::try_from(negative).is_err());

        let no_content = PostRecord {
            username: Some("ada".into()),
            ..Default::default()
        };
        assert!(Post::try_from(no_content).is_err());
    }

    #[test]
    fn test_record_deserializes_camel_case() {
        let json = r#"{
            "username": "ada",
            "profilePic": "avatars/ada.png",
            "content": "hello",
            "likes": 12,
            "isLiked": true,
            "comments": ["a", "b"]
        }"#;
        let record: PostRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.profile_pic.as_deref(), Some("avatars/ada.png"));
        assert!(record.is_liked);
        assert_eq!(record.timestamp, None);
    }
}
