//! Persisted like state
//!
//! One record per post id holding both the liked flag and the count. The
//! pair is serialized as a single value, so a write can never leave a flag
//! without its matching count.

use crate::backend::{KeyValueBackend, MemoryBackend};
use crate::error::{FeedError, Result};
use crate::post::PostId;
use serde::{Deserialize, Serialize};

const KEY_PREFIX: &str = "post_like_";

/// Persisted like state for one post
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LikeRecord {
    pub liked: bool,
    pub count: u32,
}

impl LikeRecord {
    pub fn new(liked: bool, count: u32) -> Self {
        Self { liked, count }
    }
}

/// Like state keyed by post id, written through to a durable backend
pub struct LikeStateStore<B: KeyValueBackend = MemoryBackend> {
    backend: B,
}

impl LikeStateStore<MemoryBackend> {
    /// Store backed by process memory only
    pub fn in_memory() -> Self {
        Self::new(MemoryBackend::new())
    }
}

impl<B: KeyValueBackend> LikeStateStore<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    fn key(id: &PostId) -> String {
        format!("{}{}", KEY_PREFIX, id)
    }

    /// Persisted state for `id`, or the supplied defaults
    ///
    /// Read and decode failures are logged and treated as "no record".
    pub fn get(&self, id: &PostId, default_liked: bool, default_count: u32) -> LikeRecord {
        let defaults = LikeRecord::new(default_liked, default_count);
        match self.backend.read(&Self::key(id)) {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                tracing::warn!("Discarding unreadable like record for {}: {}", id, e);
                defaults
            }),
            Ok(None) => defaults,
            Err(e) => {
                tracing::warn!("Like state read failed for {}: {}", id, e);
                defaults
            }
        }
    }

    /// Persist `(liked, count)` for `id` as one record
    pub fn set(&mut self, id: &PostId, liked: bool, count: u32) -> Result<()> {
        let raw = serde_json::to_string(&LikeRecord::new(liked, count))?;
        self.backend
            .write(&Self::key(id), &raw)
            .map_err(|e| FeedError::Persistence(format!("like state for {}: {}", id, e)))?;
        tracing::debug!("Saved like state for {}: liked={} count={}", id, liked, count);
        Ok(())
    }

    /// Forget the persisted state for one post
    pub fn reset(&mut self, id: &PostId) -> Result<()> {
        self.backend
            .remove(&Self::key(id))
            .map_err(|e| FeedError::Persistence(format!("reset {}: {}", id, e)))
    }

    /// Forget every persisted like record; other keys in the backend are kept
    pub fn clear_all(&mut self) -> Result<()> {
        let keys: Vec<String> = self
            .backend
            .keys()?
            .into_iter()
            .filter(|key| key.starts_with(KEY_PREFIX))
            .collect();
        tracing::debug!("Clearing {} like records", keys.len());
        self.backend
            .remove_many(&keys)
            .map_err(|e| FeedError::Persistence(format!("clear like state: {}", e)))
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::JsonFileBackend;
    use crate::post::derive_post_id;

    #[test]
    fn test_get_defaults_when_absent() {
        let store = LikeStateStore::in_memory();
        let id = derive_post_id("ada", "hello");
        assert_eq!(store.get(&id, true, 9), LikeRecord::new(true, 9));
    }

    #[test]
    fn test_set_then_get() {
        let mut store = LikeStateStore::in_memory();
        let id = derive_post_id("ada", "hello");

        store.set(&id, true, 5).unwrap();
        assert_eq!(store.get(&id, false, 0), LikeRecord::new(true, 5));
    }

    #[test]
    fn test_reset_reverts_to_defaults() {
        let mut store = LikeStateStore::in_memory();
        let id = derive_post_id("ada", "hello");

        store.set(&id, true, 5).unwrap();
        store.reset(&id).unwrap();
        assert_eq!(store.get(&id, false, 2), LikeRecord::new(false, 2));
    }

    #[test]
    fn test_clear_all_keeps_foreign_keys() {
        let mut store = LikeStateStore::in_memory();
        let a = derive_post_id("ada", "one");
        let b = derive_post_id("grace", "two");
        store.set(&a, true, 1).unwrap();
        store.set(&b, false, 3).unwrap();
        store.backend_mut().write("theme", "dark").unwrap();

        store.clear_all().unwrap();

        assert_eq!(store.get(&a, false, 0), LikeRecord::new(false, 0));
        assert_eq!(store.get(&b, true, 7), LikeRecord::new(true, 7));
        assert_eq!(
            store.backend().read("theme").unwrap().as_deref(),
            Some("dark")
        );
    }

    #[test]
    fn test_corrupt_record_reads_as_absent() {
        let mut store = LikeStateStore::in_memory();
        let id = derive_post_id("ada", "hello");
        store
            .backend_mut()
            .write(&format!("post_like_{}", id), "{\"liked\":tru")
            .unwrap();

        assert_eq!(store.get(&id, false, 4), LikeRecord::new(false, 4));
    }

    #[test]
    fn test_boundary_shifted_posts_do_not_share_state() {
        let mut store = LikeStateStore::in_memory();
        store.set(&derive_post_id("ab", "c"), true, 5).unwrap();

        let other = derive_post_id("a", "bc");
        assert_eq!(store.get(&other, false, 0), LikeRecord::new(false, 0));
    }

    #[test]
    fn test_file_store_survives_restart() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("likes.json");
        let id = derive_post_id("ada", "hello");

        let mut store = LikeStateStore::new(JsonFileBackend::open(&path));
        store.set(&id, true, 42).unwrap();
        drop(store);

        let store = LikeStateStore::new(JsonFileBackend::open(&path));
        assert_eq!(store.get(&id, false, 0), LikeRecord::new(true, 42));
    }
}
