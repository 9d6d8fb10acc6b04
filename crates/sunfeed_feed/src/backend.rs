//! Durable key-value substrates for persisted feed state
//!
//! [`KeyValueBackend`] is the narrow interface the like store needs: string
//! keys, string values, synchronous writes that are durable on return.

use crate::error::Result;
use rustc_hash::FxHashMap;
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// A simple durable string key-value store
pub trait KeyValueBackend {
    fn read(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`; durable before returning `Ok`
    fn write(&mut self, key: &str, value: &str) -> Result<()>;

    fn remove(&mut self, key: &str) -> Result<()>;

    fn keys(&self) -> Result<Vec<String>>;

    /// Remove several keys; backends that can should do it in one write
    fn remove_many(&mut self, keys: &[String]) -> Result<()> {
        for key in keys {
            self.remove(key)?;
        }
        Ok(())
    }
}

// =============================================================================
// In-memory backend
// =============================================================================

/// Process-local backend; state is lost on exit
#[derive(Debug, Default)]
pub struct MemoryBackend {
    values: FxHashMap<String, String>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueBackend for MemoryBackend {
    fn read(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.values.remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        Ok(self.values.keys().cloned().collect())
    }
}

// =============================================================================
// JSON file backend
// =============================================================================

/// Backend persisted as one JSON object in a local settings file
///
/// Every mutation rewrites the whole file through a temporary file in the
/// same directory, fsyncs it, renames it over the original, and fsyncs the
/// directory so the rename itself is durable. A crash leaves either the old
/// file or the new one, never a partial write.
#[derive(Debug)]
pub struct JsonFileBackend {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl JsonFileBackend {
    /// Open the settings file at `path`
    ///
    /// A missing file starts empty. An unreadable or corrupt file is logged
    /// and also starts empty; it is replaced on the next write.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(text) => match serde_json::from_str(&text) {
                Ok(entries) => entries,
                Err(e) => {
                    tracing::warn!("Ignoring corrupt settings file {}: {}", path.display(), e);
                    BTreeMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                tracing::warn!("Could not read settings file {}: {}", path.display(), e);
                BTreeMap::new()
            }
        };
        tracing::debug!(
            "JsonFileBackend: opened {} with {} entries",
            path.display(),
            entries.len()
        );
        Self { path, entries }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir)?;

        let mut file = NamedTempFile::new_in(dir)?;
        serde_json::to_writer_pretty(&mut file, entries)?;
        file.flush()?;
        file.as_file().sync_all()?;
        file.persist(&self.path).map_err(|e| e.error)?;

        #[cfg(unix)]
        fs::File::open(dir)?.sync_all()?;
        Ok(())
    }

    /// Apply `f` to a copy of the entries and commit it only if the write succeeds
    fn commit<F>(&mut self, f: F) -> Result<()>
    where
        F: FnOnce(&mut BTreeMap<String, String>),
    {
        let mut next = self.entries.clone();
        f(&mut next);
        self.persist(&next)?;
        self.entries = next;
        Ok(())
    }
}

impl KeyValueBackend for JsonFileBackend {
    fn read(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> Result<()> {
        self.commit(|entries| {
            entries.insert(key.to_string(), value.to_string());
        })
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        if !self.entries.contains_key(key) {
            return Ok(());
        }
        self.commit(|entries| {
            entries.remove(key);
        })
    }

    fn keys(&self) -> Result<Vec<String>> {
        Ok(self.entries.keys().cloned().collect())
    }

    fn remove_many(&mut self, keys: &[String]) -> Result<()> {
        self.commit(|entries| {
            for key in keys {
                entries.remove(key);
            }
        })
    }
}
