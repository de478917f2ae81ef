use crate::{CacheEntry, TypeTags};
use async_trait::async_trait;
use cachectl::ports::CacheStore;
use shared::{Error, Result};
use std::fmt::Debug;
use std::path::Path;
use tracing::debug;

const ENTRIES_TREE: &str = "entries";

/// Sled-backed cache storage, shared by every process that opens the same path
#[derive(Clone)]
pub struct SledCacheStorage {
    db: sled::Db,
    entries: sled::Tree,
    type_tags: TypeTags,
}

impl SledCacheStorage {
    /// Creates the parent directory if it doesn't exist
    pub fn new(path: impl AsRef<Path>, type_tags: TypeTags) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| Error::Storage(format!("Failed to create directory: {}", e)))?;
        }

        let db = sled::open(path)
            .map_err(|e| Error::Storage(format!("Failed to open Sled database: {}", e)))?;
        let entries = db.open_tree(ENTRIES_TREE)?;

        Ok(Self {
            db,
            entries,
            type_tags,
        })
    }

    pub fn put(&self, key: &str, value: Vec<u8>, tags: &[&str]) -> Result<()> {
        let entry = serde_json::to_vec(&CacheEntry::new(value, tags))?;
        self.entries.insert(key.as_bytes(), entry)?;
        Ok(())
    }

    pub fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        match self.entries.get(key.as_bytes())? {
            Some(bytes) => {
                let entry: CacheEntry = serde_json::from_slice(&bytes)?;
                Ok(Some(entry.value))
            }
            None => Ok(None),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove every entry matching `predicate` in one atomic batch.
    fn remove_where(&self, predicate: impl Fn(&CacheEntry) -> bool) -> Result<usize> {
        let mut batch = sled::Batch::default();
        let mut removed = 0;

        for result in self.entries.iter() {
            let (key, value) = result?;
            let entry: CacheEntry = serde_json::from_slice(&value)?;
            if predicate(&entry) {
                batch.remove(key);
                removed += 1;
            }
        }

        self.entries.apply_batch(batch)?;
        self.db.flush()?;
        Ok(removed)
    }
}

#[async_trait]
impl CacheStore for SledCacheStorage {
    async fn clean_type(&self, id: &str) -> Result<()> {
        let tags = self.type_tags.tags_for(id)?;
        let removed = self.remove_where(|entry| entry.has_any_tag(&tags))?;
        debug!("Cleaned {} entr(ies) for cache type '{}'", removed, id);
        Ok(())
    }

    async fn flush(&self) -> Result<()> {
        self.entries.clear()?;
        self.db.flush()?;
        debug!("Flushed cache storage");
        Ok(())
    }

    async fn clean_by_tag(&self, tag: &str) -> Result<()> {
        let tags = [tag.to_string()];
        let removed = self.remove_where(|entry| entry.has_any_tag(&tags))?;
        debug!("Cleaned {} entr(ies) tagged '{}'", removed, tag);
        Ok(())
    }
}

impl Debug for SledCacheStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SledCacheStorage")
            .field("entries", &self.entries.len())
            .finish()
    }
}
