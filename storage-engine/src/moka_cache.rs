use crate::{CacheEntry, TypeTags};
use async_trait::async_trait;
use cachectl::ports::CacheStore;
use moka::future::Cache;
use shared::Result;
use std::fmt::Debug;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Moka-based in-process cache storage with tag-addressed cleaning
/// Provides lock-free, concurrent cache with optional size bounds and TTL
pub struct MokaCacheStorage {
    cache: Cache<String, Arc<CacheEntry>>,
    type_tags: TypeTags,
}

impl MokaCacheStorage {
    /// Create a Moka cache storage with optional capacity and default TTL
    pub fn new(type_tags: TypeTags, max_entries: Option<u64>, default_ttl: Option<Duration>) -> Self {
        let mut builder = Cache::builder().name("cachectl");

        if let Some(capacity) = max_entries {
            builder = builder.max_capacity(capacity);
        }

        if let Some(ttl) = default_ttl {
            builder = builder.time_to_live(ttl);
        }

        Self {
            cache: builder.build(),
            type_tags,
        }
    }

    pub async fn put(&self, key: impl Into<String>, value: Vec<u8>, tags: &[&str]) {
        self.cache
            .insert(key.into(), Arc::new(CacheEntry::new(value, tags)))
            .await;
    }

    pub async fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.cache.get(key).await.map(|entry| entry.value.clone())
    }

    /// Invalidate every entry matching `predicate`, returning how many matched.
    async fn remove_where(&self, predicate: impl Fn(&CacheEntry) -> bool) -> usize {
        let keys: Vec<Arc<String>> = self
            .cache
            .iter()
            .filter(|(_, entry)| predicate(&**entry))
            .map(|(key, _)| key)
            .collect();

        for key in &keys {
            self.cache.invalidate(key.as_str()).await;
        }
        keys.len()
    }
}

#[async_trait]
impl CacheStore for MokaCacheStorage {
    async fn clean_type(&self, id: &str) -> Result<()> {
        let tags = self.type_tags.tags_for(id)?;
        let removed = self.remove_where(|entry| entry.has_any_tag(&tags)).await;
        debug!("Cleaned {} entr(ies) for cache type '{}'", removed, id);
        Ok(())
    }

    async fn flush(&self) -> Result<()> {
        let removed = self.remove_where(|_| true).await;
        debug!("Flushed {} entr(ies)", removed);
        Ok(())
    }

    async fn clean_by_tag(&self, tag: &str) -> Result<()> {
        let tags = [tag.to_string()];
        let removed = self.remove_where(|entry| entry.has_any_tag(&tags)).await;
        debug!("Cleaned {} entr(ies) tagged '{}'", removed, tag);
        Ok(())
    }
}

impl Debug for MokaCacheStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MokaCacheStorage")
            .field("entry_count", &self.cache.entry_count())
            .field("weighted_size", &self.cache.weighted_size())
            .finish()
    }
}
