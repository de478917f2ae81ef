#![deny(clippy::all)]

use crate::domain::AuxiliaryCache;
use crate::events::CacheEvent;
use crate::planes::data::EnabledMap;
use async_trait::async_trait;
use shared::Result;
use std::collections::HashSet;

// Ports are the pluggable extension points for the collaborators the core drives

/// Port for the durable record of which cache types are enabled.
/// Read and written as a whole mapping.
#[async_trait]
pub trait ConfigPersister: Send + Sync + 'static {
    async fn read(&self) -> Result<EnabledMap>;
    async fn write_all(&self, map: &EnabledMap) -> Result<()>;
}

/// Port for the application's record of stale cache types.
#[async_trait]
pub trait InvalidationTracker: Send + Sync + 'static {
    async fn invalidated_ids(&self) -> Result<HashSet<String>>;
    async fn invalidate(&self, id: &str) -> Result<()>;
    async fn revalidate(&self, id: &str) -> Result<()>;
}

/// Port for the underlying cache storage engine (e.g., Moka, Sled)
#[async_trait]
pub trait CacheStore: Send + Sync + 'static {
    /// Remove everything stored under the given cache type.
    /// Unknown ids fail with `Error::CacheTypeNotFound`.
    async fn clean_type(&self, id: &str) -> Result<()>;
    /// Drop all stored data, including entries no cache type owns.
    async fn flush(&self) -> Result<()>;
    async fn clean_by_tag(&self, tag: &str) -> Result<()>;
}

/// Port for special-purpose caches cleaned as a single step.
#[async_trait]
pub trait AuxiliaryCleaner: Send + Sync + 'static {
    fn kind(&self) -> AuxiliaryCache;
    async fn clean(&self) -> Result<()>;

    /// Notification emitted after a successful clean.
    fn notification(&self) -> CacheEvent {
        CacheEvent::auxiliary_cleaned(self.kind())
    }
}
