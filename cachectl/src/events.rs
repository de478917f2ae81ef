use crate::domain::AuxiliaryCache;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CacheEvent {
    MediaCacheCleaned(AuxiliaryCleanedEvent),
    ImageCacheCleaned(AuxiliaryCleanedEvent),
    TypesRefreshed(TypesChangedEvent),
    TypesEnabled(TypesChangedEvent),
    TypesDisabled(TypesChangedEvent),
    StorageFlushed(StorageFlushedEvent),
}

impl CacheEvent {
    pub fn auxiliary_cleaned(cache: AuxiliaryCache) -> Self {
        let event = AuxiliaryCleanedEvent {
            cache,
            timestamp: now_timestamp(),
        };
        match cache {
            AuxiliaryCache::Media => CacheEvent::MediaCacheCleaned(event),
            AuxiliaryCache::Images => CacheEvent::ImageCacheCleaned(event),
        }
    }

    pub fn types_refreshed(ids: Vec<String>) -> Self {
        CacheEvent::TypesRefreshed(TypesChangedEvent::new(ids))
    }

    pub fn types_enabled(ids: Vec<String>) -> Self {
        CacheEvent::TypesEnabled(TypesChangedEvent::new(ids))
    }

    pub fn types_disabled(ids: Vec<String>) -> Self {
        CacheEvent::TypesDisabled(TypesChangedEvent::new(ids))
    }

    pub fn storage_flushed() -> Self {
        CacheEvent::StorageFlushed(StorageFlushedEvent {
            timestamp: now_timestamp(),
        })
    }

    pub fn name(&self) -> &str {
        match self {
            CacheEvent::MediaCacheCleaned(_) => "media_cache_cleaned",
            CacheEvent::ImageCacheCleaned(_) => "image_cache_cleaned",
            CacheEvent::TypesRefreshed(_) => "types_refreshed",
            CacheEvent::TypesEnabled(_) => "types_enabled",
            CacheEvent::TypesDisabled(_) => "types_disabled",
            CacheEvent::StorageFlushed(_) => "storage_flushed",
        }
    }

    pub fn timestamp(&self) -> i64 {
        match self {
            CacheEvent::MediaCacheCleaned(e) | CacheEvent::ImageCacheCleaned(e) => e.timestamp,
            CacheEvent::TypesRefreshed(e)
            | CacheEvent::TypesEnabled(e)
            | CacheEvent::TypesDisabled(e) => e.timestamp,
            CacheEvent::StorageFlushed(e) => e.timestamp,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuxiliaryCleanedEvent {
    pub cache: AuxiliaryCache,
    pub timestamp: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypesChangedEvent {
    pub ids: Vec<String>,
    pub timestamp: i64,
}

impl TypesChangedEvent {
    fn new(ids: Vec<String>) -> Self {
        Self {
            ids,
            timestamp: now_timestamp(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageFlushedEvent {
    pub timestamp: i64,
}

/// Helper to get current timestamp in seconds since UNIX epoch
pub fn now_timestamp() -> i64 {
    chrono::Utc::now().timestamp()
}
