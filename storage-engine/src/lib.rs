use cachectl::CacheTypeDefinition;
use serde::{Deserialize, Serialize};
use shared::{Error, Result};
use std::collections::{BTreeSet, HashMap};

pub mod cleaners;
pub mod moka_cache;
pub mod sled_cache;

pub use cleaners::DirectoryCleaner;
pub use moka_cache::MokaCacheStorage;
pub use sled_cache::SledCacheStorage;

/// A stored value together with the tags it was saved under.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub value: Vec<u8>,
    pub tags: BTreeSet<String>,
}

impl CacheEntry {
    pub fn new(value: Vec<u8>, tags: &[&str]) -> Self {
        Self {
            value,
            tags: tags.iter().map(|t| t.to_string()).collect(),
        }
    }

    pub fn has_any_tag(&self, tags: &[String]) -> bool {
        tags.iter().any(|tag| self.tags.contains(tag))
    }
}

/// Storage tags owned by each declared cache type.
#[derive(Clone, Debug, Default)]
pub struct TypeTags {
    tags: HashMap<String, Vec<String>>,
}

impl TypeTags {
    pub fn from_definitions(definitions: &[CacheTypeDefinition]) -> Self {
        Self {
            tags: definitions
                .iter()
                .map(|d| (d.id.clone(), d.tags.clone()))
                .collect(),
        }
    }

    /// Tags for `id`; undeclared ids are `Error::CacheTypeNotFound`.
    pub fn tags_for(&self, id: &str) -> Result<Vec<String>> {
        self.tags
            .get(id)
            .cloned()
            .ok_or_else(|| Error::CacheTypeNotFound(id.to_string()))
    }
}
