use crate::domain::{CacheType, CacheTypeDefinition};
use crate::planes::data::EnabledMap;
use crate::ports::{ConfigPersister, InvalidationTracker};
use shared::{Error, Result};
use std::collections::HashSet;
use std::fmt::Debug;
use std::sync::Arc;

/// Read-only view of the declared cache types and their persisted state.
///
/// Nothing is cached here: every call reads the persister or tracker again.
#[derive(Clone)]
pub struct CacheTypeRegistry {
    definitions: Arc<Vec<CacheTypeDefinition>>,
    persister: Arc<dyn ConfigPersister>,
    tracker: Arc<dyn InvalidationTracker>,
}

impl Debug for CacheTypeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheTypeRegistry")
            .field("type_ids", &self.type_ids())
            .finish()
    }
}

impl CacheTypeRegistry {
    /// Registration order of `definitions` is the listing order.
    pub fn new(
        definitions: Vec<CacheTypeDefinition>,
        persister: Arc<dyn ConfigPersister>,
        tracker: Arc<dyn InvalidationTracker>,
    ) -> Result<Self> {
        let mut seen = HashSet::new();
        for definition in &definitions {
            if !seen.insert(definition.id.as_str()) {
                return Err(Error::DuplicateCacheType(definition.id.clone()));
            }
        }

        Ok(Self {
            definitions: Arc::new(definitions),
            persister,
            tracker,
        })
    }

    /// Every declared cache type with its persisted enabled flag
    pub async fn list_all(&self) -> Result<Vec<CacheType>> {
        let map = self.read_enabled_map().await?;
        Ok(self
            .definitions
            .iter()
            .map(|definition| CacheType::from_definition(definition, map.is_enabled(&definition.id)))
            .collect())
    }

    pub async fn invalidated_ids(&self) -> Result<HashSet<String>> {
        self.tracker
            .invalidated_ids()
            .await
            .map_err(|e| Error::ConfigurationRead(format!("invalidated types: {}", e)))
    }

    pub fn type_ids(&self) -> Vec<String> {
        self.definitions.iter().map(|d| d.id.clone()).collect()
    }

    pub fn definition(&self, id: &str) -> Option<&CacheTypeDefinition> {
        self.definitions.iter().find(|d| d.id == id)
    }

    pub fn definitions(&self) -> &[CacheTypeDefinition] {
        &self.definitions
    }

    /// Read the whole enabled map. A failing persister is fatal.
    pub async fn read_enabled_map(&self) -> Result<EnabledMap> {
        self.persister.read().await.map_err(|e| match e {
            Error::ConfigurationRead(_) => e,
            other => Error::ConfigurationRead(other.to_string()),
        })
    }

    pub fn persister(&self) -> Arc<dyn ConfigPersister> {
        Arc::clone(&self.persister)
    }

    pub fn tracker(&self) -> Arc<dyn InvalidationTracker> {
        Arc::clone(&self.tracker)
    }
}
