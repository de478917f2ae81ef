use crate::events::now_timestamp;
use crate::planes::data::EnabledMap;
use crate::ports::{ConfigPersister, InvalidationTracker};
use async_trait::async_trait;
use shared::{Error, Result};
use std::collections::HashSet;
use std::path::Path;

const ENABLED_MAP_KEY: &str = "enabled_types";
const INVALIDATED_TREE: &str = "invalidated_types";

/// Sled-based persistence for the enabled map and the invalidated set
#[derive(Clone)]
pub struct SledPersistence {
    db: sled::Db,
}

impl SledPersistence {
    /// Create a new Sled persistence layer
    /// Creates the parent directory if it doesn't exist
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                Error::ConfigurationRead(format!("Failed to create directory: {}", e))
            })?;
        }

        let db = sled::open(path).map_err(|e| {
            Error::ConfigurationRead(format!("Failed to open Sled database: {}", e))
        })?;

        Ok(Self { db })
    }

    /// Store `defaults` if no enabled map has ever been written.
    /// Returns true when the defaults were stored.
    pub fn initialize_defaults(&self, defaults: &EnabledMap) -> Result<bool> {
        let value = serde_json::to_vec(defaults)?;
        let swapped = self
            .db
            .compare_and_swap(ENABLED_MAP_KEY, None as Option<&[u8]>, Some(value))
            .map_err(|e| Error::PersistenceWrite(format!("Failed to seed enabled map: {}", e)))?;

        if swapped.is_err() {
            return Ok(false);
        }

        self.db
            .flush()
            .map_err(|e| Error::PersistenceWrite(format!("Failed to flush database: {}", e)))?;
        Ok(true)
    }

    fn invalidated_tree(&self) -> Result<sled::Tree> {
        Ok(self.db.open_tree(INVALIDATED_TREE)?)
    }
}

#[async_trait]
impl ConfigPersister for SledPersistence {
    async fn read(&self) -> Result<EnabledMap> {
        let value = self
            .db
            .get(ENABLED_MAP_KEY)
            .map_err(|e| Error::ConfigurationRead(format!("Failed to read enabled map: {}", e)))?;

        match value {
            Some(bytes) => serde_json::from_slice(&bytes).map_err(|e| {
                Error::ConfigurationRead(format!("Failed to deserialize enabled map: {}", e))
            }),
            None => Ok(EnabledMap::new()),
        }
    }

    /// The whole map is one value, so the write is atomic.
    async fn write_all(&self, map: &EnabledMap) -> Result<()> {
        let value = serde_json::to_vec(map).map_err(|e| {
            Error::PersistenceWrite(format!("Failed to serialize enabled map: {}", e))
        })?;

        self.db
            .insert(ENABLED_MAP_KEY, value)
            .map_err(|e| Error::PersistenceWrite(format!("Failed to save enabled map: {}", e)))?;

        self.db
            .flush()
            .map_err(|e| Error::PersistenceWrite(format!("Failed to flush database: {}", e)))?;

        Ok(())
    }
}

#[async_trait]
impl InvalidationTracker for SledPersistence {
    async fn invalidated_ids(&self) -> Result<HashSet<String>> {
        let mut ids = HashSet::new();

        for result in self.invalidated_tree()?.iter() {
            let (key, _) = result?;
            let id = String::from_utf8(key.to_vec())
                .map_err(|e| Error::Internal(format!("Invalid cache type id UTF-8: {}", e)))?;
            ids.insert(id);
        }

        Ok(ids)
    }

    async fn invalidate(&self, id: &str) -> Result<()> {
        let tree = self.invalidated_tree()?;
        tree.insert(id.as_bytes(), now_timestamp().to_be_bytes().to_vec())?;
        tree.flush()?;
        Ok(())
    }

    async fn revalidate(&self, id: &str) -> Result<()> {
        let tree = self.invalidated_tree()?;
        if tree.remove(id.as_bytes())?.is_some() {
            tree.flush()?;
        }
        Ok(())
    }
}
