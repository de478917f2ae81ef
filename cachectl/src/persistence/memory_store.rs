use crate::planes::data::EnabledMap;
use crate::ports::{ConfigPersister, InvalidationTracker};
use async_trait::async_trait;
use shared::Result;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-process enabled map and invalidated set.
/// State is lost when the process exits.
#[derive(Clone, Default)]
pub struct InMemoryConfigStore {
    enabled: Arc<RwLock<EnabledMap>>,
    invalidated: Arc<RwLock<HashSet<String>>>,
}

impl InMemoryConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_map(map: EnabledMap) -> Self {
        Self {
            enabled: Arc::new(RwLock::new(map)),
            invalidated: Arc::default(),
        }
    }

    /// Store where exactly `ids` are enabled.
    pub fn with_enabled(ids: &[&str]) -> Self {
        Self::with_map(ids.iter().map(|id| (id.to_string(), true)).collect())
    }
}

#[async_trait]
impl ConfigPersister for InMemoryConfigStore {
    async fn read(&self) -> Result<EnabledMap> {
        Ok(self.enabled.read().await.clone())
    }

    async fn write_all(&self, map: &EnabledMap) -> Result<()> {
        *self.enabled.write().await = map.clone();
        Ok(())
    }
}

#[async_trait]
impl InvalidationTracker for InMemoryConfigStore {
    async fn invalidated_ids(&self) -> Result<HashSet<String>> {
        Ok(self.invalidated.read().await.clone())
    }

    async fn invalidate(&self, id: &str) -> Result<()> {
        self.invalidated.write().await.insert(id.to_string());
        Ok(())
    }

    async fn revalidate(&self, id: &str) -> Result<()> {
        self.invalidated.write().await.remove(id);
        Ok(())
    }
}
