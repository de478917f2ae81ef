use cachectl::defaults::{create_default_cache_types, create_default_enabled_map};
use cachectl::events::CacheEvent;
use cachectl::persistence::SledPersistence;
use cachectl::ports::CacheStore;
use cachectl::{AuxiliaryCache, AuxiliaryCleaners, BatchOperationEngine, CacheTypeRegistry};
use shared::config::{Backend, Config};
use shared::Result;
use std::sync::Arc;
use storage_engine::{DirectoryCleaner, MokaCacheStorage, SledCacheStorage, TypeTags};
use tokio::sync::broadcast;
use tracing::{debug, info};

/// Wire the default cache types to the configured state store, storage
/// backend and directory cleaners.
pub fn build_engine(
    config: &Config,
    events: broadcast::Sender<CacheEvent>,
) -> Result<BatchOperationEngine> {
    let definitions = create_default_cache_types();

    let state = Arc::new(SledPersistence::new(config.state_db_path())?);
    if state.initialize_defaults(&create_default_enabled_map(&definitions))? {
        info!(
            "Seeded default enabled map at {}",
            config.state_db_path().display()
        );
    }

    let type_tags = TypeTags::from_definitions(&definitions);
    let store: Arc<dyn CacheStore> = match config.backend {
        Backend::Sled => Arc::new(SledCacheStorage::new(config.storage_db_path(), type_tags)?),
        Backend::Memory => Arc::new(MokaCacheStorage::new(
            type_tags,
            config.memory_max_entries,
            config.memory_ttl,
        )),
    };
    debug!("Using {} cache storage", config.backend.as_str());

    let cleaners = AuxiliaryCleaners {
        images: Arc::new(DirectoryCleaner::new(
            AuxiliaryCache::Images,
            vec![config.image_dir.clone()],
        )),
        media: Arc::new(DirectoryCleaner::new(
            AuxiliaryCache::Media,
            config.media_dirs.clone(),
        )),
    };

    let registry = CacheTypeRegistry::new(definitions, state.clone(), state)?;
    Ok(
        BatchOperationEngine::new(registry, store, cleaners, config.app_tag.clone())
            .with_event_broadcaster(events),
    )
}
