use crate::domain::response::{BatchResult, ItemOutcome, PurgeReport, PurgeStep};
use crate::domain::{ListingRow, Operation};
use crate::events::CacheEvent;
use crate::planes::control::{build_listing, resolve, CacheTypeRegistry};
use crate::planes::data::enabled_map::{apply_and_persist, ChangeSet, EnabledMap};
use crate::ports::{AuxiliaryCleaner, CacheStore};
use shared::{Error, Result};
use std::fmt::Debug;
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info, warn};

/// The special-purpose caches purged alongside the per-type caches.
#[derive(Clone)]
pub struct AuxiliaryCleaners {
    pub images: Arc<dyn AuxiliaryCleaner>,
    pub media: Arc<dyn AuxiliaryCleaner>,
}

/// Applies enable/disable/refresh to sets of cache types and runs the
/// single-shot storage and cleaner operations.
///
/// Every id is processed on its own: a failing id is recorded and the loop
/// moves on. Calls are awaited one after another, never in parallel.
#[derive(Clone)]
pub struct BatchOperationEngine {
    registry: CacheTypeRegistry,
    store: Arc<dyn CacheStore>,
    cleaners: AuxiliaryCleaners,
    app_tag: String,
    // held across every read-modify-write of the enabled map
    config_lock: Arc<Mutex<()>>,
    event_broadcaster: Option<broadcast::Sender<CacheEvent>>,
}

impl Debug for BatchOperationEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchOperationEngine")
            .field("registry", &self.registry)
            .field("app_tag", &self.app_tag)
            .finish()
    }
}

impl BatchOperationEngine {
    pub fn new(
        registry: CacheTypeRegistry,
        store: Arc<dyn CacheStore>,
        cleaners: AuxiliaryCleaners,
        app_tag: impl Into<String>,
    ) -> Self {
        Self {
            registry,
            store,
            cleaners,
            app_tag: app_tag.into(),
            config_lock: Arc::new(Mutex::new(())),
            event_broadcaster: None,
        }
    }

    pub fn with_event_broadcaster(mut self, broadcaster: broadcast::Sender<CacheEvent>) -> Self {
        self.event_broadcaster = Some(broadcaster);
        self
    }

    pub fn registry(&self) -> &CacheTypeRegistry {
        &self.registry
    }

    /// Resolve a raw selector against the registry. Empty means every type.
    pub fn resolve(&self, raw: Option<&str>) -> Vec<String> {
        resolve(raw, &self.registry.type_ids())
    }

    pub async fn list(&self) -> Result<Vec<ListingRow>> {
        info!("LIST");
        build_listing(&self.registry).await
    }

    /// Clean each type's stored data and clear its invalidated flag.
    pub async fn refresh(&self, ids: &[String]) -> BatchResult {
        info!("REFRESH: {} cache type(s)", ids.len());

        let tracker = self.registry.tracker();
        let mut outcomes: Vec<ItemOutcome> = Vec::with_capacity(ids.len());

        for id in ids {
            let result = match self.store.clean_type(id).await {
                Ok(()) => tracker.revalidate(id).await,
                Err(e) => Err(e),
            }
            .map_err(|e| e.to_string());

            let outcome = ItemOutcome::new(id.clone(), result.is_ok(), result);
            log_outcome(Operation::Refresh, &outcome);
            outcomes.push(outcome);
        }

        let refreshed = changed_ids(&outcomes);
        if !refreshed.is_empty() {
            self.broadcast(CacheEvent::types_refreshed(refreshed));
        }

        BatchResult::from_outcomes(Operation::Refresh, outcomes)
    }

    /// Enable every listed type that is absent or off in the enabled map.
    ///
    /// Already-enabled ids succeed without a change. The map is written once,
    /// and only if something changed.
    pub async fn enable(&self, ids: &[String]) -> Result<BatchResult> {
        info!("ENABLE: {} cache type(s)", ids.len());

        let _guard = self.config_lock.lock().await;
        let map = self.registry.read_enabled_map().await?;

        let mut planned = map.clone();
        let mut changes = ChangeSet::new();
        let mut outcomes: Vec<ItemOutcome> = Vec::with_capacity(ids.len());

        for id in ids {
            let changed = !planned.is_enabled(id);
            if changed {
                planned.set(id.clone(), true);
                changes.push(id.clone(), true);
            } else {
                debug!("ENABLE: '{}' already enabled", id);
            }
            outcomes.push(ItemOutcome::ok(id.clone(), changed));
        }

        Ok(self.persist(Operation::Enable, map, changes, outcomes).await)
    }

    /// Disable every listed type that is on, and clean every listed type.
    ///
    /// Cleaning happens for each requested id whether or not its flag
    /// changed. The map is written once, and only if something changed.
    pub async fn disable(&self, ids: &[String]) -> Result<BatchResult> {
        info!("DISABLE: {} cache type(s)", ids.len());

        let _guard = self.config_lock.lock().await;
        let map = self.registry.read_enabled_map().await?;

        let mut planned = map.clone();
        let mut changes = ChangeSet::new();
        let mut outcomes: Vec<ItemOutcome> = Vec::with_capacity(ids.len());

        for id in ids {
            let changed = planned.is_enabled(id);
            if changed {
                planned.set(id.clone(), false);
                changes.push(id.clone(), false);
            }

            // the flip is written even if cleaning fails, so it still counts
            let result = self.store.clean_type(id).await.map_err(|e| e.to_string());

            let outcome = ItemOutcome::new(id.clone(), changed, result);
            log_outcome(Operation::Disable, &outcome);
            outcomes.push(outcome);
        }

        Ok(self.persist(Operation::Disable, map, changes, outcomes).await)
    }

    /// Flag each declared type as stale. Undeclared ids fail individually.
    pub async fn invalidate(&self, ids: &[String]) -> BatchResult {
        info!("INVALIDATE: {} cache type(s)", ids.len());

        let tracker = self.registry.tracker();
        let mut outcomes: Vec<ItemOutcome> = Vec::with_capacity(ids.len());

        for id in ids {
            let result = match self.registry.definition(id) {
                Some(_) => tracker.invalidate(id).await,
                None => Err(Error::CacheTypeNotFound(id.clone())),
            }
            .map_err(|e| e.to_string());

            let outcome = ItemOutcome::new(id.clone(), result.is_ok(), result);
            log_outcome(Operation::Invalidate, &outcome);
            outcomes.push(outcome);
        }

        BatchResult::from_outcomes(Operation::Invalidate, outcomes)
    }

    /// Flush the whole cache storage, including data no type owns.
    pub async fn flush_storage(&self) -> BatchResult {
        info!("FLUSH_STORAGE");

        let outcome = self.store.flush().await;
        match &outcome {
            Ok(()) => self.broadcast(CacheEvent::storage_flushed()),
            Err(e) => warn!("FLUSH_STORAGE failed: {}", e),
        }
        BatchResult::single(Operation::FlushStorage, "storage", outcome)
    }

    /// Clean everything tagged with the application tag.
    pub async fn clean_tagged_cache(&self) -> BatchResult {
        info!("CLEAN_TAGGED_CACHE: tag={}", self.app_tag);

        let outcome = self.store.clean_by_tag(&self.app_tag).await;
        if let Err(e) = &outcome {
            warn!("CLEAN_TAGGED_CACHE failed: {}", e);
        }
        BatchResult::single(Operation::CleanTaggedCache, self.app_tag.clone(), outcome)
    }

    pub async fn clean_media_cache(&self) -> BatchResult {
        self.run_cleaner(Operation::CleanMediaCache, &self.cleaners.media)
            .await
    }

    pub async fn clean_images_cache(&self) -> BatchResult {
        self.run_cleaner(Operation::CleanImagesCache, &self.cleaners.images)
            .await
    }

    /// Best-effort full purge. Every step runs regardless of earlier failures.
    pub async fn purge_all(&self) -> PurgeReport {
        info!("PURGE");

        let mut report = PurgeReport::default();
        for step in PurgeStep::ORDER {
            let result = match step {
                PurgeStep::Refresh => self.refresh(&self.registry.type_ids()).await,
                PurgeStep::Images => self.clean_images_cache().await,
                PurgeStep::Media => self.clean_media_cache().await,
                PurgeStep::TaggedCache => self.clean_tagged_cache().await,
                PurgeStep::Storage => self.flush_storage().await,
            };
            report.push(step, result);
        }
        report
    }

    async fn run_cleaner(
        &self,
        operation: Operation,
        cleaner: &Arc<dyn AuxiliaryCleaner>,
    ) -> BatchResult {
        let kind = cleaner.kind();
        info!("CLEAN_AUXILIARY: cache={}", kind.as_str());

        let outcome = cleaner.clean().await;
        match &outcome {
            Ok(()) => self.broadcast(cleaner.notification()),
            Err(e) => warn!("CLEAN_AUXILIARY: cache={} failed: {}", kind.as_str(), e),
        }
        BatchResult::single(operation, kind.as_str(), outcome)
    }

    /// Write the planned changes once; on failure nothing counts as done.
    async fn persist(
        &self,
        operation: Operation,
        map: EnabledMap,
        changes: ChangeSet,
        outcomes: Vec<ItemOutcome>,
    ) -> BatchResult {
        let persister = self.registry.persister();
        match apply_and_persist(persister.as_ref(), map, &changes).await {
            Ok(_) => {
                if !changes.is_empty() {
                    let event = match operation {
                        Operation::Enable => CacheEvent::types_enabled(changes.ids()),
                        _ => CacheEvent::types_disabled(changes.ids()),
                    };
                    self.broadcast(event);
                }
                BatchResult::from_outcomes(operation, outcomes)
            }
            Err(e) => {
                warn!("{:?}: rolling back {} change(s): {}", operation, changes.len(), e);
                BatchResult::rolled_back(operation, outcomes, e.to_string())
            }
        }
    }

    fn broadcast(&self, event: CacheEvent) {
        if let Some(ref broadcaster) = self.event_broadcaster {
            let name = event.name().to_string();
            match broadcaster.send(event) {
                Ok(subscriber_count) => {
                    debug!(
                        "Broadcasted {} event to {} subscriber(s)",
                        name, subscriber_count
                    );
                }
                Err(_) => {
                    warn!("No subscribers for {} event", name);
                }
            }
        }
    }
}

fn log_outcome(operation: Operation, outcome: &ItemOutcome) {
    match outcome.error {
        None => debug!(
            "{:?}: '{}' ok (changed={})",
            operation, outcome.id, outcome.changed
        ),
        Some(ref message) => warn!(
            "{:?}: '{}' failed (changed={}): {}",
            operation, outcome.id, outcome.changed, message
        ),
    }
}

fn changed_ids(outcomes: &[ItemOutcome]) -> Vec<String> {
    outcomes
        .iter()
        .filter(|outcome| outcome.changed)
        .map(|outcome| outcome.id.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AuxiliaryCache, CacheTypeDefinition};
    use crate::persistence::InMemoryConfigStore;
    use crate::ports::{ConfigPersister, InvalidationTracker};
    use async_trait::async_trait;
    use std::collections::HashSet;
    use std::sync::Mutex as StdMutex;

    type CallLog = Arc<StdMutex<Vec<String>>>;

    #[derive(Default)]
    struct RecordingStore {
        calls: CallLog,
        failing_types: HashSet<String>,
        fail_flush: bool,
        fail_tag: bool,
    }

    #[async_trait]
    impl CacheStore for RecordingStore {
        async fn clean_type(&self, id: &str) -> Result<()> {
            self.calls.lock().unwrap().push(format!("clean_type:{}", id));
            if self.failing_types.contains(id) {
                return Err(Error::CacheTypeNotFound(id.to_string()));
            }
            Ok(())
        }

        async fn flush(&self) -> Result<()> {
            self.calls.lock().unwrap().push("flush".to_string());
            if self.fail_flush {
                return Err(Error::Storage("flush refused".to_string()));
            }
            Ok(())
        }

        async fn clean_by_tag(&self, tag: &str) -> Result<()> {
            self.calls.lock().unwrap().push(format!("clean_by_tag:{}", tag));
            if self.fail_tag {
                return Err(Error::Storage("tag clean refused".to_string()));
            }
            Ok(())
        }
    }

    struct RecordingCleaner {
        kind: AuxiliaryCache,
        calls: CallLog,
        fail: bool,
    }

    #[async_trait]
    impl AuxiliaryCleaner for RecordingCleaner {
        fn kind(&self) -> AuxiliaryCache {
            self.kind
        }

        async fn clean(&self) -> Result<()> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("clean:{}", self.kind.as_str()));
            if self.fail {
                return Err(Error::Cleaner {
                    name: self.kind.as_str().to_string(),
                    message: "permission denied".to_string(),
                });
            }
            Ok(())
        }
    }

    /// Persister that counts writes, can refuse them, and yields while reading.
    #[derive(Default)]
    struct CountingPersister {
        inner: InMemoryConfigStore,
        writes: StdMutex<usize>,
        fail_writes: bool,
    }

    #[async_trait]
    impl ConfigPersister for CountingPersister {
        async fn read(&self) -> Result<EnabledMap> {
            let map = self.inner.read().await;
            tokio::task::yield_now().await;
            map
        }

        async fn write_all(&self, map: &EnabledMap) -> Result<()> {
            if self.fail_writes {
                return Err(Error::Storage("read-only filesystem".to_string()));
            }
            *self.writes.lock().unwrap() += 1;
            self.inner.write_all(map).await
        }
    }

    struct Fixture {
        engine: BatchOperationEngine,
        calls: CallLog,
        persister: Arc<CountingPersister>,
        tracker: Arc<InMemoryConfigStore>,
    }

    struct FixtureOptions {
        enabled: Vec<&'static str>,
        failing_types: Vec<&'static str>,
        fail_images: bool,
        fail_flush: bool,
        fail_tag: bool,
        fail_writes: bool,
    }

    impl Default for FixtureOptions {
        fn default() -> Self {
            Self {
                enabled: vec!["config", "layout"],
                failing_types: Vec::new(),
                fail_images: false,
                fail_flush: false,
                fail_tag: false,
                fail_writes: false,
            }
        }
    }

    fn fixture(options: FixtureOptions) -> Fixture {
        let calls: CallLog = Arc::default();
        let persister = Arc::new(CountingPersister {
            inner: InMemoryConfigStore::with_enabled(&options.enabled),
            writes: StdMutex::new(0),
            fail_writes: options.fail_writes,
        });
        let tracker = Arc::new(InMemoryConfigStore::new());
        let definitions = vec![
            CacheTypeDefinition::new("config", "Configuration", "system", &["CONFIG"]),
            CacheTypeDefinition::new("layout", "Layouts", "frontend", &["LAYOUT"]),
            CacheTypeDefinition::new("block_html", "Blocks HTML output", "frontend", &["BLOCK_HTML"]),
        ];
        let registry =
            CacheTypeRegistry::new(definitions, persister.clone(), tracker.clone()).unwrap();

        let store = RecordingStore {
            calls: calls.clone(),
            failing_types: options.failing_types.iter().map(|s| s.to_string()).collect(),
            fail_flush: options.fail_flush,
            fail_tag: options.fail_tag,
        };
        let cleaners = AuxiliaryCleaners {
            images: Arc::new(RecordingCleaner {
                kind: AuxiliaryCache::Images,
                calls: calls.clone(),
                fail: options.fail_images,
            }),
            media: Arc::new(RecordingCleaner {
                kind: AuxiliaryCache::Media,
                calls: calls.clone(),
                fail: false,
            }),
        };

        Fixture {
            engine: BatchOperationEngine::new(registry, Arc::new(store), cleaners, "MAGE"),
            calls,
            persister,
            tracker,
        }
    }

    fn ids(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn assert_invariant(result: &BatchResult) {
        assert_eq!(result.succeeded + result.failures.len(), result.attempted);
    }

    #[tokio::test]
    async fn test_refresh_isolates_failures() {
        let f = fixture(FixtureOptions {
            failing_types: vec!["bogus"],
            ..Default::default()
        });

        let result = f.engine.refresh(&ids(&["config", "bogus", "layout"])).await;

        assert_eq!(result.attempted, 3);
        assert_eq!(result.succeeded, 2);
        assert_eq!(result.failures.len(), 1);
        assert_eq!(result.failures[0].id, "bogus");
        assert_invariant(&result);
        assert_eq!(
            *f.calls.lock().unwrap(),
            vec!["clean_type:config", "clean_type:bogus", "clean_type:layout"]
        );
    }

    #[tokio::test]
    async fn test_refresh_clears_invalidated_flag() {
        let f = fixture(FixtureOptions::default());
        f.tracker.invalidate("layout").await.unwrap();
        f.tracker.invalidate("config").await.unwrap();

        f.engine.refresh(&ids(&["layout"])).await;

        let remaining = f.tracker.invalidated_ids().await.unwrap();
        assert_eq!(remaining, HashSet::from(["config".to_string()]));
    }

    #[tokio::test]
    async fn test_enable_is_idempotent() {
        let f = fixture(FixtureOptions {
            enabled: vec![],
            ..Default::default()
        });

        let first = f.engine.enable(&ids(&["config"])).await.unwrap();
        let map_after_first = f.persister.read().await.unwrap();
        let second = f.engine.enable(&ids(&["config"])).await.unwrap();
        let map_after_second = f.persister.read().await.unwrap();

        assert_eq!(first.changed, 1);
        assert_eq!(second.changed, 0);
        assert_eq!(second.succeeded, 1);
        assert!(second.is_success());
        assert_eq!(map_after_first, map_after_second);
        assert_eq!(*f.persister.writes.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_enable_writes_once_for_whole_batch() {
        let f = fixture(FixtureOptions {
            enabled: vec![],
            ..Default::default()
        });

        let result = f
            .engine
            .enable(&ids(&["config", "layout", "config", "block_html"]))
            .await
            .unwrap();

        assert_eq!(result.attempted, 4);
        assert_eq!(result.succeeded, 4);
        assert_eq!(result.changed, 3);
        assert_eq!(*f.persister.writes.lock().unwrap(), 1);
        // enabling never cleans
        assert!(f.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_enable_passes_unknown_ids_through() {
        let f = fixture(FixtureOptions::default());

        let result = f.engine.enable(&ids(&["custom_type"])).await.unwrap();

        assert_eq!(result.changed, 1);
        assert!(f.persister.read().await.unwrap().is_enabled("custom_type"));
    }

    #[tokio::test]
    async fn test_disable_cleans_already_disabled_type() {
        let f = fixture(FixtureOptions {
            enabled: vec![],
            ..Default::default()
        });

        let result = f.engine.disable(&ids(&["block_html"])).await.unwrap();

        assert_eq!(result.changed, 0);
        assert_eq!(result.succeeded, 1);
        assert_eq!(*f.calls.lock().unwrap(), vec!["clean_type:block_html"]);
        assert_eq!(*f.persister.writes.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_disable_cleans_every_id_and_writes_once() {
        let f = fixture(FixtureOptions {
            failing_types: vec!["bogus"],
            ..Default::default()
        });

        let result = f
            .engine
            .disable(&ids(&["config", "bogus", "layout"]))
            .await
            .unwrap();

        assert_eq!(result.changed, 2);
        assert_eq!(result.failures.len(), 1);
        assert_invariant(&result);
        assert_eq!(f.calls.lock().unwrap().len(), 3);
        assert_eq!(*f.persister.writes.lock().unwrap(), 1);

        let map = f.persister.read().await.unwrap();
        assert!(!map.is_enabled("config"));
        assert!(!map.is_enabled("layout"));
    }

    #[tokio::test]
    async fn test_disable_counts_flip_when_clean_fails() {
        let (tx, mut rx) = broadcast::channel(8);
        let f = fixture(FixtureOptions {
            failing_types: vec!["layout"],
            ..Default::default()
        });
        let engine = f.engine.clone().with_event_broadcaster(tx);

        let result = engine.disable(&ids(&["config", "layout"])).await.unwrap();

        assert_eq!(result.attempted, 2);
        assert_eq!(result.succeeded, 1);
        assert_eq!(result.changed, 2);
        assert_eq!(result.unchanged, 0);
        assert_eq!(result.failures.len(), 1);
        assert_eq!(result.failures[0].id, "layout");
        assert_invariant(&result);

        let map = f.persister.read().await.unwrap();
        assert!(!map.is_enabled("config"));
        assert!(!map.is_enabled("layout"));

        match rx.try_recv().unwrap() {
            CacheEvent::TypesDisabled(event) => {
                assert_eq!(event.ids, ids(&["config", "layout"]))
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_disable_failed_write_rolls_back_but_still_cleans() {
        let f = fixture(FixtureOptions {
            fail_writes: true,
            ..Default::default()
        });

        let result = f
            .engine
            .disable(&ids(&["config", "layout", "block_html"]))
            .await
            .unwrap();

        assert_eq!(result.attempted, 3);
        assert_eq!(result.succeeded, 0);
        assert_eq!(result.changed, 0);
        assert_eq!(result.failures.len(), 3);
        assert!(result.persist_error.is_some());
        assert_invariant(&result);
        assert_eq!(
            *f.calls.lock().unwrap(),
            vec![
                "clean_type:config",
                "clean_type:layout",
                "clean_type:block_html"
            ]
        );

        let map = f.persister.read().await.unwrap();
        assert!(map.is_enabled("config"));
        assert!(map.is_enabled("layout"));
    }

    #[tokio::test]
    async fn test_failed_write_rolls_back_counts() {
        let f = fixture(FixtureOptions {
            enabled: vec![],
            fail_writes: true,
            ..Default::default()
        });

        let result = f.engine.enable(&ids(&["config", "layout"])).await.unwrap();

        assert_eq!(result.attempted, 2);
        assert_eq!(result.succeeded, 0);
        assert_eq!(result.changed, 0);
        assert_eq!(result.failures.len(), 2);
        assert!(result.persist_error.is_some());
        assert!(result.failures[0].message.contains("read-only filesystem"));
        assert_invariant(&result);
        assert!(!f.persister.read().await.unwrap().is_enabled("config"));
    }

    #[tokio::test]
    async fn test_unreadable_configuration_is_fatal() {
        struct Unreadable;

        #[async_trait]
        impl ConfigPersister for Unreadable {
            async fn read(&self) -> Result<EnabledMap> {
                Err(Error::Storage("database locked".to_string()))
            }

            async fn write_all(&self, _map: &EnabledMap) -> Result<()> {
                Ok(())
            }
        }

        let f = fixture(FixtureOptions::default());
        let registry = CacheTypeRegistry::new(
            f.engine.registry().definitions().to_vec(),
            Arc::new(Unreadable),
            f.tracker.clone(),
        )
        .unwrap();
        let engine = BatchOperationEngine {
            registry,
            ..f.engine.clone()
        };

        let result = engine.disable(&ids(&["config"])).await;
        assert!(matches!(result, Err(Error::ConfigurationRead(_))));
        // nothing was cleaned before the read failed
        assert!(f.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_batches_do_not_lose_updates() {
        let f = fixture(FixtureOptions {
            enabled: vec![],
            ..Default::default()
        });
        let config = ids(&["config"]);
        let layout = ids(&["layout"]);

        let (a, b) = tokio::join!(f.engine.enable(&config), f.engine.enable(&layout));
        assert_eq!(a.unwrap().changed, 1);
        assert_eq!(b.unwrap().changed, 1);

        let map = f.persister.read().await.unwrap();
        assert!(map.is_enabled("config"));
        assert!(map.is_enabled("layout"));
        assert_eq!(*f.persister.writes.lock().unwrap(), 2);
    }

    #[tokio::test]
    async fn test_invalidate_rejects_undeclared_ids() {
        let f = fixture(FixtureOptions::default());

        let result = f.engine.invalidate(&ids(&["layout", "nope"])).await;

        assert_eq!(result.succeeded, 1);
        assert_eq!(result.failures[0].id, "nope");
        assert!(f.tracker.invalidated_ids().await.unwrap().contains("layout"));
    }

    #[tokio::test]
    async fn test_purge_runs_every_step_after_failure() {
        let f = fixture(FixtureOptions {
            fail_images: true,
            ..Default::default()
        });

        let report = f.engine.purge_all().await;

        let steps: Vec<_> = report.steps.iter().map(|s| s.step).collect();
        assert_eq!(steps, PurgeStep::ORDER.to_vec());
        assert!(!report.is_success());
        assert!(!report.step(PurgeStep::Images).unwrap().is_success());
        assert!(report.step(PurgeStep::Media).unwrap().is_success());
        assert!(report.step(PurgeStep::TaggedCache).unwrap().is_success());
        assert!(report.step(PurgeStep::Storage).unwrap().is_success());
        assert_eq!(report.step(PurgeStep::Refresh).unwrap().attempted, 3);

        assert_eq!(
            *f.calls.lock().unwrap(),
            vec![
                "clean_type:config",
                "clean_type:layout",
                "clean_type:block_html",
                "clean:images",
                "clean:media",
                "clean_by_tag:MAGE",
                "flush",
            ]
        );
    }

    #[tokio::test]
    async fn test_single_shot_failures_are_reported() {
        let f = fixture(FixtureOptions {
            fail_flush: true,
            fail_tag: true,
            ..Default::default()
        });

        let flush = f.engine.flush_storage().await;
        assert_eq!(flush.attempted, 1);
        assert_eq!(flush.failures[0].message, "storage: flush refused");

        let tagged = f.engine.clean_tagged_cache().await;
        assert_eq!(tagged.failures[0].id, "MAGE");

        let media = f.engine.clean_media_cache().await;
        assert!(media.is_success());
    }

    #[tokio::test]
    async fn test_cleaner_success_broadcasts_notification() {
        let (tx, mut rx) = broadcast::channel(8);
        let f = fixture(FixtureOptions::default());
        let engine = f.engine.with_event_broadcaster(tx);

        engine.clean_media_cache().await;

        let event = rx.recv().await.unwrap();
        assert!(matches!(event, CacheEvent::MediaCacheCleaned(_)));
    }

    #[tokio::test]
    async fn test_failed_cleaner_broadcasts_nothing() {
        let (tx, mut rx) = broadcast::channel(8);
        let f = fixture(FixtureOptions {
            fail_images: true,
            ..Default::default()
        });
        let engine = f.engine.with_event_broadcaster(tx);

        let result = engine.clean_images_cache().await;

        assert!(!result.is_success());
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_missing_subscribers_do_not_fail_operation() {
        let (tx, rx) = broadcast::channel(8);
        drop(rx);
        let f = fixture(FixtureOptions {
            enabled: vec![],
            ..Default::default()
        });
        let engine = f.engine.with_event_broadcaster(tx);

        let result = engine.enable(&ids(&["config"])).await.unwrap();
        assert_eq!(result.changed, 1);
    }

    #[test]
    fn test_resolve_uses_registry_order() {
        let f = fixture(FixtureOptions::default());
        assert_eq!(
            f.engine.resolve(None),
            ids(&["config", "layout", "block_html"])
        );
        assert_eq!(f.engine.resolve(Some("eav,eav")), ids(&["eav", "eav"]));
    }
}
