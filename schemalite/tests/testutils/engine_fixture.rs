//! Engine fixture for SchemaLite integration tests
//!
//! Wires a ReloadCoordinator to an in-memory definition store, an in-memory
//! index catalog and a settings store of the caller's choosing. Must be
//! created inside a tokio runtime.

use schemalite::storage::MemorySettingsStore;
use schemalite::{
    EngineConfig, Generation, MemoryDefinitionStore, MemoryIndexCatalog, ReloadCoordinator,
    ReloadOutcome, SchemaDefinition, SettingsStore,
};
use std::sync::Arc;
use tokio::runtime::Handle;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub struct EngineFixture {
    pub coordinator: Arc<ReloadCoordinator>,
    pub store: Arc<MemoryDefinitionStore>,
    pub catalog: Arc<MemoryIndexCatalog>,
    pub settings: Arc<dyn SettingsStore>,
}

impl EngineFixture {
    /// In-memory engine with hierarchy and index work enabled
    pub fn new() -> Self {
        Self::with_config(EngineConfig::in_memory())
    }

    /// In-memory engine in testing mode
    pub fn testing() -> Self {
        Self::with_config(EngineConfig::testing())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self::build(
            config,
            Arc::new(MemoryIndexCatalog::new()),
            Arc::new(MemorySettingsStore::new()),
        )
    }

    pub fn build(
        config: EngineConfig,
        catalog: Arc<MemoryIndexCatalog>,
        settings: Arc<dyn SettingsStore>,
    ) -> Self {
        init_logging();
        let store = Arc::new(MemoryDefinitionStore::new());
        let coordinator = Arc::new(ReloadCoordinator::new(
            config,
            store.clone(),
            catalog.clone(),
            settings.clone(),
            Handle::current(),
        ));
        Self {
            coordinator,
            store,
            catalog,
            settings,
        }
    }

    pub fn define(&self, definitions: impl IntoIterator<Item = SchemaDefinition>) -> &Self {
        for definition in definitions {
            self.store.upsert(definition);
        }
        self
    }

    /// Reload and panic unless this call committed a generation
    pub async fn reload_ok(&self) -> Arc<Generation> {
        match self.coordinator.reload().await {
            ReloadOutcome::Committed(generation) => generation,
            other => panic!("Expected a committed reload, got {:?}", other),
        }
    }

    /// Reload and wait for the index sweep of the committed generation
    pub async fn reload_and_sync(&self) -> Arc<Generation> {
        let generation = self.reload_ok().await;
        assert!(
            self.coordinator
                .await_index_sync(generation.sequence())
                .await,
            "index sync did not complete"
        );
        generation
    }

    pub fn ledger_entries(&self) -> Vec<(String, String)> {
        self.coordinator
            .synchronizer()
            .ledger()
            .entries()
            .expect("ledger readable")
            .into_iter()
            .map(|entry| (entry.type_name, entry.property))
            .collect()
    }
}
