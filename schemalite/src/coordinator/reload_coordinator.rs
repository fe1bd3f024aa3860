// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Reload Coordinator - the single entry point for schema reloads
//!
//! One reload loads every stored definition, emits and compiles them as one
//! batch, commits the result as the next generation, writes hierarchy
//! annotations back and schedules index synchronization. At most one reload
//! runs at a time; callers that arrive while one is in flight either join it
//! (`reload`) or are told so (`try_reload`).

use super::error::{ReloadError, ReloadResult};
use super::outcome::{ReloadOutcome, RunResult};
use crate::compiler::{is_builtin_base, CompileErrors, TypeCompiler};
use crate::config::EngineConfig;
use crate::definition::{DefinitionKind, SchemaDefinition, SchemaDefinitionStore};
use crate::emit::{SourceUnit, TypeSourceEmitter};
use crate::guard::RunGuard;
use crate::hierarchy::HierarchyResolver;
use crate::index::{IndexDdl, IndexLedger, IndexSynchronizer};
use crate::registry::{Generation, TypeRegistry};
use crate::storage::{create_settings_store, SettingsStore};
use parking_lot::{Mutex, RwLock};
use rayon::prelude::*;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::time::Instant;
use tokio::runtime::Handle;
use tokio::sync::watch;

type InFlight = watch::Receiver<Option<RunResult>>;

/// Reload Coordinator - orchestrates emit, compile, commit and post-commit work
pub struct ReloadCoordinator {
    config: EngineConfig,
    store: Arc<dyn SchemaDefinitionStore>,
    emitter: TypeSourceEmitter,
    compiler: TypeCompiler,
    registry: Arc<TypeRegistry>,
    hierarchy: HierarchyResolver,
    synchronizer: IndexSynchronizer,
    /// Built-in type name -> base it must extend
    builtin_overrides: RwLock<BTreeMap<String, String>>,
    compiling: Arc<RunGuard>,
    in_flight: Mutex<Option<InFlight>>,
    runtime: Handle,
}

impl ReloadCoordinator {
    /// Create a coordinator from configuration (Simplified API)
    ///
    /// Opens the index ledger backend named by `config` and binds to the
    /// ambient tokio runtime.
    ///
    /// # Arguments
    /// * `config` - Engine configuration
    /// * `store` - Source of schema definitions
    /// * `ddl` - Collaborator issuing index DDL
    ///
    /// # Returns
    /// * `Ok(Arc<ReloadCoordinator>)` - Coordinator with an empty current generation
    /// * `Err(ReloadError)` - Ledger backend or runtime unavailable
    pub fn from_config(
        config: EngineConfig,
        store: Arc<dyn SchemaDefinitionStore>,
        ddl: Arc<dyn IndexDdl>,
    ) -> ReloadResult<Arc<Self>> {
        let settings = create_settings_store(config.storage_type, config.ledger_path.as_ref())?;
        let runtime = Handle::try_current().map_err(|e| ReloadError::Runtime(e.to_string()))?;
        Ok(Arc::new(Self::new(config, store, ddl, settings, runtime)))
    }

    /// Create a coordinator from explicit collaborators (Advanced API)
    pub fn new(
        config: EngineConfig,
        store: Arc<dyn SchemaDefinitionStore>,
        ddl: Arc<dyn IndexDdl>,
        settings: Arc<dyn SettingsStore>,
        runtime: Handle,
    ) -> Self {
        let synchronizer = IndexSynchronizer::new(ddl, IndexLedger::new(settings), runtime.clone());
        Self {
            emitter: TypeSourceEmitter::new(),
            compiler: TypeCompiler::new(config.dynamic_namespace.clone()),
            registry: Arc::new(TypeRegistry::new()),
            hierarchy: HierarchyResolver::new(config.hierarchy_depth_cap),
            synchronizer,
            builtin_overrides: RwLock::new(BTreeMap::new()),
            compiling: RunGuard::new("compiling"),
            in_flight: Mutex::new(None),
            runtime,
            config,
            store,
        }
    }

    /// Require a built-in node type named `type_name` extending `base`
    ///
    /// Before every reload the store is asked to make sure the definition
    /// exists. A base that is not one of the fixed built-ins becomes a
    /// resolvable built-in ancestor for the compiler.
    pub fn register_builtin_override(&self, type_name: impl Into<String>, base: impl Into<String>) {
        let base = base.into();
        if !is_builtin_base(&base) {
            self.compiler
                .register_builtin_base(base.clone(), DefinitionKind::Node);
        }
        self.builtin_overrides.write().insert(type_name.into(), base);
    }

    /// Reload the schema, joining a reload that is already in flight
    pub async fn reload(self: &Arc<Self>) -> ReloadOutcome {
        loop {
            match self.begin() {
                Ok(run) => {
                    return match wait_for_result(run).await {
                        Some(Ok(generation)) => ReloadOutcome::Committed(generation),
                        Some(Err(error)) => ReloadOutcome::Failed(error),
                        None => ReloadOutcome::Failed(Arc::new(ReloadError::Aborted)),
                    };
                }
                Err(Some(run)) => {
                    log::debug!("Reload already in progress, joining it");
                    if let Some(result) = wait_for_result(run).await {
                        return ReloadOutcome::Joined(result);
                    }
                    // The run vanished without publishing, start over
                }
                Err(None) => tokio::task::yield_now().await,
            }
        }
    }

    /// Reload the schema unless a reload is already in flight
    pub async fn try_reload(self: &Arc<Self>) -> ReloadOutcome {
        match self.begin() {
            Ok(run) => match wait_for_result(run).await {
                Some(Ok(generation)) => ReloadOutcome::Committed(generation),
                Some(Err(error)) => ReloadOutcome::Failed(error),
                None => ReloadOutcome::Failed(Arc::new(ReloadError::Aborted)),
            },
            Err(_) => {
                log::debug!("Reload already in progress, not waiting");
                ReloadOutcome::AlreadyInProgress
            }
        }
    }

    /// Wait until indexes reflect generation `sequence` or a later one
    ///
    /// Returns `true` at once in testing mode, where no synchronization runs,
    /// and `false` if the synchronizer was shut down first.
    pub async fn await_index_sync(&self, sequence: u64) -> bool {
        if self.config.testing_mode {
            return true;
        }
        self.synchronizer.wait_for(sequence).await
    }

    /// Cancel background index work; reloads still commit afterwards
    pub fn shutdown(&self) {
        self.synchronizer.shutdown();
    }

    pub fn is_reloading(&self) -> bool {
        self.compiling.is_running()
    }

    pub fn registry(&self) -> &Arc<TypeRegistry> {
        &self.registry
    }

    pub fn current_generation(&self) -> Arc<Generation> {
        self.registry.current_generation()
    }

    pub fn compiler(&self) -> &TypeCompiler {
        &self.compiler
    }

    pub fn synchronizer(&self) -> &IndexSynchronizer {
        &self.synchronizer
    }

    pub fn hierarchy_resolver(&self) -> &HierarchyResolver {
        &self.hierarchy
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Enter the compiling section and spawn the run, or hand back the
    /// in-flight run to join
    fn begin(self: &Arc<Self>) -> Result<InFlight, Option<InFlight>> {
        let mut in_flight = self.in_flight.lock();
        let Some(permit) = self.compiling.try_acquire() else {
            return Err(in_flight.clone());
        };

        let (sender, receiver) = watch::channel(None);
        *in_flight = Some(receiver.clone());

        // The run owns the permit; dropping the caller's future does not stop it
        let coordinator = Arc::clone(self);
        self.runtime.spawn(async move {
            let result = coordinator.run().await.map_err(Arc::new);
            sender.send_replace(Some(result));
            drop(permit);
        });
        Ok(receiver)
    }

    async fn run(&self) -> ReloadResult<Arc<Generation>> {
        let started = Instant::now();
        let previous = self.registry.current_generation();
        let sequence = previous.sequence() + 1;
        log::info!("Starting schema reload for generation {}", sequence);

        let committed = match self.compile_and_commit(sequence).await {
            Ok(committed) => committed,
            Err(e) => {
                log::error!(
                    "Schema reload for generation {} failed, generation {} stays current: {}",
                    sequence,
                    previous.sequence(),
                    e
                );
                return Err(e);
            }
        };
        log::info!(
            "Committed generation {} with {} types in {:?}",
            committed.sequence(),
            committed.len(),
            started.elapsed()
        );

        if self.config.testing_mode {
            log::debug!("Testing mode, skipping hierarchy and index synchronization");
            return Ok(committed);
        }

        self.write_hierarchy(&committed).await;

        let removed: BTreeSet<String> = previous.removed_in(&committed);
        if !removed.is_empty() {
            log::info!("Types removed in generation {}: {:?}", committed.sequence(), removed);
        }
        self.synchronizer.synchronize(committed.clone(), removed);

        Ok(committed)
    }

    async fn compile_and_commit(&self, sequence: u64) -> ReloadResult<Arc<Generation>> {
        self.ensure_builtin_types().await?;
        let definitions = self.store.load_definitions().await?;
        log::debug!("Loaded {} schema definitions", definitions.len());

        let units = self.emit_all(&definitions)?;
        let types = self.compiler.compile(units)?;

        let dynamic_views: BTreeSet<String> = definitions
            .iter()
            .flat_map(|definition| definition.view_names())
            .map(str::to_string)
            .collect();

        let generation = Generation::new(sequence, types, dynamic_views, definitions);
        self.registry.commit(generation)?;
        // Commits only happen under the compiling guard, so this is ours
        Ok(self.registry.current_generation())
    }

    async fn ensure_builtin_types(&self) -> ReloadResult<()> {
        let overrides: Vec<(String, String)> = self
            .builtin_overrides
            .read()
            .iter()
            .map(|(name, base)| (name.clone(), base.clone()))
            .collect();

        for (name, base) in overrides {
            self.store.ensure_builtin_type(&name, &base).await?;
        }
        Ok(())
    }

    /// Emit every definition in parallel, aggregating all definition errors
    fn emit_all(&self, definitions: &[SchemaDefinition]) -> Result<Vec<SourceUnit>, CompileErrors> {
        let emissions: Vec<_> = definitions
            .par_iter()
            .map(|definition| self.emitter.emit(definition))
            .collect();

        let mut units = Vec::with_capacity(definitions.len());
        let mut errors = CompileErrors::default();
        for emission in emissions {
            match emission {
                Ok(emission) => units.extend(emission.into_units()),
                Err(definition_errors) => {
                    for error in definition_errors {
                        errors.push(error);
                    }
                }
            }
        }

        if errors.is_empty() {
            Ok(units)
        } else {
            Err(errors)
        }
    }

    async fn write_hierarchy(&self, generation: &Generation) {
        let report = self.hierarchy.compute_report(generation.definitions());
        if let Err(e) = self.store.write_hierarchy(&report.annotations).await {
            log::warn!(
                "Unable to write hierarchy annotations for generation {}: {}",
                generation.sequence(),
                e
            );
        }
    }
}

/// Wait for a run to publish its result; `None` if it ended without one
async fn wait_for_result(mut run: InFlight) -> Option<RunResult> {
    loop {
        let current = run.borrow_and_update().clone();
        if current.is_some() {
            return current;
        }
        if run.changed().await.is_err() {
            return run.borrow().clone();
        }
    }
}

impl std::fmt::Debug for ReloadCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReloadCoordinator")
            .field("generation", &self.registry.current_generation().sequence())
            .field("reloading", &self.is_reloading())
            .field("testing_mode", &self.config.testing_mode)
            .finish_non_exhaustive()
    }
}
