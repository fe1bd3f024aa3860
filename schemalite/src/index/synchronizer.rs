// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Background index synchronization
//!
//! After every committed generation the synchronizer walks each compiled type
//! and property, compares what the schema wants against the index ledger and
//! issues create or drop DDL to converge. At most one sweep runs at a time.
//! Requests arriving during a sweep are coalesced: the newest generation wins
//! and the removed type names of all skipped requests are merged. Every sweep
//! also drops ledgered indexes whose type is missing from its generation, so a
//! failed drop is retried and entries orphaned across a restart are cleaned up.

use super::ddl::IndexDdl;
use super::ledger::IndexLedger;
use crate::compiler::{CompiledType, PropertyDescriptor, NODE_INTERFACE};
use crate::guard::{RunGuard, RunPermit};
use crate::registry::Generation;
use parking_lot::Mutex;
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

/// One unit of synchronization work
#[derive(Debug, Clone)]
pub struct SyncRequest {
    pub generation: Arc<Generation>,
    /// Types present in the previous generation but gone from this one
    pub removed: BTreeSet<String>,
}

impl SyncRequest {
    pub fn new(generation: Arc<Generation>, removed: BTreeSet<String>) -> Self {
        Self {
            generation,
            removed,
        }
    }

    /// Fold a request that was queued behind this one
    fn coalesce(self, other: SyncRequest) -> SyncRequest {
        let (older, newer) = if other.generation.sequence() >= self.generation.sequence() {
            (self, other)
        } else {
            (other, self)
        };

        let generation = newer.generation;
        let removed = older
            .removed
            .into_iter()
            .chain(newer.removed)
            .filter(|name| !generation.contains_type(name))
            .collect();

        SyncRequest {
            generation,
            removed,
        }
    }
}

/// Counters for a single sweep
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepStats {
    pub sequence: u64,
    pub created: usize,
    pub dropped: usize,
    pub unchanged: usize,
    pub failed: usize,
    pub cancelled: bool,
}

/// Whether `property` of `owner` should carry a database index
pub fn should_index(owner: &CompiledType, property: &PropertyDescriptor) -> bool {
    if owner.is_non_indexed() || !property.wants_index() {
        return false;
    }
    property.name != "id" || owner.name() == NODE_INTERFACE
}

/// Converges database indexes with the compiled schema
#[derive(Clone)]
pub struct IndexSynchronizer {
    inner: Arc<SyncInner>,
}

struct SyncInner {
    ddl: Arc<dyn IndexDdl>,
    ledger: IndexLedger,
    guard: Arc<RunGuard>,
    pending: Mutex<Option<SyncRequest>>,
    completed: watch::Sender<u64>,
    last_stats: Mutex<Option<SweepStats>>,
    sweeps: AtomicU64,
    cancel: CancellationToken,
    runtime: Handle,
}

impl IndexSynchronizer {
    pub fn new(ddl: Arc<dyn IndexDdl>, ledger: IndexLedger, runtime: Handle) -> Self {
        let (completed, _) = watch::channel(0);
        Self {
            inner: Arc::new(SyncInner {
                ddl,
                ledger,
                guard: RunGuard::new("updating"),
                pending: Mutex::new(None),
                completed,
                last_stats: Mutex::new(None),
                sweeps: AtomicU64::new(0),
                cancel: CancellationToken::new(),
                runtime,
            }),
        }
    }

    /// Schedule a sweep for `generation` and return immediately
    pub fn synchronize(&self, generation: Arc<Generation>, removed: BTreeSet<String>) {
        if self.inner.cancel.is_cancelled() {
            log::debug!(
                "Index synchronizer shut down, ignoring generation {}",
                generation.sequence()
            );
            return;
        }

        let request = SyncRequest::new(generation, removed);
        {
            let mut pending = self.inner.pending.lock();
            *pending = Some(match pending.take() {
                Some(queued) => {
                    log::debug!(
                        "Coalescing index sync for generation {} into generation {}",
                        queued.generation.sequence(),
                        request.generation.sequence()
                    );
                    queued.coalesce(request)
                }
                None => request,
            });
        }

        match self.inner.guard.try_acquire() {
            Some(permit) => {
                let inner = self.inner.clone();
                self.inner.runtime.spawn(async move {
                    inner.drain(permit).await;
                });
            }
            None => log::debug!("Index sweep already running, request queued"),
        }
    }

    /// Run one sweep inline, bypassing the queue
    ///
    /// Returns `None` when a sweep is already running.
    pub async fn run_now(&self, request: SyncRequest) -> Option<SweepStats> {
        let _permit = self.inner.guard.try_acquire()?;
        Some(self.inner.sweep_and_publish(request).await)
    }

    /// Wait until a sweep for `sequence` or a later generation has finished
    ///
    /// Returns `false` if the synchronizer shut down first.
    pub async fn wait_for(&self, sequence: u64) -> bool {
        let mut completed = self.inner.completed.subscribe();
        loop {
            if *completed.borrow_and_update() >= sequence {
                return true;
            }
            tokio::select! {
                changed = completed.changed() => {
                    if changed.is_err() {
                        return false;
                    }
                }
                _ = self.inner.cancel.cancelled() => return false,
            }
        }
    }

    /// Highest generation sequence a sweep has completed for
    pub fn completed_sequence(&self) -> u64 {
        *self.inner.completed.borrow()
    }

    pub fn last_stats(&self) -> Option<SweepStats> {
        *self.inner.last_stats.lock()
    }

    pub fn sweep_count(&self) -> u64 {
        self.inner.sweeps.load(Ordering::Relaxed)
    }

    pub fn is_running(&self) -> bool {
        self.inner.guard.is_running()
    }

    pub fn has_pending(&self) -> bool {
        self.inner.pending.lock().is_some()
    }

    pub fn ledger(&self) -> &IndexLedger {
        &self.inner.ledger
    }

    /// Stop accepting work and cancel a running sweep at the next unit
    pub fn shutdown(&self) {
        log::info!("Shutting down index synchronizer");
        self.inner.cancel.cancel();
        self.inner.pending.lock().take();
    }

    pub fn is_shut_down(&self) -> bool {
        self.inner.cancel.is_cancelled()
    }
}

impl SyncInner {
    async fn drain(self: Arc<Self>, permit: RunPermit) {
        let mut permit = Some(permit);
        loop {
            let next = self.pending.lock().take();
            match next {
                Some(request) => {
                    self.sweep_and_publish(request).await;
                }
                None => {
                    drop(permit.take());
                    // A request may have been queued after the take but
                    // before the release, when its own acquire failed
                    if self.pending.lock().is_none() || self.cancel.is_cancelled() {
                        return;
                    }
                    match self.guard.try_acquire() {
                        Some(again) => permit = Some(again),
                        None => return,
                    }
                }
            }
        }
    }

    async fn sweep_and_publish(&self, request: SyncRequest) -> SweepStats {
        let sequence = request.generation.sequence();
        log::info!("Starting index sweep for generation {}", sequence);

        let stats = self.sweep(&request).await;
        self.sweeps.fetch_add(1, Ordering::Relaxed);
        *self.last_stats.lock() = Some(stats);

        if stats.cancelled {
            log::info!("Index sweep for generation {} cancelled", sequence);
        } else {
            log::info!(
                "Index sweep for generation {} done: {} created, {} dropped, {} unchanged, {} failed",
                sequence,
                stats.created,
                stats.dropped,
                stats.unchanged,
                stats.failed
            );
            self.completed.send_if_modified(|current| {
                if sequence > *current {
                    *current = sequence;
                    true
                } else {
                    false
                }
            });
        }
        stats
    }

    async fn sweep(&self, request: &SyncRequest) -> SweepStats {
        let mut stats = SweepStats {
            sequence: request.generation.sequence(),
            ..SweepStats::default()
        };

        for compiled in request.generation.types().values() {
            // Properties no longer declared but still ledgered must go too
            let mut stale: BTreeSet<String> = match self.ledger.entries_for_type(compiled.name()) {
                Ok(entries) => entries.into_iter().map(|e| e.property).collect(),
                Err(e) => {
                    log::warn!("Unable to read index ledger for {}: {}", compiled.name(), e);
                    BTreeSet::new()
                }
            };

            for property in compiled.properties() {
                if self.cancel.is_cancelled() {
                    stats.cancelled = true;
                    return stats;
                }
                stale.remove(&property.name);
                let wanted = should_index(compiled, property);
                self.converge(compiled.name(), &property.name, wanted, &mut stats)
                    .await;
            }

            for property in stale {
                if self.cancel.is_cancelled() {
                    stats.cancelled = true;
                    return stats;
                }
                self.converge(compiled.name(), &property, false, &mut stats)
                    .await;
            }
        }

        // Ledgered indexes of types outside the generation, whether removed by
        // this request, left behind by an earlier failed drop, or deleted while
        // the process was down
        let orphans = match self.ledger.entries() {
            Ok(entries) => entries
                .into_iter()
                .filter(|entry| !request.generation.contains_type(&entry.type_name))
                .collect::<Vec<_>>(),
            Err(e) => {
                log::warn!("Unable to scan index ledger: {}", e);
                stats.failed += 1;
                Vec::new()
            }
        };
        for entry in orphans {
            if self.cancel.is_cancelled() {
                stats.cancelled = true;
                return stats;
            }
            if request.removed.contains(&entry.type_name) {
                log::debug!("Dropping index on removed type {}.{}", entry.type_name, entry.property);
            } else {
                log::debug!("Dropping orphaned index {}.{}", entry.type_name, entry.property);
            }
            self.converge(&entry.type_name, &entry.property, false, &mut stats)
                .await;
        }

        if let Err(e) = self.ledger.flush() {
            log::warn!("Unable to flush index ledger: {}", e);
        }
        stats
    }

    /// Bring one `(type, property)` unit in line with `wanted`
    async fn converge(&self, type_name: &str, property: &str, wanted: bool, stats: &mut SweepStats) {
        let exists = match self.ledger.exists(type_name, property) {
            Ok(exists) => exists,
            Err(e) => {
                log::warn!("Unable to read index ledger for {}.{}: {}", type_name, property, e);
                stats.failed += 1;
                return;
            }
        };

        match (wanted, exists) {
            (true, false) => match self.ddl.create_index(type_name, property).await {
                Ok(()) => {
                    log::debug!("Created index on {}.{}", type_name, property);
                    stats.created += 1;
                    if let Err(e) = self.ledger.mark_created(type_name, property) {
                        log::warn!("Unable to record index {}.{}: {}", type_name, property, e);
                    }
                }
                Err(e) => {
                    log::warn!("Unable to create index on {}.{}: {}", type_name, property, e);
                    stats.failed += 1;
                }
            },
            (false, true) => match self.ddl.drop_index(type_name, property).await {
                Ok(()) => {
                    log::debug!("Dropped index on {}.{}", type_name, property);
                    stats.dropped += 1;
                    if let Err(e) = self.ledger.clear(type_name, property) {
                        log::warn!("Unable to clear index record {}.{}: {}", type_name, property, e);
                    }
                }
                Err(e) => {
                    log::warn!("Unable to drop index on {}.{}: {}", type_name, property, e);
                    stats.failed += 1;
                }
            },
            _ => stats.unchanged += 1,
        }
    }
}

impl std::fmt::Debug for IndexSynchronizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexSynchronizer")
            .field("running", &self.is_running())
            .field("completed_sequence", &self.completed_sequence())
            .finish_non_exhaustive()
    }
}
