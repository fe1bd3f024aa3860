// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Index synchronization
//!
//! - `ddl`: the collaborator that creates and drops indexes
//! - `ledger`: which indexes have been created, persisted in global settings
//! - `synchronizer`: the background sweep that converges the two

pub mod ddl;
pub mod ledger;
pub mod synchronizer;

pub use ddl::{DdlCall, IndexDdl, IndexDdlError, MemoryIndexCatalog};
pub use ledger::{IndexLedger, LedgerEntry, LEDGER_PREFIX};
pub use synchronizer::{should_index, IndexSynchronizer, SweepStats, SyncRequest};
