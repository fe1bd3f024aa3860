// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! SchemaLite - dynamic schema compilation engine
//!
//! SchemaLite turns schema definitions stored as data (node types,
//! relationship types, properties, views) into live type descriptors without
//! restarting the process, while readers keep using the previous generation.
//!
//! # Features
//!
//! - **Batch compilation**: all definitions of a reload resolve against each
//!   other in one pass, and the batch commits all-or-nothing
//! - **Atomic generations**: readers see generation N or N+1, never a mix
//! - **Hierarchy annotations**: inheritance depth and relationship counts,
//!   safe against cycles and dangling parents
//! - **Index synchronization**: a background sweep converges database indexes
//!   with the schema through a persistent ledger
//!
//! # Usage
//!
//! ```no_run
//! use schemalite::{EngineConfig, MemoryDefinitionStore, MemoryIndexCatalog, ReloadCoordinator};
//! use std::sync::Arc;
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Arc::new(MemoryDefinitionStore::from_json_file("schema.json")?);
//! let catalog = Arc::new(MemoryIndexCatalog::new());
//! let coordinator = ReloadCoordinator::from_config(EngineConfig::in_memory(), store, catalog)?;
//!
//! let outcome = coordinator.reload().await;
//! if let Some(generation) = outcome.generation() {
//!     coordinator.await_index_sync(generation.sequence()).await;
//! }
//! # Ok(())
//! # }
//! ```

pub mod compiler;
pub mod config;
pub mod coordinator;
pub mod definition;
pub mod emit;
pub mod guard;
pub mod hierarchy;
pub mod index;
pub mod registry;
pub mod storage;

pub use compiler::{CompileError, CompileErrors, CompiledType, PropertyDescriptor, TypeCompiler};
pub use config::{ConfigError, EngineConfig};
pub use coordinator::{ReloadCoordinator, ReloadError, ReloadOutcome};
pub use definition::{
    DefinitionKind, MemoryDefinitionStore, PropertyDeclaration, SchemaDefinition,
    SchemaDefinitionStore,
};
pub use emit::TypeSourceEmitter;
pub use hierarchy::{HierarchyAnnotation, HierarchyResolver};
pub use index::{IndexDdl, IndexLedger, IndexSynchronizer, MemoryIndexCatalog};
pub use registry::{Generation, TypeRegistry};
pub use storage::{create_settings_store, SettingsStore, StorageType};

/// SchemaLite version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// SchemaLite crate name
pub const CRATE_NAME: &str = env!("CARGO_PKG_NAME");
