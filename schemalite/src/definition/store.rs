// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Read access to persisted schema definitions
//!
//! The storage collaborator owns the definition records. The engine only reads
//! them during a reload, asks for built-in overrides to exist, and writes back
//! advisory hierarchy annotations.

use super::types::{DefinitionKind, SchemaDefinition};
use crate::hierarchy::HierarchyAnnotation;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;
use thiserror::Error;

/// Errors raised by a definition store
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(String),
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Read-only view over persisted schema definitions
#[async_trait]
pub trait SchemaDefinitionStore: Send + Sync {
    /// All node and relationship definitions, nodes first
    async fn load_definitions(&self) -> StoreResult<Vec<SchemaDefinition>>;

    /// Make sure a node definition named `name` exists, is flagged built-in and
    /// extends `base`
    async fn ensure_builtin_type(&self, name: &str, base: &str) -> StoreResult<()>;

    /// Attach hierarchy annotations to the stored definitions in one transaction
    async fn write_hierarchy(
        &self,
        annotations: &BTreeMap<String, HierarchyAnnotation>,
    ) -> StoreResult<()>;
}

/// In-memory definition store
///
/// Used by tests and by the command line front end, which loads definitions
/// from a JSON file. `set_unavailable` simulates a storage outage.
#[derive(Debug, Default)]
pub struct MemoryDefinitionStore {
    definitions: RwLock<BTreeMap<(DefinitionKind, String), SchemaDefinition>>,
    annotations: RwLock<BTreeMap<String, HierarchyAnnotation>>,
    unavailable: AtomicBool,
    load_delay: RwLock<Option<Duration>>,
    loads: AtomicUsize,
}

impl MemoryDefinitionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_definitions(definitions: impl IntoIterator<Item = SchemaDefinition>) -> Self {
        let store = Self::new();
        for definition in definitions {
            store.upsert(definition);
        }
        store
    }

    /// Parse a JSON array of definitions
    pub fn from_json_str(json: &str) -> StoreResult<Self> {
        let definitions: Vec<SchemaDefinition> = serde_json::from_str(json)?;
        Ok(Self::with_definitions(definitions))
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Insert or replace a definition, keyed by kind and name
    pub fn upsert(&self, definition: SchemaDefinition) {
        self.definitions
            .write()
            .insert((definition.kind, definition.name.clone()), definition);
    }

    /// Remove a definition, returning it if it existed
    pub fn remove(&self, kind: DefinitionKind, name: &str) -> Option<SchemaDefinition> {
        self.definitions.write().remove(&(kind, name.to_string()))
    }

    pub fn definition(&self, kind: DefinitionKind, name: &str) -> Option<SchemaDefinition> {
        self.definitions.read().get(&(kind, name.to_string())).cloned()
    }

    /// Hierarchy annotation last written for a node definition
    pub fn annotation(&self, name: &str) -> Option<HierarchyAnnotation> {
        self.annotations.read().get(name).cloned()
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Make every `load_definitions` call take at least `delay`
    pub fn set_load_delay(&self, delay: Option<Duration>) {
        *self.load_delay.write() = delay;
    }

    /// Number of successful `load_definitions` calls
    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    fn check_available(&self) -> StoreResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(
                "in-memory store marked unavailable".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl SchemaDefinitionStore for MemoryDefinitionStore {
    async fn load_definitions(&self) -> StoreResult<Vec<SchemaDefinition>> {
        let delay = *self.load_delay.read();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.check_available()?;
        let definitions = self.definitions.read().values().cloned().collect();
        self.loads.fetch_add(1, Ordering::SeqCst);
        Ok(definitions)
    }

    async fn ensure_builtin_type(&self, name: &str, base: &str) -> StoreResult<()> {
        self.check_available()?;
        let mut definitions = self.definitions.write();
        let definition = definitions
            .entry((DefinitionKind::Node, name.to_string()))
            .or_insert_with(|| SchemaDefinition::node(name));
        definition.extends = Some(base.to_string());
        definition.builtin = true;
        Ok(())
    }

    async fn write_hierarchy(
        &self,
        annotations: &BTreeMap<String, HierarchyAnnotation>,
    ) -> StoreResult<()> {
        self.check_available()?;
        let definitions = self.definitions.read();
        let mut stored = self.annotations.write();
        for (name, annotation) in annotations {
            if definitions.contains_key(&(DefinitionKind::Node, name.clone())) {
                stored.insert(name.clone(), annotation.clone());
            }
        }
        Ok(())
    }
}
