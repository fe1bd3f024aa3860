// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Index DDL collaborator

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use std::collections::BTreeSet;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum IndexDdlError {
    #[error("Index statement '{statement}' rejected: {reason}")]
    Rejected { statement: String, reason: String },

    #[error("Index backend unavailable: {0}")]
    Unavailable(String),
}

/// Issues index DDL against the database
///
/// Each call runs in its own transaction. Creating an index that already
/// exists, or dropping one that does not, is not an error.
#[async_trait]
pub trait IndexDdl: Send + Sync {
    async fn create_index(&self, type_name: &str, property: &str) -> Result<(), IndexDdlError>;

    async fn drop_index(&self, type_name: &str, property: &str) -> Result<(), IndexDdlError>;
}

/// One DDL call as seen by the catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DdlCall {
    Create { type_name: String, property: String },
    Drop { type_name: String, property: String },
}

impl DdlCall {
    pub fn target(&self) -> (&str, &str) {
        match self {
            DdlCall::Create {
                type_name,
                property,
            }
            | DdlCall::Drop {
                type_name,
                property,
            } => (type_name, property),
        }
    }
}

impl fmt::Display for DdlCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DdlCall::Create {
                type_name,
                property,
            } => write!(f, "CREATE INDEX ON :{}({})", type_name, property),
            DdlCall::Drop {
                type_name,
                property,
            } => write!(f, "DROP INDEX ON :{}({})", type_name, property),
        }
    }
}

/// In-memory index catalog
///
/// Keeps the set of live indexes and a log of every call. Failures can be
/// injected per `(type, property)`, and a delay makes each call yield long
/// enough for concurrency tests to observe a running sweep.
#[derive(Debug, Default)]
pub struct MemoryIndexCatalog {
    indexes: RwLock<BTreeSet<(String, String)>>,
    calls: Mutex<Vec<DdlCall>>,
    failing: RwLock<BTreeSet<(String, String)>>,
    delay: Option<Duration>,
}

impl MemoryIndexCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    /// Make every call on `(type_name, property)` fail
    pub fn fail_on(&self, type_name: &str, property: &str) {
        self.failing
            .write()
            .insert((type_name.to_string(), property.to_string()));
    }

    pub fn clear_failures(&self) {
        self.failing.write().clear();
    }

    pub fn has_index(&self, type_name: &str, property: &str) -> bool {
        self.indexes
            .read()
            .contains(&(type_name.to_string(), property.to_string()))
    }

    pub fn indexes(&self) -> Vec<(String, String)> {
        self.indexes.read().iter().cloned().collect()
    }

    pub fn calls(&self) -> Vec<DdlCall> {
        self.calls.lock().clone()
    }

    pub fn create_count(&self) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|call| matches!(call, DdlCall::Create { .. }))
            .count()
    }

    pub fn drop_count(&self) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|call| matches!(call, DdlCall::Drop { .. }))
            .count()
    }

    async fn apply(&self, call: DdlCall) -> Result<(), IndexDdlError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let (type_name, property) = call.target();
        let key = (type_name.to_string(), property.to_string());
        self.calls.lock().push(call.clone());

        if self.failing.read().contains(&key) {
            return Err(IndexDdlError::Rejected {
                statement: call.to_string(),
                reason: "injected failure".to_string(),
            });
        }

        let mut indexes = self.indexes.write();
        match call {
            DdlCall::Create { .. } => {
                indexes.insert(key);
            }
            DdlCall::Drop { .. } => {
                indexes.remove(&key);
            }
        }
        Ok(())
    }
}

#[async_trait]
impl IndexDdl for MemoryIndexCatalog {
    async fn create_index(&self, type_name: &str, property: &str) -> Result<(), IndexDdlError> {
        self.apply(DdlCall::Create {
            type_name: type_name.to_string(),
            property: property.to_string(),
        })
        .await
    }

    async fn drop_index(&self, type_name: &str, property: &str) -> Result<(), IndexDdlError> {
        self.apply(DdlCall::Drop {
            type_name: type_name.to_string(),
            property: property.to_string(),
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_statement_text() {
        let call = DdlCall::Create {
            type_name: "File".to_string(),
            property: "name".to_string(),
        };
        assert_eq!(call.to_string(), "CREATE INDEX ON :File(name)");
    }

    #[tokio::test]
    async fn test_create_and_drop_are_idempotent() {
        let catalog = MemoryIndexCatalog::new();
        catalog.create_index("File", "name").await.unwrap();
        catalog.create_index("File", "name").await.unwrap();
        assert_eq!(catalog.indexes().len(), 1);

        catalog.drop_index("File", "name").await.unwrap();
        catalog.drop_index("File", "name").await.unwrap();
        assert!(!catalog.has_index("File", "name"));
        assert_eq!(catalog.create_count(), 2);
        assert_eq!(catalog.drop_count(), 2);
    }

    #[tokio::test]
    async fn test_injected_failure() {
        let catalog = MemoryIndexCatalog::new();
        catalog.fail_on("File", "name");

        let err = catalog.create_index("File", "name").await.unwrap_err();
        assert!(matches!(err, IndexDdlError::Rejected { .. }));
        assert!(!catalog.has_index("File", "name"));
        assert_eq!(catalog.calls().len(), 1);

        catalog.clear_failures();
        catalog.create_index("File", "name").await.unwrap();
        assert!(catalog.has_index("File", "name"));
    }
}
