// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Persistent record of which indexes exist
//!
//! Every index the synchronizer created is recorded as the global setting
//! `index.{Type}.{property}` with the value `"true"`. An absent key, or any
//! other value, means "not created".

use crate::storage::{SettingsResult, SettingsStore};
use std::sync::Arc;

pub const LEDGER_PREFIX: &str = "index.";
const CREATED: &str = "true";

/// One recorded index
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct LedgerEntry {
    pub type_name: String,
    pub property: String,
}

/// Index ledger on top of the global settings store
#[derive(Clone)]
pub struct IndexLedger {
    store: Arc<dyn SettingsStore>,
}

impl IndexLedger {
    pub fn new(store: Arc<dyn SettingsStore>) -> Self {
        Self { store }
    }

    pub fn key(type_name: &str, property: &str) -> String {
        format!("{}{}.{}", LEDGER_PREFIX, type_name, property)
    }

    pub fn exists(&self, type_name: &str, property: &str) -> SettingsResult<bool> {
        Ok(self
            .store
            .get_setting(&Self::key(type_name, property))?
            .is_some_and(|value| value == CREATED))
    }

    pub fn mark_created(&self, type_name: &str, property: &str) -> SettingsResult<()> {
        self.store
            .set_setting(&Self::key(type_name, property), Some(CREATED))
    }

    pub fn clear(&self, type_name: &str, property: &str) -> SettingsResult<()> {
        self.store.set_setting(&Self::key(type_name, property), None)
    }

    /// All recorded indexes, ordered by type then property
    pub fn entries(&self) -> SettingsResult<Vec<LedgerEntry>> {
        self.scan(LEDGER_PREFIX)
    }

    /// Recorded indexes of a single type
    pub fn entries_for_type(&self, type_name: &str) -> SettingsResult<Vec<LedgerEntry>> {
        self.scan(&format!("{}{}.", LEDGER_PREFIX, type_name))
    }

    pub fn flush(&self) -> SettingsResult<()> {
        self.store.flush()
    }

    fn scan(&self, prefix: &str) -> SettingsResult<Vec<LedgerEntry>> {
        let entries = self
            .store
            .scan_prefix(prefix)?
            .into_iter()
            .filter(|(_, value)| value == CREATED)
            .filter_map(|(key, _)| {
                // Type names never contain a dot, property names may
                let rest = key.strip_prefix(LEDGER_PREFIX)?;
                let (type_name, property) = rest.split_once('.')?;
                Some(LedgerEntry {
                    type_name: type_name.to_string(),
                    property: property.to_string(),
                })
            })
            .collect();
        Ok(entries)
    }
}

impl std::fmt::Debug for IndexLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexLedger").finish_non_exhaustive()
    }
}
