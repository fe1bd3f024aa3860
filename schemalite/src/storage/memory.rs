// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! In-memory settings store for testing

use super::traits::SettingsStore;
use super::types::SettingsResult;
use parking_lot::RwLock;
use std::collections::BTreeMap;

/// In-memory settings store
#[derive(Debug, Default)]
pub struct MemorySettingsStore {
    data: RwLock<BTreeMap<String, String>>,
}

impl MemorySettingsStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }
}

impl SettingsStore for MemorySettingsStore {
    fn get_setting(&self, key: &str) -> SettingsResult<Option<String>> {
        Ok(self.data.read().get(key).cloned())
    }

    fn set_setting(&self, key: &str, value: Option<&str>) -> SettingsResult<()> {
        let mut data = self.data.write();
        match value {
            Some(value) => {
                data.insert(key.to_string(), value.to_string());
            }
            None => {
                data.remove(key);
            }
        }
        Ok(())
    }

    fn scan_prefix(&self, prefix: &str) -> SettingsResult<Vec<(String, String)>> {
        let data = self.data.read();
        Ok(data
            .range(prefix.to_string()..)
            .take_while(|(k, _)| k.starts_with(prefix))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }
}
