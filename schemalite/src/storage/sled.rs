// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Sled settings store implementation

use super::traits::SettingsStore;
use super::types::{SettingsError, SettingsResult};
use std::path::Path;

/// Name of the sled tree holding settings
const SETTINGS_TREE: &str = "global_settings";

/// Sled backed settings store
pub struct SledSettingsStore {
    db: sled::Db,
    tree: sled::Tree,
}

fn backend_error(e: sled::Error) -> SettingsError {
    SettingsError::BackendSpecific(e.to_string())
}

impl SledSettingsStore {
    /// Open or create a store at `path`
    pub fn open<P: AsRef<Path>>(path: P) -> SettingsResult<Self> {
        let db = sled::open(path).map_err(backend_error)?;
        let tree = db.open_tree(SETTINGS_TREE).map_err(backend_error)?;
        Ok(Self { db, tree })
    }

    fn decode(key: &str, bytes: &[u8]) -> SettingsResult<String> {
        String::from_utf8(bytes.to_vec()).map_err(|_| SettingsError::InvalidValue {
            key: key.to_string(),
        })
    }
}

impl SettingsStore for SledSettingsStore {
    fn get_setting(&self, key: &str) -> SettingsResult<Option<String>> {
        match self.tree.get(key.as_bytes()).map_err(backend_error)? {
            Some(bytes) => Ok(Some(Self::decode(key, &bytes)?)),
            None => Ok(None),
        }
    }

    fn set_setting(&self, key: &str, value: Option<&str>) -> SettingsResult<()> {
        match value {
            Some(value) => {
                self.tree
                    .insert(key.as_bytes(), value.as_bytes())
                    .map_err(backend_error)?;
            }
            None => {
                self.tree.remove(key.as_bytes()).map_err(backend_error)?;
            }
        }
        Ok(())
    }

    fn scan_prefix(&self, prefix: &str) -> SettingsResult<Vec<(String, String)>> {
        let mut entries = Vec::new();
        for item in self.tree.scan_prefix(prefix.as_bytes()) {
            let (k, v) = item.map_err(backend_error)?;
            let key = Self::decode(prefix, &k)?;
            let value = Self::decode(&key, &v)?;
            entries.push((key, value));
        }
        Ok(entries)
    }

    fn flush(&self) -> SettingsResult<()> {
        self.db.flush().map_err(backend_error)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_settings_survive_reopen() {
        let temp_dir = TempDir::new().unwrap();

        {
            let store = SledSettingsStore::open(temp_dir.path()).unwrap();
            store.set_setting("index.File.name", Some("true")).unwrap();
            store.flush().unwrap();
        }

        let store = SledSettingsStore::open(temp_dir.path()).unwrap();
        assert_eq!(
            store.get_setting("index.File.name").unwrap(),
            Some("true".to_string())
        );
        assert_eq!(store.scan_prefix("index.").unwrap().len(), 1);
    }
}
