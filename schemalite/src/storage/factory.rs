// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Settings store factory

use super::memory::MemorySettingsStore;
use super::traits::SettingsStore;
use super::types::{SettingsError, SettingsResult, StorageType};
use std::path::Path;
use std::sync::Arc;

/// Create a settings store for the configured backend
///
/// # Arguments
/// * `storage_type` - Which backend to use
/// * `path` - Directory for persistent backends; ignored by `Memory`
///
/// # Returns
/// A shared trait object implementing [`SettingsStore`]
pub fn create_settings_store<P: AsRef<Path>>(
    storage_type: StorageType,
    path: Option<P>,
) -> SettingsResult<Arc<dyn SettingsStore>> {
    match storage_type {
        StorageType::Memory => Ok(Arc::new(MemorySettingsStore::new())),
        StorageType::Sled => open_sled(path),
    }
}

#[cfg(feature = "sled-backend")]
fn open_sled<P: AsRef<Path>>(path: Option<P>) -> SettingsResult<Arc<dyn SettingsStore>> {
    let path = path.ok_or_else(|| SettingsError::Unavailable {
        backend: StorageType::Sled,
        reason: "a ledger path is required".to_string(),
    })?;
    let store = super::sled::SledSettingsStore::open(path)?;
    log::info!("Opened sled settings store");
    Ok(Arc::new(store))
}

#[cfg(not(feature = "sled-backend"))]
fn open_sled<P: AsRef<Path>>(_path: Option<P>) -> SettingsResult<Arc<dyn SettingsStore>> {
    Err(SettingsError::Unavailable {
        backend: StorageType::Sled,
        reason: "compiled without the sled-backend feature".to_string(),
    })
}
