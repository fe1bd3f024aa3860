// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Settings store trait

use super::types::SettingsResult;

/// String keyed settings store
///
/// This is the "global settings" surface of the storage collaborator. Writing
/// `None` removes the key.
pub trait SettingsStore: Send + Sync {
    /// Read a setting
    fn get_setting(&self, key: &str) -> SettingsResult<Option<String>>;

    /// Write or clear a setting
    fn set_setting(&self, key: &str, value: Option<&str>) -> SettingsResult<()>;

    /// All `(key, value)` pairs whose key starts with `prefix`, in key order
    fn scan_prefix(&self, prefix: &str) -> SettingsResult<Vec<(String, String)>>;

    /// Flush pending writes to durable storage
    fn flush(&self) -> SettingsResult<()> {
        Ok(())
    }
}
