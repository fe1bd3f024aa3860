// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Settings store types and error handling

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Settings backend configuration
///
/// Specifies which storage technology keeps the index ledger.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageType {
    /// Sled - Pure Rust embedded database
    /// Best for: Long running processes that must remember created indexes
    Sled,

    /// Memory - In-memory storage
    /// Best for: Unit testing, throwaway runs
    Memory,
}

impl Default for StorageType {
    fn default() -> Self {
        StorageType::Sled
    }
}

impl std::str::FromStr for StorageType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sled" => Ok(StorageType::Sled),
            "memory" => Ok(StorageType::Memory),
            _ => Err(format!(
                "Unknown storage type: {}. Valid options: sled, memory",
                s
            )),
        }
    }
}

impl std::fmt::Display for StorageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            StorageType::Sled => "sled",
            StorageType::Memory => "memory",
        };
        write!(f, "{}", name)
    }
}

/// Errors raised by settings backends
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Stored value for '{key}' is not valid UTF-8")]
    InvalidValue { key: String },

    #[error("Backend '{backend}' is unavailable: {reason}")]
    Unavailable { backend: StorageType, reason: String },

    #[error("Settings backend error: {0}")]
    BackendSpecific(String),
}

pub type SettingsResult<T> = Result<T, SettingsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_type_parsing() {
        assert_eq!("SLED".parse::<StorageType>(), Ok(StorageType::Sled));
        assert_eq!("memory".parse::<StorageType>(), Ok(StorageType::Memory));
        assert!("rocksdb".parse::<StorageType>().is_err());
        assert_eq!(StorageType::Memory.to_string(), "memory");
    }
}
