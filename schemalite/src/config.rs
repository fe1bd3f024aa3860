// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
// Engine configuration

use crate::hierarchy::DEFAULT_DEPTH_CAP;
use crate::storage::StorageType;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const ENV_TESTING: &str = "SCHEMALITE_TESTING";
pub const ENV_LEDGER_PATH: &str = "SCHEMALITE_LEDGER_PATH";
pub const ENV_STORAGE: &str = "SCHEMALITE_STORAGE";

pub const DEFAULT_NAMESPACE: &str = "schemalite.dynamic";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error reading config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid value '{value}' for {key}")]
    InvalidValue { key: String, value: String },
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Configuration for the schema engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Skip hierarchy write-back and index synchronization after a commit
    pub testing_mode: bool,

    /// Upper bound on computed hierarchy depth
    pub hierarchy_depth_cap: usize,

    /// Backend of the index ledger
    pub storage_type: StorageType,

    /// Directory of the ledger when the backend is persistent
    pub ledger_path: Option<PathBuf>,

    /// Prefix of qualified type names
    pub dynamic_namespace: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            testing_mode: false,
            hierarchy_depth_cap: DEFAULT_DEPTH_CAP,
            storage_type: StorageType::Sled,
            ledger_path: None,
            dynamic_namespace: DEFAULT_NAMESPACE.to_string(),
        }
    }
}

impl EngineConfig {
    /// In-memory ledger with post-commit work disabled
    pub fn testing() -> Self {
        Self {
            testing_mode: true,
            storage_type: StorageType::Memory,
            ..Self::default()
        }
    }

    /// In-memory ledger with post-commit work enabled
    pub fn in_memory() -> Self {
        Self {
            storage_type: StorageType::Memory,
            ..Self::default()
        }
    }

    /// Persistent sled ledger under `path`
    pub fn persistent<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            storage_type: StorageType::Sled,
            ledger_path: Some(path.into()),
            ..Self::default()
        }
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Defaults overridden by the `SCHEMALITE_*` environment variables
    pub fn from_env() -> ConfigResult<Self> {
        let mut config = Self::default();
        config.apply_env()?;
        Ok(config)
    }

    /// Override fields from the environment where variables are set
    pub fn apply_env(&mut self) -> ConfigResult<()> {
        if let Ok(value) = std::env::var(ENV_TESTING) {
            self.testing_mode = match value.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" | "" => false,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        key: ENV_TESTING.to_string(),
                        value,
                    })
                }
            };
        }

        if let Ok(value) = std::env::var(ENV_STORAGE) {
            self.storage_type = value.parse().map_err(|_| ConfigError::InvalidValue {
                key: ENV_STORAGE.to_string(),
                value: value.clone(),
            })?;
        }

        if let Ok(value) = std::env::var(ENV_LEDGER_PATH) {
            if !value.is_empty() {
                self.ledger_path = Some(PathBuf::from(value));
            }
        }
        Ok(())
    }
}
