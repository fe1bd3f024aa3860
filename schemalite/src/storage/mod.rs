// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Settings storage backends
//!
//! The schema engine persists a small amount of bookkeeping (the index ledger)
//! in a string keyed settings store. This module provides the trait and the
//! backends that implement it.
//!
//! # Architecture
//!
//! ```text
//! IndexLedger (index.<Type>.<property> -> "true")
//!     ↓
//! SettingsStore (string key/value abstraction)
//!     ↓
//! Concrete Implementations (Sled, Memory)
//! ```
//!
//! # Example Usage
//!
//! ```ignore
//! use schemalite::storage::{create_settings_store, StorageType};
//!
//! let store = create_settings_store(StorageType::Sled, Some("./ledger"))?;
//! store.set_setting("index.File.name", Some("true"))?;
//! assert_eq!(store.get_setting("index.File.name")?, Some("true".to_string()));
//! ```

pub mod factory;
pub mod memory;
#[cfg(feature = "sled-backend")]
pub mod sled;
pub mod traits;
pub mod types;

pub use factory::create_settings_store;
pub use memory::MemorySettingsStore;
pub use traits::SettingsStore;
pub use types::{SettingsError, SettingsResult, StorageType};
