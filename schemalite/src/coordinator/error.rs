// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
// Reload error types

use crate::compiler::CompileErrors;
use crate::definition::StoreError;
use crate::registry::RegistryError;
use crate::storage::SettingsError;
use thiserror::Error;

/// Reasons a reload did not commit a new generation
///
/// In every case the previous generation stays current.
#[derive(Error, Debug)]
pub enum ReloadError {
    #[error("Schema rejected: {0}")]
    Compile(#[from] CompileErrors),

    #[error("Storage unavailable during reload: {0}")]
    StorageUnavailable(#[from] StoreError),

    #[error("Commit rejected: {0}")]
    Registry(#[from] RegistryError),

    #[error("Index ledger unavailable: {0}")]
    Settings(#[from] SettingsError),

    #[error("No async runtime available: {0}")]
    Runtime(String),

    #[error("Reload task ended without a result")]
    Aborted,
}

impl ReloadError {
    /// Compile errors carried by this failure, if it was a rejected schema
    pub fn compile_errors(&self) -> Option<&CompileErrors> {
        match self {
            ReloadError::Compile(errors) => Some(errors),
            _ => None,
        }
    }
}

pub type ReloadResult<T> = Result<T, ReloadError>;
