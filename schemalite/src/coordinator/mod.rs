// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Reload coordination

pub mod error;
pub mod outcome;
pub mod reload_coordinator;

pub use error::{ReloadError, ReloadResult};
pub use outcome::{ReloadOutcome, RunResult};
pub use reload_coordinator::ReloadCoordinator;
