// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Type registry
//!
//! Holds the current [`Generation`] behind an atomically swapped pointer.
//! Readers pin a complete generation and never block; a reload builds the next
//! generation off to the side and publishes it with a single swap.

pub mod cache;
pub mod generation;
pub mod type_registry;

pub use cache::{CacheStats, DerivedCaches};
pub use generation::Generation;
pub use type_registry::{RegistryError, TypeRegistry};
