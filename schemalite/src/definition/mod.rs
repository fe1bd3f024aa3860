// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Schema definition data model
//!
//! User authored schema definitions are stored as data by the storage
//! collaborator. A reload reads them through [`SchemaDefinitionStore`] and never
//! mutates them, apart from writing back hierarchy annotations.

pub mod property_type;
pub mod store;
pub mod types;

pub use property_type::PropertyType;
pub use store::{MemoryDefinitionStore, SchemaDefinitionStore, StoreError, StoreResult};
pub use types::{
    DefinitionKind, PropertyDeclaration, RelationshipEndpoints, SchemaDefinition,
    ViewDeclaration,
};
