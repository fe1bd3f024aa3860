// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
// Immutable snapshot of every compiled type

use crate::compiler::CompiledType;
use crate::definition::{DefinitionKind, SchemaDefinition};
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

/// One fully compiled snapshot of the type registry
#[derive(Debug, Clone)]
pub struct Generation {
    sequence: u64,
    types: BTreeMap<String, Arc<CompiledType>>,
    dynamic_views: BTreeSet<String>,
    /// Definitions this generation was compiled from
    definitions: Arc<Vec<SchemaDefinition>>,
    created_at: DateTime<Utc>,
}

impl Generation {
    /// Generation zero, current before the first reload
    pub fn empty() -> Self {
        Self::new(0, BTreeMap::new(), BTreeSet::new(), Vec::new())
    }

    pub fn new(
        sequence: u64,
        types: BTreeMap<String, Arc<CompiledType>>,
        dynamic_views: BTreeSet<String>,
        definitions: Vec<SchemaDefinition>,
    ) -> Self {
        Self {
            sequence,
            types,
            dynamic_views,
            definitions: Arc::new(definitions),
            created_at: Utc::now(),
        }
    }

    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn types(&self) -> &BTreeMap<String, Arc<CompiledType>> {
        &self.types
    }

    pub fn get_type(&self, name: &str) -> Option<&Arc<CompiledType>> {
        self.types.get(name)
    }

    pub fn contains_type(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    pub fn type_names(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(String::as_str)
    }

    /// Compiled types of one kind, in name order
    pub fn types_of_kind(&self, kind: DefinitionKind) -> impl Iterator<Item = &Arc<CompiledType>> {
        self.types.values().filter(move |t| t.kind() == kind)
    }

    pub fn dynamic_views(&self) -> &BTreeSet<String> {
        &self.dynamic_views
    }

    pub fn definitions(&self) -> &[SchemaDefinition] {
        &self.definitions
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Names of types present here but missing from `newer`
    pub fn removed_in(&self, newer: &Generation) -> BTreeSet<String> {
        self.types
            .keys()
            .filter(|name| !newer.contains_type(name))
            .cloned()
            .collect()
    }
}
