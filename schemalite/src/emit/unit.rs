// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
// Compilable units produced by the emitter

use crate::definition::{DefinitionKind, PropertyType, RelationshipEndpoints, ViewDeclaration};

/// A property after its declaration has been parsed
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    pub name: String,
    pub property_type: PropertyType,
    pub indexed: bool,
    pub indexed_when_empty: bool,
    pub read_only: bool,
}

/// Unit describing one node or relationship type
#[derive(Debug, Clone, PartialEq)]
pub struct TypeUnit {
    pub name: String,
    pub kind: DefinitionKind,
    pub extends: Option<String>,
    pub fields: Vec<FieldSpec>,
    pub views: Vec<ViewDeclaration>,
    pub endpoints: Option<RelationshipEndpoints>,
    pub builtin: bool,
    pub non_indexed: bool,
}

/// Unit carrying the auxiliary helper source of a definition
#[derive(Debug, Clone, PartialEq)]
pub struct HelperUnit {
    /// Derived from the owner, see [`helper_unit_name`](super::helper_unit_name)
    pub name: String,
    pub owner: String,
    pub owner_kind: DefinitionKind,
    pub source: String,
    /// CRC32 of `source`
    pub fingerprint: u32,
}

/// Anything the compiler accepts in a batch
#[derive(Debug, Clone, PartialEq)]
pub enum SourceUnit {
    Type(TypeUnit),
    Helper(HelperUnit),
}

impl SourceUnit {
    pub fn name(&self) -> &str {
        match self {
            SourceUnit::Type(unit) => &unit.name,
            SourceUnit::Helper(unit) => &unit.name,
        }
    }
}
