// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
// Built-in base types every dynamic type ultimately extends

use crate::definition::DefinitionKind;

/// The base node capability; the only type allowed an index on `id`
pub const NODE_INTERFACE: &str = "NodeInterface";

pub const ABSTRACT_NODE: &str = "AbstractNode";
pub const RELATIONSHIP_INTERFACE: &str = "RelationshipInterface";
pub const ABSTRACT_RELATIONSHIP: &str = "AbstractRelationship";

/// Properties every entity carries regardless of its declared schema
pub const SYSTEM_PROPERTIES: &[&str] = &["id", "type"];

pub(crate) const BUILTIN_BASES: &[(&str, DefinitionKind)] = &[
    (NODE_INTERFACE, DefinitionKind::Node),
    (ABSTRACT_NODE, DefinitionKind::Node),
    (RELATIONSHIP_INTERFACE, DefinitionKind::Relationship),
    (ABSTRACT_RELATIONSHIP, DefinitionKind::Relationship),
];

/// Whether `name` is one of the fixed built-in base types
pub fn is_builtin_base(name: &str) -> bool {
    BUILTIN_BASES.iter().any(|(base, _)| *base == name)
}

pub fn is_system_property(name: &str) -> bool {
    SYSTEM_PROPERTIES.contains(&name)
}
