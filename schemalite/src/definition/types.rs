// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
// Persisted schema definition records

use serde::{Deserialize, Serialize};

/// Whether a definition describes a node type or a relationship type
///
/// Stores key definitions by kind and name. A compiled generation keeps one
/// map of types, so a name used by both kinds is rejected at compile time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DefinitionKind {
    Node,
    Relationship,
}

impl std::fmt::Display for DefinitionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DefinitionKind::Node => write!(f, "node"),
            DefinitionKind::Relationship => write!(f, "relationship"),
        }
    }
}

/// One property declared on a definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyDeclaration {
    pub name: String,
    /// Declared type in source form, e.g. `String`, `Enum(a, b)`, `Ref(File)[]`
    pub declared_type: String,
    #[serde(default)]
    pub indexed: bool,
    #[serde(default)]
    pub indexed_when_empty: bool,
    #[serde(default)]
    pub read_only: bool,
}

impl PropertyDeclaration {
    pub fn new(name: impl Into<String>, declared_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            declared_type: declared_type.into(),
            indexed: false,
            indexed_when_empty: false,
            read_only: false,
        }
    }

    pub fn indexed(mut self) -> Self {
        self.indexed = true;
        self
    }

    pub fn indexed_when_empty(mut self) -> Self {
        self.indexed_when_empty = true;
        self
    }

    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }
}

/// A named subset of properties exposed externally
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewDeclaration {
    pub name: String,
    pub properties: Vec<String>,
}

/// Endpoints of a relationship definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationshipEndpoints {
    /// Source node type name
    pub source: String,
    /// Target node type name
    pub target: String,
    /// Label stored on the relationship in the graph
    pub relationship_type: String,
}

/// User authored description of a node or relationship type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaDefinition {
    pub name: String,
    pub kind: DefinitionKind,
    /// Parent definition or built-in base type name
    #[serde(default)]
    pub extends: Option<String>,
    #[serde(default)]
    pub properties: Vec<PropertyDeclaration>,
    #[serde(default)]
    pub views: Vec<ViewDeclaration>,
    /// Free-form helper code compiled as a separate unit
    #[serde(default)]
    pub auxiliary_source: Option<String>,
    /// Present for relationship definitions only
    #[serde(default)]
    pub endpoints: Option<RelationshipEndpoints>,
    /// Marks definitions that override a built-in type
    #[serde(default)]
    pub builtin: bool,
    /// Type-level opt out of index creation
    #[serde(default)]
    pub non_indexed: bool,
}

impl SchemaDefinition {
    /// New node definition without properties
    pub fn node(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: DefinitionKind::Node,
            extends: None,
            properties: Vec::new(),
            views: Vec::new(),
            auxiliary_source: None,
            endpoints: None,
            builtin: false,
            non_indexed: false,
        }
    }

    /// New relationship definition `(source)-[relationship_type]->(target)`
    pub fn relationship(
        name: impl Into<String>,
        source: impl Into<String>,
        relationship_type: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        Self {
            kind: DefinitionKind::Relationship,
            endpoints: Some(RelationshipEndpoints {
                source: source.into(),
                target: target.into(),
                relationship_type: relationship_type.into(),
            }),
            ..Self::node(name)
        }
    }

    pub fn extending(mut self, parent: impl Into<String>) -> Self {
        self.extends = Some(parent.into());
        self
    }

    pub fn with_property(mut self, property: PropertyDeclaration) -> Self {
        self.properties.push(property);
        self
    }

    pub fn with_view(mut self, name: impl Into<String>, properties: &[&str]) -> Self {
        self.views.push(ViewDeclaration {
            name: name.into(),
            properties: properties.iter().map(|p| p.to_string()).collect(),
        });
        self
    }

    pub fn with_auxiliary_source(mut self, source: impl Into<String>) -> Self {
        self.auxiliary_source = Some(source.into());
        self
    }

    pub fn non_indexed(mut self) -> Self {
        self.non_indexed = true;
        self
    }

    /// Names of the views declared directly on this definition
    pub fn view_names(&self) -> impl Iterator<Item = &str> {
        self.views.iter().map(|v| v.name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_definition_from_json_defaults() {
        let json = r#"{
            "name": "File",
            "kind": "node",
            "properties": [{"name": "name", "declared_type": "String", "indexed": true}]
        }"#;
        let def: SchemaDefinition = serde_json::from_str(json).unwrap();
        assert_eq!(def.kind, DefinitionKind::Node);
        assert!(def.extends.is_none());
        assert!(def.properties[0].indexed);
        assert!(!def.properties[0].read_only);
        assert!(!def.builtin);
    }

    #[test]
    fn test_relationship_builder_sets_endpoints() {
        let rel = SchemaDefinition::relationship("FileContains", "Folder", "CONTAINS", "File");
        assert_eq!(rel.kind, DefinitionKind::Relationship);
        let endpoints = rel.endpoints.unwrap();
        assert_eq!(endpoints.source, "Folder");
        assert_eq!(endpoints.target, "File");
    }
}
