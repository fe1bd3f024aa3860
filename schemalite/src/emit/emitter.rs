// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Definition to unit emitter

use super::error::DefinitionError;
use super::unit::{FieldSpec, HelperUnit, SourceUnit, TypeUnit};
use crate::definition::{DefinitionKind, PropertyType, SchemaDefinition};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

static IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier pattern is valid"));

/// Name of the helper unit derived from `owner`
pub fn helper_unit_name(owner: &str) -> String {
    format!("_{}Helper", owner)
}

/// Result of emitting one definition
#[derive(Debug, Clone, PartialEq)]
pub struct Emission {
    pub primary: TypeUnit,
    pub helper: Option<HelperUnit>,
}

impl Emission {
    pub fn into_units(self) -> Vec<SourceUnit> {
        let mut units = vec![SourceUnit::Type(self.primary)];
        if let Some(helper) = self.helper {
            units.push(SourceUnit::Helper(helper));
        }
        units
    }
}

/// Emits compilable units from schema definitions
#[derive(Debug, Default, Clone, Copy)]
pub struct TypeSourceEmitter;

impl TypeSourceEmitter {
    pub fn new() -> Self {
        Self
    }

    /// Emit the type unit for `definition` and, when it carries auxiliary
    /// source, the helper unit
    ///
    /// All problems found in the definition are reported together.
    pub fn emit(&self, definition: &SchemaDefinition) -> Result<Emission, Vec<DefinitionError>> {
        let mut errors = Vec::new();
        let type_name = definition.name.as_str();

        if !IDENTIFIER.is_match(type_name) {
            errors.push(DefinitionError::InvalidTypeName {
                kind: definition.kind,
                name: type_name.to_string(),
            });
        }

        match (definition.kind, &definition.endpoints) {
            (DefinitionKind::Relationship, None) => {
                errors.push(DefinitionError::MissingEndpoints(type_name.to_string()))
            }
            (DefinitionKind::Node, Some(_)) => {
                errors.push(DefinitionError::UnexpectedEndpoints(type_name.to_string()))
            }
            _ => {}
        }

        let mut seen = HashSet::new();
        let mut fields = Vec::with_capacity(definition.properties.len());
        for property in &definition.properties {
            if !IDENTIFIER.is_match(&property.name) {
                errors.push(DefinitionError::InvalidPropertyName {
                    type_name: type_name.to_string(),
                    property: property.name.clone(),
                });
                continue;
            }
            if !seen.insert(property.name.as_str()) {
                errors.push(DefinitionError::DuplicateProperty {
                    type_name: type_name.to_string(),
                    property: property.name.clone(),
                });
                continue;
            }

            match PropertyType::parse(&property.declared_type) {
                Ok(property_type) => fields.push(FieldSpec {
                    name: property.name.clone(),
                    property_type,
                    indexed: property.indexed,
                    indexed_when_empty: property.indexed_when_empty,
                    read_only: property.read_only,
                }),
                Err(reason) => errors.push(DefinitionError::MalformedPropertyType {
                    type_name: type_name.to_string(),
                    property: property.name.clone(),
                    reason,
                }),
            }
        }

        for view in &definition.views {
            if !IDENTIFIER.is_match(&view.name) {
                errors.push(DefinitionError::InvalidViewName {
                    type_name: type_name.to_string(),
                    view: view.name.clone(),
                });
            }
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        let helper = definition.auxiliary_source.as_ref().map(|source| HelperUnit {
            name: helper_unit_name(type_name),
            owner: type_name.to_string(),
            owner_kind: definition.kind,
            source: source.clone(),
            fingerprint: crc32fast::hash(source.as_bytes()),
        });

        Ok(Emission {
            primary: TypeUnit {
                name: type_name.to_string(),
                kind: definition.kind,
                extends: definition.extends.clone(),
                fields,
                views: definition.views.clone(),
                endpoints: definition.endpoints.clone(),
                builtin: definition.builtin,
                non_indexed: definition.non_indexed,
            },
            helper,
        })
    }
}
