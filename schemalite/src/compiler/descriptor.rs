// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Compiled type descriptors
//!
//! A [`CompiledType`] replaces a generated class: it holds the merged property
//! table (inherited first, in declaration order) and merged views, and
//! interprets entity values against them.

use super::builtin::is_system_property;
use crate::definition::{DefinitionKind, PropertyType, RelationshipEndpoints};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use thiserror::Error;

/// One property of a compiled type
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyDescriptor {
    pub name: String,
    pub property_type: PropertyType,
    pub indexed: bool,
    pub indexed_when_empty: bool,
    pub read_only: bool,
    /// Type whose definition declared this property
    pub declaring_type: String,
}

impl PropertyDescriptor {
    /// Whether the schema asks for a database index on this property
    pub fn wants_index(&self) -> bool {
        self.indexed || self.indexed_when_empty
    }
}

/// Handle to the compiled auxiliary helper of a type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HelperHandle {
    pub name: String,
    pub source: Arc<str>,
    pub fingerprint: u32,
}

/// Errors raised when interpreting entity values against a descriptor
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EntityError {
    #[error("Type '{type_name}' has no property '{property}'")]
    UnknownProperty { type_name: String, property: String },

    #[error("Property '{property}' expects {expected}, got {got}")]
    TypeMismatch {
        property: String,
        expected: String,
        got: &'static str,
    },

    #[error("Property '{0}' is read-only")]
    ReadOnly(String),

    #[error("Type '{type_name}' has no view '{view}'")]
    UnknownView { type_name: String, view: String },
}

/// Executable descriptor for one type in one generation
#[derive(Debug, Clone)]
pub struct CompiledType {
    name: String,
    qualified_name: String,
    kind: DefinitionKind,
    ancestors: Vec<String>,
    builtin_base: Option<String>,
    properties: Vec<Arc<PropertyDescriptor>>,
    property_index: HashMap<String, usize>,
    views: BTreeMap<String, Vec<String>>,
    helper: Option<HelperHandle>,
    endpoints: Option<RelationshipEndpoints>,
    builtin: bool,
    non_indexed: bool,
}

impl CompiledType {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        name: String,
        qualified_name: String,
        kind: DefinitionKind,
        ancestors: Vec<String>,
        builtin_base: Option<String>,
        properties: Vec<Arc<PropertyDescriptor>>,
        views: BTreeMap<String, Vec<String>>,
        helper: Option<HelperHandle>,
        endpoints: Option<RelationshipEndpoints>,
        builtin: bool,
        non_indexed: bool,
    ) -> Self {
        let property_index = properties
            .iter()
            .enumerate()
            .map(|(i, p)| (p.name.clone(), i))
            .collect();

        Self {
            name,
            qualified_name,
            kind,
            ancestors,
            builtin_base,
            properties,
            property_index,
            views,
            helper,
            endpoints,
            builtin,
            non_indexed,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn qualified_name(&self) -> &str {
        &self.qualified_name
    }

    pub fn kind(&self) -> DefinitionKind {
        self.kind
    }

    /// Dynamic ancestors, nearest first
    pub fn ancestors(&self) -> &[String] {
        &self.ancestors
    }

    /// Built-in type at the top of the chain, if any
    pub fn builtin_base(&self) -> Option<&str> {
        self.builtin_base.as_deref()
    }

    /// Merged properties, inherited first
    pub fn properties(&self) -> &[Arc<PropertyDescriptor>] {
        &self.properties
    }

    pub fn property(&self, name: &str) -> Option<&PropertyDescriptor> {
        self.property_index
            .get(name)
            .map(|&i| self.properties[i].as_ref())
    }

    pub fn property_names(&self) -> impl Iterator<Item = &str> {
        self.properties.iter().map(|p| p.name.as_str())
    }

    pub fn views(&self) -> &BTreeMap<String, Vec<String>> {
        &self.views
    }

    pub fn view(&self, name: &str) -> Option<&[String]> {
        self.views.get(name).map(Vec::as_slice)
    }

    pub fn helper(&self) -> Option<&HelperHandle> {
        self.helper.as_ref()
    }

    pub fn endpoints(&self) -> Option<&RelationshipEndpoints> {
        self.endpoints.as_ref()
    }

    pub fn is_builtin(&self) -> bool {
        self.builtin
    }

    pub fn is_non_indexed(&self) -> bool {
        self.non_indexed
    }

    /// Whether `ancestor` is this type or one of its ancestors
    pub fn extends(&self, ancestor: &str) -> bool {
        self.name == ancestor
            || self.ancestors.iter().any(|a| a == ancestor)
            || self.builtin_base.as_deref() == Some(ancestor)
    }

    /// Check every value of `entity` against the declared property types
    ///
    /// Nulls are accepted for any property. Unknown keys are rejected, except
    /// the system properties carried by every entity.
    pub fn validate(&self, entity: &Map<String, Value>) -> Result<(), Vec<EntityError>> {
        let errors: Vec<EntityError> = entity
            .iter()
            .filter_map(|(key, value)| self.check_value(key, value).err())
            .collect();

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Like [`validate`](Self::validate), also rejecting writes to read-only properties
    pub fn validate_update(&self, changes: &Map<String, Value>) -> Result<(), Vec<EntityError>> {
        let mut errors = Vec::new();
        for (key, value) in changes {
            if let Err(e) = self.check_value(key, value) {
                errors.push(e);
                continue;
            }
            if self.property(key).map_or(false, |p| p.read_only) {
                errors.push(EntityError::ReadOnly(key.clone()));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Read one property of `entity`
    pub fn get_value<'a>(
        &self,
        entity: &'a Map<String, Value>,
        name: &str,
    ) -> Result<Option<&'a Value>, EntityError> {
        if self.property(name).is_none() && !is_system_property(name) {
            return Err(self.unknown_property(name));
        }
        Ok(entity.get(name))
    }

    /// Project `entity` onto the property list of `view`
    ///
    /// Properties missing from the entity are serialized as null.
    pub fn serialize_view(
        &self,
        view: &str,
        entity: &Map<String, Value>,
    ) -> Result<Map<String, Value>, EntityError> {
        let keys = self.view(view).ok_or_else(|| EntityError::UnknownView {
            type_name: self.name.clone(),
            view: view.to_string(),
        })?;

        Ok(keys
            .iter()
            .map(|key| (key.clone(), entity.get(key).cloned().unwrap_or(Value::Null)))
            .collect())
    }

    fn check_value(&self, key: &str, value: &Value) -> Result<(), EntityError> {
        let Some(descriptor) = self.property(key) else {
            if is_system_property(key) {
                return Ok(());
            }
            return Err(self.unknown_property(key));
        };

        if value.is_null() || descriptor.property_type.accepts(value) {
            Ok(())
        } else {
            Err(EntityError::TypeMismatch {
                property: key.to_string(),
                expected: descriptor.property_type.to_string(),
                got: value_kind(value),
            })
        }
    }

    fn unknown_property(&self, property: &str) -> EntityError {
        EntityError::UnknownProperty {
            type_name: self.name.clone(),
            property: property.to_string(),
        }
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
