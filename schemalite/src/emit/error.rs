// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Errors for a single malformed definition

use crate::definition::DefinitionKind;
use thiserror::Error;

/// A single schema definition failed to emit a valid unit
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DefinitionError {
    #[error("Invalid {kind} type name '{name}'")]
    InvalidTypeName { kind: DefinitionKind, name: String },

    #[error("Invalid property name '{property}' on type '{type_name}'")]
    InvalidPropertyName { type_name: String, property: String },

    #[error("Property '{property}' is declared more than once on type '{type_name}'")]
    DuplicateProperty { type_name: String, property: String },

    #[error("Malformed declaration of '{type_name}.{property}': {reason}")]
    MalformedPropertyType {
        type_name: String,
        property: String,
        reason: String,
    },

    #[error("Invalid view name '{view}' on type '{type_name}'")]
    InvalidViewName { type_name: String, view: String },

    #[error("Relationship type '{0}' has no source/target endpoints")]
    MissingEndpoints(String),

    #[error("Node type '{0}' must not declare relationship endpoints")]
    UnexpectedEndpoints(String),
}

impl DefinitionError {
    /// Name of the definition the error belongs to
    pub fn type_name(&self) -> &str {
        match self {
            DefinitionError::InvalidTypeName { name, .. } => name,
            DefinitionError::InvalidPropertyName { type_name, .. }
            | DefinitionError::DuplicateProperty { type_name, .. }
            | DefinitionError::MalformedPropertyType { type_name, .. }
            | DefinitionError::InvalidViewName { type_name, .. } => type_name,
            DefinitionError::MissingEndpoints(name)
            | DefinitionError::UnexpectedEndpoints(name) => name,
        }
    }
}
