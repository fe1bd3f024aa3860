// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Compile errors

use crate::definition::DefinitionKind;
use crate::emit::DefinitionError;
use thiserror::Error;

/// A problem found while compiling one batch
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompileError {
    #[error(transparent)]
    Definition(#[from] DefinitionError),

    #[error("Type name '{0}' is defined more than once")]
    DuplicateType(String),

    #[error("Helper unit '{0}' is emitted more than once")]
    DuplicateHelper(String),

    #[error("Helper unit '{helper}' has no owning {owner_kind} type '{owner}'")]
    OrphanHelper {
        helper: String,
        owner: String,
        owner_kind: DefinitionKind,
    },

    #[error("Type '{type_name}' extends unknown type '{parent}'")]
    UnresolvedParent { type_name: String, parent: String },

    #[error("Type '{type_name}' ({kind}) cannot extend '{parent}' of a different kind")]
    KindMismatch {
        type_name: String,
        kind: DefinitionKind,
        parent: String,
    },

    #[error("Inheritance cycle between {}", .0.join(", "))]
    InheritanceCycle(Vec<String>),

    #[error("Property '{type_name}.{property}' references unknown node type '{target}'")]
    UnresolvedReference {
        type_name: String,
        property: String,
        target: String,
    },

    #[error("Relationship '{type_name}' has unknown endpoint type '{endpoint}'")]
    UnresolvedEndpoint { type_name: String, endpoint: String },

    #[error("View '{view}' of type '{type_name}' lists unknown property '{property}'")]
    UnknownViewProperty {
        type_name: String,
        view: String,
        property: String,
    },
}

/// Every error collected from one rejected batch
#[derive(Error, Debug, Clone, PartialEq, Default)]
#[error("{} compile error(s): {}", .0.len(), render(.0))]
pub struct CompileErrors(pub Vec<CompileError>);

fn render(errors: &[CompileError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

impl CompileErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CompileError> {
        self.0.iter()
    }

    pub fn push(&mut self, error: impl Into<CompileError>) {
        self.0.push(error.into());
    }
}

impl From<Vec<CompileError>> for CompileErrors {
    fn from(errors: Vec<CompileError>) -> Self {
        CompileErrors(errors)
    }
}
