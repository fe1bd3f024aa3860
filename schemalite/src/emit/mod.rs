// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Source emission
//!
//! Turns one [`SchemaDefinition`](crate::definition::SchemaDefinition) into the
//! units the compiler consumes. Emission is a pure function of its input.

pub mod emitter;
pub mod error;
pub mod unit;

pub use emitter::{helper_unit_name, Emission, TypeSourceEmitter};
pub use error::DefinitionError;
pub use unit::{FieldSpec, HelperUnit, SourceUnit, TypeUnit};
