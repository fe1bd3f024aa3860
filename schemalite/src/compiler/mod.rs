// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Type compiler
//!
//! Compiles the units of one reload into data driven type descriptors. There is
//! no code generation: a [`CompiledType`] is an ordered property/view table plus
//! a small interpreter for validation and view serialization.

pub mod builtin;
pub mod type_compiler;
pub mod descriptor;
pub mod error;

pub use builtin::{is_builtin_base, NODE_INTERFACE};
pub use type_compiler::TypeCompiler;
pub use descriptor::{CompiledType, EntityError, HelperHandle, PropertyDescriptor};
pub use error::{CompileError, CompileErrors};
