// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Hierarchy annotations
//!
//! Advisory metadata for tooling: how deep each node type sits below its
//! nearest built-in ancestor and how many relationship types touch it.

pub mod resolver;

pub use resolver::{HierarchyAnnotation, HierarchyReport, HierarchyResolver, DEFAULT_DEPTH_CAP};
