// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! CLI module for SchemaLite
//!
//! Loads schema definitions from a JSON file, runs a reload against an
//! in-memory index catalog, and inspects hierarchy annotations and the
//! index ledger.

pub mod commands;
pub mod handlers;
pub mod output;

pub use commands::{Cli, Commands};
pub use handlers::{handle_hierarchy, handle_ledger, handle_reload};
