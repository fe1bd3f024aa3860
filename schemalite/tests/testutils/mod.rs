//! Test utilities for SchemaLite integration tests
//!
//! - EngineFixture: a coordinator wired to in-memory collaborators
//! - definitions: schema definitions shared across test files

#![allow(dead_code)]

pub mod definitions;
pub mod engine_fixture;
