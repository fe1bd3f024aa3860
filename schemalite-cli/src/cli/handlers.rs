// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! CLI command handlers for SchemaLite

use colored::Colorize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use super::commands::OutputFormat;
use super::output::ReportFormatter;
use schemalite::hierarchy::HierarchyResolver;
use schemalite::{
    create_settings_store, DefinitionKind, EngineConfig, IndexLedger, MemoryDefinitionStore,
    MemoryIndexCatalog, ReloadCoordinator, SchemaDefinition, StorageType,
};

/// Handle the reload command
///
/// Runs one reload of the schema file against an in-memory index catalog and
/// prints the committed generation, the DDL it issued and the resulting ledger.
pub fn handle_reload(
    schema: PathBuf,
    path: Option<PathBuf>,
    storage: Option<StorageType>,
    config: Option<PathBuf>,
    testing: bool,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut engine_config = match config {
        Some(config_path) => EngineConfig::from_json_file(config_path)?,
        None => EngineConfig::default(),
    };
    engine_config.apply_env()?;
    if let Some(storage) = storage {
        engine_config.storage_type = storage;
    }
    if path.is_some() {
        engine_config.ledger_path = path;
    }
    if testing {
        engine_config.testing_mode = true;
    }

    if engine_config.storage_type == StorageType::Sled && engine_config.ledger_path.is_none() {
        return Err("The sled ledger needs a directory: pass --path, or use --storage memory".into());
    }
    if !schema.exists() {
        return Err(format!("Schema file not found at {:?}", schema).into());
    }

    let store = Arc::new(MemoryDefinitionStore::from_json_file(&schema)?);
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(run_reload(engine_config, store, format))
}

async fn run_reload(
    config: EngineConfig,
    store: Arc<MemoryDefinitionStore>,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let catalog = Arc::new(MemoryIndexCatalog::new());
    let coordinator = ReloadCoordinator::from_config(config, store.clone(), catalog.clone())?;

    let result = coordinator
        .reload()
        .await
        .into_result()
        .ok_or("Another reload is in progress")?;

    let generation = match result {
        Ok(generation) => generation,
        Err(error) => {
            eprintln!("{}", format!("Reload failed: {}", error).red());
            if let Some(errors) = error.compile_errors() {
                eprint!("{}", ReportFormatter::compile_errors(errors));
            }
            return Err(error.to_string().into());
        }
    };

    if !coordinator.await_index_sync(generation.sequence()).await {
        println!("{}", "Index synchronization did not complete".yellow());
    }

    let annotations: BTreeMap<_, _> = generation
        .types_of_kind(DefinitionKind::Node)
        .filter_map(|t| store.annotation(t.name()).map(|a| (t.name().to_string(), a)))
        .collect();
    let ledger = coordinator.synchronizer().ledger().entries()?;

    println!(
        "{}",
        ReportFormatter::reload(&generation, &annotations, &catalog.calls(), &ledger, format)
    );
    coordinator.shutdown();
    Ok(())
}

/// Handle the hierarchy command
pub fn handle_hierarchy(
    schema: PathBuf,
    depth_cap: usize,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let content = std::fs::read_to_string(&schema)
        .map_err(|e| format!("Unable to read schema file {:?}: {}", schema, e))?;
    let definitions: Vec<SchemaDefinition> = serde_json::from_str(&content)?;

    let report = HierarchyResolver::new(depth_cap).compute_report(&definitions);
    println!("{}", ReportFormatter::hierarchy(&report, format));
    Ok(())
}

/// Handle the ledger command
pub fn handle_ledger(path: PathBuf, format: OutputFormat) -> Result<(), Box<dyn std::error::Error>> {
    if !path.exists() {
        return Err(format!("Ledger not found at {:?}", path).into());
    }

    let settings = create_settings_store(StorageType::Sled, Some(&path))?;
    let entries = IndexLedger::new(settings).entries()?;
    println!("{}", ReportFormatter::ledger(&entries, format));
    Ok(())
}
