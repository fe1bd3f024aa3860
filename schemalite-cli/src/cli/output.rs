// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Report formatting for CLI output

use colored::*;
use comfy_table::{presets::UTF8_FULL, Cell, Color, Table};
use std::collections::BTreeMap;

use super::commands::OutputFormat;
use schemalite::compiler::CompileErrors;
use schemalite::hierarchy::HierarchyReport;
use schemalite::index::{should_index, DdlCall, LedgerEntry};
use schemalite::{CompiledType, Generation, HierarchyAnnotation};

/// Formatter for reload, hierarchy and ledger reports
pub struct ReportFormatter;

impl ReportFormatter {
    /// Format a committed generation with the DDL issued and resulting ledger
    pub fn reload(
        generation: &Generation,
        annotations: &BTreeMap<String, HierarchyAnnotation>,
        ddl: &[DdlCall],
        ledger: &[LedgerEntry],
        format: OutputFormat,
    ) -> String {
        match format {
            OutputFormat::Table => Self::reload_table(generation, annotations, ddl, ledger),
            OutputFormat::Json => Self::reload_json(generation, annotations, ddl, ledger),
        }
    }

    pub fn hierarchy(report: &HierarchyReport, format: OutputFormat) -> String {
        match format {
            OutputFormat::Table => {
                let mut output = String::new();
                output.push_str(&format!("{}\n", "Type Hierarchy".bold().green()));

                let mut table = Table::new();
                table.load_preset(UTF8_FULL);
                table.set_header(header(&["Type", "Depth", "Relationships"]));
                for (name, annotation) in &report.annotations {
                    table.add_row(vec![
                        name.clone(),
                        annotation.depth.to_string(),
                        annotation.relationship_count.to_string(),
                    ]);
                }
                output.push_str(&table.to_string());
                output.push('\n');
                output.push_str(&Self::cycles(&report.cycles));
                output
            }
            OutputFormat::Json => pretty(&serde_json::json!({
                "annotations": report.annotations,
                "cycles": report.cycles,
            })),
        }
    }

    pub fn ledger(entries: &[LedgerEntry], format: OutputFormat) -> String {
        match format {
            OutputFormat::Table => {
                if entries.is_empty() {
                    return format!("{}\n", "No indexes recorded".yellow());
                }
                let mut table = Table::new();
                table.load_preset(UTF8_FULL);
                table.set_header(header(&["Type", "Property"]));
                for entry in entries {
                    table.add_row(vec![entry.type_name.clone(), entry.property.clone()]);
                }
                format!("{}\n{}\n", "Index Ledger".bold().green(), table)
            }
            OutputFormat::Json => pretty(&ledger_json(entries)),
        }
    }

    pub fn compile_errors(errors: &CompileErrors) -> String {
        let mut output = format!("{}\n", "Schema errors:".bold().red());
        for (i, error) in errors.iter().enumerate() {
            output.push_str(&format!("  {}. {}\n", i + 1, error.to_string().red()));
        }
        output
    }

    fn reload_table(
        generation: &Generation,
        annotations: &BTreeMap<String, HierarchyAnnotation>,
        ddl: &[DdlCall],
        ledger: &[LedgerEntry],
    ) -> String {
        let mut output = String::new();
        output.push_str(&format!(
            "{}\n",
            format!("✅ Committed generation {}", generation.sequence()).green()
        ));
        output.push_str(&format!("Types: {}\n\n", generation.len()));

        let mut table = Table::new();
        table.load_preset(UTF8_FULL);
        table.set_header(header(&[
            "Type",
            "Kind",
            "Extends",
            "Properties",
            "Indexed",
            "Views",
            "Depth",
        ]));
        for compiled in generation.types().values() {
            table.add_row(vec![
                compiled.name().to_string(),
                compiled.kind().to_string(),
                lineage(compiled),
                compiled.property_names().collect::<Vec<_>>().join(", "),
                indexed_properties(compiled).join(", "),
                compiled.views().keys().cloned().collect::<Vec<_>>().join(", "),
                annotations
                    .get(compiled.name())
                    .map(|a| a.depth.to_string())
                    .unwrap_or_default(),
            ]);
        }
        output.push_str(&table.to_string());
        output.push('\n');

        if ddl.is_empty() {
            output.push_str(&format!("\n{}\n", "No index DDL issued".yellow()));
        } else {
            output.push_str(&format!("\n{}\n", "Index DDL:".bold()));
            for call in ddl {
                output.push_str(&format!("  {}\n", call));
            }
        }

        output.push_str(&format!("\n{}", Self::ledger(ledger, OutputFormat::Table)));
        output
    }

    fn reload_json(
        generation: &Generation,
        annotations: &BTreeMap<String, HierarchyAnnotation>,
        ddl: &[DdlCall],
        ledger: &[LedgerEntry],
    ) -> String {
        let types: Vec<serde_json::Value> = generation
            .types()
            .values()
            .map(|compiled| {
                serde_json::json!({
                    "name": compiled.name(),
                    "qualified_name": compiled.qualified_name(),
                    "kind": compiled.kind(),
                    "ancestors": compiled.ancestors(),
                    "builtin_base": compiled.builtin_base(),
                    "properties": compiled.properties().iter().map(|p| serde_json::json!({
                        "name": p.name,
                        "type": p.property_type.to_string(),
                        "declared_by": p.declaring_type,
                        "indexed": should_index(compiled, p),
                        "read_only": p.read_only,
                    })).collect::<Vec<_>>(),
                    "views": compiled.views(),
                    "hierarchy": annotations.get(compiled.name()),
                })
            })
            .collect();

        pretty(&serde_json::json!({
            "status": "committed",
            "generation": generation.sequence(),
            "created_at": generation.created_at().to_rfc3339(),
            "types": types,
            "dynamic_views": generation.dynamic_views(),
            "ddl": ddl.iter().map(|call| call.to_string()).collect::<Vec<_>>(),
            "ledger": ledger_json(ledger),
        }))
    }

    fn cycles(cycles: &[Vec<String>]) -> String {
        if cycles.is_empty() {
            return String::new();
        }
        let mut output = format!("\n{}\n", "Inheritance cycles:".bold().yellow());
        for cycle in cycles {
            output.push_str(&format!("  {}\n", cycle.join(" -> ").yellow()));
        }
        output
    }
}

fn header(columns: &[&str]) -> Vec<Cell> {
    columns
        .iter()
        .map(|col| Cell::new(col).fg(Color::Green))
        .collect()
}

/// `Parent -> Grandparent -> builtin`
fn lineage(compiled: &CompiledType) -> String {
    compiled
        .ancestors()
        .iter()
        .map(String::as_str)
        .chain(compiled.builtin_base())
        .collect::<Vec<_>>()
        .join(" -> ")
}

fn indexed_properties(compiled: &CompiledType) -> Vec<&str> {
    compiled
        .properties()
        .iter()
        .filter(|p| should_index(compiled, p))
        .map(|p| p.name.as_str())
        .collect()
}

fn ledger_json(entries: &[LedgerEntry]) -> serde_json::Value {
    serde_json::Value::Array(
        entries
            .iter()
            .map(|e| serde_json::json!({"type": e.type_name, "property": e.property}))
            .collect(),
    )
}

fn pretty(value: &serde_json::Value) -> String {
    serde_json::to_string_pretty(value)
        .unwrap_or_else(|_| "{\"status\": \"error\", \"error\": \"Could not serialize report\"}".to_string())
}
