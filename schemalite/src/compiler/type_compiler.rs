// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Batch type compiler
//!
//! All units of one reload are compiled together so references between new
//! types resolve against the new shapes. The batch is all-or-nothing: any
//! collected error rejects every type in it.

use super::builtin::{is_system_property, BUILTIN_BASES};
use super::descriptor::{CompiledType, HelperHandle, PropertyDescriptor};
use super::error::{CompileError, CompileErrors};
use crate::definition::DefinitionKind;
use crate::emit::{HelperUnit, SourceUnit, TypeUnit};
use parking_lot::RwLock;
use petgraph::algo::{tarjan_scc, toposort};
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Compiles batches of source units into type descriptors
pub struct TypeCompiler {
    /// Prefix of every qualified name
    namespace: String,
    /// Bases registered by built-in type overrides, on top of the fixed ones
    extra_bases: RwLock<BTreeMap<String, DefinitionKind>>,
    invocations: AtomicU64,
}

impl TypeCompiler {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            extra_bases: RwLock::new(BTreeMap::new()),
            invocations: AtomicU64::new(0),
        }
    }

    /// Accept `name` as a built-in ancestor for types of `kind`
    pub fn register_builtin_base(&self, name: impl Into<String>, kind: DefinitionKind) {
        self.extra_bases.write().insert(name.into(), kind);
    }

    /// Number of batches compiled so far
    pub fn invocation_count(&self) -> u64 {
        self.invocations.load(Ordering::SeqCst)
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    fn builtin_kind(&self, name: &str) -> Option<DefinitionKind> {
        BUILTIN_BASES
            .iter()
            .find(|(base, _)| *base == name)
            .map(|(_, kind)| *kind)
            .or_else(|| self.extra_bases.read().get(name).copied())
    }

    fn is_node_type(&self, types: &BTreeMap<String, TypeUnit>, name: &str) -> bool {
        match types.get(name) {
            Some(unit) => unit.kind == DefinitionKind::Node,
            None => self.builtin_kind(name) == Some(DefinitionKind::Node),
        }
    }

    /// Compile one batch
    ///
    /// # Returns
    /// * `Ok(map)` - every type of the batch, keyed by name
    /// * `Err(CompileErrors)` - everything that was wrong with the batch
    pub fn compile(
        &self,
        units: Vec<SourceUnit>,
    ) -> Result<BTreeMap<String, Arc<CompiledType>>, CompileErrors> {
        self.invocations.fetch_add(1, Ordering::SeqCst);
        let mut errors = CompileErrors::default();

        let mut types: BTreeMap<String, TypeUnit> = BTreeMap::new();
        let mut helpers: BTreeMap<(DefinitionKind, String), HelperUnit> = BTreeMap::new();
        for unit in units {
            match unit {
                SourceUnit::Type(unit) => {
                    if types.contains_key(&unit.name) {
                        errors.push(CompileError::DuplicateType(unit.name.clone()));
                    } else {
                        types.insert(unit.name.clone(), unit);
                    }
                }
                SourceUnit::Helper(helper) => {
                    let key = (helper.owner_kind, helper.owner.clone());
                    if helpers.contains_key(&key) {
                        errors.push(CompileError::DuplicateHelper(helper.name.clone()));
                    } else {
                        helpers.insert(key, helper);
                    }
                }
            }
        }

        for ((kind, owner), helper) in &helpers {
            if types.get(owner).map(|unit| unit.kind) != Some(*kind) {
                errors.push(CompileError::OrphanHelper {
                    helper: helper.name.clone(),
                    owner: owner.clone(),
                    owner_kind: *kind,
                });
            }
        }

        // Edges point from parent to child so a topological order builds parents first
        let mut graph: DiGraph<&str, ()> = DiGraph::new();
        let nodes: HashMap<&str, NodeIndex> = types
            .keys()
            .map(|name| (name.as_str(), graph.add_node(name.as_str())))
            .collect();

        for unit in types.values() {
            self.check_references(unit, &types, &mut errors);

            let Some(parent) = unit.extends.as_deref() else {
                continue;
            };
            match types.get(parent) {
                Some(parent_unit) if parent_unit.kind == unit.kind => {
                    graph.add_edge(nodes[parent], nodes[unit.name.as_str()], ());
                }
                Some(_) => errors.push(kind_mismatch(unit, parent)),
                None => match self.builtin_kind(parent) {
                    Some(kind) if kind == unit.kind => {}
                    Some(_) => errors.push(kind_mismatch(unit, parent)),
                    None => errors.push(CompileError::UnresolvedParent {
                        type_name: unit.name.clone(),
                        parent: parent.to_string(),
                    }),
                },
            }
        }

        let order = match toposort(&graph, None) {
            Ok(order) => order,
            Err(_) => {
                for component in tarjan_scc(&graph) {
                    let is_cycle = component.len() > 1
                        || graph.contains_edge(component[0], component[0]);
                    if is_cycle {
                        let mut members: Vec<String> =
                            component.iter().map(|i| graph[*i].to_string()).collect();
                        members.sort();
                        errors.push(CompileError::InheritanceCycle(members));
                    }
                }
                return Err(errors);
            }
        };

        if !errors.is_empty() {
            return Err(errors);
        }

        let mut compiled: BTreeMap<String, Arc<CompiledType>> = BTreeMap::new();
        for index in order {
            let unit = &types[graph[index]];
            let parent = unit
                .extends
                .as_deref()
                .and_then(|name| compiled.get(name))
                .cloned();
            let helper = helpers.get(&(unit.kind, unit.name.clone()));

            let compiled_type = self.build_type(unit, parent.as_deref(), helper, &mut errors);
            compiled.insert(unit.name.clone(), Arc::new(compiled_type));
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        log::debug!("Compiled batch of {} types", compiled.len());
        Ok(compiled)
    }

    fn check_references(
        &self,
        unit: &TypeUnit,
        types: &BTreeMap<String, TypeUnit>,
        errors: &mut CompileErrors,
    ) {
        for field in &unit.fields {
            if let Some(target) = field.property_type.referenced_type() {
                if !self.is_node_type(types, target) {
                    errors.push(CompileError::UnresolvedReference {
                        type_name: unit.name.clone(),
                        property: field.name.clone(),
                        target: target.to_string(),
                    });
                }
            }
        }

        if let Some(endpoints) = &unit.endpoints {
            for endpoint in [&endpoints.source, &endpoints.target] {
                if !self.is_node_type(types, endpoint) {
                    errors.push(CompileError::UnresolvedEndpoint {
                        type_name: unit.name.clone(),
                        endpoint: endpoint.clone(),
                    });
                }
            }
        }
    }

    fn build_type(
        &self,
        unit: &TypeUnit,
        parent: Option<&CompiledType>,
        helper: Option<&HelperUnit>,
        errors: &mut CompileErrors,
    ) -> CompiledType {
        let (mut properties, mut views, ancestors, builtin_base, inherited_non_indexed) =
            match parent {
                Some(parent) => (
                    parent.properties().to_vec(),
                    parent.views().clone(),
                    std::iter::once(parent.name().to_string())
                        .chain(parent.ancestors().iter().cloned())
                        .collect(),
                    parent.builtin_base().map(String::from),
                    parent.is_non_indexed(),
                ),
                None => (
                    Vec::new(),
                    BTreeMap::new(),
                    Vec::new(),
                    unit.extends.clone(),
                    false,
                ),
            };

        for field in &unit.fields {
            let descriptor = Arc::new(PropertyDescriptor {
                name: field.name.clone(),
                property_type: field.property_type.clone(),
                indexed: field.indexed,
                indexed_when_empty: field.indexed_when_empty,
                read_only: field.read_only,
                declaring_type: unit.name.clone(),
            });

            // A redeclared property keeps its inherited position
            match properties.iter().position(|p| p.name == field.name) {
                Some(i) => properties[i] = descriptor,
                None => properties.push(descriptor),
            }
        }

        for view in &unit.views {
            let members: &mut Vec<String> = views.entry(view.name.clone()).or_default();
            for property in &view.properties {
                if !is_system_property(property) && !properties.iter().any(|p| &p.name == property)
                {
                    errors.push(CompileError::UnknownViewProperty {
                        type_name: unit.name.clone(),
                        view: view.name.clone(),
                        property: property.clone(),
                    });
                    continue;
                }
                if !members.contains(property) {
                    members.push(property.clone());
                }
            }
        }

        let helper = helper.map(|h| HelperHandle {
            name: h.name.clone(),
            source: Arc::from(h.source.as_str()),
            fingerprint: h.fingerprint,
        });

        CompiledType::new(
            unit.name.clone(),
            format!("{}.{}", self.namespace, unit.name),
            unit.kind,
            ancestors,
            builtin_base,
            properties,
            views,
            helper,
            unit.endpoints.clone(),
            unit.builtin,
            unit.non_indexed || inherited_non_indexed,
        )
    }
}

fn kind_mismatch(unit: &TypeUnit, parent: &str) -> CompileError {
    CompileError::KindMismatch {
        type_name: unit.name.clone(),
        kind: unit.kind,
        parent: parent.to_string(),
    }
}
