// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
// Inheritance depth and relationship count calculation

use crate::definition::{DefinitionKind, SchemaDefinition};
use crate::registry::Generation;
use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

/// Chains longer than this are reported at the cap
pub const DEFAULT_DEPTH_CAP: usize = 20;

/// Hierarchy metadata of one node type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HierarchyAnnotation {
    /// Dynamic `extends` links up to the nearest built-in ancestor
    pub depth: usize,
    /// Relationship definitions with this type as source plus those with it as target
    pub relationship_count: usize,
}

/// Annotations together with the inheritance cycles found on the way
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HierarchyReport {
    pub annotations: BTreeMap<String, HierarchyAnnotation>,
    /// Members of each cycle, sorted
    pub cycles: Vec<Vec<String>>,
}

/// Computes hierarchy annotations over schema definitions
#[derive(Debug, Clone, Copy)]
pub struct HierarchyResolver {
    depth_cap: usize,
}

impl Default for HierarchyResolver {
    fn default() -> Self {
        Self::new(DEFAULT_DEPTH_CAP)
    }
}

impl HierarchyResolver {
    pub fn new(depth_cap: usize) -> Self {
        Self { depth_cap }
    }

    pub fn depth_cap(&self) -> usize {
        self.depth_cap
    }

    /// Annotations for every node type the generation was compiled from
    pub fn compute_hierarchy(&self, generation: &Generation) -> BTreeMap<String, HierarchyAnnotation> {
        self.compute(generation.definitions())
    }

    pub fn compute(&self, definitions: &[SchemaDefinition]) -> BTreeMap<String, HierarchyAnnotation> {
        self.compute_report(definitions).annotations
    }

    /// Annotations plus cycle report
    ///
    /// Walks terminate on a built-in or unknown ancestor, or at the depth cap,
    /// so cyclic and dangling `extends` chains are both safe.
    pub fn compute_report(&self, definitions: &[SchemaDefinition]) -> HierarchyReport {
        let nodes: BTreeMap<&str, &SchemaDefinition> = definitions
            .iter()
            .filter(|d| d.kind == DefinitionKind::Node)
            .map(|d| (d.name.as_str(), d))
            .collect();

        let mut relationship_counts: HashMap<&str, usize> = HashMap::new();
        for endpoints in definitions
            .iter()
            .filter(|d| d.kind == DefinitionKind::Relationship)
            .filter_map(|d| d.endpoints.as_ref())
        {
            *relationship_counts.entry(endpoints.source.as_str()).or_default() += 1;
            *relationship_counts.entry(endpoints.target.as_str()).or_default() += 1;
        }

        let annotations = nodes
            .iter()
            .map(|(name, definition)| {
                let annotation = HierarchyAnnotation {
                    depth: self.depth_of(&nodes, definition),
                    relationship_count: relationship_counts.get(name).copied().unwrap_or(0),
                };
                (name.to_string(), annotation)
            })
            .collect();

        let cycles = find_cycles(&nodes);
        for cycle in &cycles {
            log::warn!("Inheritance cycle between schema types: {}", cycle.join(" -> "));
        }

        HierarchyReport { annotations, cycles }
    }

    fn depth_of<'a>(
        &self,
        nodes: &BTreeMap<&str, &'a SchemaDefinition>,
        definition: &'a SchemaDefinition,
    ) -> usize {
        let mut depth = 0;
        let mut current = definition;
        while depth < self.depth_cap {
            match current
                .extends
                .as_deref()
                .and_then(|parent| nodes.get(parent).copied())
            {
                Some(parent) => {
                    depth += 1;
                    current = parent;
                }
                None => break,
            }
        }
        depth
    }
}

fn find_cycles(nodes: &BTreeMap<&str, &SchemaDefinition>) -> Vec<Vec<String>> {
    let mut graph: DiGraph<&str, ()> = DiGraph::new();
    let indices: HashMap<&str, NodeIndex> = nodes
        .keys()
        .map(|name| (*name, graph.add_node(*name)))
        .collect();

    for (name, definition) in nodes {
        if let Some(parent) = definition.extends.as_deref() {
            if let Some(parent_index) = indices.get(parent) {
                graph.add_edge(indices[name], *parent_index, ());
            }
        }
    }

    let mut cycles: Vec<Vec<String>> = tarjan_scc(&graph)
        .into_iter()
        .filter(|component| {
            component.len() > 1 || graph.contains_edge(component[0], component[0])
        })
        .map(|component| {
            let unique: HashSet<&str> = component.iter().map(|i| graph[*i]).collect();
            let mut members: Vec<String> = unique.into_iter().map(String::from).collect();
            members.sort();
            members
        })
        .collect();
    cycles.sort();
    cycles
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_depth_counts_dynamic_links_only() {
        let definitions = vec![
            SchemaDefinition::node("File").extending("AbstractNode"),
            SchemaDefinition::node("SubFile").extending("File"),
            SchemaDefinition::node("SubSubFile").extending("SubFile"),
            SchemaDefinition::node("Orphan").extending("DoesNotExist"),
            SchemaDefinition::node("Plain"),
        ];

        let annotations = HierarchyResolver::default().compute(&definitions);
        assert_eq!(annotations["File"].depth, 0);
        assert_eq!(annotations["SubFile"].depth, 1);
        assert_eq!(annotations["SubSubFile"].depth, 2);
        assert_eq!(annotations["Orphan"].depth, 0);
        assert_eq!(annotations["Plain"].depth, 0);
    }

    #[test]
    fn test_cycle_is_capped() {
        let definitions = vec![
            SchemaDefinition::node("A").extending("B"),
            SchemaDefinition::node("B").extending("A"),
            SchemaDefinition::node("Self").extending("Self"),
        ];

        let report = HierarchyResolver::default().compute_report(&definitions);
        assert_eq!(report.annotations["A"].depth, DEFAULT_DEPTH_CAP);
        assert_eq!(report.annotations["B"].depth, DEFAULT_DEPTH_CAP);
        assert_eq!(report.annotations["Self"].depth, DEFAULT_DEPTH_CAP);
        assert_eq!(
            report.cycles,
            vec![
                vec!["A".to_string(), "B".to_string()],
                vec!["Self".to_string()]
            ]
        );
    }

    #[test]
    fn test_long_chain_is_capped() {
        let mut definitions = vec![SchemaDefinition::node("T0")];
        for i in 1..30 {
            definitions.push(SchemaDefinition::node(format!("T{}", i)).extending(format!("T{}", i - 1)));
        }

        let annotations = HierarchyResolver::default().compute(&definitions);
        assert_eq!(annotations["T5"].depth, 5);
        assert_eq!(annotations["T20"].depth, 20);
        assert_eq!(annotations["T29"].depth, 20);

        let shallow = HierarchyResolver::new(3).compute(&definitions);
        assert_eq!(shallow["T29"].depth, 3);
    }

    #[test]
    fn test_relationship_count_sums_both_directions() {
        let definitions = vec![
            SchemaDefinition::node("User"),
            SchemaDefinition::node("File"),
            SchemaDefinition::relationship("Owns", "User", "OWNS", "File"),
            SchemaDefinition::relationship("Likes", "User", "LIKES", "File"),
            SchemaDefinition::relationship("Follows", "User", "FOLLOWS", "User"),
        ];

        let annotations = HierarchyResolver::default().compute(&definitions);
        assert_eq!(annotations["User"].relationship_count, 4);
        assert_eq!(annotations["File"].relationship_count, 2);
        assert!(!annotations.contains_key("Owns"));
    }
}
