// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Swappable registry of the current generation

use super::cache::{CacheStats, DerivedCaches};
use super::generation::Generation;
use crate::compiler::CompiledType;
use crate::definition::DefinitionKind;
use arc_swap::ArcSwap;
use std::collections::BTreeSet;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::watch;

/// Errors raised when publishing a generation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Generation {attempted} is not newer than current generation {current}")]
    StaleGeneration { current: u64, attempted: u64 },

    #[error("Another commit replaced generation {expected} concurrently")]
    ConcurrentCommit { expected: u64 },
}

/// Process-wide mapping from type name to compiled type
///
/// Shared through an explicit `Arc<TypeRegistry>` handle. Reads are wait-free
/// loads of the generation pointer; `commit` is linearizable.
pub struct TypeRegistry {
    current: ArcSwap<Generation>,
    caches: DerivedCaches,
    views: watch::Sender<Arc<BTreeSet<String>>>,
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeRegistry {
    /// Create a registry whose current generation is empty
    pub fn new() -> Self {
        let (views, _) = watch::channel(Arc::new(BTreeSet::new()));
        Self {
            current: ArcSwap::from_pointee(Generation::empty()),
            caches: DerivedCaches::new(),
            views,
        }
    }

    /// The complete current generation
    pub fn current_generation(&self) -> Arc<Generation> {
        self.current.load_full()
    }

    /// Publish `generation` as the current one
    ///
    /// Derived caches are invalidated and view subscribers are notified when
    /// the set of dynamic view names changed. Older generations stay alive for
    /// as long as some reader holds them.
    ///
    /// # Returns
    /// * `Ok(previous)` - the generation that was replaced
    /// * `Err(RegistryError)` - the generation is not newer than the current one
    pub fn commit(&self, generation: Generation) -> Result<Arc<Generation>, RegistryError> {
        let expected = self.current.load_full();
        if generation.sequence() <= expected.sequence() {
            return Err(RegistryError::StaleGeneration {
                current: expected.sequence(),
                attempted: generation.sequence(),
            });
        }

        let next = Arc::new(generation);
        let previous = self.current.compare_and_swap(&expected, next.clone());
        if !Arc::ptr_eq(&*previous, &expected) {
            return Err(RegistryError::ConcurrentCommit {
                expected: expected.sequence(),
            });
        }

        self.invalidate_caches();
        self.publish_views(next.dynamic_views());

        log::info!(
            "Committed schema generation {} ({} types, previous {})",
            next.sequence(),
            next.len(),
            expected.sequence()
        );
        Ok(expected)
    }

    /// Clear every cache derived from an earlier generation
    pub fn invalidate_caches(&self) {
        self.caches.invalidate(self.current.load().sequence());
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.caches.stats()
    }

    /// Receiver of the current dynamic view names, updated on change
    pub fn subscribe_views(&self) -> watch::Receiver<Arc<BTreeSet<String>>> {
        self.views.subscribe()
    }

    pub fn get_type(&self, name: &str) -> Option<Arc<CompiledType>> {
        self.current.load().get_type(name).cloned()
    }

    /// Whether `child` is `ancestor` or inherits from it, in the current generation
    pub fn is_subtype(&self, child: &str, ancestor: &str) -> bool {
        let generation = self.current.load_full();
        let known = generation.contains_type(child);
        self.caches
            .inheritance(generation.sequence(), child, ancestor, known, || {
                generation
                    .get_type(child)
                    .map_or(false, |compiled| compiled.extends(ancestor))
            })
    }

    /// Relationship types that may connect `source` to `target`
    ///
    /// Endpoints match when the node type is the declared endpoint or one of
    /// its subtypes.
    pub fn relationships_between(&self, source: &str, target: &str) -> Arc<Vec<Arc<CompiledType>>> {
        let generation = self.current.load_full();
        let sequence = generation.sequence();
        let known = generation.contains_type(source);
        self.caches
            .relationship_templates(sequence, source, target, known, || {
                let matches = |node: &str, endpoint: &str| {
                    generation
                        .get_type(node)
                        .map_or(node == endpoint, |compiled| compiled.extends(endpoint))
                };
                generation
                    .types_of_kind(DefinitionKind::Relationship)
                    .filter(|rel| {
                        rel.endpoints().map_or(false, |e| {
                            matches(source, &e.source) && matches(target, &e.target)
                        })
                    })
                    .cloned()
                    .collect()
            })
    }

    fn publish_views(&self, views: &BTreeSet<String>) {
        let changed = self.views.send_if_modified(|current| {
            if **current == *views {
                false
            } else {
                *current = Arc::new(views.clone());
                true
            }
        });
        if changed {
            log::debug!("Dynamic views changed: {:?}", views);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::TypeCompiler;
    use crate::definition::SchemaDefinition;
    use crate::emit::TypeSourceEmitter;
    use std::collections::BTreeMap;

    fn generation(sequence: u64, definitions: Vec<SchemaDefinition>) -> Generation {
        let emitter = TypeSourceEmitter::new();
        let mut views = BTreeSet::new();
        let units = definitions
            .iter()
            .flat_map(|d| {
                views.extend(d.view_names().map(String::from));
                emitter.emit(d).unwrap().into_units()
            })
            .collect();
        let types = TypeCompiler::new("test").compile(units).unwrap();
        Generation::new(sequence, types, views, definitions)
    }

    fn file_schema() -> Vec<SchemaDefinition> {
        vec![
            SchemaDefinition::node("Folder"),
            SchemaDefinition::node("File"),
            SchemaDefinition::node("Image").extending("File"),
            SchemaDefinition::relationship("FolderFile", "Folder", "CONTAINS", "File"),
        ]
    }

    #[test]
    fn test_commit_swaps_and_returns_previous() {
        let registry = TypeRegistry::new();
        let previous = registry.commit(generation(1, file_schema())).unwrap();
        assert_eq!(previous.sequence(), 0);
        assert_eq!(registry.current_generation().sequence(), 1);
        assert!(registry.get_type("Image").is_some());
    }

    #[test]
    fn test_stale_commit_is_rejected() {
        let registry = TypeRegistry::new();
        registry.commit(generation(2, Vec::new())).unwrap();
        let err = registry.commit(generation(1, Vec::new())).unwrap_err();
        assert_eq!(
            err,
            RegistryError::StaleGeneration {
                current: 2,
                attempted: 1
            }
        );
    }

    #[test]
    fn test_readers_keep_their_generation() {
        let registry = TypeRegistry::new();
        registry.commit(generation(1, file_schema())).unwrap();
        let pinned = registry.current_generation();

        registry.commit(generation(2, Vec::new())).unwrap();
        assert!(pinned.get_type("File").is_some());
        assert!(registry.get_type("File").is_none());
    }

    #[test]
    fn test_subtype_and_relationship_lookups() {
        let registry = TypeRegistry::new();
        registry.commit(generation(1, file_schema())).unwrap();

        assert!(registry.is_subtype("Image", "File"));
        assert!(!registry.is_subtype("File", "Image"));

        let rels = registry.relationships_between("Folder", "Image");
        assert_eq!(rels.len(), 1);
        assert_eq!(rels[0].name(), "FolderFile");
        assert!(registry.relationships_between("File", "Folder").is_empty());
        assert_eq!(registry.cache_stats().relationship_template_entries, 2);
    }

    #[test]
    fn test_commit_invalidates_derived_caches() {
        let registry = TypeRegistry::new();
        registry.commit(generation(1, file_schema())).unwrap();
        assert!(registry.is_subtype("Image", "File"));
        assert_eq!(registry.cache_stats().inheritance_entries, 1);

        registry
            .commit(generation(
                2,
                vec![SchemaDefinition::node("File"), SchemaDefinition::node("Image")],
            ))
            .unwrap();
        assert_eq!(registry.cache_stats(), CacheStats::default());
        assert!(!registry.is_subtype("Image", "File"));
    }

    #[test]
    fn test_unknown_names_are_answered_but_not_cached() {
        let registry = TypeRegistry::new();
        registry.commit(generation(1, file_schema())).unwrap();

        assert!(!registry.is_subtype("Ghost", "File"));
        assert!(registry.relationships_between("Ghost", "File").is_empty());
        assert_eq!(registry.cache_stats(), CacheStats::default());

        assert!(registry.is_subtype("Image", "File"));
        assert_eq!(registry.cache_stats().inheritance_entries, 1);
    }

    #[test]
    fn test_view_subscribers_see_changes() {
        let registry = TypeRegistry::new();
        let mut views = registry.subscribe_views();
        assert!(!views.has_changed().unwrap());

        registry
            .commit(generation(
                1,
                vec![SchemaDefinition::node("File").with_view("public", &["id"])],
            ))
            .unwrap();
        assert!(views.has_changed().unwrap());
        assert!(views.borrow_and_update().contains("public"));

        registry
            .commit(generation(
                2,
                vec![SchemaDefinition::node("Doc").with_view("public", &["id"])],
            ))
            .unwrap();
        assert!(!views.has_changed().unwrap());
    }

    #[test]
    fn test_concurrent_readers_see_whole_generations() {
        let registry = Arc::new(TypeRegistry::new());
        let batch: Vec<String> = (0..20).map(|i| format!("T{}", i)).collect();

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let registry = registry.clone();
                std::thread::spawn(move || {
                    for _ in 0..500 {
                        let current = registry.current_generation();
                        let count = current.len();
                        assert!(count == 0 || count == 20, "partial generation: {}", count);
                    }
                })
            })
            .collect();

        for sequence in 1..=50 {
            let types: BTreeMap<_, _> = generation(
                sequence,
                batch.iter().map(|n| SchemaDefinition::node(n.as_str())).collect(),
            )
            .types()
            .clone();
            registry
                .commit(Generation::new(sequence, types, BTreeSet::new(), Vec::new()))
                .unwrap();
        }

        for reader in readers {
            reader.join().unwrap();
        }
    }
}
