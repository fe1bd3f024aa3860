// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Caches derived from the current generation
//!
//! Entries are keyed by generation sequence and only accepted for the sequence
//! the caches were last invalidated for. An answer computed against a replaced
//! generation is returned to its caller but never stored.

use crate::compiler::CompiledType;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

type InheritanceKey = (u64, String, String);
type TemplateKey = (u64, String, String);

/// Entry counts, for diagnostics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub inheritance_entries: usize,
    pub relationship_template_entries: usize,
}

/// Inheritance-path and relationship-template caches
#[derive(Debug, Default)]
pub struct DerivedCaches {
    current: AtomicU64,
    inheritance: RwLock<HashMap<InheritanceKey, bool>>,
    relationship_templates: RwLock<HashMap<TemplateKey, Arc<Vec<Arc<CompiledType>>>>>,
}

impl DerivedCaches {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer whether `child` inherits from `ancestor`
    ///
    /// `known` says whether `child` is a type of generation `sequence`; answers
    /// about unknown names are computed every time.
    pub fn inheritance(
        &self,
        sequence: u64,
        child: &str,
        ancestor: &str,
        known: bool,
        compute: impl FnOnce() -> bool,
    ) -> bool {
        let key = (sequence, child.to_string(), ancestor.to_string());
        if let Some(hit) = self.inheritance.read().get(&key) {
            return *hit;
        }
        let value = compute();
        if known {
            let mut entries = self.inheritance.write();
            if self.accepts(sequence) {
                entries.insert(key, value);
            }
        }
        value
    }

    /// Relationship types connecting `source` to `target`
    ///
    /// Only cached when `known` says `source` is a type of generation `sequence`.
    pub fn relationship_templates(
        &self,
        sequence: u64,
        source: &str,
        target: &str,
        known: bool,
        compute: impl FnOnce() -> Vec<Arc<CompiledType>>,
    ) -> Arc<Vec<Arc<CompiledType>>> {
        let key = (sequence, source.to_string(), target.to_string());
        if let Some(hit) = self.relationship_templates.read().get(&key) {
            return hit.clone();
        }
        let value = Arc::new(compute());
        if known {
            let mut entries = self.relationship_templates.write();
            if self.accepts(sequence) {
                entries.insert(key, value.clone());
            }
        }
        value
    }

    /// Drop every cached answer and accept new entries only for `sequence`
    pub fn invalidate(&self, sequence: u64) {
        // Advance before clearing; inserts check under the map lock
        self.current.store(sequence, Ordering::SeqCst);
        self.inheritance.write().clear();
        self.relationship_templates.write().clear();
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            inheritance_entries: self.inheritance.read().len(),
            relationship_template_entries: self.relationship_templates.read().len(),
        }
    }

    fn accepts(&self, sequence: u64) -> bool {
        self.current.load(Ordering::SeqCst) == sequence
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inheritance_is_memoised_per_sequence() {
        let caches = DerivedCaches::new();
        caches.invalidate(1);
        assert!(caches.inheritance(1, "SubFile", "File", true, || true));
        // Served from cache, compute not called
        assert!(caches.inheritance(1, "SubFile", "File", true, || unreachable!()));

        caches.invalidate(2);
        assert_eq!(caches.stats(), CacheStats::default());
        assert!(!caches.inheritance(2, "SubFile", "File", true, || false));
        assert_eq!(caches.stats().inheritance_entries, 1);
    }

    #[test]
    fn test_replaced_sequence_is_not_stored() {
        let caches = DerivedCaches::new();
        caches.invalidate(3);

        // A reader still holding generation 2 gets its answer, uncached
        assert!(caches.inheritance(2, "SubFile", "File", true, || true));
        let templates = caches.relationship_templates(2, "Folder", "File", true, Vec::new);
        assert!(templates.is_empty());
        assert_eq!(caches.stats(), CacheStats::default());
    }

    #[test]
    fn test_unknown_names_are_not_stored() {
        let caches = DerivedCaches::new();
        caches.invalidate(1);

        for i in 0..50 {
            let name = format!("Missing{}", i);
            assert!(!caches.inheritance(1, &name, "File", false, || false));
            caches.relationship_templates(1, &name, "File", false, Vec::new);
        }
        assert_eq!(caches.stats(), CacheStats::default());
    }
}
