/// Benchmark for reload latency and reader throughput
///
/// Measures how long a full reload of a chained schema takes, how fast
/// readers resolve types while reloads keep swapping generations, and how
/// long the index sweep trails behind the commit.

use schemalite::{
    EngineConfig, MemoryDefinitionStore, MemoryIndexCatalog, PropertyDeclaration,
    ReloadCoordinator, SchemaDefinition,
};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

const TYPES: usize = 200;
const RELOADS: usize = 50;

fn schema() -> Vec<SchemaDefinition> {
    (0..TYPES)
        .map(|i| {
            let definition = SchemaDefinition::node(format!("Type{}", i))
                .with_property(PropertyDeclaration::new(format!("key{}", i), "String").indexed())
                .with_property(PropertyDeclaration::new(format!("payload{}", i), "Json"));
            // Chains of ten so hierarchy work is not trivial
            if i % 10 == 0 {
                definition
            } else {
                definition.extending(format!("Type{}", i - 1))
            }
        })
        .collect()
}

fn main() {
    println!("=== Reload Throughput Benchmark ===\n");

    let runtime = tokio::runtime::Runtime::new().expect("Failed to create runtime");
    runtime.block_on(async {
        let store = Arc::new(MemoryDefinitionStore::with_definitions(schema()));
        let catalog = Arc::new(MemoryIndexCatalog::new());
        let coordinator =
            ReloadCoordinator::from_config(EngineConfig::in_memory(), store, catalog.clone())
                .expect("Failed to create coordinator");

        println!("📊 First reload ({} types):", TYPES);
        let start = Instant::now();
        let generation = coordinator
            .reload()
            .await
            .generation()
            .cloned()
            .expect("Reload failed");
        let commit_time = start.elapsed();
        coordinator.await_index_sync(generation.sequence()).await;
        let sync_time = start.elapsed();
        println!("  Commit: {:?}", commit_time);
        println!("  Indexes synchronized: {:?} ({} created)", sync_time, catalog.create_count());
        println!();

        println!("📊 Reloads under read load:");
        let stop = Arc::new(AtomicBool::new(false));
        let lookups = Arc::new(AtomicU64::new(0));
        let readers: Vec<_> = (0..4)
            .map(|_| {
                let registry = coordinator.registry().clone();
                let stop = stop.clone();
                let lookups = lookups.clone();
                std::thread::spawn(move || {
                    let mut i = 0usize;
                    while !stop.load(Ordering::Relaxed) {
                        let name = format!("Type{}", i % TYPES);
                        let _ = registry.is_subtype(&name, "Type0");
                        lookups.fetch_add(1, Ordering::Relaxed);
                        i += 1;
                    }
                })
            })
            .collect();

        let start = Instant::now();
        for _ in 0..RELOADS {
            coordinator.reload().await;
        }
        let reload_time = start.elapsed();
        stop.store(true, Ordering::Relaxed);
        for reader in readers {
            let _ = reader.join();
        }

        let reloads_per_sec = RELOADS as f64 / reload_time.as_secs_f64();
        let lookups_per_sec = lookups.load(Ordering::Relaxed) as f64 / reload_time.as_secs_f64();
        println!("  Reloads: {}", RELOADS);
        println!("  Time: {:?}", reload_time);
        println!("  Throughput: {:.0} reloads/sec", reloads_per_sec);
        println!("  Reader lookups: {:.0} lookups/sec", lookups_per_sec);
        println!("  Index DDL after {} reloads: {} calls", RELOADS, catalog.calls().len());
        println!();

        coordinator.shutdown();
    });

    println!("=== Summary ===");
    println!("Readers resolve types against pinned generations while reloads swap them.");
}
