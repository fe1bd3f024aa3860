//! Single-flight reloads and atomic generation visibility
//!
//! These run on the multi-threaded runtime so callers genuinely overlap.

#[path = "testutils/mod.rs"]
mod testutils;

use schemalite::{PropertyDeclaration, ReloadOutcome, SchemaDefinition};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use testutils::definitions::{file, sub_file};
use testutils::engine_fixture::EngineFixture;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_reloads_compile_once() {
    let fixture = EngineFixture::testing();
    fixture.define([file(), sub_file()]);
    fixture.store.set_load_delay(Some(Duration::from_millis(100)));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let coordinator = fixture.coordinator.clone();
            tokio::spawn(async move { coordinator.reload().await })
        })
        .collect();

    let mut committed = 0;
    let mut joined = 0;
    for handle in handles {
        match handle.await.unwrap() {
            ReloadOutcome::Committed(generation) => {
                committed += 1;
                assert_eq!(generation.sequence(), 1);
            }
            ReloadOutcome::Joined(Ok(generation)) => {
                joined += 1;
                assert_eq!(generation.sequence(), 1);
            }
            other => panic!("Unexpected outcome {:?}", other),
        }
    }

    assert_eq!(committed, 1);
    assert_eq!(joined, 7);
    assert_eq!(fixture.coordinator.compiler().invocation_count(), 1);
    assert_eq!(fixture.store.load_count(), 1);
    assert_eq!(fixture.coordinator.current_generation().sequence(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_try_reload_reports_in_progress() {
    let fixture = EngineFixture::testing();
    fixture.define([file()]);
    fixture.store.set_load_delay(Some(Duration::from_millis(200)));

    let first = {
        let coordinator = fixture.coordinator.clone();
        tokio::spawn(async move { coordinator.reload().await })
    };
    while !fixture.coordinator.is_reloading() {
        tokio::task::yield_now().await;
    }

    let second = fixture.coordinator.try_reload().await;
    assert!(matches!(second, ReloadOutcome::AlreadyInProgress));
    assert!(second.into_result().is_none());

    assert!(first.await.unwrap().is_committed());
    assert_eq!(fixture.coordinator.compiler().invocation_count(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_joiners_observe_failure() {
    let fixture = EngineFixture::testing();
    fixture.define([SchemaDefinition::node("Orphan").extending("Missing")]);
    fixture.store.set_load_delay(Some(Duration::from_millis(100)));

    let first = {
        let coordinator = fixture.coordinator.clone();
        tokio::spawn(async move { coordinator.reload().await })
    };
    while !fixture.coordinator.is_reloading() {
        tokio::task::yield_now().await;
    }

    let joined = fixture.coordinator.reload().await;
    assert!(matches!(joined, ReloadOutcome::Joined(Err(_))));
    assert!(matches!(first.await.unwrap(), ReloadOutcome::Failed(_)));
}

#[tokio::test]
async fn test_dropped_caller_does_not_cancel_reload() {
    let fixture = EngineFixture::testing();
    fixture.define([file()]);
    fixture.store.set_load_delay(Some(Duration::from_millis(50)));

    let abandoned = tokio::time::timeout(Duration::from_millis(1), fixture.coordinator.reload()).await;
    assert!(abandoned.is_err());

    // The abandoned run still commits; this call joins it or starts after it
    let outcome = fixture.coordinator.reload().await;
    assert!(outcome.is_committed());
    assert_eq!(fixture.coordinator.current_generation().sequence(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_readers_never_see_partial_generation() {
    let fixture = EngineFixture::testing();
    let batch = |tag: usize| -> Vec<SchemaDefinition> {
        (0..5)
            .map(|i| {
                SchemaDefinition::node(format!("Type{}", i))
                    .with_property(PropertyDeclaration::new(format!("round{}", tag), "String"))
            })
            .collect()
    };

    let stop = Arc::new(AtomicBool::new(false));
    let readers: Vec<_> = (0..3)
        .map(|_| {
            let registry = fixture.coordinator.registry().clone();
            let stop = stop.clone();
            std::thread::spawn(move || {
                let mut observed = 0usize;
                while !stop.load(Ordering::Relaxed) {
                    let generation = registry.current_generation();
                    if generation.is_empty() {
                        continue;
                    }
                    // Every type of one generation carries the same round's property
                    let rounds: std::collections::BTreeSet<String> = generation
                        .types()
                        .values()
                        .map(|t| t.properties()[0].name.clone())
                        .collect();
                    assert_eq!(generation.len(), 5);
                    assert_eq!(rounds.len(), 1, "mixed generation {}", generation.sequence());
                    observed += 1;
                }
                observed
            })
        })
        .collect();

    for round in 0..20 {
        fixture.define(batch(round));
        fixture.reload_ok().await;
    }
    stop.store(true, Ordering::Relaxed);

    for reader in readers {
        reader.join().expect("reader panicked");
    }
    assert_eq!(fixture.coordinator.current_generation().sequence(), 20);
}
