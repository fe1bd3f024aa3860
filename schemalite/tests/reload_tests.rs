//! Reload lifecycle tests: commit, rejection, storage failure, testing mode

#[path = "testutils/mod.rs"]
mod testutils;

use schemalite::compiler::CompileError;
use schemalite::emit::DefinitionError;
use schemalite::{
    DefinitionKind, EngineConfig, PropertyDeclaration, ReloadError, ReloadOutcome,
    SchemaDefinition,
};
use std::sync::Arc;
use testutils::definitions::{file, folder, folder_contains_file, indexed_file, sub_file};
use testutils::engine_fixture::EngineFixture;

#[tokio::test]
async fn test_subtype_added_in_second_generation() {
    let fixture = EngineFixture::new();
    fixture.define([file()]);

    let g1 = fixture.reload_ok().await;
    assert_eq!(g1.sequence(), 1);
    let file_type = g1.get_type("File").expect("File compiled");
    assert_eq!(file_type.properties().len(), 1);
    assert_eq!(file_type.qualified_name(), "schemalite.dynamic.File");

    fixture.define([sub_file()]);
    let g2 = fixture.reload_ok().await;
    assert_eq!(g2.sequence(), 2);

    let sub = g2.get_type("SubFile").expect("SubFile compiled");
    let names: Vec<&str> = sub.property_names().collect();
    assert_eq!(names, vec!["name", "tag"]);
    assert_eq!(sub.property("name").unwrap().declaring_type, "File");
    assert_eq!(sub.ancestors(), ["File".to_string()]);

    let annotation = fixture.store.annotation("SubFile").expect("annotation written");
    assert_eq!(annotation.depth, 1);
    assert_eq!(fixture.store.annotation("File").unwrap().depth, 0);

    // Generation 1 is untouched by the second reload
    assert!(g1.get_type("SubFile").is_none());
    assert!(fixture.coordinator.registry().is_subtype("SubFile", "File"));
}

#[tokio::test]
async fn test_malformed_definition_rejects_whole_batch() {
    let fixture = EngineFixture::new();
    fixture.define([file()]);
    let g1 = fixture.reload_ok().await;

    fixture.define([
        folder(),
        SchemaDefinition::node("Broken")
            .with_property(PropertyDeclaration::new("status", "Enum(open, ")),
    ]);

    let outcome = fixture.coordinator.reload().await;
    let error = match outcome {
        ReloadOutcome::Failed(error) => error,
        other => panic!("Expected failure, got {:?}", other),
    };
    let errors = error.compile_errors().expect("compile errors");
    assert!(errors.iter().any(|e| matches!(
        e,
        CompileError::Definition(DefinitionError::MalformedPropertyType { type_name, .. })
            if type_name == "Broken"
    )));

    let current = fixture.coordinator.current_generation();
    assert!(Arc::ptr_eq(&current, &g1));
    assert!(current.get_type("Folder").is_none());
    assert_eq!(current.type_names().collect::<Vec<_>>(), vec!["File"]);
}

#[tokio::test]
async fn test_all_errors_of_a_batch_are_reported() {
    let fixture = EngineFixture::new();
    fixture.define([
        SchemaDefinition::node("Orphan").extending("Missing"),
        SchemaDefinition::node("Dangling")
            .with_property(PropertyDeclaration::new("owner", "Ref(Nobody)")),
    ]);

    let outcome = fixture.coordinator.reload().await;
    let errors = outcome
        .error()
        .and_then(ReloadError::compile_errors)
        .expect("compile errors")
        .clone();

    assert_eq!(errors.len(), 2);
    assert!(errors
        .iter()
        .any(|e| matches!(e, CompileError::UnresolvedParent { parent, .. } if parent == "Missing")));
    assert!(errors
        .iter()
        .any(|e| matches!(e, CompileError::UnresolvedReference { target, .. } if target == "Nobody")));
    assert_eq!(fixture.coordinator.current_generation().sequence(), 0);
}

#[tokio::test]
async fn test_storage_failure_keeps_previous_generation() {
    let fixture = EngineFixture::new();
    fixture.define([indexed_file()]);
    let g1 = fixture.reload_and_sync().await;
    let ddl_before = fixture.catalog.calls().len();

    fixture.define([folder()]);
    fixture.store.set_unavailable(true);

    let outcome = fixture.coordinator.reload().await;
    assert!(matches!(
        outcome.error(),
        Some(ReloadError::StorageUnavailable(_))
    ));
    assert!(Arc::ptr_eq(&fixture.coordinator.current_generation(), &g1));
    assert_eq!(fixture.coordinator.synchronizer().sweep_count(), 1);
    assert_eq!(fixture.catalog.calls().len(), ddl_before);

    fixture.store.set_unavailable(false);
    let g2 = fixture.reload_ok().await;
    assert_eq!(g2.sequence(), 2);
    assert!(g2.contains_type("Folder"));
}

#[tokio::test]
async fn test_testing_mode_skips_hierarchy_and_indexes() {
    let fixture = EngineFixture::testing();
    fixture.define([indexed_file(), sub_file()]);

    let generation = fixture.reload_ok().await;
    assert_eq!(generation.len(), 2);
    assert!(fixture.coordinator.await_index_sync(generation.sequence()).await);

    assert!(fixture.store.annotation("SubFile").is_none());
    assert!(fixture.catalog.calls().is_empty());
    assert_eq!(fixture.coordinator.synchronizer().sweep_count(), 0);
}

#[tokio::test]
async fn test_builtin_override_is_ensured_and_resolved() {
    let fixture = EngineFixture::testing();
    fixture
        .coordinator
        .register_builtin_override("User", "Principal");
    fixture.define([SchemaDefinition::node("Admin")
        .extending("User")
        .with_property(PropertyDeclaration::new("level", "Integer"))]);

    let generation = fixture.reload_ok().await;

    let stored = fixture
        .store
        .definition(DefinitionKind::Node, "User")
        .expect("override created");
    assert!(stored.builtin);

    let user = generation.get_type("User").unwrap();
    assert!(user.is_builtin());
    assert_eq!(user.builtin_base(), Some("Principal"));

    let admin = generation.get_type("Admin").unwrap();
    assert_eq!(admin.builtin_base(), Some("Principal"));
    assert_eq!(admin.ancestors(), ["User".to_string()]);
}

#[tokio::test]
async fn test_views_and_relationships_follow_the_generation() {
    let fixture = EngineFixture::testing();
    let mut views = fixture.coordinator.registry().subscribe_views();
    fixture.define([indexed_file(), folder(), folder_contains_file()]);

    fixture.reload_ok().await;
    assert!(views.has_changed().unwrap());
    assert!(views.borrow_and_update().contains("public"));

    let templates = fixture
        .coordinator
        .registry()
        .relationships_between("Folder", "File");
    assert_eq!(templates.len(), 1);
    assert_eq!(templates[0].name(), "FolderContainsFile");

    fixture
        .store
        .remove(DefinitionKind::Relationship, "FolderContainsFile");
    fixture.reload_ok().await;
    assert!(fixture
        .coordinator
        .registry()
        .relationships_between("Folder", "File")
        .is_empty());
}

#[tokio::test]
async fn test_from_config_binds_to_ambient_runtime() {
    let store = Arc::new(schemalite::MemoryDefinitionStore::with_definitions([file()]));
    let catalog = Arc::new(schemalite::MemoryIndexCatalog::new());

    let coordinator =
        schemalite::ReloadCoordinator::from_config(EngineConfig::testing(), store, catalog)
            .expect("coordinator");
    let outcome = coordinator.reload().await;
    assert!(outcome.is_committed());
}

#[test]
fn test_from_config_requires_ledger_path_for_sled() {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let _guard = runtime.enter();

    let result = schemalite::ReloadCoordinator::from_config(
        EngineConfig::default(),
        Arc::new(schemalite::MemoryDefinitionStore::new()),
        Arc::new(schemalite::MemoryIndexCatalog::new()),
    );
    assert!(matches!(result, Err(ReloadError::Settings(_))));
}
