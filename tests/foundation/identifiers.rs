//! Integration tests for entity identifiers and component type tokens

use std::collections::HashSet;

use scenedex_foundation::{ComponentRegistry, EntityId, ErrorKind};

// =============================================================================
// EntityId
// =============================================================================

#[test]
fn entity_ids_compare_by_index() {
    assert_eq!(EntityId::new(3), EntityId::from(3));
    assert!(EntityId::new(1) < EntityId::new(2));
}

#[test]
fn entity_ids_work_as_set_keys() {
    let ids: HashSet<_> = [1, 2, 2, 3].into_iter().map(EntityId::new).collect();
    assert_eq!(ids.len(), 3);
}

#[test]
fn entity_display() {
    assert_eq!(EntityId::new(12).to_string(), "Entity(12)");
}

// =============================================================================
// ComponentRegistry
// =============================================================================

#[test]
fn registry_interns_names() {
    let mut registry = ComponentRegistry::new();
    let camera = registry.register("Camera");
    let light = registry.register("Light");

    assert_ne!(camera, light);
    assert_eq!(registry.register("Camera"), camera);
    assert_eq!(registry.len(), 2);
    assert_eq!(registry.name(light), Some("Light"));
}

#[test]
fn registry_resolves_only_registered_names() {
    let mut registry = ComponentRegistry::new();
    registry.register("Mesh");

    assert!(registry.resolve("Mesh").is_ok());
    let err = registry.resolve("Skybox").unwrap_err();
    assert_eq!(err.kind, ErrorKind::UnknownComponentType("Skybox".to_string()));
    assert_eq!(registry.lookup("Skybox"), None);
}

#[test]
fn registry_strict_registration() {
    let mut registry = ComponentRegistry::new();
    registry.register_new("Mesh").unwrap();

    let err = registry.register_new("Mesh").unwrap_err();
    assert!(matches!(err.kind, ErrorKind::DuplicateComponentType(_)));
}

#[test]
fn registry_lists_types_in_registration_order() {
    let mut registry = ComponentRegistry::new();
    let names = ["Transform", "Mesh", "Camera"];
    let tokens: Vec<_> = names.iter().map(|n| registry.register(n)).collect();

    assert_eq!(registry.types().collect::<Vec<_>>(), tokens);
}
