//! Integration tests for the reference scene store

use std::sync::Arc;

use parking_lot::Mutex;
use scenedex_foundation::{EntityId, ErrorKind};
use scenedex_storage::{
    ChangeBus, ChangeEvent, EventKind, SceneSource, SceneStore, Subscription,
};

// =============================================================================
// Helper Functions
// =============================================================================

/// Records every event emitted on `bus`.
fn record(bus: &ChangeBus) -> (Arc<Mutex<Vec<ChangeEvent>>>, Vec<Subscription>) {
    let log = Arc::new(Mutex::new(Vec::new()));
    let subs = EventKind::ALL
        .into_iter()
        .map(|kind| {
            let sink = Arc::clone(&log);
            bus.on(kind, move |event| sink.lock().push(event.clone()))
        })
        .collect();
    (log, subs)
}

// =============================================================================
// Lifecycle
// =============================================================================

#[test]
fn spawn_announces_creation() {
    let mut store = SceneStore::default();
    let (log, _subs) = record(store.bus());

    let root = store.spawn(None).unwrap();
    let child = store.spawn(Some(root)).unwrap();

    assert_eq!(
        *log.lock(),
        vec![
            ChangeEvent::EntityCreated {
                id: root,
                parent: None
            },
            ChangeEvent::EntityCreated {
                id: child,
                parent: Some(root)
            },
        ]
    );
    assert_eq!(store.children_of(root), vec![child]);
}

#[test]
fn spawn_under_dead_parent_fails() {
    let mut store = SceneStore::default();
    let err = store.spawn(Some(EntityId::new(9))).unwrap_err();
    assert_eq!(err.kind, ErrorKind::UnknownEntity(EntityId::new(9)));
    assert!(store.is_empty());
}

#[test]
fn despawn_promotes_children() {
    let mut store = SceneStore::default();
    let root = store.spawn(None).unwrap();
    let child = store.spawn(Some(root)).unwrap();

    store.despawn(root).unwrap();

    assert!(!store.exists(root));
    assert_eq!(store.parent_of(child), None);
}

#[test]
fn despawn_recursive_announces_leaves_first() {
    let mut store = SceneStore::default();
    let a = store.spawn(None).unwrap();
    let b = store.spawn(Some(a)).unwrap();
    let c = store.spawn(Some(b)).unwrap();
    let d = store.spawn(Some(a)).unwrap();
    let (log, _subs) = record(store.bus());

    let order = store.despawn_recursive(a).unwrap();

    assert_eq!(order, vec![c, b, d, a]);
    let deleted: Vec<_> = log.lock().iter().filter_map(ChangeEvent::subject).collect();
    assert_eq!(deleted, order);
    assert!(store.is_empty());
}

#[test]
fn despawn_subtree_announces_only_the_root() {
    let mut store = SceneStore::default();
    let a = store.spawn(None).unwrap();
    let b = store.spawn(Some(a)).unwrap();
    let c = store.spawn(Some(b)).unwrap();
    let keep = store.spawn(None).unwrap();
    let (log, _subs) = record(store.bus());

    let order = store.despawn_subtree(b).unwrap();

    assert_eq!(order, vec![c, b]);
    assert_eq!(*log.lock(), vec![ChangeEvent::EntityDeleted { id: b }]);
    assert!(store.children_of(a).is_empty());
    assert_eq!(store.iter().collect::<Vec<_>>(), vec![a, keep]);
    assert_eq!(store.live_entity_count(), 2);
}

#[test]
fn clear_restarts_ids_and_keeps_types() {
    let mut store = SceneStore::default();
    let mesh = store.register_component_type("Mesh");
    store.spawn(None).unwrap();
    store.spawn(None).unwrap();

    store.clear();

    assert!(store.is_empty());
    assert_eq!(store.spawn(None).unwrap(), EntityId::new(0));
    assert_eq!(store.component_type("Mesh").unwrap(), mesh);
}

// =============================================================================
// Components
// =============================================================================

#[test]
fn attach_is_idempotent_and_quiet() {
    let mut store = SceneStore::default();
    let mesh = store.register_component_type("Mesh");
    let e = store.spawn(None).unwrap();
    let (log, _subs) = record(store.bus());

    store.attach(e, mesh).unwrap();
    store.attach(e, mesh).unwrap();
    store.detach(e, mesh).unwrap();
    store.detach(e, mesh).unwrap();

    assert_eq!(log.lock().len(), 2);
    assert!(!store.has_component(e, mesh));
}

#[test]
fn attach_requires_registered_type() {
    let mut store = SceneStore::default();
    let e = store.spawn(None).unwrap();
    let bogus = scenedex_foundation::ComponentType::from_index(40);

    let err = store.attach(e, bogus).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::UnknownComponentType(_)));
}

#[test]
fn registering_twice_announces_once() {
    let mut store = SceneStore::default();
    let (log, _subs) = record(store.bus());

    let first = store.register_component_type("Light");
    let second = store.register_component_type("Light");

    assert_eq!(first, second);
    assert_eq!(log.lock().len(), 1);
}

// =============================================================================
// Hierarchy
// =============================================================================

#[test]
fn set_parent_rejects_cycles() {
    let mut store = SceneStore::default();
    let a = store.spawn(None).unwrap();
    let b = store.spawn(Some(a)).unwrap();

    let err = store.set_parent(a, Some(b)).unwrap_err();
    assert!(err.is_cycle());
    assert!(store.set_parent(a, Some(a)).unwrap_err().is_cycle());
    assert_eq!(store.parent_of(b), Some(a));
}

#[test]
fn set_same_parent_is_quiet() {
    let mut store = SceneStore::default();
    let a = store.spawn(None).unwrap();
    let b = store.spawn(Some(a)).unwrap();
    let (log, _subs) = record(store.bus());

    store.set_parent(b, Some(a)).unwrap();
    assert!(log.lock().is_empty());
}

// =============================================================================
// Muting & Source
// =============================================================================

#[test]
fn muted_store_mutates_silently() {
    let mut store = SceneStore::default();
    let (log, _subs) = record(store.bus());

    store.set_muted(true);
    store.spawn(None).unwrap();
    store.set_muted(false);

    assert!(log.lock().is_empty());
    assert_eq!(store.live_entity_count(), 1);
}

#[test]
fn source_reports_full_records() {
    let mut store = SceneStore::default();
    let mesh = store.register_component_type("Mesh");
    let root = store.spawn(None).unwrap();
    let child = store.spawn(Some(root)).unwrap();
    store.attach(child, mesh).unwrap();

    let entities = store.entities();

    assert_eq!(entities.len(), 2);
    assert_eq!(entities[0].children, vec![child]);
    assert_eq!(entities[1].parent, Some(root));
    assert_eq!(entities[1].components, vec![mesh]);
    assert_eq!(store.component_types(), vec![mesh]);
}
