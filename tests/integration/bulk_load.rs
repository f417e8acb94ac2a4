//! Bulk scene loads: buffering, out-of-order arrival, terminal rebuild

use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;

use scenedex_foundation::{ComponentType, EntityId};
use scenedex_index::{IndexMaintainer, MaintainerConfig};
use scenedex_storage::{ChangeEvent, SceneStore};

const TRANSFORM: ComponentType = ComponentType::from_index(0);

/// Events for `count` entities in chains of four, each with a transform.
fn load_events(count: u64) -> Vec<ChangeEvent> {
    let mut events = Vec::new();
    for i in 0..count {
        let id = EntityId::new(i);
        let parent = (i % 4 != 0).then(|| EntityId::new(i - 1));
        events.push(ChangeEvent::EntityCreated { id, parent });
        events.push(ChangeEvent::ComponentAdded {
            entity: id,
            component: TRANSFORM,
        });
    }
    events
}

#[test]
fn ten_thousand_entity_load() {
    let mut store = SceneStore::default();
    let mut m = IndexMaintainer::default();
    m.attach(store.bus());

    m.begin_bulk_load();
    for _ in 0..10_000 {
        store.spawn(None).unwrap();
    }
    assert!(m.end_bulk_load(&store).is_none());

    assert_eq!(m.facade(&store).list_all_entities().len(), 10_000);
}

#[test]
fn shuffled_load_converges_to_in_order_result() {
    let events = load_events(2_000);
    let mut in_order = IndexMaintainer::default();
    for event in &events {
        in_order.apply(event).unwrap();
    }

    let mut shuffled = events.clone();
    shuffled.shuffle(&mut ChaCha8Rng::seed_from_u64(7));
    let mut out_of_order = IndexMaintainer::default();
    for event in &shuffled {
        out_of_order.apply(event).unwrap();
    }

    assert_eq!(out_of_order.deferred_len(), 0);
    let (a, b) = (in_order.view(), out_of_order.view());
    assert_eq!(a.entity_count(), b.entity_count());
    assert_eq!(a.get_component_count(TRANSFORM), b.get_component_count(TRANSFORM));
    for i in 0..2_000 {
        let id = EntityId::new(i);
        assert_eq!(a.get_parent(id), b.get_parent(id), "parent of {id}");
        assert_eq!(a.get_depth(id), b.get_depth(id));
    }
    assert!(out_of_order.indices().validate().is_ok());
}

#[test]
fn terminal_rebuild_serves_last_state_mid_load() {
    let mut store = SceneStore::default();
    let mut m = IndexMaintainer::new(MaintainerConfig::strict());
    m.attach(store.bus());
    let existing = store.spawn(None).unwrap();

    m.begin_bulk_load();
    assert!(m.is_loading());
    for _ in 0..100 {
        store.spawn(Some(existing)).unwrap();
    }
    assert_eq!(m.facade(&store).list_all_entities(), vec![existing]);
    assert!(m.check_staleness(&store).is_none());

    let report = m.end_bulk_load(&store).unwrap();
    assert_eq!(report.entities, 101);
    assert_eq!(report.links, 100);
    assert_eq!(m.view().get_children(existing).len(), 100);
}

#[test]
fn loader_bypassing_bus_is_caught_by_probe() {
    let mut store = SceneStore::default();
    let mut m = IndexMaintainer::default();
    m.attach(store.bus());

    store.set_muted(true);
    for _ in 0..50 {
        store.spawn(None).unwrap();
    }
    store.set_muted(false);

    let mut facade = m.facade(&store);
    assert_eq!(facade.entity_count(), 0);
    let report = facade.recover_if_stale().unwrap();
    assert_eq!(report.entities, 50);
    assert_eq!(facade.entity_count(), 50);
}
