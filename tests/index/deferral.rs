//! Integration tests for out-of-order event handling

use scenedex_foundation::{ComponentType, EntityId};
use scenedex_index::{IndexMaintainer, MaintainerConfig, StaleReason};
use scenedex_storage::{ChangeEvent, SceneStore};

const MESH: ComponentType = ComponentType::from_index(0);

fn e(i: u64) -> EntityId {
    EntityId::new(i)
}

#[test]
fn events_racing_creation_are_replayed_in_order() {
    let mut m = IndexMaintainer::default();
    m.apply(&ChangeEvent::ComponentAdded {
        entity: e(3),
        component: MESH,
    })
    .unwrap();
    m.apply(&ChangeEvent::ComponentRemoved {
        entity: e(3),
        component: MESH,
    })
    .unwrap();
    m.apply(&ChangeEvent::ComponentAdded {
        entity: e(3),
        component: MESH,
    })
    .unwrap();
    assert_eq!(m.deferred_len(), 3);

    m.apply(&ChangeEvent::EntityCreated {
        id: e(3),
        parent: None,
    })
    .unwrap();

    assert_eq!(m.deferred_len(), 0);
    assert_eq!(m.view().list_entities_with_component(MESH), vec![e(3)]);
}

#[test]
fn reparent_waits_for_both_ends() {
    let mut m = IndexMaintainer::default();
    m.apply(&ChangeEvent::ParentChanged {
        id: e(2),
        new_parent: Some(e(1)),
    })
    .unwrap();
    m.apply(&ChangeEvent::EntityCreated {
        id: e(2),
        parent: None,
    })
    .unwrap();
    assert_eq!(m.view().get_parent(e(2)), None);
    assert_eq!(m.deferred_len(), 1);

    m.apply(&ChangeEvent::EntityCreated {
        id: e(1),
        parent: None,
    })
    .unwrap();

    assert_eq!(m.view().get_parent(e(2)), Some(e(1)));
    assert_eq!(m.view().get_root_entities(), vec![e(1)]);
}

#[test]
fn clear_drops_parked_events() {
    let mut m = IndexMaintainer::default();
    m.apply(&ChangeEvent::ComponentAdded {
        entity: e(8),
        component: MESH,
    })
    .unwrap();
    m.apply(&ChangeEvent::EntitiesCleared).unwrap();

    assert_eq!(m.deferred_len(), 0);
}

#[test]
fn overflow_is_reported_as_staleness() {
    let store = SceneStore::default();
    let mut m = IndexMaintainer::new(MaintainerConfig::default().with_max_deferred_events(4));
    for i in 0..10 {
        m.apply(&ChangeEvent::ComponentAdded {
            entity: e(100 + i),
            component: MESH,
        })
        .unwrap();
    }

    let stale = m.check_staleness(&store).unwrap();
    assert_eq!(stale.reason, StaleReason::DeferralOverflow);
    assert!(m.recover_if_stale(&store).is_some());
    assert_eq!(m.deferred_len(), 0);
}

fn reparent(m: &mut IndexMaintainer, id: u64, parent: Option<u64>) {
    m.apply(&ChangeEvent::ParentChanged {
        id: e(id),
        new_parent: parent.map(e),
    })
    .unwrap();
}

fn create(m: &mut IndexMaintainer, id: u64, parent: Option<u64>) {
    m.apply(&ChangeEvent::EntityCreated {
        id: e(id),
        parent: parent.map(e),
    })
    .unwrap();
}

#[test]
fn parked_reparent_superseded_by_later_one() {
    let mut m = IndexMaintainer::default();
    create(&mut m, 2, None);
    reparent(&mut m, 2, Some(1));
    reparent(&mut m, 2, None);
    create(&mut m, 1, None);

    let view = m.view();
    assert_eq!(view.get_parent(e(2)), None);
    assert!(view.get_children(e(1)).is_empty());
    assert_eq!(view.get_root_entities(), vec![e(2), e(1)]);
    assert_eq!(m.deferred_len(), 0);
}

#[test]
fn latest_of_two_parked_reparents_wins() {
    let mut m = IndexMaintainer::default();
    create(&mut m, 2, None);
    reparent(&mut m, 2, Some(1));
    reparent(&mut m, 2, Some(3));
    create(&mut m, 3, None);
    create(&mut m, 1, None);

    assert_eq!(m.view().get_parent(e(2)), Some(e(3)));
    assert!(m.view().get_children(e(1)).is_empty());
}

#[test]
fn parked_reparent_of_uncreated_child_follows_its_creation() {
    let mut m = IndexMaintainer::default();
    create(&mut m, 1, None);
    reparent(&mut m, 2, Some(1));
    create(&mut m, 2, None);

    assert_eq!(m.view().get_parent(e(2)), Some(e(1)));
}
