//! Integration tests for the component and entity indices

use scenedex_foundation::{ComponentType, EntityId};
use scenedex_index::{ComponentIndex, EntityIndex};

const A: ComponentType = ComponentType::from_index(0);
const B: ComponentType = ComponentType::from_index(1);

fn e(i: u64) -> EntityId {
    EntityId::new(i)
}

#[test]
fn entity_insert_remove_round_trip() {
    let mut index = EntityIndex::new();
    index.insert(e(1));
    let before = index.clone();

    index.insert(e(2));
    index.remove(e(2));

    assert_eq!(index, before);
}

#[test]
fn double_add_equals_single_add() {
    let mut once = ComponentIndex::new();
    once.on_add(A, e(1));
    let mut twice = once.clone();
    twice.on_add(A, e(1));

    assert_eq!(once, twice);
}

#[test]
fn any_returns_each_entity_once() {
    let mut index = ComponentIndex::new();
    index.on_add(A, e(1));
    index.on_add(B, e(1));
    index.on_add(B, e(2));

    assert_eq!(index.entities_with_any(&[A, B]), vec![e(1), e(2)]);
}

#[test]
fn all_requires_every_type() {
    let mut index = ComponentIndex::new();
    index.on_add(A, e(1));
    index.on_add(B, e(1));
    index.on_add(A, e(2));

    assert_eq!(index.entities_with_all(&[A, B]), vec![e(1)]);
    assert_eq!(index.entities_with_all(&[A]), vec![e(1), e(2)]);
}

#[test]
fn types_survive_empty_sets() {
    let mut index = ComponentIndex::new();
    index.on_add(A, e(1));
    index.on_remove(A, e(1));

    assert_eq!(index.component_types(), vec![A]);
    assert_eq!(index.count(A), 0);
}
