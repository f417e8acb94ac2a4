//! Integration tests for persistent collections

use proptest::prelude::*;
use scenedex_foundation::OrderedSet;

#[test]
fn ordered_set_keeps_first_insertion_position() {
    let mut set = OrderedSet::new();
    set.insert("a");
    set.insert("b");
    set.insert("a");

    assert_eq!(set.to_vec(), vec!["a", "b"]);
}

#[test]
fn ordered_set_clones_are_independent() {
    let mut original: OrderedSet<u32> = (0..100).collect();
    let snapshot = original.clone();

    original.remove(&50);
    original.insert(500);

    assert_eq!(snapshot.len(), 100);
    assert!(snapshot.contains(&50));
    assert!(!snapshot.contains(&500));
}

#[test]
fn ordered_set_first_follows_removals() {
    let mut set: OrderedSet<u32> = [4, 5, 6].into_iter().collect();
    set.remove(&4);
    assert_eq!(set.first(), Some(&5));
}

proptest! {
    #[test]
    fn ordered_set_matches_vec_model(ops in prop::collection::vec((any::<bool>(), 0u8..16), 0..80)) {
        let mut set = OrderedSet::new();
        let mut model: Vec<u8> = Vec::new();

        for (insert, value) in ops {
            if insert {
                if !model.contains(&value) {
                    model.push(value);
                }
                set.insert(value);
            } else {
                model.retain(|v| *v != value);
                set.remove(&value);
            }
        }

        prop_assert_eq!(set.to_vec(), model);
    }
}
