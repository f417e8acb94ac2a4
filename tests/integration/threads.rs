//! Publishing snapshots to reader threads

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use scenedex_index::{IndexMaintainer, IndexPublisher};
use scenedex_storage::SceneStore;

#[test]
fn readers_never_see_partial_state() {
    let mut store = SceneStore::default();
    let mut m = IndexMaintainer::default();
    m.attach(store.bus());
    let mesh = store.register_component_type("Mesh");
    let publisher = IndexPublisher::new();
    let done = Arc::new(AtomicBool::new(false));

    let readers: Vec<_> = (0..3)
        .map(|_| {
            let reader = publisher.reader();
            let done = Arc::clone(&done);
            thread::spawn(move || {
                let mut last = 0;
                while !done.load(Ordering::Acquire) {
                    let snapshot = reader.snapshot();
                    let view = snapshot.view();
                    // Every published batch attaches a mesh to every entity.
                    assert_eq!(view.entity_count(), view.get_component_count(mesh));
                    assert!(snapshot.version() >= last);
                    last = snapshot.version();
                }
            })
        })
        .collect();

    for _ in 0..50 {
        for _ in 0..10 {
            let id = store.spawn(None).unwrap();
            store.attach(id, mesh).unwrap();
        }
        publisher.publish(&mut m);
    }
    done.store(true, Ordering::Release);

    for reader in readers {
        reader.join().unwrap();
    }
    assert_eq!(publisher.reader().snapshot().view().entity_count(), 500);
}
