//! Integration tests for the change bus

use std::sync::Arc;

use parking_lot::Mutex;
use scenedex_foundation::EntityId;
use scenedex_storage::{ChangeBus, ChangeEvent, EventKind};

fn created(id: u64) -> ChangeEvent {
    ChangeEvent::EntityCreated {
        id: EntityId::new(id),
        parent: None,
    }
}

#[test]
fn handlers_receive_events_in_emission_order() {
    let bus = ChangeBus::new();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let _sub = bus.on(EventKind::EntityCreated, move |event| {
        sink.lock().push(event.subject());
    });

    for i in 0..5 {
        bus.emit(&created(i));
    }

    let expected: Vec<_> = (0..5).map(|i| Some(EntityId::new(i))).collect();
    assert_eq!(*seen.lock(), expected);
}

#[test]
fn handlers_run_in_subscription_order() {
    let bus = ChangeBus::new();
    let order = Arc::new(Mutex::new(Vec::new()));
    let first = Arc::clone(&order);
    let second = Arc::clone(&order);
    let _a = bus.on(EventKind::EntitiesCleared, move |_| first.lock().push("a"));
    let _b = bus.on(EventKind::EntitiesCleared, move |_| second.lock().push("b"));

    assert_eq!(bus.emit(&ChangeEvent::EntitiesCleared), 2);
    assert_eq!(*order.lock(), vec!["a", "b"]);
}

#[test]
fn dropping_handle_unsubscribes() {
    let bus = ChangeBus::new();
    let sub = bus.on(EventKind::EntityDeleted, |_| {});
    assert_eq!(bus.subscribers_for(EventKind::EntityDeleted), 1);

    drop(sub);
    assert_eq!(bus.subscription_count(), 0);
    assert_eq!(bus.emit(&ChangeEvent::EntityDeleted { id: EntityId::new(1) }), 0);
}

#[test]
fn release_reports_first_release_only() {
    let bus = ChangeBus::new();
    let sub = bus.on(EventKind::ParentChanged, |_| {});
    assert!(sub.is_active());
    assert!(sub.release());
    assert_eq!(bus.subscription_count(), 0);
}

#[test]
fn handle_outliving_bus_is_harmless() {
    let bus = ChangeBus::new();
    let sub = bus.on(EventKind::EntityCreated, |_| {});
    drop(bus);

    assert!(!sub.is_active());
    drop(sub);
}

#[test]
fn cloned_bus_shares_subscribers() {
    let bus = ChangeBus::new();
    let other = bus.clone();
    let _sub = bus.on(EventKind::EntityCreated, |_| {});

    assert_eq!(other.emit(&created(1)), 1);
}
