//! Ordered change notification channel.
//!
//! The bus dispatches each emitted [`ChangeEvent`] synchronously, in emission
//! order, to every handler subscribed to the event's [`EventKind`]. Handlers
//! run in subscription order.
//!
//! Subscriptions are scoped: [`ChangeBus::on`] returns a [`Subscription`]
//! handle and dropping the handle unsubscribes. The registry lock is not held
//! while handlers run, so a handler may subscribe or drop subscriptions. A
//! subscription dropped mid-dispatch is skipped for the rest of that
//! dispatch. A handler must not emit an event of its own kind.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use crate::event::{ChangeEvent, EventKind};

/// Identifier of a single subscription.
pub type SubscriptionId = u64;

type Handler = Arc<Mutex<dyn FnMut(&ChangeEvent) + Send + 'static>>;

#[derive(Default)]
struct Registry {
    /// kind -> handlers in subscription order.
    handlers: HashMap<EventKind, Vec<(SubscriptionId, Handler)>>,
    next_id: SubscriptionId,
}

impl Registry {
    fn contains(&self, kind: EventKind, id: SubscriptionId) -> bool {
        self.handlers
            .get(&kind)
            .is_some_and(|list| list.iter().any(|(sid, _)| *sid == id))
    }

    fn remove(&mut self, kind: EventKind, id: SubscriptionId) -> bool {
        let Some(list) = self.handlers.get_mut(&kind) else {
            return false;
        };
        let before = list.len();
        list.retain(|(sid, _)| *sid != id);
        before != list.len()
    }

    fn len(&self) -> usize {
        self.handlers.values().map(Vec::len).sum()
    }
}

/// Change notification channel shared between a store and its subscribers.
///
/// Cloning the bus yields another handle to the same channel.
#[derive(Clone, Default)]
pub struct ChangeBus {
    registry: Arc<Mutex<Registry>>,
}

impl ChangeBus {
    /// Creates a bus with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribes a handler to one event kind.
    ///
    /// The handler stays registered until the returned handle is dropped or
    /// released.
    #[must_use = "dropping the subscription unsubscribes immediately"]
    pub fn on<F>(&self, kind: EventKind, handler: F) -> Subscription
    where
        F: FnMut(&ChangeEvent) + Send + 'static,
    {
        let handler: Handler = Arc::new(Mutex::new(handler));
        let mut registry = self.registry.lock();
        registry.next_id += 1;
        let id = registry.next_id;
        registry.handlers.entry(kind).or_default().push((id, handler));

        Subscription {
            id,
            kind,
            registry: Arc::downgrade(&self.registry),
        }
    }

    /// Emits an event to every handler subscribed to its kind.
    ///
    /// The handler list is copied before dispatch and the registry lock is
    /// released while handlers run. Returns the number of handlers that ran.
    pub fn emit(&self, event: &ChangeEvent) -> usize {
        let kind = event.kind();
        let handlers = match self.registry.lock().handlers.get(&kind) {
            Some(list) => list.clone(),
            None => return 0,
        };

        let mut ran = 0;
        for (id, handler) in handlers {
            if !self.registry.lock().contains(kind, id) {
                continue;
            }
            let mut callback = handler.lock();
            (*callback)(event);
            ran += 1;
        }
        ran
    }

    /// Returns the number of live subscriptions across all kinds.
    #[must_use]
    pub fn subscription_count(&self) -> usize {
        self.registry.lock().len()
    }

    /// Returns the number of live subscriptions for one kind.
    #[must_use]
    pub fn subscribers_for(&self, kind: EventKind) -> usize {
        self.registry.lock().handlers.get(&kind).map_or(0, Vec::len)
    }
}

impl fmt::Debug for ChangeBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeBus")
            .field("subscriptions", &self.subscription_count())
            .finish()
    }
}

/// Scoped handle to a bus subscription.
///
/// Dropping the handle removes the handler from the bus. If the bus itself is
/// gone the drop is a no-op.
#[must_use = "dropping the subscription unsubscribes immediately"]
pub struct Subscription {
    id: SubscriptionId,
    kind: EventKind,
    registry: Weak<Mutex<Registry>>,
}

impl Subscription {
    /// Returns the subscription identifier.
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Returns the subscribed event kind.
    pub fn kind(&self) -> EventKind {
        self.kind
    }

    /// Returns true while the handler is still registered on a live bus.
    pub fn is_active(&self) -> bool {
        self.registry
            .upgrade()
            .is_some_and(|registry| registry.lock().contains(self.kind, self.id))
    }

    /// Unsubscribes now. Returns false if the handler was already gone.
    pub fn release(mut self) -> bool {
        self.unsubscribe()
    }

    fn unsubscribe(&mut self) -> bool {
        let Some(registry) = self.registry.upgrade() else {
            return false;
        };
        self.registry = Weak::new();
        let removed = registry.lock().remove(self.kind, self.id);
        removed
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}
