//! Synchronous change notification
//!
//! Subscriptions live in a registry that is only allocated on first
//! subscription. Dispatch runs over a snapshot of the registered handlers,
//! so a handler that subscribes or unsubscribes during dispatch only affects
//! the next dispatch.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

/// Handle returned by `subscribe`, used to cancel the subscription
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

/// Change raised by a graph object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ObjectEvent {
    /// A category was attached or detached
    CategoryChanged,
    /// A stored property value was written or removed
    PropertyChanged { property_id: String },
}

/// Change raised by a schema when its own registrations change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SchemaEvent {
    Changed,
}

type Handler<E> = Rc<dyn Fn(&E)>;

/// Registry of event handlers keyed by subscription handle
pub struct Subscribers<E> {
    next_id: Cell<u64>,
    handlers: RefCell<Option<BTreeMap<SubscriptionId, Handler<E>>>>,
}

impl<E> Subscribers<E> {
    pub fn new() -> Self {
        Self {
            next_id: Cell::new(0),
            handlers: RefCell::new(None),
        }
    }

    /// Register a handler; handlers run in subscription order
    pub fn subscribe<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(&E) + 'static,
    {
        let id = SubscriptionId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.handlers
            .borrow_mut()
            .get_or_insert_with(BTreeMap::new)
            .insert(id, Rc::new(handler));
        id
    }

    /// Cancel a subscription. Returns false if it was already cancelled.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.handlers
            .borrow_mut()
            .as_mut()
            .map(|handlers| handlers.remove(&id).is_some())
            .unwrap_or(false)
    }

    /// Number of live subscriptions
    pub fn len(&self) -> usize {
        self.handlers.borrow().as_ref().map_or(0, BTreeMap::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the registry has been allocated yet
    pub fn is_allocated(&self) -> bool {
        self.handlers.borrow().is_some()
    }

    /// Deliver `event` to every handler registered at the time of the call
    pub fn emit(&self, event: &E) {
        let snapshot: Vec<Handler<E>> = match self.handlers.borrow().as_ref() {
            Some(handlers) => handlers.values().cloned().collect(),
            None => return,
        };
        for handler in snapshot {
            handler(event);
        }
    }
}

impl<E> Default for Subscribers<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for Subscribers<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscribers")
            .field("len", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_is_lazy() {
        let subs: Subscribers<SchemaEvent> = Subscribers::new();
        assert!(!subs.is_allocated());
        subs.emit(&SchemaEvent::Changed);
        assert!(!subs.is_allocated());

        subs.subscribe(|_| {});
        assert!(subs.is_allocated());
        assert_eq!(subs.len(), 1);
    }

    #[test]
    fn test_unsubscribe_is_idempotent() {
        let subs: Subscribers<SchemaEvent> = Subscribers::new();
        let id = subs.subscribe(|_| {});

        assert!(subs.unsubscribe(id));
        assert!(!subs.unsubscribe(id));
        assert!(subs.is_empty());
    }

    #[test]
    fn test_emit_reaches_all_handlers_in_order() {
        let subs: Subscribers<ObjectEvent> = Subscribers::new();
        let seen = Rc::new(RefCell::new(Vec::new()));

        let first = seen.clone();
        subs.subscribe(move |e| first.borrow_mut().push(("first", e.clone())));
        let second = seen.clone();
        subs.subscribe(move |e| second.borrow_mut().push(("second", e.clone())));

        subs.emit(&ObjectEvent::CategoryChanged);

        let seen = seen.borrow();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].0, "first");
        assert_eq!(seen[1].0, "second");
    }

    #[test]
    fn test_subscribe_during_dispatch_applies_to_next_dispatch() {
        let subs: Rc<Subscribers<SchemaEvent>> = Rc::new(Subscribers::new());
        let late_calls = Rc::new(Cell::new(0));

        let inner = subs.clone();
        let counter = late_calls.clone();
        subs.subscribe(move |_| {
            let counter = counter.clone();
            inner.subscribe(move |_| counter.set(counter.get() + 1));
        });

        subs.emit(&SchemaEvent::Changed);
        assert_eq!(late_calls.get(), 0);

        subs.emit(&SchemaEvent::Changed);
        assert_eq!(late_calls.get(), 1);
    }

    #[test]
    fn test_object_event_serializes_with_kind_tag() {
        let event = ObjectEvent::PropertyChanged {
            property_id: "age".to_string(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["kind"], "property_changed");
        assert_eq!(json["property_id"], "age");
    }
}
