//! Owned, per-instance event emitters.
//!
//! The scene store and the animation manager each own an
//! [`EventEmitter`]; consumers subscribe to that instance rather than to a
//! process-wide registry, so two sessions never observe each other's
//! events.

use std::fmt;

/// Handle returned by [`EventEmitter::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Handler<E> = Box<dyn FnMut(&E)>;

/// Synchronous fan-out of events to subscribed handlers.
///
/// Handlers run on the emitting thread, in subscription order, before
/// [`emit`](Self::emit) returns.
pub struct EventEmitter<E> {
    handlers: Vec<(SubscriptionId, Handler<E>)>,
    next_id: u64,
}

impl<E> Default for EventEmitter<E> {
    fn default() -> Self {
        Self {
            handlers: Vec::new(),
            next_id: 0,
        }
    }
}

impl<E> EventEmitter<E> {
    /// An emitter with no subscribers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler; it will see every event emitted from now on.
    pub fn subscribe(
        &mut self,
        handler: impl FnMut(&E) + 'static,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.handlers.push((id, Box::new(handler)));
        id
    }

    /// Remove a handler. Returns `false` if it was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.handlers.len();
        self.handlers.retain(|(handler_id, _)| *handler_id != id);
        self.handlers.len() != before
    }

    /// Deliver an event to every subscriber.
    pub fn emit(&mut self, event: &E) {
        for (_, handler) in &mut self.handlers {
            handler(event);
        }
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.handlers.len()
    }
}

impl<E> fmt::Debug for EventEmitter<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventEmitter")
            .field("subscribers", &self.handlers.len())
            .finish()
    }
}
