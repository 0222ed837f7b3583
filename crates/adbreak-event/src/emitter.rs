//! Synchronous in-process event bus.
//!
//! `EventEmitter` maps each [`EventKind`] to an ordered list of listeners.
//! Emitting an event invokes every listener registered for its kind, in
//! registration order, before `emit` returns. The registry lock is released
//! before any listener runs, so listeners are free to emit, subscribe or
//! unsubscribe from inside a callback.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::events::{Event, EventKind, Properties};

type Listener = Arc<dyn Fn(&Event) + Send + Sync>;

/// Handle returned by [`EventEmitter::on`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

struct Subscription {
    id: ListenerId,
    once: bool,
    listener: Listener,
}

#[derive(Default)]
struct Registry {
    /// Event kind → subscribers in registration order.
    subscriptions: HashMap<EventKind, Vec<Subscription>>,
}

/// Cloneable handle to a shared event bus.
#[derive(Clone, Default)]
pub struct EventEmitter {
    registry: Arc<Mutex<Registry>>,
    next_id: Arc<AtomicU64>,
}

impl fmt::Debug for EventEmitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let registry = self.lock();
        let counts: HashMap<EventKind, usize> = registry
            .subscriptions
            .iter()
            .map(|(kind, subs)| (*kind, subs.len()))
            .collect();
        f.debug_struct("EventEmitter")
            .field("listeners", &counts)
            .finish_non_exhaustive()
    }
}

impl EventEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Registry> {
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn subscribe<F>(&self, kind: EventKind, once: bool, listener: F) -> ListenerId
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.lock()
            .subscriptions
            .entry(kind)
            .or_default()
            .push(Subscription {
                id,
                once,
                listener: Arc::new(listener),
            });
        tracing::trace!(event = %kind, listener = id.0, once, "listener registered");
        id
    }

    /// Register a listener for every future event of `kind`.
    pub fn on<F>(&self, kind: EventKind, listener: F) -> ListenerId
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        self.subscribe(kind, false, listener)
    }

    /// Register a listener that is removed after its first delivery.
    pub fn once<F>(&self, kind: EventKind, listener: F) -> ListenerId
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        self.subscribe(kind, true, listener)
    }

    /// Remove a listener. Returns false if it was not registered.
    pub fn off(&self, id: ListenerId) -> bool {
        let mut registry = self.lock();
        let mut removed = false;
        for subs in registry.subscriptions.values_mut() {
            let before = subs.len();
            subs.retain(|s| s.id != id);
            removed |= subs.len() != before;
        }
        removed
    }

    pub fn listener_count(&self, kind: EventKind) -> usize {
        self.lock()
            .subscriptions
            .get(&kind)
            .map_or(0, Vec::len)
    }

    /// Emit an event with no properties.
    pub fn emit(&self, kind: EventKind) {
        self.emit_event(&Event::new(kind));
    }

    pub fn emit_with(&self, kind: EventKind, properties: Properties) {
        self.emit_event(&Event::with_properties(kind, properties));
    }

    /// Deliver `event` to every listener registered for its kind.
    ///
    /// The subscriber list is snapshotted when the call starts: listeners
    /// added during delivery see only later events, and a `once` listener
    /// is delivered at most one event even under re-entrant emission.
    pub fn emit_event(&self, event: &Event) {
        let listeners: Vec<Listener> = {
            let mut registry = self.lock();
            match registry.subscriptions.get_mut(&event.kind) {
                Some(subs) => {
                    let snapshot = subs.iter().map(|s| Arc::clone(&s.listener)).collect();
                    subs.retain(|s| !s.once);
                    snapshot
                }
                None => Vec::new(),
            }
        };
        // Registry lock dropped here

        tracing::trace!(
            event = %event.kind,
            listeners = listeners.len(),
            "emit"
        );

        for listener in listeners {
            listener(event);
        }
    }
}
