//! Diagnostic logging of playback lifecycle events.

use adbreak_event::{Event, EventEmitter, ListenerId, LIFECYCLE_EVENTS};
use serde_json::Value;

/// Records the properties of every lifecycle event at `trace` level.
///
/// Stateless: handlers never mutate anything and never emit.
#[derive(Debug)]
pub struct PlaybackLogger {
    emitter: EventEmitter,
    listeners: Vec<ListenerId>,
}

impl PlaybackLogger {
    pub fn attach(emitter: &EventEmitter) -> Self {
        let listeners = LIFECYCLE_EVENTS
            .into_iter()
            .map(|kind| emitter.on(kind, log_event))
            .collect();
        Self {
            emitter: emitter.clone(),
            listeners,
        }
    }

    pub fn detach(&mut self) {
        for id in self.listeners.drain(..) {
            self.emitter.off(id);
        }
    }

    /// The diagnostic record written for `event`.
    pub fn describe(event: &Event) -> String {
        format!("{}: {}", event.kind, Value::Object(event.properties.clone()))
    }
}

fn log_event(event: &Event) {
    tracing::trace!(event = %event.kind, "{}", PlaybackLogger::describe(event));
}
