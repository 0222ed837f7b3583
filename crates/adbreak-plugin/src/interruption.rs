//! Ad interruption: pause content at a cue point, play a placeholder clip
//! on a secondary surface, then ask the host to resume.
//!
//! Protocol, per `cue_point` event:
//! 1. Remember the event's `original_event` (the event that would have
//!    played next), replacing anything stored before.
//! 2. Emit `will_interrupt_content`.
//! 3. Attach a fresh full-size surface and start the placeholder on it.
//!
//! When that surface reports completion or an error:
//! 1. Release the surface (failures ignored) and detach it.
//! 2. Emit `will_resume_content` carrying the remembered `original_event`,
//!    or a `play` with `skip_cue_points` when none was remembered.
//!
//! At most one interruption is live. Callbacks from a surface that is no
//! longer live are ignored, so each live interruption resumes exactly once.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use adbreak_event::{keys, Event, EventEmitter, EventKind, ListenerId, Properties};
use serde_json::Value;

use crate::config::PluginConfig;
use crate::surface::{Layout, PlaybackListener, SurfaceHost, SurfaceId, VideoSurface};

#[derive(Default)]
struct InterruptionState {
    /// Written by the cue point handler, read-and-cleared by resume.
    original_event: Option<Event>,
    /// The live placeholder surface, if an interruption is in flight.
    surface: Option<Arc<dyn VideoSurface>>,
}

pub struct AdInterruption {
    emitter: EventEmitter,
    host: Arc<dyn SurfaceHost>,
    placeholder_url: String,
    state: Mutex<InterruptionState>,
    listener_id: Mutex<Option<ListenerId>>,
    this: Weak<AdInterruption>,
}

impl std::fmt::Debug for AdInterruption {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdInterruption")
            .field("placeholder_url", &self.placeholder_url)
            .field("interrupting", &self.is_interrupting())
            .finish_non_exhaustive()
    }
}

/// The event resumed when a cue point carried no original event.
///
/// Skipping cue points keeps the host from firing the same cue point again
/// and interrupting forever.
pub fn default_resume_event() -> Event {
    Event::new(EventKind::Play).with(keys::SKIP_CUE_POINTS, true)
}

impl AdInterruption {
    /// Create the component and subscribe it to `cue_point` on `emitter`.
    pub fn attach(
        emitter: &EventEmitter,
        host: Arc<dyn SurfaceHost>,
        config: &PluginConfig,
    ) -> Arc<Self> {
        let component = Arc::new_cyclic(|this| Self {
            emitter: emitter.clone(),
            host,
            placeholder_url: config.placeholder_url.clone(),
            state: Mutex::new(InterruptionState::default()),
            listener_id: Mutex::new(None),
            this: this.clone(),
        });

        let weak = Arc::downgrade(&component);
        let id = emitter.on(EventKind::CuePoint, move |event| {
            if let Some(component) = weak.upgrade() {
                component.on_cue_point(event);
            }
        });
        *component
            .listener_id
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(id);

        component
    }

    /// Unsubscribe from the bus. A live interruption still resumes.
    pub fn detach(&self) {
        let id = self
            .listener_id
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(id) = id {
            self.emitter.off(id);
        }
    }

    /// Whether a placeholder surface is currently live.
    pub fn is_interrupting(&self) -> bool {
        self.lock().surface.is_some()
    }

    /// The original event that will be resumed, if one was captured.
    pub fn pending_original_event(&self) -> Option<Event> {
        self.lock().original_event.clone()
    }

    pub fn placeholder_url(&self) -> &str {
        &self.placeholder_url
    }

    fn lock(&self) -> MutexGuard<'_, InterruptionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// A cue point that lands while an interruption is live replaces it:
    /// the host is still suppressed, so only the newest interruption
    /// resumes and the replaced one ends without `will_resume_content`.
    fn on_cue_point(&self, event: &Event) {
        let properties = Value::Object(event.properties.clone());
        tracing::trace!(properties = %properties, "cue point reached");

        let stale = {
            let mut state = self.lock();
            state.original_event = event.original_event();
            state.surface.take()
        };
        if let Some(stale) = stale {
            tracing::warn!(
                surface = stale.id().0,
                "cue point during a live interruption, replacing placeholder"
            );
            self.release(stale.as_ref());
        }

        self.emitter.emit(EventKind::WillInterruptContent);

        let surface = match self.host.attach(Layout::fill_centered()) {
            Ok(surface) => surface,
            Err(e) => {
                tracing::warn!("failed to attach placeholder surface, resuming: {e}");
                let original = self.lock().original_event.take();
                self.resume(None, original);
                return;
            }
        };

        let id = surface.id();
        self.lock().surface = Some(Arc::clone(&surface));
        let listener: Weak<dyn PlaybackListener> = self.this.clone();
        surface.set_listener(listener);

        tracing::debug!(surface = id.0, url = %self.placeholder_url, "playing placeholder");
        if let Err(e) = surface.play(&self.placeholder_url) {
            tracing::debug!(surface = id.0, "placeholder failed to start: {e}");
            self.finish(id);
        }
    }

    /// End the interruption owned by `surface`, if it is still the live one.
    fn finish(&self, surface: SurfaceId) {
        let (live, original) = {
            let mut state = self.lock();
            match &state.surface {
                Some(live) if live.id() == surface => {}
                _ => {
                    tracing::debug!(surface = surface.0, "ignoring callback from stale surface");
                    return;
                }
            }
            (state.surface.take(), state.original_event.take())
        };
        self.resume(live, original);
    }

    fn release(&self, surface: &dyn VideoSurface) {
        if let Err(e) = surface.suspend() {
            tracing::debug!(surface = surface.id().0, "ignoring surface release failure: {e}");
        }
        self.host.detach(surface.id());
    }

    fn resume(&self, surface: Option<Arc<dyn VideoSurface>>, original: Option<Event>) {
        if let Some(surface) = surface {
            self.release(surface.as_ref());
        }

        let original = original.unwrap_or_else(default_resume_event);
        tracing::debug!(original_event = %original, "resuming content");

        let mut properties = Properties::new();
        properties.insert(keys::ORIGINAL_EVENT.to_string(), Value::from(&original));
        self.emitter
            .emit_with(EventKind::WillResumeContent, properties);
    }
}

impl PlaybackListener for AdInterruption {
    fn on_completion(&self, surface: SurfaceId) {
        tracing::trace!(surface = surface.0, "placeholder completed");
        self.finish(surface);
    }

    fn on_error(&self, surface: SurfaceId, what: i32, extra: i32) -> bool {
        tracing::trace!(surface = surface.0, what, extra, "placeholder error");
        self.finish(surface);
        true
    }
}
