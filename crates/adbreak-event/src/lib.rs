//! adbreak event model
//!
//! In-process publish/subscribe bus shared by a host video player and the
//! components plugged into it. Events are a closed set of kinds paired with
//! an open, ordered property map; delivery is synchronous and follows
//! registration order.

pub mod component;
pub mod cue_point;
pub mod emitter;
pub mod error;
pub mod events;

pub use component::{describe, Component};
pub use cue_point::{CuePoint, CuePosition, DeliveryType, Source};
pub use emitter::{EventEmitter, ListenerId};
pub use error::EventError;
pub use events::{keys, Event, EventKind, Properties, LIFECYCLE_EVENTS};
