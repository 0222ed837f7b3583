//! Event kinds, property maps and the `Event` value passed to listeners.

use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::cue_point::{CuePoint, Source};
use crate::error::EventError;

/// Open, ordered string-keyed property mapping carried by every event.
pub type Properties = serde_json::Map<String, Value>;

/// Well-known property keys.
pub mod keys {
    /// The event that would have happened had a cue point not interrupted it.
    pub const ORIGINAL_EVENT: &str = "original_event";
    /// When true on a `play` event, cue points at the current position are not evaluated.
    pub const SKIP_CUE_POINTS: &str = "skip_cue_points";
    pub const SOURCE: &str = "source";
    pub const VIDEO: &str = "video";
    pub const CUE_POINT: &str = "cue_point";
    pub const CUE_POINTS: &str = "cue_points";
    pub const PLAYHEAD_POSITION: &str = "playhead_position";
    pub const DURATION: &str = "duration";
    pub const SEEK_POSITION: &str = "seek_position";
}

// ─── Event kinds ────────────────────────────────────────────────────────

/// Every event the bus knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Completed,
    CuePoint,
    DidPause,
    DidPlay,
    DidSeekTo,
    DidSetSource,
    DidSetVideo,
    DidStop,
    Progress,
    WillInterruptContent,
    WillResumeContent,
    SetCuePoint,
    Play,
    Pause,
    SeekTo,
    Stop,
    SetSource,
    SetVideo,
}

/// Playback lifecycle events that are only ever observed, never acted on.
pub const LIFECYCLE_EVENTS: [EventKind; 8] = [
    EventKind::Completed,
    EventKind::DidPlay,
    EventKind::DidPause,
    EventKind::DidSeekTo,
    EventKind::DidSetSource,
    EventKind::DidSetVideo,
    EventKind::DidStop,
    EventKind::Progress,
];

impl EventKind {
    pub const ALL: [EventKind; 18] = [
        EventKind::Completed,
        EventKind::CuePoint,
        EventKind::DidPause,
        EventKind::DidPlay,
        EventKind::DidSeekTo,
        EventKind::DidSetSource,
        EventKind::DidSetVideo,
        EventKind::DidStop,
        EventKind::Progress,
        EventKind::WillInterruptContent,
        EventKind::WillResumeContent,
        EventKind::SetCuePoint,
        EventKind::Play,
        EventKind::Pause,
        EventKind::SeekTo,
        EventKind::Stop,
        EventKind::SetSource,
        EventKind::SetVideo,
    ];

    /// Stable wire name of this kind.
    pub fn name(self) -> &'static str {
        match self {
            EventKind::Completed => "completed",
            EventKind::CuePoint => "cue_point",
            EventKind::DidPause => "did_pause",
            EventKind::DidPlay => "did_play",
            EventKind::DidSeekTo => "did_seek_to",
            EventKind::DidSetSource => "did_set_source",
            EventKind::DidSetVideo => "did_set_video",
            EventKind::DidStop => "did_stop",
            EventKind::Progress => "progress",
            EventKind::WillInterruptContent => "will_interrupt_content",
            EventKind::WillResumeContent => "will_resume_content",
            EventKind::SetCuePoint => "set_cue_point",
            EventKind::Play => "play",
            EventKind::Pause => "pause",
            EventKind::SeekTo => "seek_to",
            EventKind::Stop => "stop",
            EventKind::SetSource => "set_source",
            EventKind::SetVideo => "set_video",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EventKind {
    type Err = EventError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EventKind::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| EventError::UnknownEvent(s.to_string()))
    }
}

// ─── Event ──────────────────────────────────────────────────────────────

/// A named event and its properties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub kind: EventKind,
    #[serde(default)]
    pub properties: Properties,
}

impl Event {
    /// Create an event with no properties.
    pub fn new(kind: EventKind) -> Self {
        Self {
            kind,
            properties: Properties::new(),
        }
    }

    pub fn with_properties(kind: EventKind, properties: Properties) -> Self {
        Self { kind, properties }
    }

    /// Builder-style insert of a single property.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.properties.get(key).filter(|v| !v.is_null())
    }

    /// Decode a property into a typed value.
    ///
    /// Absent and `null` properties are `Ok(None)`; anything that does not
    /// decode as `T` is `InvalidProperty`.
    pub fn property<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, EventError> {
        match self.get(key) {
            None => Ok(None),
            Some(value) => T::deserialize(value)
                .map(Some)
                .map_err(|e| EventError::InvalidProperty {
                    key: key.to_string(),
                    reason: e.to_string(),
                }),
        }
    }

    /// The interrupted event carried by `cue_point` and `will_resume_content`.
    pub fn original_event(&self) -> Option<Event> {
        self.property(keys::ORIGINAL_EVENT).ok().flatten()
    }

    pub fn skip_cue_points(&self) -> bool {
        self.get(keys::SKIP_CUE_POINTS)
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    pub fn source(&self) -> Option<Source> {
        self.property(keys::SOURCE).ok().flatten()
    }

    pub fn cue_point(&self) -> Option<CuePoint> {
        self.property(keys::CUE_POINT).ok().flatten()
    }

    pub fn cue_points(&self) -> Vec<CuePoint> {
        self.property(keys::CUE_POINTS)
            .ok()
            .flatten()
            .unwrap_or_default()
    }

    pub fn playhead_position(&self) -> Option<u64> {
        self.get(keys::PLAYHEAD_POSITION).and_then(Value::as_u64)
    }
}

impl From<&Event> for Value {
    fn from(event: &Event) -> Self {
        let mut map = Properties::new();
        map.insert("kind".into(), Value::String(event.kind.name().into()));
        map.insert("properties".into(), Value::Object(event.properties.clone()));
        Value::Object(map)
    }
}

impl From<Event> for Value {
    fn from(event: Event) -> Self {
        Value::from(&event)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, Value::Object(self.properties.clone()))
    }
}
