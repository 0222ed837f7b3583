//! Cue point and media source descriptors carried in event properties.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::events::Properties;

// ─── Cue points ─────────────────────────────────────────────────────────

/// Where in the content a cue point sits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "millis", rename_all = "snake_case")]
pub enum CuePosition {
    /// Before the first frame of content.
    Before,
    /// A fixed offset into the content, in milliseconds.
    At(u64),
    /// After the last frame of content.
    After,
}

/// A marker the host player fires `cue_point` for when playback reaches it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CuePoint {
    pub position: CuePosition,
    /// Category label, e.g. `"ad"`.
    pub kind: String,
    #[serde(default)]
    pub properties: Properties,
}

impl CuePoint {
    pub fn new(position: CuePosition, kind: impl Into<String>) -> Self {
        Self {
            position,
            kind: kind.into(),
            properties: Properties::new(),
        }
    }

    pub fn before(kind: impl Into<String>) -> Self {
        Self::new(CuePosition::Before, kind)
    }

    pub fn at(millis: u64, kind: impl Into<String>) -> Self {
        Self::new(CuePosition::At(millis), kind)
    }

    pub fn after(kind: impl Into<String>) -> Self {
        Self::new(CuePosition::After, kind)
    }
}

impl From<&CuePoint> for Value {
    fn from(cue: &CuePoint) -> Self {
        let position = match cue.position {
            CuePosition::Before => json!({ "type": "before" }),
            CuePosition::At(millis) => json!({ "type": "at", "millis": millis }),
            CuePosition::After => json!({ "type": "after" }),
        };
        json!({
            "position": position,
            "kind": cue.kind,
            "properties": Value::Object(cue.properties.clone()),
        })
    }
}

// ─── Sources ────────────────────────────────────────────────────────────

/// How a source is delivered to the player.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryType {
    Mp4,
    Hls,
    Dash,
    #[default]
    #[serde(other)]
    Unknown,
}

impl DeliveryType {
    pub fn as_str(self) -> &'static str {
        match self {
            DeliveryType::Mp4 => "mp4",
            DeliveryType::Hls => "hls",
            DeliveryType::Dash => "dash",
            DeliveryType::Unknown => "unknown",
        }
    }
}

/// A playable rendition of a video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Source {
    pub url: String,
    #[serde(default)]
    pub delivery_type: DeliveryType,
    #[serde(default)]
    pub properties: Properties,
}

impl Source {
    pub fn new(url: impl Into<String>, delivery_type: DeliveryType) -> Self {
        Self {
            url: url.into(),
            delivery_type,
            properties: Properties::new(),
        }
    }
}

impl From<&Source> for Value {
    fn from(source: &Source) -> Self {
        json!({
            "url": source.url,
            "delivery_type": source.delivery_type.as_str(),
            "properties": Value::Object(source.properties.clone()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cue_point_constructors() {
        assert_eq!(CuePoint::before("ad").position, CuePosition::Before);
        assert_eq!(CuePoint::at(10_000, "ad").position, CuePosition::At(10_000));
        assert_eq!(CuePoint::after("ad").position, CuePosition::After);
        assert_eq!(CuePoint::after("ad").kind, "ad");
    }

    #[test]
    fn test_cue_point_value_decodes_back() {
        let cue = CuePoint::at(10_000, "ad");
        let value = Value::from(&cue);
        assert_eq!(value["position"]["type"], "at");
        assert_eq!(value["position"]["millis"], 10_000);

        let decoded: CuePoint = serde_json::from_value(value).unwrap();
        assert_eq!(decoded, cue);
    }

    #[test]
    fn test_unit_positions_decode() {
        let decoded: CuePoint =
            serde_json::from_value(json!({ "position": { "type": "after" }, "kind": "ad" }))
                .unwrap();
        assert_eq!(decoded.position, CuePosition::After);
        assert!(decoded.properties.is_empty());
    }

    #[test]
    fn test_unrecognised_delivery_type_is_unknown() {
        let source: Source =
            serde_json::from_value(json!({ "url": "rtmp://x", "delivery_type": "rtmp" })).unwrap();
        assert_eq!(source.delivery_type, DeliveryType::Unknown);
    }

    #[test]
    fn test_missing_delivery_type_is_unknown() {
        let source: Source = serde_json::from_value(json!({ "url": "file:///a.mp4" })).unwrap();
        assert_eq!(source.delivery_type, DeliveryType::Unknown);
    }

    #[test]
    fn test_source_value_uses_wire_names() {
        let source = Source::new("https://cdn.example.com/a.m3u8", DeliveryType::Hls);
        let value = Value::from(&source);
        assert_eq!(value["delivery_type"], "hls");
        let decoded: Source = serde_json::from_value(value).unwrap();
        assert_eq!(decoded, source);
    }
}
