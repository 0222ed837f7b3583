//! Host wiring: registers pre-roll, mid-roll and post-roll cue points once
//! the player has set a source.

use adbreak_event::{keys, CuePoint, DeliveryType, Event, EventEmitter, EventKind, ListenerId, Source};
use serde_json::Value;

use crate::config::CuePointConfig;

/// Register cue point setup on `did_set_source`.
pub fn install(emitter: &EventEmitter, config: CuePointConfig) -> ListenerId {
    let bus = emitter.clone();
    emitter.on(EventKind::DidSetSource, move |event| match event.source() {
        Some(source) => setup_cue_points(&bus, &source, &config),
        None => tracing::warn!("did_set_source without a source, skipping cue point setup"),
    })
}

/// Emit `set_cue_point` for a pre-roll, a mid-roll and a post-roll.
///
/// Fixed-offset cue points are not supported on HLS streams, so the
/// mid-roll is left out for them.
pub fn setup_cue_points(emitter: &EventEmitter, source: &Source, config: &CuePointConfig) {
    tracing::debug!(
        url = %source.url,
        delivery_type = source.delivery_type.as_str(),
        "setting up cue points"
    );

    set_cue_point(emitter, CuePoint::before(config.kind.as_str()));

    if source.delivery_type != DeliveryType::Hls {
        set_cue_point(
            emitter,
            CuePoint::at(config.midroll_offset_ms, config.kind.as_str()),
        );
    }

    set_cue_point(emitter, CuePoint::after(config.kind.as_str()));
}

fn set_cue_point(emitter: &EventEmitter, cue_point: CuePoint) {
    let event = Event::new(EventKind::SetCuePoint).with(keys::CUE_POINT, Value::from(&cue_point));
    emitter.emit_event(&event);
}

#[cfg(test)]
mod tests {
    use super::*;
    use adbreak_event::CuePosition;
    use std::sync::{Arc, Mutex};

    fn capture(emitter: &EventEmitter) -> Arc<Mutex<Vec<CuePoint>>> {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        emitter.on(EventKind::SetCuePoint, move |e| {
            sink.lock().unwrap().push(e.cue_point().expect("cue point property"));
        });
        seen
    }

    fn positions(cues: &[CuePoint]) -> Vec<CuePosition> {
        cues.iter().map(|c| c.position).collect()
    }

    #[test]
    fn test_progressive_source_gets_three_cue_points() {
        let emitter = EventEmitter::new();
        let seen = capture(&emitter);
        let source = Source::new("https://cdn.example.com/a.mp4", DeliveryType::Mp4);

        setup_cue_points(&emitter, &source, &CuePointConfig::default());

        let cues = seen.lock().unwrap();
        assert_eq!(
            positions(&cues),
            vec![CuePosition::Before, CuePosition::At(10_000), CuePosition::After]
        );
        assert!(cues.iter().all(|c| c.kind == "ad"));
    }

    #[test]
    fn test_hls_source_skips_midroll() {
        let emitter = EventEmitter::new();
        let seen = capture(&emitter);
        let source = Source::new("https://cdn.example.com/a.m3u8", DeliveryType::Hls);

        setup_cue_points(&emitter, &source, &CuePointConfig::default());

        assert_eq!(
            positions(&seen.lock().unwrap()),
            vec![CuePosition::Before, CuePosition::After]
        );
    }

    #[test]
    fn test_unknown_delivery_type_gets_midroll() {
        let emitter = EventEmitter::new();
        let seen = capture(&emitter);
        let source = Source::new("file:///a.webm", DeliveryType::Unknown);
        let config = CuePointConfig {
            midroll_offset_ms: 4_000,
            kind: "promo".into(),
        };

        setup_cue_points(&emitter, &source, &config);

        let cues = seen.lock().unwrap();
        assert_eq!(cues[1].position, CuePosition::At(4_000));
        assert_eq!(cues[1].kind, "promo");
    }

    #[test]
    fn test_install_reacts_to_did_set_source() {
        let emitter = EventEmitter::new();
        let seen = capture(&emitter);
        install(&emitter, CuePointConfig::default());

        let source = Source::new("https://cdn.example.com/a.mp4", DeliveryType::Mp4);
        emitter.emit_event(&Event::new(EventKind::DidSetSource).with(keys::SOURCE, &source));
        assert_eq!(seen.lock().unwrap().len(), 3);

        // No source property: nothing registered
        emitter.emit(EventKind::DidSetSource);
        assert_eq!(seen.lock().unwrap().len(), 3);
    }
}
