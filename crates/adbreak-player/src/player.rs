//! Headless content player.
//!
//! Plays one video at a time against a millisecond clock advanced by the
//! caller, fires cue points as playback crosses them, and honours the
//! interrupt/resume protocol: `will_interrupt_content` suppresses content,
//! `will_resume_content` replays the event the cue point interrupted.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use adbreak_event::{keys, CuePoint, CuePosition, Event, EventEmitter, EventKind, ListenerId};
use serde_json::Value;

use crate::error::PlayerError;
use crate::playlist::Video;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PlaybackStatus {
    #[default]
    Idle,
    Loaded,
    Playing,
    Paused,
    Finished,
}

#[derive(Debug)]
struct TrackedCuePoint {
    cue: CuePoint,
    fired: bool,
}

#[derive(Debug, Default)]
struct PlayerState {
    video: Option<Video>,
    cue_points: Vec<TrackedCuePoint>,
    position: u64,
    next_progress: u64,
    status: PlaybackStatus,
    /// Content is held back while an interruption is live.
    suppressed: bool,
}

impl PlayerState {
    /// Mark every unfired cue point matching `pred` as fired and return them.
    fn fire(&mut self, pred: impl Fn(&CuePosition) -> bool) -> Vec<CuePoint> {
        self.cue_points
            .iter_mut()
            .filter(|t| !t.fired && pred(&t.cue.position))
            .map(|t| {
                t.fired = true;
                t.cue.clone()
            })
            .collect()
    }

    /// Earliest unfired mid-roll at or after the playhead.
    fn next_midroll(&self) -> Option<u64> {
        self.cue_points
            .iter()
            .filter(|t| !t.fired)
            .filter_map(|t| match t.cue.position {
                CuePosition::At(ms) if ms >= self.position => Some(ms),
                _ => None,
            })
            .min()
    }
}

/// Post-roll cue points first, then completion.
fn end_step(state: &mut PlayerState, duration: u64) -> Step {
    let after = state.fire(|p| *p == CuePosition::After);
    if after.is_empty() {
        return Step::Finish;
    }
    Step::CuePoint {
        cues: after,
        original: Event::new(EventKind::Completed).with(keys::PLAYHEAD_POSITION, duration),
    }
}

/// What `advance` does next, decided under the lock and performed after it.
enum Step {
    Progress { position: u64, duration: u64 },
    CuePoint { cues: Vec<CuePoint>, original: Event },
    Finish,
    Idle,
}

struct PlayerInner {
    emitter: EventEmitter,
    progress_interval_ms: u64,
    state: Mutex<PlayerState>,
}

pub struct ContentPlayer {
    inner: Arc<PlayerInner>,
    listeners: Vec<ListenerId>,
}

impl std::fmt::Debug for ContentPlayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentPlayer")
            .field("status", &self.status())
            .field("position", &self.position())
            .finish_non_exhaustive()
    }
}

fn listen(
    emitter: &EventEmitter,
    inner: &Arc<PlayerInner>,
    kind: EventKind,
    handler: fn(&PlayerInner, &Event),
) -> ListenerId {
    let weak: Weak<PlayerInner> = Arc::downgrade(inner);
    emitter.on(kind, move |event| {
        if let Some(inner) = weak.upgrade() {
            handler(&inner, event);
        }
    })
}

impl ContentPlayer {
    /// Create a player and subscribe it to `emitter`.
    pub fn attach(emitter: &EventEmitter, progress_interval_ms: u64) -> Self {
        let inner = Arc::new(PlayerInner {
            emitter: emitter.clone(),
            progress_interval_ms: progress_interval_ms.max(1),
            state: Mutex::new(PlayerState::default()),
        });

        let listeners = vec![
            listen(emitter, &inner, EventKind::SetCuePoint, PlayerInner::on_set_cue_point),
            listen(emitter, &inner, EventKind::WillInterruptContent, |p, _| p.on_interrupt()),
            listen(emitter, &inner, EventKind::WillResumeContent, PlayerInner::on_resume),
            listen(emitter, &inner, EventKind::Play, PlayerInner::on_play),
            listen(emitter, &inner, EventKind::Pause, |p, _| p.on_pause()),
            listen(emitter, &inner, EventKind::SeekTo, PlayerInner::on_seek),
            listen(emitter, &inner, EventKind::Stop, |p, _| p.on_stop()),
        ];

        Self { inner, listeners }
    }

    /// Make `video` current. Cue points from a previous video are dropped.
    pub fn load(&self, video: &Video) -> Result<(), PlayerError> {
        let source = video
            .preferred_source()
            .cloned()
            .ok_or_else(|| PlayerError::NoSource(video.id.clone()))?;

        *self.inner.lock() = PlayerState {
            video: Some(video.clone()),
            status: PlaybackStatus::Loaded,
            next_progress: self.inner.progress_interval_ms,
            ..PlayerState::default()
        };
        tracing::info!(video = %video.id, url = %source.url, "video loaded");

        let emitter = &self.inner.emitter;
        emitter.emit_event(
            &Event::new(EventKind::DidSetSource)
                .with(keys::SOURCE, &source)
                .with(keys::VIDEO, video),
        );
        emitter.emit_event(&Event::new(EventKind::DidSetVideo).with(keys::VIDEO, video));
        Ok(())
    }

    pub fn play(&self) {
        self.inner.emitter.emit(EventKind::Play);
    }

    pub fn pause(&self) {
        self.inner.emitter.emit(EventKind::Pause);
    }

    pub fn seek_to(&self, position_ms: u64) {
        self.inner
            .emitter
            .emit_event(&Event::new(EventKind::SeekTo).with(keys::SEEK_POSITION, position_ms));
    }

    pub fn stop(&self) {
        self.inner.emitter.emit(EventKind::Stop);
    }

    /// Move the playhead forward by up to `ms`, stopping early at a cue
    /// point that suppresses content.
    pub fn advance(&self, ms: u64) {
        self.inner.advance(ms);
    }

    pub fn status(&self) -> PlaybackStatus {
        self.inner.lock().status
    }

    pub fn position(&self) -> u64 {
        self.inner.lock().position
    }

    pub fn is_suppressed(&self) -> bool {
        self.inner.lock().suppressed
    }

    pub fn is_finished(&self) -> bool {
        self.status() == PlaybackStatus::Finished
    }

    /// Registered cue points and whether each has fired.
    pub fn cue_points(&self) -> Vec<(CuePoint, bool)> {
        self.inner
            .lock()
            .cue_points
            .iter()
            .map(|t| (t.cue.clone(), t.fired))
            .collect()
    }

    pub fn detach(&mut self) {
        for id in self.listeners.drain(..) {
            self.inner.emitter.off(id);
        }
    }
}

impl PlayerInner {
    fn lock(&self) -> MutexGuard<'_, PlayerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn on_set_cue_point(&self, event: &Event) {
        match event.cue_point() {
            Some(cue) => {
                tracing::debug!(position = ?cue.position, kind = %cue.kind, "cue point set");
                self.lock().cue_points.push(TrackedCuePoint { cue, fired: false });
            }
            None => tracing::warn!("set_cue_point without a cue point, ignoring"),
        }
    }

    fn on_interrupt(&self) {
        let position = {
            let mut state = self.lock();
            state.suppressed = true;
            (state.status == PlaybackStatus::Playing).then_some(state.position)
        };
        tracing::debug!("content interrupted");
        if let Some(position) = position {
            self.emitter.emit_event(
                &Event::new(EventKind::DidPause).with(keys::PLAYHEAD_POSITION, position),
            );
        }
    }

    fn on_resume(&self, event: &Event) {
        self.lock().suppressed = false;

        let original = event.original_event().unwrap_or_else(|| {
            tracing::warn!("will_resume_content without an original event, playing on");
            Event::new(EventKind::Play).with(keys::SKIP_CUE_POINTS, true)
        });
        tracing::debug!(original_event = %original, "content resumed");

        match original.kind {
            EventKind::Play => self.on_play(&original),
            EventKind::Completed => self.finish(),
            _ => self.start(),
        }
    }

    fn on_play(&self, event: &Event) {
        let cues = {
            let mut state = self.lock();
            if state.video.is_none() || state.status == PlaybackStatus::Finished {
                tracing::warn!(status = ?state.status, "play requested with nothing to play");
                return;
            }
            if state.suppressed {
                tracing::debug!("play requested while content is interrupted, ignoring");
                return;
            }
            if state.position == 0 {
                let before = state.fire(|p| *p == CuePosition::Before);
                if event.skip_cue_points() {
                    Vec::new()
                } else {
                    before
                }
            } else {
                Vec::new()
            }
        };

        if cues.is_empty() {
            self.start();
            return;
        }

        self.cue_point(cues, event.clone());
        // Nobody interrupted (or the interruption already resumed): play on.
        let idle = {
            let state = self.lock();
            !state.suppressed && state.status == PlaybackStatus::Loaded
        };
        if idle {
            self.start();
        }
    }

    fn on_pause(&self) {
        let position = {
            let mut state = self.lock();
            if state.status != PlaybackStatus::Playing {
                return;
            }
            state.status = PlaybackStatus::Paused;
            state.position
        };
        self.emitter
            .emit_event(&Event::new(EventKind::DidPause).with(keys::PLAYHEAD_POSITION, position));
    }

    /// Seeking does not fire the cue points it jumps over.
    fn on_seek(&self, event: &Event) {
        let Some(requested) = event.get(keys::SEEK_POSITION).and_then(Value::as_u64) else {
            tracing::warn!("seek_to without a seek position, ignoring");
            return;
        };
        let position = {
            let mut state = self.lock();
            let Some(duration) = state.video.as_ref().map(|v| v.duration_ms) else {
                return;
            };
            let position = requested.min(duration);
            state.position = position;
            state.next_progress = (position / self.progress_interval_ms + 1) * self.progress_interval_ms;
            position
        };
        self.emitter
            .emit_event(&Event::new(EventKind::DidSeekTo).with(keys::SEEK_POSITION, position));
    }

    fn on_stop(&self) {
        {
            let mut state = self.lock();
            if matches!(state.status, PlaybackStatus::Idle | PlaybackStatus::Finished) {
                return;
            }
            state.status = PlaybackStatus::Finished;
        }
        self.emitter.emit(EventKind::DidStop);
    }

    fn start(&self) {
        let position = {
            let mut state = self.lock();
            state.status = PlaybackStatus::Playing;
            state.position
        };
        self.emitter
            .emit_event(&Event::new(EventKind::DidPlay).with(keys::PLAYHEAD_POSITION, position));
    }

    fn cue_point(&self, cues: Vec<CuePoint>, original: Event) {
        let position = self.lock().position;
        tracing::debug!(count = cues.len(), position, "cue point reached");
        let cues: Vec<Value> = cues.iter().map(Value::from).collect();
        self.emitter.emit_event(
            &Event::new(EventKind::CuePoint)
                .with(keys::CUE_POINTS, cues)
                .with(keys::ORIGINAL_EVENT, &original)
                .with(keys::PLAYHEAD_POSITION, position),
        );
    }

    fn finish(&self) {
        let position = {
            let mut state = self.lock();
            if state.status == PlaybackStatus::Finished {
                return;
            }
            state.status = PlaybackStatus::Finished;
            state.position
        };
        tracing::info!(position, "content completed");
        self.emitter
            .emit_event(&Event::new(EventKind::Completed).with(keys::PLAYHEAD_POSITION, position));
        self.emitter.emit(EventKind::DidStop);
    }

    fn next_step(&self, target: u64) -> Step {
        let mut state = self.lock();
        if state.status != PlaybackStatus::Playing || state.suppressed {
            return Step::Idle;
        }
        let Some(duration) = state.video.as_ref().map(|v| v.duration_ms) else {
            return Step::Idle;
        };

        if state.position >= duration {
            return end_step(&mut state, duration);
        }

        let boundary = [Some(state.next_progress), state.next_midroll(), Some(duration)]
            .into_iter()
            .flatten()
            .min()
            .unwrap_or(duration);
        if boundary > target {
            state.position = target;
            return Step::Idle;
        }
        state.position = boundary;

        let midrolls = state.fire(|p| *p == CuePosition::At(boundary));
        if !midrolls.is_empty() {
            let original = Event::new(EventKind::Play).with(keys::PLAYHEAD_POSITION, boundary);
            return Step::CuePoint {
                cues: midrolls,
                original,
            };
        }
        if boundary == state.next_progress {
            state.next_progress += self.progress_interval_ms;
            return Step::Progress {
                position: boundary,
                duration,
            };
        }
        if boundary == duration {
            return end_step(&mut state, duration);
        }
        Step::Idle
    }

    fn advance(&self, ms: u64) {
        let target = {
            let state = self.lock();
            let duration = state.video.as_ref().map_or(0, |v| v.duration_ms);
            state.position.saturating_add(ms).min(duration)
        };

        loop {
            match self.next_step(target) {
                Step::Idle => break,
                Step::Progress { position, duration } => {
                    self.emitter.emit_event(
                        &Event::new(EventKind::Progress)
                            .with(keys::PLAYHEAD_POSITION, position)
                            .with(keys::DURATION, duration),
                    );
                }
                Step::CuePoint { cues, original } => self.cue_point(cues, original),
                Step::Finish => self.finish(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use adbreak_event::{DeliveryType, Source};

    struct Harness {
        emitter: EventEmitter,
        player: ContentPlayer,
        events: Arc<Mutex<Vec<Event>>>,
    }

    fn video(duration_ms: u64) -> Video {
        Video {
            id: "clip".into(),
            name: "Clip".into(),
            duration_ms,
            sources: vec![Source::new("https://cdn.example.com/clip.mp4", DeliveryType::Mp4)],
        }
    }

    fn harness() -> Harness {
        let emitter = EventEmitter::new();
        let events = Arc::new(Mutex::new(Vec::new()));
        for kind in EventKind::ALL {
            let sink = Arc::clone(&events);
            emitter.on(kind, move |e| sink.lock().unwrap().push(e.clone()));
        }
        let player = ContentPlayer::attach(&emitter, 500);
        Harness {
            emitter,
            player,
            events,
        }
    }

    impl Harness {
        fn set_cue_point(&self, cue: CuePoint) {
            self.emitter
                .emit_event(&Event::new(EventKind::SetCuePoint).with(keys::CUE_POINT, Value::from(&cue)));
        }

        fn take(&self) -> Vec<Event> {
            std::mem::take(&mut *self.events.lock().unwrap())
        }

        fn kinds(&self) -> Vec<EventKind> {
            self.take().into_iter().map(|e| e.kind).collect()
        }

        fn interrupt_on_cue_points(&self) {
            let bus = self.emitter.clone();
            self.emitter
                .on(EventKind::CuePoint, move |_| bus.emit(EventKind::WillInterruptContent));
        }

        fn resume(&self, original: &Event) {
            self.emitter.emit_event(
                &Event::new(EventKind::WillResumeContent).with(keys::ORIGINAL_EVENT, original),
            );
        }
    }

    #[test]
    fn test_load_announces_source_then_video() {
        let h = harness();
        h.player.load(&video(5_000)).unwrap();

        let events = h.take();
        assert_eq!(events[0].kind, EventKind::DidSetSource);
        assert_eq!(
            events[0].source().map(|s| s.delivery_type),
            Some(DeliveryType::Mp4)
        );
        assert_eq!(events[0].get(keys::VIDEO).unwrap()["id"], "clip");
        assert_eq!(events[1].kind, EventKind::DidSetVideo);
        assert_eq!(h.player.status(), PlaybackStatus::Loaded);
    }

    #[test]
    fn test_load_without_source_fails() {
        let h = harness();
        let mut v = video(5_000);
        v.sources.clear();
        let err = h.player.load(&v).unwrap_err();
        assert!(matches!(err, PlayerError::NoSource(id) if id == "clip"));
    }

    #[test]
    fn test_progress_every_interval() {
        let h = harness();
        h.player.load(&video(5_000)).unwrap();
        h.player.play();
        h.take();

        h.player.advance(1_200);
        let positions: Vec<Option<u64>> = h
            .take()
            .iter()
            .filter(|e| e.kind == EventKind::Progress)
            .map(Event::playhead_position)
            .collect();
        assert_eq!(positions, vec![Some(500), Some(1_000)]);
        assert_eq!(h.player.position(), 1_200);
    }

    #[test]
    fn test_preroll_fires_with_play_as_original_event() {
        let h = harness();
        h.player.load(&video(5_000)).unwrap();
        h.set_cue_point(CuePoint::before("ad"));
        h.take();

        h.player.play();
        let events = h.take();
        let cue = events
            .iter()
            .find(|e| e.kind == EventKind::CuePoint)
            .expect("pre-roll cue point");
        assert_eq!(cue.original_event().map(|o| o.kind), Some(EventKind::Play));
        assert_eq!(cue.cue_points()[0].position, CuePosition::Before);

        // Without anyone interrupting, content starts anyway.
        assert_eq!(events.last().map(|e| e.kind), Some(EventKind::DidPlay));
        assert_eq!(h.player.status(), PlaybackStatus::Playing);
    }

    #[test]
    fn test_interruption_suppresses_content_until_resume() {
        let h = harness();
        h.interrupt_on_cue_points();
        h.player.load(&video(20_000)).unwrap();
        h.set_cue_point(CuePoint::at(10_000, "ad"));
        h.player.play();
        h.take();

        h.player.advance(12_000);
        assert!(h.player.is_suppressed());
        assert_eq!(h.player.position(), 10_000);
        let events = h.take();
        let cue = events
            .iter()
            .find(|e| e.kind == EventKind::CuePoint)
            .expect("mid-roll cue point");
        let original = cue.original_event().unwrap();
        assert_eq!(original.kind, EventKind::Play);
        assert_eq!(original.playhead_position(), Some(10_000));
        assert!(events.iter().any(|e| e.kind == EventKind::DidPause));

        // Suppressed content does not move.
        h.player.advance(1_000);
        assert_eq!(h.player.position(), 10_000);

        h.resume(&original);
        assert!(!h.player.is_suppressed());
        assert_eq!(h.player.status(), PlaybackStatus::Playing);

        // The mid-roll does not fire twice.
        h.player.advance(2_000);
        assert_eq!(h.player.position(), 12_000);
        assert!(!h.kinds().contains(&EventKind::CuePoint));
    }

    #[test]
    fn test_postroll_then_completion() {
        let h = harness();
        h.interrupt_on_cue_points();
        h.player.load(&video(1_000)).unwrap();
        h.set_cue_point(CuePoint::after("ad"));
        h.player.play();
        h.take();

        h.player.advance(5_000);
        let events = h.take();
        let cue = events
            .iter()
            .find(|e| e.kind == EventKind::CuePoint)
            .expect("post-roll cue point");
        let original = cue.original_event().unwrap();
        assert_eq!(original.kind, EventKind::Completed);
        assert!(!h.player.is_finished());

        h.resume(&original);
        assert_eq!(
            h.kinds(),
            vec![
                EventKind::WillResumeContent,
                EventKind::Completed,
                EventKind::DidStop
            ]
        );
        assert!(h.player.is_finished());
    }

    #[test]
    fn test_completion_without_cue_points() {
        let h = harness();
        h.player.load(&video(1_000)).unwrap();
        h.player.play();
        h.take();

        h.player.advance(1_000);
        assert_eq!(
            h.kinds(),
            vec![
                EventKind::Progress,
                EventKind::Progress,
                EventKind::Completed,
                EventKind::DidStop
            ]
        );
        assert!(h.player.is_finished());
    }

    #[test]
    fn test_resume_with_skip_cue_points_does_not_refire_preroll() {
        let h = harness();
        h.interrupt_on_cue_points();
        h.player.load(&video(5_000)).unwrap();
        h.set_cue_point(CuePoint::before("ad"));
        h.player.play();
        assert!(h.player.is_suppressed());
        h.take();

        h.resume(&Event::new(EventKind::Play).with(keys::SKIP_CUE_POINTS, true));
        let kinds = h.kinds();
        assert!(!kinds.contains(&EventKind::CuePoint));
        assert!(kinds.contains(&EventKind::DidPlay));
        assert!(h.player.cue_points().iter().all(|(_, fired)| *fired));
    }

    #[test]
    fn test_seek_skips_midroll_and_realigns_progress() {
        let h = harness();
        h.player.load(&video(20_000)).unwrap();
        h.set_cue_point(CuePoint::at(10_000, "ad"));
        h.player.play();
        h.player.seek_to(12_300);
        h.take();

        h.player.advance(300);
        let events = h.take();
        assert!(!events.iter().any(|e| e.kind == EventKind::CuePoint));
        assert_eq!(events[0].playhead_position(), Some(12_500));
    }

    #[test]
    fn test_pause_stops_the_clock() {
        let h = harness();
        h.player.load(&video(5_000)).unwrap();
        h.player.play();
        h.player.advance(700);
        h.player.pause();
        h.player.advance(700);
        assert_eq!(h.player.position(), 700);
        assert_eq!(h.player.status(), PlaybackStatus::Paused);
    }

    #[test]
    fn test_stop_finishes_playback() {
        let h = harness();
        h.player.load(&video(5_000)).unwrap();
        h.player.play();
        h.take();
        h.player.stop();
        assert_eq!(h.kinds(), vec![EventKind::Stop, EventKind::DidStop]);
        assert!(h.player.is_finished());
    }

    #[test]
    fn test_set_cue_point_without_payload_ignored() {
        let h = harness();
        h.emitter.emit(EventKind::SetCuePoint);
        assert!(h.player.cue_points().is_empty());
    }
}
