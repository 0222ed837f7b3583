//! A player view with the sample plugin attached, driven tick by tick.

use std::sync::Arc;
use std::time::Duration;

use adbreak_event::EventEmitter;
use adbreak_plugin::{SamplePlugin, SurfaceHost};

use crate::config::PlayerConfig;
use crate::cue_points;
use crate::error::PlayerError;
use crate::player::{ContentPlayer, PlaybackStatus};
use crate::playlist::Video;
use crate::surfaces::SimulatedSurfaceHost;

/// Upper bound on interruptions per video used to size the step budget.
const MAX_BREAKS_PER_VIDEO: u64 = 8;

pub struct Session {
    emitter: EventEmitter,
    surfaces: Arc<SimulatedSurfaceHost>,
    plugin: SamplePlugin,
    player: ContentPlayer,
    tick_ms: u64,
    ad_duration_ms: u64,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("player", &self.player)
            .field("plugin", &self.plugin)
            .field("tick_ms", &self.tick_ms)
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Wire a player view: plugin first, then cue point setup, then the player.
    pub fn new(config: &PlayerConfig) -> Self {
        let emitter = EventEmitter::new();
        let surfaces = Arc::new(SimulatedSurfaceHost::new(config.ad_duration_ms));
        let plugin = SamplePlugin::new(
            &emitter,
            Arc::clone(&surfaces) as Arc<dyn SurfaceHost>,
            &config.plugin,
        );
        cue_points::install(&emitter, config.cue_points.clone());
        let player = ContentPlayer::attach(&emitter, config.progress_interval_ms);

        Self {
            emitter,
            surfaces,
            plugin,
            player,
            tick_ms: config.progress_interval_ms.max(1),
            ad_duration_ms: config.ad_duration_ms,
        }
    }

    pub fn emitter(&self) -> &EventEmitter {
        &self.emitter
    }

    pub fn surfaces(&self) -> &SimulatedSurfaceHost {
        &self.surfaces
    }

    pub fn plugin(&self) -> &SamplePlugin {
        &self.plugin
    }

    pub fn player(&self) -> &ContentPlayer {
        &self.player
    }

    /// Load `video`, start it, and return the step budget for playing it out.
    fn begin(&self, video: &Video) -> Result<u64, PlayerError> {
        self.player.load(video)?;
        self.player.play();
        let ad_steps = self.ad_duration_ms / self.tick_ms + 1;
        Ok(video.duration_ms / self.tick_ms + 1 + MAX_BREAKS_PER_VIDEO * ad_steps)
    }

    /// Advance whichever of placeholder or content currently owns the clock.
    pub fn step(&self) -> Result<(), PlayerError> {
        if self.surfaces.has_live_surface() {
            self.surfaces.advance(self.tick_ms);
            return Ok(());
        }
        if self.player.is_suppressed() {
            return Err(PlayerError::Stalled(
                "content suppressed with no live placeholder".into(),
            ));
        }
        match self.player.status() {
            PlaybackStatus::Playing => {
                self.player.advance(self.tick_ms);
                Ok(())
            }
            PlaybackStatus::Finished => Ok(()),
            status => Err(PlayerError::Stalled(format!("player is {status:?}"))),
        }
    }

    /// Play `video` to completion as fast as possible.
    pub fn run_video(&self, video: &Video) -> Result<(), PlayerError> {
        let budget = self.begin(video)?;
        for _ in 0..budget {
            if self.player.is_finished() {
                return Ok(());
            }
            self.step()?;
        }
        self.finished_within_budget(video)
    }

    /// Play `video` to completion, sleeping one tick (scaled by `speed`)
    /// between steps.
    pub async fn run_video_paced(&self, video: &Video, speed: f64) -> Result<(), PlayerError> {
        let tick = Duration::from_secs_f64(self.tick_ms as f64 / 1000.0 / speed.max(f64::EPSILON));
        let budget = self.begin(video)?;
        for _ in 0..budget {
            if self.player.is_finished() {
                return Ok(());
            }
            self.step()?;
            tokio::time::sleep(tick).await;
        }
        self.finished_within_budget(video)
    }

    fn finished_within_budget(&self, video: &Video) -> Result<(), PlayerError> {
        if self.player.is_finished() {
            return Ok(());
        }
        Err(PlayerError::Stalled(format!(
            "video '{}' did not finish (position {} ms)",
            video.id,
            self.player.position()
        )))
    }
}
