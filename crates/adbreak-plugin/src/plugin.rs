//! The sample plugin: ad interruption plus lifecycle logging.

use std::sync::Arc;

use adbreak_event::{describe, Component, EventEmitter, EventKind};

use crate::config::PluginConfig;
use crate::interruption::AdInterruption;
use crate::logger::PlaybackLogger;
use crate::surface::SurfaceHost;

const EMITS: &[EventKind] = &[
    EventKind::WillInterruptContent,
    EventKind::WillResumeContent,
];

const LISTENS_FOR: &[EventKind] = &[
    EventKind::Completed,
    EventKind::CuePoint,
    EventKind::DidPause,
    EventKind::DidPlay,
    EventKind::DidSeekTo,
    EventKind::DidSetSource,
    EventKind::DidSetVideo,
    EventKind::DidStop,
    EventKind::Progress,
];

/// Constructed once per player view.
#[derive(Debug)]
pub struct SamplePlugin {
    interruption: Arc<AdInterruption>,
    logger: PlaybackLogger,
}

impl SamplePlugin {
    pub fn new(emitter: &EventEmitter, host: Arc<dyn SurfaceHost>, config: &PluginConfig) -> Self {
        tracing::info!(placeholder = %config.placeholder_url, "initializing sample plugin");

        let plugin = Self {
            interruption: AdInterruption::attach(emitter, host, config),
            logger: PlaybackLogger::attach(emitter),
        };
        describe(&plugin);
        plugin
    }

    pub fn interruption(&self) -> &Arc<AdInterruption> {
        &self.interruption
    }

    /// Unsubscribe every handler from the bus.
    pub fn detach(&mut self) {
        self.interruption.detach();
        self.logger.detach();
    }
}

impl Component for SamplePlugin {
    fn name(&self) -> &str {
        "sample-plugin"
    }

    fn emits(&self) -> &[EventKind] {
        EMITS
    }

    fn listens_for(&self) -> &[EventKind] {
        LISTENS_FOR
    }
}
