//! Simulated secondary video surfaces.
//!
//! Surfaces "play" their media for a fixed duration on the same clock the
//! content player uses, then report completion (or an error, for media
//! registered as failing) to their listener.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use adbreak_plugin::{Layout, PlaybackListener, PluginError, SurfaceHost, SurfaceId, VideoSurface};

/// Error codes reported for media that fails to play.
const MEDIA_ERROR_UNKNOWN: i32 = 1;
const MEDIA_ERROR_IO: i32 = -1004;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Default)]
struct SurfaceState {
    listener: Option<Weak<dyn PlaybackListener>>,
    url: Option<String>,
    remaining_ms: u64,
    playing: bool,
    released: bool,
    fails: bool,
}

pub struct SimulatedSurface {
    id: SurfaceId,
    layout: Layout,
    duration_ms: u64,
    failing: Arc<Mutex<HashSet<String>>>,
    state: Mutex<SurfaceState>,
}

impl SimulatedSurface {
    pub fn layout(&self) -> Layout {
        self.layout
    }

    pub fn url(&self) -> Option<String> {
        lock(&self.state).url.clone()
    }

    pub fn is_released(&self) -> bool {
        lock(&self.state).released
    }

    /// Run the clock; returns the listener callback due, if playback ended.
    fn tick(&self, ms: u64) -> Option<(Arc<dyn PlaybackListener>, bool)> {
        let mut state = lock(&self.state);
        if !state.playing || state.released {
            return None;
        }
        state.remaining_ms = state.remaining_ms.saturating_sub(ms);
        if state.remaining_ms > 0 && !state.fails {
            return None;
        }
        state.playing = false;
        let listener = state.listener.as_ref().and_then(Weak::upgrade)?;
        Some((listener, state.fails))
    }
}

impl VideoSurface for SimulatedSurface {
    fn id(&self) -> SurfaceId {
        self.id
    }

    fn set_listener(&self, listener: Weak<dyn PlaybackListener>) {
        lock(&self.state).listener = Some(listener);
    }

    fn play(&self, url: &str) -> Result<(), PluginError> {
        if url.trim().is_empty() {
            return Err(PluginError::Surface("no media url".into()));
        }
        let fails = lock(&self.failing).contains(url);
        let mut state = lock(&self.state);
        if state.released {
            return Err(PluginError::Surface(format!("surface {} released", self.id.0)));
        }
        state.url = Some(url.to_string());
        state.remaining_ms = self.duration_ms;
        state.playing = true;
        state.fails = fails;
        tracing::debug!(surface = self.id.0, url, "placeholder playing");
        Ok(())
    }

    fn suspend(&self) -> Result<(), PluginError> {
        let mut state = lock(&self.state);
        if state.released {
            return Err(PluginError::SurfaceRelease(format!(
                "surface {} already released",
                self.id.0
            )));
        }
        state.released = true;
        state.playing = false;
        Ok(())
    }
}

/// Container hosting simulated surfaces.
pub struct SimulatedSurfaceHost {
    ad_duration_ms: u64,
    failing: Arc<Mutex<HashSet<String>>>,
    attached: Mutex<Vec<Arc<SimulatedSurface>>>,
    created: AtomicU64,
}

impl SimulatedSurfaceHost {
    pub fn new(ad_duration_ms: u64) -> Self {
        Self {
            ad_duration_ms,
            failing: Arc::new(Mutex::new(HashSet::new())),
            attached: Mutex::new(Vec::new()),
            created: AtomicU64::new(0),
        }
    }

    /// Make playback of `url` end in an error.
    pub fn fail_media(&self, url: impl Into<String>) {
        lock(&self.failing).insert(url.into());
    }

    pub fn has_live_surface(&self) -> bool {
        !lock(&self.attached).is_empty()
    }

    pub fn attached(&self) -> Vec<Arc<SimulatedSurface>> {
        lock(&self.attached).clone()
    }

    /// Total surfaces ever created.
    pub fn created(&self) -> u64 {
        self.created.load(Ordering::SeqCst)
    }

    /// Advance every attached surface by `ms`, delivering due callbacks.
    pub fn advance(&self, ms: u64) {
        let due: Vec<(SurfaceId, Arc<dyn PlaybackListener>, bool)> = lock(&self.attached)
            .iter()
            .filter_map(|s| s.tick(ms).map(|(l, fails)| (s.id, l, fails)))
            .collect();
        // Locks dropped: listeners detach surfaces from inside the callback.

        for (id, listener, fails) in due {
            if fails {
                listener.on_error(id, MEDIA_ERROR_UNKNOWN, MEDIA_ERROR_IO);
            } else {
                listener.on_completion(id);
            }
        }
    }
}

impl SurfaceHost for SimulatedSurfaceHost {
    fn attach(&self, layout: Layout) -> Result<Arc<dyn VideoSurface>, PluginError> {
        let id = SurfaceId(self.created.fetch_add(1, Ordering::SeqCst));
        let surface = Arc::new(SimulatedSurface {
            id,
            layout,
            duration_ms: self.ad_duration_ms,
            failing: Arc::clone(&self.failing),
            state: Mutex::new(SurfaceState::default()),
        });
        lock(&self.attached).push(Arc::clone(&surface));
        tracing::debug!(surface = id.0, "surface attached");
        Ok(surface)
    }

    fn detach(&self, surface: SurfaceId) {
        lock(&self.attached).retain(|s| s.id != surface);
        tracing::debug!(surface = surface.0, "surface detached");
    }
}
