//! Secondary video surface seam.
//!
//! The host owns the UI container and the video widget; the plugin only
//! asks it for a surface, plays a URL on it and tears it down again.

use std::sync::{Arc, Weak};

use crate::error::PluginError;

/// Identity of a surface for the lifetime of one interruption.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceId(pub u64);

/// How a surface is placed inside its container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// Match the container in both dimensions, centered.
    FillCentered,
}

impl Layout {
    pub fn fill_centered() -> Self {
        Layout::FillCentered
    }
}

/// Receives playback outcome callbacks from a surface.
pub trait PlaybackListener: Send + Sync {
    fn on_completion(&self, surface: SurfaceId);

    /// Returns true if the error was handled.
    fn on_error(&self, surface: SurfaceId, what: i32, extra: i32) -> bool;
}

/// A video widget hosted inside the player's container.
///
/// Callbacks may be delivered from inside [`VideoSurface::play`] or at any
/// later point; implementations must not hold internal locks while calling
/// the listener.
pub trait VideoSurface: Send + Sync {
    fn id(&self) -> SurfaceId;

    fn set_listener(&self, listener: Weak<dyn PlaybackListener>);

    fn play(&self, url: &str) -> Result<(), PluginError>;

    /// Release playback resources.
    fn suspend(&self) -> Result<(), PluginError>;
}

/// The UI container that hosts transient surfaces.
pub trait SurfaceHost: Send + Sync {
    /// Create a new surface and add it to the container.
    fn attach(&self, layout: Layout) -> Result<Arc<dyn VideoSurface>, PluginError>;

    /// Remove a surface from the container.
    fn detach(&self, surface: SurfaceId);
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_centered_layout() {
        assert_eq!(Layout::fill_centered(), Layout::FillCentered);
    }
}
