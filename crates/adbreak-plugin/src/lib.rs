//! adbreak sample plugin
//!
//! A bus component that interrupts content playback at cue points to play a
//! placeholder advertisement on a transient video surface, then asks the
//! host to resume the interrupted content. A companion logger records the
//! properties of the common playback lifecycle events.

pub mod config;
pub mod error;
pub mod interruption;
pub mod logger;
pub mod plugin;
pub mod surface;

pub use config::PluginConfig;
pub use error::PluginError;
pub use interruption::AdInterruption;
pub use logger::PlaybackLogger;
pub use plugin::SamplePlugin;
pub use surface::{Layout, PlaybackListener, SurfaceHost, SurfaceId, VideoSurface};
