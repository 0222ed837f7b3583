//! Sample host application for the adbreak plugin.
//!
//! Wires the sample plugin into a headless player view, registers pre-roll,
//! mid-roll and post-roll cue points when a source is set, and plays a
//! playlist to completion.

pub mod config;
pub mod cue_points;
pub mod error;
pub mod player;
pub mod playlist;
pub mod session;
pub mod surfaces;

pub use config::{CuePointConfig, PlayerConfig};
pub use error::PlayerError;
pub use player::{ContentPlayer, PlaybackStatus};
pub use playlist::{Playlist, Video};
pub use session::Session;
pub use surfaces::{SimulatedSurface, SimulatedSurfaceHost};
