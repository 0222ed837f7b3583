//! Playlist loading.
//!
//! Playlists are TOML files listing videos and their sources:
//!
//! ```toml
//! [[videos]]
//! id = "intro"
//! name = "Intro"
//! duration_ms = 30000
//!
//! [[videos.sources]]
//! url = "https://cdn.example.com/intro.mp4"
//! delivery_type = "mp4"
//! ```

use std::path::Path;

use adbreak_event::{DeliveryType, Source};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::PlayerError;

/// A playable video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Video {
    pub id: String,
    pub name: String,
    pub duration_ms: u64,
    #[serde(default)]
    pub sources: Vec<Source>,
}

impl Video {
    /// The source the player will use.
    pub fn preferred_source(&self) -> Option<&Source> {
        self.sources.first()
    }
}

impl From<&Video> for Value {
    fn from(video: &Video) -> Self {
        json!({
            "id": video.id,
            "name": video.name,
            "duration": video.duration_ms,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Playlist {
    #[serde(default)]
    pub videos: Vec<Video>,
}

impl Playlist {
    /// Read and validate a playlist file.
    pub fn load(path: &Path) -> Result<Self, PlayerError> {
        let content = std::fs::read_to_string(path)?;
        let playlist = Self::from_toml_str(&content)?;
        tracing::info!(
            path = %path.display(),
            videos = playlist.videos.len(),
            "playlist loaded"
        );
        Ok(playlist)
    }

    /// Parse and validate a playlist from TOML.
    pub fn from_toml_str(content: &str) -> Result<Self, PlayerError> {
        let playlist: Playlist = toml::from_str(content)?;
        playlist.validate()?;
        Ok(playlist)
    }

    fn validate(&self) -> Result<(), PlayerError> {
        if self.videos.is_empty() {
            return Err(PlayerError::InvalidPlaylist(
                "playlist must contain at least one video".into(),
            ));
        }
        for video in &self.videos {
            if video.id.trim().is_empty() {
                return Err(PlayerError::InvalidPlaylist("video id must not be empty".into()));
            }
            if video.duration_ms == 0 {
                return Err(PlayerError::InvalidPlaylist(format!(
                    "video '{}' must have a positive duration",
                    video.id
                )));
            }
            if video.sources.is_empty() {
                return Err(PlayerError::InvalidPlaylist(format!(
                    "video '{}' has no sources",
                    video.id
                )));
            }
        }
        Ok(())
    }

    /// Built-in playlist: one progressive video and one HLS stream.
    pub fn sample() -> Self {
        Self {
            videos: vec![
                Video {
                    id: "stitch-1".into(),
                    name: "Stitch (progressive)".into(),
                    duration_ms: 30_000,
                    sources: vec![Source::new(
                        "https://media.example.com/stitch/stitch-1.mp4",
                        DeliveryType::Mp4,
                    )],
                },
                Video {
                    id: "stitch-2".into(),
                    name: "Stitch (HLS)".into(),
                    duration_ms: 20_000,
                    sources: vec![Source::new(
                        "https://media.example.com/stitch/stitch-2/master.m3u8",
                        DeliveryType::Hls,
                    )],
                },
            ],
        }
    }
}
