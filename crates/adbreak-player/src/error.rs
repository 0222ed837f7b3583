//! Sample application error types.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlayerError {
    #[error("invalid playlist: {0}")]
    InvalidPlaylist(String),

    #[error("video has no playable source: {0}")]
    NoSource(String),

    #[error("playback stalled: {0}")]
    Stalled(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}
