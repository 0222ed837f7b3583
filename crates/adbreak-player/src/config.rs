//! Sample application configuration, read from the environment.

use std::path::PathBuf;

use adbreak_plugin::PluginConfig;

/// Cue point settings used by the host wiring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CuePointConfig {
    /// Offset of the mid-roll, in milliseconds (default: 10_000).
    pub midroll_offset_ms: u64,
    /// Category label given to every cue point (default: "ad").
    pub kind: String,
}

impl Default for CuePointConfig {
    fn default() -> Self {
        Self {
            midroll_offset_ms: 10_000,
            kind: "ad".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerConfig {
    pub cue_points: CuePointConfig,
    pub plugin: PluginConfig,
    /// Interval between `progress` events (default: 500 ms).
    pub progress_interval_ms: u64,
    /// How long the simulated placeholder plays (default: 5000 ms).
    pub ad_duration_ms: u64,
    /// Playlist file; the built-in sample playlist is used when unset.
    pub playlist: Option<PathBuf>,
    /// Playback speed multiplier for the paced runner (default: 1.0).
    pub speed: f64,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            cue_points: CuePointConfig::default(),
            plugin: PluginConfig::default(),
            progress_interval_ms: 500,
            ad_duration_ms: 5_000,
            playlist: None,
            speed: 1.0,
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

impl PlayerConfig {
    /// Build config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            cue_points: CuePointConfig {
                midroll_offset_ms: env_parse("ADBREAK_MIDROLL_MS")
                    .unwrap_or(defaults.cue_points.midroll_offset_ms),
                kind: std::env::var("ADBREAK_CUE_POINT_TYPE")
                    .ok()
                    .filter(|v| !v.trim().is_empty())
                    .unwrap_or(defaults.cue_points.kind),
            },
            plugin: PluginConfig::from_env(),
            progress_interval_ms: env_parse::<u64>("ADBREAK_PROGRESS_INTERVAL_MS")
                .filter(|ms| *ms > 0)
                .unwrap_or(defaults.progress_interval_ms),
            ad_duration_ms: env_parse("ADBREAK_AD_DURATION_MS")
                .unwrap_or(defaults.ad_duration_ms),
            playlist: std::env::var("ADBREAK_PLAYLIST")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from),
            speed: env_parse::<f64>("ADBREAK_SPEED")
                .filter(|s| s.is_finite() && *s > 0.0)
                .unwrap_or(defaults.speed),
        }
    }
}
