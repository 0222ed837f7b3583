//! Plugin configuration.

/// Placeholder clip played in place of a real advertisement.
pub const DEFAULT_PLACEHOLDER_URL: &str = "http://secure.eyereturn.com/10807/clouds_v1.mp4";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginConfig {
    /// Media played on the secondary surface during an interruption.
    pub placeholder_url: String,
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            placeholder_url: DEFAULT_PLACEHOLDER_URL.to_string(),
        }
    }
}

impl PluginConfig {
    /// Build config from environment variables.
    pub fn from_env() -> Self {
        Self {
            placeholder_url: std::env::var("ADBREAK_PLACEHOLDER_URL")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_PLACEHOLDER_URL.to_string()),
        }
    }
}
