//! Plugin error types.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PluginError {
    #[error("surface error: {0}")]
    Surface(String),

    #[error("surface release failed: {0}")]
    SurfaceRelease(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_surface() {
        let err = PluginError::Surface("no container".into());
        assert_eq!(err.to_string(), "surface error: no container");
    }

    #[test]
    fn test_display_surface_release() {
        let err = PluginError::SurfaceRelease("already released".into());
        assert_eq!(err.to_string(), "surface release failed: already released");
    }
}
