//! Event model error types.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EventError {
    #[error("unknown event: {0}")]
    UnknownEvent(String),

    #[error("invalid property '{key}': {reason}")]
    InvalidProperty { key: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_unknown_event() {
        let err = EventError::UnknownEvent("did_explode".into());
        assert_eq!(err.to_string(), "unknown event: did_explode");
    }

    #[test]
    fn test_display_invalid_property() {
        let err = EventError::InvalidProperty {
            key: "cue_point".into(),
            reason: "expected object".into(),
        };
        assert_eq!(
            err.to_string(),
            "invalid property 'cue_point': expected object"
        );
    }
}
