//! Protocol errors.

/// Errors raised while decoding or validating host messages.
#[derive(Debug, thiserror::Error)]
pub enum IpcError {
    #[error("Malformed message JSON: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Intersection {index} {reason}")]
    InvalidIntersection { index: usize, reason: &'static str },
}
