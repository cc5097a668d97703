//! Main IPC message enums for communication between the scene host and the engine.

use serde::{Deserialize, Serialize};

use crate::commands::{PaintCommand, PointCommand, TextCommand};
use crate::error::IpcError;
use crate::input::{PointerEvent, PointerPhase};
use crate::types::{PointView, TextureInfo};

/// Messages from the scene host to the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum HostToEngine {
    /// Pointer gesture update; `event` is ignored for `Up` and `Cancel`
    Pointer {
        phase: PointerPhase,
        event: PointerEvent,
    },

    /// Control point editing
    PointCommand(PointCommand),

    /// Text element editing
    TextCommand(TextCommand),

    /// Layer production and export
    PaintCommand(PaintCommand),
}

/// Messages from the engine to the scene host.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum EngineToHost {
    /// Control points changed; handles must be re-rendered
    PointsChanged { points: Vec<PointView> },

    /// The layer texture was redrawn
    TextureUpdated {
        texture: TextureInfo,
        /// The texture identity changed and materials must be rebound
        rebind: bool,
    },

    /// Result of an export request; `None` when nothing has been designed yet
    TextureExported { png: Option<Vec<u8>> },

    /// Error notification
    Error { code: String, message: String },
}

impl HostToEngine {
    /// Decode a host message from JSON text
    pub fn from_json(text: &str) -> Result<Self, IpcError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_json(&self) -> Result<String, IpcError> {
        Ok(serde_json::to_string(self)?)
    }
}

impl EngineToHost {
    /// Encode an engine message as JSON text
    pub fn to_json(&self) -> Result<String, IpcError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(text: &str) -> Result<Self, IpcError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Build an error notification
    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Error {
            code: code.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::ToolMode;
    use crate::input::Intersection;

    #[test]
    fn test_pointer_message_from_json() {
        let text = r#"{
            "type": "Pointer",
            "data": {
                "phase": "Down",
                "event": {
                    "intersections": [
                        {
                            "point": [0.0, 1.0, 0.2],
                            "uv": [0.5, 0.5],
                            "distance": 2.0,
                            "object_id": 11,
                            "kind": { "kind": "Surface" }
                        }
                    ],
                    "tool": "Point"
                }
            }
        }"#;

        let message = HostToEngine::from_json(text).unwrap();
        let HostToEngine::Pointer { phase, event } = message else {
            panic!("expected pointer message");
        };
        assert_eq!(phase, PointerPhase::Down);
        assert_eq!(event.tool, ToolMode::Point);
        assert_eq!(event.intersections.len(), 1);
        assert_eq!(event.brush, None);
    }

    #[test]
    fn test_engine_message_tagging() {
        let message = EngineToHost::error("export", "no texture");
        let json = message.to_json().unwrap();
        assert!(json.starts_with(r#"{"type":"Error","data":"#));
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        let err = HostToEngine::from_json("{not json").unwrap_err();
        assert!(matches!(err, IpcError::Serialize(_)));
    }

    #[test]
    fn test_pointer_message_survives_json() {
        let message = HostToEngine::Pointer {
            phase: PointerPhase::Move,
            event: PointerEvent::new(
                vec![Intersection::handle(1, [0.0, 0.0, 0.0], 0.3)],
                ToolMode::Brush,
            ),
        };
        let decoded = HostToEngine::from_json(&message.to_json().unwrap()).unwrap();
        assert!(matches!(
            decoded,
            HostToEngine::Pointer { phase: PointerPhase::Move, .. }
        ));
    }
}
