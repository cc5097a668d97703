//! Commands that edit control points and text elements directly.

use serde::{Deserialize, Serialize};

/// Partial update of a control point; `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PointPatch {
    pub uv: Option<[f32; 2]>,
    pub world_position: Option<[f32; 3]>,
    pub color: Option<[f32; 3]>,
    pub radius: Option<f32>,
}

/// Control point editing commands.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PointCommand {
    Add {
        uv: [f32; 2],
        world_position: [f32; 3],
        color: [f32; 3],
        radius: f32,
    },
    Update { index: usize, patch: PointPatch },
    Remove { index: usize },
    Duplicate { index: usize },
    Select { index: Option<usize> },
}

/// Text alignment relative to the anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TextAlign {
    Left,
    #[default]
    Center,
    Right,
}

/// Description of a text element as sent by the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextSpec {
    pub uv: [f32; 2],
    pub content: String,
    /// Font size in texture pixels; the engine's default size when absent
    #[serde(default)]
    pub size: Option<f32>,
    pub color: [f32; 3],
    #[serde(default)]
    pub rotation_degrees: f32,
    #[serde(default)]
    pub align: TextAlign,
}

/// Text element editing commands.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TextCommand {
    Add(TextSpec),
    Update { index: usize, spec: TextSpec },
    Remove { index: usize },
    /// Make `index` the target of the text tool
    Target { index: Option<usize> },
}
