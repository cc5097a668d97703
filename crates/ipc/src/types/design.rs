use serde::{Deserialize, Serialize};

/// Control point as the host needs it to render a handle widget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointView {
    pub index: usize,
    pub uv: [f32; 2],
    pub world_position: [f32; 3],
    pub color: [f32; 3],
    pub radius: f32,
    /// Selected or being dragged; rendered with the emphasized handle style
    pub selected: bool,
}

/// Texture the host must bind into patched materials.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextureInfo {
    pub texture_id: u64,
    pub size: u32,
    pub version: u64,
}
