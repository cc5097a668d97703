//! Pointer input resolved against scene geometry.

use serde::{Deserialize, Serialize};

use crate::commands::{BrushSettings, ToolMode};
use crate::error::IpcError;

/// What a ray hit.
///
/// Handles and text targets are pick proxies the host renders on top of the
/// garment; they carry the index of the element they stand for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "index")]
pub enum HitKind {
    /// The garment surface itself
    Surface,
    /// The draggable widget of the control point at `index`
    Handle(usize),
    /// The pick proxy of the text element at `index`
    TextTarget(usize),
}

/// A single ray/scene intersection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Intersection {
    /// Hit position in world space
    pub point: [f32; 3],
    /// Interpolated surface UV; `None` when the struck mesh has no UV channel
    pub uv: Option<[f32; 2]>,
    /// Distance along the ray
    pub distance: f32,
    /// Host identifier of the struck object
    pub object_id: u64,
    pub kind: HitKind,
}

impl Intersection {
    /// A surface hit with UVs
    pub fn surface(point: [f32; 3], uv: [f32; 2], distance: f32, object_id: u64) -> Self {
        Self {
            point,
            uv: Some(uv),
            distance,
            object_id,
            kind: HitKind::Surface,
        }
    }

    /// A hit on the handle of control point `index`
    pub fn handle(index: usize, point: [f32; 3], distance: f32) -> Self {
        Self {
            point,
            uv: None,
            distance,
            object_id: 0,
            kind: HitKind::Handle(index),
        }
    }

    /// A hit on the pick proxy of text element `index`
    pub fn text_target(index: usize, point: [f32; 3], distance: f32) -> Self {
        Self {
            point,
            uv: None,
            distance,
            object_id: 0,
            kind: HitKind::TextTarget(index),
        }
    }

    /// Whether this hit lands on paintable surface
    pub fn is_surface(&self) -> bool {
        matches!(self.kind, HitKind::Surface) && self.uv.is_some()
    }
}

/// A pointer event with its intersections ordered nearest first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PointerEvent {
    pub intersections: Vec<Intersection>,
    pub tool: ToolMode,
    /// Brush from the host's toolbar; the engine's configured brush when absent
    #[serde(default)]
    pub brush: Option<BrushSettings>,
}

impl PointerEvent {
    pub fn new(intersections: Vec<Intersection>, tool: ToolMode) -> Self {
        Self {
            intersections,
            tool,
            brush: None,
        }
    }

    pub fn with_brush(mut self, brush: BrushSettings) -> Self {
        self.brush = Some(brush);
        self
    }

    /// Nearest intersection of any kind
    pub fn nearest(&self) -> Option<&Intersection> {
        self.intersections.first()
    }

    /// Nearest hit on the garment surface, skipping handles and text targets
    pub fn nearest_surface(&self) -> Option<&Intersection> {
        self.intersections.iter().find(|hit| hit.is_surface())
    }

    /// Check that hits are finite and ordered nearest first
    pub fn validate(&self) -> Result<(), IpcError> {
        let mut last = f32::NEG_INFINITY;
        for (i, hit) in self.intersections.iter().enumerate() {
            let finite = hit.distance.is_finite()
                && hit.point.iter().all(|c| c.is_finite())
                && hit.uv.is_none_or(|uv| uv.iter().all(|c| c.is_finite()));
            if !finite {
                return Err(IpcError::InvalidIntersection {
                    index: i,
                    reason: "has non-finite values",
                });
            }
            if hit.distance < last {
                return Err(IpcError::InvalidIntersection {
                    index: i,
                    reason: "is nearer than its predecessor",
                });
            }
            last = hit.distance;
        }
        Ok(())
    }
}

/// Phase of a pointer gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PointerPhase {
    Down,
    Move,
    Up,
    /// Pointer capture was lost; treated exactly like `Up`
    Cancel,
}
