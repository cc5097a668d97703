use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::color::Rgb;
use crate::constants::MIN_POINT_RADIUS;

pub use dzyn_ipc::TextAlign;

/// Compositing used when a spot is drawn over existing pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[repr(u8)]
pub enum CompositeMode {
    /// Source-over
    #[default]
    Normal = 0,
    /// Destination-out: removes coverage under the spot
    Erase = 1,
}

/// Clamp a UV coordinate into [0, 1]². NaN components become 0.
#[inline]
pub fn clamp_uv(uv: Vec2) -> Vec2 {
    let c = |v: f32| if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) };
    Vec2::new(c(uv.x), c(uv.y))
}

/// Clamp a control point radius into (0, 1].
#[inline]
pub fn clamp_radius(radius: f32) -> f32 {
    if radius.is_nan() {
        MIN_POINT_RADIUS
    } else {
        radius.clamp(MIN_POINT_RADIUS, 1.0)
    }
}

/// A user-placed spot on the garment.
///
/// `uv` addresses the texture; `world_position` is where the handle widget is
/// rendered. Both come from the same ray hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlPoint {
    pub uv: Vec2,
    pub world_position: Vec3,
    pub color: Rgb,
    /// Radius as a fraction of the texture edge
    pub radius: f32,
}

impl ControlPoint {
    /// Build a point with clamped UV, color and radius
    pub fn new(uv: Vec2, world_position: Vec3, color: Rgb, radius: f32) -> Self {
        Self {
            uv: clamp_uv(uv),
            world_position,
            color: color.clamped(),
            radius: clamp_radius(radius),
        }
    }
}

/// Partial update of a control point
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ControlPointPatch {
    pub uv: Option<Vec2>,
    pub world_position: Option<Vec3>,
    pub color: Option<Rgb>,
    pub radius: Option<f32>,
}

impl ControlPointPatch {
    /// Move to a new ray hit
    pub fn position(uv: Vec2, world_position: Vec3) -> Self {
        Self {
            uv: Some(uv),
            world_position: Some(world_position),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.uv.is_none()
            && self.world_position.is_none()
            && self.color.is_none()
            && self.radius.is_none()
    }

    pub(crate) fn apply(&self, point: &mut ControlPoint) {
        if let Some(uv) = self.uv {
            point.uv = clamp_uv(uv);
        }
        if let Some(world_position) = self.world_position {
            point.world_position = world_position;
        }
        if let Some(color) = self.color {
            point.color = color.clamped();
        }
        if let Some(radius) = self.radius {
            point.radius = clamp_radius(radius);
        }
    }
}

impl From<dzyn_ipc::PointPatch> for ControlPointPatch {
    fn from(patch: dzyn_ipc::PointPatch) -> Self {
        Self {
            uv: patch.uv.map(Vec2::from),
            world_position: patch.world_position.map(Vec3::from),
            color: patch.color.map(Rgb::from),
            radius: patch.radius,
        }
    }
}

/// Text rasterized into the decoration texture
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextElement {
    pub uv: Vec2,
    pub content: String,
    /// Font size in texture pixels
    pub size_hint: f32,
    pub color: Rgb,
    pub rotation_degrees: f32,
    pub align: TextAlign,
}

impl TextElement {
    pub fn new(uv: Vec2, content: impl Into<String>, size_hint: f32, color: Rgb) -> Self {
        Self {
            uv: clamp_uv(uv),
            content: content.into(),
            size_hint,
            color: color.clamped(),
            rotation_degrees: 0.0,
            align: TextAlign::Center,
        }
    }

    /// Build from a host spec, using `default_size` when the spec has none
    pub fn from_spec(spec: dzyn_ipc::TextSpec, default_size: f32) -> Self {
        Self {
            uv: clamp_uv(Vec2::from(spec.uv)),
            content: spec.content,
            size_hint: spec.size.unwrap_or(default_size),
            color: Rgb::from(spec.color),
            rotation_degrees: spec.rotation_degrees,
            align: spec.align,
        }
    }
}

/// Brush parameters for one stroke
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Brush {
    pub color: Rgb,
    /// Radius as a fraction of the texture edge
    pub radius: f32,
    pub hardness: f32,
    pub mode: CompositeMode,
}

impl From<&dzyn_config::BrushDefaults> for Brush {
    fn from(defaults: &dzyn_config::BrushDefaults) -> Self {
        Self {
            color: Rgb::from(defaults.color),
            radius: clamp_radius(defaults.radius),
            hardness: defaults.hardness.clamp(0.0, 1.0),
            mode: CompositeMode::Normal,
        }
    }
}

impl From<dzyn_ipc::BrushSettings> for Brush {
    fn from(settings: dzyn_ipc::BrushSettings) -> Self {
        Self {
            color: Rgb::from(settings.color),
            radius: clamp_radius(settings.radius),
            hardness: settings.hardness.clamp(0.0, 1.0),
            mode: CompositeMode::Normal,
        }
    }
}
