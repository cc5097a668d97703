//! Paint command types for the decorating tools.

use serde::{Deserialize, Serialize};

/// Active tool in the host's toolbar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ToolMode {
    /// Camera navigation only; handles can still be grabbed
    #[default]
    None,
    /// Each click on the garment places a control point
    Point,
    /// Press and drag paints a continuous stroke
    Brush,
    /// Click moves the targeted text element
    Text,
}

/// Brush parameters sent along with every pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BrushSettings {
    /// Straight sRGB color (0.0-1.0)
    pub color: [f32; 3],
    /// Radius as a fraction of the texture edge
    pub radius: f32,
    /// 0.0 = soft falloff, 1.0 = hard disk
    pub hardness: f32,
}

/// Commands for controlling how the painted layer is produced and blended.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PaintCommand {
    /// Blend strength of the layer over the base color (0.0-1.0)
    SetStrength { strength: f32 },
    /// Switch the texture-producing strategy
    SetStrategy { strategy: StrategyKind },
    /// Forget every recorded brush stroke
    ClearStrokes,
    /// Request a PNG export of the current texture
    Export,
}

/// Texture-producing strategies the host can select.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StrategyKind {
    /// Long-lived painter, cleared and replayed in place
    Painter,
    /// Fresh spot texture per repaint
    Generator,
    /// Directional gradient ramp
    Ramp,
}
