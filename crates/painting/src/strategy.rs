//! Interchangeable ways of producing the decoration texture

use crate::error::PaintError;
use crate::ramp::GradientRamp;
use crate::store::Stroke;
use crate::text::TextRenderer;
use crate::texture::Texture;
use crate::types::{ControlPoint, TextElement};

pub use dzyn_ipc::StrategyKind;

/// Borrowed snapshot of everything a repaint may draw
#[derive(Debug, Clone, Copy)]
pub struct Design<'a> {
    pub points: &'a [ControlPoint],
    pub strokes: &'a [Stroke],
    pub texts: &'a [TextElement],
}

impl<'a> Design<'a> {
    pub fn points(points: &'a [ControlPoint]) -> Self {
        Self {
            points,
            strokes: &[],
            texts: &[],
        }
    }

    /// Nothing has been designed yet
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
            && self.texts.is_empty()
            && self.strokes.iter().all(|s| s.dabs.is_empty())
    }
}

/// Produces a texture from the current design.
///
/// Materials only ever see the resulting [`Texture`], so strategies can be
/// swapped without re-patching.
pub trait PaintStrategy {
    fn kind(&self) -> StrategyKind;

    /// Re-derive the texture from `design`. The result must be a pure
    /// function of `design`.
    fn repaint(&mut self, design: &Design<'_>) -> Result<(), PaintError>;

    fn texture(&self) -> &Texture;

    fn texture_mut(&mut self) -> &mut Texture;

    /// Replace the renderer used for text; strategies that ignore text keep the default
    fn set_text_renderer(&mut self, _text: TextRenderer) {}

    /// Replace the ramp; only the ramp strategy draws one
    fn set_ramp(&mut self, _ramp: &GradientRamp) {}
}
