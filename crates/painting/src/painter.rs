//! Long-lived raster painter, cleared and replayed in place

use glam::Vec2;
use tracing::{debug, info};

use dzyn_config::EngineConfig;

use crate::color::Rgb;
use crate::constants::MIN_FONT_SIZE_PX;
use crate::error::PaintError;
use crate::strategy::{Design, PaintStrategy, StrategyKind};
use crate::text::TextRenderer;
use crate::texture::Texture;
use crate::tiles::PixelRect;
use crate::types::{CompositeMode, TextElement};

/// Owns one texture for its whole lifetime and redraws it on demand.
///
/// A repaint clears the buffer and replays control points, then brush
/// strokes, then text, so the texture never drifts from the design.
pub struct RasterPainter {
    texture: Texture,
    spot_hardness: f32,
    text: TextRenderer,
}

impl RasterPainter {
    /// Allocate the painter's buffer. Failure here is fatal for the session.
    pub fn try_new(size: u32, tile_size: u32, spot_hardness: f32) -> Result<Self, PaintError> {
        let texture = Texture::try_new(size, tile_size)?;
        info!("Created raster painter {:?} ({}x{})", texture.handle(), size, size);
        Ok(Self {
            texture,
            spot_hardness: spot_hardness.clamp(0.0, 1.0),
            text: TextRenderer::new(MIN_FONT_SIZE_PX),
        })
    }

    pub fn from_config(config: &EngineConfig) -> Result<Self, PaintError> {
        let mut painter =
            Self::try_new(config.texture_size, config.tile_size, config.spot_hardness)?;
        painter.text = TextRenderer::new(config.text.min_font_size_px);
        Ok(painter)
    }

    pub fn with_text_renderer(mut self, text: TextRenderer) -> Self {
        self.text = text;
        self
    }

    pub fn text_renderer(&self) -> &TextRenderer {
        &self.text
    }

    pub fn text_renderer_mut(&mut self) -> &mut TextRenderer {
        &mut self.text
    }

    /// Hardness applied to control points on repaint
    pub fn spot_hardness(&self) -> f32 {
        self.spot_hardness
    }

    /// Draw a radial spot at `uv`: flat color out to `hardness * radius`,
    /// transparent at `radius`
    pub fn paint_spot(
        &mut self,
        uv: Vec2,
        color: Rgb,
        radius: f32,
        hardness: f32,
        mode: CompositeMode,
    ) -> Option<PixelRect> {
        self.texture
            .paint_spot(uv.x, uv.y, color.with_alpha(1.0), radius, hardness, mode)
    }

    /// Draw text rotated about its UV anchor
    pub fn draw_text(&mut self, element: &TextElement) -> Option<PixelRect> {
        self.text.draw_text(&mut self.texture, element)
    }

    /// Reset the buffer to fully transparent
    pub fn clear(&mut self) {
        self.texture.clear();
    }

    /// Live texture, flagged as changed
    pub fn get_texture(&mut self) -> &Texture {
        self.texture.mark_needs_update();
        &self.texture
    }

    /// Encode the current buffer as PNG
    pub fn to_png(&self) -> Result<Vec<u8>, PaintError> {
        self.texture.encode_png()
    }
}

impl PaintStrategy for RasterPainter {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Painter
    }

    fn repaint(&mut self, design: &Design<'_>) -> Result<(), PaintError> {
        debug!(
            "Repainting {} points, {} strokes, {} texts",
            design.points.len(),
            design.strokes.len(),
            design.texts.len()
        );

        self.clear();
        for point in design.points {
            self.paint_spot(
                point.uv,
                point.color,
                point.radius,
                self.spot_hardness,
                CompositeMode::Normal,
            );
        }
        for stroke in design.strokes {
            let brush = stroke.brush;
            for &uv in &stroke.dabs {
                self.paint_spot(uv, brush.color, brush.radius, brush.hardness, brush.mode);
            }
        }
        for element in design.texts {
            self.draw_text(element);
        }
        Ok(())
    }

    fn texture(&self) -> &Texture {
        &self.texture
    }

    fn texture_mut(&mut self) -> &mut Texture {
        &mut self.texture
    }

    fn set_text_renderer(&mut self, text: TextRenderer) {
        self.text = text;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Stroke;
    use crate::types::{Brush, ControlPoint};
    use glam::Vec3;

    fn painter() -> RasterPainter {
        RasterPainter::try_new(256, 64, 0.6).unwrap()
    }

    fn point(u: f32, v: f32, color: Rgb, radius: f32) -> ControlPoint {
        ControlPoint::new(Vec2::new(u, v), Vec3::ZERO, color, radius)
    }

    fn assert_close(a: [f32; 4], b: [f32; 4]) {
        for i in 0..4 {
            assert!((a[i] - b[i]).abs() < 1e-3, "{a:?} != {b:?}");
        }
    }

    #[test]
    fn test_clear_is_idempotent() {
        let mut painter = painter();
        painter.paint_spot(Vec2::splat(0.3), Rgb::RED, 0.2, 0.6, CompositeMode::Normal);
        painter.paint_spot(Vec2::splat(0.7), Rgb::BLUE, 0.1, 1.0, CompositeMode::Normal);

        painter.clear();
        assert!(painter.get_texture().is_transparent());
        painter.clear();
        assert!(painter.get_texture().is_transparent());
    }

    #[test]
    fn test_get_texture_flags_update() {
        let mut painter = painter();
        painter.texture_mut().take_needs_update();
        assert!(painter.get_texture().needs_update());
    }

    #[test]
    fn test_red_then_blue_scenario() {
        let mut painter = painter();
        let red = point(0.5, 0.5, Rgb::RED, 0.1);
        painter.repaint(&Design::points(std::slice::from_ref(&red))).unwrap();

        let texture = painter.texture();
        assert_close(texture.sample_uv(0.5, 0.5), [1.0, 0.0, 0.0, 1.0]);

        // Inside the red rim: red, partially covered
        let rim = texture.sample_uv(0.58, 0.5);
        assert!((rim[0] - 1.0).abs() < 1e-3);
        assert!(rim[3] > 0.3 && rim[3] < 0.7, "rim alpha {}", rim[3]);

        let points = [red, point(0.5, 0.5, Rgb::BLUE, 0.2)];
        painter.repaint(&Design::points(&points)).unwrap();
        let texture = painter.texture();

        // Later draw wins at the opaque center
        assert_close(texture.sample_uv(0.5, 0.5), [0.0, 0.0, 1.0, 1.0]);

        // Past the red radius, only the blue rim remains
        let outer = texture.sample_uv(0.65, 0.5);
        assert!(outer[0] < 1e-3);
        assert!((outer[2] - 1.0).abs() < 1e-3);
        assert!(outer[3] > 0.0 && outer[3] < 1.0);
    }

    #[test]
    fn test_repaint_is_deterministic() {
        let points = [
            point(0.2, 0.3, Rgb::RED, 0.15),
            point(0.6, 0.6, Rgb::BLUE, 0.25),
            point(0.9, 0.1, Rgb::WHITE, 0.05),
        ];
        let mut painter = painter();
        painter.repaint(&Design::points(&points)).unwrap();
        let first = painter.texture().to_rgba8();

        // Repainting over the previous result does not accumulate
        painter.repaint(&Design::points(&points)).unwrap();
        assert_eq!(painter.texture().to_rgba8(), first);
    }

    #[test]
    fn test_strokes_draw_over_points() {
        let points = [point(0.5, 0.5, Rgb::RED, 0.2)];
        let strokes = [Stroke {
            id: 0,
            brush: Brush {
                color: Rgb::BLUE,
                radius: 0.05,
                hardness: 1.0,
                mode: CompositeMode::Normal,
            },
            dabs: vec![Vec2::splat(0.5)],
        }];
        let mut painter = painter();
        painter
            .repaint(&Design {
                points: &points,
                strokes: &strokes,
                texts: &[],
            })
            .unwrap();

        assert_close(painter.texture().sample_uv(0.5, 0.5), [0.0, 0.0, 1.0, 1.0]);
    }

    #[test]
    fn test_erase_stroke() {
        let points = [point(0.5, 0.5, Rgb::RED, 0.3)];
        let strokes = [Stroke {
            id: 0,
            brush: Brush {
                color: Rgb::BLACK,
                radius: 0.05,
                hardness: 1.0,
                mode: CompositeMode::Erase,
            },
            dabs: vec![Vec2::splat(0.5)],
        }];
        let mut painter = painter();
        painter
            .repaint(&Design {
                points: &points,
                strokes: &strokes,
                texts: &[],
            })
            .unwrap();

        assert_eq!(painter.texture().sample_uv(0.5, 0.5)[3], 0.0);
        assert!((painter.texture().sample_uv(0.6, 0.5)[3] - 1.0).abs() < 1e-3);
    }

    #[test]
    fn test_texture_identity_is_stable() {
        let mut painter = painter();
        let handle = painter.texture().handle();
        painter.repaint(&Design::points(&[point(0.5, 0.5, Rgb::RED, 0.1)])).unwrap();
        assert_eq!(painter.texture().handle(), handle);
    }
}
