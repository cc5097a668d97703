//! One-shot spot texture generator

use tracing::debug;

use dzyn_config::EngineConfig;

use crate::error::PaintError;
use crate::strategy::{Design, PaintStrategy, StrategyKind};
use crate::texture::Texture;
use crate::types::{CompositeMode, ControlPoint};

/// Rasterize `points` into a fresh `size`×`size` texture.
///
/// Each point is an independent radial gradient from full color at the
/// center to transparent at its radius. Hardness and composite modes do not
/// apply here.
pub fn generate(points: &[ControlPoint], size: u32, tile_size: u32) -> Result<Texture, PaintError> {
    let mut texture = Texture::try_new(size, tile_size)?;
    for point in points {
        texture.paint_spot(
            point.uv.x,
            point.uv.y,
            point.color.with_alpha(1.0),
            point.radius,
            0.0,
            CompositeMode::Normal,
        );
    }
    debug!(
        "Generated texture {:?} from {} points",
        texture.handle(),
        points.len()
    );
    Ok(texture)
}

/// Strategy wrapper around [`generate`].
///
/// Every repaint replaces the texture, dropping the previous one, so hosts
/// must rebind materials after each repaint. Strokes and text are ignored.
pub struct GradientGenerator {
    size: u32,
    tile_size: u32,
    texture: Texture,
}

impl GradientGenerator {
    pub fn try_new(size: u32, tile_size: u32) -> Result<Self, PaintError> {
        Ok(Self {
            size,
            tile_size,
            texture: Texture::try_new(size, tile_size)?,
        })
    }

    pub fn from_config(config: &EngineConfig) -> Result<Self, PaintError> {
        Self::try_new(config.generator_size, config.tile_size.min(config.generator_size))
    }

    pub fn size(&self) -> u32 {
        self.size
    }
}

impl PaintStrategy for GradientGenerator {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Generator
    }

    fn repaint(&mut self, design: &Design<'_>) -> Result<(), PaintError> {
        self.texture = generate(design.points, self.size, self.tile_size)?;
        Ok(())
    }

    fn texture(&self) -> &Texture {
        &self.texture
    }

    fn texture_mut(&mut self) -> &mut Texture {
        &mut self.texture
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgb;
    use glam::{Vec2, Vec3};

    fn points() -> Vec<ControlPoint> {
        vec![
            ControlPoint::new(Vec2::new(0.25, 0.25), Vec3::ZERO, Rgb::RED, 0.2),
            ControlPoint::new(Vec2::new(0.75, 0.75), Vec3::ZERO, Rgb::BLUE, 0.1),
        ]
    }

    #[test]
    fn test_generate_soft_falloff() {
        let texture = generate(&points(), 128, 64).unwrap();
        assert_eq!(texture.size(), 128);

        let center = texture.sample_uv(0.25, 0.25);
        assert!((center[0] - 1.0).abs() < 1e-3);
        assert!(center[3] > 0.95);

        // Halfway to the rim: roughly half coverage
        let half = texture.sample_uv(0.35, 0.25);
        assert!((half[3] - 0.5).abs() < 0.05, "alpha {}", half[3]);

        assert_eq!(texture.sample_uv(0.9, 0.1)[3], 0.0);
    }

    #[test]
    fn test_generate_twice_is_identical() {
        let a = generate(&points(), 128, 64).unwrap();
        let b = generate(&points(), 128, 64).unwrap();
        assert_eq!(a.to_rgba8(), b.to_rgba8());
        assert_ne!(a.handle(), b.handle());
    }

    #[test]
    fn test_repaint_replaces_texture() {
        let mut generator = GradientGenerator::try_new(64, 64).unwrap();
        let before = generator.texture().handle();

        let points = points();
        generator.repaint(&Design::points(&points)).unwrap();
        assert_ne!(generator.texture().handle(), before);
        assert!(!generator.texture().is_transparent());
    }

    #[test]
    fn test_empty_points_give_transparent_texture() {
        let texture = generate(&[], 64, 64).unwrap();
        assert!(texture.is_transparent());
    }
}
