//! Directional gradient ramp, an alternative to the spot model

use glam::Vec2;
use serde::{Deserialize, Serialize};
use tracing::debug;

use dzyn_config::EngineConfig;

use crate::color::Rgb;
use crate::constants::MAX_RAMP_STOPS;
use crate::error::PaintError;
use crate::strategy::{Design, PaintStrategy, StrategyKind};
use crate::texture::Texture;

/// A color at a position along the ramp
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GradientStop {
    pub color: Rgb,
    pub position: f32,
}

impl GradientStop {
    pub fn new(color: Rgb, position: f32) -> Self {
        Self { color, position }
    }
}

/// How colors between stops are chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RampInterpolation {
    /// Hard bands: the last stop at or before `t`
    #[default]
    Step,
    /// Linear blend between neighbouring stops
    Linear,
}

/// Unvalidated ramp as it appears in serialized form
#[derive(Deserialize)]
struct RawGradientRamp {
    stops: Vec<GradientStop>,
    #[serde(default)]
    angle_degrees: f32,
    #[serde(default = "default_center")]
    center: Vec2,
    #[serde(default)]
    interpolation: RampInterpolation,
}

fn default_center() -> Vec2 {
    Vec2::splat(0.5)
}

impl TryFrom<RawGradientRamp> for GradientRamp {
    type Error = PaintError;

    fn try_from(raw: RawGradientRamp) -> Result<Self, Self::Error> {
        let mut ramp = Self::new(raw.stops)?
            .with_angle(raw.angle_degrees)
            .with_interpolation(raw.interpolation);
        ramp.center = raw.center;
        Ok(ramp)
    }
}

/// 1D ramp sampled along a direction through a center point.
///
/// Always holds 1..=8 stops sorted by position; deserialization goes through
/// the same checks as [`GradientRamp::new`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawGradientRamp")]
pub struct GradientRamp {
    stops: Vec<GradientStop>,
    pub angle_degrees: f32,
    pub center: Vec2,
    pub interpolation: RampInterpolation,
}

impl GradientRamp {
    /// Build a ramp; positions are clamped into [0, 1] and sorted
    pub fn new(stops: impl Into<Vec<GradientStop>>) -> Result<Self, PaintError> {
        let mut stops: Vec<GradientStop> = stops.into();
        if stops.is_empty() {
            return Err(PaintError::EmptyRamp);
        }
        if stops.len() > MAX_RAMP_STOPS {
            return Err(PaintError::TooManyStops {
                count: stops.len(),
                max: MAX_RAMP_STOPS,
            });
        }
        for stop in &mut stops {
            stop.position = if stop.position.is_nan() {
                0.0
            } else {
                stop.position.clamp(0.0, 1.0)
            };
            stop.color = stop.color.clamped();
        }
        stops.sort_by(|a, b| a.position.total_cmp(&b.position));

        Ok(Self {
            stops,
            angle_degrees: 0.0,
            center: default_center(),
            interpolation: RampInterpolation::Step,
        })
    }

    pub fn with_angle(mut self, angle_degrees: f32) -> Self {
        self.angle_degrees = angle_degrees;
        self
    }

    pub fn with_interpolation(mut self, interpolation: RampInterpolation) -> Self {
        self.interpolation = interpolation;
        self
    }

    pub fn stops(&self) -> &[GradientStop] {
        &self.stops
    }

    /// Ramp parameter at `uv`
    pub fn t_at(&self, uv: Vec2) -> f32 {
        let (sin, cos) = self.angle_degrees.to_radians().sin_cos();
        (uv - self.center).dot(Vec2::new(cos, sin)) + 0.5
    }

    /// Color at ramp parameter `t`
    pub fn color_at(&self, t: f32) -> Rgb {
        let Some(index) = self.stops.iter().rposition(|s| s.position <= t) else {
            return self.stops.first().map(|s| s.color).unwrap_or_default();
        };
        let stop = self.stops[index];
        match (self.interpolation, self.stops.get(index + 1)) {
            (RampInterpolation::Linear, Some(next)) if next.position > stop.position => {
                let f = (t - stop.position) / (next.position - stop.position);
                let lerp = |a: f32, b: f32| a + (b - a) * f;
                Rgb::new(
                    lerp(stop.color.r, next.color.r),
                    lerp(stop.color.g, next.color.g),
                    lerp(stop.color.b, next.color.b),
                )
            }
            _ => stop.color,
        }
    }
}

impl Default for GradientRamp {
    fn default() -> Self {
        Self {
            stops: vec![
                GradientStop::new(Rgb::WHITE, 0.0),
                GradientStop::new(Rgb::BLACK, 0.5),
            ],
            angle_degrees: 0.0,
            center: Vec2::splat(0.5),
            interpolation: RampInterpolation::Step,
        }
    }
}

/// Fills the whole texture with a [`GradientRamp`]; control points are ignored
pub struct RampGenerator {
    ramp: GradientRamp,
    texture: Texture,
}

impl RampGenerator {
    pub fn try_new(ramp: GradientRamp, size: u32, tile_size: u32) -> Result<Self, PaintError> {
        Ok(Self {
            ramp,
            texture: Texture::try_new(size, tile_size)?,
        })
    }

    pub fn from_config(ramp: GradientRamp, config: &EngineConfig) -> Result<Self, PaintError> {
        Self::try_new(ramp, config.texture_size, config.tile_size)
    }

    pub fn ramp(&self) -> &GradientRamp {
        &self.ramp
    }
}

impl PaintStrategy for RampGenerator {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Ramp
    }

    fn repaint(&mut self, _design: &Design<'_>) -> Result<(), PaintError> {
        let ramp = &self.ramp;
        debug!(
            "Filling ramp with {} stops at {:.1}°",
            ramp.stops.len(),
            ramp.angle_degrees
        );
        self.texture.modify(|tiles| {
            let surface = tiles.surface_mut();
            let size = surface.width as f32;
            for y in 0..surface.height {
                // Row 0 is v = 1
                let v = 1.0 - (y as f32 + 0.5) / size;
                for x in 0..surface.width {
                    let u = (x as f32 + 0.5) / size;
                    let color = ramp.color_at(ramp.t_at(Vec2::new(u, v)));
                    surface.set_pixel(x, y, color.with_alpha(1.0));
                }
            }
            tiles.mark_all_dirty();
        });
        Ok(())
    }

    fn texture(&self) -> &Texture {
        &self.texture
    }

    fn texture_mut(&mut self) -> &mut Texture {
        &mut self.texture
    }

    /// Takes effect on the next repaint; the texture keeps its handle
    fn set_ramp(&mut self, ramp: &GradientRamp) {
        self.ramp = ramp.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_band() -> GradientRamp {
        GradientRamp::new(vec![
            GradientStop::new(Rgb::BLUE, 0.5),
            GradientStop::new(Rgb::RED, 0.0),
        ])
        .unwrap()
    }

    #[test]
    fn test_stops_are_sorted_and_clamped() {
        let ramp = GradientRamp::new(vec![
            GradientStop::new(Rgb::RED, 1.5),
            GradientStop::new(Rgb::BLUE, -0.5),
        ])
        .unwrap();
        assert_eq!(ramp.stops()[0].position, 0.0);
        assert_eq!(ramp.stops()[0].color, Rgb::BLUE);
        assert_eq!(ramp.stops()[1].position, 1.0);
    }

    #[test]
    fn test_stop_limits() {
        assert!(matches!(GradientRamp::new(Vec::new()), Err(PaintError::EmptyRamp)));
        let stops = vec![GradientStop::new(Rgb::RED, 0.0); MAX_RAMP_STOPS + 1];
        assert!(matches!(
            GradientRamp::new(stops),
            Err(PaintError::TooManyStops { count: 9, max: 8 })
        ));
    }

    #[test]
    fn test_step_colors() {
        let ramp = two_band();
        assert_eq!(ramp.color_at(-0.2), Rgb::RED);
        assert_eq!(ramp.color_at(0.49), Rgb::RED);
        assert_eq!(ramp.color_at(0.5), Rgb::BLUE);
        assert_eq!(ramp.color_at(1.3), Rgb::BLUE);
    }

    #[test]
    fn test_linear_colors() {
        let ramp = GradientRamp::new(vec![
            GradientStop::new(Rgb::BLACK, 0.0),
            GradientStop::new(Rgb::WHITE, 1.0),
        ])
        .unwrap()
        .with_interpolation(RampInterpolation::Linear);
        let mid = ramp.color_at(0.25);
        assert!((mid.r - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_direction_follows_angle() {
        let ramp = two_band();
        assert!((ramp.t_at(Vec2::new(1.0, 0.5)) - 1.0).abs() < 1e-6);

        let vertical = two_band().with_angle(90.0);
        assert!((vertical.t_at(Vec2::new(0.5, 1.0)) - 1.0).abs() < 1e-5);
        assert!((vertical.t_at(Vec2::new(1.0, 0.5)) - 0.5).abs() < 1e-5);
    }

    #[test]
    fn test_ramp_fill() {
        let mut generator = RampGenerator::try_new(two_band(), 64, 64).unwrap();
        generator.repaint(&Design::points(&[])).unwrap();

        let texture = generator.texture();
        assert_eq!(texture.sample_uv(0.1, 0.5), [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(texture.sample_uv(0.9, 0.5), [0.0, 0.0, 1.0, 1.0]);
        assert!(texture.needs_update());
    }

    #[test]
    fn test_deserialize_validates_stops() {
        let empty = r#"{"stops":[],"angle_degrees":0.0,"center":[0.5,0.5],"interpolation":"Step"}"#;
        assert!(serde_json::from_str::<GradientRamp>(empty).is_err());

        let json = r#"{"stops":[{"color":{"r":0.0,"g":0.0,"b":1.0},"position":0.5},
                               {"color":{"r":1.0,"g":0.0,"b":0.0},"position":-1.0}]}"#;
        let ramp: GradientRamp = serde_json::from_str(json).unwrap();
        assert_eq!(ramp.stops()[0].color, Rgb::RED);
        assert_eq!(ramp.stops()[0].position, 0.0);
        assert_eq!(ramp.center, Vec2::splat(0.5));
        assert_eq!(ramp.interpolation, RampInterpolation::Step);
    }

    #[test]
    fn test_ramp_round_trips_through_json() {
        let ramp = two_band().with_angle(90.0);
        let json = serde_json::to_string(&ramp).unwrap();
        assert_eq!(serde_json::from_str::<GradientRamp>(&json).unwrap(), ramp);
    }

    #[test]
    fn test_set_ramp_keeps_texture_handle() {
        let mut generator = RampGenerator::try_new(GradientRamp::default(), 64, 64).unwrap();
        let handle = generator.texture().handle();

        generator.set_ramp(&two_band());
        generator.repaint(&Design::points(&[])).unwrap();

        assert_eq!(generator.texture().handle(), handle);
        assert_eq!(generator.ramp(), &two_band());
        assert_eq!(generator.texture().sample_uv(0.1, 0.5), [1.0, 0.0, 0.0, 1.0]);
    }
}
