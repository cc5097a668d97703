//! Radial spot rasterization in UV space

use tracing::trace;

use super::{PixelRect, TiledSurface};
use crate::constants::MIN_SPOT_RADIUS_PX;
use crate::types::CompositeMode;

impl TiledSurface {
    /// Draw a radial spot centered at UV `(u, v)`.
    ///
    /// The pixel row is flipped (`y = (1 - v) * height`) so texture rows match
    /// mesh UV orientation. `radius` is a fraction of the surface width and is
    /// never rasterized smaller than one pixel. The spot is flat out to
    /// `hardness * radius` and fades linearly to transparent at the rim.
    ///
    /// Returns the bounding box of the affected region, or None if the spot
    /// lies completely outside the surface.
    pub fn paint_spot(
        &mut self,
        u: f32,
        v: f32,
        color: [f32; 4],
        radius: f32,
        hardness: f32,
        mode: CompositeMode,
    ) -> Option<PixelRect> {
        if !(u.is_finite() && v.is_finite() && radius.is_finite()) {
            return None;
        }

        let width = self.surface.width as f32;
        let height = self.surface.height as f32;
        let center_x = u * width;
        let center_y = (1.0 - v) * height;
        let radius_px = (radius * width).max(MIN_SPOT_RADIUS_PX);
        let hardness = if hardness.is_nan() { 0.0 } else { hardness.clamp(0.0, 1.0) };

        trace!(
            "paint_spot: center=({:.1}, {:.1}), radius={:.1}px, hardness={:.2}, mode={:?}",
            center_x, center_y, radius_px, hardness, mode
        );

        let x_min = ((center_x - radius_px).floor().max(0.0) as u32).min(self.surface.width);
        let y_min = ((center_y - radius_px).floor().max(0.0) as u32).min(self.surface.height);
        let x_max = ((center_x + radius_px).ceil().max(0.0) as u32).min(self.surface.width);
        let y_max = ((center_y + radius_px).ceil().max(0.0) as u32).min(self.surface.height);

        if x_min >= x_max || y_min >= y_max {
            return None;
        }

        for py in y_min..y_max {
            for px in x_min..x_max {
                // Sample at the pixel center
                let dx = (px as f32 + 0.5) - center_x;
                let dy = (py as f32 + 0.5) - center_y;
                let t = (dx * dx + dy * dy).sqrt() / radius_px;

                let coverage = spot_falloff(t, hardness);
                if coverage <= 0.0 {
                    continue;
                }
                match mode {
                    CompositeMode::Normal => self.surface.blend_pixel(px, py, color, coverage),
                    CompositeMode::Erase => {
                        self.surface.erase_pixel(px, py, color[3] * coverage)
                    }
                }
            }
        }

        let rect = (x_min, y_min, x_max - x_min, y_max - y_min);
        self.mark_region_dirty(rect.0, rect.1, rect.2, rect.3);
        Some(rect)
    }
}

/// Spot coverage at normalized distance `t` (0 at center, 1 at the rim).
///
/// Full coverage up to `hardness`, then a linear fade to zero at `t = 1`.
#[inline]
pub fn spot_falloff(t: f32, hardness: f32) -> f32 {
    if t >= 1.0 {
        0.0
    } else if t <= hardness {
        1.0
    } else {
        1.0 - (t - hardness) / (1.0 - hardness)
    }
}
