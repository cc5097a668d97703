//! Text rasterization into the decoration texture

use std::path::Path;

use ab_glyph::{point, Font, FontArc, GlyphId, ScaleFont};
use tracing::{debug, warn};

use crate::constants::MAX_TEXT_MASK_AREA_SCALE;
use crate::error::PaintError;
use crate::texture::Texture;
use crate::tiles::PixelRect;
use crate::types::{TextAlign, TextElement};

/// Glyph coverage rasterized in unrotated text space.
///
/// Local coordinates have the anchor at the origin, x to the right and
/// y down, with the line vertically centered on the anchor.
struct CoverageMask {
    coverage: Vec<f32>,
    width: usize,
    height: usize,
    /// Local coordinate of the mask's top-left corner
    origin_x: f32,
    origin_y: f32,
}

impl CoverageMask {
    #[inline]
    fn at(&self, x: i64, y: i64) -> f32 {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return 0.0;
        }
        self.coverage[y as usize * self.width + x as usize]
    }

    /// Bilinear coverage at a local coordinate
    fn sample(&self, lx: f32, ly: f32) -> f32 {
        let fx = lx - self.origin_x - 0.5;
        let fy = ly - self.origin_y - 0.5;
        let x0 = fx.floor();
        let y0 = fy.floor();
        let tx = fx - x0;
        let ty = fy - y0;
        let (x0, y0) = (x0 as i64, y0 as i64);

        let top = self.at(x0, y0) * (1.0 - tx) + self.at(x0 + 1, y0) * tx;
        let bottom = self.at(x0, y0 + 1) * (1.0 - tx) + self.at(x0 + 1, y0 + 1) * tx;
        top * (1.0 - ty) + bottom * ty
    }
}

/// Renders [`TextElement`]s with an optional font.
///
/// Without a font every draw is skipped with a warning, so a session can run
/// before the host has supplied one.
#[derive(Clone)]
pub struct TextRenderer {
    font: Option<FontArc>,
    min_font_size_px: f32,
}

impl TextRenderer {
    /// A renderer with no font loaded
    pub fn new(min_font_size_px: f32) -> Self {
        Self {
            font: None,
            min_font_size_px: min_font_size_px.max(1.0),
        }
    }

    pub fn with_font(font: FontArc, min_font_size_px: f32) -> Self {
        Self {
            font: Some(font),
            ..Self::new(min_font_size_px)
        }
    }

    /// Load a TrueType/OpenType font from disk
    pub fn from_file(path: impl AsRef<Path>, min_font_size_px: f32) -> Result<Self, PaintError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| PaintError::FontRead {
            path: path.to_path_buf(),
            source,
        })?;
        let font = FontArc::try_from_vec(bytes)?;
        debug!("Loaded font from {}", path.display());
        Ok(Self::with_font(font, min_font_size_px))
    }

    pub fn set_font(&mut self, font: FontArc) {
        self.font = Some(font);
    }

    pub fn has_font(&self) -> bool {
        self.font.is_some()
    }

    /// Effective font size: the hint floored at the minimum and capped at
    /// `max_px`, the texture edge
    pub fn font_size(&self, size_hint: f32, max_px: f32) -> f32 {
        let floor = self.min_font_size_px;
        let size = if size_hint.is_finite() {
            size_hint.max(floor)
        } else {
            floor
        };
        size.min(max_px.max(floor))
    }

    /// Draw `element` over the texture, rotated about its UV anchor.
    ///
    /// Returns the affected pixel region, or None when nothing was drawn.
    pub fn draw_text(&self, texture: &mut Texture, element: &TextElement) -> Option<PixelRect> {
        let Some(font) = &self.font else {
            warn!("No font loaded, skipping text {:?}", element.content);
            return None;
        };
        if element.content.trim().is_empty() {
            return None;
        }

        let size = texture.size() as f32;
        let font_size = self.font_size(element.size_hint, size);
        let max_mask_pixels = (texture.size() as usize)
            .saturating_mul(texture.size() as usize)
            .saturating_mul(MAX_TEXT_MASK_AREA_SCALE);
        let mask = rasterize_line(
            font,
            &element.content,
            font_size,
            element.align,
            max_mask_pixels,
        )?;

        let anchor_x = element.uv.x * size;
        let anchor_y = (1.0 - element.uv.y) * size;
        let color = element.color.with_alpha(1.0);
        let (sin, cos) = element.rotation_degrees.to_radians().sin_cos();

        // Rotated bounding box of the mask in texture pixels
        let corners = [
            (mask.origin_x, mask.origin_y),
            (mask.origin_x + mask.width as f32, mask.origin_y),
            (mask.origin_x, mask.origin_y + mask.height as f32),
            (mask.origin_x + mask.width as f32, mask.origin_y + mask.height as f32),
        ];
        let (mut min_x, mut min_y) = (f32::MAX, f32::MAX);
        let (mut max_x, mut max_y) = (f32::MIN, f32::MIN);
        for (lx, ly) in corners {
            let x = anchor_x + lx * cos - ly * sin;
            let y = anchor_y + lx * sin + ly * cos;
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }

        let x0 = (min_x.floor().max(0.0) as u32).min(texture.size());
        let y0 = (min_y.floor().max(0.0) as u32).min(texture.size());
        let x1 = (max_x.ceil().max(0.0) as u32).min(texture.size());
        let y1 = (max_y.ceil().max(0.0) as u32).min(texture.size());
        if x0 >= x1 || y0 >= y1 {
            return None;
        }

        debug!(
            "draw_text: {:?} at ({:.1}, {:.1}) size={:.1}px rotation={:.1}°",
            element.content, anchor_x, anchor_y, font_size, element.rotation_degrees
        );

        texture.modify(|tiles| {
            let surface = tiles.surface_mut();
            for py in y0..y1 {
                for px in x0..x1 {
                    // Inverse-rotate the destination pixel center into text space
                    let dx = px as f32 + 0.5 - anchor_x;
                    let dy = py as f32 + 0.5 - anchor_y;
                    let lx = dx * cos + dy * sin;
                    let ly = -dx * sin + dy * cos;

                    let coverage = mask.sample(lx, ly);
                    if coverage > 0.0 {
                        surface.blend_pixel(px, py, color, coverage);
                    }
                }
            }
            tiles.mark_region_dirty(x0, y0, x1 - x0, y1 - y0);
        });

        Some((x0, y0, x1 - x0, y1 - y0))
    }
}

/// Lay out one line with kerning and rasterize it into a coverage mask.
///
/// Returns None when no glyph has an outline or when the mask would exceed
/// `max_pixels`.
fn rasterize_line(
    font: &FontArc,
    text: &str,
    font_size: f32,
    align: TextAlign,
    max_pixels: usize,
) -> Option<CoverageMask> {
    let scaled = font.as_scaled(font_size);
    // Middle baseline: the em box is centered on y = 0
    let baseline_y = (scaled.ascent() + scaled.descent()) * 0.5;

    let mut glyphs: Vec<(GlyphId, f32)> = Vec::new();
    let mut cursor_x = 0.0f32;
    let mut last: Option<GlyphId> = None;
    for ch in text.chars() {
        let id = font.glyph_id(ch);
        if let Some(prev) = last {
            cursor_x += scaled.kern(prev, id);
        }
        glyphs.push((id, cursor_x));
        cursor_x += scaled.h_advance(id);
        last = Some(id);
    }

    let offset = match align {
        TextAlign::Left => 0.0,
        TextAlign::Center => -cursor_x * 0.5,
        TextAlign::Right => -cursor_x,
    };

    let outlined: Vec<_> = glyphs
        .into_iter()
        .filter_map(|(id, x)| {
            font.outline_glyph(id.with_scale_and_position(font_size, point(x + offset, baseline_y)))
        })
        .collect();
    if outlined.is_empty() {
        return None;
    }

    let (mut min_x, mut min_y) = (f32::MAX, f32::MAX);
    let (mut max_x, mut max_y) = (f32::MIN, f32::MIN);
    for glyph in &outlined {
        let b = glyph.px_bounds();
        min_x = min_x.min(b.min.x);
        min_y = min_y.min(b.min.y);
        max_x = max_x.max(b.max.x);
        max_y = max_y.max(b.max.y);
    }

    let width = (max_x - min_x).ceil().max(1.0) as usize;
    let height = (max_y - min_y).ceil().max(1.0) as usize;
    let pixels = width.checked_mul(height).filter(|&n| n <= max_pixels);
    let Some(pixels) = pixels else {
        warn!(
            "Text mask {}x{} exceeds {} pixels, skipping {} glyphs",
            width,
            height,
            max_pixels,
            outlined.len()
        );
        return None;
    };
    let mut coverage = vec![0.0f32; pixels];

    for glyph in &outlined {
        let b = glyph.px_bounds();
        let gx = (b.min.x - min_x) as usize;
        let gy = (b.min.y - min_y) as usize;
        glyph.draw(|x, y, c| {
            let x = gx + x as usize;
            let y = gy + y as usize;
            if x < width && y < height {
                let cell = &mut coverage[y * width + x];
                *cell = cell.max(c);
            }
        });
    }

    Some(CoverageMask {
        coverage,
        width,
        height,
        origin_x: min_x,
        origin_y: min_y,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgb;
    use glam::Vec2;

    const TEST_FONT: &str = "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf";

    fn test_renderer() -> Option<TextRenderer> {
        TextRenderer::from_file(TEST_FONT, 8.0).ok()
    }

    #[test]
    fn test_font_size_floor() {
        let renderer = TextRenderer::new(8.0);
        assert_eq!(renderer.font_size(4.0, 256.0), 8.0);
        assert_eq!(renderer.font_size(32.0, 256.0), 32.0);
        assert_eq!(renderer.font_size(f32::NAN, 256.0), 8.0);
    }

    #[test]
    fn test_configured_floor_below_default() {
        let renderer = TextRenderer::new(4.0);
        assert_eq!(renderer.font_size(5.0, 256.0), 5.0);
        assert_eq!(renderer.font_size(1.0, 256.0), 4.0);
    }

    #[test]
    fn test_font_size_capped_at_texture() {
        let renderer = TextRenderer::new(8.0);
        assert_eq!(renderer.font_size(1e5, 256.0), 256.0);
        assert_eq!(renderer.font_size(f32::INFINITY, 256.0), 8.0);
    }

    #[test]
    fn test_huge_text_stays_bounded() {
        let Some(renderer) = test_renderer() else {
            return;
        };
        let mut texture = Texture::try_new(128, 64).unwrap();
        let element = TextElement::new(Vec2::splat(0.5), "H", 1e5, Rgb::BLACK);
        let (x, y, w, h) = renderer.draw_text(&mut texture, &element).unwrap();
        assert!(x + w <= 128 && y + h <= 128);

        // A long line at the capped size is rejected instead of allocated
        let long = TextElement::new(Vec2::splat(0.5), "W".repeat(4096), 1e5, Rgb::BLACK);
        let mut other = Texture::try_new(128, 64).unwrap();
        other.take_needs_update();
        assert!(renderer.draw_text(&mut other, &long).is_none());
        assert!(!other.needs_update());
    }

    #[test]
    fn test_missing_font_skips() {
        let renderer = TextRenderer::new(8.0);
        let mut texture = Texture::try_new(64, 64).unwrap();
        texture.take_needs_update();

        let element = TextElement::new(Vec2::splat(0.5), "Hi", 24.0, Rgb::BLACK);
        assert!(renderer.draw_text(&mut texture, &element).is_none());
        assert!(texture.is_transparent());
        assert!(!texture.needs_update());
    }

    #[test]
    fn test_missing_font_file() {
        let err = TextRenderer::from_file("/nonexistent/font.ttf", 8.0).err();
        assert!(matches!(err, Some(PaintError::FontRead { .. })));
    }

    #[test]
    fn test_text_is_centered_on_anchor() {
        let Some(renderer) = test_renderer() else {
            return;
        };
        let mut texture = Texture::try_new(256, 64).unwrap();
        let element = TextElement::new(Vec2::new(0.5, 0.5), "HHHH", 40.0, Rgb::RED);

        let (x, y, w, h) = renderer.draw_text(&mut texture, &element).unwrap();
        let center_x = x as f32 + w as f32 * 0.5;
        let center_y = y as f32 + h as f32 * 0.5;
        assert!((center_x - 128.0).abs() < 4.0);
        assert!((center_y - 128.0).abs() < 12.0);
        assert!(!texture.is_transparent());
    }

    #[test]
    fn test_rotation_swaps_extent() {
        let Some(renderer) = test_renderer() else {
            return;
        };
        let mut flat = Texture::try_new(256, 64).unwrap();
        let mut upright = Texture::try_new(256, 64).unwrap();
        let mut element = TextElement::new(Vec2::splat(0.5), "WIDE TEXT", 24.0, Rgb::BLUE);

        let (_, _, w0, h0) = renderer.draw_text(&mut flat, &element).unwrap();
        element.rotation_degrees = 90.0;
        let (_, _, w1, h1) = renderer.draw_text(&mut upright, &element).unwrap();

        assert!(w0 > h0);
        assert!(h1 > w1);
    }

    #[test]
    fn test_left_align_starts_at_anchor() {
        let Some(renderer) = test_renderer() else {
            return;
        };
        let mut texture = Texture::try_new(256, 64).unwrap();
        let mut element = TextElement::new(Vec2::splat(0.5), "LEFT", 24.0, Rgb::BLACK);
        element.align = TextAlign::Left;

        let (x, _, _, _) = renderer.draw_text(&mut texture, &element).unwrap();
        assert!(x as i64 >= 126);
    }
}
