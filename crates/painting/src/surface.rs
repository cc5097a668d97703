//! CPU surface for the decoration layer - straight-alpha f32 RGBA storage

use crate::error::PaintError;

/// Quantize a straight-alpha channel to 8 bits
#[inline]
pub fn quantize_channel(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0 + 0.5) as u8
}

/// A straight (non-premultiplied) alpha RGBA surface.
/// Stores pixels as [f32; 4] in sRGB space, row 0 at the top.
pub struct CpuSurface {
    /// Surface dimensions
    pub width: u32,
    pub height: u32,
    /// Pixel data in row-major order, each pixel is [r, g, b, a] as f32
    pixels: Vec<[f32; 4]>,
}

impl CpuSurface {
    /// Allocate a transparent surface.
    ///
    /// Allocation failure is reported instead of aborting so the host can
    /// surface it at construction time.
    pub fn try_new(width: u32, height: u32) -> Result<Self, PaintError> {
        let alloc_err = || PaintError::SurfaceAllocation { width, height };
        if width == 0 || height == 0 {
            return Err(alloc_err());
        }
        let pixel_count = (width as usize)
            .checked_mul(height as usize)
            .ok_or_else(alloc_err)?;

        let mut pixels = Vec::new();
        pixels
            .try_reserve_exact(pixel_count)
            .map_err(|_| alloc_err())?;
        pixels.resize(pixel_count, [0.0; 4]);

        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Clear the surface to a solid color
    pub fn clear(&mut self, color: [f32; 4]) {
        self.pixels.fill(color);
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> Option<usize> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some((y as usize) * (self.width as usize) + (x as usize))
    }

    /// Get a pixel at the given coordinates
    /// Returns None if coordinates are out of bounds
    #[inline]
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<[f32; 4]> {
        self.index(x, y).map(|i| self.pixels[i])
    }

    /// Set a pixel at the given coordinates
    /// Does nothing if coordinates are out of bounds
    #[inline]
    pub fn set_pixel(&mut self, x: u32, y: u32, color: [f32; 4]) {
        if let Some(i) = self.index(x, y) {
            self.pixels[i] = color;
        }
    }

    /// Source-over compositing in straight alpha.
    /// `opacity` scales the color's own alpha.
    #[inline]
    pub fn blend_pixel(&mut self, x: u32, y: u32, color: [f32; 4], opacity: f32) {
        let Some(i) = self.index(x, y) else {
            return;
        };
        let dst = self.pixels[i];
        let src_alpha = (color[3] * opacity).clamp(0.0, 1.0);
        if src_alpha <= 0.0 {
            return;
        }

        let dst_weight = dst[3] * (1.0 - src_alpha);
        let out_alpha = src_alpha + dst_weight;
        if out_alpha <= f32::EPSILON {
            self.pixels[i] = [0.0; 4];
            return;
        }

        let mix = |s: f32, d: f32| (s * src_alpha + d * dst_weight) / out_alpha;
        self.pixels[i] = [
            mix(color[0], dst[0]),
            mix(color[1], dst[1]),
            mix(color[2], dst[2]),
            out_alpha,
        ];
    }

    /// Destination-out: removes `erase_amount` of the pixel's coverage.
    /// Color is kept since alpha is straight.
    #[inline]
    pub fn erase_pixel(&mut self, x: u32, y: u32, erase_amount: f32) {
        let Some(i) = self.index(x, y) else {
            return;
        };
        let remaining = (1.0 - erase_amount).clamp(0.0, 1.0);
        let alpha = self.pixels[i][3] * remaining;
        self.pixels[i] = if alpha <= 0.0 {
            [0.0; 4]
        } else {
            [self.pixels[i][0], self.pixels[i][1], self.pixels[i][2], alpha]
        };
    }

    /// Raw f32 pixel data for an Rgba32Float upload
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }

    /// Quantize to 8-bit straight-alpha RGBA
    pub fn to_rgba8(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.pixels.len() * 4);
        for pixel in &self.pixels {
            bytes.extend(pixel.iter().map(|&c| quantize_channel(c)));
        }
        bytes
    }

    /// Whether every pixel is fully transparent
    pub fn is_transparent(&self) -> bool {
        self.pixels.iter().all(|p| p[3] <= 0.0)
    }

    /// Get the total number of pixels
    #[inline]
    pub fn pixel_count(&self) -> usize {
        self.pixels.len()
    }

    #[inline]
    pub fn pixels(&self) -> &[[f32; 4]] {
        &self.pixels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_surface() {
        let surface = CpuSurface::try_new(100, 100).unwrap();
        assert_eq!(surface.width, 100);
        assert_eq!(surface.height, 100);
        assert_eq!(surface.pixel_count(), 10000);
        assert!(surface.is_transparent());
    }

    #[test]
    fn test_zero_size_fails() {
        assert!(matches!(
            CpuSurface::try_new(0, 16),
            Err(PaintError::SurfaceAllocation { width: 0, height: 16 })
        ));
    }

    #[test]
    fn test_get_set_pixel() {
        let mut surface = CpuSurface::try_new(10, 10).unwrap();
        let color = [1.0, 0.5, 0.25, 1.0];

        surface.set_pixel(5, 5, color);
        assert_eq!(surface.get_pixel(5, 5), Some(color));

        // Out of bounds should return None
        assert_eq!(surface.get_pixel(100, 100), None);
    }

    #[test]
    fn test_blend_over_transparent_keeps_color() {
        let mut surface = CpuSurface::try_new(4, 4).unwrap();
        surface.blend_pixel(1, 1, [1.0, 0.0, 0.0, 1.0], 0.5);

        let p = surface.get_pixel(1, 1).unwrap();
        // Straight alpha: color stays pure red, coverage is halved
        assert!((p[0] - 1.0).abs() < 1e-6);
        assert!(p[1].abs() < 1e-6);
        assert!((p[3] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_blend_pixel_over_opaque() {
        let mut surface = CpuSurface::try_new(10, 10).unwrap();
        surface.clear([1.0, 1.0, 1.0, 1.0]);

        surface.blend_pixel(5, 5, [1.0, 0.0, 0.0, 1.0], 0.5);

        let result = surface.get_pixel(5, 5).unwrap();
        assert!((result[0] - 1.0).abs() < 0.01);
        assert!((result[1] - 0.5).abs() < 0.01);
        assert!((result[2] - 0.5).abs() < 0.01);
        assert!((result[3] - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_erase_is_destination_out() {
        let mut surface = CpuSurface::try_new(2, 2).unwrap();
        surface.clear([0.0, 1.0, 0.0, 1.0]);
        surface.erase_pixel(0, 0, 0.25);
        surface.erase_pixel(1, 1, 1.0);

        let partial = surface.get_pixel(0, 0).unwrap();
        assert!((partial[3] - 0.75).abs() < 1e-6);
        assert!((partial[1] - 1.0).abs() < 1e-6);
        assert_eq!(surface.get_pixel(1, 1), Some([0.0; 4]));
    }

    #[test]
    fn test_to_rgba8() {
        let mut surface = CpuSurface::try_new(2, 1).unwrap();
        surface.set_pixel(1, 0, [1.0, 0.5, 0.0, 1.0]);
        let bytes = surface.to_rgba8();
        assert_eq!(bytes.len(), 8);
        assert_eq!(&bytes[0..4], &[0, 0, 0, 0]);
        assert_eq!(&bytes[4..8], &[255, 128, 0, 255]);
    }

    #[test]
    fn test_as_bytes() {
        let surface = CpuSurface::try_new(2, 2).unwrap();
        // 4 pixels * 4 components * 4 bytes per f32 = 64 bytes
        assert_eq!(surface.as_bytes().len(), 64);
    }
}
