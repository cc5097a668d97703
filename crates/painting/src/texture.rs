//! Owned decoration texture with identity, version and update flag

use std::io::Cursor;
use std::sync::atomic::{AtomicU64, Ordering};

use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder};
use tracing::debug;

use crate::constants::MAX_TEXTURE_SIZE;
use crate::error::PaintError;
use crate::tiles::{PixelRect, TileCoord, TiledSurface};
use crate::types::CompositeMode;

static NEXT_TEXTURE_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique texture identity.
///
/// Materials bind by handle; a new handle means the host must rebind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureHandle(pub u64);

impl TextureHandle {
    fn next() -> Self {
        Self(NEXT_TEXTURE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Square RGBA texture in UV space.
///
/// Uploads must not flip Y: the flip is applied when rasterizing. Sampling
/// clamps to edge and colors are sRGB with straight alpha.
pub struct Texture {
    handle: TextureHandle,
    tiles: TiledSurface,
    needs_update: bool,
    version: u64,
}

impl Texture {
    /// Allocate a transparent `size`×`size` texture
    pub fn try_new(size: u32, tile_size: u32) -> Result<Self, PaintError> {
        if size == 0 || size > MAX_TEXTURE_SIZE {
            return Err(PaintError::InvalidTextureSize(size));
        }
        let mut tiles = TiledSurface::try_new(size, size, tile_size)?;
        // Never uploaded: the first sync must write every tile
        tiles.mark_all_dirty();
        let handle = TextureHandle::next();
        debug!("Allocated texture {:?} ({}x{})", handle, size, size);

        Ok(Self {
            handle,
            tiles,
            needs_update: true,
            version: 0,
        })
    }

    #[inline]
    pub fn handle(&self) -> TextureHandle {
        self.handle
    }

    /// Edge length in pixels
    #[inline]
    pub fn size(&self) -> u32 {
        self.tiles.surface().width
    }

    /// Incremented after every mutation
    #[inline]
    pub fn version(&self) -> u64 {
        self.version
    }

    #[inline]
    pub fn needs_update(&self) -> bool {
        self.needs_update
    }

    /// Return and reset the update flag; hosts call this once per frame
    pub fn take_needs_update(&mut self) -> bool {
        std::mem::take(&mut self.needs_update)
    }

    /// Tiles touched since the last call, for partial uploads
    pub fn take_dirty_tiles(&mut self) -> Vec<TileCoord> {
        self.tiles.take_dirty_tiles()
    }

    #[inline]
    pub fn tiles(&self) -> &TiledSurface {
        &self.tiles
    }

    /// Mutable pixel access; the texture is flagged once `f` returns
    pub(crate) fn modify<R>(&mut self, f: impl FnOnce(&mut TiledSurface) -> R) -> R {
        let result = f(&mut self.tiles);
        self.touch();
        result
    }

    /// Flag the contents as changed without touching pixels
    pub(crate) fn mark_needs_update(&mut self) {
        self.needs_update = true;
    }

    fn touch(&mut self) {
        self.version += 1;
        self.needs_update = true;
    }

    /// Reset to fully transparent
    pub fn clear(&mut self) {
        self.modify(TiledSurface::clear);
    }

    /// Draw a radial spot at UV `(u, v)`; see [`TiledSurface::paint_spot`]
    pub fn paint_spot(
        &mut self,
        u: f32,
        v: f32,
        color: [f32; 4],
        radius: f32,
        hardness: f32,
        mode: CompositeMode,
    ) -> Option<PixelRect> {
        self.modify(|tiles| tiles.paint_spot(u, v, color, radius, hardness, mode))
    }

    /// Nearest-texel lookup at UV `(u, v)`, clamped to edge
    pub fn sample_uv(&self, u: f32, v: f32) -> [f32; 4] {
        let size = self.size();
        let max = (size - 1) as f32;
        let x = (u * size as f32).floor().clamp(0.0, max) as u32;
        let y = ((1.0 - v) * size as f32).floor().clamp(0.0, max) as u32;
        self.tiles.surface().get_pixel(x, y).unwrap_or([0.0; 4])
    }

    /// Pixel at `(x, y)` with row 0 at the top
    pub fn pixel(&self, x: u32, y: u32) -> Option<[f32; 4]> {
        self.tiles.surface().get_pixel(x, y)
    }

    pub fn is_transparent(&self) -> bool {
        self.tiles.surface().is_transparent()
    }

    /// 8-bit straight-alpha RGBA bytes, row 0 at the top
    pub fn to_rgba8(&self) -> Vec<u8> {
        self.tiles.surface().to_rgba8()
    }

    /// Encode as PNG; the alpha channel carries coverage
    pub fn encode_png(&self) -> Result<Vec<u8>, PaintError> {
        let size = self.size();
        let mut buffer = Vec::new();
        PngEncoder::new(Cursor::new(&mut buffer)).write_image(
            &self.to_rgba8(),
            size,
            size,
            ExtendedColorType::Rgba8,
        )?;
        Ok(buffer)
    }
}

impl std::fmt::Debug for Texture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Texture")
            .field("handle", &self.handle)
            .field("size", &self.size())
            .field("version", &self.version)
            .field("needs_update", &self.needs_update)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handles_are_unique() {
        let a = Texture::try_new(64, 64).unwrap();
        let b = Texture::try_new(64, 64).unwrap();
        assert_ne!(a.handle(), b.handle());
    }

    #[test]
    fn test_invalid_size() {
        assert!(matches!(
            Texture::try_new(0, 64),
            Err(PaintError::InvalidTextureSize(0))
        ));
        assert!(Texture::try_new(MAX_TEXTURE_SIZE * 2, 64).is_err());
    }

    #[test]
    fn test_mutation_flags_update() {
        let mut texture = Texture::try_new(64, 32).unwrap();
        assert!(texture.take_needs_update());
        assert!(!texture.take_needs_update());

        let before = texture.version();
        texture.paint_spot(0.5, 0.5, [1.0, 0.0, 0.0, 1.0], 0.1, 1.0, CompositeMode::Normal);
        assert!(texture.needs_update());
        assert!(texture.version() > before);
        assert!(!texture.take_dirty_tiles().is_empty());
    }

    #[test]
    fn test_fresh_texture_uploads_every_tile() {
        let mut texture = Texture::try_new(128, 64).unwrap();
        assert_eq!(texture.take_dirty_tiles().len(), 4);
        assert!(texture.take_dirty_tiles().is_empty());
    }

    #[test]
    fn test_sample_uv_clamps_to_edge() {
        let mut texture = Texture::try_new(64, 64).unwrap();
        texture.paint_spot(1.0, 0.0, [0.0, 0.0, 1.0, 1.0], 0.05, 1.0, CompositeMode::Normal);

        // Bottom-right texel in UV terms is (u=1, v=0)
        let texel = texture.sample_uv(1.5, -0.5);
        assert!((texel[2] - 1.0).abs() < 1e-6);
        assert!(texel[3] > 0.0);
    }

    #[test]
    fn test_encode_png() {
        let mut texture = Texture::try_new(64, 64).unwrap();
        texture.paint_spot(0.5, 0.5, [1.0, 0.0, 0.0, 1.0], 0.2, 0.6, CompositeMode::Normal);

        let png = texture.encode_png().unwrap();
        assert_eq!(&png[1..4], b"PNG");

        let decoded = image::load_from_memory(&png).unwrap().to_rgba8();
        assert_eq!(decoded.dimensions(), (64, 64));
        assert_eq!(decoded.get_pixel(32, 32).0, [255, 0, 0, 255]);
        assert_eq!(decoded.get_pixel(0, 0).0[3], 0);
    }
}
