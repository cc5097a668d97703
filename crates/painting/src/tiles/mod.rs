//! Tile management and dirty tracking for CPU surfaces

mod data_access;
mod dirty_tracking;
mod spot;

use std::collections::HashSet;

use crate::error::PaintError;
use crate::surface::CpuSurface;

pub use spot::spot_falloff;

/// Tile coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileCoord {
    pub x: u32,
    pub y: u32,
}

/// Pixel rectangle (x, y, width, height)
pub type PixelRect = (u32, u32, u32, u32);

/// Manages tiled access to a surface with dirty tracking
pub struct TiledSurface {
    pub(crate) surface: CpuSurface,
    pub(crate) tile_size: u32,
    tiles_x: u32,
    tiles_y: u32,
    pub(crate) dirty_tiles: HashSet<TileCoord>,
}

impl TiledSurface {
    /// Create a new tiled surface with the given dimensions and tile size
    pub fn try_new(width: u32, height: u32, tile_size: u32) -> Result<Self, PaintError> {
        let surface = CpuSurface::try_new(width, height)?;
        let tile_size = tile_size.clamp(1, width.max(height));
        let tiles_x = width.div_ceil(tile_size);
        let tiles_y = height.div_ceil(tile_size);

        Ok(Self {
            surface,
            tile_size,
            tiles_x,
            tiles_y,
            dirty_tiles: HashSet::new(),
        })
    }

    /// Get the tile size
    #[inline]
    pub fn tile_size(&self) -> u32 {
        self.tile_size
    }

    /// Get the number of tiles in x direction
    #[inline]
    pub fn tiles_x(&self) -> u32 {
        self.tiles_x
    }

    /// Get the number of tiles in y direction
    #[inline]
    pub fn tiles_y(&self) -> u32 {
        self.tiles_y
    }

    /// Get the underlying surface for direct pixel access
    #[inline]
    pub fn surface(&self) -> &CpuSurface {
        &self.surface
    }

    /// Get mutable access to the underlying surface.
    /// Callers are responsible for marking what they touch as dirty.
    #[inline]
    pub fn surface_mut(&mut self) -> &mut CpuSurface {
        &mut self.surface
    }

    /// Reset every pixel to transparent and mark the whole surface dirty
    pub fn clear(&mut self) {
        self.surface.clear([0.0; 4]);
        self.mark_all_dirty();
    }
}
