//! Dirty tile tracking for incremental uploads

use tracing::trace;

use super::{TileCoord, TiledSurface};

impl TiledSurface {
    /// Mark a pixel as modified (marks containing tile dirty)
    #[inline]
    pub fn mark_dirty(&mut self, x: u32, y: u32) {
        if x >= self.surface.width || y >= self.surface.height {
            return;
        }
        let tile_x = x / self.tile_size;
        let tile_y = y / self.tile_size;
        self.dirty_tiles.insert(TileCoord { x: tile_x, y: tile_y });
    }

    /// Mark a rectangular region as dirty
    pub fn mark_region_dirty(&mut self, x: u32, y: u32, w: u32, h: u32) {
        if w == 0 || h == 0 || x >= self.surface.width || y >= self.surface.height {
            return;
        }

        let x_end = x.saturating_add(w).min(self.surface.width);
        let y_end = y.saturating_add(h).min(self.surface.height);

        let tile_x_start = x / self.tile_size;
        let tile_y_start = y / self.tile_size;
        let tile_x_end = (x_end - 1) / self.tile_size;
        let tile_y_end = (y_end - 1) / self.tile_size;

        let tiles_before = self.dirty_tiles.len();

        for ty in tile_y_start..=tile_y_end {
            for tx in tile_x_start..=tile_x_end {
                self.dirty_tiles.insert(TileCoord { x: tx, y: ty });
            }
        }

        trace!(
            "mark_region_dirty: ({}, {}) {}x{} -> {} new tiles (total {})",
            x,
            y,
            w,
            h,
            self.dirty_tiles.len() - tiles_before,
            self.dirty_tiles.len()
        );
    }

    /// Mark every tile dirty
    pub fn mark_all_dirty(&mut self) {
        for ty in 0..self.tiles_y() {
            for tx in 0..self.tiles_x() {
                self.dirty_tiles.insert(TileCoord { x: tx, y: ty });
            }
        }
    }

    /// Get all dirty tiles, sorted row-major, and clear the dirty set
    pub fn take_dirty_tiles(&mut self) -> Vec<TileCoord> {
        let mut tiles: Vec<_> = self.dirty_tiles.drain().collect();
        tiles.sort_unstable_by_key(|t| (t.y, t.x));
        tiles
    }

    /// Check if any tiles are dirty
    #[inline]
    pub fn has_dirty_tiles(&self) -> bool {
        !self.dirty_tiles.is_empty()
    }

    /// Get the number of dirty tiles
    #[inline]
    pub fn dirty_tile_count(&self) -> usize {
        self.dirty_tiles.len()
    }
}
