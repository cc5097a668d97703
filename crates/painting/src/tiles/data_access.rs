//! Tile data access for partial uploads

use super::{PixelRect, TileCoord, TiledSurface};

impl TiledSurface {
    /// Get tile data for upload.
    /// The returned Vec has tile_size * tile_size elements (or less for edge tiles)
    pub fn get_tile_data(&self, coord: TileCoord) -> Vec<[f32; 4]> {
        let (x0, y0, w, h) = self.get_tile_bounds(coord);
        let width = self.surface.width as usize;
        let pixels = self.surface.pixels();

        let mut data = Vec::with_capacity((w * h) as usize);
        for y in y0..y0 + h {
            let row = y as usize * width;
            data.extend_from_slice(&pixels[row + x0 as usize..row + (x0 + w) as usize]);
        }
        data
    }

    /// Get tile bounds (x, y, width, height) in pixel coordinates
    pub fn get_tile_bounds(&self, coord: TileCoord) -> PixelRect {
        let tile_start_x = (coord.x * self.tile_size).min(self.surface.width);
        let tile_start_y = (coord.y * self.tile_size).min(self.surface.height);

        let tile_width = self.tile_size.min(self.surface.width - tile_start_x);
        let tile_height = self.tile_size.min(self.surface.height - tile_start_y);

        (tile_start_x, tile_start_y, tile_width, tile_height)
    }
}
