//! Bevy `Image` upload for the decoration texture

use bevy::asset::RenderAssetUsages;
use bevy::prelude::Image;
use bevy::render::render_resource::{Extent3d, TextureDimension, TextureFormat, TextureUsages};

use crate::surface::quantize_channel;
use crate::texture::Texture;

const BYTES_PER_PIXEL: usize = 4;

/// Create a Bevy image holding the texture's current pixels
pub fn texture_to_image(texture: &Texture) -> Image {
    let size = texture.size();
    let mut image = Image::new_fill(
        Extent3d {
            width: size,
            height: size,
            depth_or_array_layers: 1,
        },
        TextureDimension::D2,
        &[0, 0, 0, 0], // Transparent
        TextureFormat::Rgba8UnormSrgb,
        RenderAssetUsages::RENDER_WORLD | RenderAssetUsages::MAIN_WORLD,
    );
    image.texture_descriptor.usage = TextureUsages::TEXTURE_BINDING | TextureUsages::COPY_DST;
    image.data = Some(texture.to_rgba8());
    image
}

/// Copy the texture into `image` if it changed since the last sync.
///
/// Only dirty tiles are rewritten when the image already has the right
/// size. Returns whether the image was updated. Call once per frame.
pub fn sync_image(texture: &mut Texture, image: &mut Image) -> bool {
    if !texture.take_needs_update() {
        return false;
    }
    let dirty_tiles = texture.take_dirty_tiles();

    let size = texture.size();
    let expected_len = size as usize * size as usize * BYTES_PER_PIXEL;
    let Some(data) = image
        .data
        .as_mut()
        .filter(|data| data.len() == expected_len)
    else {
        // Size changed (strategy switch) or no CPU copy: rebuild the image
        *image = texture_to_image(texture);
        return true;
    };

    let tiles = texture.tiles();
    for coord in dirty_tiles {
        let tile_data = tiles.get_tile_data(coord);
        let (tile_x, tile_y, tile_w, _) = tiles.get_tile_bounds(coord);
        for (local_y, row) in tile_data.chunks_exact(tile_w as usize).enumerate() {
            let global_y = tile_y as usize + local_y;
            let dst_start = (global_y * size as usize + tile_x as usize) * BYTES_PER_PIXEL;
            let dst = &mut data[dst_start..dst_start + row.len() * BYTES_PER_PIXEL];
            for (dst_pixel, pixel) in dst.chunks_exact_mut(BYTES_PER_PIXEL).zip(row) {
                for (byte, &channel) in dst_pixel.iter_mut().zip(pixel) {
                    *byte = quantize_channel(channel);
                }
            }
        }
    }
    true
}
