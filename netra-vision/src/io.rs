//! World-map export.

use std::path::Path;

use image::{Rgb, RgbImage};

use crate::grid::WorldMap;

/// Save the world map as a PNG.
///
/// Channel mapping follows the accumulation layout: red = obstacle,
/// green = target, blue = navigable. The image is flipped vertically so
/// the world origin sits at the bottom-left of the rendered map.
pub fn save_map_png(map: &WorldMap, path: &Path) -> Result<(), image::ImageError> {
    let size = map.size() as u32;
    let (obstacle, target, navigable) = map.channels();
    let stride = map.size();

    let img = RgbImage::from_fn(size, size, |x, y| {
        let row = stride - 1 - y as usize;
        let i = row * stride + x as usize;
        Rgb([obstacle[i], target[i], navigable[i]])
    });

    img.save(path)
}
