//! Renderers turning tile fields into preview images.

use super::image::DebugImage;
use crate::grid::{ColorField, HeightField};
use crate::tile::Tile;

/// Map a normalized height to an opaque grey level.
pub fn height_to_gray(height: f32) -> [u8; 4] {
    let level = (height.clamp(0.0, 1.0) * 255.0).round() as u8;
    [level, level, level, 255]
}

/// Render a height field as greyscale, one pixel per cell.
pub fn render_height_preview(heights: &HeightField) -> DebugImage {
    let (width, depth) = heights.shape();
    let mut image = DebugImage::new(width as u32, depth as u32);
    for (j, &h) in heights.iter().enumerate() {
        let (x, y) = heights.coords_of(j);
        image.set_pixel(x as u32, y as u32, height_to_gray(h));
    }
    image
}

/// Render a color field, one pixel per cell.
///
/// Unclassified cells show as [`MISSING_COLOR`](crate::MISSING_COLOR).
pub fn render_color_preview(colors: &ColorField) -> DebugImage {
    let (width, depth) = colors.shape();
    let mut image = DebugImage::new(width as u32, depth as u32);
    for j in 0..colors.len() {
        let (x, y) = colors.coords_of(j);
        image.set_color(x as u32, y as u32, colors.resolved(j));
    }
    image
}

/// Render both previews of a tile: `(heights, colors)`.
pub fn render_tile_previews(tile: &Tile) -> (DebugImage, DebugImage) {
    (
        render_height_preview(tile.heights()),
        render_color_preview(tile.colors()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgb;

    #[test]
    fn test_height_preview_dimensions_and_levels() {
        let heights = HeightField::from_vec(3, 2, vec![0.0, 0.5, 1.0, 0.25, 0.75, 1.0]).unwrap();
        let image = render_height_preview(&heights);
        assert_eq!(image.dimensions(), (3, 2));
        assert_eq!(image.get_pixel(0, 0), [0, 0, 0, 255]);
        assert_eq!(image.get_pixel(2, 0), [255, 255, 255, 255]);
        assert_eq!(image.get_pixel(0, 1), [64, 64, 64, 255]);
    }

    #[test]
    fn test_color_preview_marks_missing_magenta() {
        let colors = ColorField::from_vec(2, 1, vec![Some(Rgb::from_u8(1, 2, 3)), None]).unwrap();
        let image = render_color_preview(&colors);
        assert_eq!(image.get_pixel(0, 0), [1, 2, 3, 255]);
        assert_eq!(image.get_pixel(1, 0), [255, 0, 255, 255]);
    }

    #[test]
    fn test_gray_clamps_out_of_range() {
        assert_eq!(height_to_gray(-1.0), [0, 0, 0, 255]);
        assert_eq!(height_to_gray(2.0), [255, 255, 255, 255]);
    }
}
