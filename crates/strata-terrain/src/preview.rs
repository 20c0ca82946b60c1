//! Preview rendering: 2D images of a tile's height and color fields.
//!
//! Provides [`DebugImage`] and the renderers used by the demo binary and
//! by tests to eyeball synthesis output without a mesh pipeline.

mod image;
mod renderers;

pub use self::image::DebugImage;
pub use renderers::{height_to_gray, render_color_preview, render_height_preview, render_tile_previews};
