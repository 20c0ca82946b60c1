//! Procedural terrain synthesis: multi-octave noise, biome rule tables,
//! height field synthesis and tile combinators.

mod color;
mod error;
mod grid;
mod seed;
mod tile;

pub mod async_generation;
pub mod combine;
pub mod environment;
pub mod noise;
pub mod preview;
pub mod smoothing;
pub mod synthesis;

pub use async_generation::{AsyncTileGenerator, GeneratedTile, TileKey, TileTask};
pub use color::{MISSING_COLOR, Rgb, lerp_color};
pub use combine::{StitchSide, create, interpolate, merge, mutate, stitch};
pub use environment::{
    ColorTransform, Environment, EnvironmentBuilder, EnvironmentError, EnvironmentId,
    EnvironmentRegistry, EnvironmentRegistryError, SurfaceColorRule, SurfaceTextureRule,
    TerrainLayer, TextureTransform,
};
pub use error::TerrainError;
pub use grid::{ColorField, Grid, HeightField, NoiseField};
pub use self::noise::{ConstantNoise, NoiseGenerator, OctaveNoise};
pub use seed::{derive_seed, noise_seed_from_u64, random_noise_seed};
pub use synthesis::synthesize;
pub use tile::{HEIGHT_SCALE, Placement, Tile, TileOptions};
