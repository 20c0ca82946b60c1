//! Tile combinators: blend several synthesized tiles into one.
//!
//! The four-input operators treat `a, b, c, d` as the corners of a 2×2
//! arrangement (`a` near origin, `b` along X, `c` along Z, `d` diagonal) and
//! weight them by the squared position of each cell. All of them build a new
//! tile carrying `a`'s options, environment and noise generator.

use std::sync::Arc;

use crate::color::{Rgb, lerp_color};
use crate::environment::Environment;
use crate::error::TerrainError;
use crate::grid::{ColorField, HeightField};
use crate::noise::{NoiseGenerator, OctaveNoise};
use crate::tile::{Tile, TileOptions};

/// Number of environments [`create`] blends.
pub const CREATE_ENVIRONMENTS: usize = 4;

/// Edge of the source tile that [`stitch`] blends toward its neighbour.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum StitchSide {
    /// Rows starting at `y = 0`, mirrored against the target's last rows.
    Top,
    /// Columns starting at `x = 0`, mirrored against the target's last columns.
    Left,
}

/// `a + (b - a) * t`, landing exactly on `b` once `t` reaches 1.
fn lerp(a: f32, b: f32, t: f32) -> f32 {
    if t >= 1.0 { b } else { a + (b - a) * t }
}

/// Horizontal and vertical corner weights of a cell: `clamp01(u²)`, `clamp01(v²)`.
fn corner_weights(x: usize, y: usize, width: usize, depth: usize) -> (f32, f32) {
    let u = x as f32 / width as f32;
    let v = y as f32 / depth as f32;
    ((u * u).clamp(0.0, 1.0), (v * v).clamp(0.0, 1.0))
}

fn check_shapes(tiles: [&Tile; 4]) -> Result<(), TerrainError> {
    let expected = tiles[0].shape();
    for tile in &tiles[1..] {
        if tile.shape() != expected {
            return Err(TerrainError::ShapeMismatch {
                expected,
                actual: tile.shape(),
            });
        }
    }
    Ok(())
}

/// Assemble the output tile from `a`'s metadata and freshly computed fields.
fn combined(a: &Tile, heights: Vec<f32>, colors: Vec<Option<Rgb>>) -> Result<Tile, TerrainError> {
    let (width, depth) = a.shape();
    Tile::from_fields(
        *a.options(),
        HeightField::from_vec(width, depth, heights)?,
        ColorField::from_vec(width, depth, colors)?,
        a.environment().cloned(),
        Arc::clone(a.noise()),
    )
}

/// Bilinear blend of four tiles with squared weights.
///
/// Cell `(x, y)` takes `lerp(lerp(a, b, wh), lerp(c, d, wh), wv)` for both
/// height and color.
///
/// # Errors
///
/// Returns [`TerrainError::ShapeMismatch`] if the tiles differ in size.
pub fn interpolate(a: &Tile, b: &Tile, c: &Tile, d: &Tile) -> Result<Tile, TerrainError> {
    check_shapes([a, b, c, d])?;
    let (width, depth) = a.shape();
    let mut heights = Vec::with_capacity(width * depth);
    let mut colors = Vec::with_capacity(width * depth);
    for j in 0..width * depth {
        let (wh, wv) = corner_weights(j % width, j / width, width, depth);
        heights.push(lerp(
            lerp(a.heights()[j], b.heights()[j], wh),
            lerp(c.heights()[j], d.heights()[j], wh),
            wv,
        ));
        colors.push(lerp_color(
            lerp_color(a.colors()[j], b.colors()[j], wh),
            lerp_color(c.colors()[j], d.colors()[j], wh),
            wv,
        ));
    }
    tracing::debug!(width, depth, "Interpolated tiles");
    combined(a, heights, colors)
}

/// Per-cell maximum of four tiles.
///
/// The color comes from the first tile, in `a, b, c, d` order, whose height
/// equals the maximum.
pub fn merge(a: &Tile, b: &Tile, c: &Tile, d: &Tile) -> Result<Tile, TerrainError> {
    check_shapes([a, b, c, d])?;
    let tiles = [a, b, c, d];
    let (width, depth) = a.shape();
    let mut heights = Vec::with_capacity(width * depth);
    let mut colors = Vec::with_capacity(width * depth);
    for j in 0..width * depth {
        let max = tiles
            .iter()
            .map(|t| t.heights()[j])
            .fold(f32::NEG_INFINITY, f32::max);
        heights.push(max);
        colors.push(
            tiles
                .iter()
                .find(|t| t.heights()[j] == max)
                .and_then(|t| t.colors()[j]),
        );
    }
    tracing::debug!(width, depth, "Merged tiles");
    combined(a, heights, colors)
}

/// Interpolated heights with a hard color pick.
///
/// Heights match [`interpolate`]. Each cell's color is taken from the tile
/// whose weighted height lies closest to the blended height, with weights
/// `(1-wh)(1-wv)`, `wh(1-wv)`, `(1-wh)wv` and `wh·wv`; ties go to the
/// earlier tile.
pub fn mutate(a: &Tile, b: &Tile, c: &Tile, d: &Tile) -> Result<Tile, TerrainError> {
    check_shapes([a, b, c, d])?;
    let tiles = [a, b, c, d];
    let (width, depth) = a.shape();
    let mut heights = Vec::with_capacity(width * depth);
    let mut colors = Vec::with_capacity(width * depth);
    for j in 0..width * depth {
        let (wh, wv) = corner_weights(j % width, j / width, width, depth);
        let target = lerp(
            lerp(a.heights()[j], b.heights()[j], wh),
            lerp(c.heights()[j], d.heights()[j], wh),
            wv,
        );
        let weights = [
            (1.0 - wh) * (1.0 - wv),
            wh * (1.0 - wv),
            (1.0 - wh) * wv,
            wh * wv,
        ];

        let mut best = 0;
        let mut best_distance = f32::INFINITY;
        for (k, (tile, weight)) in tiles.iter().zip(weights).enumerate() {
            let distance = (target - tile.heights()[j] * weight).abs();
            if distance < best_distance {
                best = k;
                best_distance = distance;
            }
        }

        heights.push(target);
        colors.push(tiles[best].colors()[j]);
    }
    tracing::debug!(width, depth, "Mutated tiles");
    combined(a, heights, colors)
}

/// Blend margin for an edge of `extent` cells: 5% of it, rounded down.
pub fn stitch_margin(extent: usize) -> usize {
    extent / 20
}

/// Blend weights toward the target for each of `margin` rows or columns.
///
/// Step `k` weighs `(1 - k / (margin - 1))²`, falling from 1 at the edge to
/// 0 at the inner end. A single-step margin blends fully.
pub fn stitch_weights(margin: usize) -> Vec<f32> {
    match margin {
        0 => Vec::new(),
        1 => vec![1.0],
        _ => {
            let step = 1.0 / (margin - 1) as f32;
            (0..margin)
                .map(|k| {
                    let w = 1.0 - step * k as f32;
                    w * w
                })
                .collect()
        }
    }
}

/// Blend `source`'s `side` edge toward the mirrored edge of `target`, in place.
///
/// For [`StitchSide::Top`], source row `k` blends with target row
/// `depth - 1 - k`; for [`StitchSide::Left`], source column `k` with target
/// column `width - 1 - k`. Heights blend linearly, colors channel-wise.
///
/// # Errors
///
/// Returns [`TerrainError::ShapeMismatch`] if the tiles differ in size.
pub fn stitch(source: &mut Tile, target: &Tile, side: StitchSide) -> Result<(), TerrainError> {
    if source.shape() != target.shape() {
        return Err(TerrainError::ShapeMismatch {
            expected: source.shape(),
            actual: target.shape(),
        });
    }
    let (width, depth) = source.shape();
    let margin = match side {
        StitchSide::Top => stitch_margin(depth),
        StitchSide::Left => stitch_margin(width),
    };
    let weights = stitch_weights(margin);
    let (heights, colors) = source.fields_mut();

    for (k, &weight) in weights.iter().enumerate() {
        let pairs: Box<dyn Iterator<Item = (usize, usize)>> = match side {
            StitchSide::Top => {
                Box::new((0..width).map(move |x| (x + k * width, x + (depth - 1 - k) * width)))
            }
            StitchSide::Left => {
                Box::new((0..depth).map(move |y| (k + y * width, (width - 1 - k) + y * width)))
            }
        };
        for (j, i) in pairs {
            heights[j] = lerp(heights[j], target.heights()[i], weight);
            colors[j] = lerp_color(colors[j], target.colors()[i], weight);
        }
    }
    tracing::debug!(?side, margin, width, depth, "Stitched tile edge");
    Ok(())
}

/// Synthesize one tile per environment and [`mutate`] them together.
///
/// With `noise` set, all four tiles sample the same generator; otherwise
/// each gets its own randomly seeded [`OctaveNoise`].
///
/// # Errors
///
/// Returns [`TerrainError::InvalidConfiguration`] unless exactly four
/// environments are given, checked before any tile is synthesized, and
/// any geometry error from `options`.
pub fn create(
    options: TileOptions,
    environments: &[Arc<Environment>],
    noise: Option<Arc<dyn NoiseGenerator>>,
) -> Result<Tile, TerrainError> {
    if environments.len() != CREATE_ENVIRONMENTS {
        return Err(TerrainError::InvalidConfiguration(environments.len()));
    }
    options.validate()?;

    let tiles = environments
        .iter()
        .map(|env| {
            let noise = match &noise {
                Some(shared) => Arc::clone(shared),
                None => Arc::new(OctaveNoise::random()) as Arc<dyn NoiseGenerator>,
            };
            Tile::generate(options, Arc::clone(env), noise)
        })
        .collect::<Result<Vec<_>, _>>()?;

    tracing::debug!(
        environments = ?environments.iter().map(|e| e.name()).collect::<Vec<_>>(),
        width = options.width,
        depth = options.depth,
        "Creating composite tile"
    );
    mutate(&tiles[0], &tiles[1], &tiles[2], &tiles[3])
}
