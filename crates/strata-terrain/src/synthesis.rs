//! Height field synthesis: noise sampling, layer stacking, surface
//! classification, normalization and smoothing.

use crate::color::Rgb;
use crate::environment::{ColorFn, ColorInput, Environment, TextureFn, TextureInput};
use crate::grid::{ColorField, HeightField, NoiseField};
use crate::noise::NoiseGenerator;
use crate::smoothing::{SMOOTHING_CONTROL, ScalarKalman, smooth_in_scan_order};
use crate::tile::TileOptions;

/// Sample `noise` at every cell's world coordinate and normalize by the tile maximum.
///
/// Cell `(x, y)` reads `offset + index * stride` on each axis. Samples are
/// divided by the largest sample (tracked from 0) and clamped to `[0, 1]`;
/// a non-positive maximum or a non-finite sample yields 0.
pub fn sample_noise_field(options: &TileOptions, noise: &dyn NoiseGenerator) -> NoiseField {
    let (width, depth) = (options.width, options.depth);
    let mut raw = Vec::with_capacity(width * depth);
    let mut max = 0.0_f64;
    for y in 0..depth {
        let wz = options.offset_z + y as f64 * options.stride_z;
        for x in 0..width {
            let wx = options.offset_x + x as f64 * options.stride_x;
            let sample = noise.generate(wx, wz);
            if sample > max {
                max = sample;
            }
            raw.push(sample);
        }
    }

    let mut field = NoiseField::filled(width, depth, 0.0);
    for (cell, sample) in field.as_mut_slice().iter_mut().zip(raw) {
        let value = if max > 0.0 && max.is_finite() {
            sample / max
        } else {
            0.0
        };
        *cell = if value.is_finite() {
            value.clamp(0.0, 1.0) as f32
        } else {
            0.0
        };
    }
    field
}

/// Build the height and color fields of one tile.
///
/// `options` must already be validated. Synthesis itself never fails:
/// rule tables that match nothing leave heights at 0 and colors unset.
pub fn synthesize(
    options: &TileOptions,
    env: &Environment,
    noise: &dyn NoiseGenerator,
) -> (HeightField, ColorField) {
    let noise_field = sample_noise_field(options, noise);
    synthesize_from_noise(&noise_field, env)
}

/// Run the layer, texture and color passes, then normalize and smooth.
///
/// Cells are visited column by column (`x` outer, `y` inner). The texture
/// and color passes normalize against the running maximum height, so a cell
/// is classified relative to the columns already visited.
pub fn synthesize_from_noise(noise: &NoiseField, env: &Environment) -> (HeightField, ColorField) {
    let (width, depth) = noise.shape();
    let mut heights = HeightField::filled(width, depth, 0.0);
    let mut colors = ColorField::filled(width, depth, None);
    let mut max_height = 0.0_f32;

    for x in 0..width {
        for y in 0..depth {
            let j = noise.index_of(x, y);
            stack_layers(env, noise[j], &mut heights[j], &mut max_height);
            apply_texture(env, heights.as_mut_slice(), j, x, y, max_height);
            if let Some(color) = classify_color(env, heights.as_slice(), j, width, max_height) {
                colors[j] = Some(color);
            }
        }
    }

    for h in heights.as_mut_slice() {
        *h = normalize(*h, max_height);
    }
    let mut filter = ScalarKalman::default();
    smooth_in_scan_order(heights.as_mut_slice(), &mut filter, SMOOTHING_CONTROL);

    tracing::debug!(
        environment = env.name(),
        width,
        depth,
        max_height,
        unclassified = colors.missing_count(),
        "Synthesized height field"
    );

    (heights, colors)
}

/// `value / max` clamped to `[0, 1]`; 0 when `max` is not positive.
fn normalize(value: f32, max: f32) -> f32 {
    if max > 0.0 {
        (value / max).clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Stack the environment's layers for one cell.
///
/// Each layer either claims the cell or reserves its `map_height` of budget
/// for the layers below it. The first claiming layer stops the walk.
fn stack_layers(env: &Environment, noise: f32, height: &mut f32, max_height: &mut f32) {
    let mut prev = 0.0_f32;
    for layer in env.terrain_layers() {
        if !layer.contains(noise) {
            prev += layer.map_height;
            continue;
        }
        let candidate = prev + layer.intensity(noise) * layer.map_height;
        if *height > candidate {
            prev += layer.map_height;
            continue;
        }
        *height = candidate;
        prev += layer.map_height;
        *max_height = max_height.max(prev);
        break;
    }
}

/// First matching texture rule overwrites the raw height.
fn apply_texture(env: &Environment, heights: &mut [f32], j: usize, x: usize, y: usize, max: f32) {
    let normalized = normalize(heights[j], max);
    let Some(rule) = env
        .surface_textures()
        .iter()
        .find(|rule| rule.applies_to(normalized))
    else {
        return;
    };
    let input = TextureInput {
        heights: &*heights,
        index: j,
        x,
        y,
    };
    let textured = rule.transform.apply(&input);
    heights[j] = textured;
}

/// Last matching color rule wins.
fn classify_color(
    env: &Environment,
    heights: &[f32],
    j: usize,
    width: usize,
    max: f32,
) -> Option<Rgb> {
    let normalized = normalize(heights[j], max);
    let input = ColorInput {
        heights,
        normalized,
        index: j,
        width,
    };
    env.surface_colors()
        .iter()
        .rev()
        .find(|rule| rule.applies_to(normalized))
        .map(|rule| rule.transform.color(&input))
}
