//! Built-in environment presets.
//!
//! These are static rule tables, not engine behaviour: each one is a
//! ready-made biome for composites and demos.

use super::def::{Environment, SurfaceColorRule, SurfaceTextureRule, TerrainLayer};
use super::transform::{ColorTransform, TextureTransform};
use crate::color::Rgb;

/// Names of all presets, in registration order.
pub const PRESET_NAMES: [&str; 6] = [
    "test_pattern",
    "desert_canyons",
    "ice_plains",
    "rocky_oceans",
    "bluffs",
    "mountainous_everglades",
];

const SAND: Rgb = Rgb::from_u8(254, 243, 223);

fn constant(min: f32, max: f32, color: Rgb) -> SurfaceColorRule {
    SurfaceColorRule::new(min, max, ColorTransform::Constant(color))
}

fn keep_all() -> Vec<SurfaceTextureRule> {
    vec![SurfaceTextureRule::new(0.0, 1.0, TextureTransform::Keep)]
}

/// A single linear layer in one flat color, optionally striped.
pub fn test_pattern(color: Rgb, striped: bool) -> Environment {
    let texture = if striped {
        TextureTransform::Striped {
            band: 4,
            factor: 0.95,
        }
    } else {
        TextureTransform::Scale(0.95)
    };
    Environment::from_parts(
        "test_pattern".to_string(),
        vec![TerrainLayer::new(0.0, 1.0, 64.0, 1.0, 1.0)],
        vec![SurfaceTextureRule::new(0.0, 1.0, texture)],
        vec![constant(0.0, 1.0, color)],
        None,
    )
}

/// Alternating steep and shallow strata in banded reds and sand.
pub fn desert_canyons() -> Environment {
    // Sandy floor, then 0.1-wide bands alternating steep walls and ledges.
    let layers = vec![
        TerrainLayer::new(0.0, 0.2, 10.0, 1.0, 1.0),
        TerrainLayer::new(0.2, 0.3, 8.0, 5.0, 4.0),
        TerrainLayer::new(0.3, 0.4, 2.0, 1.0, 1.0),
        TerrainLayer::new(0.4, 0.5, 8.0, 5.0, 4.0),
        TerrainLayer::new(0.5, 0.6, 2.0, 1.0, 1.0),
        TerrainLayer::new(0.6, 0.7, 8.0, 5.0, 4.0),
        TerrainLayer::new(0.7, 0.8, 2.0, 1.0, 1.0),
        TerrainLayer::new(0.8, 0.9, 8.0, 5.0, 4.0),
        TerrainLayer::new(0.9, 1.0, 2.0, 1.0, 1.0),
    ];
    let colors = vec![
        constant(0.0, 0.18, Rgb::from_u8(88, 2, 1)),
        constant(0.18, 0.21, SAND),
        constant(0.21, 0.37, Rgb::from_u8(171, 0, 104)),
        constant(0.37, 0.42, SAND),
        constant(0.42, 0.58, Rgb::from_u8(224, 7, 2)),
        constant(0.58, 0.61, SAND),
        constant(0.61, 0.77, Rgb::from_u8(255, 108, 2)),
        constant(0.77, 0.84, SAND),
        constant(0.84, 0.97, Rgb::from_u8(254, 193, 6)),
        constant(0.97, 1.0, SAND),
    ];
    Environment::from_parts(
        "desert_canyons".to_string(),
        layers,
        keep_all(),
        colors,
        Some(10.0),
    )
}

/// Flat frozen lowlands with a gentle rise into snow fields.
pub fn ice_plains() -> Environment {
    Environment::from_parts(
        "ice_plains".to_string(),
        vec![
            TerrainLayer::new(0.0, 0.5, 8.0, 1.0, 8.0),
            TerrainLayer::new(0.5, 1.0, 32.0, 0.25, 1.0),
        ],
        keep_all(),
        vec![
            constant(0.0, 0.15, Rgb::from_u8(0, 107, 206)),
            constant(0.15, 0.23, Rgb::from_u8(180, 207, 250)),
            constant(0.23, 1.0, Rgb::from_u8(255, 255, 255)),
        ],
        None,
    )
}

/// One sharp grey layer.
pub fn rocky_oceans() -> Environment {
    Environment::from_parts(
        "rocky_oceans".to_string(),
        vec![TerrainLayer::new(0.0, 1.0, 64.0, 2.0, 4.0)],
        keep_all(),
        vec![constant(0.0, 1.0, Rgb::from_u8(128, 128, 128))],
        None,
    )
}

/// Terraced cliffs over sandy shores, capped with grass.
pub fn bluffs() -> Environment {
    Environment::from_parts(
        "bluffs".to_string(),
        vec![
            TerrainLayer::new(0.0, 0.25, 8.0, 2.0, 1.0),
            TerrainLayer::new(0.25, 0.5, 8.0, 2.0, 1.0),
            TerrainLayer::new(0.5, 0.75, 48.0, 1.0, 0.75),
            TerrainLayer::new(0.75, 1.0, 4.0, 4.0, 2.0),
        ],
        vec![
            SurfaceTextureRule::new(0.8, 1.0, TextureTransform::Keep),
            SurfaceTextureRule::new(0.3, 0.8, TextureTransform::Terrace { step: 5.0 }),
            SurfaceTextureRule::new(0.0, 0.3, TextureTransform::Keep),
        ],
        vec![
            constant(0.0, 0.15, SAND),
            constant(0.15, 0.95, Rgb::from_u8(128, 128, 128)),
            constant(0.95, 1.0, Rgb::from_u8(0, 128, 0)),
        ],
        None,
    )
}

/// Marshy lowlands rising into rippled, slope-shaded mountains.
///
/// `marsh_seed` drives the lowland erosion noise; seeds at or below 0.5
/// disable the erosion and leave only the undulation.
pub fn mountainous_everglades(marsh_seed: f64) -> Environment {
    Environment::from_parts(
        "mountainous_everglades".to_string(),
        vec![
            TerrainLayer::new(0.0, 0.15, 5.0, 1.0, 2.0),
            TerrainLayer::new(0.15, 0.5, 8.0, 0.9, 1.0),
            TerrainLayer::new(0.5, 1.0, 48.0, 1.0, 1.0),
        ],
        vec![
            SurfaceTextureRule::new(0.0, 0.15, TextureTransform::Marsh { z: marsh_seed }),
            SurfaceTextureRule::new(
                0.3,
                1.0,
                TextureTransform::Ripple {
                    freq_x: 12.0,
                    freq_y: 6.0,
                    amplitude: 0.5,
                },
            ),
        ],
        vec![
            SurfaceColorRule::new(
                0.2,
                1.0,
                ColorTransform::SlopeFacing {
                    descending: Rgb::from_u8(80, 69, 67),
                    ascending: Rgb::from_u8(0, 128, 0),
                    level: Rgb::from_u8(65, 71, 74),
                },
            ),
            constant(0.15, 0.2, Rgb::from_u8(0, 128, 0)),
            constant(0.1, 0.15, Rgb::from_u8(194, 178, 128)),
            constant(0.0, 0.1, Rgb::from_u8(86, 67, 22)),
        ],
        None,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_presets() -> Vec<Environment> {
        vec![
            test_pattern(Rgb::from_u8(255, 0, 0), true),
            test_pattern(Rgb::from_u8(0, 0, 255), false),
            desert_canyons(),
            ice_plains(),
            rocky_oceans(),
            bluffs(),
            mountainous_everglades(3.5),
        ]
    }

    #[test]
    fn test_all_presets_validate() {
        for env in all_presets() {
            assert!(
                env.validate().is_ok(),
                "preset {} failed validation: {:?}",
                env.name(),
                env.validate()
            );
        }
    }

    #[test]
    fn test_desert_canyon_layers_tile_unit_range() {
        let env = desert_canyons();
        let layers = env.terrain_layers();
        assert_eq!(layers.len(), 9);
        assert_eq!(layers[0].min_threshold, 0.0);
        assert_eq!(layers[8].max_threshold, 1.0);
        for pair in layers.windows(2) {
            assert_eq!(
                pair[0].max_threshold, pair[1].min_threshold,
                "gap or overlap between {:?} and {:?}",
                pair[0], pair[1]
            );
        }
        for (noise, expected) in [(0.7_f32, 6), (0.9, 8)] {
            let hits: Vec<usize> = (0..layers.len())
                .filter(|&i| layers[i].contains(noise))
                .collect();
            assert_eq!(hits, vec![expected], "noise {noise} must fall in one layer");
        }
        assert_eq!(env.total_layer_height(), 10.0 + 4.0 * 8.0 + 4.0 * 2.0);
    }

    #[test]
    fn test_preset_names_match() {
        let names: Vec<String> = all_presets()
            .iter()
            .map(|e| e.name().to_string())
            .collect();
        for name in PRESET_NAMES {
            assert!(names.iter().any(|n| n == name), "missing preset {name}");
        }
    }
}
