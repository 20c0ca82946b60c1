//! Tiles: one rectangular grid of synthesized heights and colors.

use std::fmt;
use std::sync::Arc;

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::environment::Environment;
use crate::error::TerrainError;
use crate::grid::{ColorField, HeightField};
use crate::noise::{NoiseGenerator, OctaveNoise};
use crate::synthesis::synthesize;

/// Vertical scale collaborators apply to normalized heights when meshing.
pub const HEIGHT_SCALE: f64 = 64.0;

/// Tile geometry: grid size and world-space sampling.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TileOptions {
    /// Cells along X.
    pub width: usize,
    /// Cells along Z.
    pub depth: usize,
    pub offset_x: f64,
    pub offset_z: f64,
    /// World distance between neighbouring samples along X.
    pub stride_x: f64,
    /// World distance between neighbouring samples along Z.
    pub stride_z: f64,
}

impl Default for TileOptions {
    fn default() -> Self {
        Self {
            width: 128,
            depth: 128,
            offset_x: 0.0,
            offset_z: 0.0,
            stride_x: 1.0,
            stride_z: 1.0,
        }
    }
}

impl TileOptions {
    /// Check dimensions, strides and offsets.
    ///
    /// # Errors
    ///
    /// [`TerrainError::InvalidDimensions`] for a zero width or depth,
    /// [`TerrainError::InvalidStride`] for a non-positive or non-finite stride,
    /// [`TerrainError::InvalidOffset`] for a non-finite offset.
    pub fn validate(&self) -> Result<(), TerrainError> {
        if self.width == 0 || self.depth == 0 {
            return Err(TerrainError::InvalidDimensions {
                width: self.width,
                depth: self.depth,
            });
        }
        let stride_ok = |s: f64| s.is_finite() && s > 0.0;
        if !stride_ok(self.stride_x) || !stride_ok(self.stride_z) {
            return Err(TerrainError::InvalidStride {
                stride_x: self.stride_x,
                stride_z: self.stride_z,
            });
        }
        if !self.offset_x.is_finite() || !self.offset_z.is_finite() {
            return Err(TerrainError::InvalidOffset {
                offset_x: self.offset_x,
                offset_z: self.offset_z,
            });
        }
        Ok(())
    }

    /// Number of cells.
    pub fn size(&self) -> usize {
        self.width * self.depth
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.width, self.depth)
    }
}

/// How collaborators position a tile's mesh in the scene.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Placement {
    /// `(offset_x, 0, offset_z)`.
    pub translation: DVec3,
    /// Horizontal stretch compensating for sub-unit strides; Y is always 1.
    pub scale: DVec3,
    /// Multiplier from normalized height to vertex Y.
    pub height_scale: f64,
}

/// One synthesized terrain tile.
///
/// Owns its height and color buffers; the environment and noise generator
/// are shared read-only with other tiles.
#[derive(Clone)]
pub struct Tile {
    options: TileOptions,
    heights: HeightField,
    colors: ColorField,
    environment: Option<Arc<Environment>>,
    noise: Arc<dyn NoiseGenerator>,
}

impl Tile {
    /// Synthesize a tile from `environment` sampled through `noise`.
    ///
    /// # Errors
    ///
    /// Returns a [`TerrainError`] if `options` fails validation.
    pub fn generate(
        options: TileOptions,
        environment: Arc<Environment>,
        noise: Arc<dyn NoiseGenerator>,
    ) -> Result<Self, TerrainError> {
        options.validate()?;
        let (heights, colors) = synthesize(&options, &environment, noise.as_ref());
        Ok(Self {
            options,
            heights,
            colors,
            environment: Some(environment),
            noise,
        })
    }

    /// Synthesize a tile with its own randomly seeded [`OctaveNoise`].
    pub fn with_random_noise(
        options: TileOptions,
        environment: Arc<Environment>,
    ) -> Result<Self, TerrainError> {
        Self::generate(options, environment, Arc::new(OctaveNoise::random()))
    }

    /// Wrap externally produced fields; synthesis is skipped.
    ///
    /// # Errors
    ///
    /// Returns [`TerrainError::FieldSizeMismatch`] if either field does not
    /// match the options' shape, or a validation error for bad options.
    pub fn from_fields(
        options: TileOptions,
        heights: HeightField,
        colors: ColorField,
        environment: Option<Arc<Environment>>,
        noise: Arc<dyn NoiseGenerator>,
    ) -> Result<Self, TerrainError> {
        options.validate()?;
        for (width, depth) in [heights.shape(), colors.shape()] {
            if (width, depth) != options.shape() {
                return Err(TerrainError::FieldSizeMismatch {
                    expected: options.size(),
                    actual: width * depth,
                });
            }
        }
        Ok(Self {
            options,
            heights,
            colors,
            environment,
            noise,
        })
    }

    pub fn options(&self) -> &TileOptions {
        &self.options
    }

    pub fn width(&self) -> usize {
        self.options.width
    }

    pub fn depth(&self) -> usize {
        self.options.depth
    }

    pub fn shape(&self) -> (usize, usize) {
        self.options.shape()
    }

    pub fn heights(&self) -> &HeightField {
        &self.heights
    }

    pub fn colors(&self) -> &ColorField {
        &self.colors
    }

    pub(crate) fn fields_mut(&mut self) -> (&mut HeightField, &mut ColorField) {
        (&mut self.heights, &mut self.colors)
    }

    /// The environment this tile was synthesized from, if any.
    pub fn environment(&self) -> Option<&Arc<Environment>> {
        self.environment.as_ref()
    }

    pub fn noise(&self) -> &Arc<dyn NoiseGenerator> {
        &self.noise
    }

    /// Scene placement for this tile's mesh.
    pub fn placement(&self) -> Placement {
        Placement {
            translation: DVec3::new(self.options.offset_x, 0.0, self.options.offset_z),
            scale: DVec3::new(
                (0.5 / self.options.stride_x).max(1.0),
                1.0,
                (0.5 / self.options.stride_z).max(1.0),
            ),
            height_scale: HEIGHT_SCALE,
        }
    }

    /// Consume the tile, returning its fields.
    pub fn into_fields(self) -> (HeightField, ColorField) {
        (self.heights, self.colors)
    }
}

impl fmt::Debug for Tile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tile")
            .field("options", &self.options)
            .field(
                "environment",
                &self.environment.as_ref().map(|e| e.name().to_string()),
            )
            .field("unclassified", &self.colors.missing_count())
            .finish_non_exhaustive()
    }
}
