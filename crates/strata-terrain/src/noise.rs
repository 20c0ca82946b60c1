//! Noise generators feeding tile synthesis.
//!
//! A generator maps a continuous world-space coordinate to a scalar. Tiles
//! sample it at `offset + index * stride`, so two tiles that share a generator
//! see identical values wherever their world coordinates coincide; this is
//! what lets neighbouring tiles be stitched without a visible seam.

use std::sync::LazyLock;

use noise::{NoiseFn, Perlin};

use crate::seed::{noise_seed_from_u64, random_noise_seed};

/// Number of octaves accumulated by [`OctaveNoise`].
pub const OCTAVES: u32 = 4;

/// Per-octave amplification applied on top of the octave's quality.
pub const OCTAVE_GAIN: f64 = 1.75;

/// Factor the sampling quality grows by between octaves.
pub const QUALITY_GROWTH: f64 = 5.5;

/// Shared improved-Perlin permutation used by the default generator and by
/// noise-driven texture rules.
pub(crate) static IMPROVED_NOISE: LazyLock<Perlin> =
    LazyLock::new(|| Perlin::new(Perlin::DEFAULT_SEED));

/// Source of raw terrain noise.
///
/// Implementations must be deterministic and continuous; the value range is
/// unconstrained because synthesis normalizes per tile.
pub trait NoiseGenerator: Send + Sync {
    fn generate(&self, x: f64, y: f64) -> f64;
}

impl<F> NoiseGenerator for F
where
    F: Fn(f64, f64) -> f64 + Send + Sync,
{
    fn generate(&self, x: f64, y: f64) -> f64 {
        self(x, y)
    }
}

/// Warped multi-octave Perlin accumulator.
///
/// Unlike classic fBm, every octave samples at a *coarser* frequency and is
/// amplified *more*: octave `i` reads the noise at `(x, y) / q` with
/// `q = 5.5^i` and contributes `|noise * q * 1.75|`. The seed is held fixed
/// as the third noise coordinate for all cells.
#[derive(Clone, Debug)]
pub struct OctaveNoise {
    perlin: Perlin,
    z: f64,
}

impl OctaveNoise {
    /// Generator using `z` directly as the third noise coordinate.
    pub fn with_z(z: f64) -> Self {
        Self {
            perlin: IMPROVED_NOISE.clone(),
            z,
        }
    }

    /// Generator with a reproducible seed derived from `world_seed`.
    pub fn from_seed(world_seed: u64) -> Self {
        Self::with_z(noise_seed_from_u64(world_seed))
    }

    /// Generator with a randomly drawn seed.
    pub fn random() -> Self {
        Self::with_z(random_noise_seed())
    }

    /// The scalar seed (third noise coordinate).
    pub fn z(&self) -> f64 {
        self.z
    }
}

impl NoiseGenerator for OctaveNoise {
    fn generate(&self, x: f64, y: f64) -> f64 {
        let mut quality = 1.0;
        let mut height = 0.0;
        for _ in 0..OCTAVES {
            let sample = self.perlin.get([x / quality, y / quality, self.z]);
            height += (sample * quality * OCTAVE_GAIN).abs();
            quality *= QUALITY_GROWTH;
        }
        height
    }
}

/// Returns the same value for every coordinate.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ConstantNoise(pub f64);

impl NoiseGenerator for ConstantNoise {
    fn generate(&self, _x: f64, _y: f64) -> f64 {
        self.0
    }
}
