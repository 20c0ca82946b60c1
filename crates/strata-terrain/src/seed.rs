//! Seed handling and deterministic math.
//!
//! The default noise generator is parameterised by a single scalar that is
//! used as the third noise coordinate for every cell. This module produces
//! that scalar either randomly or reproducibly from an integer world seed,
//! and wraps the `libm` functions used on the synthesis path so results do
//! not depend on the platform libc.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::ops::Range;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Range the scalar noise seed is drawn from.
pub const NOISE_SEED_RANGE: Range<f64> = 0.0..100.0;

// ---------------------------------------------------------------------------
// Seed derivation
// ---------------------------------------------------------------------------

/// Draw a fresh noise seed from the thread RNG.
pub fn random_noise_seed() -> f64 {
    rand::rng().random_range(NOISE_SEED_RANGE)
}

/// Map an integer world seed onto the scalar noise seed range.
///
/// The same `world_seed` always yields the same scalar on every platform.
pub fn noise_seed_from_u64(world_seed: u64) -> f64 {
    ChaCha8Rng::seed_from_u64(world_seed).random_range(NOISE_SEED_RANGE)
}

/// Derive an independent sub-seed for a named consumer of the world seed.
///
/// Used to give seeded environment presets their own stream without
/// correlating them with the terrain noise.
pub fn derive_seed(world_seed: u64, label: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    world_seed.hash(&mut hasher);
    label.hash(&mut hasher);
    hasher.finish()
}

// ---------------------------------------------------------------------------
// Deterministic math (libm)
// ---------------------------------------------------------------------------

#[inline]
pub fn det_powf(base: f32, exp: f32) -> f32 {
    libm::powf(base, exp)
}

#[inline]
pub fn det_sin(x: f64) -> f64 {
    libm::sin(x)
}

#[inline]
pub fn det_cos(x: f64) -> f64 {
    libm::cos(x)
}

#[inline]
pub fn det_atan2(y: f64, x: f64) -> f64 {
    libm::atan2(y, x)
}
