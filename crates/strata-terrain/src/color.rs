//! Surface color triplets and missing-color handling.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Color substituted by collaborators for cells no color rule classified.
pub const MISSING_COLOR: Rgb = Rgb::new(255.0, 0.0, 255.0);

/// An RGB triplet in 8-bit channel units.
///
/// Channels are stored as `f32` so that blended colors keep their fractional
/// part. Values outside `[0, 255]` are preserved; only [`Rgb::to_rgba8`] clamps.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f32; 3]", into = "[f32; 3]")]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Build a color from 8-bit channels.
    pub const fn from_u8(r: u8, g: u8, b: u8) -> Self {
        Self::new(r as f32, g as f32, b as f32)
    }

    /// Channel-wise linear interpolation: `self + (other - self) * t`.
    ///
    /// Returns `other` unchanged for `t >= 1`.
    pub fn lerp(self, other: Rgb, t: f32) -> Rgb {
        if t >= 1.0 {
            return other;
        }
        let from = Vec3::from(self);
        (from + (Vec3::from(other) - from) * t).into()
    }

    /// Round and saturate into an opaque 8-bit RGBA pixel.
    pub fn to_rgba8(self) -> [u8; 4] {
        let channel = |v: f32| v.round().clamp(0.0, 255.0) as u8;
        [channel(self.r), channel(self.g), channel(self.b), 255]
    }
}

impl From<[f32; 3]> for Rgb {
    fn from([r, g, b]: [f32; 3]) -> Self {
        Self::new(r, g, b)
    }
}

impl From<Rgb> for [f32; 3] {
    fn from(c: Rgb) -> Self {
        [c.r, c.g, c.b]
    }
}

impl From<Rgb> for Vec3 {
    fn from(c: Rgb) -> Self {
        Vec3::new(c.r, c.g, c.b)
    }
}

impl From<Vec3> for Rgb {
    fn from(v: Vec3) -> Self {
        Self::new(v.x, v.y, v.z)
    }
}

/// Interpolate two possibly-missing colors.
///
/// Both present blend channel-wise. When only one side is present it is
/// returned unchanged, so a missing cell never erases a classified one.
pub fn lerp_color(a: Option<Rgb>, b: Option<Rgb>, t: f32) -> Option<Rgb> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.lerp(b, t)),
        (Some(c), None) | (None, Some(c)) => Some(c),
        (None, None) => None,
    }
}
