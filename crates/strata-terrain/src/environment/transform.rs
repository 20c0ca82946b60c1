//! Texture and color transforms attached to environment rules.
//!
//! Built-in transforms are plain data so rule tables can be loaded from RON
//! and validated up front. Code-defined behaviour plugs in through the
//! [`TextureFn`] and [`ColorFn`] capability traits.

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};
use std::fmt;
use std::sync::Arc;

use glam::DVec2;
use noise::NoiseFn;
use serde::{Deserialize, Serialize};

use super::error::{EnvironmentError, RuleKind};
use crate::color::Rgb;
use crate::noise::IMPROVED_NOISE;
use crate::seed::{det_atan2, det_cos, det_sin};

/// What a texture transform sees for one cell.
#[derive(Clone, Copy, Debug)]
pub struct TextureInput<'a> {
    /// The whole raw height buffer as it stands mid-synthesis.
    pub heights: &'a [f32],
    /// Flat index of the cell being textured.
    pub index: usize,
    pub x: usize,
    pub y: usize,
}

impl TextureInput<'_> {
    /// Raw height of the current cell.
    pub fn height(&self) -> f32 {
        self.heights[self.index]
    }
}

/// What a color transform sees for one cell.
#[derive(Clone, Copy, Debug)]
pub struct ColorInput<'a> {
    /// The whole raw height buffer as it stands mid-synthesis.
    pub heights: &'a [f32],
    /// The cell's height normalized by the running maximum.
    pub normalized: f32,
    /// Flat index of the cell being colored.
    pub index: usize,
    /// Grid width, for neighbour addressing.
    pub width: usize,
}

impl ColorInput<'_> {
    /// Height at a flat index relative to the current cell; 0 outside the buffer.
    pub fn height_at_offset(&self, offset: isize) -> f32 {
        self.index
            .checked_add_signed(offset)
            .and_then(|i| self.heights.get(i))
            .copied()
            .unwrap_or(0.0)
    }
}

/// Code-defined texture behaviour.
pub trait TextureFn: Send + Sync {
    /// New raw height for the cell.
    fn apply(&self, input: &TextureInput<'_>) -> f32;
}

/// Code-defined color behaviour.
pub trait ColorFn: Send + Sync {
    fn color(&self, input: &ColorInput<'_>) -> Rgb;
}

impl<F> TextureFn for F
where
    F: Fn(&TextureInput<'_>) -> f32 + Send + Sync,
{
    fn apply(&self, input: &TextureInput<'_>) -> f32 {
        self(input)
    }
}

impl<F> ColorFn for F
where
    F: Fn(&ColorInput<'_>) -> Rgb + Send + Sync,
{
    fn color(&self, input: &ColorInput<'_>) -> Rgb {
        self(input)
    }
}

/// A shared, code-defined texture transform.
#[derive(Clone)]
pub struct CustomTexture(pub Arc<dyn TextureFn>);

impl fmt::Debug for CustomTexture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CustomTexture(..)")
    }
}

/// A shared, code-defined color transform.
#[derive(Clone)]
pub struct CustomColor(pub Arc<dyn ColorFn>);

impl fmt::Debug for CustomColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CustomColor(..)")
    }
}

/// How a surface texture rule rewrites a cell's raw height.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum TextureTransform {
    /// Leave the height unchanged.
    Keep,
    /// Multiply the height by a constant.
    Scale(f32),
    /// Alternate bands of `band` flat cells: even bands keep their height,
    /// odd bands are multiplied by `factor`.
    Striped { band: usize, factor: f32 },
    /// Snap the height down to a multiple of `step`.
    Terrace { step: f32 },
    /// Add `amplitude * (cos(x * freq_x) + sin(y * freq_y))²`.
    Ripple {
        freq_x: f64,
        freq_y: f64,
        amplitude: f64,
    },
    /// Two octaves of noise erosion followed by a cosine undulation. `z` is
    /// the noise seed; at or below 0.5 only the undulation is applied.
    Marsh { z: f64 },
    #[serde(skip)]
    Custom(CustomTexture),
}

impl TextureTransform {
    /// Wrap a closure or [`TextureFn`] implementation.
    pub fn custom(f: impl TextureFn + 'static) -> Self {
        Self::Custom(CustomTexture(Arc::new(f)))
    }

    pub(crate) fn validate(&self, index: usize) -> Result<(), EnvironmentError> {
        let invalid = |reason: &str| EnvironmentError::InvalidParameter {
            rule: RuleKind::SurfaceTexture,
            index,
            reason: reason.to_string(),
        };
        match self {
            Self::Scale(f) if !f.is_finite() => Err(invalid("scale must be finite")),
            Self::Striped { band: 0, .. } => Err(invalid("stripe band must be positive")),
            Self::Striped { factor, .. } if !factor.is_finite() => {
                Err(invalid("stripe factor must be finite"))
            }
            Self::Terrace { step } if !step.is_finite() || *step <= 0.0 => {
                Err(invalid("terrace step must be positive and finite"))
            }
            Self::Ripple {
                freq_x,
                freq_y,
                amplitude,
            } if !(freq_x.is_finite() && freq_y.is_finite() && amplitude.is_finite()) => {
                Err(invalid("ripple parameters must be finite"))
            }
            Self::Marsh { z } if !z.is_finite() => Err(invalid("marsh seed must be finite")),
            _ => Ok(()),
        }
    }
}

impl TextureFn for TextureTransform {
    fn apply(&self, input: &TextureInput<'_>) -> f32 {
        let h = input.height();
        match self {
            Self::Keep => h,
            Self::Scale(f) => h * f,
            Self::Striped { band, factor } => {
                if (input.index / band) % 2 == 0 {
                    h
                } else {
                    h * factor
                }
            }
            Self::Terrace { step } => (h / step).floor() * step,
            Self::Ripple {
                freq_x,
                freq_y,
                amplitude,
            } => {
                let wave = det_cos(input.x as f64 * freq_x) + det_sin(input.y as f64 * freq_y);
                (f64::from(h) + wave * wave * amplitude) as f32
            }
            Self::Marsh { z } => marsh(f64::from(h), input.x as f64, input.y as f64, *z) as f32,
            Self::Custom(CustomTexture(f)) => f.apply(input),
        }
    }
}

fn marsh(height: f64, x: f64, y: f64, z: f64) -> f64 {
    let mut v = height;
    let mut u = 0.0;
    if z > 0.5 {
        let mut divisor = 1.0;
        for _ in 0..2 {
            let n = IMPROVED_NOISE.get([x / divisor, y / divisor, z]);
            v = (v + n).min(height - n);
            u = det_sin(v * PI);
            divisor *= 6.5;
        }
    }
    v + 0.5 * det_cos(u * PI * 2.0)
}

/// How a surface color rule picks a cell's color.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum ColorTransform {
    /// The same color everywhere.
    Constant(Rgb),
    /// Color by the direction of the local height gradient along the grid's
    /// `y` axis: `descending` where height falls with `y`, `ascending` where
    /// it rises, `level` otherwise (and on flat ground).
    ///
    /// Neighbours are addressed by flat index, so the left/right samples of
    /// an edge cell wrap to the adjacent row; reads outside the buffer are 0.
    SlopeFacing {
        descending: Rgb,
        ascending: Rgb,
        level: Rgb,
    },
    #[serde(skip)]
    Custom(CustomColor),
}

impl ColorTransform {
    /// Wrap a closure or [`ColorFn`] implementation.
    pub fn custom(f: impl ColorFn + 'static) -> Self {
        Self::Custom(CustomColor(Arc::new(f)))
    }

    pub(crate) fn validate(&self, _index: usize) -> Result<(), EnvironmentError> {
        Ok(())
    }
}

impl ColorFn for ColorTransform {
    fn color(&self, input: &ColorInput<'_>) -> Rgb {
        match self {
            Self::Constant(c) => *c,
            Self::SlopeFacing {
                descending,
                ascending,
                level,
            } => {
                let width = input.width as isize;
                let gradient = DVec2::new(
                    f64::from(input.height_at_offset(1) - input.height_at_offset(-1)),
                    f64::from(input.height_at_offset(width) - input.height_at_offset(-width)),
                )
                .normalize_or_zero();
                if gradient == DVec2::ZERO {
                    return *level;
                }
                let angle = det_atan2(gradient.y, gradient.x);
                if (-FRAC_PI_2 - angle).abs() < FRAC_PI_4 {
                    *descending
                } else if (FRAC_PI_2 - angle).abs() < FRAC_PI_4 {
                    *ascending
                } else {
                    *level
                }
            }
            Self::Custom(CustomColor(f)) => f.color(input),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texture(t: &TextureTransform, heights: &[f32], index: usize, x: usize, y: usize) -> f32 {
        t.apply(&TextureInput {
            heights,
            index,
            x,
            y,
        })
    }

    #[test]
    fn test_keep_and_scale() {
        let heights = [4.0];
        assert_eq!(texture(&TextureTransform::Keep, &heights, 0, 0, 0), 4.0);
        assert_eq!(texture(&TextureTransform::Scale(0.5), &heights, 0, 0, 0), 2.0);
    }

    #[test]
    fn test_striped_alternates_bands() {
        let heights = [10.0_f32; 12];
        let t = TextureTransform::Striped {
            band: 4,
            factor: 0.5,
        };
        let out: Vec<f32> = (0..12).map(|i| texture(&t, &heights, i, i, 0)).collect();
        assert_eq!(&out[0..4], &[10.0; 4]);
        assert_eq!(&out[4..8], &[5.0; 4]);
        assert_eq!(&out[8..12], &[10.0; 4]);
    }

    #[test]
    fn test_terrace_snaps_down() {
        let heights = [12.7, 4.99, 15.0];
        let t = TextureTransform::Terrace { step: 5.0 };
        assert_eq!(texture(&t, &heights, 0, 0, 0), 10.0);
        assert_eq!(texture(&t, &heights, 1, 0, 0), 0.0);
        assert_eq!(texture(&t, &heights, 2, 0, 0), 15.0);
    }

    #[test]
    fn test_ripple_at_origin() {
        let heights = [1.0];
        let t = TextureTransform::Ripple {
            freq_x: 12.0,
            freq_y: 6.0,
            amplitude: 0.5,
        };
        // cos(0) + sin(0) = 1, squared * 0.5.
        assert_eq!(texture(&t, &heights, 0, 0, 0), 1.5);
    }

    #[test]
    fn test_marsh_low_seed_only_undulates() {
        let heights = [2.0];
        let t = TextureTransform::Marsh { z: 0.25 };
        assert_eq!(texture(&t, &heights, 0, 3, 4), 2.5);
    }

    #[test]
    fn test_marsh_is_deterministic() {
        let heights = [3.0];
        let t = TextureTransform::Marsh { z: 7.3 };
        let a = texture(&t, &heights, 0, 5, 9);
        let b = texture(&t, &heights, 0, 5, 9);
        assert_eq!(a.to_bits(), b.to_bits());
        assert!(a.is_finite());
    }

    #[test]
    fn test_custom_texture() {
        let t = TextureTransform::custom(|input: &TextureInput<'_>| input.height() + input.x as f32);
        assert_eq!(texture(&t, &[1.0, 1.0], 1, 1, 0), 2.0);
    }

    #[test]
    fn test_texture_validation() {
        assert!(TextureTransform::Striped { band: 0, factor: 1.0 }.validate(0).is_err());
        assert!(TextureTransform::Terrace { step: -1.0 }.validate(0).is_err());
        assert!(TextureTransform::Scale(f32::NAN).validate(0).is_err());
        assert!(TextureTransform::Marsh { z: 3.0 }.validate(0).is_ok());
    }

    fn slope_colors() -> ColorTransform {
        ColorTransform::SlopeFacing {
            descending: Rgb::from_u8(80, 69, 67),
            ascending: Rgb::from_u8(0, 128, 0),
            level: Rgb::from_u8(65, 71, 74),
        }
    }

    fn color_at(t: &ColorTransform, heights: &[f32], index: usize, width: usize) -> Rgb {
        t.color(&ColorInput {
            heights,
            normalized: 0.5,
            index,
            width,
        })
    }

    #[test]
    fn test_slope_facing_classifies_gradient() {
        // 3x3, center cell index 4.
        let rising = [0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 5.0, 5.0, 5.0];
        let falling = [5.0, 5.0, 5.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0];
        let sideways = [0.0, 0.0, 0.0, 0.0, 0.0, 5.0, 0.0, 0.0, 0.0];
        let t = slope_colors();
        assert_eq!(color_at(&t, &rising, 4, 3), Rgb::from_u8(0, 128, 0));
        assert_eq!(color_at(&t, &falling, 4, 3), Rgb::from_u8(80, 69, 67));
        assert_eq!(color_at(&t, &sideways, 4, 3), Rgb::from_u8(65, 71, 74));
    }

    #[test]
    fn test_slope_facing_flat_ground_is_level() {
        let flat = [1.0; 9];
        assert_eq!(color_at(&slope_colors(), &flat, 4, 3), Rgb::from_u8(65, 71, 74));
    }

    #[test]
    fn test_out_of_buffer_neighbours_read_zero() {
        let input = ColorInput {
            heights: &[1.0, 2.0],
            normalized: 0.0,
            index: 0,
            width: 2,
        };
        assert_eq!(input.height_at_offset(-1), 0.0);
        assert_eq!(input.height_at_offset(1), 2.0);
        assert_eq!(input.height_at_offset(2), 0.0);
    }

    #[test]
    fn test_custom_color_sees_normalized_height() {
        let t = ColorTransform::custom(|input: &ColorInput<'_>| {
            let v = input.normalized * 255.0;
            Rgb::new(v, v, v)
        });
        let c = t.color(&ColorInput {
            heights: &[0.0],
            normalized: 1.0,
            index: 0,
            width: 1,
        });
        assert_eq!(c, Rgb::new(255.0, 255.0, 255.0));
    }
}
