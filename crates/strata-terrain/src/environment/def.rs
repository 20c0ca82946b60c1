//! Environment definition: the declarative rule tables of a single biome.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::error::{EnvironmentError, RuleKind};
use super::transform::{ColorTransform, TextureTransform};
use crate::seed::det_powf;

/// A height layer selected by a range of normalized noise.
///
/// The range is half-open, `[min_threshold, max_threshold)`, except that a
/// layer reaching the top of the noise domain (`max_threshold >= 1.0`) also
/// contains `1.0` itself. Per-tile normalization always maps the tile's
/// noisiest cell to exactly `1.0`, so without that closure the peak of every
/// tile would fall through all layers.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TerrainLayer {
    pub min_threshold: f32,
    pub max_threshold: f32,
    /// Height budget this layer occupies in the stack.
    pub map_height: f32,
    /// Multiplier applied to the shaped intensity before clamping.
    pub map_scale: f32,
    /// Exponent shaping the intensity curve.
    pub map_power: f32,
}

impl TerrainLayer {
    pub fn new(
        min_threshold: f32,
        max_threshold: f32,
        map_height: f32,
        map_scale: f32,
        map_power: f32,
    ) -> Self {
        Self {
            min_threshold,
            max_threshold,
            map_height,
            map_scale,
            map_power,
        }
    }

    /// Whether this layer applies to a normalized noise value.
    pub fn contains(&self, noise: f32) -> bool {
        noise >= self.min_threshold
            && (noise < self.max_threshold || (self.max_threshold >= 1.0 && noise == 1.0))
    }

    /// Shaped intensity in `[0, 1]` of `noise` within this layer's range.
    pub fn intensity(&self, noise: f32) -> f32 {
        let range = self.max_threshold - self.min_threshold;
        let linear = if range > 0.0 {
            ((noise - self.min_threshold).max(0.0) / range).min(1.0)
        } else {
            1.0
        };
        (det_powf(linear, self.map_power) * self.map_scale).clamp(0.0, 1.0)
    }

    fn validate(&self, index: usize) -> Result<(), EnvironmentError> {
        check_range(
            RuleKind::TerrainLayer,
            index,
            self.min_threshold,
            self.max_threshold,
        )?;
        let invalid = |reason: &str| EnvironmentError::InvalidParameter {
            rule: RuleKind::TerrainLayer,
            index,
            reason: reason.to_string(),
        };
        if !self.map_height.is_finite() || self.map_height < 0.0 {
            return Err(invalid("map_height must be finite and non-negative"));
        }
        if !self.map_scale.is_finite() || self.map_scale < 0.0 {
            return Err(invalid("map_scale must be finite and non-negative"));
        }
        if !self.map_power.is_finite() {
            return Err(invalid("map_power must be finite"));
        }
        Ok(())
    }
}

/// Reshapes the raw height of cells whose normalized height falls in
/// `[min_threshold, max_threshold)`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SurfaceTextureRule {
    pub min_threshold: f32,
    pub max_threshold: f32,
    pub transform: TextureTransform,
}

impl SurfaceTextureRule {
    pub fn new(min_threshold: f32, max_threshold: f32, transform: TextureTransform) -> Self {
        Self {
            min_threshold,
            max_threshold,
            transform,
        }
    }

    /// Half-open match on normalized height.
    pub fn applies_to(&self, normalized: f32) -> bool {
        normalized >= self.min_threshold && normalized < self.max_threshold
    }
}

/// Colors cells whose normalized height falls in
/// `[min_threshold, max_threshold]` (inclusive at both ends).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SurfaceColorRule {
    pub min_threshold: f32,
    pub max_threshold: f32,
    pub transform: ColorTransform,
}

impl SurfaceColorRule {
    pub fn new(min_threshold: f32, max_threshold: f32, transform: ColorTransform) -> Self {
        Self {
            min_threshold,
            max_threshold,
            transform,
        }
    }

    /// Inclusive match on normalized height.
    pub fn applies_to(&self, normalized: f32) -> bool {
        normalized >= self.min_threshold && normalized <= self.max_threshold
    }
}

/// A biome's ruleset: height layers, texture rules and color rules, each
/// evaluated in declared order.
///
/// Immutable once built; tiles share it through an `Arc`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Environment {
    name: String,
    terrain_layers: Vec<TerrainLayer>,
    #[serde(default)]
    surface_textures: Vec<SurfaceTextureRule>,
    #[serde(default)]
    surface_colors: Vec<SurfaceColorRule>,
    /// Advisory water height for collaborators; synthesis ignores it.
    #[serde(default)]
    water_level: Option<f32>,
}

impl Environment {
    /// Start building an environment called `name`.
    pub fn builder(name: impl Into<String>) -> EnvironmentBuilder {
        EnvironmentBuilder {
            env: Self::from_parts(name.into(), Vec::new(), Vec::new(), Vec::new(), None),
        }
    }

    /// Assemble an environment without validation. Used for built-in presets.
    pub(crate) fn from_parts(
        name: String,
        terrain_layers: Vec<TerrainLayer>,
        surface_textures: Vec<SurfaceTextureRule>,
        surface_colors: Vec<SurfaceColorRule>,
        water_level: Option<f32>,
    ) -> Self {
        Self {
            name,
            terrain_layers,
            surface_textures,
            surface_colors,
            water_level,
        }
    }

    /// Parse and validate an environment from RON.
    ///
    /// # Errors
    ///
    /// Returns [`EnvironmentError::Parse`] for malformed RON, or a validation
    /// error for inconsistent rule tables.
    pub fn from_ron(source: &str) -> Result<Self, EnvironmentError> {
        let env: Environment = ron::from_str(source).map_err(EnvironmentError::Parse)?;
        env.validate()?;
        Ok(env)
    }

    /// Read, parse and validate an environment file.
    pub fn load(path: &Path) -> Result<Self, EnvironmentError> {
        let contents = std::fs::read_to_string(path).map_err(EnvironmentError::Read)?;
        Self::from_ron(&contents)
    }

    /// Check every rule table for malformed ranges and parameters.
    ///
    /// Coverage is not checked: gaps and overlaps between ranges are legal
    /// and simply leave cells unmatched or let earlier rules win.
    pub fn validate(&self) -> Result<(), EnvironmentError> {
        for (index, layer) in self.terrain_layers.iter().enumerate() {
            layer.validate(index)?;
        }
        for (index, rule) in self.surface_textures.iter().enumerate() {
            check_range(
                RuleKind::SurfaceTexture,
                index,
                rule.min_threshold,
                rule.max_threshold,
            )?;
            rule.transform.validate(index)?;
        }
        for (index, rule) in self.surface_colors.iter().enumerate() {
            check_range(
                RuleKind::SurfaceColor,
                index,
                rule.min_threshold,
                rule.max_threshold,
            )?;
            rule.transform.validate(index)?;
        }
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn terrain_layers(&self) -> &[TerrainLayer] {
        &self.terrain_layers
    }

    pub fn surface_textures(&self) -> &[SurfaceTextureRule] {
        &self.surface_textures
    }

    pub fn surface_colors(&self) -> &[SurfaceColorRule] {
        &self.surface_colors
    }

    pub fn water_level(&self) -> Option<f32> {
        self.water_level
    }

    /// Sum of every layer's height budget; no cell can be stacked higher.
    pub fn total_layer_height(&self) -> f32 {
        self.terrain_layers.iter().map(|l| l.map_height).sum()
    }
}

/// Incremental, validating constructor for [`Environment`].
#[derive(Debug)]
pub struct EnvironmentBuilder {
    env: Environment,
}

impl EnvironmentBuilder {
    pub fn layer(mut self, layer: TerrainLayer) -> Self {
        self.env.terrain_layers.push(layer);
        self
    }

    pub fn texture(mut self, min: f32, max: f32, transform: TextureTransform) -> Self {
        self.env
            .surface_textures
            .push(SurfaceTextureRule::new(min, max, transform));
        self
    }

    pub fn color(mut self, min: f32, max: f32, transform: ColorTransform) -> Self {
        self.env
            .surface_colors
            .push(SurfaceColorRule::new(min, max, transform));
        self
    }

    pub fn water_level(mut self, level: f32) -> Self {
        self.env.water_level = Some(level);
        self
    }

    /// Validate and return the environment.
    pub fn build(self) -> Result<Environment, EnvironmentError> {
        self.env.validate()?;
        Ok(self.env)
    }
}

fn check_range(rule: RuleKind, index: usize, min: f32, max: f32) -> Result<(), EnvironmentError> {
    if min.is_finite() && max.is_finite() && min <= max {
        Ok(())
    } else {
        Err(EnvironmentError::InvalidRange {
            rule,
            index,
            min,
            max,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgb;

    #[test]
    fn test_layer_range_is_half_open() {
        let layer = TerrainLayer::new(0.2, 0.5, 1.0, 1.0, 1.0);
        assert!(!layer.contains(0.19));
        assert!(layer.contains(0.2));
        assert!(layer.contains(0.49));
        assert!(!layer.contains(0.5));
    }

    #[test]
    fn test_top_layer_contains_unit_noise() {
        let top = TerrainLayer::new(0.5, 1.0, 1.0, 1.0, 1.0);
        assert!(top.contains(1.0));
        let inner = TerrainLayer::new(0.0, 0.5, 1.0, 1.0, 1.0);
        assert!(!inner.contains(1.0));
    }

    #[test]
    fn test_intensity_curve() {
        let linear = TerrainLayer::new(0.0, 1.0, 10.0, 1.0, 1.0);
        assert_eq!(linear.intensity(0.25), 0.25);
        assert_eq!(linear.intensity(1.0), 1.0);

        let squared = TerrainLayer::new(0.0, 1.0, 10.0, 1.0, 2.0);
        assert_eq!(squared.intensity(0.5), 0.25);

        let scaled = TerrainLayer::new(0.0, 1.0, 10.0, 5.0, 1.0);
        assert_eq!(scaled.intensity(0.5), 1.0, "scaled intensity clamps to 1");
    }

    #[test]
    fn test_zero_width_layer_has_full_intensity() {
        let layer = TerrainLayer::new(0.4, 0.4, 1.0, 1.0, 1.0);
        assert_eq!(layer.intensity(0.4), 1.0);
        assert!(!layer.contains(0.4), "empty half-open range matches nothing");
    }

    #[test]
    fn test_texture_range_is_half_open() {
        let rule = SurfaceTextureRule::new(0.0, 0.5, TextureTransform::Keep);
        assert!(rule.applies_to(0.0));
        assert!(!rule.applies_to(0.5));
    }

    #[test]
    fn test_color_range_is_inclusive() {
        let rule = SurfaceColorRule::new(0.2, 0.5, ColorTransform::Constant(Rgb::from_u8(1, 1, 1)));
        assert!(rule.applies_to(0.2));
        assert!(rule.applies_to(0.5));
        assert!(!rule.applies_to(0.51));
    }

    #[test]
    fn test_builder_rejects_inverted_range() {
        let result = Environment::builder("broken")
            .layer(TerrainLayer::new(0.8, 0.2, 1.0, 1.0, 1.0))
            .build();
        assert!(matches!(
            result,
            Err(EnvironmentError::InvalidRange {
                rule: RuleKind::TerrainLayer,
                index: 0,
                ..
            })
        ));
    }

    #[test]
    fn test_builder_rejects_negative_height() {
        let result = Environment::builder("broken")
            .layer(TerrainLayer::new(0.0, 1.0, -5.0, 1.0, 1.0))
            .build();
        assert!(matches!(
            result,
            Err(EnvironmentError::InvalidParameter { index: 0, .. })
        ));
    }

    #[test]
    fn test_total_layer_height() {
        let env = Environment::builder("stack")
            .layer(TerrainLayer::new(0.0, 0.5, 8.0, 1.0, 1.0))
            .layer(TerrainLayer::new(0.5, 1.0, 32.0, 0.25, 1.0))
            .build()
            .unwrap();
        assert_eq!(env.total_layer_height(), 40.0);
    }

    #[test]
    fn test_from_ron() {
        let source = r#"
            (
                name: "plateau",
                terrain_layers: [
                    (min_threshold: 0.0, max_threshold: 1.0, map_height: 10.0, map_scale: 1.0, map_power: 1.0),
                ],
                surface_textures: [
                    (min_threshold: 0.0, max_threshold: 1.0, transform: Terrace(step: 5.0)),
                ],
                surface_colors: [
                    (min_threshold: 0.0, max_threshold: 1.0, transform: Constant((10.0, 20.0, 30.0))),
                ],
                water_level: Some(2.0),
            )
        "#;
        let env = Environment::from_ron(source).unwrap();
        assert_eq!(env.name(), "plateau");
        assert_eq!(env.terrain_layers().len(), 1);
        assert_eq!(env.surface_textures().len(), 1);
        assert_eq!(env.surface_colors().len(), 1);
        assert_eq!(env.water_level(), Some(2.0));
    }

    #[test]
    fn test_from_ron_optional_tables_default_empty() {
        let source = r#"(name: "bare", terrain_layers: [])"#;
        let env = Environment::from_ron(source).unwrap();
        assert!(env.surface_textures().is_empty());
        assert!(env.surface_colors().is_empty());
        assert_eq!(env.water_level(), None);
    }

    #[test]
    fn test_from_ron_validates() {
        let source = r#"(
            name: "bad",
            terrain_layers: [],
            surface_textures: [(min_threshold: 0.0, max_threshold: 1.0, transform: Terrace(step: 0.0))],
        )"#;
        assert!(matches!(
            Environment::from_ron(source),
            Err(EnvironmentError::InvalidParameter {
                rule: RuleKind::SurfaceTexture,
                ..
            })
        ));
    }

    #[test]
    fn test_from_ron_rejects_garbage() {
        assert!(matches!(
            Environment::from_ron("{{not ron"),
            Err(EnvironmentError::Parse(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("flat.ron");
        std::fs::write(&path, r#"(name: "flat", terrain_layers: [])"#).unwrap();
        let env = Environment::load(&path).unwrap();
        assert_eq!(env.name(), "flat");

        let missing = Environment::load(&dir.path().join("missing.ron"));
        assert!(matches!(missing, Err(EnvironmentError::Read(_))));
    }
}
