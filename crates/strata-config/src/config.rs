//! Configuration structs with sensible defaults and RON persistence.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Name of the per-user directory holding `config.ron`, logs and environments.
pub const APP_DIR_NAME: &str = "strata";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Tile geometry.
    pub tile: TileConfig,
    /// Noise seeding.
    pub noise: NoiseConfig,
    /// Environments blended into the composite tile.
    pub biomes: BiomeConfig,
    /// Preview output.
    pub output: OutputConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// Tile geometry configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TileConfig {
    /// Cells along X.
    pub width: usize,
    /// Cells along Z.
    pub depth: usize,
    /// World-space X offset of the first cell.
    pub offset_x: f64,
    /// World-space Z offset of the first cell.
    pub offset_z: f64,
    /// World distance between samples along X.
    pub stride_x: f64,
    /// World distance between samples along Z.
    pub stride_z: f64,
    /// Tiles per side of the stitched grid (1 = composite tile only).
    pub grid: u32,
}

/// Noise configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NoiseConfig {
    /// World seed; `None` draws a fresh random seed per run.
    pub seed: Option<u64>,
    /// Share one noise generator between all tiles of a composite.
    pub shared: bool,
}

/// Environment selection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BiomeConfig {
    /// Names of the four environments blended into the composite tile.
    pub environments: Vec<String>,
    /// Extra directory of `*.ron` environment files to register.
    pub directory: Option<PathBuf>,
}

/// Preview output configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory the preview PNGs are written to.
    pub directory: PathBuf,
    /// Write the greyscale height preview.
    pub height_preview: bool,
    /// Write the surface color preview.
    pub color_preview: bool,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
    /// Write JSON logs alongside console output in debug builds.
    pub file_logging: bool,
}

// --- Default implementations ---

impl Default for TileConfig {
    fn default() -> Self {
        Self {
            width: 128,
            depth: 128,
            offset_x: 0.0,
            offset_z: 0.0,
            stride_x: 1.0,
            stride_z: 1.0,
            grid: 1,
        }
    }
}

impl Default for NoiseConfig {
    fn default() -> Self {
        Self {
            seed: None,
            shared: true,
        }
    }
}

impl Default for BiomeConfig {
    fn default() -> Self {
        Self {
            environments: [
                "desert_canyons",
                "ice_plains",
                "bluffs",
                "mountainous_everglades",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            directory: None,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("output"),
            height_preview: true,
            color_preview: true,
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            file_logging: true,
        }
    }
}

// --- Locate / Load / Save / Reload ---

impl Config {
    /// Resolve the configuration directory: `explicit` if given, otherwise
    /// the platform's per-user config directory joined with [`APP_DIR_NAME`].
    pub fn resolve_dir(explicit: Option<&Path>) -> Result<PathBuf, ConfigError> {
        match explicit {
            Some(dir) => Ok(dir.to_path_buf()),
            None => dirs::config_dir()
                .map(|dir| dir.join(APP_DIR_NAME))
                .ok_or(ConfigError::NoConfigDir),
        }
    }

    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join("config.ron");

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
            let config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;
            log::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save config to the given directory as `config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(ConfigError::WriteError)?;

        let config_path = config_dir.join("config.ron");
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .separate_tuple_members(true)
            .enumerate_arrays(false);

        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;

        std::fs::write(&config_path, serialized).map_err(ConfigError::WriteError)?;
        Ok(())
    }

    /// Re-read `config.ron`: returns `Some(new_config)` if it changed, `None` otherwise.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let config_path = config_dir.join("config.ron");
        let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
        let new_config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;

        if &new_config != self {
            log::info!("Config reloaded with changes");
            Ok(Some(new_config))
        } else {
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_serializes() {
        let config = Config::default();
        let ron_str =
            ron::ser::to_string_pretty(&config, ron::ser::PrettyConfig::new().depth_limit(3))
                .unwrap();
        assert!(ron_str.contains("width: 128"));
        assert!(ron_str.contains("\"mountainous_everglades\""));
    }

    #[test]
    fn test_config_roundtrip() {
        let mut config = Config::default();
        config.noise.seed = Some(1234);
        let ron_str = ron::to_string(&config).unwrap();
        let deserialized: Config = ron::from_str(&ron_str).unwrap();
        assert_eq!(config, deserialized);
    }

    #[test]
    fn test_missing_section_uses_default() {
        let ron_str = "(tile: (width: 64), debug: ())";
        let config: Config = ron::from_str(ron_str).unwrap();
        assert_eq!(config.tile.width, 64);
        assert_eq!(config.tile.depth, 128, "missing fields fall back to defaults");
        assert_eq!(config.biomes, BiomeConfig::default());
        assert_eq!(config.output, OutputConfig::default());
    }

    #[test]
    fn test_extra_field_ignored() {
        let result: Result<Config, _> = ron::from_str("(future_setting: true)");
        assert!(result.is_ok());
    }

    #[test]
    fn test_default_biomes_are_four() {
        assert_eq!(BiomeConfig::default().environments.len(), 4);
    }

    #[test]
    fn test_resolve_dir_prefers_explicit() {
        let dir = Path::new("/tmp/strata-test-config");
        assert_eq!(Config::resolve_dir(Some(dir)).unwrap(), dir);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.tile.width = 256;
        config.noise.seed = Some(7);
        config.biomes.environments = vec!["bluffs".to_string(); 4];

        config.save(dir.path()).unwrap();
        let loaded = Config::load_or_create(dir.path()).unwrap();
        assert_eq!(config, loaded);
    }

    #[test]
    fn test_load_or_create_writes_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_create(dir.path()).unwrap();
        assert_eq!(config, Config::default());
        assert!(dir.path().join("config.ron").exists());
    }

    #[test]
    fn test_reload_detects_changes() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default();
        config.save(dir.path()).unwrap();

        let mut modified = config.clone();
        modified.tile.grid = 3;
        modified.save(dir.path()).unwrap();

        let result = config.reload(dir.path()).unwrap();
        assert_eq!(result.map(|c| c.tile.grid), Some(3));
    }

    #[test]
    fn test_reload_no_changes() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default();
        config.save(dir.path()).unwrap();

        assert!(config.reload(dir.path()).unwrap().is_none());
    }

    #[test]
    fn test_invalid_ron_produces_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("config.ron"), "{{not valid}}").unwrap();
        assert!(matches!(
            Config::load_or_create(dir.path()),
            Err(ConfigError::ParseError(_))
        ));
    }
}
