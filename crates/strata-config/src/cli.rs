//! Command-line argument parsing for the Strata demo.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;

/// Strata command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug, Default)]
#[command(name = "strata", about = "Procedural terrain tile generator")]
pub struct CliArgs {
    /// Tile width in cells.
    #[arg(long)]
    pub width: Option<usize>,

    /// Tile depth in cells.
    #[arg(long)]
    pub depth: Option<usize>,

    /// World seed for reproducible output.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Comma-separated list of four environment names.
    #[arg(long, value_delimiter = ',')]
    pub biomes: Option<Vec<String>>,

    /// Tiles per side of the stitched grid.
    #[arg(long)]
    pub grid: Option<u32>,

    /// Directory for preview images.
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(w) = args.width {
            self.tile.width = w;
        }
        if let Some(d) = args.depth {
            self.tile.depth = d;
        }
        if let Some(seed) = args.seed {
            self.noise.seed = Some(seed);
        }
        if let Some(ref biomes) = args.biomes {
            self.biomes.environments = biomes.clone();
        }
        if let Some(grid) = args.grid {
            self.tile.grid = grid;
        }
        if let Some(ref dir) = args.output {
            self.output.directory = dir.clone();
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_override() {
        let mut config = Config::default();
        let args = CliArgs {
            width: Some(64),
            seed: Some(99),
            biomes: Some(vec!["a".into(), "b".into(), "c".into(), "d".into()]),
            ..CliArgs::default()
        };
        config.apply_cli_overrides(&args);
        assert_eq!(config.tile.width, 64);
        assert_eq!(config.noise.seed, Some(99));
        assert_eq!(config.biomes.environments, ["a", "b", "c", "d"]);
        // Non-overridden fields retain defaults
        assert_eq!(config.tile.depth, 128);
        assert_eq!(config.output.directory, PathBuf::from("output"));
    }

    #[test]
    fn test_cli_no_override() {
        let original = Config::default();
        let mut config = Config::default();
        config.apply_cli_overrides(&CliArgs::default());
        assert_eq!(config, original);
    }

    #[test]
    fn test_parse_biome_list() {
        let args = CliArgs::parse_from(["strata", "--biomes", "bluffs,ice_plains", "--grid", "2"]);
        assert_eq!(
            args.biomes,
            Some(vec!["bluffs".to_string(), "ice_plains".to_string()])
        );
        assert_eq!(args.grid, Some(2));
    }
}
