//! Demo binary that synthesizes a composite terrain tile and writes previews.
//!
//! Configuration is loaded from `config.ron` and can be overridden via CLI flags.
//! Run with `cargo run -p strata-demo` for the default four-biome composite.
//! Run with `cargo run -p strata-demo -- --seed 7 --grid 3` to also build a
//! stitched 3×3 grid of tiles.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::Parser;
use strata_config::{CliArgs, Config, ConfigError, TileConfig};
use strata_terrain::preview::{DebugImage, render_tile_previews};
use strata_terrain::{
    AsyncTileGenerator, Environment, EnvironmentRegistry, EnvironmentRegistryError,
    NoiseGenerator, OctaveNoise, StitchSide, TerrainError, Tile, TileKey, TileOptions, TileTask,
    create, stitch,
};
use tracing::{info, warn};

/// How long to wait for background tiles before giving up.
const GRID_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, thiserror::Error)]
enum DemoError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Terrain(#[from] TerrainError),

    #[error(transparent)]
    Registry(#[from] EnvironmentRegistryError),

    #[error("unknown environment '{name}', available: {available}")]
    UnknownEnvironment { name: String, available: String },

    #[error("timed out waiting for {0} grid tiles")]
    GridTimeout(usize),

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn tile_options(tile: &TileConfig) -> TileOptions {
    TileOptions {
        width: tile.width,
        depth: tile.depth,
        offset_x: tile.offset_x,
        offset_z: tile.offset_z,
        stride_x: tile.stride_x,
        stride_z: tile.stride_z,
    }
}

fn build_registry(config: &Config, seed: u64) -> Result<EnvironmentRegistry, DemoError> {
    let mut registry = EnvironmentRegistry::with_presets(seed);
    if let Some(dir) = &config.biomes.directory {
        let ids = registry.load_dir(dir)?;
        info!(count = ids.len(), dir = %dir.display(), "Loaded custom environments");
    }
    Ok(registry)
}

fn resolve_environments(
    registry: &EnvironmentRegistry,
    names: &[String],
) -> Result<Vec<Arc<Environment>>, DemoError> {
    names
        .iter()
        .map(|name| {
            registry
                .by_name(name)
                .ok_or_else(|| DemoError::UnknownEnvironment {
                    name: name.clone(),
                    available: registry.names().collect::<Vec<_>>().join(", "),
                })
        })
        .collect()
}

fn write_png(image: &DebugImage, path: &Path) -> Result<(), DemoError> {
    let encode_err = |source| DemoError::Write {
        path: path.to_path_buf(),
        source,
    };
    let bytes = image
        .to_png()
        .map_err(|e| encode_err(std::io::Error::other(e)))?;
    std::fs::write(path, bytes).map_err(encode_err)?;
    info!(path = %path.display(), "Wrote preview");
    Ok(())
}

fn write_previews(config: &Config, tile: &Tile, stem: &str) -> Result<(), DemoError> {
    let dir = &config.output.directory;
    std::fs::create_dir_all(dir).map_err(|source| DemoError::Write {
        path: dir.clone(),
        source,
    })?;
    let (height_image, color_image) = render_tile_previews(tile);
    if config.output.height_preview {
        write_png(&height_image, &dir.join(format!("{stem}_height.png")))?;
    }
    if config.output.color_preview {
        write_png(&color_image, &dir.join(format!("{stem}_color.png")))?;
    }
    Ok(())
}

/// Synthesize a `grid × grid` block of neighbouring tiles in the background,
/// cycling through `environments`, then stitch every tile to its left and
/// top neighbours.
fn build_grid(
    grid: u32,
    base: &TileOptions,
    environments: &[Arc<Environment>],
    noise: &Arc<dyn NoiseGenerator>,
) -> Result<Vec<(TileKey, Tile)>, DemoError> {
    let generator = AsyncTileGenerator::with_defaults()?;
    let keys: Vec<TileKey> = (0..i64::from(grid))
        .flat_map(|z| (0..i64::from(grid)).map(move |x| TileKey::new(x, z)))
        .collect();

    let mut inline = Vec::new();
    for (i, &key) in keys.iter().enumerate() {
        let task = TileTask {
            key,
            options: key.options(base),
            environment: Arc::clone(&environments[i % environments.len()]),
            noise: Arc::clone(noise),
        };
        if let Err(task) = generator.submit(task) {
            warn!(key = ?task.key, "Generation queue full, building tile inline");
            let tile = strata_terrain::async_generation::generate_tile_sync(&task)?;
            inline.push((task.key, tile));
        }
    }
    finish_grid(&generator, keys.len(), inline)
}

fn finish_grid(
    generator: &AsyncTileGenerator,
    expected: usize,
    mut done: Vec<(TileKey, Tile)>,
) -> Result<Vec<(TileKey, Tile)>, DemoError> {
    let deadline = Instant::now() + GRID_TIMEOUT;
    while done.len() < expected {
        if Instant::now() > deadline {
            return Err(DemoError::GridTimeout(expected - done.len()));
        }
        for generated in generator.drain_results() {
            info!(
                key = ?generated.key,
                time_us = generated.generation_time_us,
                "Tile generated"
            );
            done.push((generated.key, generated.tile?));
        }
        std::thread::sleep(Duration::from_millis(5));
    }

    done.sort_by_key(|(key, _)| (key.z, key.x));
    for i in 0..done.len() {
        let key = done[i].0;
        let neighbours = [
            (TileKey::new(key.x - 1, key.z), StitchSide::Left),
            (TileKey::new(key.x, key.z - 1), StitchSide::Top),
        ];
        for (neighbour, side) in neighbours {
            if let Some(j) = done.iter().position(|(k, _)| *k == neighbour) {
                let target = done[j].1.clone();
                stitch(&mut done[i].1, &target, side)?;
            }
        }
    }
    Ok(done)
}

fn run(config: &Config) -> Result<(), DemoError> {
    let seed = config.noise.seed.unwrap_or_else(rand::random);
    info!(seed, "Starting terrain synthesis");

    let registry = build_registry(config, seed)?;
    let environments = resolve_environments(&registry, &config.biomes.environments)?;
    let options = tile_options(&config.tile);
    let shared: Option<Arc<dyn NoiseGenerator>> = config
        .noise
        .shared
        .then(|| Arc::new(OctaveNoise::from_seed(seed)) as Arc<dyn NoiseGenerator>);

    let start = Instant::now();
    let composite = create(options, &environments, shared.clone())?;
    info!(
        width = composite.width(),
        depth = composite.depth(),
        unclassified = composite.colors().missing_count(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Composite tile created"
    );
    let placement = composite.placement();
    info!(
        translation = ?placement.translation,
        scale = ?placement.scale,
        height_scale = placement.height_scale,
        "Composite placement"
    );
    write_previews(config, &composite, "composite")?;

    if config.tile.grid > 1 {
        let noise = shared.unwrap_or_else(|| Arc::new(OctaveNoise::from_seed(seed)));
        let tiles = build_grid(config.tile.grid, &options, &environments, &noise)?;
        for (key, tile) in &tiles {
            write_previews(config, tile, &format!("tile_{}_{}", key.x, key.z))?;
        }
        info!(tiles = tiles.len(), "Stitched grid written");
    }
    Ok(())
}

fn main() {
    let args = CliArgs::parse();

    let config_dir = Config::resolve_dir(args.config.as_deref()).unwrap_or_else(|e| {
        eprintln!("{e}, using the working directory");
        PathBuf::from(".")
    });

    let mut config = Config::load_or_create(&config_dir).unwrap_or_else(|e| {
        eprintln!("Failed to load config: {e}, using defaults");
        Config::default()
    });
    config.apply_cli_overrides(&args);

    let log_dir = config_dir.join("logs");
    strata_log::init_logging(Some(&log_dir), cfg!(debug_assertions), Some(&config));

    if let Err(e) = run(&config) {
        tracing::error!("{e}");
        std::process::exit(1);
    }
}
