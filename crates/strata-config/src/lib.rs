//! Configuration for the Strata terrain tools.
//!
//! Settings persist to disk as RON, can be overridden from the command line
//! via clap, and stay forward/backward compatible through `#[serde(default)]`.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{BiomeConfig, Config, DebugConfig, NoiseConfig, OutputConfig, TileConfig};
pub use error::ConfigError;
