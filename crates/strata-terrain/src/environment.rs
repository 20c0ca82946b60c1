//! Environment system: declarative biome rule tables, their transforms,
//! validation, loading and the registry of named environments.

mod def;
mod error;
pub mod presets;
mod registry;
mod transform;

pub use def::{Environment, EnvironmentBuilder, SurfaceColorRule, SurfaceTextureRule, TerrainLayer};
pub use error::{EnvironmentError, RuleKind};
pub use registry::{EnvironmentId, EnvironmentRegistry, EnvironmentRegistryError};
pub use transform::{
    ColorFn, ColorInput, ColorTransform, CustomColor, CustomTexture, TextureFn, TextureInput,
    TextureTransform,
};
