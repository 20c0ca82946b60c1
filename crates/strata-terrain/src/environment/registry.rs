//! Environment registry: maps [`EnvironmentId`] to shared [`Environment`]s with name-based lookup.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use hashbrown::HashMap;

use super::error::EnvironmentError;
use super::{Environment, presets};
use crate::color::Rgb;
use crate::seed::{derive_seed, noise_seed_from_u64};

/// Unique identifier for a registered environment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct EnvironmentId(pub u16);

/// Errors that can occur when registering environments.
#[derive(Debug, thiserror::Error)]
pub enum EnvironmentRegistryError {
    /// An environment with this name is already registered.
    #[error("duplicate environment name: {0}")]
    DuplicateName(String),

    /// An environment file or directory could not be loaded.
    #[error("failed to load {}: {source}", path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: EnvironmentError,
    },
}

/// Stores all registered environments with O(1) lookup by ID.
pub struct EnvironmentRegistry {
    environments: Vec<Arc<Environment>>,
    name_to_id: HashMap<String, EnvironmentId>,
}

impl EnvironmentRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            environments: Vec::new(),
            name_to_id: HashMap::new(),
        }
    }

    /// Creates a registry holding every built-in preset.
    ///
    /// `world_seed` fixes the marsh erosion seed of the everglades preset, so
    /// equal seeds give identical registries.
    pub fn with_presets(world_seed: u64) -> Self {
        let marsh_seed = noise_seed_from_u64(derive_seed(world_seed, "marsh")) / 10.0;
        let mut registry = Self::new();
        for env in [
            presets::test_pattern(Rgb::from_u8(255, 255, 255), false),
            presets::desert_canyons(),
            presets::ice_plains(),
            presets::rocky_oceans(),
            presets::bluffs(),
            presets::mountainous_everglades(marsh_seed),
        ] {
            // Preset names are distinct constants.
            let _ = registry.register(env);
        }
        registry
    }

    /// Registers a new environment, returning its assigned [`EnvironmentId`].
    ///
    /// # Errors
    ///
    /// Returns [`EnvironmentRegistryError::DuplicateName`] if an environment with the same name exists.
    pub fn register(
        &mut self,
        env: impl Into<Arc<Environment>>,
    ) -> Result<EnvironmentId, EnvironmentRegistryError> {
        let env = env.into();
        if self.name_to_id.contains_key(env.name()) {
            return Err(EnvironmentRegistryError::DuplicateName(
                env.name().to_string(),
            ));
        }
        let id = EnvironmentId(self.environments.len() as u16);
        self.name_to_id.insert(env.name().to_string(), id);
        self.environments.push(env);
        Ok(id)
    }

    /// Loads and registers every `*.ron` file in `dir`, in file-name order.
    ///
    /// Returns the IDs of the newly registered environments.
    pub fn load_dir(&mut self, dir: &Path) -> Result<Vec<EnvironmentId>, EnvironmentRegistryError> {
        let load_err = |path: &Path, source| EnvironmentRegistryError::Load {
            path: path.to_path_buf(),
            source,
        };
        let entries = std::fs::read_dir(dir)
            .map_err(|e| load_err(dir, EnvironmentError::Read(e)))?;
        let mut paths = Vec::new();
        for entry in entries {
            let path = entry
                .map_err(|e| load_err(dir, EnvironmentError::Read(e)))?
                .path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == "ron") {
                paths.push(path);
            }
        }
        paths.sort();

        let mut ids = Vec::with_capacity(paths.len());
        for path in paths {
            let env = Environment::load(&path).map_err(|e| load_err(path.as_path(), e))?;
            tracing::debug!(name = env.name(), path = %path.display(), "Loaded environment");
            ids.push(self.register(env)?);
        }
        Ok(ids)
    }

    /// Returns the environment for the given ID.
    ///
    /// # Panics
    ///
    /// Panics if `id` is out of range.
    pub fn get(&self, id: EnvironmentId) -> &Arc<Environment> {
        &self.environments[id.0 as usize]
    }

    /// Looks up an environment ID by name.
    pub fn lookup_by_name(&self, name: &str) -> Option<EnvironmentId> {
        self.name_to_id.get(name).copied()
    }

    /// Looks up a shared environment by name.
    pub fn by_name(&self, name: &str) -> Option<Arc<Environment>> {
        self.lookup_by_name(name).map(|id| Arc::clone(self.get(id)))
    }

    /// Iterates over all registered environment names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.environments.iter().map(|e| e.name())
    }

    /// Returns the number of registered environments.
    pub fn len(&self) -> usize {
        self.environments.len()
    }

    /// Returns `true` if no environments are registered.
    pub fn is_empty(&self) -> bool {
        self.environments.is_empty()
    }
}

impl Default for EnvironmentRegistry {
    fn default() -> Self {
        Self::new()
    }
}
