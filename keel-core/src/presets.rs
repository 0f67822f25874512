//! Preset configuration loader.
//!
//! Loads vessels, environments and simulation tuning from YAML files, so
//! hulls and sea states can be changed without recompiling.
//!
//! ## Directory Structure
//!
//! ```text
//! presets/
//! ├── vessels/
//! │   ├── dinghy.yaml
//! │   └── launch.yaml
//! ├── environments/
//! │   ├── calm.yaml
//! │   └── breeze.yaml
//! └── tuning/
//!     ├── sail.yaml
//!     └── engine.yaml
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;

use crate::environment::Environment;
use crate::error::PresetError;
use crate::simulation::SimulationConfig;
use crate::types::VesselProperties;

/// Preset loader with configurable base directory.
pub struct PresetLoader {
    base_path: PathBuf,
}

impl PresetLoader {
    /// Create a new loader with the given base path.
    ///
    /// The base path should contain `vessels/`, `environments/` and
    /// `tuning/` subdirectories.
    pub fn new<P: AsRef<Path>>(base_path: P) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
        }
    }

    /// Load a vessel by name (without .yaml extension).
    ///
    /// The vessel is validated, so a preset with non-positive mass or
    /// inertia is reported here rather than at spawn time.
    ///
    /// # Example
    /// ```ignore
    /// let loader = PresetLoader::new("presets");
    /// let dinghy = loader.load_vessel("dinghy")?;
    /// ```
    pub fn load_vessel(&self, name: &str) -> Result<VesselProperties, PresetError> {
        let props: VesselProperties = self.load("vessels", name)?;
        props.validate().map_err(|source| PresetError::Invalid {
            name: name.to_string(),
            source,
        })?;
        Ok(props)
    }

    /// Load an environment by name. Missing fields take their defaults.
    ///
    /// Control limits are validated before any value is clamped to them.
    pub fn load_environment(&self, name: &str) -> Result<Environment, PresetError> {
        let mut env: Environment = self.load("environments", name)?;
        env.limits.validate().map_err(|source| PresetError::Invalid {
            name: name.to_string(),
            source,
        })?;
        // Route control values through the clamping setters.
        let (sail, thrust, steering) = (env.sail_angle, env.thrust_level, env.steering_angle);
        env.set_sail_angle(sail);
        env.set_thrust_level(thrust);
        env.set_steering_angle(steering);
        Ok(env)
    }

    /// Load simulation tuning (propulsion, damping, collision) by name.
    pub fn load_tuning(&self, name: &str) -> Result<SimulationConfig, PresetError> {
        self.load("tuning", name)
    }

    /// List all available vessels.
    pub fn list_vessels(&self) -> Result<Vec<String>, PresetError> {
        self.list_presets("vessels")
    }

    /// List all available environments.
    pub fn list_environments(&self) -> Result<Vec<String>, PresetError> {
        self.list_presets("environments")
    }

    /// List all available tuning presets.
    pub fn list_tuning(&self) -> Result<Vec<String>, PresetError> {
        self.list_presets("tuning")
    }

    fn load<T: DeserializeOwned>(&self, subdir: &str, name: &str) -> Result<T, PresetError> {
        let path = self.base_path.join(subdir).join(format!("{}.yaml", name));
        if !path.exists() {
            return Err(PresetError::NotFound(name.to_string()));
        }
        let contents = fs::read_to_string(&path)?;
        let preset = serde_yaml::from_str(&contents)?;
        log::debug!("loaded preset {}", path.display());
        Ok(preset)
    }

    fn list_presets(&self, subdir: &str) -> Result<Vec<String>, PresetError> {
        let path = self.base_path.join(subdir);
        if !path.exists() {
            return Ok(vec![]);
        }

        let mut names = Vec::new();
        for entry in fs::read_dir(&path)? {
            let entry = entry?;
            let file_name = entry.file_name();
            let name = file_name.to_string_lossy();
            if let Some(stem) = name.strip_suffix(".yaml") {
                names.push(stem.to_string());
            }
        }
        names.sort();
        Ok(names)
    }
}

// =============================================================================
// Tests
// =============================================================================
