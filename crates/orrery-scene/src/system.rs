//! System descriptions: the sun plus planets on orbits.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::body::BodyConfig;
use crate::error::SceneError;

/// Placement of a planet around the sun.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrbitConfig {
    /// Distance from the sun's surface; the sun's radius is added at build time.
    pub base_distance: f32,
    /// Revolution per tick, in radians.
    pub rate: f32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlanetConfig {
    pub body: BodyConfig,
    pub orbit: OrbitConfig,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SystemConfig {
    pub sun: BodyConfig,
    #[serde(default)]
    pub planets: Vec<PlanetConfig>,
}

impl SystemConfig {
    /// The compiled-in sun and eight planets.
    pub fn builtin() -> Self {
        crate::catalog::solar_system()
    }

    /// Read a system description from a RON file.
    pub fn load(path: &Path) -> Result<Self, SceneError> {
        let contents = std::fs::read_to_string(path).map_err(|source| SceneError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let system = ron::from_str(&contents).map_err(|source| SceneError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!("Loaded system description from {}", path.display());
        Ok(system)
    }

    /// Pretty RON, suitable as a starting point for a custom system file.
    pub fn to_ron(&self) -> Result<String, SceneError> {
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(4)
            .enumerate_arrays(false);
        Ok(ron::ser::to_string_pretty(self, pretty)?)
    }

    /// All bodies, sun first.
    pub fn bodies(&self) -> impl Iterator<Item = &BodyConfig> {
        std::iter::once(&self.sun).chain(self.planets.iter().map(|p| &p.body))
    }
}
