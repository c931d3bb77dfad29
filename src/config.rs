use std::{fs, path::Path};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::Result;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct WorldConfig {
    /// Edge length of a sector in world units
    pub sector_size: f32,
    /// How many sectors around the query sector `nearest_entity` looks at
    pub search_radius: i32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            sector_size: 256.0,
            search_radius: 1,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct GenerationConfig {
    pub seed: u32,
    pub scale: f64,
    /// Chunks per axis generated by the benchmark binary
    pub world_size: usize,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            seed: 99,
            scale: 0.03,
            world_size: 4,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct LodConfig {
    pub factors: Vec<usize>,
    pub fill_cavities: bool,
}

impl Default for LodConfig {
    fn default() -> Self {
        Self {
            factors: vec![2, 4],
            fill_cavities: true,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    pub world: WorldConfig,
    pub generation: GenerationConfig,
    pub lod: LodConfig,
}

impl EngineConfig {
    pub fn from_json(json: &str) -> Result<EngineConfig> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<EngineConfig> {
        let path = path.as_ref();
        debug!("Loading engine config from {}", path.display());
        let json = fs::read_to_string(path)?;
        EngineConfig::from_json(&json)
    }
}
