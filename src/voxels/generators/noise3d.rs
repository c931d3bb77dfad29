use glam::{IVec3, Vec3};
use log::trace;
use noise::{NoiseFn, Perlin};

use crate::{
    config::GenerationConfig,
    voxels::{Block, VoxelChunk},
};

use super::ChunkGenerator;

pub const GRANITE: u32 = 1;
pub const COAL: u32 = 2;
pub const SAND: u32 = 3;

pub struct Noise3DGenerator {
    perlin: Perlin,
    scale: f64,
}
impl Noise3DGenerator {
    pub fn new(seed: u32, scale: f64) -> Noise3DGenerator {
        Self {
            perlin: Perlin::new(seed),
            scale,
        }
    }

    pub fn from_config(config: &GenerationConfig) -> Noise3DGenerator {
        Noise3DGenerator::new(config.seed, config.scale)
    }
}
impl ChunkGenerator for Noise3DGenerator {
    fn generate_chunk(&self, chunk_origin: Vec3) -> VoxelChunk {
        let mut nodes = 0;
        let chunk = VoxelChunk::from_fn(chunk_origin, |local: IVec3| {
            let world = chunk_origin.as_dvec3() + local.as_dvec3();
            // [-1; 1]
            let noise_val = self.perlin.get((world * self.scale).to_array());
            // Noise band -> Hollow caves
            if noise_val > 0.1 && noise_val < 0.25 {
                nodes += 1;
                let id = if noise_val < 0.15 {
                    GRANITE
                } else if noise_val < 0.2 {
                    COAL
                } else {
                    SAND
                };
                Block::solid(id)
            } else {
                Block::AIR
            }
        });
        trace!("Produced noise 3d chunk at {chunk_origin} with {nodes} nodes");
        chunk
    }
}
