use glam::Vec3;

use crate::voxels::{Block, VoxelChunk};

use super::ChunkGenerator;

/// Fills every voxel with the same block
pub struct CubicGenerator {
    block: Block,
}
impl CubicGenerator {
    pub fn new(block: Block) -> CubicGenerator {
        Self { block }
    }
}
impl ChunkGenerator for CubicGenerator {
    fn generate_chunk(&self, chunk_origin: Vec3) -> VoxelChunk {
        VoxelChunk::from_fn(chunk_origin, |_| self.block)
    }
}
