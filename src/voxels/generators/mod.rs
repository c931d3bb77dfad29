use glam::Vec3;

use crate::voxels::VoxelChunk;

pub mod cubic;
pub mod debug_generator;
pub mod noise3d;

pub trait ChunkGenerator: Sync + Send {
    /// Generates voxel chunk for given origin (minimum corner) in **world** space
    fn generate_chunk(&self, chunk_origin: Vec3) -> VoxelChunk;
}
