use glam::{IVec3, Vec3};

use crate::voxels::{Block, CHUNK_SIZE, VoxelChunk};

use super::ChunkGenerator;

/// Only the 8 corner voxels are solid
pub struct DebugGenerator {
    block: Block,
}
impl DebugGenerator {
    pub fn new(block: Block) -> DebugGenerator {
        Self { block }
    }
}
impl ChunkGenerator for DebugGenerator {
    fn generate_chunk(&self, chunk_origin: Vec3) -> VoxelChunk {
        let last = CHUNK_SIZE as i32 - 1;
        let is_edge = |v: i32| v == 0 || v == last;
        VoxelChunk::from_fn(chunk_origin, |local: IVec3| {
            if is_edge(local.x) && is_edge(local.y) && is_edge(local.z) {
                self.block
            } else {
                Block::AIR
            }
        })
    }
}
