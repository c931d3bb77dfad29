pub mod block;
pub mod chunk;
pub mod edit;
pub mod generators;

pub use crate::voxels::block::Block;
pub use crate::voxels::block::BlockFields;
pub use crate::voxels::block::Direction;
pub use crate::voxels::block::Light;
pub use crate::voxels::chunk::CHUNK_SIZE;
pub use crate::voxels::chunk::ChunkData;
pub use crate::voxels::chunk::ChunkSnapshot;
pub use crate::voxels::chunk::VoxelChunk;
pub use crate::voxels::edit::destroy_block;
pub use crate::voxels::edit::place_block;
