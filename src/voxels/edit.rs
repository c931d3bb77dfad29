use glam::Vec3;
use log::debug;

use crate::error::Result;

use super::{Block, Direction, Light, VoxelChunk};

/// Places a block of `block_id` facing `facing` at a chunk local position.
/// Returns the block that was replaced.
pub fn place_block(
    chunk: &VoxelChunk,
    x: i32,
    y: i32,
    z: i32,
    block_id: u32,
    facing: Direction,
) -> Result<Block> {
    let block = Block::solid(block_id).with_facing(facing);
    let previous = swap_block(chunk, x, y, z, block)?;
    debug!(
        "Placed block {} at ({x}, {y}, {z}) in chunk {}",
        block.id(),
        chunk.origin()
    );
    Ok(previous)
}

/// Clears a voxel back to air, dropping its tint and light.
/// Returns the block that was destroyed.
pub fn destroy_block(chunk: &VoxelChunk, x: i32, y: i32, z: i32) -> Result<Block> {
    if !chunk.is_in_range(x, y, z) {
        // Produces the bounds error without flagging the chunk
        return chunk.get_voxel(x, y, z);
    }
    let previous = chunk.edit(|data| {
        let previous = data.get(x, y, z)?;
        data.set(x, y, z, Block::AIR)?;
        data.set_tint(x, y, z, Vec3::ONE)?;
        data.set_light(x, y, z, Light::DARK)?;
        Ok(previous)
    })?;
    debug!(
        "Destroyed block {} at ({x}, {y}, {z}) in chunk {}",
        previous.id(),
        chunk.origin()
    );
    Ok(previous)
}

fn swap_block(chunk: &VoxelChunk, x: i32, y: i32, z: i32, block: Block) -> Result<Block> {
    if !chunk.is_in_range(x, y, z) {
        return chunk.get_voxel(x, y, z);
    }
    chunk.edit(|data| {
        let previous = data.get(x, y, z)?;
        data.set(x, y, z, block)?;
        Ok(previous)
    })
}
