use std::{
    collections::HashMap,
    sync::{
        PoisonError, RwLock, RwLockReadGuard,
        atomic::{AtomicBool, Ordering},
    },
};

use glam::{IVec3, Vec3};
use serde::{Deserialize, Serialize};

use crate::{
    bounds::AABB,
    error::{Result, VoxelError},
};

use super::{Block, Light};

// TODO: Would be cleaner to have this as a world parameter
pub const CHUNK_SIZE: usize = 32;
pub const CHUNK_VOLUME: usize = CHUNK_SIZE * CHUNK_SIZE * CHUNK_SIZE;

/// Dense voxel storage of one chunk. Layout is x fastest, then y, then z.
#[derive(Debug, Clone)]
pub struct ChunkData {
    blocks: Box<[Block]>,
    // Decorative tints and emitters are rare, so they live in sparse maps
    tints: HashMap<usize, Vec3>,
    lights: HashMap<usize, Light>,
}

impl ChunkData {
    fn new() -> ChunkData {
        Self {
            blocks: vec![Block::AIR; CHUNK_VOLUME].into_boxed_slice(),
            tints: HashMap::new(),
            lights: HashMap::new(),
        }
    }

    pub fn is_in_range(x: i32, y: i32, z: i32) -> bool {
        let size = CHUNK_SIZE as i32;
        (0..size).contains(&x) && (0..size).contains(&y) && (0..size).contains(&z)
    }

    #[inline]
    pub fn index(x: usize, y: usize, z: usize) -> usize {
        x + CHUNK_SIZE * (y + CHUNK_SIZE * z)
    }

    fn checked_index(x: i32, y: i32, z: i32) -> Result<usize> {
        if !ChunkData::is_in_range(x, y, z) {
            return Err(VoxelError::Bounds {
                x,
                y,
                z,
                edge: CHUNK_SIZE,
            });
        }
        Ok(ChunkData::index(x as usize, y as usize, z as usize))
    }

    pub fn get(&self, x: i32, y: i32, z: i32) -> Result<Block> {
        Ok(self.blocks[ChunkData::checked_index(x, y, z)?])
    }

    /// Hot path for loops that already clamped their range to the chunk.
    /// Coordinates are not validated beyond a debug assertion.
    #[inline]
    pub(crate) fn get_unchecked(&self, cell: IVec3) -> Block {
        debug_assert!(
            ChunkData::is_in_range(cell.x, cell.y, cell.z),
            "unchecked voxel access out of range {cell}"
        );
        self.blocks[ChunkData::index(cell.x as usize, cell.y as usize, cell.z as usize)]
    }

    pub fn set(&mut self, x: i32, y: i32, z: i32, block: Block) -> Result<()> {
        let idx = ChunkData::checked_index(x, y, z)?;
        self.blocks[idx] = block;
        Ok(())
    }

    pub fn tint(&self, x: i32, y: i32, z: i32) -> Result<Vec3> {
        let idx = ChunkData::checked_index(x, y, z)?;
        Ok(self.tints.get(&idx).copied().unwrap_or(Vec3::ONE))
    }

    pub fn set_tint(&mut self, x: i32, y: i32, z: i32, tint: Vec3) -> Result<()> {
        let idx = ChunkData::checked_index(x, y, z)?;
        if tint == Vec3::ONE {
            self.tints.remove(&idx);
        } else {
            self.tints.insert(idx, tint);
        }
        Ok(())
    }

    pub fn light(&self, x: i32, y: i32, z: i32) -> Result<Light> {
        let idx = ChunkData::checked_index(x, y, z)?;
        Ok(self.lights.get(&idx).copied().unwrap_or_default())
    }

    pub fn set_light(&mut self, x: i32, y: i32, z: i32, light: Light) -> Result<()> {
        let idx = ChunkData::checked_index(x, y, z)?;
        if light.is_emissive() {
            self.lights.insert(idx, light);
        } else {
            self.lights.remove(&idx);
        }
        Ok(())
    }

    /// Emitting voxels as (local position, light)
    pub fn emitters(&self) -> impl Iterator<Item = (IVec3, Light)> + '_ {
        self.lights.iter().map(|(idx, light)| {
            let x = idx % CHUNK_SIZE;
            let y = (idx / CHUNK_SIZE) % CHUNK_SIZE;
            let z = idx / (CHUNK_SIZE * CHUNK_SIZE);
            (IVec3::new(x as i32, y as i32, z as i32), *light)
        })
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Raw little endian view handed to external serializers
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.blocks[..])
    }

    pub fn count_solid(&self) -> usize {
        self.blocks.iter().filter(|b| b.is_solid()).count()
    }
}

/// Persisted form of a chunk. Tints and lights are not part of it.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ChunkSnapshot {
    pub origin: Vec3,
    pub blocks: Vec<u32>,
    pub modified: bool,
}

/// A cube of `CHUNK_SIZE` voxels.
///
/// Voxel data sits behind a reader-writer lock: every query holds one read
/// guard for its whole traversal and every edit one write guard, so a query
/// never observes half of an edit.
#[derive(Debug)]
pub struct VoxelChunk {
    data: RwLock<ChunkData>,
    /// Minimum corner (world pos)
    origin: Vec3,
    mesh_dirty: AtomicBool,
    modified: AtomicBool,
}

impl VoxelChunk {
    // New empty chunk at **world_pos**
    pub fn new(origin: Vec3) -> VoxelChunk {
        Self {
            data: RwLock::new(ChunkData::new()),
            origin,
            mesh_dirty: AtomicBool::new(true),
            modified: AtomicBool::new(false),
        }
    }

    /// Builds a freshly generated chunk. It needs a mesh but has no unsaved edits.
    pub fn from_fn(origin: Vec3, mut f: impl FnMut(IVec3) -> Block) -> VoxelChunk {
        let mut data = ChunkData::new();
        for z in 0..CHUNK_SIZE {
            for y in 0..CHUNK_SIZE {
                for x in 0..CHUNK_SIZE {
                    let local = IVec3::new(x as i32, y as i32, z as i32);
                    data.blocks[ChunkData::index(x, y, z)] = f(local);
                }
            }
        }
        Self {
            data: RwLock::new(data),
            origin,
            mesh_dirty: AtomicBool::new(true),
            modified: AtomicBool::new(false),
        }
    }

    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    pub fn bounding_box(&self) -> AABB {
        AABB::new_cube(self.origin, CHUNK_SIZE as f32)
    }

    pub fn is_in_range(&self, x: i32, y: i32, z: i32) -> bool {
        ChunkData::is_in_range(x, y, z)
    }

    /// Shared guard for queries that read many voxels
    pub fn read(&self) -> RwLockReadGuard<'_, ChunkData> {
        // A panic mid-edit leaves the arrays structurally valid, keep going
        self.data.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get_voxel(&self, x: i32, y: i32, z: i32) -> Result<Block> {
        self.read().get(x, y, z)
    }

    pub fn set_voxel(&self, x: i32, y: i32, z: i32, block: Block) -> Result<()> {
        ChunkData::checked_index(x, y, z)?;
        self.edit(|data| data.set(x, y, z, block))
    }

    pub fn get_tint(&self, x: i32, y: i32, z: i32) -> Result<Vec3> {
        self.read().tint(x, y, z)
    }

    pub fn set_tint(&self, x: i32, y: i32, z: i32, tint: Vec3) -> Result<()> {
        ChunkData::checked_index(x, y, z)?;
        self.edit(|data| data.set_tint(x, y, z, tint))
    }

    pub fn get_light(&self, x: i32, y: i32, z: i32) -> Result<Light> {
        self.read().light(x, y, z)
    }

    pub fn set_light(&self, x: i32, y: i32, z: i32, light: Light) -> Result<()> {
        ChunkData::checked_index(x, y, z)?;
        self.edit(|data| data.set_light(x, y, z, light))
    }

    /// Applies a batch of writes under a single write guard. The chunk is
    /// flagged even if the batch fails halfway, earlier writes stay applied.
    pub fn edit<R>(&self, f: impl FnOnce(&mut ChunkData) -> Result<R>) -> Result<R> {
        let mut data = self.data.write().unwrap_or_else(PoisonError::into_inner);
        let res = f(&mut data);
        self.mesh_dirty.store(true, Ordering::Release);
        self.modified.store(true, Ordering::Release);
        res
    }

    pub fn is_mesh_dirty(&self) -> bool {
        self.mesh_dirty.load(Ordering::Acquire)
    }

    /// Reads and clears the mesh flag in one step, so an edit racing with a
    /// mesh hand-off raises it again instead of getting lost.
    pub fn take_mesh_dirty(&self) -> bool {
        self.mesh_dirty.swap(false, Ordering::AcqRel)
    }

    /// Raises the mesh flag again, e.g. after a failed hand-off
    pub fn mark_mesh_dirty(&self) {
        self.mesh_dirty.store(true, Ordering::Release);
    }

    pub fn is_modified(&self) -> bool {
        self.modified.load(Ordering::Acquire)
    }

    pub fn clear_modified(&self) {
        self.modified.store(false, Ordering::Release);
    }

    pub fn snapshot(&self) -> ChunkSnapshot {
        let data = self.read();
        ChunkSnapshot {
            origin: self.origin,
            blocks: data.blocks.iter().map(|b| b.bits()).collect(),
            modified: self.is_modified(),
        }
    }

    pub fn from_snapshot(snapshot: ChunkSnapshot) -> Result<VoxelChunk> {
        if snapshot.blocks.len() != CHUNK_VOLUME {
            return Err(VoxelError::NonCubic {
                edge: CHUNK_SIZE,
                len: snapshot.blocks.len(),
            });
        }
        let mut data = ChunkData::new();
        for (dst, bits) in data.blocks.iter_mut().zip(snapshot.blocks) {
            *dst = Block::from_bits(bits);
        }
        Ok(Self {
            data: RwLock::new(data),
            origin: snapshot.origin,
            mesh_dirty: AtomicBool::new(true),
            modified: AtomicBool::new(snapshot.modified),
        })
    }
}
