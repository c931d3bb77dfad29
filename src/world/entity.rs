use std::{
    collections::HashMap,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Instant,
};

use glam::{IVec3, Vec3};
use log::info;
use rayon::prelude::*;

use crate::{
    bounds::AABB,
    voxels::{CHUNK_SIZE, VoxelChunk, generators::ChunkGenerator},
};

/// A voxel body (terrain, ship, station) owning chunks addressed relative to
/// its own origin. Chunk `i` has its minimum corner at
/// `origin + i * CHUNK_SIZE`, so chunks of one entity never overlap.
#[derive(Debug)]
pub struct VoxelEntity {
    origin: Vec3,
    chunks: HashMap<IVec3, Arc<VoxelChunk>>,
}

impl VoxelEntity {
    pub fn new(origin: Vec3) -> VoxelEntity {
        Self {
            origin,
            chunks: HashMap::new(),
        }
    }

    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    pub fn chunk_origin(&self, index: IVec3) -> Vec3 {
        self.origin + index.as_vec3() * CHUNK_SIZE as f32
    }

    /// Chunk index holding a world space point, whether or not it is loaded
    pub fn chunk_index_at(&self, world_pos: Vec3) -> IVec3 {
        ((world_pos - self.origin) / CHUNK_SIZE as f32)
            .floor()
            .as_ivec3()
    }

    /// Resolves a world space point to its chunk index and chunk local voxel
    pub fn locate_voxel(&self, world_pos: Vec3) -> Option<(IVec3, IVec3)> {
        let index = self.chunk_index_at(world_pos);
        self.chunks.get(&index)?;
        let local = (world_pos - self.chunk_origin(index))
            .floor()
            .as_ivec3()
            .clamp(IVec3::ZERO, IVec3::splat(CHUNK_SIZE as i32 - 1));
        Some((index, local))
    }

    pub fn insert_empty_chunk(&mut self, index: IVec3) -> Arc<VoxelChunk> {
        let chunk = Arc::new(VoxelChunk::new(self.chunk_origin(index)));
        self.chunks.insert(index, Arc::clone(&chunk));
        chunk
    }

    pub fn generate_chunk(
        &mut self,
        index: IVec3,
        generator: &dyn ChunkGenerator,
    ) -> Arc<VoxelChunk> {
        let chunk = Arc::new(generator.generate_chunk(self.chunk_origin(index)));
        self.chunks.insert(index, Arc::clone(&chunk));
        chunk
    }

    /// Generates a cube of `extent` chunks per axis starting at index 0 on
    /// the rayon pool. Existing chunks at those indices are replaced.
    pub fn generate(&mut self, extent: usize, generator: &dyn ChunkGenerator) {
        info!("Generating entity chunks, extent {extent}");
        let start_generation = Instant::now();
        // Precalculate positions to be able to distribute them amongst worker threads
        let extent = extent as i32;
        let positions: Vec<IVec3> = (0..extent)
            .flat_map(|x| (0..extent).flat_map(move |y| (0..extent).map(move |z| IVec3::new(x, y, z))))
            .collect();

        let counter = AtomicUsize::new(0);
        let total = positions.len();
        let chunks: Vec<(IVec3, Arc<VoxelChunk>)> = positions
            .into_par_iter()
            .map(|index| {
                let chunk = generator.generate_chunk(self.chunk_origin(index));

                // Update progress
                let prev = counter.fetch_add(1, Ordering::Relaxed);
                if prev % 1_000 == 0 || prev == total - 1 {
                    let percent = (prev + 1) as f32 / total as f32 * 100.0;
                    info!("{percent:.2}% done");
                }
                (index, Arc::new(chunk))
            })
            .collect();

        self.chunks.extend(chunks);
        info!(
            "Entity generation: Generated {} chunks in {}ms",
            total,
            start_generation.elapsed().as_secs_f32() * 1000.0,
        );
    }

    pub fn chunk(&self, index: IVec3) -> Option<&Arc<VoxelChunk>> {
        self.chunks.get(&index)
    }

    pub fn remove_chunk(&mut self, index: IVec3) -> Option<Arc<VoxelChunk>> {
        self.chunks.remove(&index)
    }

    pub fn chunks(&self) -> impl Iterator<Item = (&IVec3, &Arc<VoxelChunk>)> {
        self.chunks.iter()
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Union of all chunk boxes, None for an entity without chunks
    pub fn bounding_box(&self) -> Option<AABB> {
        self.chunks
            .values()
            .map(|chunk| chunk.bounding_box())
            .reduce(|acc, bb| acc.union(&bb))
    }

    /// Point used to place the entity in a sector
    pub fn anchor(&self) -> Vec3 {
        self.bounding_box()
            .map(|bb| bb.center())
            .unwrap_or(self.origin)
    }

    /// Chunks needing a new mesh. Their flag is cleared, an edit after this
    /// call raises it again.
    pub fn take_mesh_dirty_chunks(&self) -> Vec<(IVec3, Arc<VoxelChunk>)> {
        self.chunks
            .iter()
            .filter(|(_, chunk)| chunk.take_mesh_dirty())
            .map(|(index, chunk)| (*index, Arc::clone(chunk)))
            .collect()
    }

    /// Chunks with edits not yet persisted
    pub fn modified_chunks(&self) -> impl Iterator<Item = (&IVec3, &Arc<VoxelChunk>)> {
        self.chunks.iter().filter(|(_, chunk)| chunk.is_modified())
    }
}
