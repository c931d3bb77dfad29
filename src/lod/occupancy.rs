use bitvec::vec::BitVec;
use glam::IVec3;

use crate::{
    error::{Result, VoxelError},
    voxels::{CHUNK_SIZE, ChunkData, VoxelChunk},
};

/// Cubic solid/empty grid fed to the mesher. Layout is x fastest, then y,
/// then z, one bit per cell.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OccupancyGrid {
    size: usize,
    cells: BitVec,
}

impl OccupancyGrid {
    /// All empty grid of `size` cells per axis
    pub fn new(size: usize) -> Result<OccupancyGrid> {
        volume(size).ok_or(VoxelError::NonCubic { edge: size, len: 0 })?;
        Ok(OccupancyGrid::zeroed(size))
    }

    /// Empty grid for a `size` known to fit, e.g. taken from another grid
    pub(crate) fn zeroed(size: usize) -> OccupancyGrid {
        Self {
            size,
            cells: BitVec::repeat(false, size * size * size),
        }
    }

    /// Rejects data that does not hold exactly `size^3` cells
    pub fn from_cells(size: usize, cells: BitVec) -> Result<OccupancyGrid> {
        if volume(size) != Some(cells.len()) {
            return Err(VoxelError::NonCubic {
                edge: size,
                len: cells.len(),
            });
        }
        Ok(Self { size, cells })
    }

    pub fn from_bools(size: usize, cells: &[bool]) -> Result<OccupancyGrid> {
        OccupancyGrid::from_cells(size, cells.iter().copied().collect())
    }

    pub fn from_fn(size: usize, f: impl FnMut(IVec3) -> bool) -> Result<OccupancyGrid> {
        volume(size).ok_or(VoxelError::NonCubic { edge: size, len: 0 })?;
        Ok(OccupancyGrid::build(size, f))
    }

    pub(crate) fn build(size: usize, mut f: impl FnMut(IVec3) -> bool) -> OccupancyGrid {
        let mut grid = OccupancyGrid::zeroed(size);
        for z in 0..size {
            for y in 0..size {
                for x in 0..size {
                    if f(IVec3::new(x as i32, y as i32, z as i32)) {
                        let idx = grid.index(x, y, z);
                        grid.cells.set(idx, true);
                    }
                }
            }
        }
        grid
    }

    pub fn from_chunk(chunk: &VoxelChunk) -> OccupancyGrid {
        OccupancyGrid::from_chunk_data(&chunk.read())
    }

    pub fn from_chunk_data(data: &ChunkData) -> OccupancyGrid {
        // Chunk storage uses the same x fastest layout
        let cells: BitVec = data.blocks().iter().map(|b| b.is_solid()).collect();
        debug_assert_eq!(cells.len(), CHUNK_SIZE * CHUNK_SIZE * CHUNK_SIZE);
        Self {
            size: CHUNK_SIZE,
            cells,
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    pub(crate) fn index(&self, x: usize, y: usize, z: usize) -> usize {
        debug_assert!(x < self.size && y < self.size && z < self.size);
        x + self.size * (y + self.size * z)
    }

    fn checked_index(&self, x: usize, y: usize, z: usize) -> Result<usize> {
        if x >= self.size || y >= self.size || z >= self.size {
            let coord = |v: usize| i32::try_from(v).unwrap_or(i32::MAX);
            return Err(VoxelError::Bounds {
                x: coord(x),
                y: coord(y),
                z: coord(z),
                edge: self.size,
            });
        }
        Ok(self.index(x, y, z))
    }

    pub fn get(&self, x: usize, y: usize, z: usize) -> Result<bool> {
        Ok(self.cells[self.checked_index(x, y, z)?])
    }

    pub fn try_set(&mut self, x: usize, y: usize, z: usize, solid: bool) -> Result<()> {
        let idx = self.checked_index(x, y, z)?;
        self.cells.set(idx, solid);
        Ok(())
    }

    /// Unchecked read for loops bounded by `size()`
    #[inline]
    pub(crate) fn is_solid(&self, x: usize, y: usize, z: usize) -> bool {
        self.cells[self.index(x, y, z)]
    }

    #[inline]
    pub(crate) fn set(&mut self, x: usize, y: usize, z: usize, solid: bool) {
        let idx = self.index(x, y, z);
        self.cells.set(idx, solid);
    }

    pub fn count_solid(&self) -> usize {
        self.cells.count_ones()
    }

    pub fn cells(&self) -> &BitVec {
        &self.cells
    }

    /// True if every solid cell of `other` is solid here as well
    pub fn contains_solid_of(&self, other: &OccupancyGrid) -> bool {
        self.size == other.size && other.cells.iter_ones().all(|idx| self.cells[idx])
    }
}

fn volume(size: usize) -> Option<usize> {
    size.checked_mul(size)?.checked_mul(size)
}
