use std::{
    sync::{
        Arc,
        mpsc::{self, Receiver, TryRecvError},
    },
    thread,
    time::Instant,
};

use glam::IVec3;
use log::{debug, error, info, trace};
use rayon::prelude::*;

use crate::{
    config::LodConfig,
    error::Result,
    voxels::{CHUNK_SIZE, VoxelChunk},
    world::VoxelEntity,
};

use super::{
    OccupancyGrid,
    downscale::{downscale, validate_factor},
    fill_cavities,
};

/// Downscaled occupancy of one chunk
#[derive(Debug, Clone)]
pub struct LodResult {
    pub chunk: IVec3,
    pub factor: usize,
    pub occupancy: OccupancyGrid,
}

pub fn generate_lod(grid: &OccupancyGrid, factor: usize) -> Result<OccupancyGrid> {
    let start = Instant::now();
    let lod = downscale(grid, factor)?;
    trace!(
        "LOD {factor}: {} -> {} cells per axis in {}us",
        grid.size(),
        lod.size(),
        start.elapsed().as_micros()
    );
    Ok(lod)
}

/// Downscales and optionally seals enclosed air afterwards, so the mesher
/// only sees surfaces reachable from outside.
pub fn prepare_lod(grid: &OccupancyGrid, factor: usize, fill: bool) -> Result<OccupancyGrid> {
    let lod = generate_lod(grid, factor)?;
    if fill {
        Ok(fill_cavities(&lod))
    } else {
        Ok(lod)
    }
}

/// Prepares every chunk at every factor on the rayon pool. Factors are
/// checked up front, a bad factor fails the whole batch before any work.
pub fn preprocess_chunks(
    chunks: &[(IVec3, Arc<VoxelChunk>)],
    factors: &[usize],
    fill: bool,
) -> Result<Vec<LodResult>> {
    for &factor in factors {
        validate_factor(CHUNK_SIZE, factor)?;
    }
    let start = Instant::now();
    let results = chunks
        .par_iter()
        .flat_map_iter(|(index, chunk)| {
            let index = *index;
            let occupancy = OccupancyGrid::from_chunk(chunk);
            factors.iter().map(move |&factor| {
                prepare_lod(&occupancy, factor, fill).map(|occupancy| LodResult {
                    chunk: index,
                    factor,
                    occupancy,
                })
            })
        })
        .collect::<Result<Vec<_>>>()?;
    info!(
        "LOD preprocessing: {} chunks x {} factors in {}ms",
        chunks.len(),
        factors.len(),
        start.elapsed().as_secs_f32() * 1000.0
    );
    Ok(results)
}

/// Runs LOD preparation for mesh dirty chunks on a background thread. At most
/// one batch is in flight, results are picked up by polling [`LodScheduler::receive`].
pub struct LodScheduler {
    config: LodConfig,
    receiver: Option<Receiver<Vec<LodResult>>>,
    // Chunks of the running batch, flagged again if it never reports back
    in_flight: Vec<Arc<VoxelChunk>>,
}

impl LodScheduler {
    pub fn new(config: LodConfig) -> LodScheduler {
        Self {
            config,
            receiver: None,
            in_flight: Vec::new(),
        }
    }

    pub fn is_running(&self) -> bool {
        self.receiver.is_some()
    }

    /// Takes the mesh dirty chunks of `entity` and starts a batch. Returns the
    /// number of chunks submitted, 0 if a batch is already running or
    /// nothing is dirty. Dirty flags are left alone in that case.
    pub fn spawn(&mut self, entity: &VoxelEntity) -> Result<usize> {
        if self.is_running() {
            // Wait for the current batch first
            return Ok(0);
        }
        for &factor in &self.config.factors {
            validate_factor(CHUNK_SIZE, factor)?;
        }
        let chunks = entity.take_mesh_dirty_chunks();
        if chunks.is_empty() {
            return Ok(0);
        }

        let submitted = chunks.len();
        let factors = self.config.factors.clone();
        let fill = self.config.fill_cavities;
        let (tx, rx) = mpsc::channel();
        self.receiver = Some(rx);
        self.in_flight = chunks.iter().map(|(_, chunk)| Arc::clone(chunk)).collect();
        thread::spawn(move || match preprocess_chunks(&chunks, &factors, fill) {
            Ok(results) => {
                if tx.send(results).is_err() {
                    debug!("LOD receiver dropped before batch finished");
                }
            }
            Err(err) => error!("LOD batch failed: {err}"),
        });
        debug!("Submitted {submitted} chunks for LOD preparation");
        Ok(submitted)
    }

    /// Non blocking. Returns the finished batch once, None while running or idle.
    /// If the worker fails or panics, the chunks of that batch are marked mesh
    /// dirty again so the next `spawn` picks them up.
    pub fn receive(&mut self) -> Option<Vec<LodResult>> {
        let receiver = self.receiver.as_ref()?;
        match receiver.try_recv() {
            Ok(results) => {
                debug!("Received {} LOD results", results.len());
                self.receiver = None;
                self.in_flight.clear();
                Some(results)
            }
            Err(TryRecvError::Empty) => None,
            Err(err) => {
                error!(
                    "LOD worker stopped without results: {err}, requeueing {} chunks",
                    self.in_flight.len()
                );
                self.receiver = None;
                for chunk in self.in_flight.drain(..) {
                    chunk.mark_mesh_dirty();
                }
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{sync::mpsc, time::Duration};

    use glam::{IVec3, Vec3};

    use crate::{
        config::LodConfig,
        voxels::{Block, CHUNK_SIZE, generators::cubic::CubicGenerator},
        world::VoxelEntity,
    };

    use super::{LodResult, LodScheduler, OccupancyGrid, preprocess_chunks, prepare_lod};

    #[test]
    fn test_prepare_lod_fills_after_downscale() {
        // Hollow 8^3 shell, two cells thick so it survives a factor 2 vote
        let grid = OccupancyGrid::from_fn(8, |p| p.min_element() <= 1 || p.max_element() >= 6).unwrap();
        let plain = prepare_lod(&grid, 2, false).unwrap();
        assert_eq!(plain.size(), 4);
        assert!(!plain.is_solid(1, 1, 1));

        let filled = prepare_lod(&grid, 2, true).unwrap();
        assert_eq!(filled.count_solid(), 64);
        assert!(prepare_lod(&grid, 3, true).is_err());
    }

    #[test]
    fn test_preprocess_chunks() {
        let mut entity = VoxelEntity::new(Vec3::ZERO);
        entity.generate(2, &CubicGenerator::new(Block::solid(1)));
        let chunks = entity.take_mesh_dirty_chunks();
        let results = preprocess_chunks(&chunks, &[1, 2, 4], true).unwrap();
        assert_eq!(results.len(), 8 * 3);
        for result in &results {
            let size = CHUNK_SIZE / result.factor;
            assert_eq!(result.occupancy.size(), size);
            assert_eq!(result.occupancy.count_solid(), size * size * size);
        }
        assert!(preprocess_chunks(&chunks, &[2, 5], false).is_err());
    }

    #[test]
    fn test_scheduler_round_trip() {
        let mut entity = VoxelEntity::new(Vec3::ZERO);
        entity.generate(1, &CubicGenerator::new(Block::solid(1)));
        let mut scheduler = LodScheduler::new(LodConfig {
            factors: vec![2, 4],
            fill_cavities: true,
        });
        assert!(scheduler.receive().is_none());
        assert_eq!(scheduler.spawn(&entity).unwrap(), 1);
        assert!(scheduler.is_running());
        // A second batch is refused while one is in flight
        assert_eq!(scheduler.spawn(&entity).unwrap(), 0);

        let mut results = None;
        for _ in 0..500 {
            results = scheduler.receive();
            if results.is_some() {
                break;
            }
            std::thread::sleep(Duration::from_millis(10));
        }
        let results = results.expect("LOD batch did not finish");
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.chunk == IVec3::ZERO));
        assert!(!scheduler.is_running());

        // Nothing dirty anymore
        assert_eq!(scheduler.spawn(&entity).unwrap(), 0);
        entity
            .chunk(IVec3::ZERO)
            .unwrap()
            .set_voxel(0, 0, 0, Block::AIR)
            .unwrap();
        assert_eq!(scheduler.spawn(&entity).unwrap(), 1);
    }

    #[test]
    fn test_lost_batch_requeues_chunks() {
        let mut entity = VoxelEntity::new(Vec3::ZERO);
        entity.generate(2, &CubicGenerator::new(Block::solid(1)));
        let mut scheduler = LodScheduler::new(LodConfig::default());
        assert_eq!(scheduler.spawn(&entity).unwrap(), 8);
        assert!(entity.take_mesh_dirty_chunks().is_empty());

        // Swap in a channel whose worker is gone, as after a panic
        let (tx, rx) = mpsc::channel::<Vec<LodResult>>();
        drop(tx);
        scheduler.receiver = Some(rx);
        assert!(scheduler.receive().is_none());
        assert!(!scheduler.is_running());
        assert_eq!(entity.take_mesh_dirty_chunks().len(), 8);
    }

    #[test]
    fn test_scheduler_rejects_bad_factor() {
        let mut entity = VoxelEntity::new(Vec3::ZERO);
        entity.generate(1, &CubicGenerator::new(Block::solid(1)));
        let mut scheduler = LodScheduler::new(LodConfig {
            factors: vec![3],
            fill_cavities: false,
        });
        assert!(scheduler.spawn(&entity).is_err());
        // Flags untouched
        assert_eq!(entity.take_mesh_dirty_chunks().len(), 1);
    }
}
