use std::{env, error::Error, f32::consts::PI};

use benchmark::StageStats;
use glam::Vec3;
use log::{info, warn};
use voxie_engine::{
    collision::{Ray, Sphere, test_collision_entity},
    config::EngineConfig,
    lod::{LodScheduler, preprocess_chunks},
    voxels::{
        CHUNK_SIZE, Direction, destroy_block, generators::noise3d::Noise3DGenerator, place_block,
    },
    world::{VoxelEntity, VoxelWorld},
};

mod benchmark;

/// Evenly spread unit vector number `i` of `n` (spherical fibonacci)
fn direction(i: usize, n: usize) -> Vec3 {
    let golden_angle = PI * (3.0 - 5f32.sqrt());
    let y = 1.0 - 2.0 * (i as f32 + 0.5) / n as f32;
    let r = (1.0 - y * y).sqrt();
    let theta = golden_angle * i as f32;
    Vec3::new(r * theta.cos(), y, r * theta.sin())
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let args: Vec<String> = env::args().skip(1).collect();
    let benchmark_enabled =
        args.contains(&"--benchmark".to_string()) || args.contains(&"-b".to_string());
    let config = match args.iter().position(|arg| arg == "--config") {
        Some(i) => {
            let path = args.get(i + 1).ok_or("--config needs a path")?;
            EngineConfig::load(path)?
        }
        None => EngineConfig::default(),
    };
    let samples = if benchmark_enabled { 10_000 } else { 500 };
    info!("Running with {samples} samples per stage, config {config:?}");

    let mut world = VoxelWorld::new(&config.world);
    let mut terrain = VoxelEntity::new(Vec3::ZERO);
    terrain.generate(
        config.generation.world_size,
        &Noise3DGenerator::from_config(&config.generation),
    );
    let extent = (config.generation.world_size * CHUNK_SIZE) as f32;
    let center = Vec3::splat(extent / 2.0);
    let terrain = world.spawn_entity(terrain);

    // Raycasts from the center outwards
    let mut ray_stats = StageStats::new("Raycast");
    for i in 0..samples {
        let ray = Ray::new(center, direction(i, samples), extent);
        ray_stats.run(|| !world.raycast(&ray).is_empty());
    }
    ray_stats.log_stats();

    // Spheres scattered over the volume
    let mut sphere_stats = StageStats::new("Sphere collision");
    if let Some(entity) = world.entity(terrain) {
        for i in 0..samples {
            let point = center + direction(i, samples) * extent * (i % 7) as f32 / 14.0;
            let sphere = Sphere::new(point, 1.5);
            sphere_stats.run(|| test_collision_entity(&sphere, &entity).is_some());
        }
    }
    sphere_stats.log_stats();

    // Full LOD pass over every chunk
    if let Some(entity) = world.entity(terrain) {
        let chunks = entity.take_mesh_dirty_chunks();
        for &factor in &config.lod.factors {
            let mut lod_stats = StageStats::new(&format!("LOD factor {factor}"));
            lod_stats.run(|| {
                preprocess_chunks(&chunks, &[factor], config.lod.fill_cavities)
                    .map(|results| !results.is_empty())
                    .unwrap_or_else(|err| {
                        warn!("LOD factor {factor} skipped: {err}");
                        false
                    })
            });
            lod_stats.log_stats();
        }
    }

    // Dig a tunnel along x through the center and let the scheduler pick
    // up the touched chunks
    let mut edit_stats = StageStats::new("Edit");
    let mut scheduler = LodScheduler::new(config.lod.clone());
    if let Some(entity) = world.entity(terrain) {
        let mut x = 0.5;
        while x < extent {
            let point = Vec3::new(x, center.y, center.z);
            if let Some((index, local)) = entity.locate_voxel(point) {
                if let Some(chunk) = entity.chunk(index) {
                    edit_stats.run(|| {
                        destroy_block(chunk, local.x, local.y, local.z)
                            .map(|previous| !previous.is_air())
                            .unwrap_or(false)
                    });
                }
            }
            x += 1.0;
        }
        // Cap the tunnel entrance
        let entrance = Vec3::new(0.5, center.y, center.z);
        if let Some((index, local)) = entity.locate_voxel(entrance) {
            if let Some(chunk) = entity.chunk(index) {
                place_block(chunk, local.x, local.y, local.z, 1, Direction::PosX)?;
            }
        }
        let submitted = scheduler.spawn(&entity)?;
        info!("Submitted {submitted} edited chunks for LOD preparation");
    }
    edit_stats.log_stats();

    while scheduler.is_running() {
        match scheduler.receive() {
            Some(results) => info!("Received {} LOD results", results.len()),
            None => std::thread::yield_now(),
        }
    }

    if let Some(entity) = world.despawn_entity(terrain) {
        let modified = entity.modified_chunks().count();
        info!("Done, {modified} chunks carry unsaved edits");
    }
    Ok(())
}
