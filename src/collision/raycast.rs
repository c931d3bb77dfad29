use std::time::Instant;

use glam::{IVec3, Vec3};
use log::trace;

use crate::{
    bounds::AABB,
    voxels::{CHUNK_SIZE, ChunkData, VoxelChunk},
    world::VoxelEntity,
};

use super::{EntityHit, HitInfo, Ray};

/// Casts a ray through a single chunk and returns the first solid voxel.
///
/// The traversal holds the chunk's read guard until it returns, so an edit
/// running concurrently is seen either completely or not at all.
pub fn raycast_chunk(ray: &Ray, chunk: &VoxelChunk) -> Option<HitInfo> {
    let data = chunk.read();
    raycast_chunk_data(ray, chunk.origin(), &data)
}

/// Grid traversal over already locked chunk data. `chunk_origin` is the
/// chunk's minimum corner in world space.
///
/// The walk never leaves the chunk, so a hit is always closer than the
/// point where the ray exits the chunk's box.
pub fn raycast_chunk_data(ray: &Ray, chunk_origin: Vec3, data: &ChunkData) -> Option<HitInfo> {
    let size = CHUNK_SIZE as i32;
    let bounds = AABB::new_cube(chunk_origin, CHUNK_SIZE as f32);
    let entry = ray.intersect_aabb(&bounds)?;
    if entry.entry > ray.length {
        return None;
    }

    let start = ray.point_at(entry.entry) - chunk_origin;
    // Entry points sit on the box surface, rounding may push them one cell out
    let mut cell = start
        .floor()
        .as_ivec3()
        .clamp(IVec3::ZERO, IVec3::splat(size - 1));

    let first = data.get_unchecked(cell);
    if first.is_solid() {
        let face_normal = entry.normal.unwrap_or_else(|| inside_normal(cell));
        return Some(HitInfo {
            position: chunk_origin + start,
            voxel_index: cell,
            face_normal,
            voxel: first,
            distance: entry.entry,
        });
    }

    let dir = ray.direction;
    let mut step = IVec3::ZERO;
    // Distance along the ray to cross one cell on each axis
    let mut delta = Vec3::INFINITY;
    // Distance along the ray to the next cell boundary on each axis
    let mut side = Vec3::INFINITY;
    for axis in 0..3 {
        let d = dir[axis];
        if d == 0.0 {
            // Never advance on this axis
            continue;
        }
        delta[axis] = (1.0 / d).abs();
        let cell_min = cell[axis] as f32;
        if d > 0.0 {
            step[axis] = 1;
            side[axis] = (cell_min + 1.0 - start[axis]).max(0.0) * delta[axis];
        } else {
            step[axis] = -1;
            side[axis] = (start[axis] - cell_min).max(0.0) * delta[axis];
        }
    }

    let max_travel = ray.length - entry.entry;
    loop {
        // Ties go to x, then y, then z
        let axis = if side.x <= side.y && side.x <= side.z {
            0
        } else if side.y <= side.z {
            1
        } else {
            2
        };
        let travelled = side[axis];
        if !travelled.is_finite() || travelled > max_travel {
            return None;
        }
        cell[axis] += step[axis];
        if cell[axis] < 0 || cell[axis] >= size {
            return None;
        }
        side[axis] += delta[axis];

        let voxel = data.get_unchecked(cell);
        if voxel.is_solid() {
            let mut face_normal = IVec3::ZERO;
            face_normal[axis] = -step[axis];
            return Some(HitInfo {
                position: chunk_origin + start + dir * travelled,
                voxel_index: cell,
                face_normal,
                voxel,
                distance: entry.entry + travelled,
            });
        }
    }
}

/// Approximate normal for a ray that starts inside a solid voxel: the face
/// pointing away from the chunk center along the dominant offset axis.
/// This is a guess, not the face the ray actually crossed.
fn inside_normal(cell: IVec3) -> IVec3 {
    let half = CHUNK_SIZE as f32 / 2.0;
    let offset = cell.as_vec3() + Vec3::splat(0.5) - Vec3::splat(half);
    let abs = offset.abs();
    let mut normal = IVec3::ZERO;
    let axis = if abs.x >= abs.y && abs.x >= abs.z {
        0
    } else if abs.y >= abs.z {
        1
    } else {
        2
    };
    normal[axis] = if offset[axis] < 0.0 { -1 } else { 1 };
    normal
}

/// Casts a ray against all chunks of an entity.
///
/// Returns one candidate per chunk that was hit, nearest first. Chunks are
/// disjoint and each chunk walk stops at the chunk's exit, so the first
/// element is the nearest hit of the whole entity.
pub fn raycast_entity(ray: &Ray, entity: &VoxelEntity) -> Vec<EntityHit> {
    let start = Instant::now();
    let Some(bounds) = entity.bounding_box() else {
        return Vec::new();
    };
    // Coarse test first: rays missing the entity skip the per-chunk work
    match ray.intersect_aabb(&bounds) {
        Some(entry) if entry.entry <= ray.length => {}
        _ => return Vec::new(),
    }

    let mut candidates: Vec<(f32, IVec3, &VoxelChunk)> = entity
        .chunks()
        .filter_map(|(index, chunk)| {
            let entry = ray.intersect_aabb(&chunk.bounding_box())?;
            (entry.entry <= ray.length).then_some((entry.entry, *index, chunk.as_ref()))
        })
        .collect();
    candidates.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut hits: Vec<EntityHit> = candidates
        .into_iter()
        .filter_map(|(_, index, chunk)| {
            raycast_chunk(ray, chunk).map(|hit| EntityHit { chunk: index, hit })
        })
        .collect();
    // Entry order already implies hit order for disjoint chunks, this only
    // guards against float noise on shared faces
    hits.sort_by(|a, b| a.hit.distance.total_cmp(&b.hit.distance));
    trace!(
        "Entity raycast produced {} hits in {}ms",
        hits.len(),
        start.elapsed().as_secs_f64() * 1e3
    );
    hits
}

#[cfg(test)]
mod tests {
    use glam::{IVec3, Vec3};

    use crate::{
        collision::Ray,
        voxels::{Block, CHUNK_SIZE, VoxelChunk, generators::debug_generator::DebugGenerator},
        world::VoxelEntity,
    };

    use super::{raycast_chunk, raycast_entity};

    fn single_voxel_chunk(origin: Vec3, cell: IVec3) -> VoxelChunk {
        let chunk = VoxelChunk::new(origin);
        chunk
            .set_voxel(cell.x, cell.y, cell.z, Block::solid(9))
            .unwrap();
        chunk
    }

    #[test]
    fn test_empty_chunk_never_hits() {
        let chunk = VoxelChunk::new(Vec3::ZERO);
        let mut rng = fastrand::Rng::with_seed(12345);
        for _ in 0..200 {
            let origin = Vec3::new(rng.f32(), rng.f32(), rng.f32()) * CHUNK_SIZE as f32;
            let direction = Vec3::new(rng.f32(), rng.f32(), rng.f32()) * 2.0 - Vec3::ONE;
            let ray = Ray::new(origin, direction, 100.0);
            assert!(raycast_chunk(&ray, &chunk).is_none());
        }
    }

    #[test]
    fn test_hit_from_negative_x() {
        let chunk = single_voxel_chunk(Vec3::ZERO, IVec3::ZERO);
        let ray = Ray::new(Vec3::new(-5.0, 0.5, 0.5), Vec3::X, 10.0);
        let hit = raycast_chunk(&ray, &chunk).unwrap();
        assert_eq!(hit.voxel_index, IVec3::ZERO);
        assert_eq!(hit.face_normal, IVec3::NEG_X);
        assert_eq!(hit.voxel.id(), 9);
        assert!((hit.distance - 5.0).abs() < 1e-5);
        assert!((hit.position - Vec3::new(0.0, 0.5, 0.5)).length() < 1e-5);
    }

    #[test]
    fn test_hit_after_traversal() {
        let chunk = single_voxel_chunk(Vec3::ZERO, IVec3::new(10, 4, 4));
        let ray = Ray::new(Vec3::new(0.5, 4.5, 4.5), Vec3::X, 100.0);
        let hit = raycast_chunk(&ray, &chunk).unwrap();
        assert_eq!(hit.voxel_index, IVec3::new(10, 4, 4));
        assert_eq!(hit.face_normal, IVec3::NEG_X);
        assert!((hit.distance - 9.5).abs() < 1e-5);

        // Coming from above
        let ray = Ray::new(Vec3::new(10.5, 20.0, 4.5), Vec3::NEG_Y, 100.0);
        let hit = raycast_chunk(&ray, &chunk).unwrap();
        assert_eq!(hit.face_normal, IVec3::Y);
        assert!((hit.position.y - 5.0).abs() < 1e-5);
    }

    #[test]
    fn test_diagonal_hit() {
        let chunk = single_voxel_chunk(Vec3::ZERO, IVec3::new(5, 5, 5));
        let ray = Ray::new(Vec3::new(0.2, 0.3, 0.4), Vec3::ONE, 100.0);
        let hit = raycast_chunk(&ray, &chunk).unwrap();
        assert_eq!(hit.voxel_index, IVec3::new(5, 5, 5));
        // The hit point lies on the entered face
        let local = hit.position - hit.voxel_index.as_vec3();
        let face_axis = hit.face_normal.abs().as_vec3();
        assert!((local.dot(face_axis)).abs() < 1e-4);
    }

    #[test]
    fn test_respects_length() {
        let chunk = single_voxel_chunk(Vec3::ZERO, IVec3::new(10, 0, 0));
        let ray = Ray::new(Vec3::new(0.5, 0.5, 0.5), Vec3::X, 9.0);
        assert!(raycast_chunk(&ray, &chunk).is_none());
        let ray = Ray::new(Vec3::new(0.5, 0.5, 0.5), Vec3::X, 9.6);
        assert!(raycast_chunk(&ray, &chunk).is_some());
    }

    #[test]
    fn test_zero_direction_does_not_advance() {
        let chunk = single_voxel_chunk(Vec3::ZERO, IVec3::new(3, 3, 3));
        let ray = Ray::new(Vec3::splat(1.5), Vec3::ZERO, f32::INFINITY);
        assert!(raycast_chunk(&ray, &chunk).is_none());
        // Axis aligned rays have two zero components
        let ray = Ray::new(Vec3::new(3.5, 3.5, 0.5), Vec3::Z, f32::INFINITY);
        let hit = raycast_chunk(&ray, &chunk).unwrap();
        assert_eq!(hit.face_normal, IVec3::NEG_Z);
    }

    #[test]
    fn test_start_inside_solid_uses_center_heuristic() {
        let last = CHUNK_SIZE as i32 - 1;
        let chunk = single_voxel_chunk(Vec3::ZERO, IVec3::new(last, 16, 16));
        let ray = Ray::new(Vec3::new(last as f32 + 0.5, 16.5, 16.5), Vec3::NEG_X, 10.0);
        let hit = raycast_chunk(&ray, &chunk).unwrap();
        assert_eq!(hit.distance, 0.0);
        assert_eq!(hit.face_normal, IVec3::X);
    }

    #[test]
    fn test_world_offset_chunk() {
        let chunk = single_voxel_chunk(Vec3::new(64.0, 0.0, -32.0), IVec3::new(0, 0, 31));
        let ray = Ray::new(Vec3::new(64.5, 0.5, 10.0), Vec3::NEG_Z, 100.0);
        let hit = raycast_chunk(&ray, &chunk).unwrap();
        assert_eq!(hit.voxel_index, IVec3::new(0, 0, 31));
        assert_eq!(hit.face_normal, IVec3::Z);
        assert!((hit.distance - 10.0).abs() < 1e-5);
    }

    #[test]
    fn test_entity_hits_sorted() {
        let mut entity = VoxelEntity::new(Vec3::ZERO);
        let generator = DebugGenerator::new(Block::solid(4));
        entity.generate_chunk(IVec3::new(0, 0, 0), &generator);
        entity.generate_chunk(IVec3::new(1, 0, 0), &generator);
        entity.generate_chunk(IVec3::new(2, 0, 0), &generator);

        // Runs along the bottom edge row through the corner voxels of all chunks
        let ray = Ray::new(Vec3::new(-3.0, 0.5, 0.5), Vec3::X, 1000.0);
        let hits = raycast_entity(&ray, &entity);
        assert_eq!(hits.len(), 3);
        for pair in hits.windows(2) {
            assert!(pair[0].hit.distance < pair[1].hit.distance);
        }
        assert_eq!(hits[0].chunk, IVec3::ZERO);
        assert_eq!(hits[0].hit.voxel_index, IVec3::ZERO);
        assert!((hits[0].hit.distance - 3.0).abs() < 1e-5);
        assert_eq!(hits[2].chunk, IVec3::new(2, 0, 0));
    }

    #[test]
    fn test_entity_ray_from_far_side() {
        let mut entity = VoxelEntity::new(Vec3::ZERO);
        let generator = DebugGenerator::new(Block::solid(4));
        entity.generate_chunk(IVec3::new(0, 0, 0), &generator);
        entity.generate_chunk(IVec3::new(1, 0, 0), &generator);

        let ray = Ray::new(Vec3::new(100.0, 0.5, 0.5), Vec3::NEG_X, 1000.0);
        let hits = raycast_entity(&ray, &entity);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].chunk, IVec3::new(1, 0, 0));
        assert_eq!(hits[0].hit.face_normal, IVec3::X);
    }

    #[test]
    fn test_entity_misses() {
        let empty = VoxelEntity::new(Vec3::ZERO);
        let ray = Ray::new(Vec3::new(-3.0, 0.5, 0.5), Vec3::X, 1000.0);
        assert!(raycast_entity(&ray, &empty).is_empty());

        let mut entity = VoxelEntity::new(Vec3::ZERO);
        entity.generate_chunk(IVec3::ZERO, &DebugGenerator::new(Block::solid(4)));
        let away = Ray::new(Vec3::new(-3.0, 0.5, 0.5), Vec3::NEG_X, 1000.0);
        assert!(raycast_entity(&away, &entity).is_empty());
        let short = Ray::new(Vec3::new(-3.0, 0.5, 0.5), Vec3::X, 2.0);
        assert!(raycast_entity(&short, &entity).is_empty());
    }
}
