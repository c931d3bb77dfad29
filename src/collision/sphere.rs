use std::cmp::Ordering;

use glam::{IVec3, Vec3};
use log::trace;

use crate::{
    bounds::{AABB, IAabb},
    voxels::{CHUNK_SIZE, ChunkData, VoxelChunk},
    world::VoxelEntity,
};

use super::{CollideInfo, CollisionInfo, Sphere};

pub fn get_sphere_aabb_collision_info(
    center: &Vec3,
    radius: f32,
    b: &AABB,
) -> Option<CollisionInfo> {
    // Closest point on AABB to the sphere center
    let closest = center.clamp(b.min, b.max);
    let offset = *center - closest;
    let dist_sq = offset.length_squared();
    let radius_sq = radius * radius;

    // No collision if the center is outside the box farther than the radius
    if dist_sq > radius_sq {
        return None;
    }

    // Compute distance only when meaningful
    let distance = dist_sq.sqrt();

    // Normal handling:
    // If sphere center is outside the box => normal = normalized offset
    // If inside => choose normal based on smallest penetration axis
    let normal = if distance > f32::EPSILON {
        offset / distance
    } else {
        // sphere center is inside the AABB
        // choose closest face direction for stable normal
        let faces = [
            ((center.x - b.min.x).abs(), Vec3::NEG_X),
            ((b.max.x - center.x).abs(), Vec3::X),
            ((center.y - b.min.y).abs(), Vec3::NEG_Y),
            ((b.max.y - center.y).abs(), Vec3::Y),
            ((center.z - b.min.z).abs(), Vec3::NEG_Z),
            ((b.max.z - center.z).abs(), Vec3::Z),
        ];
        faces
            .iter()
            .min_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal))
            .map(|(_, normal)| *normal)
            .unwrap_or(Vec3::Y)
    };

    // penetration depth (how much sphere overlaps the AABB)
    let penetration = radius - distance;

    Some(CollisionInfo {
        contact_point: closest,
        normal,
        penetration_depth: penetration,
    })
}

/// Sphere against the voxels of one chunk whose minimum corner sits at
/// `chunk_world_position`.
///
/// Only cells under the sphere's bounding box are visited, x outermost and z
/// innermost. The first solid cell touching the sphere is reported, which is
/// not necessarily the deepest contact when several cells overlap.
pub fn test_collision(
    sphere: &Sphere,
    chunk: &VoxelChunk,
    chunk_world_position: Vec3,
) -> Option<CollideInfo> {
    let data = chunk.read();
    test_collision_data(sphere, &data, chunk_world_position)
}

pub fn test_collision_data(
    sphere: &Sphere,
    data: &ChunkData,
    chunk_world_position: Vec3,
) -> Option<CollideInfo> {
    let local_center = sphere.center - chunk_world_position;
    let sphere_box = AABB {
        min: local_center - Vec3::splat(sphere.radius),
        max: local_center + Vec3::splat(sphere.radius),
    };
    let chunk_cells = IAabb::new(&IVec3::ZERO, CHUNK_SIZE);
    // Will only check indices within overlap
    let candidates = IAabb::covering(&sphere_box).intersection(&chunk_cells)?;

    for cell in candidates.iter_cells() {
        let voxel = data.get_unchecked(cell);
        if voxel.is_air() {
            continue;
        }
        let cell_box = AABB::new_cube(chunk_world_position + cell.as_vec3(), 1.0);
        if let Some(info) = get_sphere_aabb_collision_info(&sphere.center, sphere.radius, &cell_box)
        {
            return Some(CollideInfo {
                voxel_index: cell,
                normal: info.normal,
                voxel,
                contact_point: info.contact_point,
                penetration_depth: info.penetration_depth,
            });
        }
    }
    None
}

/// Sphere against every chunk of an entity. Chunks are visited in ascending
/// index order (x, then y, then z) and the first contact wins.
pub fn test_collision_entity(sphere: &Sphere, entity: &VoxelEntity) -> Option<(IVec3, CollideInfo)> {
    let sphere_box = AABB {
        min: sphere.center - Vec3::splat(sphere.radius),
        max: sphere.center + Vec3::splat(sphere.radius),
    };
    let mut overlapping: Vec<(IVec3, &VoxelChunk)> = entity
        .chunks()
        .filter(|(_, chunk)| chunk.bounding_box().intersects(&sphere_box))
        .map(|(index, chunk)| (*index, chunk.as_ref()))
        .collect();
    overlapping.sort_by_key(|(index, _)| (index.x, index.y, index.z));
    trace!("Sphere overlaps {} chunks", overlapping.len());

    overlapping.into_iter().find_map(|(index, chunk)| {
        test_collision(sphere, chunk, chunk.origin()).map(|info| (index, info))
    })
}
