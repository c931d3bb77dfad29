use glam::{IVec3, Vec3};

use crate::voxels::Block;

#[derive(Copy, Clone, Debug)]
pub struct CollisionInfo {
    pub normal: Vec3,
    pub contact_point: Vec3,
    pub penetration_depth: f32,
}

/// First solid voxel along a ray
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct HitInfo {
    /// World space point where the ray enters the voxel
    pub position: Vec3,
    /// Chunk local voxel coordinate
    pub voxel_index: IVec3,
    pub face_normal: IVec3,
    pub voxel: Block,
    /// Distance travelled from the ray origin
    pub distance: f32,
}

/// Hit inside one chunk of an entity
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct EntityHit {
    /// Chunk index relative to the entity origin
    pub chunk: IVec3,
    pub hit: HitInfo,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Sphere {
    pub center: Vec3,
    pub radius: f32,
}

impl Sphere {
    pub fn new(center: Vec3, radius: f32) -> Sphere {
        debug_assert!(center.is_finite());
        debug_assert!(radius >= 0.0);
        Self { center, radius }
    }
}

/// Contact between a sphere and a voxel
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CollideInfo {
    /// Chunk local voxel coordinate
    pub voxel_index: IVec3,
    /// Points from the voxel towards the sphere center
    pub normal: Vec3,
    pub voxel: Block,
    /// Closest point of the voxel to the sphere center (world space)
    pub contact_point: Vec3,
    pub penetration_depth: f32,
}
