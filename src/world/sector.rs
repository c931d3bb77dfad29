use glam::{IVec3, Vec3};

use crate::bounds::AABB;

/// Coarse world partition. Sectors are cubes of `size` world units that tile
/// space without gaps; sector `i` spans `[i * size, (i + 1) * size)`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SectorGrid {
    size: f32,
}

impl SectorGrid {
    pub fn new(size: f32) -> SectorGrid {
        debug_assert!(size > 0.0, "Sector size needs to be > 0");
        Self { size }
    }

    pub fn size(&self) -> f32 {
        self.size
    }

    /// Minimum corner of a sector in world space
    pub fn sector_position(&self, index: IVec3) -> Vec3 {
        index.as_vec3() * self.size
    }

    pub fn sector_center(&self, index: IVec3) -> Vec3 {
        self.sector_position(index) + Vec3::splat(self.size / 2.0)
    }

    /// Distance from the center of the sector at `sector_position` to `point`.
    /// Ranks whole sectors for streaming (`VoxelWorld::sectors_by_distance`).
    /// Entity lookups rank by entity bounds instead, see `VoxelWorld::nearest_entity`.
    pub fn distance_to_sector(&self, sector_position: Vec3, point: Vec3) -> f32 {
        (sector_position + Vec3::splat(self.size / 2.0)).distance(point)
    }

    /// Sector containing `point`
    pub fn sector_of(&self, point: Vec3) -> IVec3 {
        (point / self.size).floor().as_ivec3()
    }

    pub fn sector_bounds(&self, index: IVec3) -> AABB {
        AABB::new_cube(self.sector_position(index), self.size)
    }

    /// All sector indices within `radius` sectors of `center` (a cube)
    pub fn neighborhood(&self, center: IVec3, radius: i32) -> impl Iterator<Item = IVec3> {
        let radius = radius.max(0);
        (-radius..=radius).flat_map(move |x| {
            (-radius..=radius).flat_map(move |y| {
                (-radius..=radius).map(move |z| center + IVec3::new(x, y, z))
            })
        })
    }
}
