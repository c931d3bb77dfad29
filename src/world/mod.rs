mod entity;
mod sector;

use std::collections::HashMap;

use glam::{IVec3, Vec3};
use hecs::{Entity, Ref, RefMut, World};
use log::{debug, warn};

use crate::{
    collision::{EntityHit, Ray, raycast_entity},
    config::WorldConfig,
};

pub use entity::VoxelEntity;
pub use sector::SectorGrid;

/// Sector an entity is currently registered in
struct SectorMember(IVec3);

/// Explicit world context: all spatial queries go through an instance of
/// this, several independent worlds can coexist.
pub struct VoxelWorld {
    grid: SectorGrid,
    search_radius: i32,
    entities: World,
    sectors: HashMap<IVec3, Vec<Entity>>,
}

impl VoxelWorld {
    pub fn new(config: &WorldConfig) -> VoxelWorld {
        Self {
            grid: SectorGrid::new(config.sector_size),
            search_radius: config.search_radius,
            entities: World::new(),
            sectors: HashMap::new(),
        }
    }

    pub fn grid(&self) -> &SectorGrid {
        &self.grid
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len() as usize
    }

    pub fn spawn_entity(&mut self, voxel_entity: VoxelEntity) -> Entity {
        let sector = self.grid.sector_of(voxel_entity.anchor());
        let entity = self.entities.spawn((voxel_entity, SectorMember(sector)));
        self.sectors.entry(sector).or_default().push(entity);
        debug!("Spawned voxel entity {entity:?} in sector {sector}");
        entity
    }

    pub fn despawn_entity(&mut self, entity: Entity) -> Option<VoxelEntity> {
        let sector = self.entities.get::<&SectorMember>(entity).ok()?.0;
        self.unregister(entity, sector);
        let voxel_entity = self.entities.remove_one::<VoxelEntity>(entity).ok()?;
        if let Err(err) = self.entities.despawn(entity) {
            warn!("Failed to despawn {entity:?}: {err}");
        }
        debug!("Despawned voxel entity {entity:?} from sector {sector}");
        Some(voxel_entity)
    }

    pub fn entity(&self, entity: Entity) -> Option<Ref<'_, VoxelEntity>> {
        self.entities.get::<&VoxelEntity>(entity).ok()
    }

    /// Call `refresh_sector` after changing the chunks of the entity
    pub fn entity_mut(&self, entity: Entity) -> Option<RefMut<'_, VoxelEntity>> {
        self.entities.get::<&mut VoxelEntity>(entity).ok()
    }

    pub fn entities(&self) -> impl Iterator<Item = Entity> + '_ {
        self.entities.iter().map(|entity_ref| entity_ref.entity())
    }

    pub fn sector_of(&self, entity: Entity) -> Option<IVec3> {
        self.entities
            .get::<&SectorMember>(entity)
            .ok()
            .map(|member| member.0)
    }

    pub fn entities_in_sector(&self, sector: IVec3) -> &[Entity] {
        self.sectors.get(&sector).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Moves an entity to the sector its bounds now fall in. Returns the new sector.
    pub fn refresh_sector(&mut self, entity: Entity) -> Option<IVec3> {
        let anchor = self.entity(entity)?.anchor();
        let new_sector = self.grid.sector_of(anchor);
        let old_sector = self.sector_of(entity)?;
        if new_sector != old_sector {
            self.unregister(entity, old_sector);
            self.sectors.entry(new_sector).or_default().push(entity);
            if let Ok(mut member) = self.entities.get::<&mut SectorMember>(entity) {
                member.0 = new_sector;
            }
            debug!("Entity {entity:?} moved from sector {old_sector} to {new_sector}");
        }
        Some(new_sector)
    }

    fn unregister(&mut self, entity: Entity, sector: IVec3) {
        if let Some(members) = self.sectors.get_mut(&sector) {
            members.retain(|e| *e != entity);
            if members.is_empty() {
                self.sectors.remove(&sector);
            }
        }
    }

    /// Entity closest to `point`, measured from the center of its bounds.
    /// Only sectors within the configured search radius of the point's
    /// sector are considered.
    pub fn nearest_entity(&self, point: Vec3) -> Option<Entity> {
        let origin_sector = self.grid.sector_of(point);
        self.grid
            .neighborhood(origin_sector, self.search_radius)
            .flat_map(|sector| self.entities_in_sector(sector).iter().copied())
            .filter_map(|entity| {
                let distance = self.entity(entity)?.anchor().distance(point);
                Some((distance, entity))
            })
            .min_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(_, entity)| entity)
    }

    /// Occupied sectors around `point` within the search radius, closest
    /// sector center first. Streaming loads and unloads in this order.
    pub fn sectors_by_distance(&self, point: Vec3) -> Vec<(IVec3, f32)> {
        let origin_sector = self.grid.sector_of(point);
        let mut sectors: Vec<(IVec3, f32)> = self
            .grid
            .neighborhood(origin_sector, self.search_radius)
            .filter(|sector| !self.entities_in_sector(*sector).is_empty())
            .map(|sector| {
                let position = self.grid.sector_position(sector);
                (sector, self.grid.distance_to_sector(position, point))
            })
            .collect();
        sectors.sort_by(|a, b| a.1.total_cmp(&b.1));
        sectors
    }

    /// Casts a ray against every entity, nearest candidate first
    pub fn raycast(&self, ray: &Ray) -> Vec<(Entity, EntityHit)> {
        let mut query = self.entities.query::<&VoxelEntity>();
        let mut hits: Vec<(Entity, EntityHit)> = query
            .iter()
            .flat_map(|(entity, voxel_entity)| {
                raycast_entity(ray, voxel_entity)
                    .into_iter()
                    .map(move |hit| (entity, hit))
            })
            .collect();
        hits.sort_by(|a, b| a.1.hit.distance.total_cmp(&b.1.hit.distance));
        hits
    }
}
