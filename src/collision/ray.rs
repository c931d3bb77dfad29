use glam::{IVec3, Vec3};

use crate::bounds::AABB;

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    /// Unit length, or zero for a degenerate ray
    pub direction: Vec3,
    pub length: f32,
}

/// Where a ray crosses a box
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BoxIntersection {
    /// Distance to the entry point, 0 if the ray starts inside
    pub entry: f32,
    pub exit: f32,
    /// Face the ray enters through. None if the ray starts inside the box.
    pub normal: Option<IVec3>,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3, length: f32) -> Ray {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
            length,
        }
    }

    pub fn point_at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Slab test against an axis aligned box. Boxes that lie behind the
    /// origin, or that the ray only touches in a single point, are misses.
    pub fn intersect_aabb(&self, aabb: &AABB) -> Option<BoxIntersection> {
        // Helper closure to compute slab intersections safely
        fn slab(min: f32, max: f32, origin: f32, direction: f32) -> (f32, f32) {
            if direction != 0.0 {
                let inv_d = 1.0 / direction;
                let mut t0 = (min - origin) * inv_d;
                let mut t1 = (max - origin) * inv_d;
                if t0 > t1 {
                    std::mem::swap(&mut t0, &mut t1);
                }
                (t0, t1)
            } else {
                // Ray is parallel to this axis; check if origin is within slab
                if origin < min || origin > max {
                    (f32::INFINITY, -f32::INFINITY) // no intersection
                } else {
                    (-f32::INFINITY, f32::INFINITY) // always intersecting this slab
                }
            }
        }

        let (tx_min, tx_max) = slab(aabb.min.x, aabb.max.x, self.origin.x, self.direction.x);
        let (ty_min, ty_max) = slab(aabb.min.y, aabb.max.y, self.origin.y, self.direction.y);
        let (tz_min, tz_max) = slab(aabb.min.z, aabb.max.z, self.origin.z, self.direction.z);

        let t_min = tx_min.max(ty_min).max(tz_min);
        let t_max = tx_max.min(ty_max).min(tz_max);

        if t_max <= t_min.max(0.0) {
            return None;
        }
        if t_min < 0.0 {
            return Some(BoxIntersection {
                entry: 0.0,
                exit: t_max,
                normal: None,
            });
        }

        // Determine which axis contributed to t_min
        let normal = if t_min == tx_min {
            if self.direction.x < 0.0 { IVec3::X } else { IVec3::NEG_X }
        } else if t_min == ty_min {
            if self.direction.y < 0.0 { IVec3::Y } else { IVec3::NEG_Y }
        } else if self.direction.z < 0.0 {
            IVec3::Z
        } else {
            IVec3::NEG_Z
        };
        Some(BoxIntersection {
            entry: t_min,
            exit: t_max,
            normal: Some(normal),
        })
    }
}

#[cfg(test)]
mod tests {
    use glam::{IVec3, Vec3};

    use crate::bounds::AABB;

    use super::Ray;

    #[test]
    fn test_entry_from_outside() {
        let ray = Ray::new(Vec3::new(-5.0, 0.5, 0.5), Vec3::X, 100.0);
        let hit = ray.intersect_aabb(&AABB::new_cube(Vec3::ZERO, 2.0)).unwrap();
        assert_eq!(hit.entry, 5.0);
        assert_eq!(hit.exit, 7.0);
        assert_eq!(hit.normal, Some(IVec3::NEG_X));
    }

    #[test]
    fn test_origin_inside() {
        let ray = Ray::new(Vec3::splat(1.0), Vec3::new(0.0, -1.0, 0.0), 100.0);
        let hit = ray.intersect_aabb(&AABB::new_cube(Vec3::ZERO, 2.0)).unwrap();
        assert_eq!(hit.entry, 0.0);
        assert_eq!(hit.exit, 1.0);
        assert_eq!(hit.normal, None);
    }

    #[test]
    fn test_box_behind_is_missed() {
        let ray = Ray::new(Vec3::new(5.0, 0.5, 0.5), Vec3::X, 100.0);
        assert!(ray.intersect_aabb(&AABB::new_cube(Vec3::ZERO, 2.0)).is_none());
        // Leaving through the far face counts as behind as well
        let ray = Ray::new(Vec3::new(2.0, 0.5, 0.5), Vec3::X, 100.0);
        assert!(ray.intersect_aabb(&AABB::new_cube(Vec3::ZERO, 2.0)).is_none());
    }

    #[test]
    fn test_parallel_outside_slab() {
        let ray = Ray::new(Vec3::new(-1.0, 5.0, 0.5), Vec3::X, 100.0);
        assert!(ray.intersect_aabb(&AABB::new_cube(Vec3::ZERO, 2.0)).is_none());
    }

    #[test]
    fn test_zero_direction() {
        let ray = Ray::new(Vec3::splat(0.5), Vec3::ZERO, 10.0);
        assert_eq!(ray.direction, Vec3::ZERO);
        let hit = ray.intersect_aabb(&AABB::new_cube(Vec3::ZERO, 2.0)).unwrap();
        assert_eq!(hit.entry, 0.0);
        assert!(hit.exit.is_infinite());
    }
}
