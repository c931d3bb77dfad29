use glam::{IVec3, Vec3};

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct AABB {
    pub min: Vec3,
    pub max: Vec3,
}

impl AABB {
    pub fn new(min: Vec3, max: Vec3) -> AABB {
        debug_assert!(max.x > min.x, "Invalid bounds: x axis");
        debug_assert!(max.y > min.y, "Invalid bounds: y axis");
        debug_assert!(max.z > min.z, "Invalid bounds: z axis");
        Self { min, max }
    }

    pub fn new_center(center: &Vec3, size: f32) -> AABB {
        debug_assert!(size > 0.0, "Size of BB needs to be > 0");
        let half = size / 2.0;
        Self {
            min: center - Vec3::splat(half),
            max: center + Vec3::splat(half),
        }
    }

    /// Cube spanning `min` to `min + size` on every axis
    pub fn new_cube(min: Vec3, size: f32) -> AABB {
        AABB::new(min, min + Vec3::splat(size))
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn intersects(&self, other: &AABB) -> bool {
        // For each axis, check if one box is completely to one side of the other
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
            && self.min.z <= other.max.z
            && self.max.z >= other.min.z
    }

    pub fn contains_point(&self, point: &Vec3) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }

    pub fn union(&self, other: &AABB) -> AABB {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }
}

/// Integer box with exclusive max, used for voxel index ranges
#[derive(Clone, Debug, PartialEq)]
pub struct IAabb {
    pub min: IVec3,
    pub max: IVec3,
}
impl IAabb {
    pub fn new_rect(min: IVec3, max: IVec3) -> IAabb {
        debug_assert!(max.x > min.x, "Invalid bounds: x axis");
        debug_assert!(max.y > min.y, "Invalid bounds: y axis");
        debug_assert!(max.z > min.z, "Invalid bounds: z axis");
        Self { min, max }
    }

    // Returns Some(IAabb) if valid min and max values provided.
    // Returns none if area of BB would be <= 0
    pub fn try_new_rect(min: IVec3, max: IVec3) -> Option<IAabb> {
        if max.x <= min.x || max.y <= min.y || max.z <= min.z {
            return None;
        }
        Some(IAabb::new_rect(min, max))
    }

    pub fn new(min: &IVec3, size: usize) -> IAabb {
        debug_assert!(size > 0, "Size of BB needs to be > 0");
        let max = min + IVec3::ONE * size as i32;
        Self { min: *min, max }
    }

    /// Smallest integer box holding every cell the float box touches,
    /// including cells it only touches on their lower face.
    pub fn covering(other: &AABB) -> IAabb {
        IAabb::new_rect(
            other.min.floor().as_ivec3(),
            other.max.floor().as_ivec3() + IVec3::ONE,
        )
    }

    pub fn intersection(&self, other: &IAabb) -> Option<IAabb> {
        IAabb::try_new_rect(self.min.max(other.min), self.max.min(other.max))
    }

    pub fn iter_cells(&self) -> impl Iterator<Item = IVec3> + '_ {
        // x outermost, z innermost
        (self.min.x..self.max.x).flat_map(move |x| {
            (self.min.y..self.max.y)
                .flat_map(move |y| (self.min.z..self.max.z).map(move |z| IVec3::new(x, y, z)))
        })
    }
}

#[cfg(test)]
mod tests {
    use glam::{IVec3, Vec3};

    use super::{AABB, IAabb};

    #[test]
    fn test_intersection_true() {
        let a = AABB::new_center(&Vec3::ZERO, 1.0);
        let b = AABB::new_center(&Vec3::ONE, 1.0);
        assert!(a.intersects(&b));
    }

    #[test]
    fn test_intersection_close_but_false() {
        let a = AABB::new_center(&Vec3::ZERO, 1.0);
        let b = AABB::new_center(&Vec3::ONE, 0.9);
        assert!(!a.intersects(&b));
    }

    #[test]
    fn test_union_and_center() {
        let a = AABB::new_cube(Vec3::ZERO, 1.0);
        let b = AABB::new_cube(Vec3::new(3.0, 0.0, 0.0), 1.0);
        let u = a.union(&b);
        assert_eq!(u.min, Vec3::ZERO);
        assert_eq!(u.max, Vec3::new(4.0, 1.0, 1.0));
        assert_eq!(u.center(), Vec3::new(2.0, 0.5, 0.5));
        assert!(u.contains_point(&Vec3::new(4.0, 1.0, 1.0)));
        assert!(!u.contains_point(&Vec3::new(4.1, 1.0, 1.0)));
    }

    #[test]
    fn test_covering_includes_touched_cells() {
        let bb = AABB::new(Vec3::new(0.5, 0.5, 0.5), Vec3::new(2.0, 1.5, 1.0));
        let cells = IAabb::covering(&bb);
        assert_eq!(cells.min, IVec3::ZERO);
        assert_eq!(cells.max, IVec3::new(3, 2, 2));
    }

    #[test]
    fn test_integer_intersection() {
        let a = IAabb::new(&IVec3::ZERO, 4);
        let b = IAabb::new_rect(IVec3::new(-2, 2, 3), IVec3::new(1, 10, 10));
        let overlap = a.intersection(&b).unwrap();
        assert_eq!(overlap.min, IVec3::new(0, 2, 3));
        assert_eq!(overlap.max, IVec3::new(1, 4, 4));
        assert_eq!(overlap.iter_cells().count(), 2);

        let far = IAabb::new(&IVec3::splat(10), 2);
        assert!(a.intersection(&far).is_none());
    }
}
