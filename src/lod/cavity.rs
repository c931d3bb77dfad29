use std::collections::VecDeque;

use bitvec::vec::BitVec;

use super::OccupancyGrid;

const NEIGHBOURS: [(i32, i32, i32); 6] = [
    (1, 0, 0),
    (-1, 0, 0),
    (0, 1, 0),
    (0, -1, 0),
    (0, 0, 1),
    (0, 0, -1),
];

/// Reference cavity fill: a breadth first search from every empty boundary
/// cell through 6-connected empty cells. Everything not reached is solid.
pub fn fill_cavities_flood(grid: &OccupancyGrid) -> OccupancyGrid {
    let size = grid.size();
    let mut open = BitVec::<usize>::repeat(false, size * size * size);
    let mut queue = VecDeque::new();

    for z in 0..size {
        for y in 0..size {
            for x in 0..size {
                let on_boundary = x == 0
                    || y == 0
                    || z == 0
                    || x == size - 1
                    || y == size - 1
                    || z == size - 1;
                if on_boundary && !grid.is_solid(x, y, z) {
                    open.set(grid.index(x, y, z), true);
                    queue.push_back((x, y, z));
                }
            }
        }
    }

    while let Some((x, y, z)) = queue.pop_front() {
        for (dx, dy, dz) in NEIGHBOURS {
            let nx = x as i32 + dx;
            let ny = y as i32 + dy;
            let nz = z as i32 + dz;
            if nx < 0 || ny < 0 || nz < 0 {
                continue;
            }
            let (nx, ny, nz) = (nx as usize, ny as usize, nz as usize);
            if nx >= size || ny >= size || nz >= size {
                continue;
            }
            let idx = grid.index(nx, ny, nz);
            if open[idx] || grid.is_solid(nx, ny, nz) {
                continue;
            }
            open.set(idx, true);
            queue.push_back((nx, ny, nz));
        }
    }

    let mut filled = OccupancyGrid::zeroed(size);
    for idx in open.iter_zeros() {
        let x = idx % size;
        let y = (idx / size) % size;
        let z = idx / (size * size);
        filled.set(x, y, z, true);
    }
    filled
}

#[cfg(test)]
mod tests {
    use crate::lod::OccupancyGrid;

    use super::fill_cavities_flood;

    /// Hollow cube shell of `size` with walls one cell thick
    fn shell(size: usize) -> OccupancyGrid {
        let last = size as i32 - 1;
        OccupancyGrid::from_fn(size, |p| {
            p.min_element() == 0 || p.max_element() == last
        }).unwrap()
    }

    #[test]
    fn test_sealed_shell_is_filled() {
        let grid = shell(6);
        let filled = fill_cavities_flood(&grid);
        assert_eq!(filled.count_solid(), 6 * 6 * 6);
    }

    #[test]
    fn test_open_shell_is_kept() {
        let mut grid = shell(6);
        // Punch a hole through one wall
        grid.set(0, 3, 3, false);
        let filled = fill_cavities_flood(&grid);
        assert_eq!(filled, grid);
    }

    #[test]
    fn test_single_enclosed_cell() {
        // (2,2,2) is walled in on all six faces
        let mut grid = OccupancyGrid::from_fn(5, |p| {
            (1..=3).contains(&p.x) && (1..=3).contains(&p.y) && (1..=3).contains(&p.z)
        }).unwrap();
        grid.set(2, 2, 2, false);
        let filled = fill_cavities_flood(&grid);
        assert!(filled.is_solid(2, 2, 2));
        assert!(!filled.is_solid(0, 0, 0));
        assert_eq!(filled.count_solid(), 27);
    }

    #[test]
    fn test_empty_grid_stays_empty() {
        let grid = OccupancyGrid::new(4).unwrap();
        assert_eq!(fill_cavities_flood(&grid).count_solid(), 0);
    }
}
