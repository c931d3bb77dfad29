use super::OccupancyGrid;

/// Cavity fill on bit rows. Each (y, z) row of the grid is packed into u64
/// words along x, so growth along x and merging from the four neighbouring
/// rows touch 64 cells per operation. Produces the same grid as
/// [`fill_cavities_flood`](super::fill_cavities_flood).
pub fn fill_cavities(grid: &OccupancyGrid) -> OccupancyGrid {
    let size = grid.size();
    if size == 0 {
        return grid.clone();
    }
    let rows = RowSet::empty_cells(grid);
    let mut open = rows.boundary_seeds();
    let mut row = vec![0u64; rows.words];

    loop {
        let mut changed = false;
        // Alternate sweep direction so growth travels both ways each round
        for forward in [true, false] {
            for step in 0..size * size {
                let r = if forward { step } else { size * size - 1 - step };
                let (y, z) = (r % size, r / size);

                row.copy_from_slice(rows.row(&open, r));
                if y > 0 {
                    or_into(&mut row, rows.row(&open, r - 1));
                }
                if y + 1 < size {
                    or_into(&mut row, rows.row(&open, r + 1));
                }
                if z > 0 {
                    or_into(&mut row, rows.row(&open, r - size));
                }
                if z + 1 < size {
                    or_into(&mut row, rows.row(&open, r + size));
                }
                let empty = rows.row(&rows.empty, r);
                and_into(&mut row, empty);
                spread_along_row(&mut row, empty);

                let current = rows.row_mut(&mut open, r);
                if current != row.as_slice() {
                    current.copy_from_slice(&row);
                    changed = true;
                }
            }
        }
        if !changed {
            break;
        }
    }

    OccupancyGrid::build(size, |p| {
        let (x, r) = (p.x as usize, p.y as usize + size * p.z as usize);
        open[r * rows.words + x / 64] & (1 << (x % 64)) == 0
    })
}

struct RowSet {
    size: usize,
    words: usize,
    empty: Vec<u64>,
}

impl RowSet {
    fn empty_cells(grid: &OccupancyGrid) -> RowSet {
        let size = grid.size();
        let words = size.div_ceil(64);
        let mut empty = vec![0u64; size * size * words];
        for z in 0..size {
            for y in 0..size {
                let r = y + size * z;
                for x in 0..size {
                    if !grid.is_solid(x, y, z) {
                        empty[r * words + x / 64] |= 1 << (x % 64);
                    }
                }
            }
        }
        RowSet { size, words, empty }
    }

    /// Empty cells lying on the grid boundary
    fn boundary_seeds(&self) -> Vec<u64> {
        let size = self.size;
        let last = size - 1;
        let mut open = vec![0u64; self.empty.len()];
        for z in 0..size {
            for y in 0..size {
                let r = y + size * z;
                let empty = self.row(&self.empty, r);
                let seeds = self.row_mut(&mut open, r);
                if y == 0 || z == 0 || y == last || z == last {
                    seeds.copy_from_slice(empty);
                } else {
                    seeds[0] |= empty[0] & 1;
                    seeds[last / 64] |= empty[last / 64] & (1 << (last % 64));
                }
            }
        }
        open
    }

    fn row<'a>(&self, bits: &'a [u64], r: usize) -> &'a [u64] {
        &bits[r * self.words..(r + 1) * self.words]
    }

    fn row_mut<'a>(&self, bits: &'a mut [u64], r: usize) -> &'a mut [u64] {
        &mut bits[r * self.words..(r + 1) * self.words]
    }
}

fn or_into(dst: &mut [u64], src: &[u64]) {
    for (d, s) in dst.iter_mut().zip(src) {
        *d |= s;
    }
}

fn and_into(dst: &mut [u64], src: &[u64]) {
    for (d, s) in dst.iter_mut().zip(src) {
        *d &= s;
    }
}

/// Grows the set bits of `row` through adjacent bits of `empty` until no
/// further cell is reached. Bits outside `empty` are never set.
fn spread_along_row(row: &mut [u64], empty: &[u64]) {
    let words = row.len();
    loop {
        let mut changed = false;
        let mut carry_up = 0u64;
        for w in 0..words {
            let bits = row[w];
            let from_below = (bits << 1) | carry_up;
            carry_up = bits >> 63;
            let from_above = (bits >> 1) | if w + 1 < words { row[w + 1] << 63 } else { 0 };
            let grown = (bits | from_below | from_above) & empty[w];
            if grown != bits {
                row[w] = grown;
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }
}
