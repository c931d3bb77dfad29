use crate::error::{Result, VoxelError};

use super::OccupancyGrid;

/// Reduces a grid by `factor` per axis. An output cell is solid when more
/// than half of its `factor^3` input cells are solid, exactly half is empty.
pub fn downscale(grid: &OccupancyGrid, factor: usize) -> Result<OccupancyGrid> {
    validate_factor(grid.size(), factor)?;
    if factor == 1 {
        return Ok(grid.clone());
    }

    let out_size = grid.size() / factor;
    let block_volume = factor * factor * factor;
    let mut out = OccupancyGrid::zeroed(out_size);
    for oz in 0..out_size {
        for oy in 0..out_size {
            for ox in 0..out_size {
                let mut solid = 0;
                for z in oz * factor..(oz + 1) * factor {
                    for y in oy * factor..(oy + 1) * factor {
                        for x in ox * factor..(ox + 1) * factor {
                            solid += grid.is_solid(x, y, z) as usize;
                        }
                    }
                }
                if solid * 2 > block_volume {
                    out.set(ox, oy, oz, true);
                }
            }
        }
    }
    Ok(out)
}

pub fn validate_factor(size: usize, factor: usize) -> Result<()> {
    if factor == 0 {
        return Err(VoxelError::InvalidFactor(factor));
    }
    if size % factor != 0 {
        return Err(VoxelError::IndivisibleDimension { size, factor });
    }
    Ok(())
}
