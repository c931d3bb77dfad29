//! Level of detail preparation: chunk voxels become occupancy grids that
//! are downscaled by majority vote and optionally sealed against interior
//! cavities before meshing.

mod cavity;
mod cavity_bits;
mod downscale;
mod occupancy;
mod pipeline;

pub use cavity::fill_cavities_flood;
pub use cavity_bits::fill_cavities;
pub use downscale::downscale;
pub use occupancy::OccupancyGrid;
pub use pipeline::{LodResult, LodScheduler, generate_lod, prepare_lod, preprocess_chunks};
