pub mod bounds;
pub mod collision;
pub mod config;
pub mod error;
pub mod lod;
pub mod voxels;
pub mod world;

pub use error::{Result, VoxelError};
