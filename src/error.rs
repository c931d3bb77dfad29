use thiserror::Error;

/// Errors raised at the boundary of the voxel engine.
#[derive(Debug, Error)]
pub enum VoxelError {
    #[error("voxel coordinate ({x}, {y}, {z}) is outside a grid of edge {edge}")]
    Bounds { x: i32, y: i32, z: i32, edge: usize },

    #[error("grid edge {size} is not divisible by downscale factor {factor}")]
    IndivisibleDimension { size: usize, factor: usize },

    #[error("downscale factor must be at least 1, got {0}")]
    InvalidFactor(usize),

    #[error("{len} cells do not form a cubic grid of edge {edge}")]
    NonCubic { edge: usize, len: usize },

    #[error("failed to parse engine config: {0}")]
    Config(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl VoxelError {
    /// True for the grid shape family of errors (bad factor, bad edge, bad length).
    pub fn is_dimension_error(&self) -> bool {
        matches!(
            self,
            VoxelError::IndivisibleDimension { .. }
                | VoxelError::InvalidFactor(_)
                | VoxelError::NonCubic { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, VoxelError>;
