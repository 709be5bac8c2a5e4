use vframe_plane::{PixelLayout, PlaneError};

/// An error type for the filter crates.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum FilterError {
    /// Error bubbled up from the plane data model.
    #[error(transparent)]
    Plane(#[from] PlaneError),

    /// Error when the block size is zero.
    #[error("block size must be at least 1, got {0}")]
    InvalidBlockSize(usize),

    /// Error when the block grid stride is zero.
    #[error("block step must be at least 1, got {0}")]
    InvalidBlockStep(usize),

    /// Error when the block-matching search stride is zero.
    #[error("matching step must be at least 1, got {0}")]
    InvalidMatchStep(usize),

    /// Error when the group size is zero.
    #[error("group size must be at least 1, got {0}")]
    InvalidGroupSize(usize),

    /// Error when the block size exceeds the plane dimensions.
    #[error("block size {0} exceeds the plane dimensions {1}x{2}")]
    BlockTooLarge(usize, usize, usize),

    /// Error when two frames are required to share the same layout.
    #[error("frame layouts differ: {0:?} vs {1:?}")]
    LayoutMismatch(PixelLayout, PixelLayout),
}
