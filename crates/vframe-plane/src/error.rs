/// An error type for the plane module.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum PlaneError {
    /// Error when the bit depth is outside the supported range.
    #[error("bit depth {0} is invalid, supported depths are 1 to 16")]
    InvalidBitDepth(u32),

    /// Error when the quantization ceiling does not exceed the floor.
    #[error("invalid quantization range: floor {0} must be below ceil {1}")]
    InvalidRange(f64, f64),

    /// Error when the quantization range does not fit the bit depth.
    #[error("quantization range {0} exceeds the {1}-bit limit")]
    RangeOverflow(u32, u32),

    /// Error when the neutral value is neither the floor nor the range midpoint.
    #[error("invalid neutral {1} for quantization range [{0}, {2}]")]
    InvalidNeutral(f64, f64, f64),

    /// Error when the sample data length does not match the plane geometry.
    #[error("data length ({0}) does not match the plane size ({1})")]
    InvalidDataLength(usize, usize),

    /// Error when two planes are required to share the same dimensions.
    #[error("plane size mismatch: {0}x{1} vs {2}x{3}")]
    SizeMismatch(usize, usize, usize, usize),
}
