#![deny(missing_docs)]
//! Planar pixel-buffer and frame types with quantization metadata.
//!
//! The integer [`Plane`] and floating [`PlaneFl`] buffers carry a
//! `(floor, neutral, ceil)` quantization triple alongside their samples;
//! [`Frame`] groups channel planes under shared color metadata and
//! chroma subsampling geometry. [`range_convert_to_fl`] and
//! [`range_convert_to_int`] move samples between the two domains.

/// Color metadata tags: pixel layouts, chroma placement, color science.
pub mod color;

/// Range conversion between integer and floating quantization domains.
pub mod convert;

/// Error types for the plane module.
pub mod error;

/// Frame type grouping channel planes under shared metadata.
pub mod frame;

/// Integer-quantized plane type.
pub mod plane;

/// Floating-point plane type.
pub mod plane_fl;

/// Quantization ranges, presets and triple validation.
pub mod quantize;

pub use crate::color::{
    ChannelKind, ChromaPlacement, ColorMatrix, ColorPrim, PixelLayout, TransferChar,
};
pub use crate::convert::{range_convert_to_fl, range_convert_to_int};
pub use crate::error::PlaneError;
pub use crate::frame::Frame;
pub use crate::plane::{Plane, PlaneSize};
pub use crate::plane_fl::PlaneFl;
pub use crate::quantize::{quantize_value, QuantRange, MAX_BIT_DEPTH};
