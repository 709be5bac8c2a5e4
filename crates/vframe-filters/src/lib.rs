#![deny(missing_docs)]
//! Filtering engines for planar frame buffers.
//!
//! Both engines consume the floating working buffers of
//! [`vframe_plane`] and come with integer-plane and frame-level entry
//! points that handle the range conversion: a recursive (IIR) Gaussian
//! blur and a block-matching non-local-means denoiser.

/// Error types for the filter crates.
pub mod error;

/// Recursive Gaussian blur.
pub mod gaussian;

/// Non-local means denoising.
pub mod nlmeans;

pub use crate::error::FilterError;
pub use crate::gaussian::{
    gaussian_blur, gaussian_blur_fl, gaussian_blur_frame, RecursiveGaussian,
};
pub use crate::nlmeans::{NlMeans, NlMeansConfig};
