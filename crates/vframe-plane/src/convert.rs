//! Range conversion between integer and floating quantization domains.
//!
//! These are the only conversions the filter engines need: samples are
//! affinely rescaled from the source triple into the destination's
//! existing triple, anchored at the neutral values so chroma planes keep
//! their center. Composing the two directions at identical bit depth and
//! range round-trips within one integer step.

use crate::error::PlaneError;
use crate::plane::Plane;
use crate::plane_fl::PlaneFl;

/// Rescale integer samples into the destination's floating domain.
///
/// The destination keeps its own geometry and quantization triple; only
/// its samples are overwritten.
///
/// # Arguments
///
/// * `dst` - The destination floating plane.
/// * `src` - The source integer plane.
///
/// # Errors
///
/// Returns a [`PlaneError`] if the plane sizes differ.
///
/// # Examples
///
/// ```
/// use vframe_plane::{range_convert_to_fl, Plane, PlaneFl, PlaneSize, TransferChar};
///
/// let size = PlaneSize { width: 2, height: 1 };
/// let src = Plane::new(size, 8, 0, 0, 255, TransferChar::Bt709, vec![0, 255]).unwrap();
/// let mut dst = PlaneFl::from_size_val(size, 0.0, 0.0, 1.0, TransferChar::Bt709, 0.0).unwrap();
///
/// range_convert_to_fl(&mut dst, &src).unwrap();
/// assert_eq!(dst.as_slice(), &[0.0, 1.0]);
/// ```
pub fn range_convert_to_fl(dst: &mut PlaneFl, src: &Plane) -> Result<(), PlaneError> {
    if dst.size() != src.size() {
        return Err(PlaneError::SizeMismatch(
            dst.width(),
            dst.height(),
            src.width(),
            src.height(),
        ));
    }

    let gain = f64::from(dst.value_range()) / f64::from(src.value_range());
    let offset = f64::from(dst.neutral()) - f64::from(src.neutral()) * gain;

    for (d, &s) in dst.as_slice_mut().iter_mut().zip(src.as_slice()) {
        *d = (f64::from(s) * gain + offset) as f32;
    }

    Ok(())
}

/// Rescale floating samples into the destination's integer domain.
///
/// Samples are rounded to the nearest integer and clamped to the
/// destination's `[floor, ceil]`.
///
/// # Arguments
///
/// * `dst` - The destination integer plane.
/// * `src` - The source floating plane.
///
/// # Errors
///
/// Returns a [`PlaneError`] if the plane sizes differ.
pub fn range_convert_to_int(dst: &mut Plane, src: &PlaneFl) -> Result<(), PlaneError> {
    if dst.size() != src.size() {
        return Err(PlaneError::SizeMismatch(
            dst.width(),
            dst.height(),
            src.width(),
            src.height(),
        ));
    }

    let gain = f64::from(dst.value_range()) / f64::from(src.value_range());
    let offset = f64::from(dst.neutral()) - f64::from(src.neutral()) * gain;
    let lo = f64::from(dst.floor());
    let hi = f64::from(dst.ceil());

    for (d, &s) in dst.as_slice_mut().iter_mut().zip(src.as_slice()) {
        *d = (f64::from(s) * gain + offset).clamp(lo, hi).round() as u16;
    }

    Ok(())
}

impl Plane {
    /// Create an integer plane by rescaling a floating plane into the
    /// given quantization triple.
    ///
    /// # Errors
    ///
    /// Returns a [`PlaneError`] if the triple is inconsistent with the
    /// bit depth.
    pub fn from_fl(
        src: &PlaneFl,
        bit_depth: u32,
        floor: u16,
        neutral: u16,
        ceil: u16,
    ) -> Result<Self, PlaneError> {
        let mut dst = Plane::from_size_val(
            src.size(),
            bit_depth,
            floor,
            neutral,
            ceil,
            src.transfer(),
            floor,
        )?;
        range_convert_to_int(&mut dst, src)?;
        Ok(dst)
    }
}
