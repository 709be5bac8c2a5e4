//! Recursive Gaussian blur.
//!
//! Implementation of the recursive Gaussian algorithm from "Ian T. Young,
//! Lucas J. van Vliet - Recursive implementation of the Gaussian filter":
//! a 4-tap causal/anticausal IIR recursion whose steady-state response
//! approximates a Gaussian kernel, at a cost independent of sigma.

use rayon::prelude::*;

use vframe_plane::{range_convert_to_int, ChannelKind, Frame, Plane, PlaneError, PlaneFl};

use crate::error::FilterError;

/// Recursion coefficients of the recursive Gaussian filter.
///
/// Derived once per sigma with [`RecursiveGaussian::new`] and reused for
/// every sweep; the filter holds no other state.
#[derive(Clone, Copy, Debug)]
pub struct RecursiveGaussian {
    b: f32,
    b1: f32,
    b2: f32,
    b3: f32,
}

impl RecursiveGaussian {
    /// Derive the recursion coefficients for a Gaussian of the given sigma.
    ///
    /// Uses the Young-van Vliet closed-form approximation: `q` from sigma
    /// via a two-branch formula, polynomial coefficients `b0..b3` in `q`,
    /// then normalization so the recursion has unit DC gain.
    pub fn new(sigma: f64) -> Self {
        let q = if sigma < 2.5 {
            3.97156 - 4.14554 * (1.0 - 0.26891 * sigma).sqrt()
        } else {
            0.98711 * sigma - 0.96330
        };

        let b0 = 1.57825 + 2.44413 * q + 1.4281 * q * q + 0.422205 * q * q * q;
        let b1 = 2.44413 * q + 2.85619 * q * q + 1.26661 * q * q * q;
        let b2 = -(1.4281 * q * q + 1.26661 * q * q * q);
        let b3 = 0.422205 * q * q * q;

        log::debug!("recursive gaussian: sigma={sigma} q={q} b0={b0} b1={b1} b2={b2} b3={b3}");

        Self {
            b: (1.0 - (b1 + b2 + b3) / b0) as f32,
            b1: (b1 / b0) as f32,
            b2: (b2 / b0) as f32,
            b3: (b3 / b0) as f32,
        }
    }

    /// Run the full 2-D blur in place: vertical pass, then horizontal.
    pub fn filter(&self, data: &mut PlaneFl) {
        self.filter_v(data);
        self.filter_h(data);
    }

    /// Vertical pass: a top-to-bottom causal sweep followed by a
    /// bottom-to-top anticausal sweep over every column.
    ///
    /// History taps beyond the first and last rows are clamped to the
    /// nearest valid row (edge replication).
    pub fn filter_v(&self, data: &mut PlaneFl) {
        let width = data.width();
        let height = data.height();
        if width == 0 || height == 0 {
            return;
        }

        let (b, b1, b2, b3) = (self.b, self.b1, self.b2, self.b3);
        let buf = data.as_slice_mut();

        for j in 0..height {
            let i0 = j * width;
            let i1 = if j < 1 { i0 } else { i0 - width };
            let i2 = if j < 2 { i1 } else { i1 - width };
            let i3 = if j < 3 { i2 } else { i2 - width };

            for c in 0..width {
                let p3 = buf[i3 + c];
                let p2 = buf[i2 + c];
                let p1 = buf[i1 + c];
                let p0 = buf[i0 + c];
                buf[i0 + c] = b * p0 + b1 * p1 + b2 * p2 + b3 * p3;
            }
        }

        for j in (0..height).rev() {
            let i0 = j * width;
            let i1 = if j >= height - 1 { i0 } else { i0 + width };
            let i2 = if j >= height.saturating_sub(2) { i1 } else { i1 + width };
            let i3 = if j >= height.saturating_sub(3) { i2 } else { i2 + width };

            for c in 0..width {
                let p3 = buf[i3 + c];
                let p2 = buf[i2 + c];
                let p1 = buf[i1 + c];
                let p0 = buf[i0 + c];
                buf[i0 + c] = b * p0 + b1 * p1 + b2 * p2 + b3 * p3;
            }
        }
    }

    /// Horizontal pass: per row, a causal left-to-right sweep followed by
    /// an anticausal right-to-left sweep.
    ///
    /// The causal history is seeded from the first sample of the row, the
    /// anticausal history from the last causal output. Rows are
    /// independent and run in parallel.
    pub fn filter_h(&self, data: &mut PlaneFl) {
        let width = data.width();
        if width == 0 {
            return;
        }

        let (b, b1, b2, b3) = (self.b, self.b1, self.b2, self.b3);

        data.as_slice_mut().par_chunks_mut(width).for_each(|row| {
            let mut p1 = row[0];
            let mut p2 = p1;
            let mut p3 = p1;

            for i in 1..width {
                let p0 = b * row[i] + b1 * p1 + b2 * p2 + b3 * p3;
                p3 = p2;
                p2 = p1;
                p1 = p0;
                row[i] = p0;
            }

            p1 = row[width - 1];
            p2 = p1;
            p3 = p1;

            for i in (0..width - 1).rev() {
                let p0 = b * row[i] + b1 * p1 + b2 * p2 + b3 * p3;
                p3 = p2;
                p2 = p1;
                p1 = p0;
                row[i] = p0;
            }
        });
    }
}

/// Blur a floating plane with a recursive Gaussian of the given sigma.
///
/// `dst` keeps `src`'s quantization metadata; with `sigma <= 0` the
/// result is an identity copy of `src`.
///
/// # Errors
///
/// Returns a [`FilterError`] if the plane sizes differ.
pub fn gaussian_blur_fl(dst: &mut PlaneFl, src: &PlaneFl, sigma: f64) -> Result<(), FilterError> {
    if dst.size() != src.size() {
        return Err(PlaneError::SizeMismatch(
            dst.width(),
            dst.height(),
            src.width(),
            src.height(),
        )
        .into());
    }

    dst.clone_from(src);
    if sigma > 0.0 {
        RecursiveGaussian::new(sigma).filter(dst);
    }
    Ok(())
}

/// Blur an integer plane with a recursive Gaussian of the given sigma.
///
/// The plane is converted into floating working space at its native
/// range, filtered, and converted back into `dst`'s quantization triple.
/// With `sigma <= 0` the result is an identity copy of `src`.
///
/// # Arguments
///
/// * `dst` - The destination plane, same size as `src`.
/// * `src` - The source plane.
/// * `sigma` - Standard deviation of the Gaussian in pixels.
///
/// # Errors
///
/// Returns a [`FilterError`] if the plane sizes differ.
///
/// # Examples
///
/// ```
/// use vframe_plane::{Plane, PlaneSize};
/// use vframe_filters::gaussian::gaussian_blur;
///
/// let src = Plane::full_range(PlaneSize { width: 8, height: 8 }, 8).unwrap();
/// let mut dst = src.clone();
/// gaussian_blur(&mut dst, &src, 1.5).unwrap();
/// assert_eq!(dst, src); // blurring a constant plane changes nothing
/// ```
pub fn gaussian_blur(dst: &mut Plane, src: &Plane, sigma: f64) -> Result<(), FilterError> {
    if dst.size() != src.size() {
        return Err(PlaneError::SizeMismatch(
            dst.width(),
            dst.height(),
            src.width(),
            src.height(),
        )
        .into());
    }

    if sigma <= 0.0 {
        dst.clone_from(src);
        return Ok(());
    }

    let mut data = PlaneFl::from_plane(src, None);
    RecursiveGaussian::new(sigma).filter(&mut data);
    range_convert_to_int(dst, &data)?;
    Ok(())
}

/// Blur every color channel of a frame, reassembling it with the same
/// color metadata.
///
/// An alpha plane, when present, is copied through unchanged.
///
/// # Errors
///
/// Returns a [`FilterError`] if a channel conversion fails.
pub fn gaussian_blur_frame(src: &Frame, sigma: f64) -> Result<Frame, FilterError> {
    let mut dst = src.clone();
    if sigma <= 0.0 {
        return Ok(dst);
    }

    for (i, &kind) in src.layout().channels().iter().enumerate() {
        if kind == ChannelKind::A {
            continue;
        }
        let mut data = PlaneFl::from_plane(&src.planes()[i], None);
        RecursiveGaussian::new(sigma).filter(&mut data);
        range_convert_to_int(&mut dst.planes_mut()[i], &data)?;
    }

    Ok(dst)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};
    use vframe_plane::{PixelLayout, PlaneSize, TransferChar};

    fn noise_plane(size: PlaneSize, seed: u64) -> PlaneFl {
        let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
        let data: Vec<f32> = (0..size.pixel_count())
            .map(|_| rng.random_range(0.0..255.0))
            .collect();
        PlaneFl::new(size, 0.0, 0.0, 255.0, TransferChar::Bt709, data).unwrap()
    }

    #[test]
    fn coefficients_have_unit_dc_gain() {
        for sigma in [0.5, 1.0, 2.0, 2.5, 5.0, 20.0] {
            let g = RecursiveGaussian::new(sigma);
            let sum = g.b + g.b1 + g.b2 + g.b3;
            assert!(
                (sum - 1.0).abs() < 1e-5,
                "sigma {sigma}: coefficient sum {sum}"
            );
        }
    }

    #[test]
    fn sigma_zero_is_identity() -> Result<(), FilterError> {
        let size = PlaneSize {
            width: 9,
            height: 7,
        };
        let src = noise_plane(size, 1);
        let mut dst = PlaneFl::from_size_val(size, 0.0, 0.0, 255.0, TransferChar::Bt709, 0.0)?;
        gaussian_blur_fl(&mut dst, &src, 0.0)?;
        assert_eq!(dst, src);

        gaussian_blur_fl(&mut dst, &src, -1.5)?;
        assert_eq!(dst, src);
        Ok(())
    }

    #[test]
    fn constant_plane_is_unchanged() -> Result<(), FilterError> {
        let size = PlaneSize {
            width: 16,
            height: 11,
        };
        let src = PlaneFl::from_size_val(size, 0.0, 0.0, 255.0, TransferChar::Bt709, 100.0)?;
        let mut dst = src.clone();
        gaussian_blur_fl(&mut dst, &src, 2.0)?;
        for (i, &x) in dst.as_slice().iter().enumerate() {
            assert!(
                (x - 100.0).abs() < 0.1,
                "sample {i} drifted to {x} on a constant plane"
            );
        }
        Ok(())
    }

    #[test]
    fn integer_constant_plane_is_exact() -> Result<(), FilterError> {
        let size = PlaneSize {
            width: 12,
            height: 12,
        };
        let src = Plane::from_size_val(size, 8, 16, 16, 235, TransferChar::Bt709, 100)?;
        let mut dst = src.clone();
        gaussian_blur(&mut dst, &src, 3.0)?;
        assert_eq!(dst, src);
        Ok(())
    }

    #[test]
    fn blur_reduces_noise_variance() -> Result<(), FilterError> {
        let size = PlaneSize {
            width: 32,
            height: 32,
        };
        let src = noise_plane(size, 42);
        let src_var = src.variance(src.mean());

        let mut prev_var = src_var;
        for sigma in [0.5, 1.0, 2.0] {
            let mut dst = src.clone();
            gaussian_blur_fl(&mut dst, &src, sigma)?;
            let var = dst.variance(dst.mean());
            assert!(
                var <= prev_var,
                "sigma {sigma}: variance went up ({var} > {prev_var})"
            );
            prev_var = var;
        }
        assert!(prev_var < src_var);
        Ok(())
    }

    #[test]
    fn blur_spreads_an_impulse() -> Result<(), FilterError> {
        let size = PlaneSize {
            width: 15,
            height: 15,
        };
        let mut data = vec![0.0f32; size.pixel_count()];
        data[7 * 15 + 7] = 100.0;
        let src = PlaneFl::new(size, 0.0, 0.0, 255.0, TransferChar::Bt709, data)?;
        let mut dst = src.clone();
        gaussian_blur_fl(&mut dst, &src, 1.5)?;

        let center = dst.as_slice()[7 * 15 + 7];
        let neighbor = dst.as_slice()[7 * 15 + 8];
        assert!(center < 100.0);
        assert!(neighbor > 0.0);
        assert!(center > neighbor);
        Ok(())
    }

    #[test]
    fn rejects_size_mismatch() {
        let src = noise_plane(
            PlaneSize {
                width: 8,
                height: 8,
            },
            3,
        );
        let mut dst = PlaneFl::from_size_val(
            PlaneSize {
                width: 4,
                height: 4,
            },
            0.0,
            0.0,
            255.0,
            TransferChar::Bt709,
            0.0,
        )
        .unwrap();
        assert!(matches!(
            gaussian_blur_fl(&mut dst, &src, 1.0),
            Err(FilterError::Plane(PlaneError::SizeMismatch(4, 4, 8, 8)))
        ));
    }

    #[test]
    fn frame_blur_keeps_metadata_and_alpha() -> Result<(), FilterError> {
        let frame = Frame::new(
            2,
            PixelLayout::Yuva444,
            PlaneSize {
                width: 16,
                height: 16,
            },
            8,
        )?;
        let out = gaussian_blur_frame(&frame, 1.5)?;
        assert_eq!(out.frame_num(), 2);
        assert_eq!(out.layout(), frame.layout());
        // freshly constructed planes are constant, so the blur is exact
        assert_eq!(out, frame);
        Ok(())
    }
}
