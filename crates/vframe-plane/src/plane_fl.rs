use crate::color::TransferChar;
use crate::error::PlaneError;
use crate::plane::{Plane, PlaneSize};
use crate::quantize::validate_quant_fl;

/// A single-channel 2-D grid of floating-point samples.
///
/// The floating counterpart of [`Plane`], used as the working space for
/// filters. The quantization triple carries the same semantics in
/// floating values; chroma planes default to a symmetric range around
/// zero, non-chroma planes to `[0, range]`.
#[derive(Clone, Debug, PartialEq)]
pub struct PlaneFl {
    size: PlaneSize,
    floor: f32,
    neutral: f32,
    ceil: f32,
    transfer: TransferChar,
    data: Vec<f32>,
}

impl PlaneFl {
    /// Create a new floating plane from sample data.
    ///
    /// # Errors
    ///
    /// Returns a [`PlaneError`] if the quantization triple is
    /// inconsistent or the data length does not match the geometry.
    pub fn new(
        size: PlaneSize,
        floor: f32,
        neutral: f32,
        ceil: f32,
        transfer: TransferChar,
        data: Vec<f32>,
    ) -> Result<Self, PlaneError> {
        validate_quant_fl(floor, neutral, ceil)?;
        if data.len() != size.pixel_count() {
            return Err(PlaneError::InvalidDataLength(data.len(), size.pixel_count()));
        }
        Ok(Self {
            size,
            floor,
            neutral,
            ceil,
            transfer,
            data,
        })
    }

    /// Create a new floating plane filled with a constant value.
    ///
    /// # Errors
    ///
    /// Returns a [`PlaneError`] if the quantization triple is inconsistent.
    pub fn from_size_val(
        size: PlaneSize,
        floor: f32,
        neutral: f32,
        ceil: f32,
        transfer: TransferChar,
        val: f32,
    ) -> Result<Self, PlaneError> {
        Self::new(
            size,
            floor,
            neutral,
            ceil,
            transfer,
            vec![val; size.pixel_count()],
        )
    }

    /// Default quantization triple for a floating plane covering `range`:
    /// `[-range/2, range/2]` around zero for chroma, `[0, range]` with a
    /// zero neutral otherwise.
    pub fn default_quant(chroma: bool, range: f32) -> (f32, f32, f32) {
        if chroma {
            (-range / 2.0, 0.0, range / 2.0)
        } else {
            (0.0, 0.0, range)
        }
    }

    /// Convert an integer plane into floating working space.
    ///
    /// With `range` set, samples are rescaled into the default floating
    /// quantization for that range (respecting the source's chroma
    /// interpretation); without it, the source triple is carried over
    /// unchanged and samples are cast as-is.
    pub fn from_plane(src: &Plane, range: Option<f32>) -> Self {
        let (floor, neutral, ceil) = match range {
            Some(range) => Self::default_quant(src.is_chroma(), range),
            None => (
                f32::from(src.floor()),
                f32::from(src.neutral()),
                f32::from(src.ceil()),
            ),
        };

        // built directly: integer triples with an odd floor + ceil sum have
        // no exact floating midpoint, so the float validation cannot apply
        let mut out = Self {
            size: src.size(),
            floor,
            neutral,
            ceil,
            transfer: src.transfer(),
            data: vec![0.0; src.pixel_count()],
        };
        // size and triple are valid by construction
        let _ = crate::convert::range_convert_to_fl(&mut out, src);
        out
    }

    /// Get the size of the plane in pixels.
    pub fn size(&self) -> PlaneSize {
        self.size
    }

    /// Get the width of the plane in pixels.
    pub fn width(&self) -> usize {
        self.size.width
    }

    /// Get the height of the plane in pixels.
    pub fn height(&self) -> usize {
        self.size.height
    }

    /// Distance in samples between the starts of consecutive rows.
    pub fn stride(&self) -> usize {
        self.size.width
    }

    /// Number of samples in the plane.
    pub fn pixel_count(&self) -> usize {
        self.data.len()
    }

    /// Lowest valid sample value.
    pub fn floor(&self) -> f32 {
        self.floor
    }

    /// Neutral sample value.
    pub fn neutral(&self) -> f32 {
        self.neutral
    }

    /// Highest valid sample value.
    pub fn ceil(&self) -> f32 {
        self.ceil
    }

    /// Width of the valid sample range, `ceil - floor`.
    pub fn value_range(&self) -> f32 {
        self.ceil - self.floor
    }

    /// Transfer characteristic of the stored samples.
    pub fn transfer(&self) -> TransferChar {
        self.transfer
    }

    /// Whether the plane stores chroma samples around a neutral value.
    pub fn is_chroma(&self) -> bool {
        self.floor < self.neutral
    }

    /// Get the sample data as a slice.
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Get the sample data as a mutable slice.
    pub fn as_slice_mut(&mut self) -> &mut [f32] {
        &mut self.data
    }

    /// Resize the plane geometry.
    ///
    /// The backing storage is reallocated only when the pixel count
    /// changes; the stored samples are not reinterpreted.
    pub fn resize(&mut self, size: PlaneSize) {
        if self.size != size {
            let pixel_count = size.pixel_count();
            if self.data.len() != pixel_count {
                self.data.resize(pixel_count, 0.0);
            }
            self.size = size;
        }
    }

    /// Requantize the plane to a new quantization triple.
    ///
    /// When `scale` is set and the triple changes, samples are affinely
    /// rescaled (no rounding bias in the floating domain); `clip` clamps
    /// them to the new `[floor, ceil]`. The stored triple is always
    /// updated.
    ///
    /// # Errors
    ///
    /// Returns a [`PlaneError`] if the new triple is inconsistent.
    pub fn requantize(
        &mut self,
        floor: f32,
        neutral: f32,
        ceil: f32,
        scale: bool,
        clip: bool,
    ) -> Result<(), PlaneError> {
        validate_quant_fl(floor, neutral, ceil)?;

        if scale
            && !self.data.is_empty()
            && (self.floor != floor || self.neutral != neutral || self.ceil != ceil)
        {
            let gain = (ceil - floor) / self.value_range();
            let offset = neutral - self.neutral * gain;

            if clip {
                for x in &mut self.data {
                    *x = (*x * gain + offset).clamp(floor, ceil);
                }
            } else {
                for x in &mut self.data {
                    *x = *x * gain + offset;
                }
            }
        }

        self.floor = floor;
        self.neutral = neutral;
        self.ceil = ceil;

        Ok(())
    }

    /// Threshold `src` into this plane's `{floor, ceil}` values using
    /// absolute sample thresholds.
    ///
    /// # Errors
    ///
    /// Returns a [`PlaneError`] if the plane sizes differ.
    pub fn binarize(&mut self, src: &PlaneFl, lower: f32, upper: f32) -> Result<(), PlaneError> {
        if self.size != src.size {
            return Err(PlaneError::SizeMismatch(
                self.size.width,
                self.size.height,
                src.size.width,
                src.size.height,
            ));
        }

        let range = f64::from(src.value_range());
        let lower_thr = (f64::from(lower) - f64::from(src.floor)) / range;
        let upper_thr = (f64::from(upper) - f64::from(src.floor)) / range;
        let (floor, ceil) = (self.floor, self.ceil);

        if upper_thr <= lower_thr || lower_thr >= 1.0 || upper_thr < 0.0 {
            self.data.fill(floor);
        } else if lower_thr < 0.0 {
            if upper_thr >= 1.0 {
                self.data.fill(ceil);
            } else {
                for (d, &s) in self.data.iter_mut().zip(src.data.iter()) {
                    *d = if s <= upper { ceil } else { floor };
                }
            }
        } else if upper_thr >= 1.0 {
            for (d, &s) in self.data.iter_mut().zip(src.data.iter()) {
                *d = if s > lower { ceil } else { floor };
            }
        } else {
            for (d, &s) in self.data.iter_mut().zip(src.data.iter()) {
                *d = if s > lower && s <= upper { ceil } else { floor };
            }
        }

        Ok(())
    }

    /// Threshold `src` using thresholds given as ratios of its value range.
    ///
    /// # Errors
    ///
    /// Returns a [`PlaneError`] if the plane sizes differ.
    pub fn binarize_ratio(
        &mut self,
        src: &PlaneFl,
        lower_thr: f64,
        upper_thr: f64,
    ) -> Result<(), PlaneError> {
        let range = f64::from(src.value_range());
        let lower = (lower_thr * range + f64::from(src.floor)) as f32;
        let upper = (upper_thr * range + f64::from(src.floor)) as f32;
        self.binarize(src, lower, upper)
    }

    /// Smallest sample value, or `None` for an empty plane.
    pub fn min(&self) -> Option<f32> {
        self.data.iter().copied().reduce(f32::min)
    }

    /// Largest sample value, or `None` for an empty plane.
    pub fn max(&self) -> Option<f32> {
        self.data.iter().copied().reduce(f32::max)
    }

    /// Mean of all samples, accumulated at 64-bit width.
    ///
    /// Returns NaN for an empty plane.
    pub fn mean(&self) -> f64 {
        let sum: f64 = self.data.iter().map(|&x| f64::from(x)).sum();
        sum / self.data.len() as f64
    }

    /// Variance of all samples around the given mean.
    ///
    /// Returns NaN for an empty plane.
    pub fn variance(&self, mean: f64) -> f64 {
        let sum: f64 = self
            .data
            .iter()
            .map(|&x| {
                let diff = f64::from(x) - mean;
                diff * diff
            })
            .sum();
        sum / self.data.len() as f64
    }
}
