use crate::color::{transfer_char_default, TransferChar};
use crate::error::PlaneError;
use crate::quantize::{quantize_value, validate_quant, QuantRange};

/// Plane size in pixels.
///
/// # Examples
///
/// ```
/// use vframe_plane::PlaneSize;
///
/// let size = PlaneSize {
///     width: 10,
///     height: 20,
/// };
///
/// assert_eq!(size.width, 10);
/// assert_eq!(size.height, 20);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlaneSize {
    /// Width of the plane in pixels.
    pub width: usize,
    /// Height of the plane in pixels.
    pub height: usize,
}

impl PlaneSize {
    /// Number of samples held by a plane of this size.
    pub const fn pixel_count(&self) -> usize {
        self.width * self.height
    }
}

impl std::fmt::Display for PlaneSize {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "PlaneSize {{ width: {}, height: {} }}",
            self.width, self.height
        )
    }
}

impl From<[usize; 2]> for PlaneSize {
    fn from(size: [usize; 2]) -> Self {
        PlaneSize {
            width: size[0],
            height: size[1],
        }
    }
}

/// A single-channel 2-D grid of integer-quantized samples.
///
/// Samples are stored row-major in a contiguous buffer owned exclusively
/// by the plane. The quantization triple `(floor, neutral, ceil)` defines
/// the valid sample range and its neutral point; `neutral > floor` marks
/// the plane as chroma, with samples interpreted as signed offsets around
/// the neutral value.
///
/// Cloning deep-copies the sample buffer; moving transfers ownership.
///
/// # Examples
///
/// ```
/// use vframe_plane::{Plane, PlaneSize, TransferChar};
///
/// let plane = Plane::new(
///     PlaneSize {
///         width: 4,
///         height: 2,
///     },
///     8,
///     16,
///     16,
///     235,
///     TransferChar::Bt709,
///     vec![16u16; 8],
/// )
/// .unwrap();
///
/// assert_eq!(plane.width(), 4);
/// assert_eq!(plane.value_range(), 219);
/// assert!(!plane.is_chroma());
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Plane {
    size: PlaneSize,
    bit_depth: u32,
    floor: u16,
    neutral: u16,
    ceil: u16,
    transfer: TransferChar,
    data: Vec<u16>,
}

impl Plane {
    /// Create a new plane from sample data.
    ///
    /// # Arguments
    ///
    /// * `size` - The size of the plane in pixels.
    /// * `bit_depth` - Bits per sample, 1 to 16.
    /// * `floor` / `neutral` / `ceil` - The quantization triple.
    /// * `transfer` - Transfer characteristic of the stored samples.
    /// * `data` - The sample data, row-major, `size.pixel_count()` long.
    ///
    /// # Errors
    ///
    /// Returns a [`PlaneError`] if the quantization triple is inconsistent
    /// with the bit depth or the data length does not match the geometry.
    pub fn new(
        size: PlaneSize,
        bit_depth: u32,
        floor: u16,
        neutral: u16,
        ceil: u16,
        transfer: TransferChar,
        data: Vec<u16>,
    ) -> Result<Self, PlaneError> {
        validate_quant(bit_depth, floor, neutral, ceil)?;
        if data.len() != size.pixel_count() {
            return Err(PlaneError::InvalidDataLength(data.len(), size.pixel_count()));
        }
        Ok(Self {
            size,
            bit_depth,
            floor,
            neutral,
            ceil,
            transfer,
            data,
        })
    }

    /// Create a new plane filled with a constant value.
    ///
    /// # Errors
    ///
    /// Returns a [`PlaneError`] if the quantization triple is inconsistent
    /// with the bit depth.
    pub fn from_size_val(
        size: PlaneSize,
        bit_depth: u32,
        floor: u16,
        neutral: u16,
        ceil: u16,
        transfer: TransferChar,
        val: u16,
    ) -> Result<Self, PlaneError> {
        Self::new(
            size,
            bit_depth,
            floor,
            neutral,
            ceil,
            transfer,
            vec![val; size.pixel_count()],
        )
    }

    /// Create a full-range luma plane of the given bit depth, filled with
    /// zero and tagged with the default transfer characteristic for its
    /// geometry.
    ///
    /// # Errors
    ///
    /// Returns a [`PlaneError`] if the bit depth is unsupported.
    pub fn full_range(size: PlaneSize, bit_depth: u32) -> Result<Self, PlaneError> {
        let (floor, neutral, ceil) = quantize_value(bit_depth, QuantRange::Pc, false)?;
        let transfer = transfer_char_default(size.width, size.height, false);
        Self::from_size_val(size, bit_depth, floor, neutral, ceil, transfer, 0)
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
    ///
    /// Storage is contiguous, so the stride equals the width.
    pub fn stride(&self) -> usize {
        self.size.width
    }

    /// Number of samples in the plane.
    pub fn pixel_count(&self) -> usize {
        self.data.len()
    }

    /// Bits per sample.
    pub fn bit_depth(&self) -> u32 {
        self.bit_depth
    }

    /// Lowest valid sample value.
    pub fn floor(&self) -> u16 {
        self.floor
    }

    /// Neutral sample value; equals the floor for non-chroma planes.
    pub fn neutral(&self) -> u16 {
        self.neutral
    }

    /// Highest valid sample value.
    pub fn ceil(&self) -> u16 {
        self.ceil
    }

    /// Width of the valid sample range, `ceil - floor`.
    pub fn value_range(&self) -> u16 {
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
    pub fn as_slice(&self) -> &[u16] {
        &self.data
    }

    /// Get the sample data as a mutable slice.
    pub fn as_slice_mut(&mut self) -> &mut [u16] {
        &mut self.data
    }

    /// Resize the plane geometry.
    ///
    /// The backing storage is reallocated only when the pixel count
    /// changes; the stored samples are not reinterpreted for the new
    /// geometry.
    pub fn resize(&mut self, size: PlaneSize) {
        if self.size != size {
            let pixel_count = size.pixel_count();
            if self.data.len() != pixel_count {
                self.data.resize(pixel_count, 0);
            }
            self.size = size;
        }
    }

    /// Requantize the plane to a new bit depth and quantization triple.
    ///
    /// When `scale` is set and the triple changes, every sample is
    /// affinely rescaled from the old range into the new one with a
    /// rounding bias that avoids systematic drift on odd ranges; `clip`
    /// clamps the rescaled samples to `[floor, ceil]` before truncation.
    /// The stored triple is always updated, even when no rescale ran.
    ///
    /// # Errors
    ///
    /// Returns a [`PlaneError`] if the new triple is inconsistent with
    /// the new bit depth.
    pub fn requantize(
        &mut self,
        bit_depth: u32,
        floor: u16,
        neutral: u16,
        ceil: u16,
        scale: bool,
        clip: bool,
    ) -> Result<(), PlaneError> {
        validate_quant(bit_depth, floor, neutral, ceil)?;

        if scale
            && !self.data.is_empty()
            && (self.floor != floor || self.neutral != neutral || self.ceil != ceil)
        {
            let gain = f64::from(ceil - floor) / f64::from(self.value_range());
            let bias = if floor < neutral && (u32::from(floor) + u32::from(ceil)) % 2 == 1 {
                0.499999
            } else {
                0.5
            };
            let offset = f64::from(neutral) - f64::from(self.neutral) * gain + bias;

            if clip {
                let lo = f64::from(floor);
                let hi = f64::from(ceil);
                for x in &mut self.data {
                    *x = (f64::from(*x) * gain + offset).clamp(lo, hi) as u16;
                }
            } else {
                for x in &mut self.data {
                    *x = (f64::from(*x) * gain + offset) as u16;
                }
            }
        }

        self.bit_depth = bit_depth;
        self.floor = floor;
        self.neutral = neutral;
        self.ceil = ceil;

        Ok(())
    }

    /// Requantize to the preset triple of a bit depth and quantization
    /// range, keeping the plane's chroma interpretation.
    ///
    /// # Errors
    ///
    /// Returns a [`PlaneError`] if the bit depth is unsupported.
    pub fn requantize_range(
        &mut self,
        bit_depth: u32,
        range: QuantRange,
        scale: bool,
        clip: bool,
    ) -> Result<(), PlaneError> {
        let (floor, neutral, ceil) = quantize_value(bit_depth, range, self.is_chroma())?;
        self.requantize(bit_depth, floor, neutral, ceil, scale, clip)
    }

    /// Threshold `src` into this plane's `{floor, ceil}` values using
    /// absolute sample thresholds.
    ///
    /// A sample maps to the ceiling when it lies in `(lower, upper]`,
    /// with out-of-range thresholds degenerating as described in
    /// [`binarize_ratio`](Self::binarize_ratio).
    ///
    /// # Errors
    ///
    /// Returns a [`PlaneError`] if the plane sizes differ.
    pub fn binarize(&mut self, src: &Plane, lower: u16, upper: u16) -> Result<(), PlaneError> {
        let range = f64::from(src.value_range());
        let lower_thr = (f64::from(lower) - f64::from(src.floor)) / range;
        let upper_thr = (f64::from(upper) - f64::from(src.floor)) / range;
        self.binarize_ratio(src, lower_thr, upper_thr)
    }

    /// Threshold `src` into this plane's `{floor, ceil}` values using
    /// thresholds given as ratios of `src`'s value range.
    ///
    /// The degenerate combinations are resolved before any samples are
    /// read: an empty `(lower, upper]` interval (or `lower >= 1`, or
    /// `upper < 0`) maps everything to the floor, and an interval
    /// covering the whole range maps everything to the ceiling.
    ///
    /// # Errors
    ///
    /// Returns a [`PlaneError`] if the plane sizes differ.
    pub fn binarize_ratio(
        &mut self,
        src: &Plane,
        lower_thr: f64,
        upper_thr: f64,
    ) -> Result<(), PlaneError> {
        if self.size != src.size {
            return Err(PlaneError::SizeMismatch(
                self.size.width,
                self.size.height,
                src.size.width,
                src.size.height,
            ));
        }

        let range = f64::from(src.value_range());
        let lower_d = (lower_thr * range + 0.5) as i64 + i64::from(src.floor);
        let upper_d = (upper_thr * range + 0.5) as i64 + i64::from(src.floor);
        let (floor, ceil) = (self.floor, self.ceil);

        if upper_thr <= lower_thr || lower_thr >= 1.0 || upper_thr < 0.0 {
            self.data.fill(floor);
        } else if lower_thr < 0.0 {
            if upper_thr >= 1.0 {
                self.data.fill(ceil);
            } else {
                for (d, &s) in self.data.iter_mut().zip(src.data.iter()) {
                    *d = if i64::from(s) <= upper_d { ceil } else { floor };
                }
            }
        } else if upper_thr >= 1.0 {
            for (d, &s) in self.data.iter_mut().zip(src.data.iter()) {
                *d = if i64::from(s) > lower_d { ceil } else { floor };
            }
        } else {
            for (d, &s) in self.data.iter_mut().zip(src.data.iter()) {
                *d = if i64::from(s) > lower_d && i64::from(s) <= upper_d {
                    ceil
                } else {
                    floor
                };
            }
        }

        Ok(())
    }

    /// Smallest sample value, or `None` for an empty plane.
    pub fn min(&self) -> Option<u16> {
        self.data.iter().copied().min()
    }

    /// Largest sample value, or `None` for an empty plane.
    pub fn max(&self) -> Option<u16> {
        self.data.iter().copied().max()
    }

    /// Mean of all samples, accumulated at 64-bit width.
    ///
    /// Returns NaN for an empty plane.
    pub fn mean(&self) -> f64 {
        let sum: u64 = self.data.iter().map(|&x| u64::from(x)).sum();
        sum as f64 / self.data.len() as f64
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
