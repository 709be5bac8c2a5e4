use crate::error::PlaneError;

/// Maximum bit depth of an integer plane.
pub const MAX_BIT_DEPTH: u32 = 16;

/// Quantization range of stored samples.
///
/// Studio (TV) swing reserves headroom and footroom around the nominal
/// range; full (PC) swing uses the whole bit-depth range.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QuantRange {
    /// Studio swing: luma 16..235, chroma 16..240 at 8 bits, scaled with depth.
    Tv,
    /// Full swing: 0..2^depth-1.
    Pc,
}

/// Compute the `(floor, neutral, ceil)` quantization triple for a bit
/// depth, quantization range and chroma flag.
///
/// TV-range presets scale the 8-bit nominal bounds by `1 << (depth - 8)`;
/// below 8 bits they fall back to the full-range preset.
///
/// # Examples
///
/// ```
/// use vframe_plane::quantize::{quantize_value, QuantRange};
///
/// assert_eq!(quantize_value(8, QuantRange::Tv, false).unwrap(), (16, 16, 235));
/// assert_eq!(quantize_value(8, QuantRange::Tv, true).unwrap(), (16, 128, 240));
/// assert_eq!(quantize_value(8, QuantRange::Pc, true).unwrap(), (0, 128, 255));
/// ```
pub fn quantize_value(
    bit_depth: u32,
    range: QuantRange,
    chroma: bool,
) -> Result<(u16, u16, u16), PlaneError> {
    if bit_depth == 0 || bit_depth > MAX_BIT_DEPTH {
        return Err(PlaneError::InvalidBitDepth(bit_depth));
    }

    let triple = match range {
        QuantRange::Tv if bit_depth >= 8 => {
            let shift = bit_depth - 8;
            let floor = 16u16 << shift;
            let ceil = if chroma { 240u16 << shift } else { 235u16 << shift };
            let neutral = if chroma {
                ((u32::from(floor) + u32::from(ceil) + 1) / 2) as u16
            } else {
                floor
            };
            (floor, neutral, ceil)
        }
        _ => {
            let ceil = ((1u32 << bit_depth) - 1) as u16;
            let neutral = if chroma { 1u16 << (bit_depth - 1) } else { 0 };
            (0, neutral, ceil)
        }
    };

    Ok(triple)
}

/// Validate an integer quantization triple against a bit depth.
///
/// The triple is valid when `ceil > floor`, `ceil - floor` fits the bit
/// depth, and `neutral` is either the floor or the integer midpoint
/// `(floor + ceil + 1) / 2` of the range.
pub fn validate_quant(
    bit_depth: u32,
    floor: u16,
    neutral: u16,
    ceil: u16,
) -> Result<(), PlaneError> {
    if bit_depth == 0 || bit_depth > MAX_BIT_DEPTH {
        return Err(PlaneError::InvalidBitDepth(bit_depth));
    }
    if ceil <= floor {
        return Err(PlaneError::InvalidRange(f64::from(floor), f64::from(ceil)));
    }
    let range = u32::from(ceil - floor);
    if range >= 1u32 << bit_depth {
        return Err(PlaneError::RangeOverflow(range, bit_depth));
    }
    if neutral > floor && u32::from(neutral) != (u32::from(floor) + u32::from(ceil) + 1) / 2 {
        return Err(PlaneError::InvalidNeutral(
            f64::from(floor),
            f64::from(neutral),
            f64::from(ceil),
        ));
    }
    Ok(())
}

/// Validate a floating-point quantization triple.
///
/// `neutral` must be either the floor or the exact midpoint of the range.
pub fn validate_quant_fl(floor: f32, neutral: f32, ceil: f32) -> Result<(), PlaneError> {
    if ceil <= floor {
        return Err(PlaneError::InvalidRange(f64::from(floor), f64::from(ceil)));
    }
    if neutral > floor && neutral != (floor + ceil) / 2.0 {
        return Err(PlaneError::InvalidNeutral(
            f64::from(floor),
            f64::from(neutral),
            f64::from(ceil),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tv_presets_scale_with_depth() -> Result<(), PlaneError> {
        assert_eq!(quantize_value(10, QuantRange::Tv, false)?, (64, 64, 940));
        assert_eq!(quantize_value(10, QuantRange::Tv, true)?, (64, 512, 960));
        assert_eq!(quantize_value(16, QuantRange::Tv, true)?, (4096, 32768, 61440));
        Ok(())
    }

    #[test]
    fn pc_presets_cover_full_range() -> Result<(), PlaneError> {
        assert_eq!(quantize_value(8, QuantRange::Pc, false)?, (0, 0, 255));
        assert_eq!(quantize_value(16, QuantRange::Pc, true)?, (0, 32768, 65535));
        Ok(())
    }

    #[test]
    fn tv_below_8_bits_falls_back_to_full_range() -> Result<(), PlaneError> {
        assert_eq!(quantize_value(4, QuantRange::Tv, false)?, (0, 0, 15));
        assert_eq!(quantize_value(4, QuantRange::Tv, true)?, (0, 8, 15));
        Ok(())
    }

    #[test]
    fn rejects_invalid_depths() {
        assert_eq!(
            quantize_value(0, QuantRange::Pc, false),
            Err(PlaneError::InvalidBitDepth(0))
        );
        assert_eq!(
            quantize_value(17, QuantRange::Pc, false),
            Err(PlaneError::InvalidBitDepth(17))
        );
    }

    #[test]
    fn validate_accepts_tv_luma_and_chroma() {
        assert_eq!(validate_quant(8, 16, 16, 235), Ok(()));
        // the chroma midpoint (16 + 240 + 1) / 2 is exactly 128
        assert_eq!(validate_quant(8, 16, 128, 240), Ok(()));
    }

    #[test]
    fn validate_rejects_off_midpoint_neutral() {
        // the luma midpoint is 126, not 128
        assert_eq!(
            validate_quant(8, 16, 128, 235),
            Err(PlaneError::InvalidNeutral(16.0, 128.0, 235.0))
        );
    }

    #[test]
    fn validate_rejects_range_overflow() {
        assert_eq!(
            validate_quant(8, 0, 0, 256),
            Err(PlaneError::RangeOverflow(256, 8))
        );
        // one below the limit is fine
        assert_eq!(validate_quant(8, 0, 0, 255), Ok(()));
    }

    #[test]
    fn validate_rejects_inverted_range() {
        assert_eq!(
            validate_quant(8, 200, 200, 100),
            Err(PlaneError::InvalidRange(200.0, 100.0))
        );
    }

    #[test]
    fn validate_fl_requires_exact_midpoint() {
        assert_eq!(validate_quant_fl(-0.5, 0.0, 0.5), Ok(()));
        assert_eq!(validate_quant_fl(0.0, 0.0, 1.0), Ok(()));
        assert!(validate_quant_fl(0.0, 0.4, 1.0).is_err());
        assert!(validate_quant_fl(1.0, 1.0, 0.0).is_err());
    }
}
