//! Non-local means denoising based on block matching and weighted
//! averaging of grouped blocks.
//!
//! The reference buffer is tiled into overlapping blocks; each block is
//! matched against its neighborhood by MSE, the best matches form a
//! group, and the target samples at the group positions are averaged
//! with weights that fall off with dissimilarity. Overlapping block
//! estimates are blended through a per-pixel running sum and weight
//! accumulator.

mod block;

pub use block::BlockMatch;

use rayon::prelude::*;

use vframe_plane::{
    range_convert_to_int, ChannelKind, Frame, Plane, PlaneError, PlaneFl, PlaneSize,
};

use crate::error::FilterError;

use block::{grid_positions, match_blocks};

/// Configuration of the NLMeans engine.
///
/// `strength` and `th_mse` default to multiples of `sigma` that depend
/// on whether the correction aggregator is enabled; construct through
/// [`NlMeansConfig::with_sigma`] to keep them consistent after changing
/// the noise level.
#[derive(Clone, Debug, PartialEq)]
pub struct NlMeansConfig {
    /// Select the variance-correcting aggregator.
    pub correction: bool,
    /// Noise standard deviation estimate, in sample units.
    pub sigma: f64,
    /// Filtering strength `h` controlling the weight decay.
    pub strength: f64,
    /// Side length of the square matching blocks.
    pub block_size: usize,
    /// Stride of the reference block grid.
    pub block_step: usize,
    /// Maximum number of blocks aggregated per group, the reference
    /// block included.
    pub group_size: usize,
    /// Search radius around each reference block, in pixels.
    pub bm_range: usize,
    /// Stride of the search grid within the radius.
    pub bm_step: usize,
    /// Similarity cutoff: candidates above this MSE never join a group.
    pub th_mse: f64,
}

impl Default for NlMeansConfig {
    fn default() -> Self {
        Self::with_sigma(8.0, true)
    }
}

impl NlMeansConfig {
    /// Configuration for a noise level, deriving `strength` and `th_mse`
    /// from `sigma`.
    pub fn with_sigma(sigma: f64, correction: bool) -> Self {
        Self {
            correction,
            sigma,
            strength: if correction { sigma * 5.0 } else { sigma * 1.5 },
            block_size: 8,
            block_step: 5,
            group_size: 16,
            bm_range: 24,
            bm_step: 3,
            th_mse: if correction { sigma * 50.0 } else { sigma * 25.0 },
        }
    }

    fn validate(&self, size: PlaneSize) -> Result<(), FilterError> {
        if self.block_size < 1 {
            return Err(FilterError::InvalidBlockSize(self.block_size));
        }
        if self.block_step < 1 {
            return Err(FilterError::InvalidBlockStep(self.block_step));
        }
        if self.bm_step < 1 {
            return Err(FilterError::InvalidMatchStep(self.bm_step));
        }
        if self.group_size < 1 {
            return Err(FilterError::InvalidGroupSize(self.group_size));
        }
        if self.block_size > size.width || self.block_size > size.height {
            return Err(FilterError::BlockTooLarge(
                self.block_size,
                size.width,
                size.height,
            ));
        }
        Ok(())
    }
}

/// Non-local means denoiser.
///
/// Holds only its configuration; every call is an independent, pure
/// computation over its inputs.
///
/// # Examples
///
/// ```
/// use vframe_plane::{Plane, PlaneSize};
/// use vframe_filters::nlmeans::{NlMeans, NlMeansConfig};
///
/// let src = Plane::full_range(PlaneSize { width: 16, height: 16 }, 8).unwrap();
/// let mut dst = src.clone();
///
/// let filter = NlMeans::new(NlMeansConfig::with_sigma(8.0, false));
/// filter.denoise(&mut dst, &src, &src).unwrap();
/// assert_eq!(dst, src); // a constant plane is a fixed point
/// ```
pub struct NlMeans {
    config: NlMeansConfig,
}

impl NlMeans {
    /// Create a denoiser from a configuration.
    pub fn new(config: NlMeansConfig) -> Self {
        Self { config }
    }

    /// The engine configuration.
    pub fn config(&self) -> &NlMeansConfig {
        &self.config
    }

    /// Denoise a floating plane.
    ///
    /// Block matching runs on `reference`, aggregation reads `src` (the
    /// target); pass the same plane twice when no external reference
    /// exists. `dst` takes `src`'s quantization metadata.
    ///
    /// # Errors
    ///
    /// Returns a [`FilterError`] when the configuration is invalid or
    /// the planes disagree in size.
    pub fn denoise_fl(
        &self,
        dst: &mut PlaneFl,
        src: &PlaneFl,
        reference: &PlaneFl,
    ) -> Result<(), FilterError> {
        if src.size() != reference.size() {
            return Err(PlaneError::SizeMismatch(
                src.width(),
                src.height(),
                reference.width(),
                reference.height(),
            )
            .into());
        }
        if dst.size() != src.size() {
            return Err(PlaneError::SizeMismatch(
                dst.width(),
                dst.height(),
                src.width(),
                src.height(),
            )
            .into());
        }
        self.config.validate(src.size())?;

        log::debug!(
            "nlmeans: {}x{} block={} step={} group={} range={} th_mse={}",
            src.width(),
            src.height(),
            self.config.block_size,
            self.config.block_step,
            self.config.group_size,
            self.config.bm_range,
            self.config.th_mse
        );

        // identity fallback for any pixel no block contributes to
        dst.clone_from(src);

        let width = src.width();
        let height = src.height();
        let block = self.config.block_size;
        let pixel_count = width * height;

        let row_starts = grid_positions(height, block, self.config.block_step);
        let col_starts = grid_positions(width, block, self.config.block_step);
        let positions: Vec<(usize, usize)> = row_starts
            .iter()
            .flat_map(|&row| col_starts.iter().map(move |&col| (row, col)))
            .collect();

        let src_data = src.as_slice();
        let ref_data = reference.as_slice();
        let config = &self.config;

        let (sums, weights) = positions
            .par_iter()
            .fold(
                || (vec![0.0f64; pixel_count], vec![0.0f64; pixel_count]),
                |(mut sums, mut weights), &pos| {
                    let group = match_blocks(ref_data, width, height, pos, config);
                    let estimate = if config.correction {
                        aggregate_correction(src_data, width, pos, &group, config)
                    } else {
                        aggregate_mean(src_data, width, &group, config)
                    };

                    for dy in 0..block {
                        let row = (pos.0 + dy) * width + pos.1;
                        for dx in 0..block {
                            sums[row + dx] += estimate[dy * block + dx];
                            weights[row + dx] += 1.0;
                        }
                    }
                    (sums, weights)
                },
            )
            .reduce(
                || (vec![0.0f64; pixel_count], vec![0.0f64; pixel_count]),
                |(mut sums_a, mut weights_a), (sums_b, weights_b)| {
                    for (a, b) in sums_a.iter_mut().zip(sums_b) {
                        *a += b;
                    }
                    for (a, b) in weights_a.iter_mut().zip(weights_b) {
                        *a += b;
                    }
                    (sums_a, weights_a)
                },
            );

        for (i, out) in dst.as_slice_mut().iter_mut().enumerate() {
            if weights[i] > 0.0 {
                *out = (sums[i] / weights[i]) as f32;
            }
        }

        Ok(())
    }

    /// Denoise an integer plane through floating working space.
    ///
    /// Both planes are converted at their native ranges, filtered, and
    /// the result is rescaled into `dst`'s quantization triple.
    ///
    /// # Errors
    ///
    /// Returns a [`FilterError`] when the configuration is invalid or
    /// the planes disagree in size.
    pub fn denoise(
        &self,
        dst: &mut Plane,
        src: &Plane,
        reference: &Plane,
    ) -> Result<(), FilterError> {
        if dst.size() != src.size() {
            return Err(PlaneError::SizeMismatch(
                dst.width(),
                dst.height(),
                src.width(),
                src.height(),
            )
            .into());
        }

        let src_fl = PlaneFl::from_plane(src, None);
        let ref_fl = PlaneFl::from_plane(reference, None);
        let mut out = src_fl.clone();
        self.denoise_fl(&mut out, &src_fl, &ref_fl)?;
        range_convert_to_int(dst, &out)?;
        Ok(())
    }

    /// Denoise every color channel of a frame, reassembling it with the
    /// same color metadata.
    ///
    /// `reference` defaults to the source frame; an alpha plane, when
    /// present, is copied through unchanged.
    ///
    /// # Errors
    ///
    /// Returns a [`FilterError`] when the configuration is invalid, the
    /// layouts differ, or a channel disagrees in size.
    pub fn process_frame(
        &self,
        src: &Frame,
        reference: Option<&Frame>,
    ) -> Result<Frame, FilterError> {
        let reference = reference.unwrap_or(src);
        if reference.layout() != src.layout() {
            return Err(FilterError::LayoutMismatch(
                src.layout(),
                reference.layout(),
            ));
        }

        let mut dst = src.clone();
        for (i, &kind) in src.layout().channels().iter().enumerate() {
            if kind == ChannelKind::A {
                continue;
            }
            self.denoise(
                &mut dst.planes_mut()[i],
                &src.planes()[i],
                &reference.planes()[i],
            )?;
        }
        Ok(dst)
    }
}

/// Normalized weights for a group: exponential decay in the member MSE
/// with rate `strength^2`.
fn group_weights(group: &[BlockMatch], strength: f64) -> Vec<f64> {
    let h2 = strength * strength;
    let mut weights: Vec<f64> = group
        .iter()
        .map(|m| {
            if h2 > 0.0 {
                (-m.mse / h2).exp()
            } else if m.mse == 0.0 {
                1.0
            } else {
                0.0
            }
        })
        .collect();

    let total: f64 = weights.iter().sum();
    for w in &mut weights {
        *w /= total;
    }
    weights
}

/// Weighted average of the target blocks at the group positions.
fn aggregate_mean(
    target: &[f32],
    width: usize,
    group: &[BlockMatch],
    config: &NlMeansConfig,
) -> Vec<f64> {
    let block = config.block_size;
    let weights = group_weights(group, config.strength);

    let mut estimate = vec![0.0f64; block * block];
    for (m, &w) in group.iter().zip(weights.iter()) {
        for dy in 0..block {
            let row = (m.row + dy) * width + m.col;
            for dx in 0..block {
                estimate[dy * block + dx] += w * f64::from(target[row + dx]);
            }
        }
    }
    estimate
}

/// Weighted average with a variance-based correction against
/// over-smoothing.
///
/// Per pixel, the weighted mean `m` and weighted variance `s` of the
/// group samples are computed from the same weights as the plain
/// aggregator; when `s` exceeds `sigma^2` the excess spread is treated
/// as signal the average removed, and the estimate is pulled back toward
/// the raw center-block value `c`:
///
/// `est = m + max(0, 1 - sigma^2 / s) * (c - m)`
fn aggregate_correction(
    target: &[f32],
    width: usize,
    center: (usize, usize),
    group: &[BlockMatch],
    config: &NlMeansConfig,
) -> Vec<f64> {
    let block = config.block_size;
    let weights = group_weights(group, config.strength);

    let mut mean = vec![0.0f64; block * block];
    let mut moment2 = vec![0.0f64; block * block];
    for (m, &w) in group.iter().zip(weights.iter()) {
        for dy in 0..block {
            let row = (m.row + dy) * width + m.col;
            for dx in 0..block {
                let x = f64::from(target[row + dx]);
                mean[dy * block + dx] += w * x;
                moment2[dy * block + dx] += w * x * x;
            }
        }
    }

    let sigma2 = config.sigma * config.sigma;
    let mut estimate = vec![0.0f64; block * block];
    for dy in 0..block {
        let center_row = (center.0 + dy) * width + center.1;
        for dx in 0..block {
            let i = dy * block + dx;
            let c = f64::from(target[center_row + dx]);
            let variance = (moment2[i] - mean[i] * mean[i]).max(0.0);
            let shrink = if variance > sigma2 {
                1.0 - sigma2 / variance
            } else {
                0.0
            };
            estimate[i] = mean[i] + shrink * (c - mean[i]);
        }
    }
    estimate
}

#[cfg(test)]
mod tests {
    use super::*;
    use vframe_plane::{PixelLayout, TransferChar};

    fn full_range_plane(size: PlaneSize, data: Vec<u16>) -> Plane {
        Plane::new(size, 8, 0, 0, 255, TransferChar::Bt709, data).unwrap()
    }

    #[test]
    fn default_config_matches_documented_values() {
        let config = NlMeansConfig::default();
        assert!(config.correction);
        assert_eq!(config.sigma, 8.0);
        assert_eq!(config.strength, 40.0);
        assert_eq!(config.block_size, 8);
        assert_eq!(config.block_step, 5);
        assert_eq!(config.group_size, 16);
        assert_eq!(config.bm_range, 24);
        assert_eq!(config.bm_step, 3);
        assert_eq!(config.th_mse, 400.0);

        let plain = NlMeansConfig::with_sigma(8.0, false);
        assert_eq!(plain.strength, 12.0);
        assert_eq!(plain.th_mse, 200.0);
    }

    #[test]
    fn constant_plane_is_a_fixed_point() -> Result<(), FilterError> {
        let size = PlaneSize {
            width: 16,
            height: 16,
        };
        let src = full_range_plane(size, vec![100; size.pixel_count()]);
        let mut dst = src.clone();

        let config = NlMeansConfig {
            correction: false,
            sigma: 8.0,
            strength: 12.0,
            block_size: 8,
            block_step: 5,
            group_size: 16,
            bm_range: 24,
            bm_step: 3,
            th_mse: 200.0,
        };
        NlMeans::new(config).denoise(&mut dst, &src, &src)?;
        assert_eq!(dst.as_slice(), src.as_slice());
        Ok(())
    }

    #[test]
    fn constant_plane_is_a_fixed_point_with_correction() -> Result<(), FilterError> {
        let size = PlaneSize {
            width: 16,
            height: 16,
        };
        let src = full_range_plane(size, vec![100; size.pixel_count()]);
        let mut dst = src.clone();
        NlMeans::new(NlMeansConfig::default()).denoise(&mut dst, &src, &src)?;
        assert_eq!(dst.as_slice(), src.as_slice());
        Ok(())
    }

    #[test]
    fn singleton_group_is_identity() -> Result<(), FilterError> {
        let size = PlaneSize {
            width: 16,
            height: 16,
        };
        let data: Vec<u16> = (0..size.pixel_count()).map(|i| ((i * 37) % 256) as u16).collect();
        let src = full_range_plane(size, data);
        let mut dst = src.clone();

        let config = NlMeansConfig {
            group_size: 1,
            ..NlMeansConfig::with_sigma(8.0, false)
        };
        NlMeans::new(config).denoise(&mut dst, &src, &src)?;
        assert_eq!(dst.as_slice(), src.as_slice());
        Ok(())
    }

    #[test]
    fn negative_threshold_is_identity() -> Result<(), FilterError> {
        let size = PlaneSize {
            width: 12,
            height: 12,
        };
        let data: Vec<u16> = (0..size.pixel_count()).map(|i| ((i * 11) % 200) as u16).collect();
        let src = full_range_plane(size, data);
        let mut dst = src.clone();

        let config = NlMeansConfig {
            th_mse: -1.0,
            ..NlMeansConfig::with_sigma(8.0, true)
        };
        NlMeans::new(config).denoise(&mut dst, &src, &src)?;
        assert_eq!(dst.as_slice(), src.as_slice());
        Ok(())
    }

    #[test]
    fn denoising_pulls_an_outlier_toward_its_peers() -> Result<(), FilterError> {
        let size = PlaneSize {
            width: 16,
            height: 16,
        };
        // flat field with a single lightly corrupted sample
        let mut data = vec![100u16; size.pixel_count()];
        data[5 * 16 + 5] = 110;
        let src = full_range_plane(size, data);
        let mut dst = src.clone();

        let config = NlMeansConfig {
            block_step: 2,
            ..NlMeansConfig::with_sigma(8.0, false)
        };
        NlMeans::new(config).denoise(&mut dst, &src, &src)?;

        let out = dst.as_slice()[5 * 16 + 5];
        assert!(out < 110, "outlier was not attenuated: {out}");
        assert!(out >= 100);
        Ok(())
    }

    #[test]
    fn validation_rejects_degenerate_parameters() {
        let size = PlaneSize {
            width: 16,
            height: 16,
        };
        let src = full_range_plane(size, vec![0; size.pixel_count()]);
        let mut dst = src.clone();

        let zero_block = NlMeansConfig {
            block_size: 0,
            ..NlMeansConfig::default()
        };
        assert_eq!(
            NlMeans::new(zero_block).denoise(&mut dst, &src, &src),
            Err(FilterError::InvalidBlockSize(0))
        );

        let zero_group = NlMeansConfig {
            group_size: 0,
            ..NlMeansConfig::default()
        };
        assert_eq!(
            NlMeans::new(zero_group).denoise(&mut dst, &src, &src),
            Err(FilterError::InvalidGroupSize(0))
        );

        let oversized = NlMeansConfig {
            block_size: 32,
            ..NlMeansConfig::default()
        };
        assert_eq!(
            NlMeans::new(oversized).denoise(&mut dst, &src, &src),
            Err(FilterError::BlockTooLarge(32, 16, 16))
        );
    }

    #[test]
    fn rejects_reference_size_mismatch() {
        let src = full_range_plane(
            PlaneSize {
                width: 16,
                height: 16,
            },
            vec![0; 256],
        );
        let reference = full_range_plane(
            PlaneSize {
                width: 8,
                height: 8,
            },
            vec![0; 64],
        );
        let mut dst = src.clone();
        assert!(matches!(
            NlMeans::new(NlMeansConfig::default()).denoise(&mut dst, &src, &reference),
            Err(FilterError::Plane(PlaneError::SizeMismatch(16, 16, 8, 8)))
        ));
    }

    #[test]
    fn group_weights_are_normalized_and_monotone() {
        let group = vec![
            BlockMatch {
                row: 0,
                col: 0,
                mse: 0.0,
            },
            BlockMatch {
                row: 0,
                col: 4,
                mse: 50.0,
            },
            BlockMatch {
                row: 4,
                col: 0,
                mse: 150.0,
            },
        ];
        let weights = group_weights(&group, 12.0);
        let total: f64 = weights.iter().sum();
        assert!((total - 1.0).abs() < 1e-12);
        assert!(weights[0] > weights[1]);
        assert!(weights[1] > weights[2]);
    }

    #[test]
    fn process_frame_preserves_metadata() -> Result<(), FilterError> {
        let _ = env_logger::builder().is_test(true).try_init();

        let frame = Frame::new(
            5,
            PixelLayout::Yuv420,
            PlaneSize {
                width: 16,
                height: 16,
            },
            8,
        )?;
        let out = NlMeans::new(NlMeansConfig::with_sigma(8.0, false)).process_frame(&frame, None)?;
        assert_eq!(out.frame_num(), 5);
        assert_eq!(out.layout(), PixelLayout::Yuv420);
        // constant planes stay constant, so the frames compare equal
        assert_eq!(out, frame);
        Ok(())
    }

    #[test]
    fn process_frame_rejects_layout_mismatch() {
        let size = PlaneSize {
            width: 16,
            height: 16,
        };
        let src = Frame::new(0, PixelLayout::Yuv444, size, 8).unwrap();
        let reference = Frame::new(0, PixelLayout::Yuv420, size, 8).unwrap();
        assert_eq!(
            NlMeans::new(NlMeansConfig::default())
                .process_frame(&src, Some(&reference))
                .unwrap_err(),
            FilterError::LayoutMismatch(PixelLayout::Yuv444, PixelLayout::Yuv420)
        );
    }
}
