//! Block grid construction and similarity search for NLMeans.

use super::NlMeansConfig;

/// A matched block position with its similarity score.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BlockMatch {
    /// Top row of the block.
    pub row: usize,
    /// Left column of the block.
    pub col: usize,
    /// Mean squared error against the reference block.
    pub mse: f64,
}

/// Block start positions along one axis: stride `step`, with the last
/// position clamped so the final block ends exactly at `len`.
pub(crate) fn grid_positions(len: usize, block: usize, step: usize) -> Vec<usize> {
    debug_assert!(block >= 1 && block <= len && step >= 1);
    let last = len - block;
    let mut positions: Vec<usize> = (0..=last).step_by(step).collect();
    if positions.last() != Some(&last) {
        positions.push(last);
    }
    positions
}

/// Mean squared error between two `block`-sized square blocks of a
/// row-major buffer.
pub(crate) fn block_mse(
    data: &[f32],
    width: usize,
    a: (usize, usize),
    b: (usize, usize),
    block: usize,
) -> f64 {
    let mut sum = 0.0f64;
    for dy in 0..block {
        let row_a = (a.0 + dy) * width + a.1;
        let row_b = (b.0 + dy) * width + b.1;
        for dx in 0..block {
            let diff = f64::from(data[row_a + dx]) - f64::from(data[row_b + dx]);
            sum += diff * diff;
        }
    }
    sum / (block * block) as f64
}

/// Search the neighborhood of `pos` for blocks similar to the block at
/// `pos`, over a grid of stride `bm_step` within radius `bm_range`.
///
/// The reference block itself is always the first member with MSE 0.
/// Candidates with MSE above `th_mse` are discarded; the survivors are
/// sorted by ascending MSE (scan order breaks ties) and truncated to
/// `group_size`.
pub(crate) fn match_blocks(
    data: &[f32],
    width: usize,
    height: usize,
    pos: (usize, usize),
    config: &NlMeansConfig,
) -> Vec<BlockMatch> {
    let block = config.block_size;
    let last_row = height - block;
    let last_col = width - block;

    let row_begin = pos.0.saturating_sub(config.bm_range);
    let row_end = (pos.0 + config.bm_range).min(last_row);
    let col_begin = pos.1.saturating_sub(config.bm_range);
    let col_end = (pos.1 + config.bm_range).min(last_col);

    let mut matches = vec![BlockMatch {
        row: pos.0,
        col: pos.1,
        mse: 0.0,
    }];

    for row in (row_begin..=row_end).step_by(config.bm_step) {
        for col in (col_begin..=col_end).step_by(config.bm_step) {
            if row == pos.0 && col == pos.1 {
                continue;
            }
            let mse = block_mse(data, width, pos, (row, col), block);
            if mse <= config.th_mse {
                matches.push(BlockMatch { row, col, mse });
            }
        }
    }

    // stable sort keeps first-found candidates ahead on equal MSE
    matches.sort_by(|a, b| a.mse.partial_cmp(&b.mse).unwrap_or(std::cmp::Ordering::Equal));
    matches.truncate(config.group_size);
    matches
}
