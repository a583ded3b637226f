//! RGB + luminance histogram computation.

use serde::{Deserialize, Serialize};

use crate::color_management::white_balance::LUMA_REC709;
use crate::image::PixelBuffer;
use crate::transform::apply::fold_pixels;

/// Number of bins per channel.
pub const BINS: usize = 256;

/// Histogram data for R, G, B, and luminance channels (256 bins each).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramData {
    /// Bin counts for `[R, G, B, Luma]` channels. Each `Vec` has 256 entries.
    pub bins: [Vec<u32>; 4],
    /// Peak bin value across all channels (for normalization).
    pub peak: u32,
}

/// Index of the luma channel in [`HistogramData::bins`].
pub const LUMA: usize = 3;

impl HistogramData {
    /// Wrap precomputed bins. Each channel is padded or truncated to 256 bins.
    pub fn from_bins(bins: [Vec<u32>; 4]) -> Self {
        let bins = bins.map(|mut b| {
            b.resize(BINS, 0);
            b
        });
        let peak = bins.iter().flatten().copied().max().unwrap_or(0);
        Self { bins, peak }
    }

    /// Number of samples counted in the luma channel.
    pub fn total(&self) -> u64 {
        self.bins[LUMA].iter().map(|&c| c as u64).sum()
    }

    /// Mean of one channel (0 = R … 3 = luma), normalized to [0, 1].
    ///
    /// An empty channel has mean 0.
    pub fn mean(&self, channel: usize) -> f32 {
        mean_of(&self.bins[channel])
    }
}

/// Luma bin for an 8-bit sRGB pixel (Rec. 709 weights on code values).
#[inline]
pub fn luma_bin(px: [u8; 4]) -> usize {
    let y = LUMA_REC709[0] * px[0] as f32
        + LUMA_REC709[1] * px[1] as f32
        + LUMA_REC709[2] * px[2] as f32;
    (y.round() as usize).min(BINS - 1)
}

/// Compute histogram from a pixel buffer.
pub fn compute(image: &PixelBuffer) -> HistogramData {
    let counts = fold_pixels(
        image,
        || vec![[0_u32; BINS]; 4],
        |mut acc, px| {
            acc[0][px[0] as usize] += 1;
            acc[1][px[1] as usize] += 1;
            acc[2][px[2] as usize] += 1;
            acc[LUMA][luma_bin(px)] += 1;
            acc
        },
        merge_counts,
    );
    let bins: [Vec<u32>; 4] = std::array::from_fn(|c| counts[c].to_vec());
    HistogramData::from_bins(bins)
}

pub(crate) fn merge_counts(mut a: Vec<[u32; BINS]>, b: Vec<[u32; BINS]>) -> Vec<[u32; BINS]> {
    for (ca, cb) in a.iter_mut().zip(&b) {
        for (x, y) in ca.iter_mut().zip(cb) {
            *x += y;
        }
    }
    a
}

/// Mean bin position of a histogram, normalized to [0, 1].
pub(crate) fn mean_of(bins: &[u32]) -> f32 {
    let (sum, count) = bins
        .iter()
        .enumerate()
        .fold((0.0_f64, 0_u64), |(s, n), (i, &c)| {
            (s + i as f64 * c as f64, n + c as u64)
        });
    if count == 0 {
        return 0.0;
    }
    (sum / count as f64 / (BINS - 1) as f64) as f32
}

/// Smallest bin whose cumulative count reaches `fraction` of the total,
/// normalized to [0, 1]. An empty histogram yields 0.
pub(crate) fn percentile(bins: &[u32], fraction: f32) -> f32 {
    let total: u64 = bins.iter().map(|&c| c as u64).sum();
    if total == 0 {
        return 0.0;
    }
    let target = (fraction.clamp(0.0, 1.0) as f64 * total as f64).max(1.0);
    let mut cumulative = 0_u64;
    for (i, &c) in bins.iter().enumerate() {
        cumulative += c as u64;
        if cumulative as f64 >= target {
            return i as f32 / (BINS - 1) as f32;
        }
    }
    1.0
}
