//! Summary statistics consumed by the automatic corrections.
//!
//! Everything here is derived from 256-bin histograms, so statistics can be
//! measured from a full image, a downsampled proxy, or histograms that a
//! worker already computed.

use serde::{Deserialize, Serialize};

use crate::image::PixelBuffer;
use crate::scopes::histogram::{self, BINS, HistogramData, LUMA, luma_bin};
use crate::transform::apply::fold_pixels;

/// Bins at or below this count as clipped black.
const BLACK_CLIP_BIN: usize = 2;
/// Bins at or above this count as clipped white.
const WHITE_CLIP_BIN: usize = 253;
/// Inclusive mid-tone bin range.
const MIDTONE_BINS: std::ops::RangeInclusive<usize> = 64..=191;

/// Distribution of Rec. 709 luma. Values are in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LuminanceStats {
    pub mean: f32,
    pub median: f32,
    pub p05: f32,
    pub p95: f32,
    /// Fraction of pixels in the bottom clip bins.
    pub black_clip: f32,
    /// Fraction of pixels in the top clip bins.
    pub white_clip: f32,
    /// Fraction of pixels in the mid-tone band.
    pub midtone_ratio: f32,
}

impl LuminanceStats {
    pub fn from_histogram(bins: &[u32]) -> Self {
        let total: u64 = bins.iter().map(|&c| c as u64).sum();
        let fraction = |range: std::ops::RangeInclusive<usize>| -> f32 {
            if total == 0 {
                return 0.0;
            }
            let count: u64 = bins
                .iter()
                .enumerate()
                .filter(|(i, _)| range.contains(i))
                .map(|(_, &c)| c as u64)
                .sum();
            (count as f64 / total as f64) as f32
        };

        Self {
            mean: histogram::mean_of(bins),
            median: histogram::percentile(bins, 0.5),
            p05: histogram::percentile(bins, 0.05),
            p95: histogram::percentile(bins, 0.95),
            black_clip: fraction(0..=BLACK_CLIP_BIN),
            white_clip: fraction(WHITE_CLIP_BIN..=BINS - 1),
            midtone_ratio: fraction(MIDTONE_BINS),
        }
    }

    /// Combined black + white clip fraction.
    pub fn clip_fraction(&self) -> f32 {
        self.black_clip + self.white_clip
    }
}

/// Distribution of the per-pixel saturation proxy `max(R,G,B) − min(R,G,B)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SaturationStats {
    pub mean: f32,
    pub p95: f32,
}

impl SaturationStats {
    pub fn from_histogram(bins: &[u32]) -> Self {
        Self {
            mean: histogram::mean_of(bins),
            p95: histogram::percentile(bins, 0.95),
        }
    }
}

/// Everything the automatic corrections read from one image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageStatistics {
    pub histogram: HistogramData,
    pub luminance: LuminanceStats,
    pub saturation: SaturationStats,
}

impl ImageStatistics {
    /// Measure a pixel buffer in a single pass.
    pub fn measure(image: &PixelBuffer) -> Self {
        let counts = fold_pixels(
            image,
            || vec![[0_u32; BINS]; 5],
            |mut acc, px| {
                acc[0][px[0] as usize] += 1;
                acc[1][px[1] as usize] += 1;
                acc[2][px[2] as usize] += 1;
                acc[LUMA][luma_bin(px)] += 1;
                acc[4][saturation_bin(px)] += 1;
                acc
            },
            histogram::merge_counts,
        );
        let bins: [Vec<u32>; 4] = std::array::from_fn(|c| counts[c].to_vec());
        let stats = Self::from_histograms(HistogramData::from_bins(bins), &counts[4]);
        tracing::debug!(
            pixels = image.len(),
            median = stats.luminance.median,
            sat_p95 = stats.saturation.p95,
            "measured image statistics"
        );
        stats
    }

    /// Assemble statistics from precomputed RGB/luma and saturation histograms.
    pub fn from_histograms(histogram: HistogramData, saturation_bins: &[u32]) -> Self {
        let luminance = LuminanceStats::from_histogram(&histogram.bins[LUMA]);
        Self {
            histogram,
            luminance,
            saturation: SaturationStats::from_histogram(saturation_bins),
        }
    }

    /// Per-channel means in [0, 1].
    pub fn channel_means(&self) -> [f32; 3] {
        [
            self.histogram.mean(0),
            self.histogram.mean(1),
            self.histogram.mean(2),
        ]
    }
}

#[inline]
fn saturation_bin(px: [u8; 4]) -> usize {
    let max = px[0].max(px[1]).max(px[2]);
    let min = px[0].min(px[1]).min(px[2]);
    (max - min) as usize
}
