//! Perceptual luminance profiles.
//!
//! A [`LuminanceProfile`] summarizes one image's Oklab lightness
//! distribution: a 256-bin histogram, its CDF, black/white points, a gamma
//! estimate and a handful of control points sampled from the CDF. The
//! profile is fitted to a tone curve in [`fit`] and applied back to pixels
//! in [`apply`], where only `L` changes so hue stays put.

pub mod apply;
pub mod fit;
pub mod polynomial;

use serde::{Deserialize, Serialize};

use crate::color_management::oklab::lightness;
use crate::image::PixelBuffer;
use crate::scopes::histogram::BINS;
use crate::transform::apply::fold_pixels;

pub use apply::{apply_luminance_lut, shift_lut_to_preserve_mean};
pub use fit::{FitType, NormalizeParams};

/// Default clip percentile for black/white point detection.
pub const DEFAULT_PERCENTILE: f32 = 0.5;
/// Default number of CDF control points.
pub const DEFAULT_CONTROL_POINTS: usize = 9;

const MIN_GAMMA: f32 = 0.2;
const MAX_GAMMA: f32 = 5.0;

/// One sample of the CDF tone curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ControlPoint {
    pub input: f32,
    pub output: f32,
}

/// Oklab lightness summary of one image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LuminanceProfile {
    /// Pixel counts per `L` bin.
    pub histogram: Vec<u32>,
    /// Cumulative fraction of pixels at or below each bin.
    pub cdf: Vec<f32>,
    pub black_point: u8,
    pub white_point: u8,
    pub gamma: f32,
    /// Mean `L` in [0, 1].
    pub mean: f32,
    pub control_points: Vec<ControlPoint>,
    pub pixel_count: u64,
}

impl LuminanceProfile {
    /// The zero-effect profile: every fit of it is the identity curve.
    pub fn neutral() -> Self {
        let n = DEFAULT_CONTROL_POINTS;
        Self {
            histogram: vec![0; BINS],
            cdf: (0..BINS).map(|i| i as f32 / (BINS - 1) as f32).collect(),
            black_point: 0,
            white_point: 255,
            gamma: 1.0,
            mean: 0.5,
            control_points: (0..n)
                .map(|k| {
                    let t = k as f32 / (n - 1) as f32;
                    ControlPoint {
                        input: t,
                        output: t,
                    }
                })
                .collect(),
            pixel_count: 0,
        }
    }

    /// True for a profile that carries no measured data.
    pub fn is_neutral(&self) -> bool {
        self.pixel_count == 0
    }

    /// Build a profile from an image.
    ///
    /// `percentile` is in percent: black/white points are the first bins,
    /// from each end, whose cumulative count exceeds `percentile%` of the
    /// pixels. `num_control_points` is raised to at least 2. An empty image
    /// yields [`LuminanceProfile::neutral`].
    pub fn extract(image: &PixelBuffer, percentile: f32, num_control_points: usize) -> Self {
        let (histogram, sum) = fold_pixels(
            image,
            || (vec![0_u32; BINS], 0.0_f64),
            |(mut bins, sum), px| {
                let l = lightness([px[0], px[1], px[2]]);
                bins[lightness_bin(l)] += 1;
                (bins, sum + l as f64)
            },
            |(mut a, sa), (b, sb)| {
                for (x, y) in a.iter_mut().zip(&b) {
                    *x += y;
                }
                (a, sa + sb)
            },
        );
        Self::from_histogram(histogram, sum, percentile, num_control_points)
    }

    /// Build a profile from an `L` histogram and the sum of `L` over all pixels.
    pub fn from_histogram(
        mut histogram: Vec<u32>,
        lightness_sum: f64,
        percentile: f32,
        num_control_points: usize,
    ) -> Self {
        histogram.resize(BINS, 0);
        let total: u64 = histogram.iter().map(|&c| c as u64).sum();
        if total == 0 {
            return Self::neutral();
        }

        let mut cdf = Vec::with_capacity(BINS);
        let mut cumulative = 0_u64;
        for &c in &histogram {
            cumulative += c as u64;
            cdf.push((cumulative as f64 / total as f64) as f32);
        }

        let threshold = total as f64 * (percentile.max(0.0) as f64 / 100.0);
        let black_point = clip_point(histogram.iter().enumerate(), threshold).unwrap_or(0);
        let white_point = clip_point(histogram.iter().enumerate().rev(), threshold).unwrap_or(BINS - 1);

        let mean = (lightness_sum / total as f64) as f32;
        let gamma = estimate_gamma(mean, black_point, white_point);

        let n = num_control_points.max(2);
        let control_points = (0..n)
            .map(|k| {
                let input = k as f32 / (n - 1) as f32;
                ControlPoint {
                    input,
                    output: sample_cdf(&cdf, input),
                }
            })
            .collect();

        tracing::debug!(
            pixels = total,
            black_point,
            white_point,
            gamma,
            mean,
            "extracted luminance profile"
        );

        Self {
            histogram,
            cdf,
            black_point: black_point as u8,
            white_point: white_point as u8,
            gamma,
            mean,
            control_points,
            pixel_count: total,
        }
    }

    /// Control points as `[x, y]` pairs for spline fitting.
    pub fn control_pairs(&self) -> Vec<[f32; 2]> {
        self.control_points
            .iter()
            .map(|p| [p.input, p.output])
            .collect()
    }

    /// `L` value in [0, 1] below which `percent`% of the pixels fall.
    pub fn percentile_value(&self, percent: f32) -> f32 {
        let target = (percent / 100.0).clamp(0.0, 1.0);
        self.cdf
            .iter()
            .position(|&c| c >= target)
            .map_or(1.0, |i| i as f32 / (BINS - 1) as f32)
    }
}

impl Default for LuminanceProfile {
    fn default() -> Self {
        Self::neutral()
    }
}

/// Histogram bin for an `L` value in [0, 1].
#[inline]
pub(crate) fn lightness_bin(l: f32) -> usize {
    ((l * (BINS - 1) as f32).round().max(0.0) as usize).min(BINS - 1)
}

fn clip_point<'a>(mut bins: impl Iterator<Item = (usize, &'a u32)>, threshold: f64) -> Option<usize> {
    let mut cumulative = 0_u64;
    bins.find_map(|(i, &c)| {
        cumulative += c as u64;
        (cumulative as f64 > threshold).then_some(i)
    })
}

fn estimate_gamma(mean: f32, black_point: usize, white_point: usize) -> f32 {
    if white_point <= black_point {
        return 1.0;
    }
    let range = (white_point - black_point) as f32;
    let normalized = ((mean * 255.0 - black_point as f32) / range).clamp(0.01, 0.99);
    (normalized.ln() / 0.5_f32.ln()).clamp(MIN_GAMMA, MAX_GAMMA)
}

/// Sample the CDF at `x` in [0, 1] with linear interpolation between bins.
fn sample_cdf(cdf: &[f32], x: f32) -> f32 {
    let pos = x.clamp(0.0, 1.0) * (cdf.len() - 1) as f32;
    let i0 = (pos.floor() as usize).min(cdf.len() - 2);
    let frac = pos - i0 as f32;
    cdf[i0] + (cdf[i0 + 1] - cdf[i0]) * frac
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color_management::transfer::linear_to_srgb;

    const EPSILON: f32 = 1e-4;

    /// One pixel per 8-bit gray level, 0 to 255.
    fn srgb_ramp() -> PixelBuffer {
        let pixels = (0..=255_u8).map(|v| [v, v, v, 255]).collect();
        PixelBuffer::new(256, 1, pixels).unwrap()
    }

    /// Gray levels whose Oklab `L` rises linearly from 0 to 1.
    fn lightness_ramp() -> PixelBuffer {
        let pixels = (0..=255)
            .map(|i| {
                let l = i as f32 / 255.0;
                let v = (linear_to_srgb(l * l * l) * 255.0).round() as u8;
                [v, v, v, 255]
            })
            .collect();
        PixelBuffer::new(256, 1, pixels).unwrap()
    }

    #[test]
    fn test_gradient_spans_full_range() {
        let profile = LuminanceProfile::extract(&srgb_ramp(), 0.0, 5);
        assert_eq!(profile.black_point, 0);
        assert_eq!(profile.white_point, 255);
        assert!(profile.cdf[0] < 0.01, "cdf[0] = {}", profile.cdf[0]);
        assert!((profile.cdf[255] - 1.0).abs() < EPSILON);
        assert_eq!(profile.pixel_count, 256);
    }

    #[test]
    fn test_perceptually_linear_gradient_has_unit_gamma() {
        let profile = LuminanceProfile::extract(&lightness_ramp(), 0.0, 5);
        assert_eq!(profile.black_point, 0);
        assert_eq!(profile.white_point, 255);
        assert!((profile.gamma - 1.0).abs() < 0.1, "gamma = {}", profile.gamma);
        assert!((profile.mean - 0.5).abs() < 0.05, "mean = {}", profile.mean);
    }

    #[test]
    fn test_dark_image_has_gamma_above_one() {
        let mut pixels = vec![[30, 30, 30, 255]; 90];
        pixels.extend(vec![[0, 0, 0, 255]; 5]);
        pixels.extend(vec![[255, 255, 255, 255]; 5]);
        let img = PixelBuffer::new(10, 10, pixels).unwrap();
        let profile = LuminanceProfile::extract(&img, 0.0, 5);
        assert!(profile.gamma > 1.0, "gamma = {}", profile.gamma);
    }

    #[test]
    fn test_percentile_trims_outliers() {
        let mut pixels = vec![[128, 128, 128, 255]; 98];
        pixels.push([0, 0, 0, 255]);
        pixels.push([255, 255, 255, 255]);
        let img = PixelBuffer::new(10, 10, pixels).unwrap();
        let loose = LuminanceProfile::extract(&img, 0.0, 5);
        let strict = LuminanceProfile::extract(&img, 2.0, 5);
        assert_eq!(loose.black_point, 0);
        assert_eq!(loose.white_point, 255);
        assert!(strict.black_point > 100 && strict.white_point < 200);
    }

    #[test]
    fn test_control_points_sample_cdf() {
        let profile = LuminanceProfile::extract(&srgb_ramp(), 0.0, 5);
        assert_eq!(profile.control_points.len(), 5);
        let first = profile.control_points[0];
        let last = profile.control_points[4];
        assert_eq!(first.input, 0.0);
        assert!((last.output - 1.0).abs() < EPSILON);
        for w in profile.control_points.windows(2) {
            assert!(w[1].output >= w[0].output);
        }
    }

    #[test]
    fn test_empty_image_is_neutral() {
        let img = PixelBuffer::new(0, 0, vec![]).unwrap();
        let profile = LuminanceProfile::extract(&img, 0.5, 5);
        assert!(profile.is_neutral());
        assert_eq!(profile, LuminanceProfile::neutral());
    }

    #[test]
    fn test_percentile_value() {
        let profile = LuminanceProfile::extract(&srgb_ramp(), 0.0, 5);
        assert!(profile.percentile_value(0.0) < 0.01);
        assert!((profile.percentile_value(100.0) - 1.0).abs() < EPSILON);
        assert!(profile.percentile_value(50.0) > profile.percentile_value(10.0));
    }
}
