//! Automatic exposure, contrast, white balance and saturation correction.
//!
//! Correction runs as two explicit passes over pure functions:
//!
//! ```text
//!   stats₁ = ImageStatistics::measure(original)
//!   r₁     = AutoCorrection::compute(&stats₁, None, &params)
//!   stats₂ = ImageStatistics::measure(&r₁.apply_phase1(original))
//!   r₂     = AutoCorrection::compute(&stats₁, Some(&stats₂), &params)
//! ```
//!
//! Phase 1 (exposure + contrast) is a master 1D LUT built through
//! [`Adjustment`]. Phase 2 (white balance + saturation guard) is a 3D LUT.
//! White balance and saturation read the phase-2 statistics when given,
//! since color estimates are more reliable once exposure is fixed.
//!
//! Every decision is biased toward doing nothing: dead zones zero out
//! small corrections and guard conditions scale large ones down.

use serde::{Deserialize, Serialize};

use crate::color_management::transfer::srgb_to_linear;
use crate::color_management::white_balance::gray_world_gains;
use crate::grading::adjustment::Adjustment;
use crate::grading::saturation_correction::{
    SaturationCorrection, SaturationCorrectionResult, SaturationParams,
};
use crate::image::PixelBuffer;
use crate::scopes::stats::ImageStatistics;
use crate::transform::apply::{apply_lut1d, apply_lut3d};
use crate::transform::lut1d::Lut1D;
use crate::transform::lut3d::{DEFAULT_LUT3D_SIZE, Lut3D};

/// Median below which the image is treated as near-black.
const NEAR_BLACK_MEDIAN: f32 = 0.02;
const HEAVY_CLIP_FRACTION: f32 = 0.10;
const EXPOSURE_GUARD_FACTOR: f32 = 0.5;
/// Luma spans narrower than this carry no usable tonal structure.
const FLAT_SPAN: f32 = 0.05;
/// Gains closer to 1 than this are not worth a correction.
const WB_DEAD_ZONE: f32 = 0.01;

/// Tuning for [`AutoCorrection::compute`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoCorrectionParams {
    /// Median luma (sRGB-encoded) that exposure aims for.
    pub target_median: f32,
    pub exposure_strength: f32,
    /// Largest exposure change in EV, either direction.
    pub max_ev: f32,
    /// Exposure changes smaller than this (EV) are dropped.
    pub min_ev: f32,
    /// p05–p95 luma span considered fully contrasted.
    pub target_span: f32,
    pub contrast_strength: f32,
    pub max_contrast: f32,
    /// Contrast amounts smaller than this are dropped.
    pub min_contrast: f32,
    pub wb_strength: f32,
    pub wb_min_gain: f32,
    pub wb_max_gain: f32,
    pub lut3d_size: usize,
    pub saturation: SaturationParams,
}

impl Default for AutoCorrectionParams {
    fn default() -> Self {
        Self {
            target_median: 0.46,
            exposure_strength: 0.8,
            max_ev: 1.5,
            min_ev: 0.1,
            target_span: 0.75,
            contrast_strength: 0.5,
            max_contrast: 0.4,
            min_contrast: 0.02,
            wb_strength: 0.6,
            wb_min_gain: 0.8,
            wb_max_gain: 1.25,
            lut3d_size: DEFAULT_LUT3D_SIZE,
            saturation: SaturationParams::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExposureCorrection {
    pub ev_delta: f32,
    /// Linear-light multiplier, `2^ev_delta`.
    pub gain: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContrastCorrection {
    /// Value for [`Adjustment::contrast`].
    pub amount: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WhiteBalanceCorrection {
    /// Per-channel multipliers on encoded values.
    pub gains: [f32; 3],
}

impl WhiteBalanceCorrection {
    pub fn is_active(&self) -> bool {
        self.gains.iter().any(|g| (g - 1.0).abs() > f32::EPSILON)
    }
}

/// Everything one auto-correction pass decided, plus its baked LUTs.
#[derive(Debug, Clone, PartialEq)]
pub struct AutoCorrectionResult {
    pub exposure: ExposureCorrection,
    pub contrast: ContrastCorrection,
    pub white_balance: WhiteBalanceCorrection,
    pub saturation: SaturationCorrectionResult,
    /// Exposure + contrast as a master LUT.
    pub phase1_lut: Lut1D,
    /// White balance + saturation guard.
    pub phase2_lut3d: Lut3D,
}

/// Namespace for the automatic correction passes.
pub struct AutoCorrection;

impl AutoCorrection {
    /// Derive corrections from the original image's statistics and,
    /// optionally, statistics measured after phase 1 was applied.
    pub fn compute(
        original: &ImageStatistics,
        phase2: Option<&ImageStatistics>,
        params: &AutoCorrectionParams,
    ) -> AutoCorrectionResult {
        let exposure = exposure_correction(original, params);
        let contrast = contrast_correction(original, params);

        let color_stats = phase2.unwrap_or(original);
        let white_balance = white_balance_correction(color_stats, params);
        let saturation = SaturationCorrection::compute(
            &color_stats.saturation,
            &color_stats.luminance,
            &params.saturation,
        );

        let phase1_lut = Adjustment {
            exposure: exposure.ev_delta,
            contrast: contrast.amount,
            ..Adjustment::identity()
        }
        .to_lut_float_rgb();

        let phase2_lut3d = if !white_balance.is_active() && saturation.is_noop() {
            Lut3D::identity(params.lut3d_size)
        } else {
            let gains = white_balance.gains;
            Lut3D::from_fn(params.lut3d_size, |rgb| {
                let balanced = [0, 1, 2].map(|c| (rgb[c] * gains[c]).clamp(0.0, 1.0));
                saturation.apply_rgb(balanced)
            })
        };

        tracing::debug!(
            ev = exposure.ev_delta,
            contrast = contrast.amount,
            gains = ?white_balance.gains,
            saturation = saturation.compression_base,
            two_phase = phase2.is_some(),
            "auto correction computed"
        );

        AutoCorrectionResult {
            exposure,
            contrast,
            white_balance,
            saturation,
            phase1_lut,
            phase2_lut3d,
        }
    }
}

impl AutoCorrectionResult {
    /// The authored-parameter equivalent of phase 1.
    pub fn to_adjustment(&self) -> Adjustment {
        Adjustment {
            exposure: self.exposure.ev_delta,
            contrast: self.contrast.amount,
            ..Adjustment::identity()
        }
    }

    /// Apply only the exposure/contrast pass.
    pub fn apply_phase1(&self, image: &PixelBuffer) -> PixelBuffer {
        apply_lut1d(image, &self.phase1_lut.quantize())
    }

    /// Apply both passes in order.
    pub fn apply(&self, image: &PixelBuffer) -> PixelBuffer {
        let toned = self.apply_phase1(image);
        if self.phase2_lut3d.is_identity(0.0) {
            return toned;
        }
        apply_lut3d(&toned, &self.phase2_lut3d)
    }

    /// Short description of the non-trivial corrections, e.g.
    /// `"Exp +0.85EV, Con +0.12, WB, Sat -18%"`, or `"none"`.
    pub fn summary(&self) -> String {
        let mut parts = Vec::new();
        if self.exposure.ev_delta != 0.0 {
            parts.push(format!("Exp {:+.2}EV", self.exposure.ev_delta));
        }
        if self.contrast.amount != 0.0 {
            parts.push(format!("Con {:+.2}", self.contrast.amount));
        }
        if self.white_balance.is_active() {
            parts.push("WB".to_string());
        }
        if !self.saturation.is_noop() {
            parts.push(format!("Sat -{:.0}%", self.saturation.compression_base * 100.0));
        }
        if parts.is_empty() {
            return "none".to_string();
        }
        parts.join(", ")
    }
}

fn exposure_correction(stats: &ImageStatistics, params: &AutoCorrectionParams) -> ExposureCorrection {
    let lum = &stats.luminance;
    let current = srgb_to_linear(lum.median).max(1e-4);
    let target = srgb_to_linear(params.target_median);
    let mut ev = (target / current).log2() * params.exposure_strength;

    if lum.median < NEAR_BLACK_MEDIAN {
        tracing::debug!(median = lum.median, "near-black median, halving exposure");
        ev *= EXPOSURE_GUARD_FACTOR;
    }
    if lum.clip_fraction() > HEAVY_CLIP_FRACTION {
        tracing::debug!(clip = lum.clip_fraction(), "heavy clipping, halving exposure");
        ev *= EXPOSURE_GUARD_FACTOR;
    }

    let mut ev = ev.clamp(-params.max_ev, params.max_ev);
    if ev.abs() < params.min_ev || !ev.is_finite() {
        ev = 0.0;
    }
    ExposureCorrection {
        ev_delta: ev,
        gain: ev.exp2(),
    }
}

fn contrast_correction(stats: &ImageStatistics, params: &AutoCorrectionParams) -> ContrastCorrection {
    let span = stats.luminance.p95 - stats.luminance.p05;
    if span < FLAT_SPAN {
        tracing::debug!(span, "flat luma distribution, skipping contrast");
        return ContrastCorrection { amount: 0.0 };
    }
    let target = params.target_span.max(1e-3);
    let mut amount = ((target - span) / target * params.contrast_strength).clamp(0.0, params.max_contrast);
    if amount < params.min_contrast {
        amount = 0.0;
    }
    ContrastCorrection { amount }
}

fn white_balance_correction(
    stats: &ImageStatistics,
    params: &AutoCorrectionParams,
) -> WhiteBalanceCorrection {
    let gains = gray_world_gains(
        stats.channel_means(),
        params.wb_strength,
        params.wb_min_gain,
        params.wb_max_gain,
    );
    if gains.iter().all(|g| (g - 1.0).abs() < WB_DEAD_ZONE) {
        return WhiteBalanceCorrection { gains: [1.0; 3] };
    }
    WhiteBalanceCorrection { gains }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scopes::histogram::{BINS, HistogramData};

    /// Statistics for an image whose pixels all have one gray level.
    fn concentrated(level: f32) -> ImageStatistics {
        let bin = (level * 255.0).round() as usize;
        let mut channel = vec![0_u32; BINS];
        channel[bin] = 10_000;
        let mut sat = vec![0_u32; BINS];
        sat[0] = 10_000;
        ImageStatistics::from_histograms(
            HistogramData::from_bins([channel.clone(), channel.clone(), channel.clone(), channel]),
            &sat,
        )
    }

    fn solid(rgb: [u8; 3]) -> ImageStatistics {
        ImageStatistics::measure(&PixelBuffer::filled(16, 16, [rgb[0], rgb[1], rgb[2], 255]))
    }

    #[test]
    fn test_dark_image_gets_positive_exposure() {
        let r = AutoCorrection::compute(&concentrated(0.2), None, &AutoCorrectionParams::default());
        assert!(r.exposure.ev_delta > 0.0, "{:?}", r.exposure);
        assert!(r.exposure.gain > 1.0);
    }

    #[test]
    fn test_bright_image_gets_negative_exposure() {
        let r = AutoCorrection::compute(&concentrated(0.8), None, &AutoCorrectionParams::default());
        assert!(r.exposure.ev_delta < 0.0, "{:?}", r.exposure);
        assert!(r.exposure.gain < 1.0);
    }

    #[test]
    fn test_well_exposed_image_is_left_alone() {
        let r = AutoCorrection::compute(&concentrated(0.46), None, &AutoCorrectionParams::default());
        assert_eq!(r.exposure.ev_delta, 0.0);
        assert_eq!(r.exposure.gain, 1.0);
        assert_eq!(r.contrast.amount, 0.0);
        assert_eq!(r.summary(), "none");
        assert_eq!(r.phase2_lut3d, Lut3D::identity(DEFAULT_LUT3D_SIZE));
        assert!(r.phase1_lut.quantize().is_identity());
    }

    #[test]
    fn test_exposure_is_clamped() {
        let params = AutoCorrectionParams::default();
        let r = AutoCorrection::compute(&concentrated(0.05), None, &params);
        assert!(r.exposure.ev_delta <= params.max_ev);
        assert!((r.exposure.gain - r.exposure.ev_delta.exp2()).abs() < 1e-6);
    }

    #[test]
    fn test_clipping_halves_exposure() {
        let params = AutoCorrectionParams {
            max_ev: 10.0,
            ..AutoCorrectionParams::default()
        };
        let clean = AutoCorrection::compute(&concentrated(0.8), None, &params);

        let mut luma = vec![0_u32; BINS];
        luma[204] = 8_000;
        luma[255] = 2_000;
        let mut clipped = concentrated(0.8);
        clipped.luminance =
            crate::scopes::stats::LuminanceStats::from_histogram(&luma);
        assert!((clipped.luminance.median - 0.8).abs() < 1e-3);

        let guarded = AutoCorrection::compute(&clipped, None, &params);
        assert!((guarded.exposure.ev_delta - 0.5 * clean.exposure.ev_delta).abs() < 1e-4);
    }

    #[test]
    fn test_low_contrast_image_gets_positive_contrast() {
        let mut pixels = Vec::new();
        for v in 90..=160_u8 {
            pixels.extend(std::iter::repeat_n([v, v, v, 255], 4));
        }
        let n = pixels.len() as u32;
        let img = PixelBuffer::new(n, 1, pixels).unwrap();
        let r = AutoCorrection::compute(
            &ImageStatistics::measure(&img),
            None,
            &AutoCorrectionParams::default(),
        );
        assert!(r.contrast.amount > 0.0, "{:?}", r.contrast);
        assert!(r.summary().contains("Con +"));
    }

    #[test]
    fn test_color_cast_produces_white_balance() {
        let r = AutoCorrection::compute(&solid([180, 128, 80]), None, &AutoCorrectionParams::default());
        let g = r.white_balance.gains;
        assert!(g[0] < 1.0 && g[2] > 1.0, "{g:?}");
        assert!(g.iter().all(|&x| (0.8..=1.25).contains(&x)));
        assert!(r.summary().contains("WB"));
        let out = r.phase2_lut3d.lookup(180.0 / 255.0, 128.0 / 255.0, 80.0 / 255.0);
        assert!(out[0] - out[2] < (180.0 - 80.0) / 255.0);
    }

    #[test]
    fn test_phase2_statistics_drive_color() {
        let params = AutoCorrectionParams::default();
        let original = solid([128, 128, 128]);
        let tinted = solid([150, 128, 100]);
        let one_pass = AutoCorrection::compute(&original, None, &params);
        let two_pass = AutoCorrection::compute(&original, Some(&tinted), &params);
        assert!(!one_pass.white_balance.is_active());
        assert!(two_pass.white_balance.is_active());
        assert_eq!(one_pass.exposure, two_pass.exposure);
    }

    #[test]
    fn test_oversaturated_image_reports_saturation() {
        let mut pixels = vec![[128, 128, 128, 255]; 200];
        pixels.extend(vec![[250, 10, 10, 255]; 56]);
        let img = PixelBuffer::new(16, 16, pixels).unwrap();
        let r = AutoCorrection::compute(
            &ImageStatistics::measure(&img),
            None,
            &AutoCorrectionParams::default(),
        );
        assert!(!r.saturation.is_noop());
        assert!(r.summary().contains("Sat -"), "{}", r.summary());
    }

    #[test]
    fn test_summary_formats_tokens() {
        let r = AutoCorrection::compute(&concentrated(0.2), None, &AutoCorrectionParams::default());
        let summary = r.summary();
        assert!(summary.starts_with("Exp +"), "{summary}");
        assert!(summary.contains("EV"));
    }

    #[test]
    fn test_to_adjustment_matches_phase1() {
        let r = AutoCorrection::compute(&concentrated(0.3), None, &AutoCorrectionParams::default());
        let adj = r.to_adjustment();
        assert_eq!(adj.to_lut_float_rgb(), r.phase1_lut);
        assert!(r.phase1_lut.is_master());
    }
}
