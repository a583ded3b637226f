//! Over-saturation guard.
//!
//! Only ever compresses: when the measured 95th-percentile saturation sits
//! above the target, strongly saturated colors are pulled toward their
//! Rec. 709 gray. Ambiguous exposure (extreme key, heavy clipping, few
//! mid-tones) scales the correction down rather than trusting the
//! measurement.
//!
//! ```text
//! delta       = sat_p95 − target
//! compression = smoothstep(0, 1, delta / knee) × max_compression × guards
//! out         = rgb + (gray − rgb) × compression × smoothstep(lo, hi, max − min)
//! ```

use serde::{Deserialize, Serialize};

use crate::color_management::white_balance::luma;
use crate::grading::stages::smoothstep;
use crate::scopes::stats::{LuminanceStats, SaturationStats};
use crate::transform::lut3d::Lut3D;

const EXTREME_KEY_RANGE: (f32, f32) = (0.25, 0.75);
const EXTREME_KEY_FACTOR: f32 = 0.7;
const HEAVY_CLIP_FRACTION: f32 = 0.10;
const HEAVY_CLIP_FACTOR: f32 = 0.7;
const LOW_MIDTONE_RATIO: f32 = 0.20;
const LOW_MIDTONE_FACTOR: f32 = 0.5;

/// Tuning for [`SaturationCorrection::compute`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SaturationParams {
    /// p95 saturation at or below which nothing happens.
    pub target_saturation: f32,
    /// Excess over the target at which compression reaches its cap.
    pub sat_knee: f32,
    pub max_compression: f32,
    /// Pixel saturation where per-node compression starts.
    pub pixel_sat_lo: f32,
    /// Pixel saturation where per-node compression is full.
    pub pixel_sat_hi: f32,
}

impl Default for SaturationParams {
    fn default() -> Self {
        Self {
            target_saturation: 0.6,
            sat_knee: 0.2,
            max_compression: 0.35,
            pixel_sat_lo: 0.35,
            pixel_sat_hi: 0.85,
        }
    }
}

/// Outcome of the saturation guard.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SaturationCorrectionResult {
    /// `sat_p95 − target`. Non-positive means no correction.
    pub delta: f32,
    /// Product of the guard multipliers that fired (1 when none did).
    pub guard_factor: f32,
    /// Final blend amount toward gray for fully saturated pixels.
    pub compression_base: f32,
    pub pixel_sat_lo: f32,
    pub pixel_sat_hi: f32,
}

/// Namespace for the saturation guard.
pub struct SaturationCorrection;

impl SaturationCorrection {
    pub fn compute(
        saturation: &SaturationStats,
        luminance: &LuminanceStats,
        params: &SaturationParams,
    ) -> SaturationCorrectionResult {
        let delta = saturation.p95 - params.target_saturation;
        let mut result = SaturationCorrectionResult {
            delta,
            guard_factor: 1.0,
            compression_base: 0.0,
            pixel_sat_lo: params.pixel_sat_lo,
            pixel_sat_hi: params.pixel_sat_hi,
        };
        if delta <= 0.0 {
            return result;
        }

        let knee = params.sat_knee.max(1e-6);
        let raw = smoothstep(0.0, 1.0, delta / knee) * params.max_compression;

        let mut guard = 1.0;
        let (lo, hi) = EXTREME_KEY_RANGE;
        if luminance.median < lo || luminance.median > hi {
            tracing::debug!(median = luminance.median, "extreme key, reducing saturation guard");
            guard *= EXTREME_KEY_FACTOR;
        }
        if luminance.clip_fraction() > HEAVY_CLIP_FRACTION {
            tracing::debug!(clip = luminance.clip_fraction(), "heavy clipping, reducing saturation guard");
            guard *= HEAVY_CLIP_FACTOR;
        }
        if luminance.midtone_ratio < LOW_MIDTONE_RATIO {
            tracing::debug!(ratio = luminance.midtone_ratio, "few mid-tones, reducing saturation guard");
            guard *= LOW_MIDTONE_FACTOR;
        }

        result.guard_factor = guard;
        result.compression_base = raw * guard;
        tracing::debug!(
            delta,
            compression = result.compression_base,
            "saturation guard active"
        );
        result
    }
}

impl SaturationCorrectionResult {
    /// A result that leaves every color alone.
    pub fn noop(params: &SaturationParams) -> Self {
        Self {
            delta: 0.0,
            guard_factor: 1.0,
            compression_base: 0.0,
            pixel_sat_lo: params.pixel_sat_lo,
            pixel_sat_hi: params.pixel_sat_hi,
        }
    }

    pub fn is_noop(&self) -> bool {
        self.compression_base <= 0.0
    }

    /// Compress one color in [0, 1]³ toward its gray.
    pub fn apply_rgb(&self, rgb: [f32; 3]) -> [f32; 3] {
        if self.is_noop() {
            return rgb;
        }
        let proxy = rgb[0].max(rgb[1]).max(rgb[2]) - rgb[0].min(rgb[1]).min(rgb[2]);
        let k = self.compression_base * smoothstep(self.pixel_sat_lo, self.pixel_sat_hi, proxy);
        let gray = luma(rgb);
        rgb.map(|c| (c + (gray - c) * k).clamp(0.0, 1.0))
    }

    /// Bake into a 3D LUT. A no-op is exactly [`Lut3D::identity`].
    pub fn to_lut3d(&self, size: usize) -> Lut3D {
        if self.is_noop() {
            return Lut3D::identity(size);
        }
        Lut3D::from_fn(size, |rgb| self.apply_rgb(rgb))
    }
}
