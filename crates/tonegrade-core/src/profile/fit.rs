//! Fitting a [`LuminanceProfile`] to a tone curve.
//!
//! | Fit          | Curve                                                     |
//! |--------------|-----------------------------------------------------------|
//! | `Raw`        | the CDF verbatim (full histogram equalization)            |
//! | `Simple`     | black/white stretch plus the inverse of the gamma estimate |
//! | `Polynomial` | degree-5 least squares through 64 CDF samples             |
//! | `Spline`     | Catmull-Rom through the profile's control points          |
//! | `Normalize`  | percentile window remap with a soft clip (default)        |
//!
//! Every fitted curve is clamped to [0, 1] and forced non-decreasing, so it
//! can always be inverted. A neutral profile fits to the identity.

use serde::{Deserialize, Serialize};

use crate::grading::spline::bake_spline;
use crate::profile::LuminanceProfile;
use crate::profile::polynomial;
use crate::transform::lut1d::{Channel, LUT_SIZE, identity_channel};

const POLYNOMIAL_DEGREE: usize = 5;
const POLYNOMIAL_SAMPLES: usize = 64;

/// Output band that is passed through linearly before the soft clip.
const SOFT_CLIP_LOW: f32 = 0.05;
const SOFT_CLIP_HIGH: f32 = 0.95;

/// Curve family used by [`LuminanceProfile::to_fitted_lut`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FitType {
    Raw,
    Simple,
    Polynomial,
    Spline,
    #[default]
    Normalize,
}

/// Parameters for [`FitType::Normalize`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizeParams {
    /// Input percentile (in percent) mapped to `output_low`.
    pub input_low_percentile: f32,
    /// Input percentile (in percent) mapped to `output_high`.
    pub input_high_percentile: f32,
    pub output_low: f32,
    pub output_high: f32,
    /// Gamma applied inside the window. `None` keeps the remap linear.
    pub target_gamma: Option<f32>,
}

impl Default for NormalizeParams {
    fn default() -> Self {
        Self {
            input_low_percentile: 1.0,
            input_high_percentile: 99.0,
            output_low: 0.04,
            output_high: 0.96,
            target_gamma: None,
        }
    }
}

impl LuminanceProfile {
    /// Bake the profile into a 256-entry `L` remapping curve.
    pub fn to_fitted_lut(&self, fit: FitType, params: &NormalizeParams) -> Channel {
        if self.is_neutral() {
            return identity_channel();
        }
        let mut lut = match fit {
            FitType::Raw => self.raw_lut(),
            FitType::Simple => self.simple_lut(),
            FitType::Polynomial => self.polynomial_lut(),
            FitType::Spline => bake_spline(&self.control_pairs()),
            FitType::Normalize => self.normalize_lut(params),
        };
        make_monotone(&mut lut);
        lut
    }

    /// Numeric inverse of [`LuminanceProfile::to_fitted_lut`].
    ///
    /// Flat stretches of the forward curve invert to their first input.
    pub fn to_fitted_inverse_lut(&self, fit: FitType, params: &NormalizeParams) -> Channel {
        invert(&self.to_fitted_lut(fit, params))
    }

    fn raw_lut(&self) -> Channel {
        std::array::from_fn(|i| self.cdf.get(i).copied().unwrap_or(1.0))
    }

    fn simple_lut(&self) -> Channel {
        let black = self.black_point as f32 / 255.0;
        let white = self.white_point as f32 / 255.0;
        if white - black < 1e-3 {
            tracing::debug!(black, white, "degenerate black/white range, using identity");
            return identity_channel();
        }
        let exponent = 1.0 / self.gamma.max(1e-3);
        std::array::from_fn(|i| {
            let x = i as f32 / (LUT_SIZE - 1) as f32;
            ((x - black) / (white - black)).clamp(0.0, 1.0).powf(exponent)
        })
    }

    fn polynomial_lut(&self) -> Channel {
        let (xs, ys): (Vec<f64>, Vec<f64>) = (0..POLYNOMIAL_SAMPLES)
            .map(|k| {
                let x = k as f64 / (POLYNOMIAL_SAMPLES - 1) as f64;
                let bin = ((x * (LUT_SIZE - 1) as f64).round() as usize).min(self.cdf.len() - 1);
                (x, self.cdf[bin] as f64)
            })
            .unzip();

        match polynomial::fit(&xs, &ys, POLYNOMIAL_DEGREE) {
            Some(coeffs) => std::array::from_fn(|i| {
                let x = i as f64 / (LUT_SIZE - 1) as f64;
                polynomial::evaluate(&coeffs, x) as f32
            }),
            None => {
                tracing::debug!("singular polynomial fit, falling back to raw CDF");
                self.raw_lut()
            }
        }
    }

    fn normalize_lut(&self, params: &NormalizeParams) -> Channel {
        let lo = self.percentile_value(params.input_low_percentile);
        let hi = self.percentile_value(params.input_high_percentile);
        if hi - lo < 1.0 / 255.0 {
            tracing::debug!(lo, hi, "degenerate percentile window, using identity");
            return identity_channel();
        }
        let exponent = params.target_gamma.map(|g| 1.0 / g.max(1e-3));
        let span = params.output_high - params.output_low;

        std::array::from_fn(|i| {
            let x = i as f32 / (LUT_SIZE - 1) as f32;
            let mut t = (x - lo) / (hi - lo);
            if let Some(e) = exponent {
                if (0.0..=1.0).contains(&t) {
                    t = t.powf(e);
                }
            }
            soft_clip(params.output_low + t * span)
        })
    }
}

/// Pass [0.05, 0.95] through and compress the tails with `tanh` so values
/// approach 0 and 1 without reaching them.
fn soft_clip(y: f32) -> f32 {
    if y < SOFT_CLIP_LOW {
        SOFT_CLIP_LOW - SOFT_CLIP_LOW * ((SOFT_CLIP_LOW - y) / SOFT_CLIP_LOW).tanh()
    } else if y > SOFT_CLIP_HIGH {
        let room = 1.0 - SOFT_CLIP_HIGH;
        SOFT_CLIP_HIGH + room * ((y - SOFT_CLIP_HIGH) / room).tanh()
    } else {
        y
    }
}

/// Clamp to [0, 1] and apply a running maximum.
fn make_monotone(lut: &mut Channel) {
    let mut floor = 0.0_f32;
    for v in lut.iter_mut() {
        let c = if v.is_finite() { v.clamp(0.0, 1.0) } else { floor };
        floor = floor.max(c);
        *v = floor;
    }
}

/// Invert a non-decreasing curve by searching each output level and
/// interpolating between the bracketing entries.
fn invert(forward: &Channel) -> Channel {
    let last = (LUT_SIZE - 1) as f32;
    std::array::from_fn(|j| {
        let y = j as f32 / last;
        if y <= forward[0] {
            return 0.0;
        }
        if y >= forward[LUT_SIZE - 1] {
            return forward
                .iter()
                .position(|&v| v >= forward[LUT_SIZE - 1])
                .map_or(1.0, |i| i as f32 / last);
        }
        let i = forward.partition_point(|&v| v < y).clamp(1, LUT_SIZE - 1);
        let (y0, y1) = (forward[i - 1], forward[i]);
        let frac = if y1 - y0 > 1e-9 { (y - y0) / (y1 - y0) } else { 0.0 };
        ((i - 1) as f32 + frac) / last
    })
}
