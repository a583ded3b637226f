//! Monotone tone curves and 1D LUT baking.
//!
//! A [`Curve`] is a list of output values at equally spaced inputs
//! `i / (n − 1)`. It is interpolated with a monotone cubic Hermite spline
//! (Fritsch–Carlson, a.k.a. PCHIP), which never introduces extrema that the
//! control points do not already have: a non-decreasing point list always
//! bakes to a non-decreasing LUT.
//!
//! # Algorithm
//! 1. Secants `δᵢ = (yᵢ₊₁ − yᵢ) / h`.
//! 2. Tangents: endpoints take the adjacent secant; interior points take the
//!    harmonic mean of their two secants, or 0 on a sign change.
//! 3. Per segment: a flat secant zeroes both tangents; otherwise, with
//!    `α = mᵢ/δᵢ`, `β = mᵢ₊₁/δᵢ`, if `α² + β² > 9` both tangents are scaled
//!    by `3 / √(α² + β²)`.
//! 4. Cubic Hermite evaluation per segment; clamped outside [0, 1].

use serde::{Deserialize, Serialize};

use crate::transform::lut1d::{Channel, LUT_SIZE, Lut1D};

const FLAT_EPSILON: f32 = 1e-10;

/// Output values at equally spaced inputs over [0, 1].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Curve {
    /// Output value per control point, each in [0, 1].
    pub points: Vec<f32>,
}

impl Curve {
    pub fn new(points: Vec<f32>) -> Self {
        Self { points }
    }

    /// The straight line `y = x`.
    pub fn identity() -> Self {
        Self {
            points: vec![0.0, 1.0],
        }
    }

    /// Precompute tangents for repeated evaluation.
    pub fn interpolator(&self) -> MonotoneInterpolator {
        MonotoneInterpolator::new(&self.points)
    }

    /// Bake into a 256-entry float table clamped to [0, 1].
    pub fn to_lut(&self) -> Channel {
        let interp = self.interpolator();
        std::array::from_fn(|i| {
            interp
                .evaluate(i as f32 / (LUT_SIZE - 1) as f32)
                .clamp(0.0, 1.0)
        })
    }

    /// Bake and broadcast to all three channels.
    pub fn to_lut1d(&self) -> Lut1D {
        Lut1D::from_master(self.to_lut())
    }
}

impl Default for Curve {
    fn default() -> Self {
        Self::identity()
    }
}

/// A Fritsch–Carlson monotone cubic interpolator over equally spaced knots.
#[derive(Debug, Clone)]
pub struct MonotoneInterpolator {
    ys: Vec<f32>,
    tangents: Vec<f32>,
}

impl MonotoneInterpolator {
    /// Build from output values at `i / (n − 1)`.
    pub fn new(points: &[f32]) -> Self {
        Self {
            ys: points.to_vec(),
            tangents: monotone_tangents(points),
        }
    }

    /// Evaluate at `x`.
    ///
    /// No points is the identity; one point is a constant.
    pub fn evaluate(&self, x: f32) -> f32 {
        let n = self.ys.len();
        match n {
            0 => return x,
            1 => return self.ys[0],
            _ => {}
        }
        if x <= 0.0 {
            return self.ys[0];
        }
        if x >= 1.0 {
            return self.ys[n - 1];
        }

        let segments = (n - 1) as f32;
        let h = 1.0 / segments;
        let k = ((x * segments) as usize).min(n - 2);
        let t = (x - k as f32 * h) / h;

        let t2 = t * t;
        let t3 = t2 * t;
        let h00 = 2.0 * t3 - 3.0 * t2 + 1.0;
        let h10 = t3 - 2.0 * t2 + t;
        let h01 = -2.0 * t3 + 3.0 * t2;
        let h11 = t3 - t2;

        h00 * self.ys[k]
            + h10 * h * self.tangents[k]
            + h01 * self.ys[k + 1]
            + h11 * h * self.tangents[k + 1]
    }
}

/// Fritsch–Carlson tangents for knots at `i / (n − 1)`.
fn monotone_tangents(ys: &[f32]) -> Vec<f32> {
    let n = ys.len();
    if n < 2 {
        return vec![0.0; n];
    }

    let h = 1.0 / (n - 1) as f32;
    let delta: Vec<f32> = ys.windows(2).map(|w| (w[1] - w[0]) / h).collect();

    let mut m = vec![0.0_f32; n];
    m[0] = delta[0];
    m[n - 1] = delta[n - 2];
    for i in 1..n - 1 {
        let (d0, d1) = (delta[i - 1], delta[i]);
        m[i] = if d0 * d1 <= 0.0 {
            0.0
        } else {
            2.0 * d0 * d1 / (d0 + d1)
        };
    }

    for i in 0..n - 1 {
        if delta[i].abs() < FLAT_EPSILON {
            m[i] = 0.0;
            m[i + 1] = 0.0;
            continue;
        }
        let alpha = m[i] / delta[i];
        let beta = m[i + 1] / delta[i];
        let norm = alpha * alpha + beta * beta;
        if norm > 9.0 {
            let tau = 3.0 / norm.sqrt();
            m[i] = tau * alpha * delta[i];
            m[i + 1] = tau * beta * delta[i];
        }
    }

    m
}
