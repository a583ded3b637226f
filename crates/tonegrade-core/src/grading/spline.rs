//! Catmull-Rom fit through `[x, y]` knots.
//!
//! Used to turn the CDF control points of a luminance profile into a
//! smooth tone curve. Knots may be unevenly spaced. Each segment is a cubic
//! Hermite in the segment's own parameter with tangents
//! `mᵢ = (yᵢ₊₁ − yᵢ₋₁) / 2`; missing neighbors at the ends are mirrored, so
//! the end tangents equal the end secants.
//!
//! Unlike [`crate::grading::curve`] this does not guarantee monotonicity;
//! callers that need a valid tone curve clamp and enforce ordering afterwards.

use crate::transform::lut1d::{Channel, LUT_SIZE};

/// A Catmull-Rom spline over borrowed knots sorted by x.
#[derive(Debug, Clone, Copy)]
pub struct CatmullRom<'a> {
    knots: &'a [[f32; 2]],
}

impl<'a> CatmullRom<'a> {
    pub fn new(knots: &'a [[f32; 2]]) -> Self {
        Self { knots }
    }

    /// Evaluate at `x`.
    ///
    /// Outside the knot range the first/last y is held. Fewer than two
    /// knots is the identity.
    pub fn evaluate(&self, x: f32) -> f32 {
        let k = self.knots;
        let n = k.len();
        if n < 2 {
            return x;
        }
        if x <= k[0][0] {
            return k[0][1];
        }
        if x >= k[n - 1][0] {
            return k[n - 1][1];
        }

        // First knot strictly right of x closes the segment.
        let hi = k.partition_point(|p| p[0] <= x).clamp(1, n - 1);
        let lo = hi - 1;

        let y1 = k[lo][1];
        let y2 = k[hi][1];
        let y0 = if lo > 0 { k[lo - 1][1] } else { 2.0 * y1 - y2 };
        let y3 = if hi + 1 < n { k[hi + 1][1] } else { 2.0 * y2 - y1 };

        let width = k[hi][0] - k[lo][0];
        let t = if width.abs() < 1e-10 {
            0.5
        } else {
            (x - k[lo][0]) / width
        };

        hermite(y1, y2, 0.5 * (y2 - y0), 0.5 * (y3 - y1), t)
    }

    /// Sample at the 256 table inputs, unclamped.
    pub fn bake(&self) -> Channel {
        std::array::from_fn(|i| self.evaluate(i as f32 / (LUT_SIZE - 1) as f32))
    }
}

/// Cubic Hermite between `a` and `b` with end tangents `ma`, `mb`.
#[inline]
fn hermite(a: f32, b: f32, ma: f32, mb: f32, t: f32) -> f32 {
    let t2 = t * t;
    let t3 = t2 * t;
    (2.0 * t3 - 3.0 * t2 + 1.0) * a
        + (t3 - 2.0 * t2 + t) * ma
        + (3.0 * t2 - 2.0 * t3) * b
        + (t3 - t2) * mb
}

/// Bake knots into a 256-entry table. Empty knots give the identity.
pub fn bake_spline(knots: &[[f32; 2]]) -> Channel {
    CatmullRom::new(knots).bake()
}
