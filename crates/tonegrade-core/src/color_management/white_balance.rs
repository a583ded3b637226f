//! White balance as per-channel gains.
//!
//! The tone pipeline works on independent 1D channel tables, so temperature
//! and tint are expressed as one multiplier per channel rather than a 3x3
//! adaptation matrix:
//!
//! ```text
//! temperature t:  R × (1 + 0.2 t)   G × 1            B × (1 − 0.2 t)
//! tint k:         R × (1 + 0.05 k)  G × (1 − 0.15 k) B × (1 + 0.05 k)
//! ```
//!
//! Positive temperature warms (R > G > B), positive tint pushes toward
//! magenta (R, B > G).

/// Rec. 709 luminance weights.
pub const LUMA_REC709: [f32; 3] = [0.2126, 0.7152, 0.0722];

const TEMPERATURE_SCALE: f32 = 0.2;
const TINT_GREEN_SCALE: f32 = 0.15;
const TINT_MAGENTA_SCALE: f32 = 0.05;

/// Per-channel gains for a temperature/tint pair.
///
/// Both at 0.0 return `[1, 1, 1]`.
pub fn channel_gains(temperature: f32, tint: f32) -> [f32; 3] {
    [
        (1.0 + TEMPERATURE_SCALE * temperature) * (1.0 + TINT_MAGENTA_SCALE * tint),
        1.0 - TINT_GREEN_SCALE * tint,
        (1.0 - TEMPERATURE_SCALE * temperature) * (1.0 + TINT_MAGENTA_SCALE * tint),
    ]
    .map(|g| g.max(0.0))
}

/// Rec. 709 luma of an RGB triple.
#[inline]
pub fn luma(rgb: [f32; 3]) -> f32 {
    rgb[0] * LUMA_REC709[0] + rgb[1] * LUMA_REC709[1] + rgb[2] * LUMA_REC709[2]
}

/// Gray-world gains that neutralize the given per-channel means.
///
/// Each gain moves its channel mean toward the mean's luma. `strength` in
/// [0, 1] blends between no correction and full neutralization, and the
/// result is clamped to `[min_gain, max_gain]`. Near-black means (no usable
/// color signal) return unity gains.
pub fn gray_world_gains(means: [f32; 3], strength: f32, min_gain: f32, max_gain: f32) -> [f32; 3] {
    let y = luma(means);
    if y < 1e-4 {
        return [1.0; 3];
    }

    let mut gains = [1.0_f32; 3];
    for c in 0..3 {
        let full = if means[c] > 1e-6 { y / means[c] } else { max_gain };
        gains[c] = (1.0 + (full - 1.0) * strength).clamp(min_gain, max_gain);
    }
    gains
}
