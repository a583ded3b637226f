//! sRGB transfer function (IEC 61966-2-1).
//!
//! Exposure is applied in linear light, so the tone pipeline round-trips
//! every 8-bit code value through these two functions.
//!
//! ```text
//! to_linear:   V <= 0.04045 → V / 12.92
//!              V >  0.04045 → ((V + 0.055) / 1.055) ^ 2.4
//!
//! to_encoded:  L <= 0.0031308 → L × 12.92
//!              L >  0.0031308 → 1.055 × L^(1/2.4) − 0.055
//! ```

/// Convert an sRGB-encoded value to linear light.
#[inline]
pub fn srgb_to_linear(encoded: f32) -> f32 {
    if encoded <= 0.04045 {
        encoded / 12.92
    } else {
        ((encoded + 0.055) / 1.055).powf(2.4)
    }
}

/// Convert a linear-light value to sRGB encoding.
#[inline]
pub fn linear_to_srgb(linear: f32) -> f32 {
    if linear <= 0.0031308 {
        linear * 12.92
    } else {
        1.055 * linear.powf(1.0 / 2.4) - 0.055
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-5;

    #[test]
    fn test_srgb_roundtrip_preserves_values() {
        for &v in &[0.0, 0.001, 0.01, 0.1, 0.5, 0.9, 1.0] {
            let back = srgb_to_linear(linear_to_srgb(v));
            assert!(
                (v - back).abs() < EPSILON,
                "roundtrip failed for {v}: back={back}, diff={}",
                (v - back).abs()
            );
        }
    }

    #[test]
    fn test_srgb_linearize_known_values() {
        assert!((srgb_to_linear(0.0) - 0.0).abs() < EPSILON);
        assert!((srgb_to_linear(1.0) - 1.0).abs() < EPSILON);
        // Mid-gray sRGB 0.5 is ~0.214 linear
        assert!((srgb_to_linear(0.5) - 0.214041).abs() < 0.001);
    }
}
