//! Oklab conversion for 8-bit sRGB pixels.
//!
//! Luminance analysis works on Oklab `L` rather than raw luma: it is
//! perceptually uniform and independent of hue and chroma, so remapping `L`
//! while holding `a`/`b` fixed changes tone without shifting hue.

use palette::{FromColor, LinSrgb, Oklab, Srgb};

/// Convert an 8-bit sRGB triple to Oklab.
#[inline]
pub fn oklab_from_srgb8(rgb: [u8; 3]) -> Oklab {
    let linear: LinSrgb = Srgb::new(rgb[0], rgb[1], rgb[2])
        .into_format::<f32>()
        .into_linear();
    Oklab::from_color(linear)
}

/// Convert Oklab back to 8-bit sRGB, clamping out-of-gamut results.
#[inline]
pub fn srgb8_from_oklab(lab: Oklab) -> [u8; 3] {
    let linear = LinSrgb::from_color(lab);
    let encoded: Srgb<u8> = Srgb::<f32>::from_linear(linear).into_format();
    [encoded.red, encoded.green, encoded.blue]
}

/// Oklab lightness of an 8-bit sRGB triple, in [0, 1].
#[inline]
pub fn lightness(rgb: [u8; 3]) -> f32 {
    oklab_from_srgb8(rgb).l.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_black_and_white_lightness() {
        assert!(lightness([0, 0, 0]).abs() < 1e-4);
        assert!((lightness([255, 255, 255]) - 1.0).abs() < 1e-3);
    }

    #[test]
    fn test_gray_has_no_chroma() {
        let lab = oklab_from_srgb8([128, 128, 128]);
        assert!(lab.a.abs() < 1e-3, "a = {}", lab.a);
        assert!(lab.b.abs() < 1e-3, "b = {}", lab.b);
    }

    #[test]
    fn test_roundtrip_within_one_code_value() {
        for rgb in [[200u8, 40, 90], [12, 180, 33], [250, 250, 10], [0, 0, 255]] {
            let back = srgb8_from_oklab(oklab_from_srgb8(rgb));
            for c in 0..3 {
                assert!(
                    (back[c] as i32 - rgb[c] as i32).abs() <= 1,
                    "channel {c}: {rgb:?} -> {back:?}"
                );
            }
        }
    }
}
