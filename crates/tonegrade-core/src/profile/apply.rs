//! Applying lightness curves in Oklab.

use crate::color_management::oklab::{oklab_from_srgb8, srgb8_from_oklab};
use crate::image::PixelBuffer;
use crate::profile::{LuminanceProfile, lightness_bin};
use crate::transform::apply::map_pixels;
use crate::transform::lut1d::Channel;

/// Remap Oklab `L` of every pixel through `lut`.
///
/// `L` is looked up at its nearest 8-bit bin. `a`, `b` and alpha are left
/// untouched, so hue is preserved up to gamut clipping on the way back to
/// sRGB.
pub fn apply_luminance_lut(image: &PixelBuffer, lut: &Channel) -> PixelBuffer {
    tracing::trace!(pixels = image.len(), "applying luminance LUT");
    map_pixels(image, |px| {
        let mut lab = oklab_from_srgb8([px[0], px[1], px[2]]);
        lab.l = lut[lightness_bin(lab.l)];
        let [r, g, b] = srgb8_from_oklab(lab);
        [r, g, b, px[3]]
    })
}

/// Shift `lut` so the profile's pixels average to `target_mean` after remapping.
///
/// The shift is a single additive offset weighted by the profile's
/// histogram; the result is clamped to [0, 1]. A profile with no pixels
/// returns the LUT unchanged.
pub fn shift_lut_to_preserve_mean(
    lut: &Channel,
    profile: &LuminanceProfile,
    target_mean: f32,
) -> Channel {
    let total: u64 = profile.histogram.iter().map(|&c| c as u64).sum();
    if total == 0 {
        return *lut;
    }
    let weighted: f64 = profile
        .histogram
        .iter()
        .zip(lut.iter())
        .map(|(&c, &v)| c as f64 * v as f64)
        .sum();
    let current = (weighted / total as f64) as f32;
    let shift = target_mean - current;
    tracing::debug!(current, target_mean, shift, "shifting LUT to preserve mean");
    lut.map(|v| (v + shift).clamp(0.0, 1.0))
}
