//! The ordered tone stages behind [`Adjustment`].
//!
//! Every stage is a scalar function of one normalized code value in [0, 1].
//! Master stages are the same on R, G and B; per-channel stages
//! (white balance, color balance, split-toning) depend on which channel is
//! being rendered, and are skipped when baking a master curve.
//!
//! ```text
//!   x ─→ Exposure ─→ Highlights/Shadows ─→ Whites/Blacks ─→ Brightness ─→ Contrast
//!     ─→ WhiteBalance ─→ ColorBalance ─→ SplitTone ─→ Clarity ─→ Fade ─→ y
//! ```
//!
//! Each stage returns its input unchanged at its identity value, clamps its
//! output to [0, 1], and is non-decreasing over the documented parameter
//! range.

use crate::color_management::transfer::{linear_to_srgb, srgb_to_linear};
use crate::color_management::white_balance::channel_gains;
use crate::grading::adjustment::{Adjustment, IDENTITY_EPSILON};
use crate::transform::lut1d::ChannelId;

/// One step of the tone pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Exposure,
    HighlightsShadows,
    WhitesBlacks,
    Brightness,
    Contrast,
    WhiteBalance,
    ColorBalance,
    SplitTone,
    Clarity,
    Fade,
}

/// Stage evaluation order.
pub const PIPELINE: [Stage; 10] = [
    Stage::Exposure,
    Stage::HighlightsShadows,
    Stage::WhitesBlacks,
    Stage::Brightness,
    Stage::Contrast,
    Stage::WhiteBalance,
    Stage::ColorBalance,
    Stage::SplitTone,
    Stage::Clarity,
    Stage::Fade,
];

const HIGHLIGHTS_SHADOWS_SCALE: f32 = 0.5;
const WHITES_BLACKS_SCALE: f32 = 0.15;
const CONTRAST_STEEPNESS: f64 = 10.0;
const BALANCE_LIFT_SCALE: f32 = 0.2;
const BALANCE_GAIN_SCALE: f32 = 0.2;
const BALANCE_GAMMA_SCALE: f32 = 0.5;
const SPLIT_TONE_SCALE: f32 = 0.2;
const SPLIT_BALANCE_SHIFT: f32 = 0.25;
const CLARITY_SCALE: f32 = 0.5;
const FADE_SCALE: f32 = 0.25;

impl Stage {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Exposure => "exposure",
            Self::HighlightsShadows => "highlights_shadows",
            Self::WhitesBlacks => "whites_blacks",
            Self::Brightness => "brightness",
            Self::Contrast => "contrast",
            Self::WhiteBalance => "white_balance",
            Self::ColorBalance => "color_balance",
            Self::SplitTone => "split_tone",
            Self::Clarity => "clarity",
            Self::Fade => "fade",
        }
    }

    /// True for stages whose output differs between R, G and B.
    pub const fn is_per_channel(self) -> bool {
        matches!(
            self,
            Self::WhiteBalance | Self::ColorBalance | Self::SplitTone
        )
    }

    /// True when `adj` leaves this stage at its identity.
    pub fn is_identity(self, adj: &Adjustment) -> bool {
        let zero = |v: f32| v.abs() < IDENTITY_EPSILON;
        match self {
            Self::Exposure => zero(adj.exposure),
            Self::HighlightsShadows => zero(adj.highlights) && zero(adj.shadows),
            Self::WhitesBlacks => zero(adj.whites) && zero(adj.blacks),
            Self::Brightness => zero(adj.brightness),
            Self::Contrast => zero(adj.contrast),
            Self::WhiteBalance => zero(adj.temperature) && zero(adj.tint),
            Self::ColorBalance => ChannelId::ALL.iter().all(|&c| {
                let (lift, mid, gain) = adj.balance(c);
                zero(lift) && zero(mid) && zero(gain)
            }),
            Self::SplitTone => zero(adj.split_shadow_amount) && zero(adj.split_highlight_amount),
            Self::Clarity => zero(adj.clarity),
            Self::Fade => zero(adj.fade),
        }
    }

    /// Evaluate this stage for one channel.
    pub fn apply(self, adj: &Adjustment, channel: ChannelId, x: f32) -> f32 {
        match self {
            Self::Exposure => apply_exposure(x, adj.exposure),
            Self::HighlightsShadows => apply_highlights_shadows(x, adj.highlights, adj.shadows),
            Self::WhitesBlacks => apply_whites_blacks(x, adj.whites, adj.blacks),
            Self::Brightness => apply_brightness(x, adj.brightness),
            Self::Contrast => apply_contrast(x, adj.contrast),
            Self::WhiteBalance => {
                let gains = channel_gains(adj.temperature, adj.tint);
                (x * gains[channel.index()]).clamp(0.0, 1.0)
            }
            Self::ColorBalance => {
                let (lift, mid, gain) = adj.balance(channel);
                apply_color_balance(x, lift, mid, gain)
            }
            Self::SplitTone => apply_split_tone(x, adj, channel),
            Self::Clarity => apply_clarity(x, adj.clarity),
            Self::Fade => apply_fade(x, adj.fade),
        }
    }
}

/// Hermite smoothstep between two edges.
#[inline]
pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Scale linear light by `2^ev`.
///
/// ```text
/// out = encode(decode(in) × 2^ev)
/// ```
pub fn apply_exposure(x: f32, ev: f32) -> f32 {
    if ev.abs() < 1e-7 {
        return x;
    }
    linear_to_srgb(srgb_to_linear(x) * ev.exp2()).clamp(0.0, 1.0)
}

/// Lift or recover the upper and lower halves with a soft crossover.
///
/// ```text
/// w_h = smoothstep(0.25, 0.75, in)
/// out = in + 0.5 × highlights × w_h × (1 − in)
///          + 0.5 × shadows × (1 − w_h) × in
/// ```
///
/// The `(1 − in)` and `in` factors pin both endpoints.
pub fn apply_highlights_shadows(x: f32, highlights: f32, shadows: f32) -> f32 {
    if highlights.abs() < 1e-7 && shadows.abs() < 1e-7 {
        return x;
    }
    let w_h = smoothstep(0.25, 0.75, x);
    let w_s = 1.0 - w_h;
    let out = x
        + HIGHLIGHTS_SHADOWS_SCALE * highlights * w_h * (1.0 - x)
        + HIGHLIGHTS_SHADOWS_SCALE * shadows * w_s * x;
    out.clamp(0.0, 1.0)
}

/// Push the top and bottom quarter of the range.
///
/// Narrower than [`apply_highlights_shadows`]: midtones are untouched and
/// the endpoints move.
pub fn apply_whites_blacks(x: f32, whites: f32, blacks: f32) -> f32 {
    if whites.abs() < 1e-7 && blacks.abs() < 1e-7 {
        return x;
    }
    let out = x
        + WHITES_BLACKS_SCALE * whites * smoothstep(0.75, 1.0, x)
        + WHITES_BLACKS_SCALE * blacks * (1.0 - smoothstep(0.0, 0.25, x));
    out.clamp(0.0, 1.0)
}

/// Midtone gamma: `in^(2^−brightness)`.
pub fn apply_brightness(x: f32, brightness: f32) -> f32 {
    if brightness.abs() < 1e-7 {
        return x;
    }
    x.max(0.0).powf((-brightness).exp2()).clamp(0.0, 1.0)
}

/// Contrast around mid-gray.
///
/// Positive values use a logistic curve normalized so 0 and 1 map to
/// themselves; negative values blend toward 0.5, reaching a flat 0.5 at −1.
pub fn apply_contrast(x: f32, contrast: f32) -> f32 {
    if contrast.abs() < IDENTITY_EPSILON {
        return x;
    }
    if contrast > 0.0 {
        let k = CONTRAST_STEEPNESS * contrast as f64;
        let s = |v: f64| 1.0 / (1.0 + (-k * (v - 0.5)).exp());
        let (s0, s1) = (s(0.0), s(1.0));
        (((s(x as f64) - s0) / (s1 - s0)) as f32).clamp(0.0, 1.0)
    } else {
        let t = (-contrast).min(1.0);
        (0.5 * t + x * (1.0 - t)).clamp(0.0, 1.0)
    }
}

/// Lift/gamma/gain for one channel.
///
/// ```text
/// lift = 0.2 × shadows     gain = 1 + 0.2 × highlights
/// v    = lift + in × (gain − lift)
/// out  = max(v, 0)^(2^(−0.5 × midtones))
/// ```
pub fn apply_color_balance(x: f32, shadows: f32, midtones: f32, highlights: f32) -> f32 {
    let lift = BALANCE_LIFT_SCALE * shadows;
    let gain = 1.0 + BALANCE_GAIN_SCALE * highlights;
    let v = lift + x * (gain - lift);
    let exponent = (-BALANCE_GAMMA_SCALE * midtones).exp2();
    v.max(0.0).powf(exponent).clamp(0.0, 1.0)
}

/// Tint shadows and highlights toward two hues.
///
/// The tint is a signed offset `tint[c] − 0.5` from a fully saturated HSL
/// color, weighted by the zone and by a `4x(1 − x)` envelope so the
/// endpoints stay fixed. Balance moves the crossover.
pub fn apply_split_tone(x: f32, adj: &Adjustment, channel: ChannelId) -> f32 {
    let (amt_s, amt_h) = (adj.split_shadow_amount, adj.split_highlight_amount);
    if amt_s.abs() < 1e-7 && amt_h.abs() < 1e-7 {
        return x;
    }
    let c = channel.index();
    let shadow_tint = hue_color(adj.split_shadow_hue)[c] - 0.5;
    let highlight_tint = hue_color(adj.split_highlight_hue)[c] - 0.5;

    let w_h = smoothstep(0.0, 1.0, x - SPLIT_BALANCE_SHIFT * adj.split_balance);
    let w_s = 1.0 - w_h;
    let envelope = 4.0 * x * (1.0 - x);

    let offset = SPLIT_TONE_SCALE * envelope * (amt_s * w_s * shadow_tint + amt_h * w_h * highlight_tint);
    (x + offset).clamp(0.0, 1.0)
}

/// Midtone contrast: `in + 0.5 × clarity × (in − 0.5) × 4in(1 − in)`.
pub fn apply_clarity(x: f32, clarity: f32) -> f32 {
    if clarity.abs() < 1e-7 {
        return x;
    }
    let c = clarity.clamp(-1.0, 1.0);
    let out = x + CLARITY_SCALE * c * (x - 0.5) * 4.0 * x * (1.0 - x);
    out.clamp(0.0, 1.0)
}

/// Lift black toward `0.25 × fade` while white stays fixed.
pub fn apply_fade(x: f32, fade: f32) -> f32 {
    if fade.abs() < 1e-7 {
        return x;
    }
    let f = FADE_SCALE * fade;
    (f + x * (1.0 - f)).clamp(0.0, 1.0)
}

/// Fully saturated RGB for a hue in turns.
fn hue_color(turns: f32) -> [f32; 3] {
    hsl_to_rgb(turns.rem_euclid(1.0) * 360.0, 1.0, 0.5)
}

/// Convert HSL (hue in degrees, saturation and lightness in 0..1) to RGB.
pub fn hsl_to_rgb(hue: f32, sat: f32, lum: f32) -> [f32; 3] {
    if sat.abs() < 1e-10 {
        return [lum, lum, lum];
    }

    let q = if lum < 0.5 {
        lum * (1.0 + sat)
    } else {
        lum + sat - lum * sat
    };
    let p = 2.0 * lum - q;
    let h = hue / 360.0;

    [
        hue_to_rgb(p, q, h + 1.0 / 3.0),
        hue_to_rgb(p, q, h),
        hue_to_rgb(p, q, h - 1.0 / 3.0),
    ]
}

fn hue_to_rgb(p: f32, q: f32, mut t: f32) -> f32 {
    if t < 0.0 {
        t += 1.0;
    }
    if t > 1.0 {
        t -= 1.0;
    }
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 1.0 / 2.0 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * (2.0 / 3.0 - t) * 6.0
    } else {
        p
    }
}
