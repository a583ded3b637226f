//! The flat parameter record that drives the tone pipeline.
//!
//! `Adjustment` is the single source of truth for authored grading values.
//! Every field is mandatory; [`Adjustment::identity`] documents the value at
//! which each one has no effect. Presets build on it with struct-update
//! syntax, so the full parameter surface is visible at every call site.

use serde::{Deserialize, Serialize};

use crate::grading::stages::{self, Stage};
use crate::transform::lut1d::{Channel, ChannelId, LUT_SIZE, Lut1D, quantize_channel};

/// Largest deviation from the identity value that still counts as identity.
pub const IDENTITY_EPSILON: f32 = 1e-3;

/// Named scalar grading parameters.
///
/// Ranges are approximately [−1, 1] unless noted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Adjustment {
    /// Exposure in EV, applied in linear light. Range ≈ [−2, 2]. Identity 0.
    pub exposure: f32,
    /// Highlight lift/recovery. Identity 0.
    pub highlights: f32,
    /// Shadow lift/crush. Identity 0.
    pub shadows: f32,
    /// White point push, narrower than highlights. Identity 0.
    pub whites: f32,
    /// Black point push, narrower than shadows. Identity 0.
    pub blacks: f32,
    /// Midtone gamma: `x^(2^−brightness)`. Identity 0.
    pub brightness: f32,
    /// Sigmoid contrast above 0, compression toward 0.5 below. Identity 0.
    pub contrast: f32,
    /// Warm (+) / cool (−) channel gains. Identity 0.
    pub temperature: f32,
    /// Magenta (+) / green (−) channel gains. Identity 0.
    pub tint: f32,
    /// Midtone local-contrast push. Identity 0.
    pub clarity: f32,
    /// Black lift with fixed white. Identity 0.
    pub fade: f32,
    /// Shadow tint hue in turns. Identity 1 (inert while the amount is 0).
    pub split_shadow_hue: f32,
    /// Shadow tint strength in [0, 1]. Identity 0.
    pub split_shadow_amount: f32,
    /// Highlight tint hue in turns. Identity 1 (inert while the amount is 0).
    pub split_highlight_hue: f32,
    /// Highlight tint strength in [0, 1]. Identity 0.
    pub split_highlight_amount: f32,
    /// Moves the shadow/highlight crossover up (+) or down (−). Identity 0.
    pub split_balance: f32,
    /// Red lift. Identity 0.
    pub balance_shadows_r: f32,
    /// Green lift. Identity 0.
    pub balance_shadows_g: f32,
    /// Blue lift. Identity 0.
    pub balance_shadows_b: f32,
    /// Red midtone gamma. Identity 0.
    pub balance_midtones_r: f32,
    /// Green midtone gamma. Identity 0.
    pub balance_midtones_g: f32,
    /// Blue midtone gamma. Identity 0.
    pub balance_midtones_b: f32,
    /// Red gain. Identity 0.
    pub balance_highlights_r: f32,
    /// Green gain. Identity 0.
    pub balance_highlights_g: f32,
    /// Blue gain. Identity 0.
    pub balance_highlights_b: f32,
}

impl Adjustment {
    /// The no-op adjustment.
    pub const fn identity() -> Self {
        Self {
            exposure: 0.0,
            highlights: 0.0,
            shadows: 0.0,
            whites: 0.0,
            blacks: 0.0,
            brightness: 0.0,
            contrast: 0.0,
            temperature: 0.0,
            tint: 0.0,
            clarity: 0.0,
            fade: 0.0,
            split_shadow_hue: 1.0,
            split_shadow_amount: 0.0,
            split_highlight_hue: 1.0,
            split_highlight_amount: 0.0,
            split_balance: 0.0,
            balance_shadows_r: 0.0,
            balance_shadows_g: 0.0,
            balance_shadows_b: 0.0,
            balance_midtones_r: 0.0,
            balance_midtones_g: 0.0,
            balance_midtones_b: 0.0,
            balance_highlights_r: 0.0,
            balance_highlights_g: 0.0,
            balance_highlights_b: 0.0,
        }
    }

    fn fields(&self) -> [f32; 25] {
        [
            self.exposure,
            self.highlights,
            self.shadows,
            self.whites,
            self.blacks,
            self.brightness,
            self.contrast,
            self.temperature,
            self.tint,
            self.clarity,
            self.fade,
            self.split_shadow_hue,
            self.split_shadow_amount,
            self.split_highlight_hue,
            self.split_highlight_amount,
            self.split_balance,
            self.balance_shadows_r,
            self.balance_shadows_g,
            self.balance_shadows_b,
            self.balance_midtones_r,
            self.balance_midtones_g,
            self.balance_midtones_b,
            self.balance_highlights_r,
            self.balance_highlights_g,
            self.balance_highlights_b,
        ]
    }

    /// True when every field is within [`IDENTITY_EPSILON`] of its identity value.
    pub fn is_identity(&self) -> bool {
        self.fields()
            .iter()
            .zip(Self::identity().fields())
            .all(|(v, id)| (v - id).abs() < IDENTITY_EPSILON)
    }

    /// Per-zone color balance for one channel as `(lift, midtones, gain)` amounts.
    pub fn balance(&self, channel: ChannelId) -> (f32, f32, f32) {
        match channel {
            ChannelId::Red => (
                self.balance_shadows_r,
                self.balance_midtones_r,
                self.balance_highlights_r,
            ),
            ChannelId::Green => (
                self.balance_shadows_g,
                self.balance_midtones_g,
                self.balance_highlights_g,
            ),
            ChannelId::Blue => (
                self.balance_shadows_b,
                self.balance_midtones_b,
                self.balance_highlights_b,
            ),
        }
    }

    /// True when any per-channel stage would make R, G and B diverge.
    pub fn has_channel_stages(&self) -> bool {
        stages::PIPELINE
            .iter()
            .any(|s| s.is_per_channel() && !s.is_identity(self))
    }

    /// Master tone curve as a float table. Per-channel stages are skipped.
    pub fn to_lut_float(&self) -> Channel {
        render_channel(self, None)
    }

    /// Master tone curve quantized to 8-bit.
    pub fn to_lut(&self) -> [u8; LUT_SIZE] {
        quantize_channel(&self.to_lut_float())
    }

    /// Full per-channel LUT including temperature/tint, color balance and
    /// split-toning.
    ///
    /// When no per-channel stage is active the three channels share one
    /// table.
    pub fn to_lut_float_rgb(&self) -> Lut1D {
        if !self.has_channel_stages() {
            return Lut1D::from_master(self.to_lut_float());
        }
        Lut1D::from_channels(
            render_channel(self, Some(ChannelId::Red)),
            render_channel(self, Some(ChannelId::Green)),
            render_channel(self, Some(ChannelId::Blue)),
        )
    }
}

impl Default for Adjustment {
    fn default() -> Self {
        Self::identity()
    }
}

/// Run every input code value through the stage pipeline.
///
/// `None` renders the master curve, which skips per-channel stages.
fn render_channel(adj: &Adjustment, channel: Option<ChannelId>) -> Channel {
    let active: Vec<Stage> = stages::PIPELINE
        .iter()
        .copied()
        .filter(|s| !s.is_identity(adj))
        .filter(|s| channel.is_some() || !s.is_per_channel())
        .collect();
    let id = channel.unwrap_or(ChannelId::Green);

    std::array::from_fn(|i| {
        let x = i as f32 / (LUT_SIZE - 1) as f32;
        active
            .iter()
            .fold(x, |v, stage| stage.apply(adj, id, v).clamp(0.0, 1.0))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_monotone(lut: &[u8; LUT_SIZE], label: &str) {
        for i in 1..LUT_SIZE {
            assert!(
                lut[i] >= lut[i - 1],
                "{label}: not monotone at {i}: {} < {}",
                lut[i],
                lut[i - 1]
            );
        }
    }

    fn with(f: impl FnOnce(&mut Adjustment)) -> Adjustment {
        let mut adj = Adjustment::identity();
        f(&mut adj);
        adj
    }

    #[test]
    fn test_identity_is_identity_mapping() {
        let lut = Adjustment::identity().to_lut();
        assert_eq!(lut[0], 0);
        assert_eq!(lut[127], 127);
        assert_eq!(lut[255], 255);
        for (i, v) in lut.iter().enumerate() {
            assert_eq!(*v as usize, i);
        }
    }

    #[test]
    fn test_is_identity_uses_epsilon() {
        assert!(Adjustment::identity().is_identity());
        assert!(with(|a| a.contrast = 5e-4).is_identity());
        assert!(!with(|a| a.contrast = 0.01).is_identity());
        assert!(!with(|a| a.split_shadow_hue = 0.3).is_identity());
    }

    #[test]
    fn test_monotone_for_tested_combinations() {
        let cases: Vec<(&str, Adjustment)> = vec![
            ("exposure +1", with(|a| a.exposure = 1.0)),
            ("exposure -2", with(|a| a.exposure = -2.0)),
            ("highlights +1", with(|a| a.highlights = 1.0)),
            ("highlights -1", with(|a| a.highlights = -1.0)),
            ("shadows +1", with(|a| a.shadows = 1.0)),
            ("shadows -1", with(|a| a.shadows = -1.0)),
            ("whites -1", with(|a| a.whites = -1.0)),
            ("blacks +1", with(|a| a.blacks = 1.0)),
            ("brightness +1", with(|a| a.brightness = 1.0)),
            ("brightness -1", with(|a| a.brightness = -1.0)),
            ("contrast +1", with(|a| a.contrast = 1.0)),
            ("contrast -0.5", with(|a| a.contrast = -0.5)),
            ("clarity +1", with(|a| a.clarity = 1.0)),
            ("clarity -1", with(|a| a.clarity = -1.0)),
            ("fade +1", with(|a| a.fade = 1.0)),
            (
                "mixed",
                with(|a| {
                    a.exposure = 0.5;
                    a.shadows = 0.4;
                    a.highlights = -0.4;
                    a.contrast = 0.3;
                    a.clarity = 0.2;
                    a.fade = 0.1;
                }),
            ),
        ];
        for (label, adj) in cases {
            assert_monotone(&adj.to_lut(), label);
        }
    }

    #[test]
    fn test_endpoints_preserved() {
        let cases = [
            with(|a| a.brightness = 0.8),
            with(|a| a.brightness = -0.8),
            with(|a| a.highlights = 1.0),
            with(|a| a.highlights = -1.0),
            with(|a| a.shadows = 1.0),
            with(|a| a.shadows = -1.0),
            with(|a| a.clarity = 1.0),
            with(|a| a.clarity = -1.0),
            with(|a| a.contrast = 0.7),
            with(|a| a.exposure = -0.5),
        ];
        for adj in cases {
            let lut = adj.to_lut();
            assert_eq!(lut[0], 0, "{adj:?}");
            assert_eq!(lut[255], 255, "{adj:?}");
        }
    }

    #[test]
    fn test_contrast_minus_one_is_flat_mid_gray() {
        let lut = with(|a| a.contrast = -1.0).to_lut();
        assert!(lut.iter().all(|&v| v == 128), "{lut:?}");
    }

    #[test]
    fn test_fade_lifts_black_and_holds_white() {
        let lut = with(|a| a.fade = 0.6).to_lut();
        assert!(lut[0] > 0);
        assert_eq!(lut[255], 255);
    }

    #[test]
    fn test_exposure_works_in_linear_light() {
        let lut = with(|a| a.exposure = 1.0).to_lut();
        assert!(
            (150..=180).contains(&lut[118]),
            "+1 EV on 118 gave {}",
            lut[118]
        );
        let lut = with(|a| a.exposure = -1.0).to_lut();
        assert!(lut[118] < 118);
    }

    #[test]
    fn test_whites_blacks_affect_midtones_less_than_highlights_shadows() {
        let mid = 128;
        let base = Adjustment::identity().to_lut()[mid] as i32;
        let hl = with(|a| a.highlights = 1.0).to_lut()[mid] as i32;
        let wh = with(|a| a.whites = 1.0).to_lut()[mid] as i32;
        let sh = with(|a| a.shadows = 1.0).to_lut()[mid] as i32;
        let bl = with(|a| a.blacks = 1.0).to_lut()[mid] as i32;
        assert!((wh - base).abs() < (hl - base).abs());
        assert!((bl - base).abs() < (sh - base).abs());

        // ...but they do move the extremes.
        assert!(with(|a| a.whites = -1.0).to_lut()[255] < 255);
        assert!(with(|a| a.blacks = 1.0).to_lut()[0] > 0);
    }

    #[test]
    fn test_neutral_white_balance_shares_channel_tables() {
        let adj = with(|a| {
            a.contrast = 0.4;
            a.exposure = 0.3;
        });
        let rgb = adj.to_lut_float_rgb();
        assert!(rgb.is_master());
        assert!(std::ptr::eq(
            rgb.channel(ChannelId::Red),
            rgb.channel(ChannelId::Green)
        ));
        assert_eq!(rgb.channel(ChannelId::Blue), &adj.to_lut_float());
    }

    #[test]
    fn test_temperature_orders_channels() {
        let warm = with(|a| a.temperature = 0.5).to_lut_float_rgb();
        let (r, g, b) = (
            warm.channel(ChannelId::Red)[128],
            warm.channel(ChannelId::Green)[128],
            warm.channel(ChannelId::Blue)[128],
        );
        assert!(r > g && g > b, "warm: {r} {g} {b}");

        let cool = with(|a| a.temperature = -0.5).to_lut_float_rgb();
        let (r, g, b) = (
            cool.channel(ChannelId::Red)[128],
            cool.channel(ChannelId::Green)[128],
            cool.channel(ChannelId::Blue)[128],
        );
        assert!(b > g && g > r, "cool: {r} {g} {b}");
    }

    #[test]
    fn test_tint_orders_channels() {
        let magenta = with(|a| a.tint = 0.5).to_lut_float_rgb();
        let r = magenta.channel(ChannelId::Red)[128];
        let g = magenta.channel(ChannelId::Green)[128];
        let b = magenta.channel(ChannelId::Blue)[128];
        assert!(r > g && b > g, "magenta: {r} {g} {b}");

        let green = with(|a| a.tint = -0.5).to_lut_float_rgb();
        let r = green.channel(ChannelId::Red)[128];
        let g = green.channel(ChannelId::Green)[128];
        let b = green.channel(ChannelId::Blue)[128];
        assert!(g > r && g > b, "green: {r} {g} {b}");
    }

    #[test]
    fn test_master_lut_ignores_channel_stages() {
        let adj = with(|a| a.temperature = 1.0);
        assert_eq!(adj.to_lut(), Adjustment::identity().to_lut());
        assert!(!adj.to_lut_float_rgb().is_master());
    }

    #[test]
    fn test_color_balance_lifts_one_channel() {
        let adj = with(|a| a.balance_shadows_b = 0.5);
        let lut = adj.to_lut_float_rgb().quantize();
        assert!(lut.b[0] > 0);
        assert_eq!(lut.r[0], 0);
        assert_eq!(lut.b[255], 255);
    }

    #[test]
    fn test_split_tone_tints_shadows_and_highlights() {
        // Shadows toward blue (2/3 turn), highlights toward orange (1/12 turn).
        let adj = with(|a| {
            a.split_shadow_hue = 2.0 / 3.0;
            a.split_shadow_amount = 1.0;
            a.split_highlight_hue = 1.0 / 12.0;
            a.split_highlight_amount = 1.0;
        });
        let lut = adj.to_lut_float_rgb();
        let (r_lo, b_lo) = (lut.channel(ChannelId::Red)[50], lut.channel(ChannelId::Blue)[50]);
        let (r_hi, b_hi) = (lut.channel(ChannelId::Red)[205], lut.channel(ChannelId::Blue)[205]);
        assert!(b_lo > r_lo, "shadows should lean blue: r={r_lo} b={b_lo}");
        assert!(r_hi > b_hi, "highlights should lean orange: r={r_hi} b={b_hi}");
    }

    #[test]
    fn test_outputs_stay_in_range_for_extreme_values() {
        let adj = Adjustment {
            exposure: 2.0,
            highlights: 1.0,
            shadows: 1.0,
            whites: 1.0,
            blacks: 1.0,
            brightness: 1.0,
            contrast: 1.0,
            temperature: 1.0,
            tint: -1.0,
            clarity: 1.0,
            fade: 1.0,
            split_shadow_amount: 1.0,
            split_highlight_amount: 1.0,
            balance_highlights_r: 1.0,
            balance_midtones_g: -1.0,
            ..Adjustment::identity()
        };
        let lut = adj.to_lut_float_rgb();
        for id in ChannelId::ALL {
            assert!(lut.channel(id).iter().all(|v| (0.0..=1.0).contains(v)));
        }
    }

    #[test]
    fn test_serde_requires_every_field() {
        let json = serde_json::to_string(&Adjustment::identity()).unwrap();
        let back: Adjustment = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Adjustment::identity());
        assert!(serde_json::from_str::<Adjustment>(r#"{"exposure": 1.0}"#).is_err());
    }
}
