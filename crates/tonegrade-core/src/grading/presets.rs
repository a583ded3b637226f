//! Named looks: an [`Adjustment`] plus an optional explicit [`Curve`].
//!
//! Built-in presets are compiled in. JSON is accepted for interchange and
//! must spell out the full adjustment record.

use serde::{Deserialize, Serialize};

use crate::error::GradeError;
use crate::grading::adjustment::Adjustment;
use crate::grading::curve::Curve;
use crate::transform::lut1d::Lut1D;

/// A named grading look.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Preset {
    pub name: String,
    pub adjustment: Adjustment,
    /// Applied after the adjustment pipeline.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub curve: Option<Curve>,
}

impl Preset {
    pub fn new(name: impl Into<String>, adjustment: Adjustment) -> Self {
        Self {
            name: name.into(),
            adjustment,
            curve: None,
        }
    }

    pub fn with_curve(mut self, curve: Curve) -> Self {
        self.curve = Some(curve);
        self
    }

    pub fn from_json(json: &str) -> Result<Self, GradeError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, GradeError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Adjustment LUT followed by the curve, composed at float precision.
    pub fn to_lut1d(&self) -> Lut1D {
        let lut = self.adjustment.to_lut_float_rgb();
        match &self.curve {
            Some(curve) => Lut1D::compose(&lut, &curve.to_lut1d()),
            None => lut,
        }
    }
}

/// The compiled-in preset table.
pub fn builtin_presets() -> Vec<Preset> {
    let id = Adjustment::identity();
    vec![
        Preset::new("Neutral", id),
        Preset::new(
            "Punchy",
            Adjustment {
                contrast: 0.35,
                clarity: 0.3,
                highlights: -0.2,
                shadows: 0.15,
                ..id
            },
        ),
        Preset::new(
            "Warm Fade",
            Adjustment {
                temperature: 0.35,
                tint: 0.05,
                fade: 0.4,
                contrast: -0.15,
                ..id
            },
        ),
        Preset::new(
            "Cool Shadows",
            Adjustment {
                split_shadow_hue: 0.58,
                split_shadow_amount: 0.6,
                split_highlight_hue: 0.1,
                split_highlight_amount: 0.3,
                ..id
            },
        ),
        Preset::new(
            "Bright Airy",
            Adjustment {
                exposure: 0.4,
                brightness: 0.2,
                highlights: -0.3,
                contrast: -0.1,
                ..id
            },
        ),
        Preset::new(
            "Teal Orange",
            Adjustment {
                balance_shadows_b: 0.3,
                balance_shadows_g: 0.1,
                balance_highlights_r: 0.25,
                balance_highlights_b: -0.2,
                contrast: 0.2,
                ..id
            },
        ),
        Preset::new(
            "Matte",
            Adjustment {
                fade: 0.6,
                whites: -0.4,
                ..id
            },
        )
        .with_curve(Curve::new(vec![0.06, 0.28, 0.52, 0.74, 0.92])),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::lut1d::LUT_SIZE;

    #[test]
    fn test_builtin_names_are_unique() {
        let presets = builtin_presets();
        let mut names: Vec<_> = presets.iter().map(|p| p.name.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), presets.len());
    }

    #[test]
    fn test_neutral_preset_is_identity() {
        let q = builtin_presets()[0].to_lut1d().quantize();
        assert!(q.is_identity());
    }

    #[test]
    fn test_builtin_luts_are_monotone() {
        for preset in builtin_presets() {
            let q = preset.to_lut1d().quantize();
            for table in [&q.r, &q.g, &q.b] {
                for i in 1..LUT_SIZE {
                    assert!(table[i] >= table[i - 1], "{} at {i}", preset.name);
                }
            }
        }
    }

    #[test]
    fn test_curve_applies_after_adjustment() {
        let preset = Preset::new("Lift", Adjustment::identity())
            .with_curve(Curve::new(vec![0.2, 1.0]));
        let q = preset.to_lut1d().quantize();
        assert_eq!(q.r[0], 51);
        assert_eq!(q.r[255], 255);
    }

    #[test]
    fn test_json_preserves_preset() {
        for preset in builtin_presets() {
            let json = preset.to_json().unwrap();
            assert_eq!(Preset::from_json(&json).unwrap(), preset);
        }
    }

    #[test]
    fn test_json_rejects_unknown_fields() {
        let mut value: serde_json::Value =
            serde_json::from_str(&builtin_presets()[1].to_json().unwrap()).unwrap();
        value["vignette"] = serde_json::json!(0.5);
        let err = Preset::from_json(&value.to_string()).unwrap_err();
        assert!(matches!(err, GradeError::Preset(_)), "{err}");
    }

    #[test]
    fn test_json_rejects_partial_adjustment() {
        let json = r#"{"name": "Half", "adjustment": {"exposure": 0.5}}"#;
        assert!(Preset::from_json(json).is_err());
    }
}
