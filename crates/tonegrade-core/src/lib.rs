//! Tonegrade Core — tone curves and lookup tables for 8-bit color grading.
//!
//! This crate turns grading parameters, or statistics measured from an
//! image, into deterministic 1D and 3D LUTs and applies them to RGBA8
//! pixel buffers. Everything is a pure function over plain values; the only
//! fallible entry points are the ones that accept foreign data.
//!
//! ```text
//!   pixels ─→ ImageStatistics / LuminanceProfile
//!          ─→ Adjustment (authored or AutoCorrection) / Curve
//!          ─→ Lut1D ─quantize→ QuantizedLut1D ─┐
//!          ─→ Lut3D ───────────────────────────┴→ apply ─→ pixels
//! ```

pub mod color_management;
pub mod error;
pub mod grading;
pub mod image;
pub mod profile;
pub mod scopes;
pub mod transform;

// Re-exports for convenience.
pub use error::GradeError;
pub use grading::adjustment::Adjustment;
pub use grading::auto_correction::{AutoCorrection, AutoCorrectionParams, AutoCorrectionResult};
pub use grading::curve::Curve;
pub use grading::presets::{Preset, builtin_presets};
pub use grading::saturation_correction::{
    SaturationCorrection, SaturationCorrectionResult, SaturationParams,
};
pub use image::PixelBuffer;
pub use profile::{FitType, LuminanceProfile, NormalizeParams};
pub use scopes::ImageStatistics;
pub use transform::apply::{apply_lut1d, apply_lut3d};
pub use transform::lut1d::{Channel, ChannelId, Lut1D, QuantizedLut1D};
pub use transform::lut3d::Lut3D;
