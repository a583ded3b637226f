//! Grading tools: tone curves, the adjustment pipeline, presets, and
//! automatic corrections.

pub mod adjustment;
pub mod auto_correction;
pub mod curve;
pub mod presets;
pub mod saturation_correction;
pub mod spline;
pub mod stages;
