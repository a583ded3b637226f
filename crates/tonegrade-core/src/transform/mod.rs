//! Lookup tables — 1D and 3D LUT types, `.cube` text, and pixel application.

pub mod apply;
pub mod cube;
pub mod lut1d;
pub mod lut3d;
