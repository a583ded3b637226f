//! Errors raised at the crate's data boundaries.
//!
//! The grading math itself is total: it degrades numerically instead of
//! failing. Only constructors that accept foreign data (raw pixel bytes, LUT
//! grids, `.cube` text, preset JSON) return a [`GradeError`].

#[derive(Debug, thiserror::Error)]
pub enum GradeError {
    #[error("pixel data has {len} bytes, expected {expected} for a {width}x{height} RGBA8 image")]
    BufferSize {
        width: u32,
        height: u32,
        len: usize,
        expected: usize,
    },
    #[error("3D LUT size must be at least 2, got {0}")]
    LutSize(usize),
    #[error("3D LUT data has {len} floats, expected {expected} for size {size}")]
    LutData {
        size: usize,
        len: usize,
        expected: usize,
    },
    #[error("invalid .cube data on line {line}: {reason}")]
    Cube { line: usize, reason: String },
    #[error("invalid preset JSON: {0}")]
    Preset(#[from] serde_json::Error),
}
