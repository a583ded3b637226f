//! 3D LUT grid with trilinear lookup.

use glam::Vec3;

use crate::error::GradeError;
use crate::transform::lut1d::{ChannelId, Lut1D};

/// Default grid size for LUTs emitted by the auto-correction passes.
pub const DEFAULT_LUT3D_SIZE: usize = 17;

/// A cubic grid mapping input RGB to output RGB.
///
/// Nodes are stored as a flat `size³ × 3` float array with red varying
/// fastest: node `(r, g, b)` starts at `(r + g·size + b·size²) × 3`.
/// This is also the `.cube` file ordering.
#[derive(Debug, Clone, PartialEq)]
pub struct Lut3D {
    size: usize,
    data: Vec<f32>,
}

impl Lut3D {
    /// Identity LUT: every node holds its own normalized coordinate.
    ///
    /// Sizes below 2 are raised to 2.
    pub fn identity(size: usize) -> Self {
        Self::from_fn(size, |rgb| rgb)
    }

    /// Bake a color function into a grid by evaluating it at every node.
    ///
    /// Sizes below 2 are raised to 2.
    pub fn from_fn(size: usize, f: impl Fn([f32; 3]) -> [f32; 3]) -> Self {
        let size = size.max(2);
        let scale = 1.0 / (size - 1) as f32;
        let mut data = Vec::with_capacity(size * size * size * 3);
        for b in 0..size {
            for g in 0..size {
                for r in 0..size {
                    let out = f([r as f32 * scale, g as f32 * scale, b as f32 * scale]);
                    data.extend_from_slice(&out);
                }
            }
        }
        Self { size, data }
    }

    /// Wrap an existing node array, validating its shape.
    pub fn from_data(size: usize, data: Vec<f32>) -> Result<Self, GradeError> {
        if size < 2 {
            return Err(GradeError::LutSize(size));
        }
        let expected = size * size * size * 3;
        if data.len() != expected {
            return Err(GradeError::LutData {
                size,
                len: data.len(),
                expected,
            });
        }
        Ok(Self { size, data })
    }

    /// Lift a per-channel 1D LUT onto a grid.
    pub fn from_lut1d(lut: &Lut1D, size: usize) -> Self {
        Self::from_fn(size, |rgb| {
            [
                lut.sample(ChannelId::Red, rgb[0]),
                lut.sample(ChannelId::Green, rgb[1]),
                lut.sample(ChannelId::Blue, rgb[2]),
            ]
        })
    }

    /// Grid size per axis.
    pub fn size(&self) -> usize {
        self.size
    }

    /// The flat node array.
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Node data as raw bytes, for texture uploads.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.data)
    }

    #[inline]
    fn offset(&self, r: usize, g: usize, b: usize) -> usize {
        (r + g * self.size + b * self.size * self.size) * 3
    }

    /// The output stored at integer grid coordinates.
    #[inline]
    pub fn node(&self, r: usize, g: usize, b: usize) -> [f32; 3] {
        let i = self.offset(r, g, b);
        [self.data[i], self.data[i + 1], self.data[i + 2]]
    }

    #[inline]
    fn node_vec(&self, r: usize, g: usize, b: usize) -> Vec3 {
        Vec3::from_array(self.node(r, g, b))
    }

    /// Sample the grid at `(r, g, b)` in [0, 1]³ with trilinear interpolation.
    ///
    /// Interpolates along red, then green, then blue between the eight
    /// surrounding nodes. Inputs outside [0, 1] are clamped.
    pub fn lookup(&self, r: f32, g: f32, b: f32) -> [f32; 3] {
        let max = (self.size - 1) as f32;
        let pos = Vec3::new(r, g, b).clamp(Vec3::ZERO, Vec3::ONE) * max;
        let base = pos.floor().min(Vec3::splat(max - 1.0));
        let frac = pos - base;
        let (r0, g0, b0) = (base.x as usize, base.y as usize, base.z as usize);

        let c00 = self.node_vec(r0, g0, b0).lerp(self.node_vec(r0 + 1, g0, b0), frac.x);
        let c10 = self.node_vec(r0, g0 + 1, b0).lerp(self.node_vec(r0 + 1, g0 + 1, b0), frac.x);
        let c01 = self.node_vec(r0, g0, b0 + 1).lerp(self.node_vec(r0 + 1, g0, b0 + 1), frac.x);
        let c11 = self
            .node_vec(r0, g0 + 1, b0 + 1)
            .lerp(self.node_vec(r0 + 1, g0 + 1, b0 + 1), frac.x);

        let c0 = c00.lerp(c10, frac.y);
        let c1 = c01.lerp(c11, frac.y);
        c0.lerp(c1, frac.z).to_array()
    }

    /// Map one RGBA8 pixel through the grid. Alpha passes through.
    #[inline]
    pub fn apply_rgba8(&self, px: [u8; 4]) -> [u8; 4] {
        let out = self.lookup(
            px[0] as f32 / 255.0,
            px[1] as f32 / 255.0,
            px[2] as f32 / 255.0,
        );
        let q = |v: f32| (v * 255.0).round().clamp(0.0, 255.0) as u8;
        [q(out[0]), q(out[1]), q(out[2]), px[3]]
    }

    /// True when every node equals its own coordinate within `tolerance`.
    pub fn is_identity(&self, tolerance: f32) -> bool {
        let identity = Self::identity(self.size);
        self.data
            .iter()
            .zip(&identity.data)
            .all(|(a, b)| (a - b).abs() <= tolerance)
    }
}
