//! Applying baked LUTs to pixel buffers.
//!
//! Every output pixel depends only on its own input pixel and a read-only
//! table, so large buffers are split by row and mapped on the rayon pool.
//! Small buffers stay on the calling thread.

use rayon::prelude::*;

use crate::image::PixelBuffer;
use crate::transform::lut1d::QuantizedLut1D;
use crate::transform::lut3d::Lut3D;

/// Pixel count above which application is parallelized.
pub const PARALLEL_THRESHOLD: usize = 64 * 1024;

/// Map every pixel of `src` through `f`, row-parallel for large buffers.
pub fn map_pixels<F>(src: &PixelBuffer, f: F) -> PixelBuffer
where
    F: Fn([u8; 4]) -> [u8; 4] + Sync,
{
    let mut out = src.pixels.clone();
    let row = (src.width as usize).max(1);

    if out.len() >= PARALLEL_THRESHOLD {
        out.par_chunks_mut(row).for_each(|chunk| {
            for px in chunk {
                *px = f(*px);
            }
        });
    } else {
        for px in &mut out {
            *px = f(*px);
        }
    }

    PixelBuffer {
        width: src.width,
        height: src.height,
        pixels: out,
    }
}

/// Fold every pixel of `src` into an accumulator.
///
/// Large buffers fold rows in parallel and merge partial results with
/// `reduce`, so `reduce` must be associative and `init` its identity.
pub fn fold_pixels<A, I, F, R>(src: &PixelBuffer, init: I, fold: F, reduce: R) -> A
where
    A: Send,
    I: Fn() -> A + Sync + Send,
    F: Fn(A, [u8; 4]) -> A + Sync + Send,
    R: Fn(A, A) -> A + Sync + Send,
{
    if src.len() >= PARALLEL_THRESHOLD {
        let row = (src.width as usize).max(1);
        src.pixels
            .par_chunks(row)
            .fold(&init, |acc, chunk| chunk.iter().fold(acc, |a, px| fold(a, *px)))
            .reduce(&init, &reduce)
    } else {
        src.pixels.iter().fold(init(), |a, px| fold(a, *px))
    }
}

/// Apply a quantized per-channel LUT. Alpha is preserved.
pub fn apply_lut1d(src: &PixelBuffer, lut: &QuantizedLut1D) -> PixelBuffer {
    if lut.is_identity() {
        return src.clone();
    }
    tracing::trace!(pixels = src.len(), "applying 1D LUT");
    map_pixels(src, |px| lut.apply(px))
}

/// Apply a 3D LUT with trilinear interpolation. Alpha is preserved.
pub fn apply_lut3d(src: &PixelBuffer, lut: &Lut3D) -> PixelBuffer {
    tracing::trace!(pixels = src.len(), size = lut.size(), "applying 3D LUT");
    map_pixels(src, |px| lut.apply_rgba8(px))
}
