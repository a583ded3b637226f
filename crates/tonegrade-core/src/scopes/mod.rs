//! Scope computation: RGB + luma histograms and the statistics derived from them.

pub mod histogram;
pub mod stats;

pub use histogram::HistogramData;
pub use stats::{ImageStatistics, LuminanceStats, SaturationStats};
