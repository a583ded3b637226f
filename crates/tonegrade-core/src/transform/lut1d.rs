//! Per-channel 1D lookup tables.
//!
//! Two types keep composition and quantization apart:
//! - [`Lut1D`] holds `f32` tables in [0, 1]. It composes losslessly.
//! - [`QuantizedLut1D`] holds `u8` tables. It is terminal: the only way to
//!   get one is [`Lut1D::quantize`], called once at the end of a pipeline.
//!
//! A master LUT (same curve on R, G and B) shares a single table between
//! the three channels, so `is_master` is a pointer comparison.

use std::sync::Arc;

/// Number of entries in every 1D table (one per 8-bit code value).
pub const LUT_SIZE: usize = 256;

/// One channel's float table. `table[i]` is the output for input `i / 255`.
pub type Channel = [f32; LUT_SIZE];

/// Selects one of the three color channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelId {
    Red,
    Green,
    Blue,
}

impl ChannelId {
    /// All channels in R, G, B order.
    pub const ALL: [Self; 3] = [Self::Red, Self::Green, Self::Blue];

    /// Index into an `[r, g, b]` array.
    pub const fn index(self) -> usize {
        match self {
            Self::Red => 0,
            Self::Green => 1,
            Self::Blue => 2,
        }
    }
}

/// The identity channel table: `i / 255`.
pub fn identity_channel() -> Channel {
    std::array::from_fn(|i| i as f32 / (LUT_SIZE - 1) as f32)
}

/// Sample a channel table at `v` in [0, 1] with linear interpolation.
#[inline]
pub fn sample_channel(table: &Channel, v: f32) -> f32 {
    let pos = v.clamp(0.0, 1.0) * (LUT_SIZE - 1) as f32;
    let i0 = (pos.floor() as usize).min(LUT_SIZE - 2);
    let frac = pos - i0 as f32;
    table[i0] + (table[i0 + 1] - table[i0]) * frac
}

/// Round a [0, 1] table into 8-bit code values.
pub fn quantize_channel(table: &Channel) -> [u8; LUT_SIZE] {
    table.map(|v| (v * 255.0).round().clamp(0.0, 255.0) as u8)
}

/// Float per-channel LUT.
#[derive(Debug, Clone)]
pub struct Lut1D {
    channels: [Arc<Channel>; 3],
}

impl Lut1D {
    /// The identity LUT, shared across channels.
    pub fn identity() -> Self {
        Self::from_master(identity_channel())
    }

    /// Broadcast one table to all three channels without copying it.
    pub fn from_master(master: Channel) -> Self {
        let shared = Arc::new(master);
        Self {
            channels: [shared.clone(), shared.clone(), shared],
        }
    }

    /// Build from three independent tables.
    pub fn from_channels(r: Channel, g: Channel, b: Channel) -> Self {
        Self {
            channels: [Arc::new(r), Arc::new(g), Arc::new(b)],
        }
    }

    /// The table for one channel.
    pub fn channel(&self, id: ChannelId) -> &Channel {
        &self.channels[id.index()]
    }

    /// True when all three channels are the same table allocation.
    pub fn is_master(&self) -> bool {
        Arc::ptr_eq(&self.channels[0], &self.channels[1])
            && Arc::ptr_eq(&self.channels[1], &self.channels[2])
    }

    /// Evaluate one channel at a [0, 1] input with linear interpolation.
    pub fn sample(&self, id: ChannelId, v: f32) -> f32 {
        sample_channel(self.channel(id), v)
    }

    /// Apply `outer` to the output of `inner`, channel-wise, at float precision.
    ///
    /// A master composed with a master stays a master.
    pub fn compose(inner: &Lut1D, outer: &Lut1D) -> Lut1D {
        let compose_one = |id: ChannelId| -> Channel {
            let a = inner.channel(id);
            let b = outer.channel(id);
            std::array::from_fn(|i| sample_channel(b, a[i]).clamp(0.0, 1.0))
        };

        if inner.is_master() && outer.is_master() {
            Lut1D::from_master(compose_one(ChannelId::Red))
        } else {
            Lut1D::from_channels(
                compose_one(ChannelId::Red),
                compose_one(ChannelId::Green),
                compose_one(ChannelId::Blue),
            )
        }
    }

    /// Round and clamp every entry into [0, 255].
    pub fn quantize(&self) -> QuantizedLut1D {
        QuantizedLut1D {
            r: quantize_channel(&self.channels[0]),
            g: quantize_channel(&self.channels[1]),
            b: quantize_channel(&self.channels[2]),
        }
    }
}

impl Default for Lut1D {
    fn default() -> Self {
        Self::identity()
    }
}

impl PartialEq for Lut1D {
    fn eq(&self, other: &Self) -> bool {
        ChannelId::ALL
            .iter()
            .all(|&id| self.channel(id) == other.channel(id))
    }
}

/// 8-bit per-channel LUT, ready for pixel application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuantizedLut1D {
    /// Red table.
    pub r: [u8; LUT_SIZE],
    /// Green table.
    pub g: [u8; LUT_SIZE],
    /// Blue table.
    pub b: [u8; LUT_SIZE],
}

impl QuantizedLut1D {
    /// Identity: every table maps `i` to `i`.
    pub fn identity() -> Self {
        let t: [u8; LUT_SIZE] = std::array::from_fn(|i| i as u8);
        Self { r: t, g: t, b: t }
    }

    /// Map one RGBA pixel. Alpha passes through.
    #[inline]
    pub fn apply(&self, px: [u8; 4]) -> [u8; 4] {
        [
            self.r[px[0] as usize],
            self.g[px[1] as usize],
            self.b[px[2] as usize],
            px[3],
        ]
    }

    /// True when every table is the identity.
    pub fn is_identity(&self) -> bool {
        *self == Self::identity()
    }
}

impl Default for QuantizedLut1D {
    fn default() -> Self {
        Self::identity()
    }
}
