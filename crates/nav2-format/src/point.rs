//! Quantized coordinates.
//!
//! Every position in a `.nav2` file is stored as three integers that must be
//! divided by the header's per-axis divisors. The raw integers are kept in
//! the decoded model; dequantization is left to consumers.

use crate::cursor::RecordCursor;
use crate::Result;

/// Per-axis quantization divisors from the file header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Divisors {
    pub x: u16,
    pub y: u16,
    pub z: u16,
}

impl Divisors {
    /// Divide raw coordinates by the per-axis divisors.
    ///
    /// A zero divisor yields an infinite or NaN component, as the game data
    /// never uses one.
    pub fn apply(&self, x: f32, y: f32, z: f32) -> [f32; 3] {
        [
            x / f32::from(self.x),
            y / f32::from(self.y),
            z / f32::from(self.z),
        ]
    }
}

/// An unsigned quantized point (6 bytes on disk).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct QuantizedPoint {
    pub x: u16,
    pub y: u16,
    pub z: u16,
}

impl QuantizedPoint {
    /// On-disk size in bytes.
    pub const SIZE: usize = 6;

    pub(crate) fn read(cursor: &mut RecordCursor<'_>) -> Result<Self> {
        Ok(Self {
            x: cursor.read_u16()?,
            y: cursor.read_u16()?,
            z: cursor.read_u16()?,
        })
    }

    /// Real-valued coordinate.
    pub fn dequantize(&self, divisors: &Divisors) -> [f32; 3] {
        divisors.apply(f32::from(self.x), f32::from(self.y), f32::from(self.z))
    }
}

/// A signed quantized point, used by segment bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SignedPoint {
    pub x: i16,
    pub y: i16,
    pub z: i16,
}

impl SignedPoint {
    pub const SIZE: usize = 6;

    pub(crate) fn read(cursor: &mut RecordCursor<'_>) -> Result<Self> {
        Ok(Self {
            x: cursor.read_i16()?,
            y: cursor.read_i16()?,
            z: cursor.read_i16()?,
        })
    }

    pub fn dequantize(&self, divisors: &Divisors) -> [f32; 3] {
        divisors.apply(f32::from(self.x), f32::from(self.y), f32::from(self.z))
    }
}
