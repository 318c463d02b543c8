//! Half-precision float vectors.
//!
//! The raw binary16 bit patterns are kept so that decoded values compare
//! and hash exactly, NaN payloads included.

use half::f16;

/// Three packed binary16 components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HalfVec3 {
    bits: [u16; 3],
}

impl HalfVec3 {
    /// Create from raw binary16 bit patterns.
    #[inline]
    pub const fn from_bits(bits: [u16; 3]) -> Self {
        Self { bits }
    }

    /// Raw binary16 bit patterns.
    #[inline]
    pub const fn to_bits(self) -> [u16; 3] {
        self.bits
    }

    /// Components as `f16`.
    pub fn components(self) -> [f16; 3] {
        self.bits.map(f16::from_bits)
    }

    /// Components promoted to `f32`.
    pub fn to_f32(self) -> [f32; 3] {
        self.bits.map(|b| f16::from_bits(b).to_f32())
    }
}

/// Four packed binary16 components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HalfVec4 {
    bits: [u16; 4],
}

impl HalfVec4 {
    /// Create from raw binary16 bit patterns.
    #[inline]
    pub const fn from_bits(bits: [u16; 4]) -> Self {
        Self { bits }
    }

    /// Raw binary16 bit patterns.
    #[inline]
    pub const fn to_bits(self) -> [u16; 4] {
        self.bits
    }

    /// Components as `f16`.
    pub fn components(self) -> [f16; 4] {
        self.bits.map(f16::from_bits)
    }

    /// Components promoted to `f32`.
    pub fn to_f32(self) -> [f32; 4] {
        self.bits.map(|b| f16::from_bits(b).to_f32())
    }
}
