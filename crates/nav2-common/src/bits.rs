//! Packed bitfield helpers.
//!
//! Several `.nav2` records pack two logical values into one 32-bit word. The
//! split is always "low N bits, then everything above", so a single helper
//! covers every layout.

/// Split `value` into its low `low_bits` bits and the bits above them.
///
/// Returns `(value & mask, value >> low_bits)`. `low_bits` must be in
/// `0..=32`; 32 yields `(value, 0)`.
///
/// ```
/// use nav2_common::bits::split_bits;
///
/// assert_eq!(split_bits(0x1234_5607, 8), (0x07, 0x12_3456));
/// ```
#[inline]
pub const fn split_bits(value: u32, low_bits: u32) -> (u32, u32) {
    if low_bits >= 32 {
        return (value, 0);
    }
    let mask = (1u32 << low_bits) - 1;
    (value & mask, value >> low_bits)
}

/// Extract a single bit as a flag.
#[inline]
pub const fn bit(value: u32, index: u32) -> bool {
    index < 32 && (value >> index) & 1 != 0
}
