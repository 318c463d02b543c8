//! Binary reader for little-endian parsing of byte slices.
//!
//! This module provides [`BinaryReader`], a cursor-like type that reads
//! fixed-width little-endian values from a byte slice without copying.

use byteorder::{ByteOrder, LittleEndian};
use half::f16;
use zerocopy::FromBytes;

use crate::{Error, HalfVec3, HalfVec4, Result};

/// A binary reader over a borrowed byte slice.
///
/// The reader keeps a position and reads little-endian values from it. A read
/// that would run past the end of the slice fails with
/// [`Error::UnexpectedEof`] and leaves the position untouched.
///
/// # Example
///
/// ```
/// use nav2_common::BinaryReader;
///
/// let data = [0x01, 0x02, 0x03, 0x04, 0x00, 0x3C];
/// let mut reader = BinaryReader::new(&data);
///
/// assert_eq!(reader.read_u32().unwrap(), 0x04030201);
/// assert_eq!(reader.read_f16_as_f32().unwrap(), 1.0);
/// assert!(reader.is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct BinaryReader<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> BinaryReader<'a> {
    /// Create a new reader from a byte slice.
    #[inline]
    pub const fn new(data: &'a [u8]) -> Self {
        Self { data, position: 0 }
    }

    /// Create a new reader starting at a specific position.
    #[inline]
    pub const fn new_at(data: &'a [u8], position: usize) -> Self {
        Self { data, position }
    }

    /// Get the current position in the buffer.
    #[inline]
    pub const fn position(&self) -> usize {
        self.position
    }

    /// Get the total length of the underlying buffer.
    #[inline]
    pub const fn len(&self) -> usize {
        self.data.len()
    }

    /// Get the number of bytes remaining to read.
    #[inline]
    pub const fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.position)
    }

    /// Check if there are no more bytes to read.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.position >= self.data.len()
    }

    /// Seek to an absolute position.
    ///
    /// The position is not validated here; a later read fails if it lies
    /// beyond the buffer.
    #[inline]
    pub fn seek(&mut self, position: usize) {
        self.position = position;
    }

    /// Advance the position by a number of bytes.
    #[inline]
    pub fn advance(&mut self, count: usize) {
        self.position = self.position.saturating_add(count);
    }

    /// Peek at bytes without advancing the position.
    #[inline]
    pub fn peek_bytes(&self, count: usize) -> Result<&'a [u8]> {
        if self.remaining() < count {
            return Err(Error::UnexpectedEof {
                position: self.position,
                needed: count,
                available: self.remaining(),
            });
        }
        Ok(&self.data[self.position..self.position + count])
    }

    /// Read bytes and advance the position.
    #[inline]
    pub fn read_bytes(&mut self, count: usize) -> Result<&'a [u8]> {
        let bytes = self.peek_bytes(count)?;
        self.position += count;
        Ok(bytes)
    }

    /// Read a fixed-size byte array.
    #[inline]
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_bytes(N)?);
        Ok(out)
    }

    /// Read a single byte.
    #[inline]
    pub fn read_u8(&mut self) -> Result<u8> {
        self.read_bytes(1).map(|b| b[0])
    }

    /// Read a signed byte.
    #[inline]
    pub fn read_i8(&mut self) -> Result<i8> {
        self.read_u8().map(|b| b as i8)
    }

    /// Read a little-endian u16.
    #[inline]
    pub fn read_u16(&mut self) -> Result<u16> {
        self.read_bytes(2).map(LittleEndian::read_u16)
    }

    /// Read a little-endian i16.
    #[inline]
    pub fn read_i16(&mut self) -> Result<i16> {
        self.read_bytes(2).map(LittleEndian::read_i16)
    }

    /// Read a little-endian u32.
    #[inline]
    pub fn read_u32(&mut self) -> Result<u32> {
        self.read_bytes(4).map(LittleEndian::read_u32)
    }

    /// Read a little-endian i32.
    #[inline]
    pub fn read_i32(&mut self) -> Result<i32> {
        self.read_bytes(4).map(LittleEndian::read_i32)
    }

    /// Read a little-endian f32.
    #[inline]
    pub fn read_f32(&mut self) -> Result<f32> {
        self.read_bytes(4).map(LittleEndian::read_f32)
    }

    /// Read a little-endian IEEE-754 binary16 value.
    #[inline]
    pub fn read_f16(&mut self) -> Result<f16> {
        self.read_u16().map(f16::from_bits)
    }

    /// Read a binary16 value and promote it to `f32`.
    #[inline]
    pub fn read_f16_as_f32(&mut self) -> Result<f32> {
        self.read_f16().map(f32::from)
    }

    /// Read three consecutive binary16 values.
    pub fn read_f16_vec3(&mut self) -> Result<HalfVec3> {
        let bytes = self.read_bytes(6)?;
        let mut bits = [0u16; 3];
        LittleEndian::read_u16_into(bytes, &mut bits);
        Ok(HalfVec3::from_bits(bits))
    }

    /// Read four consecutive binary16 values.
    pub fn read_f16_vec4(&mut self) -> Result<HalfVec4> {
        let bytes = self.read_bytes(8)?;
        let mut bits = [0u16; 4];
        LittleEndian::read_u16_into(bytes, &mut bits);
        Ok(HalfVec4::from_bits(bits))
    }

    /// Read a struct using zerocopy.
    ///
    /// The struct must implement `FromBytes` and have no alignment
    /// requirement beyond 1; the little-endian wrapper types from
    /// `zerocopy::byteorder` are the intended field types.
    #[inline]
    pub fn read_struct<T: FromBytes>(&mut self) -> Result<T> {
        let size = std::mem::size_of::<T>();
        let position = self.position;
        let bytes = self.read_bytes(size)?;
        T::read_from_bytes(bytes).map_err(|_| Error::UnexpectedEof {
            position,
            needed: size,
            available: bytes.len(),
        })
    }
}
