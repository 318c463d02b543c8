//! File header.

use nav2_common::HalfVec4;
use zerocopy::byteorder::little_endian::{F32, U16, U32};
use zerocopy::{FromBytes, Immutable, KnownLayout, Unaligned};

use crate::cursor::RecordCursor;
use crate::options::DecodeOptions;
use crate::point::Divisors;
use crate::{Component, Error, Result};

/// On-disk layout of the 96-byte file header.
#[derive(Debug, Clone, Copy, FromBytes, Immutable, KnownLayout, Unaligned)]
#[repr(C)]
struct RawHeader {
    version: U32,
    file_length: U32,
    entries_offset: U32,
    entry_count: U32,
    nav_system_offset: U32,
    file_index: u8,
    unknown_15: [u8; 3],
    section2_offset: U32,
    unknown_1c: U32,
    origin: [F32; 3],
    section3_offset: U32,
    unknown_30: U32,
    manifest_offset: U32,
    manifest_length: U32,
    unknown_3c: U32,
    unknown_40: U32,
    divisors: [U16; 3],
    unknown_4a: U16,
    unknown_4c: u8,
    section2_entry_count: u8,
    padding_4e: U16,
    half_a: [U16; 4],
    half_b: [U16; 4],
}

/// Decoded file header.
///
/// Offsets are absolute file positions; zero means "absent" for the
/// manifest and Section2. Fields named `unknown_XX` are preserved verbatim
/// and named by their byte offset.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Header {
    pub version: u32,
    pub file_length: u32,
    pub entries_offset: u32,
    pub entry_count: u32,
    pub nav_system_offset: u32,
    pub file_index: u8,
    pub unknown_15: [u8; 3],
    pub section2_offset: u32,
    pub unknown_1c: u32,
    pub origin: [f32; 3],
    pub section3_offset: u32,
    pub unknown_30: u32,
    pub manifest_offset: u32,
    pub manifest_length: u32,
    pub unknown_3c: u32,
    pub unknown_40: u32,
    pub divisors: Divisors,
    pub unknown_4a: u16,
    pub unknown_4c: u8,
    pub section2_entry_count: u8,
    pub padding_4e: u16,
    pub half_a: HalfVec4,
    pub half_b: HalfVec4,
}

impl Header {
    /// On-disk size in bytes.
    pub const SIZE: usize = 96;

    /// Whether the file carries a Section2 list.
    pub fn has_section2(&self) -> bool {
        self.section2_offset != 0 && self.section2_entry_count != 0
    }

    /// Whether the file carries a manifest.
    pub fn has_manifest(&self) -> bool {
        self.manifest_offset != 0
    }

    /// Read and validate the header at the start of the buffer.
    ///
    /// On success the cursor's declared length is set from `file_length`,
    /// falling back to the buffer length when the header declares zero.
    pub(crate) fn read(cursor: &mut RecordCursor<'_>, options: &DecodeOptions) -> Result<Self> {
        cursor.set_component(Component::Header);
        cursor.seek_absolute(0)?;
        let raw: RawHeader = cursor.read_struct()?;
        let header = Header::from(raw);

        if !options.versions().contains(&header.version) {
            if options.is_strict_version() {
                return Err(Error::UnsupportedVersion {
                    version: header.version,
                });
            }
            tracing::warn!(
                version = header.version,
                "nav2 version outside {:?}, decoding anyway",
                options.versions()
            );
        }

        let declared = match header.file_length as usize {
            0 => cursor.buffer_len(),
            len => len,
        };
        if declared != cursor.buffer_len() {
            tracing::warn!(
                declared,
                actual = cursor.buffer_len(),
                "declared file length differs from buffer length"
            );
        }
        cursor.set_declared_len(declared);

        for offset in [
            header.entries_offset,
            header.manifest_offset,
            header.section2_offset,
        ] {
            if offset != 0 && offset as usize >= declared {
                return Err(Error::OffsetOutOfRange {
                    component: Component::Header,
                    target: i64::from(offset),
                    file_length: declared,
                });
            }
        }

        tracing::debug!(
            version = header.version,
            entries = header.entry_count,
            file_length = declared,
            "read nav2 header"
        );
        Ok(header)
    }
}

impl From<RawHeader> for Header {
    fn from(raw: RawHeader) -> Self {
        Self {
            version: raw.version.get(),
            file_length: raw.file_length.get(),
            entries_offset: raw.entries_offset.get(),
            entry_count: raw.entry_count.get(),
            nav_system_offset: raw.nav_system_offset.get(),
            file_index: raw.file_index,
            unknown_15: raw.unknown_15,
            section2_offset: raw.section2_offset.get(),
            unknown_1c: raw.unknown_1c.get(),
            origin: raw.origin.map(F32::get),
            section3_offset: raw.section3_offset.get(),
            unknown_30: raw.unknown_30.get(),
            manifest_offset: raw.manifest_offset.get(),
            manifest_length: raw.manifest_length.get(),
            unknown_3c: raw.unknown_3c.get(),
            unknown_40: raw.unknown_40.get(),
            divisors: Divisors {
                x: raw.divisors[0].get(),
                y: raw.divisors[1].get(),
                z: raw.divisors[2].get(),
            },
            unknown_4a: raw.unknown_4a.get(),
            unknown_4c: raw.unknown_4c,
            section2_entry_count: raw.section2_entry_count,
            padding_4e: raw.padding_4e.get(),
            half_a: HalfVec4::from_bits(raw.half_a.map(U16::get)),
            half_b: HalfVec4::from_bits(raw.half_b.map(U16::get)),
        }
    }
}
