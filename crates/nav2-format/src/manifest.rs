//! Manifest: a count-prefixed index of payload locations.
//!
//! The manifest is decoded and exposed as-is; the payload decoders walk the
//! entry table instead of following it.

use zerocopy::byteorder::little_endian::{U16, U32};
use zerocopy::{FromBytes, Immutable, KnownLayout, Unaligned};

use crate::cursor::RecordCursor;
use crate::header::Header;
use crate::{Component, Result};

#[derive(Debug, Clone, Copy, FromBytes, Immutable, KnownLayout, Unaligned)]
#[repr(C)]
struct RawManifestEntry {
    group_id: u8,
    unknown_01: u8,
    unknown_02: U16,
    payload_offset: U32,
    entry_size: u8,
    unknown_09: U16,
}

/// One manifest slot (11 bytes on disk).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ManifestEntry {
    pub group_id: u8,
    pub unknown_01: u8,
    pub unknown_02: u16,
    pub payload_offset: u32,
    pub entry_size: u8,
    pub unknown_09: u16,
}

impl ManifestEntry {
    pub const SIZE: usize = 11;
}

impl From<RawManifestEntry> for ManifestEntry {
    fn from(raw: RawManifestEntry) -> Self {
        Self {
            group_id: raw.group_id,
            unknown_01: raw.unknown_01,
            unknown_02: raw.unknown_02.get(),
            payload_offset: raw.payload_offset.get(),
            entry_size: raw.entry_size,
            unknown_09: raw.unknown_09.get(),
        }
    }
}

/// A fixed triple of manifest entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ManifestGroup {
    pub entries: [ManifestEntry; 3],
}

impl ManifestGroup {
    pub const SIZE: usize = ManifestEntry::SIZE * 3;

    fn read(cursor: &mut RecordCursor<'_>) -> Result<Self> {
        let mut entries = [ManifestEntry::default(); 3];
        for entry in &mut entries {
            *entry = cursor.read_struct::<RawManifestEntry>()?.into();
        }
        Ok(Self { entries })
    }
}

/// Read the manifest, or nothing when the header has no manifest offset.
pub(crate) fn read_manifest(
    cursor: &mut RecordCursor<'_>,
    header: &Header,
) -> Result<Vec<ManifestGroup>> {
    if !header.has_manifest() {
        return Ok(Vec::new());
    }

    cursor.set_component(Component::Manifest);
    cursor.seek_absolute(u64::from(header.manifest_offset))?;
    let count = cursor.read_u32()? as usize;

    let mut groups = Vec::with_capacity(cursor.capacity_for(count, ManifestGroup::SIZE));
    for _ in 0..count {
        groups.push(ManifestGroup::read(cursor)?);
    }

    tracing::debug!(groups = groups.len(), "read manifest");
    Ok(groups)
}
