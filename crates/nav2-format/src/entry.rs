//! Entry table: a count-terminated list of typed payload records.
//!
//! Each entry is a 16-byte header followed directly by its payload. The
//! next entry starts at `entry_start + next`, whatever the payload decoder
//! consumed.

use zerocopy::byteorder::little_endian::{U16, U32};
use zerocopy::{FromBytes, Immutable, KnownLayout, Unaligned};

use crate::cursor::{RecordCursor, VisitTracker};
use crate::header::Header;
use crate::navmesh::NavmeshChunk;
use crate::navworld::NavWorld;
use crate::options::DecodeOptions;
use crate::segment_chunk::SegmentChunk;
use crate::segment_graph::SegmentGraph;
use crate::{Component, Result};

/// Payload kind selected by an entry's type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EntryType {
    NavWorld,
    NavmeshChunk,
    SegmentGraph,
    SegmentChunk,
    /// Tag without a decoder; the payload is skipped.
    Unknown(u16),
}

impl EntryType {
    pub const fn from_tag(tag: u16) -> Self {
        match tag {
            0 => EntryType::NavWorld,
            1 => EntryType::NavmeshChunk,
            3 => EntryType::SegmentGraph,
            4 => EntryType::SegmentChunk,
            other => EntryType::Unknown(other),
        }
    }

    pub const fn tag(&self) -> u16 {
        match self {
            EntryType::NavWorld => 0,
            EntryType::NavmeshChunk => 1,
            EntryType::SegmentGraph => 3,
            EntryType::SegmentChunk => 4,
            EntryType::Unknown(tag) => *tag,
        }
    }

    /// Decoder component for known types.
    pub const fn component(&self) -> Option<Component> {
        match self {
            EntryType::NavWorld => Some(Component::NavWorld),
            EntryType::NavmeshChunk => Some(Component::NavmeshChunk),
            EntryType::SegmentGraph => Some(Component::SegmentGraph),
            EntryType::SegmentChunk => Some(Component::SegmentChunk),
            EntryType::Unknown(_) => None,
        }
    }
}

#[derive(Debug, Clone, Copy, FromBytes, Immutable, KnownLayout, Unaligned)]
#[repr(C)]
struct RawEntry {
    type_tag: U16,
    reserved_02: U16,
    next: U32,
    payload: U32,
    group_id: u8,
    reserved_0d: u8,
    reserved_0e: U16,
}

/// An entry table record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Entry {
    /// Absolute offset of the entry header.
    pub offset: usize,
    pub entry_type: EntryType,
    pub reserved_02: u16,
    /// Offset of the next entry, relative to this one.
    pub next: u32,
    /// Stored payload offset; payloads are read directly after the header.
    pub payload: u32,
    pub group_id: u8,
    pub reserved_0d: u8,
    pub reserved_0e: u16,
}

impl Entry {
    pub const SIZE: usize = 16;

    fn from_raw(offset: usize, raw: RawEntry) -> Self {
        Self {
            offset,
            entry_type: EntryType::from_tag(raw.type_tag.get()),
            reserved_02: raw.reserved_02.get(),
            next: raw.next.get(),
            payload: raw.payload.get(),
            group_id: raw.group_id,
            reserved_0d: raw.reserved_0d,
            reserved_0e: raw.reserved_0e.get(),
        }
    }

    /// Absolute offset of the entry that follows this one.
    pub fn next_offset(&self) -> u64 {
        self.offset as u64 + u64::from(self.next)
    }
}

/// A decoded payload.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Payload {
    NavWorld(NavWorld),
    NavmeshChunk(NavmeshChunk),
    SegmentGraph(SegmentGraph),
    SegmentChunk(SegmentChunk),
    /// Unknown type tag; nothing was read.
    Skipped,
}

impl Payload {
    fn read(cursor: &mut RecordCursor<'_>, entry_type: EntryType) -> Result<Self> {
        Ok(match entry_type {
            EntryType::NavWorld => Payload::NavWorld(NavWorld::read(cursor)?),
            EntryType::NavmeshChunk => Payload::NavmeshChunk(NavmeshChunk::read(cursor)?),
            EntryType::SegmentGraph => Payload::SegmentGraph(SegmentGraph::read(cursor)?),
            EntryType::SegmentChunk => Payload::SegmentChunk(SegmentChunk::read(cursor)?),
            EntryType::Unknown(_) => Payload::Skipped,
        })
    }
}

/// Lazy, forward-only walk over the entry table.
///
/// Yields exactly `entry_count` items unless an error occurs, after which
/// the walk ends. Each entry's payload is decoded as it is yielded.
///
/// ```no_run
/// use nav2_format::{EntryWalker, Payload};
///
/// let bytes = std::fs::read("level.nav2")?;
/// for item in EntryWalker::new(&bytes)? {
///     let (entry, payload) = item?;
///     if let Payload::NavmeshChunk(chunk) = payload {
///         println!("group {}: {} faces", entry.group_id, chunk.faces().len());
///     }
/// }
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug)]
pub struct EntryWalker<'a> {
    cursor: RecordCursor<'a>,
    header: Header,
    remaining: u32,
    /// Most entries the table can hold between its offset and the file end.
    capacity: usize,
    pending_seek: Option<u64>,
    visits: VisitTracker,
}

impl<'a> EntryWalker<'a> {
    /// Read the header of `data` and walk its entries with default options.
    pub fn new(data: &'a [u8]) -> Result<Self> {
        Self::with_options(data, &DecodeOptions::default())
    }

    /// Read the header of `data` and walk its entries.
    pub fn with_options(data: &'a [u8], options: &DecodeOptions) -> Result<Self> {
        let mut cursor = RecordCursor::new(data);
        let header = Header::read(&mut cursor, options)?;
        Ok(Self::from_cursor(cursor, header, options))
    }

    pub(crate) fn from_cursor(
        cursor: RecordCursor<'a>,
        header: Header,
        options: &DecodeOptions,
    ) -> Self {
        let remaining = header.entry_count;
        let span = cursor
            .declared_len()
            .saturating_sub(header.entries_offset as usize);
        Self {
            cursor,
            header,
            remaining,
            capacity: span / Entry::SIZE,
            pending_seek: (remaining > 0).then_some(u64::from(header.entries_offset)),
            visits: VisitTracker::new(options.rejects_revisits()),
        }
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Entries not yet yielded.
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub(crate) fn into_cursor(self) -> RecordCursor<'a> {
        self.cursor
    }

    fn step(&mut self) -> Result<(Entry, Payload)> {
        let cursor = &mut self.cursor;
        cursor.set_component(Component::EntryTable);
        if let Some(target) = self.pending_seek.take() {
            cursor.seek_absolute(target)?;
        }

        let count = self.header.entry_count as usize;
        if self.remaining == self.header.entry_count && count > self.capacity {
            return Err(cursor.inconsistent("entry count", count, self.capacity));
        }

        let start = cursor.position();
        self.visits.visit(Component::EntryTable, start)?;
        let entry = Entry::from_raw(start, cursor.read_struct::<RawEntry>()?);

        match entry.entry_type {
            EntryType::Unknown(tag) => {
                tracing::debug!(offset = start, tag, "skipping unknown entry type");
            }
            kind => {
                tracing::debug!(
                    offset = start,
                    group = entry.group_id,
                    "decoding {:?} entry",
                    kind
                );
            }
        }
        let payload = Payload::read(cursor, entry.entry_type)?;

        self.remaining -= 1;
        if self.remaining > 0 {
            self.pending_seek = Some(entry.next_offset());
        }
        Ok((entry, payload))
    }
}

impl Iterator for EntryWalker<'_> {
    type Item = Result<(Entry, Payload)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let item = self.step();
        if item.is_err() {
            self.remaining = 0;
            self.pending_seek = None;
        }
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.remaining as usize))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{ByteWriter, FileBuilder, SegmentChunkFixture};
    use crate::{Error, ErrorKind, SignedPoint};

    #[test]
    fn test_entry_type_tags() {
        for tag in [0u16, 1, 3, 4, 2, 5, 0xFFFF] {
            assert_eq!(EntryType::from_tag(tag).tag(), tag);
        }
        assert_eq!(EntryType::from_tag(2), EntryType::Unknown(2));
        assert_eq!(EntryType::from_tag(3).component(), Some(Component::SegmentGraph));
        assert_eq!(EntryType::Unknown(9).component(), None);
    }

    /// Two hand-placed entries: an unknown one at 0x140 with `next` 0x30,
    /// then an empty segment chunk at 0x170.
    fn linked_file() -> Vec<u8> {
        let mut w = ByteWriter::new();
        w.u32(2) // version
            .u32(0) // file length, patched
            .u32(0x140)
            .u32(2)
            .pad_to(0x140);
        w.u16(7).u16(0).u32(0x30).u32(16).u8(1).u8(0).u16(0);
        w.pad_to(0x170);
        w.u16(4).u16(0).u32(0x20).u32(16).u8(2).u8(0).u16(0);
        w.bytes(&SegmentChunkFixture::default().encode());
        let len = w.position() as u32;
        w.patch_u32(4, len);
        w.into_inner()
    }

    #[test]
    fn test_next_offset_positions_following_entry() {
        let bytes = linked_file();
        let items: Vec<_> = EntryWalker::new(&bytes)
            .unwrap()
            .collect::<Result<_>>()
            .unwrap();

        assert_eq!(items.len(), 2);
        let (first, payload) = &items[0];
        assert_eq!(first.offset, 0x140);
        assert_eq!(first.entry_type, EntryType::Unknown(7));
        assert_eq!(first.next_offset(), 0x170);
        assert_eq!(*payload, Payload::Skipped);

        let (second, payload) = &items[1];
        assert_eq!(second.offset, 0x170);
        assert_eq!(second.group_id, 2);
        assert!(matches!(payload, Payload::SegmentChunk(chunk) if chunk.is_empty()));
    }

    #[test]
    fn test_payload_read_past_next_entry() {
        // A segment chunk at 0x140 whose arrays sit behind the entry at 0x170.
        let mut w = ByteWriter::new();
        w.u32(2).u32(0).u32(0x140).u32(2).pad_to(0x140);
        w.u16(4).u16(0).u32(0x30).u32(16).u8(3).u8(0).u16(0);
        w.u32(0x40).u32(0x4C).u32(0x58).u32(1);
        w.pad_to(0x170);
        w.u16(7).u16(0).u32(0x10).u32(16).u8(5).u8(0).u16(0);
        w.pad_to(0x190);
        for value in [-1, 2, -3, 4, -5, 6] {
            w.i16(value);
        }
        w.i16(8).i16(9).i16(0).i16(0).u8(3).u8(1).u8(0).u8(3);
        let len = w.position() as u32;
        w.patch_u32(4, len);
        let bytes = w.into_inner();

        let items: Vec<_> = EntryWalker::new(&bytes)
            .unwrap()
            .collect::<Result<_>>()
            .unwrap();
        let offsets: Vec<_> = items.iter().map(|(entry, _)| entry.offset).collect();
        assert_eq!(offsets, [0x140, 0x170]);

        let Payload::SegmentChunk(chunk) = &items[0].1 else {
            panic!("expected a segment chunk, got {:?}", items[0].1);
        };
        assert_eq!(chunk.len(), 1);
        assert_eq!(chunk.bounds()[0].min, SignedPoint { x: -1, y: 2, z: -3 });
        assert_eq!(chunk.descriptors()[0].vertex_bias, 8);
        assert_eq!(chunk.descriptors()[0].edge_count, 3);

        assert_eq!(items[1].0.entry_type, EntryType::Unknown(7));
        assert_eq!(items[1].0.group_id, 5);
        assert_eq!(items[1].1, Payload::Skipped);
    }

    #[test]
    fn test_last_entry_next_is_not_followed() {
        // The final entry's `next` points past the end of the file.
        let mut bytes = linked_file();
        bytes[0x174..0x178].copy_from_slice(&0xFFFFu32.to_le_bytes());
        let walker = EntryWalker::new(&bytes).unwrap();
        assert_eq!(walker.filter(Result::is_ok).count(), 2);
    }

    #[test]
    fn test_zero_entries() {
        let bytes = FileBuilder::default().build();
        let mut walker = EntryWalker::new(&bytes).unwrap();
        assert_eq!(walker.remaining(), 0);
        assert!(walker.next().is_none());
    }

    #[test]
    fn test_walk_stops_after_error() {
        let mut bytes = linked_file();
        // Point the first entry's `next` back at itself.
        bytes[0x144..0x148].copy_from_slice(&0u32.to_le_bytes());

        let lenient: Vec<_> = EntryWalker::new(&bytes).unwrap().collect();
        assert_eq!(lenient.len(), 2);
        assert!(lenient.iter().all(Result::is_ok));

        let options = DecodeOptions::untrusted();
        let mut walker = EntryWalker::with_options(&bytes, &options).unwrap();
        assert!(walker.next().unwrap().is_ok());
        let err = walker.next().unwrap().unwrap_err();
        assert!(matches!(err, Error::RevisitedRecord { offset: 0x140, .. }));
        assert!(walker.next().is_none());
    }

    #[test]
    fn test_entry_count_beyond_table_capacity() {
        // One self-linked entry right after the header, claiming millions.
        let mut w = ByteWriter::new();
        w.u32(2).u32(0).u32(0x60).u32(5_000_000).pad_to(0x60);
        w.u16(9).u16(0).u32(0).u32(16).u8(1).u8(0).u16(0);
        let len = w.position() as u32;
        w.patch_u32(4, len);
        let bytes = w.into_inner();

        let mut walker = EntryWalker::new(&bytes).unwrap();
        let err = walker.next().unwrap().unwrap_err();
        assert!(matches!(
            err,
            Error::InconsistentCount {
                component: Component::EntryTable,
                offset: 0x60,
                index: 5_000_000,
                count: 1,
                ..
            }
        ));
        assert!(walker.next().is_none());

        let err = crate::decode(&bytes).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InconsistentCount);
    }

    #[test]
    fn test_next_past_declared_length() {
        let mut bytes = linked_file();
        bytes[0x144..0x148].copy_from_slice(&0x1000u32.to_le_bytes());

        let mut walker = EntryWalker::new(&bytes).unwrap();
        walker.next().unwrap().unwrap();
        let err = walker.next().unwrap().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::OffsetOutOfRange);
        assert_eq!(err.component(), Some(Component::EntryTable));
    }
}
