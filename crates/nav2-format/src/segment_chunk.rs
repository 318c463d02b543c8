//! Segment chunk payloads: bounds and navmesh ranges per segment.

use zerocopy::byteorder::little_endian::{I16, U32};
use zerocopy::{FromBytes, Immutable, KnownLayout, Unaligned};

use crate::cursor::RecordCursor;
use crate::point::SignedPoint;
use crate::{Component, Result};

#[derive(Debug, Clone, Copy, FromBytes, Immutable, KnownLayout, Unaligned)]
#[repr(C)]
struct RawSegmentChunkHeader {
    bounds_offset: U32,
    descriptors_offset: U32,
    total_size: U32,
    entry_count: U32,
}

/// Segment chunk header. Offsets are relative to the payload start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SegmentChunkHeader {
    pub bounds_offset: u32,
    pub descriptors_offset: u32,
    pub total_size: u32,
    pub entry_count: u32,
}

impl SegmentChunkHeader {
    pub const SIZE: usize = 16;
}

impl From<RawSegmentChunkHeader> for SegmentChunkHeader {
    fn from(raw: RawSegmentChunkHeader) -> Self {
        Self {
            bounds_offset: raw.bounds_offset.get(),
            descriptors_offset: raw.descriptors_offset.get(),
            total_size: raw.total_size.get(),
            entry_count: raw.entry_count.get(),
        }
    }
}

/// Bounding segment given by two corners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SegmentBounds {
    pub min: SignedPoint,
    pub max: SignedPoint,
}

impl SegmentBounds {
    pub const SIZE: usize = 12;
}

#[derive(Debug, Clone, Copy, FromBytes, Immutable, KnownLayout, Unaligned)]
#[repr(C)]
struct RawChunkDescriptor {
    vertex_bias: I16,
    face_index: I16,
    unknown_04: I16,
    unknown_06: I16,
    vertex_count: u8,
    face_count: u8,
    unknown_0a: u8,
    edge_count: u8,
}

/// Range of navmesh data covered by one segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChunkDescriptor {
    /// Offset added to face vertex indices.
    pub vertex_bias: i16,
    /// First face in the group's navmesh chunk.
    pub face_index: i16,
    pub unknown_04: i16,
    pub unknown_06: i16,
    pub vertex_count: u8,
    pub face_count: u8,
    pub unknown_0a: u8,
    pub edge_count: u8,
}

impl ChunkDescriptor {
    pub const SIZE: usize = 12;
}

impl From<RawChunkDescriptor> for ChunkDescriptor {
    fn from(raw: RawChunkDescriptor) -> Self {
        Self {
            vertex_bias: raw.vertex_bias.get(),
            face_index: raw.face_index.get(),
            unknown_04: raw.unknown_04.get(),
            unknown_06: raw.unknown_06.get(),
            vertex_count: raw.vertex_count,
            face_count: raw.face_count,
            unknown_0a: raw.unknown_0a,
            edge_count: raw.edge_count,
        }
    }
}

/// Segment chunks of one group: bounds and descriptors in parallel.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SegmentChunk {
    header: SegmentChunkHeader,
    bounds: Vec<SegmentBounds>,
    descriptors: Vec<ChunkDescriptor>,
}

impl SegmentChunk {
    pub fn header(&self) -> &SegmentChunkHeader {
        &self.header
    }

    pub fn bounds(&self) -> &[SegmentBounds] {
        &self.bounds
    }

    pub fn descriptors(&self) -> &[ChunkDescriptor] {
        &self.descriptors
    }

    /// Number of chunks.
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    pub(crate) fn read(cursor: &mut RecordCursor<'_>) -> Result<Self> {
        cursor.with_record(Component::SegmentChunk, |cursor| {
            let header: SegmentChunkHeader = cursor.read_struct::<RawSegmentChunkHeader>()?.into();
            let count = header.entry_count as usize;

            cursor.seek_array_from_anchor(u64::from(header.bounds_offset), count)?;
            let mut bounds = Vec::with_capacity(cursor.capacity_for(count, SegmentBounds::SIZE));
            for _ in 0..count {
                bounds.push(SegmentBounds {
                    min: SignedPoint::read(cursor)?,
                    max: SignedPoint::read(cursor)?,
                });
            }

            cursor.seek_array_from_anchor(u64::from(header.descriptors_offset), count)?;
            let mut descriptors =
                Vec::with_capacity(cursor.capacity_for(count, ChunkDescriptor::SIZE));
            for _ in 0..count {
                descriptors.push(ChunkDescriptor::from(
                    cursor.read_struct::<RawChunkDescriptor>()?,
                ));
            }

            tracing::trace!(chunks = count, "read segment chunk");
            Ok(Self {
                header,
                bounds,
                descriptors,
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::SegmentChunkFixture;
    use crate::ErrorKind;

    #[test]
    fn test_read_segment_chunk() {
        let fixture = SegmentChunkFixture {
            chunks: vec![
                ([-10, 0, 5, 10, 20, 15], (0, 0, 4, 2, 5)),
                ([100, -100, 0, 200, -50, 30], (4, 2, 3, 1, 3)),
            ],
        };
        let bytes = fixture.encode();
        let chunk = SegmentChunk::read(&mut RecordCursor::new(&bytes)).unwrap();

        assert_eq!(chunk.len(), 2);
        assert_eq!(chunk.header().total_size as usize, bytes.len());
        assert_eq!(chunk.bounds()[0].min, SignedPoint { x: -10, y: 0, z: 5 });
        assert_eq!(
            chunk.bounds()[1].max,
            SignedPoint {
                x: 200,
                y: -50,
                z: 30
            }
        );

        let descriptor = chunk.descriptors()[1];
        assert_eq!(descriptor.vertex_bias, 4);
        assert_eq!(descriptor.face_index, 2);
        assert_eq!(descriptor.vertex_count, 3);
        assert_eq!(descriptor.face_count, 1);
        assert_eq!(descriptor.edge_count, 3);
    }

    #[test]
    fn test_empty_chunk() {
        let bytes = SegmentChunkFixture::default().encode();
        let chunk = SegmentChunk::read(&mut RecordCursor::new(&bytes)).unwrap();
        assert!(chunk.is_empty());
        assert!(chunk.bounds().is_empty());
    }

    #[test]
    fn test_count_beyond_buffer() {
        let mut bytes = SegmentChunkFixture {
            chunks: vec![([0; 6], (0, 0, 0, 0, 0))],
        }
        .encode();
        bytes[12..16].copy_from_slice(&1000u32.to_le_bytes());

        let err = SegmentChunk::read(&mut RecordCursor::new(&bytes)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TruncatedInput);
    }

    #[test]
    fn test_bounds_at_end_of_payload() {
        let mut bytes = SegmentChunkFixture {
            chunks: vec![([0; 6], (0, 0, 0, 0, 0))],
        }
        .encode();
        let end = bytes.len() as u32;
        bytes[0..4].copy_from_slice(&end.to_le_bytes());

        let err = SegmentChunk::read(&mut RecordCursor::new(&bytes)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::OffsetOutOfRange);
        assert_eq!(err.component(), Some(Component::SegmentChunk));
    }
}
