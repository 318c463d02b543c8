//! Navmesh chunk payloads.
//!
//! Faces are stored out of line: each face has a packed 32-bit word whose
//! low 18 bits give the record's offset (in 16-bit units) inside the face
//! region and whose bit 18 marks a quad.

use nav2_common::bits::{bit, split_bits};
use zerocopy::byteorder::little_endian::{U16, U32};
use zerocopy::{FromBytes, Immutable, KnownLayout, Unaligned};

use crate::cursor::RecordCursor;
use crate::point::QuantizedPoint;
use crate::{Component, Result};

#[derive(Debug, Clone, Copy, FromBytes, Immutable, KnownLayout, Unaligned)]
#[repr(C)]
struct RawNavmeshHeader {
    vertices_offset: U32,
    face_offsets_offset: U32,
    faces_offset: U32,
    reserved_0c: [U16; 6],
    face_count: U16,
    vertex_count: U16,
    reserved_1c: [U16; 2],
}

/// Navmesh chunk header. Offsets are relative to the payload start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NavmeshHeader {
    pub vertices_offset: u32,
    pub face_offsets_offset: u32,
    pub faces_offset: u32,
    pub reserved_0c: [u16; 6],
    pub face_count: u16,
    pub vertex_count: u16,
    pub reserved_1c: [u16; 2],
}

impl NavmeshHeader {
    pub const SIZE: usize = 32;
}

impl From<RawNavmeshHeader> for NavmeshHeader {
    fn from(raw: RawNavmeshHeader) -> Self {
        Self {
            vertices_offset: raw.vertices_offset.get(),
            face_offsets_offset: raw.face_offsets_offset.get(),
            faces_offset: raw.faces_offset.get(),
            reserved_0c: raw.reserved_0c.map(U16::get),
            face_count: raw.face_count.get(),
            vertex_count: raw.vertex_count.get(),
            reserved_1c: raw.reserved_1c.map(U16::get),
        }
    }
}

/// Decoded form of a packed face word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FaceLocation {
    /// Offset of the face record in 16-bit units from the face region.
    pub offset: u32,
    pub is_quad: bool,
}

impl FaceLocation {
    const OFFSET_BITS: u32 = 18;

    /// Decode a packed face word.
    pub const fn from_packed(packed: u32) -> Self {
        let (offset, rest) = split_bits(packed, Self::OFFSET_BITS);
        Self {
            offset,
            is_quad: bit(rest, 0),
        }
    }

    /// Byte offset of the record from the face region.
    pub const fn byte_offset(&self) -> u64 {
        self.offset as u64 * 2
    }

    /// Number of populated slots: 4 for a quad, 3 for a triangle.
    pub const fn slots(&self) -> usize {
        if self.is_quad {
            4
        } else {
            3
        }
    }
}

/// A triangle or quad face.
///
/// Slot arrays are fixed-size; only the first [`slots`](Self::slots)
/// entries are populated and the accessors return exactly those.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Face {
    packed: u32,
    location: FaceLocation,
    adjacent_faces: [i16; 4],
    vertices: [u8; 4],
    edges: [u8; 4],
}

impl Face {
    /// The packed word as stored.
    pub fn packed(&self) -> u32 {
        self.packed
    }

    pub fn location(&self) -> FaceLocation {
        self.location
    }

    pub fn is_quad(&self) -> bool {
        self.location.is_quad
    }

    pub fn slots(&self) -> usize {
        self.location.slots()
    }

    /// Neighbouring face per side; negative values mark open sides.
    pub fn adjacent_faces(&self) -> &[i16] {
        &self.adjacent_faces[..self.slots()]
    }

    /// Indices into the chunk's vertex array.
    pub fn vertices(&self) -> &[u8] {
        &self.vertices[..self.slots()]
    }

    pub fn edges(&self) -> &[u8] {
        &self.edges[..self.slots()]
    }

    fn read(cursor: &mut RecordCursor<'_>, packed: u32) -> Result<Self> {
        let location = FaceLocation::from_packed(packed);
        let slots = location.slots();
        let mut face = Face {
            packed,
            location,
            ..Default::default()
        };
        for slot in &mut face.adjacent_faces[..slots] {
            *slot = cursor.read_i16()?;
        }
        for slot in &mut face.vertices[..slots] {
            *slot = cursor.read_u8()?;
        }
        for slot in &mut face.edges[..slots] {
            *slot = cursor.read_u8()?;
        }
        Ok(face)
    }
}

/// Walkable-surface mesh of one group.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NavmeshChunk {
    header: NavmeshHeader,
    vertices: Vec<QuantizedPoint>,
    faces: Vec<Face>,
}

impl NavmeshChunk {
    pub fn header(&self) -> &NavmeshHeader {
        &self.header
    }

    pub fn vertices(&self) -> &[QuantizedPoint] {
        &self.vertices
    }

    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    pub(crate) fn read(cursor: &mut RecordCursor<'_>) -> Result<Self> {
        cursor.with_record(Component::NavmeshChunk, Self::read_record)
    }

    fn read_record(cursor: &mut RecordCursor<'_>) -> Result<Self> {
        let header: NavmeshHeader = cursor.read_struct::<RawNavmeshHeader>()?.into();
        let vertex_count = usize::from(header.vertex_count);
        let face_count = usize::from(header.face_count);

        cursor.seek_array_from_anchor(u64::from(header.vertices_offset), vertex_count)?;
        let mut vertices =
            Vec::with_capacity(cursor.capacity_for(vertex_count, QuantizedPoint::SIZE));
        for _ in 0..vertex_count {
            vertices.push(QuantizedPoint::read(cursor)?);
        }

        cursor.seek_array_from_anchor(u64::from(header.face_offsets_offset), face_count)?;
        let mut packed = Vec::with_capacity(cursor.capacity_for(face_count, 4));
        for _ in 0..face_count {
            packed.push(cursor.read_u32()?);
        }

        let mut faces = Vec::with_capacity(packed.len());
        for word in packed {
            let location = FaceLocation::from_packed(word);
            cursor.seek_from_anchor(u64::from(header.faces_offset) + location.byte_offset())?;
            faces.push(Face::read(cursor, word)?);
        }

        tracing::trace!(
            vertices = vertex_count,
            faces = face_count,
            "read navmesh chunk"
        );
        Ok(Self {
            header,
            vertices,
            faces,
        })
    }
}
