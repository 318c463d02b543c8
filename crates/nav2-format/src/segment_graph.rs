//! Segment graph payloads: coarse connectivity over navmesh segments.
//!
//! Every segment point owns three edge lists (in-group, off-group and
//! off-mesh). The edge table stores them point by point in two passes: first
//! the fixed-size part of every edge, then each edge's trailing byte array
//! in the same order. The counts flow from the point descriptor into the
//! first pass and from each fixed part into the second.

use nav2_common::bits::split_bits;
use zerocopy::byteorder::little_endian::{I16, U16, U32};
use zerocopy::{FromBytes, Immutable, KnownLayout, Unaligned};

use crate::cursor::RecordCursor;
use crate::point::QuantizedPoint;
use crate::{Component, Result};

#[derive(Debug, Clone, Copy, FromBytes, Immutable, KnownLayout, Unaligned)]
#[repr(C)]
struct RawSegmentGraphHeader {
    points_offset: U32,
    descriptors_offset: U32,
    edges_offset: U32,
    unknown_0c: U32,
    total_size: U32,
    point_count: U32,
    unknown_18: U16,
    total_edges: U32,
    padding_1e: U16,
}

/// Segment graph header. Offsets are relative to the payload start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SegmentGraphHeader {
    pub points_offset: u32,
    pub descriptors_offset: u32,
    pub edges_offset: u32,
    pub unknown_0c: u32,
    pub total_size: u32,
    pub point_count: u32,
    pub unknown_18: u16,
    pub total_edges: u32,
    pub padding_1e: u16,
}

impl SegmentGraphHeader {
    pub const SIZE: usize = 32;
}

impl From<RawSegmentGraphHeader> for SegmentGraphHeader {
    fn from(raw: RawSegmentGraphHeader) -> Self {
        Self {
            points_offset: raw.points_offset.get(),
            descriptors_offset: raw.descriptors_offset.get(),
            edges_offset: raw.edges_offset.get(),
            unknown_0c: raw.unknown_0c.get(),
            total_size: raw.total_size.get(),
            point_count: raw.point_count.get(),
            unknown_18: raw.unknown_18.get(),
            total_edges: raw.total_edges.get(),
            padding_1e: raw.padding_1e.get(),
        }
    }
}

/// Decoded form of a descriptor's leading word: 8 bits of in-group edge
/// count below a 24-bit edge table index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EdgeTableRef {
    pub index: u32,
    pub edge_count: u8,
}

impl EdgeTableRef {
    pub const fn from_packed(packed: u32) -> Self {
        let (edge_count, index) = split_bits(packed, 8);
        Self {
            index,
            edge_count: edge_count as u8,
        }
    }
}

#[derive(Debug, Clone, Copy, FromBytes, Immutable, KnownLayout, Unaligned)]
#[repr(C)]
struct RawSegmentDescriptor {
    packed: U32,
    unknown_04: I16,
    unknown_06: U16,
    unknown_08: u8,
    unknown_09: u8,
    off_group_edges: u8,
    off_mesh_edges: u8,
}

/// Per-point edge counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SegmentDescriptor {
    pub packed: u32,
    pub table: EdgeTableRef,
    pub unknown_04: i16,
    pub unknown_06: u16,
    pub unknown_08: u8,
    pub unknown_09: u8,
    pub off_group_edges: u8,
    pub off_mesh_edges: u8,
}

impl SegmentDescriptor {
    pub const SIZE: usize = 12;

    pub fn counts(&self) -> EdgeCounts {
        EdgeCounts {
            in_group: usize::from(self.table.edge_count),
            off_group: usize::from(self.off_group_edges),
            off_mesh: usize::from(self.off_mesh_edges),
        }
    }
}

impl From<RawSegmentDescriptor> for SegmentDescriptor {
    fn from(raw: RawSegmentDescriptor) -> Self {
        let packed = raw.packed.get();
        Self {
            packed,
            table: EdgeTableRef::from_packed(packed),
            unknown_04: raw.unknown_04.get(),
            unknown_06: raw.unknown_06.get(),
            unknown_08: raw.unknown_08,
            unknown_09: raw.unknown_09,
            off_group_edges: raw.off_group_edges,
            off_mesh_edges: raw.off_mesh_edges,
        }
    }
}

/// Number of edges of each kind for one point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct EdgeCounts {
    pub in_group: usize,
    pub off_group: usize,
    pub off_mesh: usize,
}

impl EdgeCounts {
    pub fn total(&self) -> usize {
        self.in_group + self.off_group + self.off_mesh
    }
}

/// Fixed-size part of an edge, read in the first pass.
trait EdgeRecord: Sized {
    const SIZE: usize;

    fn read(cursor: &mut RecordCursor<'_>) -> Result<Self>;

    /// Length of the trailing byte array read in the second pass.
    fn adjacent_edge_count(&self) -> u8;
}

/// Edge to another point of the same group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InGroupEdge {
    pub weight: u16,
    pub adjacent_node: u16,
    pub adjacent_edge_count: u8,
    pub unknown_05: u8,
}

impl EdgeRecord for InGroupEdge {
    const SIZE: usize = 6;

    fn read(cursor: &mut RecordCursor<'_>) -> Result<Self> {
        Ok(Self {
            weight: cursor.read_u16()?,
            adjacent_node: cursor.read_u16()?,
            adjacent_edge_count: cursor.read_u8()?,
            unknown_05: cursor.read_u8()?,
        })
    }

    fn adjacent_edge_count(&self) -> u8 {
        self.adjacent_edge_count
    }
}

/// Edge to a point of another group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OffGroupEdge {
    pub group_id: u16,
    pub weight: u16,
    pub adjacent_node: u16,
    pub adjacent_edge_count: u8,
    pub unknown_07: u8,
}

impl EdgeRecord for OffGroupEdge {
    const SIZE: usize = 8;

    fn read(cursor: &mut RecordCursor<'_>) -> Result<Self> {
        Ok(Self {
            group_id: cursor.read_u16()?,
            weight: cursor.read_u16()?,
            adjacent_node: cursor.read_u16()?,
            adjacent_edge_count: cursor.read_u8()?,
            unknown_07: cursor.read_u8()?,
        })
    }

    fn adjacent_edge_count(&self) -> u8 {
        self.adjacent_edge_count
    }
}

/// Off-mesh link edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OffMeshEdge {
    pub unknown_00: u16,
    pub group_id: u16,
    pub adjacent_node: u16,
    pub unknown_06: u16,
    pub adjacent_edge_count: u8,
    pub unknown_09: u8,
}

impl EdgeRecord for OffMeshEdge {
    const SIZE: usize = 10;

    fn read(cursor: &mut RecordCursor<'_>) -> Result<Self> {
        Ok(Self {
            unknown_00: cursor.read_u16()?,
            group_id: cursor.read_u16()?,
            adjacent_node: cursor.read_u16()?,
            unknown_06: cursor.read_u16()?,
            adjacent_edge_count: cursor.read_u8()?,
            unknown_09: cursor.read_u8()?,
        })
    }

    fn adjacent_edge_count(&self) -> u8 {
        self.adjacent_edge_count
    }
}

/// An edge with its trailing adjacent-edge bytes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SegmentEdge<E> {
    fields: E,
    adjacent_edges: Vec<u8>,
}

impl<E> SegmentEdge<E> {
    /// Fixed-size fields.
    pub fn fields(&self) -> &E {
        &self.fields
    }

    pub fn adjacent_edges(&self) -> &[u8] {
        &self.adjacent_edges
    }
}

/// All edges of one segment point.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SegmentPointEdges {
    in_group: Vec<SegmentEdge<InGroupEdge>>,
    off_group: Vec<SegmentEdge<OffGroupEdge>>,
    off_mesh: Vec<SegmentEdge<OffMeshEdge>>,
}

impl SegmentPointEdges {
    pub fn in_group(&self) -> &[SegmentEdge<InGroupEdge>] {
        &self.in_group
    }

    pub fn off_group(&self) -> &[SegmentEdge<OffGroupEdge>] {
        &self.off_group
    }

    pub fn off_mesh(&self) -> &[SegmentEdge<OffMeshEdge>] {
        &self.off_mesh
    }

    pub fn counts(&self) -> EdgeCounts {
        EdgeCounts {
            in_group: self.in_group.len(),
            off_group: self.off_group.len(),
            off_mesh: self.off_mesh.len(),
        }
    }

    fn read(cursor: &mut RecordCursor<'_>, counts: EdgeCounts) -> Result<Self> {
        let in_group = read_fixed::<InGroupEdge>(cursor, counts.in_group)?;
        let off_group = read_fixed::<OffGroupEdge>(cursor, counts.off_group)?;
        let off_mesh = read_fixed::<OffMeshEdge>(cursor, counts.off_mesh)?;

        Ok(Self {
            in_group: attach_adjacent_edges(cursor, in_group)?,
            off_group: attach_adjacent_edges(cursor, off_group)?,
            off_mesh: attach_adjacent_edges(cursor, off_mesh)?,
        })
    }
}

fn read_fixed<E: EdgeRecord>(cursor: &mut RecordCursor<'_>, count: usize) -> Result<Vec<E>> {
    let mut edges = Vec::with_capacity(cursor.capacity_for(count, E::SIZE));
    for _ in 0..count {
        edges.push(E::read(cursor)?);
    }
    Ok(edges)
}

fn attach_adjacent_edges<E: EdgeRecord>(
    cursor: &mut RecordCursor<'_>,
    fixed: Vec<E>,
) -> Result<Vec<SegmentEdge<E>>> {
    let mut edges = Vec::with_capacity(fixed.len());
    for fields in fixed {
        let adjacent_edges = cursor.read_byte_vec(usize::from(fields.adjacent_edge_count()))?;
        edges.push(SegmentEdge {
            fields,
            adjacent_edges,
        });
    }
    Ok(edges)
}

/// Segment connectivity graph of one group.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SegmentGraph {
    header: SegmentGraphHeader,
    points: Vec<QuantizedPoint>,
    descriptors: Vec<SegmentDescriptor>,
    edges: Vec<SegmentPointEdges>,
}

impl SegmentGraph {
    pub fn header(&self) -> &SegmentGraphHeader {
        &self.header
    }

    /// Segment centre points.
    pub fn points(&self) -> &[QuantizedPoint] {
        &self.points
    }

    /// Per-point descriptors, parallel to [`points`](Self::points).
    pub fn descriptors(&self) -> &[SegmentDescriptor] {
        &self.descriptors
    }

    /// Per-point edge lists, parallel to [`points`](Self::points).
    pub fn edges(&self) -> &[SegmentPointEdges] {
        &self.edges
    }

    /// Total number of edges of all kinds.
    pub fn edge_count(&self) -> usize {
        self.edges.iter().map(|point| point.counts().total()).sum()
    }

    pub(crate) fn read(cursor: &mut RecordCursor<'_>) -> Result<Self> {
        cursor.with_record(Component::SegmentGraph, Self::read_record)
    }

    fn read_record(cursor: &mut RecordCursor<'_>) -> Result<Self> {
        let header: SegmentGraphHeader = cursor.read_struct::<RawSegmentGraphHeader>()?.into();
        let point_count = header.point_count as usize;

        cursor.seek_array_from_anchor(u64::from(header.points_offset), point_count)?;
        let mut points = Vec::with_capacity(cursor.capacity_for(point_count, QuantizedPoint::SIZE));
        for _ in 0..point_count {
            points.push(QuantizedPoint::read(cursor)?);
        }

        cursor.seek_array_from_anchor(u64::from(header.descriptors_offset), point_count)?;
        let mut descriptors: Vec<SegmentDescriptor> =
            Vec::with_capacity(cursor.capacity_for(point_count, SegmentDescriptor::SIZE));
        for _ in 0..point_count {
            descriptors.push(cursor.read_struct::<RawSegmentDescriptor>()?.into());
        }

        cursor.seek_from_anchor(u64::from(header.edges_offset))?;
        let mut edges = Vec::with_capacity(descriptors.len());
        for descriptor in &descriptors {
            edges.push(SegmentPointEdges::read(cursor, descriptor.counts())?);
        }

        let graph = Self {
            header,
            points,
            descriptors,
            edges,
        };
        let decoded = graph.edge_count();
        if decoded != header.total_edges as usize {
            tracing::debug!(
                declared = header.total_edges,
                decoded,
                "segment graph edge total differs from header"
            );
        }
        tracing::trace!(points = point_count, edges = decoded, "read segment graph");
        Ok(graph)
    }
}
