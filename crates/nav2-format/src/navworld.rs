//! NavWorld payloads: the per-group waypoint graph.
//!
//! A NavWorld is a 48-byte header followed by six regions addressed
//! relative to the payload start: points, adjacency descriptors, the
//! adjacency blob, edges, edge flags and a trailing per-point array. Each
//! point's adjacency lives in the blob at `blob_offset + blob_index * 2`.

use zerocopy::byteorder::little_endian::{U16, U32};
use zerocopy::{FromBytes, Immutable, KnownLayout, Unaligned};

use crate::cursor::RecordCursor;
use crate::point::QuantizedPoint;
use crate::{Component, Result};

#[derive(Debug, Clone, Copy, FromBytes, Immutable, KnownLayout, Unaligned)]
#[repr(C)]
struct RawNavWorldHeader {
    points_offset: U32,
    adjacency_offset: U32,
    edges_offset: U32,
    blob_offset: U32,
    unknown_10: U32,
    unknown_14: U32,
    edge_flags_offset: U32,
    unknown_1c: U32,
    trailing_offset: U32,
    point_count: U16,
    edge_count: U16,
    reserved_28: [u8; 6],
    edge_flags_count: U16,
}

/// NavWorld header. Offsets are relative to the payload start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NavWorldHeader {
    pub points_offset: u32,
    pub adjacency_offset: u32,
    pub edges_offset: u32,
    pub blob_offset: u32,
    pub unknown_10: u32,
    pub unknown_14: u32,
    pub edge_flags_offset: u32,
    pub unknown_1c: u32,
    pub trailing_offset: u32,
    pub point_count: u16,
    pub edge_count: u16,
    pub reserved_28: [u8; 6],
    pub edge_flags_count: u16,
}

impl NavWorldHeader {
    pub const SIZE: usize = 48;
}

impl From<RawNavWorldHeader> for NavWorldHeader {
    fn from(raw: RawNavWorldHeader) -> Self {
        Self {
            points_offset: raw.points_offset.get(),
            adjacency_offset: raw.adjacency_offset.get(),
            edges_offset: raw.edges_offset.get(),
            blob_offset: raw.blob_offset.get(),
            unknown_10: raw.unknown_10.get(),
            unknown_14: raw.unknown_14.get(),
            edge_flags_offset: raw.edge_flags_offset.get(),
            unknown_1c: raw.unknown_1c.get(),
            trailing_offset: raw.trailing_offset.get(),
            point_count: raw.point_count.get(),
            edge_count: raw.edge_count.get(),
            reserved_28: raw.reserved_28,
            edge_flags_count: raw.edge_flags_count.get(),
        }
    }
}

/// Per-point adjacency descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Adjacency {
    /// Index into the blob, in 16-bit units.
    pub blob_index: i16,
    pub unknown_02: i16,
    /// Number of neighbour links.
    pub count_a: u8,
    /// Number of trailing blob values.
    pub count_b: u8,
}

/// A neighbour reached over an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AdjacencyLink {
    pub adjacent_node: u16,
    pub edge_index: u16,
}

/// The blob slice of one point.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PointLinks {
    links: Vec<AdjacencyLink>,
    extra: Vec<u16>,
}

impl PointLinks {
    /// `count_a` neighbour links.
    pub fn links(&self) -> &[AdjacencyLink] {
        &self.links
    }

    /// `count_b` values following the links; meaning unknown.
    pub fn extra(&self) -> &[u16] {
        &self.extra
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WaypointEdge {
    pub weight: u16,
    /// Index into the edge flags array.
    pub flags_index: u16,
    pub from: u8,
    pub to: u8,
}

/// Waypoint graph of one group.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NavWorld {
    header: NavWorldHeader,
    points: Vec<QuantizedPoint>,
    adjacency: Vec<Adjacency>,
    links: Vec<PointLinks>,
    edges: Vec<WaypointEdge>,
    edge_flags: Vec<u16>,
    trailing: Vec<i16>,
}

impl NavWorld {
    pub fn header(&self) -> &NavWorldHeader {
        &self.header
    }

    pub fn points(&self) -> &[QuantizedPoint] {
        &self.points
    }

    /// Adjacency descriptors, parallel to [`points`](Self::points).
    pub fn adjacency(&self) -> &[Adjacency] {
        &self.adjacency
    }

    /// Decoded blob slices, parallel to [`points`](Self::points).
    pub fn links(&self) -> &[PointLinks] {
        &self.links
    }

    pub fn edges(&self) -> &[WaypointEdge] {
        &self.edges
    }

    pub fn edge_flags(&self) -> &[u16] {
        &self.edge_flags
    }

    /// Per-point signed values of unknown purpose.
    pub fn trailing(&self) -> &[i16] {
        &self.trailing
    }

    /// Decode a NavWorld payload starting at the cursor position.
    pub(crate) fn read(cursor: &mut RecordCursor<'_>) -> Result<Self> {
        cursor.with_record(Component::NavWorld, Self::read_record)
    }

    fn read_record(cursor: &mut RecordCursor<'_>) -> Result<Self> {
        let header: NavWorldHeader = cursor.read_struct::<RawNavWorldHeader>()?.into();
        let point_count = usize::from(header.point_count);
        let edge_count = usize::from(header.edge_count);

        cursor.seek_array_from_anchor(u64::from(header.points_offset), point_count)?;
        let mut points = Vec::with_capacity(cursor.capacity_for(point_count, QuantizedPoint::SIZE));
        for _ in 0..point_count {
            points.push(QuantizedPoint::read(cursor)?);
        }

        cursor.seek_array_from_anchor(u64::from(header.adjacency_offset), point_count)?;
        let mut adjacency = Vec::with_capacity(cursor.capacity_for(point_count, 6));
        for _ in 0..point_count {
            adjacency.push(Adjacency {
                blob_index: cursor.read_i16()?,
                unknown_02: cursor.read_i16()?,
                count_a: cursor.read_u8()?,
                count_b: cursor.read_u8()?,
            });
        }

        let mut links = Vec::with_capacity(point_count);
        for descriptor in &adjacency {
            let target = i64::from(header.blob_offset) + i64::from(descriptor.blob_index) * 2;
            cursor.seek_from_anchor_signed(target)?;
            links.push(Self::read_links(cursor, descriptor, point_count, edge_count)?);
        }
        tracing::trace!(points = point_count, "read navworld adjacency");

        cursor.seek_array_from_anchor(u64::from(header.edges_offset), edge_count)?;
        let mut edges = Vec::with_capacity(cursor.capacity_for(edge_count, 6));
        for _ in 0..edge_count {
            edges.push(WaypointEdge {
                weight: cursor.read_u16()?,
                flags_index: cursor.read_u16()?,
                from: cursor.read_u8()?,
                to: cursor.read_u8()?,
            });
        }

        let flags_count = usize::from(header.edge_flags_count);
        cursor.seek_array_from_anchor(u64::from(header.edge_flags_offset), flags_count)?;
        let mut edge_flags = Vec::with_capacity(cursor.capacity_for(flags_count, 2));
        for _ in 0..flags_count {
            edge_flags.push(cursor.read_u16()?);
        }

        cursor.seek_array_from_anchor(u64::from(header.trailing_offset), point_count)?;
        let mut trailing = Vec::with_capacity(cursor.capacity_for(point_count, 2));
        for _ in 0..point_count {
            trailing.push(cursor.read_i16()?);
        }

        Ok(Self {
            header,
            points,
            adjacency,
            links,
            edges,
            edge_flags,
            trailing,
        })
    }

    fn read_links(
        cursor: &mut RecordCursor<'_>,
        descriptor: &Adjacency,
        point_count: usize,
        edge_count: usize,
    ) -> Result<PointLinks> {
        let count_a = usize::from(descriptor.count_a);
        let count_b = usize::from(descriptor.count_b);

        let mut links = Vec::with_capacity(count_a);
        for _ in 0..count_a {
            let adjacent_node = cursor.read_u16()?;
            let edge_index = cursor.read_u16()?;
            if usize::from(adjacent_node) >= point_count {
                return Err(cursor.inconsistent(
                    "adjacent node",
                    usize::from(adjacent_node),
                    point_count,
                ));
            }
            if usize::from(edge_index) >= edge_count {
                return Err(cursor.inconsistent("edge index", usize::from(edge_index), edge_count));
            }
            links.push(AdjacencyLink {
                adjacent_node,
                edge_index,
            });
        }

        let mut extra = Vec::with_capacity(count_b);
        for _ in 0..count_b {
            extra.push(cursor.read_u16()?);
        }

        Ok(PointLinks { links, extra })
    }
}
