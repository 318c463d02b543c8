//! Decoder for `.nav2` binary navigation data.
//!
//! A `.nav2` file describes the walkable navmesh, waypoint graph and segment
//! connectivity of one or more spatial groups in a level. This crate turns
//! the raw bytes into an immutable, strongly typed model.
//!
//! # Layout
//!
//! - A fixed 96-byte [`Header`]
//! - An optional manifest of [`ManifestGroup`]s
//! - An entry table whose records dispatch to one of four payload decoders:
//!   [`NavWorld`], [`NavmeshChunk`], [`SegmentGraph`], [`SegmentChunk`]
//! - An optional linked list of [`Section2Entry`] records
//!
//! # Example
//!
//! ```no_run
//! use nav2_format::DecodeOptions;
//!
//! let file = nav2_format::open_with("level.nav2", &DecodeOptions::untrusted())?;
//! let divisors = file.header().divisors;
//!
//! for (group, chunk) in file.navmesh_chunks() {
//!     let first = chunk.vertices().first().map(|v| v.dequantize(&divisors));
//!     println!("group {group}: {} faces, first vertex {first:?}", chunk.faces().len());
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod cursor;
mod entry;
mod error;
mod file;
mod header;
mod manifest;
mod navmesh;
mod navworld;
mod options;
mod point;
mod section2;
mod segment_chunk;
mod segment_graph;
mod summary;

#[cfg(test)]
mod test_util;

pub use entry::{Entry, EntryType, EntryWalker, Payload};
pub use error::{Component, Error, ErrorKind, Result};
pub use file::{decode, decode_with, open, open_with, DecodedFile};
pub use header::Header;
pub use manifest::{ManifestEntry, ManifestGroup};
pub use navmesh::{Face, FaceLocation, NavmeshChunk, NavmeshHeader};
pub use navworld::{Adjacency, AdjacencyLink, NavWorld, NavWorldHeader, PointLinks, WaypointEdge};
pub use options::{DecodeOptions, SUPPORTED_VERSIONS};
pub use point::{Divisors, QuantizedPoint, SignedPoint};
pub use section2::{Section2Entry, Section2Header, Section2Point, Section2Values};
pub use segment_chunk::{ChunkDescriptor, SegmentBounds, SegmentChunk, SegmentChunkHeader};
pub use segment_graph::{
    EdgeCounts, EdgeTableRef, InGroupEdge, OffGroupEdge, OffMeshEdge, SegmentDescriptor,
    SegmentEdge, SegmentGraph, SegmentGraphHeader, SegmentPointEdges,
};
pub use summary::{FileSummary, GroupSummary};
