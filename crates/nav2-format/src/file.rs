//! Whole-file decoding.

use std::collections::btree_map::{self, BTreeMap};
use std::collections::BTreeSet;
use std::fs::File;
use std::path::Path;

use memmap2::Mmap;

use crate::cursor::RecordCursor;
use crate::entry::{Entry, EntryWalker, Payload};
use crate::header::Header;
use crate::manifest::{read_manifest, ManifestGroup};
use crate::navmesh::NavmeshChunk;
use crate::navworld::NavWorld;
use crate::options::DecodeOptions;
use crate::section2::{read_section2, Section2Entry};
use crate::segment_chunk::SegmentChunk;
use crate::segment_graph::SegmentGraph;
use crate::summary::{FileSummary, GroupSummary};
use crate::{Component, Error, Result};

/// A fully decoded `.nav2` file.
///
/// Payloads are keyed by group id. Each group holds at most one payload of
/// each kind.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DecodedFile {
    header: Header,
    manifest_groups: Vec<ManifestGroup>,
    entries: Vec<Entry>,
    nav_worlds: BTreeMap<u8, NavWorld>,
    navmesh_chunks: BTreeMap<u8, NavmeshChunk>,
    segment_graphs: BTreeMap<u8, SegmentGraph>,
    segment_chunks: BTreeMap<u8, SegmentChunk>,
    section2_entries: Option<Vec<Section2Entry>>,
}

impl DecodedFile {
    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn manifest_groups(&self) -> &[ManifestGroup] {
        &self.manifest_groups
    }

    /// Entry table records in file order, unknown types included.
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn nav_worlds(&self) -> &BTreeMap<u8, NavWorld> {
        &self.nav_worlds
    }

    pub fn navmesh_chunks(&self) -> &BTreeMap<u8, NavmeshChunk> {
        &self.navmesh_chunks
    }

    pub fn segment_graphs(&self) -> &BTreeMap<u8, SegmentGraph> {
        &self.segment_graphs
    }

    pub fn segment_chunks(&self) -> &BTreeMap<u8, SegmentChunk> {
        &self.segment_chunks
    }

    /// Section2 records, or `None` when the file has no Section2.
    pub fn section2_entries(&self) -> Option<&[Section2Entry]> {
        self.section2_entries.as_deref()
    }

    /// Group ids referenced by the entry table.
    pub fn groups(&self) -> BTreeSet<u8> {
        self.entries.iter().map(|entry| entry.group_id).collect()
    }

    /// Per-group counts and header highlights.
    pub fn summary(&self) -> FileSummary {
        let groups = self
            .groups()
            .into_iter()
            .map(|group_id| {
                let mut group = GroupSummary {
                    group_id,
                    ..Default::default()
                };
                if let Some(chunk) = self.navmesh_chunks.get(&group_id) {
                    group.navmesh_vertices = chunk.vertices().len();
                    group.navmesh_faces = chunk.faces().len();
                    group.navmesh_quads = chunk.faces().iter().filter(|f| f.is_quad()).count();
                }
                if let Some(world) = self.nav_worlds.get(&group_id) {
                    group.waypoints = world.points().len();
                    group.waypoint_edges = world.edges().len();
                }
                if let Some(graph) = self.segment_graphs.get(&group_id) {
                    group.segment_points = graph.points().len();
                    group.segment_edges = graph.edge_count();
                }
                if let Some(chunk) = self.segment_chunks.get(&group_id) {
                    group.segment_chunks = chunk.len();
                }
                group
            })
            .collect();

        FileSummary {
            version: self.header.version,
            file_length: self.header.file_length,
            origin: self.header.origin,
            divisors: self.header.divisors,
            entries: self.entries.len(),
            skipped_entries: self
                .entries
                .iter()
                .filter(|entry| entry.entry_type.component().is_none())
                .count(),
            manifest_groups: self.manifest_groups.len(),
            section2_records: self.section2_entries.as_ref().map_or(0, Vec::len),
            groups,
        }
    }

    fn insert(&mut self, entry: Entry, payload: Payload) -> Result<()> {
        match payload {
            Payload::NavWorld(world) => {
                insert_unique(&mut self.nav_worlds, &entry, Component::NavWorld, world)?
            }
            Payload::NavmeshChunk(chunk) => {
                insert_unique(&mut self.navmesh_chunks, &entry, Component::NavmeshChunk, chunk)?
            }
            Payload::SegmentGraph(graph) => {
                insert_unique(&mut self.segment_graphs, &entry, Component::SegmentGraph, graph)?
            }
            Payload::SegmentChunk(chunk) => {
                insert_unique(&mut self.segment_chunks, &entry, Component::SegmentChunk, chunk)?
            }
            Payload::Skipped => {}
        }
        self.entries.push(entry);
        Ok(())
    }
}

fn insert_unique<T>(
    map: &mut BTreeMap<u8, T>,
    entry: &Entry,
    component: Component,
    value: T,
) -> Result<()> {
    match map.entry(entry.group_id) {
        btree_map::Entry::Vacant(slot) => {
            slot.insert(value);
            Ok(())
        }
        btree_map::Entry::Occupied(_) => Err(Error::DuplicateGroup {
            component,
            group_id: entry.group_id,
            offset: entry.offset,
        }),
    }
}

/// Decode a `.nav2` buffer with default options.
pub fn decode(data: &[u8]) -> Result<DecodedFile> {
    decode_with(data, &DecodeOptions::default())
}

/// Decode a `.nav2` buffer.
///
/// Runs header, manifest, entry table and Section2 in order; the first
/// error aborts the decode.
pub fn decode_with(data: &[u8], options: &DecodeOptions) -> Result<DecodedFile> {
    let mut cursor = RecordCursor::new(data);
    let header = Header::read(&mut cursor, options)?;
    let manifest_groups = read_manifest(&mut cursor, &header)?;

    let mut file = DecodedFile {
        header,
        manifest_groups,
        entries: Vec::with_capacity(header.entry_count.min(4096) as usize),
        nav_worlds: BTreeMap::new(),
        navmesh_chunks: BTreeMap::new(),
        segment_graphs: BTreeMap::new(),
        segment_chunks: BTreeMap::new(),
        section2_entries: None,
    };

    let mut walker = EntryWalker::from_cursor(cursor, header, options);
    for item in walker.by_ref() {
        let (entry, payload) = item?;
        file.insert(entry, payload)?;
    }

    let mut cursor = walker.into_cursor();
    if header.has_section2() {
        file.section2_entries = Some(read_section2(
            &mut cursor,
            &header,
            options.rejects_revisits(),
        )?);
    }

    tracing::debug!(
        entries = file.entries.len(),
        groups = file.groups().len(),
        "decoded nav2 file"
    );
    Ok(file)
}

/// Memory-map and decode a `.nav2` file with default options.
pub fn open<P: AsRef<Path>>(path: P) -> Result<DecodedFile> {
    open_with(path, &DecodeOptions::default())
}

/// Memory-map and decode a `.nav2` file.
pub fn open_with<P: AsRef<Path>>(path: P, options: &DecodeOptions) -> Result<DecodedFile> {
    let file = File::open(path.as_ref())?;
    let mmap = unsafe { Mmap::map(&file)? };
    decode_with(&mmap, options)
}
