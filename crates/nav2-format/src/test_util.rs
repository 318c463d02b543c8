//! Fixture builders for decoder tests.
//!
//! These assemble byte-exact `.nav2` payloads and files so each decoder can
//! be exercised without shipping game data.

use byteorder::{LittleEndian, WriteBytesExt};

/// Little-endian byte sink with patching support.
#[derive(Debug, Default, Clone)]
pub(crate) struct ByteWriter {
    buf: Vec<u8>,
}

impl ByteWriter {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn position(&self) -> usize {
        self.buf.len()
    }

    pub(crate) fn u8(&mut self, value: u8) -> &mut Self {
        self.buf.write_u8(value).unwrap();
        self
    }

    pub(crate) fn u16(&mut self, value: u16) -> &mut Self {
        self.buf.write_u16::<LittleEndian>(value).unwrap();
        self
    }

    pub(crate) fn i16(&mut self, value: i16) -> &mut Self {
        self.buf.write_i16::<LittleEndian>(value).unwrap();
        self
    }

    pub(crate) fn u32(&mut self, value: u32) -> &mut Self {
        self.buf.write_u32::<LittleEndian>(value).unwrap();
        self
    }

    pub(crate) fn f32(&mut self, value: f32) -> &mut Self {
        self.buf.write_f32::<LittleEndian>(value).unwrap();
        self
    }

    pub(crate) fn bytes(&mut self, bytes: &[u8]) -> &mut Self {
        self.buf.extend_from_slice(bytes);
        self
    }

    pub(crate) fn zeros(&mut self, count: usize) -> &mut Self {
        self.buf.resize(self.buf.len() + count, 0);
        self
    }

    pub(crate) fn pad_to(&mut self, position: usize) -> &mut Self {
        assert!(position >= self.buf.len(), "pad_to moves backwards");
        self.buf.resize(position, 0);
        self
    }

    pub(crate) fn align(&mut self, alignment: usize) -> &mut Self {
        let rem = self.buf.len() % alignment;
        if rem != 0 {
            self.zeros(alignment - rem);
        }
        self
    }

    pub(crate) fn point(&mut self, point: [u16; 3]) -> &mut Self {
        self.u16(point[0]).u16(point[1]).u16(point[2])
    }

    pub(crate) fn patch_u16(&mut self, at: usize, value: u16) -> &mut Self {
        self.buf[at..at + 2].copy_from_slice(&value.to_le_bytes());
        self
    }

    pub(crate) fn patch_u32(&mut self, at: usize, value: u32) -> &mut Self {
        self.buf[at..at + 4].copy_from_slice(&value.to_le_bytes());
        self
    }

    pub(crate) fn into_inner(self) -> Vec<u8> {
        self.buf
    }
}

/// Adjacency data for one waypoint.
#[derive(Debug, Clone, Default)]
pub(crate) struct LinkFixture {
    pub pairs: Vec<(u16, u16)>,
    pub extra: Vec<u16>,
}

/// Waypoint graph payload. Blob slices are written in reverse point order
/// so the decoder has to follow each descriptor's index.
#[derive(Debug, Clone, Default)]
pub(crate) struct NavWorldFixture {
    pub points: Vec<[u16; 3]>,
    pub links: Vec<LinkFixture>,
    pub edges: Vec<(u16, u16, u8, u8)>,
    pub edge_flags: Vec<u16>,
    pub trailing: Vec<i16>,
}

impl NavWorldFixture {
    pub(crate) fn encode(&self) -> Vec<u8> {
        const HEADER: usize = 48;
        let point_count = self.points.len();

        let points_offset = HEADER;
        let adjacency_offset = points_offset + point_count * 6;
        let blob_offset = adjacency_offset + point_count * 6;

        // Lay out blob slices back to front.
        let mut blob = ByteWriter::new();
        let mut indices = vec![0i16; point_count];
        for (i, link) in self.links.iter().enumerate().rev() {
            indices[i] = (blob.position() / 2) as i16;
            for &(node, edge) in &link.pairs {
                blob.u16(node).u16(edge);
            }
            for &value in &link.extra {
                blob.u16(value);
            }
        }
        let blob = blob.into_inner();

        let edges_offset = blob_offset + blob.len();
        let flags_offset = edges_offset + self.edges.len() * 6;
        let trailing_offset = flags_offset + self.edge_flags.len() * 2;

        let mut w = ByteWriter::new();
        w.u32(points_offset as u32)
            .u32(adjacency_offset as u32)
            .u32(edges_offset as u32)
            .u32(blob_offset as u32)
            .u32(0)
            .u32(0)
            .u32(flags_offset as u32)
            .u32(0)
            .u32(trailing_offset as u32)
            .u16(point_count as u16)
            .u16(self.edges.len() as u16)
            .bytes(&[1, 2, 3, 4, 5, 6])
            .u16(self.edge_flags.len() as u16);
        assert_eq!(w.position(), HEADER);

        for &point in &self.points {
            w.point(point);
        }
        for (i, link) in self.links.iter().enumerate() {
            w.i16(indices[i])
                .i16(-1)
                .u8(link.pairs.len() as u8)
                .u8(link.extra.len() as u8);
        }
        w.bytes(&blob);
        for &(weight, flags_index, from, to) in &self.edges {
            w.u16(weight).u16(flags_index).u8(from).u8(to);
        }
        for &flags in &self.edge_flags {
            w.u16(flags);
        }
        for &value in &self.trailing {
            w.i16(value);
        }
        w.into_inner()
    }
}

/// One navmesh face: 3 or 4 slots of each kind.
#[derive(Debug, Clone)]
pub(crate) struct FaceFixture {
    pub adjacent: Vec<i16>,
    pub vertices: Vec<u8>,
    pub edges: Vec<u8>,
}

/// Navmesh chunk payload. Face records are written in reverse order.
#[derive(Debug, Clone, Default)]
pub(crate) struct NavmeshFixture {
    pub vertices: Vec<[u16; 3]>,
    pub faces: Vec<FaceFixture>,
}

impl NavmeshFixture {
    pub(crate) fn encode(&self) -> Vec<u8> {
        const HEADER: usize = 32;
        let vertices_offset = HEADER;
        let face_offsets_offset = vertices_offset + self.vertices.len() * 6;
        let faces_offset = face_offsets_offset + self.faces.len() * 4;

        let mut records = ByteWriter::new();
        let mut packed = vec![0u32; self.faces.len()];
        for (i, face) in self.faces.iter().enumerate().rev() {
            let quad = face.adjacent.len() == 4;
            packed[i] = (records.position() / 2) as u32 | (u32::from(quad) << 18);
            for &adjacent in &face.adjacent {
                records.i16(adjacent);
            }
            records.bytes(&face.vertices).bytes(&face.edges);
        }

        let mut w = ByteWriter::new();
        w.u32(vertices_offset as u32)
            .u32(face_offsets_offset as u32)
            .u32(faces_offset as u32);
        for i in 0..6 {
            w.u16(0x100 + i);
        }
        w.u16(self.faces.len() as u16)
            .u16(self.vertices.len() as u16)
            .u16(0xAAAA)
            .u16(0xBBBB);
        assert_eq!(w.position(), HEADER);

        for &vertex in &self.vertices {
            w.point(vertex);
        }
        for &value in &packed {
            w.u32(value);
        }
        w.bytes(&records.into_inner());
        w.into_inner()
    }
}

/// In-group, off-group and off-mesh edges of one segment point, each given
/// as (fixed fields, trailing bytes).
#[derive(Debug, Clone, Default)]
pub(crate) struct SegmentPointFixture {
    pub point: [u16; 3],
    pub table_index: u32,
    pub in_group: Vec<((u16, u16), Vec<u8>)>,
    pub off_group: Vec<((u16, u16, u16), Vec<u8>)>,
    pub off_mesh: Vec<((u16, u16, u16, u16), Vec<u8>)>,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct SegmentGraphFixture {
    pub points: Vec<SegmentPointFixture>,
}

impl SegmentGraphFixture {
    pub(crate) fn encode(&self) -> Vec<u8> {
        const HEADER: usize = 32;
        let count = self.points.len();
        let points_offset = HEADER;
        let descriptors_offset = points_offset + count * 6;
        let edges_offset = descriptors_offset + count * 12;

        let total_edges: usize = self
            .points
            .iter()
            .map(|p| p.in_group.len() + p.off_group.len() + p.off_mesh.len())
            .sum();

        let mut w = ByteWriter::new();
        w.u32(points_offset as u32)
            .u32(descriptors_offset as u32)
            .u32(edges_offset as u32)
            .u32(0x1234)
            .u32(0) // total size, patched below
            .u32(count as u32)
            .u16(0x55)
            .u32(total_edges as u32)
            .u16(0);
        assert_eq!(w.position(), HEADER);

        for p in &self.points {
            w.point(p.point);
        }
        for p in &self.points {
            w.u32((p.table_index << 8) | p.in_group.len() as u32)
                .i16(-7)
                .u16(9)
                .u8(1)
                .u8(2)
                .u8(p.off_group.len() as u8)
                .u8(p.off_mesh.len() as u8);
        }
        for p in &self.points {
            for ((weight, node), tail) in &p.in_group {
                w.u16(*weight).u16(*node).u8(tail.len() as u8).u8(0xE1);
            }
            for ((group, weight, node), tail) in &p.off_group {
                w.u16(*group)
                    .u16(*weight)
                    .u16(*node)
                    .u8(tail.len() as u8)
                    .u8(0xE2);
            }
            for ((unknown, group, node, unknown2), tail) in &p.off_mesh {
                w.u16(*unknown)
                    .u16(*group)
                    .u16(*node)
                    .u16(*unknown2)
                    .u8(tail.len() as u8)
                    .u8(0xE3);
            }
            for (_, tail) in &p.in_group {
                w.bytes(tail);
            }
            for (_, tail) in &p.off_group {
                w.bytes(tail);
            }
            for (_, tail) in &p.off_mesh {
                w.bytes(tail);
            }
        }
        let total = w.position() as u32;
        w.patch_u32(16, total);
        w.into_inner()
    }
}

/// Segment chunk payload: (bounds, descriptor fields) per chunk.
#[derive(Debug, Clone, Default)]
pub(crate) struct SegmentChunkFixture {
    pub chunks: Vec<([i16; 6], (i16, i16, u8, u8, u8))>,
}

impl SegmentChunkFixture {
    pub(crate) fn encode(&self) -> Vec<u8> {
        const HEADER: usize = 16;
        let count = self.chunks.len();
        let bounds_offset = HEADER;
        let descriptors_offset = bounds_offset + count * 12;

        let mut w = ByteWriter::new();
        w.u32(bounds_offset as u32)
            .u32(descriptors_offset as u32)
            .u32((descriptors_offset + count * 12) as u32)
            .u32(count as u32);
        for (bounds, _) in &self.chunks {
            for &value in bounds {
                w.i16(value);
            }
        }
        for (_, (bias, face_index, verts, faces, edges)) in &self.chunks {
            w.i16(*bias)
                .i16(*face_index)
                .i16(0)
                .i16(0)
                .u8(*verts)
                .u8(*faces)
                .u8(0)
                .u8(*edges);
        }
        w.into_inner()
    }
}

/// One Section2 point with its value arrays.
#[derive(Debug, Clone, Default)]
pub(crate) struct Section2PointFixture {
    pub point: [u16; 3],
    pub pairs: Vec<(u16, u16)>,
    pub trailing: Vec<u16>,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct Section2Fixture {
    pub points: Vec<Section2PointFixture>,
}

impl Section2Fixture {
    /// Encode one record; `next` is the relative offset to the next record,
    /// or 0 to use the record's own length.
    pub(crate) fn encode(&self, next: u16) -> Vec<u8> {
        const HEADER: usize = 16;
        let count = self.points.len();
        let points_offset = HEADER;
        let values_offset = points_offset + count * 14;

        let mut values = ByteWriter::new();
        let mut value_offsets = Vec::with_capacity(count);
        for p in &self.points {
            value_offsets.push(values.position() as u16);
            for &(a, b) in &p.pairs {
                values.u16(a).u16(b);
            }
            for &value in &p.trailing {
                values.u16(value);
            }
        }
        let values = values.into_inner();
        let length = (values_offset + values.len()) as u16;

        let mut w = ByteWriter::new();
        w.u16(if next == 0 { length } else { next })
            .u16(points_offset as u16)
            .u16(count as u16)
            .u16(values_offset as u16)
            .u16(0x31)
            .u16(0x32)
            .u16(0x33)
            .u16(0x34);
        for (p, offset) in self.points.iter().zip(value_offsets) {
            w.point(p.point)
                .u8(0x0A)
                .u8(0x0B)
                .u16(offset)
                .u16(p.trailing.len() as u16)
                .u16(p.pairs.len() as u16);
        }
        w.bytes(&values);
        w.into_inner()
    }
}

/// Assembles complete `.nav2` files.
#[derive(Debug, Clone)]
pub(crate) struct FileBuilder {
    pub version: u32,
    pub divisors: [u16; 3],
    pub manifest: Vec<[(u8, u32, u8); 3]>,
    pub entries: Vec<(u16, u8, Vec<u8>)>,
    pub section2: Vec<Vec<u8>>,
}

impl Default for FileBuilder {
    fn default() -> Self {
        Self {
            version: 2,
            divisors: [100, 100, 100],
            manifest: Vec::new(),
            entries: Vec::new(),
            section2: Vec::new(),
        }
    }
}

impl FileBuilder {
    pub(crate) const HEADER_SIZE: usize = 96;

    pub(crate) fn entry(mut self, type_tag: u16, group_id: u8, payload: Vec<u8>) -> Self {
        self.entries.push((type_tag, group_id, payload));
        self
    }

    pub(crate) fn manifest_group(mut self, group: [(u8, u32, u8); 3]) -> Self {
        self.manifest.push(group);
        self
    }

    pub(crate) fn section2_record(mut self, record: Vec<u8>) -> Self {
        self.section2.push(record);
        self
    }

    pub(crate) fn build(&self) -> Vec<u8> {
        let mut w = ByteWriter::new();
        w.zeros(Self::HEADER_SIZE);

        let manifest_offset = if self.manifest.is_empty() {
            0
        } else {
            let offset = w.position();
            w.u32(self.manifest.len() as u32);
            for group in &self.manifest {
                for &(group_id, payload_offset, size) in group {
                    w.u8(group_id)
                        .u8(0x11)
                        .u16(0x2222)
                        .u32(payload_offset)
                        .u8(size)
                        .u16(0x4444);
                }
            }
            w.align(4);
            offset
        };

        w.align(16);
        let entries_offset = if self.entries.is_empty() {
            0
        } else {
            w.position()
        };
        for (type_tag, group_id, payload) in &self.entries {
            let start = w.position();
            w.u16(*type_tag)
                .u16(0)
                .u32(0) // next, patched below
                .u32(16)
                .u8(*group_id)
                .u8(0)
                .u16(0)
                .bytes(payload)
                .align(16);
            let next = (w.position() - start) as u32;
            w.patch_u32(start + 4, next);
        }

        let section2_offset = if self.section2.is_empty() {
            0
        } else {
            let offset = w.position();
            for record in &self.section2 {
                w.bytes(record);
            }
            offset
        };

        let file_length = w.position() as u32;
        let header = self.encode_header(
            file_length,
            entries_offset as u32,
            manifest_offset as u32,
            section2_offset as u32,
        );
        let mut bytes = w.into_inner();
        bytes[..Self::HEADER_SIZE].copy_from_slice(&header);
        bytes
    }

    fn encode_header(
        &self,
        file_length: u32,
        entries_offset: u32,
        manifest_offset: u32,
        section2_offset: u32,
    ) -> Vec<u8> {
        let mut w = ByteWriter::new();
        w.u32(self.version)
            .u32(file_length)
            .u32(entries_offset)
            .u32(self.entries.len() as u32)
            .u32(0)
            .u8(7)
            .bytes(&[0xA, 0xB, 0xC])
            .u32(section2_offset)
            .u32(0x66)
            .f32(10.0)
            .f32(-20.0)
            .f32(0.5)
            .u32(0)
            .u32(0x1B)
            .u32(manifest_offset)
            .u32(4 + self.manifest.len() as u32 * 33)
            .u32(0x1C)
            .u32(0x1D)
            .u16(self.divisors[0])
            .u16(self.divisors[1])
            .u16(self.divisors[2])
            .u16(0x1E)
            .u8(0x17)
            .u8(self.section2.len() as u8)
            .u16(0);
        // 1.0, 2.0, 0.5, -1.0 and 0.0, 0.25, 4.0, 65504.0
        for bits in [0x3C00u16, 0x4000, 0x3800, 0xBC00] {
            w.u16(bits);
        }
        for bits in [0x0000u16, 0x3400, 0x4400, 0x7BFF] {
            w.u16(bits);
        }
        assert_eq!(w.position(), Self::HEADER_SIZE);
        w.into_inner()
    }
}
