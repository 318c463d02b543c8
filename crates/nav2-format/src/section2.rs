//! Section2: an optional linked list of point records.
//!
//! Each record starts with eight `u16` fields, the first being the offset of
//! the next record relative to this one. Points store their two value counts
//! as `count_b` then `count_a`, and the values region holds, per point in
//! order, `count_a` interleaved pairs followed by `count_b` single values.

use crate::cursor::{RecordCursor, VisitTracker};
use crate::header::Header;
use crate::point::QuantizedPoint;
use crate::{Component, Result};

/// Section2 record header. Offsets are relative to the record start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Section2Header {
    pub next: u16,
    pub points_offset: u16,
    pub point_count: u16,
    pub values_offset: u16,
    /// Further sub-offsets, preserved but not followed.
    pub unknown_offsets: [u16; 4],
}

impl Section2Header {
    pub const SIZE: usize = 16;

    fn read(cursor: &mut RecordCursor<'_>) -> Result<Self> {
        let next = cursor.read_u16()?;
        let points_offset = cursor.read_u16()?;
        let point_count = cursor.read_u16()?;
        let values_offset = cursor.read_u16()?;
        let mut unknown_offsets = [0u16; 4];
        for offset in &mut unknown_offsets {
            *offset = cursor.read_u16()?;
        }
        Ok(Self {
            next,
            points_offset,
            point_count,
            values_offset,
            unknown_offsets,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Section2Point {
    pub point: QuantizedPoint,
    pub unknown_06: u8,
    pub unknown_07: u8,
    /// Stored offset of this point's values; the decoder reads the values
    /// region sequentially instead.
    pub values_offset: u16,
    pub count_b: u16,
    pub count_a: u16,
}

impl Section2Point {
    pub const SIZE: usize = 14;

    fn read(cursor: &mut RecordCursor<'_>) -> Result<Self> {
        let point = QuantizedPoint::read(cursor)?;
        let unknown_06 = cursor.read_u8()?;
        let unknown_07 = cursor.read_u8()?;
        let values_offset = cursor.read_u16()?;
        let count_b = cursor.read_u16()?;
        let count_a = cursor.read_u16()?;
        Ok(Self {
            point,
            unknown_06,
            unknown_07,
            values_offset,
            count_b,
            count_a,
        })
    }
}

/// Values belonging to one Section2 point.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Section2Values {
    pairs: Vec<[u16; 2]>,
    trailing: Vec<u16>,
}

impl Section2Values {
    /// `count_a` interleaved pairs.
    pub fn pairs(&self) -> &[[u16; 2]] {
        &self.pairs
    }

    /// `count_b` values following the pairs.
    pub fn trailing(&self) -> &[u16] {
        &self.trailing
    }

    fn read(cursor: &mut RecordCursor<'_>, point: &Section2Point) -> Result<Self> {
        let count_a = usize::from(point.count_a);
        let count_b = usize::from(point.count_b);

        let mut pairs = Vec::with_capacity(cursor.capacity_for(count_a, 4));
        for _ in 0..count_a {
            pairs.push([cursor.read_u16()?, cursor.read_u16()?]);
        }
        let mut trailing = Vec::with_capacity(cursor.capacity_for(count_b, 2));
        for _ in 0..count_b {
            trailing.push(cursor.read_u16()?);
        }
        Ok(Self { pairs, trailing })
    }
}

/// One decoded Section2 record.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Section2Entry {
    offset: usize,
    header: Section2Header,
    points: Vec<Section2Point>,
    values: Vec<Section2Values>,
}

impl Section2Entry {
    /// Absolute offset of the record.
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn header(&self) -> &Section2Header {
        &self.header
    }

    pub fn points(&self) -> &[Section2Point] {
        &self.points
    }

    /// Values per point, parallel to [`points`](Self::points).
    pub fn values(&self) -> &[Section2Values] {
        &self.values
    }

    fn read(cursor: &mut RecordCursor<'_>) -> Result<Self> {
        cursor.with_record(Component::Section2, |cursor| {
            let offset = cursor.anchor();
            let header = Section2Header::read(cursor)?;
            let count = usize::from(header.point_count);

            cursor.seek_array_from_anchor(u64::from(header.points_offset), count)?;
            let mut points = Vec::with_capacity(cursor.capacity_for(count, Section2Point::SIZE));
            for _ in 0..count {
                points.push(Section2Point::read(cursor)?);
            }

            cursor.seek_from_anchor(u64::from(header.values_offset))?;
            let mut values = Vec::with_capacity(points.len());
            for point in &points {
                values.push(Section2Values::read(cursor, point)?);
            }

            Ok(Self {
                offset,
                header,
                points,
                values,
            })
        })
    }
}

/// Walk the Section2 list, or return nothing when the header has none.
pub(crate) fn read_section2(
    cursor: &mut RecordCursor<'_>,
    header: &Header,
    reject_revisits: bool,
) -> Result<Vec<Section2Entry>> {
    if !header.has_section2() {
        return Ok(Vec::new());
    }

    cursor.set_component(Component::Section2);
    cursor.seek_absolute(u64::from(header.section2_offset))?;

    let count = usize::from(header.section2_entry_count);
    let mut visits = VisitTracker::new(reject_revisits);
    let mut entries = Vec::with_capacity(count);
    for i in 0..count {
        let start = cursor.position();
        visits.visit(Component::Section2, start)?;
        let entry = Section2Entry::read(cursor)?;
        let next = entry.header.next;
        entries.push(entry);

        if i + 1 < count {
            cursor.seek_absolute(start as u64 + u64::from(next))?;
        }
    }

    tracing::debug!(records = entries.len(), "read section 2");
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::DecodeOptions;
    use crate::test_util::{FileBuilder, Section2PointFixture, Section2Fixture};
    use crate::{Error, ErrorKind};

    fn read(bytes: &[u8], reject_revisits: bool) -> Result<Vec<Section2Entry>> {
        let mut cursor = RecordCursor::new(bytes);
        let header = Header::read(&mut cursor, &DecodeOptions::default())?;
        read_section2(&mut cursor, &header, reject_revisits)
    }

    fn record() -> Section2Fixture {
        Section2Fixture {
            points: vec![
                Section2PointFixture {
                    point: [1, 2, 3],
                    pairs: vec![(10, 11), (12, 13)],
                    trailing: vec![99],
                },
                Section2PointFixture {
                    point: [4, 5, 6],
                    pairs: vec![],
                    trailing: vec![7, 8],
                },
            ],
        }
    }

    #[test]
    fn test_pairs_then_trailing_values() {
        let bytes = FileBuilder::default()
            .section2_record(record().encode(0))
            .build();
        let entries = read(&bytes, false).unwrap();

        assert_eq!(entries.len(), 1);
        let entry = &entries[0];
        assert_eq!(entry.header().unknown_offsets, [0x31, 0x32, 0x33, 0x34]);

        let first = entry.points()[0];
        assert_eq!(first.count_a, 2);
        assert_eq!(first.count_b, 1);
        assert_eq!(first.unknown_06, 0x0A);
        assert_eq!(entry.values()[0].pairs(), &[[10, 11], [12, 13]]);
        assert_eq!(entry.values()[0].trailing(), &[99]);

        assert!(entry.values()[1].pairs().is_empty());
        assert_eq!(entry.values()[1].trailing(), &[7, 8]);
    }

    #[test]
    fn test_follows_next_offsets() {
        let first = record().encode(0);
        let second = Section2Fixture {
            points: vec![Section2PointFixture {
                point: [9, 9, 9],
                ..Default::default()
            }],
        }
        .encode(0);
        let first_len = first.len();
        let bytes = FileBuilder::default()
            .section2_record(first)
            .section2_record(second)
            .build();
        let entries = read(&bytes, true).unwrap();

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].offset() - entries[0].offset(), first_len);
        assert_eq!(entries[1].points()[0].point, QuantizedPoint { x: 9, y: 9, z: 9 });
    }

    #[test]
    fn test_self_link_is_rejected_when_tracking() {
        // `next` of 0 points each record back at itself.
        let mut first = record().encode(0);
        first[0..2].copy_from_slice(&0u16.to_le_bytes());
        let bytes = FileBuilder::default()
            .section2_record(first)
            .section2_record(record().encode(0))
            .build();

        let entries = read(&bytes, false).unwrap();
        assert_eq!(entries[0], entries[1]);

        let err = read(&bytes, true).unwrap_err();
        assert!(matches!(
            err,
            Error::RevisitedRecord {
                component: Component::Section2,
                ..
            }
        ));
    }

    #[test]
    fn test_truncated_values() {
        let bytes = FileBuilder::default()
            .section2_record(record().encode(0))
            .build();
        let err = read(&bytes[..bytes.len() - 2], false).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TruncatedInput);
        assert_eq!(err.component(), Some(Component::Section2));
    }
}
