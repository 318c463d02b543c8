//! Offset-resolving cursor shared by all record decoders.
//!
//! `.nav2` payloads address their sub-arrays with offsets relative to the
//! start of the payload record, and the entry table links records through
//! offsets relative to each entry. [`RecordCursor`] wraps a
//! [`BinaryReader`] with a stack of record anchors so every decoder can
//! resolve its own offsets, and labels every error with the component that
//! raised it.

use std::collections::HashSet;

use nav2_common::BinaryReader;
use zerocopy::FromBytes;

use crate::{Component, Error, Result};

#[derive(Debug, Clone, Copy)]
struct Frame {
    start: usize,
    component: Component,
}

/// A seekable cursor over a whole `.nav2` buffer.
#[derive(Debug, Clone)]
pub struct RecordCursor<'a> {
    reader: BinaryReader<'a>,
    frames: Vec<Frame>,
    base_component: Component,
    declared_len: usize,
}

impl<'a> RecordCursor<'a> {
    /// Create a cursor at the start of `data`.
    ///
    /// Until [`set_declared_len`](Self::set_declared_len) is called the
    /// declared file length is the buffer length.
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            reader: BinaryReader::new(data),
            frames: Vec::with_capacity(2),
            base_component: Component::Header,
            declared_len: data.len(),
        }
    }

    /// Current absolute position.
    #[inline]
    pub fn position(&self) -> usize {
        self.reader.position()
    }

    /// Length of the supplied buffer.
    #[inline]
    pub fn buffer_len(&self) -> usize {
        self.reader.len()
    }

    /// Bytes left between the position and the end of the buffer.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.reader.remaining()
    }

    /// File length that seek targets are validated against.
    #[inline]
    pub fn declared_len(&self) -> usize {
        self.declared_len
    }

    /// Set the file length that seek targets are validated against.
    pub fn set_declared_len(&mut self, len: usize) {
        self.declared_len = len;
    }

    /// Component used to label errors.
    pub fn component(&self) -> Component {
        self.frames
            .last()
            .map_or(self.base_component, |frame| frame.component)
    }

    /// Set the component used outside of any record frame.
    pub fn set_component(&mut self, component: Component) {
        self.base_component = component;
    }

    /// Anchor a new record at the current position.
    ///
    /// Returns the anchor, which is the base for
    /// [`seek_from_anchor`](Self::seek_from_anchor) until the matching
    /// [`end_record`](Self::end_record).
    pub fn begin_record(&mut self, component: Component) -> usize {
        let start = self.position();
        self.frames.push(Frame { start, component });
        start
    }

    /// Drop the innermost record anchor.
    pub fn end_record(&mut self) {
        self.frames.pop();
    }

    /// Run `read` inside a record anchored at the current position.
    pub fn with_record<T>(
        &mut self,
        component: Component,
        read: impl FnOnce(&mut Self) -> Result<T>,
    ) -> Result<T> {
        self.begin_record(component);
        let result = read(self);
        self.end_record();
        result
    }

    /// Start of the innermost record, or 0 outside any record.
    pub fn anchor(&self) -> usize {
        self.frames.last().map_or(0, |frame| frame.start)
    }

    /// Seek to an absolute, possibly negative, target.
    ///
    /// Targets past the declared file length are `OffsetOutOfRange`; targets
    /// inside the declared length but past the supplied buffer are
    /// `TruncatedInput`. Landing exactly on the end is allowed; use
    /// [`seek_array_from_anchor`](Self::seek_array_from_anchor) when data
    /// must follow.
    pub fn seek_to(&mut self, target: i64) -> Result<()> {
        let declared = i64::try_from(self.declared_len).unwrap_or(i64::MAX);
        if target < 0 || target > declared {
            return Err(Error::OffsetOutOfRange {
                component: self.component(),
                target,
                file_length: self.declared_len,
            });
        }

        // Non-negative and bounded by a usize, so the conversion is lossless.
        let target = target as usize;
        let len = self.reader.len();
        if target > len {
            return Err(Error::TruncatedInput {
                component: self.component(),
                offset: len,
                needed: target - len,
                available: 0,
            });
        }

        self.reader.seek(target);
        Ok(())
    }

    /// Seek to an absolute unsigned offset.
    pub fn seek_absolute(&mut self, target: u64) -> Result<()> {
        self.seek_to(i64::try_from(target).unwrap_or(i64::MAX))
    }

    /// Seek to `anchor + relative`.
    pub fn seek_from_anchor(&mut self, relative: u64) -> Result<()> {
        let anchor = self.anchor() as u64;
        self.seek_absolute(anchor.saturating_add(relative))
    }

    /// Seek to `anchor + relative` for a signed relative offset.
    pub fn seek_from_anchor_signed(&mut self, relative: i64) -> Result<()> {
        let anchor = i64::try_from(self.anchor()).unwrap_or(i64::MAX);
        self.seek_to(anchor.saturating_add(relative))
    }

    /// Seek to the start of a `count` element array at `anchor + relative`.
    ///
    /// An empty array may sit exactly on the end of the file; a non-empty one
    /// must start inside it.
    pub fn seek_array_from_anchor(&mut self, relative: u64, count: usize) -> Result<()> {
        let target = (self.anchor() as u64).saturating_add(relative);
        if count > 0 && target == self.declared_len as u64 {
            return Err(Error::OffsetOutOfRange {
                component: self.component(),
                target: i64::try_from(target).unwrap_or(i64::MAX),
                file_length: self.declared_len,
            });
        }
        self.seek_absolute(target)
    }

    /// Vector capacity for `count` records of `record_size` bytes.
    ///
    /// Bounded by what the rest of the buffer could hold, so a corrupt count
    /// fails on the read instead of on the allocation.
    pub fn capacity_for(&self, count: usize, record_size: usize) -> usize {
        count.min(self.remaining() / record_size.max(1))
    }

    /// Build an `InconsistentCount` error at the current position.
    pub fn inconsistent(&self, field: &'static str, index: usize, count: usize) -> Error {
        Error::InconsistentCount {
            component: self.component(),
            offset: self.position(),
            field,
            index,
            count,
        }
    }

    #[inline]
    fn lift<T>(&self, value: nav2_common::Result<T>) -> Result<T> {
        value.map_err(|err| Error::from_reader(self.component(), err))
    }

    /// Read `count` bytes into an owned vector.
    pub fn read_byte_vec(&mut self, count: usize) -> Result<Vec<u8>> {
        let value = self.reader.read_bytes(count).map(<[u8]>::to_vec);
        self.lift(value)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        let value = self.reader.read_u8();
        self.lift(value)
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        let value = self.reader.read_u16();
        self.lift(value)
    }

    pub fn read_i16(&mut self) -> Result<i16> {
        let value = self.reader.read_i16();
        self.lift(value)
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        let value = self.reader.read_u32();
        self.lift(value)
    }

    /// Read a fixed layout struct.
    pub fn read_struct<T: FromBytes>(&mut self) -> Result<T> {
        let value = self.reader.read_struct::<T>();
        self.lift(value)
    }
}

/// Visited-record tracking for linked walks over untrusted input.
#[derive(Debug, Default)]
pub(crate) struct VisitTracker {
    seen: Option<HashSet<usize>>,
}

impl VisitTracker {
    pub(crate) fn new(enabled: bool) -> Self {
        Self {
            seen: enabled.then(HashSet::new),
        }
    }

    /// Record a visit to `offset`, failing on a repeat.
    pub(crate) fn visit(&mut self, component: Component, offset: usize) -> Result<()> {
        if let Some(seen) = &mut self.seen {
            if !seen.insert(offset) {
                return Err(Error::RevisitedRecord { component, offset });
            }
        }
        Ok(())
    }
}
