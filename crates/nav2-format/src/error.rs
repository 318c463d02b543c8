//! Error types for `.nav2` decoding.

use std::fmt;

use thiserror::Error;

/// The decoder component that was running when an error occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Component {
    Header,
    Manifest,
    EntryTable,
    NavWorld,
    NavmeshChunk,
    SegmentGraph,
    SegmentChunk,
    Section2,
}

impl Component {
    /// Human-readable component name.
    pub const fn name(&self) -> &'static str {
        match self {
            Component::Header => "header",
            Component::Manifest => "manifest",
            Component::EntryTable => "entry table",
            Component::NavWorld => "navworld",
            Component::NavmeshChunk => "navmesh chunk",
            Component::SegmentGraph => "segment graph",
            Component::SegmentChunk => "segment chunk",
            Component::Section2 => "section 2",
        }
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Errors that can occur when decoding a `.nav2` file.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error while opening or mapping a file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A read or seek needed bytes beyond the end of the supplied buffer.
    #[error("{component}: truncated input at {offset:#x}: needed {needed} bytes but only {available} available")]
    TruncatedInput {
        component: Component,
        offset: usize,
        needed: usize,
        available: usize,
    },

    /// A declared offset or computed seek target lies outside the file.
    #[error("{component}: offset {target:#x} outside file of {file_length:#x} bytes")]
    OffsetOutOfRange {
        component: Component,
        target: i64,
        file_length: usize,
    },

    /// An index refers past the end of the array it indexes.
    #[error("{component}: {field} {index} at {offset:#x} out of range (count {count})")]
    InconsistentCount {
        component: Component,
        offset: usize,
        field: &'static str,
        index: usize,
        count: usize,
    },

    /// Header version outside the supported range (strict mode only).
    #[error("unsupported nav2 version {version}")]
    UnsupportedVersion { version: u32 },

    /// Two payloads of the same kind were stored for one group.
    #[error("{component}: duplicate payload for group {group_id} at {offset:#x}")]
    DuplicateGroup {
        component: Component,
        group_id: u8,
        offset: usize,
    },

    /// A linked record list looped back onto an already decoded record.
    #[error("{component}: record at {offset:#x} visited twice")]
    RevisitedRecord { component: Component, offset: usize },
}

/// Fieldless discriminant of [`Error`], convenient for matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Io,
    TruncatedInput,
    OffsetOutOfRange,
    InconsistentCount,
    UnsupportedVersion,
    DuplicateGroup,
    RevisitedRecord,
}

impl Error {
    /// The kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Io(_) => ErrorKind::Io,
            Error::TruncatedInput { .. } => ErrorKind::TruncatedInput,
            Error::OffsetOutOfRange { .. } => ErrorKind::OffsetOutOfRange,
            Error::InconsistentCount { .. } => ErrorKind::InconsistentCount,
            Error::UnsupportedVersion { .. } => ErrorKind::UnsupportedVersion,
            Error::DuplicateGroup { .. } => ErrorKind::DuplicateGroup,
            Error::RevisitedRecord { .. } => ErrorKind::RevisitedRecord,
        }
    }

    /// The component that raised this error, if any.
    pub fn component(&self) -> Option<Component> {
        match self {
            Error::Io(_) | Error::UnsupportedVersion { .. } => None,
            Error::TruncatedInput { component, .. }
            | Error::OffsetOutOfRange { component, .. }
            | Error::InconsistentCount { component, .. }
            | Error::DuplicateGroup { component, .. }
            | Error::RevisitedRecord { component, .. } => Some(*component),
        }
    }

    /// Attach a component to a low-level read error.
    pub(crate) fn from_reader(component: Component, err: nav2_common::Error) -> Self {
        match err {
            nav2_common::Error::UnexpectedEof {
                position,
                needed,
                available,
            } => Error::TruncatedInput {
                component,
                offset: position,
                needed,
                available,
            },
        }
    }
}

/// Result type for nav2 decoding.
pub type Result<T> = std::result::Result<T, Error>;
