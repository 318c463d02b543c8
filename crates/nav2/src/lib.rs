//! nav2 - decoding of `.nav2` navigation data files.
//!
//! This crate provides a unified interface to the nav2 crates.
//!
//! # Crates
//!
//! - [`nav2_common`] - Common utilities (little-endian reading, half floats, packed fields)
//! - [`nav2_format`] - The `.nav2` decoder and its data model
//!
//! # Example
//!
//! ```no_run
//! use nav2::prelude::*;
//!
//! let file = nav2::open("level.nav2")?;
//! for group in file.summary().groups {
//!     println!("group {}: {} navmesh faces", group.group_id, group.navmesh_faces);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

// Re-export all sub-crates
pub use nav2_common as common;
pub use nav2_format as format;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use nav2_common::{BinaryReader, HalfVec3, HalfVec4};
    pub use nav2_format::{
        DecodeOptions, DecodedFile, Divisors, Entry, EntryType, EntryWalker, Error, ErrorKind,
        FileSummary, GroupSummary, Header, NavWorld, NavmeshChunk, Payload, QuantizedPoint,
        Section2Entry, SegmentChunk, SegmentGraph,
    };
}

// Re-export the entry points at the crate root
pub use nav2_format::{decode, decode_with, open, open_with};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
