//! Common utilities for nav2.
//!
//! This crate provides the leaf-level building blocks used by the `.nav2`
//! decoder:
//!
//! - [`BinaryReader`] - Little-endian reading from byte slices
//! - [`bits`] - Packed bitfield splitting
//! - [`HalfVec3`] / [`HalfVec4`] - Half-precision float vectors

mod error;
mod half_vec;
mod reader;

pub mod bits;

pub use error::{Error, Result};
pub use half_vec::{HalfVec3, HalfVec4};
pub use reader::BinaryReader;

/// Re-export the binary16 type used in the public model.
pub use half::f16;

/// Re-export zerocopy traits for convenience
pub use zerocopy::{FromBytes, Immutable, KnownLayout, Unaligned};
