//! Common utilities for Thuum.
//!
//! This crate provides foundational types used across all Thuum crates:
//!
//! - [`BinaryReader`] - Zero-copy little-endian reading from byte slices
//! - [`FourCC`] - Raw four-character codes as they appear on disk
//! - [`FormId`] - The 32-bit identifier naming a game object or record

mod error;
mod form_id;
mod fourcc;
mod reader;

pub use error::{Error, Result};
pub use form_id::FormId;
pub use fourcc::FourCC;
pub use reader::BinaryReader;

/// Re-export zerocopy traits for convenience
pub use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

/// Re-export memchr for SIMD-accelerated byte searching
pub use memchr;
