//! Record header parsing.

use std::io::Write;

use byteorder::{LittleEndian, WriteBytesExt};
use thuum_common::{BinaryReader, FormId, FourCC};

use crate::{Error, Result};

/// Size of a record header in bytes, type code included.
pub const RECORD_HEADER_SIZE: usize = 24;

/// The fixed header in front of every record.
///
/// Layout (little-endian):
///
/// | offset | size | field            |
/// |--------|------|------------------|
/// | 0      | 4    | record type      |
/// | 4      | 4    | payload size     |
/// | 8      | 4    | flags            |
/// | 12     | 4    | form ID          |
/// | 16     | 4    | revision         |
/// | 20     | 2    | format version   |
/// | 22     | 2    | unknown          |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct RecordHeader {
    /// Record type code.
    pub record_type: FourCC,
    /// Size of the subrecord stream following the header.
    pub payload_size: u32,
    /// Record flags.
    pub flags: u32,
    /// Form ID of this record.
    pub form_id: FormId,
    /// Version control revision.
    pub revision: u32,
    /// Record format version.
    pub format_version: u16,
    pub unknown: u16,
}

impl RecordHeader {
    /// The record is deleted and carries no subrecords.
    pub const FLAG_DELETED: u32 = 0x0000_0020;
    /// The record is ignored by the engine.
    pub const FLAG_IGNORED: u32 = 0x0000_1000;
    /// The payload is zlib-compressed.
    pub const FLAG_COMPRESSED: u32 = 0x0004_0000;

    /// Create an empty header for the given record type.
    pub const fn new(record_type: FourCC) -> Self {
        Self {
            record_type,
            payload_size: 0,
            flags: 0,
            form_id: FormId::NULL,
            revision: 0,
            format_version: 0,
            unknown: 0,
        }
    }

    /// Read a full 24-byte header.
    pub fn decode(reader: &mut BinaryReader<'_>) -> Result<Self> {
        Self::check_available(reader, RECORD_HEADER_SIZE)?;
        let record_type = reader.read_fourcc()?;
        Self::decode_after_type(record_type, reader)
    }

    /// Read the 20 header bytes that follow an already consumed type code.
    pub fn decode_after_type(record_type: FourCC, reader: &mut BinaryReader<'_>) -> Result<Self> {
        Self::check_available(reader, RECORD_HEADER_SIZE - 4)?;

        Ok(Self {
            record_type,
            payload_size: reader.read_u32()?,
            flags: reader.read_u32()?,
            form_id: reader.read_form_id()?,
            revision: reader.read_u32()?,
            format_version: reader.read_u16()?,
            unknown: reader.read_u16()?,
        })
    }

    /// Write the header.
    pub fn encode<W: Write + ?Sized>(&self, writer: &mut W) -> Result<()> {
        writer.write_all(self.record_type.as_bytes())?;
        writer.write_u32::<LittleEndian>(self.payload_size)?;
        writer.write_u32::<LittleEndian>(self.flags)?;
        writer.write_u32::<LittleEndian>(self.form_id.value())?;
        writer.write_u32::<LittleEndian>(self.revision)?;
        writer.write_u16::<LittleEndian>(self.format_version)?;
        writer.write_u16::<LittleEndian>(self.unknown)?;
        Ok(())
    }

    /// Check if the deleted flag is set.
    #[inline]
    pub const fn is_deleted(&self) -> bool {
        self.flags & Self::FLAG_DELETED != 0
    }

    /// Check if the ignored flag is set.
    #[inline]
    pub const fn is_ignored(&self) -> bool {
        self.flags & Self::FLAG_IGNORED != 0
    }

    /// Check if the compressed flag is set.
    #[inline]
    pub const fn is_compressed(&self) -> bool {
        self.flags & Self::FLAG_COMPRESSED != 0
    }

    /// Set or clear the deleted flag.
    pub fn set_deleted(&mut self, deleted: bool) {
        if deleted {
            self.flags |= Self::FLAG_DELETED;
        } else {
            self.flags &= !Self::FLAG_DELETED;
        }
    }

    /// Compare every field except the payload size, which is derived from
    /// the subrecords on save.
    pub fn same_identity(&self, other: &Self) -> bool {
        self.record_type == other.record_type
            && self.flags == other.flags
            && self.form_id == other.form_id
            && self.revision == other.revision
            && self.format_version == other.format_version
            && self.unknown == other.unknown
    }

    fn check_available(reader: &BinaryReader<'_>, needed: usize) -> Result<()> {
        if reader.remaining() < needed {
            return Err(Error::TruncatedHeader {
                needed,
                available: reader.remaining(),
            });
        }
        Ok(())
    }
}
