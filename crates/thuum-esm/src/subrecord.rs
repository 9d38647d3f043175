//! Subrecord framing.
//!
//! A record payload is a flat run of `tag (4) + length (u16) + data`
//! subrecords. [`SubrecordStream`] walks that run by byte count;
//! [`SubrecordWriter`] emits it.

use std::io::Write;

use byteorder::{LittleEndian, WriteBytesExt};
use thuum_common::memchr::memchr;
use thuum_common::{BinaryReader, FourCC};

use crate::{Error, Result};

/// Size of the tag and length in front of every subrecord.
pub const SUBRECORD_HEADER_SIZE: usize = 6;

/// Ceiling for NUL-terminated text subrecords, terminator included.
pub const MAX_TEXT_LENGTH: u16 = 511;

/// Reader over the subrecords of one record payload.
///
/// # Example
///
/// ```
/// use thuum_common::{BinaryReader, FourCC};
/// use thuum_esm::SubrecordStream;
///
/// let data = b"EDID\x04\x00Ale\x00";
/// let mut reader = BinaryReader::new(data);
/// let mut stream = SubrecordStream::new(&mut reader, 10).unwrap();
///
/// let tag = stream.next_tag().unwrap().unwrap();
/// assert_eq!(tag, FourCC(*b"EDID"));
/// assert_eq!(stream.read_variable(tag, 511).unwrap(), b"Ale");
/// assert_eq!(stream.next_tag().unwrap(), None);
/// ```
#[derive(Debug, Clone)]
pub struct SubrecordStream<'a> {
    reader: BinaryReader<'a>,
}

impl<'a> SubrecordStream<'a> {
    /// Carve `payload_size` bytes out of `reader`.
    pub fn new(reader: &mut BinaryReader<'a>, payload_size: u32) -> Result<Self> {
        let needed = payload_size as usize;
        let available = reader.remaining();
        let payload = reader
            .read_bytes(needed)
            .map_err(|_| Error::TruncatedStream { needed, available })?;
        Ok(Self::from_payload(payload))
    }

    /// Walk an already isolated payload.
    pub const fn from_payload(payload: &'a [u8]) -> Self {
        Self {
            reader: BinaryReader::new(payload),
        }
    }

    /// Bytes consumed so far.
    #[inline]
    pub const fn bytes_consumed(&self) -> usize {
        self.reader.position()
    }

    /// Total payload size.
    #[inline]
    pub const fn payload_size(&self) -> usize {
        self.reader.len()
    }

    /// Bytes left in the payload.
    #[inline]
    pub const fn remaining(&self) -> usize {
        self.reader.remaining()
    }

    /// Read the next tag, or `None` once every payload byte is consumed.
    pub fn next_tag(&mut self) -> Result<Option<FourCC>> {
        if self.reader.is_empty() {
            return Ok(None);
        }
        self.reader.read_fourcc().map(Some).map_err(Error::truncated)
    }

    /// Read the next tag and require it to be `expected`.
    pub fn expect_tag(&mut self, expected: FourCC) -> Result<()> {
        let available = self.remaining();
        let actual = self.next_tag()?.ok_or(Error::TruncatedStream {
            needed: SUBRECORD_HEADER_SIZE,
            available,
        })?;
        if actual != expected {
            return Err(Error::UnexpectedTag {
                expected: Some(expected),
                actual,
            });
        }
        Ok(())
    }

    /// Read a subrecord length.
    pub fn read_length(&mut self) -> Result<u16> {
        self.reader.read_u16().map_err(Error::truncated)
    }

    /// Read `length` data bytes.
    pub fn read_data(&mut self, length: u16) -> Result<&'a [u8]> {
        self.reader
            .read_bytes(usize::from(length))
            .map_err(Error::truncated)
    }

    /// Read a length and its data, whatever the length.
    pub fn read_payload(&mut self) -> Result<&'a [u8]> {
        let length = self.read_length()?;
        self.read_data(length)
    }

    /// Read a length that must equal `expected`, then its data.
    pub fn read_exact(&mut self, tag: FourCC, expected: u16) -> Result<&'a [u8]> {
        let length = self.read_length()?;
        if length != expected {
            return Err(Error::LengthMismatch {
                tag,
                expected: expected.to_string(),
                actual: usize::from(length),
            });
        }
        self.read_data(length)
    }

    /// Read a little-endian u32 subrecord.
    pub fn read_u32(&mut self, tag: FourCC) -> Result<u32> {
        let data = self.read_exact(tag, 4)?;
        Ok(u32::from_le_bytes([data[0], data[1], data[2], data[3]]))
    }

    /// Read NUL-terminated text of at most `max_length` bytes.
    ///
    /// Returns the text bytes without the terminator.
    pub fn read_variable(&mut self, tag: FourCC, max_length: u16) -> Result<&'a [u8]> {
        let length = self.read_length()?;
        if length > max_length {
            return Err(Error::TooLong {
                tag,
                length: usize::from(length),
                max: usize::from(max_length),
            });
        }
        let data = self.read_data(length)?;
        decode_zstring(tag, data)
    }
}

/// Strip the single NUL that must end text subrecord data.
pub fn decode_zstring(tag: FourCC, data: &[u8]) -> Result<&[u8]> {
    match memchr(0, data) {
        Some(end) if end + 1 == data.len() => Ok(&data[..end]),
        Some(end) => Err(Error::LengthMismatch {
            tag,
            expected: (end + 1).to_string(),
            actual: data.len(),
        }),
        None => Err(thuum_common::Error::MissingNullTerminator.into()),
    }
}

/// Encoded size of a subrecord with `data_len` data bytes.
#[inline]
pub const fn encoded_size(data_len: usize) -> usize {
    SUBRECORD_HEADER_SIZE + data_len
}

/// Subrecord output on top of any [`Write`].
pub trait SubrecordWriter: Write {
    /// Write one subrecord.
    fn write_subrecord(&mut self, tag: FourCC, data: &[u8]) -> Result<()> {
        let length = u16::try_from(data.len()).map_err(|_| Error::SubrecordTooLarge {
            tag,
            size: data.len(),
        })?;
        self.write_all(tag.as_bytes())?;
        self.write_u16::<LittleEndian>(length)?;
        self.write_all(data)?;
        Ok(())
    }

    /// Write a 4-byte little-endian subrecord.
    fn write_u32_subrecord(&mut self, tag: FourCC, value: u32) -> Result<()> {
        self.write_subrecord(tag, &value.to_le_bytes())
    }

    /// Write text bytes with their NUL terminator.
    fn write_zstring_subrecord(&mut self, tag: FourCC, text: impl AsRef<[u8]>) -> Result<()> {
        let text = text.as_ref();
        let size = text.len() + 1;
        let length =
            u16::try_from(size).map_err(|_| Error::SubrecordTooLarge { tag, size })?;
        self.write_all(tag.as_bytes())?;
        self.write_u16::<LittleEndian>(length)?;
        self.write_all(text)?;
        self.write_u8(0)?;
        Ok(())
    }
}

impl<W: Write + ?Sized> SubrecordWriter for W {}
