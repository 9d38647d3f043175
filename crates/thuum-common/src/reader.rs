//! Binary reader for zero-copy parsing of plugin data.
//!
//! Creation-Engine plugins are little-endian throughout, so [`BinaryReader`]
//! only offers little-endian reads. It never copies: every slice it hands out
//! borrows from the underlying buffer.

use zerocopy::FromBytes;

use crate::{Error, FormId, FourCC, Result};

/// A cursor over a byte slice.
///
/// # Example
///
/// ```
/// use thuum_common::BinaryReader;
///
/// let data = *b"EDID\x04\x00Ale\x00";
/// let mut reader = BinaryReader::new(&data);
///
/// assert_eq!(reader.read_fourcc().unwrap().as_bytes(), b"EDID");
/// assert_eq!(reader.read_u16().unwrap(), 4);
/// assert_eq!(reader.read_bytes(4).unwrap(), b"Ale\x00");
/// assert!(reader.is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct BinaryReader<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> BinaryReader<'a> {
    /// Create a new reader from a byte slice.
    #[inline]
    pub const fn new(data: &'a [u8]) -> Self {
        Self { data, position: 0 }
    }

    /// Get the current position in the buffer.
    #[inline]
    pub const fn position(&self) -> usize {
        self.position
    }

    /// Get the total length of the underlying buffer.
    #[inline]
    pub const fn len(&self) -> usize {
        self.data.len()
    }

    /// Get the number of bytes remaining to read.
    #[inline]
    pub const fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.position)
    }

    /// Check if there are no more bytes to read.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.position >= self.data.len()
    }

    /// Get the remaining bytes as a slice.
    #[inline]
    pub fn remaining_bytes(&self) -> &'a [u8] {
        &self.data[self.position.min(self.data.len())..]
    }

    /// Read bytes and advance the position.
    #[inline]
    pub fn read_bytes(&mut self, count: usize) -> Result<&'a [u8]> {
        if self.remaining() < count {
            return Err(Error::UnexpectedEof {
                needed: count,
                available: self.remaining(),
            });
        }
        let bytes = &self.data[self.position..self.position + count];
        self.position += count;
        Ok(bytes)
    }

    /// Read a fixed-size byte array.
    #[inline]
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let bytes = self.read_bytes(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(bytes);
        Ok(out)
    }

    /// Read a single byte.
    #[inline]
    pub fn read_u8(&mut self) -> Result<u8> {
        self.read_bytes(1).map(|b| b[0])
    }

    /// Read a little-endian u16.
    #[inline]
    pub fn read_u16(&mut self) -> Result<u16> {
        self.read_array::<2>().map(u16::from_le_bytes)
    }

    /// Read a little-endian u32.
    #[inline]
    pub fn read_u32(&mut self) -> Result<u32> {
        self.read_array::<4>().map(u32::from_le_bytes)
    }

    /// Read a little-endian i32.
    #[inline]
    pub fn read_i32(&mut self) -> Result<i32> {
        self.read_array::<4>().map(i32::from_le_bytes)
    }

    /// Read a little-endian f32.
    #[inline]
    pub fn read_f32(&mut self) -> Result<f32> {
        self.read_array::<4>().map(f32::from_le_bytes)
    }

    /// Read a four-character code.
    #[inline]
    pub fn read_fourcc(&mut self) -> Result<FourCC> {
        self.read_struct::<FourCC>()
    }

    /// Read a form ID.
    #[inline]
    pub fn read_form_id(&mut self) -> Result<FormId> {
        self.read_u32().map(FormId::new)
    }

    /// Read a struct using zerocopy.
    ///
    /// Only for layouts without multi-byte integers; those go through the
    /// little-endian reads above.
    #[inline]
    pub fn read_struct<T: FromBytes>(&mut self) -> Result<T> {
        let size = std::mem::size_of::<T>();
        let bytes = self.read_bytes(size)?;
        T::read_from_bytes(bytes).map_err(|_| Error::UnexpectedEof {
            needed: size,
            available: bytes.len(),
        })
    }
}
