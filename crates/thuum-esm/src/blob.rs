//! Opaque subrecord data.

use std::io::Write;

use thuum_common::FourCC;

use crate::subrecord::{encoded_size, SubrecordStream, SubrecordWriter};
use crate::Result;

/// Raw subrecord bytes that are kept but not interpreted.
///
/// An absent blob is never written, and two absent blobs are equal whatever
/// their buffers still hold.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BinaryBlob {
    present: bool,
    data: Vec<u8>,
}

impl BinaryBlob {
    /// Create an absent blob.
    pub const fn new() -> Self {
        Self {
            present: false,
            data: Vec::new(),
        }
    }

    /// Create a present blob holding `data`.
    pub fn from_bytes(data: impl Into<Vec<u8>>) -> Self {
        Self {
            present: true,
            data: data.into(),
        }
    }

    pub fn set_presence(&mut self, present: bool) {
        self.present = present;
    }

    #[inline]
    pub fn is_present(&self) -> bool {
        self.present
    }

    /// The stored bytes.
    #[inline]
    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    /// Number of stored bytes.
    #[inline]
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Replace the contents and mark the blob present.
    pub fn set_bytes(&mut self, data: impl Into<Vec<u8>>) {
        self.data = data.into();
        self.present = true;
    }

    /// Consume one subrecord from `stream`.
    ///
    /// With `with_header` the tag is read first and must equal `tag`;
    /// otherwise the caller has already consumed it.
    pub fn load_from(
        &mut self,
        stream: &mut SubrecordStream<'_>,
        tag: FourCC,
        with_header: bool,
    ) -> Result<()> {
        self.present = false;
        if with_header {
            stream.expect_tag(tag)?;
        }
        let payload = stream.read_payload()?;

        self.data.clear();
        self.data.extend_from_slice(payload);
        self.present = true;
        Ok(())
    }

    /// Bytes written by [`save_to`](Self::save_to).
    pub fn write_size(&self) -> usize {
        if self.present {
            encoded_size(self.data.len())
        } else {
            0
        }
    }

    /// Write the blob as a `tag` subrecord, if present.
    pub fn save_to<W: Write + ?Sized>(&self, writer: &mut W, tag: FourCC) -> Result<()> {
        if self.present {
            writer.write_subrecord(tag, &self.data)?;
        }
        Ok(())
    }
}

impl PartialEq for BinaryBlob {
    fn eq(&self, other: &Self) -> bool {
        self.present == other.present && (!self.present || self.data == other.data)
    }
}

impl Eq for BinaryBlob {}
