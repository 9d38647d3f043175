//! Display text that is either inline or a string-table index.

use std::borrow::Cow;
use std::io::Write;

use thuum_common::FourCC;

use crate::string_table::StringTable;
use crate::subrecord::{encoded_size, SubrecordStream, SubrecordWriter, MAX_TEXT_LENGTH};
use crate::text::RawString;
use crate::{Error, Result};

/// A localizable text subrecord.
///
/// Localized plugins store a 4-byte index into the string table; other
/// plugins store the text itself. An index always carries the text it
/// resolved to at load time.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LocalizedString {
    /// Not present in the record.
    #[default]
    None,
    /// String-table index and its resolved text.
    Index { index: u32, text: String },
    /// Inline text, in the plugin's code page.
    Literal(RawString),
}

impl LocalizedString {
    /// Create an index variant.
    pub fn indexed(index: u32, text: impl Into<String>) -> Self {
        Self::Index {
            index,
            text: text.into(),
        }
    }

    /// Create a literal variant.
    pub fn literal(text: impl Into<RawString>) -> Self {
        Self::Literal(text.into())
    }

    #[inline]
    pub fn is_present(&self) -> bool {
        !matches!(self, Self::None)
    }

    /// Name of the current variant.
    pub fn variant_name(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Index { .. } => "index",
            Self::Literal(_) => "literal",
        }
    }

    /// The string-table index.
    pub fn index(&self) -> Result<u32> {
        match self {
            Self::Index { index, .. } => Ok(*index),
            other => Err(Error::WrongVariant {
                expected: "index",
                actual: other.variant_name(),
            }),
        }
    }

    /// The text, resolved or inline.
    ///
    /// Inline bytes that are not UTF-8 are decoded lossily; use
    /// [`bytes`](Self::bytes) for the stored form.
    pub fn text(&self) -> Result<Cow<'_, str>> {
        match self {
            Self::Index { text, .. } => Ok(Cow::Borrowed(text)),
            Self::Literal(text) => Ok(text.to_string_lossy()),
            Self::None => Err(Self::missing()),
        }
    }

    /// The text as stored.
    pub fn bytes(&self) -> Result<&[u8]> {
        match self {
            Self::Index { text, .. } => Ok(text.as_bytes()),
            Self::Literal(text) => Ok(text.as_bytes()),
            Self::None => Err(Self::missing()),
        }
    }

    fn missing() -> Error {
        Error::WrongVariant {
            expected: "index or literal",
            actual: "none",
        }
    }

    pub fn reset(&mut self) {
        *self = Self::None;
    }

    /// Read one `tag` subrecord.
    ///
    /// With `localized` the subrecord holds an index that must resolve in
    /// `table`; index 0 falls back to the empty string when the table has no
    /// entry for it. The value is left as `None` on any error.
    pub fn load(
        &mut self,
        stream: &mut SubrecordStream<'_>,
        tag: FourCC,
        with_header: bool,
        localized: bool,
        table: &StringTable,
    ) -> Result<()> {
        self.reset();
        if with_header {
            stream.expect_tag(tag)?;
        }

        *self = if localized {
            let index = stream.read_u32(tag)?;
            let text = match table.get(index) {
                Some(text) => text,
                None if index == 0 => "",
                None => return Err(Error::StringResolutionFailure { index }),
            };
            Self::indexed(index, text)
        } else {
            Self::literal(stream.read_variable(tag, MAX_TEXT_LENGTH)?)
        };
        Ok(())
    }

    /// Bytes written by [`save_to`](Self::save_to).
    pub fn write_size(&self) -> u32 {
        let size = match self {
            Self::None => 0,
            Self::Index { .. } => encoded_size(4),
            Self::Literal(text) => encoded_size(text.len() + 1),
        };
        size as u32
    }

    /// Write the value as a `tag` subrecord, if present.
    pub fn save_to<W: Write + ?Sized>(&self, writer: &mut W, tag: FourCC) -> Result<()> {
        match self {
            Self::None => Ok(()),
            Self::Index { index, .. } => writer.write_u32_subrecord(tag, *index),
            Self::Literal(text) => {
                if text.len() + 1 > usize::from(MAX_TEXT_LENGTH) {
                    return Err(Error::TooLong {
                        tag,
                        length: text.len() + 1,
                        max: usize::from(MAX_TEXT_LENGTH),
                    });
                }
                writer.write_zstring_subrecord(tag, text)
            }
        }
    }
}

impl PartialEq for LocalizedString {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::None, Self::None) => true,
            (Self::Index { index: a, .. }, Self::Index { index: b, .. }) => a == b,
            (Self::Literal(a), Self::Literal(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for LocalizedString {}
