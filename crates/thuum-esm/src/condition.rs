//! Conditions attached to effects.

use std::io::Write;

use thuum_common::FourCC;

use crate::subrecord::{encoded_size, SubrecordWriter};
use crate::text::RawString;
use crate::Result;

/// Size of a CTDA condition payload.
pub const CONDITION_SIZE: usize = 32;

/// One condition payload plus its optional string parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConditionEntry {
    data: [u8; CONDITION_SIZE],
    text: Option<RawString>,
}

impl ConditionEntry {
    pub const fn new(data: [u8; CONDITION_SIZE]) -> Self {
        Self { data, text: None }
    }

    /// Create a condition carrying a string parameter.
    pub fn with_text(data: [u8; CONDITION_SIZE], text: impl Into<RawString>) -> Self {
        Self {
            data,
            text: Some(text.into()),
        }
    }

    /// The raw condition payload.
    #[inline]
    pub fn data(&self) -> &[u8; CONDITION_SIZE] {
        &self.data
    }

    /// The string parameter, if any.
    #[inline]
    pub fn text(&self) -> Option<&RawString> {
        self.text.as_ref()
    }

    #[inline]
    pub fn has_text(&self) -> bool {
        self.text.is_some()
    }

    pub fn set_text(&mut self, text: Option<RawString>) {
        self.text = text;
    }

    /// Bytes written by [`save_to`](Self::save_to).
    pub fn write_size(&self) -> usize {
        encoded_size(CONDITION_SIZE) + self.text.as_ref().map_or(0, |t| encoded_size(t.len() + 1))
    }

    /// Write the condition and, if present, its string parameter.
    pub fn save_to<W: Write + ?Sized>(
        &self,
        writer: &mut W,
        condition_tag: FourCC,
        text_tag: FourCC,
    ) -> Result<()> {
        writer.write_subrecord(condition_tag, &self.data)?;
        if let Some(text) = &self.text {
            writer.write_zstring_subrecord(text_tag, text)?;
        }
        Ok(())
    }
}
