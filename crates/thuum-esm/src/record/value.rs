//! Decoded field values.

use std::io::Write;

use byteorder::{LittleEndian, WriteBytesExt};
use thuum_common::{BinaryReader, FormId, FourCC};

use crate::blob::BinaryBlob;
use crate::effect::EffectEntry;
use crate::localized::LocalizedString;
use crate::schema::{FieldDescriptor, FieldKind, ScalarKind};
use crate::subrecord::{encoded_size, SubrecordWriter, MAX_TEXT_LENGTH};
use crate::tag::Tag;
use crate::text::RawString;
use crate::Result;

/// One element of a struct field.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Scalar {
    U8(u8),
    U16(u16),
    U32(u32),
    I32(i32),
    F32(f32),
    FormId(FormId),
}

impl Scalar {
    pub const fn kind(&self) -> ScalarKind {
        match self {
            Scalar::U8(_) => ScalarKind::U8,
            Scalar::U16(_) => ScalarKind::U16,
            Scalar::U32(_) => ScalarKind::U32,
            Scalar::I32(_) => ScalarKind::I32,
            Scalar::F32(_) => ScalarKind::F32,
            Scalar::FormId(_) => ScalarKind::FormId,
        }
    }

    /// The zero value of `kind`.
    pub const fn zero(kind: ScalarKind) -> Self {
        match kind {
            ScalarKind::U8 => Scalar::U8(0),
            ScalarKind::U16 => Scalar::U16(0),
            ScalarKind::U32 => Scalar::U32(0),
            ScalarKind::I32 => Scalar::I32(0),
            ScalarKind::F32 => Scalar::F32(0.0),
            ScalarKind::FormId => Scalar::FormId(FormId::NULL),
        }
    }

    pub(crate) fn decode(kind: ScalarKind, reader: &mut BinaryReader<'_>) -> Result<Self> {
        Ok(match kind {
            ScalarKind::U8 => Scalar::U8(reader.read_u8()?),
            ScalarKind::U16 => Scalar::U16(reader.read_u16()?),
            ScalarKind::U32 => Scalar::U32(reader.read_u32()?),
            ScalarKind::I32 => Scalar::I32(reader.read_i32()?),
            ScalarKind::F32 => Scalar::F32(reader.read_f32()?),
            ScalarKind::FormId => Scalar::FormId(reader.read_form_id()?),
        })
    }

    pub(crate) fn encode<W: Write + ?Sized>(&self, writer: &mut W) -> std::io::Result<()> {
        match *self {
            Scalar::U8(v) => writer.write_u8(v),
            Scalar::U16(v) => writer.write_u16::<LittleEndian>(v),
            Scalar::U32(v) => writer.write_u32::<LittleEndian>(v),
            Scalar::I32(v) => writer.write_i32::<LittleEndian>(v),
            Scalar::F32(v) => writer.write_f32::<LittleEndian>(v),
            Scalar::FormId(v) => writer.write_u32::<LittleEndian>(v.value()),
        }
    }

    pub fn as_u32(&self) -> Option<u32> {
        match *self {
            Scalar::U8(v) => Some(u32::from(v)),
            Scalar::U16(v) => Some(u32::from(v)),
            Scalar::U32(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_i32(&self) -> Option<i32> {
        match *self {
            Scalar::I32(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_f32(&self) -> Option<f32> {
        match *self {
            Scalar::F32(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_form_id(&self) -> Option<FormId> {
        match *self {
            Scalar::FormId(v) => Some(v),
            _ => None,
        }
    }
}

/// The decoded content of one field occurrence.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum FieldValue {
    /// NUL-terminated text, bytes as stored.
    Text(RawString),
    Localized(LocalizedString),
    FormId(FormId),
    Struct(Vec<Scalar>),
    Bytes(Vec<u8>),
    Blob(BinaryBlob),
    Keywords(Vec<FormId>),
    Effects(Vec<EffectEntry>),
}

impl FieldValue {
    /// Check that the value can be stored in a field of `kind` and written
    /// back so that it reloads unchanged.
    pub fn fits(&self, kind: &FieldKind) -> bool {
        match (self, kind) {
            (FieldValue::Text(text), FieldKind::ZString) => text_fits(text),
            (FieldValue::Localized(value), FieldKind::Localized) => match value {
                LocalizedString::None => false,
                LocalizedString::Index { .. } => true,
                LocalizedString::Literal(text) => text_fits(text),
            },
            (FieldValue::FormId(id), FieldKind::FormId) => !id.is_null(),
            (FieldValue::Struct(values), FieldKind::Struct(layout)) => {
                values.len() == layout.len()
                    && values.iter().zip(layout.iter()).all(|(v, k)| v.kind() == *k)
            }
            (FieldValue::Bytes(data), FieldKind::Bytes(lengths)) => {
                u16::try_from(data.len()).is_ok_and(|len| lengths.allows(len))
            }
            (FieldValue::Blob(blob), FieldKind::Blob) => {
                blob.is_present() && blob.size() <= usize::from(u16::MAX)
            }
            (FieldValue::Keywords(ids), FieldKind::Keywords) => {
                ids.len() * 4 <= usize::from(u16::MAX)
            }
            (FieldValue::Effects(entries), FieldKind::Effects(roles)) => {
                !entries.is_empty() && entries.iter().all(|entry| entry.fits(roles))
            }
            _ => false,
        }
    }

    /// Encoded size of this value.
    pub(crate) fn encoded_size(&self) -> usize {
        match self {
            FieldValue::Text(text) => encoded_size(text.len() + 1),
            FieldValue::Localized(value) => value.write_size() as usize,
            FieldValue::FormId(_) => encoded_size(4),
            FieldValue::Struct(values) => encoded_size(
                values
                    .iter()
                    .map(|v| usize::from(v.kind().size()))
                    .sum::<usize>(),
            ),
            FieldValue::Bytes(data) => encoded_size(data.len()),
            FieldValue::Blob(blob) => blob.write_size(),
            FieldValue::Keywords(ids) => encoded_size(4) + encoded_size(ids.len() * 4),
            FieldValue::Effects(entries) => entries.iter().map(EffectEntry::write_size).sum(),
        }
    }

    /// Write this value as part of `field`.
    pub(crate) fn write_to<W: Write + ?Sized>(
        &self,
        writer: &mut W,
        field: &FieldDescriptor,
    ) -> Result<()> {
        let tag = field.tag.code();
        match self {
            FieldValue::Text(text) => writer.write_zstring_subrecord(tag, text),
            FieldValue::Localized(value) => value.save_to(writer, tag),
            FieldValue::FormId(id) => writer.write_u32_subrecord(tag, id.value()),
            FieldValue::Struct(values) => {
                let mut data = Vec::with_capacity(values.len() * 4);
                for value in values {
                    value.encode(&mut data)?;
                }
                writer.write_subrecord(tag, &data)
            }
            FieldValue::Bytes(data) => writer.write_subrecord(tag, data),
            FieldValue::Blob(blob) => blob.save_to(writer, tag),
            FieldValue::Keywords(ids) => {
                writer.write_u32_subrecord(tag, ids.len() as u32)?;
                let mut data = Vec::with_capacity(ids.len() * 4);
                for id in ids {
                    data.write_u32::<LittleEndian>(id.value())?;
                }
                writer.write_subrecord(Tag::Kwda.code(), &data)
            }
            FieldValue::Effects(entries) => match field.kind {
                FieldKind::Effects(roles) => {
                    for entry in entries {
                        entry.save_to(writer, &roles)?;
                    }
                    Ok(())
                }
                _ => Ok(()),
            },
        }
    }
}

fn text_fits(text: &RawString) -> bool {
    text.len() < usize::from(MAX_TEXT_LENGTH) && !text.contains_nul()
}

/// A subrecord the schema does not name, kept verbatim.
///
/// It remembers which field value it followed so that saving puts it back
/// where it was read.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct UnknownSubrecord {
    pub code: FourCC,
    pub blob: BinaryBlob,
    #[cfg_attr(feature = "serde", serde(skip))]
    pub(super) after: Option<Anchor>,
}

/// Field index and how many of its values had been read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct Anchor {
    pub field: usize,
    pub count: usize,
}

impl UnknownSubrecord {
    pub(super) fn new(code: FourCC, blob: BinaryBlob, after: Option<Anchor>) -> Self {
        Self { code, blob, after }
    }

    /// The slot this subrecord is written in: the field it follows and the
    /// number of that field's values written before it.
    pub(super) fn slot(&self, fields: &[Vec<FieldValue>]) -> Option<(usize, usize)> {
        let Anchor { field, count } = self.after?;
        let len = fields.get(field).map_or(0, Vec::len);
        Some((field, count.clamp(1, len.max(1)).min(len)))
    }
}
