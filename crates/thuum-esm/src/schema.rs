//! Declarative record layouts.
//!
//! Each record type is described by a [`RecordSchema`]: an ordered table of
//! [`FieldDescriptor`]s plus the policy for tags the table does not name.
//! One generic assembler and serializer in [`crate::record`] work off these
//! tables, so adding a record type means writing a table, not a parser.

use std::fmt;

use thuum_common::FourCC;

use crate::effect::{GroupRole, GroupRoles};
use crate::tag::{RecordType, Tag};

/// Allowed data lengths for a raw bytes field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lengths {
    Exactly(u16),
    /// Version-dependent sizes observed in shipped data.
    OneOf(&'static [u16]),
    Any,
}

impl Lengths {
    pub fn allows(&self, length: u16) -> bool {
        match self {
            Lengths::Exactly(n) => *n == length,
            Lengths::OneOf(list) => list.contains(&length),
            Lengths::Any => true,
        }
    }
}

impl fmt::Display for Lengths {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lengths::Exactly(n) => write!(f, "{n}"),
            Lengths::OneOf(list) => {
                write!(f, "one of [")?;
                for (i, n) in list.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{n}")?;
                }
                write!(f, "]")
            }
            Lengths::Any => write!(f, "any"),
        }
    }
}

/// One element of a fixed-layout struct field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarKind {
    U8,
    U16,
    U32,
    I32,
    F32,
    /// A form ID that may be zero.
    FormId,
}

impl ScalarKind {
    /// Encoded size in bytes.
    pub const fn size(self) -> u16 {
        match self {
            ScalarKind::U8 => 1,
            ScalarKind::U16 => 2,
            ScalarKind::U32 | ScalarKind::I32 | ScalarKind::F32 | ScalarKind::FormId => 4,
        }
    }

    /// Total encoded size of a layout.
    pub fn layout_size(layout: &[ScalarKind]) -> u16 {
        layout.iter().map(|kind| kind.size()).sum()
    }
}

/// How a field's subrecords are decoded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldKind {
    /// NUL-terminated text, at most 511 bytes.
    ZString,
    /// Localized string.
    Localized,
    /// Non-zero form ID reference.
    FormId,
    /// Fixed sequence of scalars.
    Struct(&'static [ScalarKind]),
    /// Raw bytes with a length constraint.
    Bytes(Lengths),
    /// Opaque bytes of any length, kept as a [`BinaryBlob`](crate::BinaryBlob).
    Blob,
    /// KSIZ count followed by a KWDA form ID array.
    Keywords,
    /// Effect entries; the field tag is the group start tag.
    Effects(GroupRoles),
}

/// One field of a record layout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldDescriptor {
    /// The tag announcing this field. For keywords this is KSIZ, for
    /// effects the group start tag.
    pub tag: Tag,
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub repeatable: bool,
}

impl FieldDescriptor {
    /// A field that must be present.
    pub const fn required(tag: Tag, name: &'static str, kind: FieldKind) -> Self {
        Self {
            tag,
            name,
            kind,
            required: true,
            repeatable: false,
        }
    }

    /// A field that may be absent.
    pub const fn optional(tag: Tag, name: &'static str, kind: FieldKind) -> Self {
        Self {
            tag,
            name,
            kind,
            required: false,
            repeatable: false,
        }
    }

    /// A field that may occur any number of times.
    pub const fn repeated(tag: Tag, name: &'static str, kind: FieldKind) -> Self {
        Self {
            tag,
            name,
            kind,
            required: false,
            repeatable: true,
        }
    }

    /// Which role `code` plays for this field, if any.
    pub fn role_of(&self, code: FourCC) -> Option<FieldRole> {
        match self.kind {
            FieldKind::Effects(roles) => roles.role_of(code).map(FieldRole::Group),
            FieldKind::Keywords if Tag::Kwda == code => Some(FieldRole::KeywordData),
            _ if self.tag == code => Some(FieldRole::Value),
            _ => None,
        }
    }
}

/// What a tag means to the field that claims it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldRole {
    /// The field's own subrecord.
    Value,
    /// KWDA, legal only straight after KSIZ.
    KeywordData,
    /// A member of an effect group.
    Group(GroupRole),
}

/// What to do with a tag the layout does not name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownTagPolicy {
    /// Fail the parse.
    #[default]
    Reject,
    /// Keep the subrecord verbatim and write it back after the known fields.
    PassThrough,
}

/// The layout of one record type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecordSchema {
    pub record_type: RecordType,
    /// Human readable name.
    pub name: &'static str,
    /// Fields in canonical write order.
    pub fields: &'static [FieldDescriptor],
    pub unknown_tags: UnknownTagPolicy,
}

impl RecordSchema {
    /// Find the field claiming `code`.
    pub fn resolve(&self, code: FourCC) -> Option<(usize, FieldRole)> {
        self.fields
            .iter()
            .enumerate()
            .find_map(|(index, field)| field.role_of(code).map(|role| (index, role)))
    }

    /// Find a field by its tag.
    pub fn field_index(&self, tag: Tag) -> Option<usize> {
        self.fields.iter().position(|field| field.tag == tag)
    }

    /// Find a field by name.
    pub fn field_by_name(&self, name: &str) -> Option<(usize, &'static FieldDescriptor)> {
        self.fields
            .iter()
            .enumerate()
            .find(|(_, field)| field.name == name)
    }
}
