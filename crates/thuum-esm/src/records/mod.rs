//! Shipped record types.
//!
//! Each module holds the layout of one record type and a typed wrapper with
//! named accessors. [`schema_for`] maps a record type code to its layout.

use thuum_common::{FormId, FourCC};

use crate::record::Record;
use crate::schema::RecordSchema;
use crate::tag::Tag;

macro_rules! record_view {
    ($(#[$meta:meta])* $name:ident => $schema:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq)]
        pub struct $name(crate::record::Record);

        impl $name {
            /// Create an empty record.
            pub fn new() -> Self {
                Self(crate::record::Record::new(&$schema))
            }

            /// Wrap a generic record of the same type.
            pub fn from_record(record: crate::record::Record) -> crate::Result<Self> {
                if record.schema().record_type != $schema.record_type {
                    return Err(crate::Error::RecordTypeMismatch {
                        expected: $schema.record_type.code(),
                        actual: record.record_type(),
                    });
                }
                Ok(Self(record))
            }

            /// Parse one record, header included.
            pub fn parse(
                bytes: &[u8],
                options: &crate::record::LoadOptions<'_>,
            ) -> crate::Result<Self> {
                crate::record::Record::parse_as(&$schema, bytes, options).map(Self)
            }

            pub fn into_record(self) -> crate::record::Record {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::ops::Deref for $name {
            type Target = crate::record::Record;

            fn deref(&self) -> &Self::Target {
                &self.0
            }
        }

        impl std::ops::DerefMut for $name {
            fn deref_mut(&mut self) -> &mut Self::Target {
                &mut self.0
            }
        }

        impl From<$name> for crate::record::Record {
            fn from(value: $name) -> Self {
                value.0
            }
        }
    };
}

pub mod alchemy;
pub mod enchantment;
pub mod ingredient;
pub mod reference;
pub mod scroll;
pub mod spell;

pub use alchemy::AlchemyPotion;
pub use enchantment::Enchantment;
pub use ingredient::Ingredient;
pub use reference::Reference;
pub use scroll::Scroll;
pub use spell::Spell;

/// Every registered layout.
pub static SCHEMAS: &[&RecordSchema] = &[
    &alchemy::SCHEMA,
    &ingredient::SCHEMA,
    &scroll::SCHEMA,
    &spell::SCHEMA,
    &enchantment::SCHEMA,
    &reference::SCHEMA,
];

/// Look up the layout for a record type code.
pub fn schema_for(code: FourCC) -> Option<&'static RecordSchema> {
    SCHEMAS
        .iter()
        .copied()
        .find(|schema| schema.record_type == code)
}

fn u32_at(record: &Record, tag: Tag, position: usize) -> u32 {
    record
        .scalar(tag, position)
        .and_then(|s| s.as_u32())
        .unwrap_or(0)
}

fn f32_at(record: &Record, tag: Tag, position: usize) -> f32 {
    record
        .scalar(tag, position)
        .and_then(|s| s.as_f32())
        .unwrap_or(0.0)
}

fn form_id_at(record: &Record, tag: Tag, position: usize) -> FormId {
    record
        .scalar(tag, position)
        .and_then(|s| s.as_form_id())
        .unwrap_or(FormId::NULL)
}

#[cfg(test)]
pub(crate) fn subrecord(tag: &[u8; 4], data: &[u8]) -> Vec<u8> {
    let mut out = tag.to_vec();
    out.extend((data.len() as u16).to_le_bytes());
    out.extend(data);
    out
}

#[cfg(test)]
pub(crate) fn record_bytes(record_type: &[u8; 4], form_id: u32, payload: &[u8]) -> Vec<u8> {
    let mut out = record_type.to_vec();
    out.extend((payload.len() as u32).to_le_bytes());
    out.extend(0u32.to_le_bytes());
    out.extend(form_id.to_le_bytes());
    out.extend([0u8; 8]);
    out.extend(payload);
    out
}
