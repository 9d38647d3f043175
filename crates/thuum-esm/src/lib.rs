//! Record codec for Creation-Engine plugin files (`.esm`, `.esp`, `.esl`).
//!
//! A plugin is a sequence of records, each a 24-byte [`RecordHeader`]
//! followed by a payload of tagged subrecords. This crate decodes one record
//! at a time into a [`Record`] and writes it back byte for byte.
//!
//! - [`header`] - Record headers and flags
//! - [`subrecord`] - Subrecord framing and the [`SubrecordWriter`] trait
//! - [`schema`] - Declarative record layouts
//! - [`record`] - Schema-driven loading and saving
//! - [`records`] - Shipped record types with typed accessors
//! - [`localized`] / [`string_table`] - Localized strings and their tables
//! - [`effect`] / [`condition`] - Effect groups and their conditions
//! - [`text`] - Inline text kept as the bytes it was stored as
//!
//! # Quick Start
//!
//! ```
//! use thuum_esm::records::Ingredient;
//! use thuum_esm::{LoadOptions, StringTable, Tag};
//!
//! let mut ingredient = Ingredient::new();
//! ingredient.set_text(Tag::Edid, "Wheat")?;
//! ingredient.set_bytes(Tag::Obnd, vec![0; 12])?;
//! ingredient.set_localized(Tag::Full, thuum_esm::LocalizedString::literal("Wheat"))?;
//! ingredient.set_value(5)?;
//! ingredient.set_weight(0.1)?;
//! ingredient.set_flags(0)?;
//!
//! let bytes = ingredient.to_bytes()?;
//! let table = StringTable::new();
//! let loaded = Ingredient::parse(&bytes, &LoadOptions::new(false, &table))?;
//! assert_eq!(loaded.value(), 5);
//! # Ok::<(), thuum_esm::Error>(())
//! ```

mod error;

pub mod blob;
pub mod condition;
pub mod effect;
pub mod header;
pub mod localized;
#[cfg(feature = "parallel")]
pub mod parallel;
pub mod record;
pub mod records;
pub mod schema;
pub mod string_table;
pub mod subrecord;
pub mod tag;
pub mod text;

pub use blob::BinaryBlob;
pub use condition::{ConditionEntry, CONDITION_SIZE};
pub use effect::{EffectEntry, GroupRole, GroupRoles};
pub use error::{Error, Result};
pub use header::{RecordHeader, RECORD_HEADER_SIZE};
pub use localized::LocalizedString;
pub use record::{FieldValue, LoadOptions, Record, Scalar, UnknownSubrecord};
pub use schema::{
    FieldDescriptor, FieldKind, FieldRole, Lengths, RecordSchema, ScalarKind, UnknownTagPolicy,
};
pub use string_table::{StringTable, StringTableBuilder};
pub use subrecord::{SubrecordStream, SubrecordWriter, MAX_TEXT_LENGTH};
pub use tag::{RecordType, Tag};
pub use text::RawString;

pub use thuum_common::{BinaryReader, FormId, FourCC};
