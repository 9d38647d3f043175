//! Thuum - Creation-Engine plugin record library.
//!
//! This crate re-exports the Thuum crates behind one dependency.
//!
//! # Crates
//!
//! - [`thuum_common`] - Binary reading, four-character codes and form IDs
//! - [`thuum_esm`] - Record headers, subrecords, localized strings and record types
//!
//! # Example
//!
//! ```
//! use thuum::prelude::*;
//!
//! let mut spell = Spell::new();
//! spell.set_text(Tag::Edid, "Flames")?;
//! spell.set_bytes(Tag::Obnd, vec![0; 12])?;
//! spell.set_scalar(Tag::Etyp, 0, Scalar::FormId(FormId::new(0x0001_3F44)))?;
//! spell.set_localized(Tag::Desc, LocalizedString::literal("A gout of fire."))?;
//! spell.set_spell_item(&SpellItem::default())?;
//!
//! let bytes = spell.to_bytes()?;
//! let table = StringTable::new();
//! let record = Record::parse(&bytes, &LoadOptions::new(false, &table))?;
//! assert_eq!(record.record_type(), RecordType::Spel.code());
//! # Ok::<(), thuum::esm::Error>(())
//! ```

pub use thuum_common as common;
pub use thuum_esm as esm;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use thuum_common::{BinaryReader, FormId, FourCC};
    pub use thuum_esm::records::spell::SpellItem;
    pub use thuum_esm::records::{
        AlchemyPotion, Enchantment, Ingredient, Reference, Scroll, Spell,
    };
    pub use thuum_esm::{
        EffectEntry, LoadOptions, LocalizedString, RawString, Record, RecordType, Scalar,
        StringTable, StringTableBuilder, Tag,
    };
}

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
