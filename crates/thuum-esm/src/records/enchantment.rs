//! Enchantments (ENCH).

use crate::effect::GroupRoles;
use crate::localized::LocalizedString;
use crate::schema::{FieldDescriptor, FieldKind, Lengths, RecordSchema, UnknownTagPolicy};
use crate::tag::{RecordType, Tag};

/// ENIT grew from 32 to 36 bytes between game versions.
pub const ENIT_LENGTHS: &[u16] = &[32, 36];

const FIELDS: &[FieldDescriptor] = &[
    FieldDescriptor::required(Tag::Edid, "editor_id", FieldKind::ZString),
    FieldDescriptor::required(Tag::Obnd, "bounds", FieldKind::Bytes(Lengths::Exactly(12))),
    FieldDescriptor::optional(Tag::Full, "name", FieldKind::Localized),
    FieldDescriptor::required(
        Tag::Enit,
        "item",
        FieldKind::Bytes(Lengths::OneOf(ENIT_LENGTHS)),
    ),
    FieldDescriptor::required(
        Tag::Efid,
        "effects",
        FieldKind::Effects(GroupRoles::EFFECTS_WITH_STRINGS),
    ),
];

pub static SCHEMA: RecordSchema = RecordSchema {
    record_type: RecordType::Ench,
    name: "enchantment",
    fields: FIELDS,
    unknown_tags: UnknownTagPolicy::Reject,
};

record_view! {
    /// An object or weapon enchantment.
    Enchantment => SCHEMA
}

impl Enchantment {
    pub fn name(&self) -> Option<&LocalizedString> {
        self.localized(Tag::Full)
    }

    /// Raw ENIT bytes.
    pub fn item_data(&self) -> Option<&[u8]> {
        self.bytes(Tag::Enit)
    }

    /// Enchantment cost, the first ENIT field.
    pub fn cost(&self) -> u32 {
        match self.item_data() {
            Some([a, b, c, d, ..]) => u32::from_le_bytes([*a, *b, *c, *d]),
            _ => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{record_bytes, subrecord};
    use crate::{Error, LoadOptions, StringTable};

    fn bytes(enit_length: usize) -> Vec<u8> {
        let mut enit = vec![0u8; enit_length];
        enit[..4].copy_from_slice(&120u32.to_le_bytes());

        let mut out = subrecord(b"EDID", b"EnchWeaponFireDamage03\0");
        out.extend(subrecord(b"OBND", &[0; 12]));
        out.extend(subrecord(b"ENIT", &enit));
        out.extend(subrecord(b"EFID", b"\x3B\x2A\x01\x00"));
        out.extend(subrecord(b"EFIT", &[0; 12]));
        out.extend(subrecord(b"CTDA", &[5; 32]));
        out.extend(subrecord(b"CIS2", b"foobar\0"));
        record_bytes(b"ENCH", 0x0004_5C2A, &out)
    }

    fn parse(bytes: &[u8]) -> crate::Result<Enchantment> {
        let table = StringTable::new();
        Enchantment::parse(bytes, &LoadOptions::new(false, &table))
    }

    #[test]
    fn test_both_item_lengths() {
        for length in [32, 36] {
            let bytes = bytes(length);
            let enchantment = parse(&bytes).unwrap();
            assert_eq!(enchantment.item_data().map(<[u8]>::len), Some(length));
            assert_eq!(enchantment.cost(), 120);
            assert_eq!(enchantment.effects()[0].conditions[0].text().unwrap(), "foobar");
            assert_eq!(enchantment.to_bytes().unwrap(), bytes);
        }
    }

    #[test]
    fn test_unknown_item_length() {
        assert!(matches!(
            parse(&bytes(40)),
            Err(Error::LengthMismatch { actual: 40, .. })
        ));
    }

    #[test]
    fn test_effects_required() {
        let mut out = subrecord(b"EDID", b"Ench\0");
        out.extend(subrecord(b"OBND", &[0; 12]));
        out.extend(subrecord(b"ENIT", &[0; 36]));
        assert!(matches!(
            parse(&record_bytes(b"ENCH", 1, &out)),
            Err(Error::MissingRequiredSubrecord { .. })
        ));
    }
}
