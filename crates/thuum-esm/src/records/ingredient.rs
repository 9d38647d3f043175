//! Alchemy ingredients (INGR).

use super::{f32_at, u32_at};
use crate::effect::GroupRoles;
use crate::localized::LocalizedString;
use crate::schema::{FieldDescriptor, FieldKind, Lengths, RecordSchema, ScalarKind, UnknownTagPolicy};
use crate::tag::{RecordType, Tag};
use crate::{Result, Scalar};

pub const FLAG_NO_AUTO_CALC: u32 = 0x0000_0001;
pub const FLAG_FOOD: u32 = 0x0000_0002;
pub const FLAG_REFERENCES_PERSIST: u32 = 0x0000_0100;

const FIELDS: &[FieldDescriptor] = &[
    FieldDescriptor::required(Tag::Edid, "editor_id", FieldKind::ZString),
    FieldDescriptor::optional(Tag::Vmad, "scripts", FieldKind::Blob),
    FieldDescriptor::required(Tag::Obnd, "bounds", FieldKind::Bytes(Lengths::Exactly(12))),
    FieldDescriptor::required(Tag::Full, "name", FieldKind::Localized),
    FieldDescriptor::optional(Tag::Ksiz, "keywords", FieldKind::Keywords),
    FieldDescriptor::optional(Tag::Modl, "model_path", FieldKind::ZString),
    FieldDescriptor::optional(Tag::Modt, "texture_hashes", FieldKind::Blob),
    FieldDescriptor::optional(Tag::Mods, "alternate_textures", FieldKind::Blob),
    FieldDescriptor::optional(Tag::Ynam, "pickup_sound", FieldKind::FormId),
    FieldDescriptor::optional(Tag::Znam, "putdown_sound", FieldKind::FormId),
    // value, weight
    FieldDescriptor::required(
        Tag::Data,
        "data",
        FieldKind::Struct(&[ScalarKind::U32, ScalarKind::F32]),
    ),
    // base cost, flags
    FieldDescriptor::required(
        Tag::Enit,
        "item",
        FieldKind::Struct(&[ScalarKind::U32, ScalarKind::U32]),
    ),
    FieldDescriptor::optional(Tag::Efid, "effects", FieldKind::Effects(GroupRoles::EFFECTS)),
];

pub static SCHEMA: RecordSchema = RecordSchema {
    record_type: RecordType::Ingr,
    name: "ingredient",
    fields: FIELDS,
    unknown_tags: UnknownTagPolicy::Reject,
};

record_view! {
    /// An alchemy ingredient.
    Ingredient => SCHEMA
}

impl Ingredient {
    pub fn name(&self) -> Option<&LocalizedString> {
        self.localized(Tag::Full)
    }

    pub fn value(&self) -> u32 {
        u32_at(self, Tag::Data, 0)
    }

    pub fn set_value(&mut self, value: u32) -> Result<()> {
        self.set_scalar(Tag::Data, 0, Scalar::U32(value))
    }

    pub fn weight(&self) -> f32 {
        f32_at(self, Tag::Data, 1)
    }

    pub fn set_weight(&mut self, weight: f32) -> Result<()> {
        self.set_scalar(Tag::Data, 1, Scalar::F32(weight))
    }

    pub fn base_cost(&self) -> u32 {
        u32_at(self, Tag::Enit, 0)
    }

    pub fn flags(&self) -> u32 {
        u32_at(self, Tag::Enit, 1)
    }

    pub fn set_flags(&mut self, flags: u32) -> Result<()> {
        self.set_scalar(Tag::Enit, 1, Scalar::U32(flags))
    }

    pub fn is_food(&self) -> bool {
        self.flags() & FLAG_FOOD != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{record_bytes, subrecord};
    use crate::{Error, LoadOptions, StringTable};

    fn payload(with_name: bool) -> Vec<u8> {
        let mut out = subrecord(b"EDID", b"Wheat\0");
        out.extend(subrecord(b"VMAD", b"\x05\x00\x02\x00\x00\x00"));
        out.extend(subrecord(b"OBND", &[0; 12]));
        if with_name {
            out.extend(subrecord(b"FULL", b"Wheat\0"));
        }
        out.extend(subrecord(b"DATA", b"\x05\x00\x00\x00\x00\x00\x00\x3F"));
        out.extend(subrecord(b"ENIT", b"\x00\x00\x00\x00\x03\x00\x00\x00"));
        out.extend(subrecord(b"EFID", b"\x16\xEB\x03\x00"));
        out.extend(subrecord(b"EFIT", b"\x00\x00\x70\x41\x00\x00\x00\x00\x00\x00\x00\x00"));
        out.extend(subrecord(b"CTDA", &[1; 32]));
        out
    }

    fn parse(bytes: &[u8]) -> Result<Ingredient> {
        let table = StringTable::new();
        Ingredient::parse(bytes, &LoadOptions::new(false, &table))
    }

    #[test]
    fn test_load_and_save() {
        let bytes = record_bytes(b"INGR", 0x0004_DA73, &payload(true));
        let ingredient = parse(&bytes).unwrap();

        assert_eq!(ingredient.editor_id().unwrap(), "Wheat");
        assert_eq!(ingredient.name().unwrap().text().unwrap(), "Wheat");
        assert_eq!(ingredient.blob(Tag::Vmad).unwrap().size(), 6);
        assert_eq!(ingredient.value(), 5);
        assert_eq!(ingredient.weight(), 0.5);
        assert_eq!(ingredient.flags(), 3);
        assert!(ingredient.is_food());
        assert_eq!(ingredient.effects().len(), 1);
        assert_eq!(ingredient.effects()[0].conditions.len(), 1);

        assert_eq!(ingredient.to_bytes().unwrap(), bytes);
    }

    #[test]
    fn test_name_required() {
        let bytes = record_bytes(b"INGR", 1, &payload(false));
        assert!(matches!(
            parse(&bytes),
            Err(Error::MissingRequiredSubrecord { .. })
        ));
    }

    #[test]
    fn test_setters() {
        let mut ingredient = Ingredient::new();
        ingredient.set_value(12).unwrap();
        ingredient.set_weight(0.25).unwrap();
        ingredient.set_flags(FLAG_NO_AUTO_CALC).unwrap();

        assert_eq!(ingredient.value(), 12);
        assert_eq!(ingredient.weight(), 0.25);
        assert!(!ingredient.is_food());
        assert_eq!(ingredient.base_cost(), 0);
    }
}
