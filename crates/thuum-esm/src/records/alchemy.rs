//! Potions, poisons and food (ALCH).

use thuum_common::FormId;

use super::{f32_at, form_id_at, u32_at};
use crate::effect::GroupRoles;
use crate::localized::LocalizedString;
use crate::schema::{FieldDescriptor, FieldKind, Lengths, RecordSchema, ScalarKind, UnknownTagPolicy};
use crate::tag::{RecordType, Tag};
use crate::text::RawString;
use crate::{Result, Scalar};

/// Value is not computed from the effects.
pub const FLAG_NO_AUTO_CALC: u32 = 0x0000_0001;
pub const FLAG_FOOD: u32 = 0x0000_0002;
pub const FLAG_MEDICINE: u32 = 0x0001_0000;
pub const FLAG_POISON: u32 = 0x0002_0000;

/// ENIT: value, flags, unknown, addiction chance, use sound.
const ENIT: &[ScalarKind] = &[
    ScalarKind::U32,
    ScalarKind::U32,
    ScalarKind::U32,
    ScalarKind::F32,
    ScalarKind::FormId,
];

const FIELDS: &[FieldDescriptor] = &[
    FieldDescriptor::required(Tag::Edid, "editor_id", FieldKind::ZString),
    FieldDescriptor::required(Tag::Obnd, "bounds", FieldKind::Bytes(Lengths::Exactly(12))),
    FieldDescriptor::optional(Tag::Full, "name", FieldKind::Localized),
    FieldDescriptor::optional(Tag::Ksiz, "keywords", FieldKind::Keywords),
    FieldDescriptor::optional(Tag::Modl, "model_path", FieldKind::ZString),
    FieldDescriptor::optional(Tag::Modt, "texture_hashes", FieldKind::Blob),
    FieldDescriptor::optional(Tag::Mods, "alternate_textures", FieldKind::Blob),
    FieldDescriptor::optional(Tag::Ynam, "pickup_sound", FieldKind::FormId),
    FieldDescriptor::optional(Tag::Znam, "putdown_sound", FieldKind::FormId),
    FieldDescriptor::optional(Tag::Etyp, "equip_type", FieldKind::FormId),
    FieldDescriptor::required(Tag::Data, "weight", FieldKind::Struct(&[ScalarKind::F32])),
    FieldDescriptor::required(Tag::Enit, "item", FieldKind::Struct(ENIT)),
    FieldDescriptor::required(Tag::Efid, "effects", FieldKind::Effects(GroupRoles::EFFECTS)),
];

pub static SCHEMA: RecordSchema = RecordSchema {
    record_type: RecordType::Alch,
    name: "potion",
    fields: FIELDS,
    unknown_tags: UnknownTagPolicy::Reject,
};

record_view! {
    /// A potion, poison or food item.
    AlchemyPotion => SCHEMA
}

impl AlchemyPotion {
    pub fn name(&self) -> Option<&LocalizedString> {
        self.localized(Tag::Full)
    }

    pub fn model_path(&self) -> Option<&RawString> {
        self.text(Tag::Modl)
    }

    pub fn pickup_sound(&self) -> Option<FormId> {
        self.reference(Tag::Ynam)
    }

    pub fn putdown_sound(&self) -> Option<FormId> {
        self.reference(Tag::Znam)
    }

    pub fn equip_type(&self) -> Option<FormId> {
        self.reference(Tag::Etyp)
    }

    pub fn weight(&self) -> f32 {
        f32_at(self, Tag::Data, 0)
    }

    pub fn set_weight(&mut self, weight: f32) -> Result<()> {
        self.set_scalar(Tag::Data, 0, Scalar::F32(weight))
    }

    /// Base value in gold.
    pub fn value(&self) -> u32 {
        u32_at(self, Tag::Enit, 0)
    }

    pub fn set_value(&mut self, value: u32) -> Result<()> {
        self.set_scalar(Tag::Enit, 0, Scalar::U32(value))
    }

    pub fn flags(&self) -> u32 {
        u32_at(self, Tag::Enit, 1)
    }

    pub fn set_flags(&mut self, flags: u32) -> Result<()> {
        self.set_scalar(Tag::Enit, 1, Scalar::U32(flags))
    }

    pub fn addiction_chance(&self) -> f32 {
        f32_at(self, Tag::Enit, 3)
    }

    /// Sound played on consumption.
    pub fn use_sound(&self) -> FormId {
        form_id_at(self, Tag::Enit, 4)
    }

    pub fn is_food(&self) -> bool {
        self.flags() & FLAG_FOOD != 0
    }

    pub fn is_medicine(&self) -> bool {
        self.flags() & FLAG_MEDICINE != 0
    }

    pub fn is_poison(&self) -> bool {
        self.flags() & FLAG_POISON != 0
    }

    /// Whether the engine computes the value from the effects.
    pub fn auto_calculates(&self) -> bool {
        self.flags() & FLAG_NO_AUTO_CALC == 0
    }
}
