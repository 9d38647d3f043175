//! Spells, abilities and powers (SPEL).

use thuum_common::FormId;

use super::{f32_at, form_id_at, u32_at};
use crate::effect::GroupRoles;
use crate::localized::LocalizedString;
use crate::record::Record;
use crate::schema::{FieldDescriptor, FieldKind, Lengths, RecordSchema, ScalarKind, UnknownTagPolicy};
use crate::tag::{RecordType, Tag};
use crate::{FieldValue, Result, Scalar};

/// SPIT layout shared by spells and scrolls.
pub(crate) const SPIT: &[ScalarKind] = &[
    ScalarKind::U32,
    ScalarKind::U32,
    ScalarKind::U32,
    ScalarKind::F32,
    ScalarKind::U32,
    ScalarKind::U32,
    ScalarKind::F32,
    ScalarKind::F32,
    ScalarKind::FormId,
];

/// Decoded SPIT subrecord.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SpellItem {
    pub base_cost: u32,
    pub flags: u32,
    pub spell_type: u32,
    pub charge_time: f32,
    pub cast_type: u32,
    pub delivery: u32,
    pub cast_duration: f32,
    pub range: f32,
    /// Perk required to cast, or null.
    pub half_cost_perk: FormId,
}

impl SpellItem {
    pub(crate) fn read(record: &Record) -> Self {
        Self {
            base_cost: u32_at(record, Tag::Spit, 0),
            flags: u32_at(record, Tag::Spit, 1),
            spell_type: u32_at(record, Tag::Spit, 2),
            charge_time: f32_at(record, Tag::Spit, 3),
            cast_type: u32_at(record, Tag::Spit, 4),
            delivery: u32_at(record, Tag::Spit, 5),
            cast_duration: f32_at(record, Tag::Spit, 6),
            range: f32_at(record, Tag::Spit, 7),
            half_cost_perk: form_id_at(record, Tag::Spit, 8),
        }
    }

    pub(crate) fn write(&self, record: &mut Record) -> Result<()> {
        let values = [
            Scalar::U32(self.base_cost),
            Scalar::U32(self.flags),
            Scalar::U32(self.spell_type),
            Scalar::F32(self.charge_time),
            Scalar::U32(self.cast_type),
            Scalar::U32(self.delivery),
            Scalar::F32(self.cast_duration),
            Scalar::F32(self.range),
            Scalar::FormId(self.half_cost_perk),
        ];
        record.set(Tag::Spit, FieldValue::Struct(values.to_vec()))
    }
}

const FIELDS: &[FieldDescriptor] = &[
    FieldDescriptor::required(Tag::Edid, "editor_id", FieldKind::ZString),
    FieldDescriptor::required(Tag::Obnd, "bounds", FieldKind::Bytes(Lengths::Exactly(12))),
    FieldDescriptor::optional(Tag::Full, "name", FieldKind::Localized),
    FieldDescriptor::optional(Tag::Ksiz, "keywords", FieldKind::Keywords),
    // Menu display object and equip type may both be null.
    FieldDescriptor::optional(
        Tag::Mdob,
        "menu_display_object",
        FieldKind::Struct(&[ScalarKind::FormId]),
    ),
    FieldDescriptor::required(Tag::Etyp, "equip_type", FieldKind::Struct(&[ScalarKind::FormId])),
    FieldDescriptor::required(Tag::Desc, "description", FieldKind::Localized),
    FieldDescriptor::required(Tag::Spit, "spell_item", FieldKind::Struct(SPIT)),
    FieldDescriptor::optional(
        Tag::Efid,
        "effects",
        FieldKind::Effects(GroupRoles::EFFECTS_WITH_STRINGS),
    ),
];

pub static SCHEMA: RecordSchema = RecordSchema {
    record_type: RecordType::Spel,
    name: "spell",
    fields: FIELDS,
    unknown_tags: UnknownTagPolicy::Reject,
};

record_view! {
    /// A spell, ability, power or disease.
    Spell => SCHEMA
}

impl Spell {
    pub fn name(&self) -> Option<&LocalizedString> {
        self.localized(Tag::Full)
    }

    pub fn description(&self) -> Option<&LocalizedString> {
        self.localized(Tag::Desc)
    }

    pub fn equip_type(&self) -> FormId {
        form_id_at(self, Tag::Etyp, 0)
    }

    pub fn menu_display_object(&self) -> FormId {
        form_id_at(self, Tag::Mdob, 0)
    }

    pub fn spell_item(&self) -> SpellItem {
        SpellItem::read(self)
    }

    pub fn set_spell_item(&mut self, item: &SpellItem) -> Result<()> {
        item.write(self)
    }
}
