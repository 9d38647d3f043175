//! Scrolls (SCRL).

use thuum_common::FormId;

use super::spell::{SpellItem, SPIT};
use super::{f32_at, form_id_at, u32_at};
use crate::effect::GroupRoles;
use crate::localized::LocalizedString;
use crate::schema::{FieldDescriptor, FieldKind, Lengths, RecordSchema, ScalarKind, UnknownTagPolicy};
use crate::tag::{RecordType, Tag};
use crate::text::RawString;
use crate::Result;

const FIELDS: &[FieldDescriptor] = &[
    FieldDescriptor::required(Tag::Edid, "editor_id", FieldKind::ZString),
    FieldDescriptor::required(Tag::Obnd, "bounds", FieldKind::Bytes(Lengths::Exactly(12))),
    FieldDescriptor::required(Tag::Full, "name", FieldKind::Localized),
    FieldDescriptor::optional(Tag::Ksiz, "keywords", FieldKind::Keywords),
    FieldDescriptor::required(
        Tag::Mdob,
        "menu_display_object",
        FieldKind::Struct(&[ScalarKind::FormId]),
    ),
    FieldDescriptor::required(Tag::Etyp, "equip_type", FieldKind::Struct(&[ScalarKind::FormId])),
    FieldDescriptor::required(Tag::Desc, "description", FieldKind::Localized),
    FieldDescriptor::required(Tag::Modl, "model_path", FieldKind::ZString),
    FieldDescriptor::optional(Tag::Modt, "texture_hashes", FieldKind::Blob),
    // value, weight
    FieldDescriptor::required(
        Tag::Data,
        "data",
        FieldKind::Struct(&[ScalarKind::U32, ScalarKind::F32]),
    ),
    FieldDescriptor::required(Tag::Spit, "spell_item", FieldKind::Struct(SPIT)),
    FieldDescriptor::optional(Tag::Efid, "effects", FieldKind::Effects(GroupRoles::EFFECTS)),
];

pub static SCHEMA: RecordSchema = RecordSchema {
    record_type: RecordType::Scrl,
    name: "scroll",
    fields: FIELDS,
    unknown_tags: UnknownTagPolicy::Reject,
};

record_view! {
    /// A single-use spell scroll.
    Scroll => SCHEMA
}

impl Scroll {
    pub fn name(&self) -> Option<&LocalizedString> {
        self.localized(Tag::Full)
    }

    pub fn description(&self) -> Option<&LocalizedString> {
        self.localized(Tag::Desc)
    }

    pub fn model_path(&self) -> Option<&RawString> {
        self.text(Tag::Modl)
    }

    pub fn menu_display_object(&self) -> FormId {
        form_id_at(self, Tag::Mdob, 0)
    }

    pub fn equip_type(&self) -> FormId {
        form_id_at(self, Tag::Etyp, 0)
    }

    pub fn value(&self) -> u32 {
        u32_at(self, Tag::Data, 0)
    }

    pub fn weight(&self) -> f32 {
        f32_at(self, Tag::Data, 1)
    }

    pub fn spell_item(&self) -> SpellItem {
        SpellItem::read(self)
    }

    pub fn set_spell_item(&mut self, item: &SpellItem) -> Result<()> {
        item.write(self)
    }
}
