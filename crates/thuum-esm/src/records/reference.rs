//! Placed object references (REFR).
//!
//! References carry many optional subrecords this crate does not model. They
//! are kept verbatim and written back in the place they were read from.

use thuum_common::FormId;

use super::f32_at;
use crate::blob::BinaryBlob;
use crate::record::FieldValue;
use crate::schema::{FieldDescriptor, FieldKind, RecordSchema, ScalarKind, UnknownTagPolicy};
use crate::tag::{RecordType, Tag};
use crate::{Result, Scalar};

const FIELDS: &[FieldDescriptor] = &[
    FieldDescriptor::optional(Tag::Edid, "editor_id", FieldKind::ZString),
    FieldDescriptor::optional(Tag::Vmad, "scripts", FieldKind::Blob),
    FieldDescriptor::required(Tag::Name, "base", FieldKind::FormId),
    FieldDescriptor::optional(Tag::Xscl, "scale", FieldKind::Struct(&[ScalarKind::F32])),
    // keyword, reference
    FieldDescriptor::repeated(
        Tag::Xlkr,
        "linked_references",
        FieldKind::Struct(&[ScalarKind::FormId, ScalarKind::FormId]),
    ),
    // position xyz, rotation xyz
    FieldDescriptor::required(
        Tag::Data,
        "placement",
        FieldKind::Struct(&[ScalarKind::F32; 6]),
    ),
];

pub static SCHEMA: RecordSchema = RecordSchema {
    record_type: RecordType::Refr,
    name: "reference",
    fields: FIELDS,
    unknown_tags: UnknownTagPolicy::PassThrough,
};

record_view! {
    /// An object placed in a cell.
    Reference => SCHEMA
}

impl Reference {
    /// The placed base object.
    pub fn base(&self) -> Option<FormId> {
        self.reference(Tag::Name)
    }

    pub fn scripts(&self) -> Option<&BinaryBlob> {
        self.blob(Tag::Vmad)
    }

    /// Scale factor, 1.0 when absent.
    pub fn scale(&self) -> f32 {
        self.scalar(Tag::Xscl, 0)
            .and_then(|s| s.as_f32())
            .unwrap_or(1.0)
    }

    pub fn set_scale(&mut self, scale: f32) -> Result<()> {
        self.set_scalar(Tag::Xscl, 0, Scalar::F32(scale))
    }

    pub fn position(&self) -> [f32; 3] {
        [0, 1, 2].map(|i| f32_at(self, Tag::Data, i))
    }

    pub fn rotation(&self) -> [f32; 3] {
        [3, 4, 5].map(|i| f32_at(self, Tag::Data, i))
    }

    pub fn set_placement(&mut self, position: [f32; 3], rotation: [f32; 3]) -> Result<()> {
        let values = position
            .iter()
            .chain(rotation.iter())
            .map(|&v| Scalar::F32(v))
            .collect();
        self.set(Tag::Data, FieldValue::Struct(values))
    }

    /// `(keyword, reference)` pairs.
    pub fn linked_references(&self) -> Vec<(FormId, FormId)> {
        self.get_all(Tag::Xlkr)
            .iter()
            .filter_map(|value| match value {
                FieldValue::Struct(v) => Some((v.first()?.as_form_id()?, v.get(1)?.as_form_id()?)),
                _ => None,
            })
            .collect()
    }

    pub fn add_linked_reference(&mut self, keyword: FormId, reference: FormId) -> Result<()> {
        self.push(
            Tag::Xlkr,
            FieldValue::Struct(vec![Scalar::FormId(keyword), Scalar::FormId(reference)]),
        )
    }
}
