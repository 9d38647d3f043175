//! Generic records.
//!
//! A [`Record`] pairs a [`RecordHeader`] with the field values of its
//! [`RecordSchema`]. Loading walks the subrecord stream once and fills the
//! fields the schema names; saving writes them back in schema order, with
//! any kept unknown subrecords in the place they were read from.
//!
//! # Example
//!
//! ```
//! use thuum_esm::records::alchemy;
//! use thuum_esm::{EffectEntry, FormId, LoadOptions, Record, Scalar, StringTable, Tag};
//!
//! let mut potion = Record::new(&alchemy::SCHEMA);
//! potion.set_text(Tag::Edid, "Ale")?;
//! potion.set_bytes(Tag::Obnd, vec![0; 12])?;
//! potion.set_scalar(Tag::Data, 0, Scalar::F32(0.5))?;
//! potion.set_scalar(Tag::Enit, 0, Scalar::U32(5))?;
//! potion.set_effects(vec![EffectEntry::new(FormId::new(0x0003_EB16), 15.0, 0, 0)])?;
//!
//! let bytes = potion.to_bytes()?;
//! let table = StringTable::new();
//! let loaded = Record::parse(&bytes, &LoadOptions::new(false, &table))?;
//! assert_eq!(loaded, potion);
//! # Ok::<(), thuum_esm::Error>(())
//! ```

mod assemble;
mod serialize;
mod value;

use std::io::Write;

use thuum_common::{BinaryReader, FormId, FourCC};
use tracing::debug;

pub use value::{FieldValue, Scalar, UnknownSubrecord};
use value::Anchor;

use crate::blob::BinaryBlob;
use crate::effect::EffectEntry;
use crate::header::{RecordHeader, RECORD_HEADER_SIZE};
use crate::localized::LocalizedString;
use crate::schema::{FieldKind, RecordSchema, UnknownTagPolicy};
use crate::string_table::StringTable;
use crate::subrecord::SubrecordStream;
use crate::tag::Tag;
use crate::text::RawString;
use crate::{records, Error, Result};

/// Per-file load settings.
#[derive(Debug, Clone, Copy)]
pub struct LoadOptions<'t> {
    /// The plugin stores string-table indices instead of inline text.
    pub localized: bool,
    /// Table used to resolve indices when `localized` is set.
    pub table: &'t StringTable,
}

impl<'t> LoadOptions<'t> {
    pub fn new(localized: bool, table: &'t StringTable) -> Self {
        Self { localized, table }
    }
}

/// A record of any registered type.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Record {
    #[cfg_attr(feature = "serde", serde(skip))]
    schema: &'static RecordSchema,
    header: RecordHeader,
    fields: Vec<Vec<FieldValue>>,
    unknown: Vec<UnknownSubrecord>,
}

impl Record {
    /// Create an empty record of the given layout.
    pub fn new(schema: &'static RecordSchema) -> Self {
        Self {
            schema,
            header: RecordHeader::new(schema.record_type.code()),
            fields: vec![Vec::new(); schema.fields.len()],
            unknown: Vec::new(),
        }
    }

    /// Parse one record, picking the schema from its type code.
    pub fn parse(bytes: &[u8], options: &LoadOptions<'_>) -> Result<Self> {
        let mut reader = BinaryReader::new(bytes);
        let header = RecordHeader::decode(&mut reader)?;
        let schema = records::schema_for(header.record_type)
            .ok_or(Error::UnknownRecordType(header.record_type))?;

        let mut record = Self::new(schema);
        record.load_with_header(header, &mut reader, options)?;
        Ok(record)
    }

    /// Parse one record of a known layout.
    pub fn parse_as(
        schema: &'static RecordSchema,
        bytes: &[u8],
        options: &LoadOptions<'_>,
    ) -> Result<Self> {
        let mut record = Self::new(schema);
        record.load_from(&mut BinaryReader::new(bytes), options)?;
        Ok(record)
    }

    /// Read a header and its payload from `reader`.
    pub fn load_from(&mut self, reader: &mut BinaryReader<'_>, options: &LoadOptions<'_>) -> Result<()> {
        let header = RecordHeader::decode(reader)?;
        self.load_with_header(header, reader, options)
    }

    /// Read the payload for an already decoded header.
    ///
    /// All fields are cleared first and stay cleared if loading fails.
    pub fn load_with_header(
        &mut self,
        header: RecordHeader,
        reader: &mut BinaryReader<'_>,
        options: &LoadOptions<'_>,
    ) -> Result<()> {
        let expected = self.schema.record_type.code();
        if header.record_type != expected {
            return Err(Error::RecordTypeMismatch {
                expected,
                actual: header.record_type,
            });
        }
        self.clear_fields();

        if header.is_deleted() {
            if header.payload_size != 0 {
                return Err(Error::LengthMismatch {
                    tag: header.record_type,
                    expected: "0 for a deleted record".to_string(),
                    actual: header.payload_size as usize,
                });
            }
            self.header = header;
            debug!(record = %expected, form_id = %header.form_id, "loaded deleted record");
            return Ok(());
        }

        let mut stream = SubrecordStream::new(reader, header.payload_size)?;
        let body = assemble::assemble(self.schema, &mut stream, options)?;

        self.header = header;
        self.fields = body.fields;
        self.unknown = body.unknown;
        debug!(
            record = %expected,
            form_id = %header.form_id,
            size = header.payload_size,
            kept = self.unknown.len(),
            "loaded record"
        );
        Ok(())
    }

    /// Payload size [`save_to`](Self::save_to) will write after the header.
    pub fn write_size(&self) -> Result<u32> {
        let size = serialize::payload_size(self)?;
        u32::try_from(size).map_err(|_| Error::SubrecordTooLarge {
            tag: self.record_type(),
            size,
        })
    }

    /// Write the header and payload.
    ///
    /// Nothing is written if the record cannot be serialized.
    pub fn save_to<W: Write + ?Sized>(&self, writer: &mut W) -> Result<()> {
        let mut header = self.header;
        header.payload_size = self.write_size()?;
        header.encode(writer)?;
        if !header.is_deleted() {
            serialize::write_payload(self, writer)?;
        }
        Ok(())
    }

    /// Serialize into a new buffer.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let size = self.write_size()?;
        let mut out = Vec::with_capacity(RECORD_HEADER_SIZE + size as usize);
        self.save_to(&mut out)?;
        Ok(out)
    }

    pub fn schema(&self) -> &'static RecordSchema {
        self.schema
    }

    pub fn header(&self) -> &RecordHeader {
        &self.header
    }

    /// Mutable header access. The payload size is recomputed on save.
    pub fn header_mut(&mut self) -> &mut RecordHeader {
        &mut self.header
    }

    pub fn record_type(&self) -> FourCC {
        self.header.record_type
    }

    pub fn form_id(&self) -> FormId {
        self.header.form_id
    }

    pub fn set_form_id(&mut self, form_id: FormId) {
        self.header.form_id = form_id;
    }

    pub fn is_deleted(&self) -> bool {
        self.header.is_deleted()
    }

    pub fn set_deleted(&mut self, deleted: bool) {
        self.header.set_deleted(deleted);
    }

    /// The first value of the field `tag`.
    pub fn get(&self, tag: Tag) -> Option<&FieldValue> {
        self.get_all(tag).first()
    }

    /// Every value of the field `tag`, in load order.
    pub fn get_all(&self, tag: Tag) -> &[FieldValue] {
        match self.schema.field_index(tag) {
            Some(index) => self.fields[index].as_slice(),
            None => &[],
        }
    }

    pub fn is_present(&self, tag: Tag) -> bool {
        !self.get_all(tag).is_empty()
    }

    /// Replace the field `tag` with a single value.
    pub fn set(&mut self, tag: Tag, value: FieldValue) -> Result<()> {
        let index = self.checked_index(tag, &value)?;
        self.fields[index] = vec![value];
        Ok(())
    }

    /// Append a value to a repeatable field.
    pub fn push(&mut self, tag: Tag, value: FieldValue) -> Result<()> {
        let index = self.checked_index(tag, &value)?;
        if !self.schema.fields[index].repeatable && !self.fields[index].is_empty() {
            return Err(Error::DuplicateSubrecord {
                record: self.record_type(),
                tag: tag.code(),
            });
        }
        self.fields[index].push(value);
        Ok(())
    }

    /// Remove every value of the field `tag`.
    pub fn clear(&mut self, tag: Tag) -> Result<()> {
        let index = self.index_of(tag)?;
        self.fields[index].clear();
        Ok(())
    }

    /// Text of a `ZString` field.
    pub fn text(&self, tag: Tag) -> Option<&RawString> {
        match self.get(tag)? {
            FieldValue::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn set_text(&mut self, tag: Tag, text: impl Into<RawString>) -> Result<()> {
        self.set(tag, FieldValue::Text(text.into()))
    }

    pub fn localized(&self, tag: Tag) -> Option<&LocalizedString> {
        match self.get(tag)? {
            FieldValue::Localized(value) => Some(value),
            _ => None,
        }
    }

    /// Set a localized field; `None` clears it.
    pub fn set_localized(&mut self, tag: Tag, value: LocalizedString) -> Result<()> {
        if value.is_present() {
            self.set(tag, FieldValue::Localized(value))
        } else {
            self.clear(tag)
        }
    }

    /// Form ID of a `FormId` field.
    pub fn reference(&self, tag: Tag) -> Option<FormId> {
        match self.get(tag)? {
            FieldValue::FormId(id) => Some(*id),
            _ => None,
        }
    }

    pub fn set_reference(&mut self, tag: Tag, id: FormId) -> Result<()> {
        self.set(tag, FieldValue::FormId(id))
    }

    /// Raw bytes of a `Bytes` or `Blob` field.
    pub fn bytes(&self, tag: Tag) -> Option<&[u8]> {
        match self.get(tag)? {
            FieldValue::Bytes(data) => Some(data),
            FieldValue::Blob(blob) => Some(blob.bytes()),
            _ => None,
        }
    }

    pub fn set_bytes(&mut self, tag: Tag, data: Vec<u8>) -> Result<()> {
        match self.field_kind(tag)? {
            FieldKind::Blob => self.set(tag, FieldValue::Blob(BinaryBlob::from_bytes(data))),
            _ => self.set(tag, FieldValue::Bytes(data)),
        }
    }

    pub fn blob(&self, tag: Tag) -> Option<&BinaryBlob> {
        match self.get(tag)? {
            FieldValue::Blob(blob) => Some(blob),
            _ => None,
        }
    }

    /// Elements of a `Struct` field.
    pub fn scalars(&self, tag: Tag) -> Option<&[Scalar]> {
        match self.get(tag)? {
            FieldValue::Struct(values) => Some(values),
            _ => None,
        }
    }

    pub fn scalar(&self, tag: Tag, position: usize) -> Option<Scalar> {
        self.scalars(tag)?.get(position).copied()
    }

    /// Set one element of a `Struct` field, creating the field zeroed if it
    /// is absent.
    pub fn set_scalar(&mut self, tag: Tag, position: usize, value: Scalar) -> Result<()> {
        let index = self.index_of(tag)?;
        let record = self.record_type();
        let invalid = Error::InvalidFieldValue {
            record,
            tag: tag.code(),
        };

        let FieldKind::Struct(layout) = self.schema.fields[index].kind else {
            return Err(invalid);
        };
        if layout.get(position) != Some(&value.kind()) {
            return Err(invalid);
        }

        let slot = &mut self.fields[index];
        if slot.is_empty() {
            slot.push(FieldValue::Struct(layout.iter().map(|&k| Scalar::zero(k)).collect()));
        }
        match slot.first_mut() {
            Some(FieldValue::Struct(values)) => {
                values[position] = value;
                Ok(())
            }
            _ => Err(invalid),
        }
    }

    /// Keyword form IDs.
    pub fn keywords(&self) -> &[FormId] {
        self.first_of_kind(|kind| matches!(kind, FieldKind::Keywords))
            .and_then(|value| match value {
                FieldValue::Keywords(ids) => Some(ids.as_slice()),
                _ => None,
            })
            .unwrap_or(&[])
    }

    /// Replace the keywords; an empty list removes them.
    pub fn set_keywords(&mut self, keywords: Vec<FormId>) -> Result<()> {
        let tag = self.tag_of_kind(|kind| matches!(kind, FieldKind::Keywords), Tag::Ksiz);
        if keywords.is_empty() {
            self.clear(tag)
        } else {
            self.set(tag, FieldValue::Keywords(keywords))
        }
    }

    /// Effect entries.
    pub fn effects(&self) -> &[EffectEntry] {
        self.first_of_kind(|kind| matches!(kind, FieldKind::Effects(_)))
            .and_then(|value| match value {
                FieldValue::Effects(entries) => Some(entries.as_slice()),
                _ => None,
            })
            .unwrap_or(&[])
    }

    /// Replace the effects; an empty list removes them.
    pub fn set_effects(&mut self, effects: Vec<EffectEntry>) -> Result<()> {
        let tag = self.tag_of_kind(|kind| matches!(kind, FieldKind::Effects(_)), Tag::Efid);
        if effects.is_empty() {
            self.clear(tag)
        } else {
            self.set(tag, FieldValue::Effects(effects))
        }
    }

    pub fn editor_id(&self) -> Option<&RawString> {
        self.text(Tag::Edid)
    }

    /// Subrecords kept verbatim because the schema does not name them.
    pub fn unknown_subrecords(&self) -> &[UnknownSubrecord] {
        &self.unknown
    }

    /// Add a subrecord to be written after every known field.
    pub fn push_unknown(&mut self, code: FourCC, data: Vec<u8>) -> Result<()> {
        if self.schema.unknown_tags != UnknownTagPolicy::PassThrough
            || self.schema.resolve(code).is_some()
        {
            return Err(Error::UnexpectedTag {
                expected: None,
                actual: code,
            });
        }
        let after = self.fields.len().checked_sub(1).map(|field| Anchor {
            field,
            count: usize::MAX,
        });
        self.unknown
            .push(UnknownSubrecord::new(code, BinaryBlob::from_bytes(data), after));
        Ok(())
    }

    fn clear_fields(&mut self) {
        self.fields.iter_mut().for_each(Vec::clear);
        self.unknown.clear();
    }

    fn index_of(&self, tag: Tag) -> Result<usize> {
        self.schema.field_index(tag).ok_or(Error::NoSuchField {
            record: self.record_type(),
            tag: tag.code(),
        })
    }

    fn checked_index(&self, tag: Tag, value: &FieldValue) -> Result<usize> {
        let index = self.index_of(tag)?;
        if !value.fits(&self.schema.fields[index].kind) {
            return Err(Error::InvalidFieldValue {
                record: self.record_type(),
                tag: tag.code(),
            });
        }
        Ok(index)
    }

    fn field_kind(&self, tag: Tag) -> Result<FieldKind> {
        self.index_of(tag).map(|index| self.schema.fields[index].kind)
    }

    fn first_of_kind(&self, pred: impl Fn(&FieldKind) -> bool) -> Option<&FieldValue> {
        let index = self.schema.fields.iter().position(|f| pred(&f.kind))?;
        self.fields[index].first()
    }

    fn tag_of_kind(&self, pred: impl Fn(&FieldKind) -> bool, fallback: Tag) -> Tag {
        self.schema
            .fields
            .iter()
            .find(|f| pred(&f.kind))
            .map_or(fallback, |f| f.tag)
    }
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.schema.record_type == other.schema.record_type
            && self.header.same_identity(&other.header)
            && self.fields == other.fields
            && self.unknown == other.unknown
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::ConditionEntry;
    use crate::effect::GroupRoles;
    use crate::schema::{FieldDescriptor, Lengths, ScalarKind};
    use crate::tag::RecordType;

    const FIELDS: &[FieldDescriptor] = &[
        FieldDescriptor::required(Tag::Edid, "editor_id", FieldKind::ZString),
        FieldDescriptor::optional(Tag::Full, "name", FieldKind::Localized),
        FieldDescriptor::optional(Tag::Ksiz, "keywords", FieldKind::Keywords),
        FieldDescriptor::required(Tag::Name, "base", FieldKind::FormId),
        FieldDescriptor::optional(Tag::Enit, "item", FieldKind::Bytes(Lengths::OneOf(&[32, 36]))),
        FieldDescriptor::optional(Tag::Modt, "texture_hashes", FieldKind::Blob),
        FieldDescriptor::repeated(
            Tag::Xlkr,
            "linked_refs",
            FieldKind::Struct(&[ScalarKind::FormId, ScalarKind::FormId]),
        ),
        FieldDescriptor::required(
            Tag::Data,
            "data",
            FieldKind::Struct(&[ScalarKind::U32, ScalarKind::F32]),
        ),
        FieldDescriptor::optional(
            Tag::Efid,
            "effects",
            FieldKind::Effects(GroupRoles::EFFECTS_WITH_STRINGS),
        ),
    ];

    static OPEN: RecordSchema = RecordSchema {
        record_type: RecordType::Refr,
        name: "open",
        fields: FIELDS,
        unknown_tags: UnknownTagPolicy::PassThrough,
    };

    static CLOSED: RecordSchema = RecordSchema {
        record_type: RecordType::Alch,
        name: "closed",
        fields: FIELDS,
        unknown_tags: UnknownTagPolicy::Reject,
    };

    fn sub(tag: &[u8; 4], data: &[u8]) -> Vec<u8> {
        let mut out = tag.to_vec();
        out.extend((data.len() as u16).to_le_bytes());
        out.extend(data);
        out
    }

    fn record_bytes(record_type: &[u8; 4], flags: u32, payload: &[u8]) -> Vec<u8> {
        let mut out = record_type.to_vec();
        out.extend((payload.len() as u32).to_le_bytes());
        out.extend(flags.to_le_bytes());
        out.extend(0x0001_0800u32.to_le_bytes());
        out.extend(7u32.to_le_bytes());
        out.extend(44u16.to_le_bytes());
        out.extend(0u16.to_le_bytes());
        out.extend(payload);
        out
    }

    fn minimal_payload() -> Vec<u8> {
        let mut payload = sub(b"EDID", b"Ale\0");
        payload.extend(sub(b"NAME", &0x0003_4C5Eu32.to_le_bytes()));
        payload.extend(sub(b"DATA", b"\x05\x00\x00\x00\x00\x00\x00\x3F"));
        payload
    }

    fn with_before_data(extra: &[u8]) -> Vec<u8> {
        // EDID and NAME, the extra subrecords, then DATA.
        insert_at(20, extra)
    }

    fn with_before_name(extra: &[u8]) -> Vec<u8> {
        // EDID, the extra subrecords, then NAME and DATA.
        insert_at(10, extra)
    }

    fn insert_at(offset: usize, extra: &[u8]) -> Vec<u8> {
        let minimal = minimal_payload();
        let mut payload = minimal[..offset].to_vec();
        payload.extend(extra);
        payload.extend(&minimal[offset..]);
        payload
    }

    fn effect_bytes(id: u32) -> Vec<u8> {
        let mut out = sub(b"EFID", &id.to_le_bytes());
        out.extend(sub(b"EFIT", b"\x00\x00\x70\x41\x00\x00\x00\x00\x00\x00\x00\x00"));
        out
    }

    fn parse(schema: &'static RecordSchema, bytes: &[u8]) -> Result<Record> {
        let table = StringTable::new();
        Record::parse_as(schema, bytes, &LoadOptions::new(false, &table))
    }

    #[test]
    fn test_minimal_round_trip() {
        let bytes = record_bytes(b"REFR", 0, &minimal_payload());
        let record = parse(&OPEN, &bytes).unwrap();

        assert_eq!(record.editor_id().unwrap(), "Ale");
        assert_eq!(record.reference(Tag::Name), Some(FormId::new(0x0003_4C5E)));
        assert_eq!(record.scalar(Tag::Data, 0), Some(Scalar::U32(5)));
        assert_eq!(record.scalar(Tag::Data, 1), Some(Scalar::F32(0.5)));
        assert_eq!(record.form_id(), FormId::new(0x0001_0800));
        assert_eq!(record.header().format_version, 44);
        assert!(record.keywords().is_empty());
        assert!(record.effects().is_empty());

        assert_eq!(record.to_bytes().unwrap(), bytes);
    }

    #[test]
    fn test_write_size_idempotent() {
        let record = parse(&OPEN, &record_bytes(b"REFR", 0, &minimal_payload())).unwrap();
        let size = record.write_size().unwrap();
        assert_eq!(size, minimal_payload().len() as u32);
        assert_eq!(record.write_size().unwrap(), size);
        assert_eq!(record.to_bytes().unwrap().len(), RECORD_HEADER_SIZE + size as usize);
    }

    #[test]
    fn test_pass_through_keeps_unknown_subrecords() {
        let mut payload = minimal_payload();
        payload.extend(sub(b"XXXX", b"abc"));
        payload.extend(sub(b"YYYY", b""));
        let bytes = record_bytes(b"REFR", 0, &payload);

        let record = parse(&OPEN, &bytes).unwrap();
        let kept: Vec<_> = record
            .unknown_subrecords()
            .iter()
            .map(|kept| (kept.code, kept.blob.bytes().to_vec()))
            .collect();
        assert_eq!(
            kept,
            vec![(FourCC(*b"XXXX"), b"abc".to_vec()), (FourCC(*b"YYYY"), Vec::new())]
        );
        assert_eq!(record.to_bytes().unwrap(), bytes);
    }

    #[test]
    fn test_unknown_subrecords_keep_position() {
        let mut payload = sub(b"YYYY", b"first");
        payload.extend(with_before_data(&sub(b"XXXX", b"abc")));
        let bytes = record_bytes(b"REFR", 0, &payload);

        let mut record = parse(&OPEN, &bytes).unwrap();
        let saved = record.to_bytes().unwrap();
        assert_eq!(saved, bytes);
        assert_eq!(parse(&OPEN, &saved).unwrap(), record);

        // Added subrecords go after every known field.
        record.push_unknown(FourCC(*b"ZZZZ"), b"end".to_vec()).unwrap();
        let mut expected = payload.clone();
        expected.extend(sub(b"ZZZZ", b"end"));
        assert_eq!(record.to_bytes().unwrap(), record_bytes(b"REFR", 0, &expected));
    }

    #[test]
    fn test_unknown_subrecord_follows_repeated_value() {
        let mut extra = sub(b"XLKR", &[1, 0, 0, 0, 2, 0, 0, 0]);
        extra.extend(sub(b"XXXX", b"abc"));
        extra.extend(sub(b"XLKR", &[3, 0, 0, 0, 4, 0, 0, 0]));
        let bytes = record_bytes(b"REFR", 0, &with_before_data(&extra));

        let mut record = parse(&OPEN, &bytes).unwrap();
        assert_eq!(record.to_bytes().unwrap(), bytes);

        // With the field emptied the subrecord stays at the field's place.
        record.clear(Tag::Xlkr).unwrap();
        let expected = with_before_data(&sub(b"XXXX", b"abc"));
        assert_eq!(record.to_bytes().unwrap(), record_bytes(b"REFR", 0, &expected));
    }

    #[test]
    fn test_unknown_subrecord_inside_effect_list() {
        let mut payload = minimal_payload();
        payload.extend(effect_bytes(0x0003_EB16));
        payload.extend(sub(b"XXXX", b"abc"));
        let bytes = record_bytes(b"REFR", 0, &payload);
        let record = parse(&OPEN, &bytes).unwrap();
        assert_eq!(record.to_bytes().unwrap(), bytes);

        payload.extend(effect_bytes(0x0010_C645));
        assert!(matches!(
            parse(&OPEN, &record_bytes(b"REFR", 0, &payload)),
            Err(Error::GroupProtocolError {
                tag: FourCC(code),
                reason: "appears inside an effect list",
                ..
            }) if &code == b"XXXX"
        ));
    }

    #[test]
    fn test_out_of_order_rejected() {
        let mut extra = sub(b"KSIZ", &1u32.to_le_bytes());
        extra.extend(sub(b"KWDA", &[1, 0, 0, 0]));
        assert!(matches!(
            parse(&OPEN, &record_bytes(b"REFR", 0, &with_before_data(&extra))),
            Err(Error::OutOfOrder {
                tag: FourCC(tag),
                after: FourCC(after),
                ..
            }) if &tag == b"KSIZ" && &after == b"NAME"
        ));

        let mut payload = sub(b"EDID", b"Ale\0");
        payload.extend(sub(b"DATA", b"\x05\x00\x00\x00\x00\x00\x00\x3F"));
        payload.extend(sub(b"NAME", &0x0003_4C5Eu32.to_le_bytes()));
        assert!(matches!(
            parse(&OPEN, &record_bytes(b"REFR", 0, &payload)),
            Err(Error::OutOfOrder { .. })
        ));

        let mut payload = minimal_payload()[..20].to_vec();
        payload.extend(effect_bytes(0x0003_EB16));
        payload.extend(sub(b"DATA", b"\x05\x00\x00\x00\x00\x00\x00\x3F"));
        assert!(matches!(
            parse(&OPEN, &record_bytes(b"REFR", 0, &payload)),
            Err(Error::OutOfOrder { after: FourCC(after), .. }) if &after == b"EFID"
        ));

        let mut payload = effect_bytes(0x0003_EB16);
        payload.extend(minimal_payload());
        assert!(matches!(
            parse(&OPEN, &record_bytes(b"REFR", 0, &payload)),
            Err(Error::OutOfOrder { tag: FourCC(tag), .. }) if &tag == b"EDID"
        ));
    }

    #[test]
    fn test_code_page_text_round_trip() {
        let mut payload = sub(b"EDID", b"Caf\xE9\0");
        payload.extend(&minimal_payload()[10..]);
        let bytes = record_bytes(b"REFR", 0, &payload);

        let record = parse(&OPEN, &bytes).unwrap();
        let editor_id = record.editor_id().unwrap();
        assert_eq!(editor_id.as_bytes(), b"Caf\xE9");
        assert_eq!(editor_id.to_string_lossy(), "Caf\u{FFFD}");
        assert_eq!(record.to_bytes().unwrap(), bytes);
    }

    #[test]
    fn test_reject_policy() {
        let mut payload = minimal_payload();
        payload.extend(sub(b"XXXX", b"abc"));

        let err = parse(&CLOSED, &record_bytes(b"ALCH", 0, &payload)).unwrap_err();
        assert!(matches!(
            err,
            Error::UnexpectedTag {
                expected: None,
                actual: FourCC(code)
            } if &code == b"XXXX"
        ));
    }

    #[test]
    fn test_duplicate_subrecord() {
        let bytes = record_bytes(b"REFR", 0, &with_before_data(&sub(b"EDID", b"Mead\0")));
        assert!(matches!(
            parse(&OPEN, &bytes),
            Err(Error::DuplicateSubrecord { tag: FourCC(code), .. }) if &code == b"EDID"
        ));

        let mut payload = minimal_payload();
        payload.extend(sub(b"DATA", b"\x06\x00\x00\x00\x00\x00\x80\x3F"));
        assert!(matches!(
            parse(&OPEN, &record_bytes(b"REFR", 0, &payload)),
            Err(Error::DuplicateSubrecord { tag: FourCC(code), .. }) if &code == b"DATA"
        ));

        let mut keywords = sub(b"KSIZ", &1u32.to_le_bytes());
        keywords.extend(sub(b"KWDA", &[1, 0, 0, 0]));
        let twice = [keywords.clone(), keywords].concat();
        assert!(matches!(
            parse(&OPEN, &record_bytes(b"REFR", 0, &with_before_name(&twice))),
            Err(Error::DuplicateSubrecord { tag: FourCC(code), .. }) if &code == b"KSIZ"
        ));
    }

    #[test]
    fn test_repeatable_field() {
        let mut extra = sub(b"XLKR", &[1, 0, 0, 0, 2, 0, 0, 0]);
        extra.extend(sub(b"XLKR", &[3, 0, 0, 0, 4, 0, 0, 0]));
        let bytes = record_bytes(b"REFR", 0, &with_before_data(&extra));

        let record = parse(&OPEN, &bytes).unwrap();
        let links = record.get_all(Tag::Xlkr);
        assert_eq!(links.len(), 2);
        assert_eq!(
            links[1],
            FieldValue::Struct(vec![
                Scalar::FormId(FormId::new(3)),
                Scalar::FormId(FormId::new(4))
            ])
        );
        assert_eq!(record.to_bytes().unwrap(), bytes);
    }

    #[test]
    fn test_missing_required_on_load() {
        let mut payload = sub(b"EDID", b"Ale\0");
        payload.extend(sub(b"DATA", b"\x05\x00\x00\x00\x00\x00\x00\x3F"));

        assert!(matches!(
            parse(&OPEN, &record_bytes(b"REFR", 0, &payload)),
            Err(Error::MissingRequiredSubrecord { tag: FourCC(code), .. }) if &code == b"NAME"
        ));
    }

    #[test]
    fn test_missing_required_on_save() {
        let mut record = Record::new(&OPEN);
        record.set_text(Tag::Edid, "Ale").unwrap();

        let mut out = Vec::new();
        assert!(matches!(
            record.save_to(&mut out),
            Err(Error::MissingRequiredSubrecord { .. })
        ));
        assert!(out.is_empty());
    }

    #[test]
    fn test_length_checked_before_content() {
        let mut payload = sub(b"EDID", b"Ale\0");
        payload.extend(sub(b"NAME", &[0, 0, 0, 0, 0]));
        assert!(matches!(
            parse(&OPEN, &record_bytes(b"REFR", 0, &payload)),
            Err(Error::LengthMismatch { actual: 5, .. })
        ));

        let mut payload = sub(b"EDID", b"Ale\0");
        payload.extend(sub(b"NAME", &[0, 0, 0, 0]));
        assert!(matches!(
            parse(&OPEN, &record_bytes(b"REFR", 0, &payload)),
            Err(Error::ZeroFormId { .. })
        ));
    }

    #[test]
    fn test_allow_list() {
        let bytes = record_bytes(b"REFR", 0, &with_before_data(&sub(b"ENIT", &[9; 36])));
        let record = parse(&OPEN, &bytes).unwrap();
        assert_eq!(record.bytes(Tag::Enit), Some(&[9u8; 36][..]));

        let bytes = record_bytes(b"REFR", 0, &with_before_data(&sub(b"ENIT", &[9; 40])));
        let err = parse(&OPEN, &bytes).unwrap_err();
        assert_eq!(
            err.to_string(),
            "ENIT: invalid subrecord length 40, expected one of [32, 36]"
        );
    }

    #[test]
    fn test_keywords() {
        let mut extra = sub(b"KSIZ", &2u32.to_le_bytes());
        extra.extend(sub(b"KWDA", b"\xEA\xCD\x08\x00\x01\x00\x00\x00"));
        let bytes = record_bytes(b"REFR", 0, &with_before_name(&extra));

        let record = parse(&OPEN, &bytes).unwrap();
        assert_eq!(record.keywords(), &[FormId::new(0x0008_CDEA), FormId::new(1)]);
        assert_eq!(record.to_bytes().unwrap(), bytes);
    }

    #[test]
    fn test_keyword_protocol_errors() {
        let orphan = with_before_name(&sub(b"KWDA", &[1, 0, 0, 0]));
        assert!(matches!(
            parse(&OPEN, &record_bytes(b"REFR", 0, &orphan)),
            Err(Error::GroupProtocolError { .. })
        ));

        let mut short = sub(b"KSIZ", &2u32.to_le_bytes());
        short.extend(sub(b"KWDA", &[1, 0, 0, 0]));
        assert!(matches!(
            parse(&OPEN, &record_bytes(b"REFR", 0, &with_before_name(&short))),
            Err(Error::LengthMismatch { actual: 4, .. })
        ));

        let unfollowed = with_before_name(&sub(b"KSIZ", &1u32.to_le_bytes()));
        assert!(matches!(
            parse(&OPEN, &record_bytes(b"REFR", 0, &unfollowed)),
            Err(Error::MissingRequiredSubrecord { tag: FourCC(code), .. }) if &code == b"KWDA"
        ));
    }

    #[test]
    fn test_localized_field() {
        let mut builder = StringTable::builder();
        builder.add_string(0x0001_267C, "foo bar").unwrap();
        let table = builder.build();
        let options = LoadOptions::new(true, &table);

        // FULL sits between EDID and NAME in schema order.
        let with_name = |index: u32| {
            record_bytes(b"REFR", 0, &with_before_name(&sub(b"FULL", &index.to_le_bytes())))
        };

        let bytes = with_name(0x0001_267C);
        let record = Record::parse_as(&OPEN, &bytes, &options).unwrap();
        let name = record.localized(Tag::Full).unwrap();
        assert_eq!(name.index().unwrap(), 0x0001_267C);
        assert_eq!(name.text().unwrap(), "foo bar");
        assert_eq!(record.to_bytes().unwrap(), bytes);

        let bytes = with_name(5);
        assert!(matches!(
            Record::parse_as(&OPEN, &bytes, &options),
            Err(Error::StringResolutionFailure { index: 5 })
        ));
    }

    #[test]
    fn test_deleted_record() {
        let bytes = record_bytes(b"REFR", RecordHeader::FLAG_DELETED, &[]);
        let record = parse(&OPEN, &bytes).unwrap();
        assert!(record.is_deleted());
        assert_eq!(record.editor_id(), None);
        assert_eq!(record.to_bytes().unwrap(), bytes);

        let bytes = record_bytes(b"REFR", RecordHeader::FLAG_DELETED, &minimal_payload());
        assert!(matches!(parse(&OPEN, &bytes), Err(Error::LengthMismatch { .. })));
    }

    #[test]
    fn test_deleted_record_writes_no_payload() {
        let mut record = parse(&OPEN, &record_bytes(b"REFR", 0, &minimal_payload())).unwrap();
        record.set_deleted(true);

        assert_eq!(record.write_size().unwrap(), 0);
        let bytes = record.to_bytes().unwrap();
        assert_eq!(bytes.len(), RECORD_HEADER_SIZE);

        let reloaded = parse(&OPEN, &bytes).unwrap();
        assert!(reloaded.is_deleted());
        assert!(!reloaded.is_present(Tag::Edid));
    }

    #[test]
    fn test_truncated_payload() {
        let payload = minimal_payload();
        for cut in 0..payload.len() {
            // Header claims the full payload but the bytes stop early.
            let mut bytes = record_bytes(b"REFR", 0, &payload);
            bytes.truncate(RECORD_HEADER_SIZE + cut);
            assert!(matches!(parse(&OPEN, &bytes), Err(Error::TruncatedStream { .. })));

            // Header and bytes agree on a payload that ends early.
            let bytes = record_bytes(b"REFR", 0, &payload[..cut]);
            assert!(parse(&OPEN, &bytes).is_err(), "cut at {cut}");
        }
    }

    #[test]
    fn test_failed_load_clears_fields() {
        let mut record = parse(&OPEN, &record_bytes(b"REFR", 0, &minimal_payload())).unwrap();
        let table = StringTable::new();
        let bytes = record_bytes(b"REFR", 0, &sub(b"EDID", b"Ale\0"));

        assert!(record
            .load_from(&mut BinaryReader::new(&bytes), &LoadOptions::new(false, &table))
            .is_err());
        assert!(!record.is_present(Tag::Edid));
        assert!(!record.is_present(Tag::Data));
    }

    #[test]
    fn test_record_type_mismatch() {
        let bytes = record_bytes(b"REFR", 0, &minimal_payload());
        assert!(matches!(
            parse(&CLOSED, &bytes),
            Err(Error::RecordTypeMismatch { .. })
        ));
    }

    #[test]
    fn test_parse_unregistered_type() {
        let bytes = record_bytes(b"XXXX", 0, &[]);
        let table = StringTable::new();
        assert!(matches!(
            Record::parse(&bytes, &LoadOptions::new(false, &table)),
            Err(Error::UnknownRecordType(_))
        ));
    }

    #[test]
    fn test_equality() {
        let bytes = record_bytes(b"REFR", 0, &minimal_payload());
        let a = parse(&OPEN, &bytes).unwrap();
        let mut b = a.clone();
        b.header_mut().payload_size = 0;
        assert_eq!(a, b);

        b.set_bytes(Tag::Modt, Vec::new()).unwrap();
        assert_ne!(a, b);
        b.clear(Tag::Modt).unwrap();
        assert_eq!(a, b);

        b.header_mut().revision += 1;
        assert_ne!(a, b);
    }

    #[test]
    fn test_setters_validate() {
        let mut record = Record::new(&OPEN);
        assert!(matches!(
            record.set_text(Tag::Name, "Ale"),
            Err(Error::InvalidFieldValue { .. })
        ));
        assert!(matches!(
            record.set_reference(Tag::Name, FormId::NULL),
            Err(Error::InvalidFieldValue { .. })
        ));
        assert!(matches!(
            record.set_text(Tag::Desc, "Ale"),
            Err(Error::NoSuchField { .. })
        ));
        assert!(matches!(
            record.set_scalar(Tag::Data, 0, Scalar::F32(1.0)),
            Err(Error::InvalidFieldValue { .. })
        ));

        record.set_text(Tag::Edid, "Ale").unwrap();
        assert!(matches!(
            record.push(Tag::Edid, FieldValue::Text("Mead".into())),
            Err(Error::DuplicateSubrecord { .. })
        ));

        record.set_scalar(Tag::Data, 1, Scalar::F32(2.0)).unwrap();
        assert_eq!(record.scalars(Tag::Data), Some(&[Scalar::U32(0), Scalar::F32(2.0)][..]));

        assert!(record.push_unknown(FourCC(*b"XXXX"), vec![1]).is_ok());
        assert!(record.push_unknown(FourCC(*b"EDID"), vec![1]).is_err());
        assert!(Record::new(&CLOSED)
            .push_unknown(FourCC(*b"XXXX"), vec![1])
            .is_err());
    }

    #[test]
    fn test_effects_round_trip() {
        let mut record = parse(&OPEN, &record_bytes(b"REFR", 0, &minimal_payload())).unwrap();
        let mut effect = EffectEntry::new(FormId::new(0x0003_EB16), 15.0, 2, 30);
        effect
            .conditions
            .push(ConditionEntry::with_text([4; 32], "foo"));
        record.set_effects(vec![effect.clone()]).unwrap();

        let bytes = record.to_bytes().unwrap();
        let reloaded = parse(&OPEN, &bytes).unwrap();
        assert_eq!(reloaded.effects(), &[effect]);
        assert_eq!(reloaded, record);

        record.set_effects(Vec::new()).unwrap();
        assert!(record.effects().is_empty());
    }

    #[test]
    fn test_records_are_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Record>();
        assert_send_sync::<RecordSchema>();
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        fn effect() -> impl Strategy<Value = EffectEntry> {
            (
                any::<u32>(),
                -1.0e3f32..1.0e3,
                any::<u32>(),
                any::<u32>(),
                prop::collection::vec(
                    (prop::array::uniform32(any::<u8>()), proptest::option::of("[a-z]{0,10}")),
                    0..3,
                ),
            )
                .prop_map(|(id, magnitude, area, duration, conditions)| {
                    let mut entry = EffectEntry::new(FormId::new(id), magnitude, area, duration);
                    entry.conditions = conditions
                        .into_iter()
                        .map(|(data, text)| match text {
                            Some(text) => ConditionEntry::with_text(data, text),
                            None => ConditionEntry::new(data),
                        })
                        .collect();
                    entry
                })
        }

        fn record() -> impl Strategy<Value = Record> {
            (
                (any::<u32>(), any::<u32>(), "[A-Za-z0-9_]{0,32}"),
                proptest::option::of("[ -~]{0,40}"),
                prop::collection::vec(1u32.., 0..4),
                1u32..,
                proptest::option::of(
                    prop_oneof![Just(32usize), Just(36)]
                        .prop_flat_map(|n| prop::collection::vec(any::<u8>(), n)),
                ),
                proptest::option::of(prop::collection::vec(any::<u8>(), 0..64)),
                prop::collection::vec((any::<u32>(), any::<u32>()), 0..3),
                (any::<u32>(), -1.0e6f32..1.0e6),
                prop::collection::vec(effect(), 0..3),
            )
                .prop_map(
                    |((form_id, revision, editor_id), name, keywords, base, item, hashes, links, data, effects)| {
                        let mut record = Record::new(&OPEN);
                        record.set_form_id(FormId::new(form_id));
                        record.header_mut().revision = revision;
                        record.set_text(Tag::Edid, editor_id).unwrap();
                        if let Some(name) = name {
                            record
                                .set_localized(Tag::Full, LocalizedString::literal(name))
                                .unwrap();
                        }
                        record
                            .set_keywords(keywords.into_iter().map(FormId::new).collect())
                            .unwrap();
                        record.set_reference(Tag::Name, FormId::new(base)).unwrap();
                        if let Some(item) = item {
                            record.set_bytes(Tag::Enit, item).unwrap();
                        }
                        if let Some(hashes) = hashes {
                            record.set_bytes(Tag::Modt, hashes).unwrap();
                        }
                        for (keyword, reference) in links {
                            let value = FieldValue::Struct(vec![
                                Scalar::FormId(FormId::new(keyword)),
                                Scalar::FormId(FormId::new(reference)),
                            ]);
                            record.push(Tag::Xlkr, value).unwrap();
                        }
                        record.set_scalar(Tag::Data, 0, Scalar::U32(data.0)).unwrap();
                        record.set_scalar(Tag::Data, 1, Scalar::F32(data.1)).unwrap();
                        record.set_effects(effects).unwrap();
                        record
                    },
                )
        }

        proptest! {
            /// Saving and reloading any valid record gives the same record.
            #[test]
            fn test_save_load_round_trip(record in record()) {
                let size = record.write_size().unwrap();
                let bytes = record.to_bytes().unwrap();
                prop_assert_eq!(bytes.len(), RECORD_HEADER_SIZE + size as usize);
                prop_assert_eq!(record.write_size().unwrap(), size);

                let loaded = parse(&OPEN, &bytes).unwrap();
                prop_assert_eq!(&loaded, &record);
                prop_assert_eq!(loaded.to_bytes().unwrap(), bytes);
            }

            /// Any strict prefix of a record's payload is rejected.
            #[test]
            fn test_prefix_rejected(record in record(), cut in any::<prop::sample::Index>()) {
                let bytes = record.to_bytes().unwrap();
                let payload = &bytes[RECORD_HEADER_SIZE..];
                let cut = cut.index(payload.len());

                let mut truncated = bytes[..RECORD_HEADER_SIZE].to_vec();
                truncated.extend(&payload[..cut]);
                prop_assert!(parse(&OPEN, &truncated).is_err());
            }
        }
    }
}
