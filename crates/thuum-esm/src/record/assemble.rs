//! Turning a subrecord stream into field values.

use thuum_common::{BinaryReader, FormId, FourCC};
use tracing::{debug, trace, warn};

use super::value::{Anchor, FieldValue, Scalar, UnknownSubrecord};
use super::LoadOptions;
use crate::blob::BinaryBlob;
use crate::effect::EffectGroupAssembler;
use crate::localized::LocalizedString;
use crate::schema::{FieldDescriptor, FieldKind, FieldRole, Lengths, RecordSchema, ScalarKind, UnknownTagPolicy};
use crate::subrecord::{SubrecordStream, MAX_TEXT_LENGTH};
use crate::tag::Tag;
use crate::{Error, Result};

/// Everything decoded from one record payload.
pub(super) struct Body {
    pub fields: Vec<Vec<FieldValue>>,
    pub unknown: Vec<UnknownSubrecord>,
}

pub(super) fn assemble(
    schema: &RecordSchema,
    stream: &mut SubrecordStream<'_>,
    options: &LoadOptions<'_>,
) -> Result<Body> {
    let record = schema.record_type.code();
    let mut fields: Vec<Vec<FieldValue>> = vec![Vec::new(); schema.fields.len()];
    let mut groups: Vec<Option<EffectGroupAssembler>> = schema
        .fields
        .iter()
        .map(|field| match field.kind {
            FieldKind::Effects(roles) => Some(EffectGroupAssembler::new(record, roles)),
            _ => None,
        })
        .collect();
    let mut unknown = Vec::new();
    // Field of the latest known subrecord.
    let mut last: Option<usize> = None;
    // Unknown subrecord read after an effect list started.
    let mut inside_group: Option<FourCC> = None;

    while let Some(code) = stream.next_tag()? {
        trace!(record = %record, tag = %code, offset = stream.bytes_consumed() - 4, "subrecord");

        match schema.resolve(code) {
            Some((index, FieldRole::Value)) => {
                let field = &schema.fields[index];
                if !field.repeatable && !fields[index].is_empty() {
                    return Err(Error::DuplicateSubrecord { record, tag: code });
                }
                check_order(schema, last, index, code)?;
                let value = decode_value(record, field, stream, options)?;
                fields[index].push(value);
                last = Some(index);
            }
            Some((_, FieldRole::KeywordData)) => {
                return Err(Error::GroupProtocolError {
                    record,
                    tag: code,
                    reason: "has no preceding keyword count",
                });
            }
            Some((index, FieldRole::Group(role))) => {
                check_order(schema, last, index, code)?;
                if let Some(tag) = inside_group {
                    return Err(Error::GroupProtocolError {
                        record,
                        tag,
                        reason: "appears inside an effect list",
                    });
                }
                if let Some(group) = groups[index].as_mut() {
                    group.accept(role, stream)?;
                }
                last = Some(index);
            }
            None => match schema.unknown_tags {
                UnknownTagPolicy::PassThrough => {
                    let mut blob = BinaryBlob::new();
                    blob.load_from(stream, code, false)?;
                    debug!(record = %record, tag = %code, size = blob.size(), "kept unknown subrecord");
                    if last.is_some_and(|index| groups[index].is_some()) {
                        inside_group.get_or_insert(code);
                    }
                    let after = last.map(|field| Anchor {
                        field,
                        count: fields[field].len(),
                    });
                    unknown.push(UnknownSubrecord::new(code, blob, after));
                }
                UnknownTagPolicy::Reject => {
                    return Err(Error::UnexpectedTag {
                        expected: None,
                        actual: code,
                    });
                }
            },
        }
    }

    // No tag closes the last effect; the end of the payload does.
    for (index, group) in groups.into_iter().enumerate() {
        if let Some(group) = group {
            let entries = group.finish();
            if !entries.is_empty() {
                fields[index].push(FieldValue::Effects(entries));
            }
        }
    }

    if let Some((field, _)) = schema
        .fields
        .iter()
        .zip(&fields)
        .find(|(field, values)| field.required && values.is_empty())
    {
        return Err(Error::MissingRequiredSubrecord {
            record,
            tag: field.tag.code(),
        });
    }

    Ok(Body { fields, unknown })
}

/// Known subrecords must follow the field order of the layout.
fn check_order(schema: &RecordSchema, last: Option<usize>, index: usize, code: FourCC) -> Result<()> {
    match last {
        Some(prev) if index < prev => Err(Error::OutOfOrder {
            record: schema.record_type.code(),
            tag: code,
            after: schema.fields[prev].tag.code(),
        }),
        _ => Ok(()),
    }
}

/// Decode the subrecord for `field`; its tag has already been read.
fn decode_value(
    record: FourCC,
    field: &FieldDescriptor,
    stream: &mut SubrecordStream<'_>,
    options: &LoadOptions<'_>,
) -> Result<FieldValue> {
    let tag = field.tag.code();

    match field.kind {
        FieldKind::ZString => Ok(FieldValue::Text(
            stream.read_variable(tag, MAX_TEXT_LENGTH)?.into(),
        )),
        FieldKind::Localized => {
            let mut value = LocalizedString::None;
            value.load(stream, tag, false, options.localized, options.table)?;
            Ok(FieldValue::Localized(value))
        }
        FieldKind::FormId => {
            let id = FormId::new(stream.read_u32(tag)?);
            if id.is_null() {
                return Err(Error::ZeroFormId { tag });
            }
            Ok(FieldValue::FormId(id))
        }
        FieldKind::Struct(layout) => {
            let data = stream.read_exact(tag, ScalarKind::layout_size(layout))?;
            let mut reader = BinaryReader::new(data);
            layout
                .iter()
                .map(|&kind| Scalar::decode(kind, &mut reader))
                .collect::<Result<Vec<_>>>()
                .map(FieldValue::Struct)
        }
        FieldKind::Bytes(lengths) => {
            let length = stream.read_length()?;
            if !lengths.allows(length) {
                if let Lengths::OneOf(_) = lengths {
                    warn!(
                        record = %record,
                        tag = %tag,
                        length,
                        allowed = %lengths,
                        "subrecord length not seen before, needs investigation"
                    );
                }
                return Err(Error::LengthMismatch {
                    tag,
                    expected: lengths.to_string(),
                    actual: usize::from(length),
                });
            }
            Ok(FieldValue::Bytes(stream.read_data(length)?.to_vec()))
        }
        FieldKind::Blob => {
            let mut blob = BinaryBlob::new();
            blob.load_from(stream, tag, false)?;
            Ok(FieldValue::Blob(blob))
        }
        FieldKind::Keywords => decode_keywords(record, tag, stream),
        FieldKind::Effects(_) => Err(Error::UnexpectedTag {
            expected: None,
            actual: tag,
        }),
    }
}

/// KSIZ has been read; decode its count and the KWDA that must follow.
fn decode_keywords(record: FourCC, tag: FourCC, stream: &mut SubrecordStream<'_>) -> Result<FieldValue> {
    let count = stream.read_u32(tag)?;

    let data_tag = Tag::Kwda.code();
    match stream.next_tag()? {
        Some(next) if next == data_tag => {}
        Some(_) => {
            return Err(Error::MissingRequiredSubrecord {
                record,
                tag: data_tag,
            })
        }
        None => {
            return Err(Error::TruncatedStream {
                needed: 4,
                available: 0,
            })
        }
    }

    let length = stream.read_length()?;
    let expected = u64::from(count) * 4;
    if expected != u64::from(length) {
        return Err(Error::LengthMismatch {
            tag: data_tag,
            expected: expected.to_string(),
            actual: usize::from(length),
        });
    }

    let data = stream.read_data(length)?;
    let keywords = data
        .chunks_exact(4)
        .map(|chunk| FormId::new(u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]])))
        .collect();
    Ok(FieldValue::Keywords(keywords))
}
