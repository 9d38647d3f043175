//! Writing field values back out.

use std::io::Write;

use super::Record;
use crate::{Error, Result};

/// Size of the payload [`write_payload`] will produce.
pub(super) fn payload_size(record: &Record) -> Result<usize> {
    if record.is_deleted() {
        return Ok(0);
    }
    validate(record)?;

    let fields: usize = record
        .fields
        .iter()
        .flatten()
        .map(|value| value.encoded_size())
        .sum();
    let unknown: usize = record.unknown.iter().map(|kept| kept.blob.write_size()).sum();
    Ok(fields + unknown)
}

/// Write the payload: fields in schema order, each kept unknown subrecord
/// right behind the value it followed when read.
pub(super) fn write_payload<W: Write + ?Sized>(record: &Record, writer: &mut W) -> Result<()> {
    let slots: Vec<_> = record
        .unknown
        .iter()
        .map(|kept| kept.slot(&record.fields))
        .collect();
    let write_slot = |writer: &mut W, slot: Option<(usize, usize)>| -> Result<()> {
        for (kept, _) in record.unknown.iter().zip(&slots).filter(|(_, s)| **s == slot) {
            kept.blob.save_to(writer, kept.code)?;
        }
        Ok(())
    };

    write_slot(writer, None)?;
    for (index, (field, values)) in record.schema.fields.iter().zip(&record.fields).enumerate() {
        write_slot(writer, Some((index, 0)))?;
        for (count, value) in values.iter().enumerate() {
            value.write_to(writer, field)?;
            write_slot(writer, Some((index, count + 1)))?;
        }
    }
    Ok(())
}

fn validate(record: &Record) -> Result<()> {
    let code = record.schema.record_type.code();
    for (field, values) in record.schema.fields.iter().zip(&record.fields) {
        if field.required && values.is_empty() {
            return Err(Error::MissingRequiredSubrecord {
                record: code,
                tag: field.tag.code(),
            });
        }
        if values.iter().any(|value| !value.fits(&field.kind)) {
            return Err(Error::InvalidFieldValue {
                record: code,
                tag: field.tag.code(),
            });
        }
    }
    Ok(())
}
