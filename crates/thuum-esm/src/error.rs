//! Error types for record parsing and writing.

use thiserror::Error;
use thuum_common::FourCC;

/// Errors that can occur when reading or writing plugin records.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Common library error.
    #[error("{0}")]
    Common(#[from] thuum_common::Error),

    /// Fewer than 24 bytes were available for a record header.
    #[error("truncated record header: needed {needed} bytes, got {available}")]
    TruncatedHeader { needed: usize, available: usize },

    /// A subrecord or record payload ended early.
    #[error("truncated subrecord stream: needed {needed} bytes, got {available}")]
    TruncatedStream { needed: usize, available: usize },

    /// A subrecord tag was not the one expected, or not known at all.
    #[error("unexpected subrecord {actual}{}", .expected.map(|e| format!(", expected {e}")).unwrap_or_default())]
    UnexpectedTag {
        expected: Option<FourCC>,
        actual: FourCC,
    },

    /// A non-repeatable subrecord occurred twice.
    #[error("{record}: duplicate {tag} subrecord")]
    DuplicateSubrecord { record: FourCC, tag: FourCC },

    /// A known subrecord came after one the layout places behind it.
    #[error("{record}: {tag} subrecord after {after}")]
    OutOfOrder {
        record: FourCC,
        tag: FourCC,
        after: FourCC,
    },

    /// A subrecord length is not one of the allowed sizes.
    #[error("{tag}: invalid subrecord length {actual}, expected {expected}")]
    LengthMismatch {
        tag: FourCC,
        expected: String,
        actual: usize,
    },

    /// A text subrecord exceeds its length ceiling.
    #[error("{tag}: text length {length} exceeds the limit of {max}")]
    TooLong { tag: FourCC, length: usize, max: usize },

    /// A required subrecord was never seen, or is absent at write time.
    #[error("{record}: required subrecord {tag} is missing")]
    MissingRequiredSubrecord { record: FourCC, tag: FourCC },

    /// A subrecord broke the ordering rules of a compound group.
    #[error("{record}: {tag} {reason}")]
    GroupProtocolError {
        record: FourCC,
        tag: FourCC,
        reason: &'static str,
    },

    /// A localized string index has no table entry.
    #[error("string index {index:#010x} not found in string table")]
    StringResolutionFailure { index: u32 },

    /// A string table entry was added twice.
    #[error("duplicate string table index {0:#010x}")]
    DuplicateStringIndex(u32),

    /// A localized string was accessed as a variant it is not.
    #[error("localized string is {actual}, expected {expected}")]
    WrongVariant {
        expected: &'static str,
        actual: &'static str,
    },

    /// A form ID reference is zero.
    #[error("{tag}: form ID must not be zero")]
    ZeroFormId { tag: FourCC },

    /// A payload does not fit a 16-bit subrecord length.
    #[error("{tag}: payload of {size} bytes does not fit in a subrecord")]
    SubrecordTooLarge { tag: FourCC, size: usize },

    /// Bytes for one record type were handed to another.
    #[error("record type mismatch: expected {expected}, got {actual}")]
    RecordTypeMismatch { expected: FourCC, actual: FourCC },

    /// No schema is registered for a record type.
    #[error("no schema registered for record type {0}")]
    UnknownRecordType(FourCC),

    /// A record has no field for the given tag.
    #[error("{record} has no {tag} field")]
    NoSuchField { record: FourCC, tag: FourCC },

    /// A value does not fit the field it was stored into.
    #[error("{record}: value does not fit field {tag}")]
    InvalidFieldValue { record: FourCC, tag: FourCC },
}

impl Error {
    /// Map a reader error inside a subrecord stream to a truncation.
    pub(crate) fn truncated(err: thuum_common::Error) -> Self {
        match err {
            thuum_common::Error::UnexpectedEof { needed, available } => {
                Error::TruncatedStream { needed, available }
            }
            other => Error::Common(other),
        }
    }
}

/// Result type for record operations.
pub type Result<T> = std::result::Result<T, Error>;
