//! Error types for FBX decoding, encoding and tree editing.

use std::path::PathBuf;

use thiserror::Error;

use crate::model::{PropertyType, RecordId};

/// Coarse classification of an [`Error`].
///
/// Lets callers branch on the failure class without destructuring the
/// context carried by each variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    IoFailure,
    MalformedHeader,
    OffsetOutOfRange,
    OffsetExceedsParent,
    InvalidPropertyListLength,
    PropertyListLengthMismatch,
    UnknownPropertyCode,
    UnknownArrayEncoding,
    DecompressionFailed,
    NameTooLong,
    MissingNestedListTerminator,
    /// Input ended inside a record header or property payload.
    Truncated,
    /// A record name is not valid UTF-8.
    InvalidName,
    /// Input was well-formed but exceeded a configured limit.
    LimitExceeded,
    /// Writer output cannot be addressed with 32-bit offsets.
    OutputTooLarge,
    /// Strict property accessor called on the wrong variant.
    TypeMismatch,
    /// Invalid tree edit (unknown record or cyclic insert).
    InvalidTreeEdit,
    /// Header inspection rejected the file.
    Unsupported,
}

/// Every failure the crate can report.
///
/// All variants are fatal to the current call. A failed decode never hands
/// back a partially built document.
#[derive(Debug, Error)]
pub enum Error {
    // === I/O ===
    #[error("I/O failure on {path:?}: {source}")]
    IoFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // === Header ===
    #[error("malformed header: file is {len} bytes (expected at least 27 and at most 4 GiB)")]
    MalformedHeader { len: usize },

    #[error("unsupported file: {reason}")]
    UnsupportedFile { reason: String },

    // === Record structure ===
    #[error("record {record:?} end offset {end_offset} is beyond the file size {file_len}")]
    OffsetOutOfRange {
        record: String,
        end_offset: u32,
        file_len: usize,
    },

    #[error("record {record:?} end offset {end_offset} does not nest inside its parent ending at {parent_end}")]
    OffsetExceedsParent {
        record: String,
        end_offset: u32,
        parent_end: usize,
    },

    #[error("record {record:?} property list of {property_list_len} bytes at {position} overruns its end offset {end_offset}")]
    InvalidPropertyListLength {
        record: String,
        position: usize,
        property_list_len: u32,
        end_offset: u32,
    },

    #[error("record {record:?} declares {declared} property bytes but {actual} were decoded")]
    PropertyListLengthMismatch {
        record: String,
        declared: u32,
        actual: usize,
    },

    #[error("record {record:?} nested list is not terminated before offset {end_offset}")]
    MissingNestedListTerminator { record: String, end_offset: usize },

    #[error("record nesting depth {depth} exceeds maximum {max}")]
    NestingTooDeep { depth: usize, max: usize },

    // === Properties ===
    #[error("record {record:?} has unknown property code 0x{code:02x}")]
    UnknownPropertyCode { record: String, code: u8 },

    #[error("record {record:?} has array with unknown encoding {encoding}")]
    UnknownArrayEncoding { record: String, encoding: u32 },

    #[error("record {record:?} array decompression failed: {reason}")]
    DecompressionFailed { record: String, reason: String },

    #[error("unexpected end of input at {position} while reading {context}")]
    UnexpectedEof {
        context: &'static str,
        position: usize,
    },

    #[error("invalid UTF-8 in {field}")]
    InvalidUtf8 { field: &'static str },

    #[error("{field} length {len} exceeds maximum {max}")]
    LengthExceedsLimit {
        field: &'static str,
        len: usize,
        max: usize,
    },

    #[error("expected a {expected} property, found {found}")]
    PropertyTypeMismatch {
        expected: PropertyType,
        found: PropertyType,
    },

    // === Tree editing ===
    #[error("record name is {len} bytes, maximum is 255")]
    NameTooLong { len: usize },

    #[error("record {id:?} does not exist in this document")]
    RecordNotFound { id: RecordId },

    #[error("cannot insert record {id:?} beneath itself or one of its descendants")]
    CyclicInsert { id: RecordId },

    // === Encoding ===
    #[error("{field} value {len} does not fit in a 32-bit field")]
    OutputTooLarge { field: &'static str, len: usize },
}

impl Error {
    /// Returns the classification of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::IoFailure { .. } => ErrorKind::IoFailure,
            Error::MalformedHeader { .. } => ErrorKind::MalformedHeader,
            Error::UnsupportedFile { .. } => ErrorKind::Unsupported,
            Error::OffsetOutOfRange { .. } => ErrorKind::OffsetOutOfRange,
            Error::OffsetExceedsParent { .. } => ErrorKind::OffsetExceedsParent,
            Error::InvalidPropertyListLength { .. } => ErrorKind::InvalidPropertyListLength,
            Error::PropertyListLengthMismatch { .. } => ErrorKind::PropertyListLengthMismatch,
            Error::MissingNestedListTerminator { .. } => ErrorKind::MissingNestedListTerminator,
            Error::NestingTooDeep { .. } | Error::LengthExceedsLimit { .. } => {
                ErrorKind::LimitExceeded
            }
            Error::UnknownPropertyCode { .. } => ErrorKind::UnknownPropertyCode,
            Error::UnknownArrayEncoding { .. } => ErrorKind::UnknownArrayEncoding,
            Error::DecompressionFailed { .. } => ErrorKind::DecompressionFailed,
            Error::UnexpectedEof { .. } => ErrorKind::Truncated,
            Error::InvalidUtf8 { .. } => ErrorKind::InvalidName,
            Error::PropertyTypeMismatch { .. } => ErrorKind::TypeMismatch,
            Error::NameTooLong { .. } => ErrorKind::NameTooLong,
            Error::RecordNotFound { .. } | Error::CyclicInsert { .. } => {
                ErrorKind::InvalidTreeEdit
            }
            Error::OutputTooLarge { .. } => ErrorKind::OutputTooLarge,
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_mapping() {
        let err = Error::NameTooLong { len: 256 };
        assert_eq!(err.kind(), ErrorKind::NameTooLong);

        let err = Error::UnexpectedEof {
            context: "name",
            position: 40,
        };
        assert_eq!(err.kind(), ErrorKind::Truncated);

        let err = Error::InvalidUtf8 {
            field: "record name",
        };
        assert_eq!(err.kind(), ErrorKind::InvalidName);

        let err = Error::NestingTooDeep { depth: 9, max: 8 };
        assert_eq!(err.kind(), ErrorKind::LimitExceeded);
    }

    #[test]
    fn test_messages_carry_context() {
        let err = Error::PropertyListLengthMismatch {
            record: "Geometry".to_string(),
            declared: 12,
            actual: 11,
        };
        let msg = err.to_string();
        assert!(msg.contains("Geometry"));
        assert!(msg.contains("12"));
        assert!(msg.contains("11"));
    }
}
