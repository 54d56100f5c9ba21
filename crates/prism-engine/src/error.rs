use std::fmt;

use crate::layout::FormatRevision;

/// Failure at the CPU/GPU byte boundary.
///
/// The shading math itself has no error channel; these errors only arise where raw
/// bytes are validated or reinterpreted as records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    /// A field table entry does not start where the previous one ended.
    FieldOffset {
        record: &'static str,
        field: &'static str,
        expected: usize,
        actual: usize,
    },
    /// The field table does not cover the whole record.
    SizeMismatch {
        record: &'static str,
        expected: usize,
        actual: usize,
    },
    /// The record size is not a multiple of the reader-side alignment.
    Misaligned {
        record: &'static str,
        size: usize,
        align: usize,
    },
    /// A byte buffer does not hold a whole number of records.
    Truncated {
        record: &'static str,
        stride: usize,
        len: usize,
    },
    /// A record of one revision was used where another was expected.
    RevisionMismatch {
        record: &'static str,
        expected: FormatRevision,
        actual: FormatRevision,
    },
    /// A format revision string could not be parsed.
    UnknownRevision(String),
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayoutError::FieldOffset { record, field, expected, actual } => write!(
                f,
                "{record}.{field}: expected offset {expected}, field table says {actual}"
            ),
            LayoutError::SizeMismatch { record, expected, actual } => write!(
                f,
                "{record}: record is {expected} bytes but fields cover {actual}"
            ),
            LayoutError::Misaligned { record, size, align } => write!(
                f,
                "{record}: size {size} is not a multiple of the {align}-byte alignment"
            ),
            LayoutError::Truncated { record, stride, len } => write!(
                f,
                "{record}: {len} bytes is not a whole number of {stride}-byte records"
            ),
            LayoutError::RevisionMismatch { record, expected, actual } => write!(
                f,
                "{record}: record belongs to format {actual}, pipeline expects {expected}"
            ),
            LayoutError::UnknownRevision(s) => write!(f, "unknown format revision {s:?}"),
        }
    }
}

impl std::error::Error for LayoutError {}
