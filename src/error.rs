//! Errors raised while reading or writing a run descriptor
//!
//! All fallible functions in this crate return a [`DResult`], which wraps a
//! [`DescriptorError`] in an [`error_stack::Report`]. Readers attach a
//! [`SectionKind`](crate::sections::SectionKind) naming the section that
//! failed and, where a line is involved, a [`LineNumber`]. Both can be
//! recovered with [`Report::downcast_ref`](error_stack::Report::downcast_ref).
use std::fmt::Display;

use crate::format_specs::PError;
use crate::value::ValueKind;

/// Type alias for a `Result` with a [`DescriptorError`] report as the error type.
pub type DResult<T> = error_stack::Result<T, DescriptorError>;

/// An error related to the structure or content of a run descriptor
#[derive(Debug)]
pub enum DescriptorError {
    /// Indicates an error parsing a token as a given kind of value.
    Parse{ s: String, t: ValueKind, reason: String },

    /// Indicates that a value of one kind was given to a field of another kind.
    TypeMismatch{ expected: ValueKind, found: ValueKind },

    /// Indicates that the file does not have the expected layout: a missing
    /// delimiter, a count that disagrees with the lines on disk, or input
    /// ending early.
    Structural(String),

    /// Indicates that the in-memory document cannot be rendered, e.g. because
    /// a field was never set or a value does not fit its column.
    Serialization(String),

    /// Indicates a field name that the section does not have.
    UnknownField(String),

    /// Indicates an invalid column layout string
    Layout(PError),

    /// Indicates that the descriptor file could not be opened, read or written.
    Io,
}

impl Display for DescriptorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DescriptorError::Parse { s, t, reason } => {
                write!(f, "Could not parse '{s}' as a {t}: {reason}")
            },
            DescriptorError::TypeMismatch { expected, found } => {
                write!(f, "Expected a {expected} value, got a {found}")
            },
            DescriptorError::Structural(msg) => write!(f, "Malformed descriptor: {msg}"),
            DescriptorError::Serialization(msg) => write!(f, "Could not serialize descriptor: {msg}"),
            DescriptorError::UnknownField(name) => write!(f, "No field named '{name}'"),
            DescriptorError::Layout(e) => write!(f, "Invalid column layout: {e}"),
            DescriptorError::Io => write!(f, "Could not access the descriptor file"),
        }
    }
}

impl std::error::Error for DescriptorError {}

impl DescriptorError {
    pub(crate) fn structural<S: Into<String>>(msg: S) -> Self {
        Self::Structural(msg.into())
    }

    pub(crate) fn serialization<S: Into<String>>(msg: S) -> Self {
        Self::Serialization(msg.into())
    }

    /// `true` for [`DescriptorError::Parse`] and [`DescriptorError::TypeMismatch`]
    pub fn is_parse(&self) -> bool {
        matches!(self, Self::Parse { .. } | Self::TypeMismatch { .. })
    }

    /// `true` for [`DescriptorError::Structural`]
    pub fn is_structural(&self) -> bool {
        matches!(self, Self::Structural(_))
    }

    /// `true` for [`DescriptorError::Serialization`]
    pub fn is_serialization(&self) -> bool {
        matches!(self, Self::Serialization(_))
    }
}

/// A 1-based line number in the descriptor, attached to error reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineNumber(pub usize);

impl Display for LineNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "at line {}", self.0)
    }
}
