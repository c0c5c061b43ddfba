// Decode error type shared by the cursor and the document decoder.

use std::fmt;

use crate::buffer::BufferError;

/// Classification of a decode failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A fixed-width or length-prefixed field extends past the input.
    Truncated,
    /// A declared length is inconsistent with the bytes available.
    MalformedLength,
    /// No NUL terminator before the end of input.
    UnterminatedString,
    /// Type tag not defined by the format.
    UnknownType(u8),
    /// Type tag defined by the format but not decodable here.
    UnsupportedType(u8),
    /// Nesting deeper than the configured maximum.
    DepthExceeded,
    /// Array key parsed to an index above the configured maximum.
    IndexOutOfRange,
    /// Document body did not end exactly at its declared length.
    LengthMismatch,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Truncated => write!(f, "truncated input"),
            Self::MalformedLength => write!(f, "malformed length"),
            Self::UnterminatedString => write!(f, "unterminated string"),
            Self::UnknownType(tag) => write!(f, "unknown type tag {tag:#04X}"),
            Self::UnsupportedType(tag) => write!(f, "unsupported type tag {tag:#04X}"),
            Self::DepthExceeded => write!(f, "nesting too deep"),
            Self::IndexOutOfRange => write!(f, "array index out of range"),
            Self::LengthMismatch => write!(f, "document length mismatch"),
        }
    }
}

/// A terminal decode failure: what went wrong and where.
///
/// `offset` is the absolute byte position at which the failing read
/// started.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind} at offset {offset}: {message}")]
pub struct DecodeError {
    pub kind: ErrorKind,
    pub offset: usize,
    pub message: String,
}

impl DecodeError {
    pub fn new(kind: ErrorKind, offset: usize, message: impl Into<String>) -> Self {
        Self {
            kind,
            offset,
            message: message.into(),
        }
    }

    pub(crate) fn truncated(offset: usize, width: usize, remaining: usize) -> Self {
        Self::new(
            ErrorKind::Truncated,
            offset,
            format!("need {width} bytes, {remaining} remaining"),
        )
    }
}

/// Failure to encode a value tree.
#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    /// Only maps and arrays can be encoded as a top-level document.
    #[error("root value must be a map or an array, got {0}")]
    NotADocument(&'static str),
    /// Keys are NUL-terminated on the wire.
    #[error("key contains an interior NUL byte: {0:?}")]
    InteriorNul(String),
    /// A length does not fit in the 32-bit wire field.
    #[error("{0} bytes do not fit in a 32-bit length field")]
    TooLarge(usize),
    #[error(transparent)]
    Buffer(#[from] BufferError),
}
