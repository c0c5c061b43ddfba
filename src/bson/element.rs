// Element type tags and their payload layouts.

/// Document terminator byte.
pub const TERMINATOR: u8 = 0x00;

/// Size of an object identifier payload.
pub const OBJECT_ID_LEN: usize = 12;

/// Wire type tag of an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ElementType {
    Double = 0x01,
    String = 0x02,
    Document = 0x03,
    Array = 0x04,
    Binary = 0x05,
    Undefined = 0x06,
    ObjectId = 0x07,
    Boolean = 0x08,
    DateTime = 0x09,
    Null = 0x0A,
    Regex = 0x0B,
    DbPointer = 0x0C,
    Code = 0x0D,
    Symbol = 0x0E,
    CodeWithScope = 0x0F,
    Int32 = 0x10,
    Timestamp = 0x11,
    Int64 = 0x12,
}

impl ElementType {
    /// Map a raw tag to its element type. `None` for unknown tags and the
    /// terminator.
    pub fn from_tag(tag: u8) -> Option<Self> {
        Some(match tag {
            0x01 => Self::Double,
            0x02 => Self::String,
            0x03 => Self::Document,
            0x04 => Self::Array,
            0x05 => Self::Binary,
            0x06 => Self::Undefined,
            0x07 => Self::ObjectId,
            0x08 => Self::Boolean,
            0x09 => Self::DateTime,
            0x0A => Self::Null,
            0x0B => Self::Regex,
            0x0C => Self::DbPointer,
            0x0D => Self::Code,
            0x0E => Self::Symbol,
            0x0F => Self::CodeWithScope,
            0x10 => Self::Int32,
            0x11 => Self::Timestamp,
            0x12 => Self::Int64,
            _ => return None,
        })
    }

    #[inline]
    pub fn tag(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Double => "double",
            Self::String => "string",
            Self::Document => "document",
            Self::Array => "array",
            Self::Binary => "binary",
            Self::Undefined => "undefined",
            Self::ObjectId => "objectid",
            Self::Boolean => "boolean",
            Self::DateTime => "datetime",
            Self::Null => "null",
            Self::Regex => "regex",
            Self::DbPointer => "dbpointer",
            Self::Code => "code",
            Self::Symbol => "symbol",
            Self::CodeWithScope => "code_w_scope",
            Self::Int32 => "int32",
            Self::Timestamp => "timestamp",
            Self::Int64 => "int64",
        }
    }

    /// True for the two container types that recurse into a sub-document.
    #[inline]
    pub fn is_container(self) -> bool {
        matches!(self, Self::Document | Self::Array)
    }
}
