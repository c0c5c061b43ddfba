// Binary document format: length-prefixed documents of typed, named
// elements.
//
// # Modules
//
// - `element`: Type tags and payload constants
// - `cursor`: Bounds-checked little-endian reader
// - `error`: Decode/encode error types
// - `decoder`: Recursive document decoder into a `Value` tree
// - `encoder`: Inverse encoder from a `Value` tree

pub mod cursor;
pub mod decoder;
pub mod element;
pub mod encoder;
pub mod error;

// Re-export key types for convenience.
pub use cursor::Cursor;
pub use decoder::{
    CodeWithScope, DecodeOptions, DecodeStats, Decoder, ElementInfo, RootContext, decode,
    decode_to_value, decode_with_options,
};
pub use element::ElementType;
pub use encoder::{Encoder, encode};
pub use error::{DecodeError, EncodeError, ErrorKind};
