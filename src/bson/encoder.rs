// Encoder producing the wire format from a `Value` tree.
//
// Inverse of the decoder on values: `decode(encode(v))` yields `v` again
// when decoded with the matching root context. Each value maps to a single
// canonical tag, so the bytes are not necessarily those a tree was decoded
// from.

use super::element::{ElementType, TERMINATOR};
use super::error::EncodeError;
use crate::buffer::DataBuffer;
use crate::value::Value;

/// Initial staging capacity; the buffer grows as needed.
const INITIAL_CAPACITY: usize = 256;

/// Stages encoded documents in a [`DataBuffer`].
pub struct Encoder {
    buf: DataBuffer,
}

impl Encoder {
    pub fn new() -> Self {
        Self {
            buf: DataBuffer::with_capacity(INITIAL_CAPACITY),
        }
    }

    /// Append `root` as one top-level document.
    ///
    /// On error the bytes written so far for this document remain in the
    /// buffer; the caller should discard the encoder.
    pub fn write_document(&mut self, root: &Value) -> Result<(), EncodeError> {
        let start = self.buf.len();
        self.buf.append(&[0u8; 4])?;

        match root {
            Value::Map(map) => {
                for (key, value) in map.iter() {
                    self.write_element(key.as_bytes(), value)?;
                }
            }
            Value::Array(items) => {
                for (index, value) in items.iter().enumerate() {
                    self.write_element(index.to_string().as_bytes(), value)?;
                }
            }
            other => return Err(EncodeError::NotADocument(other.type_name())),
        }

        self.buf.push(TERMINATOR)?;
        let len = wire_len(self.buf.len() - start)?;
        self.buf.as_mut_slice()[start..start + 4].copy_from_slice(&len.to_le_bytes());
        Ok(())
    }

    fn write_element(&mut self, key: &[u8], value: &Value) -> Result<(), EncodeError> {
        if key.contains(&0) {
            return Err(EncodeError::InteriorNul(
                String::from_utf8_lossy(key).into_owned(),
            ));
        }

        let element_type = match value {
            Value::Undef => ElementType::Null,
            Value::Int(_) => ElementType::Int64,
            Value::Float(_) => ElementType::Double,
            Value::Bytes(_) => ElementType::String,
            Value::Map(_) => ElementType::Document,
            Value::Array(_) => ElementType::Array,
        };
        self.buf.push(element_type.tag())?;
        self.buf.append(key)?;
        self.buf.push(0)?;

        match value {
            Value::Undef => {}
            Value::Int(v) => {
                self.buf.append(&v.to_le_bytes())?;
            }
            Value::Float(v) => {
                self.buf.append(&v.to_le_bytes())?;
            }
            Value::Bytes(bytes) => {
                // Stored length includes the trailing NUL.
                let len = wire_len(bytes.len() + 1)?;
                self.buf.append(&len.to_le_bytes())?;
                self.buf.append(bytes)?;
                self.buf.push(0)?;
            }
            Value::Map(_) | Value::Array(_) => self.write_document(value)?,
        }
        Ok(())
    }

    /// Encoded bytes written so far.
    pub fn as_bytes(&self) -> &[u8] {
        self.buf.as_slice()
    }

    pub fn into_buffer(self) -> DataBuffer {
        self.buf
    }
}

impl Default for Encoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Lengths are signed 32-bit on the wire.
fn wire_len(len: usize) -> Result<u32, EncodeError> {
    i32::try_from(len)
        .map(|v| v as u32)
        .map_err(|_| EncodeError::TooLarge(len))
}

/// Encode `root` (a map or an array) as one document.
pub fn encode(root: &Value) -> Result<Vec<u8>, EncodeError> {
    let mut encoder = Encoder::new();
    encoder.write_document(root)?;
    Ok(encoder.as_bytes().to_vec())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
