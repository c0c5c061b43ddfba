// Bounds-checked sequential reader over an immutable byte range.
//
// All multi-byte integers are little-endian. Every read checks the
// remaining length before touching the slice (`pos + width > len` fails),
// so a failed read never returns partial data and never advances.

use super::element::OBJECT_ID_LEN;
use super::error::{DecodeError, ErrorKind};

#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Absolute read position.
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Total length of the viewed range.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    #[inline]
    fn take(&mut self, width: usize) -> Result<&'a [u8], DecodeError> {
        let remaining = self.remaining();
        if width > remaining {
            return Err(DecodeError::truncated(self.pos, width, remaining));
        }
        let start = self.pos;
        self.pos += width;
        Ok(&self.data[start..self.pos])
    }

    #[inline]
    fn take_array<const N: usize>(&mut self) -> Result<&'a [u8; N], DecodeError> {
        let data: &'a [u8] = self.data;
        match data[self.pos..].first_chunk::<N>() {
            Some(chunk) => {
                self.pos += N;
                Ok(chunk)
            }
            None => Err(DecodeError::truncated(self.pos, N, self.remaining())),
        }
    }

    pub fn read_u8(&mut self) -> Result<u8, DecodeError> {
        Ok(self.take_array::<1>()?[0])
    }

    pub fn read_u32(&mut self) -> Result<u32, DecodeError> {
        let b = self.take_array::<4>()?;
        Ok(u32::from(b[0])
            | (u32::from(b[1]) << 8)
            | (u32::from(b[2]) << 16)
            | (u32::from(b[3]) << 24))
    }

    pub fn read_i32(&mut self) -> Result<i32, DecodeError> {
        Ok(self.read_u32()? as i32)
    }

    /// Two 32-bit reads, low word first.
    pub fn read_u64(&mut self) -> Result<u64, DecodeError> {
        // Check the full width up front so a short input fails at the
        // start of the field rather than half-way through it.
        let remaining = self.remaining();
        if remaining < 8 {
            return Err(DecodeError::truncated(self.pos, 8, remaining));
        }
        let lo = u64::from(self.read_u32()?);
        let hi = u64::from(self.read_u32()?);
        Ok(lo | (hi << 32))
    }

    pub fn read_i64(&mut self) -> Result<i64, DecodeError> {
        Ok(self.read_u64()? as i64)
    }

    /// IEEE-754 double, decoded little-endian independent of the host.
    pub fn read_f64(&mut self) -> Result<f64, DecodeError> {
        Ok(f64::from_le_bytes(*self.take_array::<8>()?))
    }

    /// NUL-terminated string; returns the bytes before the terminator and
    /// advances past it.
    pub fn read_cstring(&mut self) -> Result<&'a [u8], DecodeError> {
        let rest = &self.data[self.pos..];
        match rest.iter().position(|&b| b == 0) {
            Some(nul) => {
                let s = &rest[..nul];
                self.pos += nul + 1;
                Ok(s)
            }
            None => Err(DecodeError::new(
                ErrorKind::UnterminatedString,
                self.pos,
                format!("no NUL terminator in {} remaining bytes", rest.len()),
            )),
        }
    }

    /// Reads a 32-bit length `L`, then `L` bytes of which the last (the
    /// stored NUL) is dropped.
    pub fn read_string(&mut self) -> Result<&'a [u8], DecodeError> {
        let len_offset = self.pos;
        let len = self.read_u32()? as usize;
        if len == 0 {
            return Err(DecodeError::new(
                ErrorKind::MalformedLength,
                len_offset,
                "string length 0 cannot hold its terminator",
            ));
        }
        let body = self.take(len)?;
        Ok(&body[..len - 1])
    }

    /// Reads a 32-bit length `L`, then returns the next `L` bytes verbatim.
    pub fn read_binary(&mut self) -> Result<&'a [u8], DecodeError> {
        let len = self.read_u32()? as usize;
        self.take(len)
    }

    pub fn read_fixed<const N: usize>(&mut self) -> Result<&'a [u8; N], DecodeError> {
        self.take_array::<N>()
    }

    pub fn read_object_id(&mut self) -> Result<&'a [u8; OBJECT_ID_LEN], DecodeError> {
        self.read_fixed::<OBJECT_ID_LEN>()
    }

    /// Advance over `n` bytes without inspecting them.
    pub fn skip(&mut self, n: usize) -> Result<(), DecodeError> {
        self.take(n).map(|_| ())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
