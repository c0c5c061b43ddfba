// Growable byte buffer used to stage binary input before decoding.
//
// Capacity is tracked explicitly rather than delegated to `Vec`'s growth
// policy: single-byte appends double the capacity, bulk appends grow to the
// exact size required. The backing store is always initialized up to the
// capacity, so `set_size` can expose bytes that were never appended.

use std::ffi::CStr;
use std::fmt;
use std::io::{self, Read};
use std::ops::{Index, IndexMut};

/// Largest chunk requested from a reader in one `read` call.
const READ_CHUNK: usize = 64 * 1024; // 64 KiB

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum BufferError {
    /// The allocator could not provide the requested capacity.
    #[error("out of memory: cannot grow buffer to {requested} bytes")]
    OutOfMemory { requested: usize },
}

impl From<BufferError> for io::Error {
    fn from(e: BufferError) -> io::Error {
        io::Error::new(io::ErrorKind::OutOfMemory, e)
    }
}

// ---------------------------------------------------------------------------
// DataBuffer
// ---------------------------------------------------------------------------

/// Owned, contiguous byte store with amortized append growth.
///
/// The buffer is move-only: it implements neither `Clone` nor `Copy`.
/// Every operation that may allocate returns `Result`, and a failed
/// allocation leaves the buffer exactly as it was.
pub struct DataBuffer {
    /// Backing store; its length is the logical capacity.
    storage: Vec<u8>,
    /// Number of valid bytes at the front of `storage`.
    used: usize,
}

impl DataBuffer {
    /// Default initial capacity (128 KiB).
    pub const BUFSIZE: usize = 128 * 1024;

    /// Create a buffer with the default initial capacity.
    pub fn new() -> Self {
        Self::with_capacity(Self::BUFSIZE)
    }

    /// Create a buffer with exactly `capacity` bytes of backing store.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            storage: vec![0u8; capacity],
            used: 0,
        }
    }

    /// Guarantee `capacity() >= bytes` without touching the valid length.
    ///
    /// Grows the backing store to exactly `bytes` when it is currently
    /// smaller.
    pub fn reserve(&mut self, bytes: usize) -> Result<&mut Self, BufferError> {
        if bytes > self.capacity() {
            self.grow_to(bytes)?;
        }
        Ok(self)
    }

    /// Force the valid length to `size`.
    ///
    /// Returns `Some(size)` if the backing store can hold it, `None`
    /// otherwise (state unchanged). Newly exposed bytes are not zeroed.
    pub fn set_size(&mut self, size: usize) -> Option<usize> {
        if size > self.capacity() {
            return None;
        }
        self.used = size;
        Some(size)
    }

    // -- assign ------------------------------------------------------------

    pub fn assign_byte(&mut self, byte: u8) -> Result<&mut Self, BufferError> {
        self.clear();
        self.push(byte)
    }

    pub fn assign(&mut self, data: &[u8]) -> Result<&mut Self, BufferError> {
        self.clear();
        self.append(data)
    }

    /// Replace the contents with a NUL-terminated string (terminator excluded).
    pub fn assign_cstr(&mut self, s: &CStr) -> Result<&mut Self, BufferError> {
        self.clear();
        self.append_cstr(s)
    }

    pub fn assign_str(&mut self, s: &str) -> Result<&mut Self, BufferError> {
        self.clear();
        self.append_str(s)
    }

    /// Replace the contents with `iter`, appending one element at a time.
    pub fn assign_iter<I>(&mut self, iter: I) -> Result<&mut Self, BufferError>
    where
        I: IntoIterator,
        I::Item: Into<u8>,
    {
        self.clear();
        self.append_iter(iter)
    }

    // -- append ------------------------------------------------------------

    /// Append a single byte, doubling the capacity when the buffer is full.
    pub fn push(&mut self, byte: u8) -> Result<&mut Self, BufferError> {
        if self.used == self.capacity() {
            let doubled = self
                .capacity()
                .checked_mul(2)
                .ok_or(BufferError::OutOfMemory {
                    requested: usize::MAX,
                })?
                .max(1);
            self.grow_to(doubled)?;
        }
        self.storage[self.used] = byte;
        self.used += 1;
        Ok(self)
    }

    /// Append a block of bytes, growing to exactly fit when needed.
    pub fn append(&mut self, data: &[u8]) -> Result<&mut Self, BufferError> {
        let end = self
            .used
            .checked_add(data.len())
            .ok_or(BufferError::OutOfMemory {
                requested: usize::MAX,
            })?;
        if end > self.capacity() {
            self.grow_to(end)?;
        }
        self.storage[self.used..end].copy_from_slice(data);
        self.used = end;
        Ok(self)
    }

    pub fn append_buffer(&mut self, other: &DataBuffer) -> Result<&mut Self, BufferError> {
        self.append(other.as_slice())
    }

    /// Append a NUL-terminated string (terminator excluded).
    pub fn append_cstr(&mut self, s: &CStr) -> Result<&mut Self, BufferError> {
        self.append(s.to_bytes())
    }

    pub fn append_str(&mut self, s: &str) -> Result<&mut Self, BufferError> {
        self.append(s.as_bytes())
    }

    /// Append every element of `iter` through [`push`](Self::push).
    pub fn append_iter<I>(&mut self, iter: I) -> Result<&mut Self, BufferError>
    where
        I: IntoIterator,
        I::Item: Into<u8>,
    {
        for item in iter {
            self.push(item.into())?;
        }
        Ok(self)
    }

    /// Stage up to `max` bytes from `reader`, stopping early at EOF.
    ///
    /// Capacity grows before each read to hold what is read so far plus
    /// the pending request (at most one 64 KiB chunk), so a short read can
    /// leave up to one chunk of spare capacity. Returns the number of bytes
    /// appended.
    pub fn append_from_reader<R: Read>(&mut self, reader: &mut R, max: usize) -> io::Result<usize> {
        let mut total = 0usize;
        while total < max {
            let want = (max - total).min(READ_CHUNK);
            let end = self.used.checked_add(want).ok_or(BufferError::OutOfMemory {
                requested: usize::MAX,
            })?;
            if end > self.capacity() {
                self.grow_to(end)?;
            }
            let n = match reader.read(&mut self.storage[self.used..end]) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };
            self.used += n;
            total += n;
        }
        Ok(total)
    }

    // -- access ------------------------------------------------------------

    /// Valid bytes starting at `offset`.
    ///
    /// `offset` is the caller's responsibility; an offset past `len()`
    /// panics like any out-of-range slice.
    pub fn data(&self, offset: usize) -> &[u8] {
        &self.storage[offset..self.used]
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.storage[..self.used]
    }

    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.storage[..self.used]
    }

    /// Position of the first `byte` at or after `start`.
    pub fn find(&self, byte: u8, start: usize) -> Option<usize> {
        if start >= self.used {
            return None;
        }
        self.storage[start..self.used]
            .iter()
            .position(|&b| b == byte)
            .map(|i| start + i)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.used
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.used == 0
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.storage.len()
    }

    /// Drop all valid bytes; capacity is retained.
    pub fn clear(&mut self) {
        self.used = 0;
    }

    /// Shrink the valid length by `bytes` from the tail.
    ///
    /// No-op when `bytes > len()`. Bytes are never moved, so this cannot be
    /// used to discard a prefix.
    pub fn cut(&mut self, bytes: usize) {
        if bytes <= self.used {
            self.used -= bytes;
        }
    }

    fn grow_to(&mut self, new_capacity: usize) -> Result<(), BufferError> {
        let additional = new_capacity - self.storage.len();
        self.storage
            .try_reserve_exact(additional)
            .map_err(|_| BufferError::OutOfMemory {
                requested: new_capacity,
            })?;
        self.storage.resize(new_capacity, 0);
        log::trace!("buffer grown to {new_capacity} bytes");
        Ok(())
    }
}

impl Default for DataBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for DataBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataBuffer")
            .field("len", &self.used)
            .field("capacity", &self.capacity())
            .finish()
    }
}

impl AsRef<[u8]> for DataBuffer {
    fn as_ref(&self) -> &[u8] {
        self.as_slice()
    }
}

impl Index<usize> for DataBuffer {
    type Output = u8;

    fn index(&self, pos: usize) -> &u8 {
        &self.as_slice()[pos]
    }
}

impl IndexMut<usize> for DataBuffer {
    fn index_mut(&mut self, pos: usize) -> &mut u8 {
        &mut self.as_mut_slice()[pos]
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
