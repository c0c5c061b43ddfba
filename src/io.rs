// File-level helpers: stage input into a `DataBuffer`, then decode it.
//
// The decoder itself never performs I/O. These helpers open a path or take
// an open reader, stage up to N bytes, and hand the staged bytes to the
// decoder. Optionally computes a SHA-256 of the staged input (feature-gated
// behind `file-io`).

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

#[cfg(feature = "file-io")]
use sha2::Digest;

use crate::bson::decoder::{self, DecodeOptions, DecodeStats};
use crate::bson::error::DecodeError;
use crate::buffer::{BufferError, DataBuffer};
use crate::value::Value;

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

/// Statistics returned by `parse_file()` and `parse_reader()`.
#[derive(Debug, Clone)]
pub struct ParseStats {
    /// Bytes staged from the input.
    pub input_size: u64,
    /// Decoder counters.
    pub decode: DecodeStats,
    /// SHA-256 of the staged input (if `file-io` feature is enabled).
    pub input_sha256: Option<[u8; 32]>,
}

impl ParseStats {
    /// Stats for a decode of `input`, hashing it when `file-io` is enabled.
    pub fn for_input(input: &[u8], decode: DecodeStats) -> Self {
        #[cfg(feature = "file-io")]
        let input_sha256 = Some(sha2::Sha256::digest(input).into());
        #[cfg(not(feature = "file-io"))]
        let input_sha256: Option<[u8; 32]> = None;

        Self {
            input_size: input.len() as u64,
            decode,
            input_sha256,
        }
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Error type for file-level parsing.
#[derive(Debug, thiserror::Error)]
pub enum IoError {
    /// I/O error (file open, read).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    /// Staging buffer could not grow.
    #[error("buffer error: {0}")]
    Buffer(#[from] BufferError),
    /// The staged bytes are not a valid document.
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),
}

// ---------------------------------------------------------------------------
// Staging
// ---------------------------------------------------------------------------

/// Read up to `read_bytes` bytes from `reader` into a fresh buffer.
///
/// Stops early at EOF. Capacity grows with the data actually read, so a
/// large `read_bytes` on a short stream does not over-allocate.
pub fn stage_reader<R: Read>(reader: &mut R, read_bytes: usize) -> Result<DataBuffer, IoError> {
    let mut buf = DataBuffer::with_capacity(read_bytes.min(DataBuffer::BUFSIZE));
    let n = buf.append_from_reader(reader, read_bytes)?;
    log::debug!("staged {n} of {read_bytes} requested bytes");
    Ok(buf)
}

/// Read an entire file into a fresh buffer.
pub fn stage_file(path: &Path) -> Result<DataBuffer, IoError> {
    let mut file = File::open(path)?;
    let size = usize::try_from(file.metadata()?.len()).map_err(|_| {
        io::Error::new(
            io::ErrorKind::FileTooLarge,
            format!("{} does not fit in memory", path.display()),
        )
    })?;
    log::debug!("staging {} ({size} bytes)", path.display());
    stage_reader(&mut file, size)
}

// ---------------------------------------------------------------------------
// parse_*
// ---------------------------------------------------------------------------

/// Decode a staged buffer into a fresh tree.
pub fn parse_buffer(
    buf: &DataBuffer,
    opts: &DecodeOptions,
) -> Result<(Value, ParseStats), IoError> {
    let mut root = Value::Undef;
    let decode = decoder::decode_with_options(buf.as_slice(), &mut root, opts)?;
    Ok((root, ParseStats::for_input(buf.as_slice(), decode)))
}

/// Stage up to `read_bytes` bytes from an open reader and decode them.
pub fn parse_reader<R: Read>(
    reader: &mut R,
    read_bytes: usize,
    opts: &DecodeOptions,
) -> Result<(Value, ParseStats), IoError> {
    let buf = stage_reader(reader, read_bytes)?;
    parse_buffer(&buf, opts)
}

/// Stage the whole file at `path` and decode it.
pub fn parse_file(path: &Path, opts: &DecodeOptions) -> Result<(Value, ParseStats), IoError> {
    let buf = stage_file(path)?;
    parse_buffer(&buf, opts)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
