//! zlib compression for array payloads.
//!
//! Arrays with encoding 1 hold a zlib stream (deflate with zlib header and
//! Adler-32 trailer) that inflates to exactly `length * element_width`
//! bytes.

use std::io::{Read, Write};

use flate2::Compression;
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use thiserror::Error;

/// Upper bound on the buffer reserved before inflating. Larger outputs
/// grow as data actually arrives.
const PREALLOC_LIMIT: usize = 16 * 1024 * 1024;

/// Failure of the compression collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompressionError {
    #[error("corrupt zlib stream: {0}")]
    Corrupt(String),

    #[error("inflated to {actual} bytes, expected {expected}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("deflate failed: {0}")]
    Deflate(String),
}

/// Inflates a zlib stream that must produce exactly `expected_len` bytes.
///
/// Never buffers more than `expected_len + 1` bytes of output.
pub fn inflate(src: &[u8], expected_len: usize) -> Result<Vec<u8>, CompressionError> {
    let mut out = Vec::with_capacity(expected_len.min(PREALLOC_LIMIT));
    let limit = (expected_len as u64).saturating_add(1);
    ZlibDecoder::new(src)
        .take(limit)
        .read_to_end(&mut out)
        .map_err(|e| CompressionError::Corrupt(e.to_string()))?;

    if out.len() != expected_len {
        return Err(CompressionError::LengthMismatch {
            expected: expected_len,
            actual: out.len(),
        });
    }
    Ok(out)
}

/// Compresses `src` into a zlib stream. `level` ranges from 0 (store) to 9.
pub fn deflate(src: &[u8], level: u32) -> Result<Vec<u8>, CompressionError> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::new(level.min(9)));
    encoder
        .write_all(src)
        .map_err(|e| CompressionError::Deflate(e.to_string()))?;
    encoder
        .finish()
        .map_err(|e| CompressionError::Deflate(e.to_string()))
}
