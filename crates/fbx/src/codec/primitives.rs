//! Primitive encoding/decoding for the binary FBX format.
//!
//! All integers and floats are fixed-width little-endian.

use crate::error::{Error, Result};

// =============================================================================
// DECODING
// =============================================================================

/// Reader for decoding binary data.
///
/// Wraps a byte slice and provides methods for reading primitives
/// with bounds checking. Positions are absolute offsets into the slice.
#[derive(Debug, Clone)]
pub struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    /// Creates a new reader from a byte slice.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Returns a reader over the same data that cannot read at or past
    /// `end`, starting at the current position.
    pub fn bounded(&self, end: usize) -> Reader<'a> {
        let end = end.min(self.data.len());
        Reader {
            data: &self.data[..end],
            pos: self.pos.min(end),
        }
    }

    /// Returns the current position in the data.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Moves to an absolute position, clamped to the end of the data.
    pub fn seek(&mut self, pos: usize) {
        self.pos = pos.min(self.data.len());
    }

    /// Total length of the underlying data.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns the number of remaining bytes.
    pub fn remaining_len(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Returns true if all data has been consumed.
    pub fn is_empty(&self) -> bool {
        self.pos >= self.data.len()
    }

    /// Reads a single byte.
    #[inline]
    pub fn read_byte(&mut self, context: &'static str) -> Result<u8> {
        let [byte] = self.read_array::<1>(context)?;
        Ok(byte)
    }

    /// Reads exactly n bytes.
    #[inline]
    pub fn read_bytes(&mut self, n: usize, context: &'static str) -> Result<&'a [u8]> {
        if n > self.remaining_len() {
            return Err(Error::UnexpectedEof {
                context,
                position: self.pos,
            });
        }
        let bytes = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(bytes)
    }

    #[inline]
    fn read_array<const N: usize>(&mut self, context: &'static str) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_bytes(N, context)?);
        Ok(out)
    }

    #[inline]
    pub fn read_u32(&mut self, context: &'static str) -> Result<u32> {
        self.read_array::<4>(context).map(u32::from_le_bytes)
    }

    #[inline]
    pub fn read_i16(&mut self, context: &'static str) -> Result<i16> {
        self.read_array::<2>(context).map(i16::from_le_bytes)
    }

    #[inline]
    pub fn read_i32(&mut self, context: &'static str) -> Result<i32> {
        self.read_array::<4>(context).map(i32::from_le_bytes)
    }

    #[inline]
    pub fn read_i64(&mut self, context: &'static str) -> Result<i64> {
        self.read_array::<8>(context).map(i64::from_le_bytes)
    }

    #[inline]
    pub fn read_f32(&mut self, context: &'static str) -> Result<f32> {
        self.read_array::<4>(context).map(f32::from_le_bytes)
    }

    #[inline]
    pub fn read_f64(&mut self, context: &'static str) -> Result<f64> {
        self.read_array::<8>(context).map(f64::from_le_bytes)
    }

    /// Reads a `u32`-length-prefixed byte blob.
    pub fn read_blob(&mut self, context: &'static str) -> Result<&'a [u8]> {
        let len = self.read_u32(context)? as usize;
        self.read_bytes(len, context)
    }
}

// =============================================================================
// ENCODING
// =============================================================================

/// Writer for encoding binary data.
///
/// Supports reserving a `u32` slot whose value is only known once later
/// content has been appended, and patching it in place afterwards.
#[derive(Debug, Clone, Default)]
pub struct Writer {
    buf: Vec<u8>,
}

impl Writer {
    /// Creates a new writer.
    pub fn new() -> Self {
        Self { buf: Vec::new() }
    }

    /// Creates a new writer with capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    /// Returns the written bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    /// Returns a reference to the written bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Returns the number of bytes written.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Returns true if no bytes have been written.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Writes a single byte.
    #[inline]
    pub fn write_byte(&mut self, byte: u8) {
        self.buf.push(byte);
    }

    /// Writes raw bytes.
    #[inline]
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    #[inline]
    pub fn write_u32(&mut self, value: u32) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    #[inline]
    pub fn write_i16(&mut self, value: i16) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    #[inline]
    pub fn write_i32(&mut self, value: i32) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    #[inline]
    pub fn write_i64(&mut self, value: i64) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    #[inline]
    pub fn write_f32(&mut self, value: f32) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    #[inline]
    pub fn write_f64(&mut self, value: f64) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    /// Writes a `u32`-length-prefixed byte blob.
    pub fn write_blob(&mut self, bytes: &[u8], field: &'static str) -> Result<()> {
        self.write_u32(to_u32(bytes.len(), field)?);
        self.buf.extend_from_slice(bytes);
        Ok(())
    }

    /// Appends a zeroed `u32` placeholder and returns its offset.
    pub fn reserve_u32(&mut self) -> usize {
        let at = self.buf.len();
        self.write_u32(0);
        at
    }

    /// Overwrites the `u32` at `at`, which must come from
    /// [`Writer::reserve_u32`].
    pub fn patch_u32(&mut self, at: usize, value: u32) {
        self.buf[at..at + 4].copy_from_slice(&value.to_le_bytes());
    }

    /// Current length as a 32-bit offset.
    pub fn offset(&self) -> Result<u32> {
        to_u32(self.buf.len(), "offset")
    }
}

/// Narrows a length or offset to the format's 32-bit fields.
pub fn to_u32(value: usize, field: &'static str) -> Result<u32> {
    u32::try_from(value).map_err(|_| Error::OutputTooLarge { field, len: value })
}
