//! Binary codec for the kaspacore wire formats.
//!
//! Provides the `ByteSink` trait (little-endian integer and length-prefixed
//! byte-string writes over any append-only target), the `KasWriter` buffer
//! that implements it, and the cursor-based `KasReader`.
//!
//! All multi-byte integers are little-endian. Length-prefixed byte strings
//! ("var bytes") carry an 8-byte little-endian length, not a compact varint.

use crate::PrimitivesError;

// ---------------------------------------------------------------------------
// ByteSink
// ---------------------------------------------------------------------------

/// An append-only destination for serialized bytes.
///
/// Implementors only supply `write_bytes`; every fixed-width write is
/// provided on top of it. Both `KasWriter` and the streaming signing
/// hasher implement this trait, so the same field-writing code can build
/// a buffer or feed a hash.
pub trait ByteSink {
    /// Append raw bytes.
    fn write_bytes(&mut self, bytes: &[u8]);

    /// Append a single byte.
    fn write_u8(&mut self, val: u8) {
        self.write_bytes(&[val]);
    }

    /// Append a little-endian u16 (2 bytes).
    fn write_u16_le(&mut self, val: u16) {
        self.write_bytes(&val.to_le_bytes());
    }

    /// Append a little-endian u32 (4 bytes).
    fn write_u32_le(&mut self, val: u32) {
        self.write_bytes(&val.to_le_bytes());
    }

    /// Append a little-endian i32 (4 bytes, two's complement).
    fn write_i32_le(&mut self, val: i32) {
        self.write_bytes(&val.to_le_bytes());
    }

    /// Append a little-endian u64 (8 bytes).
    fn write_u64_le(&mut self, val: u64) {
        self.write_bytes(&val.to_le_bytes());
    }

    /// Append an 8-byte little-endian length followed by the bytes.
    fn write_var_bytes(&mut self, bytes: &[u8]) {
        self.write_u64_le(bytes.len() as u64);
        self.write_bytes(bytes);
    }

    /// Append the bytes in reverse order.
    ///
    /// Identifiers are stored in one byte order and hashed in the other
    /// by the legacy signature hash.
    fn write_reversed(&mut self, bytes: &[u8]) {
        let mut reversed = bytes.to_vec();
        reversed.reverse();
        self.write_bytes(&reversed);
    }
}

// ---------------------------------------------------------------------------
// KasReader
// ---------------------------------------------------------------------------

/// A cursor-based reader for kaspacore binary data.
///
/// Wraps a byte slice and maintains a read position. A failed read
/// leaves the position untouched.
pub struct KasReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> KasReader<'a> {
    /// Create a new reader positioned at the start of `data`.
    pub fn new(data: &'a [u8]) -> Self {
        KasReader { data, pos: 0 }
    }

    /// Read `n` bytes and advance the position.
    ///
    /// # Arguments
    /// * `n` - Number of bytes to read.
    ///
    /// # Returns
    /// A byte slice of length `n`, or `UnexpectedEof` if fewer remain.
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8], PrimitivesError> {
        if n > self.remaining() {
            return Err(PrimitivesError::UnexpectedEof {
                needed: n,
                remaining: self.remaining(),
            });
        }
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    /// Read exactly `N` bytes into a fixed-size array.
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N], PrimitivesError> {
        let bytes = self.read_bytes(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(bytes);
        Ok(out)
    }

    /// Read a single byte.
    pub fn read_u8(&mut self) -> Result<u8, PrimitivesError> {
        Ok(self.read_array::<1>()?[0])
    }

    /// Read a little-endian u16.
    pub fn read_u16_le(&mut self) -> Result<u16, PrimitivesError> {
        Ok(u16::from_le_bytes(self.read_array()?))
    }

    /// Read a little-endian u32.
    pub fn read_u32_le(&mut self) -> Result<u32, PrimitivesError> {
        Ok(u32::from_le_bytes(self.read_array()?))
    }

    /// Read a little-endian i32.
    pub fn read_i32_le(&mut self) -> Result<i32, PrimitivesError> {
        Ok(i32::from_le_bytes(self.read_array()?))
    }

    /// Read a little-endian u64.
    pub fn read_u64_le(&mut self) -> Result<u64, PrimitivesError> {
        Ok(u64::from_le_bytes(self.read_array()?))
    }

    /// Read an 8-byte little-endian length followed by that many bytes.
    ///
    /// The position is only advanced when both the length and the
    /// payload are available.
    pub fn read_var_bytes(&mut self) -> Result<&'a [u8], PrimitivesError> {
        let start = self.pos;
        let len = self.read_u64_le()?;
        let len = match usize::try_from(len) {
            Ok(len) if len <= self.remaining() => len,
            _ => {
                let remaining = self.remaining();
                self.pos = start;
                return Err(PrimitivesError::UnexpectedEof {
                    needed: usize::try_from(len).unwrap_or(usize::MAX),
                    remaining,
                });
            }
        };
        self.read_bytes(len)
    }

    /// Read `n` bytes and return them in reverse order.
    pub fn read_reversed(&mut self, n: usize) -> Result<Vec<u8>, PrimitivesError> {
        let mut out = self.read_bytes(n)?.to_vec();
        out.reverse();
        Ok(out)
    }

    /// Number of unread bytes.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Current read offset from the start of the data.
    pub fn position(&self) -> usize {
        self.pos
    }
}

// ---------------------------------------------------------------------------
// KasWriter
// ---------------------------------------------------------------------------

/// A growable, append-only buffer for kaspacore binary data.
#[derive(Debug, Clone, Default)]
pub struct KasWriter {
    buf: Vec<u8>,
}

impl KasWriter {
    /// Create a new empty writer.
    pub fn new() -> Self {
        KasWriter { buf: Vec::new() }
    }

    /// Create a new writer with a pre-allocated capacity.
    ///
    /// # Arguments
    /// * `capacity` - Initial byte capacity of the internal buffer.
    pub fn with_capacity(capacity: usize) -> Self {
        KasWriter { buf: Vec::with_capacity(capacity) }
    }

    /// Consume the writer and return the accumulated bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    /// Return a reference to the current buffer contents.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Return the number of bytes written so far.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Check if no bytes have been written.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }
}

impl ByteSink for KasWriter {
    fn write_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }
}
