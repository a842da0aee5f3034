//! Script chunk parsing and encoding.
//!
//! A script chunk is either an opcode or a data push with its associated
//! bytes. Decoding then re-encoding a script reproduces it byte for byte,
//! including non-minimal pushes, so chunks can be filtered and reassembled
//! without disturbing the parts that are kept.

use crate::opcodes::*;
use crate::ScriptError;

/// A single parsed element of a script.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScriptChunk {
    /// The opcode byte. For direct pushes (1-75 bytes), this is the length.
    pub op: u8,
    /// The data payload, if this chunk is a push operation.
    pub data: Option<Vec<u8>>,
}

impl ScriptChunk {
    /// Append the wire form of this chunk to `out`.
    ///
    /// The push prefix is derived from `op`, not from the data length, so
    /// a chunk produced by [`decode_script`] encodes to the bytes it came from.
    pub fn encode_into(&self, out: &mut Vec<u8>) {
        out.push(self.op);
        let data = match &self.data {
            Some(data) => data,
            None => return,
        };
        match self.op {
            OP_PUSHDATA1 => out.push(data.len() as u8),
            OP_PUSHDATA2 => out.extend_from_slice(&(data.len() as u16).to_le_bytes()),
            OP_PUSHDATA4 => out.extend_from_slice(&(data.len() as u32).to_le_bytes()),
            _ => {}
        }
        out.extend_from_slice(data);
    }
}

/// Decode raw script bytes into a vector of `ScriptChunk` values.
///
/// Handles OP_DATA_1..OP_DATA_75 (direct push) and OP_PUSHDATA1/2/4
/// (extended push). Every other byte is a bare opcode.
///
/// # Arguments
/// * `bytes` - The raw script bytes to decode.
///
/// # Returns
/// A vector of parsed chunks, or `DataTooSmall` if a push is truncated.
pub fn decode_script(bytes: &[u8]) -> Result<Vec<ScriptChunk>, ScriptError> {
    let mut chunks = Vec::new();
    let mut pos = 0;

    while pos < bytes.len() {
        let op = bytes[pos];
        pos += 1;

        let (prefix_len, length) = match op {
            OP_DATA_1..=OP_DATA_75 => (0, op as usize),
            OP_PUSHDATA1 => (1, read_len(bytes, pos, 1)?),
            OP_PUSHDATA2 => (2, read_len(bytes, pos, 2)?),
            OP_PUSHDATA4 => (4, read_len(bytes, pos, 4)?),
            _ => {
                chunks.push(ScriptChunk { op, data: None });
                continue;
            }
        };

        pos += prefix_len;
        if bytes.len() < pos + length {
            return Err(ScriptError::DataTooSmall);
        }
        chunks.push(ScriptChunk {
            op,
            data: Some(bytes[pos..pos + length].to_vec()),
        });
        pos += length;
    }

    Ok(chunks)
}

/// Read a little-endian push length of `width` bytes starting at `pos`.
fn read_len(bytes: &[u8], pos: usize, width: usize) -> Result<usize, ScriptError> {
    let raw = bytes.get(pos..pos + width).ok_or(ScriptError::DataTooSmall)?;
    let mut buf = [0u8; 4];
    buf[..width].copy_from_slice(raw);
    Ok(u32::from_le_bytes(buf) as usize)
}

/// Compute the minimal push prefix for a data payload of the given length.
///
/// # Arguments
/// * `data_len` - The length of the data to be pushed.
///
/// # Returns
/// The prefix bytes, or `DataTooBig` if the length does not fit OP_PUSHDATA4.
pub fn push_data_prefix(data_len: usize) -> Result<Vec<u8>, ScriptError> {
    if data_len <= OP_DATA_75 as usize {
        Ok(vec![data_len as u8])
    } else if data_len <= 0xFF {
        Ok(vec![OP_PUSHDATA1, data_len as u8])
    } else if data_len <= 0xFFFF {
        let mut buf = vec![OP_PUSHDATA2];
        buf.extend_from_slice(&(data_len as u16).to_le_bytes());
        Ok(buf)
    } else if data_len <= 0xFFFF_FFFF {
        let mut buf = vec![OP_PUSHDATA4];
        buf.extend_from_slice(&(data_len as u32).to_le_bytes());
        Ok(buf)
    } else {
        Err(ScriptError::DataTooBig)
    }
}
