//! Variable-length integer encoding (LEB128, 7 bits per byte).
//!
//! Postings store delta-encoded document numbers and term frequencies as
//! varints, so small gaps take a single byte.

use crate::error::{Result, XiphosError};

/// Encode `value` into a new buffer.
pub fn encode_u64(value: u64) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(2);
    encode_u64_into(value, &mut bytes);
    bytes
}

/// Append the encoding of `value` to `out`.
pub fn encode_u64_into(value: u64, out: &mut Vec<u8>) {
    let mut val = value;
    loop {
        let mut byte = (val & 0x7F) as u8;
        val >>= 7;
        if val != 0 {
            byte |= 0x80;
        }
        out.push(byte);
        if val == 0 {
            break;
        }
    }
}

/// Decode a varint from the front of `bytes`, returning the value and the
/// number of bytes consumed.
pub fn decode_u64(bytes: &[u8]) -> Result<(u64, usize)> {
    let mut result = 0u64;
    let mut shift = 0;

    for (i, &byte) in bytes.iter().enumerate() {
        if shift >= 64 {
            return Err(XiphosError::storage("VarInt overflow"));
        }
        result |= ((byte & 0x7F) as u64) << shift;
        if byte & 0x80 == 0 {
            return Ok((result, i + 1));
        }
        shift += 7;
    }

    Err(XiphosError::storage("Incomplete VarInt"))
}

/// Cursor decoding consecutive varints from a byte slice.
#[derive(Debug)]
pub struct VarintCursor<'a> {
    bytes: &'a [u8],
    position: usize,
}

impl<'a> VarintCursor<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        VarintCursor { bytes, position: 0 }
    }

    pub fn next_u64(&mut self) -> Result<u64> {
        let (value, read) = decode_u64(&self.bytes[self.position..])?;
        self.position += read;
        Ok(value)
    }

    pub fn next_u32(&mut self) -> Result<u32> {
        let value = self.next_u64()?;
        u32::try_from(value).map_err(|_| XiphosError::storage("VarInt does not fit in u32"))
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn is_empty(&self) -> bool {
        self.position >= self.bytes.len()
    }
}
