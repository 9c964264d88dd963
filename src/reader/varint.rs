//! Variable-length integer encoding and decoding.
//!
//! Avro uses the same varint layout as Protocol Buffers (7 data bits per
//! byte, MSB continuation, little-endian byte order) and zigzag encoding
//! for signed values: 0 -> 0, -1 -> 1, 1 -> 2, -2 -> 3, ...

use crate::error::DecodeError;

/// Decode an unsigned variable-length integer, advancing the cursor.
///
/// # Errors
/// - `DecodeError::UnexpectedEof` if the input is truncated
/// - `DecodeError::InvalidVarint` if the varint exceeds 10 bytes
#[inline]
pub fn decode_varint(data: &mut &[u8]) -> Result<u64, DecodeError> {
    let mut result: u64 = 0;
    let mut shift: u32 = 0;

    loop {
        if data.is_empty() {
            return Err(DecodeError::UnexpectedEof);
        }

        let byte = data[0];
        *data = &data[1..];

        result |= ((byte & 0x7F) as u64) << shift;

        if byte & 0x80 == 0 {
            return Ok(result);
        }

        shift += 7;

        // Max 10 bytes for a 64-bit varint
        if shift >= 64 {
            return Err(DecodeError::InvalidVarint);
        }
    }
}

/// Decode an unsigned varint while tracking the byte offset, for error
/// reporting when parsing file structures.
#[inline]
pub fn decode_varint_with_offset(cursor: &mut &[u8], offset: &mut u64) -> Result<u64, DecodeError> {
    let before = cursor.len();
    let result = decode_varint(cursor);
    *offset += (before - cursor.len()) as u64;
    result
}

/// Decode a signed variable-length integer (zigzag encoded).
#[inline]
pub fn decode_zigzag(data: &mut &[u8]) -> Result<i64, DecodeError> {
    let unsigned = decode_varint(data)?;
    Ok(((unsigned >> 1) as i64) ^ (-((unsigned & 1) as i64)))
}

/// Decode a signed zigzag varint while tracking the byte offset.
#[inline]
pub fn decode_zigzag_with_offset(cursor: &mut &[u8], offset: &mut u64) -> Result<i64, DecodeError> {
    let unsigned = decode_varint_with_offset(cursor, offset)?;
    Ok(((unsigned >> 1) as i64) ^ (-((unsigned & 1) as i64)))
}

/// Skip over a varint without decoding its value.
#[inline]
pub fn skip_varint(data: &mut &[u8]) -> Result<(), DecodeError> {
    loop {
        if data.is_empty() {
            return Err(DecodeError::UnexpectedEof);
        }
        let byte = data[0];
        *data = &data[1..];
        if byte & 0x80 == 0 {
            return Ok(());
        }
    }
}

/// Encode an unsigned integer as a varint.
///
/// Used by tests and fixtures that assemble container bytes by hand.
#[inline]
pub fn encode_varint(mut value: u64) -> Vec<u8> {
    let mut result = Vec::new();
    loop {
        let mut byte = (value & 0x7F) as u8;
        value >>= 7;
        if value != 0 {
            byte |= 0x80;
        }
        result.push(byte);
        if value == 0 {
            break;
        }
    }
    result
}

/// Encode a signed integer as a zigzag varint.
#[inline]
pub fn encode_zigzag(value: i64) -> Vec<u8> {
    let zigzag = ((value << 1) ^ (value >> 63)) as u64;
    encode_varint(zigzag)
}
