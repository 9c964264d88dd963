//! Avro binary value decoder.
//!
//! Decodes one binary-encoded value at a time per the resolved schema:
//! zigzag varints for integers and tags, little-endian IEEE 754 floats,
//! length-prefixed bytes and strings, block-framed arrays and maps, and
//! (branch index, value) pairs for unions.
//!
//! Skip functions advance the cursor without materializing a value. Avro
//! is a row-major format, so fields dropped by a projection still have to
//! be parsed off the wire.

use crate::error::DecodeError;
use crate::schema::{AvroSchema, EnumSchema, NamedTypes, RecordSchema};

use super::varint::{decode_zigzag, skip_varint};

/// A decoded Avro value.
#[derive(Debug, Clone, PartialEq)]
pub enum AvroValue {
    /// Null value
    Null,
    /// Boolean value
    Boolean(bool),
    /// 32-bit signed integer
    Int(i32),
    /// 64-bit signed integer
    Long(i64),
    /// 32-bit floating point
    Float(f32),
    /// 64-bit floating point
    Double(f64),
    /// Byte array
    Bytes(Vec<u8>),
    /// UTF-8 string
    String(String),
    /// Record with named fields
    Record(Vec<(String, AvroValue)>),
    /// Enum variant (index and symbol name)
    Enum(i32, String),
    /// Array of values
    Array(Vec<AvroValue>),
    /// Map with string keys
    Map(Vec<(String, AvroValue)>),
    /// Union variant (branch index and value)
    Union(i32, Box<AvroValue>),
    /// Fixed-size byte array
    Fixed(Vec<u8>),
}

/// Decode a null value (no-op, consumes no bytes).
#[inline]
pub fn decode_null(_data: &mut &[u8]) -> Result<(), DecodeError> {
    Ok(())
}

/// Decode a boolean value (one byte, 0x00 or 0x01).
#[inline]
pub fn decode_boolean(data: &mut &[u8]) -> Result<bool, DecodeError> {
    if data.is_empty() {
        return Err(DecodeError::UnexpectedEof);
    }
    let byte = data[0];
    *data = &data[1..];
    match byte {
        0 => Ok(false),
        1 => Ok(true),
        _ => Err(DecodeError::InvalidData(format!(
            "Invalid boolean value: {}, expected 0 or 1",
            byte
        ))),
    }
}

/// Decode a 32-bit signed integer (zigzag varint encoded).
#[inline]
pub fn decode_int(data: &mut &[u8]) -> Result<i32, DecodeError> {
    let long = decode_long(data)?;
    if long < i32::MIN as i64 || long > i32::MAX as i64 {
        return Err(DecodeError::InvalidData(format!(
            "Integer overflow: {} does not fit in i32",
            long
        )));
    }
    Ok(long as i32)
}

/// Decode a 64-bit signed integer (zigzag varint encoded).
#[inline]
pub fn decode_long(data: &mut &[u8]) -> Result<i64, DecodeError> {
    decode_zigzag(data)
}

/// Decode a 32-bit IEEE 754 floating-point number (little-endian).
#[inline]
pub fn decode_float(data: &mut &[u8]) -> Result<f32, DecodeError> {
    if data.len() < 4 {
        return Err(DecodeError::UnexpectedEof);
    }
    let bytes: [u8; 4] = [data[0], data[1], data[2], data[3]];
    *data = &data[4..];
    Ok(f32::from_le_bytes(bytes))
}

/// Decode a 64-bit IEEE 754 floating-point number (little-endian).
#[inline]
pub fn decode_double(data: &mut &[u8]) -> Result<f64, DecodeError> {
    if data.len() < 8 {
        return Err(DecodeError::UnexpectedEof);
    }
    let bytes: [u8; 8] = [
        data[0], data[1], data[2], data[3], data[4], data[5], data[6], data[7],
    ];
    *data = &data[8..];
    Ok(f64::from_le_bytes(bytes))
}

/// Decode a length-prefixed byte array.
#[inline]
pub fn decode_bytes(data: &mut &[u8]) -> Result<Vec<u8>, DecodeError> {
    let len = decode_len(data)?;
    if data.len() < len {
        return Err(DecodeError::UnexpectedEof);
    }
    let bytes = data[..len].to_vec();
    *data = &data[len..];
    Ok(bytes)
}

/// Decode a length-prefixed UTF-8 string.
#[inline]
pub fn decode_string(data: &mut &[u8]) -> Result<String, DecodeError> {
    let bytes = decode_bytes(data)?;
    String::from_utf8(bytes).map_err(DecodeError::InvalidUtf8)
}

/// Decode a fixed-size byte array of the declared length.
#[inline]
pub fn decode_fixed(data: &mut &[u8], size: usize) -> Result<Vec<u8>, DecodeError> {
    if data.len() < size {
        return Err(DecodeError::UnexpectedEof);
    }
    let bytes = data[..size].to_vec();
    *data = &data[size..];
    Ok(bytes)
}

/// Decode an enum as a zero-based index into the declared symbol list.
#[inline]
pub fn decode_enum(data: &mut &[u8], schema: &EnumSchema) -> Result<(i32, String), DecodeError> {
    let index = decode_int(data)?;
    if index < 0 || index as usize >= schema.symbols.len() {
        return Err(DecodeError::InvalidData(format!(
            "Enum index {} out of range for '{}' with {} symbols",
            index,
            schema.name,
            schema.symbols.len()
        )));
    }
    Ok((index, schema.symbols[index as usize].clone()))
}

/// Decode a non-negative length prefix.
#[inline]
fn decode_len(data: &mut &[u8]) -> Result<usize, DecodeError> {
    let len = decode_long(data)?;
    if len < 0 {
        return Err(DecodeError::InvalidData(format!(
            "Negative length: {}",
            len
        )));
    }
    Ok(len as usize)
}

/// Decode one value of the given schema, resolving named references
/// through the registry.
pub fn decode_value(
    schema: &AvroSchema,
    named: &NamedTypes,
    data: &mut &[u8],
) -> Result<AvroValue, DecodeError> {
    match schema {
        AvroSchema::Null => {
            decode_null(data)?;
            Ok(AvroValue::Null)
        }
        AvroSchema::Boolean => Ok(AvroValue::Boolean(decode_boolean(data)?)),
        AvroSchema::Int => Ok(AvroValue::Int(decode_int(data)?)),
        AvroSchema::Long => Ok(AvroValue::Long(decode_long(data)?)),
        AvroSchema::Float => Ok(AvroValue::Float(decode_float(data)?)),
        AvroSchema::Double => Ok(AvroValue::Double(decode_double(data)?)),
        AvroSchema::Bytes => Ok(AvroValue::Bytes(decode_bytes(data)?)),
        AvroSchema::String => Ok(AvroValue::String(decode_string(data)?)),
        AvroSchema::Record(record) => decode_record(record, named, data),
        AvroSchema::Enum(e) => {
            let (index, symbol) = decode_enum(data, e)?;
            Ok(AvroValue::Enum(index, symbol))
        }
        AvroSchema::Array(items) => decode_array(items, named, data),
        AvroSchema::Map(values) => decode_map(values, named, data),
        AvroSchema::Union(variants) => decode_union(variants, named, data),
        AvroSchema::Fixed(f) => Ok(AvroValue::Fixed(decode_fixed(data, f.size)?)),
        AvroSchema::Named(name) => {
            let resolved = named.get(name).ok_or_else(|| {
                DecodeError::InvalidData(format!("Unresolved named type: {}", name))
            })?;
            decode_value(resolved, named, data)
        }
    }
}

/// Decode a record by decoding each field in wire order.
fn decode_record(
    record: &RecordSchema,
    named: &NamedTypes,
    data: &mut &[u8],
) -> Result<AvroValue, DecodeError> {
    let mut fields = Vec::with_capacity(record.fields.len());
    for field in &record.fields {
        let value = decode_value(&field.schema, named, data)?;
        fields.push((field.name.clone(), value));
    }
    Ok(AvroValue::Record(fields))
}

/// Decode an array: a sequence of (block-count, items) runs terminated by
/// a zero count. A negative count means abs(count) items preceded by the
/// run's byte length.
fn decode_array(
    items: &AvroSchema,
    named: &NamedTypes,
    data: &mut &[u8],
) -> Result<AvroValue, DecodeError> {
    let mut values = Vec::new();
    loop {
        let count = decode_long(data)?;
        if count == 0 {
            break;
        }
        let count = if count < 0 {
            // Byte length of the run; only needed when skipping
            let _run_bytes = decode_len(data)?;
            count
                .checked_neg()
                .ok_or(DecodeError::InvalidData("Array count overflow".to_string()))?
        } else {
            count
        } as usize;

        // Cap preallocation; a hostile count must not drive allocation
        values.reserve(count.min(data.len() + 1));
        for _ in 0..count {
            values.push(decode_value(items, named, data)?);
        }
    }
    Ok(AvroValue::Array(values))
}

/// Decode a map: same block framing as arrays, with string keys.
fn decode_map(
    value_schema: &AvroSchema,
    named: &NamedTypes,
    data: &mut &[u8],
) -> Result<AvroValue, DecodeError> {
    let mut entries = Vec::new();
    loop {
        let count = decode_long(data)?;
        if count == 0 {
            break;
        }
        let count = if count < 0 {
            let _run_bytes = decode_len(data)?;
            count
                .checked_neg()
                .ok_or(DecodeError::InvalidData("Map count overflow".to_string()))?
        } else {
            count
        } as usize;

        entries.reserve(count.min(data.len() + 1));
        for _ in 0..count {
            let key = decode_string(data)?;
            let value = decode_value(value_schema, named, data)?;
            entries.push((key, value));
        }
    }
    Ok(AvroValue::Map(entries))
}

/// Decode a union as a (zero-based branch index, value) pair.
fn decode_union(
    variants: &[AvroSchema],
    named: &NamedTypes,
    data: &mut &[u8],
) -> Result<AvroValue, DecodeError> {
    let index = decode_long(data)?;
    if index < 0 || index as usize >= variants.len() {
        return Err(DecodeError::InvalidData(format!(
            "Union branch index {} out of range for union with {} branches",
            index,
            variants.len()
        )));
    }
    let value = decode_value(&variants[index as usize], named, data)?;
    Ok(AvroValue::Union(index as i32, Box::new(value)))
}

/// Advance the cursor past one value of the given schema without
/// materializing it.
pub fn skip_value(
    schema: &AvroSchema,
    named: &NamedTypes,
    data: &mut &[u8],
) -> Result<(), DecodeError> {
    match schema {
        AvroSchema::Null => Ok(()),
        AvroSchema::Boolean => {
            if data.is_empty() {
                return Err(DecodeError::UnexpectedEof);
            }
            *data = &data[1..];
            Ok(())
        }
        AvroSchema::Int | AvroSchema::Long => skip_varint(data),
        AvroSchema::Float => skip_n(data, 4),
        AvroSchema::Double => skip_n(data, 8),
        AvroSchema::Bytes | AvroSchema::String => {
            let len = decode_len(data)?;
            skip_n(data, len)
        }
        AvroSchema::Record(record) => {
            for field in &record.fields {
                skip_value(&field.schema, named, data)?;
            }
            Ok(())
        }
        AvroSchema::Enum(_) => skip_varint(data),
        AvroSchema::Array(items) => skip_blocks(data, |data| skip_value(items, named, data)),
        AvroSchema::Map(values) => skip_blocks(data, |data| {
            let len = decode_len(data)?;
            skip_n(data, len)?;
            skip_value(values, named, data)
        }),
        AvroSchema::Union(variants) => {
            let index = decode_long(data)?;
            if index < 0 || index as usize >= variants.len() {
                return Err(DecodeError::InvalidData(format!(
                    "Union branch index {} out of range for union with {} branches",
                    index,
                    variants.len()
                )));
            }
            skip_value(&variants[index as usize], named, data)
        }
        AvroSchema::Fixed(f) => skip_n(data, f.size),
        AvroSchema::Named(name) => {
            let resolved = named.get(name).ok_or_else(|| {
                DecodeError::InvalidData(format!("Unresolved named type: {}", name))
            })?;
            skip_value(resolved, named, data)
        }
    }
}

#[inline]
fn skip_n(data: &mut &[u8], n: usize) -> Result<(), DecodeError> {
    if data.len() < n {
        return Err(DecodeError::UnexpectedEof);
    }
    *data = &data[n..];
    Ok(())
}

/// Skip array/map block runs. A negative count carries the run's byte
/// length, which lets the whole run be skipped without touching items.
fn skip_blocks(
    data: &mut &[u8],
    mut skip_item: impl FnMut(&mut &[u8]) -> Result<(), DecodeError>,
) -> Result<(), DecodeError> {
    loop {
        let count = decode_long(data)?;
        if count == 0 {
            return Ok(());
        }
        if count < 0 {
            let run_bytes = decode_len(data)?;
            skip_n(data, run_bytes)?;
        } else {
            for _ in 0..count {
                skip_item(data)?;
            }
        }
    }
}
