//! Typed column storage.
//!
//! Each output column materializes into a buffer matched to its schema:
//! scalar fields get dedicated `Vec<Option<T>>` buffers, while nested
//! shapes (records, arrays, maps, multi-branch unions) fall back to
//! generic decoded values.

use std::sync::Arc;

use crate::reader::AvroValue;
use crate::schema::{AvroSchema, NamedTypes};

/// Physical storage type for a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    /// All-null column
    Null,
    /// Boolean column
    Boolean,
    /// 32-bit integer column
    Int32,
    /// 64-bit integer column
    Int64,
    /// 32-bit float column
    Float32,
    /// 64-bit float column
    Float64,
    /// UTF-8 string column (strings and enum symbols)
    Utf8,
    /// Variable or fixed length binary column
    Binary,
    /// Nested values stored generically
    Nested,
}

impl ColumnType {
    /// Map a field schema to its storage type.
    ///
    /// A two-branch union with `null` stores as the non-null branch's
    /// type with `None` slots; any other union is nested.
    pub fn from_schema(schema: &AvroSchema, named_types: &NamedTypes) -> ColumnType {
        let schema = match schema {
            AvroSchema::Named(name) => match named_types.get(name) {
                Some(resolved) => resolved,
                None => return ColumnType::Nested,
            },
            other => other,
        };

        if let Some(inner) = schema.nullable_inner() {
            return ColumnType::from_schema(inner, named_types);
        }

        match schema {
            AvroSchema::Null => ColumnType::Null,
            AvroSchema::Boolean => ColumnType::Boolean,
            AvroSchema::Int => ColumnType::Int32,
            AvroSchema::Long => ColumnType::Int64,
            AvroSchema::Float => ColumnType::Float32,
            AvroSchema::Double => ColumnType::Float64,
            AvroSchema::String | AvroSchema::Enum(_) => ColumnType::Utf8,
            AvroSchema::Bytes | AvroSchema::Fixed(_) => ColumnType::Binary,
            AvroSchema::Record(_)
            | AvroSchema::Array(_)
            | AvroSchema::Map(_)
            | AvroSchema::Union(_)
            | AvroSchema::Named(_) => ColumnType::Nested,
        }
    }
}

/// Column values in their typed buffer.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    /// All-null column; stores only the row count
    Null(usize),
    /// Boolean values
    Boolean(Vec<Option<bool>>),
    /// 32-bit integers
    Int32(Vec<Option<i32>>),
    /// 64-bit integers
    Int64(Vec<Option<i64>>),
    /// 32-bit floats
    Float32(Vec<Option<f32>>),
    /// 64-bit floats
    Float64(Vec<Option<f64>>),
    /// UTF-8 strings
    Utf8(Vec<Option<String>>),
    /// Binary values
    Binary(Vec<Option<Vec<u8>>>),
    /// Generic decoded values for nested shapes
    Nested(Vec<AvroValue>),
}

impl ColumnData {
    /// Number of values in this column.
    pub fn len(&self) -> usize {
        match self {
            ColumnData::Null(count) => *count,
            ColumnData::Boolean(v) => v.len(),
            ColumnData::Int32(v) => v.len(),
            ColumnData::Int64(v) => v.len(),
            ColumnData::Float32(v) => v.len(),
            ColumnData::Float64(v) => v.len(),
            ColumnData::Utf8(v) => v.len(),
            ColumnData::Binary(v) => v.len(),
            ColumnData::Nested(v) => v.len(),
        }
    }

    /// Check if this column has no values.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The storage type of this buffer.
    pub fn column_type(&self) -> ColumnType {
        match self {
            ColumnData::Null(_) => ColumnType::Null,
            ColumnData::Boolean(_) => ColumnType::Boolean,
            ColumnData::Int32(_) => ColumnType::Int32,
            ColumnData::Int64(_) => ColumnType::Int64,
            ColumnData::Float32(_) => ColumnType::Float32,
            ColumnData::Float64(_) => ColumnType::Float64,
            ColumnData::Utf8(_) => ColumnType::Utf8,
            ColumnData::Binary(_) => ColumnType::Binary,
            ColumnData::Nested(_) => ColumnType::Nested,
        }
    }
}

/// A named, typed column of decoded values.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    /// Column name (the record field name)
    pub name: Arc<str>,
    /// The field's declared schema
    pub schema: AvroSchema,
    /// The materialized values
    pub data: ColumnData,
}

impl Column {
    /// Number of rows in this column.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if this column has no rows.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
