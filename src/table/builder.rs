//! Incremental column construction during block decoding.

use std::sync::Arc;

use crate::error::DecodeError;
use crate::reader::AvroValue;
use crate::schema::{AvroSchema, NamedTypes};

use super::column::{Column, ColumnData, ColumnType};

/// Accumulates decoded values for one output column.
///
/// Values arrive row by row from the record decoder. Nullable fields
/// (two-branch unions with `null`) land in the concrete branch's buffer
/// with `None` marking null rows.
#[derive(Debug)]
pub struct ColumnBuilder {
    name: Arc<str>,
    schema: AvroSchema,
    data: ColumnData,
}

impl ColumnBuilder {
    /// Create a builder for a field, sized for an expected row count.
    pub fn new(
        name: Arc<str>,
        schema: AvroSchema,
        named_types: &NamedTypes,
        capacity: usize,
    ) -> Self {
        let data = match ColumnType::from_schema(&schema, named_types) {
            ColumnType::Null => ColumnData::Null(0),
            ColumnType::Boolean => ColumnData::Boolean(Vec::with_capacity(capacity)),
            ColumnType::Int32 => ColumnData::Int32(Vec::with_capacity(capacity)),
            ColumnType::Int64 => ColumnData::Int64(Vec::with_capacity(capacity)),
            ColumnType::Float32 => ColumnData::Float32(Vec::with_capacity(capacity)),
            ColumnType::Float64 => ColumnData::Float64(Vec::with_capacity(capacity)),
            ColumnType::Utf8 => ColumnData::Utf8(Vec::with_capacity(capacity)),
            ColumnType::Binary => ColumnData::Binary(Vec::with_capacity(capacity)),
            ColumnType::Nested => ColumnData::Nested(Vec::with_capacity(capacity)),
        };
        Self { name, schema, data }
    }

    /// Append one decoded value.
    ///
    /// # Errors
    /// `DecodeError::TypeMismatch` if the value's shape does not match
    /// the column's buffer. The decoder follows the schema, so this only
    /// fires on internal inconsistency.
    pub fn push(&mut self, value: AvroValue) -> Result<(), DecodeError> {
        // Nested columns keep union wrappers; typed columns unwrap them
        let value = match value {
            AvroValue::Union(branch, inner) => {
                if matches!(self.data, ColumnData::Nested(_)) {
                    AvroValue::Union(branch, inner)
                } else {
                    *inner
                }
            }
            other => other,
        };

        match (&mut self.data, value) {
            (ColumnData::Null(count), AvroValue::Null) => *count += 1,
            (ColumnData::Boolean(buf), AvroValue::Boolean(v)) => buf.push(Some(v)),
            (ColumnData::Boolean(buf), AvroValue::Null) => buf.push(None),
            (ColumnData::Int32(buf), AvroValue::Int(v)) => buf.push(Some(v)),
            (ColumnData::Int32(buf), AvroValue::Null) => buf.push(None),
            (ColumnData::Int64(buf), AvroValue::Long(v)) => buf.push(Some(v)),
            (ColumnData::Int64(buf), AvroValue::Null) => buf.push(None),
            (ColumnData::Float32(buf), AvroValue::Float(v)) => buf.push(Some(v)),
            (ColumnData::Float32(buf), AvroValue::Null) => buf.push(None),
            (ColumnData::Float64(buf), AvroValue::Double(v)) => buf.push(Some(v)),
            (ColumnData::Float64(buf), AvroValue::Null) => buf.push(None),
            (ColumnData::Utf8(buf), AvroValue::String(v)) => buf.push(Some(v)),
            (ColumnData::Utf8(buf), AvroValue::Enum(_, symbol)) => buf.push(Some(symbol)),
            (ColumnData::Utf8(buf), AvroValue::Null) => buf.push(None),
            (ColumnData::Binary(buf), AvroValue::Bytes(v)) => buf.push(Some(v)),
            (ColumnData::Binary(buf), AvroValue::Fixed(v)) => buf.push(Some(v)),
            (ColumnData::Binary(buf), AvroValue::Null) => buf.push(None),
            (ColumnData::Nested(buf), value) => buf.push(value),
            (data, value) => {
                return Err(DecodeError::TypeMismatch(format!(
                    "Cannot store {:?} in {:?} column '{}'",
                    value,
                    data.column_type(),
                    self.name
                )))
            }
        }
        Ok(())
    }

    /// Number of values accumulated so far.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if the builder has no values.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Finalize into a column.
    pub fn finish(self) -> Column {
        Column {
            name: self.name,
            schema: self.schema,
            data: self.data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builder(schema: AvroSchema) -> ColumnBuilder {
        let named = NamedTypes::from_schema(&schema);
        ColumnBuilder::new(Arc::from("col"), schema.clone(), &named, 4)
    }

    #[test]
    fn test_push_scalars() {
        let mut b = builder(AvroSchema::Long);
        b.push(AvroValue::Long(1)).unwrap();
        b.push(AvroValue::Long(2)).unwrap();
        let col = b.finish();
        assert_eq!(col.data, ColumnData::Int64(vec![Some(1), Some(2)]));
    }

    #[test]
    fn test_push_nullable_union_unwraps() {
        let mut b = builder(AvroSchema::Union(vec![
            AvroSchema::Null,
            AvroSchema::String,
        ]));
        b.push(AvroValue::Union(1, Box::new(AvroValue::String("a".into()))))
            .unwrap();
        b.push(AvroValue::Union(0, Box::new(AvroValue::Null))).unwrap();
        let col = b.finish();
        assert_eq!(
            col.data,
            ColumnData::Utf8(vec![Some("a".to_string()), None])
        );
    }

    #[test]
    fn test_push_enum_stores_symbol() {
        let schema = AvroSchema::Enum(crate::schema::EnumSchema {
            name: "Suit".to_string(),
            namespace: None,
            symbols: vec!["HEARTS".to_string(), "SPADES".to_string()],
            doc: None,
        });
        let mut b = builder(schema);
        b.push(AvroValue::Enum(1, "SPADES".to_string())).unwrap();
        let col = b.finish();
        assert_eq!(col.data, ColumnData::Utf8(vec![Some("SPADES".to_string())]));
    }

    #[test]
    fn test_push_type_mismatch() {
        let mut b = builder(AvroSchema::Long);
        let err = b.push(AvroValue::String("oops".into())).unwrap_err();
        assert!(matches!(err, DecodeError::TypeMismatch(_)));
    }

    #[test]
    fn test_push_nested_keeps_union_wrapper() {
        let mut b = builder(AvroSchema::Union(vec![
            AvroSchema::Null,
            AvroSchema::Long,
            AvroSchema::String,
        ]));
        b.push(AvroValue::Union(1, Box::new(AvroValue::Long(5)))).unwrap();
        let col = b.finish();
        assert_eq!(
            col.data,
            ColumnData::Nested(vec![AvroValue::Union(1, Box::new(AvroValue::Long(5)))])
        );
    }

    #[test]
    fn test_null_column_counts() {
        let mut b = builder(AvroSchema::Null);
        b.push(AvroValue::Null).unwrap();
        b.push(AvroValue::Null).unwrap();
        b.push(AvroValue::Null).unwrap();
        assert_eq!(b.len(), 3);
        assert_eq!(b.finish().data, ColumnData::Null(3));
    }
}
