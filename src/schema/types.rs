//! Avro schema types and representations.
//!
//! Defines the schema type tree embedded in Avro container files, plus the
//! registry of named types the decoder uses to resolve references.

use std::collections::HashMap;

use serde_json::{json, Map, Value};

use crate::error::SchemaError;

/// Represents an Avro schema.
///
/// Named types (records, enums, fixed) may be referenced by name elsewhere
/// in the tree, including recursively; such references parse to `Named` and
/// resolve through a [`NamedTypes`] registry.
#[derive(Debug, Clone, PartialEq)]
pub enum AvroSchema {
    /// Null type - no value.
    Null,
    /// Boolean type.
    Boolean,
    /// 32-bit signed integer.
    Int,
    /// 64-bit signed integer.
    Long,
    /// 32-bit IEEE 754 floating-point.
    Float,
    /// 64-bit IEEE 754 floating-point.
    Double,
    /// Sequence of bytes.
    Bytes,
    /// Unicode string.
    String,

    /// Record type with named fields.
    Record(RecordSchema),
    /// Enumeration type.
    Enum(EnumSchema),
    /// Array of items with a single schema.
    Array(Box<AvroSchema>),
    /// Map with string keys and values of a single schema.
    Map(Box<AvroSchema>),
    /// Union of multiple schemas.
    Union(Vec<AvroSchema>),
    /// Fixed-size byte array.
    Fixed(FixedSchema),

    /// Named type reference (resolved at decode time).
    Named(String),
}

/// Schema for a record type.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordSchema {
    /// The name of the record.
    pub name: String,
    /// Optional namespace for the record.
    pub namespace: Option<String>,
    /// The fields of the record, in wire order.
    pub fields: Vec<FieldSchema>,
    /// Optional documentation.
    pub doc: Option<String>,
}

impl RecordSchema {
    /// Create a new RecordSchema with the given name and fields.
    pub fn new(name: impl Into<String>, fields: Vec<FieldSchema>) -> Self {
        Self {
            name: name.into(),
            namespace: None,
            fields,
            doc: None,
        }
    }

    /// Set the namespace.
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Get the fully qualified name.
    pub fn fullname(&self) -> String {
        match &self.namespace {
            Some(ns) => format!("{}.{}", ns, self.name),
            None => self.name.clone(),
        }
    }

    /// Find a field's wire position by name.
    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    /// Serialize the record schema to a JSON Value.
    pub fn to_json_value(&self) -> Value {
        let mut obj = Map::new();
        obj.insert("type".to_string(), json!("record"));
        obj.insert("name".to_string(), json!(&self.name));

        if let Some(ns) = &self.namespace {
            obj.insert("namespace".to_string(), json!(ns));
        }

        if let Some(doc) = &self.doc {
            obj.insert("doc".to_string(), json!(doc));
        }

        let fields: Vec<Value> = self.fields.iter().map(|f| f.to_json_value()).collect();
        obj.insert("fields".to_string(), Value::Array(fields));

        Value::Object(obj)
    }
}

/// Schema for a field within a record.
///
/// The position of a field in `RecordSchema::fields` defines its on-wire
/// order; projection never changes that order, only which decoded values
/// are retained.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSchema {
    /// The name of the field (unique within its record).
    pub name: String,
    /// The schema of the field's value.
    pub schema: AvroSchema,
    /// Optional default value (unused for plain decode, kept for fidelity).
    pub default: Option<Value>,
    /// Optional documentation.
    pub doc: Option<String>,
}

impl FieldSchema {
    /// Create a new FieldSchema with the given name and schema.
    pub fn new(name: impl Into<String>, schema: AvroSchema) -> Self {
        Self {
            name: name.into(),
            schema,
            default: None,
            doc: None,
        }
    }

    /// Set the default value.
    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    /// Serialize the field schema to a JSON Value.
    pub fn to_json_value(&self) -> Value {
        let mut obj = Map::new();
        obj.insert("name".to_string(), json!(&self.name));
        obj.insert("type".to_string(), self.schema.to_json_value());

        if let Some(default) = &self.default {
            obj.insert("default".to_string(), default.clone());
        }

        if let Some(doc) = &self.doc {
            obj.insert("doc".to_string(), json!(doc));
        }

        Value::Object(obj)
    }
}

/// Schema for an enumeration type.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumSchema {
    /// The name of the enum.
    pub name: String,
    /// Optional namespace for the enum.
    pub namespace: Option<String>,
    /// The symbols of the enum; wire values are zero-based indices into
    /// this list.
    pub symbols: Vec<String>,
    /// Optional documentation.
    pub doc: Option<String>,
}

impl EnumSchema {
    /// Create a new EnumSchema with the given name and symbols.
    pub fn new(name: impl Into<String>, symbols: Vec<String>) -> Self {
        Self {
            name: name.into(),
            namespace: None,
            symbols,
            doc: None,
        }
    }

    /// Set the namespace.
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Get the fully qualified name.
    pub fn fullname(&self) -> String {
        match &self.namespace {
            Some(ns) => format!("{}.{}", ns, self.name),
            None => self.name.clone(),
        }
    }

    /// Serialize the enum schema to a JSON Value.
    pub fn to_json_value(&self) -> Value {
        let mut obj = Map::new();
        obj.insert("type".to_string(), json!("enum"));
        obj.insert("name".to_string(), json!(&self.name));

        if let Some(ns) = &self.namespace {
            obj.insert("namespace".to_string(), json!(ns));
        }

        if let Some(doc) = &self.doc {
            obj.insert("doc".to_string(), json!(doc));
        }

        obj.insert("symbols".to_string(), json!(&self.symbols));

        Value::Object(obj)
    }
}

/// Schema for a fixed-size byte array.
#[derive(Debug, Clone, PartialEq)]
pub struct FixedSchema {
    /// The name of the fixed type.
    pub name: String,
    /// Optional namespace for the fixed type.
    pub namespace: Option<String>,
    /// The size in bytes.
    pub size: usize,
}

impl FixedSchema {
    /// Create a new FixedSchema with the given name and size.
    pub fn new(name: impl Into<String>, size: usize) -> Self {
        Self {
            name: name.into(),
            namespace: None,
            size,
        }
    }

    /// Set the namespace.
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Get the fully qualified name.
    pub fn fullname(&self) -> String {
        match &self.namespace {
            Some(ns) => format!("{}.{}", ns, self.name),
            None => self.name.clone(),
        }
    }

    /// Serialize the fixed schema to a JSON Value.
    pub fn to_json_value(&self) -> Value {
        let mut obj = Map::new();
        obj.insert("type".to_string(), json!("fixed"));
        obj.insert("name".to_string(), json!(&self.name));

        if let Some(ns) = &self.namespace {
            obj.insert("namespace".to_string(), json!(ns));
        }

        obj.insert("size".to_string(), json!(self.size));

        Value::Object(obj)
    }
}

impl AvroSchema {
    /// Check if this schema is a named type (record, enum, or fixed).
    pub fn is_named(&self) -> bool {
        matches!(
            self,
            AvroSchema::Record(_) | AvroSchema::Enum(_) | AvroSchema::Fixed(_)
        )
    }

    /// Get the fully qualified name of a named type, if applicable.
    pub fn fullname(&self) -> Option<String> {
        match self {
            AvroSchema::Record(r) => Some(r.fullname()),
            AvroSchema::Enum(e) => Some(e.fullname()),
            AvroSchema::Fixed(f) => Some(f.fullname()),
            AvroSchema::Named(n) => Some(n.clone()),
            _ => None,
        }
    }

    /// Check if this schema represents a nullable type (union with null).
    pub fn is_nullable(&self) -> bool {
        match self {
            AvroSchema::Union(variants) => variants.iter().any(|v| matches!(v, AvroSchema::Null)),
            _ => false,
        }
    }

    /// For a two-branch nullable union, get the non-null schema.
    pub fn nullable_inner(&self) -> Option<&AvroSchema> {
        match self {
            AvroSchema::Union(variants) if variants.len() == 2 => {
                variants.iter().find(|v| !matches!(v, AvroSchema::Null))
            }
            _ => None,
        }
    }

    /// Serialize the schema to a canonical JSON string.
    pub fn to_json(&self) -> String {
        let value = self.to_json_value();
        serde_json::to_string(&value).unwrap_or_else(|_| "null".to_string())
    }

    /// Serialize the schema to a JSON Value.
    pub fn to_json_value(&self) -> Value {
        match self {
            AvroSchema::Null => json!("null"),
            AvroSchema::Boolean => json!("boolean"),
            AvroSchema::Int => json!("int"),
            AvroSchema::Long => json!("long"),
            AvroSchema::Float => json!("float"),
            AvroSchema::Double => json!("double"),
            AvroSchema::Bytes => json!("bytes"),
            AvroSchema::String => json!("string"),

            AvroSchema::Record(r) => r.to_json_value(),
            AvroSchema::Enum(e) => e.to_json_value(),
            AvroSchema::Array(items) => {
                json!({
                    "type": "array",
                    "items": items.to_json_value()
                })
            }
            AvroSchema::Map(values) => {
                json!({
                    "type": "map",
                    "values": values.to_json_value()
                })
            }
            AvroSchema::Union(variants) => {
                Value::Array(variants.iter().map(|v| v.to_json_value()).collect())
            }
            AvroSchema::Fixed(f) => f.to_json_value(),

            AvroSchema::Named(name) => json!(name),
        }
    }
}

/// Registry of named types, keyed by fully qualified name.
///
/// Built once per file open from the root schema and shared read-only by
/// all decode operations.
#[derive(Debug, Clone, Default)]
pub struct NamedTypes {
    types: HashMap<String, AvroSchema>,
}

impl NamedTypes {
    /// Build the registry from a schema tree, collecting every named type
    /// definition it contains.
    pub fn from_schema(schema: &AvroSchema) -> Self {
        let mut registry = Self::default();
        registry.collect(schema);
        registry
    }

    fn collect(&mut self, schema: &AvroSchema) {
        match schema {
            AvroSchema::Record(r) => {
                self.types
                    .insert(r.fullname(), AvroSchema::Record(r.clone()));
                for field in &r.fields {
                    self.collect(&field.schema);
                }
            }
            AvroSchema::Enum(e) => {
                self.types.insert(e.fullname(), AvroSchema::Enum(e.clone()));
            }
            AvroSchema::Fixed(f) => {
                self.types
                    .insert(f.fullname(), AvroSchema::Fixed(f.clone()));
            }
            AvroSchema::Array(items) => self.collect(items),
            AvroSchema::Map(values) => self.collect(values),
            AvroSchema::Union(variants) => {
                for variant in variants {
                    self.collect(variant);
                }
            }
            _ => {}
        }
    }

    /// Look up a named type by fully qualified name.
    pub fn get(&self, fullname: &str) -> Option<&AvroSchema> {
        self.types.get(fullname)
    }

    /// Resolve a schema, following one level of `Named` indirection.
    pub fn resolve<'a>(&'a self, schema: &'a AvroSchema) -> Result<&'a AvroSchema, SchemaError> {
        match schema {
            AvroSchema::Named(name) => self
                .get(name)
                .ok_or_else(|| SchemaError::UnresolvedReference(name.clone())),
            other => Ok(other),
        }
    }

    /// Verify that every `Named` reference in the tree resolves to a
    /// definition in this registry.
    pub fn validate_references(&self, schema: &AvroSchema) -> Result<(), SchemaError> {
        match schema {
            AvroSchema::Named(name) => {
                if self.get(name).is_none() {
                    return Err(SchemaError::UnresolvedReference(name.clone()));
                }
                Ok(())
            }
            AvroSchema::Record(r) => {
                for field in &r.fields {
                    self.validate_references(&field.schema)?;
                }
                Ok(())
            }
            AvroSchema::Array(items) => self.validate_references(items),
            AvroSchema::Map(values) => self.validate_references(values),
            AvroSchema::Union(variants) => {
                for variant in variants {
                    self.validate_references(variant)?;
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }
}
