//! JSON schema parser for Avro schemas.
//!
//! Parses the schema JSON embedded in a container header into the
//! `AvroSchema` tree, resolving named types through a registry.

use std::collections::HashMap;

use serde_json::Value;

use crate::error::SchemaError;
use crate::schema::{
    AvroSchema, EnumSchema, FieldSchema, FixedSchema, NamedTypes, RecordSchema,
};

/// Parse an Avro schema from a JSON string.
///
/// Every `Named` reference in the result is checked against the named
/// types the schema itself defines; a dangling reference is a
/// `SchemaError`.
///
/// # Example
/// ```
/// use avrotable::schema::parse_schema;
///
/// let schema = parse_schema(r#""string""#).unwrap();
/// ```
pub fn parse_schema(json: &str) -> Result<AvroSchema, SchemaError> {
    let value: Value = serde_json::from_str(json)
        .map_err(|e| SchemaError::ParseError(format!("Invalid JSON: {}", e)))?;

    let mut parser = SchemaParser::new();
    let schema = parser.parse(&value)?;

    // A reference with no definition anywhere in the tree cannot be decoded
    NamedTypes::from_schema(&schema).validate_references(&schema)?;

    Ok(schema)
}

/// Schema parser with named type resolution context.
///
/// Maintains a registry of named types (records, enums, fixed) so later
/// parts of the schema can reference earlier definitions, including
/// recursively.
#[derive(Debug, Default)]
pub struct SchemaParser {
    /// Registry of named types by their fully qualified name
    named_types: HashMap<String, AvroSchema>,
    /// Current namespace for resolving unqualified names
    current_namespace: Option<String>,
}

impl SchemaParser {
    /// Create a new SchemaParser.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a JSON value into an AvroSchema.
    pub fn parse(&mut self, value: &Value) -> Result<AvroSchema, SchemaError> {
        match value {
            Value::String(s) => self.parse_string_schema(s),
            Value::Object(obj) => self.parse_object_schema(obj),
            Value::Array(arr) => self.parse_union_schema(arr),
            _ => Err(SchemaError::InvalidSchema(format!(
                "Expected string, object, or array, found: {:?}",
                value
            ))),
        }
    }

    /// Parse a primitive type or named type reference from a string.
    fn parse_string_schema(&self, s: &str) -> Result<AvroSchema, SchemaError> {
        match s {
            "null" => Ok(AvroSchema::Null),
            "boolean" => Ok(AvroSchema::Boolean),
            "int" => Ok(AvroSchema::Int),
            "long" => Ok(AvroSchema::Long),
            "float" => Ok(AvroSchema::Float),
            "double" => Ok(AvroSchema::Double),
            "bytes" => Ok(AvroSchema::Bytes),
            "string" => Ok(AvroSchema::String),
            // Anything else is a named type reference; it may be defined
            // later or in a recursive context, so resolution happens after
            // the full tree is parsed.
            name => Ok(AvroSchema::Named(self.resolve_name(name))),
        }
    }

    /// Parse a complex type from a JSON object.
    fn parse_object_schema(
        &mut self,
        obj: &serde_json::Map<String, Value>,
    ) -> Result<AvroSchema, SchemaError> {
        let type_str = obj
            .get("type")
            .and_then(|v| v.as_str())
            .ok_or_else(|| SchemaError::InvalidSchema("Missing 'type' field".to_string()))?;

        match type_str {
            // Primitive types can also appear as objects, possibly carrying
            // a logicalType annotation; annotations decode as the base type.
            "null" => Ok(AvroSchema::Null),
            "boolean" => Ok(AvroSchema::Boolean),
            "int" => Ok(AvroSchema::Int),
            "long" => Ok(AvroSchema::Long),
            "float" => Ok(AvroSchema::Float),
            "double" => Ok(AvroSchema::Double),
            "bytes" => Ok(AvroSchema::Bytes),
            "string" => Ok(AvroSchema::String),

            "record" => self.parse_record_schema(obj),
            "enum" => self.parse_enum_schema(obj),
            "array" => self.parse_array_schema(obj),
            "map" => self.parse_map_schema(obj),
            "fixed" => self.parse_fixed_schema(obj),

            // Type could be a named reference
            other => {
                let fullname = self.resolve_name(other);
                if self.named_types.contains_key(&fullname) {
                    Ok(AvroSchema::Named(fullname))
                } else {
                    Err(SchemaError::UnsupportedType(format!(
                        "Unknown type: {}",
                        other
                    )))
                }
            }
        }
    }

    /// Parse a union schema from a JSON array.
    fn parse_union_schema(&mut self, arr: &[Value]) -> Result<AvroSchema, SchemaError> {
        if arr.is_empty() {
            return Err(SchemaError::InvalidSchema(
                "Union schema cannot be empty".to_string(),
            ));
        }

        let variants: Result<Vec<AvroSchema>, SchemaError> =
            arr.iter().map(|v| self.parse(v)).collect();

        let variants = variants?;
        validate_union(&variants)?;

        Ok(AvroSchema::Union(variants))
    }

    /// Parse a record schema.
    fn parse_record_schema(
        &mut self,
        obj: &serde_json::Map<String, Value>,
    ) -> Result<AvroSchema, SchemaError> {
        let raw_name = obj
            .get("name")
            .and_then(|v| v.as_str())
            .ok_or_else(|| SchemaError::InvalidSchema("Record missing 'name' field".to_string()))?;

        // A dotted name attribute carries its own namespace
        let (name, inline_namespace) = split_raw_name(raw_name);
        validate_name(&name, "Record")?;

        let namespace = inline_namespace.or_else(|| {
            obj.get("namespace")
                .and_then(|v| v.as_str())
                .map(String::from)
        });

        // Nested unqualified names resolve against this record's namespace
        let prev_namespace = self.current_namespace.clone();
        if namespace.is_some() {
            self.current_namespace = namespace.clone();
        }

        let fullname = self.qualified_name(&name, &namespace);

        // Register a placeholder before parsing fields so recursive
        // references to this record resolve
        self.named_types
            .insert(fullname.clone(), AvroSchema::Named(fullname.clone()));

        let doc = obj.get("doc").and_then(|v| v.as_str()).map(String::from);

        let fields_value = obj
            .get("fields")
            .and_then(|v| v.as_array())
            .ok_or_else(|| {
                SchemaError::InvalidSchema("Record missing 'fields' array".to_string())
            })?;

        let fields: Result<Vec<FieldSchema>, SchemaError> = fields_value
            .iter()
            .map(|f| self.parse_field_schema(f))
            .collect();
        let fields = fields?;

        // Field names must be unique within the record
        let mut seen = std::collections::HashSet::new();
        for field in &fields {
            if !seen.insert(field.name.as_str()) {
                self.current_namespace = prev_namespace;
                return Err(SchemaError::InvalidSchema(format!(
                    "Duplicate field name '{}' in record '{}'",
                    field.name, name
                )));
            }
        }

        self.current_namespace = prev_namespace;

        let record = RecordSchema {
            name,
            namespace: split_namespace(&fullname),
            fields,
            doc,
        };

        let schema = AvroSchema::Record(record);
        self.named_types.insert(fullname, schema.clone());

        Ok(schema)
    }

    /// Parse a field schema within a record.
    fn parse_field_schema(&mut self, value: &Value) -> Result<FieldSchema, SchemaError> {
        let obj = value
            .as_object()
            .ok_or_else(|| SchemaError::InvalidSchema("Field must be an object".to_string()))?;

        let name = obj
            .get("name")
            .and_then(|v| v.as_str())
            .ok_or_else(|| SchemaError::InvalidSchema("Field missing 'name'".to_string()))?
            .to_string();

        validate_name(&name, "Field")?;

        let type_value = obj
            .get("type")
            .ok_or_else(|| SchemaError::InvalidSchema("Field missing 'type'".to_string()))?;

        let schema = self.parse(type_value)?;

        let default = obj.get("default").cloned();
        let doc = obj.get("doc").and_then(|v| v.as_str()).map(String::from);

        Ok(FieldSchema {
            name,
            schema,
            default,
            doc,
        })
    }

    /// Parse an enum schema.
    fn parse_enum_schema(
        &mut self,
        obj: &serde_json::Map<String, Value>,
    ) -> Result<AvroSchema, SchemaError> {
        let raw_name = obj
            .get("name")
            .and_then(|v| v.as_str())
            .ok_or_else(|| SchemaError::InvalidSchema("Enum missing 'name' field".to_string()))?;

        let (name, inline_namespace) = split_raw_name(raw_name);
        validate_name(&name, "Enum")?;

        let namespace = inline_namespace.or_else(|| {
            obj.get("namespace")
                .and_then(|v| v.as_str())
                .map(String::from)
        });

        let fullname = self.qualified_name(&name, &namespace);

        let symbols = obj
            .get("symbols")
            .and_then(|v| v.as_array())
            .ok_or_else(|| SchemaError::InvalidSchema("Enum missing 'symbols' array".to_string()))?
            .iter()
            .filter_map(|v| v.as_str().map(String::from))
            .collect::<Vec<_>>();

        if symbols.is_empty() {
            return Err(SchemaError::InvalidSchema(
                "Enum must have at least one symbol".to_string(),
            ));
        }

        let mut seen = std::collections::HashSet::new();
        for symbol in &symbols {
            validate_name(symbol, "Enum symbol")?;
            if !seen.insert(symbol.as_str()) {
                return Err(SchemaError::InvalidSchema(format!(
                    "Duplicate enum symbol '{}'",
                    symbol
                )));
            }
        }

        let doc = obj.get("doc").and_then(|v| v.as_str()).map(String::from);

        let enum_schema = EnumSchema {
            name,
            namespace: split_namespace(&fullname),
            symbols,
            doc,
        };

        let schema = AvroSchema::Enum(enum_schema);
        self.named_types.insert(fullname, schema.clone());

        Ok(schema)
    }

    /// Parse an array schema.
    fn parse_array_schema(
        &mut self,
        obj: &serde_json::Map<String, Value>,
    ) -> Result<AvroSchema, SchemaError> {
        let items = obj
            .get("items")
            .ok_or_else(|| SchemaError::InvalidSchema("Array missing 'items' field".to_string()))?;

        let item_schema = self.parse(items)?;
        Ok(AvroSchema::Array(Box::new(item_schema)))
    }

    /// Parse a map schema.
    fn parse_map_schema(
        &mut self,
        obj: &serde_json::Map<String, Value>,
    ) -> Result<AvroSchema, SchemaError> {
        let values = obj
            .get("values")
            .ok_or_else(|| SchemaError::InvalidSchema("Map missing 'values' field".to_string()))?;

        let value_schema = self.parse(values)?;
        Ok(AvroSchema::Map(Box::new(value_schema)))
    }

    /// Parse a fixed schema.
    fn parse_fixed_schema(
        &mut self,
        obj: &serde_json::Map<String, Value>,
    ) -> Result<AvroSchema, SchemaError> {
        let raw_name = obj
            .get("name")
            .and_then(|v| v.as_str())
            .ok_or_else(|| SchemaError::InvalidSchema("Fixed missing 'name' field".to_string()))?;

        let (name, inline_namespace) = split_raw_name(raw_name);
        validate_name(&name, "Fixed")?;

        let namespace = inline_namespace.or_else(|| {
            obj.get("namespace")
                .and_then(|v| v.as_str())
                .map(String::from)
        });

        let fullname = self.qualified_name(&name, &namespace);

        let size =
            obj.get("size").and_then(|v| v.as_u64()).ok_or_else(|| {
                SchemaError::InvalidSchema("Fixed missing 'size' field".to_string())
            })? as usize;

        let fixed_schema = FixedSchema {
            name,
            namespace: split_namespace(&fullname),
            size,
        };

        let schema = AvroSchema::Fixed(fixed_schema);
        self.named_types.insert(fullname, schema.clone());

        Ok(schema)
    }

    /// Qualify an unqualified name against the explicit or current namespace.
    fn qualified_name(&self, name: &str, namespace: &Option<String>) -> String {
        if name.contains('.') {
            return name.to_string();
        }
        match namespace {
            Some(ns) => format!("{}.{}", ns, name),
            None => match &self.current_namespace {
                Some(ns) => format!("{}.{}", ns, name),
                None => name.to_string(),
            },
        }
    }

    /// Resolve a type-reference name against the current namespace.
    fn resolve_name(&self, name: &str) -> String {
        if name.contains('.') {
            return name.to_string();
        }
        match &self.current_namespace {
            Some(ns) => {
                let qualified = format!("{}.{}", ns, name);
                if self.named_types.contains_key(&qualified) {
                    qualified
                } else {
                    name.to_string()
                }
            }
            None => name.to_string(),
        }
    }
}

/// Validate an Avro name: starts with [A-Za-z_], contains only [A-Za-z0-9_].
/// Split a possibly-dotted name attribute into (bare name, namespace).
fn split_raw_name(raw: &str) -> (String, Option<String>) {
    match raw.rsplit_once('.') {
        Some((ns, bare)) => (bare.to_string(), Some(ns.to_string())),
        None => (raw.to_string(), None),
    }
}

/// Extract the namespace portion of a qualified fullname.
fn split_namespace(fullname: &str) -> Option<String> {
    fullname.rsplit_once('.').map(|(ns, _)| ns.to_string())
}

fn validate_name(name: &str, kind: &str) -> Result<(), SchemaError> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    };
    if valid {
        Ok(())
    } else {
        Err(SchemaError::InvalidSchema(format!(
            "{} name '{}' is not a valid Avro name",
            kind, name
        )))
    }
}

/// Validate union composition: no immediately nested unions, null at most
/// once, and no duplicate unnamed branches (they would be ambiguous at
/// decode time).
fn validate_union(variants: &[AvroSchema]) -> Result<(), SchemaError> {
    let mut null_count = 0;
    let mut seen_unnamed: Vec<&AvroSchema> = Vec::new();

    for variant in variants {
        match variant {
            AvroSchema::Union(_) => {
                return Err(SchemaError::InvalidSchema(
                    "Union cannot immediately contain another union".to_string(),
                ));
            }
            AvroSchema::Null => {
                null_count += 1;
                if null_count > 1 {
                    return Err(SchemaError::InvalidSchema(
                        "Union may contain null at most once".to_string(),
                    ));
                }
            }
            other if !other.is_named() && !matches!(other, AvroSchema::Named(_)) => {
                if seen_unnamed
                    .iter()
                    .any(|s| std::mem::discriminant(*s) == std::mem::discriminant(other))
                {
                    return Err(SchemaError::InvalidSchema(
                        "Union contains duplicate branch types".to_string(),
                    ));
                }
                seen_unnamed.push(other);
            }
            _ => {}
        }
    }

    Ok(())
}
