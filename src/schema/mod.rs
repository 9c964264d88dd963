//! Avro schema parsing, representation, and projection resolution.

mod parser;
mod projection;
mod types;

pub use parser::{parse_schema, SchemaParser};
pub use projection::{
    resolve_projection, ColumnSelection, ResolvedProjection, WireField,
};
pub use types::{
    AvroSchema, EnumSchema, FieldSchema, FixedSchema, NamedTypes, RecordSchema,
};
