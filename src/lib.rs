//! Decode Avro object container files into in-memory columnar tables.
//!
//! A single forward pass over the container: parse the header (embedded
//! JSON schema, codec, sync marker), then pull data blocks in file order,
//! decompress each, and decode records field by field into typed column
//! buffers. Projection by column name or wire index is resolved up front;
//! dropped fields are still parsed off the wire (the format is row-major)
//! but never materialized. Reads can stop early via a row limit, cutting
//! the last block mid-way and skipping everything after it.
//!
//! ```no_run
//! use avrotable::{read_path, ReadOptions};
//!
//! let table = read_path(
//!     "events.avro",
//!     &ReadOptions::new().column_names(["id", "name"]).n_rows(1000),
//! )?;
//! assert_eq!(table.num_columns(), 2);
//! # Ok::<(), avrotable::ReadError>(())
//! ```

pub mod api;
pub mod codec;
pub mod error;
pub mod reader;
pub mod schema;
pub mod source;
pub mod table;

pub use api::{read_avro, read_bytes, read_path, ReadOptions};
pub use error::{
    CodecError, DecodeError, ProjectionError, ReadError, SchemaError, SourceError,
};
pub use schema::{AvroSchema, ColumnSelection};
pub use table::{Column, ColumnData, ColumnType, Table};
