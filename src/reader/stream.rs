//! The read pipeline: header to blocks to rows to a table.
//!
//! `TableReader` drives one finite forward pass over a container. All
//! fail-fast validation (schema shape, projection, codec support) happens
//! at open time, before any data block is touched. Any error during the
//! pass is terminal; no partial table is produced.

use std::sync::Arc;

use tracing::debug;

use crate::error::{ReadError, SchemaError};
use crate::schema::{
    resolve_projection, ColumnSelection, NamedTypes, RecordSchema, ResolvedProjection,
};
use crate::source::ByteSource;
use crate::table::{ColumnBuilder, Table};

use super::block::BlockReader;
use super::row::RowDecoder;

/// Cap on the per-column preallocation when a row limit is not given
const DEFAULT_BUILDER_CAPACITY: usize = 1024;

/// Reads an Avro container into a columnar table.
#[derive(Debug)]
pub struct TableReader<S: ByteSource> {
    blocks: BlockReader<S>,
    record: RecordSchema,
    named_types: NamedTypes,
    projection: ResolvedProjection,
    row_limit: Option<usize>,
}

impl<S: ByteSource> TableReader<S> {
    /// Open a container: parse the header and validate everything needed
    /// for the pass before reading any data block.
    ///
    /// # Errors
    /// - `ReadError::InvalidMagic` / `ReadError::Format` for a malformed header
    /// - `ReadError::Schema` if the schema is invalid or not a record at
    ///   the top level
    /// - `ReadError::Projection` for an unresolvable column selection
    /// - `ReadError::EmptyResult` if the projection keeps zero columns
    /// - `ReadError::Codec` if the declared codec is not compiled in
    pub fn open(
        source: S,
        selection: Option<&ColumnSelection>,
        row_limit: Option<usize>,
    ) -> Result<Self, ReadError> {
        let blocks = BlockReader::new(source)?;
        let header = blocks.header();

        let record = match &header.schema {
            crate::schema::AvroSchema::Record(record) => record.clone(),
            other => {
                return Err(ReadError::Schema(SchemaError::UnsupportedType(format!(
                    "Top-level schema must be a record, got: {}",
                    other.to_json()
                ))))
            }
        };

        let named_types = NamedTypes::from_schema(&header.schema);
        let projection = resolve_projection(selection, &record)?;

        if projection.n_columns() == 0 {
            return Err(ReadError::EmptyResult);
        }

        // Fail before block reads rather than at first decompression
        header.codec.ensure_supported()?;

        debug!(
            schema = %record.fullname(),
            codec = header.codec.name(),
            columns = projection.n_columns(),
            "opened container"
        );

        Ok(Self {
            blocks,
            record,
            named_types,
            projection,
            row_limit,
        })
    }

    /// The writer schema's record, as embedded in the header.
    pub fn record_schema(&self) -> &RecordSchema {
        &self.record
    }

    /// Output column names, in projection order.
    pub fn column_names(&self) -> Vec<Arc<str>> {
        self.projection
            .output
            .iter()
            .map(|(name, _)| Arc::clone(name))
            .collect()
    }

    /// Consume the reader, decoding blocks until the row limit is met or
    /// the file ends.
    ///
    /// A limit of zero, or a container with no data blocks, yields a
    /// zero-row table that still carries the projected columns.
    pub fn read_all(mut self) -> Result<Table, ReadError> {
        let capacity = self
            .row_limit
            .map(|n| n.min(DEFAULT_BUILDER_CAPACITY))
            .unwrap_or(DEFAULT_BUILDER_CAPACITY);

        let mut builders: Vec<ColumnBuilder> = self
            .projection
            .output
            .iter()
            .map(|(name, schema)| {
                ColumnBuilder::new(Arc::clone(name), schema.clone(), &self.named_types, capacity)
            })
            .collect();

        let decoder = RowDecoder::new(&self.projection, &self.named_types);
        let mut rows_emitted = 0usize;

        loop {
            let remaining = match self.row_limit {
                Some(limit) => {
                    if rows_emitted >= limit {
                        break;
                    }
                    limit - rows_emitted
                }
                None => usize::MAX,
            };

            let block = match self.blocks.next_block()? {
                Some(block) => block,
                None => break,
            };

            if block.is_empty() {
                continue;
            }

            let decoded = self.blocks.decompress(&block)?;
            rows_emitted += decoder.decode_block(&decoded, &mut builders, remaining)?;
        }

        debug!(rows = rows_emitted, "finished read");

        Ok(Table::new(
            builders.into_iter().map(ColumnBuilder::finish).collect(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{CodecError, ProjectionError};
    use crate::reader::varint::encode_zigzag;
    use crate::source::MemorySource;
    use crate::table::ColumnData;

    const SYNC: [u8; 16] = [7u8; 16];

    const ROW_SCHEMA: &str = r#"{"type":"record","name":"Row","fields":[{"name":"id","type":"long"},{"name":"name","type":"string"},{"name":"age","type":"long"}]}"#;

    fn container(schema_json: &str, blocks: &[(usize, Vec<u8>)]) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&crate::reader::AVRO_MAGIC);
        out.extend_from_slice(&encode_zigzag(1));
        out.extend_from_slice(&encode_zigzag(11));
        out.extend_from_slice(b"avro.schema");
        out.extend_from_slice(&encode_zigzag(schema_json.len() as i64));
        out.extend_from_slice(schema_json.as_bytes());
        out.push(0x00);
        out.extend_from_slice(&SYNC);
        for (rows, payload) in blocks {
            out.extend(encode_zigzag(*rows as i64));
            out.extend(encode_zigzag(payload.len() as i64));
            out.extend_from_slice(payload);
            out.extend_from_slice(&SYNC);
        }
        out
    }

    fn encode_row(id: i64, name: &str, age: i64) -> Vec<u8> {
        let mut out = encode_zigzag(id);
        out.extend(encode_zigzag(name.len() as i64));
        out.extend_from_slice(name.as_bytes());
        out.extend(encode_zigzag(age));
        out
    }

    fn three_row_container() -> Vec<u8> {
        let payload: Vec<u8> = [
            encode_row(1, "Alice", 20),
            encode_row(2, "Bob", 30),
            encode_row(3, "Alex", 40),
        ]
        .concat();
        container(ROW_SCHEMA, &[(3, payload)])
    }

    #[test]
    fn test_read_all_columns() {
        let reader =
            TableReader::open(MemorySource::new(three_row_container()), None, None).unwrap();
        let table = reader.read_all().unwrap();

        assert_eq!(table.num_rows(), 3);
        assert_eq!(table.num_columns(), 3);
        assert_eq!(
            table.column("id").unwrap().data,
            ColumnData::Int64(vec![Some(1), Some(2), Some(3)])
        );
        assert_eq!(
            table.column("name").unwrap().data,
            ColumnData::Utf8(vec![
                Some("Alice".to_string()),
                Some("Bob".to_string()),
                Some("Alex".to_string())
            ])
        );
    }

    #[test]
    fn test_projection_order_is_output_order() {
        let selection = ColumnSelection::from_names(["name", "id"]);
        let reader = TableReader::open(
            MemorySource::new(three_row_container()),
            Some(&selection),
            None,
        )
        .unwrap();
        let table = reader.read_all().unwrap();

        assert_eq!(table.num_columns(), 2);
        assert_eq!(table.column_at(0).unwrap().name.as_ref(), "name");
        assert_eq!(table.column_at(1).unwrap().name.as_ref(), "id");
    }

    #[test]
    fn test_row_limit_cuts_block() {
        let reader = TableReader::open(
            MemorySource::new(three_row_container()),
            None,
            Some(2),
        )
        .unwrap();
        let table = reader.read_all().unwrap();
        assert_eq!(table.num_rows(), 2);
        assert_eq!(
            table.column("id").unwrap().data,
            ColumnData::Int64(vec![Some(1), Some(2)])
        );
    }

    #[test]
    fn test_row_limit_zero() {
        let reader = TableReader::open(
            MemorySource::new(three_row_container()),
            None,
            Some(0),
        )
        .unwrap();
        let table = reader.read_all().unwrap();
        assert_eq!(table.num_rows(), 0);
        assert_eq!(table.num_columns(), 3);
    }

    #[test]
    fn test_no_blocks_yields_empty_table() {
        let file = container(ROW_SCHEMA, &[]);
        let reader = TableReader::open(MemorySource::new(file), None, None).unwrap();
        let table = reader.read_all().unwrap();
        assert_eq!(table.num_rows(), 0);
        assert_eq!(table.num_columns(), 3);
    }

    #[test]
    fn test_non_record_schema_rejected() {
        let file = container(r#""long""#, &[]);
        let err = TableReader::open(MemorySource::new(file), None, None).unwrap_err();
        assert!(matches!(err, ReadError::Schema(SchemaError::UnsupportedType(_))));
    }

    #[test]
    fn test_bad_projection_fails_before_blocks() {
        // The data block is garbage; an unknown column must fail first
        let file = container(ROW_SCHEMA, &[(1, vec![0xFF, 0xFF, 0xFF])]);
        let selection = ColumnSelection::from_names(["missing"]);
        let err = TableReader::open(MemorySource::new(file), Some(&selection), None)
            .unwrap_err();
        assert!(matches!(
            err,
            ReadError::Projection(ProjectionError::UnknownColumn(_))
        ));
    }

    #[test]
    fn test_empty_selection_is_empty_result() {
        let selection = ColumnSelection::from_names(Vec::<String>::new());
        let err = TableReader::open(
            MemorySource::new(three_row_container()),
            Some(&selection),
            None,
        )
        .unwrap_err();
        assert!(matches!(err, ReadError::EmptyResult));
    }

    #[test]
    fn test_corrupt_sync_marker() {
        let mut file = three_row_container();
        let len = file.len();
        file[len - 1] ^= 0xFF;
        let reader = TableReader::open(MemorySource::new(file), None, None).unwrap();
        let err = reader.read_all().unwrap_err();
        assert!(matches!(err, ReadError::CorruptContainer { block_index: 0, .. }));
    }

    #[test]
    fn test_unknown_codec_name_is_codec_error() {
        let schema_json = ROW_SCHEMA;
        let mut out = Vec::new();
        out.extend_from_slice(&crate::reader::AVRO_MAGIC);
        out.extend_from_slice(&encode_zigzag(2));
        out.extend_from_slice(&encode_zigzag(11));
        out.extend_from_slice(b"avro.schema");
        out.extend_from_slice(&encode_zigzag(schema_json.len() as i64));
        out.extend_from_slice(schema_json.as_bytes());
        out.extend_from_slice(&encode_zigzag(10));
        out.extend_from_slice(b"avro.codec");
        out.extend_from_slice(&encode_zigzag(6));
        out.extend_from_slice(b"brotli");
        out.push(0x00);
        out.extend_from_slice(&SYNC);

        let err = TableReader::open(MemorySource::new(out), None, None).unwrap_err();
        assert!(matches!(
            err,
            ReadError::Codec(CodecError::UnsupportedCodec(_))
        ));
    }
}
