//! Row-by-row record decoding into column builders.
//!
//! Walks each row's fields in wire order: kept fields decode into their
//! output slot's builder, dropped fields are parsed and discarded (the
//! format is row-major, so there is no cheaper way past them).

use crate::error::{DecodeError, ReadError};
use crate::schema::{NamedTypes, ResolvedProjection};
use crate::table::ColumnBuilder;

use super::block::DecodedBlock;
use super::decode::{decode_value, skip_value};

/// Decodes records from decompressed blocks into column builders.
pub struct RowDecoder<'a> {
    projection: &'a ResolvedProjection,
    named_types: &'a NamedTypes,
}

impl<'a> RowDecoder<'a> {
    /// Create a decoder for a resolved projection.
    pub fn new(projection: &'a ResolvedProjection, named_types: &'a NamedTypes) -> Self {
        Self {
            projection,
            named_types,
        }
    }

    /// Decode up to `max_rows` rows from a block into the builders.
    ///
    /// `builders` must have one entry per output column, in slot order.
    /// Returns the number of rows decoded. Decoding fewer rows than the
    /// block holds (row limit reached) leaves the rest of the payload
    /// unread; the caller stops pulling blocks at that point.
    ///
    /// # Errors
    /// `ReadError::Decode` tagged with the block index, record index, and
    /// byte offset within the decompressed payload where decoding failed.
    pub fn decode_block(
        &self,
        block: &DecodedBlock,
        builders: &mut [ColumnBuilder],
        max_rows: usize,
    ) -> Result<usize, ReadError> {
        debug_assert_eq!(builders.len(), self.projection.n_columns());

        let payload_len = block.data.len();
        let mut cursor = &block.data[..];
        let rows_to_decode = std::cmp::min(block.row_count, max_rows);

        for record_index in 0..rows_to_decode {
            self.decode_record(&mut cursor, builders).map_err(|e| {
                ReadError::Decode {
                    block_index: block.block_index,
                    record_index,
                    offset: (payload_len - cursor.len()) as u64,
                    message: e.to_string(),
                }
            })?;
        }

        // A full decode must consume the payload exactly
        if rows_to_decode == block.row_count && !cursor.is_empty() {
            return Err(ReadError::Decode {
                block_index: block.block_index,
                record_index: block.row_count,
                offset: (payload_len - cursor.len()) as u64,
                message: format!(
                    "Block payload has {} trailing bytes after {} rows",
                    cursor.len(),
                    block.row_count
                ),
            });
        }

        Ok(rows_to_decode)
    }

    fn decode_record(
        &self,
        cursor: &mut &[u8],
        builders: &mut [ColumnBuilder],
    ) -> Result<(), DecodeError> {
        for wire_field in &self.projection.wire {
            match wire_field.slot {
                Some(slot) => {
                    let value =
                        decode_value(&wire_field.field.schema, self.named_types, cursor)?;
                    builders[slot].push(value)?;
                }
                None => {
                    skip_value(&wire_field.field.schema, self.named_types, cursor)?;
                }
            }
        }
        Ok(())
    }
}
