//! Avro data block parsing and iteration
//!
//! Each data block is framed as:
//! - Row count (zigzag varint)
//! - Compressed payload size (zigzag varint)
//! - Payload bytes
//! - 16-byte sync marker, which must equal the header's
//!
//! `BlockReader` orchestrates header parsing and forward-only block
//! iteration over a `ByteSource`.

use bytes::Bytes;
use tracing::debug;

use crate::error::ReadError;
use crate::source::ByteSource;

use super::header::Header;
use super::varint::decode_zigzag_with_offset;

/// Size of the sync marker in bytes
const SYNC_MARKER_SIZE: usize = 16;

/// Default read chunk size for fetching data from the source
const DEFAULT_READ_CHUNK_SIZE: usize = 64 * 1024;

/// A single data block from an Avro container.
#[derive(Debug, Clone)]
pub struct Block {
    /// Number of rows serialized in this block
    pub row_count: usize,
    /// The still-compressed block payload
    pub data: Bytes,
    /// Position of this block in the file (for error reporting)
    pub file_offset: u64,
    /// Sequential block number (0-indexed)
    pub block_index: usize,
}

/// A decompressed block ready for record decoding.
#[derive(Debug, Clone)]
pub struct DecodedBlock {
    /// Number of rows in this block
    pub row_count: usize,
    /// The decompressed payload containing serialized rows
    pub data: Bytes,
    /// Sequential block number (for error reporting)
    pub block_index: usize,
}

impl Block {
    /// Parse a block from raw bytes, validating the trailing sync marker
    /// against the header's.
    ///
    /// Returns the parsed block and the number of bytes consumed.
    ///
    /// # Errors
    /// - `ReadError::Format` if the framing is invalid or truncated
    /// - `ReadError::CorruptContainer` if the sync marker doesn't match
    ///   (hard failure; no resynchronization is attempted)
    pub fn parse(
        bytes: &[u8],
        expected_sync: &[u8; 16],
        file_offset: u64,
        block_index: usize,
    ) -> Result<(Self, usize), ReadError> {
        let mut cursor = bytes;
        let mut offset = 0u64;

        let row_count =
            decode_zigzag_with_offset(&mut cursor, &mut offset).map_err(|e| ReadError::Format {
                offset: file_offset + offset,
                message: format!("Failed to decode block row count: {}", e),
            })?;

        let payload_size =
            decode_zigzag_with_offset(&mut cursor, &mut offset).map_err(|e| ReadError::Format {
                offset: file_offset + offset,
                message: format!("Failed to decode block payload size: {}", e),
            })?;

        if row_count < 0 {
            return Err(ReadError::Format {
                offset: file_offset,
                message: format!("Invalid negative block row count: {}", row_count),
            });
        }

        if payload_size < 0 {
            return Err(ReadError::Format {
                offset: file_offset + offset,
                message: format!("Invalid negative block payload size: {}", payload_size),
            });
        }

        let payload_size = payload_size as usize;

        if cursor.len() < payload_size + SYNC_MARKER_SIZE {
            return Err(ReadError::Format {
                offset: file_offset + offset,
                message: format!(
                    "Not enough bytes for block payload: need {} + {}, have {}",
                    payload_size,
                    SYNC_MARKER_SIZE,
                    cursor.len()
                ),
            });
        }

        let data = Bytes::copy_from_slice(&cursor[..payload_size]);
        cursor = &cursor[payload_size..];
        offset += payload_size as u64;

        let mut sync_marker = [0u8; 16];
        sync_marker.copy_from_slice(&cursor[..SYNC_MARKER_SIZE]);
        offset += SYNC_MARKER_SIZE as u64;

        if &sync_marker != expected_sync {
            return Err(ReadError::CorruptContainer {
                block_index,
                offset: file_offset + offset - SYNC_MARKER_SIZE as u64,
            });
        }

        let block = Block {
            row_count: row_count as usize,
            data,
            file_offset,
            block_index,
        };

        Ok((block, offset as usize))
    }

    /// Check if this block contains no rows.
    pub fn is_empty(&self) -> bool {
        self.row_count == 0
    }
}

/// Reads and parses data blocks from a `ByteSource`.
///
/// A finite, single forward pass: blocks come back in file order and the
/// reader cannot be rewound. The driver stops calling `next_block` once
/// its row limit is met, so trailing blocks are never fetched or
/// decompressed.
#[derive(Debug)]
pub struct BlockReader<S: ByteSource> {
    /// The data source to read from
    source: S,
    /// Parsed file header
    header: Header,
    /// Current read offset in the file
    current_offset: u64,
    /// Current block index (0-indexed)
    block_index: usize,
    /// Total source size (cached)
    source_size: u64,
}

impl<S: ByteSource> BlockReader<S> {
    /// Create a new BlockReader, parsing the container header.
    ///
    /// # Errors
    /// - `ReadError::Source` if reading from the source fails
    /// - Any header parse error (`InvalidMagic`, `Format`, `Schema`, `Codec`)
    pub fn new(source: S) -> Result<Self, ReadError> {
        let source_size = source.size()?;

        // Most headers fit one chunk; large schemas spill into more reads
        let initial_read_size = std::cmp::min(source_size as usize, DEFAULT_READ_CHUNK_SIZE);
        let mut header_bytes = source.read_range(0, initial_read_size)?;

        let header = loop {
            match Header::parse(&header_bytes) {
                Ok(header) => break header,
                Err(ReadError::Format { .. })
                    if (header_bytes.len() as u64) < source_size =>
                {
                    let next_size =
                        std::cmp::min(source_size as usize, header_bytes.len() * 2);
                    header_bytes = source.read_range(0, next_size)?;
                }
                Err(e) => return Err(e),
            }
        };

        Ok(Self {
            source,
            current_offset: header.header_size,
            block_index: 0,
            source_size,
            header,
        })
    }

    /// Read the next block, or `None` at end of file.
    pub fn next_block(&mut self) -> Result<Option<Block>, ReadError> {
        if self.current_offset >= self.source_size {
            return Ok(None);
        }

        let remaining = self.source_size - self.current_offset;
        let read_size = std::cmp::min(remaining as usize, DEFAULT_READ_CHUNK_SIZE);

        let data = self.source.read_range(self.current_offset, read_size)?;

        if data.is_empty() {
            return Ok(None);
        }

        match Block::parse(
            &data,
            &self.header.sync_marker,
            self.current_offset,
            self.block_index,
        ) {
            Ok((block, consumed)) => {
                debug!(
                    block_index = block.block_index,
                    rows = block.row_count,
                    bytes = consumed,
                    "read block"
                );
                self.current_offset += consumed as u64;
                self.block_index += 1;
                Ok(Some(block))
            }
            Err(ReadError::Format { message, .. })
                if message.starts_with("Not enough bytes for block payload") =>
            {
                // Block larger than one chunk; fetch exactly what it needs
                self.read_large_block(&data, remaining as usize)
            }
            Err(e) => Err(e),
        }
    }

    /// Slow path for a block that exceeds the default chunk size.
    fn read_large_block(
        &mut self,
        initial_data: &[u8],
        remaining_in_file: usize,
    ) -> Result<Option<Block>, ReadError> {
        // Re-parse just the two framing varints to learn the payload size
        let mut cursor = initial_data;
        let mut offset = 0u64;

        let _row_count =
            decode_zigzag_with_offset(&mut cursor, &mut offset).map_err(|e| ReadError::Format {
                offset: self.current_offset,
                message: format!("Failed to decode block row count: {}", e),
            })?;

        let payload_size =
            decode_zigzag_with_offset(&mut cursor, &mut offset).map_err(|e| ReadError::Format {
                offset: self.current_offset + offset,
                message: format!("Failed to decode block payload size: {}", e),
            })?;

        if payload_size < 0 {
            return Err(ReadError::Format {
                offset: self.current_offset + offset,
                message: format!("Invalid negative block payload size: {}", payload_size),
            });
        }

        let framing_size = offset as usize;
        let total_needed = framing_size + payload_size as usize + SYNC_MARKER_SIZE;

        if total_needed > remaining_in_file {
            return Err(ReadError::Format {
                offset: self.current_offset,
                message: format!(
                    "Block size {} exceeds remaining file size {}",
                    total_needed, remaining_in_file
                ),
            });
        }

        let data = self.source.read_range(self.current_offset, total_needed)?;

        let (block, consumed) = Block::parse(
            &data,
            &self.header.sync_marker,
            self.current_offset,
            self.block_index,
        )?;

        self.current_offset += consumed as u64;
        self.block_index += 1;
        Ok(Some(block))
    }

    /// Decompress a block's payload using the codec from the header.
    pub fn decompress(&self, block: &Block) -> Result<DecodedBlock, ReadError> {
        let data = self
            .header
            .codec
            .decompress(&block.data)
            .map_err(ReadError::Codec)?;
        Ok(DecodedBlock {
            row_count: block.row_count,
            data: Bytes::from(data),
            block_index: block.block_index,
        })
    }

    /// Get a reference to the parsed header.
    pub fn header(&self) -> &Header {
        &self.header
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::varint::encode_zigzag;
    use crate::source::MemorySource;

    const SYNC: [u8; 16] = [
        0xDE, 0xAD, 0xBE, 0xEF, 0xCA, 0xFE, 0xBA, 0xBE, 0x12, 0x34, 0x56, 0x78, 0x9A, 0xBC, 0xDE,
        0xF0,
    ];

    fn frame_block(rows: i64, payload: &[u8], sync: &[u8; 16]) -> Vec<u8> {
        let mut out = encode_zigzag(rows);
        out.extend(encode_zigzag(payload.len() as i64));
        out.extend_from_slice(payload);
        out.extend_from_slice(sync);
        out
    }

    fn header_bytes(schema_json: &str) -> Vec<u8> {
        let mut header = Vec::new();
        header.extend_from_slice(&super::super::header::AVRO_MAGIC);
        header.extend_from_slice(&encode_zigzag(1));
        header.extend_from_slice(&encode_zigzag(11));
        header.extend_from_slice(b"avro.schema");
        header.extend_from_slice(&encode_zigzag(schema_json.len() as i64));
        header.extend_from_slice(schema_json.as_bytes());
        header.push(0x00);
        header.extend_from_slice(&SYNC);
        header
    }

    #[test]
    fn test_parse_block() {
        let payload = [0x02, 0x04, 0x06];
        let framed = frame_block(3, &payload, &SYNC);

        let (block, consumed) = Block::parse(&framed, &SYNC, 100, 0).unwrap();
        assert_eq!(block.row_count, 3);
        assert_eq!(&block.data[..], &payload);
        assert_eq!(block.file_offset, 100);
        assert_eq!(consumed, framed.len());
    }

    #[test]
    fn test_parse_block_sync_mismatch() {
        let mut framed = frame_block(1, &[0x02], &SYNC);
        let len = framed.len();
        framed[len - 1] ^= 0xFF;

        let result = Block::parse(&framed, &SYNC, 0, 4);
        assert!(matches!(
            result,
            Err(ReadError::CorruptContainer { block_index: 4, .. })
        ));
    }

    #[test]
    fn test_parse_block_truncated() {
        let framed = frame_block(1, &[0x02], &SYNC);
        let result = Block::parse(&framed[..framed.len() - 4], &SYNC, 0, 0);
        assert!(matches!(result, Err(ReadError::Format { .. })));
    }

    #[test]
    fn test_parse_block_negative_row_count() {
        let mut framed = encode_zigzag(-1);
        framed.extend(encode_zigzag(0));
        framed.extend_from_slice(&SYNC);
        let result = Block::parse(&framed, &SYNC, 0, 0);
        assert!(matches!(result, Err(ReadError::Format { .. })));
    }

    #[test]
    fn test_block_reader_iterates_in_order() {
        let mut file = header_bytes(r#""long""#);
        file.extend(frame_block(1, &encode_zigzag(7), &SYNC));
        file.extend(frame_block(1, &encode_zigzag(8), &SYNC));

        let mut reader = BlockReader::new(MemorySource::new(file)).unwrap();

        let first = reader.next_block().unwrap().unwrap();
        assert_eq!(first.block_index, 0);
        let second = reader.next_block().unwrap().unwrap();
        assert_eq!(second.block_index, 1);
        assert!(reader.next_block().unwrap().is_none());
    }

    #[test]
    fn test_block_reader_empty_file_has_no_blocks() {
        let file = header_bytes(r#""long""#);
        let mut reader = BlockReader::new(MemorySource::new(file)).unwrap();
        assert!(reader.next_block().unwrap().is_none());
    }

    #[test]
    fn test_block_reader_large_block_slow_path() {
        // Payload bigger than the 64 KiB chunk
        let payload = vec![0x00u8; 100 * 1024];
        let mut file = header_bytes(r#""null""#);
        file.extend(frame_block(payload.len() as i64, &payload, &SYNC));

        let mut reader = BlockReader::new(MemorySource::new(file)).unwrap();
        let block = reader.next_block().unwrap().unwrap();
        assert_eq!(block.data.len(), 100 * 1024);
        assert!(reader.next_block().unwrap().is_none());
    }

    #[test]
    fn test_decompress_null_codec_passthrough() {
        let mut file = header_bytes(r#""long""#);
        file.extend(frame_block(1, &encode_zigzag(9), &SYNC));

        let mut reader = BlockReader::new(MemorySource::new(file)).unwrap();
        let block = reader.next_block().unwrap().unwrap();
        let decoded = reader.decompress(&block).unwrap();
        assert_eq!(&decoded.data[..], &encode_zigzag(9)[..]);
    }
}
