//! Error types for the Avro decoding pipeline

use std::io;
use thiserror::Error;

/// Errors that can occur during schema operations
#[derive(Debug, Error)]
pub enum SchemaError {
    /// Invalid schema structure
    #[error("Invalid schema: {0}")]
    InvalidSchema(String),
    /// Unsupported schema type
    #[error("Unsupported type: {0}")]
    UnsupportedType(String),
    /// Schema JSON parsing error
    #[error("Parse error: {0}")]
    ParseError(String),
    /// Named type reference that resolves to nothing
    #[error("Unresolved named type: {0}")]
    UnresolvedReference(String),
}

/// Errors that can occur during codec operations
#[derive(Debug, Error)]
pub enum CodecError {
    /// Unsupported codec
    #[error("Unsupported codec: {0}")]
    UnsupportedCodec(String),
    /// Decompression error
    #[error("Decompression error: {0}")]
    DecompressionError(String),
}

/// Errors that can occur while decoding binary values
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Invalid Avro data
    #[error("Invalid data: {0}")]
    InvalidData(String),
    /// Unexpected end of data
    #[error("Unexpected end of data")]
    UnexpectedEof,
    /// Invalid varint encoding
    #[error("Invalid varint encoding")]
    InvalidVarint,
    /// Decoded value does not match the declared column type
    #[error("Type mismatch: {0}")]
    TypeMismatch(String),
    /// String is not valid UTF-8
    #[error("Invalid UTF-8: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),
}

/// Errors that can occur while resolving a column projection
#[derive(Debug, Error)]
pub enum ProjectionError {
    /// Requested column name does not exist in the schema
    #[error("Unknown column: '{0}'")]
    UnknownColumn(String),
    /// Requested column index is out of range
    #[error("Column index {index} out of range for record with {field_count} fields")]
    IndexOutOfRange { index: usize, field_count: usize },
    /// Same column selected more than once
    #[error("Column '{0}' selected more than once")]
    DuplicateColumn(String),
    /// Names and indices mixed in one selection
    #[error("Columns must be selected by name or by index, not both")]
    MixedSelection,
}

/// Errors that can occur with byte sources
#[derive(Debug, Error)]
pub enum SourceError {
    /// File system error
    #[error("File system error: {0}")]
    FileSystemError(String),
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    /// Path not found
    #[error("Not found: {0}")]
    NotFound(String),
    /// Permission denied
    #[error("Permission denied: {0}")]
    PermissionDenied(String),
}

/// Top-level error type for a read
#[derive(Debug, Error)]
pub enum ReadError {
    /// Source error
    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    /// Invalid magic bytes
    #[error("Invalid magic bytes: expected 'Obj\\x01', found {0:?}")]
    InvalidMagic([u8; 4]),

    /// Malformed container structure at a specific offset
    #[error("Format error at offset {offset}: {message}")]
    Format { offset: u64, message: String },

    /// Schema error
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    /// Projection error
    #[error("Projection error: {0}")]
    Projection(#[from] ProjectionError),

    /// Codec error
    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    /// Sync marker after a block does not match the header's
    #[error("Corrupt container: sync marker mismatch after block {block_index} at offset {offset}")]
    CorruptContainer { block_index: usize, offset: u64 },

    /// Decode error in a block/record, with the byte offset into the
    /// decompressed block payload
    #[error("Decode error in block {block_index}, record {record_index}, offset {offset}: {message}")]
    Decode {
        block_index: usize,
        record_index: usize,
        offset: u64,
        message: String,
    },

    /// Projection resolved to zero columns, so no table can be produced
    #[error("Projection selected no columns")]
    EmptyResult,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_error_display_includes_position() {
        let err = ReadError::Decode {
            block_index: 2,
            record_index: 7,
            offset: 133,
            message: "bad union tag".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("block 2"));
        assert!(msg.contains("record 7"));
        assert!(msg.contains("offset 133"));
    }

    #[test]
    fn test_error_conversion_from_codec() {
        let err: ReadError = CodecError::UnsupportedCodec("lz77".to_string()).into();
        assert!(matches!(
            err,
            ReadError::Codec(CodecError::UnsupportedCodec(_))
        ));
    }

    #[test]
    fn test_corrupt_container_display() {
        let err = ReadError::CorruptContainer {
            block_index: 0,
            offset: 64,
        };
        assert!(err.to_string().contains("sync marker mismatch"));
    }
}
