//! Avro container header parsing
//!
//! The header is the first section of an Object Container File:
//! - Magic bytes ("Obj\x01")
//! - Metadata map (string -> bytes) carrying the schema JSON and codec name
//! - 16-byte sync marker

use std::collections::HashMap;

use tracing::debug;

use crate::codec::Codec;
use crate::error::{DecodeError, ReadError};
use crate::schema::{parse_schema, AvroSchema};

use super::varint::decode_zigzag_with_offset;

/// The Avro magic bytes that identify an Object Container File.
pub const AVRO_MAGIC: [u8; 4] = [b'O', b'b', b'j', 0x01];

/// Minimum header size: magic (4) + empty map (1) + sync marker (16)
const MIN_HEADER_SIZE: usize = 4 + 1 + 16;

/// Parsed container header.
///
/// Parsing has no side effects beyond advancing the read position; the
/// retained sync marker is what every block's trailing marker is checked
/// against.
#[derive(Debug, Clone)]
pub struct Header {
    /// Metadata key-value pairs from the header
    pub metadata: HashMap<String, Vec<u8>>,
    /// 16-byte sync marker used to validate block boundaries
    pub sync_marker: [u8; 16],
    /// Parsed Avro schema from metadata
    pub schema: AvroSchema,
    /// Compression codec from metadata
    pub codec: Codec,
    /// Total size of the header in bytes (offset where blocks begin)
    pub header_size: u64,
}

impl Header {
    /// Parse a container header from raw bytes positioned at offset 0.
    ///
    /// # Errors
    /// - `ReadError::InvalidMagic` if the magic bytes don't match
    /// - `ReadError::Format` if the metadata map or sync marker is malformed
    /// - `ReadError::Schema` if the embedded schema JSON is invalid
    /// - `ReadError::Codec` if the declared codec is unknown
    pub fn parse(bytes: &[u8]) -> Result<Self, ReadError> {
        if bytes.len() < MIN_HEADER_SIZE {
            return Err(ReadError::Format {
                offset: 0,
                message: format!(
                    "Header too short: expected at least {} bytes, got {}",
                    MIN_HEADER_SIZE,
                    bytes.len()
                ),
            });
        }

        let mut cursor = bytes;
        let mut offset: u64 = 0;

        Self::parse_magic(&mut cursor, &mut offset)?;
        let metadata = Self::parse_metadata(&mut cursor, &mut offset)?;
        let sync_marker = Self::parse_sync_marker(&mut cursor, &mut offset)?;

        let schema = Self::extract_schema(&metadata)?;
        let codec = Self::extract_codec(&metadata)?;

        debug!(
            codec = codec.name(),
            header_size = offset,
            "parsed container header"
        );

        Ok(Self {
            metadata,
            sync_marker,
            schema,
            codec,
            header_size: offset,
        })
    }

    /// Parse and validate the magic bytes.
    fn parse_magic(cursor: &mut &[u8], offset: &mut u64) -> Result<(), ReadError> {
        if cursor.len() < 4 {
            return Err(ReadError::Format {
                offset: *offset,
                message: "Not enough bytes for magic".to_string(),
            });
        }

        let mut magic = [0u8; 4];
        magic.copy_from_slice(&cursor[..4]);
        *cursor = &cursor[4..];
        *offset += 4;

        if magic != AVRO_MAGIC {
            return Err(ReadError::InvalidMagic(magic));
        }

        Ok(())
    }

    /// Parse the metadata map.
    ///
    /// The map uses Avro's block framing: a series of counts followed by
    /// key-value pairs, terminated by a zero count. A negative count means
    /// abs(count) pairs preceded by the run's byte length.
    fn parse_metadata(
        cursor: &mut &[u8],
        offset: &mut u64,
    ) -> Result<HashMap<String, Vec<u8>>, ReadError> {
        let mut metadata = HashMap::new();

        loop {
            let count =
                decode_zigzag_with_offset(cursor, offset).map_err(|e| ReadError::Format {
                    offset: *offset,
                    message: format!("Failed to decode metadata block count: {}", e),
                })?;

            if count == 0 {
                break;
            }

            let actual_count = if count < 0 {
                let _run_bytes =
                    decode_zigzag_with_offset(cursor, offset).map_err(|e| ReadError::Format {
                        offset: *offset,
                        message: format!("Failed to decode metadata block size: {}", e),
                    })?;
                count.unsigned_abs() as usize
            } else {
                count as usize
            };

            for _ in 0..actual_count {
                let key = decode_string(cursor, offset).map_err(|e| ReadError::Format {
                    offset: *offset,
                    message: format!("Failed to decode metadata key: {}", e),
                })?;

                let value = decode_bytes(cursor, offset).map_err(|e| ReadError::Format {
                    offset: *offset,
                    message: format!("Failed to decode metadata value for key '{}': {}", key, e),
                })?;

                metadata.insert(key, value);
            }
        }

        Ok(metadata)
    }

    /// Parse the 16-byte sync marker.
    fn parse_sync_marker(cursor: &mut &[u8], offset: &mut u64) -> Result<[u8; 16], ReadError> {
        if cursor.len() < 16 {
            return Err(ReadError::Format {
                offset: *offset,
                message: format!(
                    "Not enough bytes for sync marker: expected 16, got {}",
                    cursor.len()
                ),
            });
        }

        let mut sync_marker = [0u8; 16];
        sync_marker.copy_from_slice(&cursor[..16]);
        *cursor = &cursor[16..];
        *offset += 16;

        Ok(sync_marker)
    }

    /// Extract and parse the schema from metadata.
    fn extract_schema(metadata: &HashMap<String, Vec<u8>>) -> Result<AvroSchema, ReadError> {
        let schema_bytes = metadata
            .get("avro.schema")
            .ok_or_else(|| ReadError::Format {
                offset: 0,
                message: "Missing 'avro.schema' in metadata".to_string(),
            })?;

        let schema_json = std::str::from_utf8(schema_bytes).map_err(|e| ReadError::Format {
            offset: 0,
            message: format!("Schema is not valid UTF-8: {}", e),
        })?;

        parse_schema(schema_json).map_err(ReadError::Schema)
    }

    /// Extract the codec from metadata; absent means uncompressed.
    fn extract_codec(metadata: &HashMap<String, Vec<u8>>) -> Result<Codec, ReadError> {
        match metadata.get("avro.codec") {
            Some(codec_bytes) => {
                let codec_name = std::str::from_utf8(codec_bytes).map_err(|e| ReadError::Format {
                    offset: 0,
                    message: format!("Codec name is not valid UTF-8: {}", e),
                })?;
                Codec::from_name(codec_name).map_err(ReadError::Codec)
            }
            None => Ok(Codec::Null),
        }
    }

    /// Get the schema as a JSON string.
    pub fn schema_json(&self) -> String {
        self.schema.to_json()
    }

    /// Get a metadata value by key.
    pub fn get_metadata(&self, key: &str) -> Option<&[u8]> {
        self.metadata.get(key).map(|v| v.as_slice())
    }

    /// Get a metadata value as a string.
    pub fn get_metadata_string(&self, key: &str) -> Option<&str> {
        self.metadata
            .get(key)
            .and_then(|v| std::str::from_utf8(v).ok())
    }
}

/// Decode a length-prefixed string.
fn decode_string(cursor: &mut &[u8], offset: &mut u64) -> Result<String, DecodeError> {
    let bytes = decode_bytes(cursor, offset)?;
    String::from_utf8(bytes).map_err(DecodeError::InvalidUtf8)
}

/// Decode length-prefixed bytes.
fn decode_bytes(cursor: &mut &[u8], offset: &mut u64) -> Result<Vec<u8>, DecodeError> {
    let len = decode_zigzag_with_offset(cursor, offset)?;

    if len < 0 {
        return Err(DecodeError::InvalidData(format!(
            "Negative length for bytes: {}",
            len
        )));
    }

    let len = len as usize;

    if cursor.len() < len {
        return Err(DecodeError::UnexpectedEof);
    }

    let bytes = cursor[..len].to_vec();
    *cursor = &cursor[len..];
    *offset += len as u64;

    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::super::varint::encode_zigzag;
    use super::*;

    /// Build a minimal valid container header
    fn create_test_header(schema_json: &str, codec: Option<&str>) -> Vec<u8> {
        let mut header = Vec::new();

        header.extend_from_slice(&AVRO_MAGIC);

        let entry_count: i64 = if codec.is_some() { 2 } else { 1 };
        header.extend_from_slice(&encode_zigzag(entry_count));

        let schema_key = b"avro.schema";
        header.extend_from_slice(&encode_zigzag(schema_key.len() as i64));
        header.extend_from_slice(schema_key);
        header.extend_from_slice(&encode_zigzag(schema_json.len() as i64));
        header.extend_from_slice(schema_json.as_bytes());

        if let Some(codec_name) = codec {
            let codec_key = b"avro.codec";
            header.extend_from_slice(&encode_zigzag(codec_key.len() as i64));
            header.extend_from_slice(codec_key);
            header.extend_from_slice(&encode_zigzag(codec_name.len() as i64));
            header.extend_from_slice(codec_name.as_bytes());
        }

        header.push(0x00); // end of map

        header.extend_from_slice(&[
            0xDE, 0xAD, 0xBE, 0xEF, 0xCA, 0xFE, 0xBA, 0xBE, 0x12, 0x34, 0x56, 0x78, 0x9A, 0xBC,
            0xDE, 0xF0,
        ]);

        header
    }

    #[test]
    fn test_parse_header_simple_schema() {
        let header_bytes = create_test_header(r#""string""#, None);
        let header = Header::parse(&header_bytes).unwrap();

        assert_eq!(header.codec, Codec::Null);
        assert!(matches!(header.schema, AvroSchema::String));
        assert_eq!(
            header.sync_marker,
            [
                0xDE, 0xAD, 0xBE, 0xEF, 0xCA, 0xFE, 0xBA, 0xBE, 0x12, 0x34, 0x56, 0x78, 0x9A,
                0xBC, 0xDE, 0xF0
            ]
        );
        assert_eq!(header.header_size as usize, header_bytes.len());
    }

    #[test]
    fn test_parse_header_with_codec() {
        let header_bytes = create_test_header(r#""int""#, Some("deflate"));
        let header = Header::parse(&header_bytes).unwrap();
        assert_eq!(header.codec, Codec::Deflate);
    }

    #[test]
    fn test_parse_header_record_schema() {
        let schema = r#"{"type":"record","name":"Test","fields":[{"name":"id","type":"int"}]}"#;
        let header_bytes = create_test_header(schema, None);
        let header = Header::parse(&header_bytes).unwrap();

        match &header.schema {
            AvroSchema::Record(r) => {
                assert_eq!(r.name, "Test");
                assert_eq!(r.fields.len(), 1);
                assert_eq!(r.fields[0].name, "id");
            }
            _ => panic!("Expected Record schema"),
        }
    }

    #[test]
    fn test_parse_header_too_short() {
        let data = [b'O', b'b', b'j'];
        assert!(matches!(
            Header::parse(&data),
            Err(ReadError::Format { .. })
        ));
    }

    #[test]
    fn test_parse_header_invalid_magic() {
        let mut header_bytes = create_test_header(r#""null""#, None);
        header_bytes[0] = b'X';
        assert!(matches!(
            Header::parse(&header_bytes),
            Err(ReadError::InvalidMagic(_))
        ));
    }

    #[test]
    fn test_parse_header_missing_schema() {
        let mut header = Vec::new();
        header.extend_from_slice(&AVRO_MAGIC);
        header.push(0x00); // empty metadata map
        header.extend_from_slice(&[0u8; 16]);

        assert!(matches!(
            Header::parse(&header),
            Err(ReadError::Format { .. })
        ));
    }

    #[test]
    fn test_parse_header_invalid_schema_json() {
        let header_bytes = create_test_header(r#"{"invalid json"#, None);
        assert!(matches!(
            Header::parse(&header_bytes),
            Err(ReadError::Schema(_))
        ));
    }

    #[test]
    fn test_parse_header_unknown_codec() {
        let header_bytes = create_test_header(r#""string""#, Some("unknown_codec"));
        assert!(matches!(
            Header::parse(&header_bytes),
            Err(ReadError::Codec(_))
        ));
    }

    #[test]
    fn test_header_metadata_accessors() {
        let header_bytes = create_test_header(r#""string""#, Some("snappy"));
        let header = Header::parse(&header_bytes).unwrap();

        assert!(header.get_metadata("avro.schema").is_some());
        assert_eq!(header.get_metadata_string("avro.codec"), Some("snappy"));
        assert!(header.get_metadata("nonexistent").is_none());
        assert_eq!(header.schema_json(), r#""string""#);
    }
}
