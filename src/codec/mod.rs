//! Compression codec support for Avro blocks
//!
//! Avro block payloads may be compressed with one of several codecs named
//! in the container metadata. This module provides the codec abstraction
//! and the decompression implementations.

use crate::error::CodecError;

#[cfg(feature = "snappy")]
use snap::raw::Decoder as SnappyDecoder;

#[cfg(feature = "deflate")]
use flate2::read::DeflateDecoder;

#[cfg(feature = "bzip2")]
use bzip2::read::BzDecoder;

#[cfg(feature = "xz")]
use xz2::read::XzDecoder;

#[cfg(any(
    feature = "deflate",
    feature = "zstd",
    feature = "bzip2",
    feature = "xz"
))]
use std::io::Read;

/// Compression codec used within Avro blocks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Codec {
    /// No compression (passthrough)
    #[default]
    Null,
    /// Snappy compression with Avro framing (4-byte CRC32 suffix)
    Snappy,
    /// Deflate (raw DEFLATE, RFC 1951) compression
    Deflate,
    /// Zstandard compression
    Zstd,
    /// Bzip2 compression
    Bzip2,
    /// XZ/LZMA compression
    Xz,
}

impl Codec {
    /// Parse a codec from its name string as found in Avro metadata.
    ///
    /// New codec names may appear in files this decoder has never seen, so
    /// an unknown name is a normal error at file-open time.
    pub fn from_name(name: &str) -> Result<Self, CodecError> {
        match name {
            "null" => Ok(Codec::Null),
            "snappy" => Ok(Codec::Snappy),
            "deflate" => Ok(Codec::Deflate),
            "zstd" | "zstandard" => Ok(Codec::Zstd),
            "bzip2" => Ok(Codec::Bzip2),
            "xz" => Ok(Codec::Xz),
            unknown => Err(CodecError::UnsupportedCodec(format!(
                "Unknown codec '{}'. Supported codecs: null, snappy, deflate, zstd/zstandard, bzip2, xz",
                unknown
            ))),
        }
    }

    /// Get the canonical name of this codec as it appears in file metadata.
    pub fn name(&self) -> &'static str {
        match self {
            Codec::Null => "null",
            Codec::Snappy => "snappy",
            Codec::Deflate => "deflate",
            Codec::Zstd => "zstd",
            Codec::Bzip2 => "bzip2",
            Codec::Xz => "xz",
        }
    }

    /// Check that this codec's implementation is compiled in.
    ///
    /// Called right after header parsing so an unusable codec fails before
    /// any block is fetched or decompressed.
    pub fn ensure_supported(&self) -> Result<(), CodecError> {
        let enabled = match self {
            Codec::Null => true,
            Codec::Snappy => cfg!(feature = "snappy"),
            Codec::Deflate => cfg!(feature = "deflate"),
            Codec::Zstd => cfg!(feature = "zstd"),
            Codec::Bzip2 => cfg!(feature = "bzip2"),
            Codec::Xz => cfg!(feature = "xz"),
        };
        if enabled {
            Ok(())
        } else {
            Err(CodecError::UnsupportedCodec(format!(
                "Codec '{}' not enabled. Enable the '{}' feature.",
                self.name(),
                self.name()
            )))
        }
    }

    /// Decompress a block payload using this codec.
    ///
    /// For the null codec this is a passthrough copy of the input.
    pub fn decompress(&self, data: &[u8]) -> Result<Vec<u8>, CodecError> {
        match self {
            Codec::Null => Ok(data.to_vec()),
            #[cfg(feature = "snappy")]
            Codec::Snappy => decompress_snappy(data),
            #[cfg(feature = "deflate")]
            Codec::Deflate => decompress_deflate(data),
            #[cfg(feature = "zstd")]
            Codec::Zstd => decompress_zstd(data),
            #[cfg(feature = "bzip2")]
            Codec::Bzip2 => decompress_bzip2(data),
            #[cfg(feature = "xz")]
            Codec::Xz => decompress_xz(data),
            #[allow(unreachable_patterns)]
            other => Err(CodecError::UnsupportedCodec(format!(
                "Codec '{}' not enabled. Enable the '{}' feature.",
                other.name(),
                other.name()
            ))),
        }
    }
}

/// Decompress snappy data with Avro framing.
///
/// Avro frames snappy blocks as the compressed data followed by a 4-byte
/// big-endian CRC32 (ISO polynomial, not CRC32C) of the uncompressed data.
#[cfg(feature = "snappy")]
fn decompress_snappy(data: &[u8]) -> Result<Vec<u8>, CodecError> {
    const CRC_SIZE: usize = 4;

    if data.len() < CRC_SIZE {
        return Err(CodecError::DecompressionError(
            "Snappy data too short: missing CRC checksum".to_string(),
        ));
    }

    let compressed_data = &data[..data.len() - CRC_SIZE];
    let crc_bytes = &data[data.len() - CRC_SIZE..];
    let expected_crc = u32::from_be_bytes([crc_bytes[0], crc_bytes[1], crc_bytes[2], crc_bytes[3]]);

    let decompressed = if compressed_data.is_empty() {
        Vec::new()
    } else {
        let mut decoder = SnappyDecoder::new();
        decoder.decompress_vec(compressed_data).map_err(|e| {
            CodecError::DecompressionError(format!("Snappy decompression failed: {}", e))
        })?
    };

    let actual_crc = crc32fast::hash(&decompressed);
    if actual_crc != expected_crc {
        return Err(CodecError::DecompressionError(format!(
            "Snappy CRC32 checksum mismatch: expected 0x{:08X}, got 0x{:08X}",
            expected_crc, actual_crc
        )));
    }

    Ok(decompressed)
}

/// Decompress raw DEFLATE data (no zlib or gzip wrapper).
#[cfg(feature = "deflate")]
fn decompress_deflate(data: &[u8]) -> Result<Vec<u8>, CodecError> {
    if data.is_empty() {
        return Ok(Vec::new());
    }

    let mut decoder = DeflateDecoder::new(data);
    let mut decompressed = Vec::new();

    decoder.read_to_end(&mut decompressed).map_err(|e| {
        CodecError::DecompressionError(format!("Deflate decompression failed: {}", e))
    })?;

    Ok(decompressed)
}

/// Decompress Zstandard data (no additional framing).
#[cfg(feature = "zstd")]
fn decompress_zstd(data: &[u8]) -> Result<Vec<u8>, CodecError> {
    if data.is_empty() {
        return Ok(Vec::new());
    }

    let mut decoder = zstd::Decoder::new(data).map_err(|e| {
        CodecError::DecompressionError(format!("Zstd decoder initialization failed: {}", e))
    })?;

    let mut decompressed = Vec::new();
    decoder
        .read_to_end(&mut decompressed)
        .map_err(|e| CodecError::DecompressionError(format!("Zstd decompression failed: {}", e)))?;

    Ok(decompressed)
}

/// Decompress bzip2 data.
#[cfg(feature = "bzip2")]
fn decompress_bzip2(data: &[u8]) -> Result<Vec<u8>, CodecError> {
    if data.is_empty() {
        return Ok(Vec::new());
    }

    let mut decoder = BzDecoder::new(data);
    let mut decompressed = Vec::new();

    decoder.read_to_end(&mut decompressed).map_err(|e| {
        CodecError::DecompressionError(format!("Bzip2 decompression failed: {}", e))
    })?;

    Ok(decompressed)
}

/// Decompress XZ/LZMA data.
#[cfg(feature = "xz")]
fn decompress_xz(data: &[u8]) -> Result<Vec<u8>, CodecError> {
    if data.is_empty() {
        return Ok(Vec::new());
    }

    let mut decoder = XzDecoder::new(data);
    let mut decompressed = Vec::new();

    decoder
        .read_to_end(&mut decompressed)
        .map_err(|e| CodecError::DecompressionError(format!("XZ decompression failed: {}", e)))?;

    Ok(decompressed)
}
