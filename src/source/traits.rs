//! ByteSource trait definition
//!
//! Provides a unified interface for positioned reads over files, in-memory
//! buffers, or caller-supplied handles.

use bytes::Bytes;

use crate::error::SourceError;

/// Abstraction over byte-seekable data sources with range-request support.
///
/// The decode pipeline drives a single logical read cursor over one source
/// instance; concurrent readers on the same instance are not supported.
pub trait ByteSource {
    /// Read bytes from a specific offset with a given length.
    ///
    /// Reads that extend past the end of the source are clamped; the
    /// returned buffer may be shorter than `length`.
    ///
    /// # Errors
    /// Returns `SourceError` if:
    /// - The offset is beyond the source size
    /// - The source is not accessible
    /// - An I/O error occurs
    fn read_range(&self, offset: u64, length: usize) -> Result<Bytes, SourceError>;

    /// Get the total size of the data source in bytes.
    fn size(&self) -> Result<u64, SourceError>;
}

/// A boxed ByteSource for dynamic dispatch
pub type BoxedSource = Box<dyn ByteSource>;

impl ByteSource for BoxedSource {
    fn read_range(&self, offset: u64, length: usize) -> Result<Bytes, SourceError> {
        (**self).read_range(offset, length)
    }

    fn size(&self) -> Result<u64, SourceError> {
        (**self).size()
    }
}
