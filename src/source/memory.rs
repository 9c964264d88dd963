//! In-memory byte buffer source

use bytes::Bytes;

use super::traits::ByteSource;
use crate::error::SourceError;

/// A data source over an in-memory byte buffer.
///
/// Range reads are zero-copy slices of the underlying `Bytes`.
#[derive(Debug, Clone)]
pub struct MemorySource {
    data: Bytes,
}

impl MemorySource {
    /// Create a source over the given bytes.
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self { data: data.into() }
    }
}

impl From<Vec<u8>> for MemorySource {
    fn from(data: Vec<u8>) -> Self {
        Self::new(data)
    }
}

impl ByteSource for MemorySource {
    fn read_range(&self, offset: u64, length: usize) -> Result<Bytes, SourceError> {
        let len = self.data.len() as u64;
        if offset >= len && !(offset == 0 && len == 0) {
            return Err(SourceError::FileSystemError(format!(
                "Offset {} is beyond buffer size {}",
                offset, len
            )));
        }

        let start = offset as usize;
        let end = (start + length).min(self.data.len());
        Ok(self.data.slice(start..end))
    }

    fn size(&self) -> Result<u64, SourceError> {
        Ok(self.data.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_range() {
        let source = MemorySource::new(vec![1, 2, 3, 4, 5]);
        assert_eq!(source.size().unwrap(), 5);
        assert_eq!(&source.read_range(1, 3).unwrap()[..], &[2, 3, 4]);
    }

    #[test]
    fn test_read_range_clamps() {
        let source = MemorySource::new(vec![1, 2, 3]);
        assert_eq!(&source.read_range(2, 10).unwrap()[..], &[3]);
    }

    #[test]
    fn test_read_past_end_errors() {
        let source = MemorySource::new(vec![1, 2, 3]);
        assert!(source.read_range(3, 1).is_err());
    }
}
