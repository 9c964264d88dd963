//! Local filesystem source implementation

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use bytes::Bytes;

use super::traits::ByteSource;
use crate::error::SourceError;

/// A data source for reading from the local filesystem.
///
/// The file handle lives behind a mutex so the source can be shared by
/// reference while keeping a single read cursor.
pub struct FileSource {
    file: Mutex<File>,
    /// Path to the file (for error reporting)
    path: PathBuf,
    /// Cached file size
    file_size: u64,
}

impl FileSource {
    /// Open a local file for reading.
    ///
    /// # Errors
    /// Returns `SourceError::NotFound` if the file doesn't exist,
    /// `SourceError::PermissionDenied` if access is denied, and
    /// `SourceError::FileSystemError` for other I/O errors.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, SourceError> {
        let path = path.as_ref().to_path_buf();

        let file = File::open(&path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                SourceError::NotFound(path.display().to_string())
            } else if e.kind() == std::io::ErrorKind::PermissionDenied {
                SourceError::PermissionDenied(path.display().to_string())
            } else {
                SourceError::FileSystemError(format!("{}: {}", path.display(), e))
            }
        })?;

        let metadata = file.metadata().map_err(|e| {
            SourceError::FileSystemError(format!(
                "Failed to get metadata for {}: {}",
                path.display(),
                e
            ))
        })?;

        let file_size = metadata.len();

        Ok(Self {
            file: Mutex::new(file),
            path,
            file_size,
        })
    }

    /// Get the path to the file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ByteSource for FileSource {
    fn read_range(&self, offset: u64, length: usize) -> Result<Bytes, SourceError> {
        if offset >= self.file_size {
            return Err(SourceError::FileSystemError(format!(
                "Offset {} is beyond file size {} for {}",
                offset,
                self.file_size,
                self.path.display()
            )));
        }

        // Clamp length to not exceed file bounds
        let available = (self.file_size - offset) as usize;
        let actual_length = length.min(available);

        let mut file = self
            .file
            .lock()
            .map_err(|_| SourceError::FileSystemError("File lock poisoned".to_string()))?;

        file.seek(SeekFrom::Start(offset))?;

        let mut buffer = vec![0u8; actual_length];
        file.read_exact(&mut buffer)?;

        Ok(Bytes::from(buffer))
    }

    fn size(&self) -> Result<u64, SourceError> {
        Ok(self.file_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_open_missing_file() {
        let result = FileSource::open("/definitely/not/a/real/path.avro");
        assert!(matches!(result, Err(SourceError::NotFound(_))));
    }

    #[test]
    fn test_read_range_and_size() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(b"hello avro world").unwrap();
        tmp.flush().unwrap();

        let source = FileSource::open(tmp.path()).unwrap();
        assert_eq!(source.size().unwrap(), 16);
        assert_eq!(&source.read_range(6, 4).unwrap()[..], b"avro");
    }

    #[test]
    fn test_read_range_clamps_to_eof() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(b"short").unwrap();
        tmp.flush().unwrap();

        let source = FileSource::open(tmp.path()).unwrap();
        let data = source.read_range(2, 100).unwrap();
        assert_eq!(&data[..], b"ort");
    }

    #[test]
    fn test_read_range_past_eof_errors() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(b"short").unwrap();
        tmp.flush().unwrap();

        let source = FileSource::open(tmp.path()).unwrap();
        assert!(source.read_range(100, 1).is_err());
    }
}
