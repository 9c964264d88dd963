//! The user-facing read surface.
//!
//! ```no_run
//! use avrotable::{read_path, ReadOptions};
//!
//! let table = read_path("events.avro", &ReadOptions::new().n_rows(100))?;
//! println!("{} rows", table.num_rows());
//! # Ok::<(), avrotable::ReadError>(())
//! ```

use std::path::Path;

use bytes::Bytes;

use crate::error::ReadError;
use crate::reader::TableReader;
use crate::schema::ColumnSelection;
use crate::source::{ByteSource, FileSource, MemorySource};
use crate::table::Table;

/// Options controlling a read.
#[derive(Debug, Clone, Default)]
pub struct ReadOptions {
    columns: Option<ColumnSelection>,
    n_rows: Option<usize>,
}

impl ReadOptions {
    /// Options with no projection and no row limit.
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep only the selected columns, in the selection's order.
    pub fn columns(mut self, selection: ColumnSelection) -> Self {
        self.columns = Some(selection);
        self
    }

    /// Keep only the named columns, in the given order.
    pub fn column_names<I, S>(self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<std::sync::Arc<str>>,
    {
        self.columns(ColumnSelection::from_names(names))
    }

    /// Keep only the columns at the given 0-based wire indices.
    pub fn column_indices<I>(self, indices: I) -> Self
    where
        I: IntoIterator<Item = usize>,
    {
        self.columns(ColumnSelection::from_indices(indices))
    }

    /// Stop after this many rows, even mid-block.
    pub fn n_rows(mut self, n: usize) -> Self {
        self.n_rows = Some(n);
        self
    }
}

/// Read a container from any byte source into a table.
pub fn read_avro<S: ByteSource>(source: S, options: &ReadOptions) -> Result<Table, ReadError> {
    let reader = TableReader::open(source, options.columns.as_ref(), options.n_rows)?;
    reader.read_all()
}

/// Read a container file from the local filesystem.
pub fn read_path<P: AsRef<Path>>(path: P, options: &ReadOptions) -> Result<Table, ReadError> {
    let source = FileSource::open(path)?;
    read_avro(source, options)
}

/// Read a container already held in memory.
pub fn read_bytes(bytes: impl Into<Bytes>, options: &ReadOptions) -> Result<Table, ReadError> {
    read_avro(MemorySource::new(bytes.into()), options)
}
