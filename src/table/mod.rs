//! Columnar result container.
//!
//! A `Table` is the terminal output of a read: named, typed columns in
//! projection order, all the same length.

mod builder;
mod column;

pub use builder::ColumnBuilder;
pub use column::{Column, ColumnData, ColumnType};

use std::sync::Arc;

/// An in-memory table of decoded columns.
///
/// Column order is the requested projection order (or wire order when no
/// projection was given) and is preserved through construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    columns: Vec<Column>,
    num_rows: usize,
}

impl Table {
    /// Build a table from finished columns.
    ///
    /// All columns must have the same length; the row count of the first
    /// column becomes the table's. A table with zero columns has zero
    /// rows.
    pub fn new(columns: Vec<Column>) -> Self {
        let num_rows = columns.first().map(|c| c.len()).unwrap_or(0);
        debug_assert!(columns.iter().all(|c| c.len() == num_rows));
        Self { columns, num_rows }
    }

    /// Number of rows.
    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    /// Number of columns.
    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    /// Check if the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.num_rows == 0
    }

    /// All columns, in output order.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Column names, in output order.
    pub fn column_names(&self) -> Vec<Arc<str>> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    /// Look up a column by name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name.as_ref() == name)
    }

    /// Look up a column by position.
    pub fn column_at(&self, index: usize) -> Option<&Column> {
        self.columns.get(index)
    }

    /// Consume the table, yielding its columns.
    pub fn into_columns(self) -> Vec<Column> {
        self.columns
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::AvroSchema;

    fn long_column(name: &str, values: Vec<Option<i64>>) -> Column {
        Column {
            name: Arc::from(name),
            schema: AvroSchema::Long,
            data: ColumnData::Int64(values),
        }
    }

    #[test]
    fn test_table_dimensions() {
        let table = Table::new(vec![
            long_column("a", vec![Some(1), Some(2)]),
            long_column("b", vec![Some(3), None]),
        ]);
        assert_eq!(table.num_rows(), 2);
        assert_eq!(table.num_columns(), 2);
        assert!(!table.is_empty());
    }

    #[test]
    fn test_empty_table() {
        let table = Table::new(vec![]);
        assert_eq!(table.num_rows(), 0);
        assert_eq!(table.num_columns(), 0);
        assert!(table.is_empty());
    }

    #[test]
    fn test_column_lookup() {
        let table = Table::new(vec![long_column("id", vec![Some(7)])]);
        assert!(table.column("id").is_some());
        assert!(table.column("missing").is_none());
        assert_eq!(table.column_at(0).unwrap().name.as_ref(), "id");
        assert!(table.column_at(1).is_none());
    }

    #[test]
    fn test_column_order_preserved() {
        let table = Table::new(vec![
            long_column("z", vec![Some(1)]),
            long_column("a", vec![Some(2)]),
        ]);
        let names: Vec<_> = table.column_names();
        assert_eq!(names[0].as_ref(), "z");
        assert_eq!(names[1].as_ref(), "a");
    }
}
