//! Column projection resolution.
//!
//! A projection selects a subset of record fields, by name or by zero-based
//! wire index. The output table's column order follows the order the
//! projection was specified in, while decoding always traverses fields in
//! wire order (Avro is row-major and has no on-disk column skipping, so a
//! skipped field is still parsed, just not materialized).

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::ProjectionError;
use crate::schema::{AvroSchema, FieldSchema, RecordSchema};

/// Column selection by name or index.
///
/// # Example
/// ```
/// use avrotable::schema::ColumnSelection;
///
/// let by_name = ColumnSelection::from_names(["id", "name"]);
/// let by_index = ColumnSelection::from_indices([0, 2]);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ColumnSelection {
    /// Select columns by name.
    Names(Vec<Arc<str>>),
    /// Select columns by 0-based wire index.
    Indices(Vec<usize>),
}

impl ColumnSelection {
    /// Create a column selection from names.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Arc<str>>,
    {
        Self::Names(names.into_iter().map(Into::into).collect())
    }

    /// Create a column selection from indices.
    pub fn from_indices<I>(indices: I) -> Self
    where
        I: IntoIterator<Item = usize>,
    {
        Self::Indices(indices.into_iter().collect())
    }

    /// Build a selection from the binding surface's two optional inputs.
    ///
    /// Passing both names and indices is a caller error, surfaced before
    /// any decoding begins.
    pub fn from_parts(
        names: Option<Vec<String>>,
        indices: Option<Vec<usize>>,
    ) -> Result<Option<Self>, ProjectionError> {
        match (names, indices) {
            (Some(_), Some(_)) => Err(ProjectionError::MixedSelection),
            (Some(names), None) => Ok(Some(Self::from_names(names))),
            (None, Some(indices)) => Ok(Some(Self::from_indices(indices))),
            (None, None) => Ok(None),
        }
    }

    /// Check if the selection is empty.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Names(names) => names.is_empty(),
            Self::Indices(indices) => indices.is_empty(),
        }
    }

    /// Get the number of columns selected.
    pub fn len(&self) -> usize {
        match self {
            Self::Names(names) => names.len(),
            Self::Indices(indices) => indices.len(),
        }
    }
}

/// One field in wire order, with its output slot if kept.
#[derive(Clone, Debug, PartialEq)]
pub struct WireField {
    /// The field as declared in the writer schema.
    pub field: FieldSchema,
    /// Position of this field's column in the output table, or `None` if
    /// the field is parsed and discarded.
    pub slot: Option<usize>,
}

/// Result of resolving a column selection against a record schema.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedProjection {
    /// Every field of the record in wire order, each tagged with its
    /// output slot (or none).
    pub wire: Vec<WireField>,
    /// Kept columns as (name, schema) in projection order.
    pub output: Vec<(Arc<str>, AvroSchema)>,
}

impl ResolvedProjection {
    /// Number of kept columns.
    pub fn n_columns(&self) -> usize {
        self.output.len()
    }
}

/// Resolve an optional column selection against a record schema.
///
/// With no selection, every field is kept in wire order. With a selection,
/// output columns follow the requested order, names and indices alike.
///
/// # Errors
/// - `ProjectionError::UnknownColumn` for a name not in the schema
/// - `ProjectionError::IndexOutOfRange` for an index past the field list
/// - `ProjectionError::DuplicateColumn` for a column requested twice
pub fn resolve_projection(
    selection: Option<&ColumnSelection>,
    record: &RecordSchema,
) -> Result<ResolvedProjection, ProjectionError> {
    let wire_indices: Vec<usize> = match selection {
        None => (0..record.fields.len()).collect(),
        Some(ColumnSelection::Names(names)) => {
            let positions: HashMap<&str, usize> = record
                .fields
                .iter()
                .enumerate()
                .map(|(i, f)| (f.name.as_str(), i))
                .collect();

            names
                .iter()
                .map(|name| {
                    positions
                        .get(name.as_ref())
                        .copied()
                        .ok_or_else(|| ProjectionError::UnknownColumn(name.to_string()))
                })
                .collect::<Result<Vec<_>, _>>()?
        }
        Some(ColumnSelection::Indices(indices)) => {
            for &index in indices {
                if index >= record.fields.len() {
                    return Err(ProjectionError::IndexOutOfRange {
                        index,
                        field_count: record.fields.len(),
                    });
                }
            }
            indices.clone()
        }
    };

    // Reject duplicates; a field cannot occupy two output slots
    let mut seen = HashMap::new();
    for &wire_index in &wire_indices {
        if seen.insert(wire_index, ()).is_some() {
            return Err(ProjectionError::DuplicateColumn(
                record.fields[wire_index].name.clone(),
            ));
        }
    }

    // slot_by_wire[wire position] = output slot
    let mut slot_by_wire: Vec<Option<usize>> = vec![None; record.fields.len()];
    for (slot, &wire_index) in wire_indices.iter().enumerate() {
        slot_by_wire[wire_index] = Some(slot);
    }

    let wire = record
        .fields
        .iter()
        .zip(slot_by_wire)
        .map(|(field, slot)| WireField {
            field: field.clone(),
            slot,
        })
        .collect();

    let output = wire_indices
        .iter()
        .map(|&i| {
            let field = &record.fields[i];
            (Arc::from(field.name.as_str()), field.schema.clone())
        })
        .collect();

    Ok(ResolvedProjection { wire, output })
}
