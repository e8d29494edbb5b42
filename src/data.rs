use serde::{Deserialize, Serialize};

use crate::classifier::is_fallback_category;
use crate::errors::DispatchError;
use crate::types::{
    CategoryKey, CellValue, ColumnName, RangeKey, RowIndex, WorkerIndex, WorkerName,
};

/// Ordered table of string cells with a header row.
///
/// This is the shape handed in by every source and returned to every sink.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    columns: Vec<ColumnName>,
    rows: Vec<Vec<CellValue>>,
}

impl Table {
    /// Build a table, rejecting rows whose width differs from the header.
    pub fn new(columns: Vec<ColumnName>, rows: Vec<Vec<CellValue>>) -> Result<Self, DispatchError> {
        for (row, cells) in rows.iter().enumerate() {
            if cells.len() != columns.len() {
                return Err(DispatchError::RowWidth {
                    row,
                    expected: columns.len(),
                    found: cells.len(),
                });
            }
        }
        Ok(Self { columns, rows })
    }

    /// Header names in column order.
    pub fn columns(&self) -> &[ColumnName] {
        &self.columns
    }

    /// Data rows in input order.
    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    /// Number of data rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True when the table has no data rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of `name`, compared case-insensitively after trimming both sides.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        let wanted = name.trim();
        self.columns
            .iter()
            .position(|column| column.trim().eq_ignore_ascii_case(wanted))
    }

    /// Cell text at `(row, column)`, if both are in range.
    pub fn cell(&self, row: RowIndex, column: usize) -> Option<&str> {
        self.rows
            .get(row)
            .and_then(|cells| cells.get(column))
            .map(String::as_str)
    }
}

/// One inventory row with its derived classification keys.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Position in the input table.
    pub row: RowIndex,
    /// Raw identifier code (chassis number), `None` when blank.
    pub identifier: Option<CellValue>,
    /// Raw location (lane) text, `None` when blank.
    pub location: Option<CellValue>,
    /// Raw slot text, `None` when blank.
    pub slot: Option<CellValue>,
    /// Location-range bucket.
    pub range_key: Option<RangeKey>,
    /// Identifier category.
    pub category: CategoryKey,
    /// Worker the record ended up with.
    pub assigned: Option<WorkerIndex>,
}

impl Record {
    /// True when at least one classification axis carries a signal.
    pub fn is_classified(&self) -> bool {
        self.range_key.is_some() || !is_fallback_category(&self.category)
    }
}

/// A worker and its final load.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Worker {
    pub index: WorkerIndex,
    /// Display name written into the assignment column.
    pub name: WorkerName,
    /// Number of records assigned.
    pub load: usize,
}
