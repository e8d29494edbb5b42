use std::io;

use thiserror::Error;

use crate::types::{ColumnName, SourceId};

/// Error type for input validation, configuration, and table I/O failures.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("required column '{column}' not found (available: {available:?})")]
    MissingColumn {
        column: ColumnName,
        available: Vec<ColumnName>,
    },
    #[error("assignment column '{0}' already exists in the input table")]
    DuplicateColumn(ColumnName),
    #[error("row {row} has {found} cells but the header declares {expected}")]
    RowWidth {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("table source '{source_id}' is unavailable: {reason}")]
    SourceUnavailable { source_id: SourceId, reason: String },
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
}
