//! Table sources and sinks around the distribution core.
//!
//! A source hands the pipeline one complete `Table`; the pipeline never
//! reads files itself.

use crate::data::Table;
use crate::errors::DispatchError;

/// CSV file source and sink.
pub mod csv_file;

pub use csv_file::{CsvFileSource, read_csv, write_csv, write_csv_to};

/// Anything that can produce a complete input table.
pub trait TableSource {
    /// Stable source identifier used in logs and errors.
    fn id(&self) -> &str;
    /// Load the whole table in row order.
    fn load(&self) -> Result<Table, DispatchError>;
}

impl TableSource for Table {
    fn id(&self) -> &str {
        "in-memory"
    }

    fn load(&self) -> Result<Table, DispatchError> {
        Ok(self.clone())
    }
}
