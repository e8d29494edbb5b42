use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, Trim, WriterBuilder};

use super::TableSource;
use crate::constants::csv_file::{DEFAULT_DELIMITER, SOURCE_ID_PREFIX};
use crate::data::Table;
use crate::errors::DispatchError;
use crate::types::SourceId;

/// Delimited-text file with a header row.
#[derive(Clone, Debug)]
pub struct CsvFileSource {
    id: SourceId,
    path: PathBuf,
    delimiter: u8,
}

impl CsvFileSource {
    /// Comma-delimited source at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self {
            id: format!("{SOURCE_ID_PREFIX}{}", path.display()),
            path,
            delimiter: DEFAULT_DELIMITER,
        }
    }

    /// Use `delimiter` instead of a comma.
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TableSource for CsvFileSource {
    fn id(&self) -> &str {
        &self.id
    }

    fn load(&self) -> Result<Table, DispatchError> {
        let file = File::open(&self.path).map_err(|err| DispatchError::SourceUnavailable {
            source_id: self.id.clone(),
            reason: err.to_string(),
        })?;
        read_csv(file, self.delimiter)
    }
}

/// Parse a header row plus data rows. Header names are trimmed; cells are kept verbatim.
pub fn read_csv<R: Read>(reader: R, delimiter: u8) -> Result<Table, DispatchError> {
    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .trim(Trim::Headers)
        .from_reader(reader);
    let columns = reader
        .headers()?
        .iter()
        .map(str::to_string)
        .collect::<Vec<_>>();
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(str::to_string).collect());
    }
    Table::new(columns, rows)
}

/// Write `table` (header first) to `writer`.
pub fn write_csv_to<W: Write>(
    writer: W,
    table: &Table,
    delimiter: u8,
) -> Result<(), DispatchError> {
    let mut writer = WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(writer);
    writer.write_record(table.columns())?;
    for row in table.rows() {
        writer.write_record(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Write `table` to a file at `path`, replacing it if present.
pub fn write_csv(
    path: impl AsRef<Path>,
    table: &Table,
    delimiter: u8,
) -> Result<(), DispatchError> {
    let file = File::create(path.as_ref())?;
    write_csv_to(file, table, delimiter)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_csv_trims_headers_but_not_cells() {
        let text = " CHASSI ,RUA,VAGA\n93YRBB1, 411B ,7\n";
        let table = read_csv(text.as_bytes(), b',').unwrap();
        assert_eq!(table.columns(), &["CHASSI", "RUA", "VAGA"]);
        assert_eq!(table.rows()[0], vec!["93YRBB1", " 411B ", "7"]);
    }

    #[test]
    fn read_csv_rejects_ragged_rows() {
        let text = "CHASSI,RUA,VAGA\n93YRBB1,411B\n";
        let err = read_csv(text.as_bytes(), b',').unwrap_err();
        assert!(matches!(err, DispatchError::Csv(_)));
    }

    #[test]
    fn semicolon_delimited_round_trip() {
        let table = read_csv("A;B\n1;x,y\n".as_bytes(), b';').unwrap();
        let mut out = Vec::new();
        write_csv_to(&mut out, &table, b';').unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "A;B\n1;x,y\n");
    }

    #[test]
    fn missing_file_is_source_unavailable() {
        let source = CsvFileSource::new("/definitely/not/here.csv");
        assert!(source.id().starts_with("csv:"));
        let err = source.load().unwrap_err();
        assert!(matches!(err, DispatchError::SourceUnavailable { .. }));
    }
}
