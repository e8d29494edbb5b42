/// Position of a record in the input table (0-based, stable for a run).
/// Example: `0`, `17`
pub type RowIndex = usize;
/// Index of a worker in `[0, worker_count)`.
/// Example: `0`, `2`
pub type WorkerIndex = usize;
/// Location-range bucket derived from a lane string.
/// Examples: `400` (lane `411B`), `200` (lane `CIL2`)
pub type RangeKey = u64;
/// Category label derived from an identifier prefix.
/// Examples: `kwid`, `duster`, `other`, `unknown`
pub type CategoryKey = String;
/// Column header text as it appears in the input table.
/// Examples: `CHASSI`, `RUA`, `VAGA`
pub type ColumnName = String;
/// Raw cell text.
/// Examples: `93YRBB12345`, `411B`, `A-07`
pub type CellValue = String;
/// Worker display name written into the assignment column.
/// Examples: `Ana`, `Worker 3`
pub type WorkerName = String;
/// Identifier of a table source.
/// Examples: `in-memory`, `csv:/tmp/yard.csv`
pub type SourceId = String;
