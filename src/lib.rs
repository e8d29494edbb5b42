#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

/// Group-by-group allocation passes.
pub mod allocator;
/// Lane-range and identifier-category classifiers.
pub mod classifier;
/// Command-line front end used by the `distribute` binary.
pub mod cli;
/// Allocation configuration types.
pub mod config;
/// Centralized constants used across classifiers, allocation, and I/O.
pub mod constants;
/// Mutable per-run allocation state.
pub mod context;
/// Table, record, and worker types.
pub mod data;
/// First-occurrence grouping helpers.
pub mod grouping;
/// Worker load skew helpers.
pub mod metrics;
/// End-to-end distribution pipeline.
pub mod pipeline;
/// Post-allocation load rebalancing.
pub mod rebalance;
/// Seeded permutation source.
pub mod rng;
/// Table sources and sinks.
pub mod source;
/// Shared type aliases.
pub mod types;

mod errors;

pub use classifier::{CategoryTable, category_key, range_key};
pub use config::{AllocationConfig, ColumnNames, RangePolicy, TieOrder, UnclassifiedPolicy};
pub use context::AllocationContext;
pub use data::{Record, Table, Worker};
pub use errors::DispatchError;
pub use metrics::{LoadSkew, load_skew};
pub use pipeline::{Distribution, DistributionReport, Distributor, distribute};
pub use rebalance::{RebalanceOutcome, RebalanceReport};
pub use source::{CsvFileSource, TableSource};
pub use types::{CategoryKey, CellValue, ColumnName, RangeKey, RowIndex, WorkerIndex, WorkerName};
