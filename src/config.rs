use serde::{Deserialize, Serialize};

use crate::classifier::CategoryTable;
use crate::constants::allocation::{
    DEFAULT_MAX_REBALANCE_ITERATIONS, DEFAULT_PRIORITY_MIN_GROUP_SIZE, DEFAULT_SEED,
    DEFAULT_WORKER_COUNT, DEFAULT_WORKER_NAME_PREFIX,
};
use crate::constants::classifier::DEFAULT_CATEGORY;
use crate::constants::columns::{ASSIGNMENT, IDENTIFIER, LOCATION, SLOT};
use crate::errors::DispatchError;
use crate::types::{CategoryKey, ColumnName, WorkerName};

/// Order in which workers receive the remainder of a balanced split.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TieOrder {
    /// Workers in ascending index order (worker 0 first).
    #[default]
    Ascending,
    /// A fresh permutation drawn from the run's seeded RNG for every split.
    Seeded,
}

/// Policy used when distributing location-range groups.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RangePolicy {
    /// One record at a time to the least-loaded worker (ties by ascending index).
    #[default]
    LeastLoaded,
    /// Contiguous slices sized by the balanced-split rule, slice order per `TieOrder`.
    ContiguousBlock,
}

/// What happens to records with neither a range key nor a recognized category.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnclassifiedPolicy {
    /// Keep the rows in the output with an empty assignment; they do not count as load.
    #[default]
    Unassigned,
    /// Allocate them as one explicit trailing group and include them in balancing.
    Balance,
    /// Remove the rows from the output table.
    Drop,
}

/// Header names of the columns the pipeline reads and appends.
///
/// Matching against the input header is case-insensitive after trimming.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnNames {
    /// Identifier-code column (category axis).
    pub identifier: ColumnName,
    /// Location/lane column (range axis).
    pub location: ColumnName,
    /// Slot column (required, carried through).
    pub slot: ColumnName,
    /// Name of the appended assignment column.
    pub assignment: ColumnName,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            identifier: IDENTIFIER.to_string(),
            location: LOCATION.to_string(),
            slot: SLOT.to_string(),
            assignment: ASSIGNMENT.to_string(),
        }
    }
}

/// Top-level allocation configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AllocationConfig {
    /// Number of workers (must be at least 1).
    pub worker_count: usize,
    /// Display names by worker index; missing or blank entries fall back to `Worker {n}`.
    pub worker_names: Vec<WorkerName>,
    /// Remainder order for balanced splits and contiguous blocks.
    pub tie_order: TieOrder,
    /// Distribution policy for the location-range pass.
    pub range_policy: RangePolicy,
    /// Seed for every permutation drawn during the run.
    pub seed: u64,
    /// Handling of unclassified records.
    pub unclassified: UnclassifiedPolicy,
    /// Category left to the location-range pass instead of the priority pass.
    pub default_category: CategoryKey,
    /// Categories smaller than this skip the priority pass and fall through to range groups.
    pub priority_min_group_size: usize,
    /// Iteration cap for the rebalance loop.
    pub max_rebalance_iterations: usize,
    /// Identifier prefix table used by the category classifier.
    pub categories: CategoryTable,
    /// Input and output column names.
    pub columns: ColumnNames,
}

impl Default for AllocationConfig {
    fn default() -> Self {
        Self {
            worker_count: DEFAULT_WORKER_COUNT,
            worker_names: Vec::new(),
            tie_order: TieOrder::default(),
            range_policy: RangePolicy::default(),
            seed: DEFAULT_SEED,
            unclassified: UnclassifiedPolicy::default(),
            default_category: DEFAULT_CATEGORY.to_string(),
            priority_min_group_size: DEFAULT_PRIORITY_MIN_GROUP_SIZE,
            max_rebalance_iterations: DEFAULT_MAX_REBALANCE_ITERATIONS,
            categories: CategoryTable::default(),
            columns: ColumnNames::default(),
        }
    }
}

impl AllocationConfig {
    /// Config for `worker_count` workers with every other field at its default.
    pub fn with_workers(worker_count: usize) -> Self {
        Self {
            worker_count,
            ..Self::default()
        }
    }

    /// Reject configurations that cannot produce an allocation.
    pub fn validate(&self) -> Result<(), DispatchError> {
        if self.worker_count == 0 {
            return Err(DispatchError::Configuration(
                "worker count must be at least 1".to_string(),
            ));
        }
        if self.priority_min_group_size == 0 {
            return Err(DispatchError::Configuration(
                "priority_min_group_size must be at least 1".to_string(),
            ));
        }
        let columns = [
            &self.columns.identifier,
            &self.columns.location,
            &self.columns.slot,
            &self.columns.assignment,
        ];
        for (idx, column) in columns.iter().enumerate() {
            if column.trim().is_empty() {
                return Err(DispatchError::Configuration(
                    "column names must not be blank".to_string(),
                ));
            }
            if columns[..idx]
                .iter()
                .any(|earlier| earlier.trim().eq_ignore_ascii_case(column.trim()))
            {
                return Err(DispatchError::Configuration(format!(
                    "column name '{}' is configured more than once",
                    column.trim()
                )));
            }
        }
        Ok(())
    }

    /// Display names for every worker index, filling gaps with generated names.
    pub fn resolved_worker_names(&self) -> Vec<WorkerName> {
        (0..self.worker_count)
            .map(|idx| {
                self.worker_names
                    .get(idx)
                    .map(|name| name.trim())
                    .filter(|name| !name.is_empty())
                    .map(str::to_string)
                    .unwrap_or_else(|| default_worker_name(idx))
            })
            .collect()
    }
}

/// Generated display name for worker `idx` (`Worker 1` for index 0).
pub fn default_worker_name(idx: usize) -> WorkerName {
    format!("{DEFAULT_WORKER_NAME_PREFIX} {}", idx + 1)
}
