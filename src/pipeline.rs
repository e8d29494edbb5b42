//! End-to-end distribution: classify, group, allocate, rebalance, assemble.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::allocator::{
    allocate_priority_categories, allocate_range_groups, allocate_with_policy,
};
use crate::classifier::range_key;
use crate::config::{AllocationConfig, UnclassifiedPolicy};
use crate::constants::allocation::UNASSIGNED_MARKER;
use crate::context::AllocationContext;
use crate::data::{Record, Table, Worker};
use crate::errors::DispatchError;
use crate::grouping::{Groups, group_by};
use crate::metrics::{LoadSkew, load_skew};
use crate::rebalance::{RebalanceOutcome, RebalanceReport, rebalance};
use crate::source::TableSource;
use crate::types::{CategoryKey, RangeKey, RowIndex};

/// Column positions of the required input fields.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct InputColumns {
    identifier: usize,
    location: usize,
    slot: usize,
}

/// Result of one distribution run.
#[derive(Clone, Debug)]
pub struct Distribution {
    /// Input table in original row order plus the assignment column.
    pub table: Table,
    /// Every input record with its classification and final worker.
    pub records: Vec<Record>,
    /// Workers with their final loads.
    pub workers: Vec<Worker>,
    /// Outcome of the rebalance pass.
    pub rebalance: RebalanceReport,
    /// Records with neither a range key nor a recognized category.
    pub unclassified: usize,
    /// Rows removed from the output under `UnclassifiedPolicy::Drop`.
    pub dropped: usize,
}

/// Serializable run summary for logs and the CLI.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DistributionReport {
    pub rows_in: usize,
    pub rows_out: usize,
    pub assigned: usize,
    pub unclassified: usize,
    pub dropped: usize,
    pub workers: Vec<Worker>,
    pub skew: Option<LoadSkew>,
    pub rebalance_outcome: RebalanceOutcome,
    pub rebalance_moves: usize,
    pub residual_spread: usize,
}

impl Distribution {
    /// Per-worker loads in worker index order.
    pub fn loads(&self) -> Vec<usize> {
        self.workers.iter().map(|worker| worker.load).collect()
    }

    /// Summary of the run.
    pub fn report(&self) -> DistributionReport {
        DistributionReport {
            rows_in: self.records.len(),
            rows_out: self.table.len(),
            assigned: self.workers.iter().map(|worker| worker.load).sum(),
            unclassified: self.unclassified,
            dropped: self.dropped,
            workers: self.workers.clone(),
            skew: load_skew(&self.workers),
            rebalance_outcome: self.rebalance.outcome,
            rebalance_moves: self.rebalance.iterations,
            residual_spread: self.rebalance.residual_spread,
        }
    }
}

/// Runs the full classification + allocation pipeline for a validated config.
#[derive(Clone, Debug)]
pub struct Distributor {
    config: AllocationConfig,
}

impl Distributor {
    /// Validate `config` and build a distributor.
    pub fn new(config: AllocationConfig) -> Result<Self, DispatchError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &AllocationConfig {
        &self.config
    }

    fn resolve_columns(&self, table: &Table) -> Result<InputColumns, DispatchError> {
        let columns = &self.config.columns;
        let find = |name: &str| {
            table
                .column_index(name)
                .ok_or_else(|| DispatchError::MissingColumn {
                    column: name.trim().to_string(),
                    available: table.columns().to_vec(),
                })
        };
        let resolved = InputColumns {
            identifier: find(&columns.identifier)?,
            location: find(&columns.location)?,
            slot: find(&columns.slot)?,
        };
        if table.column_index(&columns.assignment).is_some() {
            return Err(DispatchError::DuplicateColumn(
                columns.assignment.trim().to_string(),
            ));
        }
        Ok(resolved)
    }

    /// Classify every row of `table` without allocating.
    pub fn classify(&self, table: &Table) -> Result<Vec<Record>, DispatchError> {
        let columns = self.resolve_columns(table)?;
        let present = |row: RowIndex, column: usize| {
            table
                .cell(row, column)
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(str::to_string)
        };
        Ok((0..table.len())
            .map(|row| {
                let identifier = present(row, columns.identifier);
                let location = present(row, columns.location);
                Record {
                    row,
                    range_key: range_key(location.as_deref()),
                    category: self.config.categories.classify(identifier.as_deref()),
                    slot: present(row, columns.slot),
                    identifier,
                    location,
                    assigned: None,
                }
            })
            .collect())
    }

    /// Load a table from `source` and distribute it.
    pub fn distribute_source(
        &self,
        source: &dyn TableSource,
    ) -> Result<Distribution, DispatchError> {
        let table = source.load()?;
        debug!(source = source.id(), rows = table.len(), "table loaded");
        self.distribute(&table)
    }

    /// Distribute the rows of `table` across the configured workers.
    pub fn distribute(&self, table: &Table) -> Result<Distribution, DispatchError> {
        let config = &self.config;
        let mut records = self.classify(table)?;

        let classified: Vec<&Record> = records.iter().filter(|r| r.is_classified()).collect();
        let unclassified_rows: Vec<RowIndex> = records
            .iter()
            .filter(|record| !record.is_classified())
            .map(|record| record.row)
            .collect();
        let ranges: Groups<RangeKey> =
            group_by(classified.iter().copied(), |record| record.range_key);
        let categories: Groups<CategoryKey> =
            group_by(classified.iter().copied(), |record| {
                Some(record.category.clone())
            });
        debug!(
            classified = classified.len(),
            unclassified = unclassified_rows.len(),
            range_groups = ranges.len(),
            category_groups = categories.len(),
            "records classified"
        );

        let mut ctx = AllocationContext::new(records.len(), config.worker_count, config.seed);
        let priority = allocate_priority_categories(&mut ctx, &categories, config);
        let by_range = allocate_range_groups(&mut ctx, &ranges, config);

        // Classified records with no range key that the priority pass skipped
        // (default category, undersized categories) form one trailing group.
        let no_range: Vec<RowIndex> = classified
            .iter()
            .map(|record| record.row)
            .filter(|row| !ctx.is_assigned(*row))
            .collect();
        if !no_range.is_empty() {
            allocate_with_policy(&mut ctx, &no_range, config.range_policy, config.tie_order);
        }
        debug_assert!(
            classified.iter().all(|record| ctx.is_assigned(record.row)),
            "every classified record must be assigned"
        );

        if config.unclassified == UnclassifiedPolicy::Balance && !unclassified_rows.is_empty() {
            allocate_with_policy(
                &mut ctx,
                &unclassified_rows,
                config.range_policy,
                config.tie_order,
            );
        }
        debug!(
            priority,
            by_range,
            no_range = no_range.len(),
            loads = ?ctx.loads(),
            "allocation passes complete"
        );

        let report = rebalance(&mut ctx, &ranges, config.max_rebalance_iterations);
        if !report.is_balanced() {
            warn!(
                outcome = ?report.outcome,
                residual_spread = report.residual_spread,
                "distribution completed with residual imbalance"
            );
        }

        let names = config.resolved_worker_names();
        let workers: Vec<Worker> = names
            .iter()
            .zip(ctx.loads())
            .enumerate()
            .map(|(index, (name, load))| Worker {
                index,
                name: name.clone(),
                load: *load,
            })
            .collect();

        for (record, assigned) in records.iter_mut().zip(ctx.into_assignments()) {
            record.assigned = assigned;
        }

        let mut columns = table.columns().to_vec();
        columns.push(config.columns.assignment.trim().to_string());
        let mut rows = Vec::with_capacity(table.len());
        let mut dropped = 0usize;
        for (record, cells) in records.iter().zip(table.rows()) {
            if config.unclassified == UnclassifiedPolicy::Drop && !record.is_classified() {
                dropped += 1;
                continue;
            }
            let name = record
                .assigned
                .map(|worker| names[worker].clone())
                .unwrap_or_else(|| UNASSIGNED_MARKER.to_string());
            let mut row = cells.clone();
            row.push(name);
            rows.push(row);
        }
        let output = Table::new(columns, rows)?;

        info!(
            rows_in = records.len(),
            rows_out = output.len(),
            workers = workers.len(),
            unclassified = unclassified_rows.len(),
            dropped,
            rebalance_moves = report.iterations,
            "distribution complete"
        );

        Ok(Distribution {
            table: output,
            records,
            workers,
            rebalance: report,
            unclassified: unclassified_rows.len(),
            dropped,
        })
    }
}

/// Validate `config` and distribute `table` in one call.
pub fn distribute(table: &Table, config: AllocationConfig) -> Result<Distribution, DispatchError> {
    Distributor::new(config)?.distribute(table)
}
