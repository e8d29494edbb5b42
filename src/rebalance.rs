//! Bounded correction pass that moves single records from the most-loaded
//! worker to the least-loaded one until `max(load) - min(load) <= 1`.
//!
//! Each move strictly lowers the sum of squared loads while the spread is at
//! least two, so the loop converges; `max_iterations` still caps it.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::constants::allocation::BALANCED_SPREAD;
use crate::context::AllocationContext;
use crate::grouping::Groups;
use crate::types::{RangeKey, RowIndex, WorkerIndex};

/// How the rebalance loop ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RebalanceOutcome {
    /// Spread is within one.
    Balanced,
    /// The most-loaded worker held no record that could move.
    NothingMovable,
    /// The iteration cap was hit with spread still above one.
    IterationCapReached,
}

/// One record moved between workers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RebalanceMove {
    pub row: RowIndex,
    pub from: WorkerIndex,
    pub to: WorkerIndex,
}

/// Summary of a rebalance run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RebalanceReport {
    pub outcome: RebalanceOutcome,
    /// Moves attempted (one per loop iteration that moved a record).
    pub iterations: usize,
    /// Moves in the order they were applied.
    pub moves: Vec<RebalanceMove>,
    /// `max(load) - min(load)` when the loop stopped.
    pub residual_spread: usize,
}

impl RebalanceReport {
    /// True when the final spread is within one.
    pub fn is_balanced(&self) -> bool {
        self.outcome == RebalanceOutcome::Balanced
    }
}

/// Last record held by `hi`, searched through range groups in order,
/// preferring a group where `hi` holds more than one record.
fn range_group_candidate(
    ctx: &AllocationContext,
    ranges: &Groups<RangeKey>,
    hi: WorkerIndex,
) -> Option<RowIndex> {
    let mut singleton = None;
    for rows in ranges.values() {
        let mut held = rows
            .iter()
            .rev()
            .copied()
            .filter(|row| ctx.assigned(*row) == Some(hi));
        let Some(last) = held.next() else {
            continue;
        };
        if held.next().is_some() {
            return Some(last);
        }
        if singleton.is_none() {
            singleton = Some(last);
        }
    }
    singleton
}

/// Move records until the spread is at most one, nothing can move, or the cap is hit.
pub fn rebalance(
    ctx: &mut AllocationContext,
    ranges: &Groups<RangeKey>,
    max_iterations: usize,
) -> RebalanceReport {
    let mut moves = Vec::new();
    let outcome = loop {
        if ctx.spread() <= BALANCED_SPREAD {
            break RebalanceOutcome::Balanced;
        }
        if moves.len() >= max_iterations {
            break RebalanceOutcome::IterationCapReached;
        }
        let hi = ctx.most_loaded();
        let lo = ctx.least_loaded();
        let candidate =
            range_group_candidate(ctx, ranges, hi).or_else(|| ctx.last_row_assigned_to(hi));
        let Some(row) = candidate else {
            break RebalanceOutcome::NothingMovable;
        };
        ctx.reassign(row, lo);
        debug!(row, from = hi, to = lo, "rebalance move");
        moves.push(RebalanceMove { row, from: hi, to: lo });
    };

    let residual_spread = ctx.spread();
    match outcome {
        RebalanceOutcome::Balanced => {
            debug!(moves = moves.len(), "rebalance converged");
        }
        RebalanceOutcome::NothingMovable | RebalanceOutcome::IterationCapReached => {
            warn!(
                ?outcome,
                moves = moves.len(),
                residual_spread,
                loads = ?ctx.loads(),
                "imbalance not fully resolved"
            );
        }
    }
    debug_assert!(ctx.is_consistent());

    RebalanceReport {
        outcome,
        iterations: moves.len(),
        moves,
        residual_spread,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;

    fn skewed_context() -> AllocationContext {
        // Worker 0 holds rows 0..5, worker 1 holds row 5, worker 2 nothing.
        let mut ctx = AllocationContext::new(6, 3, 0);
        for row in 0..5 {
            ctx.assign(row, 0);
        }
        ctx.assign(5, 1);
        ctx
    }

    #[test]
    fn already_balanced_makes_no_moves() {
        let mut ctx = AllocationContext::new(3, 2, 0);
        ctx.assign(0, 0);
        ctx.assign(1, 1);
        ctx.assign(2, 0);
        let report = rebalance(&mut ctx, &IndexMap::new(), 1000);
        assert!(report.is_balanced());
        assert!(report.moves.is_empty());
        assert_eq!(report.residual_spread, 1);
    }

    #[test]
    fn prefers_groups_where_the_worker_holds_several_records() {
        let mut ranges: Groups<RangeKey> = IndexMap::new();
        ranges.insert(100, vec![0]);
        ranges.insert(200, vec![1, 2, 3]);
        ranges.insert(300, vec![4, 5]);
        let mut ctx = skewed_context();
        let report = rebalance(&mut ctx, &ranges, 1000);
        assert!(report.is_balanced());
        assert_eq!(
            report.moves[0],
            RebalanceMove {
                row: 3,
                from: 0,
                to: 2
            }
        );
        assert_eq!(ctx.loads(), &[2, 2, 2]);
        assert!(ctx.is_consistent());
    }

    #[test]
    fn falls_back_to_singleton_group_then_any_row() {
        let mut ranges: Groups<RangeKey> = IndexMap::new();
        ranges.insert(100, vec![4]);
        let mut ctx = skewed_context();
        let report = rebalance(&mut ctx, &ranges, 1000);
        assert_eq!(report.moves[0].row, 4);
        assert_eq!(report.moves[1].row, 3);
        assert!(report.is_balanced());
        assert!(ctx.spread() <= 1);
    }

    #[test]
    fn iteration_cap_is_reported_not_fatal() {
        let mut ctx = skewed_context();
        let report = rebalance(&mut ctx, &IndexMap::new(), 1);
        assert_eq!(report.outcome, RebalanceOutcome::IterationCapReached);
        assert_eq!(report.iterations, 1);
        assert_eq!(ctx.loads(), &[4, 1, 1]);
        assert_eq!(report.residual_spread, 3);
    }

    #[test]
    fn single_worker_is_trivially_balanced() {
        let mut ctx = AllocationContext::new(4, 1, 0);
        for row in 0..4 {
            ctx.assign(row, 0);
        }
        let report = rebalance(&mut ctx, &IndexMap::new(), 1000);
        assert!(report.is_balanced());
        assert_eq!(ctx.loads(), &[4]);
    }
}
