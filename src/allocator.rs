//! Group-by-group allocation of records to workers.
//!
//! Allocation runs in two passes over an `AllocationContext`:
//!
//! 1. **Priority categories**: every category except the configured default,
//!    in first-occurrence order. Groups at least as large as the worker count
//!    use a balanced split; smaller groups go record by record to the
//!    least-loaded worker.
//! 2. **Location ranges**: the still-unassigned members of every range group,
//!    in first-occurrence order, distributed by the configured `RangePolicy`.
//!
//! Both passes only touch unassigned rows, so a record is assigned exactly once.

use tracing::debug;

use crate::config::{AllocationConfig, RangePolicy, TieOrder};
use crate::context::AllocationContext;
use crate::grouping::Groups;
use crate::types::{CategoryKey, RangeKey, RowIndex, WorkerIndex};

/// Worker order used to hand out balanced-split quotas.
fn quota_order(ctx: &mut AllocationContext, tie_order: TieOrder) -> Vec<WorkerIndex> {
    match tie_order {
        TieOrder::Ascending => (0..ctx.worker_count()).collect(),
        TieOrder::Seeded => {
            let worker_count = ctx.worker_count();
            ctx.rng_mut().worker_permutation(worker_count)
        }
    }
}

/// Split `rows` into contiguous quotas of `len / W` (+1 for the first
/// `len % W` workers in tie order) and assign each quota in row order.
pub fn balanced_split(ctx: &mut AllocationContext, rows: &[RowIndex], tie_order: TieOrder) {
    let order = quota_order(ctx, tie_order);
    let base = rows.len() / order.len();
    let remainder = rows.len() % order.len();
    let mut pending = rows.iter().copied();
    for (position, worker) in order.into_iter().enumerate() {
        let quota = base + usize::from(position < remainder);
        for row in pending.by_ref().take(quota) {
            ctx.assign(row, worker);
        }
    }
}

/// Assign `rows` one at a time to the least-loaded worker.
pub fn assign_least_loaded(ctx: &mut AllocationContext, rows: &[RowIndex]) {
    for &row in rows {
        let worker = ctx.least_loaded();
        ctx.assign(row, worker);
    }
}

/// Distribute `rows` with the location-range policy.
pub fn allocate_with_policy(
    ctx: &mut AllocationContext,
    rows: &[RowIndex],
    policy: RangePolicy,
    tie_order: TieOrder,
) {
    match policy {
        RangePolicy::LeastLoaded => assign_least_loaded(ctx, rows),
        RangePolicy::ContiguousBlock => balanced_split(ctx, rows, tie_order),
    }
}

fn unassigned(ctx: &AllocationContext, rows: &[RowIndex]) -> Vec<RowIndex> {
    rows.iter()
        .copied()
        .filter(|row| !ctx.is_assigned(*row))
        .collect()
}

/// Pass 1: allocate every non-default category group. Returns rows assigned.
pub fn allocate_priority_categories(
    ctx: &mut AllocationContext,
    categories: &Groups<CategoryKey>,
    config: &AllocationConfig,
) -> usize {
    let before = ctx.assigned_count();
    for (category, rows) in categories {
        if *category == config.default_category {
            continue;
        }
        let pending = unassigned(ctx, rows);
        if pending.is_empty() || pending.len() < config.priority_min_group_size {
            debug!(
                category = category.as_str(),
                size = pending.len(),
                "category left to range pass"
            );
            continue;
        }
        if pending.len() >= ctx.worker_count() {
            balanced_split(ctx, &pending, config.tie_order);
        } else {
            assign_least_loaded(ctx, &pending);
        }
        debug!(
            category = category.as_str(),
            size = pending.len(),
            loads = ?ctx.loads(),
            "priority category allocated"
        );
    }
    ctx.assigned_count() - before
}

/// Pass 2: allocate the unassigned members of every range group. Returns rows assigned.
pub fn allocate_range_groups(
    ctx: &mut AllocationContext,
    ranges: &Groups<RangeKey>,
    config: &AllocationConfig,
) -> usize {
    let before = ctx.assigned_count();
    for (range, rows) in ranges {
        let pending = unassigned(ctx, rows);
        if pending.is_empty() {
            continue;
        }
        allocate_with_policy(ctx, &pending, config.range_policy, config.tie_order);
        debug!(
            range = *range,
            size = pending.len(),
            loads = ?ctx.loads(),
            "range group allocated"
        );
    }
    ctx.assigned_count() - before
}
