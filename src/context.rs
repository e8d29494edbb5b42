use crate::rng::DeterministicRng;
use crate::types::{RowIndex, WorkerIndex};

/// Mutable allocation state for one run.
///
/// Holds the record -> worker mapping, the per-worker load vector, and the
/// seeded RNG. Every mutation goes through `assign` / `reassign`, which keep
/// `loads[w] == |{row : assignment[row] == w}|`.
#[derive(Clone, Debug)]
pub struct AllocationContext {
    assignments: Vec<Option<WorkerIndex>>,
    loads: Vec<usize>,
    rng: DeterministicRng,
}

impl AllocationContext {
    /// Fresh context for `record_count` rows and `worker_count` workers.
    pub fn new(record_count: usize, worker_count: usize, seed: u64) -> Self {
        debug_assert!(worker_count > 0, "allocation requires at least one worker");
        Self {
            assignments: vec![None; record_count],
            loads: vec![0; worker_count],
            rng: DeterministicRng::new(seed),
        }
    }

    pub fn worker_count(&self) -> usize {
        self.loads.len()
    }

    /// Current load per worker index.
    pub fn loads(&self) -> &[usize] {
        &self.loads
    }

    pub fn assigned(&self, row: RowIndex) -> Option<WorkerIndex> {
        self.assignments.get(row).copied().flatten()
    }

    pub fn is_assigned(&self, row: RowIndex) -> bool {
        self.assigned(row).is_some()
    }

    /// Total number of assigned rows.
    pub fn assigned_count(&self) -> usize {
        self.loads.iter().sum()
    }

    pub(crate) fn rng_mut(&mut self) -> &mut DeterministicRng {
        &mut self.rng
    }

    /// Give an unassigned `row` to `worker`.
    pub fn assign(&mut self, row: RowIndex, worker: WorkerIndex) {
        debug_assert!(worker < self.loads.len(), "worker {worker} out of range");
        debug_assert!(
            self.assignments[row].is_none(),
            "row {row} is already assigned"
        );
        self.assignments[row] = Some(worker);
        self.loads[worker] += 1;
    }

    /// Move an assigned `row` to worker `to`, returning the previous worker.
    pub fn reassign(&mut self, row: RowIndex, to: WorkerIndex) -> Option<WorkerIndex> {
        debug_assert!(to < self.loads.len(), "worker {to} out of range");
        let from = self.assignments[row]?;
        self.loads[from] -= 1;
        self.loads[to] += 1;
        self.assignments[row] = Some(to);
        Some(from)
    }

    /// Worker with the smallest load; ties go to the lowest index.
    pub fn least_loaded(&self) -> WorkerIndex {
        let mut best = 0;
        for (idx, load) in self.loads.iter().enumerate() {
            if *load < self.loads[best] {
                best = idx;
            }
        }
        best
    }

    /// Worker with the largest load; ties go to the lowest index.
    pub fn most_loaded(&self) -> WorkerIndex {
        let mut best = 0;
        for (idx, load) in self.loads.iter().enumerate() {
            if *load > self.loads[best] {
                best = idx;
            }
        }
        best
    }

    /// `max(load) - min(load)`.
    pub fn spread(&self) -> usize {
        self.loads[self.most_loaded()] - self.loads[self.least_loaded()]
    }

    /// Highest row index currently assigned to `worker`.
    pub fn last_row_assigned_to(&self, worker: WorkerIndex) -> Option<RowIndex> {
        self.assignments
            .iter()
            .rposition(|assigned| *assigned == Some(worker))
    }

    /// Recount loads from the mapping and compare with the tracked vector.
    pub fn is_consistent(&self) -> bool {
        let mut counted = vec![0usize; self.loads.len()];
        for worker in self.assignments.iter().flatten() {
            match counted.get_mut(*worker) {
                Some(count) => *count += 1,
                None => return false,
            }
        }
        counted == self.loads
    }

    /// Final mapping indexed by row.
    pub fn into_assignments(self) -> Vec<Option<WorkerIndex>> {
        self.assignments
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assign_and_reassign_keep_loads_consistent() {
        let mut ctx = AllocationContext::new(4, 2, 0);
        ctx.assign(0, 0);
        ctx.assign(1, 0);
        ctx.assign(2, 1);
        assert_eq!(ctx.loads(), &[2, 1]);
        assert_eq!(ctx.reassign(1, 1), Some(0));
        assert_eq!(ctx.loads(), &[1, 2]);
        assert_eq!(ctx.reassign(3, 0), None);
        assert!(ctx.is_consistent());
        assert_eq!(ctx.assigned_count(), 3);
    }

    #[test]
    fn ties_resolve_to_lowest_index() {
        let mut ctx = AllocationContext::new(4, 3, 0);
        assert_eq!(ctx.least_loaded(), 0);
        assert_eq!(ctx.most_loaded(), 0);
        ctx.assign(0, 1);
        ctx.assign(1, 2);
        assert_eq!(ctx.least_loaded(), 0);
        assert_eq!(ctx.most_loaded(), 1);
        assert_eq!(ctx.spread(), 1);
    }

    #[test]
    fn last_row_assigned_to_scans_from_the_end() {
        let mut ctx = AllocationContext::new(5, 2, 0);
        ctx.assign(0, 1);
        ctx.assign(3, 1);
        ctx.assign(4, 0);
        assert_eq!(ctx.last_row_assigned_to(1), Some(3));
        assert_eq!(ctx.last_row_assigned_to(0), Some(4));
        ctx.reassign(4, 1);
        assert_eq!(ctx.last_row_assigned_to(0), None);
    }

    #[test]
    #[should_panic(expected = "already assigned")]
    #[cfg(debug_assertions)]
    fn double_assignment_is_caught() {
        let mut ctx = AllocationContext::new(1, 2, 0);
        ctx.assign(0, 0);
        ctx.assign(0, 1);
    }
}
