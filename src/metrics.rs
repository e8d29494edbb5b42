use serde::{Deserialize, Serialize};

use crate::data::Worker;
use crate::types::{WorkerIndex, WorkerName};

/// Aggregate skew metrics for per-worker loads.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LoadSkew {
    pub total: usize,
    pub workers: usize,
    pub min: usize,
    pub max: usize,
    pub spread: usize,
    pub mean: f64,
    pub max_share: f64,
    pub min_share: f64,
    pub per_worker: Vec<WorkerShare>,
}

/// One worker's share of the allocated records.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WorkerShare {
    pub index: WorkerIndex,
    pub name: WorkerName,
    pub load: usize,
    pub share: f64,
}

fn share_of(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64
    }
}

/// Compute skew metrics from final worker loads.
/// `per_worker` is sorted by load (descending), then index.
pub fn load_skew(workers: &[Worker]) -> Option<LoadSkew> {
    let min = workers.iter().map(|worker| worker.load).min()?;
    let max = workers.iter().map(|worker| worker.load).max()?;
    let total: usize = workers.iter().map(|worker| worker.load).sum();
    let mut per_worker: Vec<WorkerShare> = workers
        .iter()
        .map(|worker| WorkerShare {
            index: worker.index,
            name: worker.name.clone(),
            load: worker.load,
            share: share_of(worker.load, total),
        })
        .collect();
    per_worker.sort_by(|a, b| b.load.cmp(&a.load).then_with(|| a.index.cmp(&b.index)));
    Some(LoadSkew {
        total,
        workers: workers.len(),
        min,
        max,
        spread: max - min,
        mean: total as f64 / workers.len() as f64,
        max_share: share_of(max, total),
        min_share: share_of(min, total),
        per_worker,
    })
}
