use rand::seq::SliceRandom;

use crate::constants::allocation::RNG_SEED_OFFSET;
use crate::types::WorkerIndex;

/// SplitMix64 generator used for every seeded permutation in a run.
///
/// The output sequence depends only on the seed, so identical inputs and
/// seeds always produce identical assignments.
#[derive(Clone, Debug)]
pub struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    /// Generator for a run seed.
    pub fn new(seed: u64) -> Self {
        Self {
            state: seed ^ RNG_SEED_OFFSET,
        }
    }

    fn next_u64_internal(&mut self) -> u64 {
        let mut z = self.state.wrapping_add(0x9E3779B97F4A7C15);
        self.state = z;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
        z ^ (z >> 31)
    }

    /// Shuffled copy of `0..worker_count`.
    pub fn worker_permutation(&mut self, worker_count: usize) -> Vec<WorkerIndex> {
        let mut order: Vec<WorkerIndex> = (0..worker_count).collect();
        order.shuffle(self);
        order
    }
}

impl rand::RngCore for DeterministicRng {
    fn next_u32(&mut self) -> u32 {
        self.next_u64_internal() as u32
    }

    fn next_u64(&mut self) -> u64 {
        self.next_u64_internal()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        let mut offset = 0;
        while offset < dest.len() {
            let value = self.next_u64_internal();
            let bytes = value.to_le_bytes();
            let remaining = dest.len() - offset;
            let copy_len = remaining.min(bytes.len());
            dest[offset..offset + copy_len].copy_from_slice(&bytes[..copy_len]);
            offset += copy_len;
        }
    }
}
