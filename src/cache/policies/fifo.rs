//! First-In, First-Out (FIFO) Replacement Policy.
//!
//! Evicts lines in installation order. Hits do not change the order, which
//! makes FIFO blind to reuse and a useful contrast to LRU labels.

use super::ReplacementPolicy;

/// FIFO Policy state.
pub struct FifoPolicy {
    /// Next way to evict, one round-robin pointer per set.
    next: Vec<usize>,
    ways: usize,
}

impl FifoPolicy {
    pub fn new(sets: usize, ways: usize) -> Self {
        Self {
            next: vec![0; sets],
            ways,
        }
    }
}

impl ReplacementPolicy for FifoPolicy {
    fn update(&mut self, _set: usize, _way: usize) {}

    /// Advances the pointer past the way just filled.
    fn install(&mut self, set: usize, way: usize) {
        if way == self.next[set] {
            self.next[set] = (way + 1) % self.ways;
        }
    }

    fn get_victim(&mut self, set: usize) -> usize {
        self.next[set]
    }

    fn reset(&mut self) {
        self.next.iter_mut().for_each(|n| *n = 0);
    }
}
