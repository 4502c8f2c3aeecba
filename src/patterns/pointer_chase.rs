//! Pointer-Chasing Access.
//!
//! Builds a working set of randomly placed, 8-byte aligned nodes and links
//! them into a single cycle in shuffled order. Colliding node addresses are
//! merged, so the working set may be slightly smaller than drawn. Each access
//! follows the next pointer, so consecutive addresses are unrelated but the
//! same nodes recur once per lap.

use super::{AccessPattern, PatternMetadata};
use crate::address_space::AddressSpace;
use crate::config::PatternKind;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

const NODES_MIN: u64 = 8;
const NODES_MAX: u64 = 256;
const NODE_ALIGN: u64 = 8;

pub struct PointerChasePattern {
    chain: Vec<u64>,
    position: usize,
}

impl PointerChasePattern {
    pub fn new() -> Self {
        Self {
            chain: vec![0],
            position: 0,
        }
    }

    /// Node addresses in traversal order.
    pub fn chain(&self) -> &[u64] {
        &self.chain
    }
}

impl Default for PointerChasePattern {
    fn default() -> Self {
        Self::new()
    }
}

impl AccessPattern for PointerChasePattern {
    fn reset(&mut self, seed: u64, space: &AddressSpace) {
        let mut rng = StdRng::seed_from_u64(seed);
        let ram = space.ram_volume();
        let hi = NODES_MAX.min(ram);
        let lo = NODES_MIN.min(hi);
        let nodes = rng.random_range(lo..=hi);
        let align_mask = !(NODE_ALIGN.min(ram) - 1);

        self.chain = (0..nodes)
            .map(|_| space.random_address(&mut rng) & align_mask)
            .collect();
        // Nodes are allocated in address order but linked in random order.
        self.chain.sort_unstable();
        self.chain.dedup();
        self.chain.shuffle(&mut rng);
        self.position = 0;
    }

    fn next_address(&mut self, space: &AddressSpace) -> u64 {
        let addr = self.chain[self.position];
        self.position = (self.position + 1) % self.chain.len();
        addr % space.ram_volume()
    }

    fn describe(&self) -> PatternMetadata {
        PatternMetadata::new(PatternKind::PointerChase).with_span(self.chain.len() as u64)
    }
}
