//! Uniform Random Access.
//!
//! Every address is drawn independently from the whole address space,
//! modelling hash-table probes and other chaotic workloads.

use super::{AccessPattern, PatternMetadata};
use crate::address_space::AddressSpace;
use crate::config::PatternKind;
use rand::rngs::StdRng;
use rand::SeedableRng;

pub struct RandomPattern {
    rng: StdRng,
}

impl RandomPattern {
    pub fn new() -> Self {
        Self {
            rng: StdRng::seed_from_u64(0),
        }
    }
}

impl Default for RandomPattern {
    fn default() -> Self {
        Self::new()
    }
}

impl AccessPattern for RandomPattern {
    fn reset(&mut self, seed: u64, _space: &AddressSpace) {
        self.rng = StdRng::seed_from_u64(seed);
    }

    fn next_address(&mut self, space: &AddressSpace) -> u64 {
        space.random_address(&mut self.rng)
    }

    fn describe(&self) -> PatternMetadata {
        PatternMetadata::new(PatternKind::Random)
    }
}
