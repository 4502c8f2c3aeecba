//! Sequential Access with Random Jumps.
//!
//! Addresses advance by one byte per access and wrap at the end of RAM.
//! Before each access the walk jumps to a uniformly random address with
//! probability `epsilon`, drawn per reset from `[0.01, 0.1)`.

use super::{AccessPattern, PatternMetadata};
use crate::address_space::AddressSpace;
use crate::config::PatternKind;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const EPSILON_MIN: f64 = 0.01;
const EPSILON_MAX: f64 = 0.1;

pub struct SequentialPattern {
    rng: StdRng,
    epsilon: f64,
    current: u64,
}

impl SequentialPattern {
    pub fn new() -> Self {
        Self {
            rng: StdRng::seed_from_u64(0),
            epsilon: EPSILON_MIN,
            current: 0,
        }
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }
}

impl Default for SequentialPattern {
    fn default() -> Self {
        Self::new()
    }
}

impl AccessPattern for SequentialPattern {
    fn reset(&mut self, seed: u64, space: &AddressSpace) {
        self.rng = StdRng::seed_from_u64(seed);
        self.epsilon = self.rng.random_range(EPSILON_MIN..EPSILON_MAX);
        self.current = space.random_address(&mut self.rng);
    }

    fn next_address(&mut self, space: &AddressSpace) -> u64 {
        if self.rng.random_bool(self.epsilon) {
            self.current = space.random_address(&mut self.rng);
        } else {
            self.current = (self.current + 1) % space.ram_volume();
        }
        self.current
    }

    fn describe(&self) -> PatternMetadata {
        PatternMetadata::new(PatternKind::Sequential).with_jump_probability(self.epsilon)
    }
}
