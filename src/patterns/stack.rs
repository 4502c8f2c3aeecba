//! Stack Push/Pop Access.
//!
//! A stack pointer starts away from the edges of RAM and moves down on push
//! and up on pop by 1..=10 bytes. Depth is tracked so the walk never grows
//! beyond `MAX_DEPTH` frames nor pops past an empty stack.

use super::{AccessPattern, PatternMetadata};
use crate::address_space::AddressSpace;
use crate::config::PatternKind;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const INITIAL_DEPTH_MIN: u64 = 10;
const INITIAL_DEPTH_MAX: u64 = 100;
const HEADROOM: u64 = 1000;
const MAX_DEPTH: u64 = 100;
const MOVE_MIN: u64 = 1;
const MOVE_MAX: u64 = 10;
const PUSH_PROBABILITY: f64 = 0.5;

pub struct StackPattern {
    rng: StdRng,
    stack_pointer: u64,
    depth: u64,
    initial_depth: u64,
}

impl StackPattern {
    pub fn new() -> Self {
        Self {
            rng: StdRng::seed_from_u64(0),
            stack_pointer: 0,
            depth: 0,
            initial_depth: 0,
        }
    }

    pub fn depth(&self) -> u64 {
        self.depth
    }
}

impl Default for StackPattern {
    fn default() -> Self {
        Self::new()
    }
}

impl AccessPattern for StackPattern {
    fn reset(&mut self, seed: u64, space: &AddressSpace) {
        self.rng = StdRng::seed_from_u64(seed);
        let max = space.max_address();
        let safe_min = HEADROOM.min(max);
        let safe_max = max.saturating_sub(HEADROOM).max(safe_min);
        self.initial_depth = self.rng.random_range(INITIAL_DEPTH_MIN..=INITIAL_DEPTH_MAX);
        self.depth = self.initial_depth;
        self.stack_pointer = self.rng.random_range(safe_min..=safe_max);
    }

    fn next_address(&mut self, space: &AddressSpace) -> u64 {
        let max = space.max_address();
        if self.rng.random_bool(PUSH_PROBABILITY) && self.depth < MAX_DEPTH {
            let delta = self.rng.random_range(MOVE_MIN..=MOVE_MAX);
            self.stack_pointer = self.stack_pointer.saturating_sub(delta);
            self.depth += 1;
        } else if self.depth > 0 {
            let delta = self.rng.random_range(MOVE_MIN..=MOVE_MAX);
            self.stack_pointer = self.stack_pointer.saturating_add(delta);
            self.depth -= 1;
        }
        // The walk is bounded by RAM, like a real stack by its guard pages.
        self.stack_pointer = self.stack_pointer.min(max);
        self.stack_pointer
    }

    fn describe(&self) -> PatternMetadata {
        PatternMetadata::new(PatternKind::Stack).with_span(self.initial_depth)
    }
}
