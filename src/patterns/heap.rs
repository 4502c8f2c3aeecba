//! Heap Allocation Access.
//!
//! Models an allocator inside a heap region of at most `MAX_HEAP_SIZE` bytes.
//! With probability 0.8 the next access bumps the offset forward by an
//! allocation of 1..=100 bytes; otherwise it revisits a random earlier offset,
//! as freed blocks get reused.

use super::{AccessPattern, PatternMetadata};
use crate::address_space::AddressSpace;
use crate::config::PatternKind;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const MAX_HEAP_SIZE: u64 = 10_000;
const ALLOC_MIN: u64 = 1;
const ALLOC_MAX: u64 = 100;
const ALLOCATION_PROBABILITY: f64 = 0.8;

pub struct HeapPattern {
    rng: StdRng,
    base: u64,
    heap_size: u64,
    offset: u64,
}

impl HeapPattern {
    pub fn new() -> Self {
        Self {
            rng: StdRng::seed_from_u64(0),
            base: 0,
            heap_size: 0,
            offset: 0,
        }
    }

    pub fn base(&self) -> u64 {
        self.base
    }
}

impl Default for HeapPattern {
    fn default() -> Self {
        Self::new()
    }
}

impl AccessPattern for HeapPattern {
    fn reset(&mut self, seed: u64, space: &AddressSpace) {
        self.rng = StdRng::seed_from_u64(seed);
        let max = space.max_address();
        self.heap_size = MAX_HEAP_SIZE.min(max / 2);
        self.base = self.rng.random_range(0..=max - self.heap_size);
        self.offset = 0;
    }

    fn next_address(&mut self, space: &AddressSpace) -> u64 {
        if self.rng.random_bool(ALLOCATION_PROBABILITY) {
            self.offset += self.rng.random_range(ALLOC_MIN..=ALLOC_MAX);
        } else {
            self.offset = self.rng.random_range(0..=self.offset.max(1));
        }
        (self.base + self.offset).min(space.max_address())
    }

    fn describe(&self) -> PatternMetadata {
        PatternMetadata::new(PatternKind::Heap).with_span(self.heap_size)
    }
}
