//! Fixed-Stride Access.
//!
//! Models array traversal: starting from a random base, each access moves
//! `stride` bytes forward, wrapping at the end of RAM. The first access is
//! the base itself.

use super::{AccessPattern, PatternMetadata};
use crate::address_space::AddressSpace;
use crate::config::PatternKind;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const STRIDE_MIN: u64 = 1;
const STRIDE_MAX: u64 = 16;

pub struct StridePattern {
    stride: u64,
    cursor: u64,
}

impl StridePattern {
    pub fn new() -> Self {
        Self {
            stride: STRIDE_MIN,
            cursor: 0,
        }
    }

    pub fn stride(&self) -> u64 {
        self.stride
    }
}

impl Default for StridePattern {
    fn default() -> Self {
        Self::new()
    }
}

impl AccessPattern for StridePattern {
    fn reset(&mut self, seed: u64, space: &AddressSpace) {
        let mut rng = StdRng::seed_from_u64(seed);
        self.stride = rng.random_range(STRIDE_MIN..=STRIDE_MAX);
        self.cursor = space.random_address(&mut rng);
    }

    fn next_address(&mut self, space: &AddressSpace) -> u64 {
        let ram = space.ram_volume();
        let addr = self.cursor % ram;
        self.cursor = (addr + self.stride % ram) % ram;
        addr
    }

    fn describe(&self) -> PatternMetadata {
        PatternMetadata::new(PatternKind::Stride).with_stride(self.stride)
    }
}
