//! Loop (Working-Set) Access.
//!
//! Repeatedly walks a contiguous range of `loop_size` bytes, as a tight loop
//! over a small buffer would. The range is placed so it never crosses the
//! end of RAM.

use super::{AccessPattern, PatternMetadata};
use crate::address_space::AddressSpace;
use crate::config::PatternKind;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const LOOP_SIZE_MIN: u64 = 10;
const LOOP_SIZE_MAX: u64 = 1000;

pub struct LoopPattern {
    start: u64,
    loop_size: u64,
    step: u64,
}

impl LoopPattern {
    pub fn new() -> Self {
        Self {
            start: 0,
            loop_size: 1,
            step: 0,
        }
    }

    pub fn loop_size(&self) -> u64 {
        self.loop_size
    }
}

impl Default for LoopPattern {
    fn default() -> Self {
        Self::new()
    }
}

impl AccessPattern for LoopPattern {
    fn reset(&mut self, seed: u64, space: &AddressSpace) {
        let mut rng = StdRng::seed_from_u64(seed);
        let ram = space.ram_volume();
        let hi = LOOP_SIZE_MAX.min(ram);
        let lo = LOOP_SIZE_MIN.min(hi);
        self.loop_size = rng.random_range(lo..=hi);
        self.start = rng.random_range(0..=ram - self.loop_size);
        self.step = 0;
    }

    fn next_address(&mut self, space: &AddressSpace) -> u64 {
        let addr = self.start + self.step % self.loop_size;
        self.step += 1;
        addr % space.ram_volume()
    }

    fn describe(&self) -> PatternMetadata {
        PatternMetadata::new(PatternKind::Loop).with_span(self.loop_size)
    }
}
