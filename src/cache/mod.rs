//! Set-Associative Cache Simulator.
//!
//! Replays an address sequence through a cache of a given geometry and
//! reports, for every access, whether it hit. Only tags are tracked; there is
//! no data, no dirty state and no timing. The result is the ground-truth label
//! channel of an example.
//!
//! Address decomposition:
//!
//! ```text
//! line = addr / line_size
//! set  = line % num_sets
//! tag  = line / num_sets
//! ```

/// Replacement policies.
pub mod policies;

use crate::address_space::CacheGeometry;
use crate::config::ReplacementPolicy as PolicyKind;
use policies::ReplacementPolicy;

/// Tag-only set-associative cache.
pub struct CacheSim {
    geometry: CacheGeometry,
    sets: usize,
    ways: usize,
    /// `sets * ways` slots, row-major by set.
    tags: Vec<Option<u64>>,
    policy: Box<dyn ReplacementPolicy>,
    pub hits: u64,
    pub misses: u64,
}

impl CacheSim {
    /// Creates an empty cache.
    pub fn new(geometry: CacheGeometry, policy: PolicyKind) -> Self {
        let sets = geometry.num_sets() as usize;
        let ways = geometry.associativity as usize;
        Self {
            geometry,
            sets,
            ways,
            tags: vec![None; sets * ways],
            policy: policies::build(policy, sets, ways),
            hits: 0,
            misses: 0,
        }
    }

    pub fn geometry(&self) -> &CacheGeometry {
        &self.geometry
    }

    fn locate(&self, addr: u64) -> (usize, u64) {
        let line = addr / self.geometry.line_size;
        let sets = self.sets as u64;
        ((line % sets) as usize, line / sets)
    }

    fn find(&self, set: usize, tag: u64) -> Option<usize> {
        let base = set * self.ways;
        self.tags[base..base + self.ways]
            .iter()
            .position(|&t| t == Some(tag))
    }

    /// Returns `true` if the line holding `addr` is resident. Does not touch
    /// replacement state.
    pub fn contains(&self, addr: u64) -> bool {
        let (set, tag) = self.locate(addr);
        self.find(set, tag).is_some()
    }

    /// Accesses `addr`, installing its line on a miss.
    ///
    /// # Returns
    ///
    /// `true` on hit, `false` on miss.
    pub fn access(&mut self, addr: u64) -> bool {
        let (set, tag) = self.locate(addr);

        if let Some(way) = self.find(set, tag) {
            self.policy.update(set, way);
            self.hits += 1;
            return true;
        }

        let base = set * self.ways;
        let way = match self.tags[base..base + self.ways]
            .iter()
            .position(Option::is_none)
        {
            Some(free) => free,
            None => self.policy.get_victim(set),
        };
        self.tags[base + way] = Some(tag);
        self.policy.install(set, way);
        self.misses += 1;
        false
    }

    /// Invalidates every line and clears the counters.
    pub fn reset(&mut self) {
        self.tags.iter_mut().for_each(|t| *t = None);
        self.policy.reset();
        self.hits = 0;
        self.misses = 0;
    }
}
