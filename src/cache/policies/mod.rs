//! Cache Replacement Policies.
//!
//! Implements the algorithms for selecting victim lines in the set-associative
//! cache that labels each example.
//!
//! # Policies
//!
//! - `Fifo`: First-In, First-Out.
//! - `Lru`: Least Recently Used.

/// First-In, First-Out replacement policy.
pub mod fifo;

/// Least Recently Used replacement policy.
pub mod lru;

pub use fifo::FifoPolicy;
pub use lru::LruPolicy;

use crate::config::ReplacementPolicy as PolicyKind;

/// Trait for cache replacement policies.
///
/// Defines the interface for updating usage state and selecting victim lines.
pub trait ReplacementPolicy: Send + Sync {
    /// Updates the policy state when a resident line is hit.
    ///
    /// # Arguments
    ///
    /// * `set` - The cache set index.
    /// * `way` - The way index within the set that was accessed.
    fn update(&mut self, set: usize, way: usize);

    /// Updates the policy state when a line is installed into `way`.
    ///
    /// Defaults to [`update`](Self::update).
    fn install(&mut self, set: usize, way: usize) {
        self.update(set, way);
    }

    /// Selects a victim line to evict from a specific set.
    ///
    /// # Returns
    ///
    /// The index of the way to evict.
    fn get_victim(&mut self, set: usize) -> usize;

    /// Returns every set to its initial state.
    fn reset(&mut self);
}

/// Instantiates the policy selected in the configuration.
pub fn build(kind: PolicyKind, sets: usize, ways: usize) -> Box<dyn ReplacementPolicy> {
    match kind {
        PolicyKind::Lru => Box::new(LruPolicy::new(sets, ways)),
        PolicyKind::Fifo => Box::new(FifoPolicy::new(sets, ways)),
    }
}
