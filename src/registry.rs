//! Pattern Registry and Selection.
//!
//! Holds the active pattern instances and decides which one governs each
//! stretch of a sequence. Selection draws from the caller's RNG, which in
//! deterministic mode is seeded from (epoch, example, rank), so the choice is
//! reproducible without any global state.

use crate::address_space::AddressSpace;
use crate::common::seed;
use crate::common::{DatasetError, Result};
use crate::config::{DatasetConfig, PatternKind, SwitchPolicy};
use crate::patterns::{AccessPattern, Pattern};
use rand::distr::weighted::WeightedIndex;
use rand::distr::Distribution;
use rand::Rng;

/// Active set of patterns plus the mid-sequence switching policy.
pub struct PatternRegistry {
    patterns: Vec<Pattern>,
    weights: Option<WeightedIndex<f64>>,
    switch_policy: SwitchPolicy,
}

impl PatternRegistry {
    /// Creates a registry with uniform selection.
    ///
    /// # Errors
    ///
    /// `ConfigurationError` if `patterns` is empty.
    pub fn new(patterns: Vec<Pattern>, switch_policy: SwitchPolicy) -> Result<Self> {
        if patterns.is_empty() {
            return Err(DatasetError::config(
                "at least one access pattern (or an external sequence generator) is required",
            ));
        }
        match switch_policy {
            SwitchPolicy::Every(0) => {
                return Err(DatasetError::config("switch interval must be positive"));
            }
            SwitchPolicy::Probability(p) if !(0.0..=1.0).contains(&p) => {
                return Err(DatasetError::config(format!(
                    "switch probability must be in [0, 1], got {}",
                    p
                )));
            }
            _ => {}
        }
        Ok(Self {
            patterns,
            weights: None,
            switch_policy,
        })
    }

    /// Creates a registry from pattern kinds.
    pub fn from_kinds(kinds: &[PatternKind], switch_policy: SwitchPolicy) -> Result<Self> {
        Self::new(kinds.iter().map(|&k| Pattern::new(k)).collect(), switch_policy)
    }

    /// Creates the registry described by a dataset configuration.
    pub fn from_config(config: &DatasetConfig) -> Result<Self> {
        let registry = Self::from_kinds(&config.pattern_kinds(), config.switch_policy)?;
        match &config.pattern_weights {
            Some(weights) => registry.with_weights(weights),
            None => Ok(registry),
        }
    }

    /// Switches to weighted selection, one weight per registered pattern.
    pub fn with_weights(mut self, weights: &[f64]) -> Result<Self> {
        if weights.len() != self.patterns.len() {
            return Err(DatasetError::config(format!(
                "pattern_weights has {} entries for {} patterns",
                weights.len(),
                self.patterns.len()
            )));
        }
        let dist = WeightedIndex::new(weights.iter().copied())
            .map_err(|e| DatasetError::config(format!("invalid pattern_weights: {}", e)))?;
        self.weights = Some(dist);
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn switch_policy(&self) -> SwitchPolicy {
        self.switch_policy
    }

    pub fn kinds(&self) -> Vec<PatternKind> {
        self.patterns.iter().map(Pattern::kind).collect()
    }

    /// Picks a pattern index, uniformly or by weight.
    pub fn select<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        match &self.weights {
            Some(dist) => dist.sample(rng),
            None => rng.random_range(0..self.patterns.len()),
        }
    }

    /// Picks a pattern index directly from an index value (round-robin).
    pub fn select_by_index(&self, index: u64) -> usize {
        (index % self.patterns.len() as u64) as usize
    }

    /// Decides whether the composer reselects before emitting `step`.
    ///
    /// Never switches before the first address.
    pub fn should_switch<R: Rng + ?Sized>(&self, step: usize, rng: &mut R) -> bool {
        if step == 0 {
            return false;
        }
        match self.switch_policy {
            SwitchPolicy::Never => false,
            SwitchPolicy::Every(n) => step % n == 0,
            SwitchPolicy::Probability(p) => rng.random_bool(p),
        }
    }

    pub fn get(&self, index: usize) -> Option<&Pattern> {
        self.patterns.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Pattern> {
        self.patterns.get_mut(index)
    }

    /// Resets every pattern, so none carries cursor state into the next
    /// example.
    pub fn reset_all(&mut self, base_seed: u64, space: &AddressSpace) {
        for (i, pattern) in self.patterns.iter_mut().enumerate() {
            pattern.reset(seed::example_seed(base_seed, i as u64), space);
        }
    }
}
