//! Configuration system for the dataset generator.
//!
//! This module defines all configuration structures and enums used to
//! parameterize generation. It provides:
//! 1. **Defaults:** Baseline address-space, geometry and sequence constants.
//! 2. **Structures:** `DatasetConfig`, loadable from TOML.
//! 3. **Enums:** Access pattern kinds, pattern switching, short-sequence
//!    handling and replacement policy.

use crate::common::{DatasetError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Default configuration constants for the dataset.
///
/// These values are used when a key is omitted from the TOML file or when a
/// config is built with [`DatasetConfig::new`].
mod defaults {
    /// Simulated RAM volume (2 GiB).
    ///
    /// Every generated address lies in `[0, RAM_VOLUME)`.
    pub const RAM_VOLUME: u64 = 1 << 31;

    /// Number of addresses per example.
    pub const MAX_SEQ_LENGTH: usize = 16;

    /// Candidate cache line sizes in bytes.
    pub const CACHE_LINES: &[u64] = &[32, 64, 128];

    /// Candidate associativities (0 = fully associative, 1 = direct-mapped).
    pub const ASSOCIATIVITY: &[u64] = &[0, 1, 2, 4, 8];

    /// Candidate simulated cache capacities, in lines.
    pub const LINE_COUNTS: &[u64] = &[16, 32, 64, 128, 256, 512, 1024];
}

/// Memory access pattern variants available to the composer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternKind {
    /// Unit-step walk with occasional random jumps.
    Sequential,
    /// Constant-stride array traversal.
    Stride,
    /// Uniformly random addresses.
    Random,
    /// Repeated traversal of a small contiguous range.
    Loop,
    /// Stack pointer moving up and down by small amounts.
    Stack,
    /// Bump allocation with occasional reuse of older offsets.
    Heap,
    /// Linked-list traversal over a scattered working set.
    #[serde(alias = "pointer-chase")]
    PointerChase,
}

impl PatternKind {
    /// Every variant, in declaration order. This is the registration order
    /// when `patterns` is omitted.
    pub const ALL: [PatternKind; 7] = [
        PatternKind::Sequential,
        PatternKind::Stride,
        PatternKind::Random,
        PatternKind::Loop,
        PatternKind::Stack,
        PatternKind::Heap,
        PatternKind::PointerChase,
    ];

    /// Short lowercase name used in logs and reports.
    pub fn name(self) -> &'static str {
        match self {
            PatternKind::Sequential => "sequential",
            PatternKind::Stride => "stride",
            PatternKind::Random => "random",
            PatternKind::Loop => "loop",
            PatternKind::Stack => "stack",
            PatternKind::Heap => "heap",
            PatternKind::PointerChase => "pointer_chase",
        }
    }
}

/// When the composer hands over to a different pattern mid-sequence.
///
/// Switching simulates phase changes in real workloads. In TOML:
/// `switch_policy = "never"`, `switch_policy = { every = 8 }` or
/// `switch_policy = { probability = 0.05 }`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SwitchPolicy {
    /// One pattern governs the whole sequence.
    #[default]
    Never,
    /// Reselect a pattern every `n` addresses.
    Every(usize),
    /// Reselect with the given probability before each address.
    Probability(f64),
}

/// What to do when an external generator runs dry mid-example.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ShortSequencePolicy {
    /// Emit the example padded to full length and flagged as short.
    #[default]
    Pad,
    /// Emit an error in place of the example; the epoch continues.
    Reject,
}

/// Replacement policy of the simulated cache that produces labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ReplacementPolicy {
    #[default]
    #[serde(alias = "Lru")]
    Lru,
    #[serde(alias = "Fifo")]
    Fifo,
}

/// Complete dataset configuration.
///
/// Only `epoch_size` is required; every other key falls back to a default.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DatasetConfig {
    /// Examples per epoch, per rank/worker.
    pub epoch_size: usize,

    #[serde(default = "DatasetConfig::default_ram_volume")]
    pub ram_volume: u64,

    #[serde(default = "DatasetConfig::default_max_seq_length")]
    pub max_seq_length: usize,

    /// Candidate line sizes in bytes.
    #[serde(default = "DatasetConfig::default_cache_lines")]
    pub cache_lines: Vec<u64>,

    /// Candidate ways per set. `0` draws a fully associative cache.
    #[serde(default = "DatasetConfig::default_associativity")]
    pub cache_associativity_options: Vec<u64>,

    /// Candidate simulated cache capacities, in lines.
    #[serde(default = "DatasetConfig::default_line_counts")]
    pub cache_line_counts: Vec<u64>,

    #[serde(default)]
    pub verbose: bool,

    #[serde(default)]
    pub global_rank: u64,

    /// Data-loader worker index within one rank.
    #[serde(default)]
    pub worker_id: u64,

    #[serde(default)]
    pub deterministic: bool,

    /// Base seed mixed with rank, worker, epoch and example index.
    #[serde(default)]
    pub seed: u64,

    /// Active patterns. `None` registers every variant.
    #[serde(default)]
    pub patterns: Option<Vec<PatternKind>>,

    /// Selection weights, parallel to `patterns`, or to [`PatternKind::ALL`]
    /// when `patterns` is omitted. `None` means uniform.
    #[serde(default)]
    pub pattern_weights: Option<Vec<f64>>,

    #[serde(default)]
    pub switch_policy: SwitchPolicy,

    #[serde(default)]
    pub short_sequence_policy: ShortSequencePolicy,

    #[serde(default)]
    pub replacement_policy: ReplacementPolicy,
}

impl DatasetConfig {
    /// Builds a configuration with every optional key at its default.
    pub fn new(epoch_size: usize) -> Self {
        Self {
            epoch_size,
            ram_volume: defaults::RAM_VOLUME,
            max_seq_length: defaults::MAX_SEQ_LENGTH,
            cache_lines: defaults::CACHE_LINES.to_vec(),
            cache_associativity_options: defaults::ASSOCIATIVITY.to_vec(),
            cache_line_counts: defaults::LINE_COUNTS.to_vec(),
            verbose: false,
            global_rank: 0,
            worker_id: 0,
            deterministic: false,
            seed: 0,
            patterns: None,
            pattern_weights: None,
            switch_policy: SwitchPolicy::default(),
            short_sequence_policy: ShortSequencePolicy::default(),
            replacement_policy: ReplacementPolicy::default(),
        }
    }

    /// Parses a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| DatasetError::config(format!("failed to parse config: {}", e)))
    }

    /// Reads and parses a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Active pattern kinds after applying the default.
    pub fn pattern_kinds(&self) -> Vec<PatternKind> {
        match &self.patterns {
            Some(kinds) => kinds.clone(),
            None => PatternKind::ALL.to_vec(),
        }
    }

    /// Validates the scalar parameters.
    ///
    /// Address-space and geometry rules are checked by
    /// [`AddressSpace::new`](crate::address_space::AddressSpace::new);
    /// pattern set, weight and switch rules by
    /// [`PatternRegistry::new`](crate::registry::PatternRegistry::new).
    pub fn validate(&self) -> Result<()> {
        if self.epoch_size == 0 {
            return Err(DatasetError::config("epoch_size must be positive, got 0"));
        }
        if self.max_seq_length == 0 {
            return Err(DatasetError::config(
                "max_seq_length must be positive, got 0",
            ));
        }
        if self.cache_lines.is_empty() {
            return Err(DatasetError::config("cache_lines must be non-empty"));
        }
        if self.cache_associativity_options.is_empty() {
            return Err(DatasetError::config(
                "cache_associativity_options must be non-empty",
            ));
        }
        if self.cache_line_counts.is_empty() {
            return Err(DatasetError::config("cache_line_counts must be non-empty"));
        }
        Ok(())
    }

    fn default_ram_volume() -> u64 {
        defaults::RAM_VOLUME
    }

    fn default_max_seq_length() -> usize {
        defaults::MAX_SEQ_LENGTH
    }

    fn default_cache_lines() -> Vec<u64> {
        defaults::CACHE_LINES.to_vec()
    }

    fn default_associativity() -> Vec<u64> {
        defaults::ASSOCIATIVITY.to_vec()
    }

    fn default_line_counts() -> Vec<u64> {
        defaults::LINE_COUNTS.to_vec()
    }
}
