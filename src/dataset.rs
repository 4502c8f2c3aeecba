//! Cache Behaviour Dataset.
//!
//! `CacheDataset` ties the pieces together. For every example it:
//!
//! 1. Derives an explicit seed from (seed, rank, worker, epoch, example).
//! 2. Draws a cache geometry from the configured option sets.
//! 3. Composes an address sequence from the patterns or the external source.
//! 4. Replays the sequence through a [`CacheSim`] of that geometry to label
//!    each access as hit or miss.
//!
//! Traversal is pull-based: [`CacheDataset::iter`] starts a new epoch and
//! returns an [`Epoch`] iterator that yields exactly `epoch_size` items. The
//! iterator borrows the dataset mutably, so one instance can only be
//! traversed by one consumer at a time. Distributed workers each build their
//! own instance with a distinct `global_rank` / `worker_id`.

use crate::address_space::{AddressSpace, CacheGeometry};
use crate::cache::CacheSim;
use crate::common::seed;
use crate::common::{DatasetError, Label, Result, PAD_VALUE};
use crate::composer::{AddressSource, ExternalSequence, PatternSource, SequenceComposer};
use crate::config::{DatasetConfig, ReplacementPolicy, ShortSequencePolicy};
use crate::patterns::{Pattern, PatternMetadata};
use crate::registry::PatternRegistry;
use crate::stats::GenerationStats;
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use std::iter::FusedIterator;

/// One training example.
///
/// The three numeric channels have identical length `max_seq_length`.
/// Positions at or beyond `valid_len` are padding and hold `-1` in every
/// channel.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Example {
    /// Geometry used to compute line indices and labels.
    pub geometry: CacheGeometry,
    /// Byte addresses in `[0, ram_volume)`.
    pub addresses: Vec<i64>,
    /// Cache line index of each address under `geometry.line_size`.
    pub line_indices: Vec<i64>,
    /// 1 = hit, 0 = miss, -1 = padding.
    pub labels: Vec<i32>,
    /// Number of real (non-padding) positions.
    pub valid_len: usize,
    /// Patterns that produced the addresses, in order. Empty for external
    /// sequences.
    pub segments: Vec<PatternMetadata>,
}

impl Example {
    pub fn len(&self) -> usize {
        self.addresses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }

    /// `true` if the address source ran dry before filling the example.
    pub fn is_short(&self) -> bool {
        self.valid_len < self.addresses.len()
    }

    /// Geometry as a numeric context vector: (line size, associativity, lines).
    pub fn context(&self) -> [i64; 3] {
        [
            self.geometry.line_size as i64,
            self.geometry.associativity as i64,
            self.geometry.num_lines as i64,
        ]
    }

    /// Set index of each address under `geometry`, `-1` at padding.
    pub fn set_indices(&self) -> Vec<i64> {
        let sets = self.geometry.num_sets() as i64;
        self.line_indices
            .iter()
            .map(|&line| if line < 0 { PAD_VALUE } else { line % sets })
            .collect()
    }

    /// Decoded labels.
    pub fn label_values(&self) -> Vec<Label> {
        self.labels
            .iter()
            .map(|&code| Label::from_code(code).unwrap_or(Label::Padding))
            .collect()
    }

    /// Splits the example into its (addresses, line indices, labels) channels.
    pub fn into_tensors(self) -> (Vec<i64>, Vec<i64>, Vec<i32>) {
        (self.addresses, self.line_indices, self.labels)
    }
}

/// Replays `addresses` through a fresh cache and packages the channels,
/// padding to `len`.
fn label_sequence(
    space: &AddressSpace,
    geometry: CacheGeometry,
    policy: ReplacementPolicy,
    addresses: &[u64],
    segments: Vec<PatternMetadata>,
    len: usize,
) -> Example {
    let mut cache = CacheSim::new(geometry, policy);
    let mut addrs = Vec::with_capacity(len);
    let mut lines = Vec::with_capacity(len);
    let mut labels = Vec::with_capacity(len);

    for &addr in addresses.iter().take(len) {
        addrs.push(addr as i64);
        lines.push(space.line_index(addr, geometry.line_size) as i64);
        labels.push(Label::from(cache.access(addr)).code());
    }
    let valid_len = addrs.len();

    addrs.resize(len, PAD_VALUE);
    lines.resize(len, PAD_VALUE);
    labels.resize(len, Label::Padding.code());

    Example {
        geometry,
        addresses: addrs,
        line_indices: lines,
        labels,
        valid_len,
        segments,
    }
}

/// Iterable dataset of synthetic cache-behaviour examples.
pub struct CacheDataset {
    config: DatasetConfig,
    space: AddressSpace,
    composer: SequenceComposer,
    epochs_started: u64,
    stats: GenerationStats,
}

impl CacheDataset {
    /// Creates a dataset that composes sequences from the configured patterns.
    ///
    /// # Errors
    ///
    /// `ConfigurationError` for any invalid parameter.
    pub fn new(config: DatasetConfig) -> Result<Self> {
        config.validate()?;
        let registry = PatternRegistry::from_config(&config)?;
        Self::with_source(config, Box::new(PatternSource::new(registry)))
    }

    /// Creates a dataset over caller-built pattern instances.
    pub fn with_patterns(config: DatasetConfig, patterns: Vec<Pattern>) -> Result<Self> {
        config.validate()?;
        let mut registry = PatternRegistry::new(patterns, config.switch_policy)?;
        if let Some(weights) = &config.pattern_weights {
            registry = registry.with_weights(weights)?;
        }
        Self::with_source(config, Box::new(PatternSource::new(registry)))
    }

    /// Creates a dataset whose addresses come from `generator` instead of
    /// the internal patterns.
    ///
    /// In deterministic mode `generator` is called once per example, so it
    /// must return the same sequence on every call to keep runs reproducible.
    /// Otherwise one iterator is shared and continues across examples.
    pub fn with_sequences_generator<F, I>(config: DatasetConfig, generator: F) -> Result<Self>
    where
        F: FnMut() -> I + Send + 'static,
        I: IntoIterator<Item = u64>,
        I::IntoIter: Send + 'static,
    {
        let source = ExternalSequence::new(generator, config.deterministic);
        Self::with_source(config, Box::new(source))
    }

    /// Creates a dataset over an arbitrary address source.
    pub fn with_source(config: DatasetConfig, source: Box<dyn AddressSource>) -> Result<Self> {
        config.validate()?;
        let space = AddressSpace::from_config(&config)?;
        let composer = SequenceComposer::new(source, config.max_seq_length);

        if config.verbose {
            info!(
                "cache dataset: epoch_size={} max_seq_length={} ram_volume={:#x} rank={} worker={} deterministic={} external={}",
                config.epoch_size,
                config.max_seq_length,
                config.ram_volume,
                config.global_rank,
                config.worker_id,
                config.deterministic,
                composer.is_external()
            );
        }

        Ok(Self {
            config,
            space,
            composer,
            epochs_started: 0,
            stats: GenerationStats::default(),
        })
    }

    pub fn config(&self) -> &DatasetConfig {
        &self.config
    }

    pub fn address_space(&self) -> &AddressSpace {
        &self.space
    }

    pub fn stats(&self) -> &GenerationStats {
        &self.stats
    }

    pub fn epoch_size(&self) -> usize {
        self.config.epoch_size
    }

    /// Number of epochs started so far.
    pub fn epochs_started(&self) -> u64 {
        self.epochs_started
    }

    /// `true` if addresses come from an external generator.
    pub fn is_external(&self) -> bool {
        self.composer.is_external()
    }

    /// Seed shared by all examples of `epoch`.
    ///
    /// Deterministic mode derives it from the configured seed; otherwise the
    /// base is drawn from ambient entropy, so every call differs.
    fn epoch_seed(&self, epoch: u64) -> u64 {
        let base = if self.config.deterministic {
            self.config.seed
        } else {
            rand::random()
        };
        seed::epoch_seed(base, self.config.global_rank, self.config.worker_id, epoch)
    }

    /// Starts a new epoch.
    ///
    /// The returned iterator yields exactly `epoch_size` items. A per-example
    /// failure is yielded as `Err` in that example's slot and the epoch
    /// continues.
    pub fn iter(&mut self) -> Epoch<'_> {
        let epoch = self.epochs_started;
        self.epochs_started += 1;
        self.stats.epochs += 1;
        let epoch_seed = self.epoch_seed(epoch);

        if self.config.verbose {
            debug!(
                "starting epoch {}: rank={} worker={} seed={:#018x} deterministic={}",
                epoch,
                self.config.global_rank,
                self.config.worker_id,
                epoch_seed,
                self.config.deterministic
            );
        }

        Epoch {
            remaining: self.config.epoch_size,
            next_index: 0,
            epoch,
            epoch_seed,
            dataset: self,
        }
    }

    /// Produces the example at position `index` of epoch `epoch`.
    ///
    /// In deterministic mode this reproduces exactly the example an epoch
    /// traversal yields at that position (for pattern sources and fresh
    /// external generators).
    pub fn generate_data(&mut self, epoch: u64, index: u64) -> Result<Example> {
        let epoch_seed = self.epoch_seed(epoch);
        self.generate_example(epoch_seed, epoch, index)
    }

    fn generate_example(&mut self, epoch_seed: u64, epoch: u64, index: u64) -> Result<Example> {
        let mut rng = StdRng::seed_from_u64(seed::example_seed(epoch_seed, index));
        let geometry = self.space.draw_geometry(&mut rng);
        let len = self.config.max_seq_length;

        let (addresses, segments) = match self.composer.compose(&self.space, &mut rng) {
            Ok(seq) => (seq.addresses, seq.segments),
            Err(DatasetError::SequenceExhausted {
                expected,
                produced,
                partial,
            }) => {
                if self.config.verbose {
                    warn!(
                        "epoch {} example {}: sequence generator produced {} of {} addresses ({:?})",
                        epoch, index, produced, expected, self.config.short_sequence_policy
                    );
                }
                match self.config.short_sequence_policy {
                    ShortSequencePolicy::Pad => (partial, Vec::new()),
                    ShortSequencePolicy::Reject => {
                        self.stats.failed_examples += 1;
                        return Err(DatasetError::SequenceExhausted {
                            expected,
                            produced,
                            partial,
                        });
                    }
                }
            }
            Err(e) => {
                self.stats.failed_examples += 1;
                return Err(e);
            }
        };

        let example = label_sequence(
            &self.space,
            geometry,
            self.config.replacement_policy,
            &addresses,
            segments,
            len,
        );

        if self.config.verbose {
            debug!(
                "epoch {} example {}: geometry={:?} patterns={:?} valid_len={}",
                epoch,
                index,
                example.geometry,
                example
                    .segments
                    .iter()
                    .map(|s| s.kind.name())
                    .collect::<Vec<_>>(),
                example.valid_len
            );
        }

        self.stats.record(&example);
        Ok(example)
    }
}

/// One epoch of examples.
///
/// Exhausted after `epoch_size` items; call [`CacheDataset::iter`] again for
/// the next epoch.
pub struct Epoch<'a> {
    dataset: &'a mut CacheDataset,
    epoch: u64,
    epoch_seed: u64,
    next_index: u64,
    remaining: usize,
}

impl Epoch<'_> {
    /// Index of this epoch (0-based).
    pub fn epoch(&self) -> u64 {
        self.epoch
    }
}

impl Iterator for Epoch<'_> {
    type Item = Result<Example>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let index = self.next_index;
        self.next_index += 1;
        Some(
            self.dataset
                .generate_example(self.epoch_seed, self.epoch, index),
        )
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for Epoch<'_> {}

impl FusedIterator for Epoch<'_> {}

impl<'a> IntoIterator for &'a mut CacheDataset {
    type Item = Result<Example>;
    type IntoIter = Epoch<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
