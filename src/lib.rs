//! Synthetic Cache Behaviour Dataset Library.
//!
//! This crate synthesizes labeled memory-access sequences for training models
//! that predict cache behaviour. Each example is a fixed-length sequence of
//! byte addresses, the cache line each address falls in, and a hit/miss label
//! obtained by replaying the sequence through a set-associative cache whose
//! geometry is drawn per example.
//!
//! # Architecture
//!
//! * **Address space**: RAM volume, geometry option sets, address validation.
//! * **Patterns**: Sequential, stride, random, loop, stack, heap and
//!   pointer-chasing generators behind one trait.
//! * **Composer**: Builds one sequence per example from the patterns or from
//!   an external generator.
//! * **Dataset**: Seeding, labeling and epoch iteration.
//!
//! # Modules
//!
//! * `address_space`: Address space and cache geometry.
//! * `cache`: Tag-only set-associative cache used for labels.
//! * `common`: Shared types, errors and seed derivation.
//! * `composer`: Address sources and the sequence composer.
//! * `config`: Configuration loading and parsing.
//! * `dataset`: The dataset, its examples and epoch iterator.
//! * `patterns`: Memory access pattern generators.
//! * `registry`: Pattern registry and selection.
//! * `stats`: Generation statistics.

/// Simulated address space and per-example cache geometry.
///
/// Validates addresses and geometry options and maps addresses onto cache
/// lines and sets.
pub mod address_space;

/// Set-associative cache simulator and replacement policies.
///
/// Replays address sequences to produce ground-truth hit/miss labels.
pub mod cache;

/// Shared types, error handling and seed derivation.
pub mod common;

/// Address sources and the sequence composer.
///
/// Builds one fixed-length address sequence per example, either from the
/// registered patterns or from a caller-supplied generator.
pub mod composer;

/// Configuration system for address space, geometry and generation settings.
///
/// Loads and parses TOML configuration files.
pub mod config;

/// The dataset orchestrator, examples and epoch iteration.
pub mod dataset;

/// Memory access pattern generators.
pub mod patterns;

/// Active pattern set and selection policy.
pub mod registry;

/// Generation statistics collection and reporting.
pub mod stats;

pub use address_space::{AddressSpace, CacheGeometry};
pub use common::{DatasetError, Label, Result};
pub use config::{DatasetConfig, PatternKind};
pub use dataset::{CacheDataset, Epoch, Example};
