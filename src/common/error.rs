//! Dataset Error Types.
//!
//! Errors fall into three families: invalid construction parameters, an
//! external address source running dry, and internal invariant violations.
//! Configuration errors are raised eagerly at construction; the other two
//! are raised per example and handled at the example boundary.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, DatasetError>;

/// Errors raised while configuring or generating the dataset.
#[derive(Debug, Error)]
pub enum DatasetError {
    /// Invalid construction parameter (sizes, option sets, geometry).
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The external sequence generator produced fewer addresses than one
    /// example needs.
    ///
    /// `partial` holds the addresses that were produced, so the caller can
    /// still emit a flagged short example.
    #[error("sequence exhausted: expected {expected} addresses, source produced {produced}")]
    SequenceExhausted {
        expected: usize,
        produced: usize,
        partial: Vec<u64>,
    },

    /// An internal invariant was violated (e.g. an address outside the
    /// simulated address space). Never clamped.
    #[error("generation error: {0}")]
    RuntimeGeneration(String),

    /// Failure reading a configuration file.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

impl DatasetError {
    /// Shorthand for building a [`DatasetError::Configuration`].
    pub fn config(msg: impl Into<String>) -> Self {
        DatasetError::Configuration(msg.into())
    }

    /// Returns `true` for errors that only affect a single example.
    pub fn is_per_example(&self) -> bool {
        matches!(
            self,
            DatasetError::SequenceExhausted { .. } | DatasetError::RuntimeGeneration(_)
        )
    }
}
