//! Common utilities and types used throughout the dataset generator.
//!
//! This module provides the error taxonomy, output label encoding, and the
//! explicit seed derivation shared by every stateful component.

/// Output label definitions and padding sentinels.
pub mod data;

/// Error types raised during configuration and generation.
pub mod error;

/// Deterministic seed derivation.
pub mod seed;

pub use data::{Label, PAD_VALUE};
pub use error::{DatasetError, Result};
