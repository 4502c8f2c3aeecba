//! Simulated Address Space and Cache Geometry.
//!
//! The address space owns the RAM volume and the candidate geometry option
//! sets. It validates addresses, maps them onto cache lines and sets, and
//! draws a concrete [`CacheGeometry`] for each example.
//!
//! All sizes are powers of two, so line and set indices reduce to shifts and
//! masks of the byte address:
//!
//! ```text
//! | tag | set index | line offset |
//!         log2(sets)  log2(line_size)
//! ```

use crate::common::{DatasetError, Result};
use crate::config::DatasetConfig;
use rand::Rng;
use serde::Serialize;

/// Concrete cache geometry used to label one example.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct CacheGeometry {
    /// Line size in bytes.
    pub line_size: u64,
    /// Ways per set.
    pub associativity: u64,
    /// Total lines in the cache.
    pub num_lines: u64,
}

impl CacheGeometry {
    /// Number of sets (`num_lines / associativity`).
    pub fn num_sets(&self) -> u64 {
        self.num_lines / self.associativity
    }

    /// Total capacity in bytes.
    pub fn capacity_bytes(&self) -> u64 {
        self.num_lines * self.line_size
    }

    /// `true` when every line shares one set.
    pub fn is_fully_associative(&self) -> bool {
        self.num_sets() == 1
    }
}

/// Bounded byte-addressable memory plus the geometry option sets.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AddressSpace {
    ram_volume: u64,
    cache_lines: Vec<u64>,
    associativity_options: Vec<u64>,
    line_counts: Vec<u64>,
}

/// Largest supported RAM volume; addresses must fit the signed output channels.
pub const MAX_RAM_VOLUME: u64 = 1 << 62;

/// Associativity option selecting a fully associative cache: every drawn
/// line shares a single set.
pub const FULLY_ASSOCIATIVE: u64 = 0;

fn check_power_of_two(name: &str, value: u64) -> Result<()> {
    if value == 0 || !value.is_power_of_two() {
        return Err(DatasetError::config(format!(
            "{} must be a positive power of two, got {}",
            name, value
        )));
    }
    Ok(())
}

impl AddressSpace {
    /// Creates an address space, validating every geometry option.
    ///
    /// # Errors
    ///
    /// `ConfigurationError` if `ram_volume` or any option is not a positive
    /// power of two (an associativity may also be [`FULLY_ASSOCIATIVE`]),
    /// `ram_volume` exceeds [`MAX_RAM_VOLUME`], an option set is empty, a
    /// line size exceeds the RAM volume, or a `line_size * associativity`
    /// pairing does not fit in it.
    pub fn new(
        ram_volume: u64,
        cache_lines: Vec<u64>,
        associativity_options: Vec<u64>,
        line_counts: Vec<u64>,
    ) -> Result<Self> {
        check_power_of_two("ram_volume", ram_volume)?;
        if ram_volume > MAX_RAM_VOLUME {
            return Err(DatasetError::config(format!(
                "ram_volume {:#x} exceeds the maximum of {:#x}",
                ram_volume, MAX_RAM_VOLUME
            )));
        }

        if cache_lines.is_empty() {
            return Err(DatasetError::config("cache_lines must be non-empty"));
        }
        if associativity_options.is_empty() {
            return Err(DatasetError::config(
                "cache_associativity_options must be non-empty",
            ));
        }
        if line_counts.is_empty() {
            return Err(DatasetError::config("cache_line_counts must be non-empty"));
        }

        for &line in &cache_lines {
            check_power_of_two("cache line size", line)?;
            if line > ram_volume {
                return Err(DatasetError::config(format!(
                    "cache line size {} exceeds ram_volume {}",
                    line, ram_volume
                )));
            }
        }
        for &ways in &associativity_options {
            if ways != FULLY_ASSOCIATIVE {
                check_power_of_two("associativity", ways)?;
            }
        }
        for &count in &line_counts {
            check_power_of_two("cache line count", count)?;
        }

        for &line in &cache_lines {
            for &ways in &associativity_options {
                if ways == FULLY_ASSOCIATIVE {
                    continue;
                }
                match line.checked_mul(ways) {
                    Some(set_bytes) if set_bytes <= ram_volume => {}
                    _ => {
                        return Err(DatasetError::config(format!(
                            "line size {} x associativity {} does not fit in ram_volume {}",
                            line, ways, ram_volume
                        )));
                    }
                }
            }
        }

        Ok(Self {
            ram_volume,
            cache_lines,
            associativity_options,
            line_counts,
        })
    }

    /// Builds the address space described by a dataset configuration.
    pub fn from_config(config: &DatasetConfig) -> Result<Self> {
        Self::new(
            config.ram_volume,
            config.cache_lines.clone(),
            config.cache_associativity_options.clone(),
            config.cache_line_counts.clone(),
        )
    }

    pub fn ram_volume(&self) -> u64 {
        self.ram_volume
    }

    /// Highest valid address.
    pub fn max_address(&self) -> u64 {
        self.ram_volume - 1
    }

    pub fn cache_lines(&self) -> &[u64] {
        &self.cache_lines
    }

    pub fn associativity_options(&self) -> &[u64] {
        &self.associativity_options
    }

    pub fn line_counts(&self) -> &[u64] {
        &self.line_counts
    }

    /// Returns `true` if `addr` lies in `[0, ram_volume)`.
    pub fn validate_address(&self, addr: u64) -> bool {
        addr < self.ram_volume
    }

    /// Draws an address uniformly from `[0, ram_volume)`.
    pub fn random_address<R: Rng + ?Sized>(&self, rng: &mut R) -> u64 {
        rng.random_range(0..self.ram_volume)
    }

    /// Index of the cache line containing `addr`.
    pub fn line_index(&self, addr: u64, line_size: u64) -> u64 {
        addr / line_size
    }

    /// Index of the set `addr` maps to under `geometry`.
    pub fn set_index(&self, addr: u64, geometry: &CacheGeometry) -> u64 {
        self.line_index(addr, geometry.line_size) % geometry.num_sets()
    }

    /// Draws one geometry from the option sets.
    ///
    /// The line count is clamped into `[associativity, ram_volume / line_size]`
    /// so the simulated cache never holds more lines than RAM has. Because
    /// every value is a power of two, the result always divides evenly into
    /// sets. Drawing [`FULLY_ASSOCIATIVE`] sets the associativity to the
    /// clamped line count.
    pub fn draw_geometry<R: Rng + ?Sized>(&self, rng: &mut R) -> CacheGeometry {
        let line_size = pick(&self.cache_lines, rng);
        let associativity = pick(&self.associativity_options, rng);
        let max_lines = self.ram_volume / line_size;
        let num_lines = pick(&self.line_counts, rng).min(max_lines);

        if associativity == FULLY_ASSOCIATIVE {
            return CacheGeometry {
                line_size,
                associativity: num_lines,
                num_lines,
            };
        }

        CacheGeometry {
            line_size,
            associativity,
            num_lines: num_lines.max(associativity),
        }
    }
}

fn pick<R: Rng + ?Sized>(options: &[u64], rng: &mut R) -> u64 {
    options[rng.random_range(0..options.len())]
}
