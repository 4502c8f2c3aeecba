//! Sequence Composition.
//!
//! The composer builds exactly one fixed-length address sequence per example
//! from an [`AddressSource`]. Two sources exist:
//!
//! * [`PatternSource`]: drives the registered patterns, switching between them
//!   according to the registry's switch policy.
//! * [`ExternalSequence`]: pulls addresses from a caller-supplied generator,
//!   bypassing the patterns entirely.
//!
//! Every address is checked against the address space before it is accepted.
//! An out-of-range address is a [`DatasetError::RuntimeGeneration`] and is
//! never clamped.

use crate::address_space::AddressSpace;
use crate::common::{DatasetError, Result};
use crate::patterns::{AccessPattern, PatternMetadata};
use crate::registry::PatternRegistry;
use rand::rngs::StdRng;
use rand::Rng;

/// Addresses of one example plus the patterns that produced them.
#[derive(Clone, Debug, PartialEq)]
pub struct ComposedSequence {
    pub addresses: Vec<u64>,
    /// One entry per pattern segment, in order. Empty for external sources.
    pub segments: Vec<PatternMetadata>,
}

/// Anything that can fill one example's worth of addresses.
pub trait AddressSource: Send {
    /// Produces exactly `len` addresses in `[0, space.ram_volume())`.
    ///
    /// # Errors
    ///
    /// * `SequenceExhausted` if fewer than `len` addresses are available.
    /// * `RuntimeGeneration` if an address falls outside the address space.
    fn fill(
        &mut self,
        space: &AddressSpace,
        len: usize,
        rng: &mut StdRng,
    ) -> Result<ComposedSequence>;

    /// Returns `true` when addresses come from outside the crate.
    fn is_external(&self) -> bool {
        false
    }
}

fn out_of_range(origin: &str, addr: u64, space: &AddressSpace) -> DatasetError {
    DatasetError::RuntimeGeneration(format!(
        "{} produced address {:#x} outside [0, {:#x})",
        origin,
        addr,
        space.ram_volume()
    ))
}

/// Address source backed by the pattern registry.
pub struct PatternSource {
    registry: PatternRegistry,
}

impl PatternSource {
    pub fn new(registry: PatternRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &PatternRegistry {
        &self.registry
    }

    /// Selects a pattern, reseeds it, and records its parameters.
    fn start_segment(
        &mut self,
        space: &AddressSpace,
        rng: &mut StdRng,
        segments: &mut Vec<PatternMetadata>,
    ) -> Result<usize> {
        let index = self.registry.select(rng);
        let seed: u64 = rng.random();
        let pattern = self.registry.get_mut(index).ok_or_else(|| {
            DatasetError::RuntimeGeneration(format!("selected pattern {} not registered", index))
        })?;
        pattern.reset(seed, space);
        segments.push(pattern.describe());
        Ok(index)
    }
}

impl AddressSource for PatternSource {
    fn fill(
        &mut self,
        space: &AddressSpace,
        len: usize,
        rng: &mut StdRng,
    ) -> Result<ComposedSequence> {
        let mut segments = Vec::new();
        let mut addresses = Vec::with_capacity(len);
        let mut active = self.start_segment(space, rng, &mut segments)?;

        for step in 0..len {
            if self.registry.should_switch(step, rng) {
                active = self.start_segment(space, rng, &mut segments)?;
            }
            let pattern = self.registry.get_mut(active).ok_or_else(|| {
                DatasetError::RuntimeGeneration(format!("active pattern {} vanished", active))
            })?;
            let addr = pattern.next_address(space);
            if !space.validate_address(addr) {
                return Err(out_of_range(pattern.kind().name(), addr, space));
            }
            addresses.push(addr);
        }

        Ok(ComposedSequence {
            addresses,
            segments,
        })
    }
}

type BoxedAddresses = Box<dyn Iterator<Item = u64> + Send>;

/// Factory producing a fresh lazy address sequence.
pub type SequenceFactory = Box<dyn FnMut() -> BoxedAddresses + Send>;

/// Address source backed by a caller-supplied generator.
///
/// With `fresh_per_example`, the factory is called once per example, so the
/// same generator yields the same sequence every time. Otherwise a single
/// iterator is shared across examples and simply continues. An example that
/// finds the shared iterator already drained starts a new one from the
/// factory, so only a generator that runs dry mid-example is reported short.
pub struct ExternalSequence {
    factory: SequenceFactory,
    shared: Option<BoxedAddresses>,
    fresh_per_example: bool,
}

impl ExternalSequence {
    pub fn new<F, I>(mut generator: F, fresh_per_example: bool) -> Self
    where
        F: FnMut() -> I + Send + 'static,
        I: IntoIterator<Item = u64>,
        I::IntoIter: Send + 'static,
    {
        let factory: SequenceFactory =
            Box::new(move || Box::new(generator().into_iter()) as BoxedAddresses);
        Self {
            factory,
            shared: None,
            fresh_per_example,
        }
    }

    pub fn fresh_per_example(&self) -> bool {
        self.fresh_per_example
    }
}

impl AddressSource for ExternalSequence {
    fn fill(
        &mut self,
        space: &AddressSpace,
        len: usize,
        _rng: &mut StdRng,
    ) -> Result<ComposedSequence> {
        let Self {
            factory,
            shared,
            fresh_per_example,
        } = self;

        let addresses: Vec<u64> = if *fresh_per_example {
            factory().take(len).collect()
        } else {
            let mut addresses: Vec<u64> = match shared.as_mut() {
                Some(iter) => iter.by_ref().take(len).collect(),
                None => Vec::new(),
            };
            // The shared stream may end exactly on an example boundary.
            if addresses.is_empty() {
                addresses = shared.insert(factory()).by_ref().take(len).collect();
            }
            addresses
        };

        if let Some(&addr) = addresses.iter().find(|&&a| !space.validate_address(a)) {
            return Err(out_of_range("external sequence generator", addr, space));
        }

        if addresses.len() < len {
            *shared = None;
            return Err(DatasetError::SequenceExhausted {
                expected: len,
                produced: addresses.len(),
                partial: addresses,
            });
        }

        Ok(ComposedSequence {
            addresses,
            segments: Vec::new(),
        })
    }

    fn is_external(&self) -> bool {
        true
    }
}

/// Builds one fixed-length sequence per example from an address source.
pub struct SequenceComposer {
    source: Box<dyn AddressSource>,
    max_seq_length: usize,
}

impl SequenceComposer {
    pub fn new(source: Box<dyn AddressSource>, max_seq_length: usize) -> Self {
        Self {
            source,
            max_seq_length,
        }
    }

    pub fn max_seq_length(&self) -> usize {
        self.max_seq_length
    }

    pub fn is_external(&self) -> bool {
        self.source.is_external()
    }

    /// Composes the address sequence of one example.
    pub fn compose(&mut self, space: &AddressSpace, rng: &mut StdRng) -> Result<ComposedSequence> {
        let seq = self.source.fill(space, self.max_seq_length, rng)?;
        if seq.addresses.len() != self.max_seq_length {
            return Err(DatasetError::RuntimeGeneration(format!(
                "address source returned {} addresses, expected {}",
                seq.addresses.len(),
                self.max_seq_length
            )));
        }
        Ok(seq)
    }
}
