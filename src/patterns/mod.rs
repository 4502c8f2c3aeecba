//! Memory Access Patterns.
//!
//! Generators that synthesize address streams resembling common program
//! behaviours. Each variant owns a private RNG and cursor; `reset` reseeds
//! both so an example can be reproduced exactly from its seed.
//!
//! # Patterns
//!
//! - `Sequential`: Unit-step walk with random jumps.
//! - `Stride`: Constant-stride array traversal.
//! - `Random`: Uniform random access.
//! - `Loop`: Cyclic traversal of a small range.
//! - `Stack`: Push/pop walk around a stack pointer.
//! - `Heap`: Bump allocation with reuse.
//! - `PointerChase`: Linked traversal of a scattered working set.

/// Heap allocation pattern.
pub mod heap;

/// Cyclic loop pattern.
pub mod looping;

/// Pointer-chasing pattern.
pub mod pointer_chase;

/// Uniform random pattern.
pub mod random;

/// Sequential pattern with jumps.
pub mod sequential;

/// Stack push/pop pattern.
pub mod stack;

/// Fixed-stride pattern.
pub mod stride;

pub use heap::HeapPattern;
pub use looping::LoopPattern;
pub use pointer_chase::PointerChasePattern;
pub use random::RandomPattern;
pub use sequential::SequentialPattern;
pub use stack::StackPattern;
pub use stride::StridePattern;

use crate::address_space::AddressSpace;
use crate::config::PatternKind;
use serde::Serialize;

/// Descriptive parameters of a pattern instance, recorded per example.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PatternMetadata {
    pub kind: PatternKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stride: Option<u64>,
    /// Size of the region the pattern stays inside (loop length, heap size,
    /// working-set node count).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub span: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jump_probability: Option<f64>,
}

impl PatternMetadata {
    pub fn new(kind: PatternKind) -> Self {
        Self {
            kind,
            stride: None,
            span: None,
            jump_probability: None,
        }
    }

    pub fn with_stride(mut self, stride: u64) -> Self {
        self.stride = Some(stride);
        self
    }

    pub fn with_span(mut self, span: u64) -> Self {
        self.span = Some(span);
        self
    }

    pub fn with_jump_probability(mut self, p: f64) -> Self {
        self.jump_probability = Some(p);
        self
    }
}

/// Capability every access pattern provides.
///
/// The composer only ever talks to patterns through this trait.
pub trait AccessPattern {
    /// Reinitializes parameters and cursor deterministically from `seed`.
    fn reset(&mut self, seed: u64, space: &AddressSpace);

    /// Produces the next address and advances the cursor.
    ///
    /// Must return a value in `[0, space.ram_volume())`.
    fn next_address(&mut self, space: &AddressSpace) -> u64;

    /// Describes the current parameters.
    fn describe(&self) -> PatternMetadata;
}

/// Closed set of pattern variants.
pub enum Pattern {
    Sequential(SequentialPattern),
    Stride(StridePattern),
    Random(RandomPattern),
    Loop(LoopPattern),
    Stack(StackPattern),
    Heap(HeapPattern),
    PointerChase(PointerChasePattern),
}

impl Pattern {
    /// Instantiates a pattern of the given kind with unseeded state.
    pub fn new(kind: PatternKind) -> Self {
        match kind {
            PatternKind::Sequential => Pattern::Sequential(SequentialPattern::new()),
            PatternKind::Stride => Pattern::Stride(StridePattern::new()),
            PatternKind::Random => Pattern::Random(RandomPattern::new()),
            PatternKind::Loop => Pattern::Loop(LoopPattern::new()),
            PatternKind::Stack => Pattern::Stack(StackPattern::new()),
            PatternKind::Heap => Pattern::Heap(HeapPattern::new()),
            PatternKind::PointerChase => Pattern::PointerChase(PointerChasePattern::new()),
        }
    }

    pub fn kind(&self) -> PatternKind {
        match self {
            Pattern::Sequential(_) => PatternKind::Sequential,
            Pattern::Stride(_) => PatternKind::Stride,
            Pattern::Random(_) => PatternKind::Random,
            Pattern::Loop(_) => PatternKind::Loop,
            Pattern::Stack(_) => PatternKind::Stack,
            Pattern::Heap(_) => PatternKind::Heap,
            Pattern::PointerChase(_) => PatternKind::PointerChase,
        }
    }

    fn inner(&mut self) -> &mut dyn AccessPattern {
        match self {
            Pattern::Sequential(p) => p,
            Pattern::Stride(p) => p,
            Pattern::Random(p) => p,
            Pattern::Loop(p) => p,
            Pattern::Stack(p) => p,
            Pattern::Heap(p) => p,
            Pattern::PointerChase(p) => p,
        }
    }
}

impl AccessPattern for Pattern {
    fn reset(&mut self, seed: u64, space: &AddressSpace) {
        self.inner().reset(seed, space);
    }

    fn next_address(&mut self, space: &AddressSpace) -> u64 {
        self.inner().next_address(space)
    }

    fn describe(&self) -> PatternMetadata {
        match self {
            Pattern::Sequential(p) => p.describe(),
            Pattern::Stride(p) => p.describe(),
            Pattern::Random(p) => p.describe(),
            Pattern::Loop(p) => p.describe(),
            Pattern::Stack(p) => p.describe(),
            Pattern::Heap(p) => p.describe(),
            Pattern::PointerChase(p) => p.describe(),
        }
    }
}

impl From<PatternKind> for Pattern {
    fn from(kind: PatternKind) -> Self {
        Pattern::new(kind)
    }
}
