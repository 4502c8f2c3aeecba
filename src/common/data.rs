//! Output Label Types.
//!
//! This module defines the ground-truth signal attached to every address in
//! an example. Labels are produced by replaying the address sequence through
//! a simulated cache and recording whether each access hit.

use serde::Serialize;

/// Value written into every channel at padded positions.
pub const PAD_VALUE: i64 = -1;

/// Ground-truth outcome of a single memory access.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Label {
    /// The line was already resident in the simulated cache.
    Hit,

    /// The line had to be installed (compulsory, capacity, or conflict miss).
    Miss,

    /// Position beyond the end of a short sequence.
    ///
    /// Carries no access and must be masked out by the consumer.
    Padding,
}

impl Label {
    /// Returns the numeric encoding used in the label channel.
    pub fn code(self) -> i32 {
        match self {
            Label::Hit => 1,
            Label::Miss => 0,
            Label::Padding => -1,
        }
    }

    /// Decodes a label channel value.
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            1 => Some(Label::Hit),
            0 => Some(Label::Miss),
            -1 => Some(Label::Padding),
            _ => None,
        }
    }
}

impl From<bool> for Label {
    fn from(hit: bool) -> Self {
        if hit {
            Label::Hit
        } else {
            Label::Miss
        }
    }
}
