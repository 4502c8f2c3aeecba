//! Deterministic Seed Derivation.
//!
//! Every stateful call receives its seed explicitly. Seeds are derived by
//! folding identifiers through the SplitMix64 finalizer, so neighbouring
//! ranks, workers, epochs and examples land far apart in seed space.

const GOLDEN_GAMMA: u64 = 0x9E37_79B9_7F4A_7C15;

/// Domain tags keep the fold order unambiguous: (rank=1, epoch=2) must not
/// collide with (rank=2, epoch=1).
const TAG_RANK: u64 = 0x5241_4E4B;
const TAG_WORKER: u64 = 0x574F_524B;
const TAG_EPOCH: u64 = 0x4550_4F43;
const TAG_EXAMPLE: u64 = 0x4558_4D50;

/// SplitMix64 output function.
pub fn mix(mut z: u64) -> u64 {
    z = z.wrapping_add(GOLDEN_GAMMA);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

fn fold(state: u64, tag: u64, value: u64) -> u64 {
    mix(state ^ mix(tag ^ value.wrapping_mul(GOLDEN_GAMMA)))
}

/// Seed shared by every example of one epoch on one rank/worker.
pub fn epoch_seed(base: u64, global_rank: u64, worker_id: u64, epoch: u64) -> u64 {
    let s = fold(base, TAG_RANK, global_rank);
    let s = fold(s, TAG_WORKER, worker_id);
    fold(s, TAG_EPOCH, epoch)
}

/// Seed for a single example within an epoch.
pub fn example_seed(epoch_seed: u64, index: u64) -> u64 {
    fold(epoch_seed, TAG_EXAMPLE, index)
}
