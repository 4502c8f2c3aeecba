//! Integration tests for the cache simulator.

use cache_dataset::address_space::CacheGeometry;
use cache_dataset::cache::policies::{FifoPolicy, LruPolicy, ReplacementPolicy as _};
use cache_dataset::cache::CacheSim;
use cache_dataset::config::ReplacementPolicy;

/// Creates a 4-set, 2-way cache geometry with 64-byte lines.
fn create_test_geometry() -> CacheGeometry {
    CacheGeometry {
        line_size: 64,
        associativity: 2,
        num_lines: 8,
    }
}

/// One set, two ways.
fn fully_associative() -> CacheGeometry {
    CacheGeometry {
        line_size: 64,
        associativity: 2,
        num_lines: 2,
    }
}

/// Tests cache creation and initialization.
#[test]
fn test_cache_creation() {
    let cache = CacheSim::new(create_test_geometry(), ReplacementPolicy::Lru);
    assert_eq!(cache.geometry(), &create_test_geometry());
    assert_eq!(cache.hits, 0);
    assert_eq!(cache.misses, 0);
}

/// Tests cache line presence checking.
#[test]
fn test_cache_contains() {
    let mut cache = CacheSim::new(create_test_geometry(), ReplacementPolicy::Lru);
    assert!(!cache.contains(0x100));

    cache.access(0x100);
    assert!(cache.contains(0x100));
    assert!(cache.contains(0x13f));
    assert!(!cache.contains(0x140));
}

/// Tests cache hit behavior after initial miss.
#[test]
fn test_cache_access_hit() {
    let mut cache = CacheSim::new(create_test_geometry(), ReplacementPolicy::Lru);

    assert!(!cache.access(0x100));
    assert!(cache.access(0x100));
    assert!(cache.access(0x104));
    assert_eq!(cache.hits, 2);
    assert_eq!(cache.misses, 1);
}

/// Tests that lines mapping to different sets do not interfere.
#[test]
fn test_cache_distinct_sets() {
    let mut cache = CacheSim::new(create_test_geometry(), ReplacementPolicy::Lru);
    for line in 0..8u64 {
        assert!(!cache.access(line * 64));
    }
    for line in 0..8u64 {
        assert!(cache.access(line * 64));
    }
}

/// Tests conflict misses in a direct-mapped cache.
#[test]
fn test_direct_mapped_conflict() {
    let geometry = CacheGeometry {
        line_size: 64,
        associativity: 1,
        num_lines: 4,
    };
    let mut cache = CacheSim::new(geometry, ReplacementPolicy::Lru);

    // Lines 0 and 4 share set 0.
    for _ in 0..4 {
        assert!(!cache.access(0));
        assert!(!cache.access(256));
    }
    assert_eq!(cache.hits, 0);
}

/// Tests LRU replacement evicts the least recently used line.
#[test]
fn test_lru_eviction_order() {
    let mut cache = CacheSim::new(fully_associative(), ReplacementPolicy::Lru);
    let (a, b, c) = (0, 64, 128);

    assert!(!cache.access(a));
    assert!(!cache.access(b));
    assert!(cache.access(a));
    assert!(!cache.access(c));

    assert!(cache.contains(a));
    assert!(!cache.contains(b));
    assert!(cache.access(a));
    assert!(!cache.access(b));
}

/// Tests FIFO replacement ignores hits when choosing a victim.
#[test]
fn test_fifo_eviction_order() {
    let mut cache = CacheSim::new(fully_associative(), ReplacementPolicy::Fifo);
    let (a, b, c) = (0, 64, 128);

    assert!(!cache.access(a));
    assert!(!cache.access(b));
    assert!(cache.access(a));
    assert!(!cache.access(c));

    assert!(!cache.contains(a));
    assert!(cache.contains(b));
    assert!(cache.contains(c));
}

/// Tests cache reset clears lines and counters.
#[test]
fn test_cache_reset() {
    let mut cache = CacheSim::new(create_test_geometry(), ReplacementPolicy::Fifo);
    cache.access(0x0);
    cache.access(0x0);
    cache.reset();

    assert!(!cache.contains(0x0));
    assert_eq!(cache.hits, 0);
    assert_eq!(cache.misses, 0);
    assert!(!cache.access(0x0));
}

/// Tests the LRU policy directly.
#[test]
fn test_lru_policy() {
    let mut lru = LruPolicy::new(2, 4);
    for way in [3, 2, 1, 0] {
        lru.install(0, way);
    }
    assert_eq!(lru.get_victim(0), 3);

    lru.update(0, 3);
    assert_eq!(lru.get_victim(0), 2);

    // Other sets are untouched.
    assert_eq!(lru.get_victim(1), 3);
}

/// Tests the FIFO policy directly.
#[test]
fn test_fifo_policy() {
    let mut fifo = FifoPolicy::new(1, 2);
    fifo.install(0, 0);
    fifo.install(0, 1);
    fifo.update(0, 0);
    assert_eq!(fifo.get_victim(0), 0);

    fifo.install(0, 0);
    assert_eq!(fifo.get_victim(0), 1);

    fifo.reset();
    assert_eq!(fifo.get_victim(0), 0);
}
