//! Integration tests for dataset construction, labeling and iteration.

use cache_dataset::address_space::FULLY_ASSOCIATIVE;
use cache_dataset::cache::CacheSim;
use cache_dataset::config::{
    DatasetConfig, PatternKind, ReplacementPolicy, ShortSequencePolicy, SwitchPolicy,
};
use cache_dataset::patterns::Pattern;
use cache_dataset::{CacheDataset, DatasetError, Example, Label};

/// Creates a small deterministic configuration.
fn create_test_config() -> DatasetConfig {
    let mut config = DatasetConfig::new(8);
    config.ram_volume = 1 << 16;
    config.max_seq_length = 24;
    config.cache_lines = vec![32, 64];
    config.cache_associativity_options = vec![1, 2, 4];
    config.cache_line_counts = vec![4, 16];
    config.deterministic = true;
    config.seed = 7;
    config
}

fn collect_epoch(dataset: &mut CacheDataset) -> Vec<Example> {
    dataset.iter().map(|item| item.unwrap()).collect()
}

fn is_config_error<T>(result: Result<T, DatasetError>) -> bool {
    matches!(result, Err(DatasetError::Configuration(_)))
}

/// Tests that invalid parameters fail at construction.
#[test]
fn test_construction_validation() {
    assert!(is_config_error(CacheDataset::new(DatasetConfig::new(0))));

    let mut config = create_test_config();
    config.max_seq_length = 0;
    assert!(is_config_error(CacheDataset::new(config)));

    let mut config = create_test_config();
    config.cache_lines.clear();
    assert!(is_config_error(CacheDataset::new(config)));

    let mut config = create_test_config();
    config.ram_volume = 1000;
    assert!(is_config_error(CacheDataset::new(config)));

    let mut config = create_test_config();
    config.patterns = Some(Vec::new());
    assert!(is_config_error(CacheDataset::new(config)));

    assert!(is_config_error(CacheDataset::with_patterns(
        create_test_config(),
        Vec::new()
    )));

    let mut config = create_test_config();
    config.switch_policy = SwitchPolicy::Every(0);
    assert!(is_config_error(CacheDataset::new(config)));
}

/// Tests that the external generator is still subject to validation.
#[test]
fn test_external_construction_validation() {
    let result = CacheDataset::with_sequences_generator(DatasetConfig::new(0), || 0..10u64);
    assert!(is_config_error(result));
}

/// Tests the accessors of a freshly built dataset.
#[test]
fn test_dataset_creation() {
    let dataset = CacheDataset::new(create_test_config()).unwrap();
    assert_eq!(dataset.epoch_size(), 8);
    assert_eq!(dataset.epochs_started(), 0);
    assert!(!dataset.is_external());
    assert_eq!(dataset.address_space().ram_volume(), 1 << 16);
    assert_eq!(dataset.config().seed, 7);
    assert_eq!(dataset.stats().examples, 0);
}

/// Tests that an epoch yields exactly `epoch_size` items and then stops.
#[test]
fn test_epoch_length() {
    let mut dataset = CacheDataset::new(create_test_config()).unwrap();
    let mut epoch = dataset.iter();
    assert_eq!(epoch.epoch(), 0);
    assert_eq!(epoch.len(), 8);

    for remaining in (0..8).rev() {
        assert!(epoch.next().is_some());
        assert_eq!(epoch.len(), remaining);
    }
    assert!(epoch.next().is_none());
    assert!(epoch.next().is_none());
}

/// Tests that each traversal starts a new epoch.
#[test]
fn test_epochs_restart() {
    let mut dataset = CacheDataset::new(create_test_config()).unwrap();
    assert_eq!(dataset.iter().count(), 8);
    assert_eq!(dataset.iter().epoch(), 1);
    assert_eq!(dataset.iter().count(), 8);
    assert_eq!(dataset.epochs_started(), 3);

    let mut seen = 0;
    for item in &mut dataset {
        item.unwrap();
        seen += 1;
    }
    assert_eq!(seen, 8);
    assert_eq!(dataset.epochs_started(), 4);
}

/// Tests the shape and value ranges of every channel.
#[test]
fn test_example_channels() {
    let mut dataset = CacheDataset::new(create_test_config()).unwrap();
    let ram = dataset.address_space().ram_volume() as i64;

    for example in collect_epoch(&mut dataset) {
        assert_eq!(example.len(), 24);
        assert_eq!(example.line_indices.len(), 24);
        assert_eq!(example.labels.len(), 24);
        assert_eq!(example.valid_len, 24);
        assert!(!example.is_short());
        assert!(!example.is_empty());

        let g = example.geometry;
        assert!([32, 64].contains(&g.line_size));
        assert!([1, 2, 4].contains(&g.associativity));
        assert_eq!(
            example.context(),
            [g.line_size as i64, g.associativity as i64, g.num_lines as i64]
        );

        for i in 0..example.len() {
            let addr = example.addresses[i];
            assert!((0..ram).contains(&addr));
            assert_eq!(example.line_indices[i], addr / g.line_size as i64);
            assert!(example.labels[i] == 0 || example.labels[i] == 1);
        }
        assert!(!example.segments.is_empty());
    }
}

/// Tests that stored line and set indices round-trip from the address.
#[test]
fn test_index_round_trip() {
    let mut dataset = CacheDataset::new(create_test_config()).unwrap();
    let examples = collect_epoch(&mut dataset);
    let space = dataset.address_space();

    for example in examples {
        let sets = example.set_indices();
        for (i, &addr) in example.addresses.iter().enumerate() {
            let addr = addr as u64;
            assert_eq!(
                example.line_indices[i] as u64,
                space.line_index(addr, example.geometry.line_size)
            );
            assert_eq!(sets[i] as u64, space.set_index(addr, &example.geometry));
        }
    }
}

/// Tests that labels match a replay through the cache simulator.
#[test]
fn test_labels_match_replay() {
    let mut dataset = CacheDataset::new(create_test_config()).unwrap();

    for example in collect_epoch(&mut dataset) {
        let mut cache = CacheSim::new(example.geometry, ReplacementPolicy::Lru);
        let replayed: Vec<i32> = example
            .addresses
            .iter()
            .map(|&a| Label::from(cache.access(a as u64)).code())
            .collect();
        assert_eq!(replayed, example.labels);

        // A cold cache always misses first.
        assert_eq!(example.labels[0], 0);
    }
}

/// Tests that FIFO labels are produced when configured.
#[test]
fn test_fifo_labels() {
    let mut config = create_test_config();
    config.replacement_policy = ReplacementPolicy::Fifo;
    let mut dataset = CacheDataset::new(config).unwrap();

    for example in collect_epoch(&mut dataset) {
        let mut cache = CacheSim::new(example.geometry, ReplacementPolicy::Fifo);
        for (i, &addr) in example.addresses.iter().enumerate() {
            assert_eq!(cache.access(addr as u64), example.labels[i] == 1);
        }
    }
}

/// Tests fully associative examples drawn from a mixed option set.
#[test]
fn test_fully_associative_examples() {
    let mut config = create_test_config();
    config.epoch_size = 64;
    config.cache_associativity_options = vec![FULLY_ASSOCIATIVE, 1, 2];
    let mut dataset = CacheDataset::new(config).unwrap();

    let examples = collect_epoch(&mut dataset);
    let full: Vec<&Example> = examples
        .iter()
        .filter(|e| e.geometry.is_fully_associative())
        .collect();
    assert!(!full.is_empty());

    for example in full {
        let g = example.geometry;
        assert_eq!(g.associativity, g.num_lines);
        assert!(example.set_indices().iter().all(|&s| s == 0));

        let mut cache = CacheSim::new(g, ReplacementPolicy::Lru);
        for (i, &addr) in example.addresses.iter().enumerate() {
            assert_eq!(cache.access(addr as u64), example.labels[i] == 1);
        }
    }

    let mut config = create_test_config();
    config.cache_associativity_options = vec![FULLY_ASSOCIATIVE];
    let mut dataset = CacheDataset::new(config).unwrap();
    for example in collect_epoch(&mut dataset) {
        assert_eq!(example.geometry.num_sets(), 1);
        assert_eq!(example.context()[1], example.context()[2]);
    }
}

/// Tests that `generate_data` reproduces the example at that position.
#[test]
fn test_generate_data_matches_iteration() {
    let mut dataset = CacheDataset::new(create_test_config()).unwrap();
    let first = collect_epoch(&mut dataset);
    let second = collect_epoch(&mut dataset);

    assert_eq!(dataset.generate_data(0, 3).unwrap(), first[3]);
    assert_eq!(dataset.generate_data(1, 5).unwrap(), second[5]);
    assert_ne!(first, second);
}

/// Tests that non-deterministic datasets draw fresh data.
#[test]
fn test_nondeterministic_differs() {
    let mut config = create_test_config();
    config.deterministic = false;
    config.ram_volume = 1 << 31;

    let mut a = CacheDataset::new(config.clone()).unwrap();
    let mut b = CacheDataset::new(config).unwrap();
    assert_ne!(collect_epoch(&mut a), collect_epoch(&mut b));
}

/// Tests datasets over caller-built patterns.
#[test]
fn test_with_patterns() {
    let patterns = vec![Pattern::new(PatternKind::Stride), Pattern::new(PatternKind::Loop)];
    let mut dataset = CacheDataset::with_patterns(create_test_config(), patterns).unwrap();

    for example in collect_epoch(&mut dataset) {
        for segment in &example.segments {
            assert!(matches!(
                segment.kind,
                PatternKind::Stride | PatternKind::Loop
            ));
        }
    }
}

/// Tests that the external generator bypasses internal patterns.
#[test]
fn test_external_generator_bypass() {
    let mut config = create_test_config();
    config.max_seq_length = 6;
    let mut dataset =
        CacheDataset::with_sequences_generator(config, || vec![0u64, 64, 128, 0, 64, 4096])
            .unwrap();
    assert!(dataset.is_external());

    for example in collect_epoch(&mut dataset) {
        assert_eq!(example.addresses, vec![0, 64, 128, 0, 64, 4096]);
        assert!(example.segments.is_empty());
        assert_eq!(example.labels[0], 0);
    }
}

/// Tests that a short external sequence is padded and flagged.
#[test]
fn test_short_sequence_padded() {
    let mut config = create_test_config();
    config.max_seq_length = 5;
    let mut dataset =
        CacheDataset::with_sequences_generator(config, || vec![100u64, 200, 100]).unwrap();

    let examples = collect_epoch(&mut dataset);
    assert_eq!(examples.len(), 8);
    for example in examples {
        assert_eq!(example.len(), 5);
        assert_eq!(example.valid_len, 3);
        assert!(example.is_short());
        assert_eq!(example.addresses, vec![100, 200, 100, -1, -1]);
        assert_eq!(&example.line_indices[3..], &[-1, -1]);
        assert_eq!(&example.labels[3..], &[-1, -1]);
        assert_eq!(&example.set_indices()[3..], &[-1, -1]);
        assert_eq!(example.label_values()[4], Label::Padding);
        assert_eq!(example.labels[2], 1);
    }
    assert_eq!(dataset.stats().short_examples, 8);
    assert_eq!(dataset.stats().failed_examples, 0);
}

/// Tests a shared external generator that ends exactly on example boundaries.
#[test]
fn test_external_shared_never_padded() {
    let mut config = create_test_config();
    config.deterministic = false;
    config.epoch_size = 6;
    config.max_seq_length = 4;
    let mut dataset =
        CacheDataset::with_sequences_generator(config, || vec![64u64, 128, 192, 256]).unwrap();

    let examples = collect_epoch(&mut dataset);
    assert_eq!(examples.len(), 6);
    for example in examples {
        assert_eq!(example.valid_len, 4);
        assert!(!example.is_short());
        assert_eq!(example.addresses, vec![64, 128, 192, 256]);
    }
    assert_eq!(dataset.stats().short_examples, 0);
    assert_eq!(dataset.stats().failed_examples, 0);
}

/// Tests that a short external sequence is rejected when configured.
#[test]
fn test_short_sequence_rejected() {
    let mut config = create_test_config();
    config.max_seq_length = 5;
    config.short_sequence_policy = ShortSequencePolicy::Reject;
    let mut dataset = CacheDataset::with_sequences_generator(config, || vec![1u64, 2]).unwrap();

    let items: Vec<_> = dataset.iter().collect();
    assert_eq!(items.len(), 8);
    for item in items {
        assert!(matches!(
            item,
            Err(DatasetError::SequenceExhausted {
                expected: 5,
                produced: 2,
                ..
            })
        ));
    }
    assert_eq!(dataset.stats().failed_examples, 8);
    assert_eq!(dataset.stats().examples, 0);
}

/// Tests that an out-of-range external address fails only its example.
#[test]
fn test_external_out_of_range() {
    let mut config = create_test_config();
    config.max_seq_length = 2;
    let ram = config.ram_volume;
    let mut dataset = CacheDataset::with_sequences_generator(config, move || vec![0, ram]).unwrap();

    let items: Vec<_> = dataset.iter().collect();
    assert_eq!(items.len(), 8);
    assert!(items
        .iter()
        .all(|item| matches!(item, Err(DatasetError::RuntimeGeneration(_)))));
}

/// Tests the statistics gathered while generating.
#[test]
fn test_generation_stats() {
    let mut dataset = CacheDataset::new(create_test_config()).unwrap();
    collect_epoch(&mut dataset);
    collect_epoch(&mut dataset);

    let stats = dataset.stats();
    assert_eq!(stats.epochs, 2);
    assert_eq!(stats.examples, 16);
    assert_eq!(stats.addresses, 16 * 24);
    assert_eq!(stats.hits + stats.misses, stats.addresses);
    assert!((0.0..=1.0).contains(&stats.hit_rate()));
    assert!(stats.pattern_segments.values().sum::<u64>() >= 16);

    let report = stats.report();
    assert!(report.contains("examples                 16"));
    assert!(report.contains("PATTERN MIX"));
}

/// Tests splitting an example into its channels.
#[test]
fn test_into_tensors() {
    let mut dataset = CacheDataset::new(create_test_config()).unwrap();
    let example = dataset.generate_data(0, 0).unwrap();
    let expected = example.clone();

    let (addresses, lines, labels) = example.into_tensors();
    assert_eq!(addresses, expected.addresses);
    assert_eq!(lines, expected.line_indices);
    assert_eq!(labels, expected.labels);
}
