//! Test module organization.
//!
//! This module organizes all integration tests for the cache dataset generator.


/// Cache simulator and replacement policy tests.
mod cache_tests;




/// Dataset construction, labeling and iteration tests.
mod dataset_tests;
