//! Generation statistics collection and reporting.
//!
//! Tracks example counts, label balance, short or failed examples and pattern
//! usage across every epoch a dataset has produced.

use crate::config::PatternKind;
use crate::dataset::Example;
use std::collections::BTreeMap;
use std::fmt::{self, Write};
use std::time::Instant;

/// Running totals for one dataset instance.
pub struct GenerationStats {
    start_time: Instant,
    pub epochs: u64,
    pub examples: u64,
    pub short_examples: u64,
    pub failed_examples: u64,

    /// Real (non-padding) addresses emitted.
    pub addresses: u64,
    pub hits: u64,
    pub misses: u64,

    /// Pattern segments started, by kind.
    pub pattern_segments: BTreeMap<PatternKind, u64>,
}

impl Default for GenerationStats {
    fn default() -> Self {
        Self {
            start_time: Instant::now(),
            epochs: 0,
            examples: 0,
            short_examples: 0,
            failed_examples: 0,
            addresses: 0,
            hits: 0,
            misses: 0,
            pattern_segments: BTreeMap::new(),
        }
    }
}

impl GenerationStats {
    /// Folds one emitted example into the totals.
    pub fn record(&mut self, example: &Example) {
        self.examples += 1;
        if example.is_short() {
            self.short_examples += 1;
        }
        self.addresses += example.valid_len as u64;
        for &label in &example.labels {
            match label {
                1 => self.hits += 1,
                0 => self.misses += 1,
                _ => {}
            }
        }
        for segment in &example.segments {
            *self.pattern_segments.entry(segment.kind).or_insert(0) += 1;
        }
    }

    /// Fraction of real accesses that hit, or 0 when nothing was generated.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    /// Formats a summary of all generation statistics.
    pub fn report(&self) -> String {
        let seconds = self.start_time.elapsed().as_secs_f64();
        let rate = if seconds > 0.0 {
            self.examples as f64 / seconds
        } else {
            0.0
        };

        let mut out = String::new();
        let _ = self.write_report(&mut out, seconds, rate);
        out
    }

    fn write_report(&self, out: &mut String, seconds: f64, rate: f64) -> fmt::Result {
        writeln!(out, "==========================================================")?;
        writeln!(out, "CACHE DATASET GENERATION STATISTICS")?;
        writeln!(out, "==========================================================")?;
        writeln!(out, "host_seconds             {:.4} s", seconds)?;
        writeln!(out, "epochs                   {}", self.epochs)?;
        writeln!(out, "examples                 {}", self.examples)?;
        writeln!(out, "examples_per_sec         {:.2}", rate)?;
        writeln!(out, "examples.short           {}", self.short_examples)?;
        writeln!(out, "examples.failed          {}", self.failed_examples)?;
        writeln!(out, "----------------------------------------------------------")?;
        writeln!(out, "LABELS")?;
        writeln!(out, "  accesses               {}", self.addresses)?;
        writeln!(out, "  hits                   {}", self.hits)?;
        writeln!(out, "  misses                 {}", self.misses)?;
        writeln!(out, "  hit_rate               {:.2}%", self.hit_rate() * 100.0)?;
        writeln!(out, "----------------------------------------------------------")?;
        writeln!(out, "PATTERN MIX")?;
        let segments: u64 = self.pattern_segments.values().sum();
        let denom = segments.max(1) as f64;
        for (kind, count) in &self.pattern_segments {
            writeln!(
                out,
                "  {:<22} {} ({:.2}%)",
                kind.name(),
                count,
                (*count as f64 / denom) * 100.0
            )?;
        }
        writeln!(out, "==========================================================")
    }

    /// Prints the summary to stdout.
    pub fn print(&self) {
        print!("\n{}", self.report());
    }
}
