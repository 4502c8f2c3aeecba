//! Cache Behaviour Dataset CLI.
//!
//! The main executable for the generator. It handles command-line argument
//! parsing, logger setup, dataset construction and the epoch loop.
//!
//! # Usage
//!
//! Examples are written as JSON lines, one object per example, to `--output`
//! or stdout. The configuration banner, warnings and the final statistics go
//! to stderr so they never interleave with the data stream.

use clap::Parser;
use log::{warn, LevelFilter};
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::process;

extern crate cache_dataset;

use cache_dataset::address_space::FULLY_ASSOCIATIVE;
use cache_dataset::config::DatasetConfig;
use cache_dataset::dataset::{CacheDataset, Example};
use cache_dataset::Result;

/// Epoch size used when neither `--epoch-size` nor a config file sets one.
const DEFAULT_EPOCH_SIZE: usize = 1000;

/// Command-line arguments for the dataset generator.
///
/// Every flag overrides the matching key of the TOML file given with
/// `--config`.
#[derive(Parser, Debug)]
#[command(author, version, about = "Synthetic cache behaviour dataset generator")]
struct Args {
    #[arg(short, long)]
    config: Option<String>,

    #[arg(short = 'n', long)]
    epoch_size: Option<usize>,

    #[arg(short = 'l', long)]
    max_seq_length: Option<usize>,

    #[arg(long)]
    ram_volume: Option<u64>,

    #[arg(long)]
    rank: Option<u64>,

    #[arg(long)]
    worker: Option<u64>,

    #[arg(long)]
    seed: Option<u64>,

    #[arg(long)]
    deterministic: bool,

    #[arg(short, long, default_value_t = 1)]
    epochs: u64,

    #[arg(short, long)]
    output: Option<String>,

    /// Skip writing examples; only print statistics.
    #[arg(short, long)]
    quiet: bool,

    #[arg(short, long)]
    verbose: bool,
}

/// One line of output.
#[derive(Serialize)]
struct Record<'a> {
    epoch: u64,
    index: usize,
    #[serde(flatten)]
    example: &'a Example,
}

fn load_config(args: &Args) -> Result<DatasetConfig> {
    let mut config = match &args.config {
        Some(path) => DatasetConfig::from_file(path)?,
        None => DatasetConfig::new(args.epoch_size.unwrap_or(DEFAULT_EPOCH_SIZE)),
    };

    if let Some(n) = args.epoch_size {
        config.epoch_size = n;
    }
    if let Some(len) = args.max_seq_length {
        config.max_seq_length = len;
    }
    if let Some(ram) = args.ram_volume {
        config.ram_volume = ram;
    }
    if let Some(rank) = args.rank {
        config.global_rank = rank;
    }
    if let Some(worker) = args.worker {
        config.worker_id = worker;
    }
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    config.deterministic |= args.deterministic;
    config.verbose |= args.verbose;

    Ok(config)
}

fn print_banner(config: &DatasetConfig) {
    eprintln!("Dataset Configuration");
    eprintln!("---------------------");
    eprintln!("General:");
    eprintln!("  Epoch Size:         {}", config.epoch_size);
    eprintln!("  Sequence Length:    {}", config.max_seq_length);
    eprintln!("  Deterministic:      {}", config.deterministic);
    eprintln!("  Seed:               {}", config.seed);
    eprintln!("  Rank / Worker:      {} / {}", config.global_rank, config.worker_id);
    eprintln!("Address Space:");
    eprintln!(
        "  RAM Volume:         {:#x} ({} MB)",
        config.ram_volume,
        config.ram_volume / 1024 / 1024
    );
    eprintln!("Cache Geometry:");
    eprintln!("  Line Sizes:         {:?}", config.cache_lines);
    eprintln!(
        "  Associativity:      {}",
        config
            .cache_associativity_options
            .iter()
            .map(|&ways| match ways {
                FULLY_ASSOCIATIVE => "full".to_string(),
                ways => ways.to_string(),
            })
            .collect::<Vec<_>>()
            .join(", ")
    );
    eprintln!("  Line Counts:        {:?}", config.cache_line_counts);
    eprintln!("  Replacement:        {:?}", config.replacement_policy);
    eprintln!("Patterns:");
    eprintln!(
        "  Active:             {}",
        config
            .pattern_kinds()
            .iter()
            .map(|k| k.name())
            .collect::<Vec<_>>()
            .join(", ")
    );
    eprintln!("  Switching:          {:?}", config.switch_policy);
    eprintln!("  Short Sequences:    {:?}", config.short_sequence_policy);
    eprintln!("---------------------");
}

fn run(args: Args) -> Result<()> {
    let config = load_config(&args)?;
    print_banner(&config);

    let mut dataset = CacheDataset::new(config)?;

    let mut out: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };

    for _ in 0..args.epochs {
        let epoch = dataset.iter();
        let epoch_index = epoch.epoch();
        for (index, item) in epoch.enumerate() {
            let example = match item {
                Ok(example) => example,
                Err(e) if e.is_per_example() => {
                    warn!("epoch {} example {}: {}", epoch_index, index, e);
                    continue;
                }
                Err(e) => return Err(e),
            };
            if args.quiet {
                continue;
            }
            let record = Record {
                epoch: epoch_index,
                index,
                example: &example,
            };
            serde_json::to_writer(&mut out, &record).map_err(io::Error::from)?;
            writeln!(out)?;
        }
    }
    out.flush()?;

    eprint!("\n{}", dataset.stats().report());
    Ok(())
}

/// Main entry point for the dataset generator.
///
/// # Behavior
///
/// 1. **Configuration**: Parses arguments and loads the optional TOML file.
/// 2. **Logging**: `--verbose` enables debug output; `RUST_LOG` still applies.
/// 3. **Generation**: Runs `--epochs` epochs, writing each example as JSON.
/// 4. **Teardown**: Prints generation statistics; exits non-zero on error.
fn main() {
    let args = Args::parse();

    let level = if args.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    if let Err(e) = run(args) {
        eprintln!("\n[!] FATAL: {}", e);
        process::exit(1);
    }
}
