use clap::{Parser, Subcommand};
use log::{error, info, warn};
use std::error::Error;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use segsieve::pipeline::{PrimeSieve, Shortfall, SieveConfig, Stage, StageHook};
use segsieve::{WorkerPool, base, bound, storage, trial};

#[derive(Parser)]
#[command(name = "segsieve")]
#[command(about = "Find the first N primes with a parallel segmented sieve", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Find the first N prime numbers")]
    Primes {
        #[arg(help = "How many primes to find")]
        count: usize,
        #[arg(
            short,
            long,
            default_value = "3",
            help = "Algorithm variation: 1 trial division, 2 parallel trial division, \
                    3 parallel segmented sieve"
        )]
        variation: u32,
        #[arg(
            short,
            long,
            help = "Number of worker threads (variations 2 and 3, defaults to CPU count)"
        )]
        workers: Option<usize>,
        #[arg(
            short,
            long,
            help = "Save primes in binary format (8 bytes per prime, little-endian)"
        )]
        binary: bool,
        #[arg(short, long, help = "Output file (defaults to the data directory)")]
        output: Option<PathBuf>,
        #[arg(
            long,
            help = "Fail instead of enlarging the bound when it holds too few primes (variation 3)"
        )]
        strict: bool,
    },
    #[command(about = "Show the search bound and base primes used for N primes")]
    Bound {
        #[arg(help = "How many primes to find")]
        count: usize,
    },
    #[command(about = "Check that a saved prime list holds the first primes in order")]
    Verify {
        #[arg(help = "Text file written by the primes command")]
        path: PathBuf,
    },
}

/// Logs each pipeline stage as it completes.
struct StageTimer;

impl StageHook for StageTimer {
    fn stage_finished(&mut self, stage: Stage, attempt: usize, elapsed: Duration) {
        info!(
            "{} finished (attempt {}): {}us ({:.2}ms)",
            stage.name(),
            attempt,
            elapsed.as_micros(),
            elapsed.as_micros() as f64 / 1000.0
        );
    }
}

fn output_file_name(variation: u32, binary: bool) -> &'static str {
    match (variation, binary) {
        (1, false) => "primes_trial.txt",
        (1, true) => "primes_trial.bin",
        (2, false) => "primes_trial_parallel.txt",
        (2, true) => "primes_trial_parallel.bin",
        (_, false) => "primes_sieve.txt",
        (_, true) => "primes_sieve.bin",
    }
}

fn find_primes(
    count: usize,
    variation: u32,
    workers: Option<usize>,
    binary: bool,
    output: Option<PathBuf>,
    strict: bool,
) -> Result<(), Box<dyn Error>> {
    let start = Instant::now();

    // Determine number of workers (default to CPU count)
    let num_workers =
        workers.unwrap_or_else(|| WorkerPool::with_available_parallelism().workers());

    info!("Finding the first {} primes (variation {})...", count, variation);

    let primes = match variation {
        1 => trial::first_n(count)?,
        2 => {
            info!("Using {} worker threads for parallel trial division", num_workers);
            trial::first_n_parallel(count, &WorkerPool::new(num_workers)?)?
        }
        _ => {
            info!("Using {} worker threads for parallel sieving", num_workers);
            let shortfall = if strict {
                Shortfall::Fail
            } else {
                Shortfall::Retry
            };
            let config = SieveConfig::new().workers(num_workers).shortfall(shortfall);
            PrimeSieve::new(config).run(count, &mut StageTimer)?.primes
        }
    };

    let duration = start.elapsed();

    let path = output
        .unwrap_or_else(|| storage::data_dir().join(output_file_name(variation, binary)));
    if binary {
        storage::save_primes_binary(&path, &primes)?;
    } else {
        storage::save_primes(&path, &primes, duration)?;
    }
    info!("Saved all primes to {}", path.display());

    println!("Total: {} primes found", primes.len());
    if let Some(last) = primes.last() {
        println!("Largest: {}", last);
    }

    let duration_us = duration.as_micros();
    println!(
        "Execution time: {}us ({:.2}ms)",
        duration_us,
        duration_us as f64 / 1000.0
    );

    if let Err(e) =
        storage::log_execution(&storage::data_dir(), "primes", count, variation, duration_us)
    {
        warn!("Failed to log execution: {}", e);
    }

    Ok(())
}

fn show_bound(count: usize) -> Result<(), Box<dyn Error>> {
    if count == 0 {
        return Err(segsieve::SieveError::InvalidCount.into());
    }

    let max_n = bound::estimate_max_n(count);
    let base_primes = base::base_primes(max_n);

    println!("Count: {}", count);
    println!("Bound (MAX_N): {}", max_n);
    println!("Base sieve size: {}", base::base_limit(max_n));
    println!("Base primes: {}", base_primes.len());
    if let Some(largest) = base_primes.last() {
        println!("Largest base prime: {}", largest);
    }
    Ok(())
}

/// Variations outside 1..=3 fall back to the sieve.
fn resolve_variation(variation: u32) -> u32 {
    match variation {
        1..=3 => variation,
        other => {
            warn!("Unknown variation {}, using variation 3", other);
            3
        }
    }
}

/// `position` is zero-based; the message counts entries from 1.
fn mismatch_message(position: usize, value: usize) -> String {
    format!("entry {} ({}) is not the next prime", position + 1, value)
}

fn verify(path: PathBuf) -> Result<(), Box<dyn Error>> {
    let primes = storage::load_primes(&path)?;

    match trial::first_mismatch(&primes) {
        None => {
            println!("OK: {} primes, the first {} in order", primes.len(), primes.len());
            Ok(())
        }
        Some(position) => Err(mismatch_message(position, primes[position]).into()),
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let outcome = match cli.command {
        Commands::Primes {
            count,
            variation,
            workers,
            binary,
            output,
            strict,
        } => find_primes(
            count,
            resolve_variation(variation),
            workers,
            binary,
            output,
            strict,
        ),
        Commands::Bound { count } => show_bound(count),
        Commands::Verify { path } => verify(path),
    };

    if let Err(e) = outcome {
        error!("{}", e);
        std::process::exit(1);
    }
}
