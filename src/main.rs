use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Ok, Result, bail};
use clap::Parser;
use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;

use hypersort::{
    collective::{gather_vec, gather_word, scatter_vec},
    comm::Comm,
    cond_debug, cond_error, cond_println, cond_warn,
    config::RunConfig,
    fabric::{self, FabricNode},
    gather_info, sort,
};

const DEFAULT_SIZE: usize = 1024;

/// Hypercube bitonic sort of a shuffled permutation over a worker fabric
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct CLIArgs {
    /// Number of sorting processes; must be a power of two
    #[arg(short, long, default_value_t = 4)]
    processes: usize,

    /// Number of elements to sort; must be divisible by the process count
    #[arg(short = 'n', long)]
    size: Option<usize>,

    /// Seed for the input permutation
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Write input row, output row and per-rank times (us) to this CSV
    #[arg(long)]
    result_file: Option<PathBuf>,

    /// Append a `processes,size,ms` row to this CSV
    #[arg(long)]
    timing_file: Option<PathBuf>,
}

struct RunReport {
    input: Vec<u64>,
    output: Vec<u64>,
    rank_micros: Vec<u64>,
}

/// The input array: `0..size` shuffled by a seeded generator, so runs
/// are reproducible and the sorted output is exactly `0..size`.
fn permutation(size: usize, seed: u64) -> Vec<u64> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut values: Vec<u64> = (0..size as u64).collect();
    values.shuffle(&mut rng);
    values
}

fn sort_worker(
    config: RunConfig,
    seed: u64,
    node: FabricNode<u64>,
) -> Result<Option<RunReport>> {
    let comm: &dyn Comm<u64> = &node;
    cond_println!(
        comm.is_root();
        "Sorting {} elements with {} tasks", config.size, config.processes
    );

    let input = if comm.is_root() {
        Some(permutation(config.size, seed))
    } else {
        None
    };
    let mut block = scatter_vec(input.as_deref(), 0, comm)?;
    cond_debug!(comm.is_root(); "each rank holds {} keys", block.len());

    comm.barrier()?;
    let started = Instant::now();
    sort::sort(&mut block, comm)?;
    let gathered = gather_vec(&block, 0, comm)?;
    comm.barrier()?;
    let elapsed = started.elapsed();

    if !sort::is_sorted(&block, comm)? {
        cond_error!(comm.is_root(); "sorted blocks failed the global order check");
        bail!("blocks are not globally sorted after the run");
    }
    gather_info!(
        comm;
        "sorted block spans {:?}..={:?}", block.first(), block.last()
    );
    let micros = gather_word(elapsed.as_micros() as u64, 0, comm)?;

    Ok(input.zip(gathered).zip(micros).map(
        |((input, output), rank_micros)| RunReport {
            input,
            output,
            rank_micros,
        },
    ))
}

fn join_row(values: &[u64]) -> String {
    values
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

fn write_result_file(
    path: &Path,
    config: RunConfig,
    report: &RunReport,
) -> Result<()> {
    let target = if path.is_dir() {
        path.join(format!(
            "res_{}nodes_{}size.csv",
            config.processes, config.size
        ))
    } else {
        path.to_path_buf()
    };
    let mut file = File::create(&target).with_context(|| {
        format!("cannot create result file {}", target.display())
    })?;
    writeln!(file, "{}", join_row(&report.input))?;
    writeln!(file, "{}", join_row(&report.output))?;
    writeln!(file, "{}", join_row(&report.rank_micros))?;
    Ok(())
}

fn append_timing_row(path: &Path, config: RunConfig, millis: f64) -> Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| {
            format!("cannot open timing file {}", path.display())
        })?;
    writeln!(file, "{},{},{:.3}", config.processes, config.size, millis)?;
    Ok(())
}

fn run(args: CLIArgs) -> Result<()> {
    cond_warn!(
        args.size.is_none();
        "no array size given, using default {}", DEFAULT_SIZE
    );
    let size = args.size.unwrap_or(DEFAULT_SIZE);
    let config = RunConfig::new(args.processes, size)?;

    let reports = fabric::spawn(config.processes, |node| {
        sort_worker(config, args.seed, node)
    })?;
    let report = reports
        .into_iter()
        .flatten()
        .next()
        .context("the root worker returned no report")?;

    let expected: Vec<u64> = (0..config.size as u64).collect();
    if report.output != expected {
        bail!("output is not the sorted permutation 0..{}", config.size);
    }

    let slowest = report.rank_micros.iter().copied().max().unwrap_or(0);
    let millis = slowest as f64 / 1_000.0;
    println!(
        "{} tasks, {} size : {:.3} ms",
        config.processes, config.size, millis
    );

    if let Some(path) = &args.result_file {
        write_result_file(path, config, &report)?;
    }
    if let Some(path) = &args.timing_file {
        append_timing_row(path, config, millis)?;
    }
    Ok(())
}

fn main() {
    let _ = env_logger::try_init();
    match CLIArgs::try_parse() {
        Result::Ok(args) => {
            if let Err(err) = run(args) {
                eprintln!("hypersort failed: {err:#}");
                std::process::exit(1);
            }
        }
        Result::Err(err) => {
            let _ = err.print();
            std::process::exit(2);
        }
    }
}
