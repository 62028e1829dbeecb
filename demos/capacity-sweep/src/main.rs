use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::Parser;
use env_logger::Builder;
use log::info;

use coldsim_faas::config::Config;
use coldsim_faas::function::FunctionTable;
use coldsim_faas::parallel::{run_parallel, sweep_jobs};
use coldsim_faas::report::{write_summaries, write_trials, SummaryMetric};
use coldsim_faas::stats::{summarize_90, CapacitySummary};
use coldsim_faas::trace::load_trace;

#[derive(Parser, Debug)]
#[command(author, version, about = "Sweeps memory capacity of a FaaS platform and estimates cold start ratio and loss rate", long_about = None)]
struct Args {
    /// Path to a function trace in CSV format. Without it a synthetic workload is used.
    #[arg(long)]
    trace: Option<PathBuf>,
    /// Path to a base simulation config in YAML format.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Explicit list of capacities to simulate, overrides the range options.
    #[arg(long, value_delimiter = ',')]
    capacities: Vec<usize>,
    #[arg(long, default_value_t = 1)]
    min: usize,
    /// Largest capacity of the range, defaults to the number of functions.
    #[arg(long)]
    max: Option<usize>,
    #[arg(long, default_value_t = 1)]
    step: usize,
    /// Number of runs per capacity (at least 2), run `t` uses seed `seed + t`.
    #[arg(long, default_value_t = 10)]
    trials: u64,
    #[arg(long, default_value_t = 4)]
    workers: usize,
    /// Directory for the per-capacity trial files and the two summary files.
    #[arg(long, default_value = ".")]
    output: PathBuf,
    /// Number of functions of the synthetic workload.
    #[arg(long, default_value_t = 100)]
    functions: usize,
    /// Aggregate arrival rate of the synthetic workload.
    #[arg(long, default_value_t = 10.)]
    rate: f64,
    /// Average service time of the synthetic workload.
    #[arg(long, default_value_t = 1.)]
    service_time: f64,
}

fn capacities(args: &Args, function_count: usize) -> anyhow::Result<Vec<usize>> {
    if !args.capacities.is_empty() {
        return Ok(args.capacities.clone());
    }
    if args.step == 0 {
        bail!("capacity step must be positive");
    }
    let max = args.max.unwrap_or(function_count);
    if args.min > max {
        bail!("empty capacity range {}..={}", args.min, max);
    }
    Ok((args.min..=max).step_by(args.step).collect())
}

fn create(path: PathBuf) -> anyhow::Result<File> {
    File::create(&path).with_context(|| format!("cannot create {}", path.display()))
}

fn write_summary(dir: &Path, name: &str, summaries: &[CapacitySummary], metric: SummaryMetric) -> anyhow::Result<()> {
    write_summaries(create(dir.join(name))?, summaries, metric)?;
    Ok(())
}

fn main() -> anyhow::Result<()> {
    Builder::from_default_env()
        .format(|buf, record| writeln!(buf, "{}", record.args()))
        .init();
    let args = Args::parse();

    let functions = match &args.trace {
        Some(path) => load_trace(path).with_context(|| format!("cannot load trace {}", path.display()))?,
        None => FunctionTable::uniform(args.functions, args.service_time, args.rate)?,
    };
    info!(
        "workload: {} functions, aggregate arrival rate {:.4}",
        functions.len(),
        functions.total_arrival_rate()
    );
    let base = match &args.config {
        Some(path) => Config::from_yaml(path).with_context(|| format!("cannot load config {}", path.display()))?,
        None => Config::default(),
    };
    if args.trials < 2 {
        bail!("at least 2 trials per capacity are needed for a confidence interval, got {}", args.trials);
    }
    let capacities = capacities(&args, functions.len())?;
    let jobs = sweep_jobs(&base, &capacities, args.trials);
    info!("running {} simulations on {} workers", jobs.len(), args.workers);
    let results = run_parallel(jobs, Arc::new(functions), args.workers)?;

    std::fs::create_dir_all(&args.output)?;
    let mut summaries = Vec::new();
    for &capacity in capacities.iter() {
        let path = args.output.join(format!("trial_results_{}.csv", capacity));
        write_trials(create(path)?, capacity, &results)?;
        match summarize_90(capacity, &results) {
            Some(summary) => {
                summary.print();
                summaries.push(summary);
            }
            None => println!("M capacity: {}\n- fewer than two runs with defined ratios", capacity),
        }
        println!();
    }
    write_summary(&args.output, "cold_start_data.csv", &summaries, SummaryMetric::ColdStartRatio)?;
    write_summary(&args.output, "loss_rate_data.csv", &summaries, SummaryMetric::LossRate)?;
    Ok(())
}
