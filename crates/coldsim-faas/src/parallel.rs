//! Utilities for running multiple experiments in parallel.

use std::sync::{mpsc::channel, Arc};

use itertools::izip;
use threadpool::ThreadPool;

use crate::config::Config;
use crate::error::ConfigError;
use crate::function::FunctionTable;
use crate::simulation::{CapacitySimulation, RunResult};

/// Builds the `(capacity, trial)` grid, trial `t` uses seed `base.seed + t`.
pub fn sweep_jobs(base: &Config, capacities: &[usize], trials: u64) -> Vec<Config> {
    let mut jobs = Vec::with_capacity(capacities.len() * trials as usize);
    for &capacity in capacities {
        for trial in 0..trials {
            jobs.push(base.with_run(capacity, base.seed + trial));
        }
    }
    jobs
}

/// Runs simulations in a thread pool with `n_workers` worker threads, returns results in job order.
///
/// All configs are validated before anything runs, so an invalid job fails the whole batch.
pub fn run_parallel(
    mut jobs: Vec<Config>,
    functions: Arc<FunctionTable>,
    n_workers: usize,
) -> Result<Vec<RunResult>, ConfigError> {
    for job in jobs.iter() {
        job.validate(functions.len())?;
    }
    let pool = ThreadPool::new(n_workers.max(1));
    let (tx, rx) = channel();
    let len = jobs.len();
    for (id, config) in izip!(0..len, jobs.drain(..)) {
        let tx = tx.clone();
        let functions = functions.clone();
        pool.execute(move || {
            let result = CapacitySimulation::new(config, functions.as_ref()).map(|mut sim| sim.run());
            tx.send((id, result)).unwrap();
        });
    }
    drop(tx);
    let mut results: Vec<_> = rx.iter().take(len).collect();
    assert_eq!(results.len(), len, "some simulation workers panicked");
    results.sort_by_key(|x| x.0);
    results.drain(..).map(|x| x.1).collect()
}
