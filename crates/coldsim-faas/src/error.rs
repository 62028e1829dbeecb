//! Error types.

use thiserror::Error;

/// Invalid simulation configuration or function table.
///
/// These are detected before any event is scheduled, a simulation is never started with an invalid setup.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("capacity must be at least 1")]
    ZeroCapacity,
    #[error("capacity {capacity} exceeds the number of functions {functions}")]
    CapacityExceedsFunctions { capacity: usize, functions: usize },
    #[error("function table is empty")]
    EmptyFunctionTable,
    #[error("simulation horizon must be positive, got {0}")]
    NonPositiveHorizon(f64),
    #[error("cold start rate must be positive, got {0}")]
    NonPositiveColdStartRate(f64),
    #[error("metrics interval must be positive, got {0}")]
    NonPositiveMetricsInterval(f64),
    #[error("function {id} has invalid arrival rate {rate}")]
    InvalidArrivalRate { id: usize, rate: f64 },
    #[error("total arrival rate of all functions is zero")]
    ZeroTotalArrivalRate,
    #[error("function {id} has invalid average service time {time}")]
    InvalidServiceTime { id: usize, time: f64 },
    #[error("expected {expected} values (one per function), got {actual}")]
    FunctionCountMismatch { expected: usize, actual: usize },
}

/// Failure to load a workload trace or a config file.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse trace: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to parse config: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("trace contains no functions")]
    EmptyTrace,
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Invalid scripted request.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RequestError {
    #[error("unknown function {func_id}, there are {functions} functions")]
    UnknownFunction { func_id: usize, functions: usize },
    #[error("request time {time} is before the current simulation time {now}")]
    TimeInPast { time: f64, now: f64 },
}
