//! Function table derived from the workload trace.

use std::ops::Index;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Per-function input record: what the trace loader produces for every function.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FunctionSpec {
    /// Average service time in seconds.
    pub avg_service_time: f64,
    /// Average arrival rate in requests per second.
    pub arrival_rate: f64,
}

impl FunctionSpec {
    pub fn new(avg_service_time: f64, arrival_rate: f64) -> Self {
        Self {
            avg_service_time,
            arrival_rate,
        }
    }
}

/// Immutable function attributes.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct Function {
    pub id: usize,
    pub avg_service_time: f64,
    pub arrival_rate: f64,
    /// Probability that an arrival of the aggregate stream targets this function.
    pub arrival_weight: f64,
}

/// Read-only table of all functions, indexed by function id `0..len()`.
#[derive(Clone, Debug)]
pub struct FunctionTable {
    functions: Vec<Function>,
    total_arrival_rate: f64,
}

impl FunctionTable {
    /// Builds the table, deriving arrival weights `rate_i / sum(rate)`.
    pub fn new(specs: Vec<FunctionSpec>) -> Result<Self, ConfigError> {
        if specs.is_empty() {
            return Err(ConfigError::EmptyFunctionTable);
        }
        let mut total_arrival_rate = 0.;
        for (id, spec) in specs.iter().enumerate() {
            if !spec.arrival_rate.is_finite() || spec.arrival_rate < 0. {
                return Err(ConfigError::InvalidArrivalRate {
                    id,
                    rate: spec.arrival_rate,
                });
            }
            if !spec.avg_service_time.is_finite() || spec.avg_service_time < 0. {
                return Err(ConfigError::InvalidServiceTime {
                    id,
                    time: spec.avg_service_time,
                });
            }
            total_arrival_rate += spec.arrival_rate;
        }
        if total_arrival_rate <= 0. {
            return Err(ConfigError::ZeroTotalArrivalRate);
        }
        let functions = specs
            .iter()
            .enumerate()
            .map(|(id, spec)| Function {
                id,
                avg_service_time: spec.avg_service_time,
                arrival_rate: spec.arrival_rate,
                arrival_weight: spec.arrival_rate / total_arrival_rate,
            })
            .collect();
        Ok(Self {
            functions,
            total_arrival_rate,
        })
    }

    /// Builds the table from arrival weights and the aggregate arrival rate.
    ///
    /// Weights are normalized, so they only have to be proportional to the per-function rates.
    pub fn from_weights(
        service_times: Vec<f64>,
        weights: Vec<f64>,
        total_arrival_rate: f64,
    ) -> Result<Self, ConfigError> {
        if service_times.len() != weights.len() {
            return Err(ConfigError::FunctionCountMismatch {
                expected: service_times.len(),
                actual: weights.len(),
            });
        }
        if !total_arrival_rate.is_finite() || total_arrival_rate <= 0. {
            return Err(ConfigError::ZeroTotalArrivalRate);
        }
        let weight_sum: f64 = weights.iter().sum();
        if weight_sum.is_nan() || weight_sum <= 0. {
            return Err(ConfigError::ZeroTotalArrivalRate);
        }
        let specs = service_times
            .iter()
            .zip(weights.iter())
            .map(|(time, weight)| FunctionSpec::new(*time, weight / weight_sum * total_arrival_rate))
            .collect();
        Self::new(specs)
    }

    /// Builds a table of `count` functions with equal popularity and equal average service time.
    pub fn uniform(count: usize, avg_service_time: f64, total_arrival_rate: f64) -> Result<Self, ConfigError> {
        let rate = total_arrival_rate / count as f64;
        Self::new(vec![FunctionSpec::new(avg_service_time, rate); count])
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    pub fn get(&self, id: usize) -> Option<&Function> {
        self.functions.get(id)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Function> {
        self.functions.iter()
    }

    /// Aggregate arrival rate of all functions, the rate of the merged Poisson stream.
    pub fn total_arrival_rate(&self) -> f64 {
        self.total_arrival_rate
    }

    pub fn weights(&self) -> impl Iterator<Item = f64> + '_ {
        self.functions.iter().map(|f| f.arrival_weight)
    }
}

impl Index<usize> for FunctionTable {
    type Output = Function;

    fn index(&self, id: usize) -> &Self::Output {
        &self.functions[id]
    }
}
