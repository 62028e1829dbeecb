//! Run counters, metrics series and aggregation of repeated runs.

use std::ops::AddAssign;

use num::{ToPrimitive, Zero};
use serde::Serialize;

use crate::simulation::RunResult;

/// Critical value of Student's t-distribution for a two-sided 90% interval with 9 degrees of freedom.
pub const T_90_DF9: f64 = 1.833;

const T_90: [f64; 30] = [
    6.314, 2.920, 2.353, 2.132, 2.015, 1.943, 1.895, 1.860, 1.833, 1.812, 1.796, 1.782, 1.771, 1.761, 1.753,
    1.746, 1.740, 1.734, 1.729, 1.725, 1.721, 1.717, 1.714, 1.711, 1.708, 1.706, 1.703, 1.701, 1.699, 1.697,
];

/// Critical value of Student's t-distribution for a two-sided 90% interval with `df` degrees of freedom.
///
/// Beyond 30 degrees of freedom the value of the nearest smaller tabulated `df` (40, 60, 120) is returned,
/// which slightly widens the interval. Returns `None` for zero degrees of freedom.
pub fn t_critical_90(df: usize) -> Option<f64> {
    match df {
        0 => None,
        1..=30 => Some(T_90[df - 1]),
        31..=39 => Some(T_90[29]),
        40..=59 => Some(1.684),
        60..=119 => Some(1.671),
        _ => Some(1.658),
    }
}

/// Request counters of a single run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Counters {
    pub requests_total: u64,
    pub cold_starts: u64,
    pub completions: u64,
    pub lost_already_running: u64,
    pub lost_memory_full: u64,
}

impl Counters {
    pub fn lost(&self) -> u64 {
        self.lost_already_running + self.lost_memory_full
    }

    /// Requests that were admitted but have not completed yet.
    pub fn in_flight(&self) -> u64 {
        self.requests_total - self.completions - self.lost()
    }

    /// Share of requests that caused a cold start, `None` before the first request.
    pub fn cold_start_ratio(&self) -> Option<f64> {
        if self.requests_total == 0 {
            None
        } else {
            Some(self.cold_starts as f64 / self.requests_total as f64)
        }
    }

    /// Lost requests per time unit over `[0, time]`, `None` at time zero.
    pub fn loss_rate(&self, time: f64) -> Option<f64> {
        if time <= 0. {
            None
        } else {
            Some(self.lost() as f64 / time)
        }
    }
}

/// One point of the metrics time series.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct MetricsSample {
    pub time: f64,
    pub cold_start_ratio: f64,
    pub loss_rate: f64,
}

#[derive(Clone, Default, Debug)]
pub struct SampleMetric<T = f64> {
    data: Vec<T>,
}

impl<T> SampleMetric<T> {
    pub fn add(&mut self, x: T) {
        self.data.push(x);
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl<T> SampleMetric<T>
where
    T: AddAssign + Copy + Zero,
{
    pub fn sum(&self) -> T {
        let mut s = T::zero();
        for x in self.data.iter().copied() {
            s += x;
        }
        s
    }
}

impl<T> SampleMetric<T>
where
    T: AddAssign + Copy + Zero + ToPrimitive,
{
    pub fn mean(&self) -> f64 {
        self.sum().to_f64().unwrap() / (self.data.len() as f64)
    }

    pub fn biased_variance(&self) -> f64 {
        let mean = self.mean();
        let mut s = 0.;
        for x in self.data.iter() {
            let d = x.to_f64().unwrap() - mean;
            s += d * d;
        }
        s / (self.data.len() as f64)
    }

    pub fn unbiased_variance(&self) -> f64 {
        let n = self.data.len() as f64;
        self.biased_variance() * n / (n - 1.)
    }

    /// Point estimate with a confidence interval `mean ± t * sigma / sqrt(n)`,
    /// where sigma is the population standard deviation of the sample.
    pub fn estimate(&self, t: f64) -> Estimate {
        let n = self.data.len() as f64;
        Estimate {
            mean: self.mean(),
            half_width: t * self.biased_variance().sqrt() / n.sqrt(),
        }
    }
}

impl SampleMetric<f64> {
    pub fn min(&self) -> Option<f64> {
        self.data.iter().copied().reduce(f64::min)
    }

    pub fn max(&self) -> Option<f64> {
        self.data.iter().copied().reduce(f64::max)
    }

    /// Returns the `q`-quantile with linear interpolation between order statistics.
    pub fn quantile(&self, q: f64) -> f64 {
        assert!(!self.data.is_empty(), "quantile of an empty sample");
        let pos = q.clamp(0., 1.) * (self.data.len() - 1) as f64;
        let lo = pos.floor() as usize;
        let hi = pos.ceil() as usize;
        let mut data = self.data.clone();
        let lo_val = *order_stat::kth_by(&mut data, lo, |a, b| a.total_cmp(b));
        if hi == lo {
            return lo_val;
        }
        let hi_val = *order_stat::kth_by(&mut data, hi, |a, b| a.total_cmp(b));
        lo_val + (hi_val - lo_val) * (pos - lo as f64)
    }
}

/// Point estimate with the half width of its confidence interval.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Estimate {
    pub mean: f64,
    pub half_width: f64,
}

impl Estimate {
    pub fn lower(&self) -> f64 {
        self.mean - self.half_width
    }

    pub fn upper(&self) -> f64 {
        self.mean + self.half_width
    }
}

/// Estimates of a capacity value over repeated runs.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct CapacitySummary {
    pub capacity: usize,
    pub trials: usize,
    pub cold_start_ratio: Estimate,
    pub loss_rate: Estimate,
}

impl CapacitySummary {
    pub fn print(&self) {
        println!("M capacity: {}", self.capacity);
        println!("Samples: {}", self.trials);
        println!("Cold start ratio: {:.4}", self.cold_start_ratio.mean);
        println!(
            "- confidence interval: ({:.4}, {:.4})",
            self.cold_start_ratio.lower(),
            self.cold_start_ratio.upper()
        );
        println!("Loss rate: {:.4}", self.loss_rate.mean);
        println!(
            "- confidence interval: ({:.4}, {:.4})",
            self.loss_rate.lower(),
            self.loss_rate.upper()
        );
    }
}

/// Aggregates the runs of a single capacity with 90% intervals, picking the t-value from the number of runs.
///
/// Returns `None` unless at least two runs have both ratios defined.
pub fn summarize_90(capacity: usize, results: &[RunResult]) -> Option<CapacitySummary> {
    let defined = results
        .iter()
        .filter(|r| r.capacity == capacity && r.cold_start_ratio.is_some() && r.loss_rate.is_some())
        .count();
    let t = t_critical_90(defined.checked_sub(1)?)?;
    summarize(capacity, results, t)
}

/// Aggregates the runs of a single capacity, skipping runs with undefined ratios.
///
/// Returns `None` if no run has both ratios defined.
pub fn summarize(capacity: usize, results: &[RunResult], t: f64) -> Option<CapacitySummary> {
    let mut cold_start_ratio = SampleMetric::<f64>::default();
    let mut loss_rate = SampleMetric::<f64>::default();
    for result in results.iter().filter(|r| r.capacity == capacity) {
        if let (Some(csr), Some(lr)) = (result.cold_start_ratio, result.loss_rate) {
            cold_start_ratio.add(csr);
            loss_rate.add(lr);
        }
    }
    if cold_start_ratio.is_empty() {
        return None;
    }
    Some(CapacitySummary {
        capacity,
        trials: cold_start_ratio.len(),
        cold_start_ratio: cold_start_ratio.estimate(t),
        loss_rate: loss_rate.estimate(t),
    })
}
