//! CSV output of capacity sweeps.
//!
//! Per-trial files have the columns `run,cold_start_ratio,loss_rate`, undefined ratios are left empty.
//! Summary files have one row per capacity: `M`, the point estimate and the 90% interval as `(lower, upper)`.

use std::io::Write;

use serde::Serialize;

use crate::simulation::RunResult;
use crate::stats::{CapacitySummary, Estimate};

#[derive(Serialize)]
struct TrialRecord {
    run: u64,
    cold_start_ratio: Option<f64>,
    loss_rate: Option<f64>,
}

#[derive(Serialize)]
struct SummaryRecord {
    #[serde(rename = "M")]
    capacity: usize,
    #[serde(rename = "Point Estimate")]
    point_estimate: String,
    #[serde(rename = "90% Confidence Interval")]
    interval: String,
}

/// Metric of a [`CapacitySummary`] written to a summary file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SummaryMetric {
    ColdStartRatio,
    LossRate,
}

impl SummaryMetric {
    fn estimate(&self, summary: &CapacitySummary) -> Estimate {
        match self {
            SummaryMetric::ColdStartRatio => summary.cold_start_ratio,
            SummaryMetric::LossRate => summary.loss_rate,
        }
    }
}

/// Writes the trials of `capacity` in result order, numbering them from zero.
pub fn write_trials<W: Write>(writer: W, capacity: usize, results: &[RunResult]) -> Result<(), csv::Error> {
    let mut wtr = csv::Writer::from_writer(writer);
    for (run, result) in results.iter().filter(|r| r.capacity == capacity).enumerate() {
        wtr.serialize(TrialRecord {
            run: run as u64,
            cold_start_ratio: result.cold_start_ratio,
            loss_rate: result.loss_rate,
        })?;
    }
    wtr.flush()?;
    Ok(())
}

/// Writes one row per summary with the estimate of `metric`, values rounded to four decimals.
pub fn write_summaries<W: Write>(
    writer: W,
    summaries: &[CapacitySummary],
    metric: SummaryMetric,
) -> Result<(), csv::Error> {
    let mut wtr = csv::Writer::from_writer(writer);
    for summary in summaries {
        let estimate = metric.estimate(summary);
        wtr.serialize(SummaryRecord {
            capacity: summary.capacity,
            point_estimate: format!("{:.4}", estimate.mean),
            interval: format!("({:.4}, {:.4})", estimate.lower(), estimate.upper()),
        })?;
    }
    wtr.flush()?;
    Ok(())
}
