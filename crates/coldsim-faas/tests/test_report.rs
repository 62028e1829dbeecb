mod common;

use coldsim_faas::report::{write_summaries, write_trials, SummaryMetric};
use coldsim_faas::simulation::RunResult;
use coldsim_faas::stats::{CapacitySummary, Estimate};

fn run_result(capacity: usize, cold_start_ratio: Option<f64>, loss_rate: Option<f64>) -> RunResult {
    RunResult {
        capacity,
        seed: 1,
        time: 10.,
        counters: Default::default(),
        in_flight: 0,
        cold_start_ratio,
        loss_rate,
        series: Vec::new(),
    }
}

fn summary(capacity: usize, cold_start_ratio: (f64, f64), loss_rate: (f64, f64)) -> CapacitySummary {
    CapacitySummary {
        capacity,
        trials: 10,
        cold_start_ratio: Estimate {
            mean: cold_start_ratio.0,
            half_width: cold_start_ratio.1,
        },
        loss_rate: Estimate {
            mean: loss_rate.0,
            half_width: loss_rate.1,
        },
    }
}

#[test]
fn test_write_trials() {
    let results = vec![
        run_result(2, Some(0.5), Some(0.25)),
        run_result(3, Some(0.1), Some(0.)),
        run_result(2, None, None),
        run_result(2, Some(0.75), Some(1.5)),
    ];
    let mut out = Vec::new();
    write_trials(&mut out, 2, &results).unwrap();
    assert_eq!(
        String::from_utf8(out).unwrap(),
        "run,cold_start_ratio,loss_rate\n0,0.5,0.25\n1,,\n2,0.75,1.5\n"
    );
}

#[test]
fn test_write_summaries() {
    let summaries = vec![summary(1, (0.9, 0.01), (2.5, 0.125)), summary(2, (0.5, 0.05), (1., 0.25))];
    let mut out = Vec::new();
    write_summaries(&mut out, &summaries, SummaryMetric::ColdStartRatio).unwrap();
    assert_eq!(
        String::from_utf8(out).unwrap(),
        "M,Point Estimate,90% Confidence Interval\n\
         1,0.9000,\"(0.8900, 0.9100)\"\n\
         2,0.5000,\"(0.4500, 0.5500)\"\n"
    );

    let mut out = Vec::new();
    write_summaries(&mut out, &summaries, SummaryMetric::LossRate).unwrap();
    assert_eq!(
        String::from_utf8(out).unwrap(),
        "M,Point Estimate,90% Confidence Interval\n\
         1,2.5000,\"(2.3750, 2.6250)\"\n\
         2,1.0000,\"(0.7500, 1.2500)\"\n"
    );
}
