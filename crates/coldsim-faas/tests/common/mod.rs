#![allow(dead_code)]

use coldsim_faas::config::Config;
use coldsim_faas::function::{FunctionSpec, FunctionTable};

pub fn assert_float_eq(x: f64, y: f64, eps: f64) {
    assert!(x > y - eps && x < y + eps, "{} != {} (eps = {})", x, y, eps);
}

/// Config for scripted scenarios: cold starts are practically instantaneous.
pub fn instant_cold_start_config(capacity: usize) -> Config {
    Config {
        capacity,
        cold_start_rate: 1e9,
        horizon: 1000.,
        ..Default::default()
    }
}

/// Functions that never receive generated arrivals in a reasonable time, for scripted scenarios.
pub fn quiet_functions(count: usize, avg_service_time: f64) -> FunctionTable {
    FunctionTable::new(vec![FunctionSpec::new(avg_service_time, 1e-12); count]).unwrap()
}

pub fn mixed_functions() -> FunctionTable {
    let specs = (0..20)
        .map(|i| FunctionSpec::new(0.5 + (i % 4) as f64, 0.1 + 0.05 * i as f64))
        .collect();
    FunctionTable::new(specs).unwrap()
}
