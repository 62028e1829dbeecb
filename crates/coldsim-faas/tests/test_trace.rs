mod common;
use common::assert_float_eq;

use coldsim_faas::error::LoadError;
use coldsim_faas::trace::{read_trace, TRACE_WINDOW};

#[test]
fn test_read_trace() {
    let data = "HashFunction, AvgServiceTimeMillisec, Invocations30Days\n\
                f0, 1500, 2592000\n\
                f1, 250, 7776000\n";
    let functions = read_trace(data.as_bytes()).unwrap();
    assert_eq!(functions.len(), 2);
    assert_eq!(functions[0].id, 0);
    assert_eq!(functions[1].id, 1);
    assert_float_eq(functions[0].avg_service_time, 1.5, 1e-12);
    assert_float_eq(functions[1].avg_service_time, 0.25, 1e-12);
    assert_float_eq(functions[0].arrival_rate, 1., 1e-12);
    assert_float_eq(functions[1].arrival_rate, 3., 1e-12);
    assert_float_eq(functions.total_arrival_rate(), 4., 1e-12);
    let weights: Vec<f64> = functions.weights().collect();
    assert_float_eq(weights[0], 0.25, 1e-12);
    assert_float_eq(weights[1], 0.75, 1e-12);
}

#[test]
fn test_trace_window() {
    assert_eq!(TRACE_WINDOW, 2592000.);
}

#[test]
fn test_empty_trace() {
    let data = "AvgServiceTimeMillisec,Invocations30Days\n";
    assert!(matches!(read_trace(data.as_bytes()), Err(LoadError::EmptyTrace)));
}

#[test]
fn test_malformed_trace() {
    let data = "AvgServiceTimeMillisec,Invocations30Days\n100,many\n";
    assert!(matches!(read_trace(data.as_bytes()), Err(LoadError::Csv(_))));
}

#[test]
fn test_trace_without_invocations() {
    let data = "AvgServiceTimeMillisec,Invocations30Days\n100,0\n200,0\n";
    assert!(matches!(read_trace(data.as_bytes()), Err(LoadError::Config(_))));
}

#[test]
fn test_trace_with_zero_service_time() {
    let data = "AvgServiceTimeMillisec,Invocations30Days\n0,2592000\n150,2592000\n";
    let functions = read_trace(data.as_bytes()).unwrap();
    assert_eq!(functions.len(), 2);
    assert_eq!(functions[0].avg_service_time, 0.);
    assert_float_eq(functions[1].avg_service_time, 0.15, 1e-12);
    assert_float_eq(functions.total_arrival_rate(), 2., 1e-12);
}
