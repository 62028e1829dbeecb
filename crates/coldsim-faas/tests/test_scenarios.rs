mod common;
use common::{instant_cold_start_config, quiet_functions};

use coldsim_faas::config::Config;
use coldsim_faas::error::{ConfigError, RequestError};
use coldsim_faas::function::{FunctionSpec, FunctionTable};
use coldsim_faas::request::RequestStatus;
use coldsim_faas::simulation::CapacitySimulation;
use coldsim_faas::slots::SlotStatus;

fn statuses_of(sim: &CapacitySimulation, request_id: u64) -> Vec<RequestStatus> {
    sim.request_history()
        .iter()
        .filter(|t| t.request.id == request_id)
        .map(|t| t.status)
        .collect()
}

#[test]
fn test_second_request_for_running_function_is_lost() {
    let functions = quiet_functions(1, 1000.);
    let mut sim = CapacitySimulation::new(instant_cold_start_config(1), &functions).unwrap();
    sim.enable_request_history();
    sim.send_request(0, 0.0).unwrap();
    sim.send_request(0, 0.001).unwrap();
    sim.step_until(0.01);
    let counters = sim.counters();
    assert_eq!(counters.requests_total, 2);
    assert_eq!(counters.cold_starts, 1);
    assert_eq!(counters.lost_already_running, 1);
    assert_eq!(counters.lost_memory_full, 0);
    assert_eq!(counters.completions, 0);
    assert_eq!(sim.slot_status(0), SlotStatus::Executing);
    sim.check_invariants();

    sim.step_until_no_events();
    let counters = sim.counters();
    assert_eq!(counters.completions, 1);
    assert_eq!(counters.cold_starts, 1);
    assert_eq!(sim.slot_status(0), SlotStatus::Idle);
    assert_eq!(sim.idle_order(), vec![0]);
    assert_eq!(
        statuses_of(&sim, 0),
        vec![
            RequestStatus::Arrived,
            RequestStatus::ColdStart,
            RequestStatus::Executing,
            RequestStatus::Completed
        ]
    );
    assert_eq!(
        statuses_of(&sim, 1),
        vec![RequestStatus::Arrived, RequestStatus::RejectedAlreadyRunning]
    );
}

#[test]
fn test_unloaded_function_is_lost_when_memory_is_busy() {
    let functions = quiet_functions(2, 1000.);
    let mut sim = CapacitySimulation::new(instant_cold_start_config(1), &functions).unwrap();
    sim.enable_request_history();
    sim.send_request(0, 0.0).unwrap();
    sim.send_request(1, 0.001).unwrap();
    sim.step_until(0.01);
    let counters = sim.counters();
    assert_eq!(counters.cold_starts, 1);
    assert_eq!(counters.lost_memory_full, 1);
    assert_eq!(counters.lost_already_running, 0);
    assert_eq!(sim.slot_status(0), SlotStatus::Executing);
    assert_eq!(sim.slot_status(1), SlotStatus::Unloaded);
    assert_eq!(
        statuses_of(&sim, 1),
        vec![RequestStatus::Arrived, RequestStatus::RejectedMemoryFull]
    );
    sim.step_until_no_events();
    assert_eq!(sim.counters().completions, 1);
    sim.check_invariants();
}

#[test]
fn test_idle_function_is_served_warm() {
    let functions = quiet_functions(2, 0.01);
    let mut sim = CapacitySimulation::new(instant_cold_start_config(1), &functions).unwrap();
    sim.enable_request_history();
    sim.send_request(0, 0.0).unwrap();
    sim.send_request(0, 100.0).unwrap();
    sim.step_until_no_events();
    let counters = sim.counters();
    assert_eq!(counters.requests_total, 2);
    assert_eq!(counters.cold_starts, 1);
    assert_eq!(counters.completions, 2);
    assert_eq!(counters.lost(), 0);
    assert_eq!(
        statuses_of(&sim, 1),
        vec![RequestStatus::Arrived, RequestStatus::Executing, RequestStatus::Completed]
    );
}

#[test]
fn test_longest_idle_function_is_evicted() {
    let mut specs = vec![FunctionSpec::new(0.01, 1e-12); 3];
    specs.push(FunctionSpec::new(1e6, 1e-12));
    let functions = FunctionTable::new(specs).unwrap();
    let mut sim = CapacitySimulation::new(instant_cold_start_config(3), &functions).unwrap();
    for (func_id, time) in [(0, 0.), (1, 100.), (2, 200.)] {
        sim.send_request(func_id, time).unwrap();
    }
    sim.step_until(300.);
    assert_eq!(sim.idle_order(), vec![0, 1, 2]);
    sim.send_request(3, 300.).unwrap();
    sim.step_until(300.5);
    assert_eq!(sim.slot_status(0), SlotStatus::Unloaded);
    assert_eq!(sim.idle_order(), vec![1, 2]);
    assert_eq!(sim.counters().cold_starts, 4);
    sim.check_invariants();
}

#[test]
fn test_warm_start_preloads_first_functions() {
    let functions = quiet_functions(4, 1e6);
    let config = Config {
        warm_start: true,
        ..instant_cold_start_config(3)
    };
    let mut sim = CapacitySimulation::new(config, &functions).unwrap();
    assert_eq!(sim.idle_order(), vec![0, 1, 2]);
    assert_eq!(sim.slot_status(3), SlotStatus::Unloaded);
    sim.send_request(1, 0.).unwrap();
    sim.send_request(3, 1.).unwrap();
    sim.step_until(2.);
    let counters = sim.counters();
    assert_eq!(counters.cold_starts, 1);
    assert_eq!(sim.slot_status(0), SlotStatus::Unloaded);
    assert_eq!(sim.slot_status(1), SlotStatus::Executing);
    assert_eq!(sim.slot_status(3), SlotStatus::Executing);
    assert_eq!(sim.idle_order(), vec![2]);
    sim.check_invariants();
}

#[test]
fn test_invalid_configs_are_rejected() {
    let functions = quiet_functions(2, 1.);
    let build = |config: Config| CapacitySimulation::new(config, &functions).err();
    assert_eq!(
        build(Config {
            capacity: 0,
            ..Default::default()
        }),
        Some(ConfigError::ZeroCapacity)
    );
    assert_eq!(
        build(Config {
            capacity: 3,
            ..Default::default()
        }),
        Some(ConfigError::CapacityExceedsFunctions {
            capacity: 3,
            functions: 2
        })
    );
    assert_eq!(
        build(Config {
            horizon: 0.,
            ..Default::default()
        }),
        Some(ConfigError::NonPositiveHorizon(0.))
    );
    assert_eq!(
        build(Config {
            cold_start_rate: -1.,
            ..Default::default()
        }),
        Some(ConfigError::NonPositiveColdStartRate(-1.))
    );
    assert_eq!(
        build(Config {
            metrics_interval: 0.,
            ..Default::default()
        }),
        Some(ConfigError::NonPositiveMetricsInterval(0.))
    );
    assert!(build(Config::default()).is_none());
}

#[test]
fn test_invalid_function_tables_are_rejected() {
    assert_eq!(FunctionTable::new(Vec::new()).err(), Some(ConfigError::EmptyFunctionTable));
    assert_eq!(
        FunctionTable::new(vec![FunctionSpec::new(1., 0.); 3]).err(),
        Some(ConfigError::ZeroTotalArrivalRate)
    );
    assert_eq!(
        FunctionTable::new(vec![FunctionSpec::new(1., 1.), FunctionSpec::new(1., -1.)]).err(),
        Some(ConfigError::InvalidArrivalRate { id: 1, rate: -1. })
    );
    assert_eq!(
        FunctionTable::new(vec![FunctionSpec::new(-0.5, 1.)]).err(),
        Some(ConfigError::InvalidServiceTime { id: 0, time: -0.5 })
    );
    assert!(matches!(
        FunctionTable::new(vec![FunctionSpec::new(f64::NAN, 1.)]).err(),
        Some(ConfigError::InvalidServiceTime { id: 0, .. })
    ));
    assert_eq!(
        FunctionTable::from_weights(vec![1., 1.], vec![1.], 2.).err(),
        Some(ConfigError::FunctionCountMismatch { expected: 2, actual: 1 })
    );
    assert_eq!(
        FunctionTable::from_weights(vec![1., 1.], vec![0., 0.], 2.).err(),
        Some(ConfigError::ZeroTotalArrivalRate)
    );
}

#[test]
fn test_weights_are_derived_from_rates() {
    let table = FunctionTable::new(vec![FunctionSpec::new(1., 1.), FunctionSpec::new(2., 3.)]).unwrap();
    assert_eq!(table.len(), 2);
    assert_eq!(table.total_arrival_rate(), 4.);
    assert_eq!(table.weights().collect::<Vec<_>>(), vec![0.25, 0.75]);
    let same = FunctionTable::from_weights(vec![1., 2.], vec![0.25, 0.75], 4.).unwrap();
    assert_eq!(same[1].arrival_rate, 3.);
}

#[test]
fn test_zero_service_time_completes_instantly() {
    let functions = FunctionTable::new(vec![FunctionSpec::new(0., 1e-12), FunctionSpec::new(1., 1e-12)]).unwrap();
    let mut sim = CapacitySimulation::new(instant_cold_start_config(1), &functions).unwrap();
    sim.enable_request_history();
    sim.send_request(0, 1.).unwrap();
    sim.step_until(2.);
    let counters = sim.counters();
    assert_eq!(counters.cold_starts, 1);
    assert_eq!(counters.completions, 1);
    assert_eq!(sim.slot_status(0), SlotStatus::Idle);
    let history = sim.request_history();
    let executing = history.iter().find(|t| t.status == RequestStatus::Executing).unwrap();
    let completed = history.iter().find(|t| t.status == RequestStatus::Completed).unwrap();
    assert_eq!(executing.time, completed.time);
    sim.check_invariants();
}

#[test]
fn test_invalid_scripted_requests_are_rejected() {
    let functions = quiet_functions(2, 1.);
    let mut sim = CapacitySimulation::new(instant_cold_start_config(1), &functions).unwrap();
    assert_eq!(
        sim.send_request(5, 1.),
        Err(RequestError::UnknownFunction {
            func_id: 5,
            functions: 2
        })
    );
    sim.step_until(2.);
    assert_eq!(
        sim.send_request(0, 1.),
        Err(RequestError::TimeInPast { time: 1., now: 2. })
    );
    assert!(matches!(sim.send_request(1, f64::NAN), Err(RequestError::TimeInPast { .. })));
    assert_eq!(sim.send_request(1, 2.), Ok(()));
    sim.step_until(3.);
    assert_eq!(sim.counters().requests_total, 1);
    assert_eq!(sim.counters().completions + sim.executing_count() as u64, 1);
}
