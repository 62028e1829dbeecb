use std::cell::RefCell;
use std::rc::Rc;

use serde::Serialize;

use coldsim_core::{log_info, Id, Simulation, SimulationContext};

use crate::config::Config;
use crate::error::{ConfigError, RequestError};
use crate::event::ScriptedArrivalEvent;
use crate::function::FunctionTable;
use crate::generator::WorkloadGenerator;
use crate::metrics::MetricsCollector;
use crate::platform::{Platform, RequestTransition};
use crate::slots::{SlotStatus, SlotTable};
use crate::stats::{Counters, MetricsSample};

/// Output of a single run.
#[derive(Clone, Debug, Serialize)]
pub struct RunResult {
    pub capacity: usize,
    pub seed: u64,
    /// Simulation time at which the result was taken.
    pub time: f64,
    pub counters: Counters,
    /// Requests admitted but not completed by `time`, they are neither completed nor lost.
    pub in_flight: u64,
    pub cold_start_ratio: Option<f64>,
    pub loss_rate: Option<f64>,
    pub series: Vec<MetricsSample>,
}

/// Cold start simulation of a FaaS platform with bounded memory.
///
/// One instance corresponds to one `(capacity, seed)` run and owns all of its state.
pub struct CapacitySimulation {
    config: Config,
    function_count: usize,
    counters: Rc<RefCell<Counters>>,
    generator: Rc<RefCell<WorkloadGenerator>>,
    generator_id: Id,
    platform: Rc<RefCell<Platform>>,
    metrics: Rc<RefCell<MetricsCollector>>,
    started: bool,
    ctx: SimulationContext,
    sim: Simulation,
}

impl CapacitySimulation {
    /// Validates the config and builds the simulation. No events are scheduled yet.
    pub fn new(config: Config, functions: &FunctionTable) -> Result<Self, ConfigError> {
        config.validate(functions.len())?;
        let mut sim = Simulation::new(config.seed);
        let counters: Rc<RefCell<Counters>> = Rc::new(RefCell::new(Default::default()));
        let ctx = sim.create_context("entry point");

        let slots = if config.warm_start {
            SlotTable::with_warm_start(functions.len(), config.capacity)
        } else {
            SlotTable::new(functions.len(), config.capacity)
        };
        let platform_ctx = sim.create_context("platform");
        let platform = Rc::new(RefCell::new(Platform::new(
            slots,
            functions,
            config.cold_start_rate,
            counters.clone(),
            platform_ctx,
        )?));
        let platform_id = sim.add_handler("platform", platform.clone());

        let generator_ctx = sim.create_context("generator");
        let generator = Rc::new(RefCell::new(WorkloadGenerator::new(
            functions,
            counters.clone(),
            platform_id,
            generator_ctx,
        )?));
        let generator_id = sim.add_handler("generator", generator.clone());

        let metrics_ctx = sim.create_context("metrics");
        let metrics = Rc::new(RefCell::new(MetricsCollector::new(
            config.metrics_interval,
            counters.clone(),
            metrics_ctx,
        )));
        sim.add_handler("metrics", metrics.clone());

        Ok(Self {
            config,
            function_count: functions.len(),
            counters,
            generator,
            generator_id,
            platform,
            metrics,
            started: false,
            ctx,
            sim,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn time(&self) -> f64 {
        self.sim.time()
    }

    pub fn counters(&self) -> Counters {
        *self.counters.borrow()
    }

    pub fn slot_status(&self, func_id: usize) -> SlotStatus {
        self.platform.borrow().slots().status(func_id)
    }

    pub fn executing_count(&self) -> usize {
        self.platform.borrow().slots().executing_count()
    }

    /// Idle functions from the longest idle to the most recently idle.
    pub fn idle_order(&self) -> Vec<usize> {
        self.platform.borrow().slots().idle_order()
    }

    pub fn series(&self) -> Vec<MetricsSample> {
        self.metrics.borrow().series().to_vec()
    }

    /// Starts recording request lifecycle transitions, see [`request_history`](Self::request_history).
    pub fn enable_request_history(&mut self) {
        self.platform.borrow_mut().enable_history();
    }

    pub fn request_history(&self) -> Vec<RequestTransition> {
        self.platform.borrow().history().to_vec()
    }

    /// Schedules a request for function `func_id` at absolute time `time`, in addition to the generated workload.
    pub fn send_request(&mut self, func_id: usize, time: f64) -> Result<(), RequestError> {
        if func_id >= self.function_count {
            return Err(RequestError::UnknownFunction {
                func_id,
                functions: self.function_count,
            });
        }
        let now = self.sim.time();
        // negated comparison also rejects NaN
        if !(time >= now) {
            return Err(RequestError::TimeInPast { time, now });
        }
        self.ctx.emit(ScriptedArrivalEvent { func_id }, self.generator_id, time - now);
        Ok(())
    }

    /// Starts the arrival stream and the metrics sampling. Calling it again has no effect.
    pub fn start(&mut self) {
        if self.started {
            return;
        }
        self.started = true;
        self.generator.borrow_mut().start();
        self.metrics.borrow_mut().start();
    }

    pub fn step(&mut self) -> bool {
        self.sim.step()
    }

    /// Processes all events before `time` and moves the clock to `time`.
    pub fn step_until(&mut self, time: f64) -> bool {
        self.sim.step_until(time)
    }

    /// Processes events until none are left. Never returns once [`start`](Self::start) was called.
    pub fn step_until_no_events(&mut self) {
        self.sim.step_until_no_events();
    }

    pub fn event_count(&self) -> u64 {
        self.sim.event_count()
    }

    /// Panics if the slot table is inconsistent or the request accounting does not add up.
    pub fn check_invariants(&self) {
        let platform = self.platform.borrow();
        platform.slots().check_invariants();
        let counters = self.counters.borrow();
        assert!(
            counters.completions + counters.lost() + platform.slots().executing_count() as u64
                <= counters.requests_total,
            "more requests finished than arrived: {:?}",
            *counters
        );
    }

    /// Runs the simulation up to the configured horizon and returns the result.
    pub fn run(&mut self) -> RunResult {
        self.start();
        self.sim.step_until(self.config.horizon);
        let result = self.result();
        log_info!(
            self.ctx,
            "capacity {} seed {}: {} requests, {} cold starts, {} completions, {} lost ({} already running, {} memory full)",
            result.capacity,
            result.seed,
            result.counters.requests_total,
            result.counters.cold_starts,
            result.counters.completions,
            result.counters.lost(),
            result.counters.lost_already_running,
            result.counters.lost_memory_full
        );
        result
    }

    /// Returns counters, final ratios and the metrics series at the current time.
    pub fn result(&self) -> RunResult {
        let counters = self.counters();
        let time = self.time();
        RunResult {
            capacity: self.config.capacity,
            seed: self.config.seed,
            time,
            counters,
            in_flight: self.executing_count() as u64,
            cold_start_ratio: counters.cold_start_ratio(),
            loss_rate: counters.loss_rate(time),
            series: self.series(),
        }
    }
}
