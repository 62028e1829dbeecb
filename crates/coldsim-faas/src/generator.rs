//! Aggregate Poisson workload generator.

use std::cell::RefCell;
use std::rc::Rc;

use rand::distributions::WeightedIndex;
use rand_distr::Exp;

use coldsim_core::{cast, log_trace, Event, EventHandler, Id, SimulationContext};

use crate::error::ConfigError;
use crate::event::{NextArrivalEvent, RequestArrivalEvent, ScriptedArrivalEvent};
use crate::function::FunctionTable;
use crate::request::Request;
use crate::stats::Counters;

/// Produces requests of all functions as a single Poisson stream with the aggregate rate,
/// attributing each arrival to a function by its arrival weight.
pub struct WorkloadGenerator {
    inter_arrival: Exp<f64>,
    function_choice: WeightedIndex<f64>,
    function_count: usize,
    counters: Rc<RefCell<Counters>>,
    next_request_id: u64,
    platform_id: Id,
    ctx: SimulationContext,
}

impl WorkloadGenerator {
    pub fn new(
        functions: &FunctionTable,
        counters: Rc<RefCell<Counters>>,
        platform_id: Id,
        ctx: SimulationContext,
    ) -> Result<Self, ConfigError> {
        let inter_arrival = Exp::new(functions.total_arrival_rate()).map_err(|_| ConfigError::ZeroTotalArrivalRate)?;
        let function_choice = WeightedIndex::new(functions.weights()).map_err(|_| ConfigError::ZeroTotalArrivalRate)?;
        Ok(Self {
            inter_arrival,
            function_choice,
            function_count: functions.len(),
            counters,
            next_request_id: 0,
            platform_id,
            ctx,
        })
    }

    /// Schedules the first arrival of the stream.
    pub fn start(&mut self) {
        self.schedule_next_arrival();
    }

    pub fn id(&self) -> Id {
        self.ctx.id()
    }

    fn schedule_next_arrival(&mut self) {
        let delay = self.ctx.sample_from_distribution(&self.inter_arrival);
        self.ctx.emit_self(NextArrivalEvent {}, delay);
    }

    fn dispatch(&mut self, func_id: usize) {
        assert!(
            func_id < self.function_count,
            "request for unknown function {} (there are {})",
            func_id,
            self.function_count
        );
        self.counters.borrow_mut().requests_total += 1;
        let request = Request {
            id: self.next_request_id,
            func_id,
            arrival_time: self.ctx.time(),
        };
        self.next_request_id += 1;
        log_trace!(self.ctx, "request {} for function {}", request.id, func_id);
        self.ctx.emit_now(RequestArrivalEvent { request }, self.platform_id);
    }
}

impl EventHandler for WorkloadGenerator {
    fn on(&mut self, event: Event) {
        cast!(match event.data {
            NextArrivalEvent {} => {
                let func_id = self.ctx.sample_from_distribution(&self.function_choice);
                self.dispatch(func_id);
                self.schedule_next_arrival();
            }
            ScriptedArrivalEvent { func_id } => {
                self.dispatch(func_id);
            }
        })
    }
}
