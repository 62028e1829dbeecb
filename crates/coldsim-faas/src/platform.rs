//! Admission control and the request lifecycle.

use std::cell::RefCell;
use std::rc::Rc;

use rand_distr::Exp;
use serde::Serialize;

use coldsim_core::{cast, log_debug, log_trace, Event, EventHandler, Id, SimulationContext};

use crate::error::ConfigError;
use crate::event::{ColdStartEndEvent, RequestArrivalEvent, ServiceEndEvent};
use crate::function::FunctionTable;
use crate::request::{Request, RequestStatus};
use crate::slots::{Admission, RejectReason, SlotTable};
use crate::stats::Counters;

/// A recorded lifecycle transition of a request.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct RequestTransition {
    pub time: f64,
    pub request: Request,
    pub status: RequestStatus,
}

/// Memory-constrained FaaS platform.
///
/// Every arriving request goes through admission: it is either rejected, admitted warm, or admitted after
/// a cold start. An admitted request is served for an exponentially distributed time with the function mean,
/// after which the function returns to the tail of the idle queue.
pub struct Platform {
    slots: SlotTable,
    cold_start: Exp<f64>,
    service: Vec<Exp<f64>>,
    counters: Rc<RefCell<Counters>>,
    history: Option<Vec<RequestTransition>>,
    ctx: SimulationContext,
}

impl Platform {
    pub fn new(
        slots: SlotTable,
        functions: &FunctionTable,
        cold_start_rate: f64,
        counters: Rc<RefCell<Counters>>,
        ctx: SimulationContext,
    ) -> Result<Self, ConfigError> {
        let cold_start = Exp::new(cold_start_rate).map_err(|_| ConfigError::NonPositiveColdStartRate(cold_start_rate))?;
        // zero mean service time gives an infinite rate, such functions complete instantly
        let service = functions
            .iter()
            .map(|f| {
                Exp::new(1. / f.avg_service_time).map_err(|_| ConfigError::InvalidServiceTime {
                    id: f.id,
                    time: f.avg_service_time,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            slots,
            cold_start,
            service,
            counters,
            history: None,
            ctx,
        })
    }

    pub fn id(&self) -> Id {
        self.ctx.id()
    }

    pub fn slots(&self) -> &SlotTable {
        &self.slots
    }

    /// Starts recording every request transition.
    pub fn enable_history(&mut self) {
        if self.history.is_none() {
            self.history = Some(Vec::new());
        }
    }

    pub fn history(&self) -> &[RequestTransition] {
        self.history.as_deref().unwrap_or(&[])
    }

    fn record(&mut self, request: Request, status: RequestStatus) {
        if let Some(history) = self.history.as_mut() {
            history.push(RequestTransition {
                time: self.ctx.time(),
                request,
                status,
            });
        }
    }

    fn on_arrival(&mut self, request: Request) {
        self.record(request, RequestStatus::Arrived);
        let func_id = request.func_id;
        match self.slots.admit(func_id) {
            Admission::Rejected(reason) => {
                let status = {
                    let mut counters = self.counters.borrow_mut();
                    match reason {
                        RejectReason::AlreadyRunning => {
                            counters.lost_already_running += 1;
                            RequestStatus::RejectedAlreadyRunning
                        }
                        RejectReason::MemoryFull => {
                            counters.lost_memory_full += 1;
                            RequestStatus::RejectedMemoryFull
                        }
                    }
                };
                log_debug!(self.ctx, "request {} for function {} lost: {:?}", request.id, func_id, reason);
                self.record(request, status);
            }
            Admission::Warm => {
                log_trace!(self.ctx, "request {} for function {} admitted warm", request.id, func_id);
                self.start_service(request);
            }
            Admission::Cold { evicted } => {
                self.counters.borrow_mut().cold_starts += 1;
                if let Some(victim) = evicted {
                    log_debug!(self.ctx, "function {} evicted to load function {}", victim, func_id);
                }
                log_trace!(self.ctx, "request {} for function {} cold starts", request.id, func_id);
                self.record(request, RequestStatus::ColdStart);
                let delay = self.ctx.sample_from_distribution(&self.cold_start);
                self.ctx.emit_self(ColdStartEndEvent { request }, delay);
            }
        }
    }

    fn start_service(&mut self, request: Request) {
        self.slots.begin_service(request.func_id);
        self.record(request, RequestStatus::Executing);
        let delay = self.ctx.sample_from_distribution(&self.service[request.func_id]);
        self.ctx.emit_self(ServiceEndEvent { request }, delay);
    }

    fn on_service_end(&mut self, request: Request) {
        self.counters.borrow_mut().completions += 1;
        self.slots.complete(request.func_id);
        log_trace!(
            self.ctx,
            "request {} for function {} completed after {:.3}",
            request.id,
            request.func_id,
            self.ctx.time() - request.arrival_time
        );
        self.record(request, RequestStatus::Completed);
    }
}

impl EventHandler for Platform {
    fn on(&mut self, event: Event) {
        cast!(match event.data {
            RequestArrivalEvent { request } => {
                self.on_arrival(request);
            }
            ColdStartEndEvent { request } => {
                self.start_service(request);
            }
            ServiceEndEvent { request } => {
                self.on_service_end(request);
            }
        })
    }
}
