//! Periodic sampling of the running ratios.

use std::cell::RefCell;
use std::rc::Rc;

use coldsim_core::{cast, Event, EventHandler, SimulationContext};

use crate::event::CollectMetricsEvent;
use crate::stats::{Counters, MetricsSample};

/// Samples cold start ratio and loss rate every `interval` time units.
///
/// Only reads the counters. A sample is skipped while either ratio is undefined (no requests yet or time zero).
pub struct MetricsCollector {
    interval: f64,
    counters: Rc<RefCell<Counters>>,
    series: Vec<MetricsSample>,
    ctx: SimulationContext,
}

impl MetricsCollector {
    pub fn new(interval: f64, counters: Rc<RefCell<Counters>>, ctx: SimulationContext) -> Self {
        Self {
            interval,
            counters,
            series: Vec::new(),
            ctx,
        }
    }

    pub fn start(&mut self) {
        self.ctx.emit_self(CollectMetricsEvent {}, self.interval);
    }

    pub fn series(&self) -> &[MetricsSample] {
        &self.series
    }

    fn collect(&mut self) {
        let time = self.ctx.time();
        let counters = self.counters.borrow();
        if let (Some(cold_start_ratio), Some(loss_rate)) = (counters.cold_start_ratio(), counters.loss_rate(time)) {
            self.series.push(MetricsSample {
                time,
                cold_start_ratio,
                loss_rate,
            });
        }
    }
}

impl EventHandler for MetricsCollector {
    fn on(&mut self, event: Event) {
        cast!(match event.data {
            CollectMetricsEvent {} => {
                self.collect();
                self.ctx.emit_self(CollectMetricsEvent {}, self.interval);
            }
        })
    }
}
