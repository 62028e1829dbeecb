//! Per-component access to the simulation.

use std::cell::RefCell;
use std::rc::Rc;

use rand::distributions::Distribution;

use crate::component::Id;
use crate::event::{EventData, EventId};
use crate::state::Timeline;

/// Handle through which a component reads the clock, draws random values and schedules events.
///
/// Every event scheduled through the context has the context's component as its source.
pub struct SimulationContext {
    id: Id,
    name: String,
    timeline: Rc<RefCell<Timeline>>,
}

impl SimulationContext {
    pub(crate) fn new(id: Id, name: &str, timeline: Rc<RefCell<Timeline>>) -> Self {
        Self {
            id,
            name: name.to_owned(),
            timeline,
        }
    }

    /// Id of the component owning this context.
    pub fn id(&self) -> Id {
        self.id
    }

    /// Name of the component owning this context, also used as its log target.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current simulation time.
    pub fn time(&self) -> f64 {
        self.timeline.borrow().now()
    }

    /// Draws a value from `dist` using the generator of the simulation.
    pub fn sample_from_distribution<T, D: Distribution<T>>(&mut self, dist: &D) -> T {
        self.timeline.borrow_mut().sample(dist)
    }

    /// Schedules `data` for component `dst` after `delay`, returns the event id.
    ///
    /// Panics if `delay` is negative.
    pub fn emit<T: EventData>(&mut self, data: T, dst: Id, delay: f64) -> EventId {
        self.timeline.borrow_mut().schedule(data, self.id, dst, delay)
    }

    /// Schedules `data` for component `dst` at the current time.
    pub fn emit_now<T: EventData>(&mut self, data: T, dst: Id) -> EventId {
        self.emit(data, dst, 0.)
    }

    /// Schedules `data` for the owning component after `delay`, which is how a component waits.
    pub fn emit_self<T: EventData>(&mut self, data: T, delay: f64) -> EventId {
        self.emit(data, self.id, delay)
    }

    /// Schedules `data` for the owning component at the current time.
    pub fn emit_self_now<T: EventData>(&mut self, data: T) -> EventId {
        self.emit(data, self.id, 0.)
    }
}
