//! Simulation setup and the event loop.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use colored::Color;
use log::Level::Trace;
use log::{debug, log_enabled, trace};
use serde_json::json;
use serde_type_name::type_name;

use crate::component::Id;
use crate::context::SimulationContext;
use crate::event::Event;
use crate::handler::EventHandler;
use crate::log::{get_colored, log_undelivered_event};
use crate::state::Timeline;

struct Component {
    name: String,
    handler: Option<Rc<RefCell<dyn EventHandler>>>,
}

/// A single simulation run: registered components and the timeline they share.
///
/// Instances are independent of each other, so separate runs can execute in separate threads as long as
/// each thread builds its own simulation.
pub struct Simulation {
    timeline: Rc<RefCell<Timeline>>,
    ids: HashMap<String, Id>,
    components: Vec<Component>,
}

impl Simulation {
    /// Creates an empty simulation whose random stream is seeded with `seed`.
    pub fn new(seed: u64) -> Self {
        Self {
            timeline: Rc::new(RefCell::new(Timeline::new(seed))),
            ids: HashMap::new(),
            components: Vec::new(),
        }
    }

    fn register(&mut self, name: &str) -> Id {
        if let Some(&id) = self.ids.get(name) {
            return id;
        }
        let id = self.components.len() as Id;
        self.ids.insert(name.to_owned(), id);
        self.components.push(Component {
            name: name.to_owned(),
            handler: None,
        });
        id
    }

    /// Returns the id of the component registered under `name`.
    ///
    /// Panics if there is no such component.
    pub fn lookup_id(&self, name: &str) -> Id {
        match self.ids.get(name) {
            Some(&id) => id,
            None => panic!("no component named {}", name),
        }
    }

    /// Registers component `name` (if needed) and returns a context for it.
    pub fn create_context<S>(&mut self, name: S) -> SimulationContext
    where
        S: AsRef<str>,
    {
        let id = self.register(name.as_ref());
        debug!(
            target: "simulation",
            "[{:.3} {} simulation] Created context: {}",
            self.time(),
            get_colored("DEBUG", Color::Blue),
            json!({"name": name.as_ref(), "id": id})
        );
        SimulationContext::new(id, name.as_ref(), self.timeline.clone())
    }

    /// Attaches the event handler of component `name`, returns the component id.
    pub fn add_handler<S>(&mut self, name: S, handler: Rc<RefCell<dyn EventHandler>>) -> Id
    where
        S: AsRef<str>,
    {
        let id = self.register(name.as_ref());
        self.components[id as usize].handler = Some(handler);
        debug!(
            target: "simulation",
            "[{:.3} {} simulation] Added handler: {}",
            self.time(),
            get_colored("DEBUG", Color::Blue),
            json!({"name": name.as_ref(), "id": id})
        );
        id
    }

    /// Current simulation time.
    pub fn time(&self) -> f64 {
        self.timeline.borrow().now()
    }

    /// Delivers the earliest pending event, returns `false` if there was none.
    ///
    /// Events for components without a handler are logged and dropped.
    pub fn step(&mut self) -> bool {
        let next = self.timeline.borrow_mut().pop();
        let event = match next {
            Some(event) => event,
            None => return false,
        };
        if log_enabled!(Trace) {
            self.trace_event(&event);
        }
        let handler = self.components.get(event.dst as usize).and_then(|c| c.handler.clone());
        match handler {
            Some(handler) => handler.borrow_mut().on(event),
            None => log_undelivered_event(event),
        }
        true
    }

    fn trace_event(&self, event: &Event) {
        let name = |id: Id| self.components.get(id as usize).map_or("?", |c| c.name.as_str());
        let dst = name(event.dst);
        trace!(
            target: dst,
            "[{:.3} {} {}] {}",
            event.time,
            get_colored("EVENT", Color::BrightBlack),
            dst,
            json!({"type": type_name(&event.data).unwrap_or("?"), "data": event.data, "src": name(event.src)})
        );
    }

    /// Makes up to `step_count` steps, returns `false` if the events ran out earlier.
    pub fn steps(&mut self, step_count: u64) -> bool {
        (0..step_count).all(|_| self.step())
    }

    /// Processes events until none are left.
    pub fn step_until_no_events(&mut self) {
        while self.step() {}
    }

    /// Processes every event scheduled strictly before `until`, then moves the clock to `until`.
    ///
    /// Events at or after `until` stay pending. Returns `true` if any are left.
    pub fn step_until(&mut self, until: f64) -> bool {
        loop {
            let next_time = self.timeline.borrow().next_time();
            match next_time {
                Some(time) if time < until => self.step(),
                _ => break,
            };
        }
        let mut timeline = self.timeline.borrow_mut();
        timeline.advance_to(until);
        timeline.pending() > 0
    }

    /// Total number of events scheduled so far.
    pub fn event_count(&self) -> u64 {
        self.timeline.borrow().created()
    }

    /// Number of events scheduled but not delivered yet.
    pub fn pending_event_count(&self) -> usize {
        self.timeline.borrow().pending()
    }
}
