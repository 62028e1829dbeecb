//! Event handling.

use crate::event::Event;

/// Trait for consuming events in simulation components.
///
/// The simulation calls [`on`](EventHandler::on) for every event destined to the component.
/// A call runs to completion before the next event is delivered, so a handler observes and mutates
/// the component state without interference from other components.
pub trait EventHandler {
    /// Processes event.
    fn on(&mut self, event: Event);
}

/// Enables the use of pattern matching syntax for processing different types of events
/// by downcasting the event payload from [`EventData`](crate::event::EventData) to user-defined types.
///
/// Match arms need not be exhaustive. If the payload does not match any of specified arms,
/// the event is logged as unhandled under `ERROR` level.
///
/// # Examples
///
/// ```rust
/// use std::cell::RefCell;
/// use std::rc::Rc;
/// use serde::Serialize;
/// use coldsim_core::{cast, Event, EventHandler, Simulation, SimulationContext};
///
/// #[derive(Clone, Serialize)]
/// pub struct Ping {
///     round: u32,
/// }
///
/// #[derive(Clone, Serialize)]
/// pub struct Stop {}
///
/// pub struct Component {
///     last_round: u32,
///     stopped: bool,
/// }
///
/// impl EventHandler for Component {
///     fn on(&mut self, event: Event) {
///         cast!(match event.data {
///             Ping { round } => {
///                 self.last_round = round;
///             }
///             Stop {} => {
///                 self.stopped = true;
///             }
///         })
///     }
/// }
///
/// let mut sim = Simulation::new(123);
/// let comp = Rc::new(RefCell::new(Component { last_round: 0, stopped: false }));
/// let comp_id = sim.add_handler("comp", comp.clone());
/// let mut client_ctx = sim.create_context("client");
/// client_ctx.emit(Ping { round: 7 }, comp_id, 1.2);
/// client_ctx.emit(Stop {}, comp_id, 2.5);
/// sim.step_until_no_events();
/// assert_eq!(comp.borrow().last_round, 7);
/// assert!(comp.borrow().stopped);
/// ```
#[macro_export]
macro_rules! cast {
    ( match $event:ident.data { $( $type:ident { $($tt:tt)* } => { $($expr:tt)* } )+ } ) => {
        $(
            if $event.data.is::<$type>() {
                if let Ok(__value) = $event.data.downcast::<$type>() {
                    let $type { $($tt)* } = *__value;
                    $($expr)*
                }
            } else
        )*
        {
            $crate::log::log_unhandled_event($event);
        }
    }
}
