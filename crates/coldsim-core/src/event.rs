//! Simulation events.

use std::cmp::Ordering;

use downcast_rs::{impl_downcast, Downcast};
use serde::ser::Serialize;

use crate::component::Id;

/// Event identifier, equal to the number of events created before this one.
pub type EventId = u64;

/// Trait that should be implemented by event payloads.
///
/// It is implemented automatically for every `Serialize + 'static` type,
/// so a payload is usually a plain struct with `#[derive(Clone, Serialize)]`.
pub trait EventData: Downcast + erased_serde::Serialize {}

impl_downcast!(EventData);

erased_serde::serialize_trait_object!(EventData);

impl<T: Serialize + 'static> EventData for T {}

/// Representation of an event scheduled in the simulation.
pub struct Event {
    /// Unique event identifier.
    ///
    /// Identifiers grow with creation order, which makes them a tie-breaker for events with equal time.
    pub id: EventId,
    /// Time at which the event is delivered.
    pub time: f64,
    /// Identifier of the component that created the event.
    pub src: Id,
    /// Identifier of the component the event is delivered to.
    pub dst: Id,
    /// Event payload.
    pub data: Box<dyn EventData>,
}

impl Eq for Event {}

impl PartialEq for Event {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

// Inverted so that BinaryHeap (a max-heap) pops the earliest event first.
impl Ord for Event {
    fn cmp(&self, other: &Self) -> Ordering {
        other.time.total_cmp(&self.time).then_with(|| other.id.cmp(&self.id))
    }
}

impl PartialOrd for Event {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
