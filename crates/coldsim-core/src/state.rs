use std::collections::BinaryHeap;

use rand::distributions::Distribution;
use rand::SeedableRng;
use rand_pcg::Pcg64;

use crate::component::Id;
use crate::event::{Event, EventData, EventId};
use crate::log::log_incorrect_event;

/// Rounding slack for delays computed as a difference of two timestamps.
const DELAY_TOLERANCE: f64 = 1e-12;

/// Clock, pending events and the random stream shared by the simulation and its contexts.
pub(crate) struct Timeline {
    now: f64,
    rng: Pcg64,
    pending: BinaryHeap<Event>,
    created: u64,
}

impl Timeline {
    pub fn new(seed: u64) -> Self {
        Self {
            now: 0.,
            rng: Pcg64::seed_from_u64(seed),
            pending: BinaryHeap::new(),
            created: 0,
        }
    }

    pub fn now(&self) -> f64 {
        self.now
    }

    /// Moves the clock forward to `time` without processing anything, earlier times are ignored.
    pub fn advance_to(&mut self, time: f64) {
        if time > self.now {
            self.now = time;
        }
    }

    pub fn sample<T, D: Distribution<T>>(&mut self, dist: &D) -> T {
        dist.sample(&mut self.rng)
    }

    /// Queues `data` for delivery `delay` time units from now.
    ///
    /// Panics if the delay is negative beyond rounding slack.
    pub fn schedule<T: EventData>(&mut self, data: T, src: Id, dst: Id, delay: f64) -> EventId {
        let id = self.created;
        let event = Event {
            id,
            time: self.now + delay.max(0.),
            src,
            dst,
            data: Box::new(data),
        };
        if !(delay >= -DELAY_TOLERANCE) {
            log_incorrect_event(event, &format!("negative delay {}", delay));
            panic!("Event delay is negative ({}), events cannot be scheduled in the past", delay);
        }
        self.pending.push(event);
        self.created += 1;
        id
    }

    /// Removes the earliest pending event and moves the clock to its time.
    pub fn pop(&mut self) -> Option<Event> {
        let event = self.pending.pop()?;
        self.now = event.time;
        Some(event)
    }

    pub fn next_time(&self) -> Option<f64> {
        self.pending.peek().map(|e| e.time)
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    pub fn created(&self) -> u64 {
        self.created
    }
}
