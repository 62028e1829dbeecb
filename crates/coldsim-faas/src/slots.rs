//! Function slots: per-function status, the idle queue and the admission/eviction policy.

use std::collections::VecDeque;

use serde::Serialize;

/// Memory status of a function.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum SlotStatus {
    /// Function is not loaded, an invocation requires a cold start.
    Unloaded,
    /// Function is loaded but does not execute anything, it can be evicted.
    Idle,
    /// Function is cold starting or serving a request.
    Executing,
}

/// Why an arriving request was lost.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum RejectReason {
    /// The target function is already executing another request.
    AlreadyRunning,
    /// The target function is not loaded and all slots are executing.
    MemoryFull,
}

/// Outcome of the admission decision for an arriving request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Admission {
    /// Function was idle, the request is served immediately.
    Warm,
    /// Function gets loaded, possibly evicting the longest idle function.
    Cold { evicted: Option<usize> },
    Rejected(RejectReason),
}

/// FIFO queue of idle functions.
///
/// The head is the function that has been idle the longest. Removal of an arbitrary function is lazy: the
/// queue entry stays in place and is skipped later, since every entry carries the stamp it was pushed with
/// and only the entry matching the current stamp of its function is live.
#[derive(Clone, Debug)]
pub struct IdleQueue {
    entries: VecDeque<(usize, u64)>,
    stamps: Vec<Option<u64>>,
    next_stamp: u64,
    len: usize,
}

impl IdleQueue {
    pub fn new(function_count: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            stamps: vec![None; function_count],
            next_stamp: 0,
            len: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn contains(&self, id: usize) -> bool {
        self.stamps[id].is_some()
    }

    /// Appends function to the tail of the queue.
    ///
    /// Panics if the function is already in the queue.
    pub fn push_back(&mut self, id: usize) {
        assert!(
            self.stamps[id].is_none(),
            "function {} is already in the idle queue",
            id
        );
        let stamp = self.next_stamp;
        self.next_stamp += 1;
        self.stamps[id] = Some(stamp);
        self.entries.push_back((id, stamp));
        self.len += 1;
    }

    /// Removes and returns the function at the head of the queue.
    pub fn pop_front(&mut self) -> Option<usize> {
        self.skip_stale();
        let (id, _) = self.entries.pop_front()?;
        self.stamps[id] = None;
        self.len -= 1;
        Some(id)
    }

    /// Returns the function at the head of the queue without removing it.
    pub fn front(&mut self) -> Option<usize> {
        self.skip_stale();
        self.entries.front().map(|(id, _)| *id)
    }

    /// Removes function from the queue if it is there, returns whether it was removed.
    pub fn remove(&mut self, id: usize) -> bool {
        if self.stamps[id].take().is_none() {
            return false;
        }
        self.len -= 1;
        self.skip_stale();
        if self.entries.len() > 2 * self.len + 64 {
            let stamps = &self.stamps;
            self.entries.retain(|(id, stamp)| stamps[*id] == Some(*stamp));
        }
        true
    }

    /// Returns live queue entries from head to tail.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.entries
            .iter()
            .filter(|(id, stamp)| self.stamps[*id] == Some(*stamp))
            .map(|(id, _)| *id)
    }

    fn skip_stale(&mut self) {
        while let Some(&(id, stamp)) = self.entries.front() {
            if self.stamps[id] == Some(stamp) {
                break;
            }
            self.entries.pop_front();
        }
    }
}

/// Status table of all functions together with the idle queue.
///
/// At most `capacity` functions are loaded (idle or executing) at any time. All transitions are synchronous,
/// a decision reads and updates the table within a single call.
#[derive(Clone, Debug)]
pub struct SlotTable {
    capacity: usize,
    status: Vec<SlotStatus>,
    idle: IdleQueue,
    loaded: usize,
    executing: usize,
}

impl SlotTable {
    /// Creates a table where every function is unloaded.
    pub fn new(function_count: usize, capacity: usize) -> Self {
        assert!(
            capacity >= 1 && capacity <= function_count,
            "capacity {} is out of range [1, {}]",
            capacity,
            function_count
        );
        Self {
            capacity,
            status: vec![SlotStatus::Unloaded; function_count],
            idle: IdleQueue::new(function_count),
            loaded: 0,
            executing: 0,
        }
    }

    /// Creates a table where functions `0..capacity` are loaded and idle, queued in id order.
    pub fn with_warm_start(function_count: usize, capacity: usize) -> Self {
        let mut table = Self::new(function_count, capacity);
        for id in 0..capacity {
            table.status[id] = SlotStatus::Idle;
            table.idle.push_back(id);
        }
        table.loaded = capacity;
        table
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn function_count(&self) -> usize {
        self.status.len()
    }

    pub fn status(&self, id: usize) -> SlotStatus {
        self.status[id]
    }

    pub fn executing_count(&self) -> usize {
        self.executing
    }

    pub fn loaded_count(&self) -> usize {
        self.loaded
    }

    pub fn idle_count(&self) -> usize {
        self.idle.len()
    }

    /// Idle functions from the longest idle to the most recently idle.
    pub fn idle_order(&self) -> Vec<usize> {
        self.idle.iter().collect()
    }

    /// Decides the fate of a request for function `id` and applies the resulting transition.
    ///
    /// - executing function: rejected as already running, nothing changes;
    /// - idle function: leaves the idle queue and starts executing;
    /// - unloaded function: rejected if all slots are executing, otherwise loaded into a free slot or into
    ///   the slot of the evicted head of the idle queue.
    pub fn admit(&mut self, id: usize) -> Admission {
        match self.status[id] {
            SlotStatus::Executing => Admission::Rejected(RejectReason::AlreadyRunning),
            SlotStatus::Idle => {
                let removed = self.idle.remove(id);
                assert!(removed, "idle function {} is missing from the idle queue", id);
                self.start_executing(id);
                Admission::Warm
            }
            SlotStatus::Unloaded => {
                if self.executing == self.capacity {
                    return Admission::Rejected(RejectReason::MemoryFull);
                }
                let evicted = if self.loaded == self.capacity {
                    let executing = self.executing;
                    let victim = self.idle.pop_front().unwrap_or_else(|| {
                        panic!("no idle function to evict while {} of {} slots execute", executing, self.capacity)
                    });
                    assert_eq!(self.status[victim], SlotStatus::Idle, "evicted function {} is not idle", victim);
                    self.status[victim] = SlotStatus::Unloaded;
                    self.loaded -= 1;
                    Some(victim)
                } else {
                    None
                };
                self.loaded += 1;
                self.start_executing(id);
                Admission::Cold { evicted }
            }
        }
    }

    /// Prepares an admitted function for serving: makes sure it is not in the idle queue.
    ///
    /// The function normally leaves the queue on admission already, so this is a no-op then.
    pub fn begin_service(&mut self, id: usize) {
        assert_eq!(
            self.status[id],
            SlotStatus::Executing,
            "function {} starts serving without being admitted",
            id
        );
        self.idle.remove(id);
    }

    /// Returns a function that finished serving to the tail of the idle queue.
    pub fn complete(&mut self, id: usize) {
        assert_eq!(
            self.status[id],
            SlotStatus::Executing,
            "function {} completes a request it does not execute",
            id
        );
        self.status[id] = SlotStatus::Idle;
        self.executing -= 1;
        self.idle.push_back(id);
    }

    /// Verifies the table consistency, panics on violation.
    pub fn check_invariants(&self) {
        let executing = self.status.iter().filter(|s| **s == SlotStatus::Executing).count();
        let idle = self.status.iter().filter(|s| **s == SlotStatus::Idle).count();
        assert_eq!(executing, self.executing, "executing counter is out of sync");
        assert!(
            executing <= self.capacity,
            "{} functions execute with capacity {}",
            executing,
            self.capacity
        );
        assert_eq!(executing + idle, self.loaded, "loaded counter is out of sync");
        assert!(self.loaded <= self.capacity, "{} functions loaded with capacity {}", self.loaded, self.capacity);
        let mut seen = vec![false; self.status.len()];
        let mut queued = 0;
        for id in self.idle.iter() {
            assert!(!seen[id], "function {} is queued twice", id);
            seen[id] = true;
            assert_eq!(self.status[id], SlotStatus::Idle, "queued function {} is not idle", id);
            queued += 1;
        }
        assert_eq!(queued, idle, "idle queue does not match idle functions");
        assert_eq!(queued, self.idle.len(), "idle queue length is out of sync");
    }

    fn start_executing(&mut self, id: usize) {
        self.status[id] = SlotStatus::Executing;
        self.executing += 1;
        assert!(
            self.executing <= self.capacity,
            "{} functions execute with capacity {}",
            self.executing,
            self.capacity
        );
    }
}
