//! "Run later" scheduling for the event thread
//!
//! The only primitive is [`Scheduler::schedule`]; there is no cancel. Every
//! wake-up carries the generation it was armed under, and the receiver drops
//! wake-ups whose generation is stale.

use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::time::{Duration, Instant};

/// A deferred callback delivered back to the event thread
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Wake {
    /// Next one-second countdown step
    Tick { generation: u64 },
    /// Next opacity step of the phase transition flash
    Fade { generation: u64 },
}

pub trait Scheduler {
    /// Deliver `wake` once `delay` has elapsed
    fn schedule(&mut self, delay: Duration, wake: Wake);
}

/// Deadline-ordered wake-up queue driven by an explicit clock
///
/// The owner advances the clock with [`TimerQueue::advance_to`] and drains
/// due entries with [`TimerQueue::pop_due`]. Entries with equal deadlines
/// come out in the order they were scheduled.
#[derive(Debug)]
pub struct TimerQueue {
    now: Instant,
    seq: u64,
    heap: BinaryHeap<Reverse<(Instant, u64, Wake)>>,
}

impl TimerQueue {
    pub fn new(now: Instant) -> Self {
        Self {
            now,
            seq: 0,
            heap: BinaryHeap::new(),
        }
    }

    pub fn now(&self) -> Instant {
        self.now
    }

    /// Move the clock forward. The clock never runs backwards.
    pub fn advance_to(&mut self, now: Instant) {
        if now > self.now {
            self.now = now;
        }
    }

    pub fn advance_by(&mut self, delta: Duration) {
        self.now += delta;
    }

    /// Remove and return the earliest entry whose deadline has passed
    pub fn pop_due(&mut self) -> Option<Wake> {
        match self.heap.peek() {
            Some(Reverse((deadline, _, _))) if *deadline <= self.now => {
                self.heap.pop().map(|Reverse((_, _, wake))| wake)
            }
            _ => None,
        }
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.heap.peek().map(|Reverse((deadline, _, _))| *deadline)
    }

    /// Time from the queue clock until the earliest entry is due
    pub fn time_until_next(&self) -> Option<Duration> {
        self.next_deadline()
            .map(|deadline| deadline.saturating_duration_since(self.now))
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

impl Scheduler for TimerQueue {
    fn schedule(&mut self, delay: Duration, wake: Wake) {
        let deadline = self.now + delay;
        self.seq += 1;
        self.heap.push(Reverse((deadline, self.seq, wake)));
    }
}
