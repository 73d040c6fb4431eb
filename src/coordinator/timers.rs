use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::time::Duration;

use crate::elevator::CancelToken;
use crate::shared::Phase;

/// A deferred continuation of the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timer {
    /// Advance car `car` out of `phase`, if it still holds `token`.
    Phase {
        car: usize,
        phase: Phase,
        token: CancelToken,
    },
    /// Retry the request queue.
    Drain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Scheduled {
    deadline: Duration,
    seq: u64,
    timer: Timer,
}

impl Ord for Scheduled {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.deadline, self.seq).cmp(&(other.deadline, other.seq))
    }
}

impl PartialOrd for Scheduled {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Min-heap of timers on the simulation timeline. Timers with the same
/// deadline fire in the order they were scheduled.
#[derive(Debug, Default)]
pub struct TimerQueue {
    heap: BinaryHeap<Reverse<Scheduled>>,
    next_seq: u64,
}

impl TimerQueue {
    pub fn new() -> TimerQueue {
        TimerQueue::default()
    }

    pub fn schedule(&mut self, deadline: Duration, timer: Timer) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Reverse(Scheduled {
            deadline,
            seq,
            timer,
        }));
    }

    /// Pops the earliest timer if it is due at `now`.
    pub fn pop_due(&mut self, now: Duration) -> Option<(Duration, Timer)> {
        match self.heap.peek() {
            Some(Reverse(next)) if next.deadline <= now => {
                let Reverse(scheduled) = self.heap.pop()?;
                Some((scheduled.deadline, scheduled.timer))
            }
            _ => None,
        }
    }

    pub fn next_deadline(&self) -> Option<Duration> {
        self.heap.peek().map(|Reverse(next)| next.deadline)
    }

    /// Cancels every car continuation. Returns how many were removed.
    pub fn cancel_phase_timers(&mut self) -> usize {
        let before = self.heap.len();
        self.heap
            .retain(|Reverse(scheduled)| !matches!(scheduled.timer, Timer::Phase { .. }));
        before - self.heap.len()
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}
