use std::cmp::Ordering;
use std::collections::binary_heap::PeekMut;
use std::collections::BinaryHeap;
use std::time::Duration;

/// Identifies one scheduled payload so it can be cancelled.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TimerHandle(u64);

struct Entry<T> {
    deadline: Duration,
    seq: u64,
    payload: T,
}

impl<T> Entry<T> {
    fn key(&self) -> (Duration, u64) {
        (self.deadline, self.seq)
    }
}

impl<T> PartialEq for Entry<T> {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl<T> Eq for Entry<T> {}

impl<T> PartialOrd for Entry<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// Reversed so the max-heap pops the earliest deadline first.
impl<T> Ord for Entry<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        other.key().cmp(&self.key())
    }
}

/// One-shot timers on a virtual clock advanced by frame deltas.
///
/// Payloads come back from [`Scheduler::advance`] once their delay has
/// elapsed, earliest deadline first and in scheduling order on ties.
pub struct Scheduler<T> {
    inner: BinaryHeap<Entry<T>>,
    now: Duration,
    next_seq: u64,
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Self {
            inner: BinaryHeap::new(),
            now: Duration::ZERO,
            next_seq: 0,
        }
    }

    pub fn schedule(&mut self, delay: Duration, payload: T) -> TimerHandle {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.inner.push(Entry {
            deadline: self.now + delay,
            seq,
            payload,
        });
        TimerHandle(seq)
    }

    /// Drop a pending payload. Returns false if it already fired or was
    /// cancelled.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        let before = self.inner.len();
        self.inner.retain(|entry| entry.seq != handle.0);
        self.inner.len() != before
    }

    /// Move the clock forward and collect every payload now due.
    pub fn advance(&mut self, delta: Duration) -> Vec<T> {
        self.now += delta;
        let mut due = Vec::new();
        while let Some(entry) = self.inner.peek_mut() {
            if entry.deadline > self.now {
                break;
            }
            due.push(PeekMut::pop(entry).payload);
        }
        due
    }

    pub fn pending(&self) -> usize {
        self.inner.len()
    }

    pub fn clear(&mut self) {
        self.inner.clear();
    }
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}
