use fnv::FnvHashSet;
use instant::Instant;
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::time::Duration;

/// Cancellation handle for a scheduled task.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TaskHandle(u64);

struct Scheduled<T> {
    due: Instant,
    seq: u64,
    task: T,
}

impl<T> PartialEq for Scheduled<T> {
    fn eq(&self, other: &Self) -> bool {
        self.due == other.due && self.seq == other.seq
    }
}

impl<T> Eq for Scheduled<T> {}

impl<T> PartialOrd for Scheduled<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Scheduled<T> {
    // Reversed so the max-heap pops the earliest (due, seq) first.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .due
            .cmp(&self.due)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Deadline-ordered task queue. Tasks due at the same instant run in the
/// order they were scheduled.
pub struct Timeline<T> {
    heap: BinaryHeap<Scheduled<T>>,
    pending: FnvHashSet<u64>,
    next_seq: u64,
}

impl<T> Default for Timeline<T> {
    fn default() -> Self {
        Self {
            heap: BinaryHeap::new(),
            pending: FnvHashSet::default(),
            next_seq: 0,
        }
    }
}

impl<T> Timeline<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn schedule(&mut self, due: Instant, task: T) -> TaskHandle {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.pending.insert(seq);
        self.heap.push(Scheduled { due, seq, task });
        TaskHandle(seq)
    }

    /// Returns true if the task was still pending.
    pub fn cancel(&mut self, handle: TaskHandle) -> bool {
        self.pending.remove(&handle.0)
    }

    /// Pop the earliest task due at or before `now`, with its due instant.
    pub fn pop_due(&mut self, now: Instant) -> Option<(Instant, T)> {
        loop {
            if self.heap.peek()?.due > now {
                return None;
            }
            let entry = self.heap.pop()?;
            if self.pending.remove(&entry.seq) {
                return Some((entry.due, entry.task));
            }
        }
    }

    /// Deadline of the earliest live task.
    pub fn next_due(&mut self) -> Option<Instant> {
        while let Some(top) = self.heap.peek() {
            if self.pending.contains(&top.seq) {
                return Some(top.due);
            }
            self.heap.pop();
        }
        None
    }

    /// Remove every live task, earliest first.
    pub fn drain(&mut self) -> Vec<T> {
        let mut out = Vec::with_capacity(self.pending.len());
        while let Some(entry) = self.heap.pop() {
            if self.pending.remove(&entry.seq) {
                out.push(entry.task);
            }
        }
        out
    }
}

/// `later - earlier`, or zero when the clock appears to run backwards.
#[inline]
pub fn elapsed_between(earlier: Instant, later: Instant) -> Duration {
    if later > earlier {
        later - earlier
    } else {
        Duration::ZERO
    }
}
