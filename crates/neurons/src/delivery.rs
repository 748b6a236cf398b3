//! Per-presynaptic-neuron delayed-delivery queue: a monotonic min-heap
//! keyed by deadline, private to the owning neuron's event loop thread.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::time::{Duration, Instant};

use neuro_types::NeuralSignal;

/// One pending delivery: a signal due at `target_id`'s input queue once
/// `deadline` elapses. `sequence` breaks ties in insertion order, since two
/// deliveries can legitimately share a deadline.
#[derive(Debug, Clone)]
pub struct DeliveryEntry {
    pub deadline: Instant,
    pub sequence: u64,
    pub target_id: String,
    pub signal: NeuralSignal,
}

impl PartialEq for DeliveryEntry {
    fn eq(&self, other: &Self) -> bool {
        self.deadline == other.deadline && self.sequence == other.sequence
    }
}

impl Eq for DeliveryEntry {}

impl PartialOrd for DeliveryEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for DeliveryEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.deadline.cmp(&other.deadline).then(self.sequence.cmp(&other.sequence))
    }
}

/// Wraps a `BinaryHeap<Reverse<DeliveryEntry>>` so the earliest deadline is
/// always the next to pop, with O(log n) scheduling.
#[derive(Default)]
pub struct DeliveryScheduler {
    heap: BinaryHeap<Reverse<DeliveryEntry>>,
    next_sequence: u64,
}

impl DeliveryScheduler {
    pub fn new() -> Self {
        Self { heap: BinaryHeap::new(), next_sequence: 0 }
    }

    pub fn schedule(&mut self, target_id: impl Into<String>, signal: NeuralSignal, delay: Duration) {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.heap.push(Reverse(DeliveryEntry {
            deadline: Instant::now() + delay,
            sequence,
            target_id: target_id.into(),
            signal,
        }));
    }

    pub fn peek_deadline(&self) -> Option<Instant> {
        self.heap.peek().map(|Reverse(entry)| entry.deadline)
    }

    /// Pops and returns every entry whose deadline has elapsed as of `now`,
    /// in deadline (then insertion) order.
    pub fn drain_due(&mut self, now: Instant) -> Vec<DeliveryEntry> {
        let mut due = Vec::new();
        while let Some(Reverse(entry)) = self.heap.peek() {
            if entry.deadline > now {
                break;
            }
            let Reverse(entry) = self.heap.pop().expect("just peeked");
            due.push(entry);
        }
        due
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Discards every pending entry without delivering it (used on close).
    pub fn clear(&mut self) {
        self.heap.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entries_pop_in_deadline_order_regardless_of_insertion_order() {
        let mut scheduler = DeliveryScheduler::new();
        scheduler.schedule("b", NeuralSignal::new(1.0, "x", "b"), Duration::from_millis(20));
        scheduler.schedule("a", NeuralSignal::new(1.0, "x", "a"), Duration::from_millis(5));

        std::thread::sleep(Duration::from_millis(25));
        let due = scheduler.drain_due(Instant::now());
        assert_eq!(due.len(), 2);
        assert_eq!(due[0].target_id, "a");
        assert_eq!(due[1].target_id, "b");
    }

    #[test]
    fn ties_break_by_insertion_order() {
        let mut scheduler = DeliveryScheduler::new();
        let deadline_delay = Duration::from_millis(5);
        scheduler.schedule("first", NeuralSignal::new(1.0, "x", "first"), deadline_delay);
        scheduler.schedule("second", NeuralSignal::new(1.0, "x", "second"), deadline_delay);

        std::thread::sleep(Duration::from_millis(10));
        let due = scheduler.drain_due(Instant::now());
        assert_eq!(due[0].target_id, "first");
        assert_eq!(due[1].target_id, "second");
    }

    #[test]
    fn clear_discards_everything() {
        let mut scheduler = DeliveryScheduler::new();
        scheduler.schedule("a", NeuralSignal::new(1.0, "x", "a"), Duration::from_millis(5));
        scheduler.clear();
        assert!(scheduler.is_empty());
    }
}
