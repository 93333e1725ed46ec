//! Append-only event buffer shared between the platform delivery thread and
//! the host thread.
//!
//! `flush` is the linearization point: a `push` that takes the lock before the
//! swap lands in the returned batch, one that takes it after lands in the next
//! batch. The lock is only ever held for a single push or a single swap.

use std::mem;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

pub struct EventBuffer<T> {
    events: Mutex<Vec<T>>,
    capacity: usize,
    total: AtomicU64,
}

impl<T> EventBuffer<T> {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// `capacity` is reserved again after every flush
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            events: Mutex::new(Vec::with_capacity(capacity)),
            capacity,
            total: AtomicU64::new(0),
        }
    }

    // A Vec push or swap cannot leave the contents half-written, so a
    // poisoned lock still guards consistent data.
    fn events(&self) -> MutexGuard<'_, Vec<T>> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn push(&self, event: T) {
        self.events().push(event);
        self.total.fetch_add(1, Ordering::Relaxed);
    }

    /// Swap in an empty buffer and hand back everything appended since the
    /// previous flush, in delivery order.
    pub fn flush(&self) -> Vec<T> {
        let fresh = Vec::with_capacity(self.capacity);
        mem::replace(&mut *self.events(), fresh)
    }

    pub fn len(&self) -> usize {
        self.events().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Events appended over the buffer's lifetime, flushed or not
    pub fn total_appended(&self) -> u64 {
        self.total.load(Ordering::Relaxed)
    }
}

impl<T: Clone> EventBuffer<T> {
    /// Copy of the pending events without clearing them
    pub fn snapshot(&self) -> Vec<T> {
        self.events().clone()
    }
}

impl<T> Default for EventBuffer<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flush_returns_in_order_and_empties() {
        let buffer = EventBuffer::new();
        buffer.push(1);
        buffer.push(2);
        buffer.push(3);

        assert_eq!(buffer.flush(), vec![1, 2, 3]);
        assert!(buffer.is_empty());
        assert!(buffer.flush().is_empty());
    }

    #[test]
    fn test_flushed_events_never_reappear() {
        let buffer = EventBuffer::with_capacity(4);
        buffer.push("a");
        let _ = buffer.flush();
        buffer.push("b");

        assert_eq!(buffer.snapshot(), vec!["b"]);
        assert_eq!(buffer.flush(), vec!["b"]);
        assert_eq!(buffer.total_appended(), 2);
    }

    #[test]
    fn test_snapshot_keeps_contents() {
        let buffer = EventBuffer::new();
        buffer.push(10);
        let snap = buffer.snapshot();
        let _ = buffer.flush();

        assert_eq!(snap, vec![10]);
        assert_eq!(buffer.len(), 0);
    }

    #[test]
    fn test_concurrent_push_and_flush_loses_nothing() {
        const PER_PRODUCER: u64 = 5_000;
        let buffer = EventBuffer::new();
        let mut drained: Vec<(u64, u64)> = Vec::new();

        crossbeam::thread::scope(|s| {
            for producer in 0..2u64 {
                let buffer = &buffer;
                s.spawn(move |_| {
                    for i in 0..PER_PRODUCER {
                        buffer.push((producer, i));
                    }
                });
            }

            while buffer.total_appended() < 2 * PER_PRODUCER {
                drained.extend(buffer.flush());
            }
        })
        .unwrap();
        drained.extend(buffer.flush());

        assert_eq!(drained.len() as u64, 2 * PER_PRODUCER);
        for producer in 0..2u64 {
            let seq: Vec<u64> = drained
                .iter()
                .filter(|(p, _)| *p == producer)
                .map(|(_, i)| *i)
                .collect();
            let expected: Vec<u64> = (0..PER_PRODUCER).collect();
            assert_eq!(seq, expected);
        }
    }
}
