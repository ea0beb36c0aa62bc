//! Timer queue for one-shot and repeating events.
//!
//! Timers carry a typed event instead of a closure. The owner drains due
//! timers with [`Scheduler::pop_due`] and dispatches on the event, so the
//! components that schedule work never hold callbacks into each other.
//!
//! Timers due at the same instant pop in event order (`E: Ord`), then in
//! scheduling order.

use std::collections::BTreeMap;

/// Opaque handle for cancelling a scheduled timer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TimerHandle(u64);

/// A timer that came due.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Fired<E> {
    pub handle: TimerHandle,
    pub event: E,
    /// Scheduled due time, which may be earlier than the `now` passed to
    /// [`Scheduler::pop_due`].
    pub at: u64,
}

#[derive(Debug)]
pub struct Scheduler<E> {
    /// (due_at, event, id) -> repeat interval.
    queue: BTreeMap<(u64, E, u64), Option<u64>>,
    next_id: u64,
}

impl<E: Ord + Copy> Scheduler<E> {
    pub fn new() -> Self {
        Self {
            queue: BTreeMap::new(),
            next_id: 0,
        }
    }

    fn insert(&mut self, due_at: u64, event: E, every: Option<u64>) -> TimerHandle {
        let id = self.next_id;
        self.next_id += 1;
        self.queue.insert((due_at, event, id), every);
        TimerHandle(id)
    }

    pub fn schedule_once(&mut self, now: u64, delay_ms: u64, event: E) -> TimerHandle {
        self.insert(now.saturating_add(delay_ms), event, None)
    }

    /// First fire is one interval after `now`. A zero interval is treated as 1ms.
    pub fn schedule_repeating(&mut self, now: u64, interval_ms: u64, event: E) -> TimerHandle {
        let every = interval_ms.max(1);
        self.insert(now.saturating_add(every), event, Some(every))
    }

    /// Returns true if the timer was still pending.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        let before = self.queue.len();
        self.queue.retain(|&(_, _, id), _| id != handle.0);
        self.queue.len() != before
    }

    pub fn is_pending(&self, handle: TimerHandle) -> bool {
        self.queue.keys().any(|&(_, _, id)| id == handle.0)
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Pops the earliest timer due at or before `now`. Repeating timers are
    /// re-armed one interval after their due time, keeping their handle.
    pub fn pop_due(&mut self, now: u64) -> Option<Fired<E>> {
        let (&key, _) = self.queue.iter().next()?;
        let (due_at, event, id) = key;
        if due_at > now {
            return None;
        }
        let every = self.queue.remove(&key).flatten();
        if let Some(every) = every {
            self.queue
                .insert((due_at.saturating_add(every), event, id), Some(every));
        }
        Some(Fired {
            handle: TimerHandle(id),
            event,
            at: due_at,
        })
    }
}

impl<E: Ord + Copy> Default for Scheduler<E> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
    enum Ev {
        First,
        Second,
    }

    #[test]
    fn once_fires_exactly_once() {
        let mut s = Scheduler::new();
        let h = s.schedule_once(0, 100, Ev::First);
        assert!(s.pop_due(99).is_none());
        let f = s.pop_due(100).unwrap();
        assert_eq!(f.handle, h);
        assert_eq!(f.at, 100);
        assert!(s.pop_due(10_000).is_none());
        assert!(!s.is_pending(h));
    }

    #[test]
    fn repeating_catches_up_in_order() {
        let mut s = Scheduler::new();
        s.schedule_repeating(0, 10, Ev::First);
        let mut times = Vec::new();
        while let Some(f) = s.pop_due(35) {
            times.push(f.at);
        }
        assert_eq!(times, vec![10, 20, 30]);
        assert_eq!(s.len(), 1);
    }

    #[test]
    fn same_instant_pops_in_event_order() {
        let mut s = Scheduler::new();
        s.schedule_once(0, 50, Ev::Second);
        s.schedule_repeating(0, 50, Ev::First);
        assert_eq!(s.pop_due(50).unwrap().event, Ev::First);
        assert_eq!(s.pop_due(50).unwrap().event, Ev::Second);
    }

    #[test]
    fn cancel_removes_pending_timer() {
        let mut s = Scheduler::new();
        let a = s.schedule_once(0, 10, Ev::First);
        let b = s.schedule_repeating(0, 10, Ev::Second);
        assert!(s.cancel(a));
        assert!(!s.cancel(a));
        assert_eq!(s.pop_due(10).unwrap().handle, b);
        assert!(s.cancel(b));
        assert!(s.is_empty());
    }
}
