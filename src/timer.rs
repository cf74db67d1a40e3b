//! Cancellable delayed callbacks on an injected clock
//!
//! Timers never read the wall clock. The owner passes the current time (ms)
//! to `schedule` and `pop_due`; in the browser that is the animation-frame
//! timestamp, in tests any synthetic value.

use std::cell::Cell;
use std::rc::Rc;

/// Handle to a scheduled timer
///
/// Cancelling is idempotent and also works after the timer fired.
#[derive(Debug, Clone)]
pub struct TimerHandle {
    cancelled: Rc<Cell<bool>>,
}

impl TimerHandle {
    pub fn cancel(&self) {
        self.cancelled.set(true);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.get()
    }
}

struct Pending<T> {
    due: f64,
    order: u64,
    payload: T,
    cancelled: Rc<Cell<bool>>,
}

/// Queue of payloads that become due at a given time
pub struct Timers<T> {
    pending: Vec<Pending<T>>,
    next_order: u64,
}

impl<T> Default for Timers<T> {
    fn default() -> Self {
        Self {
            pending: Vec::new(),
            next_order: 0,
        }
    }
}

impl<T> Timers<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fire `payload` once `delay_ms` has elapsed after `now`
    pub fn schedule(&mut self, now: f64, delay_ms: f64, payload: T) -> TimerHandle {
        let cancelled = Rc::new(Cell::new(false));
        self.pending.push(Pending {
            due: now + delay_ms.max(0.0),
            order: self.next_order,
            payload,
            cancelled: cancelled.clone(),
        });
        self.next_order += 1;
        TimerHandle { cancelled }
    }

    /// Remove and return the earliest payload due at `now`
    ///
    /// Timers due at the same instant fire in scheduling order. Cancellation
    /// is checked on every call, so handling one payload may cancel the next
    /// one due in the same frame. Call in a loop until `None`.
    pub fn pop_due(&mut self, now: f64) -> Option<T> {
        self.pending.retain(|p| !p.cancelled.get());
        let index = self
            .pending
            .iter()
            .enumerate()
            .filter(|(_, p)| p.due <= now)
            .min_by(|(_, a), (_, b)| a.due.total_cmp(&b.due).then(a.order.cmp(&b.order)))
            .map(|(i, _)| i)?;
        Some(self.pending.swap_remove(index).payload)
    }

    /// Drop all pending timers
    pub fn clear(&mut self) {
        for p in self.pending.drain(..) {
            p.cancelled.set(true);
        }
    }

    /// Timers still waiting to fire
    pub fn len(&self) -> usize {
        self.pending.iter().filter(|p| !p.cancelled.get()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fire<T>(timers: &mut Timers<T>, now: f64) -> Vec<T> {
        std::iter::from_fn(|| timers.pop_due(now)).collect()
    }

    #[test]
    fn test_fires_when_due() {
        let mut timers = Timers::new();
        timers.schedule(0.0, 800.0, "2");
        assert!(fire(&mut timers, 799.9).is_empty());
        assert_eq!(fire(&mut timers, 800.0), vec!["2"]);
        assert!(fire(&mut timers, 5000.0).is_empty());
    }

    #[test]
    fn test_cancel_prevents_firing() {
        let mut timers = Timers::new();
        let handle = timers.schedule(0.0, 100.0, 1);
        timers.schedule(0.0, 200.0, 2);
        handle.cancel();
        assert!(handle.is_cancelled());
        assert_eq!(timers.len(), 1);
        assert_eq!(fire(&mut timers, 1000.0), vec![2]);
    }

    #[test]
    fn test_order_by_due_then_schedule() {
        let mut timers = Timers::new();
        timers.schedule(0.0, 300.0, 'c');
        timers.schedule(0.0, 100.0, 'a');
        timers.schedule(50.0, 50.0, 'b');
        assert_eq!(fire(&mut timers, 400.0), vec!['a', 'b', 'c']);
    }

    #[test]
    fn test_clear_cancels_handles() {
        let mut timers = Timers::new();
        let handle = timers.schedule(0.0, 10.0, ());
        timers.clear();
        assert!(timers.is_empty());
        assert!(handle.is_cancelled());
        assert!(fire(&mut timers, 100.0).is_empty());
    }

    #[test]
    fn test_cancel_while_handling_same_frame() {
        let mut timers = Timers::new();
        timers.schedule(0.0, 100.0, "resize");
        let stale = timers.schedule(0.0, 150.0, "tick");
        assert_eq!(timers.pop_due(200.0), Some("resize"));
        // Handling the first cue cancels the second before it is popped
        stale.cancel();
        assert_eq!(timers.pop_due(200.0), None);
        assert!(timers.is_empty());
    }

    #[test]
    fn test_negative_delay_fires_immediately() {
        let mut timers = Timers::new();
        timers.schedule(10.0, -5.0, 7);
        assert_eq!(fire(&mut timers, 10.0), vec![7]);
    }
}
