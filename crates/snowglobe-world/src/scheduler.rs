//! One-shot callbacks keyed to simulation time.
//!
//! The scheduler only stores and releases entries. Whoever drains it is
//! responsible for checking that each entry's target still exists before
//! acting on the payload.

use snowglobe_types::{CallbackId, EntityId};

/// A callback waiting to fire.
#[derive(Debug, Clone, PartialEq)]
pub struct Scheduled<T> {
    /// Handle for cancellation.
    pub id: CallbackId,
    /// Simulation time (seconds) at which the callback is due.
    pub due_at: f64,
    /// Entity the callback acts on.
    pub target: EntityId,
    /// What to do.
    pub payload: T,
}

/// Pending one-shot callbacks.
#[derive(Debug, Clone, PartialEq)]
pub struct Scheduler<T> {
    pending: Vec<Scheduled<T>>,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Scheduler<T> {
    /// Create an empty scheduler.
    pub const fn new() -> Self {
        Self {
            pending: Vec::new(),
        }
    }

    /// Schedule `payload` against `target`, due `delay` seconds after `now`.
    pub fn schedule(&mut self, now: f64, delay: f64, target: EntityId, payload: T) -> CallbackId {
        let id = CallbackId::new();
        self.pending.push(Scheduled {
            id,
            due_at: now + delay.max(0.0),
            target,
            payload,
        });
        id
    }

    /// Cancel one callback. Returns `false` if it already fired or never
    /// existed.
    pub fn cancel(&mut self, id: CallbackId) -> bool {
        let before = self.pending.len();
        self.pending.retain(|s| s.id != id);
        self.pending.len() != before
    }

    /// Cancel every callback aimed at `target`, returning how many were
    /// dropped.
    pub fn cancel_target(&mut self, target: EntityId) -> usize {
        let before = self.pending.len();
        self.pending.retain(|s| s.target != target);
        before.saturating_sub(self.pending.len())
    }

    /// Remove and return every callback due at or before `now`, earliest
    /// first. Callbacks due at the same time keep their scheduling order.
    pub fn take_due(&mut self, now: f64) -> Vec<Scheduled<T>> {
        let (mut due, rest): (Vec<_>, Vec<_>) =
            self.pending.drain(..).partition(|s| s.due_at <= now);
        self.pending = rest;
        due.sort_by(|a, b| a.due_at.total_cmp(&b.due_at));
        due
    }

    /// Number of pending callbacks.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Whether nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn releases_only_due_entries_in_time_order() {
        let mut sched = Scheduler::new();
        let target = EntityId::new();
        sched.schedule(0.0, 5.0, target, "late");
        sched.schedule(0.0, 2.0, target, "early");
        sched.schedule(0.0, 2.0, target, "early-second");

        assert!(sched.take_due(1.0).is_empty());
        let due: Vec<_> = sched.take_due(2.0).into_iter().map(|s| s.payload).collect();
        assert_eq!(due, vec!["early", "early-second"]);
        assert_eq!(sched.len(), 1);
        let rest: Vec<_> = sched.take_due(10.0).into_iter().map(|s| s.payload).collect();
        assert_eq!(rest, vec!["late"]);
        assert!(sched.is_empty());
    }

    #[test]
    fn cancellation() {
        let mut sched = Scheduler::new();
        let a = EntityId::new();
        let b = EntityId::new();
        let id = sched.schedule(0.0, 1.0, a, 1);
        sched.schedule(0.0, 1.0, b, 2);
        sched.schedule(0.0, 3.0, b, 3);
        assert!(sched.cancel(id));
        assert!(!sched.cancel(id));
        assert_eq!(sched.cancel_target(b), 2);
        assert!(sched.is_empty());
    }
}
