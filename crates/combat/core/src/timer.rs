//! Deadline timers owned by a single combat instance.
//!
//! Every suspension point in the combat core (lifetime expiry, flicker waits,
//! stun recovery, delayed beam growth) is a record in a [`TimerQueue`] keyed
//! by a small per-component enum. The owner drains due timers once per tick
//! and clears the queue on deactivation, so nothing scheduled for a pooled
//! instance can fire after it was returned.

/// A pending deadline.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Deadline<K> {
    due: f64,
    seq: u64,
    kind: K,
}

/// Ordered set of pending deadlines for one instance.
///
/// Due timers pop earliest-first; timers with the same deadline pop in the
/// order they were scheduled.
#[derive(Clone, Debug)]
pub struct TimerQueue<K> {
    pending: Vec<Deadline<K>>,
    next_seq: u64,
}

impl<K: Copy + PartialEq> TimerQueue<K> {
    pub fn new() -> Self {
        Self {
            pending: Vec::new(),
            next_seq: 0,
        }
    }

    /// Schedules `kind` to fire at `due` (seconds on the simulation clock).
    pub fn schedule(&mut self, due: f64, kind: K) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.pending.push(Deadline { due, seq, kind });
    }

    /// Replaces any pending timer of the same kind.
    pub fn reschedule(&mut self, due: f64, kind: K) {
        self.cancel(kind);
        self.schedule(due, kind);
    }

    /// Removes every pending timer of the given kind. Returns how many were removed.
    pub fn cancel(&mut self, kind: K) -> usize {
        let before = self.pending.len();
        self.pending.retain(|deadline| deadline.kind != kind);
        before - self.pending.len()
    }

    /// Drops every pending timer.
    pub fn clear(&mut self) {
        self.pending.clear();
    }

    pub fn is_pending(&self, kind: K) -> bool {
        self.pending.iter().any(|deadline| deadline.kind == kind)
    }

    /// Deadline of the pending timer of this kind, if any.
    pub fn due_at(&self, kind: K) -> Option<f64> {
        self.pending
            .iter()
            .filter(|deadline| deadline.kind == kind)
            .map(|deadline| deadline.due)
            .reduce(f64::min)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Removes and returns the earliest timer whose deadline is `<= now`.
    ///
    /// Returns the timer's kind together with its deadline so periodic
    /// timers can reschedule relative to the deadline rather than to `now`.
    pub fn pop_due(&mut self, now: f64) -> Option<(K, f64)> {
        let index = self
            .pending
            .iter()
            .enumerate()
            .filter(|(_, deadline)| deadline.due <= now)
            .min_by(|(_, a), (_, b)| a.due.total_cmp(&b.due).then(a.seq.cmp(&b.seq)))
            .map(|(index, _)| index)?;
        let deadline = self.pending.swap_remove(index);
        Some((deadline.kind, deadline.due))
    }
}

impl<K: Copy + PartialEq> Default for TimerQueue<K> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq)]
    enum Kind {
        A,
        B,
    }

    #[test]
    fn pops_in_deadline_then_schedule_order() {
        let mut timers = TimerQueue::new();
        timers.schedule(2.0, Kind::A);
        timers.schedule(1.0, Kind::B);
        timers.schedule(1.0, Kind::A);

        assert_eq!(timers.pop_due(0.5), None);
        assert_eq!(timers.pop_due(5.0), Some((Kind::B, 1.0)));
        assert_eq!(timers.pop_due(5.0), Some((Kind::A, 1.0)));
        assert_eq!(timers.pop_due(5.0), Some((Kind::A, 2.0)));
        assert!(timers.is_empty());
    }

    #[test]
    fn cancel_removes_only_matching_kind() {
        let mut timers = TimerQueue::new();
        timers.schedule(1.0, Kind::A);
        timers.schedule(1.0, Kind::B);

        assert_eq!(timers.cancel(Kind::A), 1);
        assert!(!timers.is_pending(Kind::A));
        assert_eq!(timers.due_at(Kind::B), Some(1.0));
    }

    #[test]
    fn reschedule_keeps_a_single_entry() {
        let mut timers = TimerQueue::new();
        timers.schedule(1.0, Kind::A);
        timers.reschedule(3.0, Kind::A);

        assert_eq!(timers.len(), 1);
        assert_eq!(timers.due_at(Kind::A), Some(3.0));
    }
}
