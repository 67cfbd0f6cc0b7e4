//! Deterministic virtual clock used for delayed work.
//!
//! The host advances time explicitly (once per animation frame, or by the
//! elapsed wall-clock time); tests advance it by exact amounts.

use std::collections::BTreeMap;

/// Opaque handle of a scheduled task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerId(u64);

#[derive(Debug)]
pub struct Timeline<T> {
    now_ms: u64,
    next_sequence: u64,
    // (due, sequence) keeps same-instant tasks in scheduling order.
    pending: BTreeMap<(u64, u64), T>,
}

impl<T> Default for Timeline<T> {
    fn default() -> Self {
        Self {
            now_ms: 0,
            next_sequence: 0,
            pending: BTreeMap::new(),
        }
    }
}

impl<T> Timeline<T> {
    #[must_use]
    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn schedule(&mut self, delay_ms: u64, task: T) -> TimerId {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.pending
            .insert((self.now_ms.saturating_add(delay_ms), sequence), task);
        TimerId(sequence)
    }

    pub fn cancel(&mut self, id: TimerId) -> Option<T> {
        let key = self
            .pending
            .keys()
            .find(|(_, sequence)| *sequence == id.0)
            .copied()?;
        self.pending.remove(&key)
    }

    /// Pops the earliest task due at or before `until_ms`, moving the clock
    /// to its due time.
    pub fn pop_due(&mut self, until_ms: u64) -> Option<T> {
        let (&(due, sequence), _) = self.pending.first_key_value()?;
        if due > until_ms {
            return None;
        }
        self.now_ms = self.now_ms.max(due);
        self.pending.remove(&(due, sequence))
    }

    /// Moves the clock to `until_ms` after all due tasks were popped.
    pub fn settle(&mut self, until_ms: u64) {
        self.now_ms = self.now_ms.max(until_ms);
    }

    /// Advances by `delta_ms` and returns every task that came due, in order.
    ///
    /// Callers that may schedule new work while handling a task should use
    /// `pop_due` in a loop instead so follow-up tasks inside the window run too.
    pub fn advance_by(&mut self, delta_ms: u64) -> Vec<T> {
        let until = self.now_ms.saturating_add(delta_ms);
        let mut due = Vec::new();
        while let Some(task) = self.pop_due(until) {
            due.push(task);
        }
        self.settle(until);
        due
    }
}

#[cfg(test)]
mod tests {
    use super::Timeline;

    #[test]
    fn tasks_fire_in_due_then_schedule_order() {
        let mut timeline = Timeline::default();
        timeline.schedule(20, "late");
        timeline.schedule(10, "first");
        timeline.schedule(10, "second");

        assert_eq!(timeline.advance_by(5), Vec::<&str>::new());
        assert_eq!(timeline.advance_by(10), vec!["first", "second"]);
        assert_eq!(timeline.now_ms(), 15);
        assert_eq!(timeline.advance_by(100), vec!["late"]);
        assert_eq!(timeline.pending_count(), 0);
    }

    #[test]
    fn cancelled_tasks_never_fire() {
        let mut timeline = Timeline::default();
        let id = timeline.schedule(10, 1);
        timeline.schedule(10, 2);
        assert_eq!(timeline.cancel(id), Some(1));
        assert_eq!(timeline.advance_by(10), vec![2]);
    }
}
