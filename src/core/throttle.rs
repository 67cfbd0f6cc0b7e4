//! Single-slot event throttle.
//!
//! Every `trigger` with a delay replaces the pending action. A fired timer
//! only yields the action it was armed for if no newer trigger happened in
//! between, so a burst of brush or zoom events collapses into the last one.

/// Identity of one armed trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ThrottleToken(u64);

/// Outcome of `EventThrottle::trigger`.
#[derive(Debug)]
pub enum Triggered<A> {
    /// No delay was requested; the caller runs the action now.
    RunNow(A),
    /// Caller must schedule `fire(token)` after `delay_ms`.
    Scheduled { token: ThrottleToken, delay_ms: u64 },
}

#[derive(Debug)]
pub struct EventThrottle<A> {
    current: Option<(ThrottleToken, A)>,
    next_token: u64,
}

impl<A> Default for EventThrottle<A> {
    fn default() -> Self {
        Self {
            current: None,
            next_token: 0,
        }
    }
}

impl<A> EventThrottle<A> {
    pub fn trigger(&mut self, action: A, delay_ms: Option<u64>) -> Triggered<A> {
        let Some(delay_ms) = delay_ms.filter(|delay| *delay > 0) else {
            return Triggered::RunNow(action);
        };
        let token = ThrottleToken(self.next_token);
        self.next_token += 1;
        self.current = Some((token, action));
        Triggered::Scheduled { token, delay_ms }
    }

    /// Releases the pending action if `token` is still the latest trigger.
    pub fn fire(&mut self, token: ThrottleToken) -> Option<A> {
        match &self.current {
            Some((current, _)) if *current == token => {
                self.current.take().map(|(_, action)| action)
            }
            _ => None,
        }
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.current.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::{EventThrottle, Triggered};
    use crate::core::Timeline;

    #[test]
    fn no_delay_runs_immediately_without_touching_the_slot() {
        let mut throttle = EventThrottle::default();
        assert!(matches!(throttle.trigger(7, None), Triggered::RunNow(7)));
        assert!(matches!(throttle.trigger(8, Some(0)), Triggered::RunNow(8)));
        assert!(!throttle.is_pending());
    }

    #[test]
    fn only_the_last_trigger_in_a_window_fires() {
        let mut throttle = EventThrottle::default();
        let mut timeline = Timeline::default();
        for action in 1..=5 {
            if let Triggered::Scheduled { token, delay_ms } = throttle.trigger(action, Some(40)) {
                timeline.schedule(delay_ms, token);
            }
            timeline.advance_by(5);
        }

        let fired: Vec<i32> = timeline
            .advance_by(100)
            .into_iter()
            .filter_map(|token| throttle.fire(token))
            .collect();
        assert_eq!(fired, vec![5]);
    }

    #[test]
    fn shorter_later_delay_does_not_let_the_older_action_fire() {
        let mut throttle = EventThrottle::default();
        let mut timeline = Timeline::default();
        for (action, delay) in [("slow", 50), ("fast", 10)] {
            if let Triggered::Scheduled { token, delay_ms } = throttle.trigger(action, Some(delay)) {
                timeline.schedule(delay_ms, token);
            }
        }
        let fired: Vec<&str> = timeline
            .advance_by(100)
            .into_iter()
            .filter_map(|token| throttle.fire(token))
            .collect();
        assert_eq!(fired, vec!["fast"]);
    }
}
