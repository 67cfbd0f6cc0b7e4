use linked_charts::core::{EventThrottle, ThrottleToken, Timeline, Triggered};
use proptest::prelude::*;

fn arm(
    throttle: &mut EventThrottle<usize>,
    timeline: &mut Timeline<ThrottleToken>,
    action: usize,
    delay_ms: u64,
) {
    if let Triggered::Scheduled { token, delay_ms } = throttle.trigger(action, Some(delay_ms)) {
        timeline.schedule(delay_ms, token);
    }
}

proptest! {
    #[test]
    fn burst_collapses_into_last_trigger_property(
        delay_ms in 1u64..200,
        gaps in proptest::collection::vec(0u64..200, 1..20)
    ) {
        let mut throttle = EventThrottle::default();
        let mut timeline = Timeline::default();
        let mut fired = Vec::new();

        for (action, gap) in gaps.iter().enumerate() {
            arm(&mut throttle, &mut timeline, action, delay_ms);
            let gap = (*gap).min(delay_ms - 1);
            fired.extend(
                timeline
                    .advance_by(gap)
                    .into_iter()
                    .filter_map(|token| throttle.fire(token)),
            );
        }
        fired.extend(
            timeline
                .advance_by(delay_ms)
                .into_iter()
                .filter_map(|token| throttle.fire(token)),
        );

        prop_assert_eq!(fired, vec![gaps.len() - 1]);
        prop_assert!(!throttle.is_pending());
    }

    #[test]
    fn spaced_triggers_each_fire_property(
        delay_ms in 1u64..100,
        count in 1usize..10
    ) {
        let mut throttle = EventThrottle::default();
        let mut timeline = Timeline::default();
        let mut fired = Vec::new();

        for action in 0..count {
            arm(&mut throttle, &mut timeline, action, delay_ms);
            fired.extend(
                timeline
                    .advance_by(delay_ms)
                    .into_iter()
                    .filter_map(|token| throttle.fire(token)),
            );
        }

        prop_assert_eq!(fired, (0..count).collect::<Vec<_>>());
    }

    #[test]
    fn zero_delay_never_arms_property(action in any::<u32>()) {
        let mut throttle = EventThrottle::default();
        let ran_now = matches!(throttle.trigger(action, Some(0)), Triggered::RunNow(value) if value == action);
        prop_assert!(ran_now);
        prop_assert!(!throttle.is_pending());
    }
}
