//! Lenient key arithmetic used by rounding, x-unit stepping and axis padding.
//!
//! Malformed steps degrade to a zero step (logged) instead of failing.

use chrono::Duration;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::core::Key;

/// Amount to move a key by.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Step {
    Absolute(f64),
    /// Percentage of the value being stepped.
    Percent(f64),
    /// Calendar days; applies to time keys, falls back to absolute otherwise.
    Days(i64),
}

impl Step {
    /// Parses `"10"`, `"2.5%"` or `"3d"`. Anything else reads as a zero step.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        let parsed = if let Some(percent) = trimmed.strip_suffix('%') {
            percent.trim().parse().ok().map(Step::Percent)
        } else if let Some(days) = trimmed.strip_suffix('d') {
            days.trim().parse().ok().map(Step::Days)
        } else {
            trimmed.parse().ok().map(Step::Absolute)
        };
        parsed.unwrap_or_else(|| {
            warn!(step = raw, "unparseable step, treating as zero");
            Step::Absolute(0.0)
        })
    }

    fn resolve(self, base: f64) -> f64 {
        let amount = match self {
            Self::Absolute(amount) => amount,
            Self::Percent(percent) => base.abs() * percent / 100.0,
            Self::Days(days) => days as f64,
        };
        if amount.is_finite() { amount } else { 0.0 }
    }
}

impl From<f64> for Step {
    fn from(amount: f64) -> Self {
        Step::Absolute(amount)
    }
}

/// `key + step`. Text and composite keys are returned unchanged.
#[must_use]
pub fn add(key: &Key, step: impl Into<Step>) -> Key {
    shift(key, step.into(), 1.0)
}

/// `key - step`. Text and composite keys are returned unchanged.
#[must_use]
pub fn subtract(key: &Key, step: impl Into<Step>) -> Key {
    shift(key, step.into(), -1.0)
}

fn shift(key: &Key, step: Step, sign: f64) -> Key {
    match key {
        Key::Number(value) => Key::number(value.0 + sign * step.resolve(value.0)),
        Key::Time(time) => {
            let delta = match step {
                Step::Days(days) => Duration::days(days),
                other => {
                    let seconds = time.timestamp() as f64;
                    Duration::milliseconds((other.resolve(seconds) * 1000.0) as i64)
                }
            };
            let shifted = if sign >= 0.0 {
                time.checked_add_signed(delta)
            } else {
                time.checked_sub_signed(delta)
            };
            Key::Time(shifted.unwrap_or(*time))
        }
        Key::Text(_) | Key::Composite(_) => {
            warn!(key = %key, "cannot step a non-numeric key");
            key.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::{Step, add, subtract};
    use crate::core::Key;

    #[test]
    fn percentage_steps_scale_with_value() {
        assert_eq!(add(&Key::number(200.0), Step::parse("10%")), Key::number(220.0));
        assert_eq!(subtract(&Key::number(200.0), Step::Percent(50.0)), Key::number(100.0));
    }

    #[test]
    fn day_steps_move_time_keys() {
        let start = Utc.with_ymd_and_hms(2024, 1, 30, 0, 0, 0).unwrap();
        let shifted = add(&Key::Time(start), Step::parse("3d"));
        assert_eq!(shifted, Key::Time(Utc.with_ymd_and_hms(2024, 2, 2, 0, 0, 0).unwrap()));
    }

    #[test]
    fn malformed_steps_degrade_to_zero() {
        assert_eq!(Step::parse("ten"), Step::Absolute(0.0));
        assert_eq!(add(&Key::number(1.0), Step::parse("x%")), Key::number(1.0));
        assert_eq!(add(&Key::text("a"), 5.0), Key::text("a"));
    }
}
