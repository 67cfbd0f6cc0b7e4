use std::fmt;

use chrono::{DateTime, Utc};
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

/// Group/dimension key as produced by the data engine.
///
/// Keys are totally ordered: values of the same class compare naturally,
/// values of different classes compare by class (numbers, then text, then
/// time, then composite).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Key {
    Number(OrderedFloat<f64>),
    Text(String),
    Time(DateTime<Utc>),
    Composite(Vec<Key>),
}

impl Key {
    #[must_use]
    pub fn number(value: f64) -> Self {
        Self::Number(OrderedFloat(value))
    }

    #[must_use]
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    #[must_use]
    pub fn pair(x: Key, y: Key) -> Self {
        Self::Composite(vec![x, y])
    }

    /// Numeric projection used by continuous scales.
    ///
    /// Times project to unix seconds. Text and composite keys have no
    /// numeric value.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(value) => Some(value.0),
            Self::Time(time) => Some(time.timestamp_millis() as f64 / 1000.0),
            Self::Text(_) | Self::Composite(_) => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value),
            _ => None,
        }
    }

    /// Component `index` of a composite key.
    #[must_use]
    pub fn component(&self, index: usize) -> Option<&Key> {
        match self {
            Self::Composite(parts) => parts.get(index),
            _ => None,
        }
    }

    /// `true` when both keys belong to the same ordering class, so that a
    /// range comparison between them is meaningful.
    #[must_use]
    pub fn same_class(&self, other: &Key) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }

    /// Rebuilds a key of the same class as `self` from a numeric position.
    ///
    /// Used when a pixel extent is inverted back into domain space.
    #[must_use]
    pub fn with_numeric(&self, value: f64) -> Key {
        match self {
            Self::Time(_) => numeric_time_key(value),
            _ => Key::number(value),
        }
    }
}

pub(crate) fn numeric_time_key(seconds: f64) -> Key {
    let millis = (seconds * 1000.0).round();
    match DateTime::<Utc>::from_timestamp_millis(millis as i64) {
        Some(time) => Key::Time(time),
        None => Key::number(seconds),
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(value) => write!(f, "{}", value.0),
            Self::Text(value) => f.write_str(value),
            Self::Time(time) => write!(f, "{}", time.to_rfc3339()),
            Self::Composite(parts) => {
                f.write_str("[")?;
                for (index, part) in parts.iter().enumerate() {
                    if index > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{part}")?;
                }
                f.write_str("]")
            }
        }
    }
}

impl From<f64> for Key {
    fn from(value: f64) -> Self {
        Key::number(value)
    }
}

impl From<i64> for Key {
    fn from(value: i64) -> Self {
        Key::number(value as f64)
    }
}

impl From<&str> for Key {
    fn from(value: &str) -> Self {
        Key::text(value)
    }
}

impl From<String> for Key {
    fn from(value: String) -> Self {
        Key::Text(value)
    }
}

impl From<DateTime<Utc>> for Key {
    fn from(value: DateTime<Utc>) -> Self {
        Key::Time(value)
    }
}

#[cfg(test)]
mod tests {
    use super::Key;

    #[test]
    fn keys_of_the_same_class_order_naturally() {
        assert!(Key::number(1.0) < Key::number(2.0));
        assert!(Key::text("a") < Key::text("b"));
        assert!(Key::pair(Key::number(1.0), Key::number(9.0)) < Key::pair(Key::number(2.0), Key::number(0.0)));
    }

    #[test]
    fn numbers_sort_before_text() {
        assert!(Key::number(1e9) < Key::text(""));
        assert!(!Key::number(1.0).same_class(&Key::text("1")));
    }

    #[test]
    fn time_keys_round_trip_through_numeric_projection() {
        let key = super::numeric_time_key(1_700_000_000.5);
        assert_eq!(key.as_f64(), Some(1_700_000_000.5));
    }
}
