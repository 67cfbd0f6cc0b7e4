use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::Key;

/// Half-open interval filter `[low, high)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RangedFilter {
    low: Key,
    high: Key,
}

impl RangedFilter {
    /// Builds a range; bounds are swapped when given in descending order.
    #[must_use]
    pub fn new(low: impl Into<Key>, high: impl Into<Key>) -> Self {
        let (low, high) = (low.into(), high.into());
        if high < low {
            Self {
                low: high,
                high: low,
            }
        } else {
            Self { low, high }
        }
    }

    #[must_use]
    pub fn low(&self) -> &Key {
        &self.low
    }

    #[must_use]
    pub fn high(&self) -> &Key {
        &self.high
    }

    /// Numeric extent of the range, when both bounds are continuous.
    #[must_use]
    pub fn numeric_extent(&self) -> Option<(f64, f64)> {
        Some((self.low.as_f64()?, self.high.as_f64()?))
    }

    #[must_use]
    pub fn is_filtered(&self, value: &Key) -> bool {
        value.same_class(&self.low) && self.low <= *value && *value < self.high
    }
}

/// Exact `[x, y]` match against composite keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TwoDimensionalFilter {
    x: Key,
    y: Key,
}

impl TwoDimensionalFilter {
    #[must_use]
    pub fn new(x: impl Into<Key>, y: impl Into<Key>) -> Self {
        Self {
            x: x.into(),
            y: y.into(),
        }
    }

    #[must_use]
    pub fn x(&self) -> &Key {
        &self.x
    }

    #[must_use]
    pub fn y(&self) -> &Key {
        &self.y
    }

    #[must_use]
    pub fn is_filtered(&self, value: &Key) -> bool {
        match value {
            Key::Composite(parts) if parts.len() == 2 => parts[0] == self.x && parts[1] == self.y,
            _ => false,
        }
    }
}

/// Axis-aligned rectangle over composite keys, half-open on both axes.
///
/// The `x_only` form carries no y bounds and matches any y.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RangedTwoDimensionalFilter {
    x1: Key,
    x2: Key,
    y: Option<(Key, Key)>,
}

impl RangedTwoDimensionalFilter {
    /// Rectangle from two corners in any order.
    #[must_use]
    pub fn new(corner_a: (Key, Key), corner_b: (Key, Key)) -> Self {
        let (ax, ay) = corner_a;
        let (bx, by) = corner_b;
        let (x1, x2) = ordered(ax, bx);
        let (y1, y2) = ordered(ay, by);
        Self {
            x1,
            x2,
            y: Some((y1, y2)),
        }
    }

    /// Degenerate `[x1, x2]` form that ignores the y coordinate.
    #[must_use]
    pub fn x_only(x_a: impl Into<Key>, x_b: impl Into<Key>) -> Self {
        let (x1, x2) = ordered(x_a.into(), x_b.into());
        Self { x1, x2, y: None }
    }

    #[must_use]
    pub fn x_bounds(&self) -> (&Key, &Key) {
        (&self.x1, &self.x2)
    }

    #[must_use]
    pub fn y_bounds(&self) -> Option<(&Key, &Key)> {
        self.y.as_ref().map(|(y1, y2)| (y1, y2))
    }

    #[must_use]
    pub fn is_filtered(&self, value: &Key) -> bool {
        let Key::Composite(parts) = value else {
            return false;
        };
        let Some(x) = parts.first() else {
            return false;
        };
        if !half_open_contains(&self.x1, &self.x2, x) {
            return false;
        }
        match &self.y {
            None => true,
            Some((y1, y2)) => parts
                .get(1)
                .is_some_and(|y| half_open_contains(y1, y2, y)),
        }
    }
}

fn ordered(a: Key, b: Key) -> (Key, Key) {
    if b < a { (b, a) } else { (a, b) }
}

fn half_open_contains(low: &Key, high: &Key, value: &Key) -> bool {
    value.same_class(low) && low <= value && value < high
}

/// One entry of a chart's filter set.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Filter {
    Value(Key),
    Ranged(RangedFilter),
    TwoDimensional(TwoDimensionalFilter),
    RangedTwoDimensional(RangedTwoDimensionalFilter),
}

impl Filter {
    #[must_use]
    pub fn value(key: impl Into<Key>) -> Self {
        Self::Value(key.into())
    }

    #[must_use]
    pub fn range(low: impl Into<Key>, high: impl Into<Key>) -> Self {
        Self::Ranged(RangedFilter::new(low, high))
    }

    /// Membership test applied uniformly by the filter handler.
    #[must_use]
    pub fn is_filtered(&self, value: &Key) -> bool {
        match self {
            Self::Value(key) => key == value,
            Self::Ranged(range) => range.is_filtered(value),
            Self::TwoDimensional(point) => point.is_filtered(value),
            Self::RangedTwoDimensional(rect) => rect.is_filtered(value),
        }
    }

    #[must_use]
    pub fn as_range(&self) -> Option<&RangedFilter> {
        match self {
            Self::Ranged(range) => Some(range),
            _ => None,
        }
    }
}

impl From<Key> for Filter {
    fn from(key: Key) -> Self {
        Filter::Value(key)
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(key) => write!(f, "{key}"),
            Self::Ranged(range) => write!(f, "[{} -> {}]", range.low, range.high),
            Self::TwoDimensional(point) => write!(f, "[{}, {}]", point.x, point.y),
            Self::RangedTwoDimensional(rect) => match &rect.y {
                Some((y1, y2)) => write!(f, "[[{}, {}] -> [{}, {}]]", rect.x1, y1, rect.x2, y2),
                None => write!(f, "[{} -> {}]", rect.x1, rect.x2),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Filter, RangedTwoDimensionalFilter, TwoDimensionalFilter};
    use crate::core::Key;

    #[test]
    fn ranged_filter_is_half_open() {
        let filter = Filter::range(10.0, 20.0);
        assert!(filter.is_filtered(&Key::number(10.0)));
        assert!(filter.is_filtered(&Key::number(19.999)));
        assert!(!filter.is_filtered(&Key::number(20.0)));
        assert!(!filter.is_filtered(&Key::number(9.0)));
    }

    #[test]
    fn ranged_filter_normalizes_descending_bounds() {
        let filter = Filter::range(20.0, 10.0);
        assert!(filter.is_filtered(&Key::number(15.0)));
    }

    #[test]
    fn ranged_filter_rejects_other_key_classes() {
        let filter = Filter::range(0.0, 100.0);
        assert!(!filter.is_filtered(&Key::text("50")));
    }

    #[test]
    fn two_dimensional_filter_matches_exact_pair() {
        let filter = TwoDimensionalFilter::new(1.0, "b");
        assert!(filter.is_filtered(&Key::pair(Key::number(1.0), Key::text("b"))));
        assert!(!filter.is_filtered(&Key::pair(Key::number(1.0), Key::text("c"))));
        assert!(!filter.is_filtered(&Key::number(1.0)));
    }

    #[test]
    fn rectangle_filter_normalizes_corners_and_is_half_open() {
        let filter = RangedTwoDimensionalFilter::new(
            (Key::number(10.0), Key::number(5.0)),
            (Key::number(0.0), Key::number(0.0)),
        );
        let inside = Key::pair(Key::number(0.0), Key::number(0.0));
        let on_far_edge = Key::pair(Key::number(10.0), Key::number(2.0));
        assert!(filter.is_filtered(&inside));
        assert!(!filter.is_filtered(&on_far_edge));
    }

    #[test]
    fn x_only_rectangle_accepts_any_y() {
        let filter = RangedTwoDimensionalFilter::x_only(0.0, 5.0);
        assert!(filter.is_filtered(&Key::pair(Key::number(1.0), Key::number(1e9))));
        assert!(!filter.is_filtered(&Key::pair(Key::number(5.0), Key::number(0.0))));
    }
}
