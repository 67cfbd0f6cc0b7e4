//! Top-N capping with an aggregated "others" row.

use crate::core::{GroupRow, Key, KeyAccessor, ValueAccessor};

pub const DEFAULT_OTHERS_LABEL: &str = "Others";

#[derive(Debug, Clone)]
pub struct CapMixin {
    cap: Option<usize>,
    take_front: bool,
    others_label: String,
    others_grouper: bool,
}

impl Default for CapMixin {
    fn default() -> Self {
        Self {
            cap: None,
            take_front: true,
            others_label: DEFAULT_OTHERS_LABEL.to_owned(),
            others_grouper: true,
        }
    }
}

impl CapMixin {
    #[must_use]
    pub fn cap(&self) -> Option<usize> {
        self.cap
    }

    /// `None` shows every row.
    pub fn set_cap(&mut self, cap: Option<usize>) -> &mut Self {
        self.cap = cap;
        self
    }

    #[must_use]
    pub fn take_front(&self) -> bool {
        self.take_front
    }

    /// Keep the first `cap` ordered rows (`true`) or the last `cap`.
    pub fn set_take_front(&mut self, take_front: bool) -> &mut Self {
        self.take_front = take_front;
        self
    }

    #[must_use]
    pub fn others_label(&self) -> &str {
        &self.others_label
    }

    pub fn set_others_label(&mut self, label: impl Into<String>) -> &mut Self {
        self.others_label = label.into();
        self
    }

    #[must_use]
    pub fn others_grouper(&self) -> bool {
        self.others_grouper
    }

    /// Disables folding excluded rows into an "others" row; they are dropped.
    pub fn set_others_grouper(&mut self, enabled: bool) -> &mut Self {
        self.others_grouper = enabled;
        self
    }

    /// Splits `ordered` at the cap and folds the excluded rows.
    ///
    /// The synthetic row carries the excluded keys in `others`; its value
    /// is the sum of their values.
    #[must_use]
    pub fn capped(
        &self,
        mut ordered: Vec<GroupRow>,
        key: &KeyAccessor,
        value: &ValueAccessor,
    ) -> Vec<GroupRow> {
        let Some(cap) = self.cap else {
            return ordered;
        };
        if ordered.len() <= cap {
            return ordered;
        }

        let (kept, rest) = if self.take_front {
            let rest = ordered.split_off(cap);
            (ordered, rest)
        } else {
            let kept = ordered.split_off(ordered.len() - cap);
            (kept, ordered)
        };
        if !self.others_grouper || rest.is_empty() {
            return kept;
        }

        let others_keys: Vec<Key> = rest.iter().map(|row| key.get(row)).collect();
        let others_sum: f64 = rest
            .iter()
            .map(|row| value.get(row))
            .filter(|value| value.is_finite())
            .sum();
        let mut rows = kept;
        rows.push(GroupRow {
            key: Key::text(self.others_label.clone()),
            value: others_sum.into(),
            others: Some(others_keys),
        });
        rows
    }
}

/// Stable descending sort by value, the ordering capped charts default to.
pub fn sort_by_descending_value(rows: &mut [GroupRow], value: &ValueAccessor) {
    rows.sort_by(|left, right| value.get(right).total_cmp(&value.get(left)));
}

#[cfg(test)]
mod tests {
    use super::CapMixin;
    use crate::core::{GroupRow, Key, KeyAccessor, ValueAccessor};

    fn rows() -> Vec<GroupRow> {
        vec![
            GroupRow::new("a", 5.0),
            GroupRow::new("b", 3.0),
            GroupRow::new("c", 1.0),
        ]
    }

    #[test]
    fn excluded_rows_fold_into_others() {
        let mut cap = CapMixin::default();
        cap.set_cap(Some(2));
        let capped = cap.capped(rows(), &KeyAccessor::default(), &ValueAccessor::default());
        assert_eq!(capped.len(), 3);
        assert_eq!(capped[2].key, Key::text("Others"));
        assert_eq!(capped[2].value.number(), 1.0);
        assert_eq!(capped[2].others, Some(vec![Key::text("c")]));
    }

    #[test]
    fn take_back_keeps_tail() {
        let mut cap = CapMixin::default();
        cap.set_cap(Some(1)).set_take_front(false).set_others_label("rest");
        let capped = cap.capped(rows(), &KeyAccessor::default(), &ValueAccessor::default());
        assert_eq!(capped[0].key, Key::text("c"));
        assert_eq!(capped[1].key, Key::text("rest"));
        assert_eq!(capped[1].value.number(), 8.0);
    }

    #[test]
    fn grouper_off_drops_rest() {
        let mut cap = CapMixin::default();
        cap.set_cap(Some(2)).set_others_grouper(false);
        let capped = cap.capped(rows(), &KeyAccessor::default(), &ValueAccessor::default());
        assert_eq!(capped.len(), 2);
        assert!(capped.iter().all(|row| !row.is_others()));
    }

    #[test]
    fn uncapped_rows_pass_through() {
        let cap = CapMixin::default();
        assert_eq!(
            cap.capped(rows(), &KeyAccessor::default(), &ValueAccessor::default()),
            rows()
        );
    }
}
