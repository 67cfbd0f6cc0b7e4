//! Per-column filtering for charts over several independent dimensions
//! (one per hierarchy level).
//!
//! Each column keeps its own ordered filter list. Dimensions are looked
//! up by column name when a column is applied, so levels may be bound
//! after filters were recorded.

use std::rc::Rc;

use indexmap::IndexMap;
use tracing::{trace, warn};

use crate::core::{DimensionHandle, FilterPredicate, Key};

#[derive(Clone)]
pub struct HierarchyLevel {
    pub column: String,
    pub dimension: DimensionHandle,
}

impl std::fmt::Debug for HierarchyLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HierarchyLevel")
            .field("column", &self.column)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Default)]
pub struct HierarchyMixin {
    levels: Vec<HierarchyLevel>,
    filters: IndexMap<String, Vec<Key>>,
}

impl HierarchyMixin {
    pub fn add_level(
        &mut self,
        column: impl Into<String>,
        dimension: DimensionHandle,
    ) -> &mut Self {
        self.levels.push(HierarchyLevel {
            column: column.into(),
            dimension,
        });
        self
    }

    #[must_use]
    pub fn levels(&self) -> &[HierarchyLevel] {
        &self.levels
    }

    /// Dimension bound to `column`, or `None` when no level uses that name.
    #[must_use]
    pub fn lookup_dimension(&self, column: &str) -> Option<DimensionHandle> {
        self.levels
            .iter()
            .find(|level| level.column == column)
            .map(|level| Rc::clone(&level.dimension))
    }

    /// Toggles `value` in `column`'s list and reapplies that column only.
    /// Returns `true` when the value was added.
    pub fn filter(&mut self, column: &str, value: Key) -> bool {
        let values = self.filters.entry(column.to_owned()).or_default();
        let added = match values.iter().position(|existing| *existing == value) {
            Some(index) => {
                values.remove(index);
                false
            }
            None => {
                values.push(value);
                true
            }
        };
        self.apply_column(column);
        added
    }

    /// Clears `column`'s list, then adds `value`.
    pub fn replace_filter(&mut self, column: &str, value: Key) {
        let values = self.filters.entry(column.to_owned()).or_default();
        values.clear();
        values.push(value);
        self.apply_column(column);
    }

    #[must_use]
    pub fn has_any_filter(&self) -> bool {
        self.filters.values().any(|values| !values.is_empty())
    }

    #[must_use]
    pub fn has_filter(&self, column: &str, value: &Key) -> bool {
        self.filters
            .get(column)
            .is_some_and(|values| values.contains(value))
    }

    #[must_use]
    pub fn filters_for(&self, column: &str) -> &[Key] {
        self.filters.get(column).map_or(&[], Vec::as_slice)
    }

    #[must_use]
    pub fn columns_with_filters(&self) -> Vec<&str> {
        self.filters
            .iter()
            .filter(|(_, values)| !values.is_empty())
            .map(|(column, _)| column.as_str())
            .collect()
    }

    /// Clears every column and resets each bound dimension.
    pub fn filter_all(&mut self) {
        let columns: Vec<String> = self.filters.keys().cloned().collect();
        for column in columns {
            self.filter_all_for_level(&column);
        }
    }

    /// Clears exactly one column; other columns keep their filters.
    pub fn filter_all_for_level(&mut self, column: &str) {
        if let Some(values) = self.filters.get_mut(column) {
            values.clear();
        }
        self.apply_column(column);
    }

    fn apply_column(&self, column: &str) {
        let Some(dimension) = self.lookup_dimension(column) else {
            warn!(column, "no dimension bound for hierarchy column");
            return;
        };
        dimension.filter(None);
        let values = self.filters_for(column);
        if values.is_empty() {
            trace!(column, "hierarchy column cleared");
            return;
        }
        let selected: Vec<Key> = values.to_vec();
        let predicate: FilterPredicate = Rc::new(move |key: &Key| selected.contains(key));
        dimension.filter(Some(predicate));
        trace!(column, count = values.len(), "hierarchy column applied");
    }
}

#[cfg(test)]
mod tests {
    use super::HierarchyMixin;
    use crate::core::{Dimension, Key, MemoryCrossfilter};

    #[derive(Clone)]
    struct Row {
        region: &'static str,
        country: &'static str,
    }

    fn engine() -> MemoryCrossfilter<Row> {
        MemoryCrossfilter::new(vec![
            Row { region: "West", country: "US" },
            Row { region: "West", country: "CA" },
            Row { region: "East", country: "JP" },
        ])
    }

    #[test]
    fn columns_filter_independently() {
        let data = engine();
        let region = data.dimension(|row: &Row| Key::text(row.region));
        let country = data.dimension(|row: &Row| Key::text(row.country));
        let mut hierarchy = HierarchyMixin::default();
        hierarchy
            .add_level("region", region.clone())
            .add_level("country", country.clone());

        assert!(hierarchy.filter("country", Key::text("US")));
        assert!(hierarchy.filter("region", Key::text("West")));
        assert_eq!(hierarchy.filters_for("country"), &[Key::text("US")]);
        assert!(region.has_filter());

        hierarchy.filter_all_for_level("region");
        assert!(!region.has_filter());
        assert!(country.has_filter());
        assert!(hierarchy.has_filter("country", &Key::text("US")));
        assert_eq!(data.selected_size(), 1);
    }

    #[test]
    fn toggle_and_replace() {
        let data = engine();
        let region = data.dimension(|row: &Row| Key::text(row.region));
        let mut hierarchy = HierarchyMixin::default();
        hierarchy.add_level("region", region);

        hierarchy.filter("region", Key::text("West"));
        assert!(!hierarchy.filter("region", Key::text("West")));
        assert!(!hierarchy.has_any_filter());

        hierarchy.filter("region", Key::text("West"));
        hierarchy.replace_filter("region", Key::text("East"));
        assert_eq!(hierarchy.filters_for("region"), &[Key::text("East")]);
        assert_eq!(data.selected_size(), 1);

        hierarchy.filter_all();
        assert!(!hierarchy.has_any_filter());
        assert_eq!(data.selected_size(), 3);
    }

    #[test]
    fn unknown_column_is_recorded_but_not_applied() {
        let mut hierarchy = HierarchyMixin::default();
        assert!(hierarchy.lookup_dimension("missing").is_none());
        hierarchy.filter("missing", Key::text("x"));
        assert!(hierarchy.has_filter("missing", &Key::text("x")));
    }
}
