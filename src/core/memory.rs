//! In-memory data engine for headless hosts and tests.
//!
//! Every dimension sees the restrictions of every other dimension; a group
//! ignores the restriction of the dimension it was derived from, which is
//! what lets a chart keep showing its deselected bars.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::core::data::{Dimension, FilterPredicate, Group, GroupRow, Reduced};
use crate::core::Key;

type KeyFn<T> = Rc<dyn Fn(&T) -> Key>;
type NumberFn<T> = Rc<dyn Fn(&T) -> f64>;

struct EngineState<T> {
    records: Vec<T>,
    dimension_keys: Vec<KeyFn<T>>,
    dimension_filters: Vec<Option<FilterPredicate>>,
}

impl<T> EngineState<T> {
    fn is_visible(&self, record: &T, except: Option<usize>) -> bool {
        self.dimension_filters
            .iter()
            .enumerate()
            .filter(|(index, _)| Some(*index) != except)
            .all(|(index, predicate)| match predicate {
                Some(predicate) => predicate(&(self.dimension_keys[index])(record)),
                None => true,
            })
    }
}

/// Shared record store; cheap to clone.
pub struct MemoryCrossfilter<T> {
    state: Rc<RefCell<EngineState<T>>>,
}

impl<T> Clone for MemoryCrossfilter<T> {
    fn clone(&self) -> Self {
        Self {
            state: Rc::clone(&self.state),
        }
    }
}

impl<T: 'static> MemoryCrossfilter<T> {
    #[must_use]
    pub fn new(records: Vec<T>) -> Self {
        Self {
            state: Rc::new(RefCell::new(EngineState {
                records,
                dimension_keys: Vec::new(),
                dimension_filters: Vec::new(),
            })),
        }
    }

    /// Registers a new dimension keyed by `key`.
    pub fn dimension(&self, key: impl Fn(&T) -> Key + 'static) -> Rc<MemoryDimension<T>> {
        let mut state = self.state.borrow_mut();
        state.dimension_keys.push(Rc::new(key));
        state.dimension_filters.push(None);
        Rc::new(MemoryDimension {
            state: Rc::clone(&self.state),
            index: state.dimension_keys.len() - 1,
        })
    }

    pub fn add(&self, records: impl IntoIterator<Item = T>) {
        self.state.borrow_mut().records.extend(records);
    }

    /// Total number of records, ignoring restrictions.
    #[must_use]
    pub fn size(&self) -> usize {
        self.state.borrow().records.len()
    }

    /// Number of records passing every restriction.
    #[must_use]
    pub fn selected_size(&self) -> usize {
        let state = self.state.borrow();
        state
            .records
            .iter()
            .filter(|record| state.is_visible(record, None))
            .count()
    }
}

/// Record counter consumed by `DataCount` widgets.
pub trait RecordCount {
    fn total(&self) -> usize;
    fn selected(&self) -> usize;
}

impl<T: 'static> RecordCount for MemoryCrossfilter<T> {
    fn total(&self) -> usize {
        self.size()
    }

    fn selected(&self) -> usize {
        self.selected_size()
    }
}

pub struct MemoryDimension<T> {
    state: Rc<RefCell<EngineState<T>>>,
    index: usize,
}

impl<T: 'static> MemoryDimension<T> {
    /// Group counting records per key.
    #[must_use]
    pub fn group_count(&self) -> Rc<MemoryGroup<T>> {
        self.group_with(Reducer::Count)
    }

    /// Group summing `value` per key.
    pub fn group_sum(&self, value: impl Fn(&T) -> f64 + 'static) -> Rc<MemoryGroup<T>> {
        self.group_with(Reducer::Sum(Rc::new(value)))
    }

    /// Group summing several named fields per key into `Reduced::Fields`.
    pub fn group_fields(
        &self,
        fields: Vec<(&str, Box<dyn Fn(&T) -> f64>)>,
    ) -> Rc<MemoryGroup<T>> {
        let fields = fields
            .into_iter()
            .map(|(name, value)| {
                let value: NumberFn<T> = Rc::from(value);
                (name.to_owned(), value)
            })
            .collect();
        self.group_with(Reducer::Fields(fields))
    }

    fn group_with(&self, reducer: Reducer<T>) -> Rc<MemoryGroup<T>> {
        Rc::new(MemoryGroup {
            state: Rc::clone(&self.state),
            dimension: self.index,
            reducer,
        })
    }

    fn visible_keys(&self) -> Vec<Key> {
        let state = self.state.borrow();
        let key = &state.dimension_keys[self.index];
        let mut keys: Vec<Key> = state
            .records
            .iter()
            .filter(|record| state.is_visible(record, None))
            .map(|record| key(record))
            .collect();
        keys.sort();
        keys
    }
}

impl<T: 'static> Dimension for MemoryDimension<T> {
    fn filter(&self, predicate: Option<FilterPredicate>) {
        self.state.borrow_mut().dimension_filters[self.index] = predicate;
    }

    fn has_filter(&self) -> bool {
        self.state.borrow().dimension_filters[self.index].is_some()
    }

    fn top(&self, n: usize) -> Vec<Key> {
        let mut keys = self.visible_keys();
        keys.reverse();
        keys.truncate(n);
        keys
    }

    fn all(&self) -> Vec<Key> {
        self.visible_keys()
    }
}

enum Reducer<T> {
    Count,
    Sum(NumberFn<T>),
    Fields(Vec<(String, NumberFn<T>)>),
}

impl<T> Reducer<T> {
    fn initial(&self) -> Reduced {
        match self {
            Self::Count | Self::Sum(_) => Reduced::Number(0.0),
            Self::Fields(fields) => Reduced::Fields(
                fields
                    .iter()
                    .map(|(name, _)| (name.clone(), 0.0))
                    .collect::<IndexMap<_, _>>(),
            ),
        }
    }

    fn add(&self, accumulated: &mut Reduced, record: &T) {
        match (self, accumulated) {
            (Self::Count, Reduced::Number(total)) => *total += 1.0,
            (Self::Sum(value), Reduced::Number(total)) => *total += value(record),
            (Self::Fields(fields), Reduced::Fields(totals)) => {
                for (name, value) in fields {
                    if let Some(total) = totals.get_mut(name) {
                        *total += value(record);
                    }
                }
            }
            _ => {}
        }
    }
}

pub struct MemoryGroup<T> {
    state: Rc<RefCell<EngineState<T>>>,
    dimension: usize,
    reducer: Reducer<T>,
}

impl<T: 'static> Group for MemoryGroup<T> {
    fn all(&self) -> Vec<GroupRow> {
        let state = self.state.borrow();
        let key = &state.dimension_keys[self.dimension];
        let mut rows: BTreeMap<Key, Reduced> = BTreeMap::new();
        for record in &state.records {
            let accumulated = rows
                .entry(key(record))
                .or_insert_with(|| self.reducer.initial());
            if state.is_visible(record, Some(self.dimension)) {
                self.reducer.add(accumulated, record);
            }
        }
        rows.into_iter()
            .map(|(key, value)| GroupRow {
                key,
                value,
                others: None,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::MemoryCrossfilter;
    use crate::core::Key;
    use crate::core::data::{Dimension, Group};

    struct Sale {
        region: &'static str,
        amount: f64,
    }

    fn sales() -> MemoryCrossfilter<Sale> {
        MemoryCrossfilter::new(vec![
            Sale { region: "west", amount: 5.0 },
            Sale { region: "west", amount: 2.0 },
            Sale { region: "east", amount: 3.0 },
        ])
    }

    #[test]
    fn group_ignores_own_dimension_but_sees_others() {
        let data = sales();
        let region = data.dimension(|sale| Key::text(sale.region));
        let amount = data.dimension(|sale| Key::number(sale.amount));
        let by_region = region.group_sum(|sale| sale.amount);

        region.filter(Some(Rc::new(|key: &Key| key.as_str() == Some("east"))));
        let rows = by_region.all();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].value.number(), 7.0);

        amount.filter(Some(Rc::new(|key: &Key| key.as_f64().is_some_and(|v| v > 2.5))));
        let rows = by_region.all();
        assert_eq!(rows[1].value.number(), 5.0);
        assert_eq!(data.selected_size(), 1);
    }

    #[test]
    fn empty_keys_remain_as_zero_rows() {
        let data = sales();
        let region = data.dimension(|sale| Key::text(sale.region));
        let amount = data.dimension(|sale| Key::number(sale.amount));
        let by_region = region.group_count();
        amount.filter(Some(Rc::new(|_: &Key| false)));
        let rows = by_region.all();
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|row| row.value.number() == 0.0));
    }
}
