//! Contracts the chart core needs from the external data engine.
//!
//! A dimension accepts a restriction predicate; a group returns aggregated
//! rows that already reflect every restriction installed elsewhere in the
//! shared engine.

use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::core::Key;

/// Restriction installed on a dimension.
pub type FilterPredicate = Rc<dyn Fn(&Key) -> bool>;

/// Queryable axis of the shared dataset.
pub trait Dimension {
    /// Installs `predicate`, or clears the restriction when `None`.
    fn filter(&self, predicate: Option<FilterPredicate>);

    /// `true` while a restriction is installed.
    fn has_filter(&self) -> bool;

    /// Keys of records visible under every installed restriction, highest first.
    fn top(&self, n: usize) -> Vec<Key>;

    /// Keys of all currently visible records, in ascending key order.
    fn all(&self) -> Vec<Key>;
}

/// Aggregated view over a dimension.
pub trait Group {
    /// Every group row; ignores the restriction on the group's own dimension.
    fn all(&self) -> Vec<GroupRow>;

    /// Top `n` rows by numeric value, descending.
    fn top(&self, n: usize) -> Vec<GroupRow> {
        let mut rows = self.all();
        rows.sort_by(|left, right| right.value.number().total_cmp(&left.value.number()));
        rows.truncate(n);
        rows
    }

    /// Number of visible records, for "n of N selected" style widgets.
    fn size(&self) -> usize {
        self.all().len()
    }
}

pub type DimensionHandle = Rc<dyn Dimension>;
pub type GroupHandle = Rc<dyn Group>;

/// Aggregated value of one group row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Reduced {
    Number(f64),
    Fields(IndexMap<String, f64>),
}

impl Reduced {
    /// Lenient numeric reading: a field map reads its `value` field, or zero.
    #[must_use]
    pub fn number(&self) -> f64 {
        match self {
            Self::Number(value) => *value,
            Self::Fields(fields) => fields.get("value").copied().unwrap_or(0.0),
        }
    }

    /// Reads one named field; a plain number only answers to `value`.
    #[must_use]
    pub fn field(&self, name: &str) -> f64 {
        match self {
            Self::Number(value) if name == "value" => *value,
            Self::Number(_) => 0.0,
            Self::Fields(fields) => fields.get(name).copied().unwrap_or(0.0),
        }
    }
}

impl From<f64> for Reduced {
    fn from(value: f64) -> Self {
        Reduced::Number(value)
    }
}

/// `{key, value}` row produced by a group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupRow {
    pub key: Key,
    pub value: Reduced,
    /// Keys folded into a synthetic "others" row by capping.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub others: Option<Vec<Key>>,
}

impl GroupRow {
    #[must_use]
    pub fn new(key: impl Into<Key>, value: impl Into<Reduced>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            others: None,
        }
    }

    #[must_use]
    pub fn is_others(&self) -> bool {
        self.others.is_some()
    }
}

/// Row-to-key accessor.
#[derive(Clone)]
pub struct KeyAccessor(Rc<dyn Fn(&GroupRow) -> Key>);

impl KeyAccessor {
    #[must_use]
    pub fn new(accessor: impl Fn(&GroupRow) -> Key + 'static) -> Self {
        Self(Rc::new(accessor))
    }

    #[must_use]
    pub fn get(&self, row: &GroupRow) -> Key {
        (self.0)(row)
    }
}

impl Default for KeyAccessor {
    fn default() -> Self {
        Self::new(|row| row.key.clone())
    }
}

impl fmt::Debug for KeyAccessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("KeyAccessor(..)")
    }
}

/// Row-to-number accessor.
#[derive(Clone)]
pub struct ValueAccessor(Rc<dyn Fn(&GroupRow) -> f64>);

impl ValueAccessor {
    #[must_use]
    pub fn new(accessor: impl Fn(&GroupRow) -> f64 + 'static) -> Self {
        Self(Rc::new(accessor))
    }

    /// Reads one named field of a `Reduced::Fields` value.
    #[must_use]
    pub fn field(name: impl Into<String>) -> Self {
        let name = name.into();
        Self::new(move |row| row.value.field(&name))
    }

    #[must_use]
    pub fn get(&self, row: &GroupRow) -> f64 {
        (self.0)(row)
    }
}

impl Default for ValueAccessor {
    fn default() -> Self {
        Self::new(|row| row.value.number())
    }
}

impl fmt::Debug for ValueAccessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ValueAccessor(..)")
    }
}

/// Row-to-text accessor used for labels and titles.
#[derive(Clone)]
pub struct TextAccessor(Rc<dyn Fn(&GroupRow) -> String>);

impl TextAccessor {
    #[must_use]
    pub fn new(accessor: impl Fn(&GroupRow) -> String + 'static) -> Self {
        Self(Rc::new(accessor))
    }

    #[must_use]
    pub fn get(&self, row: &GroupRow) -> String {
        (self.0)(row)
    }

    /// `"key: value"`, the default title.
    #[must_use]
    pub fn key_and_value() -> Self {
        Self::new(|row| format!("{}: {}", row.key, row.value.number()))
    }
}

impl Default for TextAccessor {
    fn default() -> Self {
        Self::new(|row| row.key.to_string())
    }
}

impl fmt::Debug for TextAccessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("TextAccessor(..)")
    }
}
