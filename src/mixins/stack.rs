//! Layered series stacked on top of each other along y.
//!
//! Layer 0 is always the chart's own group; `stack` appends further
//! layers. Visibility is tracked by layer name so the legend and the
//! options layer can toggle layers without knowing their indices.

use std::collections::BTreeMap;

use indexmap::IndexSet;

use crate::core::{GroupHandle, GroupRow, Key, KeyAccessor, ValueAccessor};

/// Additional layer on top of the chart's base group.
#[derive(Clone)]
pub struct StackLayer {
    pub group: GroupHandle,
    pub name: String,
    pub accessor: ValueAccessor,
}

impl std::fmt::Debug for StackLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StackLayer")
            .field("name", &self.name)
            .field("accessor", &self.accessor)
            .finish_non_exhaustive()
    }
}

/// One stacked point: `y` on top of the running baseline `y0`.
#[derive(Debug, Clone, PartialEq)]
pub struct StackedPoint {
    pub key: Key,
    pub y0: f64,
    pub y: f64,
}

impl StackedPoint {
    #[must_use]
    pub fn top(&self) -> f64 {
        self.y0 + self.y
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StackedLayer {
    pub index: usize,
    pub name: String,
    pub hidden: bool,
    pub points: Vec<StackedPoint>,
}

#[derive(Debug, Clone, Default)]
pub struct StackMixin {
    layers: Vec<StackLayer>,
    hidden: IndexSet<String>,
    evade_domain_filter: bool,
}

impl StackMixin {
    /// Appends a layer. An empty `name` becomes the layer's index.
    pub fn stack(
        &mut self,
        group: GroupHandle,
        name: impl Into<String>,
        accessor: Option<ValueAccessor>,
    ) -> &mut Self {
        let mut name = name.into();
        if name.is_empty() {
            name = (self.layers.len() + 1).to_string();
        }
        self.layers.push(StackLayer {
            group,
            name,
            accessor: accessor.unwrap_or_default(),
        });
        self
    }

    #[must_use]
    pub fn layers(&self) -> &[StackLayer] {
        &self.layers
    }

    pub fn clear_layers(&mut self) {
        self.layers.clear();
    }

    /// Hides the named layer; returns `false` when it was already hidden.
    pub fn hide_stack(&mut self, name: &str) -> bool {
        self.hidden.insert(name.to_owned())
    }

    /// Shows the named layer; returns `false` when it was not hidden.
    pub fn show_stack(&mut self, name: &str) -> bool {
        self.hidden.shift_remove(name)
    }

    #[must_use]
    pub fn is_hidden(&self, name: &str) -> bool {
        self.hidden.contains(name)
    }

    #[must_use]
    pub fn evade_domain_filter(&self) -> bool {
        self.evade_domain_filter
    }

    pub fn set_evade_domain_filter(&mut self, evade: bool) -> &mut Self {
        self.evade_domain_filter = evade;
        self
    }

    /// Layer names in stacking order, base first.
    #[must_use]
    pub fn layer_names(&self, base_name: &str) -> Vec<String> {
        std::iter::once(base_name.to_owned())
            .chain(self.layers.iter().map(|layer| layer.name.clone()))
            .collect()
    }

    /// Computes every layer's points against a per-key running baseline.
    ///
    /// `base_rows` are the chart's own rows (its `data()`); extra layers read
    /// their groups directly. Hidden layers keep their keys with `y = 0` so
    /// the remaining layers close the gap. Keys rejected by `in_domain` are
    /// dropped unless domain filtering is evaded.
    pub fn stacked_layers(
        &self,
        base_rows: Vec<GroupRow>,
        base_name: &str,
        base_accessor: &ValueAccessor,
        key_accessor: &KeyAccessor,
        in_domain: impl Fn(&Key) -> bool,
    ) -> Vec<StackedLayer> {
        let sources = std::iter::once((base_rows, base_name, base_accessor)).chain(
            self.layers
                .iter()
                .map(|layer| (layer.group.all(), layer.name.as_str(), &layer.accessor)),
        );

        let mut baseline: BTreeMap<Key, f64> = BTreeMap::new();
        sources
            .enumerate()
            .map(|(index, (rows, name, accessor))| {
                let hidden = self.is_hidden(name);
                let points = rows
                    .iter()
                    .filter_map(|row| {
                        let key = key_accessor.get(row);
                        if !self.evade_domain_filter && !in_domain(&key) {
                            return None;
                        }
                        let value = accessor.get(row);
                        let y = if hidden || !value.is_finite() { 0.0 } else { value };
                        let base = baseline.entry(key.clone()).or_insert(0.0);
                        let point = StackedPoint { key, y0: *base, y };
                        *base += y;
                        Some(point)
                    })
                    .collect();
                StackedLayer {
                    index,
                    name: name.to_owned(),
                    hidden,
                    points,
                }
            })
            .collect()
    }
}

/// Every baseline and top across `layers`, for elastic y.
pub fn y_extent_values(layers: &[StackedLayer]) -> impl Iterator<Item = f64> + '_ {
    layers
        .iter()
        .filter(|layer| !layer.hidden)
        .flat_map(|layer| layer.points.iter())
        .flat_map(|point| [point.y0, point.top()])
}

/// Highest stacked top across visible layers; `0` when nothing is drawn.
#[must_use]
pub fn y_axis_max(layers: &[StackedLayer]) -> f64 {
    y_extent_values(layers).fold(0.0, f64::max)
}

/// Lowest baseline or top across visible layers, never above `0`.
#[must_use]
pub fn y_axis_min(layers: &[StackedLayer]) -> f64 {
    y_extent_values(layers).fold(0.0, f64::min)
}

/// Distinct keys across `layers`, in first-seen order.
#[must_use]
pub fn x_keys(layers: &[StackedLayer]) -> Vec<Key> {
    let keys: IndexSet<Key> = layers
        .iter()
        .flat_map(|layer| layer.points.iter().map(|point| point.key.clone()))
        .collect();
    keys.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::{StackMixin, x_keys, y_axis_max, y_axis_min};
    use crate::core::{Group, GroupHandle, GroupRow, KeyAccessor, ValueAccessor};

    struct FixedGroup(Vec<GroupRow>);

    impl Group for FixedGroup {
        fn all(&self) -> Vec<GroupRow> {
            self.0.clone()
        }
    }

    fn rows(pairs: &[(f64, f64)]) -> Vec<GroupRow> {
        pairs.iter().map(|(k, v)| GroupRow::new(*k, *v)).collect()
    }

    fn group(pairs: &[(f64, f64)]) -> GroupHandle {
        Rc::new(FixedGroup(rows(pairs)))
    }

    #[test]
    fn layers_accumulate_per_key() {
        let mut stack = StackMixin::default();
        stack.stack(group(&[(1.0, 2.0), (2.0, 3.0)]), "top", None);
        let layers = stack.stacked_layers(
            rows(&[(1.0, 1.0), (2.0, 1.0)]),
            "base",
            &ValueAccessor::default(),
            &KeyAccessor::default(),
            |_| true,
        );
        assert_eq!(layers.len(), 2);
        assert_eq!(layers[1].points[0].y0, 1.0);
        assert_eq!(layers[1].points[1].top(), 4.0);
        assert_eq!(x_keys(&layers).len(), 2);
        assert_eq!(y_axis_max(&layers), 4.0);
        assert_eq!(y_axis_min(&layers), 0.0);
    }

    #[test]
    fn hidden_layer_contributes_zero() {
        let mut stack = StackMixin::default();
        stack.stack(group(&[(1.0, 2.0)]), "top", None);
        assert!(stack.hide_stack("base"));
        assert!(!stack.hide_stack("base"));
        let layers = stack.stacked_layers(
            rows(&[(1.0, 5.0)]),
            "base",
            &ValueAccessor::default(),
            &KeyAccessor::default(),
            |_| true,
        );
        assert!(layers[0].hidden);
        assert_eq!(layers[0].points[0].y, 0.0);
        assert_eq!(layers[1].points[0].y0, 0.0);
        assert!(stack.show_stack("base"));
    }

    #[test]
    fn out_of_domain_points_are_dropped_unless_evaded() {
        let mut stack = StackMixin::default();
        let base = rows(&[(1.0, 1.0), (50.0, 1.0)]);
        let in_domain = |key: &crate::core::Key| key.as_f64().is_some_and(|v| v < 10.0);
        let layers = stack.stacked_layers(
            base.clone(),
            "base",
            &ValueAccessor::default(),
            &KeyAccessor::default(),
            in_domain,
        );
        assert_eq!(layers[0].points.len(), 1);
        stack.set_evade_domain_filter(true);
        let layers = stack.stacked_layers(
            base,
            "base",
            &ValueAccessor::default(),
            &KeyAccessor::default(),
            in_domain,
        );
        assert_eq!(layers[0].points.len(), 2);
    }
}
