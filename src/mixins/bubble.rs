//! Radius encoding for bubble-style charts.

use crate::core::{GroupRow, LinearScale, ValueAccessor};

#[derive(Debug, Clone)]
pub struct BubbleMixin {
    radius_accessor: ValueAccessor,
    r: LinearScale,
    elastic_radius: bool,
    exclude_elastic_zero: bool,
    min_radius: f64,
    max_bubble_relative_size: f64,
    min_radius_with_label: f64,
    sort_bubble_size: bool,
}

impl Default for BubbleMixin {
    fn default() -> Self {
        Self {
            radius_accessor: ValueAccessor::default(),
            r: LinearScale::new(0.0, 100.0).unwrap_or_default(),
            elastic_radius: false,
            exclude_elastic_zero: true,
            min_radius: 10.0,
            max_bubble_relative_size: 0.3,
            min_radius_with_label: 10.0,
            sort_bubble_size: false,
        }
    }
}

impl BubbleMixin {
    pub fn set_radius_accessor(&mut self, accessor: ValueAccessor) -> &mut Self {
        self.radius_accessor = accessor;
        self
    }

    #[must_use]
    pub fn r(&self) -> LinearScale {
        self.r
    }

    pub fn set_r(&mut self, r: LinearScale) -> &mut Self {
        self.r = r;
        self
    }

    #[must_use]
    pub fn elastic_radius(&self) -> bool {
        self.elastic_radius
    }

    pub fn set_elastic_radius(&mut self, elastic: bool) -> &mut Self {
        self.elastic_radius = elastic;
        self
    }

    pub fn set_exclude_elastic_zero(&mut self, exclude: bool) -> &mut Self {
        self.exclude_elastic_zero = exclude;
        self
    }

    pub fn set_min_radius(&mut self, radius: f64) -> &mut Self {
        self.min_radius = radius.max(0.0);
        self
    }

    #[must_use]
    pub fn max_bubble_relative_size(&self) -> f64 {
        self.max_bubble_relative_size
    }

    /// Largest radius as a fraction of the plot's shorter side.
    pub fn set_max_bubble_relative_size(&mut self, relative: f64) -> &mut Self {
        self.max_bubble_relative_size = relative;
        self
    }

    #[must_use]
    pub fn min_radius_with_label(&self) -> f64 {
        self.min_radius_with_label
    }

    pub fn set_min_radius_with_label(&mut self, radius: f64) -> &mut Self {
        self.min_radius_with_label = radius;
        self
    }

    pub fn set_sort_bubble_size(&mut self, sort: bool) -> &mut Self {
        self.sort_bubble_size = sort;
        self
    }

    /// Refits the radius domain when elastic. Zero radii are ignored for
    /// the lower bound unless `exclude_elastic_zero` is off.
    pub fn calculate_radius_domain(&mut self, rows: &[GroupRow]) {
        if !self.elastic_radius {
            return;
        }
        let exclude_zero = self.exclude_elastic_zero;
        let values = rows
            .iter()
            .map(|row| self.radius_accessor.get(row))
            .filter(|value| !(exclude_zero && *value == 0.0));
        if let Some(extent) = LinearScale::from_extent(values) {
            self.r = extent;
        }
    }

    /// Radius for `row` inside a plot of `extent_px` (shorter side).
    /// Non-finite and non-positive values draw as zero.
    #[must_use]
    pub fn bubble_radius(&self, row: &GroupRow, extent_px: f64) -> f64 {
        let value = self.radius_accessor.get(row);
        if !value.is_finite() || value <= 0.0 {
            return 0.0;
        }
        let max_radius = (extent_px * self.max_bubble_relative_size).max(self.min_radius);
        let radius = self.min_radius + self.r.to_pixel(value, max_radius - self.min_radius);
        if radius.is_finite() { radius.max(0.0) } else { 0.0 }
    }

    #[must_use]
    pub fn is_label_visible(&self, radius: f64) -> bool {
        radius > self.min_radius_with_label
    }

    /// Draw order: larger bubbles first so smaller ones stay clickable.
    pub fn order_for_drawing(&self, rows: &mut [GroupRow]) {
        if self.sort_bubble_size {
            rows.sort_by(|left, right| {
                self.radius_accessor
                    .get(right)
                    .total_cmp(&self.radius_accessor.get(left))
            });
        }
    }
}
